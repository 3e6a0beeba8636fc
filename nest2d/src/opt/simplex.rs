use anyhow::{Result, ensure};
use log::trace;

use crate::opt::{Optimum, StopCriteria, StopReason};

const REFLECTION: f64 = 1.0;
const EXPANSION: f64 = 2.0;
const CONTRACTION: f64 = 0.5;
const SHRINK: f64 = 0.5;

/// Derivative-free local optimizer: a [Nelder–Mead](https://en.wikipedia.org/wiki/Nelder%E2%80%93Mead_method)
/// simplex search, kept inside box bounds by projecting every trial point onto them.
#[derive(Debug, Clone, Copy)]
pub struct SimplexOptimizer {
    pub stop: StopCriteria,
    /// Size of the initial simplex as a fraction of the bounds in each dimension
    pub initial_step: f64,
}

impl SimplexOptimizer {
    pub fn new(stop: StopCriteria) -> Self {
        Self {
            stop,
            initial_step: 0.1,
        }
    }

    /// Searches for a minimum of `objective` starting from `initial`, inside `bounds`.
    /// NaN scores are treated as infinitely bad.
    pub fn optimize_min<F>(&self, mut objective: F, initial: &[f64], bounds: &[(f64, f64)]) -> Result<Optimum>
    where
        F: FnMut(&[f64]) -> f64,
    {
        let n = initial.len();
        ensure!(n > 0, "cannot optimize over zero dimensions");
        ensure!(
            bounds.len() == n,
            "dimension mismatch: {} initial values, {} bounds",
            n,
            bounds.len()
        );
        ensure!(
            bounds.iter().all(|(lo, hi)| lo.is_finite() && hi.is_finite() && lo <= hi),
            "invalid bounds: {bounds:?}"
        );

        let project = |x: &mut [f64]| {
            x.iter_mut()
                .zip(bounds)
                .for_each(|(v, (lo, hi))| *v = v.clamp(*lo, *hi));
        };

        let mut x0 = initial.to_vec();
        project(&mut x0);
        let f0 = objective(&x0);
        ensure!(!f0.is_nan(), "objective is not a number at the initial point {x0:?}");

        let initial_stop = match self.stop.stop_score {
            Some(s) if f0 <= s => Some(StopReason::StopScore),
            _ if self.stop.max_iterations == 0 => Some(StopReason::MaxIterations),
            _ => None,
        };
        if let Some(reason) = initial_stop {
            return Ok(Optimum {
                point: x0,
                score: f0,
                n_iterations: 0,
                stop_reason: reason,
            });
        }

        let mut score = |x: &[f64]| match objective(x) {
            s if s.is_nan() => f64::INFINITY,
            s => s,
        };

        let mut simplex = Vec::with_capacity(n + 1);
        simplex.push((x0.clone(), f0));
        for (i, (lo, hi)) in bounds.iter().enumerate() {
            let step = self.initial_step * (hi - lo);
            let mut xi = x0.clone();
            xi[i] = match x0[i] + step > *hi {
                true => x0[i] - step,
                false => x0[i] + step,
            };
            project(&mut xi);
            let fi = score(&xi);
            simplex.push((xi, fi));
        }

        let mut n_iterations = 0;
        loop {
            simplex.sort_by(|a, b| a.1.total_cmp(&b.1));
            let (f_best, f_worst) = (simplex[0].1, simplex[n].1);

            if let Some(reason) = self.stop_reason(f_best, f_worst, n_iterations) {
                trace!("[OPT] stopped after {n_iterations} iterations ({reason:?}), score: {f_best}");
                let (point, score) = simplex.swap_remove(0);
                return Ok(Optimum {
                    point,
                    score,
                    n_iterations,
                    stop_reason: reason,
                });
            }
            n_iterations += 1;

            //centroid of all vertices except the worst
            let centroid = (0..n)
                .map(|d| simplex[..n].iter().map(|(x, _)| x[d]).sum::<f64>() / n as f64)
                .collect::<Vec<_>>();
            let along = |from: &[f64], to: &[f64], coef: f64| {
                let mut p = from
                    .iter()
                    .zip(to)
                    .map(|(f, t)| f + coef * (t - f))
                    .collect::<Vec<_>>();
                project(&mut p);
                p
            };

            let x_worst = simplex[n].0.clone();
            let x_r = along(&centroid, &x_worst, -REFLECTION);
            let f_r = score(&x_r);

            if f_r < f_best {
                let x_e = along(&centroid, &x_r, EXPANSION);
                let f_e = score(&x_e);
                simplex[n] = match f_e < f_r {
                    true => (x_e, f_e),
                    false => (x_r, f_r),
                };
            } else if f_r < simplex[n - 1].1 {
                simplex[n] = (x_r, f_r);
            } else {
                let x_c = match f_r < f_worst {
                    true => along(&centroid, &x_r, CONTRACTION),
                    false => along(&centroid, &x_worst, CONTRACTION),
                };
                let f_c = score(&x_c);
                if f_c < f_r.min(f_worst) {
                    simplex[n] = (x_c, f_c);
                } else {
                    let x_best = simplex[0].0.clone();
                    for vertex in simplex.iter_mut().skip(1) {
                        let x_s = along(&x_best, &vertex.0, SHRINK);
                        let f_s = score(&x_s);
                        *vertex = (x_s, f_s);
                    }
                }
            }
        }
    }

    /// Searches for a maximum of `objective`, see [`SimplexOptimizer::optimize_min`].
    /// The stop score is reached when the score climbs to or above it.
    pub fn optimize_max<F>(&self, mut objective: F, initial: &[f64], bounds: &[(f64, f64)]) -> Result<Optimum>
    where
        F: FnMut(&[f64]) -> f64,
    {
        let mirrored = SimplexOptimizer {
            stop: StopCriteria {
                stop_score: self.stop.stop_score.map(|s| -s),
                ..self.stop
            },
            ..*self
        };
        let optimum = mirrored.optimize_min(|x| -objective(x), initial, bounds)?;
        Ok(Optimum {
            score: -optimum.score,
            ..optimum
        })
    }

    fn stop_reason(&self, f_best: f64, f_worst: f64, n_iterations: usize) -> Option<StopReason> {
        let StopCriteria {
            max_iterations,
            absolute_score_difference,
            relative_score_difference,
            stop_score,
        } = self.stop;
        let spread = f_worst - f_best;

        if stop_score.is_some_and(|s| f_best <= s) {
            Some(StopReason::StopScore)
        } else if absolute_score_difference.is_some_and(|a| spread <= a) {
            Some(StopReason::AbsoluteScoreDifference)
        } else if relative_score_difference.is_some_and(|r| spread <= r * f_best.abs()) {
            Some(StopReason::RelativeScoreDifference)
        } else if n_iterations >= max_iterations {
            Some(StopReason::MaxIterations)
        } else {
            None
        }
    }
}
