use anyhow::{Context, Result};
use float_cmp::approx_eq;
use itertools::Itertools;
use log::warn;

use crate::entities::{Bin, Item};
use crate::geometry::DTransformation;
use crate::geometry::primitives::{NSPolygon, Point};
use crate::io::ext_repr::{ExtBin, ExtInstance, ExtItem, ExtSPolygon};

/// Metadata key under which the external id of an item is stored
pub const EXT_ID_KEY: &str = "ext_id";

/// Converts an external instance into its bin, spacing and items (one per copy)
pub fn import_instance(ext_instance: &ExtInstance) -> Result<(Bin, f64, Vec<Item>)> {
    let bin = import_bin(&ext_instance.bin)
        .with_context(|| format!("invalid bin in instance {}", ext_instance.name))?;
    let items = import_items(&ext_instance.items)?;
    Ok((bin, ext_instance.spacing, items))
}

pub fn import_bin(ext_bin: &ExtBin) -> Result<Bin> {
    match *ext_bin {
        ExtBin::Box {
            x_min,
            y_min,
            width,
            height,
        } => Bin::new_box(x_min, y_min, x_min + width, y_min + height),
        ExtBin::Circle {
            center: (cx, cy),
            radius,
        } => Bin::new_circle(Point(cx, cy), radius),
        ExtBin::Strip {
            x_min,
            y_min,
            height,
        } => Bin::new_strip(x_min, y_min, height),
    }
}

/// Imports every item, repeated as many times as its quantity
pub fn import_items(ext_items: &[ExtItem]) -> Result<Vec<Item>> {
    let mut items = vec![];
    for ext_item in ext_items {
        let item = import_item(ext_item).with_context(|| format!("invalid item {}", ext_item.id))?;
        items.extend(std::iter::repeat_n(item, ext_item.quantity));
    }
    Ok(items)
}

pub fn import_item(ext_item: &ExtItem) -> Result<Item> {
    let shape = NSPolygon::from_points(
        import_simple_polygon(&ext_item.contour),
        ext_item.holes.iter().map(import_simple_polygon).collect(),
    )?;
    let d_transf = ext_item
        .transformation
        .map_or(DTransformation::empty(), DTransformation::from);

    let mut item = Item::from_shape(shape)
        .with_priority(ext_item.priority)
        .with_metadata(EXT_ID_KEY, ext_item.id.to_string());
    item.d_transf = d_transf;
    item.bin_id = ext_item.bin_id;
    item.fixed = ext_item.fixed;
    item.disallowed = ext_item.disallowed;
    Ok(item)
}

/// Points of an external polygon, without a closing vertex or consecutive duplicates
pub fn import_simple_polygon(sp: &ExtSPolygon) -> Vec<Point> {
    let mut points = sp.0.iter().map(|&(x, y)| Point(x, y)).collect_vec();
    //strip the last vertex if it closes the ring
    if points.len() > 1 && points[0] == points[points.len() - 1] {
        points.pop();
    }
    let n_before = points.len();
    points.dedup_by(|a, b| approx_eq!(f64, a.0, b.0) && approx_eq!(f64, a.1, b.1));
    if points.len() != n_before {
        warn!(
            "[IMPORT] {} consecutive duplicate vertices eliminated",
            n_before - points.len()
        );
    }
    points
}
