use nest2d::NestConfig;
use nest2d::io::ext_repr::{ExtInstance, ExtSolution};
use serde::{Deserialize, Serialize};

/// Everything needed to reproduce a run: the instance, its solution and the config used
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "PascalCase")]
pub struct NestOutput {
    #[serde(flatten)]
    pub instance: ExtInstance,
    pub solution: ExtSolution,
    pub config: NestConfig,
}
