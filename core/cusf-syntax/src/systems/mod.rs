pub mod relations;
pub mod yields;
