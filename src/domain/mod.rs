// Domain layer: catalog, scenario model, pass results and ports (interfaces).

pub mod catalog;
pub mod model;
pub mod outcome;
pub mod ports;
pub mod scenario;
