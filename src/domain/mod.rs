// Domain layer: records, collections and the ports the adapters implement.

pub mod model;
pub mod ports;
