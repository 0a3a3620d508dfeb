// Domain layer: catalog and probe models plus the ports the engine depends on.

pub mod model;
pub mod ports;
