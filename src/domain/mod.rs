// Domain layer: record set model and the ports (storage, pipeline) the stages talk through.

pub mod model;
pub mod ports;
