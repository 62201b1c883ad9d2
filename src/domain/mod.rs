// Domain layer: wire models and the transport port. No HTTP client types here.

pub mod model;
pub mod ports;
