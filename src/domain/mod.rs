// Domain layer: the provisioning task model and the ports (interfaces) the core dispatches through.

pub mod model;
pub mod ports;
