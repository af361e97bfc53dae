// Domain layer: models and ports. Concrete sites, caches and stores live under adapters.

pub mod model;
pub mod ports;
