pub mod api;
pub mod collector;
pub mod model;

pub use api::{Error, Fronius, InverterApi};
pub use collector::Collector;
