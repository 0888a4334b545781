pub mod poller;
pub mod stock;

pub use poller::{PollerConfig, ProximityPoller};
pub use stock::StockRequester;
