pub mod gateway;
pub mod identity;
pub mod location;

pub use gateway::{DeclineReceipt, DispatchGateway, GatewayError, DECLINE_CONFIRMED_MESSAGE};
pub use identity::{IdentityStore, StaticIdentityStore, DEFAULT_IDENTITY};
pub use location::{FixedLocationResolver, LocationError, LocationResolver};
