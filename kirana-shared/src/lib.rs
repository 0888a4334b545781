pub mod models;
pub mod pii;

pub use models::{GeoPoint, HubRecord, Lead, LeadStatus, OrderStatus, StockRequest};
pub use pii::MaskedPhone;
