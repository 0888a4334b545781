use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lead status as the backend understands it. Serialized variant names are
/// the backend's exact words ("Pending", "Accepted", "Declined").
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum LeadStatus {
    Pending,
    Accepted,
    Declined,
}

/// Order progress reported back on the accept path.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum OrderStatus {
    Pending,
    Done,
    Cancelled,
}

/// A dispatch-originated order lead awaiting one vendor's decision.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Lead {
    pub id: String,
    pub customer_name: String,
    pub service_name: String,
    pub price: i32,
    pub address: String,
    pub slot: Option<String>,
    pub vendor_key: String,
    /// When this client first saw the lead.
    pub received_at: DateTime<Utc>,
}

/// A nearby stock hub returned by a proximity query. Value equality is what
/// downstream refresh suppression compares.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HubRecord {
    pub login_id: String,
    pub hub_name: String,
    pub location: String,
    pub distance_km: f64,
    pub inventory_id: String,
    pub product_name: String,
    pub quantity: i32,
}

/// A geographic coordinate.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    /// Fallback origin used when position resolution is denied or
    /// unavailable.
    pub const DEFAULT: GeoPoint = GeoPoint {
        lat: 28.6139,
        lon: 77.2090,
    };
}

/// One stock replenishment request from a requester to a hub.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StockRequest {
    pub hub_login_id: String,
    pub requester_phone: String,
    pub item_id: String,
    pub item_name: String,
    pub quantity: i32,
}

impl StockRequest {
    /// Build a request for the item a hub row advertises.
    pub fn for_hub(hub: &HubRecord, requester_phone: impl Into<String>) -> Self {
        Self {
            hub_login_id: hub.login_id.clone(),
            requester_phone: requester_phone.into(),
            item_id: hub.inventory_id.clone(),
            item_name: hub.product_name.clone(),
            quantity: hub.quantity,
        }
    }
}
