use async_trait::async_trait;
use kirana_shared::{GeoPoint, HubRecord, Lead, LeadStatus, OrderStatus, StockRequest};

/// Exact confirmation message the deployed backend returns for a decline.
/// Any other wording means the decline cannot be treated as confirmed.
/// `DeclineReceipt::confirms` is the single place that knows this literal.
pub const DECLINE_CONFIRMED_MESSAGE: &str = "Lead Declined Successfully";

/// Free-text acknowledgement returned by the decline endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclineReceipt {
    pub message: String,
}

impl DeclineReceipt {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Whether the backend confirmed the decline.
    pub fn confirms(&self) -> bool {
        self.message == DECLINE_CONFIRMED_MESSAGE
    }
}

/// Remote-call failure taxonomy.
///
/// An empty read result is not an error; it surfaces as `None` or an empty
/// list on the operation itself. An intent arriving for a lead that is no
/// longer live is not an error either - sessions absorb it as a no-op.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// The call did not complete (connect failure, timeout, non-2xx).
    #[error("transport failure: {0}")]
    Transport(String),

    /// The call completed but the response did not match the expected
    /// success shape.
    #[error("unconfirmed response: {0}")]
    Unconfirmed(String),
}

/// Remote operations of the dispatch backend.
///
/// Reads are idempotent. Writes are intended at-most-once: callers never
/// retry them, because a write of unknown prior effect could duplicate a
/// side effect already applied on the backend.
#[async_trait]
pub trait DispatchGateway: Send + Sync {
    /// Zero-or-one pending lead for the vendor. `None` is a valid empty
    /// state, not a failure.
    async fn fetch_pending_lead(
        &self,
        vendor: &str,
        status: LeadStatus,
    ) -> Result<Option<Lead>, GatewayError>;

    async fn accept_lead(&self, lead_id: &str, vendor: &str) -> Result<(), GatewayError>;

    async fn decline_lead(
        &self,
        lead_id: &str,
        vendor: &str,
    ) -> Result<DeclineReceipt, GatewayError>;

    async fn update_order_status(
        &self,
        lead_id: &str,
        status: OrderStatus,
        vendor: &str,
    ) -> Result<(), GatewayError>;

    /// Hubs carrying the product near the origin, closest first. An empty
    /// list is a valid result.
    async fn query_nearby(
        &self,
        product_term: &str,
        origin: GeoPoint,
    ) -> Result<Vec<HubRecord>, GatewayError>;

    async fn create_stock_request(&self, request: &StockRequest) -> Result<(), GatewayError>;
}
