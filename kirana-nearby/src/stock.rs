use std::sync::Arc;

use kirana_core::{DispatchGateway, GatewayError, IdentityStore};
use kirana_shared::{HubRecord, StockRequest};
use tracing::info;

/// One-shot stock request from a requester to a selected hub.
///
/// Success or failure is reported to the caller directly; nothing is
/// retried and the proximity poller's schedule and results are untouched.
pub struct StockRequester {
    gateway: Arc<dyn DispatchGateway>,
    identity: Arc<dyn IdentityStore>,
}

impl StockRequester {
    pub fn new(gateway: Arc<dyn DispatchGateway>, identity: Arc<dyn IdentityStore>) -> Self {
        Self { gateway, identity }
    }

    pub async fn request_from_hub(&self, hub: &HubRecord) -> Result<(), GatewayError> {
        let request = StockRequest::for_hub(hub, self.identity.identity_or_default());
        self.gateway.create_stock_request(&request).await?;
        info!(
            "stock request for {} sent to {}",
            request.item_name, hub.hub_name
        );
        Ok(())
    }
}
