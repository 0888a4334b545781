use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use kirana_core::{DeclineReceipt, DispatchGateway, GatewayError};
use kirana_shared::{GeoPoint, HubRecord, Lead, LeadStatus, OrderStatus, StockRequest};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// `DispatchGateway` over the dispatch backend's REST endpoints.
///
/// One client with a hard timeout bounds every call; a timeout surfaces as
/// a transport failure like any other incomplete call.
pub struct HttpDispatchGateway {
    client: reqwest::Client,
    base_url: String,
}

impl HttpDispatchGateway {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GatewayError::Transport(format!("http client build failed: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn post_json<B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<reqwest::Response, GatewayError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| GatewayError::Transport(format!("{path}: {e}")))?;

        // A non-2xx leaves the call's effect unknown; callers treat it
        // exactly like a call that never completed.
        if !response.status().is_success() {
            return Err(GatewayError::Transport(format!(
                "{path}: status {}",
                response.status()
            )));
        }
        Ok(response)
    }
}

// ============================================================================
// Wire rows - the backend's mixed-case field names
// ============================================================================

#[derive(Debug, Deserialize)]
struct LeadRow {
    #[serde(rename = "OrderID")]
    order_id: String,
    #[serde(rename = "CustomerName", default)]
    customer_name: String,
    #[serde(rename = "ServiceName", default)]
    service_name: String,
    #[serde(rename = "Price", default)]
    price: i32,
    #[serde(rename = "Address", default)]
    address: String,
    #[serde(rename = "Slot", default)]
    slot: Option<String>,
    #[serde(rename = "VendorPhone", default)]
    vendor_phone: String,
}

impl LeadRow {
    fn into_lead(self) -> Lead {
        Lead {
            id: self.order_id,
            customer_name: self.customer_name,
            service_name: self.service_name,
            price: self.price,
            address: self.address,
            slot: self.slot,
            vendor_key: self.vendor_phone,
            received_at: Utc::now(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ShowLeadsBody<'a> {
    #[serde(rename = "VendorPhone")]
    vendor_phone: &'a str,
    #[serde(rename = "Status")]
    status: LeadStatus,
}

#[derive(Debug, Serialize)]
struct LeadActionBody<'a> {
    #[serde(rename = "OrderID")]
    order_id: &'a str,
    #[serde(rename = "VendorPhone")]
    vendor_phone: &'a str,
}

#[derive(Debug, Serialize)]
struct UpdateStatusBody<'a> {
    #[serde(rename = "OrderID")]
    order_id: &'a str,
    #[serde(rename = "Status")]
    status: OrderStatus,
    #[serde(rename = "VendorPhone")]
    vendor_phone: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessageRow {
    message: String,
}

#[derive(Debug, Serialize)]
struct NearbyBody<'a> {
    #[serde(rename = "ProductName")]
    product_name: &'a str,
    lat: f64,
    lon: f64,
}

#[derive(Debug, Deserialize)]
struct HubRow {
    #[serde(rename = "LoginID")]
    login_id: String,
    // lower-case h in the deployed backend's row
    #[serde(rename = "hubName", default)]
    hub_name: String,
    #[serde(rename = "Location", default)]
    location: String,
    #[serde(rename = "DistanceKm", default)]
    distance_km: f64,
    #[serde(rename = "InventoryID", default)]
    inventory_id: String,
    #[serde(rename = "ProductName", default)]
    product_name: String,
    #[serde(rename = "Quantity", default)]
    quantity: i32,
}

impl HubRow {
    fn into_hub(self) -> HubRecord {
        HubRecord {
            login_id: self.login_id,
            hub_name: self.hub_name,
            location: self.location,
            distance_km: self.distance_km,
            inventory_id: self.inventory_id,
            product_name: self.product_name,
            quantity: self.quantity,
        }
    }
}

#[derive(Debug, Serialize)]
struct StockRequestBody<'a> {
    #[serde(rename = "HubLoginID")]
    hub_login_id: &'a str,
    #[serde(rename = "VendorPhone")]
    vendor_phone: &'a str,
    #[serde(rename = "itemID")]
    item_id: &'a str,
    #[serde(rename = "itemName")]
    item_name: &'a str,
    #[serde(rename = "itemQTY")]
    quantity: i32,
}

// ============================================================================
// Gateway implementation
// ============================================================================

#[async_trait]
impl DispatchGateway for HttpDispatchGateway {
    async fn fetch_pending_lead(
        &self,
        vendor: &str,
        status: LeadStatus,
    ) -> Result<Option<Lead>, GatewayError> {
        let response = self
            .post_json(
                "/order/showleads",
                &ShowLeadsBody {
                    vendor_phone: vendor,
                    status,
                },
            )
            .await?;

        let rows: Vec<LeadRow> = response
            .json()
            .await
            .map_err(|e| GatewayError::Unconfirmed(format!("showleads: {e}")))?;
        debug!("{} pending leads on the backend", rows.len());

        Ok(rows.into_iter().next().map(LeadRow::into_lead))
    }

    async fn accept_lead(&self, lead_id: &str, vendor: &str) -> Result<(), GatewayError> {
        self.post_json(
            "/order/acceptleads",
            &LeadActionBody {
                order_id: lead_id,
                vendor_phone: vendor,
            },
        )
        .await?;
        Ok(())
    }

    async fn decline_lead(
        &self,
        lead_id: &str,
        vendor: &str,
    ) -> Result<DeclineReceipt, GatewayError> {
        let response = self
            .post_json(
                "/order/declineleads",
                &LeadActionBody {
                    order_id: lead_id,
                    vendor_phone: vendor,
                },
            )
            .await?;

        let row: MessageRow = response
            .json()
            .await
            .map_err(|e| GatewayError::Unconfirmed(format!("declineleads: {e}")))?;
        Ok(DeclineReceipt::new(row.message))
    }

    async fn update_order_status(
        &self,
        lead_id: &str,
        status: OrderStatus,
        vendor: &str,
    ) -> Result<(), GatewayError> {
        self.post_json(
            "/order/updateorderstatus",
            &UpdateStatusBody {
                order_id: lead_id,
                status,
                vendor_phone: vendor,
            },
        )
        .await?;
        Ok(())
    }

    async fn query_nearby(
        &self,
        product_term: &str,
        origin: GeoPoint,
    ) -> Result<Vec<HubRecord>, GatewayError> {
        let response = self
            .post_json(
                "/order/nearby",
                &NearbyBody {
                    product_name: product_term,
                    lat: origin.lat,
                    lon: origin.lon,
                },
            )
            .await?;

        let rows: Vec<HubRow> = response
            .json()
            .await
            .map_err(|e| GatewayError::Unconfirmed(format!("nearby: {e}")))?;

        Ok(rows.into_iter().map(HubRow::into_hub).collect())
    }

    async fn create_stock_request(&self, request: &StockRequest) -> Result<(), GatewayError> {
        self.post_json(
            "/order/inserthubrequest",
            &StockRequestBody {
                hub_login_id: &request.hub_login_id,
                vendor_phone: &request.requester_phone,
                item_id: &request.item_id,
                item_name: &request.item_name,
                quantity: request.quantity,
            },
        )
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    fn gateway_for(server: &mockito::ServerGuard) -> HttpDispatchGateway {
        HttpDispatchGateway::new(&server.url(), Duration::from_secs(2)).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_pending_lead_takes_first_row() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/order/showleads")
            .match_body(Matcher::Json(json!({
                "VendorPhone": "7776665555",
                "Status": "Pending",
            })))
            .with_status(200)
            .with_body(
                json!([
                    {
                        "OrderID": "O1",
                        "CustomerName": "Asha",
                        "ServiceName": "Plumbing",
                        "Price": 100,
                        "Address": "12 MG Road",
                        "VendorPhone": "7776665555",
                    },
                    { "OrderID": "O2" }
                ])
                .to_string(),
            )
            .create_async()
            .await;

        let lead = gateway_for(&server)
            .fetch_pending_lead("7776665555", LeadStatus::Pending)
            .await
            .unwrap()
            .unwrap();

        mock.assert_async().await;
        assert_eq!(lead.id, "O1");
        assert_eq!(lead.customer_name, "Asha");
        assert_eq!(lead.price, 100);
        assert!(lead.slot.is_none());
    }

    #[tokio::test]
    async fn test_fetch_pending_lead_empty_is_none() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/order/showleads")
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;

        let lead = gateway_for(&server)
            .fetch_pending_lead("7776665555", LeadStatus::Pending)
            .await
            .unwrap();

        assert!(lead.is_none());
    }

    #[tokio::test]
    async fn test_decline_passes_backend_message_through() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/order/declineleads")
            .match_body(Matcher::Json(json!({
                "OrderID": "O1",
                "VendorPhone": "7776665555",
            })))
            .with_status(200)
            .with_body(json!({ "message": "Lead Declined Successfully" }).to_string())
            .create_async()
            .await;

        let receipt = gateway_for(&server)
            .decline_lead("O1", "7776665555")
            .await
            .unwrap();

        assert!(receipt.confirms());
    }

    #[tokio::test]
    async fn test_non_2xx_is_transport_failure() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/order/acceptleads")
            .with_status(500)
            .create_async()
            .await;

        let result = gateway_for(&server).accept_lead("O1", "7776665555").await;
        assert!(matches!(result, Err(GatewayError::Transport(_))));
    }

    #[tokio::test]
    async fn test_malformed_body_is_unconfirmed() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/order/declineleads")
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let result = gateway_for(&server).decline_lead("O1", "7776665555").await;
        assert!(matches!(result, Err(GatewayError::Unconfirmed(_))));
    }

    #[tokio::test]
    async fn test_update_order_status_sends_backend_words() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/order/updateorderstatus")
            .match_body(Matcher::Json(json!({
                "OrderID": "O2",
                "Status": "Done",
                "VendorPhone": "7776665555",
            })))
            .with_status(200)
            .create_async()
            .await;

        gateway_for(&server)
            .update_order_status("O2", OrderStatus::Done, "7776665555")
            .await
            .unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_query_nearby_maps_rows() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/order/nearby")
            .match_body(Matcher::Json(json!({
                "ProductName": "rice",
                "lat": 28.6139,
                "lon": 77.209,
            })))
            .with_status(200)
            .with_body(
                json!([
                    {
                        "LoginID": "hub-7",
                        "hubName": "Sharma Stores",
                        "Location": "Karol Bagh",
                        "DistanceKm": 1.2,
                        "InventoryID": "inv-42",
                        "ProductName": "rice",
                        "Quantity": 25,
                    }
                ])
                .to_string(),
            )
            .create_async()
            .await;

        let hubs = gateway_for(&server)
            .query_nearby("rice", GeoPoint::DEFAULT)
            .await
            .unwrap();

        assert_eq!(hubs.len(), 1);
        assert_eq!(hubs[0].login_id, "hub-7");
        assert_eq!(hubs[0].hub_name, "Sharma Stores");
        assert_eq!(hubs[0].quantity, 25);
    }

    #[tokio::test]
    async fn test_stock_request_wire_shape() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/order/inserthubrequest")
            .match_body(Matcher::Json(json!({
                "HubLoginID": "hub-7",
                "VendorPhone": "8881112222",
                "itemID": "inv-42",
                "itemName": "rice",
                "itemQTY": 25,
            })))
            .with_status(200)
            .create_async()
            .await;

        let request = StockRequest {
            hub_login_id: "hub-7".to_string(),
            requester_phone: "8881112222".to_string(),
            item_id: "inv-42".to_string(),
            item_name: "rice".to_string(),
            quantity: 25,
        };
        gateway_for(&server)
            .create_stock_request(&request)
            .await
            .unwrap();

        mock.assert_async().await;
    }
}
