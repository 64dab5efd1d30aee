use uuid::Uuid;

use crate::client::{ApiClient, ApiRequest};
use crate::error::Result;
use crate::models::{
    DirectOrderCreate, DirectOrderDecline, DirectOrderListResponse, DirectOrderResponse,
    DirectOrderStatus,
};
use crate::validation::Validate;

/// `/direct-orders` endpoints.
pub struct DirectOrders<'a> {
    client: &'a ApiClient,
}

impl<'a> DirectOrders<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self, status: Option<DirectOrderStatus>) -> Result<DirectOrderListResponse> {
        self.client
            .execute(ApiRequest::get("/direct-orders").query_opt("status", status))
            .await
    }

    pub async fn get(&self, id: Uuid) -> Result<DirectOrderResponse> {
        self.client.get_json(&format!("/direct-orders/{id}")).await
    }

    pub async fn create(&self, body: &DirectOrderCreate) -> Result<DirectOrderResponse> {
        body.validate()?;
        self.client.post_json("/direct-orders", body).await
    }

    pub async fn accept(&self, id: Uuid) -> Result<DirectOrderResponse> {
        self.transition(id, "accept").await
    }

    pub async fn decline(&self, id: Uuid, reason: Option<String>) -> Result<DirectOrderResponse> {
        self.client
            .post_json(
                &format!("/direct-orders/{id}/decline"),
                &DirectOrderDecline {
                    decline_reason: reason,
                },
            )
            .await
    }

    pub async fn start(&self, id: Uuid) -> Result<DirectOrderResponse> {
        self.transition(id, "start").await
    }

    pub async fn complete(&self, id: Uuid) -> Result<DirectOrderResponse> {
        self.transition(id, "complete").await
    }

    pub async fn cancel(&self, id: Uuid) -> Result<DirectOrderResponse> {
        self.transition(id, "cancel").await
    }

    async fn transition(&self, id: Uuid, action: &str) -> Result<DirectOrderResponse> {
        self.client
            .execute(ApiRequest::post(format!("/direct-orders/{id}/{action}")))
            .await
    }
}
