use uuid::Uuid;

use crate::client::{ApiClient, ApiRequest};
use crate::error::Result;
use crate::models::{
    OrderListResponse, OrderResponse, QuoteCreate, QuoteListResponse, QuoteResponse, ReviewCreate,
    ReviewResponse,
};
use crate::validation::Validate;

/// Quote endpoints.
pub struct Quotes<'a> {
    client: &'a ApiClient,
}

impl<'a> Quotes<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Quotes submitted by the signed-in subcontractor.
    pub async fn mine(&self) -> Result<QuoteListResponse> {
        self.client.get_json("/my-quotes").await
    }

    pub async fn submit(&self, project_id: Uuid, body: &QuoteCreate) -> Result<QuoteResponse> {
        body.validate()?;
        self.client
            .post_json(&format!("/projects/{project_id}/quotes"), body)
            .await
    }

    /// Accept a quote. The backend creates the corresponding order.
    pub async fn accept(&self, quote_id: Uuid) -> Result<QuoteResponse> {
        self.client
            .execute(ApiRequest::post(format!("/quotes/{quote_id}/accept")))
            .await
    }

    pub async fn reject(&self, quote_id: Uuid) -> Result<QuoteResponse> {
        self.client
            .execute(ApiRequest::post(format!("/quotes/{quote_id}/reject")))
            .await
    }
}

/// `/orders` endpoints.
pub struct Orders<'a> {
    client: &'a ApiClient,
}

impl<'a> Orders<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Result<OrderListResponse> {
        self.client.get_json("/orders").await
    }

    pub async fn get(&self, order_id: Uuid) -> Result<OrderResponse> {
        self.client.get_json(&format!("/orders/{order_id}")).await
    }

    pub async fn complete(&self, order_id: Uuid) -> Result<OrderResponse> {
        self.client
            .execute(ApiRequest::post(format!("/orders/{order_id}/complete")))
            .await
    }

    pub async fn review(&self, order_id: Uuid, body: &ReviewCreate) -> Result<ReviewResponse> {
        body.validate()?;
        self.client
            .post_json(&format!("/orders/{order_id}/reviews"), body)
            .await
    }
}
