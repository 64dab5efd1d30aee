use uuid::Uuid;

use crate::client::{ApiClient, ApiRequest};
use crate::error::Result;
use crate::models::{ContractorDashboard, NotificationListResponse, SubcontractorDashboard};

/// `/notifications` endpoints.
pub struct Notifications<'a> {
    client: &'a ApiClient,
}

impl<'a> Notifications<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self, unread_only: bool) -> Result<NotificationListResponse> {
        self.client
            .execute(ApiRequest::get("/notifications").query("unread_only", unread_only))
            .await
    }

    pub async fn mark_read(&self, notification_id: Uuid) -> Result<()> {
        self.client
            .execute_unit(ApiRequest::post(format!(
                "/notifications/{notification_id}/read"
            )))
            .await
    }

    pub async fn mark_all_read(&self) -> Result<()> {
        self.client
            .execute_unit(ApiRequest::post("/notifications/read-all"))
            .await
    }
}

/// `/dashboard` endpoints.
pub struct Dashboard<'a> {
    client: &'a ApiClient,
}

impl<'a> Dashboard<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn contractor(&self) -> Result<ContractorDashboard> {
        self.client.get_json("/dashboard/contractor").await
    }

    pub async fn subcontractor(&self) -> Result<SubcontractorDashboard> {
        self.client.get_json("/dashboard/subcontractor").await
    }
}
