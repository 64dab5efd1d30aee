use uuid::Uuid;

use crate::client::{ApiClient, ApiRequest};
use crate::error::Result;
use crate::models::{
    ProjectCreate, ProjectFilter, ProjectListResponse, ProjectResponse, ProjectStatus,
    ProjectStatusUpdate, ProjectUpdate, QuoteListResponse,
};
use crate::validation::Validate;

/// `/projects` endpoints.
pub struct Projects<'a> {
    client: &'a ApiClient,
}

impl<'a> Projects<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self, filter: &ProjectFilter) -> Result<ProjectListResponse> {
        let request = ApiRequest::get("/projects")
            .query_opt("status", filter.status)
            .query_opt("company_id", filter.company_id)
            .query_opt("specialty_id", filter.specialty_id)
            .query_opt("location", filter.location.as_deref())
            .query_opt("page", filter.page)
            .query_opt("per_page", filter.per_page);
        self.client.execute(request).await
    }

    pub async fn get(&self, project_id: Uuid) -> Result<ProjectResponse> {
        self.client
            .get_json(&format!("/projects/{project_id}"))
            .await
    }

    pub async fn create(&self, body: &ProjectCreate) -> Result<ProjectResponse> {
        body.validate()?;
        self.client.post_json("/projects", body).await
    }

    pub async fn update(&self, project_id: Uuid, body: &ProjectUpdate) -> Result<ProjectResponse> {
        body.validate()?;
        self.client
            .patch_json(&format!("/projects/{project_id}"), body)
            .await
    }

    pub async fn update_status(
        &self,
        project_id: Uuid,
        status: ProjectStatus,
    ) -> Result<ProjectResponse> {
        self.client
            .patch_json(
                &format!("/projects/{project_id}/status"),
                &ProjectStatusUpdate { status },
            )
            .await
    }

    /// Quotes submitted against a project (owner only).
    pub async fn quotes(&self, project_id: Uuid) -> Result<QuoteListResponse> {
        self.client
            .get_json(&format!("/projects/{project_id}/quotes"))
            .await
    }
}
