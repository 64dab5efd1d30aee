use uuid::Uuid;

use crate::client::{ApiClient, ApiRequest};
use crate::error::Result;
use crate::models::{
    CompanyCreate, CompanyResponse, CompanySpecialtiesUpdate, CompanyUpdate, ReviewListResponse,
    SpecialtyResponse, SubcontractorFilter, SubcontractorListResponse,
};

/// `/companies` endpoints.
pub struct Companies<'a> {
    client: &'a ApiClient,
}

impl<'a> Companies<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn specialties(&self) -> Result<Vec<SpecialtyResponse>> {
        self.client.get_json("/companies/specialties").await
    }

    pub async fn get(&self, company_id: Uuid) -> Result<CompanyResponse> {
        self.client
            .get_json(&format!("/companies/{company_id}"))
            .await
    }

    /// The signed-in user's company, or `None` if it has not been created yet.
    pub async fn mine(&self) -> Result<Option<CompanyResponse>> {
        match self.client.get_json("/companies/me").await {
            Ok(company) => Ok(Some(company)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub async fn create(&self, body: &CompanyCreate) -> Result<CompanyResponse> {
        self.client.post_json("/companies/me", body).await
    }

    pub async fn update(&self, body: &CompanyUpdate) -> Result<CompanyResponse> {
        self.client.patch_json("/companies/me", body).await
    }

    /// Replace the signed-in company's specialties.
    pub async fn set_specialties(&self, specialty_ids: Vec<Uuid>) -> Result<CompanyResponse> {
        self.client
            .put_json(
                "/companies/me/specialties",
                &CompanySpecialtiesUpdate { specialty_ids },
            )
            .await
    }

    pub async fn reviews(&self, company_id: Uuid) -> Result<ReviewListResponse> {
        self.client
            .get_json(&format!("/companies/{company_id}/reviews"))
            .await
    }

    pub async fn subcontractors(
        &self,
        filter: &SubcontractorFilter,
    ) -> Result<SubcontractorListResponse> {
        let request = ApiRequest::get("/companies/subcontractors")
            .query_opt("specialty_id", filter.specialty_id)
            .query_opt("keyword", filter.keyword.as_deref())
            .query_opt("location", filter.location.as_deref())
            .query_opt("min_rating", filter.min_rating)
            .query_opt("page", filter.page)
            .query_opt("per_page", filter.per_page);
        self.client.execute(request).await
    }
}
