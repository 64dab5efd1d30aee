//! Direct orders: a contractor orders from a subcontractor without bidding.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum DirectOrderStatus {
    Pending,
    Accepted,
    Declined,
    InProgress,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectOrderCreate {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub amount: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specialty_id: Option<Uuid>,
    pub subcontractor_company_id: Uuid,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct DirectOrderDecline {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decline_reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyBrief {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpecialtyBrief {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectOrderResponse {
    pub id: Uuid,
    pub contractor_company_id: Uuid,
    pub subcontractor_company_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub amount: i64,
    pub deadline: Option<NaiveDate>,
    pub specialty_id: Option<Uuid>,
    pub status: DirectOrderStatus,
    pub decline_reason: Option<String>,
    #[serde(default)]
    pub contractor_company: Option<CompanyBrief>,
    #[serde(default)]
    pub subcontractor_company: Option<CompanyBrief>,
    #[serde(default)]
    pub specialty: Option<SpecialtyBrief>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectOrderListResponse {
    pub items: Vec<DirectOrderResponse>,
    pub total: u64,
}
