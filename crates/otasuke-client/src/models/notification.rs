//! Notifications and dashboard summaries.

use chrono::{DateTime, Utc};
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
pub enum NotificationType {
    QuoteReceived,
    QuoteAccepted,
    QuoteRejected,
    OrderConfirmed,
    OrderCompleted,
    ReviewReceived,
    ProjectUpdated,
    DirectOrderReceived,
    DirectOrderAccepted,
    DirectOrderDeclined,
    DirectOrderCompleted,
    DirectOrderCancelled,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    #[serde(rename = "type")]
    pub kind: NotificationType,
    pub title: String,
    pub message: Option<String>,
    pub is_read: bool,
    pub reference_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationListResponse {
    pub items: Vec<NotificationResponse>,
    pub total: u64,
    pub unread_count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractorDashboard {
    pub total_projects: u64,
    pub open_projects: u64,
    pub in_progress_projects: u64,
    pub completed_projects: u64,
    pub total_orders: u64,
    pub pending_quotes: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubcontractorDashboard {
    pub total_quotes: u64,
    pub accepted_quotes: u64,
    pub active_orders: u64,
    pub completed_orders: u64,
    pub average_rating: Option<f64>,
}
