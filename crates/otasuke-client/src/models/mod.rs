//! Backend API payloads.

mod auth;
mod company;
mod direct_order;
mod notification;
mod project;
mod trade;

pub(crate) use auth::RefreshTokenRequest;
pub use auth::{LoginRequest, RegisterRequest, TokenResponse, UserResponse, UserRole};
pub use company::{
    CompanyCreate, CompanyResponse, CompanySpecialtiesUpdate, CompanyUpdate, SpecialtyResponse,
    SubcontractorFilter, SubcontractorListResponse,
};
pub use direct_order::{
    CompanyBrief, DirectOrderCreate, DirectOrderDecline, DirectOrderListResponse,
    DirectOrderResponse, DirectOrderStatus, SpecialtyBrief,
};
pub use notification::{
    ContractorDashboard, NotificationListResponse, NotificationResponse, NotificationType,
    SubcontractorDashboard,
};
pub use project::{
    ProjectCreate, ProjectFileResponse, ProjectFilter, ProjectListResponse, ProjectResponse,
    ProjectStatus, ProjectStatusUpdate, ProjectUpdate,
};
pub use trade::{
    OrderListResponse, OrderResponse, OrderStatus, QuoteCreate, QuoteListResponse, QuoteResponse,
    QuoteStatus, ReviewCreate, ReviewListResponse, ReviewResponse,
};
