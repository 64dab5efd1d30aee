//! Typed Backend API surface.
//!
//! Each resource is a short-lived borrow of an [`ApiClient`], so every call
//! goes through the authenticated pipeline:
//!
//! ```no_run
//! # async fn demo(client: otasuke_client::ApiClient) -> otasuke_client::Result<()> {
//! use otasuke_client::models::ProjectFilter;
//!
//! let page = client.projects().list(&ProjectFilter::default()).await?;
//! println!("{} projects", page.total);
//! # Ok(())
//! # }
//! ```

mod companies;
mod direct_orders;
mod notifications;
mod projects;
mod trade;

pub use companies::Companies;
pub use direct_orders::DirectOrders;
pub use notifications::{Dashboard, Notifications};
pub use projects::Projects;
pub use trade::{Orders, Quotes};

use crate::client::ApiClient;

impl ApiClient {
    pub fn projects(&self) -> Projects<'_> {
        Projects::new(self)
    }

    pub fn quotes(&self) -> Quotes<'_> {
        Quotes::new(self)
    }

    pub fn orders(&self) -> Orders<'_> {
        Orders::new(self)
    }

    pub fn companies(&self) -> Companies<'_> {
        Companies::new(self)
    }

    pub fn notifications(&self) -> Notifications<'_> {
        Notifications::new(self)
    }

    pub fn direct_orders(&self) -> DirectOrders<'_> {
        DirectOrders::new(self)
    }

    pub fn dashboard(&self) -> Dashboard<'_> {
        Dashboard::new(self)
    }
}
