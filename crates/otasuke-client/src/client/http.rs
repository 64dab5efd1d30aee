use std::{sync::OnceLock, time::Duration};

use tracing::debug;

use crate::config::ClientConfig;
use crate::error::{ApiError, Result};

pub fn install_rustls_provider() {
    static PROVIDER_INSTALLED: OnceLock<()> = OnceLock::new();
    PROVIDER_INSTALLED.get_or_init(|| {
        if let Err(e) = rustls::crypto::aws_lc_rs::default_provider().install_default() {
            // Safe to ignore: can happen if another crate installed it first.
            debug!(existing_provider = ?e, "rustls CryptoProvider already installed");
        }
    });
}

/// Build the `reqwest::Client` shared by regular requests and the refresh call.
pub fn build_http_client(config: &ClientConfig) -> Result<reqwest::Client> {
    install_rustls_provider();

    let mut builder = reqwest::Client::builder().user_agent(config.user_agent.as_str());

    if config.request_timeout > Duration::ZERO {
        builder = builder.timeout(config.request_timeout);
    }

    builder
        .build()
        .map_err(|e| ApiError::config(format!("Failed to create HTTP client: {e}")))
}
