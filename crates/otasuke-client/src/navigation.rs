//! Login redirect on unrecoverable authentication failure.

use tracing::warn;

/// Default login entry point.
pub const DEFAULT_LOGIN_PATH: &str = "/login";

/// Receives the hard navigation to the login entry point.
///
/// Called exactly once per session teardown, after the credential store has
/// been cleared. Implementations should drop any in-memory session state they
/// hold: the next request runs as a guest.
pub trait Navigator: Send + Sync {
    fn redirect(&self, location: &str);
}

/// Navigator that only records the redirect in the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingNavigator;

impl Navigator for LoggingNavigator {
    fn redirect(&self, location: &str) {
        warn!(%location, "Session expired, login required");
    }
}

impl<F> Navigator for F
where
    F: Fn(&str) + Send + Sync,
{
    fn redirect(&self, location: &str) {
        self(location)
    }
}
