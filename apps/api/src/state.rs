//! Shared application state.

use std::sync::Arc;

use stockbook_db::Database;

use crate::clock::Clock;
use crate::config::ApiConfig;
use crate::mailer::OtpNotifier;
use crate::otp_cache::{InMemoryOtpCache, OtpCache};
use crate::services::{AuthService, HealthService};

/// State handed to every handler. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub auth: AuthService,
    pub health: HealthService,
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    /// Wires the services around an open database.
    ///
    /// The OTP cache is process-local; see [`InMemoryOtpCache`].
    pub fn new(
        config: &ApiConfig,
        db: Database,
        notifier: Arc<dyn OtpNotifier>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let otp_cache: Arc<dyn OtpCache> = Arc::new(InMemoryOtpCache::new());
        let auth = AuthService::new(
            db.clone(),
            otp_cache,
            notifier,
            clock.clone(),
            config.otp_ttl(),
        );

        AppState {
            health: HealthService::new(db.clone()),
            db,
            auth,
            clock,
        }
    }
}
