//! Health check.

use serde::Serialize;
use tracing::warn;

use stockbook_db::{migrations, Database};

/// Body of `GET /health`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    /// "ok" or "degraded"
    pub status: &'static str,
    /// "connected" or "unavailable"
    pub database: &'static str,
    pub migrations: MigrationReport,
    pub version: &'static str,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct MigrationReport {
    pub total: usize,
    pub applied: usize,
}

impl HealthReport {
    pub fn is_healthy(&self) -> bool {
        self.status == "ok"
    }
}

#[derive(Debug, Clone)]
pub struct HealthService {
    db: Database,
}

impl HealthService {
    pub fn new(db: Database) -> Self {
        HealthService { db }
    }

    pub async fn check(&self) -> HealthReport {
        let connected = self.db.health_check().await;

        let (total, applied) = match migrations::migration_status(self.db.pool()).await {
            Ok(status) => status,
            Err(e) => {
                warn!(error = %e, "Could not read migration status");
                (0, 0)
            }
        };
        let healthy = connected && applied >= total;

        HealthReport {
            status: if healthy { "ok" } else { "degraded" },
            database: if connected { "connected" } else { "unavailable" },
            migrations: MigrationReport { total, applied },
            version: env!("CARGO_PKG_VERSION"),
        }
    }
}
