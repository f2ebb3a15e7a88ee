//! Admin authentication and account management.
//!
//! ## OTP Login
//! ```text
//! POST /login-with-otp {email, password}
//!   ├─ unknown email / wrong password ──► {status: "invalid"}
//!   └─ ok ──► issue code (overwrites pending) ──► email it ──► {status: "otp-sent"}
//!                                                   │
//!                                                   └─ send fails ──► discard this code, 500
//!
//! POST /verify-login-otp {email, otp}
//!   └─ OtpCache::redeem ──► success | error | expired | invalid
//! ```

use std::sync::Arc;

use chrono::Duration;
use rand::Rng;
use tracing::{error, info, warn};

use stockbook_core::auth::{LegacyLoginOutcome, OtpRecord, OtpRequestOutcome, OtpVerification};
use stockbook_core::{
    validation, AdminAccount, Credentials, ProfileUpdate, Registration, OTP_CODE_MAX,
    OTP_CODE_MIN,
};
use stockbook_db::{Database, DbError};

use crate::clock::Clock;
use crate::error::{ApiError, ApiResult, ErrorCode};
use crate::mailer::OtpNotifier;
use crate::otp_cache::OtpCache;
use crate::password::{hash_password, verify_password};

/// Authentication service.
#[derive(Clone)]
pub struct AuthService {
    db: Database,
    otp_cache: Arc<dyn OtpCache>,
    notifier: Arc<dyn OtpNotifier>,
    clock: Arc<dyn Clock>,
    otp_ttl: Duration,
}

impl AuthService {
    pub fn new(
        db: Database,
        otp_cache: Arc<dyn OtpCache>,
        notifier: Arc<dyn OtpNotifier>,
        clock: Arc<dyn Clock>,
        otp_ttl: Duration,
    ) -> Self {
        AuthService {
            db,
            otp_cache,
            notifier,
            clock,
            otp_ttl,
        }
    }

    /// Looks up the account and checks its password.
    ///
    /// `Ok(None)` when the email is unknown.
    async fn check_credentials(&self, credentials: &Credentials) -> ApiResult<Option<bool>> {
        let Some(account) = self.db.admins().find_by_email(&credentials.email).await? else {
            return Ok(None);
        };
        Ok(Some(
            verify_password(&credentials.password, &account.password_hash).await,
        ))
    }

    /// First login step: password check, then a fresh code by email.
    pub async fn request_otp(&self, credentials: &Credentials) -> ApiResult<OtpRequestOutcome> {
        match self.check_credentials(credentials).await? {
            Some(true) => {}
            Some(false) | None => {
                warn!(email = %credentials.email, "OTP login rejected");
                return Ok(OtpRequestOutcome::Invalid);
            }
        }

        let code = rand::rng()
            .random_range(OTP_CODE_MIN..=OTP_CODE_MAX)
            .to_string();
        let record = OtpRecord::issue(code.clone(), self.clock.now(), self.otp_ttl);
        self.otp_cache.issue(&credentials.email, record).await;

        if let Err(e) = self
            .notifier
            .send_otp(&credentials.email, &code, self.ttl_minutes())
            .await
        {
            self.otp_cache.discard_if(&credentials.email, &code).await;
            error!(email = %credentials.email, error = %e, "Failed to deliver OTP");
            return Err(ApiError::new(
                ErrorCode::InternalError,
                "Failed to send OTP email",
            ));
        }

        info!(email = %credentials.email, "OTP issued");
        Ok(OtpRequestOutcome::OtpSent)
    }

    /// Second login step.
    pub async fn verify_otp(&self, email: &str, otp: &str) -> OtpVerification {
        let outcome = self.otp_cache.redeem(email, otp, self.clock.now()).await;
        match outcome {
            OtpVerification::Success => info!(email = %email, "OTP login succeeded"),
            other => warn!(email = %email, status = other.status(), "OTP verification failed"),
        }
        outcome
    }

    /// Single-step password login.
    pub async fn legacy_login(&self, credentials: &Credentials) -> ApiResult<LegacyLoginOutcome> {
        let outcome = match self.check_credentials(credentials).await? {
            Some(true) => LegacyLoginOutcome::Success,
            Some(false) => LegacyLoginOutcome::IncorrectPassword,
            None => LegacyLoginOutcome::NoRecord,
        };
        if outcome != LegacyLoginOutcome::Success {
            warn!(email = %credentials.email, "Password login rejected");
        }
        Ok(outcome)
    }

    /// Creates an account. A taken email fails on the unique constraint.
    pub async fn register(&self, registration: &Registration) -> ApiResult<AdminAccount> {
        registration.validate()?;

        let hash = hash_password(&registration.password)
            .await
            .map_err(ApiError::internal)?;
        let account = self
            .db
            .admins()
            .insert(registration.name.trim(), &registration.email, &hash)
            .await?;

        info!(email = %account.email, "Admin account registered");
        Ok(account)
    }

    /// Updates name and, when supplied, password.
    ///
    /// `Ok(None)` when no account has this email.
    pub async fn update_profile(&self, update: &ProfileUpdate) -> ApiResult<Option<AdminAccount>> {
        validation::validate_person_name(&update.name)?;

        let hash = match update.new_password() {
            Some(password) => Some(hash_password(password).await.map_err(ApiError::internal)?),
            None => None,
        };

        match self
            .db
            .admins()
            .update_profile(&update.email, update.name.trim(), hash.as_deref())
            .await
        {
            Ok(account) => {
                info!(
                    email = %account.email,
                    password_changed = hash.is_some(),
                    "Admin profile updated"
                );
                Ok(Some(account))
            }
            Err(DbError::NotFound { .. }) => {
                warn!(email = %update.email, "Profile update for unknown account");
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// OTP lifetime in whole minutes, rounded up, as quoted in the email.
    fn ttl_minutes(&self) -> i64 {
        (self.otp_ttl.num_seconds() + 59) / 60
    }
}
