//! # Authentication Rules
//!
//! The two-step login (password, then emailed one-time code) as pure
//! functions. Storage of pending codes, randomness and email delivery live in
//! `apps/api`; this module only decides outcomes.
//!
//! ## Login State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  AwaitingCredentials ──password ok──► AwaitingOtp ──code ok──► Authed   │
//! │          │                              │   │                           │
//! │          │ bad email / bad password     │   │ now > expiresAt           │
//! │          ▼                              │   ▼                           │
//! │      "invalid"                          │ "expired" (record dropped)    │
//! │                                         │                               │
//! │                                         │ wrong code                    │
//! │                                         ▼                               │
//! │                                     "invalid" (record kept, retry)      │
//! │                                                                         │
//! │  A new password step overwrites any pending record for that email.     │
//! │  A verify with no pending record answers "error" / "OTP not sent".     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Duration, Utc};
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

// =============================================================================
// OTP Record
// =============================================================================

/// A pending one-time code for a single email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtpRecord {
    pub code: String,
    pub expires_at: DateTime<Utc>,
}

impl OtpRecord {
    /// Creates a record that expires `ttl` after `now`.
    pub fn issue(code: impl Into<String>, now: DateTime<Utc>, ttl: Duration) -> Self {
        OtpRecord {
            code: code.into(),
            expires_at: now + ttl,
        }
    }

    /// True once `now` is strictly past the expiry instant.
    #[inline]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

// =============================================================================
// Verification
// =============================================================================

/// Result of checking a submitted code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtpVerification {
    Success,
    /// No pending record for this email.
    NotSent,
    Expired,
    /// Code did not match; the record stays live.
    Invalid,
}

impl OtpVerification {
    /// Wire value of the `status` field.
    pub fn status(&self) -> &'static str {
        match self {
            OtpVerification::Success => "success",
            OtpVerification::NotSent => "error",
            OtpVerification::Expired => "expired",
            OtpVerification::Invalid => "invalid",
        }
    }

    /// Human-readable message, absent on success.
    pub fn message(&self) -> Option<&'static str> {
        match self {
            OtpVerification::Success => None,
            OtpVerification::NotSent => Some("OTP not sent"),
            OtpVerification::Expired => Some("OTP expired"),
            OtpVerification::Invalid => Some("Invalid OTP"),
        }
    }

    /// Whether the pending record must be removed after this outcome.
    ///
    /// A used or expired code is never accepted again.
    pub fn consumes_record(&self) -> bool {
        matches!(self, OtpVerification::Success | OtpVerification::Expired)
    }
}

impl Serialize for OtpVerification {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let message = self.message();
        let len = if message.is_some() { 2 } else { 1 };
        let mut state = serializer.serialize_struct("OtpVerification", len)?;
        state.serialize_field("status", self.status())?;
        if let Some(message) = message {
            state.serialize_field("message", message)?;
        }
        state.end()
    }
}

/// Decides the outcome of a verify attempt.
///
/// ## Order of Checks
/// 1. No record → `NotSent`
/// 2. Expired → `Expired` (checked before the code, so a correct but stale
///    code never succeeds)
/// 3. Mismatch → `Invalid`
/// 4. Otherwise → `Success`
///
/// Surrounding whitespace in the submitted code is ignored.
pub fn verify_otp(
    record: Option<&OtpRecord>,
    submitted: &str,
    now: DateTime<Utc>,
) -> OtpVerification {
    let Some(record) = record else {
        return OtpVerification::NotSent;
    };

    if record.is_expired(now) {
        return OtpVerification::Expired;
    }

    if record.code != submitted.trim() {
        return OtpVerification::Invalid;
    }

    OtpVerification::Success
}

// =============================================================================
// Outcomes of the Password Step
// =============================================================================

/// Response to the first login step.
///
/// Unknown email and wrong password both map to `Invalid` so the endpoint
/// does not reveal which accounts exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum OtpRequestOutcome {
    OtpSent,
    Invalid,
}

/// Response of the single-step password login.
///
/// Serialized as a bare JSON string. Unlike [`OtpRequestOutcome`] this one
/// tells unknown accounts apart from bad passwords.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LegacyLoginOutcome {
    #[serde(rename = "success")]
    Success,
    #[serde(rename = "incorrect password")]
    IncorrectPassword,
    #[serde(rename = "no record exists")]
    NoRecord,
}

// =============================================================================
// Unit Tests
// =============================================================================
