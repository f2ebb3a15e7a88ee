//! # Pending OTP Storage
//!
//! One live record per email. Issuing overwrites, redeeming decides the
//! outcome and drops the record in the same critical section, so two
//! concurrent verifies of one code cannot both succeed.
//!
//! [`InMemoryOtpCache`] lives in process memory: a restart forgets every
//! pending code, and a second server instance would not see the first one's
//! codes. A shared store would implement [`OtpCache`] instead.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use stockbook_core::auth::{verify_otp, OtpRecord, OtpVerification};

#[async_trait]
pub trait OtpCache: Send + Sync {
    /// Stores `record` for `email`, replacing any pending one.
    async fn issue(&self, email: &str, record: OtpRecord);

    /// Checks `submitted` and removes the record when the outcome consumes it.
    async fn redeem(&self, email: &str, submitted: &str, now: DateTime<Utc>) -> OtpVerification;

    /// Drops the pending record for `email` if it still holds `code`.
    ///
    /// A record issued afterwards by another request is left alone.
    async fn discard_if(&self, email: &str, code: &str);
}

/// Process-local cache.
#[derive(Debug, Default)]
pub struct InMemoryOtpCache {
    records: Mutex<HashMap<String, OtpRecord>>,
}

impl InMemoryOtpCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn records(&self) -> std::sync::MutexGuard<'_, HashMap<String, OtpRecord>> {
        // A panic while holding the lock cannot leave the map half-written.
        self.records.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Number of pending records.
    pub fn len(&self) -> usize {
        self.records().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl OtpCache for InMemoryOtpCache {
    async fn issue(&self, email: &str, record: OtpRecord) {
        self.records().insert(email.to_string(), record);
    }

    async fn redeem(&self, email: &str, submitted: &str, now: DateTime<Utc>) -> OtpVerification {
        let mut records = self.records();
        let outcome = verify_otp(records.get(email), submitted, now);
        if outcome.consumes_record() {
            records.remove(email);
        }
        outcome
    }

    async fn discard_if(&self, email: &str, code: &str) {
        let mut records = self.records();
        if records.get(email).is_some_and(|r| r.code == code) {
            records.remove(email);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 14, 10, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_success_is_single_use() {
        let cache = InMemoryOtpCache::new();
        cache
            .issue("a@shop.pk", OtpRecord::issue("123456", t0(), Duration::minutes(5)))
            .await;

        assert_eq!(cache.redeem("a@shop.pk", "123456", t0()).await, OtpVerification::Success);
        assert_eq!(cache.redeem("a@shop.pk", "123456", t0()).await, OtpVerification::NotSent);
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_wrong_code_keeps_record() {
        let cache = InMemoryOtpCache::new();
        cache
            .issue("a@shop.pk", OtpRecord::issue("123456", t0(), Duration::minutes(5)))
            .await;

        assert_eq!(cache.redeem("a@shop.pk", "654321", t0()).await, OtpVerification::Invalid);
        assert_eq!(cache.redeem("a@shop.pk", "123456", t0()).await, OtpVerification::Success);
    }

    #[tokio::test]
    async fn test_expired_record_is_dropped() {
        let cache = InMemoryOtpCache::new();
        cache
            .issue("a@shop.pk", OtpRecord::issue("123456", t0(), Duration::minutes(5)))
            .await;

        let later = t0() + Duration::minutes(6);
        assert_eq!(cache.redeem("a@shop.pk", "123456", later).await, OtpVerification::Expired);
        assert_eq!(cache.redeem("a@shop.pk", "123456", later).await, OtpVerification::NotSent);
    }

    #[tokio::test]
    async fn test_reissue_replaces_code() {
        let cache = InMemoryOtpCache::new();
        cache
            .issue("a@shop.pk", OtpRecord::issue("111111", t0(), Duration::minutes(5)))
            .await;
        cache
            .issue("a@shop.pk", OtpRecord::issue("222222", t0(), Duration::minutes(5)))
            .await;

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.redeem("a@shop.pk", "111111", t0()).await, OtpVerification::Invalid);
        assert_eq!(cache.redeem("a@shop.pk", "222222", t0()).await, OtpVerification::Success);
    }

    #[tokio::test]
    async fn test_records_are_per_email() {
        let cache = InMemoryOtpCache::new();
        cache
            .issue("a@shop.pk", OtpRecord::issue("111111", t0(), Duration::minutes(5)))
            .await;
        cache.discard_if("b@shop.pk", "111111").await;

        assert_eq!(cache.redeem("b@shop.pk", "111111", t0()).await, OtpVerification::NotSent);
        cache.discard_if("a@shop.pk", "111111").await;
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_discard_leaves_newer_code() {
        let cache = InMemoryOtpCache::new();
        cache
            .issue("a@shop.pk", OtpRecord::issue("111111", t0(), Duration::minutes(5)))
            .await;
        cache
            .issue("a@shop.pk", OtpRecord::issue("222222", t0(), Duration::minutes(5)))
            .await;

        cache.discard_if("a@shop.pk", "111111").await;

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.redeem("a@shop.pk", "222222", t0()).await, OtpVerification::Success);
    }
}
