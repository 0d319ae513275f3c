//! Company leases.
//!
//! At most one reconciliation per company runs at a time. A run polls
//! [`LeaseManager::try_acquire`] at a fixed interval until it gets the lease;
//! there is no timeout.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::debug;
use vendo_core::CompanyId;

use crate::error::{ImportError, ImportResult};

/// Proof that a company lease is held. Released exactly once.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LeaseToken {
    pub company_id: CompanyId,
    pub token: u64,
}

/// Grants per-company exclusive leases.
#[async_trait]
pub trait LeaseManager: Send + Sync {
    /// Take the lease if free. `Ok(None)` means another run holds it.
    async fn try_acquire(&self, company_id: CompanyId) -> ImportResult<Option<LeaseToken>>;

    /// Give the lease back.
    async fn release(&self, lease: LeaseToken) -> ImportResult<()>;
}

/// Wait for the company lease, re-polling every `poll_interval`.
pub async fn acquire_lease(
    manager: &dyn LeaseManager,
    company_id: CompanyId,
    poll_interval: Duration,
) -> ImportResult<LeaseToken> {
    let mut attempts: u32 = 0;
    loop {
        if let Some(lease) = manager.try_acquire(company_id).await? {
            debug!(
                company_id = %company_id,
                token = lease.token,
                attempts,
                "Acquired company lease"
            );
            return Ok(lease);
        }

        attempts = attempts.saturating_add(1);
        debug!(
            company_id = %company_id,
            attempts,
            poll_ms = u64::try_from(poll_interval.as_millis()).unwrap_or(u64::MAX),
            "Company lease busy, waiting"
        );
        tokio::time::sleep(poll_interval).await;
    }
}

/// Process-local lease manager.
#[derive(Debug, Default)]
pub struct InMemoryLeaseManager {
    held: Mutex<HashMap<CompanyId, u64>>,
    next_token: AtomicU64,
}

impl InMemoryLeaseManager {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether some run currently holds the company lease.
    pub async fn is_held(&self, company_id: CompanyId) -> bool {
        self.held.lock().await.contains_key(&company_id)
    }
}

#[async_trait]
impl LeaseManager for InMemoryLeaseManager {
    async fn try_acquire(&self, company_id: CompanyId) -> ImportResult<Option<LeaseToken>> {
        let mut held = self.held.lock().await;
        if held.contains_key(&company_id) {
            return Ok(None);
        }

        let token = self.next_token.fetch_add(1, Ordering::SeqCst) + 1;
        held.insert(company_id, token);
        Ok(Some(LeaseToken { company_id, token }))
    }

    async fn release(&self, lease: LeaseToken) -> ImportResult<()> {
        let mut held = self.held.lock().await;
        match held.get(&lease.company_id) {
            Some(token) if *token == lease.token => {
                held.remove(&lease.company_id);
                Ok(())
            }
            _ => Err(ImportError::lease(lease.company_id, "lease not held")),
        }
    }
}
