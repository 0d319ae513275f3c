//! PostgreSQL advisory-lock leases.
//!
//! Advisory locks belong to a database session, so the connection that took
//! the lock is kept out of the pool until the lease is released.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use sqlx::pool::PoolConnection;
use sqlx::{PgPool, Postgres};
use tokio::sync::Mutex;
use tracing::{debug, warn};
use vendo_core::CompanyId;

use super::lease::{LeaseManager, LeaseToken};
use crate::error::{ImportError, ImportResult};

/// Advisory lock namespace for import reconciliation.
const IMPORT_LOCK_NAMESPACE: i32 = 51_050;

/// Fold a company id into the 32-bit advisory key. Colliding companies only
/// serialize against each other.
#[allow(clippy::cast_possible_truncation)]
fn company_lock_key(company_id: CompanyId) -> i32 {
    let id = company_id.as_i64();
    (id ^ (id >> 32)) as i32
}

/// Lease manager backed by `pg_try_advisory_lock`.
pub struct PgAdvisoryLeaseManager {
    pool: PgPool,
    held: Mutex<HashMap<u64, PoolConnection<Postgres>>>,
    next_token: AtomicU64,
}

impl PgAdvisoryLeaseManager {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            held: Mutex::new(HashMap::new()),
            next_token: AtomicU64::new(0),
        }
    }
}

#[async_trait]
impl LeaseManager for PgAdvisoryLeaseManager {
    async fn try_acquire(&self, company_id: CompanyId) -> ImportResult<Option<LeaseToken>> {
        let lock_key = company_lock_key(company_id);
        let mut conn = self.pool.acquire().await?;

        let (acquired,): (bool,) = sqlx::query_as("SELECT pg_try_advisory_lock($1, $2)")
            .bind(IMPORT_LOCK_NAMESPACE)
            .bind(lock_key)
            .fetch_one(&mut *conn)
            .await?;

        if !acquired {
            debug!(
                company_id = %company_id,
                lock_key = lock_key,
                "Import lock already held by another process"
            );
            return Ok(None);
        }

        let token = self.next_token.fetch_add(1, Ordering::SeqCst) + 1;
        self.held.lock().await.insert(token, conn);

        debug!(company_id = %company_id, lock_key = lock_key, token, "Acquired import lock");
        Ok(Some(LeaseToken { company_id, token }))
    }

    async fn release(&self, lease: LeaseToken) -> ImportResult<()> {
        let mut conn = self
            .held
            .lock()
            .await
            .remove(&lease.token)
            .ok_or_else(|| ImportError::lease(lease.company_id, "lease not held"))?;

        let lock_key = company_lock_key(lease.company_id);
        let (released,): (bool,) = sqlx::query_as("SELECT pg_advisory_unlock($1, $2)")
            .bind(IMPORT_LOCK_NAMESPACE)
            .bind(lock_key)
            .fetch_one(&mut *conn)
            .await?;

        if !released {
            warn!(
                company_id = %lease.company_id,
                lock_key = lock_key,
                "Advisory unlock reported no lock held"
            );
            return Err(ImportError::lease(lease.company_id, "advisory lock was not held"));
        }

        debug!(company_id = %lease.company_id, lock_key = lock_key, "Released import lock");
        Ok(())
    }
}
