//! Approval token storage.
//!
//! Tokens live in memory only and are not persisted across restarts.

use chrono::TimeDelta;
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info, warn};

use clawgate_core::{ApprovalToken, Clock, SystemClock, TenantId, TokenId};

/// Hard upper bound on any token's lifetime, in hours.
pub const MAX_TOKEN_TTL_HOURS: u32 = 24;

type TokenKey = (TenantId, String);

/// Registry of time-bounded approval tokens keyed by `(tenant, resource)`.
pub struct TokenStore {
    tokens: RwLock<HashMap<TokenKey, ApprovalToken>>,
    clock: Arc<dyn Clock>,
    max_ttl_hours: u32,
}

impl TokenStore {
    /// Create an empty store on the system clock with the 24-hour cap.
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Create an empty store reading time from `clock`.
    #[must_use]
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            tokens: RwLock::new(HashMap::new()),
            clock,
            max_ttl_hours: MAX_TOKEN_TTL_HOURS,
        }
    }

    /// Lower the lifetime cap. Values above [`MAX_TOKEN_TTL_HOURS`] are
    /// clamped to it.
    #[must_use]
    pub fn with_max_ttl_hours(mut self, hours: u32) -> Self {
        self.max_ttl_hours = hours.min(MAX_TOKEN_TTL_HOURS);
        self
    }

    /// Effective lifetime cap in hours.
    #[must_use]
    pub fn max_ttl_hours(&self) -> u32 {
        self.max_ttl_hours
    }

    /// Mint a token for `tenant_id` to use `resource` for `ttl_hours`,
    /// capped at the store's maximum.
    ///
    /// Any existing token for the same key is replaced, not extended.
    pub fn issue(&self, tenant_id: &TenantId, resource: &str, ttl_hours: u32) -> ApprovalToken {
        let effective_ttl = ttl_hours.min(self.max_ttl_hours);
        let issued_at = self.clock.now();
        let token = ApprovalToken {
            token_id: TokenId::new(),
            tenant_id: tenant_id.clone(),
            resource: resource.to_string(),
            issued_at,
            expires_at: issued_at.saturating_add(TimeDelta::hours(i64::from(effective_ttl))),
        };

        let replaced = self
            .write_tokens()
            .insert((tenant_id.clone(), resource.to_string()), token.clone());

        info!(
            tenant_id = %tenant_id,
            resource,
            ttl_hours = effective_ttl,
            requested_ttl_hours = ttl_hours,
            expires_at = %token.expires_at,
            replaced = replaced.is_some(),
            "approval token issued"
        );

        token
    }

    /// Whether a live token exists for `(tenant_id, resource)`.
    ///
    /// An expired token is deleted by this call and reported as absent, so
    /// a second check behaves as if it had never been issued.
    pub fn validate(&self, tenant_id: &TenantId, resource: &str) -> bool {
        let key = (tenant_id.clone(), resource.to_string());
        let now = self.clock.now();

        {
            let tokens = self.read_tokens();
            match tokens.get(&key) {
                None => {
                    info!(
                        tenant_id = %tenant_id,
                        resource,
                        "no approval token found, authorization required"
                    );
                    return false;
                },
                Some(token) if !token.is_expired_at(now) => return true,
                Some(_) => {},
            }
        }

        // Re-check under the write lock: the token may have been replaced
        // by a fresh issue between the two acquisitions.
        let mut tokens = self.write_tokens();
        match tokens.get(&key) {
            Some(token) if token.is_expired_at(now) => {
                let expired_at = token.expires_at;
                tokens.remove(&key);
                info!(
                    tenant_id = %tenant_id,
                    resource,
                    expired_at = %expired_at,
                    "approval token expired, re-authorization required"
                );
                false
            },
            Some(_) => true,
            None => false,
        }
    }

    /// Look up the token for a key without affecting expiry.
    #[must_use]
    pub fn get(&self, tenant_id: &TenantId, resource: &str) -> Option<ApprovalToken> {
        self.read_tokens()
            .get(&(tenant_id.clone(), resource.to_string()))
            .cloned()
    }

    /// Remove the token for a key. Idempotent; returns whether one existed.
    pub fn revoke(&self, tenant_id: &TenantId, resource: &str) -> bool {
        let removed = self
            .write_tokens()
            .remove(&(tenant_id.clone(), resource.to_string()))
            .is_some();
        info!(tenant_id = %tenant_id, resource, removed, "approval token revoked");
        removed
    }

    /// Wipe every token. Reset hook for tests and operator tooling.
    pub fn clear_all(&self) {
        let mut tokens = self.write_tokens();
        let count = tokens.len();
        tokens.clear();
        debug!(count, "token store cleared");
    }

    /// Number of stored tokens, expired or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.read_tokens().len()
    }

    /// Whether the store holds no tokens.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.read_tokens().is_empty()
    }

    fn read_tokens(&self) -> RwLockReadGuard<'_, HashMap<TokenKey, ApprovalToken>> {
        self.tokens.read().unwrap_or_else(|e| {
            warn!("token store lock poisoned, recovering");
            e.into_inner()
        })
    }

    fn write_tokens(&self) -> RwLockWriteGuard<'_, HashMap<TokenKey, ApprovalToken>> {
        self.tokens.write().unwrap_or_else(|e| {
            warn!("token store lock poisoned, recovering");
            e.into_inner()
        })
    }
}

impl Default for TokenStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TokenStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let token_count = self.tokens.read().map(|t| t.len()).unwrap_or(0);
        f.debug_struct("TokenStore")
            .field("tokens", &token_count)
            .field("max_ttl_hours", &self.max_ttl_hours)
            .finish_non_exhaustive()
    }
}
