//! Campaign lifecycle engine: the single authority that mutates campaign,
//! application, invitation, and collaboration state and keeps the derived
//! counters on campaigns and profiles in step.
//!
//! Every write reads the documents it touches, builds one [`Transaction`], and
//! commits it with optimistic version checks. A version conflict means another
//! writer got there first, so the operation re-reads and re-validates before
//! trying again.

mod applications;
mod campaigns;
mod collaborations;
mod invitations;
mod profiles;
mod reconcile;

#[cfg(test)]
pub(crate) mod tests;

pub use applications::ApplicationSummary;
pub use invitations::InvitationSummary;
pub use profiles::ProfileView;
pub use reconcile::ReconcileReport;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::warn;

use super::clock::{Clock, SystemClock};
use super::domain::{BusinessProfile, Campaign, CampaignId, InfluencerProfile, UserId};
use super::error::{ConflictKind, MarketError};
use super::identity::{Principal, Role};
use super::repository::{MarketplaceStore, RepositoryError, Transaction, Versioned};
use crate::config::MarketplaceConfig;

/// Behavior switches for the lifecycle engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LifecyclePolicy {
    pub publish_on_create: bool,
    pub enforce_influencer_cap: bool,
    pub write_retries: u32,
}

impl Default for LifecyclePolicy {
    fn default() -> Self {
        Self::from(&MarketplaceConfig::default())
    }
}

impl From<&MarketplaceConfig> for LifecyclePolicy {
    fn from(config: &MarketplaceConfig) -> Self {
        Self {
            publish_on_create: config.publish_on_create,
            enforce_influencer_cap: config.enforce_influencer_cap,
            write_retries: config.write_retries.max(1),
        }
    }
}

/// Service composing the store, clock, and lifecycle policy.
pub struct CampaignLifecycle<S> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
    policy: LifecyclePolicy,
}

impl<S> CampaignLifecycle<S>
where
    S: MarketplaceStore + 'static,
{
    pub fn new(store: Arc<S>, policy: LifecyclePolicy) -> Self {
        Self::with_clock(store, Arc::new(SystemClock), policy)
    }

    pub fn with_clock(store: Arc<S>, clock: Arc<dyn Clock>, policy: LifecyclePolicy) -> Self {
        Self {
            store,
            clock,
            policy,
        }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn policy(&self) -> LifecyclePolicy {
        self.policy
    }

    /// Run `attempt` until its transaction commits, re-reading on version conflicts.
    fn commit_with_retry<T>(
        &self,
        operation: &'static str,
        mut attempt: impl FnMut(DateTime<Utc>) -> Result<(Transaction, T), MarketError>,
    ) -> Result<T, MarketError> {
        let now = self.clock.now();
        let mut tries = 0;
        loop {
            tries += 1;
            let (transaction, outcome) = attempt(now)?;
            match self.store.commit(transaction) {
                Ok(()) => return Ok(outcome),
                Err(RepositoryError::VersionConflict { key }) if tries < self.policy.write_retries => {
                    warn!(operation, %key, attempt = tries, "write conflict, retrying");
                }
                Err(RepositoryError::VersionConflict { key }) => {
                    warn!(operation, %key, attempts = tries, "write conflict retries exhausted");
                    return Err(ConflictKind::ConcurrentWrite.into());
                }
                Err(other) => return Err(other.into()),
            }
        }
    }

    fn load_campaign(&self, id: &CampaignId) -> Result<Versioned<Campaign>, MarketError> {
        self.store
            .campaign(id)?
            .ok_or_else(|| MarketError::not_found("campaign", id))
    }

    fn load_owned_campaign(
        &self,
        principal: &Principal,
        id: &CampaignId,
    ) -> Result<Versioned<Campaign>, MarketError> {
        let stored = self.load_campaign(id)?;
        if !stored.document.is_owned_by(&principal.id) {
            return Err(MarketError::Forbidden {
                resource: "campaign",
            });
        }
        Ok(stored)
    }

    fn require_business_profile(
        &self,
        user: &UserId,
    ) -> Result<Versioned<BusinessProfile>, MarketError> {
        self.store
            .business_profile(user)?
            .ok_or(MarketError::ProfileRequired {
                role: Role::Business,
            })
    }

    fn require_influencer_profile(
        &self,
        user: &UserId,
    ) -> Result<Versioned<InfluencerProfile>, MarketError> {
        self.store
            .influencer_profile(user)?
            .ok_or(MarketError::ProfileRequired {
                role: Role::Influencer,
            })
    }
}
