use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use super::{
    CampaignScan, Document, Expected, MarketplaceStore, RepositoryError, Transaction, Versioned,
};
use crate::marketplace::domain::{
    ApplicationId, BusinessProfile, Campaign, CampaignId, InfluencerProfile, InvitationId, UserId,
};

#[derive(Default)]
struct Collections {
    campaigns: HashMap<CampaignId, Versioned<Campaign>>,
    businesses: HashMap<UserId, Versioned<BusinessProfile>>,
    influencers: HashMap<UserId, Versioned<InfluencerProfile>>,
}

/// Process-local store. One lock guards every collection, which makes each
/// transaction atomic across campaigns and profiles.
#[derive(Default)]
pub struct MemoryStore {
    collections: Mutex<Collections>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Collections>, RepositoryError> {
        self.collections
            .lock()
            .map_err(|_| RepositoryError::Unavailable("memory store lock poisoned".to_string()))
    }
}

fn check<T>(
    current: Option<&Versioned<T>>,
    expected: Expected,
    key: impl FnOnce() -> String,
) -> Result<(), RepositoryError> {
    let matches = match (current, expected) {
        (None, Expected::Absent) => true,
        (Some(stored), Expected::Version(version)) => stored.version == version,
        _ => false,
    };
    if matches {
        Ok(())
    } else {
        Err(RepositoryError::VersionConflict { key: key() })
    }
}

fn next_version<T>(current: Option<&Versioned<T>>) -> u64 {
    current.map_or(1, |stored| stored.version + 1)
}

impl MarketplaceStore for MemoryStore {
    fn campaign(&self, id: &CampaignId) -> Result<Option<Versioned<Campaign>>, RepositoryError> {
        Ok(self.lock()?.campaigns.get(id).cloned())
    }

    fn campaign_with_application(
        &self,
        id: &ApplicationId,
    ) -> Result<Option<Versioned<Campaign>>, RepositoryError> {
        let guard = self.lock()?;
        Ok(guard
            .campaigns
            .values()
            .find(|stored| stored.document.application(id).is_some())
            .cloned())
    }

    fn campaign_with_invitation(
        &self,
        id: &InvitationId,
    ) -> Result<Option<Versioned<Campaign>>, RepositoryError> {
        let guard = self.lock()?;
        Ok(guard
            .campaigns
            .values()
            .find(|stored| stored.document.invitation(id).is_some())
            .cloned())
    }

    fn campaigns(
        &self,
        scan: CampaignScan<'_>,
    ) -> Result<Vec<Versioned<Campaign>>, RepositoryError> {
        let guard = self.lock()?;
        Ok(guard
            .campaigns
            .values()
            .filter(|stored| scan.matches(&stored.document))
            .cloned()
            .collect())
    }

    fn business_profile(
        &self,
        user: &UserId,
    ) -> Result<Option<Versioned<BusinessProfile>>, RepositoryError> {
        Ok(self.lock()?.businesses.get(user).cloned())
    }

    fn influencer_profile(
        &self,
        user: &UserId,
    ) -> Result<Option<Versioned<InfluencerProfile>>, RepositoryError> {
        Ok(self.lock()?.influencers.get(user).cloned())
    }

    fn business_profiles(&self) -> Result<Vec<Versioned<BusinessProfile>>, RepositoryError> {
        Ok(self.lock()?.businesses.values().cloned().collect())
    }

    fn influencer_profiles(&self) -> Result<Vec<Versioned<InfluencerProfile>>, RepositoryError> {
        Ok(self.lock()?.influencers.values().cloned().collect())
    }

    fn commit(&self, transaction: Transaction) -> Result<(), RepositoryError> {
        let mut guard = self.lock()?;
        let puts = transaction.into_puts();

        for put in &puts {
            let key = || put.document.key();
            match &put.document {
                Document::Campaign(campaign) => {
                    check(guard.campaigns.get(&campaign.id), put.expected, key)?
                }
                Document::Business(profile) => {
                    check(guard.businesses.get(&profile.user_id), put.expected, key)?
                }
                Document::Influencer(profile) => {
                    check(guard.influencers.get(&profile.user_id), put.expected, key)?
                }
            }
        }

        for put in puts {
            match put.document {
                Document::Campaign(campaign) => {
                    let version = next_version(guard.campaigns.get(&campaign.id));
                    guard.campaigns.insert(
                        campaign.id.clone(),
                        Versioned {
                            version,
                            document: campaign,
                        },
                    );
                }
                Document::Business(profile) => {
                    let version = next_version(guard.businesses.get(&profile.user_id));
                    guard.businesses.insert(
                        profile.user_id.clone(),
                        Versioned {
                            version,
                            document: profile,
                        },
                    );
                }
                Document::Influencer(profile) => {
                    let version = next_version(guard.influencers.get(&profile.user_id));
                    guard.influencers.insert(
                        profile.user_id.clone(),
                        Versioned {
                            version,
                            document: profile,
                        },
                    );
                }
            }
        }

        Ok(())
    }
}
