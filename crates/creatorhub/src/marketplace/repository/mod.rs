//! Storage abstraction for marketplace documents.
//!
//! Each document carries a version. Writes go through [`Transaction`], a batch
//! of puts that the store applies all-or-nothing after checking every expected
//! version, so a campaign and the profile caches that mirror it never diverge.

mod memory;

pub use memory::MemoryStore;

use super::domain::{
    ApplicationId, BusinessProfile, Campaign, CampaignId, CampaignStatus, InfluencerProfile,
    InvitationId, UserId,
};

/// Document paired with the version it was read at.
#[derive(Debug, Clone, PartialEq)]
pub struct Versioned<T> {
    pub version: u64,
    pub document: T,
}

/// Optimistic-concurrency guard attached to each put.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expected {
    /// The document must not exist yet.
    Absent,
    /// The stored document must still be at this version.
    Version(u64),
}

impl<T> From<&Versioned<T>> for Expected {
    fn from(value: &Versioned<T>) -> Self {
        Expected::Version(value.version)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Document {
    Campaign(Campaign),
    Business(BusinessProfile),
    Influencer(InfluencerProfile),
}

impl Document {
    /// Stable key used in conflict reports.
    pub fn key(&self) -> String {
        match self {
            Document::Campaign(campaign) => format!("campaign/{}", campaign.id),
            Document::Business(profile) => format!("business/{}", profile.user_id),
            Document::Influencer(profile) => format!("influencer/{}", profile.user_id),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Put {
    pub document: Document,
    pub expected: Expected,
}

/// Batch of puts committed atomically.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Transaction {
    puts: Vec<Put>,
}

impl Transaction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put_campaign(mut self, campaign: Campaign, expected: Expected) -> Self {
        self.puts.push(Put {
            document: Document::Campaign(campaign),
            expected,
        });
        self
    }

    pub fn put_business(mut self, profile: BusinessProfile, expected: Expected) -> Self {
        self.puts.push(Put {
            document: Document::Business(profile),
            expected,
        });
        self
    }

    pub fn put_influencer(mut self, profile: InfluencerProfile, expected: Expected) -> Self {
        self.puts.push(Put {
            document: Document::Influencer(profile),
            expected,
        });
        self
    }

    pub fn is_empty(&self) -> bool {
        self.puts.is_empty()
    }

    pub fn len(&self) -> usize {
        self.puts.len()
    }

    pub fn into_puts(self) -> Vec<Put> {
        self.puts
    }
}

/// Campaign scans supported by every store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CampaignScan<'a> {
    All,
    Status(CampaignStatus),
    OwnedBy(&'a UserId),
    /// Campaigns where the user applied or was invited.
    Involving(&'a UserId),
}

impl CampaignScan<'_> {
    pub fn matches(&self, campaign: &Campaign) -> bool {
        match self {
            CampaignScan::All => true,
            CampaignScan::Status(status) => campaign.status == *status,
            CampaignScan::OwnedBy(owner) => campaign.is_owned_by(owner),
            CampaignScan::Involving(user) => campaign.involves(user),
        }
    }
}

/// Storage abstraction so the engines can be exercised in isolation.
pub trait MarketplaceStore: Send + Sync {
    fn campaign(&self, id: &CampaignId) -> Result<Option<Versioned<Campaign>>, RepositoryError>;
    fn campaign_with_application(
        &self,
        id: &ApplicationId,
    ) -> Result<Option<Versioned<Campaign>>, RepositoryError>;
    fn campaign_with_invitation(
        &self,
        id: &InvitationId,
    ) -> Result<Option<Versioned<Campaign>>, RepositoryError>;
    fn campaigns(&self, scan: CampaignScan<'_>)
        -> Result<Vec<Versioned<Campaign>>, RepositoryError>;
    fn business_profile(
        &self,
        user: &UserId,
    ) -> Result<Option<Versioned<BusinessProfile>>, RepositoryError>;
    fn influencer_profile(
        &self,
        user: &UserId,
    ) -> Result<Option<Versioned<InfluencerProfile>>, RepositoryError>;
    fn business_profiles(&self) -> Result<Vec<Versioned<BusinessProfile>>, RepositoryError>;
    fn influencer_profiles(&self) -> Result<Vec<Versioned<InfluencerProfile>>, RepositoryError>;
    fn commit(&self, transaction: Transaction) -> Result<(), RepositoryError>;
}

/// Error enumeration for store failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
    #[error("document {key} changed since it was read")]
    VersionConflict { key: String },
    #[error("store unavailable: {0}")]
    Unavailable(String),
}
