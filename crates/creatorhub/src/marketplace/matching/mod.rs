//! Read-side queries: the influencer campaign feed, ranked influencer matches
//! for businesses, and the business directory for influencers.

pub mod deadline;
pub mod scoring;

pub use deadline::{badge_for, days_left, deadline_label, Badge, BadgeKind};
pub use scoring::{
    InfluencerScorer, MatchContext, MatchScore, ScoreComponent, ScoringWeights, WeightedScorer,
};

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::clock::{Clock, SystemClock};
use super::domain::{
    Budget, Campaign, CampaignId, CampaignStatus, CampaignType, CompanyInfo, Industry, Niche,
    Platform, Priority, ProfileId, UserId,
};
use super::error::MarketError;
use super::identity::{Capability, Principal, Role};
use super::repository::{CampaignScan, MarketplaceStore};
use super::validation::ValidationErrors;
use crate::config::MarketplaceConfig;

/// Filters accepted by the campaign feed. Budget bounds apply to the
/// per-influencer budget and are inclusive.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CampaignFilters {
    #[serde(default)]
    pub category: Option<Niche>,
    #[serde(default)]
    pub platform: Option<Platform>,
    #[serde(default)]
    pub min_budget: Option<u64>,
    #[serde(default)]
    pub max_budget: Option<u64>,
    #[serde(default)]
    pub limit: Option<usize>,
}

impl CampaignFilters {
    pub fn matches(&self, campaign: &Campaign) -> bool {
        let per_influencer = campaign.budget.per_influencer;
        self.category.map_or(true, |category| campaign.category == category)
            && self
                .platform
                .map_or(true, |platform| campaign.platforms.contains(&platform))
            && self.min_budget.map_or(true, |min| per_influencer >= min)
            && self.max_budget.map_or(true, |max| per_influencer <= max)
    }

    fn validate(&self) -> Result<(), ValidationErrors> {
        match (self.min_budget, self.max_budget) {
            (Some(min), Some(max)) if min > max => Err(ValidationErrors::single(
                "min_budget",
                "cannot exceed max_budget",
            )),
            _ => Ok(()),
        }
    }
}

/// Feed entry with the display fields computed at query time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CampaignCard {
    pub id: CampaignId,
    pub business_id: UserId,
    pub title: String,
    pub description: String,
    pub campaign_type: CampaignType,
    pub category: Niche,
    pub platforms: Vec<Platform>,
    pub budget: Budget,
    pub application_deadline: DateTime<Utc>,
    pub max_influencers: u32,
    pub applications_count: u32,
    pub selected_influencers: u32,
    pub priority: Priority,
    pub is_featured: bool,
    pub is_urgent: bool,
    pub created_at: DateTime<Utc>,
    pub days_left: i64,
    pub deadline: String,
    pub badge: Badge,
}

impl CampaignCard {
    pub fn new(campaign: Campaign, now: DateTime<Utc>) -> Self {
        let days = days_left(campaign.timeline.application_deadline, now);
        Self {
            badge: badge_for(campaign.is_featured, campaign.is_urgent, days),
            deadline: deadline_label(days),
            days_left: days,
            application_deadline: campaign.timeline.application_deadline,
            id: campaign.id,
            business_id: campaign.business_id,
            title: campaign.title,
            description: campaign.description,
            campaign_type: campaign.campaign_type,
            category: campaign.category,
            platforms: campaign.platforms,
            budget: campaign.budget,
            max_influencers: campaign.max_influencers,
            applications_count: campaign.applications_count,
            selected_influencers: campaign.selected_influencers,
            priority: campaign.priority,
            is_featured: campaign.is_featured,
            is_urgent: campaign.is_urgent,
            created_at: campaign.created_at,
        }
    }
}

/// Filters for influencer discovery. Without `campaign_id` the business's
/// saved preferences provide the match context.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InfluencerFilters {
    #[serde(default)]
    pub campaign_id: Option<CampaignId>,
    #[serde(default, alias = "category")]
    pub niche: Option<Niche>,
    #[serde(default)]
    pub platform: Option<Platform>,
    #[serde(default)]
    pub min_followers: Option<u64>,
    #[serde(default)]
    pub max_followers: Option<u64>,
    #[serde(default)]
    pub limit: Option<usize>,
}

impl InfluencerFilters {
    fn validate(&self) -> Result<(), ValidationErrors> {
        match (self.min_followers, self.max_followers) {
            (Some(min), Some(max)) if min > max => Err(ValidationErrors::single(
                "min_followers",
                "cannot exceed max_followers",
            )),
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InfluencerMatch {
    pub user_id: UserId,
    pub profile_id: ProfileId,
    pub display_name: String,
    pub bio: Option<String>,
    pub profile_picture_url: Option<String>,
    pub niches: Vec<Niche>,
    pub platforms: Vec<Platform>,
    pub total_followers: u64,
    pub engagement_rate: Option<f32>,
    pub average_rating: f32,
    pub match_score: u8,
    pub score_components: Vec<ScoreComponent>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BusinessFilters {
    #[serde(default)]
    pub industry: Option<Industry>,
    #[serde(default)]
    pub verified_only: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BusinessCard {
    pub user_id: UserId,
    pub profile_id: ProfileId,
    pub company: CompanyInfo,
    pub is_verified: bool,
    pub total_campaigns: u32,
    pub active_campaigns: u32,
    pub average_rating: f32,
}

/// Read-only query service over the marketplace store.
pub struct MatchingEngine<S> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
    scorer: Arc<dyn InfluencerScorer>,
    config: MarketplaceConfig,
}

impl<S> MatchingEngine<S>
where
    S: MarketplaceStore + 'static,
{
    pub fn new(store: Arc<S>, config: &MarketplaceConfig) -> Self {
        Self::with_clock(store, Arc::new(SystemClock), config)
    }

    pub fn with_clock(store: Arc<S>, clock: Arc<dyn Clock>, config: &MarketplaceConfig) -> Self {
        Self {
            store,
            clock,
            scorer: Arc::new(WeightedScorer::default()),
            config: config.clone(),
        }
    }

    /// Swap the ranking strategy used by [`Self::list_influencer_matches`].
    pub fn with_scorer(mut self, scorer: Arc<dyn InfluencerScorer>) -> Self {
        self.scorer = scorer;
        self
    }

    /// Active campaigns matching `filters`, newest first.
    pub fn list_active_campaigns(
        &self,
        principal: &Principal,
        filters: &CampaignFilters,
    ) -> Result<Vec<CampaignCard>, MarketError> {
        principal.require(Capability::BrowseCampaigns)?;
        filters.validate()?;

        let mut campaigns: Vec<Campaign> = self
            .store
            .campaigns(CampaignScan::Status(CampaignStatus::Active))?
            .into_iter()
            .map(|stored| stored.document)
            .filter(|campaign| filters.matches(campaign))
            .collect();
        campaigns.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));

        let now = self.clock.now();
        Ok(campaigns
            .into_iter()
            .take(self.config.page_limit(filters.limit))
            .map(|campaign| CampaignCard::new(campaign, now))
            .collect())
    }

    /// Active influencers ranked by the configured scorer against either a
    /// specific campaign or the caller's saved preferences.
    pub fn list_influencer_matches(
        &self,
        principal: &Principal,
        filters: &InfluencerFilters,
    ) -> Result<Vec<InfluencerMatch>, MarketError> {
        principal.require(Capability::FindInfluencers)?;
        filters.validate()?;

        let context = match &filters.campaign_id {
            Some(campaign_id) => {
                let stored = self
                    .store
                    .campaign(campaign_id)?
                    .ok_or_else(|| MarketError::not_found("campaign", campaign_id))?;
                if !stored.document.is_owned_by(&principal.id) {
                    return Err(MarketError::Forbidden {
                        resource: "campaign",
                    });
                }
                MatchContext::from_campaign(&stored.document)
            }
            None => {
                let business = self.store.business_profile(&principal.id)?.ok_or(
                    MarketError::ProfileRequired {
                        role: Role::Business,
                    },
                )?;
                MatchContext::from_preferences(&business.document.preferences)
            }
        };

        let mut matches: Vec<InfluencerMatch> = self
            .store
            .influencer_profiles()?
            .into_iter()
            .map(|stored| stored.document)
            .filter(|profile| profile.is_active)
            .filter(|profile| {
                let followers = profile.total_followers();
                filters
                    .niche
                    .map_or(true, |niche| profile.niches().contains(&niche))
                    && filters
                        .platform
                        .map_or(true, |platform| profile.platforms().contains(&platform))
                    && filters.min_followers.map_or(true, |min| followers >= min)
                    && filters.max_followers.map_or(true, |max| followers <= max)
            })
            .map(|profile| {
                let scored = self.scorer.score(&profile, &context);
                InfluencerMatch {
                    niches: profile.niches(),
                    platforms: profile.platforms(),
                    total_followers: profile.total_followers(),
                    engagement_rate: profile.content.engagement_rate,
                    average_rating: profile.stats.average_rating,
                    user_id: profile.user_id,
                    profile_id: profile.id,
                    display_name: profile.display_name,
                    bio: profile.bio,
                    profile_picture_url: profile.profile_picture_url,
                    match_score: scored.score,
                    score_components: scored.components,
                }
            })
            .collect();

        matches.sort_by(|a, b| {
            b.match_score
                .cmp(&a.match_score)
                .then_with(|| b.total_followers.cmp(&a.total_followers))
                .then_with(|| a.user_id.cmp(&b.user_id))
        });
        matches.truncate(self.config.page_limit(filters.limit));
        Ok(matches)
    }

    /// Active business profiles ordered by company name.
    pub fn list_businesses(
        &self,
        principal: &Principal,
        filters: &BusinessFilters,
    ) -> Result<Vec<BusinessCard>, MarketError> {
        principal.require(Capability::BrowseBusinesses)?;

        let mut cards: Vec<BusinessCard> = self
            .store
            .business_profiles()?
            .into_iter()
            .map(|stored| stored.document)
            .filter(|profile| profile.is_active)
            .filter(|profile| {
                filters
                    .industry
                    .map_or(true, |industry| profile.company.industry == industry)
                    && (!filters.verified_only || profile.is_verified)
            })
            .map(|profile| BusinessCard {
                user_id: profile.user_id,
                profile_id: profile.id,
                company: profile.company,
                is_verified: profile.is_verified,
                total_campaigns: profile.stats.total_campaigns,
                active_campaigns: profile.stats.active_campaigns,
                average_rating: profile.stats.average_rating,
            })
            .collect();

        cards.sort_by(|a, b| {
            a.company
                .name
                .to_lowercase()
                .cmp(&b.company.name.to_lowercase())
                .then_with(|| a.user_id.cmp(&b.user_id))
        });
        Ok(cards)
    }
}
