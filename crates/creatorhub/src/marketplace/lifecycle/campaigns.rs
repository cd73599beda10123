use chrono::{DateTime, Utc};
use tracing::info;

use super::CampaignLifecycle;
use crate::marketplace::domain::{
    BusinessProfile, BusinessStats, Campaign, CampaignId, CampaignRef, CampaignStatus,
};
use crate::marketplace::error::MarketError;
use crate::marketplace::identity::{Capability, Principal};
use crate::marketplace::repository::{CampaignScan, Expected, MarketplaceStore, Transaction};
use crate::marketplace::validation::{CampaignDraft, CampaignFields};

fn new_campaign(
    id: CampaignId,
    business: &BusinessProfile,
    fields: CampaignFields,
    status: CampaignStatus,
    now: DateTime<Utc>,
) -> Campaign {
    Campaign {
        id,
        business_id: business.user_id.clone(),
        business_profile_id: business.id.clone(),
        title: fields.title,
        description: fields.description,
        campaign_type: fields.campaign_type,
        category: fields.category,
        platforms: fields.platforms,
        requirements: fields.requirements,
        budget: fields.budget,
        timeline: fields.timeline,
        content_guidelines: fields.content_guidelines,
        deliverables: fields.deliverables,
        max_influencers: fields.max_influencers,
        status,
        is_featured: fields.is_featured,
        is_urgent: fields.is_urgent,
        priority: fields.priority,
        applications_count: 0,
        selected_influencers: 0,
        applications: Vec::new(),
        invitations: Vec::new(),
        collaborations: Vec::new(),
        created_at: now,
        updated_at: now,
    }
}

/// Move the business counters from `from` to `to`.
pub(super) fn shift_status_counters(
    stats: &mut BusinessStats,
    from: CampaignStatus,
    to: CampaignStatus,
) {
    if from == CampaignStatus::Active {
        stats.active_campaigns = stats.active_campaigns.saturating_sub(1);
    }
    if to == CampaignStatus::Active {
        stats.active_campaigns += 1;
    }
    if to == CampaignStatus::Completed {
        stats.completed_campaigns += 1;
    }
}

impl<S> CampaignLifecycle<S>
where
    S: MarketplaceStore + 'static,
{
    /// Create a campaign owned by the calling business and record it on the
    /// business profile in the same transaction.
    pub fn create_campaign(
        &self,
        principal: &Principal,
        draft: CampaignDraft,
    ) -> Result<Campaign, MarketError> {
        principal.require(Capability::ManageCampaigns)?;
        self.require_business_profile(&principal.id)?;
        let fields = draft.validate()?;

        let campaign_id = CampaignId::generate();
        let status = if self.policy.publish_on_create {
            CampaignStatus::Active
        } else {
            CampaignStatus::Draft
        };

        let campaign = self.commit_with_retry("create_campaign", |now| {
            let business = self.require_business_profile(&principal.id)?;
            let campaign = new_campaign(
                campaign_id.clone(),
                &business.document,
                fields.clone(),
                status,
                now,
            );

            let mut profile = business.document.clone();
            profile.stats.total_campaigns += 1;
            shift_status_counters(&mut profile.stats, CampaignStatus::Draft, status);
            profile.campaigns.push(CampaignRef {
                campaign_id: campaign.id.clone(),
                status,
                created_at: now,
            });
            profile.updated_at = now;

            let transaction = Transaction::new()
                .put_campaign(campaign.clone(), Expected::Absent)
                .put_business(profile, Expected::from(&business));
            Ok((transaction, campaign))
        })?;

        info!(
            campaign_id = %campaign.id,
            business_id = %principal.id,
            status = campaign.status.label(),
            "campaign created"
        );
        Ok(campaign)
    }

    /// Publish a draft campaign.
    pub fn publish_campaign(
        &self,
        principal: &Principal,
        campaign_id: &CampaignId,
    ) -> Result<Campaign, MarketError> {
        self.transition(
            principal,
            campaign_id,
            CampaignStatus::Active,
            Some(CampaignStatus::Draft),
        )
    }

    pub fn change_campaign_status(
        &self,
        principal: &Principal,
        campaign_id: &CampaignId,
        target: CampaignStatus,
    ) -> Result<Campaign, MarketError> {
        self.transition(principal, campaign_id, target, None)
    }

    fn transition(
        &self,
        principal: &Principal,
        campaign_id: &CampaignId,
        target: CampaignStatus,
        required_from: Option<CampaignStatus>,
    ) -> Result<Campaign, MarketError> {
        principal.require(Capability::ManageCampaigns)?;

        let (campaign, from) = self.commit_with_retry("change_campaign_status", |now| {
            let stored = self.load_owned_campaign(principal, campaign_id)?;
            let from = stored.document.status;
            let allowed = required_from.map_or(true, |required| required == from)
                && from.can_transition_to(target);
            if !allowed {
                return Err(MarketError::InvalidTransition { from, to: target });
            }

            let business = self.require_business_profile(&principal.id)?;
            let mut campaign = stored.document.clone();
            campaign.status = target;
            campaign.updated_at = now;

            let mut profile = business.document.clone();
            shift_status_counters(&mut profile.stats, from, target);
            if let Some(entry) = profile.campaign_ref_mut(campaign_id) {
                entry.status = target;
            }
            profile.updated_at = now;

            let transaction = Transaction::new()
                .put_campaign(campaign.clone(), Expected::from(&stored))
                .put_business(profile, Expected::from(&business));
            Ok((transaction, (campaign, from)))
        })?;

        info!(
            campaign_id = %campaign.id,
            business_id = %principal.id,
            from = from.label(),
            status = campaign.status.label(),
            "campaign status changed"
        );
        Ok(campaign)
    }

    /// Owners see the whole campaign; everyone else gets a view narrowed to
    /// their own entries. Drafts stay private to the owner.
    pub fn campaign(
        &self,
        principal: &Principal,
        campaign_id: &CampaignId,
    ) -> Result<Campaign, MarketError> {
        let stored = self.load_campaign(campaign_id)?;
        let campaign = stored.document;
        if campaign.status == CampaignStatus::Draft && !campaign.is_owned_by(&principal.id) {
            return Err(MarketError::not_found("campaign", campaign_id));
        }
        Ok(campaign.visible_to(&principal.id))
    }

    /// The caller's campaigns, newest first.
    pub fn my_campaigns(&self, principal: &Principal) -> Result<Vec<Campaign>, MarketError> {
        principal.require(Capability::ManageCampaigns)?;
        let mut campaigns: Vec<Campaign> = self
            .store
            .campaigns(CampaignScan::OwnedBy(&principal.id))?
            .into_iter()
            .map(|stored| stored.document)
            .collect();
        campaigns.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(campaigns)
    }
}
