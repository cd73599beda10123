use chrono::{DateTime, Utc};
use tracing::info;

use super::CampaignLifecycle;
use crate::marketplace::domain::{
    average_rating, BusinessProfile, Campaign, CampaignId, Collaboration, CollaborationOrigin,
    CollaborationRef, CollaborationStatus, CompletedCampaignRef, InfluencerProfile, UserId,
};
use crate::marketplace::error::{ConflictKind, MarketError};
use crate::marketplace::identity::{Capability, Principal};
use crate::marketplace::repository::{Expected, MarketplaceStore, Transaction};
use crate::marketplace::validation::CompletionDraft;

/// Open a collaboration on `campaign` and mirror it onto whichever profiles
/// are present.
pub(super) fn open_collaboration(
    campaign: &mut Campaign,
    business: Option<&mut BusinessProfile>,
    influencer: Option<&mut InfluencerProfile>,
    influencer_id: &UserId,
    origin: CollaborationOrigin,
    proposed_rate: Option<u64>,
    now: DateTime<Utc>,
) {
    campaign.collaborations.push(Collaboration {
        influencer_id: influencer_id.clone(),
        origin,
        agreed_rate: proposed_rate.unwrap_or(campaign.budget.per_influencer),
        status: CollaborationStatus::Active,
        rating: None,
        review: None,
        started_at: now,
        completed_at: None,
    });

    if let Some(profile) = business {
        let first_with_influencer = !profile
            .collaborations
            .iter()
            .any(|entry| &entry.influencer_id == influencer_id);
        profile.collaborations.push(CollaborationRef {
            influencer_id: influencer_id.clone(),
            campaign_id: campaign.id.clone(),
            status: CollaborationStatus::Active,
            rating: None,
            review: None,
            started_at: now,
        });
        if first_with_influencer {
            profile.stats.total_influencers_worked_with += 1;
        }
        profile.updated_at = now;
    }

    if let Some(profile) = influencer {
        profile.stats.total_campaigns += 1;
        profile.updated_at = now;
    }
}

impl<S> CampaignLifecycle<S>
where
    S: MarketplaceStore + 'static,
{
    /// Close an active collaboration with a rating, crediting the spend to the
    /// business and the earnings to the influencer.
    pub fn complete_collaboration(
        &self,
        principal: &Principal,
        campaign_id: &CampaignId,
        influencer_id: &UserId,
        draft: CompletionDraft,
    ) -> Result<Collaboration, MarketError> {
        principal.require(Capability::ManageCampaigns)?;
        let (rating, review) = draft.validate()?;

        let collaboration = self.commit_with_retry("complete_collaboration", |now| {
            let stored = self.load_owned_campaign(principal, campaign_id)?;
            let mut campaign = stored.document.clone();
            let collaboration = campaign
                .collaboration_with_mut(influencer_id)
                .ok_or_else(|| MarketError::not_found("collaboration", influencer_id))?;
            if collaboration.status == CollaborationStatus::Completed {
                return Err(ConflictKind::CollaborationCompleted.into());
            }
            collaboration.status = CollaborationStatus::Completed;
            collaboration.rating = Some(rating);
            collaboration.review = review.clone();
            collaboration.completed_at = Some(now);
            let completed = collaboration.clone();
            campaign.updated_at = now;

            let business = self.require_business_profile(&principal.id)?;
            let mut business_profile = business.document.clone();
            if let Some(entry) = business_profile.collaboration_ref_mut(campaign_id, influencer_id)
            {
                entry.status = CollaborationStatus::Completed;
                entry.rating = Some(rating);
                entry.review = review.clone();
            }
            business_profile.stats.total_spent += completed.agreed_rate;
            business_profile.stats.average_rating = average_rating(
                business_profile
                    .collaborations
                    .iter()
                    .filter_map(|entry| entry.rating),
            );
            business_profile.updated_at = now;

            let mut transaction = Transaction::new()
                .put_campaign(campaign.clone(), Expected::from(&stored))
                .put_business(business_profile, Expected::from(&business));

            if let Some(influencer) = self.store.influencer_profile(influencer_id)? {
                let mut profile = influencer.document.clone();
                profile.completed_collaborations.push(CompletedCampaignRef {
                    campaign_id: campaign.id.clone(),
                    business_id: campaign.business_id.clone(),
                    rating: Some(rating),
                    review: review.clone(),
                    earnings: completed.agreed_rate,
                    completed_at: now,
                });
                profile.stats.completed_campaigns += 1;
                profile.stats.total_earnings += completed.agreed_rate;
                profile.stats.average_rating = average_rating(
                    profile
                        .completed_collaborations
                        .iter()
                        .filter_map(|entry| entry.rating),
                );
                profile.updated_at = now;
                transaction = transaction.put_influencer(profile, Expected::from(&influencer));
            }

            Ok((transaction, completed))
        })?;

        info!(
            %campaign_id,
            %influencer_id,
            business_id = %principal.id,
            rating,
            "collaboration completed"
        );
        Ok(collaboration)
    }
}
