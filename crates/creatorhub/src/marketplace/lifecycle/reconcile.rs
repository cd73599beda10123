use std::collections::BTreeSet;

use serde::Serialize;
use tracing::info;

use super::CampaignLifecycle;
use crate::marketplace::domain::{
    average_rating, ApplicationRef, BusinessProfile, BusinessStats, Campaign, CampaignRef,
    CampaignStatus, CollaborationRef, CollaborationStatus, CompletedCampaignRef,
    InfluencerProfile, InfluencerStats, InvitationRef, SentInvitationRef,
};
use crate::marketplace::error::MarketError;
use crate::marketplace::repository::{CampaignScan, Expected, MarketplaceStore, Transaction};

/// Documents rewritten by a reconcile pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    pub campaigns_repaired: usize,
    pub businesses_repaired: usize,
    pub influencers_repaired: usize,
}

impl ReconcileReport {
    pub fn total(&self) -> usize {
        self.campaigns_repaired + self.businesses_repaired + self.influencers_repaired
    }
}

fn count(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

fn sort_business_refs(profile: &mut BusinessProfile) {
    profile
        .campaigns
        .sort_by(|a, b| (a.created_at, &a.campaign_id).cmp(&(b.created_at, &b.campaign_id)));
    profile.collaborations.sort_by(|a, b| {
        (a.started_at, &a.campaign_id, &a.influencer_id).cmp(&(
            b.started_at,
            &b.campaign_id,
            &b.influencer_id,
        ))
    });
    profile
        .sent_invitations
        .sort_by(|a, b| (a.sent_at, &a.invitation_id).cmp(&(b.sent_at, &b.invitation_id)));
}

fn sort_influencer_refs(profile: &mut InfluencerProfile) {
    profile.campaign_applications.sort_by(|a, b| {
        (a.applied_at, &a.application_id).cmp(&(b.applied_at, &b.application_id))
    });
    profile
        .direct_invitations
        .sort_by(|a, b| (a.invited_at, &a.invitation_id).cmp(&(b.invited_at, &b.invitation_id)));
    profile.completed_collaborations.sort_by(|a, b| {
        (a.completed_at, &a.campaign_id).cmp(&(b.completed_at, &b.campaign_id))
    });
}

/// Rebuild a business profile's caches from the campaigns it owns.
pub(crate) fn derive_business(profile: &BusinessProfile, campaigns: &[Campaign]) -> BusinessProfile {
    let owned: Vec<&Campaign> = campaigns
        .iter()
        .filter(|campaign| campaign.is_owned_by(&profile.user_id))
        .collect();

    let mut derived = profile.clone();
    derived.campaigns = owned
        .iter()
        .map(|campaign| CampaignRef {
            campaign_id: campaign.id.clone(),
            status: campaign.status,
            created_at: campaign.created_at,
        })
        .collect();
    derived.collaborations = owned
        .iter()
        .flat_map(|campaign| {
            campaign
                .collaborations
                .iter()
                .map(move |collaboration| CollaborationRef {
                    influencer_id: collaboration.influencer_id.clone(),
                    campaign_id: campaign.id.clone(),
                    status: collaboration.status,
                    rating: collaboration.rating,
                    review: collaboration.review.clone(),
                    started_at: collaboration.started_at,
                })
        })
        .collect();
    derived.sent_invitations = owned
        .iter()
        .flat_map(|campaign| {
            campaign
                .invitations
                .iter()
                .map(move |invitation| SentInvitationRef {
                    invitation_id: invitation.id.clone(),
                    influencer_id: invitation.influencer_id.clone(),
                    campaign_id: campaign.id.clone(),
                    status: invitation.status,
                    sent_at: invitation.sent_at,
                })
        })
        .collect();
    sort_business_refs(&mut derived);

    let completed = || {
        owned
            .iter()
            .flat_map(|campaign| campaign.collaborations.iter())
            .filter(|collaboration| collaboration.status == CollaborationStatus::Completed)
    };
    derived.stats = BusinessStats {
        total_campaigns: count(owned.len()),
        active_campaigns: count(
            owned
                .iter()
                .filter(|campaign| campaign.status == CampaignStatus::Active)
                .count(),
        ),
        completed_campaigns: count(
            owned
                .iter()
                .filter(|campaign| campaign.status == CampaignStatus::Completed)
                .count(),
        ),
        total_spent: completed().map(|collaboration| collaboration.agreed_rate).sum(),
        total_influencers_worked_with: count(
            derived
                .collaborations
                .iter()
                .map(|collaboration| &collaboration.influencer_id)
                .collect::<BTreeSet<_>>()
                .len(),
        ),
        average_rating: average_rating(completed().filter_map(|collaboration| collaboration.rating)),
    };
    derived
}

/// Rebuild an influencer profile's caches from every campaign that mentions it.
pub(crate) fn derive_influencer(
    profile: &InfluencerProfile,
    campaigns: &[Campaign],
) -> InfluencerProfile {
    let user = &profile.user_id;
    let mut derived = profile.clone();

    derived.campaign_applications = campaigns
        .iter()
        .flat_map(|campaign| {
            campaign
                .applications
                .iter()
                .filter(move |application| &application.influencer_id == user)
                .map(move |application| ApplicationRef {
                    application_id: application.id.clone(),
                    campaign_id: campaign.id.clone(),
                    status: application.status,
                    applied_at: application.applied_at,
                })
        })
        .collect();
    derived.direct_invitations = campaigns
        .iter()
        .flat_map(|campaign| {
            campaign
                .invitations
                .iter()
                .filter(move |invitation| &invitation.influencer_id == user)
                .map(move |invitation| InvitationRef {
                    invitation_id: invitation.id.clone(),
                    business_id: campaign.business_id.clone(),
                    campaign_id: campaign.id.clone(),
                    status: invitation.status,
                    invited_at: invitation.sent_at,
                    responded_at: invitation.responded_at,
                })
        })
        .collect();
    derived.completed_collaborations = campaigns
        .iter()
        .flat_map(|campaign| {
            campaign
                .collaborations
                .iter()
                .filter(move |collaboration| {
                    &collaboration.influencer_id == user
                        && collaboration.status == CollaborationStatus::Completed
                })
                .map(move |collaboration| CompletedCampaignRef {
                    campaign_id: campaign.id.clone(),
                    business_id: campaign.business_id.clone(),
                    rating: collaboration.rating,
                    review: collaboration.review.clone(),
                    earnings: collaboration.agreed_rate,
                    completed_at: collaboration.completed_at.unwrap_or(collaboration.started_at),
                })
        })
        .collect();
    sort_influencer_refs(&mut derived);

    let collaborations = campaigns
        .iter()
        .filter(|campaign| campaign.collaboration_with(user).is_some())
        .count();
    derived.stats = InfluencerStats {
        total_campaigns: count(collaborations),
        completed_campaigns: count(derived.completed_collaborations.len()),
        average_rating: average_rating(
            derived
                .completed_collaborations
                .iter()
                .filter_map(|entry| entry.rating),
        ),
        total_earnings: derived
            .completed_collaborations
            .iter()
            .map(|entry| entry.earnings)
            .sum(),
    };
    derived
}

impl<S> CampaignLifecycle<S>
where
    S: MarketplaceStore + 'static,
{
    /// Recompute every derived counter and back-reference from the campaign
    /// documents and rewrite the ones that drifted. Running it twice in a row
    /// repairs nothing the second time.
    pub fn reconcile(&self) -> Result<ReconcileReport, MarketError> {
        let report = self.commit_with_retry("reconcile", |now| {
            let mut report = ReconcileReport::default();
            let mut transaction = Transaction::new();

            let mut campaigns = Vec::new();
            for stored in self.store.campaigns(CampaignScan::All)? {
                let mut campaign = stored.document.clone();
                if campaign.recount() {
                    report.campaigns_repaired += 1;
                    transaction =
                        transaction.put_campaign(campaign.clone(), Expected::from(&stored));
                }
                campaigns.push(campaign);
            }
            campaigns.sort_by(|a, b| (a.created_at, &a.id).cmp(&(b.created_at, &b.id)));

            for stored in self.store.business_profiles()? {
                let mut current = stored.document.clone();
                sort_business_refs(&mut current);
                let mut derived = derive_business(&stored.document, &campaigns);
                if derived != current {
                    derived.updated_at = now;
                    report.businesses_repaired += 1;
                    transaction = transaction.put_business(derived, Expected::from(&stored));
                }
            }

            for stored in self.store.influencer_profiles()? {
                let mut current = stored.document.clone();
                sort_influencer_refs(&mut current);
                let mut derived = derive_influencer(&stored.document, &campaigns);
                if derived != current {
                    derived.updated_at = now;
                    report.influencers_repaired += 1;
                    transaction = transaction.put_influencer(derived, Expected::from(&stored));
                }
            }

            Ok((transaction, report))
        })?;

        info!(
            campaigns = report.campaigns_repaired,
            businesses = report.businesses_repaired,
            influencers = report.influencers_repaired,
            "reconcile finished"
        );
        Ok(report)
    }
}
