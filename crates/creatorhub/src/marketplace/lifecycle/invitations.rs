use serde::Serialize;
use tracing::info;

use super::collaborations::open_collaboration;
use super::CampaignLifecycle;
use crate::marketplace::domain::{
    CampaignId, CampaignStatus, CollaborationOrigin, Invitation, InvitationId, InvitationRef,
    InvitationStatus, SentInvitationRef, UserId,
};
use crate::marketplace::error::{ConflictKind, MarketError};
use crate::marketplace::identity::{Capability, Principal};
use crate::marketplace::repository::{CampaignScan, Expected, MarketplaceStore, Transaction};
use crate::marketplace::validation::{InvitationDraft, InvitationReply, InvitationResponse};

/// An invitation addressed to the caller together with its campaign.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvitationSummary {
    pub campaign_id: CampaignId,
    pub campaign_title: String,
    pub business_id: UserId,
    pub campaign_status: CampaignStatus,
    pub invitation: Invitation,
}

impl<S> CampaignLifecycle<S>
where
    S: MarketplaceStore + 'static,
{
    /// Invite one influencer to an owned campaign. Campaign, influencer
    /// profile and business profile are written together.
    pub fn send_invitation(
        &self,
        principal: &Principal,
        campaign_id: &CampaignId,
        draft: InvitationDraft,
    ) -> Result<Invitation, MarketError> {
        principal.require(Capability::ManageCampaigns)?;
        let fields = draft.validate()?;
        let invitation_id = InvitationId::generate();

        let invitation = self.commit_with_retry("send_invitation", |now| {
            let stored = self.load_owned_campaign(principal, campaign_id)?;
            let mut campaign = stored.document.clone();
            if campaign.status.is_terminal() {
                return Err(ConflictKind::CampaignClosed(campaign.status).into());
            }
            let influencer = self
                .store
                .influencer_profile(&fields.influencer_id)?
                .ok_or_else(|| MarketError::not_found("influencer", &fields.influencer_id))?;
            if campaign.invitation_for(&fields.influencer_id).is_some() {
                return Err(ConflictKind::DuplicateInvitation.into());
            }
            let business = self.require_business_profile(&principal.id)?;

            let invitation = Invitation {
                id: invitation_id.clone(),
                influencer_id: fields.influencer_id.clone(),
                influencer_profile_id: influencer.document.id.clone(),
                message: fields.message.clone(),
                proposed_rate: fields.proposed_rate,
                status: InvitationStatus::Pending,
                sent_at: now,
                responded_at: None,
            };
            campaign.invitations.push(invitation.clone());
            campaign.updated_at = now;

            let mut influencer_profile = influencer.document.clone();
            influencer_profile.direct_invitations.push(InvitationRef {
                invitation_id: invitation.id.clone(),
                business_id: principal.id.clone(),
                campaign_id: campaign.id.clone(),
                status: InvitationStatus::Pending,
                invited_at: now,
                responded_at: None,
            });
            influencer_profile.updated_at = now;

            let mut business_profile = business.document.clone();
            business_profile.sent_invitations.push(SentInvitationRef {
                invitation_id: invitation.id.clone(),
                influencer_id: fields.influencer_id.clone(),
                campaign_id: campaign.id.clone(),
                status: InvitationStatus::Pending,
                sent_at: now,
            });
            business_profile.updated_at = now;

            let transaction = Transaction::new()
                .put_campaign(campaign, Expected::from(&stored))
                .put_influencer(influencer_profile, Expected::from(&influencer))
                .put_business(business_profile, Expected::from(&business));
            Ok((transaction, invitation))
        })?;

        info!(
            %campaign_id,
            invitation_id = %invitation.id,
            influencer_id = %invitation.influencer_id,
            business_id = %principal.id,
            "invitation sent"
        );
        Ok(invitation)
    }

    /// Accept or decline a pending invitation. The campaign copy and both
    /// profile copies change in one commit.
    pub fn respond_to_invitation(
        &self,
        principal: &Principal,
        invitation_id: &InvitationId,
        reply: InvitationReply,
    ) -> Result<Invitation, MarketError> {
        principal.require(Capability::RespondToInvitations)?;
        let accept = reply.response == InvitationResponse::Accept;

        let invitation = self.commit_with_retry("respond_to_invitation", |now| {
            let stored = self
                .store
                .campaign_with_invitation(invitation_id)?
                .ok_or_else(|| MarketError::not_found("invitation", invitation_id))?;
            let mut campaign = stored.document.clone();
            let current = campaign
                .invitation(invitation_id)
                .ok_or_else(|| MarketError::not_found("invitation", invitation_id))?;
            if current.influencer_id != principal.id {
                return Err(MarketError::Forbidden {
                    resource: "invitation",
                });
            }
            if current.status != InvitationStatus::Pending {
                return Err(ConflictKind::InvitationNotPending(current.status).into());
            }
            let proposed_rate = current.proposed_rate;
            if accept {
                if campaign.status.is_terminal() {
                    return Err(ConflictKind::CampaignClosed(campaign.status).into());
                }
                if campaign.collaboration_with(&principal.id).is_some() {
                    return Err(ConflictKind::AlreadyCollaborating.into());
                }
            }

            let status = if accept {
                InvitationStatus::Accepted
            } else {
                InvitationStatus::Declined
            };
            let responded = match campaign.invitation_mut(invitation_id) {
                Some(invitation) => {
                    invitation.status = status;
                    invitation.responded_at = Some(now);
                    invitation.clone()
                }
                None => return Err(MarketError::not_found("invitation", invitation_id)),
            };

            let influencer = self.require_influencer_profile(&principal.id)?;
            let mut influencer_profile = influencer.document.clone();
            if let Some(entry) = influencer_profile.invitation_ref_mut(invitation_id) {
                entry.status = status;
                entry.responded_at = Some(now);
            }
            influencer_profile.updated_at = now;

            let business = self.store.business_profile(&campaign.business_id)?;
            let mut business_profile = business.as_ref().map(|stored| stored.document.clone());
            if let Some(profile) = business_profile.as_mut() {
                if let Some(entry) = profile
                    .sent_invitations
                    .iter_mut()
                    .find(|entry| &entry.invitation_id == invitation_id)
                {
                    entry.status = status;
                }
                profile.updated_at = now;
            }

            if accept {
                open_collaboration(
                    &mut campaign,
                    business_profile.as_mut(),
                    Some(&mut influencer_profile),
                    &principal.id,
                    CollaborationOrigin::Invitation(invitation_id.clone()),
                    proposed_rate,
                    now,
                );
            }
            campaign.updated_at = now;

            let mut transaction = Transaction::new()
                .put_campaign(campaign, Expected::from(&stored))
                .put_influencer(influencer_profile, Expected::from(&influencer));
            if let (Some(stored_profile), Some(profile)) = (business.as_ref(), business_profile) {
                transaction = transaction.put_business(profile, Expected::from(stored_profile));
            }
            Ok((transaction, responded))
        })?;

        info!(
            %invitation_id,
            influencer_id = %principal.id,
            status = invitation.status.label(),
            "invitation answered"
        );
        Ok(invitation)
    }

    /// Invitations addressed to the caller, newest first.
    pub fn my_invitations(
        &self,
        principal: &Principal,
    ) -> Result<Vec<InvitationSummary>, MarketError> {
        principal.require(Capability::RespondToInvitations)?;
        let mut summaries: Vec<InvitationSummary> = self
            .store
            .campaigns(CampaignScan::Involving(&principal.id))?
            .into_iter()
            .filter_map(|stored| {
                let campaign = stored.document;
                let invitation = campaign.invitation_for(&principal.id)?.clone();
                Some(InvitationSummary {
                    campaign_id: campaign.id,
                    campaign_title: campaign.title,
                    business_id: campaign.business_id,
                    campaign_status: campaign.status,
                    invitation,
                })
            })
            .collect();
        summaries.sort_by(|a, b| {
            b.invitation
                .sent_at
                .cmp(&a.invitation.sent_at)
                .then_with(|| a.invitation.id.cmp(&b.invitation.id))
        });
        Ok(summaries)
    }
}
