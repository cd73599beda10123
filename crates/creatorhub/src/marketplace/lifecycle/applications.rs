use serde::Serialize;
use tracing::info;

use super::collaborations::open_collaboration;
use super::CampaignLifecycle;
use crate::marketplace::domain::{
    Application, ApplicationId, ApplicationRef, ApplicationStatus, CampaignId, CampaignStatus,
    CollaborationOrigin, UserId,
};
use crate::marketplace::error::{ConflictKind, MarketError};
use crate::marketplace::identity::{Capability, Principal};
use crate::marketplace::repository::{CampaignScan, Expected, MarketplaceStore, Transaction};
use crate::marketplace::validation::{ApplicationDraft, ReviewDecision, ReviewDraft};

/// An influencer's application together with the campaign it targets.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApplicationSummary {
    pub campaign_id: CampaignId,
    pub campaign_title: String,
    pub business_id: UserId,
    pub campaign_status: CampaignStatus,
    pub application: Application,
}

impl<S> CampaignLifecycle<S>
where
    S: MarketplaceStore + 'static,
{
    /// Append a pending application. The campaign version check makes the
    /// one-application-per-influencer rule hold under concurrent submits.
    pub fn submit_application(
        &self,
        principal: &Principal,
        campaign_id: &CampaignId,
        draft: ApplicationDraft,
    ) -> Result<Application, MarketError> {
        principal.require(Capability::ApplyToCampaigns)?;
        let fields = draft.validate()?;
        let application_id = ApplicationId::generate();

        let application = self.commit_with_retry("submit_application", |now| {
            let influencer = self.require_influencer_profile(&principal.id)?;
            let stored = self.load_campaign(campaign_id)?;
            let mut campaign = stored.document.clone();
            if campaign.status != CampaignStatus::Active {
                return Err(ConflictKind::CampaignNotActive(campaign.status).into());
            }
            if campaign.application_from(&principal.id).is_some() {
                return Err(ConflictKind::DuplicateApplication.into());
            }

            let application = Application {
                id: application_id.clone(),
                influencer_id: principal.id.clone(),
                influencer_profile_id: influencer.document.id.clone(),
                proposed_rate: fields.proposed_rate,
                message: fields.message.clone(),
                portfolio_links: fields.portfolio_links.clone(),
                status: ApplicationStatus::Pending,
                applied_at: now,
                reviewed_at: None,
                business_notes: None,
            };
            campaign.applications.push(application.clone());
            campaign.recount();
            campaign.updated_at = now;

            let mut profile = influencer.document.clone();
            profile.campaign_applications.push(ApplicationRef {
                application_id: application.id.clone(),
                campaign_id: campaign.id.clone(),
                status: ApplicationStatus::Pending,
                applied_at: now,
            });
            profile.updated_at = now;

            let transaction = Transaction::new()
                .put_campaign(campaign, Expected::from(&stored))
                .put_influencer(profile, Expected::from(&influencer));
            Ok((transaction, application))
        })?;

        info!(
            %campaign_id,
            application_id = %application.id,
            influencer_id = %principal.id,
            "application submitted"
        );
        Ok(application)
    }

    pub fn withdraw_application(
        &self,
        principal: &Principal,
        application_id: &ApplicationId,
    ) -> Result<Application, MarketError> {
        principal.require(Capability::ApplyToCampaigns)?;

        let application = self.commit_with_retry("withdraw_application", |now| {
            let stored = self
                .store
                .campaign_with_application(application_id)?
                .ok_or_else(|| MarketError::not_found("application", application_id))?;
            let mut campaign = stored.document.clone();
            let application = campaign
                .application_mut(application_id)
                .ok_or_else(|| MarketError::not_found("application", application_id))?;
            if application.influencer_id != principal.id {
                return Err(MarketError::Forbidden {
                    resource: "application",
                });
            }
            if application.status != ApplicationStatus::Pending {
                return Err(ConflictKind::ApplicationNotPending(application.status).into());
            }
            application.status = ApplicationStatus::Withdrawn;
            let withdrawn = application.clone();
            campaign.updated_at = now;

            let mut transaction =
                Transaction::new().put_campaign(campaign, Expected::from(&stored));
            if let Some(influencer) = self.store.influencer_profile(&principal.id)? {
                let mut profile = influencer.document.clone();
                if let Some(entry) = profile.application_ref_mut(application_id) {
                    entry.status = ApplicationStatus::Withdrawn;
                }
                profile.updated_at = now;
                transaction = transaction.put_influencer(profile, Expected::from(&influencer));
            }
            Ok((transaction, withdrawn))
        })?;

        info!(%application_id, influencer_id = %principal.id, "application withdrawn");
        Ok(application)
    }

    /// Accept or reject a pending application. Acceptance opens a
    /// collaboration and counts toward the campaign's influencer cap.
    pub fn review_application(
        &self,
        principal: &Principal,
        application_id: &ApplicationId,
        draft: ReviewDraft,
    ) -> Result<Application, MarketError> {
        principal.require(Capability::ManageCampaigns)?;
        let (decision, notes) = draft.validate()?;
        let accept = decision == ReviewDecision::Accept;

        let application = self.commit_with_retry("review_application", |now| {
            let stored = self
                .store
                .campaign_with_application(application_id)?
                .ok_or_else(|| MarketError::not_found("application", application_id))?;
            if !stored.document.is_owned_by(&principal.id) {
                return Err(MarketError::Forbidden {
                    resource: "campaign",
                });
            }
            let mut campaign = stored.document.clone();
            if campaign.status.is_terminal() {
                return Err(ConflictKind::CampaignClosed(campaign.status).into());
            }

            let current = campaign
                .application(application_id)
                .ok_or_else(|| MarketError::not_found("application", application_id))?;
            if current.status != ApplicationStatus::Pending {
                return Err(ConflictKind::ApplicationNotPending(current.status).into());
            }
            let influencer_id = current.influencer_id.clone();
            let proposed_rate = current.proposed_rate;
            if accept {
                if self.policy.enforce_influencer_cap && campaign.is_full() {
                    return Err(MarketError::CampaignFull {
                        max: campaign.max_influencers,
                    });
                }
                if campaign.collaboration_with(&influencer_id).is_some() {
                    return Err(ConflictKind::AlreadyCollaborating.into());
                }
            }

            let status = if accept {
                ApplicationStatus::Accepted
            } else {
                ApplicationStatus::Rejected
            };
            let reviewed = match campaign.application_mut(application_id) {
                Some(application) => {
                    application.status = status;
                    application.reviewed_at = Some(now);
                    application.business_notes = notes.clone();
                    application.clone()
                }
                None => return Err(MarketError::not_found("application", application_id)),
            };

            let business = self.require_business_profile(&principal.id)?;
            let mut business_profile = business.document.clone();
            let influencer = self.store.influencer_profile(&influencer_id)?;
            let mut influencer_profile = influencer.as_ref().map(|stored| stored.document.clone());
            if let Some(profile) = influencer_profile.as_mut() {
                if let Some(entry) = profile.application_ref_mut(application_id) {
                    entry.status = status;
                }
                profile.updated_at = now;
            }

            if accept {
                open_collaboration(
                    &mut campaign,
                    Some(&mut business_profile),
                    influencer_profile.as_mut(),
                    &influencer_id,
                    CollaborationOrigin::Application(application_id.clone()),
                    proposed_rate,
                    now,
                );
            }
            campaign.recount();
            campaign.updated_at = now;

            let mut transaction = Transaction::new()
                .put_campaign(campaign, Expected::from(&stored))
                .put_business(business_profile, Expected::from(&business));
            if let (Some(stored_profile), Some(profile)) = (influencer.as_ref(), influencer_profile)
            {
                transaction = transaction.put_influencer(profile, Expected::from(stored_profile));
            }
            Ok((transaction, reviewed))
        })?;

        info!(
            %application_id,
            business_id = %principal.id,
            status = application.status.label(),
            "application reviewed"
        );
        Ok(application)
    }

    /// The caller's applications across all campaigns, newest first.
    pub fn my_applications(
        &self,
        principal: &Principal,
    ) -> Result<Vec<ApplicationSummary>, MarketError> {
        principal.require(Capability::ApplyToCampaigns)?;
        let mut summaries: Vec<ApplicationSummary> = self
            .store
            .campaigns(CampaignScan::Involving(&principal.id))?
            .into_iter()
            .filter_map(|stored| {
                let campaign = stored.document;
                let mut application = campaign.application_from(&principal.id)?.clone();
                application.business_notes = None;
                Some(ApplicationSummary {
                    campaign_id: campaign.id,
                    campaign_title: campaign.title,
                    business_id: campaign.business_id,
                    campaign_status: campaign.status,
                    application,
                })
            })
            .collect();
        summaries.sort_by(|a, b| {
            b.application
                .applied_at
                .cmp(&a.application.applied_at)
                .then_with(|| a.application.id.cmp(&b.application.id))
        });
        Ok(summaries)
    }
}
