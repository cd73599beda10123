use serde::Serialize;
use tracing::info;

use super::CampaignLifecycle;
use crate::marketplace::domain::{BusinessProfile, InfluencerProfile, ProfileId};
use crate::marketplace::error::MarketError;
use crate::marketplace::identity::{Capability, Principal, Role};
use crate::marketplace::repository::{Expected, MarketplaceStore, Transaction};
use crate::marketplace::validation::{BusinessProfileDraft, InfluencerProfileDraft};

/// The caller's own profile, tagged with the role it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "role", content = "profile", rename_all = "snake_case")]
pub enum ProfileView {
    Business(BusinessProfile),
    Influencer(InfluencerProfile),
}

impl<S> CampaignLifecycle<S>
where
    S: MarketplaceStore + 'static,
{
    /// Create the caller's business profile, or replace its editable fields.
    /// Counters and back-references survive a replace.
    pub fn save_business_profile(
        &self,
        principal: &Principal,
        draft: BusinessProfileDraft,
    ) -> Result<BusinessProfile, MarketError> {
        principal.require(Capability::ManageBusinessProfile)?;
        let fields = draft.validate()?;

        let profile = self.commit_with_retry("save_business_profile", |now| {
            let existing = self.store.business_profile(&principal.id)?;
            let (profile, expected) = match &existing {
                Some(stored) => {
                    let mut profile = stored.document.clone();
                    profile.company = fields.company.clone();
                    profile.preferences = fields.preferences.clone();
                    profile.is_active = fields.is_active;
                    profile.updated_at = now;
                    (profile, Expected::from(stored))
                }
                None => (
                    BusinessProfile {
                        id: ProfileId::generate(),
                        user_id: principal.id.clone(),
                        company: fields.company.clone(),
                        preferences: fields.preferences.clone(),
                        is_verified: false,
                        is_active: fields.is_active,
                        stats: Default::default(),
                        campaigns: Vec::new(),
                        collaborations: Vec::new(),
                        sent_invitations: Vec::new(),
                        created_at: now,
                        updated_at: now,
                    },
                    Expected::Absent,
                ),
            };
            Ok((
                Transaction::new().put_business(profile.clone(), expected),
                profile,
            ))
        })?;

        info!(user_id = %principal.id, profile_id = %profile.id, "business profile saved");
        Ok(profile)
    }

    /// Create the caller's influencer profile, or replace its editable fields.
    pub fn save_influencer_profile(
        &self,
        principal: &Principal,
        draft: InfluencerProfileDraft,
    ) -> Result<InfluencerProfile, MarketError> {
        principal.require(Capability::ManageInfluencerProfile)?;
        let fields = draft.validate()?;

        let profile = self.commit_with_retry("save_influencer_profile", |now| {
            let existing = self.store.influencer_profile(&principal.id)?;
            let fields = fields.clone();
            let (profile, expected) = match &existing {
                Some(stored) => {
                    let mut profile = stored.document.clone();
                    profile.display_name = fields.display_name;
                    profile.bio = fields.bio;
                    profile.profile_picture_url = fields.profile_picture_url;
                    profile.primary_social = fields.primary_social;
                    profile.secondary_social = fields.secondary_social;
                    profile.content = fields.content;
                    profile.audience = fields.audience;
                    profile.pricing = fields.pricing;
                    profile.contact_preferences = fields.contact_preferences;
                    profile.is_active = fields.is_active;
                    profile.updated_at = now;
                    (profile, Expected::from(stored))
                }
                None => (
                    InfluencerProfile {
                        id: ProfileId::generate(),
                        user_id: principal.id.clone(),
                        display_name: fields.display_name,
                        bio: fields.bio,
                        profile_picture_url: fields.profile_picture_url,
                        primary_social: fields.primary_social,
                        secondary_social: fields.secondary_social,
                        content: fields.content,
                        audience: fields.audience,
                        pricing: fields.pricing,
                        contact_preferences: fields.contact_preferences,
                        is_active: fields.is_active,
                        stats: Default::default(),
                        campaign_applications: Vec::new(),
                        direct_invitations: Vec::new(),
                        completed_collaborations: Vec::new(),
                        created_at: now,
                        updated_at: now,
                    },
                    Expected::Absent,
                ),
            };
            Ok((
                Transaction::new().put_influencer(profile.clone(), expected),
                profile,
            ))
        })?;

        info!(user_id = %principal.id, profile_id = %profile.id, "influencer profile saved");
        Ok(profile)
    }

    pub fn my_profile(&self, principal: &Principal) -> Result<ProfileView, MarketError> {
        let view = match principal.role {
            Role::Business => self
                .store
                .business_profile(&principal.id)?
                .map(|stored| ProfileView::Business(stored.document)),
            Role::Influencer => self
                .store
                .influencer_profile(&principal.id)?
                .map(|stored| ProfileView::Influencer(stored.document)),
        };
        view.ok_or_else(|| MarketError::not_found("profile", &principal.id))
    }
}
