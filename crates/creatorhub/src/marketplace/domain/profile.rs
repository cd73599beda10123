use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::campaign::{ApplicationStatus, CampaignStatus, CollaborationStatus, InvitationStatus};
use super::ids::{ApplicationId, CampaignId, InvitationId, ProfileId, UserId};

/// Social platforms a campaign can target and an influencer can publish on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    Instagram,
    Youtube,
    Tiktok,
    Twitter,
    Facebook,
    Linkedin,
    Twitch,
    Snapchat,
    Pinterest,
}

/// Content category tag shared by campaign categories and influencer niches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Niche {
    Fashion,
    Beauty,
    Fitness,
    Food,
    Travel,
    Technology,
    Gaming,
    Lifestyle,
    Parenting,
    Finance,
    Education,
    Entertainment,
    Sports,
    Health,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Industry {
    Fashion,
    Beauty,
    Technology,
    FoodBeverage,
    Health,
    Travel,
    Finance,
    Entertainment,
    Education,
    Retail,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompanySize {
    Solo,
    Small,
    Medium,
    Large,
    Enterprise,
}

/// Monthly marketing budget bracket a business declares during onboarding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BudgetRange {
    #[serde(rename = "under_1k")]
    Under1k,
    #[serde(rename = "1k_5k")]
    From1kTo5k,
    #[serde(rename = "5k_25k")]
    From5kTo25k,
    #[serde(rename = "25k_100k")]
    From25kTo100k,
    #[serde(rename = "over_100k")]
    Over100k,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollaborationStyle {
    OneOff,
    LongTerm,
    Ambassador,
    Flexible,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactMethod {
    Email,
    Phone,
    DirectMessage,
    InApp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgeRange {
    #[serde(rename = "13-17")]
    Teen,
    #[serde(rename = "18-24")]
    YoungAdult,
    #[serde(rename = "25-34")]
    Adult,
    #[serde(rename = "35-44")]
    MidAdult,
    #[serde(rename = "45-54")]
    Mature,
    #[serde(rename = "55+")]
    Senior,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Female,
    Male,
    NonBinary,
    All,
}

pub const TARGET_AUDIENCE_VERSION: u16 = 1;

fn target_audience_version() -> u16 {
    TARGET_AUDIENCE_VERSION
}

/// Structured audience description. `version` lets the shape evolve without
/// falling back to opaque serialized blobs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetAudience {
    #[serde(default = "target_audience_version")]
    pub version: u16,
    #[serde(default)]
    pub age_ranges: Vec<AgeRange>,
    #[serde(default)]
    pub genders: Vec<Gender>,
    #[serde(default)]
    pub locations: Vec<String>,
    #[serde(default)]
    pub interests: Vec<Niche>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyInfo {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub industry: Industry,
    #[serde(default)]
    pub size: Option<CompanySize>,
    #[serde(default)]
    pub headquarters: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CampaignPreferences {
    #[serde(default)]
    pub budget_range: Option<BudgetRange>,
    #[serde(default)]
    pub preferred_platforms: Vec<Platform>,
    #[serde(default)]
    pub target_audience: Option<TargetAudience>,
    #[serde(default)]
    pub collaboration_style: Option<CollaborationStyle>,
}

/// Counters summarizing a business' campaigns and collaborations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BusinessStats {
    pub total_campaigns: u32,
    pub active_campaigns: u32,
    pub completed_campaigns: u32,
    pub total_spent: u64,
    pub total_influencers_worked_with: u32,
    pub average_rating: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignRef {
    pub campaign_id: CampaignId,
    pub status: CampaignStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollaborationRef {
    pub influencer_id: UserId,
    pub campaign_id: CampaignId,
    pub status: CollaborationStatus,
    pub rating: Option<u8>,
    pub review: Option<String>,
    pub started_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentInvitationRef {
    pub invitation_id: InvitationId,
    pub influencer_id: UserId,
    pub campaign_id: CampaignId,
    pub status: InvitationStatus,
    pub sent_at: DateTime<Utc>,
}

/// One per business-role user. The `stats`, `campaigns`, `collaborations`, and
/// `sent_invitations` fields are caches owned by the lifecycle engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusinessProfile {
    pub id: ProfileId,
    pub user_id: UserId,
    pub company: CompanyInfo,
    pub preferences: CampaignPreferences,
    pub is_verified: bool,
    pub is_active: bool,
    pub stats: BusinessStats,
    pub campaigns: Vec<CampaignRef>,
    pub collaborations: Vec<CollaborationRef>,
    pub sent_invitations: Vec<SentInvitationRef>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BusinessProfile {
    pub fn campaign_ref_mut(&mut self, campaign_id: &CampaignId) -> Option<&mut CampaignRef> {
        self.campaigns
            .iter_mut()
            .find(|entry| &entry.campaign_id == campaign_id)
    }

    pub fn collaboration_ref_mut(
        &mut self,
        campaign_id: &CampaignId,
        influencer_id: &UserId,
    ) -> Option<&mut CollaborationRef> {
        self.collaborations.iter_mut().find(|entry| {
            &entry.campaign_id == campaign_id && &entry.influencer_id == influencer_id
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SocialLink {
    pub platform: Platform,
    pub handle: String,
    pub followers: u64,
    pub niche: Niche,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentProfile {
    #[serde(default)]
    pub content_types: Vec<String>,
    #[serde(default)]
    pub languages: Vec<String>,
    #[serde(default)]
    pub engagement_rate: Option<f32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AudienceProfile {
    #[serde(default)]
    pub age_ranges: Vec<AgeRange>,
    #[serde(default)]
    pub genders: Vec<Gender>,
    #[serde(default)]
    pub top_locations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatformRate {
    pub platform: Platform,
    #[serde(default)]
    pub post: Option<u64>,
    #[serde(default)]
    pub story: Option<u64>,
    #[serde(default)]
    pub video: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InfluencerStats {
    pub total_campaigns: u32,
    pub completed_campaigns: u32,
    pub average_rating: f32,
    pub total_earnings: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationRef {
    pub application_id: ApplicationId,
    pub campaign_id: CampaignId,
    pub status: ApplicationStatus,
    pub applied_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvitationRef {
    pub invitation_id: InvitationId,
    pub business_id: UserId,
    pub campaign_id: CampaignId,
    pub status: InvitationStatus,
    pub invited_at: DateTime<Utc>,
    pub responded_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletedCampaignRef {
    pub campaign_id: CampaignId,
    pub business_id: UserId,
    pub rating: Option<u8>,
    pub review: Option<String>,
    pub earnings: u64,
    pub completed_at: DateTime<Utc>,
}

/// One per influencer-role user. `stats` and the three logs are caches owned by
/// the lifecycle engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InfluencerProfile {
    pub id: ProfileId,
    pub user_id: UserId,
    pub display_name: String,
    pub bio: Option<String>,
    pub profile_picture_url: Option<String>,
    pub primary_social: SocialLink,
    pub secondary_social: Option<SocialLink>,
    pub content: ContentProfile,
    pub audience: AudienceProfile,
    pub pricing: Vec<PlatformRate>,
    pub contact_preferences: Vec<ContactMethod>,
    pub is_active: bool,
    pub stats: InfluencerStats,
    pub campaign_applications: Vec<ApplicationRef>,
    pub direct_invitations: Vec<InvitationRef>,
    pub completed_collaborations: Vec<CompletedCampaignRef>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl InfluencerProfile {
    pub fn social_links(&self) -> impl Iterator<Item = &SocialLink> {
        std::iter::once(&self.primary_social).chain(self.secondary_social.iter())
    }

    /// Distinct niches across the primary and secondary links.
    pub fn niches(&self) -> Vec<Niche> {
        let mut niches: Vec<Niche> = self.social_links().map(|link| link.niche).collect();
        niches.sort();
        niches.dedup();
        niches
    }

    pub fn platforms(&self) -> Vec<Platform> {
        let mut platforms: Vec<Platform> =
            self.social_links().map(|link| link.platform).collect();
        platforms.sort();
        platforms.dedup();
        platforms
    }

    pub fn total_followers(&self) -> u64 {
        self.social_links()
            .map(|link| link.followers)
            .fold(0u64, u64::saturating_add)
    }

    pub fn application_ref_mut(
        &mut self,
        application_id: &ApplicationId,
    ) -> Option<&mut ApplicationRef> {
        self.campaign_applications
            .iter_mut()
            .find(|entry| &entry.application_id == application_id)
    }

    pub fn invitation_ref_mut(&mut self, invitation_id: &InvitationId) -> Option<&mut InvitationRef> {
        self.direct_invitations
            .iter_mut()
            .find(|entry| &entry.invitation_id == invitation_id)
    }
}

/// Mean of the supplied 1..=5 ratings, or zero when nothing has been rated yet.
pub fn average_rating(ratings: impl IntoIterator<Item = u8>) -> f32 {
    let (sum, count) = ratings
        .into_iter()
        .fold((0u32, 0u32), |(sum, count), rating| {
            (sum + u32::from(rating), count + 1)
        });
    if count == 0 {
        0.0
    } else {
        sum as f32 / count as f32
    }
}
