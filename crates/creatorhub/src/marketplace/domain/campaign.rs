use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{ApplicationId, CampaignId, InvitationId, ProfileId, UserId};
use super::profile::{AgeRange, Gender, Niche, Platform};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CampaignType {
    SponsoredPost,
    ProductReview,
    Giveaway,
    BrandAmbassador,
    EventCoverage,
    Unboxing,
    Tutorial,
    Other,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

/// Campaign lifecycle. `Completed` and `Cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CampaignStatus {
    Draft,
    Active,
    Paused,
    Completed,
    Cancelled,
}

impl CampaignStatus {
    pub const fn label(self) -> &'static str {
        match self {
            CampaignStatus::Draft => "draft",
            CampaignStatus::Active => "active",
            CampaignStatus::Paused => "paused",
            CampaignStatus::Completed => "completed",
            CampaignStatus::Cancelled => "cancelled",
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, CampaignStatus::Completed | CampaignStatus::Cancelled)
    }

    pub const fn can_transition_to(self, next: CampaignStatus) -> bool {
        use CampaignStatus::*;
        matches!(
            (self, next),
            (Draft, Active)
                | (Draft, Cancelled)
                | (Active, Paused)
                | (Active, Completed)
                | (Active, Cancelled)
                | (Paused, Active)
                | (Paused, Completed)
                | (Paused, Cancelled)
        )
    }
}

/// `Pending` is the only non-terminal application state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Pending,
    Accepted,
    Rejected,
    Withdrawn,
}

impl ApplicationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Accepted => "accepted",
            ApplicationStatus::Rejected => "rejected",
            ApplicationStatus::Withdrawn => "withdrawn",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvitationStatus {
    Pending,
    Accepted,
    Declined,
}

impl InvitationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            InvitationStatus::Pending => "pending",
            InvitationStatus::Accepted => "accepted",
            InvitationStatus::Declined => "declined",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollaborationStatus {
    Active,
    Completed,
}

/// Audience and reach filters a campaign advertises to applicants.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Requirements {
    #[serde(default)]
    pub min_followers: Option<u64>,
    #[serde(default)]
    pub max_followers: Option<u64>,
    #[serde(default)]
    pub min_engagement_rate: Option<f32>,
    #[serde(default)]
    pub age_ranges: Vec<AgeRange>,
    #[serde(default)]
    pub genders: Vec<Gender>,
    #[serde(default)]
    pub locations: Vec<String>,
    #[serde(default)]
    pub niches: Vec<Niche>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Budget {
    pub total: u64,
    pub per_influencer: u64,
    pub currency: String,
}

/// Ordered milestones: application deadline <= content deadline <= start <= end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timeline {
    pub application_deadline: DateTime<Utc>,
    pub content_deadline: DateTime<Utc>,
    pub campaign_start: DateTime<Utc>,
    pub campaign_end: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentGuidelines {
    #[serde(default)]
    pub hashtags: Vec<String>,
    #[serde(default)]
    pub mentions: Vec<String>,
    #[serde(default)]
    pub dos: Vec<String>,
    #[serde(default)]
    pub donts: Vec<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliverableKind {
    Post,
    Story,
    Reel,
    Video,
    Blog,
    Live,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deliverable {
    pub kind: DeliverableKind,
    pub platform: Platform,
    pub quantity: u16,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Application {
    pub id: ApplicationId,
    pub influencer_id: UserId,
    pub influencer_profile_id: ProfileId,
    pub proposed_rate: Option<u64>,
    pub message: Option<String>,
    pub portfolio_links: Vec<String>,
    pub status: ApplicationStatus,
    pub applied_at: DateTime<Utc>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub business_notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invitation {
    pub id: InvitationId,
    pub influencer_id: UserId,
    pub influencer_profile_id: ProfileId,
    pub message: Option<String>,
    pub proposed_rate: Option<u64>,
    pub status: InvitationStatus,
    pub sent_at: DateTime<Utc>,
    pub responded_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum CollaborationOrigin {
    Application(ApplicationId),
    Invitation(InvitationId),
}

/// Working relationship opened when an application or invitation is accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collaboration {
    pub influencer_id: UserId,
    pub origin: CollaborationOrigin,
    pub agreed_rate: u64,
    pub status: CollaborationStatus,
    pub rating: Option<u8>,
    pub review: Option<String>,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Central aggregate. Applications, invitations, and collaborations have no
/// lifecycle outside the campaign document that embeds them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Campaign {
    pub id: CampaignId,
    pub business_id: UserId,
    pub business_profile_id: ProfileId,
    pub title: String,
    pub description: String,
    pub campaign_type: CampaignType,
    pub category: Niche,
    pub platforms: Vec<Platform>,
    pub requirements: Requirements,
    pub budget: Budget,
    pub timeline: Timeline,
    pub content_guidelines: ContentGuidelines,
    pub deliverables: Vec<Deliverable>,
    pub max_influencers: u32,
    pub status: CampaignStatus,
    pub is_featured: bool,
    pub is_urgent: bool,
    pub priority: Priority,
    pub applications_count: u32,
    pub selected_influencers: u32,
    pub applications: Vec<Application>,
    pub invitations: Vec<Invitation>,
    pub collaborations: Vec<Collaboration>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Campaign {
    pub fn is_owned_by(&self, user: &UserId) -> bool {
        &self.business_id == user
    }

    pub fn application(&self, id: &ApplicationId) -> Option<&Application> {
        self.applications.iter().find(|application| &application.id == id)
    }

    pub fn application_mut(&mut self, id: &ApplicationId) -> Option<&mut Application> {
        self.applications
            .iter_mut()
            .find(|application| &application.id == id)
    }

    pub fn application_from(&self, influencer: &UserId) -> Option<&Application> {
        self.applications
            .iter()
            .find(|application| &application.influencer_id == influencer)
    }

    pub fn invitation(&self, id: &InvitationId) -> Option<&Invitation> {
        self.invitations.iter().find(|invitation| &invitation.id == id)
    }

    pub fn invitation_mut(&mut self, id: &InvitationId) -> Option<&mut Invitation> {
        self.invitations
            .iter_mut()
            .find(|invitation| &invitation.id == id)
    }

    pub fn invitation_for(&self, influencer: &UserId) -> Option<&Invitation> {
        self.invitations
            .iter()
            .find(|invitation| &invitation.influencer_id == influencer)
    }

    pub fn collaboration_with(&self, influencer: &UserId) -> Option<&Collaboration> {
        self.collaborations
            .iter()
            .find(|collaboration| &collaboration.influencer_id == influencer)
    }

    pub fn collaboration_with_mut(&mut self, influencer: &UserId) -> Option<&mut Collaboration> {
        self.collaborations
            .iter_mut()
            .find(|collaboration| &collaboration.influencer_id == influencer)
    }

    pub fn involves(&self, user: &UserId) -> bool {
        self.application_from(user).is_some() || self.invitation_for(user).is_some()
    }

    pub fn accepted_applications(&self) -> u32 {
        let accepted = self
            .applications
            .iter()
            .filter(|application| application.status == ApplicationStatus::Accepted)
            .count();
        u32::try_from(accepted).unwrap_or(u32::MAX)
    }

    /// Realign `applications_count` and `selected_influencers` with the embedded
    /// sub-collections. Returns whether anything changed.
    pub fn recount(&mut self) -> bool {
        let applications = u32::try_from(self.applications.len()).unwrap_or(u32::MAX);
        let selected = self.accepted_applications();
        let changed =
            self.applications_count != applications || self.selected_influencers != selected;
        self.applications_count = applications;
        self.selected_influencers = selected;
        changed
    }

    pub fn is_full(&self) -> bool {
        self.selected_influencers >= self.max_influencers
    }

    /// Copy with sub-collections narrowed to the entries `viewer` participates in.
    pub fn visible_to(&self, viewer: &UserId) -> Campaign {
        if self.is_owned_by(viewer) {
            return self.clone();
        }

        let mut view = self.clone();
        view.applications
            .retain(|application| &application.influencer_id == viewer);
        view.invitations
            .retain(|invitation| &invitation.influencer_id == viewer);
        view.collaborations
            .retain(|collaboration| &collaboration.influencer_id == viewer);
        for application in &mut view.applications {
            application.business_notes = None;
        }
        view
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_statuses_have_no_outgoing_edges() {
        let all = [
            CampaignStatus::Draft,
            CampaignStatus::Active,
            CampaignStatus::Paused,
            CampaignStatus::Completed,
            CampaignStatus::Cancelled,
        ];
        for terminal in [CampaignStatus::Completed, CampaignStatus::Cancelled] {
            assert!(terminal.is_terminal());
            for next in all {
                assert!(!terminal.can_transition_to(next));
            }
        }
    }

    #[test]
    fn paused_campaigns_can_resume() {
        assert!(CampaignStatus::Paused.can_transition_to(CampaignStatus::Active));
        assert!(!CampaignStatus::Active.can_transition_to(CampaignStatus::Draft));
        assert!(!CampaignStatus::Draft.can_transition_to(CampaignStatus::Paused));
    }

    #[test]
    fn collaboration_origin_is_tagged() {
        let origin = CollaborationOrigin::Invitation(InvitationId::from("inv-1"));
        let value = serde_json::to_value(origin).expect("serializes");
        assert_eq!(value, serde_json::json!({ "kind": "invitation", "id": "inv-1" }));
    }
}
