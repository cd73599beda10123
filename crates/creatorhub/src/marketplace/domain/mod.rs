//! Marketplace documents: business and influencer profiles plus the campaign
//! aggregate with its embedded applications, invitations, and collaborations.

pub mod campaign;
pub mod ids;
pub mod profile;

pub use campaign::{
    Application, ApplicationStatus, Budget, Campaign, CampaignStatus, CampaignType,
    Collaboration, CollaborationOrigin, CollaborationStatus, ContentGuidelines, Deliverable,
    DeliverableKind, Invitation, InvitationStatus, Priority, Requirements, Timeline,
};
pub use ids::{ApplicationId, CampaignId, InvitationId, ProfileId, UserId};
pub use profile::{
    average_rating, AgeRange, ApplicationRef, AudienceProfile, BudgetRange, BusinessProfile,
    BusinessStats, CampaignPreferences, CampaignRef, CollaborationRef, CollaborationStyle,
    CompanyInfo, CompanySize, CompletedCampaignRef, ContactMethod, ContentProfile, Gender,
    Industry, InfluencerProfile, InfluencerStats, InvitationRef, Niche, Platform, PlatformRate,
    SentInvitationRef, SocialLink, TargetAudience, TARGET_AUDIENCE_VERSION,
};
