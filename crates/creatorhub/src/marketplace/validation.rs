//! Inbound payloads and the checks that turn them into trusted field sets.
//!
//! Every draft keeps its required fields optional so a single pass can report
//! all missing or invalid fields at once instead of failing on the first.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{
    AudienceProfile, Budget, CampaignPreferences, CampaignStatus, CampaignType, CompanyInfo,
    CompanySize, ContactMethod, ContentGuidelines, ContentProfile, Deliverable, Industry, Niche,
    Platform, PlatformRate, Priority, Requirements, SocialLink, Timeline, UserId,
};

const MAX_TITLE_LEN: usize = 120;
const MAX_MESSAGE_LEN: usize = 2000;
const MAX_BIO_LEN: usize = 1000;
const MAX_PORTFOLIO_LINKS: usize = 10;

/// A single rejected field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Accumulated field failures for one payload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::default();
        errors.push(field, message);
        errors
    }

    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(FieldError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    pub fn has(&self, field: &str) -> bool {
        self.errors.iter().any(|error| error.field == field)
    }

    fn require<T>(&mut self, field: &str, value: Option<T>) -> Option<T> {
        if value.is_none() {
            self.push(field, "is required");
        }
        value
    }

    fn require_text(&mut self, field: &str, value: Option<String>) -> Option<String> {
        match value.map(|text| text.trim().to_string()) {
            Some(text) if !text.is_empty() => Some(text),
            _ => {
                self.push(field, "is required");
                None
            }
        }
    }

    fn limit_len(&mut self, field: &str, value: Option<&str>, max: usize) {
        if let Some(text) = value {
            if text.chars().count() > max {
                self.push(field, format!("must be at most {max} characters"));
            }
        }
    }

    fn finish<T>(self, value: impl FnOnce() -> Option<T>) -> Result<T, ValidationErrors> {
        if !self.is_empty() {
            return Err(self);
        }
        value().ok_or(self)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.errors.is_empty() {
            return write!(f, "invalid payload");
        }
        let details: Vec<String> = self
            .errors
            .iter()
            .map(|error| format!("{} {}", error.field, error.message))
            .collect();
        write!(f, "invalid or missing fields: {}", details.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct BudgetDraft {
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default)]
    pub per_influencer: Option<u64>,
    #[serde(default)]
    pub currency: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TimelineDraft {
    #[serde(default)]
    pub application_deadline: Option<DateTime<Utc>>,
    #[serde(default)]
    pub content_deadline: Option<DateTime<Utc>>,
    #[serde(default)]
    pub campaign_start: Option<DateTime<Utc>>,
    #[serde(default)]
    pub campaign_end: Option<DateTime<Utc>>,
}

/// Payload for creating a campaign.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CampaignDraft {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub campaign_type: Option<CampaignType>,
    #[serde(default)]
    pub category: Option<Niche>,
    #[serde(default)]
    pub platforms: Vec<Platform>,
    #[serde(default)]
    pub requirements: Requirements,
    #[serde(default)]
    pub budget: Option<BudgetDraft>,
    #[serde(default)]
    pub timeline: Option<TimelineDraft>,
    #[serde(default)]
    pub content_guidelines: ContentGuidelines,
    #[serde(default)]
    pub deliverables: Vec<Deliverable>,
    #[serde(default)]
    pub max_influencers: Option<u32>,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default)]
    pub is_urgent: bool,
    #[serde(default)]
    pub priority: Option<Priority>,
}

/// Validated campaign fields, ready to be stamped with ids and ownership.
#[derive(Debug, Clone, PartialEq)]
pub struct CampaignFields {
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
    pub is_featured: bool,
    pub is_urgent: bool,
    pub priority: Priority,
}

impl CampaignDraft {
    pub fn validate(self) -> Result<CampaignFields, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let title = errors.require_text("title", self.title);
        errors.limit_len("title", title.as_deref(), MAX_TITLE_LEN);
        let description = errors.require_text("description", self.description);
        let campaign_type = errors.require("campaign_type", self.campaign_type);
        let category = errors.require("category", self.category);

        let mut platforms = self.platforms;
        platforms.sort();
        platforms.dedup();
        if platforms.is_empty() {
            errors.push("platforms", "must list at least one platform");
        }

        let budget = validate_budget(&mut errors, self.budget.unwrap_or_default());
        let timeline = validate_timeline(&mut errors, self.timeline.unwrap_or_default());

        let max_influencers = errors.require("max_influencers", self.max_influencers);
        if max_influencers == Some(0) {
            errors.push("max_influencers", "must be at least 1");
        }

        validate_requirements(&mut errors, &self.requirements);

        for (index, deliverable) in self.deliverables.iter().enumerate() {
            if deliverable.quantity == 0 {
                errors.push(
                    format!("deliverables[{index}].quantity"),
                    "must be at least 1",
                );
            }
        }

        let requirements = self.requirements;
        let content_guidelines = self.content_guidelines;
        let deliverables = self.deliverables;
        errors.finish(|| {
            Some(CampaignFields {
                title: title?,
                description: description?,
                campaign_type: campaign_type?,
                category: category?,
                platforms,
                requirements,
                budget: budget?,
                timeline: timeline?,
                content_guidelines,
                deliverables,
                max_influencers: max_influencers?,
                is_featured: self.is_featured,
                is_urgent: self.is_urgent,
                priority: self.priority.unwrap_or_default(),
            })
        })
    }
}

fn validate_budget(errors: &mut ValidationErrors, draft: BudgetDraft) -> Option<Budget> {
    let total = errors.require("budget.total", draft.total);
    let per_influencer = errors.require("budget.per_influencer", draft.per_influencer);

    if total == Some(0) {
        errors.push("budget.total", "must be greater than zero");
    }
    if per_influencer == Some(0) {
        errors.push("budget.per_influencer", "must be greater than zero");
    }
    if let (Some(total), Some(per)) = (total, per_influencer) {
        if per > total {
            errors.push("budget.per_influencer", "cannot exceed budget.total");
        }
    }

    let currency = trimmed(draft.currency)
        .unwrap_or_else(|| "USD".to_string())
        .to_ascii_uppercase();
    if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_alphabetic()) {
        errors.push("budget.currency", "must be a three letter currency code");
    }

    Some(Budget {
        total: total?,
        per_influencer: per_influencer?,
        currency,
    })
}

fn validate_timeline(errors: &mut ValidationErrors, draft: TimelineDraft) -> Option<Timeline> {
    let application_deadline =
        errors.require("timeline.application_deadline", draft.application_deadline);
    let content_deadline = errors.require("timeline.content_deadline", draft.content_deadline);
    let campaign_start = errors.require("timeline.campaign_start", draft.campaign_start);
    let campaign_end = errors.require("timeline.campaign_end", draft.campaign_end);

    let timeline = Timeline {
        application_deadline: application_deadline?,
        content_deadline: content_deadline?,
        campaign_start: campaign_start?,
        campaign_end: campaign_end?,
    };

    if timeline.content_deadline < timeline.application_deadline {
        errors.push(
            "timeline.content_deadline",
            "must not precede the application deadline",
        );
    }
    if timeline.campaign_start < timeline.content_deadline {
        errors.push(
            "timeline.campaign_start",
            "must not precede the content deadline",
        );
    }
    if timeline.campaign_end < timeline.campaign_start {
        errors.push("timeline.campaign_end", "must not precede the campaign start");
    }

    Some(timeline)
}

fn validate_requirements(errors: &mut ValidationErrors, requirements: &Requirements) {
    if let (Some(min), Some(max)) = (requirements.min_followers, requirements.max_followers) {
        if min > max {
            errors.push(
                "requirements.min_followers",
                "cannot exceed requirements.max_followers",
            );
        }
    }
    if let Some(rate) = requirements.min_engagement_rate {
        if !(0.0..=100.0).contains(&rate) {
            errors.push(
                "requirements.min_engagement_rate",
                "must be a percentage between 0 and 100",
            );
        }
    }
}

/// Payload an influencer submits when applying to a campaign.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ApplicationDraft {
    #[serde(default)]
    pub proposed_rate: Option<u64>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub portfolio_links: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationFields {
    pub proposed_rate: Option<u64>,
    pub message: Option<String>,
    pub portfolio_links: Vec<String>,
}

impl ApplicationDraft {
    pub fn validate(self) -> Result<ApplicationFields, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        if self.proposed_rate == Some(0) {
            errors.push("proposed_rate", "must be greater than zero");
        }
        let message = trimmed(self.message);
        errors.limit_len("message", message.as_deref(), MAX_MESSAGE_LEN);

        if self.portfolio_links.len() > MAX_PORTFOLIO_LINKS {
            errors.push(
                "portfolio_links",
                format!("must list at most {MAX_PORTFOLIO_LINKS} links"),
            );
        }
        let mut portfolio_links = Vec::with_capacity(self.portfolio_links.len());
        for (index, link) in self.portfolio_links.into_iter().enumerate() {
            let link = link.trim().to_string();
            if link.is_empty() {
                errors.push(format!("portfolio_links[{index}]"), "must not be blank");
            } else {
                portfolio_links.push(link);
            }
        }

        let proposed_rate = self.proposed_rate;
        errors.finish(|| {
            Some(ApplicationFields {
                proposed_rate,
                message,
                portfolio_links,
            })
        })
    }
}

/// Payload a business sends to invite a specific influencer.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct InvitationDraft {
    #[serde(default)]
    pub influencer_id: Option<UserId>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub proposed_rate: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvitationFields {
    pub influencer_id: UserId,
    pub message: Option<String>,
    pub proposed_rate: Option<u64>,
}

impl InvitationDraft {
    pub fn validate(self) -> Result<InvitationFields, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let influencer_id = errors
            .require_text("influencer_id", self.influencer_id.map(|id| id.0))
            .map(UserId);
        let message = trimmed(self.message);
        errors.limit_len("message", message.as_deref(), MAX_MESSAGE_LEN);
        if self.proposed_rate == Some(0) {
            errors.push("proposed_rate", "must be greater than zero");
        }

        let proposed_rate = self.proposed_rate;
        errors.finish(|| {
            Some(InvitationFields {
                influencer_id: influencer_id?,
                message,
                proposed_rate,
            })
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewDecision {
    Accept,
    Reject,
}

/// Business decision on a pending application.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReviewDraft {
    pub decision: ReviewDecision,
    #[serde(default)]
    pub business_notes: Option<String>,
}

impl ReviewDraft {
    pub fn validate(self) -> Result<(ReviewDecision, Option<String>), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        let notes = trimmed(self.business_notes);
        errors.limit_len("business_notes", notes.as_deref(), MAX_MESSAGE_LEN);
        let decision = self.decision;
        errors.finish(|| Some((decision, notes)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvitationResponse {
    Accept,
    Decline,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct InvitationReply {
    pub response: InvitationResponse,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct StatusChange {
    pub status: CampaignStatus,
}

/// Business rating of a finished collaboration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CompletionDraft {
    #[serde(default)]
    pub rating: Option<u8>,
    #[serde(default)]
    pub review: Option<String>,
}

impl CompletionDraft {
    pub fn validate(self) -> Result<(u8, Option<String>), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        let rating = errors.require("rating", self.rating);
        if let Some(value) = rating {
            if !(1..=5).contains(&value) {
                errors.push("rating", "must be between 1 and 5");
            }
        }
        let review = trimmed(self.review);
        errors.limit_len("review", review.as_deref(), MAX_MESSAGE_LEN);
        errors.finish(|| Some((rating?, review)))
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CompanyDraft {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub industry: Option<Industry>,
    #[serde(default)]
    pub size: Option<CompanySize>,
    #[serde(default)]
    pub headquarters: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
}

/// Full-replace payload for a business profile.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct BusinessProfileDraft {
    #[serde(default)]
    pub company: CompanyDraft,
    #[serde(default)]
    pub preferences: CampaignPreferences,
    #[serde(default)]
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BusinessProfileFields {
    pub company: CompanyInfo,
    pub preferences: CampaignPreferences,
    pub is_active: bool,
}

impl BusinessProfileDraft {
    pub fn validate(self) -> Result<BusinessProfileFields, ValidationErrors> {
        let mut errors = ValidationErrors::default();
        let company = self.company;

        let name = errors.require_text("company.name", company.name);
        let industry = errors.require("company.industry", company.industry);
        let website = trimmed(company.website);
        if let Some(url) = website.as_deref() {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                errors.push("company.website", "must be an http(s) URL");
            }
        }

        let mut preferences = self.preferences;
        preferences.preferred_platforms.sort();
        preferences.preferred_platforms.dedup();

        let description = trimmed(company.description);
        let headquarters = trimmed(company.headquarters);
        let size = company.size;
        let is_active = self.is_active.unwrap_or(true);
        errors.finish(|| {
            Some(BusinessProfileFields {
                company: CompanyInfo {
                    name: name?,
                    description,
                    industry: industry?,
                    size,
                    headquarters,
                    website,
                },
                preferences,
                is_active,
            })
        })
    }
}

/// Full-replace payload for an influencer profile.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct InfluencerProfileDraft {
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub profile_picture_url: Option<String>,
    #[serde(default)]
    pub primary_social: Option<SocialLink>,
    #[serde(default)]
    pub secondary_social: Option<SocialLink>,
    #[serde(default)]
    pub content: ContentProfile,
    #[serde(default)]
    pub audience: AudienceProfile,
    #[serde(default)]
    pub pricing: Vec<PlatformRate>,
    #[serde(default)]
    pub contact_preferences: Vec<ContactMethod>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InfluencerProfileFields {
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
}

impl InfluencerProfileDraft {
    pub fn validate(self) -> Result<InfluencerProfileFields, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let display_name = errors.require_text("display_name", self.display_name);
        let bio = trimmed(self.bio);
        errors.limit_len("bio", bio.as_deref(), MAX_BIO_LEN);

        let primary_social = errors
            .require("primary_social", self.primary_social)
            .and_then(|link| normalize_link(&mut errors, "primary_social", link));
        let secondary_social = self
            .secondary_social
            .and_then(|link| normalize_link(&mut errors, "secondary_social", link));

        if let Some(rate) = self.content.engagement_rate {
            if !(0.0..=100.0).contains(&rate) {
                errors.push(
                    "content.engagement_rate",
                    "must be a percentage between 0 and 100",
                );
            }
        }

        let profile_picture_url = trimmed(self.profile_picture_url);
        let content = self.content;
        let audience = self.audience;
        let pricing = self.pricing;
        let contact_preferences = self.contact_preferences;
        let is_active = self.is_active.unwrap_or(true);
        errors.finish(|| {
            Some(InfluencerProfileFields {
                display_name: display_name?,
                bio,
                profile_picture_url,
                primary_social: primary_social?,
                secondary_social,
                content,
                audience,
                pricing,
                contact_preferences,
                is_active,
            })
        })
    }
}

fn normalize_link(
    errors: &mut ValidationErrors,
    field: &str,
    mut link: SocialLink,
) -> Option<SocialLink> {
    let handle = link.handle.trim().trim_start_matches('@').to_string();
    if handle.is_empty() {
        errors.push(format!("{field}.handle"), "is required");
        return None;
    }
    link.handle = handle;
    Some(link)
}
