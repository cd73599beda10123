use super::domain::{ApplicationStatus, CampaignStatus, InvitationStatus};
use super::identity::{Capability, Role};
use super::repository::RepositoryError;
use super::validation::ValidationErrors;

/// Error taxonomy shared by the lifecycle and matching engines.
#[derive(Debug, thiserror::Error)]
pub enum MarketError {
    #[error(transparent)]
    Validation(#[from] ValidationErrors),
    #[error("{} accounts cannot {}", .role.label(), .capability.label())]
    Authorization { role: Role, capability: Capability },
    #[error("{resource} belongs to another account")]
    Forbidden { resource: &'static str },
    #[error("{resource} {id} not found")]
    NotFound { resource: &'static str, id: String },
    #[error(transparent)]
    Conflict(#[from] ConflictKind),
    #[error("a {} profile is required before this operation", .role.label())]
    ProfileRequired { role: Role },
    #[error("campaign already selected its maximum of {max} influencer(s)")]
    CampaignFull { max: u32 },
    #[error("campaign cannot move from {} to {}", .from.label(), .to.label())]
    InvalidTransition {
        from: CampaignStatus,
        to: CampaignStatus,
    },
    #[error(transparent)]
    Store(#[from] RepositoryError),
}

impl MarketError {
    pub(crate) fn not_found(resource: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            resource,
            id: id.to_string(),
        }
    }

    /// Machine readable code surfaced in the response envelope.
    pub fn code(&self) -> &'static str {
        match self {
            MarketError::Validation(_) => "validation_error",
            MarketError::Authorization { .. } => "authorization_error",
            MarketError::Forbidden { .. } => "forbidden",
            MarketError::NotFound { .. } => "not_found",
            MarketError::Conflict(_) => "conflict",
            MarketError::ProfileRequired { .. } => "profile_required",
            MarketError::CampaignFull { .. } => "campaign_full",
            MarketError::InvalidTransition { .. } => "invalid_transition",
            MarketError::Store(_) => "store_error",
        }
    }
}

/// State conflicts the caller should resolve by refreshing, not by retrying.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConflictKind {
    #[error("influencer already applied to this campaign")]
    DuplicateApplication,
    #[error("influencer was already invited to this campaign")]
    DuplicateInvitation,
    #[error("application is already {}", .0.label())]
    ApplicationNotPending(ApplicationStatus),
    #[error("invitation is already {}", .0.label())]
    InvitationNotPending(InvitationStatus),
    #[error("campaign is {} and not accepting applications", .0.label())]
    CampaignNotActive(CampaignStatus),
    #[error("campaign is {}", .0.label())]
    CampaignClosed(CampaignStatus),
    #[error("influencer already collaborates on this campaign")]
    AlreadyCollaborating,
    #[error("collaboration is already completed")]
    CollaborationCompleted,
    #[error("concurrent update kept winning; refresh and try again")]
    ConcurrentWrite,
}
