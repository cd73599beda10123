use serde::{Deserialize, Serialize};
use tracing::debug;

use super::domain::UserId;
use super::error::MarketError;

/// Closed set of marketplace roles resolved by the identity gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Business,
    Influencer,
}

impl Role {
    pub const fn label(self) -> &'static str {
        match self {
            Role::Business => "business",
            Role::Influencer => "influencer",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "business" | "brand" => Some(Role::Business),
            "influencer" | "creator" => Some(Role::Influencer),
            _ => None,
        }
    }

    pub const fn grants(self, capability: Capability) -> bool {
        use Capability::*;
        match self {
            Role::Business => matches!(
                capability,
                ManageBusinessProfile | ManageCampaigns | FindInfluencers | BrowseCampaigns
            ),
            Role::Influencer => matches!(
                capability,
                ManageInfluencerProfile
                    | ApplyToCampaigns
                    | RespondToInvitations
                    | BrowseCampaigns
                    | BrowseBusinesses
            ),
        }
    }
}

/// Operations gated on the caller's role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    ManageBusinessProfile,
    ManageInfluencerProfile,
    ManageCampaigns,
    FindInfluencers,
    ApplyToCampaigns,
    RespondToInvitations,
    BrowseCampaigns,
    BrowseBusinesses,
}

impl Capability {
    pub const fn label(self) -> &'static str {
        match self {
            Capability::ManageBusinessProfile => "manage business profile",
            Capability::ManageInfluencerProfile => "manage influencer profile",
            Capability::ManageCampaigns => "manage campaigns",
            Capability::FindInfluencers => "find influencers",
            Capability::ApplyToCampaigns => "apply to campaigns",
            Capability::RespondToInvitations => "respond to invitations",
            Capability::BrowseCampaigns => "browse campaigns",
            Capability::BrowseBusinesses => "browse businesses",
        }
    }
}

/// Authenticated caller attached to every request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub id: UserId,
    pub role: Role,
}

impl Principal {
    pub fn new(id: impl Into<String>, role: Role) -> Self {
        Self {
            id: UserId(id.into()),
            role,
        }
    }

    pub fn business(id: impl Into<String>) -> Self {
        Self::new(id, Role::Business)
    }

    pub fn influencer(id: impl Into<String>) -> Self {
        Self::new(id, Role::Influencer)
    }

    pub fn can(&self, capability: Capability) -> bool {
        self.role.grants(capability)
    }

    /// Capability gate shared by every engine operation.
    pub fn require(&self, capability: Capability) -> Result<(), MarketError> {
        if self.can(capability) {
            return Ok(());
        }
        debug!(
            user_id = %self.id,
            role = self.role.label(),
            capability = capability.label(),
            "capability denied"
        );
        Err(MarketError::Authorization {
            role: self.role,
            capability,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_split_campaign_capabilities() {
        assert!(Role::Business.grants(Capability::ManageCampaigns));
        assert!(!Role::Influencer.grants(Capability::ManageCampaigns));
        assert!(Role::Influencer.grants(Capability::ApplyToCampaigns));
        assert!(!Role::Business.grants(Capability::ApplyToCampaigns));
        assert!(Role::Business.grants(Capability::BrowseCampaigns));
        assert!(Role::Influencer.grants(Capability::BrowseCampaigns));
    }

    #[test]
    fn require_reports_the_denied_capability() {
        let creator = Principal::influencer("creator-1");
        assert!(creator.require(Capability::BrowseBusinesses).is_ok());
        match creator.require(Capability::FindInfluencers) {
            Err(MarketError::Authorization { role, capability }) => {
                assert_eq!(role, Role::Influencer);
                assert_eq!(capability, Capability::FindInfluencers);
            }
            other => panic!("expected authorization error, got {other:?}"),
        }
    }

    #[test]
    fn parse_accepts_aliases() {
        assert_eq!(Role::parse(" Brand "), Some(Role::Business));
        assert_eq!(Role::parse("creator"), Some(Role::Influencer));
        assert_eq!(Role::parse("admin"), None);
    }
}
