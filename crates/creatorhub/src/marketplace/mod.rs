//! Brand and influencer marketplace: campaign lifecycle, matching queries,
//! and the HTTP router that exposes them.

pub mod clock;
pub mod domain;
pub mod error;
pub mod identity;
pub mod lifecycle;
pub mod matching;
pub mod repository;
pub mod router;
pub mod validation;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{ConflictKind, MarketError};
pub use identity::{Capability, Principal, Role};
pub use lifecycle::{CampaignLifecycle, LifecyclePolicy, ReconcileReport};
pub use matching::{
    BusinessFilters, CampaignCard, CampaignFilters, InfluencerFilters, InfluencerMatch,
    InfluencerScorer, MatchingEngine, ScoringWeights, WeightedScorer,
};
pub use repository::{MarketplaceStore, MemoryStore, RepositoryError};
pub use router::{marketplace_router, MarketplaceState};
pub use validation::{FieldError, ValidationErrors};
