use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request};
use axum::response::Response;
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::Value;

use crate::config::MarketplaceConfig;
use crate::marketplace::clock::FixedClock;
use crate::marketplace::domain::{
    ApplicationId, BusinessProfile, Budget, Campaign, CampaignId, CampaignPreferences,
    CampaignStatus, CampaignType, CompanyInfo, CompanySize, ContentGuidelines, ContentProfile,
    Industry, InfluencerProfile, InvitationId, Niche, Platform, Priority, ProfileId,
    Requirements, SocialLink, TargetAudience, Timeline, UserId, TARGET_AUDIENCE_VERSION,
};
use crate::marketplace::identity::Principal;
use crate::marketplace::lifecycle::{CampaignLifecycle, LifecyclePolicy};
use crate::marketplace::repository::{
    CampaignScan, Expected, MarketplaceStore, MemoryStore, RepositoryError, Transaction,
    Versioned,
};
use crate::marketplace::router::{
    marketplace_router, MarketplaceState, USER_ID_HEADER, USER_ROLE_HEADER,
};
use crate::marketplace::validation::{
    ApplicationDraft, BudgetDraft, BusinessProfileDraft, CampaignDraft, CompanyDraft,
    InfluencerProfileDraft, TimelineDraft,
};

pub(crate) fn reference_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 4, 1, 9, 0, 0)
        .single()
        .expect("valid reference time")
}

pub(crate) fn fixed_clock() -> Arc<FixedClock> {
    Arc::new(FixedClock::new(reference_time()))
}

fn timeline() -> Timeline {
    let now = reference_time();
    Timeline {
        application_deadline: now + Duration::days(14),
        content_deadline: now + Duration::days(21),
        campaign_start: now + Duration::days(24),
        campaign_end: now + Duration::days(40),
    }
}

pub(crate) fn business_profile(user: &str) -> BusinessProfile {
    BusinessProfile {
        id: ProfileId(format!("prf-{user}")),
        user_id: UserId::from(user),
        company: CompanyInfo {
            name: format!("Brand {user}"),
            description: Some("Trail running gear".to_string()),
            industry: Industry::Health,
            size: Some(CompanySize::Small),
            headquarters: Some("Boulder".to_string()),
            website: Some("https://example.com".to_string()),
        },
        preferences: CampaignPreferences {
            budget_range: None,
            preferred_platforms: vec![Platform::Instagram],
            target_audience: Some(TargetAudience {
                version: TARGET_AUDIENCE_VERSION,
                age_ranges: Vec::new(),
                genders: Vec::new(),
                locations: Vec::new(),
                interests: vec![Niche::Fitness],
                notes: None,
            }),
            collaboration_style: None,
        },
        is_verified: false,
        is_active: true,
        stats: Default::default(),
        campaigns: Vec::new(),
        collaborations: Vec::new(),
        sent_invitations: Vec::new(),
        created_at: reference_time(),
        updated_at: reference_time(),
    }
}

pub(crate) fn influencer_profile(user: &str, niche: Niche, followers: u64) -> InfluencerProfile {
    InfluencerProfile {
        id: ProfileId(format!("prf-{user}")),
        user_id: UserId::from(user),
        display_name: format!("Creator {user}"),
        bio: None,
        profile_picture_url: None,
        primary_social: SocialLink {
            platform: Platform::Instagram,
            handle: user.to_string(),
            followers,
            niche,
            url: None,
        },
        secondary_social: Some(SocialLink {
            platform: Platform::Tiktok,
            handle: format!("{user}.clips"),
            followers: 0,
            niche,
            url: None,
        }),
        content: ContentProfile {
            content_types: vec!["reels".to_string()],
            languages: vec!["en".to_string()],
            engagement_rate: Some(4.2),
        },
        audience: Default::default(),
        pricing: Vec::new(),
        contact_preferences: Vec::new(),
        is_active: true,
        stats: Default::default(),
        campaign_applications: Vec::new(),
        direct_invitations: Vec::new(),
        completed_collaborations: Vec::new(),
        created_at: reference_time(),
        updated_at: reference_time(),
    }
}

pub(crate) fn campaign(owner: &str, profile: &BusinessProfile) -> Campaign {
    Campaign {
        id: CampaignId::generate(),
        business_id: UserId::from(owner),
        business_profile_id: profile.id.clone(),
        title: "Spring trail launch".to_string(),
        description: "Show off the new trail shoe".to_string(),
        campaign_type: CampaignType::SponsoredPost,
        category: Niche::Fitness,
        platforms: vec![Platform::Instagram, Platform::Tiktok],
        requirements: Requirements::default(),
        budget: Budget {
            total: 5000,
            per_influencer: 500,
            currency: "USD".to_string(),
        },
        timeline: timeline(),
        content_guidelines: ContentGuidelines::default(),
        deliverables: Vec::new(),
        max_influencers: 3,
        status: CampaignStatus::Active,
        is_featured: false,
        is_urgent: false,
        priority: Priority::Medium,
        applications_count: 0,
        selected_influencers: 0,
        applications: Vec::new(),
        invitations: Vec::new(),
        collaborations: Vec::new(),
        created_at: reference_time(),
        updated_at: reference_time(),
    }
}

/// Memory store holding the `brand-1` business profile.
pub(crate) fn seeded_store() -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    store
        .commit(Transaction::new().put_business(business_profile("brand-1"), Expected::Absent))
        .expect("seed business profile");
    store
}

pub(crate) fn campaign_draft() -> CampaignDraft {
    let timeline = timeline();
    CampaignDraft {
        title: Some("Spring trail launch".to_string()),
        description: Some("Show off the new trail shoe".to_string()),
        campaign_type: Some(CampaignType::SponsoredPost),
        category: Some(Niche::Fitness),
        platforms: vec![Platform::Instagram, Platform::Tiktok],
        budget: Some(BudgetDraft {
            total: Some(5000),
            per_influencer: Some(500),
            currency: Some("USD".to_string()),
        }),
        timeline: Some(TimelineDraft {
            application_deadline: Some(timeline.application_deadline),
            content_deadline: Some(timeline.content_deadline),
            campaign_start: Some(timeline.campaign_start),
            campaign_end: Some(timeline.campaign_end),
        }),
        max_influencers: Some(2),
        ..CampaignDraft::default()
    }
}

pub(crate) fn business_draft(name: &str) -> BusinessProfileDraft {
    BusinessProfileDraft {
        company: CompanyDraft {
            name: Some(name.to_string()),
            industry: Some(Industry::Health),
            website: Some("https://example.com".to_string()),
            ..CompanyDraft::default()
        },
        preferences: CampaignPreferences {
            preferred_platforms: vec![Platform::Instagram],
            ..CampaignPreferences::default()
        },
        is_active: None,
    }
}

pub(crate) fn influencer_draft(display_name: &str, niche: Niche, followers: u64) -> InfluencerProfileDraft {
    InfluencerProfileDraft {
        display_name: Some(display_name.to_string()),
        primary_social: Some(SocialLink {
            platform: Platform::Instagram,
            handle: format!("@{}", display_name.to_lowercase().replace(' ', "")),
            followers,
            niche,
            url: None,
        }),
        ..InfluencerProfileDraft::default()
    }
}

pub(crate) fn application_draft(rate: Option<u64>) -> ApplicationDraft {
    ApplicationDraft {
        proposed_rate: rate,
        message: Some("Would love to run this on my channel".to_string()),
        portfolio_links: vec!["https://example.com/reel".to_string()],
    }
}

pub(crate) fn engine_with<S>(store: Arc<S>, policy: LifecyclePolicy) -> CampaignLifecycle<S>
where
    S: MarketplaceStore + 'static,
{
    CampaignLifecycle::with_clock(store, fixed_clock(), policy)
}

pub(crate) fn engine(store: Arc<MemoryStore>) -> CampaignLifecycle<MemoryStore> {
    engine_with(store, LifecyclePolicy::default())
}

/// Engine plus one onboarded business and two onboarded influencers.
pub(crate) struct Marketplace {
    pub(crate) store: Arc<MemoryStore>,
    pub(crate) engine: CampaignLifecycle<MemoryStore>,
    pub(crate) brand: Principal,
    pub(crate) creator: Principal,
    pub(crate) other_creator: Principal,
}

impl Marketplace {
    pub(crate) fn new() -> Self {
        Self::with_policy(LifecyclePolicy::default())
    }

    pub(crate) fn with_policy(policy: LifecyclePolicy) -> Self {
        let store = Arc::new(MemoryStore::new());
        let engine = engine_with(Arc::clone(&store), policy);
        let brand = Principal::business("brand-1");
        let creator = Principal::influencer("creator-1");
        let other_creator = Principal::influencer("creator-2");
        engine
            .save_business_profile(&brand, business_draft("Trailhead Co"))
            .expect("business onboarded");
        engine
            .save_influencer_profile(&creator, influencer_draft("Trail Tess", Niche::Fitness, 42_000))
            .expect("creator onboarded");
        engine
            .save_influencer_profile(
                &other_creator,
                influencer_draft("Rowan Runs", Niche::Fitness, 18_000),
            )
            .expect("second creator onboarded");
        Self {
            store,
            engine,
            brand,
            creator,
            other_creator,
        }
    }

    pub(crate) fn launch(&self) -> Campaign {
        self.engine
            .create_campaign(&self.brand, campaign_draft())
            .expect("campaign created")
    }

    pub(crate) fn stored_campaign(&self, id: &CampaignId) -> Campaign {
        self.store
            .campaign(id)
            .expect("read campaign")
            .expect("campaign present")
            .document
    }

    pub(crate) fn business(&self) -> BusinessProfile {
        self.store
            .business_profile(&self.brand.id)
            .expect("read business")
            .expect("business present")
            .document
    }

    pub(crate) fn influencer(&self, principal: &Principal) -> InfluencerProfile {
        self.store
            .influencer_profile(&principal.id)
            .expect("read influencer")
            .expect("influencer present")
            .document
    }
}

/// Store whose every call fails as if the backend were offline.
pub(crate) struct UnavailableStore;

fn offline() -> RepositoryError {
    RepositoryError::Unavailable("database offline".to_string())
}

impl MarketplaceStore for UnavailableStore {
    fn campaign(&self, _id: &CampaignId) -> Result<Option<Versioned<Campaign>>, RepositoryError> {
        Err(offline())
    }

    fn campaign_with_application(
        &self,
        _id: &ApplicationId,
    ) -> Result<Option<Versioned<Campaign>>, RepositoryError> {
        Err(offline())
    }

    fn campaign_with_invitation(
        &self,
        _id: &InvitationId,
    ) -> Result<Option<Versioned<Campaign>>, RepositoryError> {
        Err(offline())
    }

    fn campaigns(
        &self,
        _scan: CampaignScan<'_>,
    ) -> Result<Vec<Versioned<Campaign>>, RepositoryError> {
        Err(offline())
    }

    fn business_profile(
        &self,
        _user: &UserId,
    ) -> Result<Option<Versioned<BusinessProfile>>, RepositoryError> {
        Err(offline())
    }

    fn influencer_profile(
        &self,
        _user: &UserId,
    ) -> Result<Option<Versioned<InfluencerProfile>>, RepositoryError> {
        Err(offline())
    }

    fn business_profiles(&self) -> Result<Vec<Versioned<BusinessProfile>>, RepositoryError> {
        Err(offline())
    }

    fn influencer_profiles(&self) -> Result<Vec<Versioned<InfluencerProfile>>, RepositoryError> {
        Err(offline())
    }

    fn commit(&self, _transaction: Transaction) -> Result<(), RepositoryError> {
        Err(offline())
    }
}

/// Reads from a real store but loses every commit race.
#[derive(Default)]
pub(crate) struct ContendedStore {
    pub(crate) inner: MemoryStore,
    pub(crate) attempts: AtomicUsize,
}

impl ContendedStore {
    pub(crate) fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

impl MarketplaceStore for ContendedStore {
    fn campaign(&self, id: &CampaignId) -> Result<Option<Versioned<Campaign>>, RepositoryError> {
        self.inner.campaign(id)
    }

    fn campaign_with_application(
        &self,
        id: &ApplicationId,
    ) -> Result<Option<Versioned<Campaign>>, RepositoryError> {
        self.inner.campaign_with_application(id)
    }

    fn campaign_with_invitation(
        &self,
        id: &InvitationId,
    ) -> Result<Option<Versioned<Campaign>>, RepositoryError> {
        self.inner.campaign_with_invitation(id)
    }

    fn campaigns(
        &self,
        scan: CampaignScan<'_>,
    ) -> Result<Vec<Versioned<Campaign>>, RepositoryError> {
        self.inner.campaigns(scan)
    }

    fn business_profile(
        &self,
        user: &UserId,
    ) -> Result<Option<Versioned<BusinessProfile>>, RepositoryError> {
        self.inner.business_profile(user)
    }

    fn influencer_profile(
        &self,
        user: &UserId,
    ) -> Result<Option<Versioned<InfluencerProfile>>, RepositoryError> {
        self.inner.influencer_profile(user)
    }

    fn business_profiles(&self) -> Result<Vec<Versioned<BusinessProfile>>, RepositoryError> {
        self.inner.business_profiles()
    }

    fn influencer_profiles(&self) -> Result<Vec<Versioned<InfluencerProfile>>, RepositoryError> {
        self.inner.influencer_profiles()
    }

    fn commit(&self, transaction: Transaction) -> Result<(), RepositoryError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        let key = transaction
            .into_puts()
            .first()
            .map(|put| put.document.key())
            .unwrap_or_default();
        Err(RepositoryError::VersionConflict { key })
    }
}

pub(crate) fn router_for(store: Arc<MemoryStore>) -> axum::Router {
    let state = MarketplaceState::with_clock(store, fixed_clock(), &MarketplaceConfig::default());
    marketplace_router(state)
}

pub(crate) fn request(
    method: Method,
    uri: &str,
    principal: Option<&Principal>,
    body: Option<Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(principal) = principal {
        builder = builder
            .header(USER_ID_HEADER, principal.id.as_str())
            .header(USER_ROLE_HEADER, principal.role.label());
    }
    let body = match body {
        Some(value) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(serde_json::to_vec(&value).expect("encode body"))
        }
        None => Body::empty(),
    };
    builder.body(body).expect("request builds")
}

pub(crate) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
