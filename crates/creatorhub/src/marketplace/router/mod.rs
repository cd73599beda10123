//! HTTP surface for the marketplace. Handlers only translate between the
//! wire and the engines; every engine error is mapped to the envelope once,
//! in [`envelope`].

mod envelope;
mod principal;

pub use principal::{PrincipalRejection, USER_ID_HEADER, USER_ROLE_HEADER};

use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::Serialize;

use super::clock::{Clock, SystemClock};
use super::domain::{ApplicationId, CampaignId, InvitationId, UserId};
use super::error::MarketError;
use super::identity::Principal;
use super::lifecycle::{CampaignLifecycle, LifecyclePolicy};
use super::matching::{BusinessFilters, CampaignFilters, InfluencerFilters, MatchingEngine};
use super::repository::MarketplaceStore;
use super::validation::{
    ApplicationDraft, BusinessProfileDraft, CampaignDraft, CompletionDraft,
    InfluencerProfileDraft, InvitationDraft, InvitationReply, ReviewDraft, StatusChange,
    ValidationErrors,
};
use crate::config::MarketplaceConfig;

/// Engines shared by every marketplace handler.
pub struct MarketplaceState<S> {
    pub lifecycle: Arc<CampaignLifecycle<S>>,
    pub matching: Arc<MatchingEngine<S>>,
}

impl<S> Clone for MarketplaceState<S> {
    fn clone(&self) -> Self {
        Self {
            lifecycle: Arc::clone(&self.lifecycle),
            matching: Arc::clone(&self.matching),
        }
    }
}

impl<S> MarketplaceState<S>
where
    S: MarketplaceStore + 'static,
{
    pub fn new(store: Arc<S>, config: &MarketplaceConfig) -> Self {
        Self::with_clock(store, Arc::new(SystemClock), config)
    }

    pub fn with_clock(store: Arc<S>, clock: Arc<dyn Clock>, config: &MarketplaceConfig) -> Self {
        Self {
            lifecycle: Arc::new(CampaignLifecycle::with_clock(
                Arc::clone(&store),
                Arc::clone(&clock),
                LifecyclePolicy::from(config),
            )),
            matching: Arc::new(MatchingEngine::with_clock(store, clock, config)),
        }
    }
}

/// Router builder exposing the marketplace endpoints under `/api/v1`.
pub fn marketplace_router<S>(state: MarketplaceState<S>) -> Router
where
    S: MarketplaceStore + 'static,
{
    Router::new()
        .route(
            "/api/v1/profiles/business",
            put(save_business_profile_handler::<S>),
        )
        .route(
            "/api/v1/profiles/influencer",
            put(save_influencer_profile_handler::<S>),
        )
        .route("/api/v1/profiles/me", get(my_profile_handler::<S>))
        .route("/api/v1/businesses", get(list_businesses_handler::<S>))
        .route(
            "/api/v1/influencers/matches",
            get(influencer_matches_handler::<S>),
        )
        .route(
            "/api/v1/campaigns",
            post(create_campaign_handler::<S>).get(list_campaigns_handler::<S>),
        )
        .route("/api/v1/campaigns/mine", get(my_campaigns_handler::<S>))
        .route("/api/v1/campaigns/{id}", get(campaign_handler::<S>))
        .route(
            "/api/v1/campaigns/{id}/publish",
            post(publish_campaign_handler::<S>),
        )
        .route(
            "/api/v1/campaigns/{id}/status",
            post(campaign_status_handler::<S>),
        )
        .route(
            "/api/v1/campaigns/{id}/applications",
            post(submit_application_handler::<S>),
        )
        .route(
            "/api/v1/campaigns/{id}/invitations",
            post(send_invitation_handler::<S>),
        )
        .route(
            "/api/v1/campaigns/{id}/collaborations/{influencer}/complete",
            post(complete_collaboration_handler::<S>),
        )
        .route(
            "/api/v1/applications/mine",
            get(my_applications_handler::<S>),
        )
        .route(
            "/api/v1/applications/{id}/review",
            post(review_application_handler::<S>),
        )
        .route(
            "/api/v1/applications/{id}/withdraw",
            post(withdraw_application_handler::<S>),
        )
        .route("/api/v1/invitations/mine", get(my_invitations_handler::<S>))
        .route(
            "/api/v1/invitations/{id}/respond",
            post(respond_invitation_handler::<S>),
        )
        .with_state(state)
}

fn respond<T: Serialize>(
    result: Result<T, MarketError>,
    status: StatusCode,
    entity: &'static str,
    message: Option<&str>,
) -> Response {
    match result {
        Ok(value) => envelope::success(status, entity, &value, message),
        Err(err) => err.into_response(),
    }
}

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, MarketError> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| ValidationErrors::single("body", rejection.body_text()).into())
}

fn query<T>(params: Result<Query<T>, QueryRejection>) -> Result<T, MarketError> {
    params
        .map(|Query(value)| value)
        .map_err(|rejection| ValidationErrors::single("query", rejection.body_text()).into())
}

pub(crate) async fn save_business_profile_handler<S>(
    State(state): State<MarketplaceState<S>>,
    principal: Principal,
    payload: Result<Json<BusinessProfileDraft>, JsonRejection>,
) -> Response
where
    S: MarketplaceStore + 'static,
{
    let result =
        body(payload).and_then(|draft| state.lifecycle.save_business_profile(&principal, draft));
    respond(result, StatusCode::OK, "profile", Some("Profile saved"))
}

pub(crate) async fn save_influencer_profile_handler<S>(
    State(state): State<MarketplaceState<S>>,
    principal: Principal,
    payload: Result<Json<InfluencerProfileDraft>, JsonRejection>,
) -> Response
where
    S: MarketplaceStore + 'static,
{
    let result = body(payload)
        .and_then(|draft| state.lifecycle.save_influencer_profile(&principal, draft));
    respond(result, StatusCode::OK, "profile", Some("Profile saved"))
}

pub(crate) async fn my_profile_handler<S>(
    State(state): State<MarketplaceState<S>>,
    principal: Principal,
) -> Response
where
    S: MarketplaceStore + 'static,
{
    respond(
        state.lifecycle.my_profile(&principal),
        StatusCode::OK,
        "profile",
        None,
    )
}

pub(crate) async fn list_businesses_handler<S>(
    State(state): State<MarketplaceState<S>>,
    principal: Principal,
    params: Result<Query<BusinessFilters>, QueryRejection>,
) -> Response
where
    S: MarketplaceStore + 'static,
{
    let result =
        query(params).and_then(|filters| state.matching.list_businesses(&principal, &filters));
    respond(result, StatusCode::OK, "businesses", None)
}

pub(crate) async fn influencer_matches_handler<S>(
    State(state): State<MarketplaceState<S>>,
    principal: Principal,
    params: Result<Query<InfluencerFilters>, QueryRejection>,
) -> Response
where
    S: MarketplaceStore + 'static,
{
    let result = query(params)
        .and_then(|filters| state.matching.list_influencer_matches(&principal, &filters));
    respond(result, StatusCode::OK, "influencers", None)
}

pub(crate) async fn create_campaign_handler<S>(
    State(state): State<MarketplaceState<S>>,
    principal: Principal,
    payload: Result<Json<CampaignDraft>, JsonRejection>,
) -> Response
where
    S: MarketplaceStore + 'static,
{
    let result = body(payload).and_then(|draft| state.lifecycle.create_campaign(&principal, draft));
    respond(
        result,
        StatusCode::CREATED,
        "campaign",
        Some("Campaign created"),
    )
}

pub(crate) async fn list_campaigns_handler<S>(
    State(state): State<MarketplaceState<S>>,
    principal: Principal,
    params: Result<Query<CampaignFilters>, QueryRejection>,
) -> Response
where
    S: MarketplaceStore + 'static,
{
    let result = query(params)
        .and_then(|filters| state.matching.list_active_campaigns(&principal, &filters));
    respond(result, StatusCode::OK, "campaigns", None)
}

pub(crate) async fn my_campaigns_handler<S>(
    State(state): State<MarketplaceState<S>>,
    principal: Principal,
) -> Response
where
    S: MarketplaceStore + 'static,
{
    respond(
        state.lifecycle.my_campaigns(&principal),
        StatusCode::OK,
        "campaigns",
        None,
    )
}

pub(crate) async fn campaign_handler<S>(
    State(state): State<MarketplaceState<S>>,
    principal: Principal,
    Path(id): Path<String>,
) -> Response
where
    S: MarketplaceStore + 'static,
{
    respond(
        state.lifecycle.campaign(&principal, &CampaignId(id)),
        StatusCode::OK,
        "campaign",
        None,
    )
}

pub(crate) async fn publish_campaign_handler<S>(
    State(state): State<MarketplaceState<S>>,
    principal: Principal,
    Path(id): Path<String>,
) -> Response
where
    S: MarketplaceStore + 'static,
{
    respond(
        state.lifecycle.publish_campaign(&principal, &CampaignId(id)),
        StatusCode::OK,
        "campaign",
        Some("Campaign published"),
    )
}

pub(crate) async fn campaign_status_handler<S>(
    State(state): State<MarketplaceState<S>>,
    principal: Principal,
    Path(id): Path<String>,
    payload: Result<Json<StatusChange>, JsonRejection>,
) -> Response
where
    S: MarketplaceStore + 'static,
{
    let result = body(payload).and_then(|change| {
        state
            .lifecycle
            .change_campaign_status(&principal, &CampaignId(id), change.status)
    });
    respond(
        result,
        StatusCode::OK,
        "campaign",
        Some("Campaign status updated"),
    )
}

pub(crate) async fn submit_application_handler<S>(
    State(state): State<MarketplaceState<S>>,
    principal: Principal,
    Path(id): Path<String>,
    payload: Result<Json<ApplicationDraft>, JsonRejection>,
) -> Response
where
    S: MarketplaceStore + 'static,
{
    let result = body(payload).and_then(|draft| {
        state
            .lifecycle
            .submit_application(&principal, &CampaignId(id), draft)
    });
    respond(
        result,
        StatusCode::CREATED,
        "application",
        Some("Application submitted"),
    )
}

pub(crate) async fn send_invitation_handler<S>(
    State(state): State<MarketplaceState<S>>,
    principal: Principal,
    Path(id): Path<String>,
    payload: Result<Json<InvitationDraft>, JsonRejection>,
) -> Response
where
    S: MarketplaceStore + 'static,
{
    let result = body(payload).and_then(|draft| {
        state
            .lifecycle
            .send_invitation(&principal, &CampaignId(id), draft)
    });
    respond(
        result,
        StatusCode::CREATED,
        "invitation",
        Some("Invitation sent"),
    )
}

pub(crate) async fn complete_collaboration_handler<S>(
    State(state): State<MarketplaceState<S>>,
    principal: Principal,
    Path((id, influencer)): Path<(String, String)>,
    payload: Result<Json<CompletionDraft>, JsonRejection>,
) -> Response
where
    S: MarketplaceStore + 'static,
{
    let result = body(payload).and_then(|draft| {
        state.lifecycle.complete_collaboration(
            &principal,
            &CampaignId(id),
            &UserId(influencer),
            draft,
        )
    });
    respond(
        result,
        StatusCode::OK,
        "collaboration",
        Some("Collaboration completed"),
    )
}

pub(crate) async fn my_applications_handler<S>(
    State(state): State<MarketplaceState<S>>,
    principal: Principal,
) -> Response
where
    S: MarketplaceStore + 'static,
{
    respond(
        state.lifecycle.my_applications(&principal),
        StatusCode::OK,
        "applications",
        None,
    )
}

pub(crate) async fn review_application_handler<S>(
    State(state): State<MarketplaceState<S>>,
    principal: Principal,
    Path(id): Path<String>,
    payload: Result<Json<ReviewDraft>, JsonRejection>,
) -> Response
where
    S: MarketplaceStore + 'static,
{
    let result = body(payload).and_then(|draft| {
        state
            .lifecycle
            .review_application(&principal, &ApplicationId(id), draft)
    });
    respond(
        result,
        StatusCode::OK,
        "application",
        Some("Application reviewed"),
    )
}

pub(crate) async fn withdraw_application_handler<S>(
    State(state): State<MarketplaceState<S>>,
    principal: Principal,
    Path(id): Path<String>,
) -> Response
where
    S: MarketplaceStore + 'static,
{
    respond(
        state
            .lifecycle
            .withdraw_application(&principal, &ApplicationId(id)),
        StatusCode::OK,
        "application",
        Some("Application withdrawn"),
    )
}

pub(crate) async fn my_invitations_handler<S>(
    State(state): State<MarketplaceState<S>>,
    principal: Principal,
) -> Response
where
    S: MarketplaceStore + 'static,
{
    respond(
        state.lifecycle.my_invitations(&principal),
        StatusCode::OK,
        "invitations",
        None,
    )
}

pub(crate) async fn respond_invitation_handler<S>(
    State(state): State<MarketplaceState<S>>,
    principal: Principal,
    Path(id): Path<String>,
    payload: Result<Json<InvitationReply>, JsonRejection>,
) -> Response
where
    S: MarketplaceStore + 'static,
{
    let result = body(payload).and_then(|reply| {
        state
            .lifecycle
            .respond_to_invitation(&principal, &InvitationId(id), reply)
    });
    respond(
        result,
        StatusCode::OK,
        "invitation",
        Some("Invitation answered"),
    )
}
