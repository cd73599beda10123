use std::sync::Arc;

use super::common::*;
use crate::marketplace::domain::{CampaignStatus, CampaignType, Niche};
use crate::marketplace::error::{ConflictKind, MarketError};
use crate::marketplace::identity::{Capability, Principal, Role};
use crate::marketplace::lifecycle::LifecyclePolicy;
use crate::marketplace::repository::{CampaignScan, Expected, MarketplaceStore, MemoryStore, Transaction};
use crate::marketplace::validation::CampaignDraft;

#[test]
fn create_campaign_publishes_and_counts_on_the_business() {
    let market = Marketplace::new();
    let campaign = market.launch();

    assert_eq!(campaign.status, CampaignStatus::Active);
    assert_eq!(campaign.business_id, market.brand.id);
    assert_eq!(campaign.business_profile_id, market.business().id);
    assert_eq!(campaign.applications_count, 0);

    let business = market.business();
    assert_eq!(business.stats.total_campaigns, 1);
    assert_eq!(business.stats.active_campaigns, 1);
    assert_eq!(business.campaigns.len(), 1);
    assert_eq!(business.campaigns[0].campaign_id, campaign.id);
    assert_eq!(business.campaigns[0].status, CampaignStatus::Active);
}

#[test]
fn influencers_cannot_create_campaigns() {
    let market = Marketplace::new();
    let result = market.engine.create_campaign(&market.creator, campaign_draft());

    match result {
        Err(MarketError::Authorization { role, capability }) => {
            assert_eq!(role, Role::Influencer);
            assert_eq!(capability, Capability::ManageCampaigns);
        }
        other => panic!("expected authorization error, got {other:?}"),
    }
    let stored = market
        .store
        .campaigns(CampaignScan::All)
        .expect("scan succeeds");
    assert!(stored.is_empty());
}

#[test]
fn create_campaign_requires_a_business_profile() {
    let engine = engine(Arc::new(MemoryStore::new()));
    let result = engine.create_campaign(&Principal::business("brand-new"), campaign_draft());
    assert!(matches!(
        result,
        Err(MarketError::ProfileRequired {
            role: Role::Business
        })
    ));
}

#[test]
fn invalid_drafts_enumerate_every_failing_field() {
    let market = Marketplace::new();
    let draft = CampaignDraft {
        campaign_type: Some(CampaignType::Giveaway),
        category: Some(Niche::Food),
        ..CampaignDraft::default()
    };

    match market.engine.create_campaign(&market.brand, draft) {
        Err(MarketError::Validation(errors)) => {
            for field in ["title", "description", "platforms", "budget.total", "max_influencers"] {
                assert!(errors.has(field), "expected {field} in {errors}");
            }
            assert!(!errors.has("campaign_type"));
        }
        other => panic!("expected validation error, got {other:?}"),
    }
    assert_eq!(market.business().stats.total_campaigns, 0);
}

#[test]
fn draft_mode_requires_an_explicit_publish() {
    let market = Marketplace::with_policy(LifecyclePolicy {
        publish_on_create: false,
        ..LifecyclePolicy::default()
    });
    let campaign = market.launch();
    assert_eq!(campaign.status, CampaignStatus::Draft);
    assert_eq!(market.business().stats.active_campaigns, 0);

    let hidden = market.engine.campaign(&market.creator, &campaign.id);
    assert!(matches!(hidden, Err(MarketError::NotFound { .. })));
    let applied = market.engine.submit_application(
        &market.creator,
        &campaign.id,
        application_draft(None),
    );
    assert!(matches!(
        applied,
        Err(MarketError::Conflict(ConflictKind::CampaignNotActive(
            CampaignStatus::Draft
        )))
    ));

    let published = market
        .engine
        .publish_campaign(&market.brand, &campaign.id)
        .expect("publish succeeds");
    assert_eq!(published.status, CampaignStatus::Active);
    assert_eq!(market.business().stats.active_campaigns, 1);
    assert_eq!(market.business().campaigns[0].status, CampaignStatus::Active);

    let again = market.engine.publish_campaign(&market.brand, &campaign.id);
    assert!(matches!(
        again,
        Err(MarketError::InvalidTransition {
            from: CampaignStatus::Active,
            to: CampaignStatus::Active
        })
    ));
}

#[test]
fn status_changes_follow_the_state_machine_and_keep_counters() {
    let market = Marketplace::new();
    let campaign = market.launch();

    market
        .engine
        .change_campaign_status(&market.brand, &campaign.id, CampaignStatus::Paused)
        .expect("pause");
    assert_eq!(market.business().stats.active_campaigns, 0);

    market
        .engine
        .change_campaign_status(&market.brand, &campaign.id, CampaignStatus::Completed)
        .expect("complete from paused");
    let business = market.business();
    assert_eq!(business.stats.completed_campaigns, 1);
    assert_eq!(business.campaigns[0].status, CampaignStatus::Completed);

    let reopened =
        market
            .engine
            .change_campaign_status(&market.brand, &campaign.id, CampaignStatus::Active);
    assert!(matches!(
        reopened,
        Err(MarketError::InvalidTransition {
            from: CampaignStatus::Completed,
            ..
        })
    ));
    assert_eq!(
        market.stored_campaign(&campaign.id).status,
        CampaignStatus::Completed
    );
}

#[test]
fn only_the_owner_changes_status() {
    let market = Marketplace::new();
    let campaign = market.launch();
    let rival = Principal::business("brand-2");
    market
        .engine
        .save_business_profile(&rival, business_draft("Rival Co"))
        .expect("rival onboarded");

    let result =
        market
            .engine
            .change_campaign_status(&rival, &campaign.id, CampaignStatus::Cancelled);
    assert!(matches!(
        result,
        Err(MarketError::Forbidden {
            resource: "campaign"
        })
    ));
}

#[test]
fn unknown_campaigns_are_not_found() {
    let market = Marketplace::new();
    let missing = crate::marketplace::domain::CampaignId::from("cmp-missing");
    let result = market.engine.campaign(&market.creator, &missing);
    match result {
        Err(MarketError::NotFound { resource, id }) => {
            assert_eq!(resource, "campaign");
            assert_eq!(id, "cmp-missing");
        }
        other => panic!("expected not found, got {other:?}"),
    }
}

#[test]
fn non_owners_see_only_their_own_entries() {
    let market = Marketplace::new();
    let campaign = market.launch();
    market
        .engine
        .submit_application(&market.creator, &campaign.id, application_draft(Some(450)))
        .expect("first applies");
    market
        .engine
        .submit_application(&market.other_creator, &campaign.id, application_draft(None))
        .expect("second applies");

    let owner_view = market
        .engine
        .campaign(&market.brand, &campaign.id)
        .expect("owner view");
    assert_eq!(owner_view.applications.len(), 2);

    let creator_view = market
        .engine
        .campaign(&market.creator, &campaign.id)
        .expect("creator view");
    assert_eq!(creator_view.applications.len(), 1);
    assert_eq!(creator_view.applications[0].influencer_id, market.creator.id);
    assert_eq!(creator_view.applications_count, 2);
}

#[test]
fn my_campaigns_lists_only_owned_campaigns() {
    let market = Marketplace::new();
    let first = market.launch();
    let second = market.launch();

    let mine = market
        .engine
        .my_campaigns(&market.brand)
        .expect("list owned");
    let mut ids: Vec<_> = mine.iter().map(|campaign| campaign.id.clone()).collect();
    ids.sort();
    let mut expected = vec![first.id, second.id];
    expected.sort();
    assert_eq!(ids, expected);

    let denied = market.engine.my_campaigns(&market.creator);
    assert!(matches!(denied, Err(MarketError::Authorization { .. })));
}

#[test]
fn store_failures_surface_as_store_errors() {
    let engine = engine_with(Arc::new(UnavailableStore), LifecyclePolicy::default());
    let result = engine.create_campaign(&Principal::business("brand-1"), campaign_draft());
    assert!(matches!(result, Err(MarketError::Store(_))));
}

#[test]
fn exhausted_retries_report_a_concurrent_write_conflict() {
    let store = Arc::new(ContendedStore::default());
    store
        .inner
        .commit(Transaction::new().put_business(business_profile("brand-1"), Expected::Absent))
        .expect("seed business");
    let engine = engine_with(
        Arc::clone(&store),
        LifecyclePolicy {
            write_retries: 3,
            ..LifecyclePolicy::default()
        },
    );

    let result = engine.create_campaign(&Principal::business("brand-1"), campaign_draft());
    assert!(matches!(
        result,
        Err(MarketError::Conflict(ConflictKind::ConcurrentWrite))
    ));
    assert_eq!(store.attempts(), 3);
}
