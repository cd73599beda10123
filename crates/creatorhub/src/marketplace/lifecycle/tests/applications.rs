use std::sync::Arc;
use std::thread;

use super::common::*;
use crate::marketplace::domain::{
    ApplicationStatus, CampaignStatus, CollaborationOrigin, CollaborationStatus, Niche,
};
use crate::marketplace::error::{ConflictKind, MarketError};
use crate::marketplace::identity::{Principal, Role};
use crate::marketplace::lifecycle::LifecyclePolicy;
use crate::marketplace::validation::{ReviewDecision, ReviewDraft};

fn accept() -> ReviewDraft {
    ReviewDraft {
        decision: ReviewDecision::Accept,
        business_notes: Some("Great fit".to_string()),
    }
}

fn reject() -> ReviewDraft {
    ReviewDraft {
        decision: ReviewDecision::Reject,
        business_notes: None,
    }
}

#[test]
fn submit_appends_pending_application_and_back_reference() {
    let market = Marketplace::new();
    let campaign = market.launch();

    let application = market
        .engine
        .submit_application(&market.creator, &campaign.id, application_draft(Some(450)))
        .expect("application accepted");
    assert_eq!(application.status, ApplicationStatus::Pending);
    assert_eq!(application.applied_at, reference_time());

    let stored = market.stored_campaign(&campaign.id);
    assert_eq!(stored.applications_count, 1);
    assert_eq!(stored.applications.len(), 1);

    let profile = market.influencer(&market.creator);
    assert_eq!(application.influencer_profile_id, profile.id);
    assert_eq!(profile.campaign_applications.len(), 1);
    assert_eq!(profile.campaign_applications[0].campaign_id, campaign.id);
    assert_eq!(
        profile.campaign_applications[0].status,
        ApplicationStatus::Pending
    );
}

#[test]
fn second_application_from_the_same_influencer_conflicts() {
    let market = Marketplace::new();
    let campaign = market.launch();
    market
        .engine
        .submit_application(&market.creator, &campaign.id, application_draft(None))
        .expect("first application");

    let again =
        market
            .engine
            .submit_application(&market.creator, &campaign.id, application_draft(None));
    assert!(matches!(
        again,
        Err(MarketError::Conflict(ConflictKind::DuplicateApplication))
    ));
    assert_eq!(market.stored_campaign(&campaign.id).applications_count, 1);
    assert_eq!(
        market.influencer(&market.creator).campaign_applications.len(),
        1
    );
}

#[test]
fn businesses_cannot_apply_and_influencers_need_a_profile() {
    let market = Marketplace::new();
    let campaign = market.launch();

    let as_business =
        market
            .engine
            .submit_application(&market.brand, &campaign.id, application_draft(None));
    assert!(matches!(as_business, Err(MarketError::Authorization { .. })));

    let stranger = Principal::influencer("creator-unknown");
    let without_profile =
        market
            .engine
            .submit_application(&stranger, &campaign.id, application_draft(None));
    assert!(matches!(
        without_profile,
        Err(MarketError::ProfileRequired {
            role: Role::Influencer
        })
    ));
}

#[test]
fn accepting_opens_a_collaboration_and_updates_counters() {
    let market = Marketplace::new();
    let campaign = market.launch();
    let application = market
        .engine
        .submit_application(&market.creator, &campaign.id, application_draft(Some(450)))
        .expect("applied");

    let reviewed = market
        .engine
        .review_application(&market.brand, &application.id, accept())
        .expect("accepted");
    assert_eq!(reviewed.status, ApplicationStatus::Accepted);
    assert_eq!(reviewed.reviewed_at, Some(reference_time()));
    assert_eq!(reviewed.business_notes.as_deref(), Some("Great fit"));

    let stored = market.stored_campaign(&campaign.id);
    assert_eq!(stored.selected_influencers, 1);
    assert_eq!(stored.collaborations.len(), 1);
    let collaboration = &stored.collaborations[0];
    assert_eq!(collaboration.agreed_rate, 450);
    assert_eq!(collaboration.status, CollaborationStatus::Active);
    assert_eq!(
        collaboration.origin,
        CollaborationOrigin::Application(application.id.clone())
    );

    let business = market.business();
    assert_eq!(business.stats.total_influencers_worked_with, 1);
    assert_eq!(business.collaborations.len(), 1);

    let profile = market.influencer(&market.creator);
    assert_eq!(profile.stats.total_campaigns, 1);
    assert_eq!(
        profile.campaign_applications[0].status,
        ApplicationStatus::Accepted
    );
}

#[test]
fn rejecting_leaves_counters_alone() {
    let market = Marketplace::new();
    let campaign = market.launch();
    let application = market
        .engine
        .submit_application(&market.creator, &campaign.id, application_draft(None))
        .expect("applied");

    market
        .engine
        .review_application(&market.brand, &application.id, reject())
        .expect("rejected");

    let stored = market.stored_campaign(&campaign.id);
    assert_eq!(stored.selected_influencers, 0);
    assert!(stored.collaborations.is_empty());
    assert_eq!(market.business().stats.total_influencers_worked_with, 0);

    let again = market
        .engine
        .review_application(&market.brand, &application.id, accept());
    assert!(matches!(
        again,
        Err(MarketError::Conflict(ConflictKind::ApplicationNotPending(
            ApplicationStatus::Rejected
        )))
    ));
}

#[test]
fn only_the_campaign_owner_reviews() {
    let market = Marketplace::new();
    let campaign = market.launch();
    let application = market
        .engine
        .submit_application(&market.creator, &campaign.id, application_draft(None))
        .expect("applied");
    let rival = Principal::business("brand-2");
    market
        .engine
        .save_business_profile(&rival, business_draft("Rival Co"))
        .expect("rival onboarded");

    let result = market.engine.review_application(&rival, &application.id, accept());
    assert!(matches!(result, Err(MarketError::Forbidden { .. })));
    assert_eq!(
        market.stored_campaign(&campaign.id).applications[0].status,
        ApplicationStatus::Pending
    );
}

#[test]
fn acceptance_stops_at_the_influencer_cap() {
    let market = Marketplace::new();
    let campaign = market.launch();
    let third = Principal::influencer("creator-3");
    market
        .engine
        .save_influencer_profile(&third, influencer_draft("Kai Climbs", Niche::Fitness, 9_000))
        .expect("third onboarded");

    let mut ids = Vec::new();
    for principal in [&market.creator, &market.other_creator, &third] {
        let application = market
            .engine
            .submit_application(principal, &campaign.id, application_draft(None))
            .expect("applied");
        ids.push(application.id);
    }
    for id in &ids[..2] {
        market
            .engine
            .review_application(&market.brand, id, accept())
            .expect("within cap");
    }

    let over = market.engine.review_application(&market.brand, &ids[2], accept());
    assert!(matches!(over, Err(MarketError::CampaignFull { max: 2 })));
    assert_eq!(market.stored_campaign(&campaign.id).selected_influencers, 2);

    market
        .engine
        .review_application(&market.brand, &ids[2], reject())
        .expect("rejecting is always allowed");
}

#[test]
fn cap_can_be_disabled() {
    let market = Marketplace::with_policy(LifecyclePolicy {
        enforce_influencer_cap: false,
        ..LifecyclePolicy::default()
    });
    let campaign = market.launch();
    let third = Principal::influencer("creator-3");
    market
        .engine
        .save_influencer_profile(&third, influencer_draft("Kai Climbs", Niche::Fitness, 9_000))
        .expect("third onboarded");

    for principal in [&market.creator, &market.other_creator, &third] {
        let application = market
            .engine
            .submit_application(principal, &campaign.id, application_draft(None))
            .expect("applied");
        market
            .engine
            .review_application(&market.brand, &application.id, accept())
            .expect("cap not enforced");
    }
    assert_eq!(market.stored_campaign(&campaign.id).selected_influencers, 3);
}

#[test]
fn withdraw_moves_pending_to_withdrawn_once() {
    let market = Marketplace::new();
    let campaign = market.launch();
    let application = market
        .engine
        .submit_application(&market.creator, &campaign.id, application_draft(None))
        .expect("applied");

    let foreign = market
        .engine
        .withdraw_application(&market.other_creator, &application.id);
    assert!(matches!(
        foreign,
        Err(MarketError::Forbidden {
            resource: "application"
        })
    ));

    let withdrawn = market
        .engine
        .withdraw_application(&market.creator, &application.id)
        .expect("withdrawn");
    assert_eq!(withdrawn.status, ApplicationStatus::Withdrawn);
    assert_eq!(
        market.influencer(&market.creator).campaign_applications[0].status,
        ApplicationStatus::Withdrawn
    );

    let again = market
        .engine
        .withdraw_application(&market.creator, &application.id);
    assert!(matches!(
        again,
        Err(MarketError::Conflict(ConflictKind::ApplicationNotPending(
            ApplicationStatus::Withdrawn
        )))
    ));
}

#[test]
fn closed_campaigns_refuse_new_applications() {
    let market = Marketplace::new();
    let campaign = market.launch();
    market
        .engine
        .change_campaign_status(&market.brand, &campaign.id, CampaignStatus::Cancelled)
        .expect("cancelled");

    let result =
        market
            .engine
            .submit_application(&market.creator, &campaign.id, application_draft(None));
    assert!(matches!(
        result,
        Err(MarketError::Conflict(ConflictKind::CampaignNotActive(
            CampaignStatus::Cancelled
        )))
    ));
}

#[test]
fn my_applications_hides_business_notes() {
    let market = Marketplace::new();
    let campaign = market.launch();
    let application = market
        .engine
        .submit_application(&market.creator, &campaign.id, application_draft(None))
        .expect("applied");
    market
        .engine
        .review_application(&market.brand, &application.id, accept())
        .expect("accepted");

    let mine = market
        .engine
        .my_applications(&market.creator)
        .expect("listing");
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].campaign_id, campaign.id);
    assert_eq!(mine[0].campaign_title, campaign.title);
    assert_eq!(mine[0].application.status, ApplicationStatus::Accepted);
    assert!(mine[0].application.business_notes.is_none());

    assert!(market
        .engine
        .my_applications(&market.other_creator)
        .expect("empty listing")
        .is_empty());
}

#[test]
fn concurrent_submissions_from_distinct_influencers_all_land() {
    let market = Marketplace::new();
    let campaign = market.launch();
    let creators: Vec<Principal> = (0..8)
        .map(|n| Principal::influencer(format!("racer-{n}")))
        .collect();
    for (n, creator) in creators.iter().enumerate() {
        market
            .engine
            .save_influencer_profile(
                creator,
                influencer_draft(&format!("Racer {n}"), Niche::Fitness, 1_000),
            )
            .expect("onboarded");
    }

    let engine = &market.engine;
    let campaign_id = &campaign.id;
    thread::scope(|scope| {
        for creator in &creators {
            scope.spawn(move || {
                engine
                    .submit_application(creator, campaign_id, application_draft(None))
                    .expect("every distinct influencer succeeds");
            });
        }
    });

    let stored = market.stored_campaign(&campaign.id);
    assert_eq!(stored.applications.len(), creators.len());
    assert_eq!(stored.applications_count as usize, stored.applications.len());
}

#[test]
fn concurrent_duplicates_from_one_influencer_land_once() {
    let market = Arc::new(Marketplace::new());
    let campaign = market.launch();

    let outcomes: Vec<bool> = thread::scope(|scope| {
        let handles: Vec<_> = (0..6)
            .map(|_| {
                let market = Arc::clone(&market);
                let campaign_id = campaign.id.clone();
                scope.spawn(move || {
                    market
                        .engine
                        .submit_application(&market.creator, &campaign_id, application_draft(None))
                        .is_ok()
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().expect("thread finished"))
            .collect()
    });

    assert_eq!(outcomes.iter().filter(|ok| **ok).count(), 1);
    let stored = market.stored_campaign(&campaign.id);
    assert_eq!(stored.applications.len(), 1);
    assert_eq!(stored.applications_count, 1);
}
