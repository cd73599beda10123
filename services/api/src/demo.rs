use crate::infra::build_marketplace;
use chrono::{Duration, Utc};
use clap::Args;
use creatorhub::config::MarketplaceConfig;
use creatorhub::error::AppError;
use creatorhub::marketplace::domain::{
    CampaignId, CampaignPreferences, CampaignStatus, CampaignType, Industry, Niche, Platform,
    SocialLink, TargetAudience, TARGET_AUDIENCE_VERSION,
};
use creatorhub::marketplace::validation::{
    ApplicationDraft, BudgetDraft, BusinessProfileDraft, CampaignDraft, CompanyDraft,
    CompletionDraft, InfluencerProfileDraft, InvitationDraft, InvitationReply, InvitationResponse,
    ReviewDecision, ReviewDraft, TimelineDraft,
};
use creatorhub::marketplace::{
    CampaignCard, CampaignFilters, CampaignLifecycle, InfluencerFilters, InfluencerMatch,
    MarketError, MarketplaceStore, Principal, SystemClock,
};
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Create the campaign as a draft and publish it explicitly.
    #[arg(long)]
    pub(crate) draft_first: bool,
    /// Print the campaign feed and influencer matches as JSON.
    #[arg(long)]
    pub(crate) json: bool,
}

pub(crate) struct SeededDemo {
    pub(crate) brand: Principal,
    pub(crate) creators: [Principal; 2],
    pub(crate) campaign_id: CampaignId,
}

/// Onboard one business and two creators and post a campaign.
pub(crate) fn seed_marketplace<S>(
    lifecycle: &CampaignLifecycle<S>,
) -> Result<SeededDemo, MarketError>
where
    S: MarketplaceStore + 'static,
{
    let brand = Principal::business("demo-brand");
    let creators = [
        Principal::influencer("demo-creator-mira"),
        Principal::influencer("demo-creator-jonas"),
    ];

    lifecycle.save_business_profile(
        &brand,
        BusinessProfileDraft {
            company: CompanyDraft {
                name: Some("Lumen Skincare".to_string()),
                description: Some("Clean skincare for sensitive skin".to_string()),
                industry: Some(Industry::Beauty),
                website: Some("https://lumen.example".to_string()),
                ..CompanyDraft::default()
            },
            preferences: CampaignPreferences {
                preferred_platforms: vec![Platform::Instagram, Platform::Tiktok],
                target_audience: Some(TargetAudience {
                    version: TARGET_AUDIENCE_VERSION,
                    age_ranges: Vec::new(),
                    genders: Vec::new(),
                    locations: vec!["Berlin".to_string()],
                    interests: vec![Niche::Beauty, Niche::Lifestyle],
                    notes: None,
                }),
                ..CampaignPreferences::default()
            },
            is_active: None,
        },
    )?;

    let profiles = [
        ("Mira Glow", Platform::Instagram, Niche::Beauty, 84_000),
        ("Jonas Daily", Platform::Tiktok, Niche::Lifestyle, 31_000),
    ];
    for (creator, (name, platform, niche, followers)) in creators.iter().zip(profiles) {
        lifecycle.save_influencer_profile(
            creator,
            InfluencerProfileDraft {
                display_name: Some(name.to_string()),
                primary_social: Some(SocialLink {
                    platform,
                    handle: name.to_lowercase().replace(' ', "."),
                    followers,
                    niche,
                    url: None,
                }),
                ..InfluencerProfileDraft::default()
            },
        )?;
    }

    let now = Utc::now();
    let campaign = lifecycle.create_campaign(
        &brand,
        CampaignDraft {
            title: Some("Barrier cream launch".to_string()),
            description: Some("Two week routine diary with the new barrier cream".to_string()),
            campaign_type: Some(CampaignType::ProductReview),
            category: Some(Niche::Beauty),
            platforms: vec![Platform::Instagram, Platform::Tiktok],
            budget: Some(BudgetDraft {
                total: Some(4000),
                per_influencer: Some(800),
                currency: Some("EUR".to_string()),
            }),
            timeline: Some(TimelineDraft {
                application_deadline: Some(now + Duration::days(5)),
                content_deadline: Some(now + Duration::days(19)),
                campaign_start: Some(now + Duration::days(20)),
                campaign_end: Some(now + Duration::days(34)),
            }),
            max_influencers: Some(3),
            is_featured: true,
            ..CampaignDraft::default()
        },
    )?;

    if campaign.status == CampaignStatus::Draft {
        lifecycle.publish_campaign(&brand, &campaign.id)?;
    }

    Ok(SeededDemo {
        brand,
        creators,
        campaign_id: campaign.id,
    })
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let config = MarketplaceConfig {
        publish_on_create: !args.draft_first,
        ..MarketplaceConfig::default()
    };
    let marketplace = build_marketplace(&config, Arc::new(SystemClock));
    let lifecycle = &marketplace.lifecycle;

    let seeded = seed_marketplace(lifecycle)?;
    let [mira, jonas] = &seeded.creators;
    println!("Campaign {} is live", seeded.campaign_id);

    let application = lifecycle.submit_application(
        mira,
        &seeded.campaign_id,
        ApplicationDraft {
            proposed_rate: Some(750),
            message: Some("My audience asks about barrier repair every week".to_string()),
            portfolio_links: Vec::new(),
        },
    )?;
    println!("{} applied at {} EUR", mira.id, 750);

    let invitation = lifecycle.send_invitation(
        &seeded.brand,
        &seeded.campaign_id,
        InvitationDraft {
            influencer_id: Some(jonas.id.clone()),
            message: Some("Would love a TikTok routine from you".to_string()),
            proposed_rate: None,
        },
    )?;
    println!("{} invited {}", seeded.brand.id, jonas.id);

    lifecycle.review_application(
        &seeded.brand,
        &application.id,
        ReviewDraft {
            decision: ReviewDecision::Accept,
            business_notes: Some("Great fit for sensitive skin".to_string()),
        },
    )?;
    lifecycle.respond_to_invitation(
        jonas,
        &invitation.id,
        InvitationReply {
            response: InvitationResponse::Accept,
        },
    )?;
    println!("Both creators are now collaborating");

    let feed = marketplace
        .matching
        .list_active_campaigns(mira, &CampaignFilters::default())?;
    let matches = marketplace
        .matching
        .list_influencer_matches(&seeded.brand, &InfluencerFilters::default())?;
    if args.json {
        print_json(&feed, &matches);
    } else {
        render_feed(&feed);
        render_matches(&matches);
    }

    let completed = lifecycle.complete_collaboration(
        &seeded.brand,
        &seeded.campaign_id,
        &mira.id,
        CompletionDraft {
            rating: Some(5),
            review: Some("Delivered early".to_string()),
        },
    )?;
    println!(
        "Collaboration with {} completed, {} EUR paid",
        completed.influencer_id, completed.agreed_rate
    );

    let report = lifecycle.reconcile()?;
    println!("Reconcile pass repaired {} document(s)", report.total());
    Ok(())
}

fn render_feed(feed: &[CampaignCard]) {
    println!("\nCampaign feed");
    for card in feed {
        let badge = if card.badge.label.is_empty() {
            String::new()
        } else {
            format!(" [{}]", card.badge.label)
        };
        println!(
            "  {}{} - {} {} per creator, deadline {} ({} applied, {} selected)",
            card.title,
            badge,
            card.budget.per_influencer,
            card.budget.currency,
            card.deadline,
            card.applications_count,
            card.selected_influencers
        );
    }
}

fn render_matches(matches: &[InfluencerMatch]) {
    println!("\nInfluencer matches");
    for entry in matches {
        println!(
            "  {:>3}  {} ({} followers)",
            entry.match_score, entry.display_name, entry.total_followers
        );
        for component in &entry.score_components {
            println!(
                "         {:<9} {:>5.1}/{:<5.1} {}",
                component.name, component.points, component.max_points, component.note
            );
        }
    }
}

fn print_json(feed: &[CampaignCard], matches: &[InfluencerMatch]) {
    let payload = serde_json::json!({ "campaigns": feed, "influencers": matches });
    match serde_json::to_string_pretty(&payload) {
        Ok(text) => println!("{text}"),
        Err(err) => eprintln!("failed to encode demo output: {err}"),
    }
}
