//! Pluggable influencer scoring. The default strategy is a weighted sum of
//! niche overlap, follower-range fit, and platform match.

use serde::Serialize;

use crate::marketplace::domain::{
    Campaign, CampaignPreferences, InfluencerProfile, Niche, Platform,
};

/// What a business is looking for, derived from a campaign or its preferences.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchContext {
    pub niches: Vec<Niche>,
    pub platforms: Vec<Platform>,
    pub min_followers: Option<u64>,
    pub max_followers: Option<u64>,
}

impl MatchContext {
    pub fn from_campaign(campaign: &Campaign) -> Self {
        let niches = if campaign.requirements.niches.is_empty() {
            vec![campaign.category]
        } else {
            campaign.requirements.niches.clone()
        };
        Self {
            niches,
            platforms: campaign.platforms.clone(),
            min_followers: campaign.requirements.min_followers,
            max_followers: campaign.requirements.max_followers,
        }
    }

    pub fn from_preferences(preferences: &CampaignPreferences) -> Self {
        Self {
            niches: preferences
                .target_audience
                .as_ref()
                .map(|audience| audience.interests.clone())
                .unwrap_or_default(),
            platforms: preferences.preferred_platforms.clone(),
            min_followers: None,
            max_followers: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreComponent {
    pub name: &'static str,
    pub points: f32,
    pub max_points: f32,
    pub note: String,
}

/// Score in `0..=100` plus the components that produced it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchScore {
    pub score: u8,
    pub components: Vec<ScoreComponent>,
}

pub trait InfluencerScorer: Send + Sync {
    fn score(&self, profile: &InfluencerProfile, context: &MatchContext) -> MatchScore;
}

/// Relative weight of each component. Only the ratios matter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoringWeights {
    pub niche: u8,
    pub followers: u8,
    pub platform: u8,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            niche: 40,
            followers: 30,
            platform: 30,
        }
    }
}

impl ScoringWeights {
    fn total(&self) -> f32 {
        f32::from(self.niche) + f32::from(self.followers) + f32::from(self.platform)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct WeightedScorer {
    weights: ScoringWeights,
}

impl WeightedScorer {
    pub fn new(weights: ScoringWeights) -> Self {
        Self { weights }
    }
}

fn overlap<T: PartialEq>(wanted: &[T], offered: &[T]) -> (usize, usize) {
    let hits = wanted.iter().filter(|item| offered.contains(item)).count();
    (hits, wanted.len())
}

fn overlap_component(name: &'static str, weight: u8, hits: usize, wanted: usize) -> ScoreComponent {
    let max_points = f32::from(weight);
    if wanted == 0 {
        return ScoreComponent {
            name,
            points: max_points,
            max_points,
            note: "no preference".to_string(),
        };
    }
    ScoreComponent {
        name,
        points: max_points * hits as f32 / wanted as f32,
        max_points,
        note: format!("{hits} of {wanted} matched"),
    }
}

fn follower_component(weight: u8, followers: u64, context: &MatchContext) -> ScoreComponent {
    let max_points = f32::from(weight);
    let (fraction, note) = match (context.min_followers, context.max_followers) {
        (Some(min), _) if followers < min => (
            followers as f32 / min as f32,
            format!("{followers} below minimum {min}"),
        ),
        (_, Some(max)) if followers > max => (
            max as f32 / followers as f32,
            format!("{followers} above maximum {max}"),
        ),
        (None, None) => (1.0, "no follower range".to_string()),
        _ => (1.0, format!("{followers} within range")),
    };
    ScoreComponent {
        name: "followers",
        points: max_points * fraction,
        max_points,
        note,
    }
}

impl InfluencerScorer for WeightedScorer {
    fn score(&self, profile: &InfluencerProfile, context: &MatchContext) -> MatchScore {
        let (niche_hits, niches_wanted) = overlap(&context.niches, &profile.niches());
        let (platform_hits, platforms_wanted) = overlap(&context.platforms, &profile.platforms());
        let components = vec![
            overlap_component("niche", self.weights.niche, niche_hits, niches_wanted),
            follower_component(self.weights.followers, profile.total_followers(), context),
            overlap_component(
                "platform",
                self.weights.platform,
                platform_hits,
                platforms_wanted,
            ),
        ];

        let total = self.weights.total();
        let score = if total == 0.0 {
            0
        } else {
            let earned: f32 = components.iter().map(|component| component.points).sum();
            (earned / total * 100.0).round().clamp(0.0, 100.0) as u8
        };
        MatchScore { score, components }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::marketplace::lifecycle::tests::common::influencer_profile;

    fn context() -> MatchContext {
        MatchContext {
            niches: vec![Niche::Fitness, Niche::Health],
            platforms: vec![Platform::Instagram],
            min_followers: Some(10_000),
            max_followers: Some(100_000),
        }
    }

    #[test]
    fn perfect_fit_scores_one_hundred() {
        let mut profile = influencer_profile("creator-1", Niche::Fitness, 50_000);
        if let Some(secondary) = profile.secondary_social.as_mut() {
            secondary.niche = Niche::Health;
        }
        let result = WeightedScorer::default().score(&profile, &context());
        assert_eq!(result.score, 100);
        assert_eq!(result.components.len(), 3);
    }

    #[test]
    fn partial_fit_is_weighted() {
        let profile = influencer_profile("creator-2", Niche::Fitness, 5_000);
        let result = WeightedScorer::default().score(&profile, &context());
        // niche 20 of 40, followers 15 of 30, platform 30 of 30
        assert_eq!(result.score, 65);
        let followers = &result.components[1];
        assert_eq!(followers.name, "followers");
        assert!(followers.note.contains("below minimum"));
    }

    #[test]
    fn empty_context_accepts_everyone() {
        let profile = influencer_profile("creator-3", Niche::Gaming, 10);
        let result = WeightedScorer::default().score(&profile, &MatchContext::default());
        assert_eq!(result.score, 100);
    }

    #[test]
    fn custom_weights_shift_the_score() {
        let profile = influencer_profile("creator-4", Niche::Gaming, 50_000);
        let scorer = WeightedScorer::new(ScoringWeights {
            niche: 0,
            followers: 50,
            platform: 50,
        });
        assert_eq!(scorer.score(&profile, &context()).score, 100);
    }
}
