//! Canned hashtag sets served when generation is skipped or fails.

use std::collections::HashSet;

use crate::models::task::HashtagPlatform;

/// Size the `general` platform is always topped up to.
pub const GENERAL_TARGET: usize = 20;

const LINKEDIN: &[&str] = &[
    "#ProfessionalGrowth",
    "#CareerDevelopment",
    "#BusinessInsights",
    "#ProfessionalNetworking",
    "#IndustryTrends",
];

const INSTAGRAM: &[&str] = &[
    "#InstaDaily",
    "#ContentCreation",
    "#CreativeCommunity",
    "#VisualStorytelling",
    "#InspirationalContent",
];

const TWITTER: &[&str] = &[
    "#TrendingNow",
    "#QuickInsights",
    "#BreakingNews",
    "#TopicOfTheDay",
    "#CurrentTrends",
];

const FACEBOOK: &[&str] = &[
    "#CommunityConnection",
    "#ShareableMoments",
    "#LifestyleContent",
    "#PopularTrends",
    "#EngagingStories",
];

const GENERAL: &[&str] = &[
    "#ContentIQ",
    "#AIContent",
    "#DigitalInnovation",
    "#CreativeStrategy",
    "#TechTrends",
    "#Innovation",
    "#Technology",
    "#DigitalTransformation",
    "#FutureOfWork",
    "#CreativeSolutions",
    "#BusinessIntelligence",
    "#DataDriven",
    "#AIInnovation",
    "#GlobalTrends",
    "#GlobalInnovation",
    "#StrategicThinking",
    "#BusinessStrategy",
    "#IndustryInsights",
    "#ProfessionalGrowth",
    "#EmergingTechnologies",
];

pub fn hashtags_for(platform: HashtagPlatform) -> Vec<String> {
    let tags = match platform {
        HashtagPlatform::Linkedin => LINKEDIN,
        HashtagPlatform::Instagram => INSTAGRAM,
        HashtagPlatform::Twitter => TWITTER,
        HashtagPlatform::Facebook => FACEBOOK,
        HashtagPlatform::General => GENERAL,
    };
    tags.iter().map(|t| t.to_string()).collect()
}

/// Fills `tags` from the general list, in list order, until it holds `target`
/// case-insensitively distinct tags. Never shuffles, so the result is reproducible.
pub fn top_up(mut tags: Vec<String>, target: usize) -> Vec<String> {
    let mut seen: HashSet<String> = tags.iter().map(|t| t.to_lowercase()).collect();
    for candidate in GENERAL {
        if tags.len() >= target {
            break;
        }
        if seen.insert(candidate.to_lowercase()) {
            tags.push(candidate.to_string());
        }
    }
    tags.truncate(target);
    tags
}
