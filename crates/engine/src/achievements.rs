//! Achievement definitions and the built-in catalog.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AchievementCategory {
    Financial,
    Spending,
    Social,
    Security,
    Special,
}

impl AchievementCategory {
    pub const ALL: [AchievementCategory; 5] = [
        Self::Financial,
        Self::Spending,
        Self::Social,
        Self::Security,
        Self::Special,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Financial => "financial",
            Self::Spending => "spending",
            Self::Social => "social",
            Self::Security => "security",
            Self::Special => "special",
        }
    }
}

impl TryFrom<&str> for AchievementCategory {
    type Error = crate::EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|category| category.as_str().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| crate::EngineError::NotFound(format!("category {value}")))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Bronze,
    Silver,
    Gold,
    Platinum,
}

impl Tier {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bronze => "bronze",
            Self::Silver => "silver",
            Self::Gold => "gold",
            Self::Platinum => "platinum",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AchievementDefinition {
    pub id: String,
    pub category: AchievementCategory,
    pub title: String,
    pub description: String,
    pub badge: String,
    pub points: u32,
    pub tier: Tier,
    /// Progress count that unlocks the achievement.
    pub target: u32,
}

/// An achievement granted at onboarding, with its historical unlock time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OnboardingUnlock {
    pub id: String,
    pub unlocked_at: DateTime<Utc>,
}

type Row = (
    &'static str,
    AchievementCategory,
    &'static str,
    &'static str,
    &'static str,
    u32,
    Tier,
    u32,
);

const CATALOG: [Row; 14] = [
    (
        "first_transfer",
        AchievementCategory::Financial,
        "First Transfer",
        "Complete your first money transfer",
        "🏆",
        50,
        Tier::Bronze,
        1,
    ),
    (
        "savings_milestone_1k",
        AchievementCategory::Financial,
        "Savings Star",
        "Save $1,000 in your account",
        "⭐",
        100,
        Tier::Silver,
        1000,
    ),
    (
        "savings_milestone_5k",
        AchievementCategory::Financial,
        "Savings Champion",
        "Save $5,000 in your account",
        "🏆",
        250,
        Tier::Gold,
        5000,
    ),
    (
        "transaction_streak_7",
        AchievementCategory::Financial,
        "Weekly Warrior",
        "Make transactions for 7 consecutive days",
        "📅",
        75,
        Tier::Bronze,
        7,
    ),
    (
        "budget_keeper",
        AchievementCategory::Spending,
        "Budget Keeper",
        "Stay under $500 monthly spending",
        "🎯",
        100,
        Tier::Silver,
        1,
    ),
    (
        "smart_spender",
        AchievementCategory::Spending,
        "Smart Spender",
        "Use business payments 10 times",
        "📈",
        150,
        Tier::Gold,
        10,
    ),
    (
        "bill_master",
        AchievementCategory::Spending,
        "Bill Master",
        "Pay 5 different bills on time",
        "🏅",
        80,
        Tier::Bronze,
        5,
    ),
    (
        "social_butterfly",
        AchievementCategory::Social,
        "Social Butterfly",
        "Send 10 P2P payments to friends",
        "🦋",
        120,
        Tier::Silver,
        10,
    ),
    (
        "red_envelope_master",
        AchievementCategory::Social,
        "Red Envelope Master",
        "Send 5 digital red envelopes",
        "🧧",
        90,
        Tier::Bronze,
        5,
    ),
    (
        "split_bill_pro",
        AchievementCategory::Social,
        "Split Bill Pro",
        "Split bills with friends 3 times",
        "💰",
        60,
        Tier::Bronze,
        3,
    ),
    (
        "security_guardian",
        AchievementCategory::Security,
        "Security Guardian",
        "Enable all security features",
        "🛡️",
        200,
        Tier::Gold,
        4,
    ),
    (
        "biometric_user",
        AchievementCategory::Security,
        "Biometric User",
        "Enable biometric login",
        "👆",
        50,
        Tier::Bronze,
        1,
    ),
    (
        "early_adopter",
        AchievementCategory::Special,
        "Early Adopter",
        "One of the first 1000 users",
        "🚀",
        500,
        Tier::Platinum,
        1,
    ),
    (
        "perfect_month",
        AchievementCategory::Special,
        "Perfect Month",
        "Complete all daily tasks for a month",
        "✨",
        300,
        Tier::Gold,
        30,
    ),
];

/// The built-in achievement catalog.
pub fn catalog() -> Vec<AchievementDefinition> {
    CATALOG
        .iter()
        .map(
            |&(id, category, title, description, badge, points, tier, target)| {
                AchievementDefinition {
                    id: id.to_string(),
                    category,
                    title: title.to_string(),
                    description: description.to_string(),
                    badge: badge.to_string(),
                    points,
                    tier,
                    target,
                }
            },
        )
        .collect()
}

/// Achievements every new user starts with.
pub fn onboarding_unlocks() -> Vec<OnboardingUnlock> {
    [("first_transfer", (2024, 6, 1)), ("biometric_user", (2024, 5, 15))]
        .into_iter()
        .filter_map(|(id, (y, m, d))| {
            let unlocked_at = NaiveDate::from_ymd_opt(y, m, d)?
                .and_hms_opt(0, 0, 0)?
                .and_utc();
            Some(OnboardingUnlock {
                id: id.to_string(),
                unlocked_at,
            })
        })
        .collect()
}
