// Tip tier types and the static tier catalog

use serde::{Deserialize, Serialize};

/// Visual/naming theme for a tier set
///
/// Themes outside the known list are kept verbatim and served the `fun`
/// tiers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TipTheme {
    #[default]
    Fun,
    Fantasy,
    SciFi,
    Gaming,
    Retro,
    Space,
    Nature,
    Food,
    Music,
    Crypto,
    Other(String),
}

impl TipTheme {
    pub fn as_str(&self) -> &str {
        match self {
            TipTheme::Fun => "fun",
            TipTheme::Fantasy => "fantasy",
            TipTheme::SciFi => "sci-fi",
            TipTheme::Gaming => "gaming",
            TipTheme::Retro => "retro",
            TipTheme::Space => "space",
            TipTheme::Nature => "nature",
            TipTheme::Food => "food",
            TipTheme::Music => "music",
            TipTheme::Crypto => "crypto",
            TipTheme::Other(theme) => theme,
        }
    }
}

impl From<String> for TipTheme {
    fn from(value: String) -> Self {
        match value.as_str() {
            "fun" => TipTheme::Fun,
            "fantasy" => TipTheme::Fantasy,
            "sci-fi" => TipTheme::SciFi,
            "gaming" => TipTheme::Gaming,
            "retro" => TipTheme::Retro,
            "space" => TipTheme::Space,
            "nature" => TipTheme::Nature,
            "food" => TipTheme::Food,
            "music" => TipTheme::Music,
            "crypto" => TipTheme::Crypto,
            _ => TipTheme::Other(value),
        }
    }
}

impl From<TipTheme> for String {
    fn from(theme: TipTheme) -> Self {
        match theme {
            TipTheme::Other(theme) => theme,
            known => known.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for TipTheme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A priced reward level offered to viewers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TipTier {
    pub id: String,
    pub theme: TipTheme,
    /// Decimal amount in major currency units (0.5 = €0.50)
    pub amount: f64,
    pub emoji: String,
    pub name: String,
    pub perk: String,
    /// Optional hints for min/max matching in widgets
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_amount: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TipTierSet {
    pub theme: TipTheme,
    pub currency: String,
    pub tiers: Vec<TipTier>,
}

struct TierSeed {
    slug: &'static str,
    amount: f64,
    emoji: &'static str,
    name: &'static str,
    perk: &'static str,
}

static FUN_TIERS: [TierSeed; 9] = [
    TierSeed {
        slug: "spark",
        amount: 0.5,
        emoji: "✨",
        name: "Spark",
        perk: "You lit the flame!",
    },
    TierSeed {
        slug: "coffee-shot",
        amount: 1.0,
        emoji: "☕️",
        name: "Coffee Shot",
        perk: "Added to supporter ticker",
    },
    TierSeed {
        slug: "pixel-boost",
        amount: 2.0,
        emoji: "🧩",
        name: "Pixel Boost",
        perk: "Visual upgrade boost",
    },
    TierSeed {
        slug: "epic-drop",
        amount: 5.0,
        emoji: "🎁",
        name: "Epic Drop",
        perk: "Bronze badge",
    },
    TierSeed {
        slug: "stream-fuel",
        amount: 10.0,
        emoji: "⛽️",
        name: "Stream Fuel",
        perk: "Silver badge",
    },
    TierSeed {
        slug: "golden-flame",
        amount: 25.0,
        emoji: "🔥",
        name: "Golden Flame",
        perk: "Exclusive emote/unlock",
    },
    TierSeed {
        slug: "boss-tip",
        amount: 50.0,
        emoji: "💀",
        name: "Boss Tip",
        perk: "Leaderboard highlight",
    },
    TierSeed {
        slug: "stream-champion",
        amount: 100.0,
        emoji: "👑",
        name: "Stream Champion",
        perk: "Animated crown badge",
    },
    TierSeed {
        slug: "ascended-gifter",
        amount: 250.0,
        emoji: "🕊️",
        name: "Ascended Gifter",
        perk: "Custom shoutout / premium role",
    },
];

fn dedicated_seeds(theme: &TipTheme) -> Option<&'static [TierSeed]> {
    match theme {
        TipTheme::Fun => Some(&FUN_TIERS[..]),
        _ => None,
    }
}

fn build_tiers(theme: &TipTheme, seeds: &[TierSeed]) -> Vec<TipTier> {
    seeds
        .iter()
        .map(|seed| TipTier {
            id: format!("{}-{}", theme, seed.slug),
            theme: theme.clone(),
            amount: seed.amount,
            emoji: seed.emoji.to_string(),
            name: seed.name.to_string(),
            perk: seed.perk.to_string(),
            min_amount: None,
            max_amount: None,
        })
        .collect()
}

/// Static tier set for a theme.
///
/// Only `fun` has a dedicated set; every other theme, known or not, reuses
/// the `fun` tiers while the set itself carries the requested theme and
/// currency.
pub fn base_tier_set(theme: TipTheme, currency: &str) -> TipTierSet {
    let tiers = match dedicated_seeds(&theme) {
        Some(seeds) => build_tiers(&theme, seeds),
        None => build_tiers(&TipTheme::Fun, &FUN_TIERS),
    };

    TipTierSet {
        theme,
        currency: currency.to_string(),
        tiers,
    }
}
