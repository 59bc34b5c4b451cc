//! The rarity model.
//!
//! The rarity of a combination is the product of the frequencies of its
//! traits, treated as independent probabilities. Traits that aren’t
//! selected don’t contribute, so an empty selection is 100% common.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::traits::Traits;

/// The smallest percentage ever reported. Long combinations of rare
/// traits are floored here rather than underflowing toward zero.
pub const MIN_PERCENTAGE: f64 = 1e-12;

/// A qualitative label for a percentage.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum RarityDescription {
    #[serde(rename = "Uncommon combination")]
    Uncommon,

    #[serde(rename = "Rare combination")]
    Rare,

    #[serde(rename = "Very rare combination")]
    VeryRare,

    #[serde(rename = "Ultra rare combination!")]
    UltraRare,
}

impl RarityDescription {
    pub fn for_percentage(percentage: f64) -> Self {
        if percentage > 1.0 {
            RarityDescription::Uncommon
        } else if percentage > 0.1 {
            RarityDescription::Rare
        } else if percentage > 0.01 {
            RarityDescription::VeryRare
        } else {
            RarityDescription::UltraRare
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RarityDescription::Uncommon => "Uncommon combination",
            RarityDescription::Rare => "Rare combination",
            RarityDescription::VeryRare => "Very rare combination",
            RarityDescription::UltraRare => "Ultra rare combination!",
        }
    }
}

impl fmt::Display for RarityDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The computed rarity of a combination of traits.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct RarityResult {
    /// The probability of the combination, as a percentage.
    #[serde(rename = "rarityPercentage")]
    pub percentage: f64,

    /// The same probability as “1 in N”.
    #[serde(rename = "rarityRatio")]
    pub ratio: String,

    pub description: RarityDescription,
}

/// Computes the rarity of the given traits.
///
/// Every entry in the trait lists contributes, so a list that repeats a
/// value counts it twice; deduplicate before calling if that isn’t
/// wanted.
pub fn compute_rarity(traits: &Traits) -> RarityResult {
    let mut probability = 1.0_f64;

    if let Some(eye_color) = traits.eye_color {
        probability *= fraction(eye_color.frequency());
    }

    if let Some(hair_color) = traits.hair_color {
        probability *= fraction(hair_color.frequency());
    }

    for feature in &traits.facial_features {
        probability *= fraction(feature.frequency());
    }

    for ability in &traits.physical_abilities {
        probability *= fraction(ability.frequency());
    }

    let percentage = (probability * 100.0).max(MIN_PERCENTAGE);

    RarityResult {
        percentage,
        ratio: format_ratio(percentage),
        description: RarityDescription::for_percentage(percentage),
    }
}

fn fraction(frequency: u8) -> f64 {
    f64::from(frequency) / 100.0
}

/// Renders a percentage as “1 in N”, with N grouped by thousands.
///
/// ```
/// use rarity::rarity::format_ratio;
/// assert_eq!(format_ratio(0.5), "1 in 200");
/// assert_eq!(format_ratio(0.0036), "1 in 27,778");
/// ```
pub fn format_ratio(percentage: f64) -> String {
    let n = (100.0 / percentage).round() as u64;

    format!("1 in {}", group_thousands(n))
}

fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    grouped
}
