//! The trait catalogs and their population frequencies.
//!
//! Every selectable trait is a variant of one of the enums below, and
//! each enum maps its variants to a frequency (a percentage of the
//! population) with a total `match`, so there is no such thing as a
//! trait without a frequency.

use std::fmt;
use std::str::FromStr;

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The four groups of traits a person can select from.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Category {
    EyeColor,
    HairColor,
    FacialFeatures,
    PhysicalAbilities,
}

impl Category {
    /// The name of the request field holding this category.
    pub fn field_name(self) -> &'static str {
        match self {
            Category::EyeColor => "eyeColor",
            Category::HairColor => "hairColor",
            Category::FacialFeatures => "facialFeatures",
            Category::PhysicalAbilities => "physicalAbilities",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.field_name())
    }
}

/// Returned when a string doesn’t name any trait in a category.
#[derive(Clone, Debug, Error, PartialEq)]
#[error("unknown {category} value {value:?}")]
pub struct UnknownTrait {
    pub category: Category,
    pub value: String,
}

macro_rules! trait_enum {
    ($(#[$meta:meta])* $name:ident in $category:expr; $($variant:ident => $value:literal @ $frequency:literal),+ $(,)?) => (
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
        pub enum $name {
            $(#[serde(rename = $value)] $variant),+
        }

        impl $name {
            /// Every variant, in catalog order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub const CATEGORY: Category = $category;

            /// The share of the population with this trait, in percent.
            pub fn frequency(self) -> u8 {
                match self {
                    $($name::$variant => $frequency),+
                }
            }

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $value),+
                }
            }
        }

        impl FromStr for $name {
            type Err = UnknownTrait;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($value => Ok($name::$variant),)+
                    _ => Err(UnknownTrait {
                        category: $category,
                        value: s.to_owned(),
                    }),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    );
}

trait_enum! {
    /// An eye color.
    EyeColor in Category::EyeColor;
    Brown => "brown" @ 79,
    Blue => "blue" @ 8,
    Green => "green" @ 2,
    Hazel => "hazel" @ 5,
}

trait_enum! {
    /// A natural hair color.
    HairColor in Category::HairColor;
    Black => "black" @ 75,
    Brown => "brown" @ 11,
    Blonde => "blonde" @ 6,
    Red => "red" @ 2,
}

trait_enum! {
    FacialFeature in Category::FacialFeatures;
    Freckles => "freckles" @ 4,
    Dimples => "dimples" @ 20,
    CleftChin => "cleft_chin" @ 15,
    HighCheekbones => "high_cheekbones" @ 12,
}

trait_enum! {
    /// Something a person can do with their body that most people can’t.
    PhysicalAbility in Category::PhysicalAbilities;
    RollTongueWave => "rollTongueWave" @ 25,
    IndependentEye => "independentEye" @ 8,
    WiggleEarsNoHands => "wiggleEarsNoHands" @ 15,
    TongueToElbow => "tongueToElbow" @ 3,
    ThumbHypermobility => "thumbHypermobility" @ 5,
    TongueCloverleaf => "tongueCloverleaf" @ 2,
    IndependentToes => "independentToes" @ 12,
    TongueToNose => "tongueToNose" @ 10,
}

/// A set of selected traits, the only input that affects rarity.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Traits {
    pub eye_color: Option<EyeColor>,

    pub hair_color: Option<HairColor>,

    #[serde(default)]
    pub facial_features: Vec<FacialFeature>,

    #[serde(default)]
    pub physical_abilities: Vec<PhysicalAbility>,
}

/// One selectable value and its frequency.
#[derive(Clone, Debug, Serialize)]
pub struct CatalogEntry {
    value: &'static str,
    frequency: u8,
}

/// Every selectable value, grouped by category.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Catalog {
    eye_colors: Vec<CatalogEntry>,
    hair_colors: Vec<CatalogEntry>,
    facial_features: Vec<CatalogEntry>,
    physical_abilities: Vec<CatalogEntry>,
}

macro_rules! entries {
    ($name:ident) => {
        $name::ALL
            .iter()
            .map(|t| CatalogEntry {
                value: t.as_str(),
                frequency: t.frequency(),
            })
            .collect()
    };
}

lazy_static! {
    pub static ref CATALOG: Catalog = Catalog {
        eye_colors: entries!(EyeColor),
        hair_colors: entries!(HairColor),
        facial_features: entries!(FacialFeature),
        physical_abilities: entries!(PhysicalAbility),
    };
}
