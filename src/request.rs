//! Raw request bodies and their validation.
//!
//! Traits arrive as plain strings and are only turned into catalog
//! values here, so that an unknown value is reported to the caller
//! instead of being silently ignored.

use std::str::FromStr;

use base64::{engine::general_purpose, Engine};
use serde::Deserialize;

use crate::errors::BackendError;
use crate::normalization;
use crate::record::TraitSelection;
use crate::traits::{Traits, UnknownTrait};

/// The body of a certificate generation request.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    #[serde(default, deserialize_with = "normalization::deserialize")]
    pub first_name: String,

    #[serde(default, deserialize_with = "normalization::deserialize")]
    pub last_name: String,

    #[serde(flatten)]
    pub traits: RawTraits,

    #[serde(default)]
    pub face_image_base64: Option<String>,
}

/// The body of a rarity calculation request. Other fields of a full
/// generation request are accepted and ignored.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct RarityRequest {
    #[serde(flatten)]
    pub traits: RawTraits,
}

/// Trait selections as submitted.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTraits {
    #[serde(default)]
    pub eye_color: Option<String>,

    #[serde(default)]
    pub hair_color: Option<String>,

    #[serde(default)]
    pub facial_features: Vec<String>,

    #[serde(default)]
    pub physical_abilities: Vec<String>,
}

impl GenerateRequest {
    pub fn validate(self) -> Result<TraitSelection, BackendError> {
        if self.first_name.is_empty() {
            return Err(BackendError::Validation("First name is required".to_owned()));
        }

        if self.last_name.is_empty() {
            return Err(BackendError::Validation("Last name is required".to_owned()));
        }

        let traits = self.traits.validate()?;

        Ok(TraitSelection {
            first_name: self.first_name,
            last_name: self.last_name,
            traits,
            face_image_base64: self.face_image_base64.filter(|s| !s.is_empty()),
        })
    }
}

impl RarityRequest {
    pub fn validate(self) -> Result<Traits, BackendError> {
        let RawTraits {
            eye_color,
            hair_color,
            ..
        } = &self.traits;

        if is_blank(eye_color) || is_blank(hair_color) {
            return Err(BackendError::Validation(
                "Eye color and hair color are required".to_owned(),
            ));
        }

        self.traits.validate()
    }
}

impl RawTraits {
    /// Parses every value, dropping repeated list entries.
    pub fn validate(&self) -> Result<Traits, BackendError> {
        Ok(Traits {
            eye_color: parse_optional(&self.eye_color)?,
            hair_color: parse_optional(&self.hair_color)?,
            facial_features: parse_all(&self.facial_features)?,
            physical_abilities: parse_all(&self.physical_abilities)?,
        })
    }
}

impl TraitSelection {
    /// Decodes the submitted face image, accepting either bare base64 or
    /// a `data:` URL.
    pub fn decode_face_image(&self) -> Result<Option<Vec<u8>>, BackendError> {
        let encoded = match &self.face_image_base64 {
            Some(encoded) => encoded,
            None => return Ok(None),
        };

        let payload = match encoded.split_once(";base64,") {
            Some((prefix, payload)) if prefix.starts_with("data:") => payload,
            _ => encoded.as_str(),
        };

        general_purpose::STANDARD
            .decode(payload.trim())
            .map(Some)
            .map_err(BackendError::MalformedImage)
    }
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, str::is_empty)
}

fn parse_optional<T>(value: &Option<String>) -> Result<Option<T>, BackendError>
where T: FromStr<Err = UnknownTrait> {
    match value.as_deref() {
        None | Some("") => Ok(None),
        Some(value) => Ok(Some(value.parse()?)),
    }
}

fn parse_all<T>(values: &[String]) -> Result<Vec<T>, BackendError>
where T: FromStr<Err = UnknownTrait> + PartialEq {
    let mut parsed: Vec<T> = Vec::with_capacity(values.len());

    for value in values {
        let value = value.parse()?;

        if !parsed.contains(&value) {
            parsed.push(value);
        }
    }

    Ok(parsed)
}
