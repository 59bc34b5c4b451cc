use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::errors::BackendError;
use crate::rarity::RarityResult;
use crate::traits::Traits;

/// A validated submission.
#[derive(Clone, Debug, PartialEq)]
pub struct TraitSelection {
    /// The first name provided, normalized and non-empty.
    pub first_name: String,

    /// The last name provided, normalized and non-empty.
    pub last_name: String,

    /// The selected traits, without duplicates.
    pub traits: Traits,

    /// The face image as submitted, if any. Never inspected here.
    pub face_image_base64: Option<String>,
}

/// Where a record is in its lifecycle.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// Waiting for its artifacts to be rendered.
    Pending,

    /// Artifacts attached. Terminal.
    Complete,

    /// Rendering gave up; see the record’s `failure`.
    Failed,
}

/// The two images rendered for each record.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ArtifactKind {
    Certificate,
    Poster,
}

impl ArtifactKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ArtifactKind::Certificate => "certificate",
            ArtifactKind::Poster => "poster",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ArtifactKind {
    type Err = BackendError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "certificate" => Ok(ArtifactKind::Certificate),
            "poster" => Ok(ArtifactKind::Poster),
            _ => Err(BackendError::InvalidArtifactKind(s.to_owned())),
        }
    }
}

/// A single certificate.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateRecord {
    /// The ID of the certificate.
    id: Uuid,

    first_name: String,

    last_name: String,

    /// The traits the rarity was computed from.
    #[serde(flatten)]
    traits: Traits,

    /// Where the submitted face image was stored, if one was submitted.
    face_image_path: Option<String>,

    /// Computed once, when the record is created.
    #[serde(flatten)]
    rarity: RarityResult,

    certificate_image_path: Option<String>,

    poster_image_path: Option<String>,

    status: Status,

    /// Why rendering failed, if it did.
    failure: Option<String>,

    /// The times it was created and updated.
    #[serde(flatten)]
    times: Times,
}

impl CertificateRecord {
    /// Creates a pending record without artifacts.
    pub fn new(
        id: Uuid,
        created_at: OffsetDateTime,
        selection: TraitSelection,
        rarity: RarityResult,
        face_image_path: Option<String>,
    ) -> Self {
        let TraitSelection {
            first_name,
            last_name,
            traits,
            ..
        } = selection;

        CertificateRecord {
            id,
            first_name,
            last_name,
            traits,
            face_image_path,
            rarity,
            certificate_image_path: None,
            poster_image_path: None,
            status: Status::Pending,
            failure: None,
            times: Times {
                created_at,
                updated_at: created_at,
            },
        }
    }

    pub fn id(&self) -> &Uuid {
        &self.id
    }

    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    pub fn traits(&self) -> &Traits {
        &self.traits
    }

    pub fn rarity(&self) -> &RarityResult {
        &self.rarity
    }

    pub fn face_image_path(&self) -> Option<&str> {
        self.face_image_path.as_deref()
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    pub fn times(&self) -> &Times {
        &self.times
    }

    /// The stored path of the given artifact, once rendered.
    pub fn artifact_path(&self, kind: ArtifactKind) -> Option<&str> {
        match kind {
            ArtifactKind::Certificate => self.certificate_image_path.as_deref(),
            ArtifactKind::Poster => self.poster_image_path.as_deref(),
        }
    }

    /// Sets the artifact paths and completes the record. Fails if the
    /// record is already complete.
    pub fn attach_artifacts(
        &mut self,
        certificate_path: String,
        poster_path: String,
        now: OffsetDateTime,
    ) -> Result<(), BackendError> {
        self.ensure_incomplete()?;

        self.certificate_image_path = Some(certificate_path);
        self.poster_image_path = Some(poster_path);
        self.status = Status::Complete;
        self.failure = None;
        self.times.updated_at = now;

        Ok(())
    }

    /// Marks the record as failed. Fails if the record is already
    /// complete.
    pub fn record_failure(
        &mut self,
        reason: String,
        now: OffsetDateTime,
    ) -> Result<(), BackendError> {
        self.ensure_incomplete()?;

        self.status = Status::Failed;
        self.failure = Some(reason);
        self.times.updated_at = now;

        Ok(())
    }

    fn ensure_incomplete(&self) -> Result<(), BackendError> {
        match self.status {
            Status::Complete => Err(BackendError::CertificateComplete(self.id)),
            Status::Pending | Status::Failed => Ok(()),
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Times {
    /// The date and time it was created.
    #[serde(with = "time::serde::timestamp")]
    pub(crate) created_at: OffsetDateTime,

    /// The date and time it was last modified.
    #[serde(with = "time::serde::timestamp")]
    pub(crate) updated_at: OffsetDateTime,
}

impl Times {
    pub fn created_at(&self) -> OffsetDateTime {
        self.created_at
    }

    pub fn updated_at(&self) -> OffsetDateTime {
        self.updated_at
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::rarity::compute_rarity;
    use crate::traits::{EyeColor, HairColor, PhysicalAbility};

    pub(crate) fn selection() -> TraitSelection {
        TraitSelection {
            first_name: "Ada".to_owned(),
            last_name: "Lovelace".to_owned(),
            traits: Traits {
                eye_color: Some(EyeColor::Hazel),
                hair_color: Some(HairColor::Blonde),
                facial_features: vec![],
                physical_abilities: vec![
                    PhysicalAbility::TongueToNose,
                    PhysicalAbility::IndependentToes,
                ],
            },
            face_image_base64: None,
        }
    }

    pub(crate) fn record() -> CertificateRecord {
        let selection = selection();
        let rarity = compute_rarity(&selection.traits);

        CertificateRecord::new(Uuid::new_v4(), OffsetDateTime::now_utc(), selection, rarity, None)
    }

    #[test]
    fn new_records_are_pending() {
        let record = record();

        assert_eq!(record.status(), Status::Pending);
        assert_eq!(record.artifact_path(ArtifactKind::Certificate), None);
        assert_eq!(record.artifact_path(ArtifactKind::Poster), None);
        assert_eq!(record.times().created_at(), record.times().updated_at());
    }

    #[test]
    fn artifacts_can_only_be_attached_once() {
        let mut record = record();
        let rarity = record.rarity().clone();

        record
            .attach_artifacts("c.png".to_owned(), "p.png".to_owned(), OffsetDateTime::now_utc())
            .expect("attach artifacts");

        assert_eq!(record.status(), Status::Complete);
        assert_eq!(record.artifact_path(ArtifactKind::Certificate), Some("c.png"));
        assert_eq!(record.artifact_path(ArtifactKind::Poster), Some("p.png"));
        assert_eq!(record.rarity(), &rarity);

        let second =
            record.attach_artifacts("x.png".to_owned(), "y.png".to_owned(), OffsetDateTime::now_utc());
        assert!(matches!(second, Err(BackendError::CertificateComplete(_))));
        assert_eq!(record.artifact_path(ArtifactKind::Certificate), Some("c.png"));

        let failure = record.record_failure("too late".to_owned(), OffsetDateTime::now_utc());
        assert!(matches!(failure, Err(BackendError::CertificateComplete(_))));
        assert_eq!(record.status(), Status::Complete);
    }

    #[test]
    fn failed_records_can_still_complete() {
        let mut record = record();

        record
            .record_failure("renderer timed out".to_owned(), OffsetDateTime::now_utc())
            .expect("record failure");
        assert_eq!(record.status(), Status::Failed);
        assert_eq!(record.failure(), Some("renderer timed out"));

        record
            .attach_artifacts("c.png".to_owned(), "p.png".to_owned(), OffsetDateTime::now_utc())
            .expect("attach artifacts");
        assert_eq!(record.status(), Status::Complete);
        assert_eq!(record.failure(), None);
    }

    #[test]
    fn records_serialize_flat() {
        let record = record();
        let value = serde_json::to_value(&record).unwrap();

        assert_eq!(value["firstName"], "Ada");
        assert_eq!(value["eyeColor"], "hazel");
        assert_eq!(value["physicalAbilities"][0], "tongueToNose");
        assert_eq!(value["rarityRatio"], "1 in 27,778");
        assert_eq!(value["description"], "Ultra rare combination!");
        assert_eq!(value["status"], "pending");
        assert!(value["certificateImagePath"].is_null());
        assert!(value["createdAt"].is_i64());
    }

    #[test]
    fn artifact_kinds_parse() {
        assert_eq!("poster".parse::<ArtifactKind>().unwrap(), ArtifactKind::Poster);
        assert!(matches!(
            "thumbnail".parse::<ArtifactKind>(),
            Err(BackendError::InvalidArtifactKind(_))
        ));
    }
}
