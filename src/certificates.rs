use std::sync::Arc;

use time::OffsetDateTime;
use uuid::Uuid;

use crate::db::Db;
use crate::errors::BackendError;
use crate::rarity::RarityResult;
use crate::record::{CertificateRecord, TraitSelection};

/// Creates certificate records and moves them through their lifecycle.
#[derive(Clone)]
pub struct Certificates {
    db: Arc<dyn Db + Send + Sync>,
}

impl Certificates {
    pub fn new(db: Arc<dyn Db + Send + Sync>) -> Self {
        Self { db }
    }

    /// Stores a new pending record with a fresh ID.
    pub async fn create(
        &self,
        selection: TraitSelection,
        rarity: RarityResult,
        face_image_path: Option<String>,
    ) -> Result<CertificateRecord, BackendError> {
        let record = CertificateRecord::new(
            Uuid::new_v4(),
            OffsetDateTime::now_utc(),
            selection,
            rarity,
            face_image_path,
        );

        self.db.insert(record.clone()).await?;

        Ok(record)
    }

    pub async fn get(&self, id: &Uuid) -> Result<CertificateRecord, BackendError> {
        self.db
            .retrieve(id)
            .await?
            .ok_or(BackendError::CertificateNotFound(*id))
    }

    /// Completes a record. Fails with `CertificateComplete` if artifacts
    /// were already attached.
    pub async fn attach_artifacts(
        &self,
        id: &Uuid,
        certificate_path: String,
        poster_path: String,
    ) -> Result<CertificateRecord, BackendError> {
        self.db
            .attach_artifacts(id, certificate_path, poster_path)
            .await?
            .ok_or(BackendError::CertificateNotFound(*id))
    }

    pub async fn record_failure(
        &self,
        id: &Uuid,
        reason: String,
    ) -> Result<CertificateRecord, BackendError> {
        self.db
            .record_failure(id, reason)
            .await?
            .ok_or(BackendError::CertificateNotFound(*id))
    }

    pub async fn count(&self) -> Result<usize, BackendError> {
        self.db.count().await
    }
}
