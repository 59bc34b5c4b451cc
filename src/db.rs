use futures::future::BoxFuture;
use uuid::Uuid;

use crate::errors::BackendError;
use crate::record::CertificateRecord;

/// Storage for certificate records.
///
/// Implementations promise nothing about durability: the in-memory
/// implementation below forgets everything when the process exits.
pub trait Db {
    /// Stores a new record. Fails if a record with the same ID exists.
    fn insert(&self, record: CertificateRecord) -> BoxFuture<Result<(), BackendError>>;

    fn retrieve(&self, id: &Uuid) -> BoxFuture<Result<Option<CertificateRecord>, BackendError>>;

    /// Sets the artifact paths of the given record, returning the
    /// updated record, or `None` if there is no such record.
    fn attach_artifacts(
        &self,
        id: &Uuid,
        certificate_path: String,
        poster_path: String,
    ) -> BoxFuture<Result<Option<CertificateRecord>, BackendError>>;

    /// Marks the given record as failed, returning the updated record,
    /// or `None` if there is no such record.
    fn record_failure(
        &self,
        id: &Uuid,
        reason: String,
    ) -> BoxFuture<Result<Option<CertificateRecord>, BackendError>>;

    fn count(&self) -> BoxFuture<Result<usize, BackendError>>;
}

pub use self::memory::*;

mod memory {
    use std::collections::HashMap;
    use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

    use futures::future::{ready, BoxFuture, FutureExt};
    use time::OffsetDateTime;
    use uuid::Uuid;

    use crate::errors::BackendError;
    use crate::record::CertificateRecord;

    /// Keeps records in a map for the lifetime of the process.
    #[derive(Default)]
    pub struct MemDb {
        records: RwLock<HashMap<Uuid, CertificateRecord>>,
    }

    impl MemDb {
        pub fn new() -> Self {
            Self::default()
        }

        fn read(&self) -> Result<RwLockReadGuard<HashMap<Uuid, CertificateRecord>>, BackendError> {
            self.records
                .read()
                .map_err(|_| BackendError::StorageUnavailable)
        }

        fn write(
            &self,
        ) -> Result<RwLockWriteGuard<HashMap<Uuid, CertificateRecord>>, BackendError> {
            self.records
                .write()
                .map_err(|_| BackendError::StorageUnavailable)
        }

        fn modify(
            &self,
            id: &Uuid,
            f: impl FnOnce(&mut CertificateRecord) -> Result<(), BackendError>,
        ) -> Result<Option<CertificateRecord>, BackendError> {
            let mut records = self.write()?;

            match records.get_mut(id) {
                Some(record) => {
                    f(record)?;
                    Ok(Some(record.clone()))
                }
                None => Ok(None),
            }
        }
    }

    impl super::Db for MemDb {
        fn insert(&self, record: CertificateRecord) -> BoxFuture<Result<(), BackendError>> {
            let result = self.write().and_then(|mut records| {
                let id = *record.id();

                if records.contains_key(&id) {
                    return Err(BackendError::IdAlreadyExists(id));
                }

                records.insert(id, record);
                Ok(())
            });

            ready(result).boxed()
        }

        fn retrieve(
            &self,
            id: &Uuid,
        ) -> BoxFuture<Result<Option<CertificateRecord>, BackendError>> {
            let result = self.read().map(|records| records.get(id).cloned());

            ready(result).boxed()
        }

        fn attach_artifacts(
            &self,
            id: &Uuid,
            certificate_path: String,
            poster_path: String,
        ) -> BoxFuture<Result<Option<CertificateRecord>, BackendError>> {
            let result = self.modify(id, |record| {
                record.attach_artifacts(certificate_path, poster_path, OffsetDateTime::now_utc())
            });

            ready(result).boxed()
        }

        fn record_failure(
            &self,
            id: &Uuid,
            reason: String,
        ) -> BoxFuture<Result<Option<CertificateRecord>, BackendError>> {
            let result = self.modify(id, |record| {
                record.record_failure(reason, OffsetDateTime::now_utc())
            });

            ready(result).boxed()
        }

        fn count(&self) -> BoxFuture<Result<usize, BackendError>> {
            let result = self.read().map(|records| records.len());

            ready(result).boxed()
        }
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::{Db, MemDb};
    use crate::errors::BackendError;
    use crate::record::tests::record;
    use crate::record::{ArtifactKind, Status};

    #[tokio::test]
    async fn inserted_records_can_be_retrieved() {
        let db = MemDb::new();
        let record = record();
        let id = *record.id();

        db.insert(record.clone()).await.expect("insert record");

        assert_eq!(db.retrieve(&id).await.unwrap(), Some(record));
        assert_eq!(db.retrieve(&Uuid::new_v4()).await.unwrap(), None);
        assert_eq!(db.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn ids_are_never_reused() {
        let db = MemDb::new();
        let record = record();

        db.insert(record.clone()).await.expect("insert record");

        let result = db.insert(record).await;
        assert!(matches!(result, Err(BackendError::IdAlreadyExists(_))));
        assert_eq!(db.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn updates_apply_to_stored_records() {
        let db = MemDb::new();
        let record = record();
        let id = *record.id();
        db.insert(record).await.expect("insert record");

        let updated = db
            .attach_artifacts(&id, "c.png".to_owned(), "p.png".to_owned())
            .await
            .expect("attach artifacts")
            .expect("find record");
        assert_eq!(updated.status(), Status::Complete);

        let stored = db.retrieve(&id).await.unwrap().unwrap();
        assert_eq!(stored.artifact_path(ArtifactKind::Poster), Some("p.png"));

        let refused = db.record_failure(&id, "late".to_owned()).await;
        assert!(matches!(refused, Err(BackendError::CertificateComplete(_))));
    }

    #[tokio::test]
    async fn updating_unknown_records_finds_nothing() {
        let db = MemDb::new();

        let result = db
            .attach_artifacts(&Uuid::new_v4(), "c.png".to_owned(), "p.png".to_owned())
            .await
            .expect("attach artifacts");

        assert_eq!(result, None);
    }
}
