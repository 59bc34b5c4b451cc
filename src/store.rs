use std::path::{Component, Path, PathBuf};

use futures::future::{BoxFuture, FutureExt};

use crate::errors::BackendError;

pub trait Store: Send + Sync {
    /// The directory renderers should write artifacts into.
    fn directory(&self) -> &Path;

    /// Saves the given data under the given file name and returns the
    /// path to read it back with.
    fn save(&self, name: &str, raw: Vec<u8>) -> BoxFuture<Result<String, BackendError>>;

    /// Reads a previously stored file. `Ok(None)` if there is none.
    fn read(&self, path: &str) -> BoxFuture<Result<Option<Vec<u8>>, BackendError>>;

    /// Deletes a previously stored file. Deleting a missing file succeeds.
    fn delete(&self, path: &str) -> BoxFuture<Result<(), BackendError>>;
}

/// A store that keeps its files in a local directory.
pub struct FileStore {
    base: PathBuf,
}

impl FileStore {
    /// Creates a new instance, creating the directory if needed. The
    /// directory is made absolute, so paths handed out by
    /// [`Store::directory`] stay valid whatever the working directory.
    pub fn new(base: impl Into<PathBuf>) -> Result<Self, BackendError> {
        let base = base.into();
        std::fs::create_dir_all(&base)?;

        Ok(Self {
            base: base.canonicalize()?,
        })
    }

    /// Resolves a stored path, which may be relative to the base
    /// directory or absolute within it. Anything else resolves to
    /// nothing.
    fn resolve(&self, path: &str) -> Option<PathBuf> {
        let path = Path::new(path);

        if path.components().any(|c| c == Component::ParentDir) {
            return None;
        }

        if path.is_absolute() {
            return if path.starts_with(&self.base) {
                Some(path.to_owned())
            } else {
                None
            };
        }

        Some(self.base.join(path))
    }
}

impl Store for FileStore {
    fn directory(&self) -> &Path {
        &self.base
    }

    fn save(&self, name: &str, raw: Vec<u8>) -> BoxFuture<Result<String, BackendError>> {
        save(self, name.to_owned(), raw).boxed()
    }

    fn read(&self, path: &str) -> BoxFuture<Result<Option<Vec<u8>>, BackendError>> {
        read(self.resolve(path)).boxed()
    }

    fn delete(&self, path: &str) -> BoxFuture<Result<(), BackendError>> {
        delete(self.resolve(path)).boxed()
    }
}

async fn save(store: &FileStore, name: String, raw: Vec<u8>) -> Result<String, BackendError> {
    let path = store
        .resolve(&name)
        .ok_or_else(|| BackendError::Validation(format!("invalid file name {:?}", name)))?;

    tokio::fs::write(&path, raw).await?;

    Ok(name)
}

async fn read(path: Option<PathBuf>) -> Result<Option<Vec<u8>>, BackendError> {
    use std::io::ErrorKind;

    let path = match path {
        Some(path) => path,
        None => return Ok(None),
    };

    match tokio::fs::read(&path).await {
        Ok(data) => Ok(Some(data)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

async fn delete(path: Option<PathBuf>) -> Result<(), BackendError> {
    use std::io::ErrorKind;

    let path = match path {
        Some(path) => path,
        None => return Ok(()),
    };

    match tokio::fs::remove_file(&path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::{FileStore, Store};

    #[tokio::test]
    async fn saved_files_can_be_read() {
        let directory = tempfile::tempdir().expect("create temporary directory");
        let store = FileStore::new(directory.path()).expect("create store");

        let path = store
            .save("face-1.jpg", b"jpeg".to_vec())
            .await
            .expect("save file");

        assert_eq!(path, "face-1.jpg");
        assert_eq!(store.read(&path).await.unwrap(), Some(b"jpeg".to_vec()));

        let absolute = store.directory().join("face-1.jpg");
        assert_eq!(
            store.read(absolute.to_str().unwrap()).await.unwrap(),
            Some(b"jpeg".to_vec())
        );
    }

    #[tokio::test]
    async fn missing_and_escaping_paths_read_nothing() {
        let directory = tempfile::tempdir().expect("create temporary directory");
        let store = FileStore::new(directory.path().join("generated")).expect("create store");

        std::fs::write(directory.path().join("secret.txt"), b"secret").unwrap();

        assert_eq!(store.read("missing.png").await.unwrap(), None);
        assert_eq!(store.read("../secret.txt").await.unwrap(), None);
        assert_eq!(
            store
                .read(directory.path().join("secret.txt").to_str().unwrap())
                .await
                .unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn saving_outside_the_directory_fails() {
        let directory = tempfile::tempdir().expect("create temporary directory");
        let store = FileStore::new(directory.path()).expect("create store");

        assert!(store.save("../face.jpg", vec![]).await.is_err());
    }

    #[tokio::test]
    async fn relative_directories_are_made_absolute() {
        let directory = tempfile::Builder::new()
            .prefix("relative-store")
            .tempdir_in(".")
            .expect("create temporary directory");
        let relative = directory.path().strip_prefix(".").unwrap().join("generated");
        assert!(relative.is_relative());

        let store = FileStore::new(&relative).expect("create store");
        assert!(store.directory().is_absolute());

        let written = store.directory().join("certificate_1.png");
        std::fs::write(&written, b"png").unwrap();

        assert_eq!(
            store.read(written.to_str().unwrap()).await.unwrap(),
            Some(b"png".to_vec())
        );
        assert_eq!(
            store.read("certificate_1.png").await.unwrap(),
            Some(b"png".to_vec())
        );
    }

    #[tokio::test]
    async fn deleted_files_are_gone() {
        let directory = tempfile::tempdir().expect("create temporary directory");
        let store = FileStore::new(directory.path()).expect("create store");

        let path = store.save("face-2.jpg", b"jpeg".to_vec()).await.unwrap();
        store.delete(&path).await.expect("delete file");

        assert_eq!(store.read(&path).await.unwrap(), None);
        assert!(store.delete(&path).await.is_ok());
        assert!(store.delete("../elsewhere.jpg").await.is_ok());
    }
}
