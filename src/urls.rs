use url::Url;
use uuid::Uuid;

use crate::record::ArtifactKind;

/// Convenience wrapper for URL generation functions.
#[derive(Clone)]
pub struct Urls {
    /// Top-level URL, including trailing slash.
    base: Url,
}

/// Path under which every certificate is served.
pub(crate) const CERTIFICATES_PREFIX: &str = "api/certificates/";

impl Urls {
    /// Create a new instance. A trailing slash is added to `base` if
    /// missing.
    pub fn new(base: impl AsRef<str>) -> Self {
        let base = base.as_ref();
        let with_slash = if base.ends_with('/') {
            base.to_owned()
        } else {
            format!("{}/", base)
        };
        let base = Url::parse(&with_slash).unwrap_or_else(|_| panic!("parse {} as URL", base));

        Urls { base }
    }

    pub fn certificates(&self) -> Url {
        self.base
            .join(CERTIFICATES_PREFIX)
            .expect("get certificates URL")
    }

    pub fn certificate(&self, id: &Uuid) -> Url {
        let id = format!("{}", id);
        self.certificates()
            .join(&id)
            .unwrap_or_else(|_| panic!("get URL for certificate {}", id))
    }

    pub fn artifact(&self, id: &Uuid, kind: ArtifactKind) -> Url {
        self.certificates()
            .join(&format!("{}/download/{}", id, kind))
            .unwrap_or_else(|_| panic!("get {} URL for certificate {}", kind, id))
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::Urls;
    use crate::record::ArtifactKind;

    #[test]
    fn urls_are_nested_under_the_base() {
        let id = Uuid::new_v4();

        for base in &["https://www.example.com/rarity", "https://www.example.com/rarity/"] {
            let urls = Urls::new(base);

            assert_eq!(
                urls.certificate(&id).as_str(),
                format!("https://www.example.com/rarity/api/certificates/{}", id)
            );
            assert_eq!(
                urls.artifact(&id, ArtifactKind::Poster).as_str(),
                format!("https://www.example.com/rarity/api/certificates/{}/download/poster", id)
            );
        }
    }
}
