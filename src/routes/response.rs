use serde::Serialize;
use url::Url;

use crate::record::{ArtifactKind, CertificateRecord};
use crate::urls::Urls;

/// A record as returned to clients, with links to whichever artifacts
/// have been rendered.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateResponse<'a> {
    #[serde(flatten)]
    record: &'a CertificateRecord,

    url: Url,

    certificate_url: Option<Url>,

    poster_url: Option<Url>,
}

impl<'a> CertificateResponse<'a> {
    pub fn new(urls: &Urls, record: &'a CertificateRecord) -> Self {
        let id = record.id();
        let link = |kind: ArtifactKind| record.artifact_path(kind).map(|_| urls.artifact(id, kind));

        CertificateResponse {
            record,
            url: urls.certificate(id),
            certificate_url: link(ArtifactKind::Certificate),
            poster_url: link(ArtifactKind::Poster),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum SuccessResponse<'a> {
    Certificate(CertificateResponse<'a>),
    Healthz {
        revision: Option<&'a str>,
        timestamp: Option<&'a str>,
        version: &'a str,
        certificates: usize,
    },
}
