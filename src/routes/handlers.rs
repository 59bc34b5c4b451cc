use std::time::{Duration, Instant};

use bytes::Bytes;
use log::{debug, error, info, o};
use uuid::Uuid;
use warp::{
    http::StatusCode,
    reject,
    reply::{json, with_header, with_status, Reply},
};

use crate::environment::Environment;
use crate::errors::BackendError;
use crate::rarity::compute_rarity;
use crate::record::{ArtifactKind, CertificateRecord};
use crate::request::{GenerateRequest, RarityRequest};
use crate::routes::{
    rejection::{Context, Rejection},
    response::{CertificateResponse, SuccessResponse},
};
use crate::traits::CATALOG;

const SERVER_TIMING_HEADER: &str = "server-timing";
type RouteResult = Result<Box<dyn Reply>, reject::Rejection>;

macro_rules! timed {
    ($($body:tt)+) => {
        let start = Instant::now();

        let result = { $($body)+ };

        Ok(Box::new(with_header(
            result,
            SERVER_TIMING_HEADER,
            format_server_timing(start.elapsed()),
        )) as Box<dyn Reply>)
    };
}

pub async fn generate(environment: Environment, body: Bytes) -> RouteResult {
    timed! {
        let Environment {
            logger,
            certificates,
            urls,
            store,
            queue,
        } = environment;

        let error_handler = |e: BackendError| Rejection::new(Context::generate(None), e);

        debug!(logger, "Parsing submission...");
        let request: GenerateRequest = serde_json::from_slice(&body)
            .map_err(BackendError::MalformedRequest)
            .map_err(error_handler)?;
        let selection = request.validate().map_err(error_handler)?;
        let face_image = selection.decode_face_image().map_err(error_handler)?;

        let rarity = compute_rarity(&selection.traits);

        let face_image_path = match face_image {
            Some(raw) => {
                debug!(logger, "Saving face image..."; "bytes" => raw.len());
                let name = format!("face-{}.jpg", Uuid::new_v4());
                Some(store.save(&name, raw).await.map_err(error_handler)?)
            }
            None => None,
        };

        let record = match certificates
            .create(selection, rarity, face_image_path.clone())
            .await
        {
            Ok(record) => record,
            Err(e) => {
                if let Some(path) = face_image_path {
                    if let Err(cleanup) = store.delete(&path).await {
                        error!(logger, "Failed to delete orphaned face image"; "path" => path, "error" => %cleanup);
                    }
                }

                return Err(reject::custom(error_handler(e)));
            }
        };
        let id = *record.id();
        let logger = logger.new(o!("id" => id.to_string()));

        let error_handler = |e: BackendError| Rejection::new(Context::generate(Some(id.to_string())), e);

        debug!(logger, "Queueing render...");
        if let Err(e) = queue.enqueue(id) {
            if let Err(failure) = certificates.record_failure(&id, e.to_string()).await {
                error!(logger, "Failed to record queueing failure"; "error" => %failure);
            }

            return Err(reject::custom(error_handler(e)));
        }

        info!(logger, "Created certificate"; "rarity_ratio" => record.rarity().ratio.as_str());

        let response = SuccessResponse::Certificate(CertificateResponse::new(&urls, &record));

        with_header(
            with_status(json(&response), StatusCode::ACCEPTED),
            "location",
            urls.certificate(&id).as_str(),
        )
    }
}

pub async fn calculate(environment: Environment, body: Bytes) -> RouteResult {
    timed! {
        let error_handler = |e: BackendError| Rejection::new(Context::calculate(), e);

        let request: RarityRequest = serde_json::from_slice(&body)
            .map_err(BackendError::MalformedRequest)
            .map_err(error_handler)?;
        let traits = request.validate().map_err(error_handler)?;

        let rarity = compute_rarity(&traits);
        debug!(environment.logger, "Calculated rarity"; "percentage" => rarity.percentage);

        json(&rarity)
    }
}

pub async fn traits(_environment: Environment) -> RouteResult {
    timed! {
        json(&*CATALOG)
    }
}

pub async fn retrieve(environment: Environment, id: String) -> RouteResult {
    timed! {
        let error_handler = |e: BackendError| Rejection::new(Context::retrieve(id.clone()), e);

        let id = parse_id(&id).map_err(error_handler)?;
        debug!(environment.logger, "Retrieving certificate..."; "id" => %id);

        let record = environment.certificates.get(&id).await.map_err(error_handler)?;

        json(&SuccessResponse::Certificate(CertificateResponse::new(
            &environment.urls,
            &record,
        )))
    }
}

pub async fn download(environment: Environment, id: String, kind: String) -> RouteResult {
    timed! {
        let error_handler =
            |e: BackendError| Rejection::new(Context::download(id.clone(), kind.clone()), e);

        let id = parse_id(&id).map_err(error_handler)?;
        let kind: ArtifactKind = kind.parse().map_err(error_handler)?;
        debug!(environment.logger, "Downloading artifact..."; "id" => %id, "kind" => %kind);

        let record = environment.certificates.get(&id).await.map_err(error_handler)?;
        let not_found = || BackendError::ArtifactNotFound { id, kind };

        let path = record
            .artifact_path(kind)
            .ok_or_else(not_found)
            .map_err(error_handler)?;
        let data = environment
            .store
            .read(path)
            .await
            .map_err(error_handler)?
            .ok_or_else(not_found)
            .map_err(error_handler)?;

        with_header(
            with_header(data, "content-type", mime::IMAGE_PNG.essence_str()),
            "content-disposition",
            format!("attachment; filename=\"{}\"", attachment_name(&record, kind)),
        )
    }
}

fn parse_id(id: &str) -> Result<Uuid, BackendError> {
    Uuid::parse_str(id).map_err(|_| BackendError::InvalidId(id.to_owned()))
}

/// The download file name, e.g. `Ada-Lovelace-poster.png`. Names are
/// reduced to ASCII letters, digits, `-` and `_`.
fn attachment_name(record: &CertificateRecord, kind: ArtifactKind) -> String {
    let clean = |name: &str| -> String {
        name.chars()
            .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
            .collect()
    };

    let mut parts: Vec<String> = vec![clean(record.first_name()), clean(record.last_name())];
    parts.retain(|part| !part.is_empty());
    parts.push(kind.to_string());

    format!("{}.png", parts.join("-"))
}

fn format_server_timing(seconds: Duration) -> String {
    format!("handler;dur={}", seconds.as_secs_f64() * 1000.0)
}
