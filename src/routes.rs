use std::sync::Arc;

use log::{error, warn, Logger};
use warp::http::StatusCode;
use warp::reject;
use warp::reply::{json, with_status, Json, Reply, WithStatus};
use warp::Filter;

use crate::environment::Environment;
use crate::errors::BackendError;

pub mod admin;
mod handlers;
mod rejection;
mod response;

pub use internal::*;

/// The maximum request body size to accept. Face images arrive inline
/// as base64, so this is generous.
const MAX_CONTENT_LENGTH: u64 = 16 * 1024 * 1024;

/// Combines every public route, formatting rejections as JSON.
pub fn make_api(
    environment: Environment,
) -> impl warp::Filter<Extract = (impl Reply,), Error = reject::Rejection> + Clone {
    let logger = environment.logger.clone();

    make_generate_route(environment.clone())
        .or(make_calculate_route(environment.clone()))
        .or(make_traits_route(environment.clone()))
        .or(make_download_route(environment.clone()))
        .or(make_retrieve_route(environment))
        .recover(move |r| format_rejection(logger.clone(), r))
}

pub async fn format_rejection(
    logger: Arc<Logger>,
    rej: reject::Rejection,
) -> Result<WithStatus<Json>, reject::Rejection> {
    if let Some(r) = rej.find::<rejection::Rejection>() {
        let e = &r.error;
        let status = status_code_for(e);

        if status.is_server_error() {
            error!(logger, "Backend error"; "context" => ?r.context, "error" => ?r.error, "status" => %status, "message" => %r.error);
        } else {
            warn!(logger, "Rejected request"; "context" => ?r.context, "status" => %status, "message" => %r.error);
        }

        let flattened = r.flatten();

        return Ok(with_status(json(&flattened), status));
    }

    Err(rej)
}

fn status_code_for(e: &BackendError) -> StatusCode {
    use BackendError::*;

    match e {
        e if e.is_validation_error() => StatusCode::BAD_REQUEST,
        InvalidId(..) | InvalidArtifactKind(..) => StatusCode::BAD_REQUEST,
        CertificateNotFound(..) | ArtifactNotFound { .. } => StatusCode::NOT_FOUND,
        CertificateComplete(..) => StatusCode::CONFLICT,
        QueueClosed | QueueFull | StorageUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

mod internal {
    use warp::body::{bytes, content_length_limit};
    use warp::filters::BoxedFilter;
    use warp::path::end;
    use warp::Filter;
    use warp::Reply;
    use warp::{get as g, path as p, path::param as par, post};

    use super::{handlers, MAX_CONTENT_LENGTH};
    use crate::environment::Environment;

    type Route = BoxedFilter<(Box<dyn Reply>,)>;

    macro_rules! route_filter {
    ($route_variable:ident; $first:expr) => (let $route_variable = $route_variable.and($first););
    ($route_variable:ident; $first:expr, $($rest:expr),+) => (
        let $route_variable = $route_variable.and($first);
        route_filter!($route_variable; $($rest),+);
    )
}

    macro_rules! route {
    ($name:ident => $handler:ident, $route_variable:ident; $($filters:expr),+) => (
        pub fn $name(environment: Environment) -> Route {
            let $route_variable = warp::any()
                .map(move || environment.clone())
                .and(p("api"));

            route_filter!($route_variable; $($filters),+);

            $route_variable.and_then(handlers::$handler)
                .boxed()
        }
    );
}

    route!(make_generate_route => generate, rt; p("certificates"), p("generate"), end(), post(), content_length_limit(MAX_CONTENT_LENGTH), bytes());
    route!(make_calculate_route => calculate, rt; p("rarity"), p("calculate"), end(), post(), content_length_limit(MAX_CONTENT_LENGTH), bytes());
    route!(make_traits_route => traits, rt; p("traits"), end(), g());
    route!(make_retrieve_route => retrieve, rt; p("certificates"), par::<String>(), end(), g());
    route!(make_download_route => download, rt; p("certificates"), par::<String>(), p("download"), par::<String>(), end(), g());
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;
    use warp::http::StatusCode;

    use super::status_code_for;
    use crate::errors::BackendError;
    use crate::record::ArtifactKind;

    #[test]
    fn errors_map_to_statuses() {
        let id = Uuid::new_v4();

        assert_eq!(
            status_code_for(&BackendError::Validation("First name is required".to_owned())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_code_for(&BackendError::InvalidId("nope".to_owned())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_code_for(&BackendError::CertificateNotFound(id)),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_code_for(&BackendError::ArtifactNotFound {
                id,
                kind: ArtifactKind::Poster
            }),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_code_for(&BackendError::CertificateComplete(id)),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_code_for(&BackendError::QueueClosed),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            status_code_for(&BackendError::QueueFull),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            status_code_for(&BackendError::IdAlreadyExists(id)),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
