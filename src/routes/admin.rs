use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt};
use log::error;
use warp::http::StatusCode;
use warp::reject;
use warp::reply::{json, with_status, Reply};
use warp::Filter;

use super::response::SuccessResponse;
use crate::environment::Environment;

/// Reports the build and how many certificates are held.
pub fn make_healthz_route(
    environment: Environment,
) -> impl warp::Filter<Extract = (impl Reply,), Error = reject::Rejection> + Clone {
    warp::path("healthz")
        .and(warp::get())
        .and_then(move || healthz(environment.clone()))
}

async fn healthz(environment: Environment) -> Result<impl Reply, std::convert::Infallible> {
    match environment.certificates.count().await {
        Ok(certificates) => {
            let response = SuccessResponse::Healthz {
                revision: info::REVISION,
                timestamp: info::BUILD_TIMESTAMP,
                version: info::VERSION,
                certificates,
            };

            Ok(with_status(json(&response), StatusCode::OK))
        }
        Err(e) => {
            error!(environment.logger, "Health check failed"; "error" => %e);

            Ok(with_status(json(&()), StatusCode::SERVICE_UNAVAILABLE))
        }
    }
}

type TerminationFuture<'a> = BoxFuture<'a, ()>;

type TerminationFunctionWrapper<'a> = Arc<dyn Fn() -> TerminationFuture<'a> + Send + Sync + 'a>;

pub fn make_termination_route<'a>(
    terminate: TerminationFunctionWrapper<'a>,
) -> impl warp::Filter<Extract = (impl Reply,), Error = reject::Rejection> + Clone + 'a {
    let handler = move || -> BoxFuture<Result<StatusCode, std::convert::Infallible>> {
        let terminate = terminate.clone();

        async move {
            let future = terminate();
            future.await;
            Ok(StatusCode::NO_CONTENT)
        }
        .boxed()
    };

    warp::path("terminate").and(warp::post()).and_then(handler)
}
