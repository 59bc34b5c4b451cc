use serde::Serialize;
use warp::reject;

use crate::errors::BackendError;

#[derive(Debug)]
pub struct Rejection {
    pub(crate) context: Context,
    pub(crate) error: BackendError,
}

impl Rejection {
    pub fn new(context: Context, error: BackendError) -> Self {
        Rejection { context, error }
    }

    pub fn flatten(&self) -> FlattenedRejection {
        FlattenedRejection {
            context: self.context.clone(),
            message: format!("{}", self.error),
        }
    }
}

impl reject::Reject for Rejection {}

#[derive(Debug, Serialize)]
pub struct FlattenedRejection {
    #[serde(flatten)]
    pub(crate) context: Context,
    pub(crate) message: String,
}

#[derive(Clone, Debug, Serialize)]
#[serde(untagged)]
pub enum Context {
    Download { id: String, kind: String },
    Generate { id: Option<String> },
    Retrieve { id: String },
    Calculate,
}

impl Context {
    pub fn calculate() -> Context {
        Context::Calculate
    }

    pub fn download(id: String, kind: String) -> Context {
        Context::Download { id, kind }
    }

    pub fn generate(id: Option<String>) -> Context {
        Context::Generate { id }
    }

    pub fn retrieve(id: String) -> Context {
        Context::Retrieve { id }
    }
}
