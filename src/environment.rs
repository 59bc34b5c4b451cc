use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use log::Logger;

use crate::certificates::Certificates;
use crate::config::{get_parsed_or, get_variable};
use crate::store::Store;
use crate::urls::Urls;
use crate::worker::{RenderPolicy, RenderQueue};

/// Everything a request handler needs.
#[derive(Clone)]
pub struct Environment {
    pub logger: Arc<Logger>,
    pub certificates: Certificates,
    pub urls: Arc<Urls>,
    pub store: Arc<dyn Store>,
    pub queue: RenderQueue,
}

impl Environment {
    pub fn new(
        logger: Arc<Logger>,
        certificates: Certificates,
        urls: Arc<Urls>,
        store: Arc<dyn Store>,
        queue: RenderQueue,
    ) -> Self {
        Self {
            logger,
            certificates,
            urls,
            store,
            queue,
        }
    }
}

/// Settings for the rendering pipeline.
#[derive(Clone, Debug)]
pub struct Config {
    /// Where uploaded faces and rendered artifacts are kept.
    pub output_dir: PathBuf,

    /// The renderer script and the interpreter that runs it.
    pub renderer_script: PathBuf,
    pub renderer_interpreter: Option<PathBuf>,

    pub render_policy: RenderPolicy,

    /// How many records may wait for rendering before new submissions
    /// are turned away.
    pub queue_capacity: usize,
}

impl Config {
    pub const DEFAULT_RENDER_TIMEOUT_SECONDS: u64 = 60;
    pub const DEFAULT_RENDER_ATTEMPTS: u8 = 3;
    pub const DEFAULT_QUEUE_CAPACITY: usize = 64;

    /// Reads the configuration from `RARITY_*` environment variables.
    pub fn from_env() -> Self {
        use crate::config::get_interpreter;

        let timeout = get_parsed_or(
            "RARITY_RENDER_TIMEOUT_SECONDS",
            Self::DEFAULT_RENDER_TIMEOUT_SECONDS,
        );

        Config {
            output_dir: PathBuf::from(get_variable("RARITY_OUTPUT_DIR")),
            renderer_script: PathBuf::from(get_variable("RARITY_RENDERER_SCRIPT")),
            renderer_interpreter: get_interpreter(std::env::var("RARITY_RENDERER_INTERPRETER").ok()),
            render_policy: RenderPolicy {
                timeout: Duration::from_secs(timeout),
                attempts: get_parsed_or("RARITY_RENDER_ATTEMPTS", Self::DEFAULT_RENDER_ATTEMPTS),
            },
            queue_capacity: get_parsed_or("RARITY_QUEUE_CAPACITY", Self::DEFAULT_QUEUE_CAPACITY),
        }
    }
}
