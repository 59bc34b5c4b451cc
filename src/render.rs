//! Rendering of certificate and poster images.
//!
//! Rendering itself happens outside this crate. A [`Renderer`] takes a
//! [`RenderJob`] describing a finished record and reports where the two
//! images ended up.

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::record::CertificateRecord;
use crate::traits::Traits;

/// Everything a renderer needs to draw a record.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderJob {
    pub id: Uuid,

    pub first_name: String,

    pub last_name: String,

    #[serde(flatten)]
    pub traits: Traits,

    pub rarity_percentage: f64,

    pub rarity_ratio: String,

    /// Where the images should be written.
    pub output_dir: PathBuf,
}

impl RenderJob {
    pub fn new(record: &CertificateRecord, output_dir: &Path) -> Self {
        RenderJob {
            id: *record.id(),
            first_name: record.first_name().to_owned(),
            last_name: record.last_name().to_owned(),
            traits: record.traits().clone(),
            rarity_percentage: record.rarity().percentage,
            rarity_ratio: record.rarity().ratio.clone(),
            output_dir: output_dir.to_owned(),
        }
    }
}

/// The stored locations of a rendered record’s images, relative to the
/// output directory or absolute within it.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Artifacts {
    pub certificate_path: String,
    pub poster_path: String,
}

/// Enumerates the ways rendering can fail.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("could not encode render job")]
    Encoding(#[source] serde_json::Error),

    #[error("could not run renderer: {0}")]
    Spawn(#[source] io::Error),

    #[error("renderer exited with status {code:?}: {stderr}")]
    Failed { code: Option<i32>, stderr: String },

    #[error("could not parse renderer output: {0}")]
    MalformedOutput(#[source] serde_json::Error),

    #[error("renderer timed out after {0:?}")]
    TimedOut(Duration),
}

pub trait Renderer: Send + Sync {
    fn render(&self, job: RenderJob) -> BoxFuture<Result<Artifacts, RenderError>>;
}

/// Renders by running an external script, passing the job as a single
/// JSON argument and reading an [`Artifacts`] object from its standard
/// output.
pub struct ScriptRenderer {
    interpreter: PathBuf,
    script: PathBuf,
}

impl ScriptRenderer {
    pub fn new(interpreter: impl Into<PathBuf>, script: impl Into<PathBuf>) -> Self {
        ScriptRenderer {
            interpreter: interpreter.into(),
            script: script.into(),
        }
    }
}

impl Renderer for ScriptRenderer {
    fn render(&self, job: RenderJob) -> BoxFuture<Result<Artifacts, RenderError>> {
        run_script(self, job).boxed()
    }
}

async fn run_script(renderer: &ScriptRenderer, job: RenderJob) -> Result<Artifacts, RenderError> {
    use tokio::process::Command;

    let argument = serde_json::to_string(&job).map_err(RenderError::Encoding)?;

    tokio::fs::create_dir_all(&job.output_dir)
        .await
        .map_err(RenderError::Spawn)?;

    // killed if the timeout around this future fires
    let output = Command::new(&renderer.interpreter)
        .arg(&renderer.script)
        .arg(argument)
        .kill_on_drop(true)
        .output()
        .await
        .map_err(RenderError::Spawn)?;

    if !output.status.success() {
        return Err(RenderError::Failed {
            code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
        });
    }

    serde_json::from_slice(&output.stdout).map_err(RenderError::MalformedOutput)
}

#[cfg(all(test, unix))]
mod tests {
    use std::fs;
    use std::path::Path;

    use super::{RenderError, RenderJob, Renderer, ScriptRenderer};
    use crate::record::tests::record;

    fn renderer_for(directory: &Path, script: &str) -> ScriptRenderer {
        let path = directory.join("render.sh");
        fs::write(&path, script).expect("write script");

        ScriptRenderer::new("sh", path)
    }

    #[tokio::test]
    async fn script_output_is_parsed() {
        let directory = tempfile::tempdir().expect("create temporary directory");
        let renderer = renderer_for(
            directory.path(),
            r#"echo '{"certificatePath": "certificate.png", "posterPath": "poster.png"}'"#,
        );

        let job = RenderJob::new(&record(), &directory.path().join("generated"));
        let artifacts = renderer.render(job).await.expect("render");

        assert_eq!(artifacts.certificate_path, "certificate.png");
        assert_eq!(artifacts.poster_path, "poster.png");
        assert!(directory.path().join("generated").is_dir());
    }

    #[tokio::test]
    async fn job_is_passed_as_json() {
        let directory = tempfile::tempdir().expect("create temporary directory");
        let renderer = renderer_for(
            directory.path(),
            r#"printf '%s' "$1" > "$(dirname "$0")/job.json"
echo '{"certificatePath": "c.png", "posterPath": "p.png"}'"#,
        );

        let record = record();
        let job = RenderJob::new(&record, directory.path());
        renderer.render(job).await.expect("render");

        let written: serde_json::Value =
            serde_json::from_slice(&fs::read(directory.path().join("job.json")).unwrap())
                .expect("parse job");

        assert_eq!(written["id"], record.id().to_string());
        assert_eq!(written["firstName"], "Ada");
        assert_eq!(written["hairColor"], "blonde");
        assert_eq!(written["rarityRatio"], "1 in 27,778");
        assert!(written["outputDir"].is_string());
    }

    #[tokio::test]
    async fn failures_carry_stderr() {
        let directory = tempfile::tempdir().expect("create temporary directory");
        let renderer = renderer_for(directory.path(), "echo 'no fonts' >&2\nexit 3");

        let error = renderer
            .render(RenderJob::new(&record(), directory.path()))
            .await
            .unwrap_err();

        match error {
            RenderError::Failed { code, stderr } => {
                assert_eq!(code, Some(3));
                assert_eq!(stderr, "no fonts");
            }
            e => panic!("unexpected error: {:?}", e),
        }
    }

    #[tokio::test]
    async fn garbage_output_is_rejected() {
        let directory = tempfile::tempdir().expect("create temporary directory");
        let renderer = renderer_for(directory.path(), "echo done");

        let error = renderer
            .render(RenderJob::new(&record(), directory.path()))
            .await
            .unwrap_err();

        assert!(matches!(error, RenderError::MalformedOutput(_)));
    }

    #[tokio::test]
    async fn missing_interpreters_fail_to_spawn() {
        let directory = tempfile::tempdir().expect("create temporary directory");
        let renderer = ScriptRenderer::new(directory.path().join("no-such-shell"), "render.sh");

        let error = renderer
            .render(RenderJob::new(&record(), directory.path()))
            .await
            .unwrap_err();

        assert!(matches!(error, RenderError::Spawn(_)));
    }
}
