//! LutStudio: grade a target photo to match a reference photo and export
//! the grade as a Hald CLUT and optionally a `.cube` LUT.
//!
//! The style profile request (if enabled) runs on a tokio task next to the
//! pixel pipeline. Its failure is logged and never affects the outputs.

mod config;
mod image_loader;

use anyhow::Context;
use clap::Parser;
use lutstudio_core::{GradingSession, Regrader};
use lutstudio_style::{StyleError, StyleProfile};
use tokio::runtime::Runtime;
use tokio::task::JoinHandle;
use tracing_subscriber::EnvFilter;

use crate::config::{Args, RunConfig};
use crate::image_loader::{load_image, save_image};

type StyleTask = JoinHandle<Result<StyleProfile, StyleError>>;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let args = Args::parse();
    let config = RunConfig::from_args(&args)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .enable_all()
        .build()
        .context("starting async runtime")?;
    let style_task = if args.analyze {
        spawn_style(&runtime, &args, &config)
    } else {
        None
    };

    let reference = load_image(&args.reference)
        .with_context(|| format!("loading reference {}", args.reference.display()))?;
    let target = load_image(&args.target)
        .with_context(|| format!("loading target {}", args.target.display()))?;

    let session = GradingSession::with_config(&reference, &target, config.engine.clone())?;
    let mut regrader = Regrader::new(session);
    regrader.submit(config.adjustments.clone());
    let grade = regrader
        .wait_latest()
        .context("grading finished without a result")?;

    let lut = args.cube.as_ref().map(|_| grade.lut()).transpose()?;
    save_image(&args.output, grade.preview)
        .with_context(|| format!("writing {}", args.output.display()))?;
    save_image(&args.hald, grade.hald)
        .with_context(|| format!("writing {}", args.hald.display()))?;
    if let (Some(path), Some(lut)) = (&args.cube, lut) {
        lut.save_cube(path, &args.title)
            .with_context(|| format!("writing {}", path.display()))?;
    }

    if let Some(task) = style_task {
        report_style(runtime.block_on(task));
    }
    Ok(())
}

#[cfg(feature = "gemini")]
fn spawn_style(runtime: &Runtime, args: &Args, config: &RunConfig) -> Option<StyleTask> {
    use std::sync::Arc;

    use lutstudio_style::{GeminiBackend, StyleAnalyzer, spawn_analysis};

    let request = match image_loader::load_style_request(&args.reference) {
        Ok(request) => request,
        Err(e) => {
            tracing::warn!(error = %e, "cannot read reference for style analysis");
            return None;
        }
    };
    let backend = match GeminiBackend::from_env() {
        Ok(backend) => backend,
        Err(e) => {
            tracing::warn!(error = %e, "style analysis disabled");
            return None;
        }
    };
    let analyzer = Arc::new(StyleAnalyzer::with_policy(backend, config.retry));
    let _guard = runtime.enter();
    Some(spawn_analysis(analyzer, request))
}

#[cfg(not(feature = "gemini"))]
fn spawn_style(_runtime: &Runtime, _args: &Args, _config: &RunConfig) -> Option<StyleTask> {
    tracing::warn!("built without the `gemini` feature; skipping style analysis");
    None
}

fn report_style(result: Result<Result<StyleProfile, StyleError>, tokio::task::JoinError>) {
    match result {
        Ok(Ok(profile)) => match serde_json::to_string_pretty(&profile) {
            Ok(json) => println!("{json}"),
            Err(e) => tracing::warn!(error = %e, "cannot print style profile"),
        },
        Ok(Err(e)) => tracing::warn!(error = %e, "style analysis unavailable"),
        Err(e) => tracing::warn!(error = %e, "style analysis task failed"),
    }
}
