//! Command-line arguments and the run configuration derived from them.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use lutstudio_core::{ColorAdjustments, EngineConfig};
use lutstudio_style::RetryPolicy;

/// Match a target photo to a reference photo's look and export the grade.
#[derive(Parser, Debug)]
#[command(name = "lutstudio")]
#[command(version)]
#[command(about = "Match a target photo to a reference look and export it as a 3D LUT")]
pub struct Args {
    /// Reference image whose color character is copied
    pub reference: PathBuf,

    /// Target image to grade
    pub target: PathBuf,

    /// Graded target output path
    #[arg(short, long, default_value = "graded.png")]
    pub output: PathBuf,

    /// Graded 512x512 Hald CLUT output path
    #[arg(long, default_value = "lut_hald.png")]
    pub hald: PathBuf,

    /// Also write the LUT as a 64-point .cube file
    #[arg(long)]
    pub cube: Option<PathBuf>,

    /// Title written into the .cube header
    #[arg(long, default_value = "LutStudio Grade")]
    pub title: String,

    /// JSON file with adjustments applied on top of the transfer
    #[arg(short, long)]
    pub adjustments: Option<PathBuf>,

    /// Worker threads (default: LUTSTUDIO_THREADS or auto-detect)
    #[arg(short = 't', long)]
    pub threads: Option<usize>,

    /// Request an AI style profile of the reference (needs GEMINI_API_KEY)
    #[arg(long)]
    pub analyze: bool,

    /// Attempts made against the style service
    #[arg(long, default_value_t = RetryPolicy::default().max_attempts)]
    pub retries: u32,

    /// Seconds to wait for each style service attempt
    #[arg(long, default_value_t = RetryPolicy::default().attempt_timeout().as_secs())]
    pub style_timeout: u64,
}

/// Everything a run needs, resolved from arguments and the environment.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub engine: EngineConfig,
    pub adjustments: ColorAdjustments,
    pub retry: RetryPolicy,
}

impl RunConfig {
    pub fn from_args(args: &Args) -> anyhow::Result<Self> {
        let mut engine = EngineConfig::default();
        if let Some(threads) = args.threads {
            engine.worker_threads = threads;
        }

        let adjustments = match &args.adjustments {
            Some(path) => {
                let json = std::fs::read_to_string(path)
                    .with_context(|| format!("reading adjustments from {}", path.display()))?;
                ColorAdjustments::from_json(&json)
                    .with_context(|| format!("parsing adjustments in {}", path.display()))?
            }
            None => ColorAdjustments::default(),
        };

        Ok(Self {
            engine,
            adjustments,
            retry: RetryPolicy {
                max_attempts: args.retries,
                attempt_timeout_ms: args.style_timeout.saturating_mul(1000),
                ..RetryPolicy::default()
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_defaults() {
        let args = Args::parse_from(["lutstudio", "ref.jpg", "target.jpg"]);
        assert_eq!(args.output, PathBuf::from("graded.png"));
        assert_eq!(args.hald, PathBuf::from("lut_hald.png"));
        assert_eq!(args.retries, 3);
        assert_eq!(args.style_timeout, 60);
        assert!(args.cube.is_none());
        assert!(!args.analyze);
    }

    #[test]
    fn test_threads_override_engine_config() {
        let args = Args::parse_from([
            "lutstudio",
            "a.png",
            "b.png",
            "-t",
            "3",
            "--retries",
            "5",
            "--style-timeout",
            "10",
        ]);
        let config = RunConfig::from_args(&args).unwrap();
        assert_eq!(config.engine.worker_threads, 3);
        assert_eq!(config.retry.max_attempts, 5);
        assert_eq!(config.retry.attempt_timeout_ms, 10_000);
        assert_eq!(config.adjustments, ColorAdjustments::default());
    }

    #[test]
    fn test_missing_adjustments_file_is_reported() {
        let args = Args::parse_from([
            "lutstudio",
            "a.png",
            "b.png",
            "--adjustments",
            "/nonexistent/adjust.json",
        ]);
        let err = RunConfig::from_args(&args).unwrap_err();
        assert!(err.to_string().contains("adjust.json"));
    }
}
