use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use surveydash::{config::SurveySchema, pipeline};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

/// Turn a survey CSV export into the dashboard's JSON files.
#[derive(Parser, Debug)]
#[command(name = "surveydash", version, about)]
struct Args {
    /// CSV export to read; a missing file is treated as an empty export.
    #[arg(default_value = "data/raw/submissions.csv")]
    input: PathBuf,

    /// Directory the JSON artifacts are written to.
    #[arg(long, default_value = "data")]
    out_dir: PathBuf,

    /// YAML survey schema; the built-in gender survey is used when omitted.
    #[arg(long)]
    schema: Option<PathBuf>,

    /// Debug logging (ignored when RUST_LOG is set).
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .init();

    let schema = match &args.schema {
        Some(path) => SurveySchema::from_path(path)?,
        None => SurveySchema::gender_survey(),
    };
    info!(
        indicators = schema.indicators.len(),
        breakdowns = schema.breakdowns.len(),
        "schema ready"
    );

    let summary = pipeline::run(&args.input, &args.out_dir, &schema)?;
    for file in &summary.files {
        info!(path = %file.display(), "written");
    }
    Ok(())
}
