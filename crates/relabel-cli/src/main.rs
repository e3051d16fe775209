mod classify;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use relabel_client::ClassifyClient;
use relabel_core::{Config, Profile, Table};
use tracing_subscriber::EnvFilter;

/// Classify the `message` column of a CSV file against a remote endpoint and
/// write the predicted labels back into the file.
#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Cli {
    /// Input CSV file; must contain a `message` column
    input_csv: PathBuf,

    /// Output CSV file path; defaults to overwriting the input
    #[arg(long)]
    output_csv: Option<PathBuf>,

    /// Endpoint profile to classify with
    #[arg(long, value_enum, default_value = "classification-api")]
    profile: ProfileArg,

    /// Config file path; defaults to `relabel.toml` next to the binary
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ProfileArg {
    ClassificationApi,
    DataScience,
}

impl From<ProfileArg> for Profile {
    fn from(arg: ProfileArg) -> Self {
        match arg {
            ProfileArg::ClassificationApi => Profile::ClassificationApi,
            ProfileArg::DataScience => Profile::DataScience,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();
    let profile: Profile = cli.profile.into();

    // Configuration is resolved first: a bad config aborts before the input
    // file is read, a bad input path before any request goes out.
    let config_path = match cli.config {
        Some(path) => path,
        None => Config::default_path()?,
    };
    let config = Config::load(&config_path)
        .with_context(|| format!("loading config from {}", config_path.display()))?;

    let mut table = Table::read_csv(&cli.input_csv)
        .with_context(|| format!("reading {}", cli.input_csv.display()))?;
    tracing::info!(
        rows = table.row_count(),
        profile = profile.as_str(),
        url = %config.api.url,
        "starting classification"
    );

    let client = ClassifyClient::new(config.api.url.clone());
    let stats = classify::run_classify_pipeline(&mut table, &client, profile).await?;

    let output = cli.output_csv.unwrap_or(cli.input_csv);
    table
        .write_csv(&output)
        .with_context(|| format!("writing {}", output.display()))?;

    tracing::info!(
        labelled = stats.labelled,
        failed = stats.failed,
        elapsed_secs = stats.elapsed_secs,
        "classification finished"
    );
    println!(
        "Classification completed. Updated CSV saved to {}",
        output.display()
    );
    Ok(())
}
