use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use ncload::config::{Variables, VariablesLoader, DEFAULT_VARIABLES_PATH};
use ncload::error::{describe_error_code, EtlError};
use ncload::pipeline::Pipeline;
use ncload::scratch::ScratchSpace;
use ncload::storage::S3ObjectStore;
use ncload::subprocess::TokioProcessRunner;
use ncload::sync::{ListingPolicy, SourceDiffer};
use ncload::warehouse::RedshiftWarehouse;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, error, info, trace};

/// Load new NetCDF files from S3 into Redshift
#[derive(Parser)]
#[command(name = "ncload")]
#[command(about = "Sync, extract, stage and load NetCDF features into Redshift", long_about = None)]
struct Cli {
    /// Enable verbose output (-v for debug, -vv for trace, -vvv for all)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to the configuration file
    #[arg(long, global = true, default_value = DEFAULT_VARIABLES_PATH)]
    variables: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sync new files and load every feature of each one
    Run {
        /// Treat an unlistable bucket as empty instead of failing
        #[arg(long)]
        lenient_listing: bool,

        /// Run report format
        #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
        format: ReportFormat,
    },
    /// Print the source files missing from the raw-data bucket
    Diff {
        /// Treat an unlistable bucket as empty instead of failing
        #[arg(long)]
        lenient_listing: bool,
    },
    /// Check the configuration file
    Validate,
}

#[derive(Clone, Copy, ValueEnum)]
enum ReportFormat {
    Text,
    Json,
}

fn listing_policy(lenient: bool) -> ListingPolicy {
    if lenient {
        ListingPolicy::Lenient
    } else {
        ListingPolicy::Strict
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        2 => "trace",
        _ => "trace,aws_smithy_runtime=debug,hyper=debug,sqlx=debug",
    };

    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .with_writer(std::io::stderr)
        .with_target(cli.verbose >= 2)
        .with_thread_ids(cli.verbose >= 3)
        .with_line_number(cli.verbose >= 3)
        .init();

    debug!("ncload started with verbosity level: {}", cli.verbose);
    trace!("Full CLI args: {:?}", std::env::args().collect::<Vec<_>>());

    let loader = VariablesLoader::new(&cli.variables);
    let result = match cli.command {
        Commands::Run {
            lenient_listing,
            format,
        } => run_pipeline(loader, listing_policy(lenient_listing), format).await,
        Commands::Diff { lenient_listing } => {
            run_diff(loader, listing_policy(lenient_listing)).await
        }
        Commands::Validate => run_validate(loader).await,
    };

    if let Err(e) = result {
        error!("Fatal error: {:#}", e);
        match e.downcast_ref::<EtlError>() {
            Some(etl) => {
                debug!("E{:04}: {}", etl.code(), describe_error_code(etl.code()));
                eprintln!("Error: {}", etl.user_message());
            }
            None => eprintln!("Error: {e:#}"),
        }
        std::process::exit(1);
    }
}

async fn load_variables(loader: &VariablesLoader) -> Result<Variables, EtlError> {
    Ok(loader.load_validated().await?)
}

async fn run_pipeline(
    loader: VariablesLoader,
    policy: ListingPolicy,
    format: ReportFormat,
) -> anyhow::Result<()> {
    let variables = load_variables(&loader).await?;
    let store = S3ObjectStore::new(&variables.etl)
        .await
        .map_err(EtlError::from)?;
    let scratch = ScratchSpace::create().context("Failed to create scratch space")?;

    let pipeline = Pipeline::new(
        loader,
        Arc::new(store),
        Arc::new(TokioProcessRunner),
        Arc::new(RedshiftWarehouse::new()),
        scratch,
    )
    .with_listing_policy(policy);

    let report = pipeline.run().await?;
    match format {
        ReportFormat::Text => print!("{report}"),
        ReportFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }

    if !report.is_success() {
        anyhow::bail!("{} unit(s) failed", report.failed());
    }
    Ok(())
}

async fn run_diff(loader: VariablesLoader, policy: ListingPolicy) -> anyhow::Result<()> {
    let variables = load_variables(&loader).await?;
    let store = S3ObjectStore::new(&variables.etl)
        .await
        .map_err(EtlError::from)?;
    let differ = SourceDiffer::new(Arc::new(store), loader).with_policy(policy);

    let (source, destination) = differ
        .resolve_bucket_links()
        .await
        .map_err(EtlError::from)?;
    let missing = differ
        .compute_missing(&source, &destination)
        .await
        .map_err(EtlError::from)?;
    for key in &missing {
        println!("{key}");
    }
    info!("{} file(s) to sync", missing.len());
    Ok(())
}

async fn run_validate(loader: VariablesLoader) -> anyhow::Result<()> {
    let variables = load_variables(&loader).await?;
    println!(
        "{} is valid: {} feature(s) -> {}",
        loader.path().display(),
        variables.features().len(),
        variables.etl.jdbc.schema
    );
    Ok(())
}
