//! `datasync-xaccount`: provision the IAM, bucket policy and DataSync location
//! setup for a one-time cross-account S3 transfer.

mod output;

use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use datasync_xaccount_provisioning::config::{
    DEFAULT_DATASYNC_REGION, ENV_ADMIN_ROLE_ARN, ENV_DESTINATION_ROLE_ARN, ENV_SOURCE_ACCOUNT,
    ENV_TARGET_BUCKET,
};
use datasync_xaccount_provisioning::{
    render_plan, DataSyncProvisioner, ProvisionConfig, ProvisionError, ProvisionState,
    RetryPolicy, StorageClass,
};

/// Exit status for invalid configuration or a refused confirmation
const EXIT_USAGE: u8 = 2;

#[derive(Parser, Debug)]
#[command(
    name = "datasync-xaccount",
    version,
    about = "Provision IAM roles, the destination bucket policy and a DataSync S3 location for a cross-account transfer"
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug); RUST_LOG takes precedence
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the policy documents and location request without calling AWS
    Plan {
        #[command(flatten)]
        config: ConfigArgs,
    },
    /// Run the provisioning stages against AWS
    Apply {
        #[command(flatten)]
        config: ConfigArgs,

        /// Apply without asking for confirmation
        #[arg(long, short = 'y')]
        yes: bool,

        /// Load progress from this file if it exists and save it after every stage
        #[arg(long)]
        state_file: Option<PathBuf>,

        /// Skip the check that the caller runs in the configured source account
        #[arg(long)]
        skip_account_check: bool,
    },
    /// Show completed and pending stages of a saved state file
    Status {
        #[arg(long)]
        state_file: PathBuf,
    },
}

#[derive(Args, Debug)]
struct ConfigArgs {
    /// Destination S3 bucket name
    #[arg(long, env = ENV_TARGET_BUCKET)]
    target_bucket: Option<String>,

    /// 12-digit account ID of the source account
    #[arg(long, env = ENV_SOURCE_ACCOUNT)]
    source_account: Option<String>,

    /// Pre-provisioned role in the destination account allowed to write the bucket policy
    #[arg(long, env = ENV_DESTINATION_ROLE_ARN)]
    destination_role_arn: Option<String>,

    /// Principal granted list-only access on the destination bucket
    #[arg(long, env = ENV_ADMIN_ROLE_ARN)]
    datasync_admin_role_arn: Option<String>,

    /// Region for IAM, STS and S3 (defaults to the AWS provider chain)
    #[arg(long, env = "AWS_REGION")]
    region: Option<String>,

    /// Region of the destination bucket when it differs from --region
    #[arg(long, env = "TARGET_S3_REGION")]
    bucket_region: Option<String>,

    /// Region in which the DataSync location is created
    #[arg(long, env = "DATASYNC_REGION", default_value = DEFAULT_DATASYNC_REGION)]
    datasync_region: String,

    /// S3 storage class DataSync writes objects with
    #[arg(long, env = "DATASYNC_S3_STORAGE_CLASS", default_value = "STANDARD")]
    storage_class: String,

    /// Attempts at assuming the destination role and writing the bucket policy
    #[arg(long, default_value_t = 6)]
    max_assume_attempts: u32,

    /// Delay before the first retry; doubles on every further retry
    #[arg(long, default_value_t = 2)]
    initial_backoff_secs: u64,
}

impl ConfigArgs {
    fn into_config(self) -> Result<ProvisionConfig, ProvisionError> {
        let storage_class: StorageClass = self.storage_class.parse()?;
        let retry = RetryPolicy {
            max_attempts: self.max_assume_attempts,
            initial_delay: Duration::from_secs(self.initial_backoff_secs),
            ..RetryPolicy::default()
        };

        ProvisionConfig::builder()
            .set_target_bucket(self.target_bucket)
            .set_source_account(self.source_account)
            .set_destination_role_arn(self.destination_role_arn)
            .set_admin_principal_arn(self.datasync_admin_role_arn)
            .region(self.region)
            .bucket_region(self.bucket_region)
            .datasync_region(self.datasync_region)
            .storage_class(storage_class)
            .retry(retry)
            .build()
    }
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli.command).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            let is_config_error = e
                .downcast_ref::<ProvisionError>()
                .is_some_and(ProvisionError::is_configuration_error);
            if is_config_error {
                ExitCode::from(EXIT_USAGE)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}

async fn run(command: Commands) -> Result<ExitCode> {
    match command {
        Commands::Plan { config } => {
            let config = config.into_config()?;
            let plan = render_plan(&config);
            println!(
                "{}",
                serde_json::to_string_pretty(&plan).context("Failed to serialize plan")?
            );
            Ok(ExitCode::SUCCESS)
        }
        Commands::Apply {
            config,
            yes,
            state_file,
            skip_account_check,
        } => {
            let config = config.into_config()?;
            apply(config, yes, state_file, skip_account_check).await
        }
        Commands::Status { state_file } => {
            let state = ProvisionState::load(&state_file)?;
            for line in output::status_lines(&state) {
                eprintln!("{line}");
            }
            println!(
                "{}",
                serde_json::to_string_pretty(&state).context("Failed to serialize state")?
            );
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn apply(
    config: ProvisionConfig,
    yes: bool,
    state_file: Option<PathBuf>,
    skip_account_check: bool,
) -> Result<ExitCode> {
    let mut state = match &state_file {
        Some(path) => ProvisionState::load_or_new(path, &config)?,
        None => ProvisionState::new(&config),
    };

    if state.is_finished() {
        eprintln!("All stages already completed; nothing to do.");
        for line in output::status_lines(&state) {
            eprintln!("{line}");
        }
        return Ok(ExitCode::SUCCESS);
    }

    eprintln!(
        "About to provision DataSync access to bucket '{}' from account {}:",
        config.target_bucket, config.source_account
    );
    for line in output::status_lines(&state).iter().skip(1) {
        eprintln!("{line}");
    }

    if !yes && !confirm()? {
        return Ok(ExitCode::from(EXIT_USAGE));
    }

    let service = DataSyncProvisioner::new(config).await;

    if skip_account_check {
        log::warn!("Skipping source account check");
    } else {
        service
            .verify_source_account()
            .await
            .context("Source account check failed")?;
    }

    let result = service
        .run_with(&mut state, |stage, state| {
            eprintln!("{}", output::stage_progress(stage, state));
            if let Some(path) = &state_file {
                state.save(path)?;
            }
            Ok(())
        })
        .await;

    if let Err(e) = result {
        if let Some(path) = &state_file {
            eprintln!(
                "Progress saved to {}; rerun with the same --state-file to resume.",
                path.display()
            );
        }
        return Err(e.into());
    }

    println!(
        "{}",
        serde_json::to_string_pretty(&state).context("Failed to serialize final state")?
    );
    Ok(ExitCode::SUCCESS)
}

/// Ask on the terminal; refuse outright when stdin is not a TTY
fn confirm() -> Result<bool> {
    if !atty::is(atty::Stream::Stdin) {
        eprintln!(
            "Refusing to apply without confirmation: pass --yes or run interactively in a TTY."
        );
        return Ok(false);
    }

    eprint!("Proceed? [y/N] ");
    std::io::stderr().flush().context("Failed to flush prompt")?;

    let mut answer = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut answer)
        .context("Failed to read confirmation")?;

    let confirmed = matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes");
    if !confirmed {
        eprintln!("Aborted.");
    }
    Ok(confirmed)
}
