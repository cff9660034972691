use alloy::primitives::{Address, U256};
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use intent_compact::lock_tag::DEFAULT_ALLOCATOR;
use intent_compact::{LockTag, ResetPeriod, Scope};
use intent_config::{Config, ConfigLoader};
use intent_core::utils::unix_now;
use intent_core::{EmissaryRequest, SubmitMode, DEFAULT_EMISSARY_NONCE};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod factories;

const DEFAULT_LOG_LEVEL: &str = "info";
/// Lifetime of an emissary registration when `--expires-in` is not given.
const DEFAULT_EMISSARY_TTL_SECS: u64 = 30 * 24 * 60 * 60;

#[derive(Parser)]
#[command(name = "intent-cli")]
#[command(about = "Cross-chain intent client", long_about = None)]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
	#[command(subcommand)]
	command: Commands,

	#[arg(short, long, value_name = "FILE", default_value = "config/local.toml")]
	config: PathBuf,

	/// Log level; RUST_LOG takes precedence when set
	#[arg(long, env = "INTENT_LOG_LEVEL")]
	log_level: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
	/// Encode a lock tag
	LockTag {
		#[command(flatten)]
		tag: LockTagArgs,
	},
	#[command(flatten)]
	Configured(ConfigCommand),
}

/// Commands that read the configuration file.
#[derive(Subcommand)]
enum ConfigCommand {
	/// Route, sign, submit and track every intent in the given files
	Run {
		#[arg(required = true)]
		files: Vec<PathBuf>,
		/// Start every intent without waiting for the previous one
		#[arg(long)]
		concurrent: bool,
		/// Pause between two starts, in milliseconds
		#[arg(long)]
		delay_ms: Option<u64>,
	},
	/// Route and sign every intent, then simulate instead of submitting
	Simulate {
		#[arg(required = true)]
		files: Vec<PathBuf>,
	},
	/// Show the status of a submitted bundle
	Status {
		id: String,
		/// Poll until the bundle leaves the in-flight states
		#[arg(long)]
		wait: bool,
	},
	/// Print the signing digest of a routed intent operation
	Digest { file: PathBuf },
	/// Print the emissary registration digest for the configured account
	EmissaryDigest {
		/// Chain the registration covers; repeat for several
		#[arg(long = "chain", value_name = "NAME", required = true)]
		chains: Vec<String>,
		#[command(flatten)]
		tag: LockTagArgs,
		/// Seconds until the registration expires
		#[arg(long, default_value_t = DEFAULT_EMISSARY_TTL_SECS)]
		expires_in: u64,
		#[arg(long, default_value_t = DEFAULT_EMISSARY_NONCE)]
		nonce: u64,
		/// Also sign the digest with the owner key
		#[arg(long)]
		sign: bool,
	},
	/// Print the owner and smart account addresses
	Address,
	/// Validate the configuration file
	Validate,
}

#[derive(Args)]
struct LockTagArgs {
	#[arg(long, default_value_t = DEFAULT_ALLOCATOR)]
	allocator: Address,
	#[arg(long, default_value = "seven-days-and-one-hour")]
	reset_period: ResetPeriod,
	#[arg(long, default_value = "multichain")]
	scope: Scope,
}

impl LockTagArgs {
	fn encode(&self) -> LockTag {
		LockTag::encode(self.allocator, self.reset_period, self.scope)
	}
}

#[tokio::main]
async fn main() -> Result<()> {
	let cli = Cli::parse();

	let command = match cli.command {
		Commands::LockTag { tag } => {
			setup_tracing(cli.log_level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL))?;
			return commands::lock_tag(tag.allocator, tag.reset_period, tag.scope);
		}
		Commands::Configured(command) => command,
	};

	let config = load_config(&cli.config).await?;
	setup_tracing(cli.log_level.as_deref().unwrap_or(&config.client.log_level))?;
	info!("Loaded configuration from {:?}", cli.config);

	match command {
		ConfigCommand::Run {
			files,
			concurrent,
			delay_ms,
		} => {
			commands::run(
				config,
				&files,
				SubmitMode::Submit,
				commands::BatchOverrides {
					concurrent,
					delay_ms,
				},
			)
			.await
		}
		ConfigCommand::Simulate { files } => {
			commands::run(
				config,
				&files,
				SubmitMode::Simulate,
				commands::BatchOverrides::default(),
			)
			.await
		}
		ConfigCommand::Status { id, wait } => commands::status(config, &id, wait).await,
		ConfigCommand::Digest { file } => commands::digest(config, &file).await,
		ConfigCommand::EmissaryDigest {
			chains,
			tag,
			expires_in,
			nonce,
			sign,
		} => {
			let request = EmissaryRequest {
				chains,
				lock_tag: tag.encode(),
				expires: U256::from(unix_now().saturating_add(expires_in)),
				nonce: U256::from(nonce),
			};
			commands::emissary_digest(config, &request, sign).await
		}
		ConfigCommand::Address => commands::address(config).await,
		ConfigCommand::Validate => commands::validate(config).await,
	}
}

async fn load_config(path: &Path) -> Result<Config> {
	ConfigLoader::new()
		.with_file(path)
		.load()
		.await
		.context("Failed to load configuration")
}

fn setup_tracing(log_level: &str) -> Result<()> {
	let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

	tracing_subscriber::registry()
		.with(env_filter)
		.with(tracing_subscriber::fmt::layer())
		.try_init()
		.context("Failed to install tracing subscriber")?;

	Ok(())
}
