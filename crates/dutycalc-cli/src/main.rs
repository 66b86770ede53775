mod commands;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use rust_decimal::Decimal;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "dutycalc",
    version,
    about = "U.S. import duty and fee estimator for HTS-classified goods"
)]
struct Cli {
    /// Tariff dataset (JSON)
    #[arg(long, global = true, env = "DUTYCALC_DATASET", value_name = "FILE")]
    dataset: Option<PathBuf>,

    /// Custom rate policy file (default: built-in policy)
    #[arg(long, global = true, env = "DUTYCALC_POLICY", value_name = "FILE")]
    policy: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Estimate duty and fees for one shipment line
    Calc {
        /// Classification code, any format (e.g. 8501.10.40)
        code: String,

        /// Declared customs value in USD
        #[arg(short, long)]
        value: Decimal,

        /// Two-letter country of origin (e.g. CN)
        #[arg(short, long)]
        country: String,

        /// Layer Section 301 on top of an active reciprocal tariff
        #[arg(long)]
        prefer_reciprocal: bool,

        /// Leave reciprocal and IEEPA tariffs out
        #[arg(long)]
        exclude_reciprocal: bool,

        #[arg(short, long, value_enum, default_value = "table")]
        output: OutputFormat,
    },
    /// Compare totals across the reciprocal-tariff toggles
    Compare {
        code: String,

        #[arg(short, long)]
        value: Decimal,

        #[arg(short, long)]
        country: String,

        #[arg(short, long, value_enum, default_value = "table")]
        output: OutputFormat,
    },
    /// Show the tariff record for a code
    Lookup {
        code: String,

        #[arg(short, long, value_enum, default_value = "table")]
        output: OutputFormat,
    },
    /// Inspect and validate rate policies
    Policy {
        #[command(subcommand)]
        action: PolicyAction,
    },
}

#[derive(Subcommand)]
enum PolicyAction {
    /// List built-in policies
    List,
    /// Print the active policy as JSON
    Show,
    /// Print the policy JSON schema with field descriptions
    Schema,
    /// Validate a custom policy file
    Validate {
        /// Path to JSON policy file
        file: PathBuf,
    },
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_tracing();
    let cli = Cli::parse();
    let ctx = commands::Context {
        dataset: cli.dataset,
        policy: cli.policy,
    };

    let result = match cli.command {
        Commands::Calc {
            code,
            value,
            country,
            prefer_reciprocal,
            exclude_reciprocal,
            output,
        } => commands::calc::run(
            &ctx,
            code,
            value,
            country,
            prefer_reciprocal,
            exclude_reciprocal,
            output,
        ),
        Commands::Compare {
            code,
            value,
            country,
            output,
        } => commands::compare::run(&ctx, code, value, country, output),
        Commands::Lookup { code, output } => commands::lookup::run(&ctx, &code, output),
        Commands::Policy { action } => match action {
            PolicyAction::List => commands::policy::list(),
            PolicyAction::Show => commands::policy::show(&ctx),
            PolicyAction::Schema => commands::policy::schema(),
            PolicyAction::Validate { file } => commands::policy::validate(&file),
        },
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
