use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;

#[derive(Parser)]
#[command(name = "timetable", version, about = "Weekly class timetable solver")]
struct Cli {
    /// Log line format on stderr
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Json)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum LogFormat {
    Json,
    Pretty,
}

#[derive(Subcommand)]
enum Commands {
    /// Pre-check a roster and print model statistics
    Check(commands::check::CheckArgs),
    /// Solve a roster and print the timetable
    Solve(commands::solve::SolveArgs),
    /// Validate and score an existing timetable
    Verify(commands::verify::VerifyArgs),
    /// Print the JSON schema of the roster or report format
    Schema(commands::schema::SchemaArgs),
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init(),
        LogFormat::Pretty => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init(),
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_format);

    match cli.command {
        Commands::Check(args) => commands::check::run(args),
        Commands::Solve(args) => commands::solve::run(args),
        Commands::Verify(args) => commands::verify::run(args),
        Commands::Schema(args) => commands::schema::run(args),
    }
}
