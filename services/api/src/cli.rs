use crate::report::{run_forecast, run_report, ForecastArgs, ReportArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use lifepulse::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "LifePulse",
    about = "Serve and explore wellness and finance analytics from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Summarize a CSV export of records over a look-back window
    Report(ReportArgs),
    /// Project when a savings goal will be reached
    Forecast(ForecastArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Report(args) => run_report(args),
        Command::Forecast(args) => run_forecast(args),
    }
}
