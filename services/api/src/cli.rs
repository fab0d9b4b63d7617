use crate::commands::{
    run_alerts, run_list, run_pay, run_seed, run_summary, AlertsArgs, ListArgs, PayArgs,
    SeedArgs, SummaryArgs,
};
use crate::server;
use clap::{Args, Parser, Subcommand};
use fleet_ops::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Fleet Operations",
    about = "Run the fleet back office API or inspect the fleet from the command line",
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
    /// Print document expiry alerts for drivers and vehicles
    Alerts(AlertsArgs),
    /// Print the dashboard counters
    Summary(SummaryArgs),
    /// Filter one collection and optionally export it as CSV
    List(ListArgs),
    /// Mark a challan as paid (requires FLEET_DATA_DIR)
    Pay(PayArgs),
    /// Seed the store with the sample fleet (requires FLEET_DATA_DIR)
    Seed(SeedArgs),
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
        Command::Alerts(args) => run_alerts(args),
        Command::Summary(args) => run_summary(args),
        Command::List(args) => run_list(args),
        Command::Pay(args) => run_pay(args),
        Command::Seed(args) => run_seed(args),
    }
}
