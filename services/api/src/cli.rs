use crate::demo::{run_analyze, run_demo, AnalyzeArgs, DemoArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use terra_guard::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "TerraGuard",
    about = "Score environmental and insurance risk for geographic points",
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
    /// Score one location against the live data providers
    Analyze(AnalyzeArgs),
    /// Run an offline scoring demo on bundled sample readings
    Demo(DemoArgs),
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
        Command::Analyze(args) => run_analyze(args).await,
        Command::Demo(args) => run_demo(args).await,
    }
}
