use crate::commands::{
    run_bamboohr, run_compensation, run_provision, run_requisition, BambooHrArgs,
    CompensationArgs, ProvisionArgs, RequisitionArgs,
};
use crate::server;
use clap::{Args, Parser, Subcommand};
use hire_bridge::error::AppError;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "hire-bridge",
    about = "Provision hired TeamTailor candidates into BambooHR and relay HR updates",
    version
)]
struct Cli {
    /// Configuration file to load (defaults to config/config.env)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the webhook server (default command)
    Serve(ServeArgs),
    /// Run the hire provisioning pipeline for saved webhook payloads
    Provision(ProvisionArgs),
    /// Build and post pay-rate notices for a saved BambooHR webhook
    Compensation(CompensationArgs),
    /// Push a Notion hiring request page to TeamTailor as a requisition
    Requisition(RequisitionArgs),
    /// Inspect the BambooHR account without changing it
    #[command(name = "bamboohr")]
    BambooHr(BambooHrArgs),
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
    let config_path = cli.config.as_deref();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(config_path, args).await,
        Command::Provision(args) => run_provision(config_path, args).await,
        Command::Compensation(args) => run_compensation(config_path, args).await,
        Command::Requisition(args) => run_requisition(config_path, args).await,
        Command::BambooHr(args) => run_bamboohr(config_path, args).await,
    }
}
