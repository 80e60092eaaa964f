//! secaudit - compliance audit dashboard CLI
//!
//! Headless front end for the audit workflow: picks standards, drives the
//! remote ingest / audit / remediate stages and renders the results.
//!
//! ## Commands
//!
//! - `standards`: List the selectable compliance standards
//! - `ingest`: Ingest the reference policy knowledge base
//! - `audit`: Run an audit, optionally followed by remediation and download

mod render;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{info, Level};

use secaudit_core::{
    ActionOutcome, DashboardConfig, DashboardController, EndpointConfig, FileExporter,
    StandardCatalog, ALL_STANDARDS,
};

#[derive(Parser)]
#[command(name = "secaudit")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Compliance audit dashboard (secaudit)", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    /// Knowledge ingestion endpoint
    #[arg(long, global = true, env = "SECAUDIT_INGEST_URL")]
    ingest_url: Option<String>,

    /// Audit endpoint
    #[arg(long, global = true, env = "SECAUDIT_AUDIT_URL")]
    audit_url: Option<String>,

    /// Remediation endpoint
    #[arg(long, global = true, env = "SECAUDIT_REMEDIATE_URL")]
    remediate_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the selectable compliance standards
    Standards,

    /// Ingest the reference policy knowledge base
    Ingest {
        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        output: OutputFormat,
    },

    /// Run an audit against the selected standards
    Audit {
        /// Standard to audit against (repeatable)
        #[arg(short, long = "standard", value_name = "ID")]
        standards: Vec<String>,

        /// Audit against every standard in the catalog
        #[arg(long, conflicts_with = "standards")]
        all: bool,

        /// Request a remediation plan after a successful audit
        #[arg(long)]
        remediate: bool,

        /// Write the raw audit report into this directory
        #[arg(long, value_name = "DIR")]
        download: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        output: OutputFormat,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

impl Cli {
    fn config(&self) -> DashboardConfig {
        let mut endpoints = EndpointConfig::default();
        if let Some(url) = &self.ingest_url {
            endpoints.ingest_url = url.clone();
        }
        if let Some(url) = &self.audit_url {
            endpoints.audit_url = url.clone();
        }
        if let Some(url) = &self.remediate_url {
            endpoints.remediate_url = url.clone();
        }
        DashboardConfig::from_env().with_endpoints(endpoints)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    secaudit_core::init_tracing(cli.json, level);

    let config = cli.config();
    let catalog = StandardCatalog::default();

    match cli.command {
        Commands::Standards => {
            render::print_catalog(&catalog);
            Ok(())
        }
        Commands::Ingest { output } => {
            let controller = build_controller(&config, catalog, None)?;
            controller.ingest().await;
            render::print_view(&controller.view(), output)
        }
        Commands::Audit {
            standards,
            all,
            remediate,
            download,
            output,
        } => {
            let controller = build_controller(&config, catalog, download.clone())?;
            select_standards(&controller, &standards, all)?;

            let outcome = controller.audit().await;
            info!(outcome = %outcome, "Audit finished");
            if remediate && outcome == ActionOutcome::Completed {
                controller.remediate().await;
            }
            if download.is_some() {
                controller.request_download();
            }
            render::print_view(&controller.view(), output)
        }
    }
}

fn build_controller(
    config: &DashboardConfig,
    catalog: StandardCatalog,
    download_dir: Option<PathBuf>,
) -> Result<DashboardController> {
    let exporter = FileExporter::new(download_dir.unwrap_or_else(|| PathBuf::from(".")));
    DashboardController::with_http(config, catalog, Arc::new(exporter))
        .context("Failed to set up dashboard")
}

fn select_standards(
    controller: &DashboardController,
    standards: &[String],
    all: bool,
) -> Result<()> {
    if all {
        controller.toggle_standard(ALL_STANDARDS);
        return Ok(());
    }
    for standard in standards {
        if controller.is_selected(standard) {
            continue;
        }
        if !controller.toggle_standard(standard) {
            bail!("Unknown standard {standard:?}; run `secaudit standards` to list them");
        }
    }
    Ok(())
}
