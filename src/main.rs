use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::{debug, info, Level};
use tracing_subscriber::FmtSubscriber;

use ad_credential_audit::{discovery, findings, hashcat, ldap_dump, pipeline, report, secrets_dump};

#[derive(Parser, Debug)]
#[command(
    name = "ad-credential-audit",
    version,
    about = "Offline Active Directory credential and privilege exposure audit"
)]
struct Cli {
    /// Directory dump: a JSON file, a directory of JSON files, or a zip archive
    #[arg(long, value_name = "PATH", required_unless_present = "list_modules")]
    ldap_dump: Option<PathBuf>,

    /// Secrets dump: an .ntds file, a directory, or a zip archive
    #[arg(long, value_name = "PATH")]
    secrets_dump: Option<PathBuf>,

    /// Cracking output file (hash:password lines)
    #[arg(long, value_name = "FILE")]
    cracked: Option<PathBuf>,

    /// Path of the markdown report to write
    #[arg(short, long, default_value = "report.md")]
    output: PathBuf,

    /// Comma-separated list of finding modules to run (default: all)
    #[arg(short, long)]
    modules: Option<String>,

    /// List available finding modules and exit
    #[arg(short, long)]
    list_modules: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.list_modules {
        println!("Available finding modules:");
        for module in findings::registry() {
            println!("  {:<26} {}", module.name(), module.description());
        }
        return Ok(());
    }

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("failed to install log subscriber")?;

    let ldap_input = cli
        .ldap_dump
        .as_ref()
        .context("--ldap-dump is required")?;
    let ldap_files = discovery::resolve_directory_dump(ldap_input)?;
    let directory = ldap_dump::parse_directory_dumps(&ldap_files.files)?;
    info!(
        principals = directory.principals.len(),
        groups = directory.groups.len(),
        skipped = directory.skipped,
        "directory dump parsed"
    );

    let secrets = match &cli.secrets_dump {
        Some(path) => {
            let resolved = discovery::resolve_secrets_dump(path)?;
            secrets_dump::parse_secrets_dumps(&resolved.files)?
        }
        None => {
            info!("no secrets dump provided, credential findings will be limited");
            Vec::new()
        }
    };

    let cracked = match &cli.cracked {
        Some(path) => hashcat::parse_cracked_file(path)?,
        None => {
            info!("no cracking output provided, password findings will be limited");
            Vec::new()
        }
    };

    let graph = pipeline::build_graph(&directory, &secrets, &cracked);

    let modules = match &cli.modules {
        Some(list) => findings::select(list),
        None => findings::registry(),
    };
    anyhow::ensure!(!modules.is_empty(), "no finding modules selected");

    let mut reports = Vec::new();
    for module in &modules {
        debug!(module = module.name(), "running finding module");
        if let Some(result) = module.run(&graph) {
            info!(module = module.name(), affected = result.total, "finding");
            reports.push(result);
        }
    }

    report::write_report(&cli.output, &graph, &reports)?;
    info!(path = %cli.output.display(), findings = reports.len(), "report written");
    Ok(())
}
