//! crab-console - manage dining tables and their QR codes from a terminal

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use crab_console::{
    ClientConfig, ConfirmOutcome, Debouncer, DiningTable, ExportFormat, Exporter, HttpAdminApi,
    PendingAction, ScanUrl, TableRegistry,
};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::Duration;
use tokio::io::AsyncBufReadExt;

#[derive(Parser, Debug)]
#[command(name = "crab-console", about = "Dining table and QR code management")]
struct Cli {
    /// Admin API base URL, including `/admin`
    #[arg(long, env = "CRAB_ADMIN_URL")]
    base_url: Option<String>,

    /// Public origin of the ordering app
    #[arg(long, env = "CRAB_APP_ORIGIN")]
    origin: Option<String>,

    #[arg(long, env = "CRAB_ADMIN_TOKEN", hide_env_values = true)]
    token: Option<String>,

    #[arg(long, env = "CRAB_EXPORT_DIR")]
    export_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List branches
    Branches,
    /// List the tables of a branch
    Tables {
        branch: i64,
        /// Only show tables whose label contains this text
        #[arg(long)]
        search: Option<String>,
    },
    /// Filter a branch's tables interactively, one query per line on stdin
    Search { branch: i64 },
    /// Create a table
    Create { branch: i64, label: String },
    /// Rename a table
    Rename {
        #[arg(long)]
        branch: i64,
        table: i64,
        label: String,
    },
    /// Issue a new QR token; printed codes for the table stop working
    Regenerate {
        #[arg(long)]
        branch: i64,
        table: i64,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Delete a table and its QR token
    Delete {
        #[arg(long)]
        branch: i64,
        table: i64,
        #[arg(long)]
        yes: bool,
    },
    /// Print the scan link for a token
    Url { token: String },
    /// Write a table's QR code to the export directory
    Export {
        #[arg(long)]
        branch: i64,
        table: i64,
        #[arg(long, default_value = "png")]
        format: ExportFormat,
    },
    /// Copy the scan link for a token to the clipboard
    CopyLink { token: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "crab_console=info".into()),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = ClientConfig::from_env();
    if let Some(url) = cli.base_url {
        config.base_url = url;
    }
    if let Some(origin) = cli.origin {
        config.app_origin = origin;
    }
    if let Some(token) = cli.token {
        config = config.with_token(token);
    }
    if let Some(dir) = cli.export_dir {
        config = config.with_export_dir(dir);
    }

    let api = config.build_api().context("failed to build admin client")?;
    let registry = TableRegistry::new(api, ScanUrl::new(config.app_origin.clone()));

    let result = run(&registry, &config, cli.command).await;
    for notice in registry.take_notices() {
        eprintln!("{}", notice);
    }
    result
}

async fn run(
    registry: &TableRegistry<HttpAdminApi>,
    config: &ClientConfig,
    command: Command,
) -> anyhow::Result<()> {
    match command {
        Command::Branches => {
            for branch in registry.list_branches().await? {
                match branch.address {
                    Some(address) => println!("{:>4}  {}  ({})", branch.id, branch.name, address),
                    None => println!("{:>4}  {}", branch.id, branch.name),
                }
            }
        }
        Command::Tables { branch, search } => {
            registry.select_branch(branch).await?;
            let tables = registry.filtered(search.as_deref().unwrap_or(""));
            print_tables(registry, &tables);
        }
        Command::Search { branch } => {
            registry.select_branch(branch).await?;
            search_loop(registry, config.search_debounce_ms).await?;
        }
        Command::Create { branch, label } => {
            let table = registry.create_table(branch, &label).await?;
            print_tables(registry, std::slice::from_ref(&table));
        }
        Command::Rename {
            branch,
            table,
            label,
        } => {
            registry.select_branch(branch).await?;
            let table = registry.rename_table(table, &label).await?;
            print_tables(registry, std::slice::from_ref(&table));
        }
        Command::Regenerate { branch, table, yes } => {
            registry.select_branch(branch).await?;
            let pending = registry.request_regenerate(table)?;
            let outcome = confirm_or_cancel(registry, pending, yes).await?;
            if let ConfirmOutcome::Regenerated(table) = outcome {
                println!("{}", registry.scan_url_for(&table.qr_code_token));
            }
        }
        Command::Delete { branch, table, yes } => {
            registry.select_branch(branch).await?;
            let pending = registry.request_delete(table)?;
            confirm_or_cancel(registry, pending, yes).await?;
        }
        Command::Url { token } => {
            println!("{}", registry.scan_url_for(&token));
        }
        Command::Export {
            branch,
            table,
            format,
        } => {
            registry.list_branches().await?;
            registry.select_branch(branch).await?;
            let exporter = Exporter::new(config.export_dir.clone());
            let path = registry.export_table(&exporter, table, format)?;
            println!("{}", path.display());
        }
        Command::CopyLink { token } => {
            // printed first: on Linux the copy holds the clipboard until replaced
            println!("{}", registry.scan_url_for(&token));
            copy_link(registry, &token)?;
        }
    }
    Ok(())
}

/// Ask on stdin unless `yes`; a declined prompt cancels the action
async fn confirm_or_cancel(
    registry: &TableRegistry<HttpAdminApi>,
    pending: PendingAction,
    yes: bool,
) -> anyhow::Result<ConfirmOutcome> {
    if !yes && !ask(&pending.prompt())? {
        registry.cancel(pending);
        bail!("cancelled");
    }
    Ok(registry.confirm(pending).await?)
}

fn ask(prompt: &str) -> io::Result<bool> {
    let mut stdout = io::stdout();
    write!(stdout, "{} [y/N] ", prompt)?;
    stdout.flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}

async fn search_loop(
    registry: &TableRegistry<HttpAdminApi>,
    debounce_ms: u64,
) -> anyhow::Result<()> {
    let debouncer = Debouncer::new(String::new(), Duration::from_millis(debounce_ms));
    let mut settled = debouncer.subscribe();
    let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();

    print_tables(registry, &registry.tables());
    loop {
        tokio::select! {
            line = lines.next_line() => match line? {
                Some(line) => debouncer.push(line),
                None => break,
            },
            changed = settled.changed() => {
                if changed.is_err() {
                    break;
                }
                let query = settled.borrow_and_update().clone();
                print_tables(registry, &registry.filtered(&query));
            }
        }
    }
    Ok(())
}

#[cfg(feature = "system-clipboard")]
fn copy_link(registry: &TableRegistry<HttpAdminApi>, token: &str) -> anyhow::Result<()> {
    let mut clipboard = crab_console::SystemClipboard::new()?;
    registry.copy_scan_link(token, &mut clipboard)?;
    Ok(())
}

#[cfg(not(feature = "system-clipboard"))]
fn copy_link(registry: &TableRegistry<HttpAdminApi>, token: &str) -> anyhow::Result<()> {
    let mut clipboard = crab_console::MemoryClipboard::new();
    registry.copy_scan_link(token, &mut clipboard)?;
    Ok(())
}

fn print_tables(registry: &TableRegistry<HttpAdminApi>, tables: &[DiningTable]) {
    if tables.is_empty() {
        println!("(no tables)");
        return;
    }
    for table in tables {
        println!(
            "{:>4}  {:<16}  {}",
            table.id,
            table.table_number,
            registry.scan_url_for(&table.qr_code_token)
        );
    }
}
