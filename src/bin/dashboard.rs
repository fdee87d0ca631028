//! Terminal dashboard for the data service.

use anyhow::{Context, Result};
use clap::Parser;
use dashboard_service::client::{ClientError, DashboardClient, Table};
use dashboard_service::config::{self, AppConfig};
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Interactive dashboard for the data service")]
struct Cli {
    /// Config file (defaults to $DASHBOARD_CONFIG or config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Base URL of the data service
    #[arg(long)]
    base_url: Option<String>,

    /// Seconds to keep dashboard data cached (60-600)
    #[arg(long)]
    cache_secs: Option<u64>,
}

const HELP: &str = "\
Commands:
  health              check the service
  item <id>           look up an item
  data                grouped counts (cached)
  rows [n] [derived]  first n rows, 0 for all; 'derived' adds the computed column
  reload              make the service re-read its data file
  refresh             drop the cached dashboard data
  help                show this text
  quit                exit";

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => AppConfig::load_from(path),
        None => AppConfig::load(),
    }
    .context("Failed to load configuration")?;

    if let Some(url) = cli.base_url {
        config.client.base_url = url;
    }
    if let Some(secs) = cli.cache_secs {
        config::validate_cache_window(secs)?;
        config.client.cache_window_secs = secs;
    }

    let client = DashboardClient::from_config(&config.client)?;

    println!("📊 Dashboard connected to {}", client.base_url());
    println!("{}", HELP);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print_prompt();
        let Some(line) = lines.next_line().await? else {
            break;
        };

        let mut parts = line.split_whitespace();
        match parts.next() {
            None => continue,
            Some("quit") | Some("exit") => break,
            Some("help") => println!("{}", HELP),
            Some("health") => match client.fetch_health().await {
                Ok(health) => println!("✅ {} ({}) v{}", health.status, health.service, health.version),
                Err(e) => report(&e),
            },
            Some("item") => match parts.next().map(str::parse::<i64>) {
                Some(Ok(id)) => show_item(&client, id).await,
                _ => println!("usage: item <id>"),
            },
            Some("data") => {
                println!("⏳ Loading dashboard data...");
                let (table, error) = client.fetch_dashboard_data().await;
                if let Some(e) = error {
                    report(&e);
                }
                print!("{}", table.render());
                if let Some(total) = table.total("count") {
                    println!("Total counted: {}", total);
                }
            }
            Some("rows") => {
                let mut limit = None;
                let mut derived = false;
                for arg in parts {
                    match arg {
                        "derived" | "--derived" => derived = true,
                        n => match n.parse::<usize>() {
                            Ok(n) => limit = Some(n),
                            Err(_) => println!("ignoring '{}'", n),
                        },
                    }
                }
                match client.fetch_dashboard_rows(limit, derived).await {
                    Ok(table) => print!("{}", table.render()),
                    Err(e) => {
                        report(&e);
                        print!("{}", Table::empty().render());
                    }
                }
            }
            Some("reload") => match client.reload_dataset().await {
                Ok(r) => println!("🔄 Reloaded {} rows from {}", r.rows, r.path),
                Err(e) => report(&e),
            },
            Some("refresh") => {
                client.invalidate_cache().await;
                println!("Cache cleared");
            }
            Some(other) => println!("unknown command '{}', try 'help'", other),
        }
    }

    Ok(())
}

async fn show_item(client: &DashboardClient, id: i64) {
    println!("⏳ Looking up item #{}...", id);
    match client.fetch_item(id).await {
        Ok(item) => {
            println!("✅ Received item {}", item.id);
            println!("   {}", item.name);
            println!("   ID: {}", item.id);
            println!("   Description: {}", item.description);
            if let Ok(raw) = serde_json::to_string_pretty(&item) {
                println!("{}", raw);
            }
        }
        Err(e) => report(&e),
    }
}

fn report(e: &ClientError) {
    match e {
        ClientError::Status { status, .. } => {
            println!("❌ {}", e);
            println!("   (status code {})", status.as_u16());
        }
        _ => println!("❌ {}", e),
    }
}

fn print_prompt() {
    use std::io::Write;
    print!("> ");
    let _ = std::io::stdout().flush();
}
