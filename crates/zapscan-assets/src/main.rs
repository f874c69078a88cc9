//! ZAPScan Assets - manage the engine's site tree
//!
//! Each subcommand is a single request/response exchange with the engine,
//! preceded by a health check.

use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::warn;

use zapscan_common::logging::LogConfig;
use zapscan_common::Config;
use zapscan_core::{ScanPhase, Target};
use zapscan_transport::{EngineClient, HttpTransport, HttpTransportConfig};

/// ZAPScan asset manager
#[derive(Parser, Debug)]
#[command(name = "zapscan-assets")]
#[command(version)]
#[command(about = "Add, remove and list assets in the ZAP sites tree", long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "zapscan.toml")]
    config: String,

    /// Engine API base URL (overrides config)
    #[arg(long)]
    engine: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Command {
    /// List all assets in the sites tree
    List,
    /// Add an asset by accessing it, then start a spider on it
    Add {
        /// Asset URL
        url: String,
    },
    /// Remove an asset from the sites tree
    Remove {
        /// Asset URL
        url: String,
    },
    /// Remove every asset
    Clear,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    zapscan_common::logging::init_logging_with_config(LogConfig::new().level(&args.log_level));

    match run(args).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<ExitCode> {
    let config = if Path::new(&args.config).exists() {
        Config::from_file(&args.config)?
    } else {
        Config::default()
    };
    let mut config = config.merge_env();
    if let Some(engine) = args.engine {
        config.engine.endpoint = engine;
    }

    let transport = HttpTransport::new(HttpTransportConfig {
        base_url: config.engine.endpoint.clone(),
        api_key: config.engine.api_key.clone(),
        request_timeout: Duration::from_secs(config.engine.request_timeout_seconds),
    })
    .context("cannot build engine transport")?;
    let client = EngineClient::new(Arc::new(transport));

    println!("ZAP ASSETS MANAGER");
    println!("{}", "=".repeat(40));

    if client.health_check().await.is_err() {
        println!("Error: ZAP is not running at {}!", client.endpoint());
        println!("Start it with: docker run -d --name zap-api -p 8080:8080 zaproxy/zap-stable zap.sh -daemon -host 0.0.0.0 -port 8080 -config api.disablekey=true");
        return Ok(ExitCode::FAILURE);
    }

    let ok = execute(&client, &args.command).await;
    Ok(if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Run one subcommand, printing the outcome. Returns whether it succeeded.
async fn execute(client: &EngineClient, command: &Command) -> bool {
    match command {
        Command::List => list_assets(client).await,
        Command::Add { url } => add_asset(client, url).await,
        Command::Remove { url } => remove_asset(client, url).await,
        Command::Clear => clear_assets(client).await,
    }
}

async fn list_assets(client: &EngineClient) -> bool {
    println!("Current assets in ZAP:");
    println!("{}", "-".repeat(50));

    match client.sites().await {
        Ok(sites) if !sites.is_empty() => {
            for site in sites {
                println!("• {}", site);
            }
        }
        Ok(_) => println!("No assets found"),
        Err(e) => {
            warn!("Listing sites failed: {}", e);
            println!("No assets found");
        }
    }
    true
}

async fn add_asset(client: &EngineClient, url: &str) -> bool {
    println!("Adding asset: {}", url);

    if let Err(e) = client.access_url(url).await {
        warn!("accessUrl failed: {}", e);
        println!("Failed to add asset: {}", url);
        return false;
    }
    println!("Asset added successfully: {}", url);

    // Crawl the new asset straight away
    match Target::new(url) {
        Ok(target) => match client.start_phase(ScanPhase::Discovery, &target).await {
            Ok(handle) => println!("Spider started on new asset (ID: {})", handle),
            Err(e) => warn!("Spider did not start on {}: {}", url, e),
        },
        Err(e) => warn!("{}", e),
    }
    true
}

async fn remove_asset(client: &EngineClient, url: &str) -> bool {
    println!("Removing asset: {}", url);
    match client.delete_site_node(url).await {
        Ok(_) => {
            println!("Asset removed: {}", url);
            true
        }
        Err(e) => {
            warn!("deleteSiteNode failed: {}", e);
            println!("Failed to remove asset: {}", url);
            false
        }
    }
}

async fn clear_assets(client: &EngineClient) -> bool {
    println!("Clearing all assets...");
    match client.delete_all_site_nodes().await {
        Ok(_) => {
            println!("  All assets cleared");
            true
        }
        Err(e) => {
            warn!("deleteAllSiteNodes failed: {}", e);
            println!("Failed to clear assets");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::sync::Mutex;
    use zapscan_transport::{Endpoint, Transport, TransportError};

    struct FakeEngine {
        ok: Vec<(Endpoint, Value)>,
        calls: Mutex<Vec<Endpoint>>,
    }

    #[async_trait]
    impl Transport for FakeEngine {
        async fn call(
            &self,
            endpoint: Endpoint,
            _params: &[(&str, &str)],
        ) -> Result<Value, TransportError> {
            self.calls.lock().unwrap().push(endpoint);
            self.ok
                .iter()
                .find(|(e, _)| *e == endpoint)
                .map(|(_, v)| v.clone())
                .ok_or(TransportError::MissingField {
                    endpoint,
                    field: "result",
                })
        }

        fn describe(&self) -> String {
            "fake://engine".into()
        }
    }

    fn engine(ok: Vec<(Endpoint, Value)>) -> Arc<FakeEngine> {
        Arc::new(FakeEngine {
            ok,
            calls: Mutex::new(Vec::new()),
        })
    }

    #[test]
    fn test_cli_requires_url_for_add() {
        assert!(Args::try_parse_from(["zapscan-assets", "add"]).is_err());
        assert!(Args::try_parse_from(["zapscan-assets"]).is_err());
        assert!(Args::try_parse_from(["zapscan-assets", "bogus"]).is_err());

        let args = Args::try_parse_from(["zapscan-assets", "remove", "http://a"]).unwrap();
        assert_eq!(
            args.command,
            Command::Remove {
                url: "http://a".into()
            }
        );
    }

    #[tokio::test]
    async fn test_add_starts_spider() {
        let fake = engine(vec![
            (Endpoint::AccessUrl, json!({"result": "OK"})),
            (Endpoint::SpiderScan, json!({"scan": "4"})),
        ]);
        let client = EngineClient::new(fake.clone());

        assert!(execute(&client, &Command::Add { url: "http://localhost:3000".into() }).await);
        assert_eq!(
            *fake.calls.lock().unwrap(),
            vec![Endpoint::AccessUrl, Endpoint::SpiderScan]
        );
    }

    #[tokio::test]
    async fn test_failed_add_skips_spider() {
        let fake = engine(vec![(Endpoint::SpiderScan, json!({"scan": "4"}))]);
        let client = EngineClient::new(fake.clone());

        assert!(!execute(&client, &Command::Add { url: "http://localhost:3000".into() }).await);
        assert_eq!(*fake.calls.lock().unwrap(), vec![Endpoint::AccessUrl]);
    }

    #[tokio::test]
    async fn test_clear_and_remove() {
        let fake = engine(vec![
            (Endpoint::DeleteAllSiteNodes, json!({"Result": "OK"})),
        ]);
        let client = EngineClient::new(fake);

        assert!(execute(&client, &Command::Clear).await);
        assert!(!execute(&client, &Command::Remove { url: "http://a".into() }).await);
    }
}
