//! TrustGate CLI - Command-line interface for the zero-trust gateway

use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::debug;

use trustgate_core::{
    AccessContext, DecisionEvent, DeviceSignals, FixedClock, GateConfig, MemoryBehaviorStore,
    Principal, TrustGate,
};

#[derive(Parser)]
#[command(name = "trustgate")]
#[command(about = "TrustGate - Adaptive Trust Scoring for Zero-Trust Gateways")]
struct Cli {
    /// Configuration file path (JSON, missing fields fall back to defaults)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Path to the behavior database, overrides the config file
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Evaluate one access attempt and print the decision
    Decide {
        /// Principal identifier
        principal: String,
        /// Resource path being requested
        resource: String,
        /// Source address of the request
        #[arg(short, long)]
        ip: IpAddr,
        /// Role claim, repeatable
        #[arg(long = "role")]
        roles: Vec<String>,
        /// User-Agent header of the client
        #[arg(long)]
        user_agent: Option<String>,
        /// Accept-Language header of the client
        #[arg(long)]
        accept_language: Option<String>,
        /// Client platform string
        #[arg(long)]
        platform: Option<String>,
        /// Client timezone name
        #[arg(long)]
        timezone: Option<String>,
        /// Force the sensitive classification regardless of path
        #[arg(long)]
        sensitive: bool,
        /// Print the full decision event as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the stored behavioral profile for a principal
    Profile {
        /// Principal identifier
        principal: String,
        /// Print the profile as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the most recent decision events, newest first
    Recent {
        /// Maximum number of events to print
        #[arg(short, long, default_value_t = 20)]
        limit: usize,
    },
    /// Check configuration validity and print the resolved settings
    Check,
    /// Replay a canned abuse sequence and watch trust decay
    Simulate {
        /// Principal identifier used for the replayed traffic
        #[arg(long, default_value = "attacker")]
        principal: String,
        /// Number of requests in the flood phase
        #[arg(short, long, default_value_t = 35)]
        requests: usize,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt::init();

    let config = load_config(cli.config.as_deref(), cli.db.as_deref())?;

    match cli.command {
        Some(Commands::Decide {
            principal,
            resource,
            ip,
            roles,
            user_agent,
            accept_language,
            platform,
            timezone,
            sensitive,
            json,
        }) => {
            let gate = open_gate(config)?;

            let mut subject = Principal::new(principal);
            subject.roles = roles;

            let device = DeviceSignals {
                user_agent: user_agent.unwrap_or_default(),
                accept_language: accept_language.unwrap_or_default(),
                platform: platform.unwrap_or_default(),
                timezone: timezone.unwrap_or_default(),
            };
            let mut context = AccessContext::new(ip, resource).with_device(device);
            if sensitive {
                context = context.with_sensitive(true);
            }

            let event = gate.evaluate(&subject, &context).await;
            print_event(&event, json)?;
        }
        Some(Commands::Profile { principal, json }) => {
            let gate = open_gate(config)?;
            let profile = gate.profile(&principal).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&profile)?);
            } else {
                println!("principal : {}", profile.principal);
                match profile.last_ip {
                    Some(ip) => println!("last ip   : {ip}"),
                    None => println!("last ip   : (none)"),
                }
                println!("window    : {} requests", profile.access_count);
                println!("devices   : {}", profile.known_devices.len());
                println!(
                    "score     : {} ({} risk)",
                    profile.trust_score.value(),
                    profile.risk_level
                );
            }
        }
        Some(Commands::Recent { limit }) => {
            let gate = open_gate(config)?;
            for entry in gate.recent_decisions(limit)? {
                println!("{}", serde_json::to_string(&entry)?);
            }
        }
        Some(Commands::Check) => {
            match &cli.config {
                Some(path) => println!("config ok: {}", path.display()),
                None => println!("config ok: built-in defaults"),
            }
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        Some(Commands::Simulate {
            principal,
            requests,
        }) => {
            simulate(config, &principal, requests).await?;
        }
        None => {
            println!("TrustGate v0.1.0 - Use --help for commands");
        }
    }

    Ok(())
}

/// Resolves the effective configuration: the file if one was given,
/// built-in defaults otherwise, with `--db` winning over both.
fn load_config(path: Option<&Path>, db: Option<&Path>) -> anyhow::Result<GateConfig> {
    let mut config = match path {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("reading config file {}", path.display()))?;
            serde_json::from_str(&raw)
                .with_context(|| format!("parsing config file {}", path.display()))?
        }
        None => GateConfig::default(),
    };
    if let Some(db) = db {
        config.store.db_path = db.to_path_buf();
    }
    Ok(config)
}

fn open_gate(config: GateConfig) -> anyhow::Result<TrustGate> {
    let db = config.store.db_path.clone();
    let gate = TrustGate::open(config)
        .with_context(|| format!("opening behavior database at {}", db.display()))?;
    debug!(db = %db.display(), "gateway ready");
    Ok(gate)
}

fn print_event(event: &DecisionEvent, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(event)?);
        return Ok(());
    }

    println!("decision  : {}", event.decision());
    println!(
        "score     : {} ({} risk)",
        event.score.value(),
        event.score.risk_level()
    );
    println!("monitoring: {}", event.monitoring);
    if !event.restrictions.is_empty() {
        let labels: Vec<String> = event.restrictions.iter().map(|r| r.to_string()).collect();
        println!("restricted: {}", labels.join(", "));
    }
    if !event.deductions.is_empty() {
        let labels: Vec<String> = event.deductions.iter().map(|d| d.to_string()).collect();
        println!("flags     : {}", labels.join(", "));
    }
    if event.degraded {
        println!("degraded  : store unavailable, fallback inputs used");
    }
    Ok(())
}

/// Drives the live pipeline through a canned abuse sequence: clean
/// daytime traffic, a request flood, a device swap, and an off-hours
/// probe of the admin surface from rotating addresses.
///
/// Runs against an in-memory store so the behavior database on disk is
/// left alone.
async fn simulate(config: GateConfig, principal: &str, requests: usize) -> anyhow::Result<()> {
    let store = Arc::new(MemoryBehaviorStore::new());
    let subject = Principal::new(principal);

    let laptop = DeviceSignals {
        user_agent: "Mozilla/5.0".to_string(),
        accept_language: "en-US".to_string(),
        platform: "MacIntel".to_string(),
        timezone: "America/New_York".to_string(),
    };
    let burner = DeviceSignals {
        user_agent: "python-requests/2.31".to_string(),
        ..Default::default()
    };

    let daytime = TrustGate::with_store(
        config.clone(),
        store.clone(),
        Arc::new(FixedClock::at_hour(14)),
    );

    println!(
        "{:>4}  {:<15}  {:<15}  {:>5}  {}",
        "#", "source", "resource", "score", "decision"
    );
    let mut step = 0;

    println!("== normal access ==");
    for _ in 0..3 {
        step += 1;
        let context =
            AccessContext::new("198.51.100.7".parse()?, "/api/files").with_device(laptop.clone());
        print_row(step, &daytime.evaluate(&subject, &context).await);
    }

    println!("== high frequency ==");
    for _ in 0..requests {
        step += 1;
        let context =
            AccessContext::new("198.51.100.7".parse()?, "/api/files").with_device(laptop.clone());
        print_row(step, &daytime.evaluate(&subject, &context).await);
    }

    println!("== device change ==");
    step += 1;
    let context =
        AccessContext::new("198.51.100.7".parse()?, "/api/files").with_device(burner.clone());
    print_row(step, &daytime.evaluate(&subject, &context).await);

    println!("== off-hours admin probe ==");
    let night = TrustGate::with_store(config, store, Arc::new(FixedClock::at_hour(2)));
    for i in 0..3u8 {
        step += 1;
        let ip: IpAddr = format!("203.0.113.{}", 10 + i).parse()?;
        let context = AccessContext::new(ip, "/admin/config").with_device(burner.clone());
        print_row(step, &night.evaluate(&subject, &context).await);
    }

    Ok(())
}

fn print_row(step: usize, event: &DecisionEvent) {
    println!(
        "{:>4}  {:<15}  {:<15}  {:>5}  {}",
        step,
        event.source_ip,
        event.resource,
        event.score.value(),
        event.decision()
    );
}
