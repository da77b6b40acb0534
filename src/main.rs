use std::path::PathBuf;

use clap::Parser;
use os_node_planner::{CapacityModel, FleetConfig, Report, Result};
use tracing::{Level, error, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Command-line arguments for the OpenSearch Node Planner.
///
/// Values are layered: built-in baseline, then `--config`, then flags.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// TOML file with fleet and policy settings.
    #[arg(long, env = "OS_PLANNER_CONFIG")]
    config: Option<PathBuf>,

    /// Number of managed client nodes in the fleet.
    #[arg(long, env = "OS_PLANNER_NODES")]
    nodes: Option<u32>,

    /// Converge events per client node per day.
    #[arg(long)]
    converges_per_day: Option<u32>,

    /// Average converge event size in MB.
    #[arg(long)]
    converge_size_mb: Option<f64>,

    /// Compliance events per client node per day.
    #[arg(long)]
    compliance_per_day: Option<u32>,

    /// Average compliance event size in MB.
    #[arg(long)]
    compliance_size_mb: Option<f64>,

    /// Days of data kept online.
    #[arg(long, env = "OS_PLANNER_RETENTION_DAYS")]
    retention_days: Option<u32>,

    /// Converge indices created per day.
    #[arg(long)]
    converge_indices_per_day: Option<u32>,

    /// Compliance indices created per day.
    #[arg(long)]
    compliance_indices_per_day: Option<u32>,

    /// Primary shards per index.
    #[arg(long)]
    primary_shards: Option<u32>,

    /// Replica shards per primary.
    #[arg(long)]
    replica_shards: Option<u32>,

    /// Heap per search node in GB.
    #[arg(long, env = "OS_PLANNER_HEAP_PER_NODE_GB")]
    heap_per_node_gb: Option<u32>,

    /// Shards allowed per GB of heap.
    #[arg(long)]
    shards_per_heap_gb: Option<u32>,

    /// Target daily size of one primary shard in GB.
    #[arg(long)]
    target_shard_size_gb: Option<f64>,

    /// Multiplier applied to retained raw data for growth (e.g. 1.25 = 25%).
    #[arg(long)]
    growth_factor: Option<f64>,

    /// Also plan the 100k node / 90 day scenario after the configured one.
    #[arg(long)]
    demo: bool,

    /// Print reports as JSON.
    #[arg(long)]
    json: bool,

    /// Log level (trace, debug, info, warn, error). Without it `RUST_LOG`
    /// applies, falling back to warn.
    #[arg(long, env = "OS_PLANNER_LOG_LEVEL")]
    log_level: Option<String>,

    /// Output logs as JSON
    #[arg(long, env = "OS_PLANNER_LOG_JSON")]
    log_json: bool,
}

impl Args {
    fn fleet_config(&self) -> Result<FleetConfig> {
        let mut c = match &self.config {
            Some(path) => FleetConfig::from_toml_file(path)?,
            None => FleetConfig::default(),
        };

        if let Some(v) = self.nodes {
            c.nodes = v;
        }
        if let Some(v) = self.converges_per_day {
            c.converges_per_day = v;
        }
        if let Some(v) = self.converge_size_mb {
            c.converge_size_mb = v;
        }
        if let Some(v) = self.compliance_per_day {
            c.compliance_per_day = v;
        }
        if let Some(v) = self.compliance_size_mb {
            c.compliance_size_mb = v;
        }
        if let Some(v) = self.retention_days {
            c.retention_days = v;
        }
        if let Some(v) = self.converge_indices_per_day {
            c.converge_indices_per_day = v;
        }
        if let Some(v) = self.compliance_indices_per_day {
            c.compliance_indices_per_day = v;
        }
        if let Some(v) = self.primary_shards {
            c.primary_shards = v;
        }
        if let Some(v) = self.replica_shards {
            c.replica_shards = v;
        }
        if let Some(v) = self.heap_per_node_gb {
            c.heap_per_node_gb = v;
        }
        if let Some(v) = self.shards_per_heap_gb {
            c.policy.shards_per_heap_gb = v;
        }
        if let Some(v) = self.target_shard_size_gb {
            c.policy.target_shard_size_gb = v;
        }
        if let Some(v) = self.growth_factor {
            c.policy.growth_factor = v;
        }

        Ok(c)
    }

    fn scenarios(&self) -> Result<Vec<CapacityModel>> {
        let base = self.fleet_config()?;
        let mut scenarios = vec![CapacityModel::new(base.clone())?];
        if self.demo {
            scenarios.push(CapacityModel::new(FleetConfig {
                nodes: 100_000,
                retention_days: 90,
                ..base
            })?);
        }
        Ok(scenarios)
    }
}

fn parse_level(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "error" => Level::ERROR,
        _ => Level::WARN,
    }
}

fn log_filter(level: Option<&str>) -> EnvFilter {
    match level {
        Some(level) => EnvFilter::from_default_env().add_directive(parse_level(level).into()),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    }
}

fn init_logging(args: &Args) {
    let filter = log_filter(args.log_level.as_deref());

    if args.log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .init();
    }
}

fn render(report: &Report, json: bool) -> Result<String> {
    if json {
        report.to_json()
    } else {
        Ok(report.to_string())
    }
}

fn run(args: &Args) -> Result<()> {
    for model in args.scenarios()? {
        let report = model.report();
        info!(config = ?report.config, "planning scenario");
        info!(
            total_shards = report.total_shards,
            is_optimal_shard_count = report.is_optimal_shard_count,
            os_nodes = report.os_nodes,
            os_nodes_optimal_shards = report.os_nodes_optimal_shards,
            "computed node plan"
        );
        println!("{}", render(&report, args.json)?);
    }
    Ok(())
}

fn main() {
    let args = Args::parse();
    init_logging(&args);

    if let Err(e) = run(&args) {
        error!("{}", e);
        eprintln!("Error: {}", e);
        std::process::exit(2);
    }
}
