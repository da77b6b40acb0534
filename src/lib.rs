#![doc = include_str!("../README.md")]

pub mod config;
pub mod error;

#[cfg(test)]
mod properties;

pub mod planner {
    use std::fmt::{Display, Formatter, Result as FmtResult};

    use serde::Serialize;
    use tracing::{debug, warn};

    use crate::config::{DEFAULT_GROWTH_FACTOR, FleetConfig};
    use crate::error::{Error, Result};

    /// Smallest cluster the planner will recommend.
    pub const MIN_CLUSTER_NODES: u64 = 3;

    /// Data volume for one event category.
    ///
    /// All values are expressed in **gigabytes (GB, 1024 MB)** and exclude
    /// replica copies.
    #[derive(Debug, Clone, Copy, PartialEq, Serialize)]
    pub struct DataTotals {
        /// Volume ingested per day.
        ///
        /// Formula: `nodes * events_per_day * event_size_mb / 1024`
        pub per_day_gb: f64,

        /// Daily volume of one primary shard under the configured shard count.
        ///
        /// Formula: `per_day_gb / primary_shards`
        pub shard_size_gb: f64,

        /// Volume held over the retention window.
        ///
        /// Formula: `per_day_gb * retention_days`
        pub total_raw_gb: f64,

        /// Raw volume plus growth headroom.
        ///
        /// Formula: `total_raw_gb * growth_factor`
        pub total_data_gb: f64,
    }

    /// Computes the data volume of one event category with the default 25%
    /// growth headroom.
    ///
    /// Performs no validation: a zero `primary_shards` yields an infinite
    /// shard size. Use [`CapacityModel`] for checked inputs.
    ///
    /// # Examples
    ///
    /// ```
    /// use os_node_planner::compute_data_totals;
    ///
    /// let t = compute_data_totals(10_000, 1, 4.0, 5, 30);
    ///
    /// assert!((t.per_day_gb - 39.0625).abs() < 1e-9);
    /// assert_eq!(t.total_data_gb, t.total_raw_gb * 1.25);
    /// ```
    pub fn compute_data_totals(
        nodes: u32,
        events_per_day: u32,
        event_size_mb: f64,
        primary_shards: u32,
        retention_days: u32,
    ) -> DataTotals {
        compute_data_totals_with_growth(
            nodes,
            events_per_day,
            event_size_mb,
            primary_shards,
            retention_days,
            DEFAULT_GROWTH_FACTOR,
        )
    }

    /// Same as [`compute_data_totals`] with an explicit growth factor.
    pub fn compute_data_totals_with_growth(
        nodes: u32,
        events_per_day: u32,
        event_size_mb: f64,
        primary_shards: u32,
        retention_days: u32,
        growth_factor: f64,
    ) -> DataTotals {
        let per_day_gb = nodes as f64 * events_per_day as f64 * event_size_mb / 1024.0;
        let total_raw_gb = per_day_gb * retention_days as f64;

        DataTotals {
            per_day_gb,
            shard_size_gb: per_day_gb / primary_shards as f64,
            total_raw_gb,
            total_data_gb: total_raw_gb * growth_factor,
        }
    }

    /// Primary shards needed to keep each shard's daily slice at or below
    /// `target_shard_size_gb`.
    ///
    /// Formula: `ceil(data_per_day_gb / target_shard_size_gb)`
    pub fn calculated_primary_shards(data_per_day_gb: f64, target_shard_size_gb: f64) -> u64 {
        // `as` saturates; overflowing totals are caught by CapacityModel::new.
        (data_per_day_gb / target_shard_size_gb).ceil() as u64
    }

    /// Shards held over the retention window for one category.
    ///
    /// Formula: `indices_per_day * retention_days * (primaries + primaries * replicas)`
    fn checked_shard_total(
        indices_per_day: u32,
        retention_days: u32,
        primaries: u64,
        replicas: u32,
    ) -> Option<u64> {
        let per_index = primaries.checked_add(primaries.checked_mul(replicas as u64)?)?;
        (indices_per_day as u64)
            .checked_mul(retention_days as u64)?
            .checked_mul(per_index)
    }

    /// Rounds up to an odd node count for quorum, then applies the floor.
    fn quorum_nodes(nodes: u64) -> u64 {
        let nodes = if nodes % 2 == 0 { nodes + 1 } else { nodes };
        nodes.max(MIN_CLUSTER_NODES)
    }

    /// Derivations over one validated [`FleetConfig`].
    ///
    /// Every method is a pure function of the configuration. The
    /// configuration cannot be changed once the model is built; build a new
    /// model to evaluate another scenario.
    #[derive(Debug, Clone, PartialEq)]
    pub struct CapacityModel {
        config: FleetConfig,
    }

    impl CapacityModel {
        /// Validates `config` and builds the model.
        ///
        /// # Errors
        ///
        /// Returns [`Error::InvalidConfiguration`] if any field is out of its
        /// domain (see [`FleetConfig::validate`]) or if a shard total for
        /// either topology would not fit in a `u64`.
        pub fn new(config: FleetConfig) -> Result<Self> {
            config.validate()?;
            let model = Self { config };
            model.check_shard_totals()?;
            debug!(
                nodes = model.config.nodes,
                retention_days = model.config.retention_days,
                "validated fleet configuration"
            );
            Ok(model)
        }

        /// The model for the baseline fleet ([`FleetConfig::default`]).
        pub fn baseline() -> Self {
            Self {
                config: FleetConfig::default(),
            }
        }

        pub fn config(&self) -> &FleetConfig {
            &self.config
        }

        fn check_shard_totals(&self) -> Result<()> {
            let c = &self.config;
            for (field, per_day_gb) in [
                ("converge_size_mb", self.converge_data().per_day_gb),
                ("compliance_size_mb", self.compliance_data().per_day_gb),
            ] {
                if !per_day_gb.is_finite() {
                    return Err(Error::invalid(field, "yields a non-finite daily volume"));
                }
            }

            let topology_total = |converge: u64, compliance: u64| -> Option<u64> {
                let converge = checked_shard_total(
                    c.converge_indices_per_day,
                    c.retention_days,
                    converge,
                    c.replica_shards,
                )?;
                let compliance = checked_shard_total(
                    c.compliance_indices_per_day,
                    c.retention_days,
                    compliance,
                    c.replica_shards,
                )?;
                converge.checked_add(compliance)
            };

            let primaries = c.primary_shards as u64;
            let static_total = topology_total(primaries, primaries).ok_or_else(|| {
                Error::invalid("primary_shards", "yields a static shard total that overflows u64")
            })?;
            let sized_total = topology_total(
                self.calculated_converge_primary_shards(),
                self.calculated_compliance_primary_shards(),
            )
            .ok_or_else(|| {
                Error::invalid(
                    "policy.target_shard_size_gb",
                    "yields a volume-sized shard total that overflows u64",
                )
            })?;
            debug!(static_total, sized_total, "shard totals within range");
            Ok(())
        }

        /// Converge data volume.
        pub fn converge_data(&self) -> DataTotals {
            let c = &self.config;
            compute_data_totals_with_growth(
                c.nodes,
                c.converges_per_day,
                c.converge_size_mb,
                c.primary_shards,
                c.retention_days,
                c.policy.growth_factor,
            )
        }

        /// Compliance data volume.
        pub fn compliance_data(&self) -> DataTotals {
            let c = &self.config;
            compute_data_totals_with_growth(
                c.nodes,
                c.compliance_per_day,
                c.compliance_size_mb,
                c.primary_shards,
                c.retention_days,
                c.policy.growth_factor,
            )
        }

        /// Shards one search node can hold given its heap.
        ///
        /// Formula: `heap_per_node_gb * shards_per_heap_gb`
        pub fn shards_per_node(&self) -> u64 {
            self.config.heap_per_node_gb as u64 * self.config.policy.shards_per_heap_gb as u64
        }

        fn shard_total(&self, indices_per_day: u32, primaries: u64) -> u64 {
            // Overflow is rejected in `new`.
            checked_shard_total(
                indices_per_day,
                self.config.retention_days,
                primaries,
                self.config.replica_shards,
            )
            .unwrap_or(u64::MAX)
        }

        /// Converge shards over the retention window with the static
        /// `primary_shards` topology.
        pub fn converge_shards(&self) -> u64 {
            self.shard_total(
                self.config.converge_indices_per_day,
                self.config.primary_shards as u64,
            )
        }

        /// Compliance shards over the retention window with the static
        /// `primary_shards` topology.
        pub fn compliance_shards(&self) -> u64 {
            self.shard_total(
                self.config.compliance_indices_per_day,
                self.config.primary_shards as u64,
            )
        }

        pub fn total_shards(&self) -> u64 {
            self.converge_shards() + self.compliance_shards()
        }

        pub fn calculated_converge_primary_shards(&self) -> u64 {
            calculated_primary_shards(
                self.converge_data().per_day_gb,
                self.config.policy.target_shard_size_gb,
            )
        }

        pub fn calculated_compliance_primary_shards(&self) -> u64 {
            calculated_primary_shards(
                self.compliance_data().per_day_gb,
                self.config.policy.target_shard_size_gb,
            )
        }

        /// Converge shards over the retention window when primaries are sized
        /// from the daily volume.
        pub fn calculated_converge_shards_total(&self) -> u64 {
            self.shard_total(
                self.config.converge_indices_per_day,
                self.calculated_converge_primary_shards(),
            )
        }

        /// Compliance shards over the retention window when primaries are
        /// sized from the daily volume.
        pub fn calculated_compliance_shards_total(&self) -> u64 {
            self.shard_total(
                self.config.compliance_indices_per_day,
                self.calculated_compliance_primary_shards(),
            )
        }

        pub fn calculated_total_shards(&self) -> u64 {
            self.calculated_converge_shards_total() + self.calculated_compliance_shards_total()
        }

        /// Minimum nodes keeping `shard_count` under the per-node ceiling.
        ///
        /// Formula: `ceil(shard_count / shards_per_node)`. No odd rounding or
        /// minimum is applied.
        pub fn nodes_for_shard_count(&self, shard_count: u64) -> u64 {
            shard_count.div_ceil(self.shards_per_node())
        }

        /// Search nodes needed for the static shard topology: odd, and at
        /// least [`MIN_CLUSTER_NODES`].
        pub fn os_nodes(&self) -> u64 {
            quorum_nodes(self.nodes_for_shard_count(self.total_shards()))
        }

        /// Search nodes needed when primaries are sized from the daily
        /// volume: odd, and at least [`MIN_CLUSTER_NODES`].
        pub fn os_nodes_optimal_shards(&self) -> u64 {
            quorum_nodes(self.nodes_for_shard_count(self.calculated_total_shards()))
        }

        /// Whether the static topology needs the same node count as the
        /// volume-sized one. `false` means the configured primaries are
        /// likely too large or too small for the data.
        pub fn is_optimal_shard_count(&self) -> bool {
            self.os_nodes() == self.os_nodes_optimal_shards()
        }

        /// Snapshot of every derivation for reporting.
        pub fn report(&self) -> Report {
            let report = Report {
                config: self.config.clone(),
                converge: self.converge_data(),
                compliance: self.compliance_data(),
                shards_per_node: self.shards_per_node(),
                total_shards: self.total_shards(),
                calculated_total_shards: self.calculated_total_shards(),
                calculated_converge_primary_shards: self.calculated_converge_primary_shards(),
                calculated_compliance_primary_shards: self.calculated_compliance_primary_shards(),
                is_optimal_shard_count: self.is_optimal_shard_count(),
                os_nodes: self.os_nodes(),
                os_nodes_optimal_shards: self.os_nodes_optimal_shards(),
            };
            if !report.is_optimal_shard_count {
                warn!(
                    os_nodes = report.os_nodes,
                    os_nodes_optimal_shards = report.os_nodes_optimal_shards,
                    "configured primary shards do not match data volume"
                );
            }
            report
        }
    }

    /// Computed node plan for one scenario.
    #[derive(Debug, Clone, PartialEq, Serialize)]
    pub struct Report {
        /// Inputs the plan was derived from.
        pub config: FleetConfig,
        pub converge: DataTotals,
        pub compliance: DataTotals,
        pub shards_per_node: u64,
        /// Shards with the static `primary_shards` topology.
        pub total_shards: u64,
        /// Shards with primaries sized from daily volume.
        pub calculated_total_shards: u64,
        pub calculated_converge_primary_shards: u64,
        pub calculated_compliance_primary_shards: u64,
        pub is_optimal_shard_count: bool,
        pub os_nodes: u64,
        pub os_nodes_optimal_shards: u64,
    }

    impl Report {
        /// Pretty-printed JSON.
        pub fn to_json(&self) -> Result<String> {
            Ok(serde_json::to_string_pretty(self)?)
        }
    }

    fn fmt_gb(x: f64) -> String {
        format!("{:.1} GB", x)
    }
    fn fmt_tb(x: f64) -> String {
        format!("{:.2} TB", x / 1024.0)
    }

    fn write_totals(f: &mut Formatter<'_>, label: &str, t: &DataTotals) -> FmtResult {
        writeln!(f, "{label} data:")?;
        writeln!(f, "  Per day:                {}", fmt_gb(t.per_day_gb))?;
        writeln!(f, "  Per shard per day:      {}", fmt_gb(t.shard_size_gb))?;
        writeln!(
            f,
            "  Retained (raw):         {} ({})",
            fmt_gb(t.total_raw_gb),
            fmt_tb(t.total_raw_gb)
        )?;
        writeln!(
            f,
            "  Retained (+growth):     {} ({})",
            fmt_gb(t.total_data_gb),
            fmt_tb(t.total_data_gb)
        )
    }

    impl Display for Report {
        fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
            let c = &self.config;
            writeln!(f, "=== OpenSearch Node Planner ===")?;
            writeln!(f, "Client nodes: {}", c.nodes)?;
            writeln!(f, "Retention: {} days", c.retention_days)?;
            writeln!(
                f,
                "Converge: {}/day x {} MB | Compliance: {}/day x {} MB",
                c.converges_per_day, c.converge_size_mb, c.compliance_per_day, c.compliance_size_mb
            )?;
            writeln!(
                f,
                "Indices per day: converge {} | compliance {}",
                c.converge_indices_per_day, c.compliance_indices_per_day
            )?;
            writeln!(
                f,
                "Primary shards: {} | Replicas per shard: {}",
                c.primary_shards, c.replica_shards
            )?;
            writeln!(
                f,
                "Heap per node: {} GB ({} shards/GB -> {} shards/node)",
                c.heap_per_node_gb, c.policy.shards_per_heap_gb, self.shards_per_node
            )?;
            writeln!(f)?;

            write_totals(f, "Converge", &self.converge)?;
            write_totals(f, "Compliance", &self.compliance)?;
            writeln!(f)?;

            writeln!(f, "Total shards (static):    {}", self.total_shards)?;
            writeln!(
                f,
                "Total shards (optimal):   {} (primaries: converge {}, compliance {})",
                self.calculated_total_shards,
                self.calculated_converge_primary_shards,
                self.calculated_compliance_primary_shards
            )?;
            writeln!(f, "Optimal shard count?:     {}", self.is_optimal_shard_count)?;
            writeln!(f, "OS nodes:                 {}", self.os_nodes)?;
            writeln!(f, "OS nodes (optimal):       {}", self.os_nodes_optimal_shards)?;

            Ok(())
        }
    }
}


pub use config::{FleetConfig, Policy};
pub use error::{Error, Result};
pub use planner::{
    CapacityModel, DataTotals, MIN_CLUSTER_NODES, Report, calculated_primary_shards,
    compute_data_totals, compute_data_totals_with_growth,
};
