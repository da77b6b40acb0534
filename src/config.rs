//! Inputs for one capacity calculation.
//!
//! A [`FleetConfig`] starts from the baseline fleet (see [`Default`]), can be
//! loaded from TOML, and may have any field overridden before it is handed to
//! [`CapacityModel::new`](crate::CapacityModel::new), which validates it.
//!
//! ```toml
//! nodes = 100000
//! retention_days = 90
//!
//! [policy]
//! shards_per_heap_gb = 40
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Shards allowed per GB of JVM heap on a search node.
///
/// Vendor guidance is 25 shards/GB and clusters start to degrade around
/// 80 shards/GB; 50 leaves room on both sides.
pub const DEFAULT_SHARDS_PER_HEAP_GB: u32 = 50;

/// Upper bound for one primary shard's daily slice, in GB.
///
/// Search-heavy indices are usually kept near 30 GB per shard. Telemetry is
/// write-heavy and indexes faster with shards up to 50 GB.
pub const DEFAULT_TARGET_SHARD_SIZE_GB: f64 = 50.0;

/// Growth headroom applied to retained raw data (25%).
pub const DEFAULT_GROWTH_FACTOR: f64 = 1.25;

mod defaults {
    pub fn nodes() -> u32 { 10_000 }
    pub fn converges_per_day() -> u32 { 24 }
    pub fn converge_size_mb() -> f64 { 0.3 }
    pub fn compliance_per_day() -> u32 { 1 }
    pub fn compliance_size_mb() -> f64 { 4.0 }
    pub fn retention_days() -> u32 { 30 }
    pub fn converge_indices_per_day() -> u32 { 2 }
    pub fn compliance_indices_per_day() -> u32 { 2 }
    pub fn primary_shards() -> u32 { 5 }
    pub fn replica_shards() -> u32 { 1 }
    pub fn heap_per_node_gb() -> u32 { 32 }

    pub fn shards_per_heap_gb() -> u32 { super::DEFAULT_SHARDS_PER_HEAP_GB }
    pub fn target_shard_size_gb() -> f64 { super::DEFAULT_TARGET_SHARD_SIZE_GB }
    pub fn growth_factor() -> f64 { super::DEFAULT_GROWTH_FACTOR }
}

/// Fleet size, event profile, retention and cluster topology.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FleetConfig {
    /// Managed client nodes reporting into the cluster.
    #[serde(default = "defaults::nodes")]
    pub nodes: u32,
    /// Converge events per client node per day.
    #[serde(default = "defaults::converges_per_day")]
    pub converges_per_day: u32,
    /// Average size of one converge event, in MB.
    #[serde(default = "defaults::converge_size_mb")]
    pub converge_size_mb: f64,
    /// Compliance scans per client node per day.
    #[serde(default = "defaults::compliance_per_day")]
    pub compliance_per_day: u32,
    /// Average size of one compliance event, in MB.
    #[serde(default = "defaults::compliance_size_mb")]
    pub compliance_size_mb: f64,
    /// Days data stays online.
    #[serde(default = "defaults::retention_days")]
    pub retention_days: u32,
    /// Converge indices created per day (rollover frequency).
    #[serde(default = "defaults::converge_indices_per_day")]
    pub converge_indices_per_day: u32,
    /// Compliance indices created per day.
    #[serde(default = "defaults::compliance_indices_per_day")]
    pub compliance_indices_per_day: u32,
    /// Default primary shards per index.
    #[serde(default = "defaults::primary_shards")]
    pub primary_shards: u32,
    /// Replica copies per primary shard.
    #[serde(default = "defaults::replica_shards")]
    pub replica_shards: u32,
    /// Heap allocated to each search node, in GB.
    #[serde(default = "defaults::heap_per_node_gb")]
    pub heap_per_node_gb: u32,
    /// Tuning constants used by the derivations.
    #[serde(default)]
    pub policy: Policy,
}

/// Operational tuning constants.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Policy {
    /// Shard ceiling per GB of heap.
    #[serde(default = "defaults::shards_per_heap_gb")]
    pub shards_per_heap_gb: u32,
    /// Target daily size of one primary shard, in GB.
    #[serde(default = "defaults::target_shard_size_gb")]
    pub target_shard_size_gb: f64,
    /// Multiplier from raw retained data to provisioned data.
    #[serde(default = "defaults::growth_factor")]
    pub growth_factor: f64,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            shards_per_heap_gb: defaults::shards_per_heap_gb(),
            target_shard_size_gb: defaults::target_shard_size_gb(),
            growth_factor: defaults::growth_factor(),
        }
    }
}

impl Default for FleetConfig {
    /// The baseline fleet: 10k client nodes, 30 days of retention, 32 GB heap.
    fn default() -> Self {
        Self {
            nodes: defaults::nodes(),
            converges_per_day: defaults::converges_per_day(),
            converge_size_mb: defaults::converge_size_mb(),
            compliance_per_day: defaults::compliance_per_day(),
            compliance_size_mb: defaults::compliance_size_mb(),
            retention_days: defaults::retention_days(),
            converge_indices_per_day: defaults::converge_indices_per_day(),
            compliance_indices_per_day: defaults::compliance_indices_per_day(),
            primary_shards: defaults::primary_shards(),
            replica_shards: defaults::replica_shards(),
            heap_per_node_gb: defaults::heap_per_node_gb(),
            policy: Policy::default(),
        }
    }
}

impl FleetConfig {
    /// Parse a TOML document. Missing keys keep their baseline value.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| Error::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Check every field against its domain.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] naming the first offending
    /// field: a zero count (other than `replica_shards`), a non-positive or
    /// non-finite event size, or an invalid [`Policy`].
    pub fn validate(&self) -> Result<()> {
        positive("nodes", self.nodes)?;
        positive("converges_per_day", self.converges_per_day)?;
        positive_size("converge_size_mb", self.converge_size_mb)?;
        positive("compliance_per_day", self.compliance_per_day)?;
        positive_size("compliance_size_mb", self.compliance_size_mb)?;
        positive("retention_days", self.retention_days)?;
        positive("converge_indices_per_day", self.converge_indices_per_day)?;
        positive("compliance_indices_per_day", self.compliance_indices_per_day)?;
        positive("primary_shards", self.primary_shards)?;
        positive("heap_per_node_gb", self.heap_per_node_gb)?;
        self.policy.validate()
    }
}

impl Policy {
    /// Check the tuning constants.
    pub fn validate(&self) -> Result<()> {
        positive("policy.shards_per_heap_gb", self.shards_per_heap_gb)?;
        positive_size("policy.target_shard_size_gb", self.target_shard_size_gb)?;
        if !self.growth_factor.is_finite() || self.growth_factor < 1.0 {
            return Err(Error::invalid(
                "policy.growth_factor",
                format!("must be a finite value >= 1.0, got {}", self.growth_factor),
            ));
        }
        Ok(())
    }
}

fn positive(field: &'static str, value: u32) -> Result<()> {
    if value == 0 {
        return Err(Error::invalid(field, "must be > 0"));
    }
    Ok(())
}

fn positive_size(field: &'static str, value: f64) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(Error::invalid(
            field,
            format!("must be a finite value > 0, got {value}"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn baseline_matches_reference_fleet() {
        let c = FleetConfig::default();
        assert_eq!(c.nodes, 10_000);
        assert_eq!(c.converges_per_day, 24);
        assert!((c.converge_size_mb - 0.3).abs() < 1e-12);
        assert_eq!(c.compliance_per_day, 1);
        assert!((c.compliance_size_mb - 4.0).abs() < 1e-12);
        assert_eq!(c.retention_days, 30);
        assert_eq!(c.converge_indices_per_day, 2);
        assert_eq!(c.compliance_indices_per_day, 2);
        assert_eq!(c.primary_shards, 5);
        assert_eq!(c.replica_shards, 1);
        assert_eq!(c.heap_per_node_gb, 32);
        assert_eq!(c.policy, Policy::default());
        assert!(c.validate().is_ok());
    }

    #[test]
    fn empty_document_is_baseline() {
        assert_eq!(FleetConfig::from_toml_str("").unwrap(), FleetConfig::default());
    }

    #[test]
    fn partial_document_keeps_other_defaults() {
        let c = FleetConfig::from_toml_str(
            r#"
            nodes = 100000
            retention_days = 90

            [policy]
            shards_per_heap_gb = 40
            "#,
        )
        .unwrap();
        assert_eq!(c.nodes, 100_000);
        assert_eq!(c.retention_days, 90);
        assert_eq!(c.primary_shards, 5);
        assert_eq!(c.policy.shards_per_heap_gb, 40);
        assert!((c.policy.growth_factor - DEFAULT_GROWTH_FACTOR).abs() < 1e-12);
    }

    #[test]
    fn rejects_unknown_keys() {
        let err = FleetConfig::from_toml_str("node_count = 5").unwrap_err();
        assert!(matches!(err, Error::ConfigParse(_)));
    }

    #[test]
    fn rejects_negative_counts_at_parse_time() {
        assert!(FleetConfig::from_toml_str("retention_days = -1").is_err());
    }

    #[test]
    fn missing_file_reports_path() {
        let err = FleetConfig::from_toml_file("/nonexistent/planner.toml").unwrap_err();
        assert!(matches!(err, Error::ConfigRead { .. }));
        assert!(err.to_string().contains("/nonexistent/planner.toml"));
    }

    #[test]
    fn zero_fields_are_rejected() {
        let cases: [(&str, fn(&mut FleetConfig)); 6] = [
            ("nodes", |c| c.nodes = 0),
            ("retention_days", |c| c.retention_days = 0),
            ("primary_shards", |c| c.primary_shards = 0),
            ("heap_per_node_gb", |c| c.heap_per_node_gb = 0),
            ("converge_indices_per_day", |c| c.converge_indices_per_day = 0),
            ("policy.shards_per_heap_gb", |c| c.policy.shards_per_heap_gb = 0),
        ];
        for (name, mutate) in cases {
            let mut c = FleetConfig::default();
            mutate(&mut c);
            match c.validate() {
                Err(Error::InvalidConfiguration { field, .. }) => assert_eq!(field, name),
                other => panic!("{name}: expected InvalidConfiguration, got {other:?}"),
            }
        }
    }

    #[test]
    fn zero_replicas_are_allowed() {
        let c = FleetConfig {
            replica_shards: 0,
            ..FleetConfig::default()
        };
        assert!(c.validate().is_ok());
    }

    #[test]
    fn rejects_bad_sizes_and_growth() {
        let c = FleetConfig {
            converge_size_mb: 0.0,
            ..FleetConfig::default()
        };
        assert!(c.validate().is_err());

        let c = FleetConfig {
            compliance_size_mb: f64::NAN,
            ..FleetConfig::default()
        };
        assert!(c.validate().is_err());

        let mut c = FleetConfig::default();
        c.policy.growth_factor = 0.9;
        assert!(c.validate().is_err());
    }
}
