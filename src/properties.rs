//! Property-based tests for the capacity model.
//!
//! 1. **Growth headroom**: provisioned data is exactly raw data * 1.25
//! 2. **Quorum**: both node counts are odd and at least three
//! 3. **Monotonic retention**: keeping data longer never needs fewer nodes
//! 4. **Ceiling**: the node count always covers the shard count

use proptest::prelude::*;

use crate::config::FleetConfig;
use crate::planner::{CapacityModel, MIN_CLUSTER_NODES, compute_data_totals};

// =============================================================================
// Strategies
// =============================================================================

/// Valid fleets across a realistic range of sizes and topologies.
fn fleet_strategy() -> impl Strategy<Value = FleetConfig> {
    (
        (1u32..=500_000, 1u32..=96, 0.001f64..5.0, 1u32..=24, 0.01f64..50.0),
        (1u32..=730, 1u32..=24, 1u32..=24, 1u32..=20, 0u32..=3, 1u32..=64),
    )
        .prop_map(
            |(
                (
                    nodes,
                    converges_per_day,
                    converge_size_mb,
                    compliance_per_day,
                    compliance_size_mb,
                ),
                (
                    retention_days,
                    converge_indices_per_day,
                    compliance_indices_per_day,
                    primary_shards,
                    replica_shards,
                    heap_per_node_gb,
                ),
            )| FleetConfig {
                nodes,
                converges_per_day,
                converge_size_mb,
                compliance_per_day,
                compliance_size_mb,
                retention_days,
                converge_indices_per_day,
                compliance_indices_per_day,
                primary_shards,
                replica_shards,
                heap_per_node_gb,
                ..FleetConfig::default()
            },
        )
}

fn assert_quorum(nodes: u64) -> Result<(), TestCaseError> {
    prop_assert_eq!(nodes % 2, 1, "node count {} is even", nodes);
    prop_assert!(nodes >= MIN_CLUSTER_NODES, "node count {} below minimum", nodes);
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn prop_growth_headroom_is_exact(
        nodes in 1u32..=1_000_000,
        per_day in 1u32..=1_000,
        size_mb in 0.001f64..100.0,
        primary_shards in 1u32..=100,
        retention_days in 1u32..=3_650,
    ) {
        let t = compute_data_totals(nodes, per_day, size_mb, primary_shards, retention_days);
        prop_assert_eq!(t.total_data_gb, t.total_raw_gb * 1.25);
        prop_assert!(t.per_day_gb > 0.0);
    }

    #[test]
    fn prop_os_nodes_is_odd_quorum(config in fleet_strategy()) {
        let model = CapacityModel::new(config)?;
        assert_quorum(model.os_nodes())?;
    }

    #[test]
    fn prop_optimal_nodes_is_odd_quorum(config in fleet_strategy()) {
        let model = CapacityModel::new(config)?;
        assert_quorum(model.os_nodes_optimal_shards())?;
    }

    #[test]
    fn prop_longer_retention_never_needs_fewer_nodes(
        config in fleet_strategy(),
        extra_days in 0u32..=365,
    ) {
        let longer = FleetConfig {
            retention_days: config.retention_days + extra_days,
            ..config.clone()
        };
        let short = CapacityModel::new(config)?;
        let long = CapacityModel::new(longer)?;

        prop_assert!(long.os_nodes() >= short.os_nodes());
        prop_assert!(long.os_nodes_optimal_shards() >= short.os_nodes_optimal_shards());
    }

    #[test]
    fn prop_nodes_cover_shards(config in fleet_strategy()) {
        let model = CapacityModel::new(config)?;
        let shards = model.total_shards();
        let nodes = model.nodes_for_shard_count(shards);

        prop_assert!(nodes * model.shards_per_node() >= shards);
        prop_assert!(model.os_nodes() >= nodes);
        if nodes > 0 {
            prop_assert!((nodes - 1) * model.shards_per_node() < shards);
        }
    }
}
