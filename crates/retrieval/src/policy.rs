//! Role-to-partition access policy.
//!
//! The policy table is configuration: loaded once at startup, read-only
//! afterwards. No runtime mutation path is exposed to request handlers, so
//! a role's permission set is stable for the duration of any in-flight
//! query.

use std::collections::{BTreeMap, BTreeSet};

/// The partition every role may read.
pub const GENERAL_PARTITION: &str = "general";

/// An ordered, non-empty set of partitions a query may touch.
///
/// This is the only shape the vector index accepts as a filter. It cannot
/// be constructed empty, which closes off the "empty filter means
/// everything" failure mode of dynamic filter maps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionSet(Vec<String>);

impl PartitionSet {
    /// Build a partition set, deduplicating while preserving order.
    /// Returns `None` for empty input.
    pub fn new(partitions: Vec<String>) -> Option<Self> {
        let mut seen = BTreeSet::new();
        let deduped: Vec<String> = partitions
            .into_iter()
            .filter(|p| seen.insert(p.clone()))
            .collect();

        if deduped.is_empty() {
            None
        } else {
            Some(Self(deduped))
        }
    }

    /// The fail-closed default: general only.
    pub fn general_only() -> Self {
        Self(vec![GENERAL_PARTITION.to_string()])
    }

    pub fn contains(&self, partition: &str) -> bool {
        self.0.iter().any(|p| p == partition)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        // Non-empty by construction.
        false
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

/// Immutable role → partitions table.
#[derive(Debug, Clone)]
pub struct AccessPolicy {
    roles: BTreeMap<String, PartitionSet>,
}

impl AccessPolicy {
    /// Build a policy from a raw configuration table.
    ///
    /// Every role's set is extended with the general partition if the
    /// table omitted it.
    pub fn from_table(table: &BTreeMap<String, Vec<String>>) -> Self {
        let mut roles = BTreeMap::new();
        for (role, partitions) in table {
            let mut partitions = partitions.clone();
            if !partitions.iter().any(|p| p == GENERAL_PARTITION) {
                partitions.push(GENERAL_PARTITION.to_string());
            }
            // Non-empty: general was just ensured.
            if let Some(set) = PartitionSet::new(partitions) {
                roles.insert(role.clone(), set);
            }
        }
        Self { roles }
    }

    /// The default deployment table.
    pub fn default_table() -> BTreeMap<String, Vec<String>> {
        let mut table = BTreeMap::new();
        for department in ["finance", "marketing", "hr", "engineering"] {
            table.insert(
                department.to_string(),
                vec![department.to_string(), GENERAL_PARTITION.to_string()],
            );
        }
        table.insert(
            "employee".to_string(),
            vec![GENERAL_PARTITION.to_string()],
        );
        table.insert(
            "c_level".to_string(),
            vec![
                "finance".to_string(),
                "marketing".to_string(),
                "hr".to_string(),
                "engineering".to_string(),
                GENERAL_PARTITION.to_string(),
            ],
        );
        table
    }

    /// Look up the partitions a role may read.
    ///
    /// Total function: an unrecognized role falls back to general only,
    /// never to the full document set.
    pub fn allowed_partitions(&self, role: &str) -> PartitionSet {
        match self.roles.get(role) {
            Some(set) => set.clone(),
            None => {
                tracing::debug!("Unknown role '{}', scoping to general", role);
                PartitionSet::general_only()
            }
        }
    }

    /// Union of all partitions any role can reach. Used by ingestion to
    /// refuse documents that would be unreachable under every role.
    pub fn partition_domain(&self) -> BTreeSet<String> {
        self.roles
            .values()
            .flat_map(|set| set.iter().map(String::from))
            .collect()
    }
}

impl Default for AccessPolicy {
    fn default() -> Self {
        Self::from_table(&Self::default_table())
    }
}
