//! Resource pools owned by a user, as listed outside any project.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserPool {
    pub id: String,
    pub resources: PoolCapacity,
}

/// Totals and what is still free, in mcpu, MB and nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolCapacity {
    pub cpu_total: u64,
    pub ram_total: u64,
    pub nodes_total: u32,
    pub cpu_avail: u64,
    pub ram_avail: u64,
    pub nodes_avail: u32,
    pub fuzzer_max_cpu: u64,
    pub fuzzer_max_ram: u64,
}

impl UserPool {
    pub fn availability_summary(&self) -> String {
        format!(
            "CPU avail: {} mcpu, RAM avail: {} MB, Nodes: {}",
            self.resources.cpu_avail, self.resources.ram_avail, self.resources.nodes_avail
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_availability_summary() {
        let json = r#"{"id": "3001", "resources": {
            "cpu_total": 4000, "ram_total": 8192, "nodes_total": 2,
            "cpu_avail": 1500, "ram_avail": 2048, "nodes_avail": 1,
            "fuzzer_max_cpu": 1000, "fuzzer_max_ram": 2048}}"#;
        let pool: UserPool = serde_json::from_str(json).unwrap();
        assert_eq!(
            pool.availability_summary(),
            "CPU avail: 1500 mcpu, RAM avail: 2048 MB, Nodes: 1"
        );
    }
}
