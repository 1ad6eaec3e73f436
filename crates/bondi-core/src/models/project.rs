//! Projects and the resource pools they run on.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Missing when the project's pool was deleted.
    pub pool: Option<Pool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PoolStatus {
    Creating,
    Resizing,
    Deleting,
    Ready,
    Repairing,
    Faulty,
    Unreleased,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pool {
    pub id: String,
    pub status: PoolStatus,
    pub node_group: NodeGroup,
    pub resources: PoolResources,
    pub fuzzer_limits: FuzzerLimits,
}

impl Pool {
    pub fn node_group_summary(&self) -> String {
        format!(
            "CPU per node: {} cores, RAM per node: {}GB, Node count: {}",
            self.node_group.node_cpu, self.node_group.node_ram, self.node_group.node_count
        )
    }

    pub fn resources_summary(&self) -> String {
        format!(
            "CPU in total: {} mcpu, RAM in total: {}MB, Nodes ready: {}",
            self.resources.cpu, self.resources.ram, self.resources.nodes
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeGroup {
    pub node_cpu: u32,
    pub node_ram: u32,
    pub node_count: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolResources {
    pub cpu: u64,
    pub ram: u64,
    pub nodes: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceLimits {
    pub min_value: u64,
    pub max_value: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FuzzerLimits {
    pub cpu: ResourceLimits,
    pub ram: ResourceLimits,
    pub tmpfs: ResourceLimits,
    pub ram_total: ResourceLimits,
}

/// Body of a project creation request.
#[derive(Debug, Clone, Serialize)]
pub struct NewProject {
    pub name: String,
    pub description: String,
    pub pool: NewPool,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct NewPool {
    pub node_cpu: u32,
    pub node_ram: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatedProject {
    pub id: String,
    pub name: String,
    pub pool: Pool,
}

/// Partial update; unset fields are left untouched by the server.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProjectUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ProjectUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none()
    }
}
