//! Static building and worker tables.
//!
//! The catalog is closed: every building type is an enum variant, and string
//! keys coming from presentation layers are parsed through [`lookup`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SimError;

pub const GRID_SIZE: usize = 8;
pub const GRID_CELLS: usize = GRID_SIZE * GRID_SIZE;
pub const MAX_WORKERS_PER_BUILDING: u32 = 4;
pub const CYCLE_MS: u64 = 6_000;

/// Price of one hire, identical for every worker type.
pub const WORKER_COST: Cost = &[(ResourceKind::Gold, 20), (ResourceKind::Wheat, 20)];

/// A cost or gain vector. Resources not listed are zero.
pub type Cost = &'static [(ResourceKind, u64)];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Wood,
    Stone,
    Wheat,
    Gold,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 4] = [
        ResourceKind::Wood,
        ResourceKind::Stone,
        ResourceKind::Wheat,
        ResourceKind::Gold,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ResourceKind::Wood => "wood",
            ResourceKind::Stone => "stone",
            ResourceKind::Wheat => "wheat",
            ResourceKind::Gold => "gold",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkerType {
    Farmer,
    Mason,
    Miner,
    Lumberjack,
}

impl WorkerType {
    pub const ALL: [WorkerType; 4] = [
        WorkerType::Farmer,
        WorkerType::Mason,
        WorkerType::Miner,
        WorkerType::Lumberjack,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            WorkerType::Farmer => "farmer",
            WorkerType::Mason => "mason",
            WorkerType::Miner => "miner",
            WorkerType::Lumberjack => "lumberjack",
        }
    }
}

impl fmt::Display for WorkerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildingType {
    Farm,
    Quarry,
    Mine,
    Lumberyard,
}

impl BuildingType {
    pub const ALL: [BuildingType; 4] = [
        BuildingType::Farm,
        BuildingType::Quarry,
        BuildingType::Mine,
        BuildingType::Lumberyard,
    ];

    pub fn key(self) -> &'static str {
        self.spec().key
    }

    pub fn spec(self) -> &'static BuildingSpec {
        match self {
            BuildingType::Farm => &CATALOG[0],
            BuildingType::Quarry => &CATALOG[1],
            BuildingType::Mine => &CATALOG[2],
            BuildingType::Lumberyard => &CATALOG[3],
        }
    }
}

impl fmt::Display for BuildingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for BuildingType {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        lookup(s).map(|spec| spec.building)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BuildingSpec {
    pub building: BuildingType,
    pub key: &'static str,
    pub label: &'static str,
    pub worker_type: WorkerType,
    pub output_resource: ResourceKind,
    pub output_per_worker: u64,
    pub cost: Cost,
}

static CATALOG: [BuildingSpec; 4] = [
    BuildingSpec {
        building: BuildingType::Farm,
        key: "farm",
        label: "Farm",
        worker_type: WorkerType::Farmer,
        output_resource: ResourceKind::Wheat,
        output_per_worker: 5,
        cost: &[(ResourceKind::Wood, 30), (ResourceKind::Stone, 20)],
    },
    BuildingSpec {
        building: BuildingType::Quarry,
        key: "quarry",
        label: "Quarry",
        worker_type: WorkerType::Mason,
        output_resource: ResourceKind::Stone,
        output_per_worker: 5,
        cost: &[(ResourceKind::Wood, 30), (ResourceKind::Wheat, 30)],
    },
    BuildingSpec {
        building: BuildingType::Mine,
        key: "mine",
        label: "Mine",
        worker_type: WorkerType::Miner,
        output_resource: ResourceKind::Gold,
        output_per_worker: 5,
        cost: &[
            (ResourceKind::Wood, 40),
            (ResourceKind::Stone, 40),
            (ResourceKind::Wheat, 30),
        ],
    },
    BuildingSpec {
        building: BuildingType::Lumberyard,
        key: "lumberyard",
        label: "Lumberyard",
        worker_type: WorkerType::Lumberjack,
        output_resource: ResourceKind::Wood,
        output_per_worker: 5,
        cost: &[(ResourceKind::Wood, 40)],
    },
];

/// Entries in display order.
pub fn all() -> &'static [BuildingSpec] {
    &CATALOG
}

pub fn lookup(key: &str) -> Result<&'static BuildingSpec, SimError> {
    CATALOG
        .iter()
        .find(|spec| spec.key == key)
        .ok_or_else(|| SimError::UnknownBuildingType(key.to_string()))
}

/// The single building type staffed by `worker`.
pub fn building_for(worker: WorkerType) -> &'static BuildingSpec {
    match worker {
        WorkerType::Farmer => BuildingType::Farm.spec(),
        WorkerType::Mason => BuildingType::Quarry.spec(),
        WorkerType::Miner => BuildingType::Mine.spec(),
        WorkerType::Lumberjack => BuildingType::Lumberyard.spec(),
    }
}
