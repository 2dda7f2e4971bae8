use std::{fmt, str::FromStr};

use chrono::Utc;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MachineId(pub i64);

impl MachineId {
    /// Mints a new id from the current wall clock, millisecond precision.
    /// Seed data uses fixed small ids instead.
    pub fn fresh() -> Self {
        Self(Utc::now().timestamp_millis())
    }
}

impl fmt::Display for MachineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Buildings are a fixed set; the hosted table stores the localized labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Building {
    #[serde(rename = "B동")]
    B,
    #[serde(rename = "D동")]
    D,
    #[serde(rename = "MORI동")]
    Mori,
    #[serde(rename = "WIZ동")]
    Wiz,
}

impl Building {
    pub const ALL: [Building; 4] = [Building::B, Building::D, Building::Mori, Building::Wiz];

    pub fn label(self) -> &'static str {
        match self {
            Building::B => "B동",
            Building::D => "D동",
            Building::Mori => "MORI동",
            Building::Wiz => "WIZ동",
        }
    }
}

impl fmt::Display for Building {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown building '{0}'")]
pub struct ParseBuildingError(pub String);

impl FromStr for Building {
    type Err = ParseBuildingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "B동" => Ok(Building::B),
            "D동" => Ok(Building::D),
            "MORI동" => Ok(Building::Mori),
            "WIZ동" => Ok(Building::Wiz),
            other => match other.to_ascii_uppercase().as_str() {
                "B" => Ok(Building::B),
                "D" => Ok(Building::D),
                "MORI" => Ok(Building::Mori),
                "WIZ" => Ok(Building::Wiz),
                _ => Err(ParseBuildingError(s.to_string())),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MachineStatus {
    Running,
    Idle,
    Done,
}

impl MachineStatus {
    /// Board ordering: running machines first, finished ones last.
    pub fn rank(self) -> u8 {
        match self {
            MachineStatus::Running => 1,
            MachineStatus::Idle => 2,
            MachineStatus::Done => 3,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MachineStatus::Running => "작업중",
            MachineStatus::Idle => "유휴설비",
            MachineStatus::Done => "작업완료",
        }
    }
}

impl fmt::Display for MachineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown status '{0}' (expected running, idle, or done)")]
pub struct ParseStatusError(pub String);

impl FromStr for MachineStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "RUNNING" => Ok(MachineStatus::Running),
            "IDLE" => Ok(MachineStatus::Idle),
            "DONE" => Ok(MachineStatus::Done),
            _ => Err(ParseStatusError(s.to_string())),
        }
    }
}

/// A tracked production unit. Field names mirror the hosted table columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Machine {
    pub id: MachineId,
    pub name: String,
    pub building: Building,
    pub status: MachineStatus,
    #[serde(default, deserialize_with = "null_to_default")]
    pub item_name: String,
    #[serde(default, deserialize_with = "null_to_default")]
    pub possible_items: Vec<String>,
    #[serde(default)]
    pub count: u32,
    #[serde(default)]
    pub target: u32,
}

/// Creation payload: a machine without an id. Defaults match the
/// management form's reset state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MachineDraft {
    pub name: String,
    pub building: Building,
    pub status: MachineStatus,
    #[serde(default, deserialize_with = "null_to_default")]
    pub item_name: String,
    #[serde(default, deserialize_with = "null_to_default")]
    pub possible_items: Vec<String>,
    #[serde(default)]
    pub count: u32,
    #[serde(default)]
    pub target: u32,
}

impl Default for MachineDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            building: Building::B,
            status: MachineStatus::Idle,
            item_name: String::new(),
            possible_items: Vec::new(),
            count: 0,
            target: 0,
        }
    }
}

impl MachineDraft {
    pub fn into_machine(self, id: MachineId) -> Machine {
        Machine {
            id,
            name: self.name,
            building: self.building,
            status: self.status,
            item_name: self.item_name,
            possible_items: self.possible_items,
            count: self.count,
            target: self.target,
        }
    }
}

impl From<Machine> for MachineDraft {
    fn from(machine: Machine) -> Self {
        Self {
            name: machine.name,
            building: machine.building,
            status: machine.status,
            item_name: machine.item_name,
            possible_items: machine.possible_items,
            count: machine.count,
            target: machine.target,
        }
    }
}

// Rows written by older clients may carry explicit nulls for the item
// columns; read them as the empty value.
fn null_to_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
