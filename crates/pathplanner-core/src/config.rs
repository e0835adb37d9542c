//! Planner configuration, loaded from JSON.
//!
//! ```json
//! {
//!   "graph": { "file": "field.json" },
//!   "target": "registers",
//!   "registers": { "path_length": 33554656 }
//! }
//! ```
//!
//! Every field is optional; missing fields take the defaults of the
//! reference board (sample graph, console output, stock register map).

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{PlannerError, Result};
use crate::graph::AdjacencyGraph;
use crate::port::RegisterMap;

/// Where the adjacency table comes from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GraphSource {
    #[default]
    Sample,
    File(PathBuf),
}

impl GraphSource {
    pub fn load(&self) -> Result<AdjacencyGraph> {
        match self {
            GraphSource::Sample => Ok(AdjacencyGraph::sample()),
            GraphSource::File(path) => AdjacencyGraph::load_json(path),
        }
    }
}

/// Which output adapter receives the plan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Target {
    #[default]
    Console,
    Registers,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    pub graph: GraphSource,
    pub target: Target,
    pub registers: RegisterMap,
}

impl PlannerConfig {
    /// Parse a config and check its register map.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.registers.validate()?;
        Ok(config)
    }

    /// Load a config file. Relative graph paths resolve against the
    /// directory holding the config.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| PlannerError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_json_str(&text)?;
        if let GraphSource::File(graph) = &mut config.graph {
            if graph.is_relative() {
                if let Some(dir) = path.parent() {
                    *graph = dir.join(&*graph);
                }
            }
        }
        tracing::debug!(path = %path.display(), ?config, "loaded config");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_is_the_default() {
        let config = PlannerConfig::from_json_str("{}").unwrap();
        assert_eq!(config, PlannerConfig::default());
        assert_eq!(config.target, Target::Console);
        assert_eq!(config.registers, RegisterMap::DEFAULT);
    }

    #[test]
    fn partial_register_map_keeps_other_defaults() {
        let json = r#"{ "target": "registers", "registers": { "cpu_done": 64 } }"#;
        let config = PlannerConfig::from_json_str(json).unwrap();
        assert_eq!(config.target, Target::Registers);
        assert_eq!(config.registers.cpu_done, 64);
        assert_eq!(config.registers.start, RegisterMap::DEFAULT.start);
    }

    #[test]
    fn register_map_past_the_address_space_is_rejected() {
        let json = r#"{ "registers": { "graph_base": 4294967200 } }"#;
        let err = PlannerConfig::from_json_str(json).unwrap_err();
        assert!(matches!(err, PlannerError::InvalidRegisterMap(_)));
    }

    #[test]
    fn overlapping_registers_are_rejected_on_load() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("planner.json");
        std::fs::write(&config_path, r#"{ "registers": { "node_point": 33554432 } }"#).unwrap();

        let err = PlannerConfig::load(&config_path).unwrap_err();
        assert!(err.to_string().contains("overlaps node_point"));
    }

    #[test]
    fn graph_file_resolves_next_to_config() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("planner.json");
        std::fs::write(&config_path, r#"{ "graph": { "file": "field.json" } }"#).unwrap();

        let config = PlannerConfig::load(&config_path).unwrap();
        assert_eq!(config.graph, GraphSource::File(dir.path().join("field.json")));
    }

    #[test]
    fn missing_file_names_the_path() {
        let err = PlannerConfig::load("/definitely/not/here.json").unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.json"));
    }
}
