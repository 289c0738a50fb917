//! Solver parameters
//!
//! The solve form hands over raw text. `SolverConfig::from_raw` is the only
//! way to turn it into a configuration; the result is immutable and is built
//! once per solve request.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;
use std::time::Duration;

use crate::error::ParameterError;

static INTEGER_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^-?(0|[1-9][0-9]*)$").unwrap_or_else(|e| panic!("integer pattern: {e}"))
});

static DECIMAL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[-+]?[0-9]*\.?[0-9]+([eE][-+]?[0-9]+)?$")
        .unwrap_or_else(|e| panic!("decimal pattern: {e}"))
});

const DEFAULT_NN_FACTOR: usize = 20;
const DEFAULT_MAX_ITERATIONS: u32 = 1000;

/// Tour construction algorithm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlgorithmType {
    /// Greedy nearest-neighbour construction
    NearestNeighbour,
    /// Nearest-neighbour start improved by 2-opt moves
    TwoOpt,
}

impl Default for AlgorithmType {
    fn default() -> Self {
        Self::TwoOpt
    }
}

impl fmt::Display for AlgorithmType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NearestNeighbour => write!(f, "Nearest neighbour"),
            Self::TwoOpt => write!(f, "2-opt"),
        }
    }
}

impl FromStr for AlgorithmType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace(['-', '_', ' '], "").as_str() {
            "nn" | "nearestneighbour" | "nearestneighbor" => Ok(Self::NearestNeighbour),
            "2opt" | "twoopt" => Ok(Self::TwoOpt),
            _ => Err(format!("Unknown algorithm: {}", s)),
        }
    }
}

/// Parameter form contents, exactly as typed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawParameters {
    pub algorithm: AlgorithmType,
    pub nearest_neighbour_factor: String,
    pub max_iterations: String,
    pub start_index: String,
    /// Empty means no time limit
    pub time_limit_secs: String,
}

/// Immutable configuration for one solve
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolverConfig {
    pub algorithm: AlgorithmType,
    /// Length of each node's candidate (nearest neighbour) list
    pub nearest_neighbour_factor: usize,
    /// Upper bound on improvement passes
    pub max_iterations: u32,
    /// Zero-based index of the node the construction starts from
    pub start_index: usize,
    pub time_limit: Option<Duration>,
}

impl SolverConfig {
    /// Defaults sized to a problem of `dimension` nodes
    pub fn defaults_for(algorithm: AlgorithmType, dimension: usize) -> Self {
        Self {
            algorithm,
            nearest_neighbour_factor: DEFAULT_NN_FACTOR.min(dimension.saturating_sub(1)).max(1),
            max_iterations: DEFAULT_MAX_ITERATIONS,
            start_index: 0,
            time_limit: None,
        }
    }

    /// Validate raw form input
    pub fn from_raw(raw: &RawParameters) -> Result<Self, ParameterError> {
        let nearest_neighbour_factor = parse_integer(
            "nearest neighbour factor",
            &raw.nearest_neighbour_factor,
        )?;
        if nearest_neighbour_factor < 1 {
            return Err(ParameterError::OutOfRange {
                field: "nearest neighbour factor",
                value: raw.nearest_neighbour_factor.clone(),
                reason: "must be >= 1",
            });
        }

        let max_iterations = parse_integer("max iterations", &raw.max_iterations)?;
        if max_iterations < 1 || max_iterations > i64::from(u32::MAX) {
            return Err(ParameterError::OutOfRange {
                field: "max iterations",
                value: raw.max_iterations.clone(),
                reason: "must be between 1 and 4294967295",
            });
        }

        let start_index = parse_integer("start index", &raw.start_index)?;
        if start_index < 0 {
            return Err(ParameterError::OutOfRange {
                field: "start index",
                value: raw.start_index.clone(),
                reason: "must be >= 0",
            });
        }

        let time_limit = if raw.time_limit_secs.trim().is_empty() {
            None
        } else {
            let secs = parse_decimal("time limit", &raw.time_limit_secs)?;
            if !(secs > 0.0) || !secs.is_finite() || Duration::try_from_secs_f64(secs).is_err() {
                return Err(ParameterError::OutOfRange {
                    field: "time limit",
                    value: raw.time_limit_secs.clone(),
                    reason: "must be a positive number of seconds",
                });
            }
            Some(Duration::from_secs_f64(secs))
        };

        Ok(Self {
            algorithm: raw.algorithm,
            nearest_neighbour_factor: nearest_neighbour_factor as usize,
            max_iterations: max_iterations as u32,
            start_index: start_index as usize,
            time_limit,
        })
    }

    /// Render this configuration back into form text
    pub fn to_raw(&self) -> RawParameters {
        RawParameters {
            algorithm: self.algorithm,
            nearest_neighbour_factor: self.nearest_neighbour_factor.to_string(),
            max_iterations: self.max_iterations.to_string(),
            start_index: self.start_index.to_string(),
            time_limit_secs: self
                .time_limit
                .map(|limit| limit.as_secs_f64().to_string())
                .unwrap_or_default(),
        }
    }
}

fn parse_integer(field: &'static str, text: &str) -> Result<i64, ParameterError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(ParameterError::Missing { field });
    }
    if !INTEGER_PATTERN.is_match(text) {
        return Err(ParameterError::Malformed {
            field,
            value: text.to_string(),
        });
    }
    text.parse::<i64>().map_err(|_| ParameterError::OutOfRange {
        field,
        value: text.to_string(),
        reason: "too large",
    })
}

fn parse_decimal(field: &'static str, text: &str) -> Result<f64, ParameterError> {
    let text = text.trim();
    if !DECIMAL_PATTERN.is_match(text) {
        return Err(ParameterError::Malformed {
            field,
            value: text.to_string(),
        });
    }
    text.parse::<f64>().map_err(|_| ParameterError::Malformed {
        field,
        value: text.to_string(),
    })
}
