//! Problem identifiers and the typed header record of a problem unit.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::errors::{DataError, EkResult};

/// A (function, dimension) pair identifying one benchmark problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ProblemId {
    pub function: u32,
    pub dimension: u32,
}

impl ProblemId {
    pub fn new(function: u32, dimension: u32) -> Self {
        Self {
            function,
            dimension,
        }
    }
}

impl fmt::Display for ProblemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "f{} in {}-D", self.function, self.dimension)
    }
}

/// Value of a header field that is not one of the recognized keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HeaderValue {
    Int(i64),
    Float(f64),
    Text(String),
}

impl HeaderValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(v) => Some(*v as f64),
            Self::Float(v) => Some(*v),
            Self::Text(s) => s.trim().parse().ok(),
        }
    }

    pub fn as_u32(&self) -> Option<u32> {
        match self {
            Self::Int(v) => u32::try_from(*v).ok(),
            Self::Float(v) if v.fract() == 0.0 && *v >= 0.0 => Some(*v as u32),
            Self::Float(_) => None,
            Self::Text(s) => s.trim().parse().ok(),
        }
    }

    pub fn into_text(self) -> String {
        match self {
            Self::Text(s) => s,
            other => other.to_string(),
        }
    }
}

impl fmt::Display for HeaderValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Text(v) => write!(f, "{v}"),
        }
    }
}

impl From<i64> for HeaderValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for HeaderValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for HeaderValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

/// Descriptive fields of one problem unit (one algorithm on one function in
/// one dimension).
///
/// Recognized keys land in typed fields; anything else is kept in `extra`
/// and takes part in equality.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UnitHeader {
    #[serde(alias = "algId")]
    pub algorithm_id: String,
    #[serde(alias = "funcId")]
    pub function_id: u32,
    #[serde(alias = "dim", alias = "DIM")]
    pub dimension: u32,
    /// Final target offset; absent for bi-objective data.
    #[serde(default)]
    pub precision: Option<f64>,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub fopt: Option<f64>,
    #[serde(default, alias = "targetFuncValue")]
    pub target_func_value: Option<f64>,
    /// Quality indicator name; only bi-objective data carries one.
    #[serde(default)]
    pub indicator: Option<String>,
    #[serde(default)]
    pub folder: Option<String>,
    #[serde(default)]
    pub suite: Option<String>,
    #[serde(default)]
    pub logger: Option<String>,
    #[serde(default)]
    pub coco_version: Option<String>,
    #[serde(default)]
    pub reference_values_hash: Option<String>,
    #[serde(default)]
    pub data_format: Option<String>,
    #[serde(default)]
    pub extra: BTreeMap<String, HeaderValue>,
}

impl UnitHeader {
    pub fn new(algorithm_id: impl Into<String>, function_id: u32, dimension: u32) -> Self {
        Self {
            algorithm_id: algorithm_id.into(),
            function_id,
            dimension,
            ..Self::default()
        }
    }

    pub fn with_precision(mut self, precision: f64) -> Self {
        self.precision = Some(precision);
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.set_comment(&comment.into());
        self
    }

    pub fn with_indicator(mut self, indicator: impl Into<String>) -> Self {
        self.indicator = Some(indicator.into());
        self
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<HeaderValue>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Build a header from already tokenized `key = value` pairs.
    ///
    /// Unknown keys are stored in `extra` with a warning. `function`, `dim`
    /// and `algorithm` (or their legacy spellings) are required.
    pub fn from_pairs<I, K>(pairs: I) -> EkResult<Self>
    where
        I: IntoIterator<Item = (K, HeaderValue)>,
        K: Into<String>,
    {
        let mut header = Self::default();
        let mut seen_function = false;
        let mut seen_dimension = false;
        let mut seen_algorithm = false;

        for (key, value) in pairs {
            let key = key.into();
            match key.as_str() {
                "funcId" | "function" => {
                    header.function_id = value.as_u32().ok_or_else(|| invalid_field(&key, &value))?;
                    seen_function = true;
                }
                "DIM" | "dim" => {
                    header.dimension = value.as_u32().ok_or_else(|| invalid_field(&key, &value))?;
                    seen_dimension = true;
                }
                "algId" | "algorithm" => {
                    header.algorithm_id = value.into_text();
                    seen_algorithm = true;
                }
                "Precision" => {
                    header.precision = Some(value.as_f64().ok_or_else(|| invalid_field(&key, &value))?)
                }
                "Fopt" => header.fopt = Some(value.as_f64().ok_or_else(|| invalid_field(&key, &value))?),
                "targetFuncValue" => {
                    header.target_func_value =
                        Some(value.as_f64().ok_or_else(|| invalid_field(&key, &value))?)
                }
                "indicator" => header.indicator = Some(value.into_text()),
                "folder" => header.folder = Some(value.into_text()),
                "suite" => header.suite = Some(value.into_text()),
                "logger" => header.logger = Some(value.into_text()),
                "coco_version" => header.coco_version = Some(value.into_text()),
                "reference_values_hash" => header.reference_values_hash = Some(value.into_text()),
                "data_format" => header.data_format = Some(value.into_text()),
                _ => {
                    tracing::warn!("{} is an additional attribute", key);
                    header.extra.insert(key, value);
                }
            }
        }

        if !(seen_function && seen_dimension && seen_algorithm) {
            return Err(DataError::InvalidFormat {
                message: format!(
                    "header lacks a compulsory field (function: {seen_function}, dim: {seen_dimension}, algorithm: {seen_algorithm})"
                ),
            }
            .into());
        }
        Ok(header)
    }

    /// Store a comment line; only lines starting with `%` are kept.
    pub fn set_comment(&mut self, line: &str) {
        if line.starts_with('%') {
            self.comment = line.trim().to_string();
        } else {
            if !line.is_empty() {
                tracing::warn!("Comment line {:?} is skipped, it does not start with %", line);
            }
            self.comment = String::new();
        }
    }

    pub fn is_biobjective(&self) -> bool {
        self.indicator.is_some()
    }

    pub fn problem_id(&self) -> ProblemId {
        ProblemId::new(self.function_id, self.dimension)
    }

    /// Data format name, defaulting to the bi-objective format when an
    /// indicator is present.
    pub fn data_format(&self) -> Option<&str> {
        match &self.data_format {
            Some(format) => Some(format.as_str()),
            None if self.is_biobjective() => Some("bbob-biobj"),
            None => None,
        }
    }
}

fn invalid_field(key: &str, value: &HeaderValue) -> crate::errors::EkError {
    DataError::InvalidFormat {
        message: format!("header field {key} has unusable value {value}"),
    }
    .into()
}

impl PartialEq for UnitHeader {
    fn eq(&self, other: &Self) -> bool {
        self.function_id == other.function_id
            && self.dimension == other.dimension
            && (self.is_biobjective() || self.precision == other.precision)
            && self.algorithm_id == other.algorithm_id
            && self.comment == other.comment
            && self.extra == other.extra
    }
}

impl fmt::Display for UnitHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} on f{} {}-D",
            self.algorithm_id, self.function_id, self.dimension
        )?;
        for (key, value) in &self.extra {
            write!(f, ", {key} = {value}")?;
        }
        Ok(())
    }
}
