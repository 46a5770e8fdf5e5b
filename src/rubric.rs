#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Weighted grading rubric.
//!
//! A rubric is a set of named dimensions (at least `code` and `content`), each
//! with a weight, a maximum score, and weighted sub-criteria. Every rubric is
//! validated when it is constructed, so a [`Rubric`] value in hand always
//! satisfies the weight invariants.

use std::{collections::BTreeMap, path::Path};

use serde::{Deserialize, Serialize};

use crate::{
    constants::WEIGHT_SUM_TOLERANCE,
    error::GradingError,
    types::round_score,
};

/// Dimensions every rubric must define.
pub const REQUIRED_DIMENSIONS: [&str; 2] = ["code", "content"];

/// A weighted sub-score within a dimension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Criterion {
    /// Share of the dimension this criterion accounts for.
    pub weight:    f64,
    /// Maximum raw score of the criterion.
    #[serde(default = "default_max_score")]
    pub max_score: f64,
}

/// Default criterion maximum.
fn default_max_score() -> f64 {
    100.0
}

impl Criterion {
    /// Creates a criterion out of 100.
    pub fn new(weight: f64) -> Self {
        Self {
            weight,
            max_score: 100.0,
        }
    }
}

/// A top-level rubric category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dimension {
    /// Share of the final grade.
    pub weight:              f64,
    /// Maximum score of the dimension.
    pub max_score:           f64,
    /// Named sub-criteria.
    #[serde(default)]
    pub criteria:            BTreeMap<String, Criterion>,
    /// Concepts a content submission is expected to mention.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub concepts:            Vec<String>,
    /// Learning objectives matched against content submissions.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub learning_objectives: Vec<String>,
    /// Section names a content submission should contain.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required_sections:   Vec<String>,
}

impl Dimension {
    /// Creates a dimension from its weight, maximum, and criteria.
    pub fn new<I, S>(weight: f64, max_score: f64, criteria: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        Self {
            weight,
            max_score,
            criteria: criteria
                .into_iter()
                .map(|(name, w)| (name.into(), Criterion::new(w)))
                .collect(),
            concepts: Vec::new(),
            learning_objectives: Vec::new(),
            required_sections: Vec::new(),
        }
    }

    /// Returns the weight of each criterion by name.
    pub fn criterion_weights(&self) -> BTreeMap<String, f64> {
        self.criteria
            .iter()
            .map(|(name, criterion)| (name.clone(), criterion.weight))
            .collect()
    }
}

/// Unvalidated rubric document, as read from JSON.
#[derive(Debug, Clone, Deserialize)]
struct RubricDocument {
    /// Rubric display name.
    #[serde(default = "default_name")]
    name:       String,
    /// Rubric version string.
    #[serde(default = "default_version")]
    version:    String,
    /// Dimensions by name.
    dimensions: BTreeMap<String, Dimension>,
}

/// Default rubric name.
fn default_name() -> String {
    "Standard Rubric".to_string()
}

/// Default rubric version.
fn default_version() -> String {
    "1.0".to_string()
}

/// A validated rubric. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RubricDocument")]
pub struct Rubric {
    /// Rubric display name.
    name:       String,
    /// Rubric version string.
    version:    String,
    /// Dimensions by name.
    dimensions: BTreeMap<String, Dimension>,
}

impl TryFrom<RubricDocument> for Rubric {
    type Error = GradingError;

    fn try_from(doc: RubricDocument) -> Result<Self, Self::Error> {
        Rubric::new(doc.name, doc.version, doc.dimensions)
    }
}

impl Default for Rubric {
    /// Code weighted 0.6 (approach 0.4, readability/structure/effort 0.2
    /// each) and content weighted 0.4 (coverage 0.35, alignment 0.25,
    /// flow/completeness 0.2 each).
    fn default() -> Self {
        let dimensions = BTreeMap::from([
            (
                "code".to_string(),
                Dimension::new(
                    0.6,
                    100.0,
                    [("approach", 0.4), ("readability", 0.2), ("structure", 0.2), ("effort", 0.2)],
                ),
            ),
            (
                "content".to_string(),
                Dimension::new(
                    0.4,
                    100.0,
                    [
                        ("coverage", 0.35),
                        ("alignment", 0.25),
                        ("flow", 0.2),
                        ("completeness", 0.2),
                    ],
                ),
            ),
        ]);

        Self {
            name: default_name(),
            version: default_version(),
            dimensions,
        }
    }
}

impl Rubric {
    /// Builds a rubric, failing with [`GradingError::Configuration`] if it is
    /// missing a required dimension, a weight lies outside `[0, 1]`, a
    /// maximum score is not positive, or the dimension weights do not sum to
    /// 1.0 within tolerance.
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        dimensions: BTreeMap<String, Dimension>,
    ) -> Result<Self, GradingError> {
        let rubric = Self {
            name: name.into(),
            version: version.into(),
            dimensions,
        };
        rubric.validate()?;
        Ok(rubric)
    }

    /// Parses and validates a rubric from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self, GradingError> {
        let doc: RubricDocument = serde_json::from_str(json)?;
        Rubric::try_from(doc)
    }

    /// Reads, parses, and validates a rubric JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, GradingError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| GradingError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Serializes the rubric as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, GradingError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Checks the rubric invariants.
    fn validate(&self) -> Result<(), GradingError> {
        let missing: Vec<&str> = REQUIRED_DIMENSIONS
            .iter()
            .copied()
            .filter(|name| !self.dimensions.contains_key(*name))
            .collect();
        if !missing.is_empty() {
            return Err(GradingError::Configuration(format!(
                "rubric missing required dimensions: {}",
                missing.join(", ")
            )));
        }

        let mut total_weight = 0.0;
        for (name, dimension) in &self.dimensions {
            if !(0.0..=1.0).contains(&dimension.weight) {
                return Err(GradingError::Configuration(format!(
                    "dimension `{name}` weight must be between 0 and 1, got {}",
                    dimension.weight
                )));
            }
            if dimension.max_score.is_nan() || dimension.max_score <= 0.0 {
                return Err(GradingError::Configuration(format!(
                    "dimension `{name}` max_score must be positive, got {}",
                    dimension.max_score
                )));
            }
            total_weight += dimension.weight;
        }

        if (total_weight - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(GradingError::Configuration(format!(
                "dimension weights must sum to 1.0, got {total_weight}"
            )));
        }

        Ok(())
    }

    /// Returns the rubric name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the rubric version.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Returns all dimensions by name.
    pub fn dimensions(&self) -> &BTreeMap<String, Dimension> {
        &self.dimensions
    }

    /// Returns one dimension.
    pub fn dimension(&self, name: &str) -> Result<&Dimension, GradingError> {
        self.dimensions
            .get(name)
            .ok_or_else(|| GradingError::UnknownDimension(name.to_string()))
    }

    /// Returns the weight of a dimension.
    pub fn weight(&self, name: &str) -> Result<f64, GradingError> {
        Ok(self.dimension(name)?.weight)
    }

    /// Returns the maximum score of a dimension.
    pub fn max_score(&self, name: &str) -> Result<f64, GradingError> {
        Ok(self.dimension(name)?.max_score)
    }

    /// Returns the criteria of a dimension.
    pub fn criteria(&self, name: &str) -> Result<&BTreeMap<String, Criterion>, GradingError> {
        Ok(&self.dimension(name)?.criteria)
    }

    /// Returns the criterion weights of a dimension by criterion name.
    pub fn criterion_weights(&self, name: &str) -> Result<BTreeMap<String, f64>, GradingError> {
        Ok(self.dimension(name)?.criterion_weights())
    }

    /// Returns every dimension weight by name.
    pub fn weights(&self) -> BTreeMap<String, f64> {
        self.dimensions
            .iter()
            .map(|(name, dim)| (name.clone(), dim.weight))
            .collect()
    }

    /// Returns every dimension maximum by name.
    pub fn max_scores(&self) -> BTreeMap<String, f64> {
        self.dimensions
            .iter()
            .map(|(name, dim)| (name.clone(), dim.max_score))
            .collect()
    }

    /// Sum of each dimension's maximum score times its weight, rounded to two
    /// decimals.
    pub fn total_max_score(&self) -> f64 {
        round_score(
            self.dimensions
                .values()
                .map(|dim| dim.max_score * dim.weight)
                .sum(),
        )
    }
}
