use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Value substituted when a feature's indicator is unavailable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureDefault {
    Constant(f64),
    /// The latest close of the window being featurized.
    CurrentPrice,
}

impl FeatureDefault {
    pub fn resolve(&self, current_price: f64) -> f64 {
        match self {
            FeatureDefault::Constant(v) => *v,
            FeatureDefault::CurrentPrice => current_price,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureSpec {
    pub name: String,
    pub default: FeatureDefault,
}

impl FeatureSpec {
    pub fn new(name: impl Into<String>, default: FeatureDefault) -> Self {
        Self { name: name.into(), default }
    }
}

/// Ordered, duplicate-free list of features.
#[derive(Debug, Clone)]
pub struct FeatureSchema {
    specs: Vec<FeatureSpec>,
    names: Arc<[String]>,
}

impl FeatureSchema {
    pub fn new(specs: Vec<FeatureSpec>) -> Result<Self> {
        if specs.is_empty() {
            return Err(Error::Config("feature schema is empty".into()));
        }
        let mut seen = HashSet::new();
        for spec in &specs {
            if !seen.insert(spec.name.as_str()) {
                return Err(Error::Config(format!(
                    "feature '{}' appears twice in the schema",
                    spec.name
                )));
            }
        }
        let names: Arc<[String]> = specs.iter().map(|s| s.name.clone()).collect();
        Ok(Self { specs, names })
    }

    pub fn specs(&self) -> &[FeatureSpec] {
        &self.specs
    }

    pub fn names(&self) -> &Arc<[String]> {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }
}

/// Numeric features in schema order. Carries the schema's names so vectors
/// built against different schemas are never confused.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    names: Arc<[String]>,
    values: Vec<f64>,
}

impl FeatureVector {
    pub fn new(names: Arc<[String]>, values: Vec<f64>) -> Result<Self> {
        if names.len() != values.len() {
            return Err(Error::SchemaMismatch {
                expected: format!("{} values", names.len()),
                actual: format!("{} values", values.len()),
            });
        }
        Ok(Self { names, values })
    }

    pub fn names(&self) -> &Arc<[String]> {
        &self.names
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| self.values[i])
    }

    /// True when both vectors were built from the same ordered feature list.
    pub fn same_schema(&self, names: &[String]) -> bool {
        *self.names == *names
    }

    /// Fail with `SchemaMismatch` unless the vector matches `expected`.
    pub fn ensure_schema(&self, expected: &[String]) -> Result<()> {
        if self.same_schema(expected) {
            Ok(())
        } else {
            Err(Error::schema_mismatch(expected, &self.names))
        }
    }
}
