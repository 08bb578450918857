//! Engine tunables.
//!
//! Every field has a default, so a config file only needs the values it
//! overrides. Tier confidences are not configurable; they are part of the
//! resolution contract (see `MatchTier::confidence`).

use crate::error::{MethodscopeError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    pub build: BuildConfig,
    pub resolver: ResolverConfig,
}

impl EngineConfig {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.build.inheritance.validate()?;
        self.build.clustering.validate()?;
        self.resolver.validate()
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct BuildConfig {
    pub inheritance: InheritanceConfig,
    pub clustering: ClusterConfig,
}

/// Heuristic INHERITS inference for classes whose supertypes are unknown.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct InheritanceConfig {
    pub enabled: bool,
    /// Fraction of the parent's method names the child must share.
    pub min_overlap: f64,
    /// Parents with fewer shared method names are never considered.
    pub min_shared_methods: usize,
    /// Added to the overlap when the parent's short name is a proper
    /// prefix of the child's (`HybridShape` → `HybridShapeSpline`).
    pub prefix_bonus: f64,
}

impl Default for InheritanceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            min_overlap: 0.6,
            min_shared_methods: 2,
            prefix_bonus: 0.2,
        }
    }
}

impl InheritanceConfig {
    fn validate(&self) -> Result<()> {
        check_unit("build.inheritance.min_overlap", self.min_overlap)?;
        check_unit("build.inheritance.prefix_bonus", self.prefix_bonus)?;
        if self.min_shared_methods == 0 {
            return Err(MethodscopeError::InvalidConfig(
                "build.inheritance.min_shared_methods must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Unsupervised grouping of classes into CLUSTER neighborhoods.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ClusterConfig {
    /// Minimum Jaccard similarity to join an existing cluster.
    pub similarity_threshold: f64,
    pub max_clusters: usize,
    /// Treat the class domain as one more feature token.
    pub include_domain: bool,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: 0.35,
            max_clusters: 64,
            include_domain: true,
        }
    }
}

impl ClusterConfig {
    fn validate(&self) -> Result<()> {
        check_unit("build.clustering.similarity_threshold", self.similarity_threshold)?;
        if self.max_clusters == 0 {
            return Err(MethodscopeError::InvalidConfig(
                "build.clustering.max_clusters must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ResolverConfig {
    /// Bound on INHERITS traversal from a receiver class.
    pub max_ancestor_depth: usize,
    /// Candidates reported per call-site; the match itself is always kept.
    pub max_candidates: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            max_ancestor_depth: 32,
            max_candidates: 16,
        }
    }
}

impl ResolverConfig {
    fn validate(&self) -> Result<()> {
        if self.max_ancestor_depth == 0 || self.max_candidates == 0 {
            return Err(MethodscopeError::InvalidConfig(
                "resolver bounds must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

fn check_unit(field: &str, value: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&value) {
        return Err(MethodscopeError::InvalidConfig(format!(
            "{} must be within [0, 1], got {}",
            field, value
        )));
    }
    Ok(())
}
