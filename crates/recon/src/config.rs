use serde::Deserialize;

use crate::error::ReconError;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReconConfig {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default)]
    pub matching: MatchingConfig,
    #[serde(default)]
    pub anomalies: AnomalyConfig,
    #[serde(default)]
    pub sources: Option<SourcesConfig>,
}

fn default_name() -> String {
    "reconcile".into()
}

impl Default for ReconConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            matching: MatchingConfig::default(),
            anomalies: AnomalyConfig::default(),
            sources: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Matching + Anomalies
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MatchingConfig {
    /// Require the employment relationship to cover part of the income
    /// month. When off, identity equivalence alone decides.
    #[serde(default = "default_true")]
    pub enforce_period_overlap: bool,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self { enforce_period_overlap: true }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnomalyConfig {
    #[serde(default = "default_true")]
    pub report: bool,
}

impl Default for AnomalyConfig {
    fn default() -> Self {
        Self { report: true }
    }
}

fn default_true() -> bool {
    true
}

// ---------------------------------------------------------------------------
// Sources
// ---------------------------------------------------------------------------

/// Recorded upstream data, as paths relative to the config file.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourcesConfig {
    /// JSON array of employment records.
    pub employment: String,
    /// CSV of income entries.
    pub income: String,
    /// JSON array of organization records.
    pub organizations: String,
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl ReconConfig {
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let config: ReconConfig = toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        if self.name.trim().is_empty() {
            return Err(ReconError::ConfigValidation("name must not be empty".into()));
        }

        if let Some(ref sources) = self.sources {
            for (key, path) in [
                ("employment", &sources.employment),
                ("income", &sources.income),
                ("organizations", &sources.organizations),
            ] {
                if path.trim().is_empty() {
                    return Err(ReconError::ConfigValidation(format!("sources.{key} must not be empty")));
                }
            }
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
