use std::sync::Mutex;

use serde::Serialize;

use crate::model::{ReconSummary, ReconciliationResult};
use crate::source::ObservabilitySink;

// ---------------------------------------------------------------------------
// Anomalies
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyKind {
    /// A salary entry consistent with no employment relationship.
    UnmatchedIncome,
    /// An employment relationship no salary entry was attributed to.
    UnmatchedEmployment,
}

impl std::fmt::Display for AnomalyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnmatchedIncome => write!(f, "unmatched_income"),
            Self::UnmatchedEmployment => write!(f, "unmatched_employment"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Anomaly {
    pub kind: AnomalyKind,
    pub subject: String,
    pub details: String,
}

// ---------------------------------------------------------------------------
// Sinks
// ---------------------------------------------------------------------------

/// Emits each anomaly as a `warn` log line.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl ObservabilitySink for LogSink {
    fn record_anomaly(&self, anomaly: &Anomaly) {
        log::warn!(
            target: "emplink::anomaly",
            "{} for subject {}: {}",
            anomaly.kind,
            anomaly.subject,
            anomaly.details
        );
    }
}

/// Keeps anomalies in memory, in the order they were recorded.
#[derive(Debug, Default)]
pub struct CollectingSink {
    anomalies: Mutex<Vec<Anomaly>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything recorded so far.
    pub fn anomalies(&self) -> Vec<Anomaly> {
        self.anomalies.lock().map(|a| a.clone()).unwrap_or_default()
    }

    pub fn count(&self, kind: AnomalyKind) -> usize {
        self.anomalies
            .lock()
            .map(|a| a.iter().filter(|x| x.kind == kind).count())
            .unwrap_or(0)
    }
}

impl ObservabilitySink for CollectingSink {
    fn record_anomaly(&self, anomaly: &Anomaly) {
        // A poisoned lock drops the observation.
        if let Ok(mut anomalies) = self.anomalies.lock() {
            anomalies.push(anomaly.clone());
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl ObservabilitySink for NullSink {
    fn record_anomaly(&self, _anomaly: &Anomaly) {}
}

/// Fans one observation out to several sinks.
pub struct TeeSink<'a> {
    sinks: Vec<&'a dyn ObservabilitySink>,
}

impl<'a> TeeSink<'a> {
    pub fn new(sinks: Vec<&'a dyn ObservabilitySink>) -> Self {
        Self { sinks }
    }
}

impl ObservabilitySink for TeeSink<'_> {
    fn record_anomaly(&self, anomaly: &Anomaly) {
        for sink in &self.sinks {
            sink.record_anomaly(anomaly);
        }
    }
}

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

/// Compute summary statistics from a reconciliation result.
pub fn compute_summary(result: &ReconciliationResult) -> ReconSummary {
    let mut matched = 0;
    let mut ambiguous = 0;

    for m in &result.salary_matches {
        match m.employment_relationships.len() {
            0 => {}
            1 => matched += 1,
            _ => {
                matched += 1;
                ambiguous += 1;
            }
        }
    }

    let unmatched_employment = result
        .employment_relationships
        .iter()
        .filter(|rel| {
            !result
                .salary_matches
                .iter()
                .any(|m| m.employment_relationships.contains(rel))
        })
        .count();

    ReconSummary {
        salary_entries: result.salary_matches.len(),
        matched_salary_entries: matched,
        unmatched_salary_entries: result.salary_matches.len() - matched,
        ambiguous_salary_entries: ambiguous,
        employment_relationships: result.employment_relationships.len(),
        unmatched_employment_relationships: unmatched_employment,
        benefits: result.benefits.len(),
        pension_or_social_security: result.pension_or_social_security.len(),
    }
}
