//! Collaborators the engine reads from and reports to.
//!
//! Implementations own their transport, retries and payload mapping. The
//! engine only sees domain types and [`ReconError`].

use chrono::NaiveDate;

use crate::error::ReconError;
use crate::evidence::Anomaly;
use crate::model::{EmploymentRelationship, IncomeEntry, OrganizationRecord};

pub trait EmploymentSource {
    fn fetch_employment(
        &self,
        subject: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<EmploymentRelationship>, ReconError>;
}

pub trait IncomeSource {
    fn fetch_income(&self, subject: &str, from: NaiveDate, to: NaiveDate) -> Result<Vec<IncomeEntry>, ReconError>;
}

pub trait OrganizationSource {
    fn resolve_organization(&self, number: &str) -> Result<OrganizationRecord, ReconError>;
}

/// Receives data-quality observations. Must not block and cannot fail.
pub trait ObservabilitySink {
    fn record_anomaly(&self, anomaly: &Anomaly);
}
