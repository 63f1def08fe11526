//! Sources backed by recorded upstream data on disk.
//!
//! Employment and organization records are JSON arrays; income is CSV with
//! the header `subject,category,payer,period,amount,scheme`.

use std::path::Path;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::SourcesConfig;
use crate::error::ReconError;
use crate::identity::Identity;
use crate::model::{
    Benefit, EmploymentRelationship, IncomeEntry, OrganizationRecord, PensionOrSocialSecurity, Salary,
};
use crate::period::YearMonth;
use crate::source::{EmploymentSource, IncomeSource, OrganizationSource};

/// An employment relationship tagged with the subject it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmploymentRecord {
    pub subject: String,
    #[serde(flatten)]
    pub relationship: EmploymentRelationship,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IncomeRow {
    pub subject: String,
    pub entry: IncomeEntry,
}

const INCOME_COLUMNS: [&str; 6] = ["subject", "category", "payer", "period", "amount", "scheme"];

/// Load income rows from CSV. `file` is only used in error messages.
pub fn load_income_csv(file: &str, csv_data: &str) -> Result<Vec<IncomeRow>, ReconError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(csv_data.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| ReconError::Io(e.to_string()))?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut idx = [0usize; 6];
    for (slot, name) in idx.iter_mut().zip(INCOME_COLUMNS) {
        *slot = headers.iter().position(|h| h == name).ok_or_else(|| ReconError::Parse {
            file: file.into(),
            line: 1,
            message: format!("missing column '{name}'"),
        })?;
    }
    let [subject_idx, category_idx, payer_idx, period_idx, amount_idx, scheme_idx] = idx;

    let mut rows = Vec::new();

    for record in reader.records() {
        let record = record.map_err(|e| csv_err(file, e))?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        let parse_err = |message: String| ReconError::Parse { file: file.into(), line, message };

        let field = |i: usize| record.get(i).unwrap_or("");

        let subject = field(subject_idx).to_string();
        if subject.is_empty() {
            return Err(parse_err("empty subject".into()));
        }
        let payer = Identity::from_str(field(payer_idx)).map_err(&parse_err)?;
        let period = YearMonth::from_str(field(period_idx)).map_err(&parse_err)?;
        let amount_str = field(amount_idx);
        let amount = Decimal::from_str(amount_str)
            .map_err(|_| parse_err(format!("cannot parse amount '{amount_str}'")))?;
        let scheme = field(scheme_idx).to_string();

        let entry = match field(category_idx) {
            "salary" => IncomeEntry::Salary(Salary { payer, period, amount }),
            "benefit" | "pension" if scheme.is_empty() => {
                return Err(parse_err(format!("category '{}' requires a scheme", field(category_idx))));
            }
            "benefit" => IncomeEntry::Benefit(Benefit { payer, period, amount, scheme }),
            "pension" => IncomeEntry::PensionOrSocialSecurity(PensionOrSocialSecurity { payer, period, amount, scheme }),
            other => return Err(parse_err(format!("unknown category '{other}'"))),
        };

        rows.push(IncomeRow { subject, entry });
    }

    Ok(rows)
}

pub fn load_employment_json(file: &str, json: &str) -> Result<Vec<EmploymentRecord>, ReconError> {
    let records: Vec<EmploymentRecord> = serde_json::from_str(json).map_err(|e| json_err(file, &e))?;
    for record in &records {
        if let Some(end) = record.relationship.end_date() {
            if end < record.relationship.start_date() {
                return Err(ReconError::Parse {
                    file: file.into(),
                    line: 0,
                    message: format!("{} ends before it starts", record.relationship.describe()),
                });
            }
        }
    }
    Ok(records)
}

pub fn load_organizations_json(file: &str, json: &str) -> Result<Vec<OrganizationRecord>, ReconError> {
    serde_json::from_str(json).map_err(|e| json_err(file, &e))
}

fn csv_err(file: &str, e: csv::Error) -> ReconError {
    if e.is_io_error() {
        return ReconError::Io(e.to_string());
    }
    let line = e.position().map(|p| p.line()).unwrap_or(0);
    let message = match e.kind() {
        csv::ErrorKind::UnequalLengths { expected_len, len, .. } => {
            format!("expected {expected_len} fields, found {len}")
        }
        _ => e.to_string(),
    };
    ReconError::Parse { file: file.into(), line, message }
}

fn json_err(file: &str, e: &serde_json::Error) -> ReconError {
    ReconError::Parse { file: file.into(), line: e.line() as u64, message: e.to_string() }
}

// ---------------------------------------------------------------------------
// FileSources
// ---------------------------------------------------------------------------

/// All three collaborators over in-memory copies of recorded data.
#[derive(Debug, Clone, Default)]
pub struct FileSources {
    pub employment: Vec<EmploymentRecord>,
    pub income: Vec<IncomeRow>,
    pub organizations: Vec<OrganizationRecord>,
}

impl FileSources {
    /// Load every file named in `sources`, resolving paths against `base_dir`.
    pub fn load(base_dir: &Path, sources: &SourcesConfig) -> Result<Self, ReconError> {
        let read = |name: &str| -> Result<String, ReconError> {
            let path = base_dir.join(name);
            std::fs::read_to_string(&path).map_err(|e| ReconError::Io(format!("cannot read {}: {e}", path.display())))
        };

        Ok(Self {
            employment: load_employment_json(&sources.employment, &read(&sources.employment)?)?,
            income: load_income_csv(&sources.income, &read(&sources.income)?)?,
            organizations: load_organizations_json(&sources.organizations, &read(&sources.organizations)?)?,
        })
    }
}

impl EmploymentSource for FileSources {
    fn fetch_employment(
        &self,
        subject: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<EmploymentRelationship>, ReconError> {
        Ok(self
            .employment
            .iter()
            .filter(|r| r.subject == subject && r.relationship.overlaps_range(from, to))
            .map(|r| r.relationship.clone())
            .collect())
    }
}

impl IncomeSource for FileSources {
    fn fetch_income(&self, subject: &str, from: NaiveDate, to: NaiveDate) -> Result<Vec<IncomeEntry>, ReconError> {
        let (first, last) = (YearMonth::of(from), YearMonth::of(to));
        Ok(self
            .income
            .iter()
            .filter(|r| r.subject == subject && (first..=last).contains(&r.entry.period()))
            .map(|r| r.entry.clone())
            .collect())
    }
}

impl OrganizationSource for FileSources {
    fn resolve_organization(&self, number: &str) -> Result<OrganizationRecord, ReconError> {
        self.organizations
            .iter()
            .find(|r| r.number() == number)
            .cloned()
            .ok_or_else(|| ReconError::not_found("organizations", format!("no organization {number}")))
    }
}
