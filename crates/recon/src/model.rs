use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::identity::Identity;
use crate::period::{self, YearMonth};

// ---------------------------------------------------------------------------
// Employment
// ---------------------------------------------------------------------------

/// One working-time agreement inside an employee relationship.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorkAgreement {
    #[serde(default)]
    pub occupation_code: Option<String>,
    /// Position percentage, e.g. `100` or `62.5`.
    #[serde(default)]
    pub position_percent: Option<Decimal>,
    pub valid_from: NaiveDate,
    #[serde(default)]
    pub valid_to: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Leave {
    pub reason: String,
    #[serde(default)]
    pub percent: Option<Decimal>,
    pub start_date: NaiveDate,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
}

/// A subject's employment with one employer. `end_date`, when set, is never
/// before `start_date`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EmploymentRelationship {
    Employee {
        employer: Identity,
        start_date: NaiveDate,
        #[serde(default)]
        end_date: Option<NaiveDate>,
        contract_id: String,
        #[serde(default)]
        agreements: Vec<WorkAgreement>,
        #[serde(default)]
        leaves_of_absence: Vec<Leave>,
    },
    Freelancer {
        employer: Identity,
        start_date: NaiveDate,
        #[serde(default)]
        end_date: Option<NaiveDate>,
        occupation: String,
    },
}

impl EmploymentRelationship {
    pub fn employer(&self) -> &Identity {
        match self {
            Self::Employee { employer, .. } | Self::Freelancer { employer, .. } => employer,
        }
    }

    pub fn start_date(&self) -> NaiveDate {
        match self {
            Self::Employee { start_date, .. } | Self::Freelancer { start_date, .. } => *start_date,
        }
    }

    pub fn end_date(&self) -> Option<NaiveDate> {
        match self {
            Self::Employee { end_date, .. } | Self::Freelancer { end_date, .. } => *end_date,
        }
    }

    pub fn overlaps(&self, period: YearMonth) -> bool {
        period::overlaps_month(self.start_date(), self.end_date(), period)
    }

    pub fn overlaps_range(&self, from: NaiveDate, to: NaiveDate) -> bool {
        period::overlaps_range(self.start_date(), self.end_date(), from, to)
    }

    /// Short human label used in anomaly details.
    pub fn describe(&self) -> String {
        let end = self.end_date().map(|d| d.to_string()).unwrap_or_else(|| "open".into());
        match self {
            Self::Employee { contract_id, .. } => format!(
                "employee of {} ({} to {end}, contract {contract_id})",
                self.employer(),
                self.start_date()
            ),
            Self::Freelancer { occupation, .. } => format!(
                "freelancer for {} ({} to {end}, {occupation})",
                self.employer(),
                self.start_date()
            ),
        }
    }
}

// ---------------------------------------------------------------------------
// Income
// ---------------------------------------------------------------------------

/// Salary entry. The only income category matched against employment.
///
/// Negative amounts are corrections and are kept as-is.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Salary {
    pub payer: Identity,
    pub period: YearMonth,
    pub amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Benefit {
    pub payer: Identity,
    pub period: YearMonth,
    pub amount: Decimal,
    pub scheme: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PensionOrSocialSecurity {
    pub payer: Identity,
    pub period: YearMonth,
    pub amount: Decimal,
    pub scheme: String,
}

/// Reserved category. No known income source produces it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BusinessIncome {
    pub payer: Identity,
    pub period: YearMonth,
    pub amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "category", rename_all = "snake_case")]
pub enum IncomeEntry {
    Salary(Salary),
    Benefit(Benefit),
    PensionOrSocialSecurity(PensionOrSocialSecurity),
}

impl IncomeEntry {
    pub fn payer(&self) -> &Identity {
        match self {
            Self::Salary(s) => &s.payer,
            Self::Benefit(b) => &b.payer,
            Self::PensionOrSocialSecurity(p) => &p.payer,
        }
    }

    pub fn period(&self) -> YearMonth {
        match self {
            Self::Salary(s) => s.period,
            Self::Benefit(b) => b.period,
            Self::PensionOrSocialSecurity(p) => p.period,
        }
    }

    pub fn amount(&self) -> Decimal {
        match self {
            Self::Salary(s) => s.amount,
            Self::Benefit(b) => b.amount,
            Self::PensionOrSocialSecurity(p) => p.amount,
        }
    }
}

// ---------------------------------------------------------------------------
// Organization hierarchy
// ---------------------------------------------------------------------------

/// Business unit -> legal entity membership, valid over a date range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegalEntityLink {
    pub legal_entity_number: String,
    pub valid_from: NaiveDate,
    #[serde(default)]
    pub valid_to: Option<NaiveDate>,
}

impl LegalEntityLink {
    pub fn is_active_at(&self, at: NaiveDate) -> bool {
        period::active_at(self.valid_from, self.valid_to, at)
    }
}

/// Legal entity -> operated business unit, valid over a date range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessUnitLink {
    pub business_unit_number: String,
    pub valid_from: NaiveDate,
    #[serde(default)]
    pub valid_to: Option<NaiveDate>,
}

impl BusinessUnitLink {
    pub fn is_active_at(&self, at: NaiveDate) -> bool {
        period::active_at(self.valid_from, self.valid_to, at)
    }
}

/// A resolved organization number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OrganizationRecord {
    BusinessUnit {
        number: String,
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        member_of: Vec<LegalEntityLink>,
    },
    LegalEntity {
        number: String,
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        operates: Vec<BusinessUnitLink>,
    },
}

impl OrganizationRecord {
    pub fn number(&self) -> &str {
        match self {
            Self::BusinessUnit { number, .. } | Self::LegalEntity { number, .. } => number,
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            Self::BusinessUnit { name, .. } | Self::LegalEntity { name, .. } => name.as_deref(),
        }
    }

    /// Organization numbers linked to this one at `at`, in link order.
    pub fn linked_numbers_at(&self, at: NaiveDate) -> Vec<&str> {
        match self {
            Self::BusinessUnit { member_of, .. } => member_of
                .iter()
                .filter(|l| l.is_active_at(at))
                .map(|l| l.legal_entity_number.as_str())
                .collect(),
            Self::LegalEntity { operates, .. } => operates
                .iter()
                .filter(|l| l.is_active_at(at))
                .map(|l| l.business_unit_number.as_str())
                .collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// One salary entry with every employment relationship it is consistent
/// with. An empty list means no match; more than one means ambiguity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalaryMatch {
    pub income: Salary,
    pub employment_relationships: Vec<EmploymentRelationship>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReconciliationResult {
    pub employment_relationships: Vec<EmploymentRelationship>,
    pub salary_matches: Vec<SalaryMatch>,
    pub benefits: Vec<Benefit>,
    pub pension_or_social_security: Vec<PensionOrSocialSecurity>,
    pub business_income: Vec<BusinessIncome>,
}

impl ReconciliationResult {
    pub fn summary(&self) -> ReconSummary {
        crate::evidence::compute_summary(self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ReconSummary {
    pub salary_entries: usize,
    pub matched_salary_entries: usize,
    pub unmatched_salary_entries: usize,
    pub ambiguous_salary_entries: usize,
    pub employment_relationships: usize,
    pub unmatched_employment_relationships: usize,
    pub benefits: usize,
    pub pension_or_social_security: usize,
}
