use std::collections::{BTreeSet, HashMap};

use chrono::NaiveDate;

use crate::config::ReconConfig;
use crate::error::ReconError;
use crate::evidence::{Anomaly, AnomalyKind, LogSink};
use crate::identity::Identity;
use crate::matcher::{match_and_diff, MatchOutput};
use crate::model::{
    Benefit, EmploymentRelationship, IncomeEntry, PensionOrSocialSecurity, ReconciliationResult, Salary,
    SalaryMatch,
};
use crate::period::YearMonth;
use crate::resolver::EquivalenceResolver;
use crate::source::{EmploymentSource, IncomeSource, ObservabilitySink, OrganizationSource};

/// Equivalence sets per income month, then per payer.
type EquivalenceSets = HashMap<YearMonth, HashMap<Identity, BTreeSet<Identity>>>;

/// Attributes a subject's salary entries to employment relationships.
///
/// Holds only borrowed collaborators and config; every call to
/// [`Reconciler::reconcile`] starts from scratch.
pub struct Reconciler<'a> {
    employment: &'a dyn EmploymentSource,
    income: &'a dyn IncomeSource,
    organizations: &'a dyn OrganizationSource,
    sink: &'a dyn ObservabilitySink,
    config: ReconConfig,
}

impl<'a> Reconciler<'a> {
    pub fn new(
        employment: &'a dyn EmploymentSource,
        income: &'a dyn IncomeSource,
        organizations: &'a dyn OrganizationSource,
    ) -> Self {
        Self {
            employment,
            income,
            organizations,
            sink: &LogSink,
            config: ReconConfig::default(),
        }
    }

    pub fn with_sink(mut self, sink: &'a dyn ObservabilitySink) -> Self {
        self.sink = sink;
        self
    }

    pub fn with_config(mut self, config: ReconConfig) -> Self {
        self.config = config;
        self
    }

    /// Run reconciliation for `subject` over `[from, to]`.
    ///
    /// Any collaborator failure aborts the whole call with that failure.
    /// Unmatched income and unmatched employment are reported to the sink
    /// and do not affect the result.
    pub fn reconcile(&self, subject: &str, from: NaiveDate, to: NaiveDate) -> Result<ReconciliationResult, ReconError> {
        if from > to {
            return Err(ReconError::rejected("request", format!("from date {from} is after to date {to}")));
        }

        let employment = dedup(self.employment.fetch_employment(subject, from, to)?);
        let income = self.income.fetch_income(subject, from, to)?;
        log::debug!(
            "subject {subject}: {} employment relationship(s), {} income entries",
            employment.len(),
            income.len()
        );

        let (salaries, benefits, pension_or_social_security) = partition_income(income);
        let equivalence = self.resolve_equivalence(&salaries)?;

        let enforce_overlap = self.config.matching.enforce_period_overlap;
        let output = match_and_diff(salaries.iter().cloned(), employment.iter().cloned(), |salary, rel| {
            belongs_together(&equivalence, salary, rel, enforce_overlap)
        });

        let unmatched_employment = output.unmatched_right.clone();
        let salary_matches = reshape(&salaries, output);

        if self.config.anomalies.report {
            self.report(subject, &salary_matches, &unmatched_employment);
        }

        Ok(ReconciliationResult {
            employment_relationships: employment,
            salary_matches,
            benefits,
            pension_or_social_security,
            business_income: Vec::new(),
        })
    }

    /// One equivalence set per (payer, period) present among the salaries.
    fn resolve_equivalence(&self, salaries: &[Salary]) -> Result<EquivalenceSets, ReconError> {
        let mut resolver = EquivalenceResolver::new(self.organizations);
        let mut sets: EquivalenceSets = HashMap::new();

        for salary in salaries {
            let by_payer = sets.entry(salary.period).or_default();
            if by_payer.contains_key(&salary.payer) {
                continue;
            }
            let set = resolver.resolve(&salary.payer, salary.period.first_day())?;
            by_payer.insert(salary.payer.clone(), set);
        }

        log::debug!("resolved {} organization(s)", resolver.lookups());
        Ok(sets)
    }

    fn report(&self, subject: &str, salary_matches: &[SalaryMatch], unmatched_employment: &[EmploymentRelationship]) {
        for m in salary_matches.iter().filter(|m| m.employment_relationships.is_empty()) {
            self.sink.record_anomaly(&Anomaly {
                kind: AnomalyKind::UnmatchedIncome,
                subject: subject.to_string(),
                details: format!(
                    "salary from {} for {} (amount {}) matches no employment relationship",
                    m.income.payer, m.income.period, m.income.amount
                ),
            });
        }

        for rel in unmatched_employment {
            self.sink.record_anomaly(&Anomaly {
                kind: AnomalyKind::UnmatchedEmployment,
                subject: subject.to_string(),
                details: format!("{} has no matching salary", rel.describe()),
            });
        }
    }
}

/// Whether a salary entry may have been paid under `rel`.
///
/// The employer must be in the payer's equivalence set for the income month.
/// With `enforce_overlap`, the relationship must also cover part of that
/// month.
fn belongs_together(
    equivalence: &EquivalenceSets,
    salary: &Salary,
    rel: &EmploymentRelationship,
    enforce_overlap: bool,
) -> bool {
    let equivalent = match equivalence.get(&salary.period).and_then(|m| m.get(&salary.payer)) {
        Some(set) => set.contains(rel.employer()),
        None => salary.payer == *rel.employer(),
    };
    equivalent && (!enforce_overlap || rel.overlaps(salary.period))
}

fn partition_income(income: Vec<IncomeEntry>) -> (Vec<Salary>, Vec<Benefit>, Vec<PensionOrSocialSecurity>) {
    let mut salaries = Vec::new();
    let mut benefits = Vec::new();
    let mut pensions = Vec::new();

    for entry in income {
        match entry {
            IncomeEntry::Salary(s) => salaries.push(s),
            IncomeEntry::Benefit(b) => benefits.push(b),
            IncomeEntry::PensionOrSocialSecurity(p) => pensions.push(p),
        }
    }

    (salaries, benefits, pensions)
}

/// Structurally equal records collapse to their first occurrence. Records
/// that differ in any field are kept apart.
fn dedup(relationships: Vec<EmploymentRelationship>) -> Vec<EmploymentRelationship> {
    let mut out: Vec<EmploymentRelationship> = Vec::with_capacity(relationships.len());
    for rel in relationships {
        if !out.contains(&rel) {
            out.push(rel);
        }
    }
    out
}

/// One entry per salary, in input order. Only the first occurrence of an
/// equal salary value carries its matches; repeats get an empty list.
fn reshape(salaries: &[Salary], output: MatchOutput<Salary, EmploymentRelationship>) -> Vec<SalaryMatch> {
    let mut remaining: Vec<Option<(Salary, Vec<EmploymentRelationship>)>> =
        output.matched.into_iter().map(Some).collect();

    salaries
        .iter()
        .map(|salary| {
            let slot = remaining
                .iter_mut()
                .find(|slot| matches!(slot, Some((key, _)) if key == salary));
            let employment_relationships = slot.and_then(Option::take).map(|(_, rels)| rels).unwrap_or_default();
            SalaryMatch { income: salary.clone(), employment_relationships }
        })
        .collect()
}
