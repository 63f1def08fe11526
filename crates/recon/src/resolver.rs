use std::collections::{BTreeSet, HashMap};

use chrono::NaiveDate;

use crate::error::ReconError;
use crate::identity::Identity;
use crate::model::OrganizationRecord;
use crate::source::OrganizationSource;

/// Resolves the identities a payer counts as for matching.
///
/// One resolver serves a single reconciliation. Each organization number is
/// fetched from the source at most once during that lifetime; nothing
/// outlives it.
pub struct EquivalenceResolver<'a> {
    source: &'a dyn OrganizationSource,
    records: HashMap<String, OrganizationRecord>,
}

impl<'a> EquivalenceResolver<'a> {
    pub fn new(source: &'a dyn OrganizationSource) -> Self {
        Self { source, records: HashMap::new() }
    }

    /// Equivalence set of `payer` at `at`: the payer itself plus every
    /// organization linked to it by a link active on that date.
    ///
    /// Persons have no hierarchy and resolve to themselves. A failed lookup
    /// is returned unchanged.
    pub fn resolve(&mut self, payer: &Identity, at: NaiveDate) -> Result<BTreeSet<Identity>, ReconError> {
        let mut set = BTreeSet::from([payer.clone()]);

        let Identity::Organization(number) = payer else {
            return Ok(set);
        };

        let record = self.record(number)?;
        set.extend(record.linked_numbers_at(at).into_iter().map(Identity::organization));
        Ok(set)
    }

    /// Number of distinct organizations fetched so far.
    pub fn lookups(&self) -> usize {
        self.records.len()
    }

    fn record(&mut self, number: &str) -> Result<&OrganizationRecord, ReconError> {
        if !self.records.contains_key(number) {
            log::debug!("resolving organization {number}");
            let record = self.source.resolve_organization(number)?;
            self.records.insert(number.to_string(), record);
        }
        self.records
            .get(number)
            .ok_or_else(|| ReconError::unknown("organizations", format!("{number} missing after lookup")))
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::model::{BusinessUnitLink, LegalEntityLink};

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    struct FakeOrganizations {
        records: Vec<OrganizationRecord>,
        calls: RefCell<Vec<String>>,
    }

    impl FakeOrganizations {
        fn new(records: Vec<OrganizationRecord>) -> Self {
            Self { records, calls: RefCell::new(Vec::new()) }
        }
    }

    impl OrganizationSource for FakeOrganizations {
        fn resolve_organization(&self, number: &str) -> Result<OrganizationRecord, ReconError> {
            self.calls.borrow_mut().push(number.to_string());
            self.records
                .iter()
                .find(|r| r.number() == number)
                .cloned()
                .ok_or_else(|| ReconError::not_found("organizations", number))
        }
    }

    fn unit_in_parent(valid_to: Option<NaiveDate>) -> OrganizationRecord {
        OrganizationRecord::BusinessUnit {
            number: "901".into(),
            name: None,
            member_of: vec![LegalEntityLink {
                legal_entity_number: "900".into(),
                valid_from: d("2020-01-01"),
                valid_to,
            }],
        }
    }

    #[test]
    fn person_resolves_to_itself_without_lookup() {
        let source = FakeOrganizations::new(vec![]);
        let mut resolver = EquivalenceResolver::new(&source);
        let person = Identity::person("01017012345");
        let set = resolver.resolve(&person, d("2024-01-01")).unwrap();
        assert_eq!(set, BTreeSet::from([person]));
        assert!(source.calls.borrow().is_empty());
    }

    #[test]
    fn business_unit_includes_active_legal_entity() {
        let source = FakeOrganizations::new(vec![unit_in_parent(None)]);
        let mut resolver = EquivalenceResolver::new(&source);
        let set = resolver.resolve(&Identity::organization("901"), d("2024-01-01")).unwrap();
        assert_eq!(set, BTreeSet::from([Identity::organization("900"), Identity::organization("901")]));
    }

    #[test]
    fn legal_entity_includes_operated_units() {
        let source = FakeOrganizations::new(vec![OrganizationRecord::LegalEntity {
            number: "900".into(),
            name: None,
            operates: vec![
                BusinessUnitLink { business_unit_number: "901".into(), valid_from: d("2020-01-01"), valid_to: None },
                BusinessUnitLink { business_unit_number: "902".into(), valid_from: d("2025-01-01"), valid_to: None },
            ],
        }]);
        let mut resolver = EquivalenceResolver::new(&source);
        let set = resolver.resolve(&Identity::organization("900"), d("2024-06-01")).unwrap();
        assert_eq!(set, BTreeSet::from([Identity::organization("900"), Identity::organization("901")]));
    }

    #[test]
    fn valid_to_boundary_is_inclusive() {
        let source = FakeOrganizations::new(vec![unit_in_parent(Some(d("2024-03-01")))]);
        let mut resolver = EquivalenceResolver::new(&source);
        let payer = Identity::organization("901");

        let on_boundary = resolver.resolve(&payer, d("2024-03-01")).unwrap();
        assert!(on_boundary.contains(&Identity::organization("900")));

        let day_after = resolver.resolve(&payer, d("2024-03-02")).unwrap();
        assert_eq!(day_after, BTreeSet::from([payer]));
    }

    #[test]
    fn each_number_is_fetched_once() {
        let source = FakeOrganizations::new(vec![unit_in_parent(None)]);
        let mut resolver = EquivalenceResolver::new(&source);
        let payer = Identity::organization("901");
        resolver.resolve(&payer, d("2024-01-01")).unwrap();
        resolver.resolve(&payer, d("2024-02-01")).unwrap();
        assert_eq!(source.calls.borrow().as_slice(), ["901"]);
        assert_eq!(resolver.lookups(), 1);
    }

    #[test]
    fn lookup_failure_is_returned() {
        let source = FakeOrganizations::new(vec![]);
        let mut resolver = EquivalenceResolver::new(&source);
        let err = resolver.resolve(&Identity::organization("404"), d("2024-01-01")).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::NotFound);
    }
}
