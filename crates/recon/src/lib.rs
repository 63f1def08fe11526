//! `emplink-recon`: Income-to-employment reconciliation engine.
//!
//! Pure engine crate: reads a subject's employment relationships, income
//! entries and organization hierarchy through collaborator traits, and
//! returns every employment relationship each salary entry is consistent
//! with. No network IO; the CLI and tests drive it from recorded files.

pub mod config;
pub mod engine;
pub mod error;
pub mod evidence;
pub mod fixture;
pub mod identity;
pub mod matcher;
pub mod model;
pub mod period;
pub mod resolver;
pub mod source;

pub use config::ReconConfig;
pub use engine::Reconciler;
pub use error::{ErrorKind, ReconError};
pub use evidence::{Anomaly, AnomalyKind, CollectingSink, LogSink, NullSink, TeeSink};
pub use identity::Identity;
pub use matcher::{match_and_diff, MatchOutput};
pub use model::{EmploymentRelationship, IncomeEntry, OrganizationRecord, ReconSummary, ReconciliationResult, SalaryMatch};
pub use period::YearMonth;
pub use resolver::EquivalenceResolver;
pub use source::{EmploymentSource, IncomeSource, ObservabilitySink, OrganizationSource};
