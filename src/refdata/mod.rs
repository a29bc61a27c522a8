pub mod error;
pub mod workbook;

pub use error::ReferenceDataError;
pub use workbook::{DATA_LIST_SHEET, GL_ACCOUNTS_SHEET, GlAccount, load_categories, load_gl_accounts};

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use chrono::{DateTime, Utc};

/// Availability of the reference data source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Health {
    Healthy,
    Unavailable(String),
}

/// Immutable snapshot of the reference sets, taken at one load of the
/// workbook. Validation at submission time always works against a single
/// snapshot so a report is never checked against two different loads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefDataSnapshot {
    pub gl_accounts: Vec<GlAccount>,
    pub categories: Vec<String>,
    pub loaded_at: DateTime<Utc>,
}

impl RefDataSnapshot {
    pub fn new(gl_accounts: Vec<GlAccount>, categories: Vec<String>) -> Self {
        Self {
            gl_accounts,
            categories,
            loaded_at: Utc::now(),
        }
    }

    /// The set of valid GL account codes.
    pub fn gl_codes(&self) -> HashSet<&str> {
        self.gl_accounts
            .iter()
            .map(|a| a.account.as_str())
            .collect()
    }

    pub fn has_gl_account(&self, code: &str) -> bool {
        self.gl_accounts.iter().any(|a| a.account == code)
    }

    pub fn has_category(&self, category: &str) -> bool {
        self.categories.iter().any(|c| c == category)
    }
}

/// Reference data as consumed by the workflow engine.
///
/// `snapshot` is the read path; `health` derives availability from it so
/// callers that only need a yes/no (the submission guard, the CLI) do not
/// duplicate error handling. `reload` discards any cached state.
pub trait ReferenceData: Send + Sync {
    fn snapshot(&self) -> Result<Arc<RefDataSnapshot>, ReferenceDataError>;

    fn reload(&self) -> Result<(), ReferenceDataError>;

    fn health(&self) -> Health {
        match self.snapshot() {
            Ok(_) => Health::Healthy,
            Err(e) => Health::Unavailable(e.to_string()),
        }
    }
}

/// Process-wide provider backed by the exported workbook directory.
///
/// The workbook is read on first use and cached. With a `max_age`, a
/// snapshot past the freshness boundary is reloaded transparently; if
/// that reload fails the provider reports Unavailable rather than serving
/// stale sets.
pub struct WorkbookProvider {
    dir: PathBuf,
    max_age: Option<Duration>,
    cache: RwLock<Option<Arc<RefDataSnapshot>>>,
}

impl WorkbookProvider {
    pub fn new(dir: impl Into<PathBuf>, max_age: Option<Duration>) -> Self {
        Self {
            dir: dir.into(),
            max_age,
            cache: RwLock::new(None),
        }
    }

    fn cached(&self) -> Option<Arc<RefDataSnapshot>> {
        self.cache.read().expect("refdata cache poisoned").clone()
    }

    fn is_fresh(&self, snapshot: &RefDataSnapshot) -> bool {
        match self.max_age {
            None => true,
            Some(max_age) => {
                let age = Utc::now() - snapshot.loaded_at;
                age.to_std().map(|age| age <= max_age).unwrap_or(true)
            }
        }
    }

    fn load_fresh(&self) -> Result<Arc<RefDataSnapshot>, ReferenceDataError> {
        let gl_accounts = load_gl_accounts(&self.dir)?;
        let categories = load_categories(&self.dir)?;
        let snapshot = Arc::new(RefDataSnapshot::new(gl_accounts, categories));
        *self.cache.write().expect("refdata cache poisoned") = Some(snapshot.clone());
        Ok(snapshot)
    }
}

impl ReferenceData for WorkbookProvider {
    fn snapshot(&self) -> Result<Arc<RefDataSnapshot>, ReferenceDataError> {
        if let Some(snapshot) = self.cached()
            && self.is_fresh(&snapshot)
        {
            return Ok(snapshot);
        }
        self.load_fresh()
    }

    fn reload(&self) -> Result<(), ReferenceDataError> {
        *self.cache.write().expect("refdata cache poisoned") = None;
        self.load_fresh().map(|_| ())
    }
}

/// Fixed reference sets, for tests and the embedded demo.
pub struct StaticRefData {
    snapshot: Arc<RefDataSnapshot>,
}

impl StaticRefData {
    pub fn new(gl_accounts: &[(&str, &str)], categories: &[&str]) -> Self {
        let gl_accounts = gl_accounts
            .iter()
            .map(|(account, name)| GlAccount {
                account: account.to_string(),
                label: if name.is_empty() {
                    account.to_string()
                } else {
                    format!("{account} - {name}")
                },
            })
            .collect();
        let categories = categories.iter().map(|c| c.to_string()).collect();
        Self {
            snapshot: Arc::new(RefDataSnapshot::new(gl_accounts, categories)),
        }
    }
}

impl ReferenceData for StaticRefData {
    fn snapshot(&self) -> Result<Arc<RefDataSnapshot>, ReferenceDataError> {
        Ok(self.snapshot.clone())
    }

    fn reload(&self) -> Result<(), ReferenceDataError> {
        Ok(())
    }
}
