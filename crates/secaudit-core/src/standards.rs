//! Compliance standard catalog and the operator's selection.
//!
//! The catalog is a fixed, ordered list of standard identifiers followed by
//! the [`ALL_STANDARDS`] sentinel. The sentinel never carries meaning of its
//! own: a [`SelectionSet`] contains it exactly when every other catalog entry
//! is selected, and every mutation re-establishes that.

use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{DashboardError, Result};

/// Aggregate marker meaning "every standard in the catalog".
pub const ALL_STANDARDS: &str = "All Security Standards";

/// Standards offered when no custom catalog is configured.
pub const DEFAULT_STANDARDS: &[&str] = &[
    "OWASP API Security Top 10",
    "NIST SP 800-53",
    "ISO 27001",
    "PCI DSS",
    "GDPR",
    "HIPAA",
    "SOC 2",
];

/// Ordered list of selectable standards, sentinel last.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandardCatalog {
    standards: Vec<String>,
}

impl Default for StandardCatalog {
    fn default() -> Self {
        Self {
            standards: DEFAULT_STANDARDS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl StandardCatalog {
    /// Build a catalog from custom identifiers.
    ///
    /// Duplicates are dropped (first occurrence wins). The sentinel is
    /// reserved and an empty catalog is rejected.
    pub fn new<I, S>(standards: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = HashSet::new();
        let mut ordered = Vec::new();
        for standard in standards {
            let standard = standard.into();
            if standard == ALL_STANDARDS {
                return Err(DashboardError::Config(format!(
                    "\"{ALL_STANDARDS}\" is reserved and cannot be a catalog entry"
                )));
            }
            if seen.insert(standard.clone()) {
                ordered.push(standard);
            }
        }
        if ordered.is_empty() {
            return Err(DashboardError::Config(
                "standard catalog must not be empty".to_string(),
            ));
        }
        Ok(Self { standards: ordered })
    }

    /// Individual standards, excluding the sentinel.
    pub fn standards(&self) -> &[String] {
        &self.standards
    }

    /// Every identifier an operator can toggle, sentinel last.
    pub fn entries(&self) -> impl Iterator<Item = &str> {
        self.standards
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(ALL_STANDARDS))
    }

    pub fn contains(&self, standard: &str) -> bool {
        standard == ALL_STANDARDS || self.standards.iter().any(|s| s == standard)
    }
}

/// The operator's current choice of standards.
#[derive(Debug, Clone)]
pub struct SelectionSet {
    catalog: Arc<StandardCatalog>,
    selected: HashSet<String>,
}

impl SelectionSet {
    pub fn new(catalog: Arc<StandardCatalog>) -> Self {
        Self {
            catalog,
            selected: HashSet::new(),
        }
    }

    pub fn catalog(&self) -> &StandardCatalog {
        &self.catalog
    }

    /// Toggle one identifier.
    ///
    /// Toggling the sentinel selects the whole catalog, or clears the set if
    /// the sentinel was already selected. Toggling an individual standard
    /// flips it and then re-derives the sentinel. Identifiers outside the
    /// catalog are ignored and `false` is returned.
    pub fn toggle(&mut self, standard: &str) -> bool {
        if !self.catalog.contains(standard) {
            warn!(standard = %standard, "Ignoring toggle of unknown standard");
            return false;
        }

        if standard == ALL_STANDARDS {
            if self.selected.contains(ALL_STANDARDS) {
                self.selected.clear();
            } else {
                self.selected = self.catalog.entries().map(str::to_string).collect();
            }
        } else {
            if !self.selected.remove(standard) {
                self.selected.insert(standard.to_string());
            }
            self.sync_sentinel();
        }

        debug!(standard = %standard, selected = self.selected.len(), "Toggled standard");
        true
    }

    pub fn is_selected(&self, standard: &str) -> bool {
        self.selected.contains(standard)
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    /// Selected identifiers in catalog order, sentinel included when present.
    pub fn selected(&self) -> Vec<String> {
        self.catalog
            .entries()
            .filter(|s| self.selected.contains(*s))
            .map(str::to_string)
            .collect()
    }

    /// Whether the sentinel membership agrees with the individual standards.
    pub fn invariant_holds(&self) -> bool {
        let all_individuals = self
            .catalog
            .standards()
            .iter()
            .all(|s| self.selected.contains(s));
        self.selected.contains(ALL_STANDARDS) == all_individuals
    }

    fn sync_sentinel(&mut self) {
        let all_individuals = self
            .catalog
            .standards()
            .iter()
            .all(|s| self.selected.contains(s));
        if all_individuals {
            self.selected.insert(ALL_STANDARDS.to_string());
        } else {
            self.selected.remove(ALL_STANDARDS);
        }
    }
}
