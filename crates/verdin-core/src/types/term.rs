//! Column term identifiers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A column identifier: a short name plus a fully qualified name.
/// Terms are value-equal and immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Term {
    simple_name: String,
    qualified_name: String,
}

impl Term {
    /// Build a term from its short and qualified names.
    pub fn new(simple_name: impl Into<String>, qualified_name: impl Into<String>) -> Self {
        Self {
            simple_name: simple_name.into(),
            qualified_name: qualified_name.into(),
        }
    }

    /// The short column name, e.g. `taxonID`.
    pub fn simple_name(&self) -> &str {
        &self.simple_name
    }

    /// The fully qualified name, e.g. `http://rs.tdwg.org/dwc/terms/taxonID`.
    pub fn qualified_name(&self) -> &str {
        &self.qualified_name
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.simple_name)
    }
}

/// Darwin Core terms commonly checked in taxonomic archives.
pub mod dwc {
    use super::Term;

    const NS: &str = "http://rs.tdwg.org/dwc/terms/";

    fn term(simple: &str) -> Term {
        Term::new(simple, format!("{NS}{simple}"))
    }

    pub fn taxon_id() -> Term {
        term("taxonID")
    }

    pub fn accepted_name_usage_id() -> Term {
        term("acceptedNameUsageID")
    }

    pub fn parent_name_usage_id() -> Term {
        term("parentNameUsageID")
    }

    pub fn original_name_usage_id() -> Term {
        term("originalNameUsageID")
    }

    pub fn scientific_name() -> Term {
        term("scientificName")
    }
}
