use crate::error::{LogError, Result};
use crate::logs::record::Severity;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// File prefix reserved for the access channel
pub const ACCESS_PREFIX: &str = "access";

/// Maps each severity to the file group (file name prefix) it is written to
///
/// Severities without an entry are not written to any file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<String, String>",
    into = "BTreeMap<String, String>"
)]
pub struct RoutingTable {
    routes: BTreeMap<Severity, String>,
}

impl RoutingTable {
    /// Table with no routes
    pub fn empty() -> Self {
        Self {
            routes: BTreeMap::new(),
        }
    }

    /// Default table of the general channel
    ///
    /// Warnings share the info file; everything from error up has its own file.
    pub fn general() -> Self {
        Self::empty()
            .route(Severity::Debug, "info")
            .route(Severity::Info, "info")
            .route(Severity::Warn, "info")
            .route(Severity::Error, "error")
            .route(Severity::Fatal, "error")
            .route(Severity::Panic, "error")
    }

    /// Table of the access channel: every severity lands in the access file
    pub fn access() -> Self {
        Severity::ALL
            .iter()
            .fold(Self::empty(), |table, severity| table.route(*severity, ACCESS_PREFIX))
    }

    /// Builder-style route
    pub fn route(mut self, severity: Severity, prefix: impl Into<String>) -> Self {
        self.routes.insert(severity, prefix.into());
        self
    }

    /// File prefix a severity is routed to
    pub fn target(&self, severity: Severity) -> Option<&str> {
        self.routes.get(&severity).map(String::as_str)
    }

    /// Distinct file prefixes referenced by the table
    pub fn prefixes(&self) -> Vec<&str> {
        let mut prefixes: Vec<&str> = self.routes.values().map(String::as_str).collect();
        prefixes.sort_unstable();
        prefixes.dedup();
        prefixes
    }

    /// Reject prefixes that would not produce a plain file name in the log directory
    pub fn validate(&self) -> Result<()> {
        for (severity, prefix) in &self.routes {
            if prefix.is_empty() {
                return Err(LogError::ConfigValidationError(format!(
                    "Empty file prefix for severity {}",
                    severity
                )));
            }
            if prefix.contains(['/', '\\']) || prefix == "." || prefix == ".." {
                return Err(LogError::ConfigValidationError(format!(
                    "Invalid file prefix for severity {}: {}",
                    severity, prefix
                )));
            }
        }
        Ok(())
    }
}

impl Default for RoutingTable {
    fn default() -> Self {
        Self::general()
    }
}

impl TryFrom<BTreeMap<String, String>> for RoutingTable {
    type Error = LogError;

    fn try_from(raw: BTreeMap<String, String>) -> Result<Self> {
        let mut table = Self::empty();
        for (severity, prefix) in raw {
            table = table.route(severity.parse::<Severity>()?, prefix);
        }
        Ok(table)
    }
}

impl From<RoutingTable> for BTreeMap<String, String> {
    fn from(table: RoutingTable) -> Self {
        table
            .routes
            .into_iter()
            .map(|(severity, prefix)| (severity.as_str().to_string(), prefix))
            .collect()
    }
}
