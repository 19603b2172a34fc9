//! Domain definitions for kernel categorization.
//!
//! Kernels are grouped by the analytical area they belong to. Domains are used
//! for kernel discovery and for filtering in the CLI.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Analytical domain for kernel categorization.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum Domain {
    /// Graph analytics: graph construction, cycle and chain search
    GraphAnalytics,

    /// Compliance: smurfing detection, suspicion scoring, fraud-ring assembly
    Compliance,
}

impl Domain {
    /// All available domains.
    pub const ALL: &'static [Domain] = &[Domain::GraphAnalytics, Domain::Compliance];

    /// Returns the domain name as a string slice.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Domain::GraphAnalytics => "GraphAnalytics",
            Domain::Compliance => "Compliance",
        }
    }

    /// Short lowercase name used on the command line.
    #[must_use]
    pub const fn short_name(&self) -> &'static str {
        match self {
            Domain::GraphAnalytics => "graph",
            Domain::Compliance => "compliance",
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Domain {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "graphanalytics" | "graph" => Ok(Domain::GraphAnalytics),
            "compliance" => Ok(Domain::Compliance),
            _ => Err(format!("Unknown domain: {}", s)),
        }
    }
}
