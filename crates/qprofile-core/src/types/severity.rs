//! Rule severity.

use serde::{Deserialize, Serialize};

use super::variant::text_enum;

/// Severity of an issue raised by a rule, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Info,
    Minor,
    Major,
    Critical,
    Blocker,
}

text_enum!(Severity, "severity", {
    Info => "INFO",
    Minor => "MINOR",
    Major => "MAJOR",
    Critical => "CRITICAL",
    Blocker => "BLOCKER",
});
