//! Physical units attached to observables and parameters.

use std::fmt::{self, Display};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::{EosError, ErrorInfo};

/// Unit of an observable's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(try_from = "String", into = "String")]
pub enum Unit {
    /// Dimensionless.
    #[default]
    None,
    /// Not (yet) assigned.
    Undefined,
    /// GeV
    GeV,
    /// GeV^2
    GeV2,
    /// GeV^-1
    InverseGeV,
    /// GeV^-2
    InverseGeV2,
    /// Seconds.
    Second,
}

impl Unit {
    /// LaTeX representation, empty for dimensionless values.
    pub fn latex(&self) -> &'static str {
        match self {
            Unit::None => "",
            Unit::Undefined => "undefined",
            Unit::GeV => r"\giga\electronvolt",
            Unit::GeV2 => r"\giga\electronvolt^2",
            Unit::InverseGeV => r"\giga\electronvolt^{-1}",
            Unit::InverseGeV2 => r"\giga\electronvolt^{-2}",
            Unit::Second => r"\second",
        }
    }
}

impl Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Unit::None => "1",
            Unit::Undefined => "?",
            Unit::GeV => "GeV",
            Unit::GeV2 => "GeV^2",
            Unit::InverseGeV => "GeV^-1",
            Unit::InverseGeV2 => "GeV^-2",
            Unit::Second => "s",
        };
        f.write_str(label)
    }
}

impl FromStr for Unit {
    type Err = EosError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" | "1" => Ok(Unit::None),
            "?" | "undefined" => Ok(Unit::Undefined),
            "GeV" => Ok(Unit::GeV),
            "GeV^2" => Ok(Unit::GeV2),
            "GeV^-1" | "1/GeV" => Ok(Unit::InverseGeV),
            "GeV^-2" | "1/GeV^2" => Ok(Unit::InverseGeV2),
            "s" => Ok(Unit::Second),
            other => Err(EosError::Serde(
                ErrorInfo::new("eos_core.unknown_unit", "unit is not recognized")
                    .with_context("unit", other),
            )),
        }
    }
}

impl TryFrom<String> for Unit {
    type Error = EosError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Unit> for String {
    fn from(value: Unit) -> Self {
        value.to_string()
    }
}
