//! Particle flavours selectable through options.

use std::fmt::{self, Display};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::{EosError, ErrorInfo};

/// Charged-lepton flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LeptonFlavor {
    /// `e`
    #[serde(rename = "e")]
    Electron,
    /// `mu`
    #[serde(rename = "mu")]
    Muon,
    /// `tau`
    #[serde(rename = "tau")]
    Tauon,
}

impl LeptonFlavor {
    /// Short label used in option values and parameter names.
    pub fn as_str(&self) -> &'static str {
        match self {
            LeptonFlavor::Electron => "e",
            LeptonFlavor::Muon => "mu",
            LeptonFlavor::Tauon => "tau",
        }
    }

    /// All flavours in mass order.
    pub const ALL: [LeptonFlavor; 3] = [LeptonFlavor::Electron, LeptonFlavor::Muon, LeptonFlavor::Tauon];
}

impl Display for LeptonFlavor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LeptonFlavor {
    type Err = EosError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "e" => Ok(LeptonFlavor::Electron),
            "mu" => Ok(LeptonFlavor::Muon),
            "tau" => Ok(LeptonFlavor::Tauon),
            other => Err(EosError::Option(
                ErrorInfo::new("eos_core.unknown_lepton_flavor", "not a lepton flavour")
                    .with_context("value", other),
            )),
        }
    }
}

/// Quark flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum QuarkFlavor {
    /// `u`
    #[serde(rename = "u")]
    Up,
    /// `d`
    #[serde(rename = "d")]
    Down,
    /// `s`
    #[serde(rename = "s")]
    Strange,
    /// `c`
    #[serde(rename = "c")]
    Charm,
    /// `b`
    #[serde(rename = "b")]
    Bottom,
    /// `t`
    #[serde(rename = "t")]
    Top,
}

impl QuarkFlavor {
    /// Short label used in option values and parameter names.
    pub fn as_str(&self) -> &'static str {
        match self {
            QuarkFlavor::Up => "u",
            QuarkFlavor::Down => "d",
            QuarkFlavor::Strange => "s",
            QuarkFlavor::Charm => "c",
            QuarkFlavor::Bottom => "b",
            QuarkFlavor::Top => "t",
        }
    }
}

impl Display for QuarkFlavor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuarkFlavor {
    type Err = EosError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "u" => Ok(QuarkFlavor::Up),
            "d" => Ok(QuarkFlavor::Down),
            "s" => Ok(QuarkFlavor::Strange),
            "c" => Ok(QuarkFlavor::Charm),
            "b" => Ok(QuarkFlavor::Bottom),
            "t" => Ok(QuarkFlavor::Top),
            other => Err(EosError::Option(
                ErrorInfo::new("eos_core.unknown_quark_flavor", "not a quark flavour")
                    .with_context("value", other),
            )),
        }
    }
}
