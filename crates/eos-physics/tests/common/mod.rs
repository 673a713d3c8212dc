#![allow(dead_code)]

use eos_core::{EosError, Kinematics, Options};
use eos_params::Parameters;

/// World used by the published `B -> pi l nu` reference values.
pub fn pilnu_parameters() -> Result<Parameters, EosError> {
    let p = Parameters::defaults()?;
    for (name, value) in [
        ("CKM::abs(V_ub)", 3.32e-3),
        ("B->pi::f_+(0)@BCL2008", 0.290),
        ("B->pi::b_+^1@BCL2008", -1.930),
        ("B->pi::b_+^2@BCL2008", -0.441),
        ("mass::B_d", 5.2796),
        ("mass::pi^+", 0.13957),
    ] {
        p.set(name, value)?;
    }
    Ok(p)
}

pub fn pilnu_options(lepton: &str, spectator: &str) -> Options {
    Options::from_pairs([
        ("model", "CKM"),
        ("form-factors", "BCL2008"),
        ("l", lepton),
        ("q", spectator),
    ])
}

pub fn bin(q2_min: f64, q2_max: f64) -> Kinematics {
    Kinematics::from_pairs([("q2_min", q2_min), ("q2_max", q2_max)])
}

/// `(q2_min, q2_max, BR)` for `l = e` and `q = d`.
pub const REFERENCE_BINS: [(f64, f64, f64); 8] = [
    (0.01, 2.0, 1.44047e-5),
    (2.0, 4.0, 1.43046e-5),
    (4.0, 6.0, 1.40803e-5),
    (6.0, 8.0, 1.37941e-5),
    (8.0, 10.0, 1.34323e-5),
    (10.0, 12.0, 1.29770e-5),
    (0.01, 12.0, 8.29930e-5),
    (0.01, 25.0, 1.43035e-4),
];
