#![allow(dead_code)]

use eos_core::{EosError, FloatOption, Kinematics, OptionSchema, Options, SpecifiedOption, Unit};
use eos_observable::{ConcreteEntry, ObservableRegistry, Provider};
use eos_params::{ParameterUser, Parameters, UsedParameter};

/// Quark-mass toy: `m_q * multiplier * (q2_max - q2_min)` and `m_q * q2`.
pub struct Toy {
    mass: UsedParameter,
    multiplier: f64,
}

impl Provider for Toy {
    fn option_schema() -> OptionSchema {
        OptionSchema::new()
            .declare("quark", &["c", "b"], Some("c"))
            .declare("multiplier", &[], Some("1"))
    }

    fn new(parameters: &Parameters, options: &Options, user: &mut ParameterUser) -> Result<Self, EosError> {
        let schema = Self::option_schema();
        let name = match SpecifiedOption::new(options, &schema, "quark")?.value() {
            "b" => "mass::b(MSbar)",
            _ => "mass::c(MSbar)",
        };
        Ok(Self {
            mass: UsedParameter::new(parameters.get(name)?, user),
            multiplier: FloatOption::new(options, &schema, "multiplier")?.value(),
        })
    }

    fn description() -> &'static str {
        "toy observables scaling a quark mass"
    }
}

impl Toy {
    pub fn width(&self, arguments: &[f64]) -> Result<f64, EosError> {
        Ok(self.mass.value() * self.multiplier * (arguments[1] - arguments[0]))
    }

    pub fn point(&self, arguments: &[f64]) -> Result<f64, EosError> {
        Ok(self.mass.value() * arguments[0])
    }
}

pub fn registry() -> Result<ObservableRegistry, EosError> {
    let mut registry = ObservableRegistry::new();
    registry.insert(ConcreteEntry::<Toy>::new(
        "test::width",
        r"\Gamma",
        Unit::GeV,
        Toy::width,
        &["q2_min", "q2_max"],
        Options::new(),
    )?)?;
    registry.insert(ConcreteEntry::<Toy>::new(
        "test::point",
        "p",
        Unit::GeV,
        Toy::point,
        &["q2"],
        Options::new(),
    )?)?;
    registry.insert(ConcreteEntry::<Toy>::new(
        "test::point-b",
        "p_b",
        Unit::GeV,
        Toy::point,
        &["q2"],
        Options::from_pairs([("quark", "b")]),
    )?)?;
    registry.insert_expression(
        "test::ratio",
        "R",
        Unit::None,
        Options::new(),
        "<<test::width;quark=b>>[q2_min=>q2_b_min,q2_max=>q2_b_max] / <<test::width>>[q2_min=>q2_c_min,q2_max=>q2_c_max]",
    )?;
    Ok(registry)
}

pub fn width_kinematics() -> Kinematics {
    Kinematics::from_pairs([("q2_min", 1.0), ("q2_max", 3.0)])
}

pub fn ratio_kinematics() -> Kinematics {
    Kinematics::from_pairs([("q2_b_min", 0.0), ("q2_b_max", 4.0), ("q2_c_min", 1.0), ("q2_c_max", 3.0)])
}
