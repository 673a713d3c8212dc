//! Hadronic form factors of `P -> P'` transitions.
//!
//! The BCL2008 parametrisation expands each form factor in the conformal
//! variable `z(s)` around `z(0)` after factoring out the lowest resonance
//! pole. `f_+` and `f_T` carry `K - 1` free coefficients, the `K`-th being
//! fixed by the threshold behaviour; `f_0` carries `K` free coefficients.

use std::fmt;

use eos_core::{EosError, ErrorInfo, OptionSchema, Options, SpecifiedOption, Unit};
use eos_observable::{ConcreteEntry, Method, ObservableGroup, ObservableRegistry, ObservableSection, Provider};
use eos_params::{ParameterUser, Parameters, UsedParameter, UsesParameters};

/// Values accepted by the `form-factors` option.
pub const FORM_FACTOR_NAMES: [&str; 3] = ["BCL2008", "BCL2008-4", "BCL2008-5"];

/// Fixed kinematics of a transition, used by the z-expansion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Process {
    /// Parameter prefix, e.g. `B->pi`.
    pub label: &'static str,
    /// Initial-state mass.
    pub m_b: f64,
    /// Final-state mass.
    pub m_p: f64,
    /// Mass of the `1^-` resonance.
    pub m_r1: f64,
    /// Mass of the `0^+` resonance.
    pub m_r0: f64,
}

impl Process {
    /// `B -> pi`.
    pub const B_TO_PI: Process = Process {
        label: "B->pi",
        m_b: 5.279,
        m_p: 0.135,
        m_r1: 5.325,
        m_r0: 5.540,
    };

    /// `B -> D`.
    pub const B_TO_D: Process = Process {
        label: "B->D",
        m_b: 5.279,
        m_p: 1.870,
        m_r1: 6.330,
        m_r0: 6.420,
    };

    /// `B_s -> K`.
    pub const BS_TO_K: Process = Process {
        label: "B_s->K",
        m_b: 5.366,
        m_p: 0.494,
        m_r1: 5.325,
        m_r0: 5.540,
    };

    /// Every supported transition.
    pub const ALL: [Process; 3] = [Process::B_TO_PI, Process::B_TO_D, Process::BS_TO_K];

    /// Transition with parameter prefix `label`.
    pub fn by_label(label: &str) -> Result<Process, EosError> {
        Process::ALL.into_iter().find(|process| process.label == label).ok_or_else(|| {
            EosError::Option(
                ErrorInfo::new("eos_physics.unknown_process", "no form factors for this transition")
                    .with_context("key", "process")
                    .with_context("value", label),
            )
        })
    }

    /// Conformal variable `z(s)`.
    pub fn z(&self, s: f64) -> f64 {
        let tau_p = (self.m_b + self.m_p).powi(2);
        let tau_0 = (self.m_b + self.m_p) * (self.m_b.sqrt() - self.m_p.sqrt()).powi(2);
        let a = (tau_p - s).sqrt();
        let b = (tau_p - tau_0).sqrt();
        (a - b) / (a + b)
    }
}

/// Vector, scalar and tensor form factors of one transition.
pub trait FormFactors: UsesParameters + Send + Sync + fmt::Debug {
    /// `f_+(s)`.
    fn f_p(&self, s: f64) -> f64;

    /// `f_0(s)`.
    fn f_0(&self, s: f64) -> f64;

    /// `f_T(s)`.
    fn f_t(&self, s: f64) -> f64;
}

/// Builds the parametrisation `name` for `process`.
pub fn make_form_factors(process: &Process, name: &str, parameters: &Parameters) -> Result<Box<dyn FormFactors>, EosError> {
    let order = match name {
        "BCL2008" => 3,
        "BCL2008-4" => 4,
        "BCL2008-5" => 5,
        other => {
            return Err(EosError::Option(
                ErrorInfo::new("eos_physics.unknown_form_factors", "no form factor parametrisation of that name")
                    .with_context("key", "form-factors")
                    .with_context("value", other)
                    .with_hint(format!("known parametrisations: {}", FORM_FACTOR_NAMES.join(", "))),
            ))
        }
    };
    Ok(Box::new(Bcl2008::new(*process, order, parameters)?))
}

/// Schema fragment for the `form-factors` option.
pub fn option_schema() -> OptionSchema {
    OptionSchema::new().declare("form-factors", &FORM_FACTOR_NAMES, Some("BCL2008"))
}

/// BCL2008 z-expansion truncated at order `K`.
#[derive(Debug, Clone)]
pub struct Bcl2008 {
    process: Process,
    order: usize,
    f_plus_0: UsedParameter,
    f_t_0: UsedParameter,
    b_plus: Vec<UsedParameter>,
    b_zero: Vec<UsedParameter>,
    b_t: Vec<UsedParameter>,
    user: ParameterUser,
}

impl Bcl2008 {
    /// Reads `<label>::f_+(0)@BCL2008`, `f_T(0)` and the shape coefficients.
    pub fn new(process: Process, order: usize, parameters: &Parameters) -> Result<Self, EosError> {
        let label = process.label;
        let mut user = ParameterUser::new();
        let series = |name: &str, count: usize, user: &mut ParameterUser| -> Result<Vec<UsedParameter>, EosError> {
            let mut out = Vec::with_capacity(count);
            for k in 1..=count {
                out.push(UsedParameter::new(parameters.get(&format!("{label}::{name}^{k}@BCL2008"))?, user));
            }
            Ok(out)
        };
        let b_plus = series("b_+", order - 1, &mut user)?;
        let b_zero = series("b_0", order, &mut user)?;
        let b_t = series("b_T", order - 1, &mut user)?;
        Ok(Self {
            process,
            order,
            f_plus_0: UsedParameter::new(parameters.get(&format!("{label}::f_+(0)@BCL2008"))?, &mut user),
            f_t_0: UsedParameter::new(parameters.get(&format!("{label}::f_T(0)@BCL2008"))?, &mut user),
            b_plus,
            b_zero,
            b_t,
            user,
        })
    }

    /// Truncation order `K`.
    pub fn order(&self) -> usize {
        self.order
    }

    /// `z^k - z(0)^k` for `k = 0..=K`.
    fn z_bar(&self, s: f64) -> Vec<f64> {
        let z = self.process.z(s);
        let z0 = self.process.z(0.0);
        (0..=self.order as i32).map(|k| z.powi(k) - z0.powi(k)).collect()
    }

    /// Series with the threshold constraint eliminating the `K`-th coefficient.
    fn constrained_series(&self, coefficients: &[UsedParameter], z_bar: &[f64]) -> f64 {
        let order = self.order as f64;
        let last = z_bar[self.order];
        coefficients.iter().enumerate().fold(1.0, |sum, (index, b)| {
            let k = index + 1;
            let sign = if (self.order - k) % 2 == 0 { 1.0 } else { -1.0 };
            sum + b.value() * (z_bar[k] - sign * k as f64 / order * last)
        })
    }
}

impl UsesParameters for Bcl2008 {
    fn parameter_user(&self) -> &ParameterUser {
        &self.user
    }
}

impl FormFactors for Bcl2008 {
    fn f_p(&self, s: f64) -> f64 {
        let z_bar = self.z_bar(s);
        let pole = 1.0 - s / self.process.m_r1.powi(2);
        self.f_plus_0.value() / pole * self.constrained_series(&self.b_plus, &z_bar)
    }

    fn f_0(&self, s: f64) -> f64 {
        let z_bar = self.z_bar(s);
        let pole = 1.0 - s / self.process.m_r0.powi(2);
        let series = self
            .b_zero
            .iter()
            .enumerate()
            .fold(1.0, |sum, (index, b)| sum + b.value() * z_bar[index + 1]);
        self.f_plus_0.value() / pole * series
    }

    fn f_t(&self, s: f64) -> f64 {
        let z_bar = self.z_bar(s);
        let pole = 1.0 - s / self.process.m_r1.powi(2);
        self.f_t_0.value() / pole * self.constrained_series(&self.b_t, &z_bar)
    }
}

/// Provider behind the `<process>::f_+(q2)` family of observables.
#[derive(Debug)]
pub struct FormFactorObservables {
    form_factors: Box<dyn FormFactors>,
}

impl Provider for FormFactorObservables {
    fn option_schema() -> OptionSchema {
        let processes: Vec<&str> = Process::ALL.iter().map(|process| process.label).collect();
        option_schema().declare("process", &processes, None)
    }

    fn new(parameters: &Parameters, options: &Options, user: &mut ParameterUser) -> Result<Self, EosError> {
        let schema = Self::option_schema();
        let process = Process::by_label(SpecifiedOption::new(options, &schema, "process")?.value())?;
        let name = SpecifiedOption::new(options, &schema, "form-factors")?;
        let form_factors = make_form_factors(&process, name.value(), parameters)?;
        user.uses_all(form_factors.parameter_user());
        Ok(Self { form_factors })
    }

    fn description() -> &'static str {
        "form factors of pseudoscalar-to-pseudoscalar transitions"
    }

    fn references() -> &'static [&'static str] {
        &["BCL:2008A"]
    }
}

impl FormFactorObservables {
    /// `f_+(q2)`.
    pub fn f_p(&self, arguments: &[f64]) -> Result<f64, EosError> {
        Ok(self.form_factors.f_p(arguments[0]))
    }

    /// `f_0(q2)`.
    pub fn f_0(&self, arguments: &[f64]) -> Result<f64, EosError> {
        Ok(self.form_factors.f_0(arguments[0]))
    }

    /// `f_T(q2)`.
    pub fn f_t(&self, arguments: &[f64]) -> Result<f64, EosError> {
        Ok(self.form_factors.f_t(arguments[0]))
    }

    /// `f_0(q2) / f_+(q2)`.
    pub fn f_0_over_f_p(&self, arguments: &[f64]) -> Result<f64, EosError> {
        Ok(self.form_factors.f_0(arguments[0]) / self.form_factors.f_p(arguments[0]))
    }
}

/// Registers `<process>::f_+(q2)`, `f_0(q2)`, `f_T(q2)` and `f_0(q2)/f_+(q2)`
/// for every supported transition.
pub fn register(registry: &mut ObservableRegistry) -> Result<(), EosError> {
    let methods: [(&str, &str, Method<FormFactorObservables>); 4] = [
        ("f_+(q2)", "f_+", FormFactorObservables::f_p),
        ("f_0(q2)", "f_0", FormFactorObservables::f_0),
        ("f_T(q2)", "f_T", FormFactorObservables::f_t),
        ("f_0(q2)/f_+(q2)", "f_0/f_+", FormFactorObservables::f_0_over_f_p),
    ];
    let mut groups = Vec::with_capacity(Process::ALL.len());
    for process in Process::ALL {
        let forced = Options::from_pairs([("process", process.label)]);
        let mut names = Vec::with_capacity(methods.len());
        for (suffix, latex, method) in methods {
            let name = format!("{}::{}", process.label, suffix);
            let latex = format!("{latex}^{{{}}}(q^2)", process.label);
            registry.insert(ConcreteEntry::<FormFactorObservables>::new(
                &name,
                &latex,
                Unit::None,
                method,
                &["q2"],
                forced.clone(),
            )?)?;
            names.push(name.parse()?);
        }
        groups.push(ObservableGroup {
            title: format!("Form factors for {}", process.label),
            description: "The option \"form-factors\" selects the parametrisation.".to_string(),
            names,
        });
    }
    registry.add_section(ObservableSection {
        title: "Form factors".to_string(),
        description: "Hadronic matrix elements of pseudoscalar-to-pseudoscalar transitions.".to_string(),
        groups,
    });
    Ok(())
}
