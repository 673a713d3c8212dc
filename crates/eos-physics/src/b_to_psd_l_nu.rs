//! Semileptonic `B -> P l nu` decays into a pseudoscalar meson.
//!
//! Helicity amplitudes include vector, scalar and tensor couplings of the
//! weak effective theory. Every observable is a method of
//! [`BToPseudoscalarLeptonNeutrino`] taking the bound kinematic values as
//! arguments; integrated observables use adaptive quadrature over `q2`.

use std::f64::consts::PI;

use eos_core::{
    BooleanOption, EosError, ErrorInfo, IntegrationConfig, LeptonFlavor, LeptonFlavorOption, OptionRecord, OptionSchema,
    Options, QuarkFlavor, QuarkFlavorOption, SpecifiedOption, Unit,
};
use eos_observable::{ConcreteEntry, ObservableGroup, ObservableRegistry, ObservableSection, Provider};
use eos_params::{ParameterUser, Parameters, UsedParameter};
use num_complex::Complex64;

use crate::bootstrap::integration_config;
use crate::form_factors::{self, make_form_factors, FormFactors, Process};
use crate::integrate::integrate;
use crate::model::{self, make_model, ChargedCurrentCoefficients, Model};

/// Resolved `(q, P)` combination.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Channel {
    /// Form-factor transition.
    pub process: Process,
    /// Up-type quark of the `b -> U` current.
    pub transition: QuarkFlavor,
    /// Name suffix of the initial meson (`mass::<B>`, `life_time::<B>`).
    pub initial: &'static str,
    /// Name suffix of the final meson (`mass::<P>`).
    pub final_state: &'static str,
    /// Isospin factor of the final state.
    pub isospin: f64,
}

impl Channel {
    /// Channel for spectator `q` and final state `p`.
    pub fn resolve(q: QuarkFlavor, p: &str) -> Result<Channel, EosError> {
        let channel = |process, transition, initial, final_state, isospin| Channel {
            process,
            transition,
            initial,
            final_state,
            isospin,
        };
        match (q, p) {
            (QuarkFlavor::Up, "D") => Ok(channel(Process::B_TO_D, QuarkFlavor::Charm, "B_u", "D_u", 1.0)),
            (QuarkFlavor::Down, "D") => Ok(channel(Process::B_TO_D, QuarkFlavor::Charm, "B_d", "D_d", 1.0)),
            (QuarkFlavor::Up, "pi") => Ok(channel(Process::B_TO_PI, QuarkFlavor::Up, "B_u", "pi^0", std::f64::consts::FRAC_1_SQRT_2)),
            (QuarkFlavor::Down, "pi") => Ok(channel(Process::B_TO_PI, QuarkFlavor::Up, "B_d", "pi^+", 1.0)),
            (QuarkFlavor::Strange, "K") => Ok(channel(Process::BS_TO_K, QuarkFlavor::Up, "B_s", "K_u", 1.0)),
            _ => Err(EosError::Option(
                ErrorInfo::new("eos_physics.unsupported_channel", "unsupported combination of spectator and final state")
                    .with_context("q", q.as_str())
                    .with_context("P", p),
            )),
        }
    }
}

/// Helicity amplitudes at one `q2`, zero outside the physical region.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Amplitudes {
    /// Longitudinal.
    pub h_0: Complex64,
    /// Timelike.
    pub h_t: Complex64,
    /// Scalar.
    pub h_s: Complex64,
    /// Tensor.
    pub h_tensor: Complex64,
    /// Timelike and scalar combined.
    pub h_ts: Complex64,
    /// Lepton velocity `1 - m_l^2 / q2` in the dilepton frame.
    pub v: f64,
    /// Final-state momentum in the `B` rest frame.
    pub p: f64,
    /// Normalisation.
    pub nf: f64,
}

impl Amplitudes {
    fn zero() -> Self {
        let zero = Complex64::new(0.0, 0.0);
        Self {
            h_0: zero,
            h_t: zero,
            h_s: zero,
            h_tensor: zero,
            h_ts: zero,
            v: 0.99,
            p: 0.0,
            nf: 0.0,
        }
    }

    /// `m_l / sqrt(q2)`.
    fn ml_hat(&self) -> f64 {
        (1.0 - self.v).sqrt()
    }
}

/// Källén function.
pub fn kallen(a: f64, b: f64, c: f64) -> f64 {
    a * a + b * b + c * c - 2.0 * (a * b + a * c + b * c)
}

/// Options of a `B -> P l nu` observable, read against its schema.
#[derive(Debug, Clone, PartialEq)]
pub struct SemileptonicOptions {
    /// Spectator quark.
    pub q: QuarkFlavor,
    /// Final-state meson (`D`, `pi` or `K`).
    pub final_state: String,
    /// Charged lepton.
    pub lepton: LeptonFlavor,
    /// Whether to use the CP-conjugated Wilson coefficients.
    pub cp_conjugate: bool,
    /// Model name.
    pub model: String,
    /// Form-factor parametrisation.
    pub form_factors: String,
}

impl OptionRecord for SemileptonicOptions {
    fn schema() -> OptionSchema {
        model::option_schema()
            .extend(&form_factors::option_schema())
            .declare("P", &["D", "pi", "K"], None)
            .declare("cp-conjugate", &["true", "false"], Some("false"))
            .declare("l", &["e", "mu", "tau"], Some("mu"))
            .declare("q", &["u", "d", "s"], Some("d"))
    }

    fn read(options: &Options) -> Result<Self, EosError> {
        let schema = Self::schema();
        Ok(Self {
            q: QuarkFlavorOption::new(options, &schema, "q")?.value(),
            final_state: SpecifiedOption::new(options, &schema, "P")?.value().to_string(),
            lepton: LeptonFlavorOption::new(options, &schema, "l")?.value(),
            cp_conjugate: BooleanOption::new(options, &schema, "cp-conjugate")?.value(),
            model: SpecifiedOption::new(options, &schema, "model")?.value().to_string(),
            form_factors: SpecifiedOption::new(options, &schema, "form-factors")?.value().to_string(),
        })
    }
}

/// `B -> P l nu` observables.
#[derive(Debug)]
pub struct BToPseudoscalarLeptonNeutrino {
    model: Box<dyn Model>,
    form_factors: Box<dyn FormFactors>,
    channel: Channel,
    lepton: LeptonFlavor,
    cp_conjugate: bool,
    m_b: UsedParameter,
    tau_b: UsedParameter,
    m_p: UsedParameter,
    m_l: UsedParameter,
    g_fermi: UsedParameter,
    hbar: UsedParameter,
    integration: IntegrationConfig,
}

impl Provider for BToPseudoscalarLeptonNeutrino {
    fn option_schema() -> OptionSchema {
        SemileptonicOptions::schema()
    }

    fn new(parameters: &Parameters, options: &Options, user: &mut ParameterUser) -> Result<Self, EosError> {
        let record = SemileptonicOptions::read(options)?;
        let channel = Channel::resolve(record.q, &record.final_state)?;
        let lepton = record.lepton;
        let model = make_model(&record.model, parameters)?;
        let form_factors = make_form_factors(&channel.process, &record.form_factors, parameters)?;
        user.uses_all(model.parameter_user());
        user.uses_all(form_factors.parameter_user());

        Ok(Self {
            m_b: UsedParameter::new(parameters.get(&format!("mass::{}", channel.initial))?, user),
            tau_b: UsedParameter::new(parameters.get(&format!("life_time::{}", channel.initial))?, user),
            m_p: UsedParameter::new(parameters.get(&format!("mass::{}", channel.final_state))?, user),
            m_l: UsedParameter::new(parameters.get(&format!("mass::{lepton}"))?, user),
            g_fermi: UsedParameter::new(parameters.get("WET::G_Fermi")?, user),
            hbar: UsedParameter::new(parameters.get("QM::hbar")?, user),
            cp_conjugate: record.cp_conjugate,
            integration: integration_config(),
            model,
            form_factors,
            channel,
            lepton,
        })
    }

    fn description() -> &'static str {
        "semileptonic decays of B mesons into a pseudoscalar meson"
    }

    fn references() -> &'static [&'static str] {
        &["DDS:2014A", "STTW:2013A"]
    }
}

impl BToPseudoscalarLeptonNeutrino {
    fn coefficients(&self) -> ChargedCurrentCoefficients {
        match self.channel.transition {
            QuarkFlavor::Charm => self.model.wet_cblnu(self.lepton, self.cp_conjugate),
            _ => self.model.wet_ublnu(self.lepton, self.cp_conjugate),
        }
    }

    fn ckm(&self) -> Complex64 {
        match self.channel.transition {
            QuarkFlavor::Charm => self.model.ckm_cb(),
            _ => self.model.ckm_ub(),
        }
    }

    fn m_up_msbar(&self) -> f64 {
        match self.channel.transition {
            QuarkFlavor::Charm => self.model.m_c_msbar(),
            _ => self.model.m_u_msbar(),
        }
    }

    /// Smallest kinematically allowed `q2`.
    pub fn q2_min(&self) -> f64 {
        self.m_l.value().powi(2)
    }

    /// Largest kinematically allowed `q2`.
    pub fn q2_max(&self) -> f64 {
        (self.m_b.value() - self.m_p.value()).powi(2)
    }

    /// Helicity amplitudes at `s = q2`.
    pub fn amplitudes(&self, s: f64) -> Amplitudes {
        if s < self.q2_min() || s > self.q2_max() {
            return Amplitudes::zero();
        }
        let wc = self.coefficients();
        let g_v = wc.cvr + (wc.cvl - 1.0);
        let g_s = wc.csr + wc.csl;
        let g_t = wc.ct;

        let f_p = self.form_factors.f_p(s);
        let f_0 = self.form_factors.f_0(s);
        let f_t = self.form_factors.f_t(s);

        let m_b = self.m_b.value();
        let m_b2 = m_b * m_b;
        let m_p = self.m_p.value();
        let m_p2 = m_p * m_p;
        let p = kallen(m_b2, m_p2, s).sqrt() / (2.0 * m_b);
        let m_l = self.m_l.value();
        let v = 1.0 - m_l * m_l / s;
        let nf = v * v * s * self.g_fermi.value().powi(2) / (256.0 * PI.powi(3) * m_b2);
        let isospin = self.channel.isospin;
        let sqrt_s = s.sqrt();

        let h_0 = isospin * 2.0 * m_b * p * f_p * (1.0 + g_v) / sqrt_s;
        let h_t = isospin * (1.0 + g_v) * (m_b2 - m_p2) * f_0 / sqrt_s;
        let h_s = -isospin * g_s * (m_b2 - m_p2) * f_0 / (self.model.m_b_msbar() - self.m_up_msbar());
        let h_tensor = -isospin * 2.0 * m_b * p * f_t * g_t / (m_b + m_p);
        let ml_hat = (1.0 - v).sqrt();

        Amplitudes {
            h_0,
            h_t,
            h_s,
            h_tensor,
            h_ts: h_t - h_s / ml_hat,
            v,
            p,
            nf,
        }
    }

    fn normalized_two_differential_decay_width(&self, s: f64, c_theta_l: f64) -> f64 {
        let a = self.amplitudes(s);
        let c2 = c_theta_l * c_theta_l;
        let s2 = 1.0 - c2;
        let c_2theta = 2.0 * c2 - 1.0;
        2.0 * a.nf
            * a.p
            * (a.h_0.norm_sqr() * s2
                + (1.0 - a.v) * (a.h_0 * c_theta_l - a.h_ts).norm_sqr()
                + 8.0
                    * (((2.0 - a.v) + a.v * c_2theta) * a.h_tensor.norm_sqr()
                        - a.ml_hat() * (a.h_tensor * (a.h_0.conj() - a.h_ts.conj() * c_theta_l)).re))
    }

    fn normalized_differential_decay_width(&self, s: f64) -> f64 {
        let a = self.amplitudes(s);
        4.0 / 3.0
            * a.nf
            * a.p
            * (a.h_0.norm_sqr() * (3.0 - a.v)
                + 3.0 * a.h_ts.norm_sqr() * (1.0 - a.v)
                + 16.0 * a.h_tensor.norm_sqr() * (3.0 - 2.0 * a.v)
                - 24.0 * a.ml_hat() * (a.h_tensor * a.h_0.conj()).re)
    }

    fn normalized_differential_decay_width_p(&self, s: f64) -> f64 {
        let a = self.amplitudes(s);
        4.0 / 3.0 * a.nf * a.p * a.h_0.norm_sqr() * (3.0 - a.v)
    }

    fn normalized_differential_decay_width_0(&self, s: f64) -> f64 {
        let a = self.amplitudes(s);
        4.0 / 3.0 * a.nf * a.p * 3.0 * a.h_t.norm_sqr() * (1.0 - a.v)
    }

    fn numerator_a_fb(&self, s: f64) -> f64 {
        let a = self.amplitudes(s);
        -4.0 * a.nf
            * a.p
            * ((a.h_0 * a.h_ts.conj()).re * (1.0 - a.v) - 4.0 * a.ml_hat() * (a.h_tensor * a.h_ts.conj()).re)
    }

    fn numerator_flat_term(&self, s: f64) -> f64 {
        let a = self.amplitudes(s);
        4.0 * a.nf
            * a.p
            * ((a.h_0.norm_sqr() + a.h_ts.norm_sqr()) * (1.0 - a.v) + 16.0 * a.h_tensor.norm_sqr()
                - 8.0 * a.ml_hat() * (a.h_tensor * a.h_0.conj()).re)
    }

    fn numerator_lepton_polarization(&self, s: f64) -> f64 {
        let a = self.amplitudes(s);
        let ml_hat = a.ml_hat();
        let plus = (a.h_0.norm_sqr() + 3.0 * a.h_t.norm_sqr()) * (1.0 - a.v) / 2.0
            + 1.5 * a.h_s.norm_sqr()
            + 8.0 * a.h_tensor.norm_sqr()
            - ml_hat * (3.0 * a.h_t * a.h_s.conj() + 4.0 * a.h_0 * a.h_tensor.conj()).re;
        let minus = a.h_0.norm_sqr() + 16.0 * a.h_tensor.norm_sqr() * (1.0 - a.v)
            - 8.0 * ml_hat * (a.h_0 * a.h_tensor.conj()).re;
        8.0 / 3.0 * a.nf * a.p * (plus - minus)
    }

    fn to_branching_ratio(&self) -> f64 {
        self.tau_b.value() / self.hbar.value()
    }

    fn normalized_differential_branching_ratio(&self, s: f64) -> f64 {
        self.normalized_differential_decay_width(s) * self.to_branching_ratio()
    }

    fn differential_decay_width(&self, s: f64) -> f64 {
        self.normalized_differential_decay_width(s) * self.ckm().norm_sqr()
    }

    fn integrated<F: Fn(f64) -> f64>(&self, integrand: F, q2_min: f64, q2_max: f64) -> Result<f64, EosError> {
        integrate(integrand, q2_min, q2_max, &self.integration)
    }

    /// `dBR/dq2` at `q2`.
    pub fn differential_branching_ratio(&self, arguments: &[f64]) -> Result<f64, EosError> {
        Ok(self.differential_decay_width(arguments[0]) * self.to_branching_ratio())
    }

    /// `d^2BR/dq2/dcos(theta_l)` at `(q2, cos(theta_l))`.
    pub fn two_differential_branching_ratio(&self, arguments: &[f64]) -> Result<f64, EosError> {
        let [s, c_theta_l] = [arguments[0], arguments[1]];
        Ok(self.normalized_two_differential_decay_width(s, c_theta_l) * self.ckm().norm_sqr() * self.to_branching_ratio())
    }

    /// Branching ratio over `[q2_min, q2_max]`.
    pub fn integrated_branching_ratio(&self, arguments: &[f64]) -> Result<f64, EosError> {
        let scale = self.ckm().norm_sqr() * self.to_branching_ratio();
        Ok(self.integrated(|s| self.normalized_differential_decay_width(s), arguments[0], arguments[1])? * scale)
    }

    /// Branching ratio over `[q2_min, q2_max]` for `|V_Ub| = 1`.
    pub fn normalized_integrated_branching_ratio(&self, arguments: &[f64]) -> Result<f64, EosError> {
        self.integrated(|s| self.normalized_differential_branching_ratio(s), arguments[0], arguments[1])
    }

    /// Decay width over `[q2_min, q2_max]` for `|V_Ub| = 1`.
    pub fn normalized_integrated_decay_width(&self, arguments: &[f64]) -> Result<f64, EosError> {
        self.integrated(|s| self.normalized_differential_decay_width(s), arguments[0], arguments[1])
    }

    /// Longitudinal part of [`Self::normalized_integrated_decay_width`].
    pub fn normalized_integrated_decay_width_p(&self, arguments: &[f64]) -> Result<f64, EosError> {
        self.integrated(|s| self.normalized_differential_decay_width_p(s), arguments[0], arguments[1])
    }

    /// Timelike part of [`Self::normalized_integrated_decay_width`].
    pub fn normalized_integrated_decay_width_0(&self, arguments: &[f64]) -> Result<f64, EosError> {
        self.integrated(|s| self.normalized_differential_decay_width_0(s), arguments[0], arguments[1])
    }

    /// Leptonic forward-backward asymmetry at `q2`.
    pub fn differential_a_fb_leptonic(&self, arguments: &[f64]) -> Result<f64, EosError> {
        let s = arguments[0];
        ratio(self.numerator_a_fb(s), self.normalized_differential_decay_width(s), "A_FB(q2)")
    }

    /// Leptonic forward-backward asymmetry over `[q2_min, q2_max]`.
    pub fn integrated_a_fb_leptonic(&self, arguments: &[f64]) -> Result<f64, EosError> {
        let numerator = self.integrated(|s| self.numerator_a_fb(s), arguments[0], arguments[1])?;
        let denominator = self.integrated(|s| self.normalized_differential_decay_width(s), arguments[0], arguments[1])?;
        ratio(numerator, denominator, "A_FB")
    }

    /// Flat term `F_H` over `[q2_min, q2_max]`.
    pub fn integrated_flat_term(&self, arguments: &[f64]) -> Result<f64, EosError> {
        let numerator = self.integrated(|s| self.numerator_flat_term(s), arguments[0], arguments[1])?;
        let denominator = self.integrated(|s| self.normalized_differential_decay_width(s), arguments[0], arguments[1])?;
        ratio(numerator, denominator, "F_H")
    }

    /// Longitudinal lepton polarisation `A_l` over `[q2_min, q2_max]`.
    pub fn integrated_lepton_polarization(&self, arguments: &[f64]) -> Result<f64, EosError> {
        let numerator = self.integrated(|s| self.numerator_lepton_polarization(s), arguments[0], arguments[1])?;
        let denominator = self.integrated(|s| self.normalized_differential_decay_width(s), arguments[0], arguments[1])?;
        ratio(numerator, denominator, "A_l")
    }

    fn total_normalized_branching_ratio(&self) -> Result<f64, EosError> {
        self.integrated(|s| self.normalized_differential_branching_ratio(s), self.q2_min(), self.q2_max())
    }

    /// Probability density of `q2`.
    pub fn differential_pdf_q2(&self, arguments: &[f64]) -> Result<f64, EosError> {
        let total = self.total_normalized_branching_ratio()?;
        ratio(self.normalized_differential_branching_ratio(arguments[0]), total, "P(q2)")
    }

    /// Mean probability density of `q2` over `[q2_min, q2_max]`.
    pub fn integrated_pdf_q2(&self, arguments: &[f64]) -> Result<f64, EosError> {
        let [q2_min, q2_max] = [arguments[0], arguments[1]];
        let partial = self.integrated(|s| self.normalized_differential_branching_ratio(s), q2_min, q2_max)?;
        let total = self.total_normalized_branching_ratio()?;
        ratio(partial, total * (q2_max - q2_min), "P(q2_min,q2_max)")
    }
}

fn ratio(numerator: f64, denominator: f64, observable: &str) -> Result<f64, EosError> {
    let value = numerator / denominator;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(EosError::Numeric(
            ErrorInfo::new("eos_physics.non_finite_value", "observable is not finite at this point")
                .with_context("name", observable)
                .with_context("numerator", numerator.to_string())
                .with_context("denominator", denominator.to_string())
                .with_hint("the kinematics may lie outside the physical region"),
        ))
    }
}

type Method = eos_observable::Method<BToPseudoscalarLeptonNeutrino>;

struct Spec {
    suffix: &'static str,
    latex: &'static str,
    unit: Unit,
    method: Method,
    variables: &'static [&'static str],
}

fn specs() -> Vec<Spec> {
    type P = BToPseudoscalarLeptonNeutrino;
    let spec = |suffix: &'static str, latex: &'static str, unit: Unit, method: Method, variables: &'static [&'static str]| Spec {
        suffix,
        latex,
        unit,
        method,
        variables,
    };
    vec![
        spec("dBR/dq2", r"d\mathcal{B}/dq^2", Unit::InverseGeV2, P::differential_branching_ratio, &["q2"]),
        spec(
            "d^2BR/dq2/dcos(theta_l)",
            r"d^2\mathcal{B}/dq^2/d\cos\theta_\ell",
            Unit::InverseGeV2,
            P::two_differential_branching_ratio,
            &["q2", "cos(theta_l)"],
        ),
        spec("BR", r"\mathcal{B}", Unit::None, P::integrated_branching_ratio, &["q2_min", "q2_max"]),
        spec("width", r"\Gamma", Unit::None, P::normalized_integrated_decay_width, &["q2_min", "q2_max"]),
        spec("width_p", r"\Gamma_P", Unit::None, P::normalized_integrated_decay_width_p, &["q2_min", "q2_max"]),
        spec("width_0", r"\Gamma_0", Unit::None, P::normalized_integrated_decay_width_0, &["q2_min", "q2_max"]),
        spec("A_FB(q2)", r"A_{\mathrm{FB}}(q^2)", Unit::None, P::differential_a_fb_leptonic, &["q2"]),
        spec("A_FB", r"A_{\mathrm{FB}}", Unit::None, P::integrated_a_fb_leptonic, &["q2_min", "q2_max"]),
        spec("P(q2)", r"dP/dq^2", Unit::InverseGeV2, P::differential_pdf_q2, &["q2"]),
        spec("P(q2_min,q2_max)", r"P", Unit::None, P::integrated_pdf_q2, &["q2_min", "q2_max"]),
        spec("A_l", r"A_\ell", Unit::None, P::integrated_lepton_polarization, &["q2_min", "q2_max"]),
        spec("F_H", r"F_H", Unit::None, P::integrated_flat_term, &["q2_min", "q2_max"]),
        spec("zeta", r"\zeta", Unit::None, P::normalized_integrated_branching_ratio, &["q2_min", "q2_max"]),
    ]
}

struct Family {
    prefix: &'static str,
    forced: &'static [(&'static str, &'static str)],
    ratio: &'static str,
    title: &'static str,
}

const FAMILIES: [Family; 3] = [
    Family {
        prefix: "B->pilnu",
        forced: &[("P", "pi")],
        ratio: "R_pi",
        title: r"Observables in $B\to \pi \ell^-\bar\nu$ decays",
    },
    Family {
        prefix: "B->Dlnu",
        forced: &[("P", "D")],
        ratio: "R_D",
        title: r"Observables in $B\to \bar{D} \ell^-\bar\nu$ decays",
    },
    Family {
        prefix: "B_s->Klnu",
        forced: &[("P", "K"), ("q", "s")],
        ratio: "R_K",
        title: r"Observables in $\bar{B}_s\to K \ell^-\bar\nu$ decays",
    },
];

/// Registers the `B -> P l nu` observable groups and their lepton-flavour ratios.
pub fn register(registry: &mut ObservableRegistry) -> Result<(), EosError> {
    let mut groups = Vec::with_capacity(FAMILIES.len());
    for family in &FAMILIES {
        let forced = Options::from_pairs(family.forced.iter().copied());
        let mut names = Vec::new();
        for spec in specs() {
            let name = format!("{}::{}", family.prefix, spec.suffix);
            registry.insert(ConcreteEntry::<BToPseudoscalarLeptonNeutrino>::new(
                &name,
                spec.latex,
                spec.unit,
                spec.method,
                spec.variables,
                forced.clone(),
            )?)?;
            names.push(name.parse()?);
        }
        for (suffix, numerator, denominator) in [
            ("(q2)", "dBR/dq2", "dBR/dq2"),
            ("", "BR", "BR"),
            ("_p", "width_p", "width"),
            ("_0", "width_0", "width"),
        ] {
            let name = format!("{}::{}{}", family.prefix, family.ratio, suffix);
            let expression = if suffix == "(q2)" {
                format!("<<{p}::{numerator};l=tau>> / <<{p}::{denominator};l=mu>>", p = family.prefix)
            } else {
                format!(
                    "<<{p}::{numerator};l=tau>>[q2_max=>q2_tau_max,q2_min=>q2_tau_min] / \
                     <<{p}::{denominator};l=mu>>[q2_max=>q2_mu_max,q2_min=>q2_mu_min]",
                    p = family.prefix
                )
            };
            let latex = format!("{}{}", family.ratio, suffix);
            registry.insert_expression(&name, &latex, Unit::None, forced.clone(), &expression)?;
            names.push(name.parse()?);
        }
        groups.push(ObservableGroup {
            title: family.title.to_string(),
            description: "The option \"l\" selects the charged lepton flavour, \"q\" the spectator quark and \
                          \"form-factors\" the form factor parametrisation."
                .to_string(),
            names,
        });
    }
    registry.add_section(ObservableSection {
        title: "Semileptonic B -> P decays".to_string(),
        description: "Charged-current decays of B mesons into a pseudoscalar meson and a lepton pair.".to_string(),
        groups,
    });
    Ok(())
}
