//! Models supplying CKM elements, Wilson coefficients and quark masses.
//!
//! The model is chosen at construction through the `model` option:
//!
//! | value | CKM elements | Wilson coefficients |
//! |---|---|---|
//! | `SM` | Wolfenstein parameters | Standard Model |
//! | `CKM`, `CKMScan` | `CKM::abs(V_xy)`, `CKM::arg(V_xy)` | Standard Model |
//! | `WET` | as `CKM` | `<sector>::Re{c}`, `<sector>::Im{c}` |
//!
//! Quark masses are the MSbar parameters of the world, taken at their
//! reference scales.

use std::fmt;

use eos_core::{EosError, ErrorInfo, LeptonFlavor, OptionSchema};
use eos_params::{ParameterUser, Parameters, UsedParameter, UsesParameters};
use num_complex::Complex64;

/// Values accepted by the `model` option.
pub const MODEL_NAMES: [&str; 4] = ["SM", "CKM", "CKMScan", "WET"];

/// Electroweak correction to the semileptonic vector coupling.
pub const ETA_EW: f64 = 1.0066;

/// Schema fragment for the `model` option.
pub fn option_schema() -> OptionSchema {
    OptionSchema::new().declare("model", &MODEL_NAMES, Some("SM"))
}

/// Coefficients of the `b -> U l nu` effective Hamiltonian.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChargedCurrentCoefficients {
    /// Left-handed vector.
    pub cvl: Complex64,
    /// Right-handed vector.
    pub cvr: Complex64,
    /// Left-handed scalar.
    pub csl: Complex64,
    /// Right-handed scalar.
    pub csr: Complex64,
    /// Tensor.
    pub ct: Complex64,
}

impl ChargedCurrentCoefficients {
    /// Standard Model values.
    pub fn standard_model() -> Self {
        let zero = Complex64::new(0.0, 0.0);
        Self {
            cvl: Complex64::new(ETA_EW, 0.0),
            cvr: zero,
            csl: zero,
            csr: zero,
            ct: zero,
        }
    }

    /// Complex conjugate of every coefficient.
    pub fn conj(self) -> Self {
        Self {
            cvl: self.cvl.conj(),
            cvr: self.cvr.conj(),
            csl: self.csl.conj(),
            csr: self.csr.conj(),
            ct: self.ct.conj(),
        }
    }
}

/// Source of CKM elements, Wilson coefficients and quark masses.
pub trait Model: UsesParameters + Send + Sync + fmt::Debug {
    /// `V_ub`.
    fn ckm_ub(&self) -> Complex64;

    /// `V_cb`.
    fn ckm_cb(&self) -> Complex64;

    /// Coefficients for `b -> u l nu`.
    fn wet_ublnu(&self, lepton: LeptonFlavor, cp_conjugate: bool) -> ChargedCurrentCoefficients;

    /// Coefficients for `b -> c l nu`.
    fn wet_cblnu(&self, lepton: LeptonFlavor, cp_conjugate: bool) -> ChargedCurrentCoefficients;

    /// MSbar bottom mass.
    fn m_b_msbar(&self) -> f64;

    /// MSbar up mass.
    fn m_u_msbar(&self) -> f64;

    /// MSbar charm mass.
    fn m_c_msbar(&self) -> f64;
}

/// Builds the model called `name` over `parameters`.
pub fn make_model(name: &str, parameters: &Parameters) -> Result<Box<dyn Model>, EosError> {
    match name {
        "SM" => Ok(Box::new(StandardModel::new(parameters)?)),
        "CKM" | "CKMScan" => Ok(Box::new(CkmScanModel::new(parameters)?)),
        "WET" => Ok(Box::new(WilsonScanModel::new(parameters)?)),
        other => Err(EosError::Option(
            ErrorInfo::new("eos_physics.unknown_model", "no model of that name")
                .with_context("key", "model")
                .with_context("value", other)
                .with_hint(format!("known models: {}", MODEL_NAMES.join(", "))),
        )),
    }
}

#[derive(Debug, Clone)]
struct QuarkMasses {
    m_b: UsedParameter,
    m_c: UsedParameter,
    m_u: UsedParameter,
}

impl QuarkMasses {
    fn new(parameters: &Parameters, user: &mut ParameterUser) -> Result<Self, EosError> {
        Ok(Self {
            m_b: UsedParameter::new(parameters.get("mass::b(MSbar)")?, user),
            m_c: UsedParameter::new(parameters.get("mass::c(MSbar)")?, user),
            m_u: UsedParameter::new(parameters.get("mass::u(2GeV)")?, user),
        })
    }
}

/// Standard Model with Wolfenstein-parametrised CKM matrix.
#[derive(Debug, Clone)]
pub struct StandardModel {
    a: UsedParameter,
    lambda: UsedParameter,
    rhobar: UsedParameter,
    etabar: UsedParameter,
    masses: QuarkMasses,
    user: ParameterUser,
}

impl StandardModel {
    /// Reads the Wolfenstein parameters and quark masses.
    pub fn new(parameters: &Parameters) -> Result<Self, EosError> {
        let mut user = ParameterUser::new();
        Ok(Self {
            a: UsedParameter::new(parameters.get("CKM::A")?, &mut user),
            lambda: UsedParameter::new(parameters.get("CKM::lambda")?, &mut user),
            rhobar: UsedParameter::new(parameters.get("CKM::rhobar")?, &mut user),
            etabar: UsedParameter::new(parameters.get("CKM::etabar")?, &mut user),
            masses: QuarkMasses::new(parameters, &mut user)?,
            user,
        })
    }

    /// `s13 exp(i delta)` of the standard parametrisation.
    fn s13_phase(&self) -> Complex64 {
        let a = self.a.value();
        let lambda = self.lambda.value();
        let a2l4 = a * a * lambda.powi(4);
        let rhoeta = Complex64::new(self.rhobar.value(), self.etabar.value());
        a * lambda.powi(3) * rhoeta * (1.0 - a2l4).sqrt() / ((1.0 - lambda * lambda).sqrt() * (1.0 - a2l4 * rhoeta))
    }
}

impl UsesParameters for StandardModel {
    fn parameter_user(&self) -> &ParameterUser {
        &self.user
    }
}

impl Model for StandardModel {
    fn ckm_ub(&self) -> Complex64 {
        self.s13_phase().conj()
    }

    fn ckm_cb(&self) -> Complex64 {
        let lambda = self.lambda.value();
        let s23 = self.a.value() * lambda * lambda;
        let c13 = (1.0 - self.s13_phase().norm_sqr()).sqrt();
        Complex64::new(s23 * c13, 0.0)
    }

    fn wet_ublnu(&self, _lepton: LeptonFlavor, _cp_conjugate: bool) -> ChargedCurrentCoefficients {
        ChargedCurrentCoefficients::standard_model()
    }

    fn wet_cblnu(&self, _lepton: LeptonFlavor, _cp_conjugate: bool) -> ChargedCurrentCoefficients {
        ChargedCurrentCoefficients::standard_model()
    }

    fn m_b_msbar(&self) -> f64 {
        self.masses.m_b.value()
    }

    fn m_u_msbar(&self) -> f64 {
        self.masses.m_u.value()
    }

    fn m_c_msbar(&self) -> f64 {
        self.masses.m_c.value()
    }
}

/// Standard Model dynamics with CKM elements taken as free parameters.
#[derive(Debug, Clone)]
pub struct CkmScanModel {
    abs_ub: UsedParameter,
    arg_ub: UsedParameter,
    abs_cb: UsedParameter,
    arg_cb: UsedParameter,
    masses: QuarkMasses,
    user: ParameterUser,
}

impl CkmScanModel {
    /// Reads `|V_ub|`, `|V_cb|`, their phases and the quark masses.
    pub fn new(parameters: &Parameters) -> Result<Self, EosError> {
        let mut user = ParameterUser::new();
        Ok(Self {
            abs_ub: UsedParameter::new(parameters.get("CKM::abs(V_ub)")?, &mut user),
            arg_ub: UsedParameter::new(parameters.get("CKM::arg(V_ub)")?, &mut user),
            abs_cb: UsedParameter::new(parameters.get("CKM::abs(V_cb)")?, &mut user),
            arg_cb: UsedParameter::new(parameters.get("CKM::arg(V_cb)")?, &mut user),
            masses: QuarkMasses::new(parameters, &mut user)?,
            user,
        })
    }
}

impl UsesParameters for CkmScanModel {
    fn parameter_user(&self) -> &ParameterUser {
        &self.user
    }
}

impl Model for CkmScanModel {
    fn ckm_ub(&self) -> Complex64 {
        Complex64::from_polar(self.abs_ub.value(), self.arg_ub.value())
    }

    fn ckm_cb(&self) -> Complex64 {
        Complex64::from_polar(self.abs_cb.value(), self.arg_cb.value())
    }

    fn wet_ublnu(&self, _lepton: LeptonFlavor, _cp_conjugate: bool) -> ChargedCurrentCoefficients {
        ChargedCurrentCoefficients::standard_model()
    }

    fn wet_cblnu(&self, _lepton: LeptonFlavor, _cp_conjugate: bool) -> ChargedCurrentCoefficients {
        ChargedCurrentCoefficients::standard_model()
    }

    fn m_b_msbar(&self) -> f64 {
        self.masses.m_b.value()
    }

    fn m_u_msbar(&self) -> f64 {
        self.masses.m_u.value()
    }

    fn m_c_msbar(&self) -> f64 {
        self.masses.m_c.value()
    }
}

const COEFFICIENT_NAMES: [&str; 5] = ["cVL", "cVR", "cSL", "cSR", "cT"];

#[derive(Debug, Clone)]
struct SectorCoefficients {
    real: Vec<UsedParameter>,
    imaginary: Vec<UsedParameter>,
}

impl SectorCoefficients {
    fn new(parameters: &Parameters, sector: &str, user: &mut ParameterUser) -> Result<Self, EosError> {
        let mut real = Vec::with_capacity(COEFFICIENT_NAMES.len());
        let mut imaginary = Vec::with_capacity(COEFFICIENT_NAMES.len());
        for name in COEFFICIENT_NAMES {
            real.push(UsedParameter::new(parameters.get(&format!("{sector}::Re{{{name}}}"))?, user));
            imaginary.push(UsedParameter::new(parameters.get(&format!("{sector}::Im{{{name}}}"))?, user));
        }
        Ok(Self { real, imaginary })
    }

    fn value(&self, index: usize) -> Complex64 {
        Complex64::new(self.real[index].value(), self.imaginary[index].value())
    }

    fn coefficients(&self, cp_conjugate: bool) -> ChargedCurrentCoefficients {
        let coefficients = ChargedCurrentCoefficients {
            cvl: self.value(0),
            cvr: self.value(1),
            csl: self.value(2),
            csr: self.value(3),
            ct: self.value(4),
        };
        if cp_conjugate {
            coefficients.conj()
        } else {
            coefficients
        }
    }
}

/// Parameter prefix of the `b -> U l nu` sector, e.g. `ubmunumu`.
pub fn sector_name(up_quark: &str, lepton: LeptonFlavor) -> String {
    let l = lepton.as_str();
    format!("{up_quark}b{l}nu{l}")
}

/// Weak effective theory with free charged-current Wilson coefficients.
#[derive(Debug, Clone)]
pub struct WilsonScanModel {
    ckm: CkmScanModel,
    ublnu: Vec<SectorCoefficients>,
    cblnu: Vec<SectorCoefficients>,
    user: ParameterUser,
}

impl WilsonScanModel {
    /// Reads the CKM scan inputs and the coefficients of every lepton flavour.
    pub fn new(parameters: &Parameters) -> Result<Self, EosError> {
        let ckm = CkmScanModel::new(parameters)?;
        let mut user = ParameterUser::new();
        user.uses_all(ckm.parameter_user());
        let mut ublnu = Vec::with_capacity(LeptonFlavor::ALL.len());
        let mut cblnu = Vec::with_capacity(LeptonFlavor::ALL.len());
        for lepton in LeptonFlavor::ALL {
            ublnu.push(SectorCoefficients::new(parameters, &sector_name("u", lepton), &mut user)?);
            cblnu.push(SectorCoefficients::new(parameters, &sector_name("c", lepton), &mut user)?);
        }
        Ok(Self { ckm, ublnu, cblnu, user })
    }
}

fn lepton_index(lepton: LeptonFlavor) -> usize {
    match lepton {
        LeptonFlavor::Electron => 0,
        LeptonFlavor::Muon => 1,
        LeptonFlavor::Tauon => 2,
    }
}

impl UsesParameters for WilsonScanModel {
    fn parameter_user(&self) -> &ParameterUser {
        &self.user
    }
}

impl Model for WilsonScanModel {
    fn ckm_ub(&self) -> Complex64 {
        self.ckm.ckm_ub()
    }

    fn ckm_cb(&self) -> Complex64 {
        self.ckm.ckm_cb()
    }

    fn wet_ublnu(&self, lepton: LeptonFlavor, cp_conjugate: bool) -> ChargedCurrentCoefficients {
        self.ublnu[lepton_index(lepton)].coefficients(cp_conjugate)
    }

    fn wet_cblnu(&self, lepton: LeptonFlavor, cp_conjugate: bool) -> ChargedCurrentCoefficients {
        self.cblnu[lepton_index(lepton)].coefficients(cp_conjugate)
    }

    fn m_b_msbar(&self) -> f64 {
        self.ckm.m_b_msbar()
    }

    fn m_u_msbar(&self) -> f64 {
        self.ckm.m_u_msbar()
    }

    fn m_c_msbar(&self) -> f64 {
        self.ckm.m_c_msbar()
    }
}
