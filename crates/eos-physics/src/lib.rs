#![deny(missing_docs)]
#![doc = "Physics modules of the EOS engine: quadrature, models, form factors, B -> P l nu and the registry bootstrap."]

pub mod b_to_psd_l_nu;
pub mod bootstrap;
pub mod form_factors;
pub mod integrate;
pub mod model;

pub use b_to_psd_l_nu::{Amplitudes, BToPseudoscalarLeptonNeutrino, Channel, SemileptonicOptions};
pub use bootstrap::{build_registry, init, init_with, integration_config, teardown};
pub use form_factors::{make_form_factors, Bcl2008, FormFactorObservables, FormFactors, Process};
pub use integrate::{integrate, kronrod};
pub use model::{make_model, ChargedCurrentCoefficients, CkmScanModel, Model, StandardModel, WilsonScanModel};
