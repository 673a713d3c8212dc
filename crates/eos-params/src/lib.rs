#![deny(missing_docs)]
#![doc = "Parameter worlds, the built-in default table and parameter dependency tracking for the EOS engine."]

pub mod defaults;
pub mod parameters;
pub mod user;

pub use defaults::{DefaultTable, DEFAULT_SOURCES};
pub use parameters::{Parameter, ParameterGroup, ParameterId, ParameterSection, Parameters};
pub use user::{ParameterUser, UsedParameter, UsesParameters};
