#![deny(missing_docs)]
#![doc = "Shared building blocks of the EOS engine: errors, qualified names, options, kinematics and worker infrastructure."]

pub mod config;
pub mod errors;
pub mod flavor;
pub mod kinematics;
pub mod options;
pub mod qualified_name;
pub mod rng;
pub mod thread_pool;
pub mod units;

pub use config::{EngineConfig, IntegrationConfig, RangePolicy};
pub use errors::{EosError, ErrorInfo, ErrorKind};
pub use flavor::{LeptonFlavor, QuarkFlavor};
pub use kinematics::{KinematicVariable, Kinematics, KinematicsSnapshot};
pub use options::{
    BooleanOption, FloatOption, IntegerOption, LeptonFlavorOption, OptionRecord, OptionSchema,
    OptionSpecification, Options, QuarkFlavorOption, SpecifiedOption, TypedOption,
};
pub use qualified_name::QualifiedName;
pub use rng::{derive_substream_seed, RngHandle};
pub use thread_pool::{ThreadPool, Ticket};
pub use units::Unit;
