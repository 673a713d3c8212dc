#![deny(missing_docs)]
#![doc = "Observable entries, the observable registry, expression observables and evaluation caches for the EOS engine."]

pub mod cache;
pub mod entry;
pub mod expression;
pub mod observable;
pub mod parameter;
pub mod provider;
pub mod registry;
pub mod set;

pub use cache::{CacheId, CachedValue, ObservableCache};
pub use entry::{EntryMetadata, ObservableEntry};
pub use expression::{
    BinaryOperator, Expression, ExpressionEntry, ExpressionObservable, Function, KinematicsSpecification,
};
pub use observable::{Observable, ObservableKey, ObservablePtr};
pub use parameter::ParameterObservable;
pub use provider::{ConcreteEntry, ConcreteObservable, Method, Provider};
pub use registry::{
    install, install_with, instance, is_installed, make, teardown, ObservableGroup,
    ObservableRegistry, ObservableSection,
};
pub use set::ObservableSet;
