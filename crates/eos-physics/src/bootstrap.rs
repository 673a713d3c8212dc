//! Explicit registration pass and the installed registry's lifecycle.

use std::sync::{Arc, PoisonError, RwLock};

use eos_core::{EngineConfig, EosError, IntegrationConfig};
use eos_observable::ObservableRegistry;

use crate::{b_to_psd_l_nu, form_factors};

static INTEGRATION: RwLock<Option<IntegrationConfig>> = RwLock::new(None);

/// Quadrature tolerances handed to newly built observables.
pub fn integration_config() -> IntegrationConfig {
    INTEGRATION
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .unwrap_or_default()
}

/// Builds a registry holding every physics observable, in a fixed order.
pub fn build_registry() -> Result<ObservableRegistry, EosError> {
    let mut registry = ObservableRegistry::new();
    form_factors::register(&mut registry)?;
    b_to_psd_l_nu::register(&mut registry)?;
    tracing::debug!(count = registry.len(), sections = registry.sections().len(), "physics observables registered");
    Ok(registry)
}

/// Installs the physics registry unless one is installed already.
pub fn init() -> Result<Arc<ObservableRegistry>, EosError> {
    eos_observable::install_with(build_registry)
}

/// Applies `config` to observables built from now on, then [`init`]s.
pub fn init_with(config: &EngineConfig) -> Result<Arc<ObservableRegistry>, EosError> {
    config.integration.validate()?;
    *INTEGRATION.write().unwrap_or_else(PoisonError::into_inner) = Some(config.integration);
    init()
}

/// Removes the installed registry; returns whether one was installed.
pub fn teardown() -> bool {
    eos_observable::teardown()
}
