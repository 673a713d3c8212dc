//! Parameter worlds and the handles that read and write them.
//!
//! A [`Parameters`] value is a handle onto one world: cloning it shares the
//! world, [`Parameters::deep_clone`] copies it. Every [`Parameter`] keeps its
//! world alive and addresses its entry by a [`ParameterId`] that is stable
//! across deep clones, so an observable can be rebound to another world by id.
//!
//! Writes go through the world's [`RangePolicy`] and bump a revision counter.
//! Each entry remembers the revision of its last value write, which is what
//! caches compare against to detect stale results.

use std::collections::{BTreeMap, HashMap};
use std::fmt::{self, Display};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use eos_core::{EngineConfig, EosError, ErrorInfo, QualifiedName, RangePolicy, Unit};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::defaults::DefaultTable;
use crate::user::ParameterUser;

/// Index of a parameter inside its world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParameterId(pub u32);

impl ParameterId {
    /// Position in the world's table.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl Display for ParameterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Stored state of one parameter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct ParameterData {
    pub(crate) name: String,
    pub(crate) latex: String,
    pub(crate) unit: Unit,
    pub(crate) central: f64,
    pub(crate) min: f64,
    pub(crate) max: f64,
    pub(crate) value: f64,
    pub(crate) generator_value: f64,
    pub(crate) nuisance: bool,
    pub(crate) modified_at: u64,
}

impl ParameterData {
    pub(crate) fn new(name: String, latex: String, unit: Unit, central: f64, min: f64, max: f64) -> Self {
        Self {
            name,
            latex,
            unit,
            central,
            min,
            max,
            value: central,
            generator_value: central,
            nuisance: false,
            modified_at: 0,
        }
    }
}

/// Documentation group inside a [`ParameterSection`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterGroup {
    /// Group title.
    pub title: String,
    /// Free-form description.
    pub description: String,
    /// Members in declaration order.
    pub ids: Vec<ParameterId>,
}

/// Documentation section of the default table, one per data file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterSection {
    /// Section title.
    pub title: String,
    /// Free-form description.
    pub description: String,
    /// Groups in file order.
    pub groups: Vec<ParameterGroup>,
}

#[derive(Debug, Clone)]
struct WorldData {
    entries: Vec<ParameterData>,
    names: HashMap<String, ParameterId>,
    policy: RangePolicy,
    revision: u64,
}

#[derive(Debug)]
struct World {
    id: u64,
    data: RwLock<WorldData>,
    sections: Arc<Vec<ParameterSection>>,
}

static NEXT_WORLD_ID: AtomicU64 = AtomicU64::new(1);

impl World {
    fn new(data: WorldData, sections: Arc<Vec<ParameterSection>>) -> Arc<Self> {
        Arc::new(Self {
            id: NEXT_WORLD_ID.fetch_add(1, Ordering::Relaxed),
            data: RwLock::new(data),
            sections,
        })
    }

    fn read(&self) -> RwLockReadGuard<'_, WorldData> {
        self.data.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, WorldData> {
        self.data.write().unwrap_or_else(PoisonError::into_inner)
    }
}

fn unknown_parameter(name: &str) -> EosError {
    EosError::Name(
        ErrorInfo::new("eos_params.unknown_parameter", "no parameter with this name")
            .with_context("name", name),
    )
}

fn invalid_id(id: ParameterId) -> EosError {
    EosError::Internal(
        ErrorInfo::new("eos_params.invalid_parameter_id", "parameter id is out of bounds")
            .with_context("id", id.to_string()),
    )
}

pub(crate) fn check_bounds(name: &str, min: f64, max: f64) -> Result<(), EosError> {
    if min.is_nan() || max.is_nan() || min > max {
        return Err(EosError::Internal(
            ErrorInfo::new("eos_params.invalid_range", "parameter range is empty")
                .with_context("name", name)
                .with_context("min", min.to_string())
                .with_context("max", max.to_string()),
        ));
    }
    Ok(())
}

impl WorldData {
    fn entry(&self, id: ParameterId) -> Result<&ParameterData, EosError> {
        self.entries.get(id.index()).ok_or_else(|| invalid_id(id))
    }

    fn assign(&mut self, id: ParameterId, value: f64) -> Result<(), EosError> {
        let policy = self.policy;
        let entry = self.entries.get(id.index()).ok_or_else(|| invalid_id(id))?;
        let inside = value >= entry.min && value <= entry.max;
        let stored = match policy {
            RangePolicy::Permissive => value,
            _ if inside => value,
            RangePolicy::Clamp if !value.is_nan() => {
                let clamped = value.clamp(entry.min, entry.max);
                tracing::warn!(name = %entry.name, value, clamped, "parameter write clamped into range");
                clamped
            }
            _ => {
                return Err(EosError::Range(
                    ErrorInfo::new("eos_params.out_of_range", "value lies outside the parameter range")
                        .with_context("name", entry.name.clone())
                        .with_context("value", value.to_string())
                        .with_context("min", entry.min.to_string())
                        .with_context("max", entry.max.to_string()),
                ))
            }
        };
        self.revision += 1;
        let revision = self.revision;
        let entry = &mut self.entries[id.index()];
        entry.value = stored;
        entry.modified_at = revision;
        Ok(())
    }

    fn push(&mut self, data: ParameterData) -> Result<ParameterId, EosError> {
        let id = u32::try_from(self.entries.len())
            .map(ParameterId)
            .map_err(|_| EosError::Internal(ErrorInfo::new("eos_params.table_full", "too many parameters")))?;
        self.names.insert(data.name.clone(), id);
        self.entries.push(data);
        Ok(id)
    }
}

/// Handle onto one parameter world.
#[derive(Clone)]
pub struct Parameters {
    world: Arc<World>,
}

impl fmt::Debug for Parameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Parameters")
            .field("world", &self.world.id)
            .field("len", &self.len())
            .finish()
    }
}

impl Parameters {
    /// World populated from the built-in default table, strict range policy.
    pub fn defaults() -> Result<Parameters, EosError> {
        Self::from_config(&EngineConfig::default())
    }

    /// World from the default table with the policy of `config`.
    pub fn from_config(config: &EngineConfig) -> Result<Parameters, EosError> {
        let table = DefaultTable::instance()?;
        let parameters = Self::from_table(&table, config.range_policy);
        tracing::debug!(world = parameters.world_id(), count = parameters.len(), "parameter world created");
        Ok(parameters)
    }

    /// World populated from an explicitly parsed table.
    pub fn from_table(table: &DefaultTable, policy: RangePolicy) -> Parameters {
        let data = WorldData {
            entries: table.entries.clone(),
            names: table.names.clone(),
            policy,
            revision: 0,
        };
        Parameters {
            world: World::new(data, Arc::clone(&table.sections)),
        }
    }

    /// An empty world without sections.
    pub fn empty() -> Parameters {
        let data = WorldData {
            entries: Vec::new(),
            names: HashMap::new(),
            policy: RangePolicy::default(),
            revision: 0,
        };
        Parameters {
            world: World::new(data, Arc::new(Vec::new())),
        }
    }

    /// Replaces the range policy of this world.
    pub fn set_policy(&self, policy: RangePolicy) {
        self.world.write().policy = policy;
    }

    /// Builder form of [`Parameters::set_policy`].
    pub fn with_policy(self, policy: RangePolicy) -> Self {
        self.set_policy(policy);
        self
    }

    /// Range policy of this world.
    pub fn policy(&self) -> RangePolicy {
        self.world.read().policy
    }

    /// Independent world with the same ids, values, aliases and policy.
    pub fn deep_clone(&self) -> Parameters {
        let copy = self.world.read().clone();
        Parameters {
            world: World::new(copy, Arc::clone(&self.world.sections)),
        }
    }

    /// Process-unique identifier of the world.
    pub fn world_id(&self) -> u64 {
        self.world.id
    }

    /// Whether both handles address the same world.
    pub fn same_world(&self, other: &Parameters) -> bool {
        Arc::ptr_eq(&self.world, &other.world)
    }

    /// Looks up `name`, following aliases.
    pub fn get(&self, name: &str) -> Result<Parameter, EosError> {
        let id = *self.world.read().names.get(name).ok_or_else(|| unknown_parameter(name))?;
        Ok(self.handle(id))
    }

    /// Looks up a parameter by id.
    pub fn by_id(&self, id: ParameterId) -> Result<Parameter, EosError> {
        self.world.read().entry(id)?;
        Ok(self.handle(id))
    }

    fn handle(&self, id: ParameterId) -> Parameter {
        Parameter {
            world: Arc::clone(&self.world),
            id,
        }
    }

    /// Whether `name` resolves in this world.
    pub fn has(&self, name: &str) -> bool {
        self.world.read().names.contains_key(name)
    }

    /// Number of parameters (aliases not counted).
    pub fn len(&self) -> usize {
        self.world.read().entries.len()
    }

    /// Whether the world holds no parameter.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Handles in id order.
    pub fn iter(&self) -> impl Iterator<Item = Parameter> + '_ {
        (0..self.len() as u32).map(|i| self.handle(ParameterId(i)))
    }

    /// `(name, value)` pairs in id order.
    pub fn pairs(&self) -> Vec<(String, f64)> {
        self.world
            .read()
            .entries
            .iter()
            .map(|entry| (entry.name.clone(), entry.value))
            .collect()
    }

    /// Names that resolve to `id` other than its own name.
    pub fn aliases_of(&self, id: ParameterId) -> Vec<String> {
        let data = self.world.read();
        let Some(own) = data.entries.get(id.index()).map(|e| e.name.as_str()) else {
            return Vec::new();
        };
        let mut aliases: Vec<String> = data
            .names
            .iter()
            .filter(|(name, target)| **target == id && name.as_str() != own)
            .map(|(name, _)| name.clone())
            .collect();
        aliases.sort();
        aliases
    }

    /// Sections of the default table.
    pub fn sections(&self) -> &[ParameterSection] {
        &self.world.sections
    }

    /// Writes `value` to the parameter called `name`.
    pub fn set(&self, name: &str, value: f64) -> Result<(), EosError> {
        let mut data = self.world.write();
        let id = *data.names.get(name).ok_or_else(|| unknown_parameter(name))?;
        data.assign(id, value)
    }

    /// Declares a parameter in this world only.
    ///
    /// An existing name is returned unchanged.
    pub fn declare_and_insert(
        &self,
        name: &str,
        latex: &str,
        unit: Unit,
        central: f64,
        min: f64,
        max: f64,
    ) -> Result<Parameter, EosError> {
        let canonical = QualifiedName::new(name)?.str();
        let mut data = self.world.write();
        if let Some(&id) = data.names.get(&canonical) {
            tracing::warn!(name = %canonical, "parameter already declared, returning existing entry");
            return Ok(self.handle(id));
        }
        check_bounds(&canonical, min, max)?;
        let id = data.push(ParameterData::new(canonical, latex.to_string(), unit, central, min, max))?;
        drop(data);
        Ok(self.handle(id))
    }

    /// Makes the existing name `name` resolve to `id`.
    pub fn redirect(&self, name: &str, id: ParameterId) -> Result<(), EosError> {
        let mut data = self.world.write();
        data.entry(id)?;
        let slot = data.names.get_mut(name).ok_or_else(|| unknown_parameter(name))?;
        *slot = id;
        Ok(())
    }

    /// Applies overrides read from a YAML file.
    pub fn override_from_file(&self, path: &Path) -> Result<(), EosError> {
        let text = std::fs::read_to_string(path)
            .map_err(|err| EosError::io("eos_params.override_io", path, err))?;
        self.override_from_str(&text)
            .map_err(|err| annotate_path(err, path))
    }

    /// Applies overrides from a YAML mapping `name: {central, min?, max?, latex?, unit?}`.
    ///
    /// Known names take `central` as their new value and central value; unknown
    /// names are declared with a range collapsing onto `central` unless given.
    pub fn override_from_str(&self, text: &str) -> Result<(), EosError> {
        let document: BTreeMap<String, serde_yaml::Value> =
            serde_yaml::from_str(text).map_err(|err| EosError::yaml("eos_params.override_parse", err))?;
        for (name, node) in document {
            if name == "@metadata@" {
                continue;
            }
            let entry: OverrideEntry = serde_yaml::from_value(node).map_err(|err| {
                match EosError::yaml("eos_params.override_parse", err) {
                    EosError::Serde(info) => EosError::Serde(info.with_context("name", name.clone())),
                    other => other,
                }
            })?;
            self.apply_override(&name, entry)?;
        }
        Ok(())
    }

    fn apply_override(&self, name: &str, entry: OverrideEntry) -> Result<(), EosError> {
        let mut data = self.world.write();
        match data.names.get(name).copied() {
            Some(id) => {
                tracing::info!(name, central = entry.central, "overriding parameter");
                let current = data.entry(id)?.clone();
                let min = entry.min.unwrap_or(current.min);
                let max = entry.max.unwrap_or(current.max);
                check_bounds(name, min, max)?;
                data.revision += 1;
                let revision = data.revision;
                let target = &mut data.entries[id.index()];
                target.min = min;
                target.max = max;
                target.central = entry.central;
                target.value = entry.central;
                target.modified_at = revision;
                if let Some(latex) = entry.latex {
                    target.latex = latex;
                }
                if let Some(unit) = entry.unit {
                    target.unit = unit;
                }
            }
            None => {
                tracing::info!(name, central = entry.central, "adding parameter from override");
                let canonical = QualifiedName::new(name)?.str();
                let min = entry.min.unwrap_or(entry.central);
                let max = entry.max.unwrap_or(entry.central);
                check_bounds(&canonical, min, max)?;
                data.push(ParameterData::new(
                    canonical,
                    entry.latex.unwrap_or_default(),
                    entry.unit.unwrap_or(Unit::Undefined),
                    entry.central,
                    min,
                    max,
                ))?;
            }
        }
        Ok(())
    }

    /// Monotone counter bumped on every value write.
    pub fn revision(&self) -> u64 {
        self.world.read().revision
    }

    /// Revision of the last value write to `id` (0 if never written).
    pub fn last_modified(&self, id: ParameterId) -> Result<u64, EosError> {
        Ok(self.world.read().entry(id)?.modified_at)
    }

    /// Largest [`Parameters::last_modified`] over the ids of `user`.
    pub fn max_modified(&self, user: &ParameterUser) -> u64 {
        let data = self.world.read();
        user.iter()
            .filter_map(|id| data.entries.get(id.index()))
            .map(|entry| entry.modified_at)
            .max()
            .unwrap_or(0)
    }

    /// SHA-256 over the canonical JSON of all `(name, value)` pairs.
    pub fn fingerprint(&self) -> Result<String, EosError> {
        let bytes = serde_json::to_vec(&self.pairs()).map_err(|err| {
            EosError::Serde(ErrorInfo::new("eos_params.fingerprint", err.to_string()))
        })?;
        Ok(format!("{:x}", Sha256::digest(bytes)))
    }
}

fn annotate_path(err: EosError, path: &Path) -> EosError {
    let path = path.display().to_string();
    match err {
        EosError::Serde(info) => EosError::Serde(info.with_context("path", path)),
        EosError::Internal(info) => EosError::Internal(info.with_context("path", path)),
        EosError::Syntax(info) => EosError::Syntax(info.with_context("path", path)),
        other => other,
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct OverrideEntry {
    central: f64,
    #[serde(default)]
    min: Option<f64>,
    #[serde(default)]
    max: Option<f64>,
    #[serde(default)]
    latex: Option<String>,
    #[serde(default)]
    unit: Option<Unit>,
}

/// Handle onto one parameter of one world.
#[derive(Clone)]
pub struct Parameter {
    world: Arc<World>,
    id: ParameterId,
}

impl fmt::Debug for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Parameter")
            .field("world", &self.world.id)
            .field("id", &self.id)
            .field("name", &self.name())
            .field("value", &self.value())
            .finish()
    }
}

impl Parameter {
    fn with<R>(&self, f: impl FnOnce(&ParameterData) -> R) -> R {
        let data = self.world.read();
        f(&data.entries[self.id.index()])
    }

    fn with_mut<R>(&self, f: impl FnOnce(&mut ParameterData) -> R) -> R {
        let mut data = self.world.write();
        f(&mut data.entries[self.id.index()])
    }

    /// Current value.
    pub fn value(&self) -> f64 {
        self.with(|entry| entry.value)
    }

    /// Writes a new value under the world's range policy.
    pub fn set(&self, value: f64) -> Result<(), EosError> {
        self.world.write().assign(self.id, value)
    }

    /// Central value.
    pub fn central(&self) -> f64 {
        self.with(|entry| entry.central)
    }

    /// Replaces the central value; the current value is untouched.
    pub fn set_central(&self, central: f64) {
        self.with_mut(|entry| entry.central = central)
    }

    /// Lower end of the range.
    pub fn min(&self) -> f64 {
        self.with(|entry| entry.min)
    }

    /// Upper end of the range.
    pub fn max(&self) -> f64 {
        self.with(|entry| entry.max)
    }

    /// Moves the lower end of the range.
    pub fn set_min(&self, min: f64) -> Result<(), EosError> {
        let name = self.name();
        check_bounds(&name, min, self.max())?;
        self.with_mut(|entry| entry.min = min);
        Ok(())
    }

    /// Moves the upper end of the range.
    pub fn set_max(&self, max: f64) -> Result<(), EosError> {
        let name = self.name();
        check_bounds(&name, self.min(), max)?;
        self.with_mut(|entry| entry.max = max);
        Ok(())
    }

    /// Canonical name.
    pub fn name(&self) -> String {
        self.with(|entry| entry.name.clone())
    }

    /// LaTeX label.
    pub fn latex(&self) -> String {
        self.with(|entry| entry.latex.clone())
    }

    /// Unit.
    pub fn unit(&self) -> Unit {
        self.with(|entry| entry.unit)
    }

    /// Id inside the world.
    pub fn id(&self) -> ParameterId {
        self.id
    }

    /// Whether the parameter is flagged as a nuisance parameter.
    pub fn is_nuisance(&self) -> bool {
        self.with(|entry| entry.nuisance)
    }

    /// Flags or unflags the parameter as nuisance.
    pub fn set_nuisance(&self, nuisance: bool) {
        self.with_mut(|entry| entry.nuisance = nuisance)
    }

    /// Value last drawn by a sampler.
    pub fn generator_value(&self) -> f64 {
        self.with(|entry| entry.generator_value)
    }

    /// Records a sampler draw without touching the value.
    pub fn set_generator_value(&self, value: f64) {
        self.with_mut(|entry| entry.generator_value = value)
    }

    /// Identifier of the owning world.
    pub fn world_id(&self) -> u64 {
        self.world.id
    }

    /// Whether this handle reads `parameters`' storage.
    pub fn belongs_to(&self, parameters: &Parameters) -> bool {
        Arc::ptr_eq(&self.world, &parameters.world)
    }
}

impl Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.name(), self.value())
    }
}
