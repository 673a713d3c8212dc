//! Named kinematic variables shared between a caller and its observables.
//!
//! [`Kinematics`] is a handle: cloning it shares the values, so an observable
//! built on a handle sees later writes made by the caller. [`Kinematics::deep_clone`]
//! detaches a copy. Aliases live on the handle, which lets an aliased view read
//! the same storage under different names.

use std::collections::{BTreeMap, HashMap};
use std::fmt::{self, Display};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::{Deserialize, Serialize};

use crate::errors::{EosError, ErrorInfo};

#[derive(Debug, Clone, Default)]
struct KinematicsData {
    names: Vec<String>,
    values: Vec<f64>,
    index: HashMap<String, usize>,
    revision: u64,
}

fn unknown_variable(name: &str) -> EosError {
    EosError::Kinematic(
        ErrorInfo::new("eos_core.unknown_kinematic_variable", "kinematic variable is not declared")
            .with_context("variable", name),
    )
}

/// Handle onto a set of named kinematic variables.
#[derive(Debug, Clone, Default)]
pub struct Kinematics {
    data: Arc<RwLock<KinematicsData>>,
    aliases: Arc<BTreeMap<String, String>>,
}

impl Kinematics {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares every pair in order.
    pub fn from_pairs<S: Into<String>>(pairs: impl IntoIterator<Item = (S, f64)>) -> Self {
        let kinematics = Self::new();
        for (name, value) in pairs {
            kinematics.declare(name, value);
        }
        kinematics
    }

    fn read(&self) -> RwLockReadGuard<'_, KinematicsData> {
        self.data.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, KinematicsData> {
        self.data.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn resolve<'a>(&'a self, name: &'a str) -> &'a str {
        self.aliases.get(name).map(String::as_str).unwrap_or(name)
    }

    /// Declares `name`, overwriting the value if it already exists.
    pub fn declare(&self, name: impl Into<String>, value: f64) -> KinematicVariable {
        let name = name.into();
        let mut data = self.write();
        data.revision += 1;
        let index = match data.index.get(&name) {
            Some(&index) => {
                data.values[index] = value;
                index
            }
            None => {
                let index = data.names.len();
                data.names.push(name.clone());
                data.values.push(value);
                data.index.insert(name.clone(), index);
                index
            }
        };
        KinematicVariable {
            data: Arc::clone(&self.data),
            index,
            name,
        }
    }

    /// Returns a handle on `name`, following aliases.
    pub fn variable(&self, name: &str) -> Result<KinematicVariable, EosError> {
        let target = self.resolve(name);
        let index = *self.read().index.get(target).ok_or_else(|| unknown_variable(name))?;
        Ok(KinematicVariable {
            data: Arc::clone(&self.data),
            index,
            name: name.to_string(),
        })
    }

    /// Current value of `name`.
    pub fn value(&self, name: &str) -> Result<f64, EosError> {
        let target = self.resolve(name);
        let data = self.read();
        let index = *data.index.get(target).ok_or_else(|| unknown_variable(name))?;
        Ok(data.values[index])
    }

    /// Sets an already declared variable.
    pub fn set(&self, name: &str, value: f64) -> Result<(), EosError> {
        let target = self.resolve(name).to_string();
        let mut data = self.write();
        let index = *data.index.get(&target).ok_or_else(|| unknown_variable(name))?;
        data.values[index] = value;
        data.revision += 1;
        Ok(())
    }

    /// Whether `name` resolves to a declared variable.
    pub fn has(&self, name: &str) -> bool {
        self.read().index.contains_key(self.resolve(name))
    }

    /// Makes `alias` resolve to the declared variable `name` on this handle.
    ///
    /// `name` may itself be an alias of this handle; the stored target is
    /// always a declared variable.
    pub fn alias(&mut self, alias: &str, name: &str) -> Result<(), EosError> {
        if self.aliases.contains_key(alias) {
            return Err(EosError::Kinematic(
                ErrorInfo::new("eos_core.duplicate_kinematic_alias", "alias is already in use")
                    .with_context("alias", alias)
                    .with_context("variable", name),
            ));
        }
        let target = self.resolve(name).to_string();
        if !self.read().index.contains_key(&target) {
            return Err(unknown_variable(name));
        }
        Arc::make_mut(&mut self.aliases).insert(alias.to_string(), target);
        Ok(())
    }

    /// Removes `alias`; returns whether it existed.
    pub fn remove_alias(&mut self, alias: &str) -> bool {
        Arc::make_mut(&mut self.aliases).remove(alias).is_some()
    }

    /// Drops every alias on this handle.
    pub fn clear_aliases(&mut self) {
        self.aliases = Arc::new(BTreeMap::new());
    }

    /// Returns a handle sharing storage with `self` plus extra aliases.
    pub fn with_aliases<'a>(
        &self,
        aliases: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Result<Kinematics, EosError> {
        let mut view = self.clone();
        for (alias, name) in aliases {
            view.alias(alias, name)?;
        }
        Ok(view)
    }

    /// Alias map of this handle.
    pub fn aliases(&self) -> &BTreeMap<String, String> {
        &self.aliases
    }

    /// Independent copy of values and aliases.
    pub fn deep_clone(&self) -> Kinematics {
        let copy = self.read().clone();
        Kinematics {
            data: Arc::new(RwLock::new(copy)),
            aliases: Arc::clone(&self.aliases),
        }
    }

    /// Whether both handles read the same storage.
    pub fn shares_storage(&self, other: &Kinematics) -> bool {
        Arc::ptr_eq(&self.data, &other.data)
    }

    /// New independent set with the variables of both; `other` wins.
    pub fn merge(&self, other: &Kinematics) -> Kinematics {
        let merged = self.deep_clone();
        for (name, value) in other.pairs() {
            merged.declare(name, value);
        }
        merged
    }

    /// Variable names in declaration order.
    pub fn names(&self) -> Vec<String> {
        self.read().names.clone()
    }

    /// `(name, value)` pairs in declaration order.
    pub fn pairs(&self) -> Vec<(String, f64)> {
        let data = self.read();
        data.names.iter().cloned().zip(data.values.iter().copied()).collect()
    }

    /// Number of declared variables.
    pub fn len(&self) -> usize {
        self.read().names.len()
    }

    /// Whether no variable is declared.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Monotone counter bumped on every write to the shared storage.
    pub fn revision(&self) -> u64 {
        self.read().revision
    }

    /// Structural identity: sorted names with exact value bits, plus aliases.
    pub fn snapshot(&self) -> KinematicsSnapshot {
        let mut values: Vec<(String, u64)> = self
            .pairs()
            .into_iter()
            .map(|(name, value)| (name, value.to_bits()))
            .collect();
        values.sort();
        KinematicsSnapshot {
            values,
            aliases: self.aliases.iter().map(|(a, n)| (a.clone(), n.clone())).collect(),
        }
    }

    /// Renders `a=1, b=2` in declaration order.
    pub fn as_string(&self) -> String {
        self.pairs()
            .into_iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl PartialEq for Kinematics {
    fn eq(&self, other: &Self) -> bool {
        self.snapshot() == other.snapshot()
    }
}

impl Display for Kinematics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_string())
    }
}

/// Value snapshot of a [`Kinematics`], usable as a map key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct KinematicsSnapshot {
    /// `(name, f64 bits)` sorted by name.
    pub values: Vec<(String, u64)>,
    /// `(alias, target)` sorted by alias.
    pub aliases: Vec<(String, String)>,
}

/// Handle on one variable inside a [`Kinematics`].
#[derive(Debug, Clone)]
pub struct KinematicVariable {
    data: Arc<RwLock<KinematicsData>>,
    index: usize,
    name: String,
}

impl KinematicVariable {
    /// Current value.
    pub fn value(&self) -> f64 {
        self.data.read().unwrap_or_else(PoisonError::into_inner).values[self.index]
    }

    /// Overwrites the value.
    pub fn set(&self, value: f64) {
        let mut data = self.data.write().unwrap_or_else(PoisonError::into_inner);
        data.values[self.index] = value;
        data.revision += 1;
    }

    /// Name under which this handle was obtained (possibly an alias).
    pub fn name(&self) -> &str {
        &self.name
    }
}
