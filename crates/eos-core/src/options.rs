//! String-keyed configuration bags and the schemas that validate them.
//!
//! [`Options`] stays a plain runtime map so that it can be parsed uniformly
//! from qualified names, the command line or YAML. Modules publish an
//! [`OptionSchema`] listing the keys they recognize; the typed adapters in
//! this module read schema-checked values out of an [`Options`] bag.

use std::collections::BTreeMap;
use std::fmt::{self, Display};
use std::ops::Add;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::{EosError, ErrorInfo};
use crate::flavor::{LeptonFlavor, QuarkFlavor};

/// Sorted mapping from option key to option value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Options {
    entries: BTreeMap<String, String>,
}

impl Options {
    /// Creates an empty bag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a bag from literal pairs; later pairs overwrite earlier ones.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let mut options = Self::new();
        for (key, value) in pairs {
            options.declare(key, value);
        }
        options
    }

    /// Inserts or overwrites `key`.
    pub fn declare(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Returns the explicit value of `key`, or `fallback` when absent.
    pub fn get<'a>(&'a self, key: &str, fallback: &'a str) -> &'a str {
        self.entries.get(key).map(String::as_str).unwrap_or(fallback)
    }

    /// Returns the explicit value of `key`, failing when it is absent.
    pub fn value(&self, key: &str) -> Result<&str, EosError> {
        self.entries.get(key).map(String::as_str).ok_or_else(|| {
            EosError::Option(
                ErrorInfo::new("eos_core.unspecified_option", "option has no value")
                    .with_context("key", key),
            )
        })
    }

    /// Whether `key` carries an explicit value.
    pub fn has(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Removes `key`, returning its previous value.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.entries.remove(key)
    }

    /// Number of explicit entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the bag is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over `(key, value)` in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Returns `self` overlaid with `other`; values from `other` win.
    pub fn merge(&self, other: &Options) -> Options {
        let mut merged = self.clone();
        for (key, value) in &other.entries {
            merged.entries.insert(key.clone(), value.clone());
        }
        merged
    }

    /// Renders `k=v,k2=v2` in key order.
    pub fn as_string(&self) -> String {
        self.entries
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl Display for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_string())
    }
}

impl Add<&Options> for &Options {
    type Output = Options;

    fn add(self, rhs: &Options) -> Options {
        self.merge(rhs)
    }
}

impl Add for Options {
    type Output = Options;

    fn add(self, rhs: Options) -> Options {
        self.merge(&rhs)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Options {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self::from_pairs(iter)
    }
}

/// One recognized option: its key, the allowed values and the default.
///
/// An empty `allowed_values` list accepts any value. A `None` default marks
/// the option as required.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionSpecification {
    /// Option key.
    pub key: String,
    /// Allowed values; empty for free-form options.
    #[serde(default)]
    pub allowed_values: Vec<String>,
    /// Default value, if the option is optional.
    #[serde(default)]
    pub default_value: Option<String>,
}

impl OptionSpecification {
    /// Whether `value` lies in the allowed set.
    pub fn allows(&self, value: &str) -> bool {
        self.allowed_values.is_empty() || self.allowed_values.iter().any(|v| v == value)
    }

    fn reject(&self, value: &str) -> EosError {
        EosError::Option(
            ErrorInfo::new("eos_core.invalid_option_value", "value not allowed for option")
                .with_context("key", self.key.clone())
                .with_context("value", value)
                .with_hint(format!("allowed values: {}", self.allowed_values.join(", "))),
        )
    }

    fn unspecified(&self) -> EosError {
        EosError::Option(
            ErrorInfo::new("eos_core.unspecified_option", "required option was not specified")
                .with_context("key", self.key.clone()),
        )
    }
}

/// The configuration surface a module recognizes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionSchema {
    specifications: Vec<OptionSpecification>,
}

impl OptionSchema {
    /// Creates an empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers (or replaces) a recognized option.
    pub fn declare(
        mut self,
        key: &str,
        allowed_values: &[&str],
        default_value: Option<&str>,
    ) -> Self {
        let specification = OptionSpecification {
            key: key.to_string(),
            allowed_values: allowed_values.iter().map(|v| v.to_string()).collect(),
            default_value: default_value.map(str::to_string),
        };
        match self.specifications.iter_mut().find(|s| s.key == key) {
            Some(existing) => *existing = specification,
            None => self.specifications.push(specification),
        }
        self
    }

    /// Adds every specification of `other`; `other` wins on conflicts.
    pub fn extend(mut self, other: &OptionSchema) -> Self {
        for spec in &other.specifications {
            match self.specifications.iter_mut().find(|s| s.key == spec.key) {
                Some(existing) => *existing = spec.clone(),
                None => self.specifications.push(spec.clone()),
            }
        }
        self
    }

    /// Looks up the specification for `key`.
    pub fn specification(&self, key: &str) -> Option<&OptionSpecification> {
        self.specifications.iter().find(|s| s.key == key)
    }

    /// Specifications in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &OptionSpecification> {
        self.specifications.iter()
    }

    /// Number of recognized keys.
    pub fn len(&self) -> usize {
        self.specifications.len()
    }

    /// Whether no keys are recognized.
    pub fn is_empty(&self) -> bool {
        self.specifications.is_empty()
    }

    /// Sets `key` in `options`, validating against the schema when the key is
    /// recognized. Unrecognized keys accept any value.
    pub fn set(&self, options: &mut Options, key: &str, value: &str) -> Result<(), EosError> {
        if let Some(spec) = self.specification(key) {
            if !spec.allows(value) {
                return Err(spec.reject(value));
            }
        }
        options.declare(key, value);
        Ok(())
    }

    /// Checks every explicit value of a recognized key.
    pub fn validate(&self, options: &Options) -> Result<(), EosError> {
        for spec in &self.specifications {
            if let Some(value) = options.entries.get(&spec.key) {
                if !spec.allows(value) {
                    return Err(spec.reject(value));
                }
            }
        }
        Ok(())
    }

    /// Fills defaults and validates. Keys outside the schema pass through
    /// unchanged; a required key without a value fails.
    pub fn resolve(&self, options: &Options) -> Result<Options, EosError> {
        self.validate(options)?;
        let mut resolved = options.clone();
        for spec in &self.specifications {
            if resolved.has(&spec.key) {
                continue;
            }
            match &spec.default_value {
                Some(default) => resolved.declare(spec.key.clone(), default.clone()),
                None => return Err(spec.unspecified()),
            }
        }
        Ok(resolved)
    }
}

/// A string option checked against a schema specification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecifiedOption {
    key: String,
    value: String,
}

impl SpecifiedOption {
    /// Reads `key` from `options`, falling back to the schema default.
    pub fn new(options: &Options, schema: &OptionSchema, key: &str) -> Result<Self, EosError> {
        let spec = schema.specification(key).ok_or_else(|| {
            EosError::Internal(
                ErrorInfo::new("eos_core.undeclared_option", "option is not part of the schema")
                    .with_context("key", key),
            )
        })?;
        let value = match (options.entries.get(key), &spec.default_value) {
            (Some(value), _) => value.clone(),
            (None, Some(default)) => default.clone(),
            (None, None) => return Err(spec.unspecified()),
        };
        if !spec.allows(&value) {
            return Err(spec.reject(&value));
        }
        Ok(Self {
            key: key.to_string(),
            value,
        })
    }

    /// Option key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Validated value.
    pub fn value(&self) -> &str {
        &self.value
    }
}

/// An option whose validated value is parsed into `T`.
#[derive(Debug, Clone, PartialEq)]
pub struct TypedOption<T> {
    raw: SpecifiedOption,
    value: T,
}

impl<T> TypedOption<T>
where
    T: FromStr + Clone,
{
    /// Reads and parses `key`; parse failures are option errors.
    pub fn new(options: &Options, schema: &OptionSchema, key: &str) -> Result<Self, EosError> {
        let raw = SpecifiedOption::new(options, schema, key)?;
        let value = raw.value().parse::<T>().map_err(|_| {
            EosError::Option(
                ErrorInfo::new("eos_core.invalid_option_value", "value does not parse")
                    .with_context("key", key)
                    .with_context("value", raw.value()),
            )
        })?;
        Ok(Self { raw, value })
    }

    /// Parsed value.
    pub fn value(&self) -> T {
        self.value.clone()
    }

    /// Textual value as written.
    pub fn str(&self) -> &str {
        self.raw.value()
    }
}

/// `true`/`false` option.
pub type BooleanOption = TypedOption<bool>;
/// Integer-valued option.
pub type IntegerOption = TypedOption<i64>;
/// Floating-point option.
pub type FloatOption = TypedOption<f64>;
/// Charged-lepton flavour option (`e`, `mu`, `tau`).
pub type LeptonFlavorOption = TypedOption<LeptonFlavor>;
/// Quark flavour option (`u`, `d`, `s`, `c`, `b`, `t`).
pub type QuarkFlavorOption = TypedOption<QuarkFlavor>;

/// Marker tying a compile-time option record to its runtime schema.
///
/// Implementors list their recognized options once; `read` turns a resolved
/// [`Options`] bag into the typed record.
pub trait OptionRecord: Sized {
    /// The schema the record is read against.
    fn schema() -> OptionSchema;

    /// Reads the record from `options`.
    fn read(options: &Options) -> Result<Self, EosError>;
}
