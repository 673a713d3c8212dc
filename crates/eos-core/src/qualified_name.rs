//! Parser for `prefix::name@suffix;key=value,...` identifiers.

use std::cmp::Ordering;
use std::fmt::{self, Display};
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::{EosError, ErrorInfo};
use crate::options::Options;

fn is_prefix_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || "<>^_*+-()".contains(c)
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || "()[]{}|',./^_*+-=".contains(c)
}

fn is_suffix_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || ".:-+()".contains(c)
}

/// Characters permitted in option keys.
pub fn is_option_key_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-'
}

/// Characters permitted in option values.
pub fn is_option_value_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || "+-/.^_".contains(c)
}

fn syntax_error(input: &str, message: impl Into<String>) -> EosError {
    EosError::Syntax(
        ErrorInfo::new("eos_core.qualified_name_syntax", message).with_context("name", input),
    )
}

/// Structured identifier used for observables and parameters alike.
///
/// Identity covers prefix, name and suffix. Embedded options are carried
/// alongside and are merged into the observable's options at construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct QualifiedName {
    prefix: String,
    name: String,
    suffix: Option<String>,
    options: Options,
}

impl QualifiedName {
    /// Parses `input`, failing with [`EosError::Syntax`] on malformed input.
    pub fn new(input: &str) -> Result<Self, EosError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(syntax_error(input, "qualified name is empty"));
        }

        let (head, option_part) = match input.split_once(';') {
            Some((head, rest)) => (head, Some(rest)),
            None => (input, None),
        };
        if option_part.is_some_and(|rest| rest.contains('@')) {
            return Err(syntax_error(input, "suffix must precede the option list"));
        }

        let (base, suffix) = match head.split_once('@') {
            Some((base, suffix)) => (base, Some(suffix)),
            None => (head, None),
        };
        let (prefix, name) = base
            .split_once("::")
            .ok_or_else(|| syntax_error(input, "missing '::' between prefix and name"))?;

        if prefix.is_empty() {
            return Err(syntax_error(input, "prefix is empty"));
        }
        if let Some(c) = prefix.chars().find(|c| !is_prefix_char(*c)) {
            return Err(syntax_error(input, format!("invalid character '{c}' in prefix")));
        }
        if prefix.contains("<<") || prefix.contains(">>") {
            return Err(syntax_error(input, "prefix contains '<<' or '>>'"));
        }

        if name.is_empty() {
            return Err(syntax_error(input, "name is empty"));
        }
        if let Some(c) = name.chars().find(|c| !is_name_char(*c)) {
            return Err(syntax_error(input, format!("invalid character '{c}' in name")));
        }
        if name.contains("[[") || name.contains("]]") {
            return Err(syntax_error(input, "name contains '[[' or ']]'"));
        }

        if let Some(suffix) = suffix {
            if suffix.is_empty() {
                return Err(syntax_error(input, "suffix is empty"));
            }
            if let Some(c) = suffix.chars().find(|c| !is_suffix_char(*c)) {
                return Err(syntax_error(input, format!("invalid character '{c}' in suffix")));
            }
        }

        let mut options = Options::new();
        if let Some(option_part) = option_part {
            for pair in option_part.split(',') {
                let (key, value) = pair
                    .split_once('=')
                    .ok_or_else(|| syntax_error(input, format!("option '{pair}' lacks '='")))?;
                if key.is_empty() || value.is_empty() {
                    return Err(syntax_error(input, format!("option '{pair}' has an empty key or value")));
                }
                if !key.chars().all(is_option_key_char) {
                    return Err(syntax_error(input, format!("invalid option key '{key}'")));
                }
                if !value.chars().all(is_option_value_char) {
                    return Err(syntax_error(input, format!("invalid option value '{value}'")));
                }
                if options.has(key) {
                    return Err(syntax_error(input, format!("option '{key}' given twice")));
                }
                options.declare(key, value);
            }
        }

        Ok(Self {
            prefix: prefix.to_string(),
            name: name.to_string(),
            suffix: suffix.map(str::to_string),
            options,
        })
    }

    /// Prefix part, e.g. `B->pilnu`.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Name part, e.g. `BR`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Optional suffix, e.g. `BCL2008`.
    pub fn suffix(&self) -> Option<&str> {
        self.suffix.as_deref()
    }

    /// Options embedded after `;`.
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// `prefix::name[@suffix]`, without options.
    pub fn str(&self) -> String {
        match &self.suffix {
            Some(suffix) => format!("{}::{}@{}", self.prefix, self.name, suffix),
            None => format!("{}::{}", self.prefix, self.name),
        }
    }

    /// Canonical full form including embedded options.
    pub fn full(&self) -> String {
        self.to_string()
    }

    /// Returns a copy without embedded options.
    pub fn without_options(&self) -> Self {
        Self {
            options: Options::new(),
            ..self.clone()
        }
    }
}

impl Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.str())?;
        if !self.options.is_empty() {
            write!(f, ";{}", self.options.as_string())?;
        }
        Ok(())
    }
}

impl FromStr for QualifiedName {
    type Err = EosError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for QualifiedName {
    type Error = EosError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl TryFrom<&str> for QualifiedName {
    type Error = EosError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<QualifiedName> for String {
    fn from(value: QualifiedName) -> Self {
        value.full()
    }
}

impl PartialEq for QualifiedName {
    fn eq(&self, other: &Self) -> bool {
        self.prefix == other.prefix && self.name == other.name && self.suffix == other.suffix
    }
}

impl Eq for QualifiedName {}

impl Hash for QualifiedName {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.prefix.hash(state);
        self.name.hash(state);
        self.suffix.hash(state);
    }
}

impl PartialOrd for QualifiedName {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QualifiedName {
    fn cmp(&self, other: &Self) -> Ordering {
        (&self.prefix, &self.name, &self.suffix).cmp(&(&other.prefix, &other.name, &other.suffix))
    }
}
