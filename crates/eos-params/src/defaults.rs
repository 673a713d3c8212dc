//! Built-in default parameter table.
//!
//! The table ships as YAML files compiled into the crate. Each file is one
//! [`ParameterSection`]; templated names (`%s`) expand over the cartesian
//! product of their `matrix` rows.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, OnceLock};

use eos_core::{EosError, ErrorInfo, QualifiedName, Unit};
use indexmap::IndexMap;
use itertools::Itertools;
use serde::Deserialize;

use crate::parameters::{check_bounds, ParameterData, ParameterGroup, ParameterId, ParameterSection};

/// Embedded data files, in section order.
pub const DEFAULT_SOURCES: &[(&str, &str)] = &[
    ("constants.yaml", include_str!("../data/constants.yaml")),
    ("masses.yaml", include_str!("../data/masses.yaml")),
    ("life-times.yaml", include_str!("../data/life-times.yaml")),
    ("ckm.yaml", include_str!("../data/ckm.yaml")),
    ("wilson-coefficients.yaml", include_str!("../data/wilson-coefficients.yaml")),
    ("form-factors.yaml", include_str!("../data/form-factors.yaml")),
];

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SectionFile {
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    groups: Vec<GroupFile>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct GroupFile {
    title: String,
    #[serde(default)]
    description: String,
    parameters: IndexMap<String, EntryFile>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct EntryFile {
    central: f64,
    min: f64,
    max: f64,
    #[serde(default)]
    latex: Option<LatexFile>,
    #[serde(default)]
    unit: Option<Unit>,
    #[serde(default)]
    alias_of: Option<AliasFile>,
    #[serde(default)]
    matrix: Option<Vec<Vec<String>>>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum LatexFile {
    Plain(String),
    Mapped {
        template: String,
        map: BTreeMap<String, String>,
    },
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum AliasFile {
    One(String),
    Many(Vec<String>),
}

impl AliasFile {
    fn names(&self) -> Vec<&str> {
        match self {
            AliasFile::One(name) => vec![name.as_str()],
            AliasFile::Many(names) => names.iter().map(String::as_str).collect(),
        }
    }
}

/// Parsed default table shared by every world created from defaults.
#[derive(Debug)]
pub struct DefaultTable {
    pub(crate) entries: Vec<ParameterData>,
    pub(crate) names: HashMap<String, ParameterId>,
    pub(crate) sections: Arc<Vec<ParameterSection>>,
}

fn table_error(code: &str, message: &str, file: &str, name: &str) -> EosError {
    EosError::Internal(
        ErrorInfo::new(code, message)
            .with_context("file", file)
            .with_context("name", name),
    )
}

/// Replaces successive `%s` placeholders with `values`.
fn substitute(template: &str, values: &[&str]) -> Option<String> {
    let pieces: Vec<&str> = template.split("%s").collect();
    if pieces.len() != values.len() + 1 {
        return None;
    }
    let mut out = String::with_capacity(template.len());
    for (piece, value) in pieces.iter().zip(values.iter().map(Some).chain([None])) {
        out.push_str(piece);
        if let Some(value) = value {
            out.push_str(value);
        }
    }
    Some(out)
}

impl DefaultTable {
    /// Process-wide table built from [`DEFAULT_SOURCES`] on first use.
    pub fn instance() -> Result<Arc<DefaultTable>, EosError> {
        static TABLE: OnceLock<Result<Arc<DefaultTable>, EosError>> = OnceLock::new();
        TABLE
            .get_or_init(|| Self::parse(DEFAULT_SOURCES).map(Arc::new))
            .clone()
    }

    /// Builds a table from `(file name, YAML text)` sources.
    pub fn parse(sources: &[(&str, &str)]) -> Result<DefaultTable, EosError> {
        let mut table = DefaultTable {
            entries: Vec::new(),
            names: HashMap::new(),
            sections: Arc::new(Vec::new()),
        };
        let mut sections = Vec::with_capacity(sources.len());
        for (file, text) in sources {
            let section: SectionFile = serde_yaml::from_str(text).map_err(|err| {
                match EosError::yaml("eos_params.defaults_parse", err) {
                    EosError::Serde(info) => EosError::Serde(info.with_context("file", *file)),
                    other => other,
                }
            })?;
            sections.push(table.add_section(file, section)?);
        }
        table.sections = Arc::new(sections);
        tracing::debug!(count = table.entries.len(), "default parameter table parsed");
        Ok(table)
    }

    fn add_section(&mut self, file: &str, section: SectionFile) -> Result<ParameterSection, EosError> {
        let mut groups = Vec::with_capacity(section.groups.len());
        for group in section.groups {
            let mut ids = Vec::new();
            for (name, entry) in &group.parameters {
                check_bounds(name, entry.min, entry.max)?;
                if name.contains('%') {
                    ids.extend(self.add_templated(file, name, entry)?);
                } else {
                    let latex = match &entry.latex {
                        Some(LatexFile::Plain(latex)) => latex.clone(),
                        Some(LatexFile::Mapped { template, .. }) => template.clone(),
                        None => String::new(),
                    };
                    let aliases = entry.alias_of.as_ref().map(AliasFile::names).unwrap_or_default();
                    ids.push(self.add_entry(file, name, latex, entry, &aliases)?);
                }
            }
            groups.push(ParameterGroup {
                title: group.title,
                description: group.description,
                ids,
            });
        }
        Ok(ParameterSection {
            title: section.title,
            description: section.description,
            groups,
        })
    }

    fn add_templated(&mut self, file: &str, name: &str, entry: &EntryFile) -> Result<Vec<ParameterId>, EosError> {
        let matrix = entry.matrix.as_ref().ok_or_else(|| {
            table_error(
                "eos_params.template_without_matrix",
                "templated parameter has no substitutions",
                file,
                name,
            )
        })?;
        let (latex_template, latex_map) = match &entry.latex {
            Some(LatexFile::Plain(latex)) => (latex.clone(), BTreeMap::new()),
            Some(LatexFile::Mapped { template, map }) => (template.clone(), map.clone()),
            None => (String::new(), BTreeMap::new()),
        };
        let alias_templates = entry.alias_of.as_ref().map(AliasFile::names).unwrap_or_default();

        let mut ids = Vec::new();
        for combination in matrix.iter().map(|row| row.iter().map(String::as_str)).multi_cartesian_product() {
            let expanded = substitute(name, &combination).ok_or_else(|| {
                table_error(
                    "eos_params.template_arity",
                    "number of placeholders does not match the matrix",
                    file,
                    name,
                )
            })?;
            let mapped: Vec<&str> = combination
                .iter()
                .map(|value| latex_map.get(*value).map(String::as_str).unwrap_or(*value))
                .collect();
            let latex = if latex_template.contains("%s") {
                substitute(&latex_template, &mapped).ok_or_else(|| {
                    table_error(
                        "eos_params.template_arity",
                        "number of LaTeX placeholders does not match the matrix",
                        file,
                        name,
                    )
                })?
            } else {
                latex_template.clone()
            };
            let aliases = alias_templates
                .iter()
                .map(|alias| substitute(alias, &combination).unwrap_or_else(|| alias.to_string()))
                .collect::<Vec<_>>();
            let aliases: Vec<&str> = aliases.iter().map(String::as_str).collect();
            ids.push(self.add_entry(file, &expanded, latex, entry, &aliases)?);
        }
        Ok(ids)
    }

    fn add_entry(
        &mut self,
        file: &str,
        name: &str,
        latex: String,
        entry: &EntryFile,
        aliases: &[&str],
    ) -> Result<ParameterId, EosError> {
        let canonical = QualifiedName::new(name)?.str();
        if self.names.contains_key(&canonical) {
            return Err(table_error(
                "eos_params.duplicate_parameter",
                "parameter is declared twice",
                file,
                &canonical,
            ));
        }
        let id = u32::try_from(self.entries.len())
            .map(ParameterId)
            .map_err(|_| table_error("eos_params.table_full", "too many parameters", file, &canonical))?;
        self.entries.push(ParameterData::new(
            canonical.clone(),
            latex,
            entry.unit.unwrap_or(Unit::Undefined),
            entry.central,
            entry.min,
            entry.max,
        ));
        self.names.insert(canonical, id);
        for alias in aliases {
            let alias = QualifiedName::new(alias)?.str();
            if self.names.contains_key(&alias) {
                return Err(table_error(
                    "eos_params.duplicate_parameter",
                    "alias collides with an existing name",
                    file,
                    &alias,
                ));
            }
            self.names.insert(alias, id);
        }
        Ok(id)
    }

    /// Number of distinct parameters.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether `name` (or an alias) is declared.
    pub fn has(&self, name: &str) -> bool {
        self.names.contains_key(name)
    }

    /// Documentation sections in file order.
    pub fn sections(&self) -> &[ParameterSection] {
        &self.sections
    }
}

#[cfg(test)]
mod tests {
    use super::substitute;

    #[test]
    fn substitute_fills_placeholders_in_order() {
        assert_eq!(
            substitute("%s::b_+^%s@BCL2008", &["B->pi", "1"]).as_deref(),
            Some("B->pi::b_+^1@BCL2008")
        );
        assert_eq!(substitute("plain", &[]).as_deref(), Some("plain"));
        assert!(substitute("%s::x", &[]).is_none());
    }
}
