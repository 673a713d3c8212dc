use std::fmt;
use std::sync::Arc;

use eos_core::{EosError, ErrorInfo, KinematicVariable, Kinematics, OptionSchema, Options, QualifiedName, Unit};
use eos_params::{DefaultTable, Parameter, ParameterUser, Parameters};
use indexmap::IndexSet;

use super::{BinaryOperator, Expression, Function, KinematicsSpecification};
use crate::entry::{EntryMetadata, ObservableEntry};
use crate::observable::{Observable, ObservablePtr};
use crate::registry::ObservableRegistry;

/// Registry entry whose value is an [`Expression`].
pub struct ExpressionEntry {
    metadata: EntryMetadata,
    schema: OptionSchema,
    expression: Arc<Expression>,
}

impl ExpressionEntry {
    /// Checks `expression` against `registry` and builds the entry.
    ///
    /// Every referenced observable must be registered or name a default
    /// parameter. The kinematic variables of the entry are those of the
    /// references after applying aliases and fixed values.
    pub fn new(
        registry: &ObservableRegistry,
        name: &str,
        latex: &str,
        unit: Unit,
        forced_options: Options,
        expression: &str,
    ) -> Result<Self, EosError> {
        let name = QualifiedName::new(name)?;
        let parsed = Expression::parse(expression)?;
        let variables = required_kinematics(&parsed, registry)?;
        let variables: Vec<&str> = variables.iter().map(String::as_str).collect();
        let schema = referenced_schema(&parsed, registry);
        let mut metadata = EntryMetadata::new(name, latex, unit, &variables, forced_options);
        metadata.description = expression.trim().to_string();
        Ok(Self {
            metadata,
            schema,
            expression: Arc::new(parsed),
        })
    }

    /// Parsed expression.
    pub fn expression(&self) -> &Expression {
        &self.expression
    }
}

/// Options recognized by any observable the expression references.
fn referenced_schema(expression: &Expression, registry: &ObservableRegistry) -> OptionSchema {
    let mut schema = OptionSchema::new();
    expression.walk(&mut |node| {
        if let Expression::Observable { name, .. } = node {
            if let Some(entry) = registry.get(name) {
                schema = std::mem::take(&mut schema).extend(entry.option_schema());
            }
        }
    });
    schema
}

/// Kinematic variables an expression reads from its caller.
fn required_kinematics(expression: &Expression, registry: &ObservableRegistry) -> Result<Vec<String>, EosError> {
    let table = DefaultTable::instance()?;
    let mut variables: IndexSet<String> = IndexSet::new();
    let mut alias_sources: IndexSet<String> = IndexSet::new();
    let mut failure = None;

    expression.walk(&mut |node| {
        if failure.is_some() {
            return;
        }
        match node {
            Expression::Observable { name, kinematics } => match registry.get(name) {
                Some(entry) => {
                    for variable in entry.kinematic_variables() {
                        if kinematics.is_fixed(variable) {
                            continue;
                        }
                        match kinematics.alias_of(variable) {
                            Some(source) => {
                                alias_sources.insert(variable.clone());
                                variables.insert(source.to_string());
                            }
                            None => {
                                variables.insert(variable.clone());
                            }
                        }
                    }
                }
                None if name.options().is_empty() && table.has(&name.str()) => {}
                None => {
                    failure = Some(EosError::Name(
                        ErrorInfo::new("eos_observable.unknown_observable", "expression references an unknown observable")
                            .with_context("name", name.full()),
                    ));
                }
            },
            Expression::Parameter(name) => {
                if !table.has(name) {
                    failure = Some(EosError::Name(
                        ErrorInfo::new("eos_observable.unknown_parameter", "expression references an unknown parameter")
                            .with_context("name", name.clone()),
                    ));
                }
            }
            Expression::Kinematic(variable) => {
                variables.insert(variable.clone());
            }
            _ => {}
        }
    });
    if let Some(err) = failure {
        return Err(err);
    }

    if let Some(conflict) = variables.iter().find(|v| alias_sources.contains(*v)) {
        return Err(EosError::Internal(
            ErrorInfo::new(
                "eos_observable.alias_conflict",
                "kinematic variable is read directly and also aliased",
            )
            .with_context("variable", conflict.clone()),
        ));
    }
    Ok(variables.into_iter().collect())
}

impl ObservableEntry for ExpressionEntry {
    fn metadata(&self) -> &EntryMetadata {
        &self.metadata
    }

    fn option_schema(&self) -> &OptionSchema {
        &self.schema
    }

    fn make(
        &self,
        registry: &ObservableRegistry,
        parameters: &Parameters,
        kinematics: &Kinematics,
        options: &Options,
    ) -> Result<ObservablePtr, EosError> {
        let options = self.metadata.apply_forced(options);
        self.schema.validate(&options)?;
        let mut user = ParameterUser::new();
        let root = bind(&self.expression, &mut Binder::Make(registry), parameters, kinematics, &options, &mut user)?;
        Ok(Arc::new(ExpressionObservable {
            name: self.metadata.name.clone(),
            parameters: parameters.clone(),
            kinematics: kinematics.clone(),
            options,
            expression: Arc::clone(&self.expression),
            root,
            user,
        }))
    }

    fn kind(&self) -> &'static str {
        "expression"
    }
}

/// Expression tree with every reference resolved against one world.
#[derive(Debug)]
enum Node {
    Constant(f64),
    Binary(BinaryOperator, Box<Node>, Box<Node>),
    Negate(Box<Node>),
    Call(Function, Box<Node>),
    Observable(ObservablePtr),
    Parameter(Parameter),
    Kinematic(KinematicVariable),
}

impl Node {
    fn evaluate(&self) -> Result<f64, EosError> {
        Ok(match self {
            Node::Constant(value) => *value,
            Node::Binary(operator, lhs, rhs) => operator.apply(lhs.evaluate()?, rhs.evaluate()?),
            Node::Negate(inner) => -inner.evaluate()?,
            Node::Call(function, argument) => function.apply(argument.evaluate()?),
            Node::Observable(observable) => observable.evaluate()?,
            Node::Parameter(parameter) => parameter.value(),
            Node::Kinematic(variable) => variable.value(),
        })
    }
}

/// Where sub-observables come from: the registry on construction, the
/// previous binding when rebinding.
enum Binder<'a> {
    Make(&'a ObservableRegistry),
    Rebind(std::slice::Iter<'a, ObservablePtr>),
}

/// Handle on which a referenced observable reads its variables.
fn reference_kinematics(kinematics: &Kinematics, specification: &KinematicsSpecification) -> Result<Kinematics, EosError> {
    let mut aliases: Vec<(String, String)> = specification.aliases.clone();
    for (variable, value) in &specification.values {
        // pinned values live under a private name so the caller's variable stays untouched
        let pinned = format!("{variable}={value}");
        kinematics.declare(pinned.clone(), *value);
        aliases.push((variable.clone(), pinned));
    }
    kinematics.with_aliases(aliases.iter().map(|(alias, source)| (alias.as_str(), source.as_str())))
}

fn bind(
    expression: &Expression,
    binder: &mut Binder<'_>,
    parameters: &Parameters,
    kinematics: &Kinematics,
    options: &Options,
    user: &mut ParameterUser,
) -> Result<Node, EosError> {
    Ok(match expression {
        Expression::Constant(value) => Node::Constant(*value),
        Expression::Binary { operator, lhs, rhs } => Node::Binary(
            *operator,
            Box::new(bind(lhs, binder, parameters, kinematics, options, user)?),
            Box::new(bind(rhs, binder, parameters, kinematics, options, user)?),
        ),
        Expression::Negate(inner) => Node::Negate(Box::new(bind(inner, binder, parameters, kinematics, options, user)?)),
        Expression::Call { function, argument } => {
            Node::Call(*function, Box::new(bind(argument, binder, parameters, kinematics, options, user)?))
        }
        Expression::Observable { name, kinematics: specification } => {
            let view = reference_kinematics(kinematics, specification)?;
            let observable = match binder {
                Binder::Make(registry) => registry.make_qualified(name, parameters, &view, options)?,
                Binder::Rebind(previous) => previous
                    .next()
                    .ok_or_else(|| {
                        EosError::Internal(
                            ErrorInfo::new("eos_observable.rebind_mismatch", "expression tree changed shape")
                                .with_context("name", name.full()),
                        )
                    })?
                    .rebind(parameters, &view)?,
            };
            user.uses_all(observable.parameter_user());
            Node::Observable(observable)
        }
        Expression::Parameter(name) => {
            let parameter = parameters.get(name)?;
            user.uses(parameter.id());
            Node::Parameter(parameter)
        }
        Expression::Kinematic(variable) => Node::Kinematic(kinematics.variable(variable)?),
    })
}

fn collect_observables(node: &Node, out: &mut Vec<ObservablePtr>) {
    match node {
        Node::Binary(_, lhs, rhs) => {
            collect_observables(lhs, out);
            collect_observables(rhs, out);
        }
        Node::Negate(inner) | Node::Call(_, inner) => collect_observables(inner, out),
        Node::Observable(observable) => out.push(Arc::clone(observable)),
        Node::Constant(_) | Node::Parameter(_) | Node::Kinematic(_) => {}
    }
}

/// Observable evaluating an expression over bound references.
pub struct ExpressionObservable {
    name: QualifiedName,
    parameters: Parameters,
    kinematics: Kinematics,
    options: Options,
    expression: Arc<Expression>,
    root: Node,
    user: ParameterUser,
}

impl ExpressionObservable {
    /// The expression this observable evaluates.
    pub fn expression(&self) -> &Expression {
        &self.expression
    }

    /// Referenced observables in source order.
    pub fn references(&self) -> Vec<ObservablePtr> {
        let mut out = Vec::new();
        collect_observables(&self.root, &mut out);
        out
    }
}

impl fmt::Debug for ExpressionObservable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExpressionObservable")
            .field("name", &self.name.str())
            .field("expression", &self.expression.to_string())
            .field("options", &self.options.as_string())
            .finish()
    }
}

impl Observable for ExpressionObservable {
    fn name(&self) -> &QualifiedName {
        &self.name
    }

    fn evaluate(&self) -> Result<f64, EosError> {
        self.root.evaluate()
    }

    fn kinematics(&self) -> &Kinematics {
        &self.kinematics
    }

    fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    fn options(&self) -> &Options {
        &self.options
    }

    fn parameter_user(&self) -> &ParameterUser {
        &self.user
    }

    fn rebind(&self, parameters: &Parameters, kinematics: &Kinematics) -> Result<ObservablePtr, EosError> {
        let previous = self.references();
        let mut user = ParameterUser::new();
        let root = bind(
            &self.expression,
            &mut Binder::Rebind(previous.iter()),
            parameters,
            kinematics,
            &self.options,
            &mut user,
        )?;
        Ok(Arc::new(ExpressionObservable {
            name: self.name.clone(),
            parameters: parameters.clone(),
            kinematics: kinematics.clone(),
            options: self.options.clone(),
            expression: Arc::clone(&self.expression),
            root,
            user,
        }))
    }
}
