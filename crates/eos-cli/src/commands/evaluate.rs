use std::collections::BTreeMap;
use std::path::PathBuf;

use clap::Args;
use eos_core::{EosError, ErrorInfo, Kinematics, Options, QualifiedName};
use serde::Serialize;

use crate::Engine;

#[derive(Args, Debug)]
pub struct EvaluateArgs {
    /// Qualified observable name, e.g. `B->pilnu::BR;l=e`.
    pub name: String,
    /// Kinematic variable as `name=value`; repeatable.
    #[arg(short = 'k', long = "kinematics", value_name = "VAR=VALUE", value_parser = parse_kinematic)]
    pub kinematics: Vec<(String, f64)>,
    /// Option as `key=value`; repeatable.
    #[arg(short = 'o', long = "option", value_name = "KEY=VALUE", value_parser = parse_option)]
    pub options: Vec<(String, String)>,
    /// Parameter override as `name=value`; repeatable, applied after the file.
    #[arg(short = 'p', long = "parameter", value_name = "NAME=VALUE", value_parser = parse_kinematic)]
    pub parameters: Vec<(String, f64)>,
    /// YAML file of parameter overrides.
    #[arg(long)]
    pub parameters_file: Option<PathBuf>,
    /// Print the result as JSON.
    #[arg(long)]
    pub json: bool,
}

fn split_pair(input: &str) -> Result<(&str, &str), String> {
    match input.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() && !value.trim().is_empty() => Ok((key.trim(), value.trim())),
        _ => Err(format!("expected `name=value`, got `{input}`")),
    }
}

fn parse_kinematic(input: &str) -> Result<(String, f64), String> {
    let (name, value) = split_pair(input)?;
    let value = value
        .parse::<f64>()
        .map_err(|err| format!("`{value}` is not a number: {err}"))?;
    Ok((name.to_string(), value))
}

fn parse_option(input: &str) -> Result<(String, String), String> {
    let (key, value) = split_pair(input)?;
    Ok((key.to_string(), value.to_string()))
}

#[derive(Debug, Serialize)]
struct Evaluation {
    name: String,
    kinematics: BTreeMap<String, f64>,
    options: BTreeMap<String, String>,
    value: f64,
}

pub fn run(engine: &Engine, args: &EvaluateArgs) -> Result<(), EosError> {
    let name = QualifiedName::new(&args.name)?;
    let world = engine.parameters()?;
    if let Some(path) = &args.parameters_file {
        world.override_from_file(path)?;
    }
    for (parameter, value) in &args.parameters {
        world.set(parameter, *value)?;
    }
    let kinematics = Kinematics::from_pairs(args.kinematics.iter().map(|(var, value)| (var.as_str(), *value)));
    let options = Options::from_pairs(args.options.iter().map(|(key, value)| (key.as_str(), value.as_str())));

    let observable = engine.registry.make_qualified(&name, &world, &kinematics, &options)?;
    let value = observable.evaluate()?;
    tracing::debug!(name = %name, value, "observable evaluated");

    if args.json {
        let evaluation = Evaluation {
            name: name.full(),
            kinematics: kinematics.pairs().into_iter().collect(),
            options: observable
                .options()
                .iter()
                .map(|(key, value)| (key.to_string(), value.to_string()))
                .collect(),
            value,
        };
        let text = serde_json::to_string_pretty(&evaluation).map_err(|err| {
            EosError::Serde(ErrorInfo::new("eos_cli.json", err.to_string()).with_context("name", name.to_string()))
        })?;
        println!("{text}");
    } else {
        println!("{value:e}");
    }
    Ok(())
}
