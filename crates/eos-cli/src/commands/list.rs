use clap::Args;
use eos_core::EosError;
use eos_stats::ConstraintCatalogue;

use crate::Engine;

#[derive(Args, Debug)]
pub struct ListObservablesArgs {
    /// Only list observables whose prefix starts with this string, e.g. `B->pilnu`.
    #[arg(long)]
    pub prefix: Option<String>,
}

#[derive(Args, Debug)]
pub struct ListParametersArgs {
    /// Only list the section with this title, ignoring case.
    #[arg(long)]
    pub section: Option<String>,
}

#[derive(Args, Debug)]
pub struct ListConstraintsArgs {
    /// Only list constraints whose name starts with this string.
    #[arg(long)]
    pub prefix: Option<String>,
}

pub fn observables(engine: &Engine, args: &ListObservablesArgs) -> Result<(), EosError> {
    let wanted = |prefix: &str| args.prefix.as_deref().map_or(true, |p| prefix.starts_with(p));
    for section in engine.registry.sections() {
        let mut header = false;
        for group in &section.groups {
            let names: Vec<_> = group.names.iter().filter(|name| wanted(name.prefix())).collect();
            if names.is_empty() {
                continue;
            }
            if !header {
                println!("# {}", section.title);
                header = true;
            }
            println!("## {}", group.title);
            for name in names {
                let variables = engine
                    .registry
                    .get(name)
                    .map(|entry| entry.metadata().kinematic_variables.join(", "))
                    .unwrap_or_default();
                println!("{name}\t[{variables}]");
            }
        }
    }
    Ok(())
}

pub fn parameters(engine: &Engine, args: &ListParametersArgs) -> Result<(), EosError> {
    let world = engine.parameters()?;
    for section in world.sections() {
        if let Some(wanted) = &args.section {
            if !section.title.eq_ignore_ascii_case(wanted) {
                continue;
            }
        }
        println!("# {}", section.title);
        for group in &section.groups {
            println!("## {}", group.title);
            for id in &group.ids {
                let parameter = world.by_id(*id)?;
                println!(
                    "{}\t{}\t[{}, {}]\t{}",
                    parameter.name(),
                    parameter.value(),
                    parameter.min(),
                    parameter.max(),
                    parameter.unit()
                );
            }
        }
    }
    Ok(())
}

pub fn constraints(args: &ListConstraintsArgs) -> Result<(), EosError> {
    let catalogue = ConstraintCatalogue::instance()?;
    for (name, entry) in catalogue.iter() {
        let full = name.to_string();
        if args.prefix.as_deref().is_some_and(|prefix| !full.starts_with(prefix)) {
            continue;
        }
        let observables: Vec<String> = entry.observable_names().iter().map(|name| name.to_string()).collect();
        println!(
            "{full}\t{}\t{}\t{}",
            entry.kind(),
            observables.join(" "),
            entry.references().join(",")
        );
    }
    Ok(())
}
