//! Handler for `modkit resolve`.

use miette::Result;
use serde_json::json;

use modkit_resolver::graph::ReasonGraph;
use modkit_resolver::options::Preset;
use modkit_resolver::{RelationshipResolver, ResolutionOptions};
use modkit_util::errors::ModkitError;
use modkit_util::status::{status, status_warn};

use super::Session;
use crate::cli::SnapshotArgs;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Output {
    List,
    Tree,
    Json,
}

pub fn exec(
    snapshot: &SnapshotArgs,
    modules: &[String],
    remove: &[String],
    preset: Preset,
    proceed: bool,
    output: Output,
) -> Result<()> {
    let session = Session::load(snapshot)?;
    let mut options = ResolutionOptions::from_config(preset, &session.config);
    if proceed {
        options = options.proceed_with_inconsistencies(true);
    }
    let resolver = session.resolve(modules, remove, &options)?;

    match output {
        Output::Json => print_json(&resolver)?,
        Output::Tree => print!("{}", ReasonGraph::from_resolver(&resolver).print_tree(None)),
        Output::List => {
            for module in resolver.mod_list(true) {
                println!("{module}: {}", resolver.reason_string_for(&module.identifier));
            }
        }
    }

    let conflicts = resolver.conflict_report();
    if !conflicts.is_empty() {
        status_warn("Conflicts", &conflicts.len().to_string());
        if output != Output::Json {
            for c in &conflicts.conflicts {
                println!("{c}");
            }
        }
    }
    status(
        "Resolved",
        &format!("{} module(s)", resolver.mod_list(true).len()),
    );
    Ok(())
}

fn print_json(resolver: &RelationshipResolver) -> Result<()> {
    let modules: Vec<serde_json::Value> = resolver
        .mod_list(true)
        .into_iter()
        .map(|m| {
            json!({
                "identifier": m.identifier,
                "version": m.version,
                "reasons": resolver.reasons_for(&m.identifier),
            })
        })
        .collect();
    let out = json!({
        "modules": modules,
        "conflicts": resolver.conflict_report(),
    });
    let rendered = serde_json::to_string_pretty(&out).map_err(|e| ModkitError::Generic {
        message: format!("Failed to render JSON: {e}"),
    })?;
    println!("{rendered}");
    Ok(())
}
