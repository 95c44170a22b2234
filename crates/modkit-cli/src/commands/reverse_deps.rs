//! Handler for `modkit reverse-deps`.

use std::collections::BTreeSet;

use miette::Result;

use modkit_core::registry::RegistryQuerier;
use modkit_resolver::sanity::RegistrySanity;
use modkit_util::status::{status_info, status_warn};

use super::Session;
use crate::cli::SnapshotArgs;

pub fn exec(snapshot: &SnapshotArgs, modules: &[String]) -> Result<()> {
    let session = Session::load(snapshot)?;
    let requested: BTreeSet<String> = modules.iter().cloned().collect();
    for id in &requested {
        if session.registry.installed_module(id).is_none() {
            status_warn("Warning", &format!("{id} is not installed"));
        }
    }

    let removing = session.registry.find_reverse_dependencies(&requested);
    for id in &removing {
        println!("{id}");
    }
    status_info(
        "Removing",
        &format!(
            "{} module(s), {} broken by the removal",
            removing.len(),
            removing.difference(&requested).count()
        ),
    );
    Ok(())
}
