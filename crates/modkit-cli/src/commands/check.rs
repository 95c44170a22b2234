//! Handler for `modkit check`.

use miette::Result;

use modkit_core::registry::RegistryQuerier;
use modkit_resolver::sanity::RegistrySanity;
use modkit_util::status::status;

use super::Session;
use crate::cli::SnapshotArgs;

pub fn exec(snapshot: &SnapshotArgs) -> Result<()> {
    let session = Session::load(snapshot)?;
    session.registry.check_sanity()?;

    let installed = session.registry.installed_modules().len();
    status(
        "Checked",
        &format!("{installed} installed module(s), no problems found"),
    );
    Ok(())
}
