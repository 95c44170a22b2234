//! Handler for `modkit why`.

use miette::Result;

use modkit_resolver::graph::ReasonGraph;
use modkit_resolver::options::Preset;
use modkit_resolver::ResolutionOptions;
use modkit_util::errors::ModkitError;

use super::Session;
use crate::cli::SnapshotArgs;

pub fn exec(snapshot: &SnapshotArgs, target: &str, modules: &[String]) -> Result<()> {
    let session = Session::load(snapshot)?;
    let options = ResolutionOptions::from_config(Preset::Default, &session.config);
    let resolver = session.resolve(modules, &[], &options)?;

    let graph = ReasonGraph::from_resolver(&resolver);
    let path = graph.why(target).ok_or_else(|| ModkitError::Resolution {
        message: format!("{target} is not part of the resolution"),
    })?;
    let rendered: Vec<String> = path.iter().map(ToString::to_string).collect();
    println!("{}", rendered.join(" -> "));
    println!("{}", resolver.reason_string_for(target));
    print!("{}", graph.print_inverted_tree(target));
    Ok(())
}
