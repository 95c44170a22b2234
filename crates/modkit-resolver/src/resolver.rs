//! The relationship resolver.
//!
//! Resolution runs in three passes over a working set seeded with the
//! user's requests:
//!
//! 1. Hard `depends` edges are followed depth-first. Each unsatisfied edge
//!    gathers candidates (real releases newest first, then providers) and
//!    trial-resolves them on a copy of the working set. A trial fails if
//!    the candidate conflicts with anything present, breaks a version
//!    requirement some present module has on it, or its own subtree
//!    cannot be resolved, so an older release is picked when the newest
//!    one would not fit.
//! 2. Suggests and recommends, when enabled, are tried the same way and
//!    quietly dropped if they do not fit.
//! 3. The finished set is scanned for conflicts and, unless disabled,
//!    checked for unmet dependencies.

use std::collections::{BTreeMap, BTreeSet};

use modkit_core::game_version::{Game, GameVersionCriteria};
use modkit_core::module::{Module, ModuleKey};
use modkit_core::registry::RegistryQuerier;
use modkit_core::relationship::{ModuleDescriptor, RelationshipDescriptor};
use modkit_core::version::ModuleVersion;

use crate::conflict::ConflictReport;
use crate::error::{ResolutionError, UnsatisfiedDependency};
use crate::options::ResolutionOptions;
use crate::reason::SelectionReason;
use crate::request::InstallRequest;
use crate::sanity::SanityChecker;

/// A finished resolution: the modules to be present and why.
#[derive(Debug, Clone)]
pub struct RelationshipResolver {
    modules: Vec<Module>,
    reasons: BTreeMap<String, Vec<SelectionReason>>,
    conflicts: ConflictReport,
    installed: Vec<Module>,
    dlls: BTreeSet<String>,
    dlc: BTreeMap<String, ModuleVersion>,
}

impl RelationshipResolver {
    /// Resolve `install` against `registry`, treating installed modules in
    /// `remove` as gone.
    ///
    /// On success the result is final: consistent, or with every conflict
    /// recorded when the options allow inconsistencies.
    pub fn new<R: RegistryQuerier + ?Sized>(
        install: &[InstallRequest],
        remove: &[String],
        options: &ResolutionOptions,
        registry: &R,
        game: &Game,
        criteria: &GameVersionCriteria,
    ) -> Result<Self, ResolutionError> {
        let installed: BTreeMap<String, Module> = registry
            .installed_modules()
            .iter()
            .filter(|(id, _)| !remove.contains(id))
            .map(|(id, m)| (id.clone(), m.clone()))
            .collect();
        let search = Search {
            registry,
            options,
            game,
            criteria,
            installed,
        };

        let mut state = State::default();
        for id in search.installed.keys() {
            state.add_reason(id, SelectionReason::Installed);
        }

        let requested = install
            .iter()
            .map(|r| search.lookup(r))
            .collect::<Result<Vec<_>, _>>()?;
        for module in &requested {
            if let Some(existing) = state.modules.get(&module.identifier) {
                if existing.version != module.version {
                    tracing::warn!("Ignoring request for {module}, {existing} was already requested");
                    continue;
                }
            }
            tracing::debug!("User requested {module}");
            state.add(module.clone(), SelectionReason::UserRequested);
        }

        let mut unsatisfied: Vec<UnsatisfiedDependency> = Vec::new();
        for module in &requested {
            if state.modules.get(&module.identifier) != Some(module) {
                continue;
            }
            let chain = [module.key()];
            match search.expand_depends(&mut state, module, &chain) {
                Ok(()) => {}
                Err(ResolutionError::MissingDependency { unsatisfied: u }) => unsatisfied.extend(u),
                Err(e) => return Err(e),
            }
        }
        if !unsatisfied.is_empty() {
            return Err(ResolutionError::MissingDependency { unsatisfied });
        }

        search.expand_soft(&mut state);

        let modules: Vec<Module> = state
            .order
            .iter()
            .filter_map(|id| state.modules.get(id).cloned())
            .collect();
        let installed: Vec<Module> = search
            .installed
            .values()
            .filter(|m| !state.modules.contains_key(&m.identifier))
            .cloned()
            .collect();
        let dlls = registry.dlls().clone();
        let dlc = registry.dlc().clone();

        let conflicts = ConflictReport::scan(&modules, &installed, &dlls, &dlc);
        if !conflicts.is_empty() {
            if !options.proceeds_with_inconsistencies() {
                return Err(ResolutionError::Conflict {
                    conflicts: conflicts.descriptions(),
                });
            }
            tracing::warn!("Proceeding despite {} conflict(s)", conflicts.len());
        }

        if options.enforces_consistency() {
            let problems: Vec<String> =
                SanityChecker::find_unsatisfied_depends(modules.iter().chain(&installed), &dlls, &dlc)
                    .into_iter()
                    .map(|(m, d)| format!("{m} has an unsatisfied dependency: {d}"))
                    .collect();
            if !problems.is_empty() {
                return Err(ResolutionError::Inconsistent { problems });
            }
        }

        tracing::info!("Resolved {} module(s)", modules.len());
        Ok(Self {
            modules,
            reasons: state.reasons,
            conflicts,
            installed,
            dlls,
            dlc,
        })
    }

    /// The modules to install, in the order they were selected.
    /// Metapackages have no content and are left out. Without
    /// `include_optional`, modules present only because of suggests or
    /// recommends are left out too.
    pub fn mod_list(&self, include_optional: bool) -> Vec<&Module> {
        self.modules
            .iter()
            .filter(|m| !m.is_metapackage())
            .filter(|m| include_optional || !self.is_optional(&m.identifier, &mut BTreeSet::new()))
            .collect()
    }

    /// Every selected module, metapackages included.
    pub fn selected(&self) -> &[Module] {
        &self.modules
    }

    /// Every reason attached to `identifier`; empty if it is not involved.
    pub fn reasons_for(&self, identifier: &str) -> &[SelectionReason] {
        self.reasons.get(identifier).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The main reason for `identifier`, followed back through its parents:
    /// `To satisfy dependency from B 1.0 (Requested by user)`.
    pub fn reason_string_for(&self, identifier: &str) -> String {
        let mut visited = BTreeSet::from([identifier.to_string()]);
        self.reason_chain(identifier, &mut visited)
    }

    fn reason_chain(&self, identifier: &str, visited: &mut BTreeSet<String>) -> String {
        let reasons = self.reasons_for(identifier);
        let Some(reason) = reasons
            .iter()
            .find(|r| **r != SelectionReason::Installed)
            .or_else(|| reasons.first())
        else {
            return String::new();
        };
        let mut text = reason.describe();
        if let Some(parent) = reason.parent() {
            if visited.insert(parent.identifier.clone()) {
                let up = self.reason_chain(&parent.identifier, visited);
                if !up.is_empty() {
                    text.push_str(&format!(" ({up})"));
                }
            }
        }
        text
    }

    /// Modules pulled in by hard dependencies.
    pub fn dependencies(&self) -> Vec<&Module> {
        self.mod_list(false)
            .into_iter()
            .filter(|m| {
                self.reasons_for(&m.identifier)
                    .iter()
                    .any(|r| matches!(r, SelectionReason::Depends(_)))
            })
            .collect()
    }

    /// Optional modules recommended by something, excluding identifiers in
    /// `base`.
    pub fn recommendations(&self, base: &BTreeSet<String>) -> Vec<&Module> {
        self.optional_with(base, |r| matches!(r, SelectionReason::Recommended(_)))
    }

    /// Optional modules suggested by something, excluding identifiers in
    /// `base`.
    pub fn suggestions(&self, base: &BTreeSet<String>) -> Vec<&Module> {
        self.optional_with(base, |r| matches!(r, SelectionReason::Suggested(_)))
    }

    fn optional_with(
        &self,
        base: &BTreeSet<String>,
        wanted: impl Fn(&SelectionReason) -> bool,
    ) -> Vec<&Module> {
        self.modules
            .iter()
            .filter(|m| !m.is_metapackage() && !base.contains(&m.identifier))
            .filter(|m| self.reasons_for(&m.identifier).iter().any(&wanted))
            .filter(|m| self.is_optional(&m.identifier, &mut BTreeSet::new()))
            .collect()
    }

    /// Conflict descriptions keyed by resolved module. Only populated when
    /// inconsistencies were allowed.
    pub fn conflict_list(&self) -> BTreeMap<ModuleKey, String> {
        self.conflicts.by_module()
    }

    pub fn conflict_report(&self) -> &ConflictReport {
        &self.conflicts
    }

    /// Installed modules that stay as they are.
    pub fn retained_installed(&self) -> &[Module] {
        &self.installed
    }

    pub fn is_consistent(&self) -> bool {
        self.conflicts.is_empty()
            && SanityChecker::is_consistent(
                self.modules.iter().chain(&self.installed),
                &self.dlls,
                &self.dlc,
            )
    }

    /// True if nothing but soft relationships keeps `identifier` in the set.
    fn is_optional(&self, identifier: &str, visited: &mut BTreeSet<String>) -> bool {
        if !visited.insert(identifier.to_string()) {
            return true;
        }
        let reasons = self.reasons_for(identifier);
        let optional = !reasons.is_empty()
            && reasons.iter().all(|r| match r {
                SelectionReason::Depends(parent) => self.is_optional(&parent.identifier, visited),
                other => other.is_soft(),
            });
        visited.remove(identifier);
        optional
    }
}

/// Working set; cloned for every trial.
#[derive(Debug, Clone, Default)]
struct State {
    modules: BTreeMap<String, Module>,
    order: Vec<String>,
    reasons: BTreeMap<String, Vec<SelectionReason>>,
    /// Reached through an edge with `suppress_recommendations`.
    soft_blocked: BTreeSet<String>,
}

impl State {
    fn add(&mut self, module: Module, reason: SelectionReason) {
        let id = module.identifier.clone();
        if !self.modules.contains_key(&id) {
            self.order.push(id.clone());
            self.modules.insert(id.clone(), module);
        }
        self.add_reason(&id, reason);
    }

    fn add_reason(&mut self, identifier: &str, reason: SelectionReason) {
        let reasons = self.reasons.entry(identifier.to_string()).or_default();
        if !reasons.contains(&reason) {
            reasons.push(reason);
        }
    }
}

/// What already satisfies a reference.
enum Satisfier {
    Selected(String),
    External,
}

/// One relationship edge being resolved.
struct Edge<'e> {
    owner: &'e Module,
    target: &'e ModuleDescriptor,
    reason: SelectionReason,
    suppress: bool,
    /// Owner first, then the owner's parents up to a user request.
    chain: &'e [ModuleKey],
    soft: bool,
}

/// Candidate releases sharing one identifier, newest first.
type Group = (String, Vec<Module>);

struct Search<'r, R: ?Sized> {
    registry: &'r R,
    options: &'r ResolutionOptions,
    game: &'r Game,
    criteria: &'r GameVersionCriteria,
    /// Installed modules that are not being removed.
    installed: BTreeMap<String, Module>,
}

impl<R: RegistryQuerier + ?Sized> Search<'_, R> {
    fn lookup(&self, request: &InstallRequest) -> Result<Module, ResolutionError> {
        let (identifier, version) = match request {
            InstallRequest::Module(m) => return Ok(m.clone()),
            InstallRequest::Identifier {
                identifier,
                version,
            } => (identifier, version),
        };
        let not_found = || ResolutionError::NotFound {
            identifier: identifier.clone(),
            version: version.clone(),
        };
        if let Some(v) = version {
            return self
                .registry
                .module_by_version(identifier, v)
                .cloned()
                .ok_or_else(not_found);
        }

        let stability = self.options.stability();
        if let Some(m) = self.registry.latest_available(identifier, stability, self.criteria) {
            return Ok(m.clone());
        }
        if self.options.allows_incompatible() {
            if let Some(m) = self
                .registry
                .incompatible_versions(identifier, stability, self.criteria)
                .first()
            {
                return Ok((*m).clone());
            }
        }

        // Not a real module; maybe something provides it
        let providers: Vec<&Module> = self
            .registry
            .providers_of(identifier)
            .into_iter()
            .filter_map(|p| self.registry.latest_available(p, stability, self.criteria))
            .collect();
        match providers.as_slice() {
            [] => Err(not_found()),
            [only] => Ok((*only).clone()),
            [first, ..] if self.options.tolerates_ambiguity() => Ok((*first).clone()),
            _ => Err(ResolutionError::AmbiguousProvider {
                requested: identifier.clone(),
                candidates: providers.iter().map(|m| m.key()).collect(),
            }),
        }
    }

    fn satisfied(&self, state: &State, target: &ModuleDescriptor) -> Option<Satisfier> {
        if let Some(m) = state.modules.get(&target.name) {
            if target.within_bounds(&m.version) {
                return Some(Satisfier::Selected(m.identifier.clone()));
            }
        }
        if let Some(id) = state
            .order
            .iter()
            .find(|id| state.modules.get(*id).is_some_and(|m| target.matches_module(m)))
        {
            return Some(Satisfier::Selected(id.clone()));
        }
        let external = retained(&self.installed, state).any(|m| target.matches_module(m))
            || self.registry.dlls().contains(&target.name)
            || self.registry.dlc().contains_key(&target.name);
        external.then_some(Satisfier::External)
    }

    fn expand_depends(
        &self,
        state: &mut State,
        module: &Module,
        chain: &[ModuleKey],
    ) -> Result<(), ResolutionError> {
        let mut unsatisfied = Vec::new();
        for depends in &module.depends {
            match self.resolve_depends(state, module, depends, chain) {
                Ok(()) => {}
                Err(ResolutionError::MissingDependency { unsatisfied: u }) => unsatisfied.extend(u),
                Err(e) => return Err(e),
            }
        }
        if unsatisfied.is_empty() {
            Ok(())
        } else {
            Err(ResolutionError::MissingDependency { unsatisfied })
        }
    }

    fn resolve_depends(
        &self,
        state: &mut State,
        owner: &Module,
        depends: &RelationshipDescriptor,
        chain: &[ModuleKey],
    ) -> Result<(), ResolutionError> {
        let reason = SelectionReason::Depends(owner.key());
        for target in depends.targets() {
            if let Some(found) = self.satisfied(state, target) {
                if let Satisfier::Selected(id) = found {
                    state.add_reason(&id, reason);
                }
                return Ok(());
            }
        }

        let mut errors = Vec::new();
        for target in depends.targets() {
            if let Some(fixed) = state
                .modules
                .get(&target.name)
                .or_else(|| self.installed.get(&target.name))
            {
                errors.push(ResolutionError::VersionMismatch {
                    descriptor: target.to_string(),
                    found: fixed.key(),
                    needed_by: owner.key(),
                });
                continue;
            }
            let groups = self.candidates(target, false);
            if groups.is_empty() {
                errors.push(ResolutionError::missing(self.describe_missing(target), chain.to_vec()));
                continue;
            }
            let edge = Edge {
                owner,
                target,
                reason: reason.clone(),
                suppress: depends.suppresses_recommendations(),
                chain,
                soft: false,
            };
            match self.choose(state, &edge, &groups) {
                Ok(chosen) => {
                    *state = chosen;
                    return Ok(());
                }
                Err(e) => errors.push(e),
            }
        }

        match errors.pop() {
            Some(e) if errors.is_empty() => Err(e),
            _ => Err(ResolutionError::missing(depends.to_string(), chain.to_vec())),
        }
    }

    /// Releases that could satisfy `target`: the real module first, then
    /// each provider in identifier order.
    fn candidates(&self, target: &ModuleDescriptor, include_dlc: bool) -> Vec<Group> {
        let mut groups = Vec::new();
        let direct = self.eligible(&target.name, include_dlc, |m| target.within_bounds(&m.version));
        if !direct.is_empty() {
            groups.push((target.name.clone(), direct));
        }
        for provider in self.registry.providers_of(&target.name) {
            if self.installed.contains_key(provider) {
                continue;
            }
            let versions = self.eligible(provider, include_dlc, |m| {
                m.provides.iter().any(|p| *p == target.name)
            });
            if !versions.is_empty() {
                groups.push((provider.to_string(), versions));
            }
        }
        groups
    }

    fn eligible(
        &self,
        identifier: &str,
        include_dlc: bool,
        accept: impl Fn(&Module) -> bool,
    ) -> Vec<Module> {
        let stability = self.options.stability();
        let pick = |found: Vec<&Module>| -> Vec<Module> {
            found
                .into_iter()
                .filter(|m| include_dlc || !m.is_dlc())
                .filter(|m| accept(*m))
                .cloned()
                .collect()
        };
        let compatible = pick(
            self.registry
                .available_versions(identifier, stability, self.criteria),
        );
        if compatible.is_empty() && self.options.allows_incompatible() {
            return pick(
                self.registry
                    .incompatible_versions(identifier, stability, self.criteria),
            );
        }
        compatible
    }

    /// Pick one group for `edge`, returning the working set with it added.
    fn choose(&self, state: &State, edge: &Edge<'_>, groups: &[Group]) -> Result<State, ResolutionError> {
        let mut viable: Vec<(String, State)> = Vec::new();
        let mut causes: Vec<ResolutionError> = Vec::new();
        let retry = !edge.soft && self.options.proceeds_with_inconsistencies();

        for allow_conflicts in [false, true] {
            if allow_conflicts && !retry {
                break;
            }
            causes.clear();
            for (identifier, versions) in groups {
                match self.first_viable(state, edge, versions, allow_conflicts) {
                    Ok(trial) => {
                        let direct = *identifier == edge.target.name;
                        viable.push((identifier.clone(), trial));
                        if direct {
                            break;
                        }
                    }
                    Err(e) => causes.push(e),
                }
            }
            if !viable.is_empty() {
                break;
            }
        }

        if viable.len() > 1 {
            let named: Vec<usize> = viable
                .iter()
                .enumerate()
                .filter(|(_, (id, _))| names(edge.owner, id))
                .map(|(i, _)| i)
                .collect();
            if let [only] = named.as_slice() {
                return Ok(viable.swap_remove(*only).1);
            }
            if !self.options.tolerates_ambiguity() {
                return Err(ResolutionError::AmbiguousProvider {
                    requested: edge.target.name.clone(),
                    candidates: viable
                        .iter()
                        .filter_map(|(id, s)| s.modules.get(id).map(Module::key))
                        .collect(),
                });
            }
            tracing::debug!(
                "Several modules provide {}, taking {}",
                edge.target.name,
                viable[0].0
            );
        }

        if viable.is_empty() {
            return Err(self.rejection(edge, causes));
        }
        Ok(viable.swap_remove(0).1)
    }

    /// The error for an edge none of whose candidates fit. When every
    /// candidate was turned away for a conflict, the conflicts are the error.
    fn rejection(&self, edge: &Edge<'_>, mut causes: Vec<ResolutionError>) -> ResolutionError {
        let all_conflicts = !causes.is_empty()
            && causes
                .iter()
                .all(|e| matches!(e, ResolutionError::Conflict { .. }));
        if all_conflicts {
            let mut conflicts: Vec<String> = Vec::new();
            for cause in causes {
                if let ResolutionError::Conflict { conflicts: found } = cause {
                    for c in found {
                        if !conflicts.contains(&c) {
                            conflicts.push(c);
                        }
                    }
                }
            }
            return ResolutionError::Conflict { conflicts };
        }
        match causes.pop() {
            Some(e) if causes.is_empty() => e,
            _ => ResolutionError::missing(self.describe_missing(edge.target), edge.chain.to_vec()),
        }
    }

    /// The newest release in `versions` whose trial succeeds.
    fn first_viable(
        &self,
        state: &State,
        edge: &Edge<'_>,
        versions: &[Module],
        allow_conflicts: bool,
    ) -> Result<State, ResolutionError> {
        let mut first_error = None;
        for candidate in versions {
            tracing::debug!("Considering {candidate} for {}", edge.target);
            match self.trial(state, edge, candidate, allow_conflicts) {
                Ok(trial) => return Ok(trial),
                Err(e) => {
                    tracing::debug!("Rejected {candidate}: {e}");
                    first_error.get_or_insert(e);
                }
            }
        }
        Err(first_error.unwrap_or_else(|| {
            ResolutionError::missing(self.describe_missing(edge.target), edge.chain.to_vec())
        }))
    }

    fn trial(
        &self,
        state: &State,
        edge: &Edge<'_>,
        candidate: &Module,
        allow_conflicts: bool,
    ) -> Result<State, ResolutionError> {
        if !allow_conflicts {
            if let Some(description) = self.conflict_with_working_set(state, candidate) {
                return Err(ResolutionError::Conflict {
                    conflicts: vec![description],
                });
            }
        }
        if let Some(mismatch) = reverse_mismatch(state, candidate) {
            return Err(mismatch);
        }

        let mut trial = state.clone();
        trial.add(candidate.clone(), edge.reason.clone());
        if edge.suppress {
            trial.soft_blocked.insert(candidate.identifier.clone());
        }
        let mut chain = Vec::with_capacity(edge.chain.len() + 1);
        chain.push(candidate.key());
        chain.extend_from_slice(edge.chain);
        self.expand_depends(&mut trial, candidate, &chain)?;
        Ok(trial)
    }

    fn conflict_with_working_set(&self, state: &State, candidate: &Module) -> Option<String> {
        for other in state.modules.values().chain(retained(&self.installed, state)) {
            if candidate.conflicts_with(other).is_some() || other.conflicts_with(candidate).is_some() {
                return Some(format!("{candidate} conflicts with {other}"));
            }
        }
        candidate
            .conflicts
            .iter()
            .flat_map(RelationshipDescriptor::targets)
            .find_map(|t| {
                if self.registry.dlls().contains(&t.name) {
                    Some(t.name.clone())
                } else {
                    t.matching_dlc(self.registry.dlc()).map(|v| format!("{} {v}", t.name))
                }
            })
            .map(|other| format!("{candidate} conflicts with {other}"))
    }

    /// `target` as shown in a missing-dependency error, with the game
    /// versions its releases do support when only incompatible ones exist.
    fn describe_missing(&self, target: &ModuleDescriptor) -> String {
        let incompatible = self
            .registry
            .incompatible_versions(&target.name, self.options.stability(), self.criteria)
            .into_iter()
            .find(|m| !m.is_dlc() && target.within_bounds(&m.version));
        match incompatible {
            Some(m) => format!("{target} ({} {})", self.game.short_name, m.compatibility()),
            None => target.to_string(),
        }
    }

    fn expand_soft(&self, state: &mut State) {
        let options = self.options;
        if !options.follows_recommends() && !options.follows_suggests() {
            return;
        }
        let mut next = 0;
        while next < state.order.len() {
            let identifier = state.order[next].clone();
            next += 1;
            if state.soft_blocked.contains(&identifier) {
                continue;
            }
            let Some(module) = state.modules.get(&identifier).cloned() else {
                continue;
            };
            if options.follows_recommends() {
                for rel in &module.recommends {
                    self.add_soft(state, &module, rel, SelectionReason::Recommended(module.key()));
                }
            }
            let requested = state
                .reasons
                .get(&identifier)
                .is_some_and(|r| r.contains(&SelectionReason::UserRequested));
            if options.follows_all_suggests() || (options.follows_suggests() && requested) {
                for rel in &module.suggests {
                    self.add_soft(state, &module, rel, SelectionReason::Suggested(module.key()));
                }
            }
        }
    }

    fn add_soft(
        &self,
        state: &mut State,
        owner: &Module,
        rel: &RelationshipDescriptor,
        reason: SelectionReason,
    ) {
        for target in rel.targets() {
            if let Some(found) = self.satisfied(state, target) {
                if let Satisfier::Selected(id) = found {
                    state.add_reason(&id, reason);
                }
                return;
            }
        }
        let chain = [owner.key()];
        for target in rel.targets() {
            if state.modules.contains_key(&target.name) || self.installed.contains_key(&target.name) {
                continue;
            }
            let groups = self.candidates(target, true);
            if groups.is_empty() {
                continue;
            }
            let edge = Edge {
                owner,
                target,
                reason: reason.clone(),
                suppress: rel.suppresses_recommendations(),
                chain: &chain,
                soft: true,
            };
            match self.choose(state, &edge, &groups) {
                Ok(chosen) => {
                    *state = chosen;
                    return;
                }
                Err(e) => tracing::debug!("Skipping {target} ({reason}): {e}"),
            }
        }
        tracing::debug!("Dropped soft relationship {rel} of {owner}");
    }
}

/// Installed modules not replaced by something in the working set.
fn retained<'s>(
    installed: &'s BTreeMap<String, Module>,
    state: &'s State,
) -> impl Iterator<Item = &'s Module> + 's {
    installed
        .values()
        .filter(move |m| !state.modules.contains_key(&m.identifier))
}

/// True if any of `owner`'s relationships names `identifier` directly.
fn names(owner: &Module, identifier: &str) -> bool {
    owner
        .depends
        .iter()
        .chain(&owner.recommends)
        .chain(&owner.suggests)
        .flat_map(RelationshipDescriptor::targets)
        .any(|t| t.name == identifier)
}

/// A present module requiring `candidate`'s identifier at another version.
///
/// An `any_of` edge only counts while none of its other alternatives is
/// already met by the working set.
fn reverse_mismatch(state: &State, candidate: &Module) -> Option<ResolutionError> {
    state.modules.values().find_map(|m| {
        m.depends.iter().find_map(|d| {
            let mut named = d
                .targets()
                .iter()
                .filter(|t| t.name == candidate.identifier)
                .peekable();
            named.peek()?;
            if named.any(|t| t.within_bounds(&candidate.version)) {
                return None;
            }
            if let RelationshipDescriptor::AnyOf(_) = d {
                let met_elsewhere = d
                    .targets()
                    .iter()
                    .filter(|t| t.name != candidate.identifier)
                    .any(|t| state.modules.values().any(|o| t.matches_module(o)));
                if met_elsewhere {
                    return None;
                }
            }
            Some(ResolutionError::VersionMismatch {
                descriptor: d.to_string(),
                found: candidate.key(),
                needed_by: m.key(),
            })
        })
    })
}
