use std::path::Path;

use crate::git::Vcs;

/// Branches tried, in order, when reusing an existing working copy.
pub const DEFAULT_BRANCHES: [&str; 2] = ["main", "master"];

/// What the synchronizer saw at the local path before acting.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObservedState {
    pub exists: bool,
    /// Preferred branches found as local branches, in preference order.
    pub branches: Vec<String>,
}

/// What the synchronizer will do to converge the local path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Clone,
    ResetTo(String),
    DeleteAndClone,
}

/// Inspect `path` for each preferred branch.
///
/// The probe is not fatal: a path that is not a repository simply reports no
/// branches.
pub fn observe(vcs: &dyn Vcs, path: &Path, preferred: &[String]) -> ObservedState {
    if !path.exists() {
        return ObservedState::default();
    }
    ObservedState {
        exists: true,
        branches: preferred
            .iter()
            .filter(|b| vcs.branch_exists(path, b))
            .cloned()
            .collect(),
    }
}

/// Pick the action for an observed state.
///
/// - absent → clone
/// - first preferred branch that is present → reset to it
/// - otherwise → delete and clone
pub fn resolve(state: &ObservedState, preferred: &[String]) -> Action {
    if !state.exists {
        return Action::Clone;
    }
    preferred
        .iter()
        .find(|b| state.branches.contains(b))
        .map(|b| Action::ResetTo(b.clone()))
        .unwrap_or(Action::DeleteAndClone)
}
