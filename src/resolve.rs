//! Pre-execution pass over the frozen tree.
//!
//! Resolution turns the raw `skip`/`only`/`timeout` flags scattered across
//! the tree into the state the scheduler consults: effective skip is
//! inherited and monotone, timeouts override outward-in, and a single `only`
//! anywhere switches the whole run into exclusive mode. The computed table
//! lives beside the tree for one run and is thrown away afterwards.

use std::time::Duration;

use crate::tree::{GroupId, Tree};

#[derive(Debug, Clone, Copy)]
pub(crate) struct ResolvedGroup {
    /// Own or inherited skip; never un-set by descendants.
    pub(crate) skip: bool,
    /// Self or an ancestor carries `only`.
    pub(crate) under_only: bool,
    /// The subtree contains an `only` node that is not skipped away.
    pub(crate) contains_only: bool,
    /// Nearest timeout override, or the suite default.
    pub(crate) timeout: Duration,
}

#[derive(Debug)]
pub(crate) struct Resolution {
    pub(crate) has_only: bool,
    groups: Vec<ResolvedGroup>,
}

pub(crate) fn resolve(tree: &Tree, default_timeout: Duration) -> Resolution {
    let mut groups: Vec<ResolvedGroup> = Vec::with_capacity(tree.groups.len());

    // Parents precede children in the arena, so one forward pass settles all
    // inherited state.
    for group in tree.groups.iter() {
        let inherited = group.parent.map(|GroupId(parent)| groups[parent]);
        let skip = group.raw_skip || inherited.is_some_and(|parent| parent.skip);
        let under_only = group.raw_only || inherited.is_some_and(|parent| parent.under_only);
        let timeout = group
            .raw_timeout
            .unwrap_or_else(|| inherited.map_or(default_timeout, |parent| parent.timeout));
        let contains_only = (group.raw_only && !skip)
            || group.tests.iter().any(|test| test.raw_only && !skip && !test.raw_skip);

        groups.push(ResolvedGroup {
            skip,
            under_only,
            contains_only,
            timeout,
        });
    }

    // Reverse pass folds containment upward; children always have the larger
    // index.
    for idx in (1..tree.groups.len()).rev() {
        if groups[idx].contains_only
            && let Some(GroupId(parent)) = tree.groups[idx].parent
        {
            groups[parent].contains_only = true;
        }
    }

    // A skipped `only` confers no eligibility, but it still flips the run
    // into exclusive mode.
    let has_only = tree
        .groups
        .iter()
        .any(|group| group.raw_only || group.tests.iter().any(|test| test.raw_only));

    Resolution { has_only, groups }
}

impl Resolution {
    pub(crate) fn group(&self, GroupId(idx): GroupId) -> ResolvedGroup {
        self.groups[idx]
    }

    /// Whether the group's subtree executes at all.
    pub(crate) fn group_runs(&self, id: GroupId) -> bool {
        let group = self.group(id);
        !group.skip && (!self.has_only || group.under_only || group.contains_only)
    }

    /// Whether a skipped group is still part of the visible run (reported
    /// and counted) as opposed to silently excluded by exclusivity scoping.
    pub(crate) fn group_skip_visible(&self, id: GroupId) -> bool {
        let group = self.group(id);
        group.skip && (!self.has_only || group.under_only)
    }

    /// Whether a test in a running group participates in the run.
    pub(crate) fn test_selected(&self, id: GroupId, raw_only: bool) -> bool {
        !self.has_only || self.group(id).under_only || raw_only
    }

    pub(crate) fn timeout_for(&self, id: GroupId, raw: Option<Duration>) -> Duration {
        raw.unwrap_or_else(|| self.group(id).timeout)
    }
}
