use std::time::Duration;

use crate::{outcome::TestStatus, unit::UnitFn};

/// Index of a group in the suite arena. Parents always precede their
/// children, which the resolution pass relies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct GroupId(pub(crate) usize);

/// One-shot modifier flags consumed by the next registration call.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct Pending {
    pub(crate) skip: bool,
    pub(crate) only: bool,
    pub(crate) timeout: Option<Duration>,
}

impl Pending {
    pub(crate) fn take(&mut self) -> Pending {
        std::mem::take(self)
    }
}

#[derive(Debug)]
pub(crate) struct Test {
    pub(crate) name: String,
    pub(crate) full_name: String,
    pub(crate) func: UnitFn,
    pub(crate) raw_skip: bool,
    pub(crate) raw_only: bool,
    pub(crate) raw_timeout: Option<Duration>,
    pub(crate) status: TestStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum HookKind {
    Before,
    After,
}

impl HookKind {
    pub(crate) fn label(self) -> &'static str {
        match self {
            HookKind::Before => "before",
            HookKind::After => "after",
        }
    }
}

#[derive(Debug)]
pub(crate) struct Hook {
    pub(crate) kind: HookKind,
    pub(crate) func: UnitFn,
    pub(crate) raw_timeout: Option<Duration>,
}

#[derive(Debug)]
pub(crate) struct Group {
    pub(crate) name: String,
    pub(crate) parent: Option<GroupId>,
    pub(crate) children: Vec<GroupId>,
    pub(crate) tests: Vec<Test>,
    pub(crate) before_hooks: Vec<Hook>,
    pub(crate) after_hooks: Vec<Hook>,
    pub(crate) raw_skip: bool,
    pub(crate) raw_only: bool,
    pub(crate) raw_timeout: Option<Duration>,
}

impl Group {
    fn new(name: String, parent: Option<GroupId>, pending: Pending) -> Self {
        Self {
            name,
            parent,
            children: Vec::new(),
            tests: Vec::new(),
            before_hooks: Vec::new(),
            after_hooks: Vec::new(),
            raw_skip: pending.skip,
            raw_only: pending.only,
            raw_timeout: pending.timeout,
        }
    }
}

/// The suite tree: a flat arena of groups with an implicit, unnamed root.
#[derive(Debug)]
pub(crate) struct Tree {
    pub(crate) groups: Vec<Group>,
}

impl Tree {
    pub(crate) const ROOT: GroupId = GroupId(0);

    pub(crate) fn new() -> Self {
        Self {
            groups: vec![Group::new(String::new(), None, Pending::default())],
        }
    }

    pub(crate) fn group(&self, GroupId(idx): GroupId) -> &Group {
        &self.groups[idx]
    }

    pub(crate) fn group_mut(&mut self, GroupId(idx): GroupId) -> &mut Group {
        &mut self.groups[idx]
    }

    pub(crate) fn add_group(&mut self, parent: GroupId, name: String, pending: Pending) -> GroupId {
        let id = GroupId(self.groups.len());
        self.groups.push(Group::new(name, Some(parent), pending));
        self.group_mut(parent).children.push(id);
        id
    }

    /// Space-joined names of the group chain from the root down to `id`,
    /// empty names contributing no separator.
    pub(crate) fn path_name(&self, id: GroupId) -> String {
        self.path_components(id).join(" ")
    }

    /// Display name of a leaf registered under `id`: the group chain plus the
    /// leaf's own name, with an optional file label up front.
    pub(crate) fn full_name(&self, id: GroupId, label: Option<&str>, leaf: &str) -> String {
        let mut parts = self.path_components(id);
        if !leaf.is_empty() {
            parts.push(leaf);
        }
        let joined = parts.join(" ");

        match label {
            Some(label) if !label.is_empty() => match joined.is_empty() {
                true => label.to_string(),
                false => format!("{label}: {joined}"),
            },
            _ => joined,
        }
    }

    fn path_components(&self, id: GroupId) -> Vec<&str> {
        let mut components = Vec::new();
        let mut cursor = Some(id);
        while let Some(id) = cursor {
            let group = self.group(id);
            if !group.name.is_empty() {
                components.push(group.name.as_str());
            }
            cursor = group.parent;
        }
        components.reverse();
        components
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn paths_skip_empty_names() {
        let mut tree = Tree::new();
        let outer = tree.add_group(Tree::ROOT, "outer".into(), Pending::default());
        let anonymous = tree.add_group(outer, String::new(), Pending::default());
        let inner = tree.add_group(anonymous, "inner".into(), Pending::default());

        assert_eq!(tree.path_name(inner), "outer inner");
        assert_eq!(tree.full_name(inner, None, "leaf"), "outer inner leaf");
        assert_eq!(tree.full_name(Tree::ROOT, None, "leaf"), "leaf");
    }

    #[test]
    fn file_labels_join_with_a_colon() {
        let mut tree = Tree::new();
        let group = tree.add_group(Tree::ROOT, "math".into(), Pending::default());

        assert_eq!(
            tree.full_name(group, Some("arith.rs"), "adds"),
            "arith.rs: math adds"
        );
        assert_eq!(tree.full_name(Tree::ROOT, Some("arith.rs"), ""), "arith.rs");
    }
}
