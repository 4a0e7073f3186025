//! Text rendering of a group tree for debugging.

use std::fmt;

use mediashelf_core::{TreeFormatOptions, TreeStyle};

use super::tree::Tree;
use super::{GroupItem, GroupList, NodeId};

/// Renders a [`GroupList`] as an indented tree.
///
/// ```
/// use mediashelf::GroupList;
/// use mediashelf::compare::KeyComparer;
/// use mediashelf_core::TreeFormatOptions;
///
/// let list = GroupList::builder()
///     .group_by(KeyComparer::shared(|n: &u32| n % 2))
///     .build();
/// list.extend([1, 2, 3]);
///
/// let text = list.debug_tree().with_options(TreeFormatOptions::minimal()).to_string();
/// assert!(text.starts_with("(root) [3]"));
/// ```
pub struct GroupTreeDebug<'a, T: GroupItem> {
    list: &'a GroupList<T>,
    options: TreeFormatOptions,
}

impl<'a, T: GroupItem + fmt::Debug> GroupTreeDebug<'a, T> {
    pub(crate) fn new(list: &'a GroupList<T>) -> Self {
        Self {
            list,
            options: TreeFormatOptions::default(),
        }
    }

    /// Replaces the formatting options.
    pub fn with_options(mut self, options: TreeFormatOptions) -> Self {
        self.options = options;
        self
    }

    /// Renders the tree.
    pub fn format(&self) -> String {
        let tree = self.list.shared.tree.read();
        let mut out = String::new();
        self.format_node(&tree, tree.root(), &mut Vec::new(), &mut out);
        out
    }

    /// `lineage` holds the `is_last` flag of every node from the root's
    /// child down to `id`.
    fn format_node(&self, tree: &Tree<T>, id: NodeId, lineage: &mut Vec<bool>, out: &mut String) {
        let depth = lineage.len();
        out.push_str(&self.options.build_prefix(lineage));
        match tree.key(id) {
            Some(key) => out.push_str(&key),
            None if depth == 0 => out.push_str("(root)"),
            None => out.push_str("(group)"),
        }
        out.push_str(&format!(" [{}]", tree.count(id)));
        if self.options.show_ids {
            out.push_str(&format!(" {id:?}"));
        }
        out.push('\n');

        if self.options.max_depth.is_some_and(|max| depth >= max) {
            return;
        }

        let children = tree.children(id);
        if !children.is_empty() {
            for (i, &child) in children.iter().enumerate() {
                lineage.push(i + 1 == children.len());
                self.format_node(tree, child, lineage, out);
                lineage.pop();
            }
            return;
        }

        if !self.options.show_items {
            return;
        }
        let items = tree.node_items(id);
        for (i, item) in items.iter().enumerate() {
            let line = match self.options.style {
                TreeStyle::Compact => format!("{}{:?}", " ".repeat(depth + 1), item),
                _ => {
                    lineage.push(i + 1 == items.len());
                    let prefix = self.options.build_prefix(lineage);
                    lineage.pop();
                    format!("{prefix}{item:?}")
                }
            };
            out.push_str(&line);
            out.push('\n');
        }
    }
}

impl<T: GroupItem + fmt::Debug> fmt::Display for GroupTreeDebug<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format())
    }
}

impl<T: GroupItem + fmt::Debug> GroupList<T> {
    /// A renderer for the current tree.
    pub fn debug_tree(&self) -> GroupTreeDebug<'_, T> {
        GroupTreeDebug::new(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compare::{FnComparer, KeyComparer};

    #[test]
    fn test_format_ascii_tree() {
        let list = GroupList::builder()
            .group_by(KeyComparer::shared(|s: &&'static str| s.len()))
            .sort_by(FnComparer::shared(|a: &&'static str, b: &&'static str| a.cmp(b)))
            .build();
        list.extend(["fig", "pear", "kiwi"]);

        let options = TreeFormatOptions {
            style: TreeStyle::Ascii,
            ..Default::default()
        };
        let text = list.debug_tree().with_options(options).format();
        let expected = "(root) [3]\n\
                        +-- 3 [1]\n\
                        |  `-- \"fig\"\n\
                        `-- 4 [2]\n\
                        \x20  +-- \"kiwi\"\n\
                        \x20  `-- \"pear\"\n";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_max_depth_stops_descent() {
        let list = GroupList::builder()
            .group_by(KeyComparer::shared(|n: &u8| *n))
            .build();
        list.extend([1u8, 2]);

        let options = TreeFormatOptions {
            max_depth: Some(0),
            ..TreeFormatOptions::minimal()
        };
        assert_eq!(list.debug_tree().with_options(options).to_string(), "(root) [2]\n");
    }
}
