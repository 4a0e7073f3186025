//! Arena-backed grouping tree.
//!
//! The tree owns every node in a `SlotMap`. A node's `children` are owned by
//! it; `parent` is a plain key back into the arena. Grouping criteria live on
//! the tree (the root) and apply uniformly by depth: the children of a node
//! at depth `d` are partitioned by `group_bys[d]`.
//!
//! Every mutation records what it changed into a [`NotificationBuffer`];
//! publishing is left to the caller.

use std::cmp::Ordering;

use mediashelf_core::logging::targets;
use slotmap::SlotMap;

use super::notify::{NodeChange, NodeProperty, NotificationBuffer, PropertySet};
use super::{GroupItem, NodeId, StructureEntry, GroupHeader};
use crate::compare::{same_comparer, Comparer, CompositeComparer, SharedComparer};

const ALL_PROPERTIES: [NodeProperty; 7] = NodeProperty::ALL;

/// A node of the grouping tree.
///
/// Holds items only while it has no children.
#[derive(Debug)]
pub(crate) struct Node<T> {
    depth: usize,
    parent: Option<NodeId>,
    items: Vec<T>,
    children: Vec<NodeId>,
}

impl<T> Node<T> {
    fn new(depth: usize, parent: Option<NodeId>) -> Self {
        Self {
            depth,
            parent,
            items: Vec::new(),
            children: Vec::new(),
        }
    }

    fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

pub(crate) struct Tree<T> {
    nodes: SlotMap<NodeId, Node<T>>,
    root: NodeId,
    group_bys: Vec<SharedComparer<T>>,
    sort_bys: Vec<SharedComparer<T>>,
    sort: CompositeComparer<T>,
    validate: bool,
}

impl<T: GroupItem> Tree<T> {
    pub(crate) fn new(validate: bool) -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(Node::new(0, None));
        Self {
            nodes,
            root,
            group_bys: Vec::new(),
            sort_bys: Vec::new(),
            sort: CompositeComparer::new(Vec::new()),
            validate,
        }
    }

    // -------------------------------------------------------------------------
    // Read access
    // -------------------------------------------------------------------------

    pub(crate) fn root(&self) -> NodeId {
        self.root
    }

    pub(crate) fn group_bys(&self) -> &[SharedComparer<T>] {
        &self.group_bys
    }

    pub(crate) fn sort_bys(&self) -> &[SharedComparer<T>] {
        &self.sort_bys
    }

    pub(crate) fn node(&self, id: NodeId) -> Option<&Node<T>> {
        self.nodes.get(id)
    }

    pub(crate) fn contains_node(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    pub(crate) fn depth(&self, id: NodeId) -> Option<usize> {
        self.node(id).map(|node| node.depth)
    }

    pub(crate) fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(|node| node.parent)
    }

    pub(crate) fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map(|node| node.children.as_slice()).unwrap_or(&[])
    }

    pub(crate) fn node_items(&self, id: NodeId) -> &[T] {
        self.node(id).map(|node| node.items.as_slice()).unwrap_or(&[])
    }

    pub(crate) fn is_leaf(&self, id: NodeId) -> Option<bool> {
        self.node(id).map(Node::is_leaf)
    }

    /// First item of the subtree, depth first.
    pub(crate) fn first_item(&self, id: NodeId) -> Option<&T> {
        let node = self.node(id)?;
        if node.is_leaf() {
            node.items.first()
        } else {
            node.children.iter().find_map(|&child| self.first_item(child))
        }
    }

    /// Number of items in the subtree.
    pub(crate) fn count(&self, id: NodeId) -> usize {
        match self.node(id) {
            Some(node) if node.is_leaf() => node.items.len(),
            Some(node) => node.children.iter().map(|&child| self.count(child)).sum(),
            None => 0,
        }
    }

    /// Height of the subtree: 0 for a leaf.
    pub(crate) fn depth_down(&self, id: NodeId) -> usize {
        match self.node(id) {
            Some(node) if !node.is_leaf() => {
                1 + node
                    .children
                    .iter()
                    .map(|&child| self.depth_down(child))
                    .max()
                    .unwrap_or(0)
            }
            _ => 0,
        }
    }

    /// Display label of a group, from the comparer that formed it.
    pub(crate) fn key(&self, id: NodeId) -> Option<String> {
        let depth = self.depth(id)?;
        let comparer = self.group_bys.get(depth.checked_sub(1)?)?;
        comparer.group_key(self.first_item(id)?)
    }

    /// Locates `item`: its leaf and index. Searches items before children.
    pub(crate) fn find(&self, item: &T) -> Option<(NodeId, usize)> {
        self.find_from(self.root, item)
    }

    fn find_from(&self, id: NodeId, item: &T) -> Option<(NodeId, usize)> {
        let node = self.node(id)?;
        if let Some(index) = node.items.iter().position(|existing| existing == item) {
            return Some((id, index));
        }
        node.children
            .iter()
            .find_map(|&child| self.find_from(child, item))
    }

    /// Items of the subtree in display order.
    pub(crate) fn collect_items(&self, id: NodeId) -> Vec<T> {
        let mut items = Vec::new();
        self.collect_items_into(id, &mut items);
        items
    }

    fn collect_items_into(&self, id: NodeId, out: &mut Vec<T>) {
        if let Some(node) = self.node(id) {
            out.extend(node.items.iter().cloned());
            for &child in &node.children {
                self.collect_items_into(child, out);
            }
        }
    }

    /// Depth-first projection: each child group followed by its own
    /// structure; a leaf contributes its items.
    pub(crate) fn structure(&self, id: NodeId) -> Vec<StructureEntry<T>> {
        let mut entries = Vec::new();
        self.structure_into(id, &mut entries);
        entries
    }

    fn structure_into(&self, id: NodeId, out: &mut Vec<StructureEntry<T>>) {
        let Some(node) = self.node(id) else {
            return;
        };
        if node.is_leaf() {
            out.extend(node.items.iter().cloned().map(StructureEntry::Item));
            return;
        }
        for &child in &node.children {
            out.push(StructureEntry::Group(self.header(child)));
            self.structure_into(child, out);
        }
    }

    pub(crate) fn header(&self, id: NodeId) -> GroupHeader {
        GroupHeader {
            id,
            depth: self.depth(id).unwrap_or(0),
            key: self.key(id),
            count: self.count(id),
        }
    }

    /// Nodes at `depth`, in display order.
    fn nodes_at_depth(&self, depth: usize) -> Vec<NodeId> {
        let mut found = Vec::new();
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            let Some(node) = self.node(id) else {
                continue;
            };
            if node.depth == depth {
                found.push(id);
            } else if node.depth < depth {
                stack.extend(node.children.iter().rev().copied());
            }
        }
        found
    }

    /// Leaves in display order.
    fn leaves(&self) -> Vec<NodeId> {
        let mut found = Vec::new();
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            let Some(node) = self.node(id) else {
                continue;
            };
            if node.is_leaf() {
                found.push(id);
            } else {
                stack.extend(node.children.iter().rev().copied());
            }
        }
        found
    }

    // -------------------------------------------------------------------------
    // Notification
    // -------------------------------------------------------------------------

    /// Records a change on `id` and bubbles it to every ancestor.
    fn notify(&self, id: NodeId, properties: PropertySet, out: &mut NotificationBuffer) {
        out.push(NodeChange {
            node: id,
            sender: id,
            properties,
        });
        let mut current = self.parent(id);
        while let Some(ancestor) = current {
            out.push(NodeChange {
                node: ancestor,
                sender: id,
                properties,
            });
            current = self.parent(ancestor);
        }
    }

    // -------------------------------------------------------------------------
    // Mutation
    // -------------------------------------------------------------------------

    /// Inserts `item`, creating groups on demand. Returns its leaf and index.
    pub(crate) fn add(&mut self, item: T, out: &mut NotificationBuffer) -> (NodeId, usize) {
        self.add_from(self.root, item, out)
    }

    fn add_from(&mut self, start: NodeId, item: T, out: &mut NotificationBuffer) -> (NodeId, usize) {
        let mut current = start;
        loop {
            let depth = self.nodes[current].depth;
            let Some(comparer) = self.group_bys.get(depth).cloned() else {
                return self.insert_into_leaf(current, item, out);
            };
            debug_assert!(
                self.nodes[current].items.is_empty(),
                "a node above the grouping depth must not hold items"
            );
            current = match self.locate_child(current, &item, comparer.as_ref()) {
                Ok(child) => child,
                Err(position) => self.create_child(current, position, out),
            };
        }
    }

    /// Finds the child whose group `item` belongs to, or the sorted position
    /// for a new group. Siblings are kept in ascending group order, so the
    /// scan stops at the first group that sorts after `item`.
    fn locate_child(
        &self,
        parent: NodeId,
        item: &T,
        comparer: &dyn Comparer<T>,
    ) -> Result<NodeId, usize> {
        let children = &self.nodes[parent].children;
        for (position, &child) in children.iter().enumerate() {
            let Some(representative) = self.first_item(child) else {
                continue;
            };
            if self.validate {
                self.check_antisymmetry(comparer, item, representative, "group");
            }
            match comparer.compare(item, representative) {
                Ordering::Equal => return Ok(child),
                Ordering::Less => return Err(position),
                Ordering::Greater => {}
            }
        }
        Err(children.len())
    }

    fn create_child(&mut self, parent: NodeId, position: usize, out: &mut NotificationBuffer) -> NodeId {
        let depth = self.nodes[parent].depth + 1;
        let was_leaf = self.nodes[parent].is_leaf();
        let child = self.nodes.insert(Node::new(depth, Some(parent)));
        self.nodes[parent].children.insert(position, child);

        let mut properties = PropertySet::of(&[NodeProperty::Groups, NodeProperty::Structure]);
        if was_leaf {
            properties.insert(NodeProperty::IsLeaf);
            properties.insert(NodeProperty::DepthDown);
        }
        tracing::trace!(target: targets::GROUP_LIST, ?parent, ?child, position, "created group");
        self.notify(parent, properties, out);
        child
    }

    /// Inserts after every item that does not sort after `item`.
    fn insert_into_leaf(&mut self, leaf: NodeId, item: T, out: &mut NotificationBuffer) -> (NodeId, usize) {
        let items = &self.nodes[leaf].items;
        let position = items
            .iter()
            .position(|existing| self.sort.compare(&item, existing) == Ordering::Less)
            .unwrap_or(items.len());

        if self.validate {
            if let Some(previous) = position.checked_sub(1).and_then(|p| items.get(p)) {
                self.check_antisymmetry(&self.sort, previous, &item, "sort");
            }
            if let Some(next) = items.get(position) {
                self.check_antisymmetry(&self.sort, &item, next, "sort");
            }
        }

        self.nodes[leaf].items.insert(position, item);

        let mut properties = PropertySet::of(&[
            NodeProperty::Items,
            NodeProperty::Count,
            NodeProperty::Structure,
        ]);
        if position == 0 {
            properties.insert(NodeProperty::FirstItem);
        }
        self.notify(leaf, properties, out);
        (leaf, position)
    }

    /// Removes `item` and prunes groups left empty. Returns whether it was found.
    pub(crate) fn remove(&mut self, item: &T, out: &mut NotificationBuffer) -> bool {
        let Some((leaf, index)) = self.find(item) else {
            return false;
        };
        self.take_item(leaf, index, out);
        self.prune(leaf, out);
        true
    }

    fn take_item(&mut self, leaf: NodeId, index: usize, out: &mut NotificationBuffer) -> T {
        let item = self.nodes[leaf].items.remove(index);
        let mut properties = PropertySet::of(&[
            NodeProperty::Items,
            NodeProperty::Count,
            NodeProperty::Structure,
        ]);
        if index == 0 {
            properties.insert(NodeProperty::FirstItem);
        }
        self.notify(leaf, properties, out);
        item
    }

    /// Detaches `id` and every ancestor left without items or children.
    /// The root is never pruned.
    fn prune(&mut self, id: NodeId, out: &mut NotificationBuffer) {
        let mut current = id;
        while current != self.root {
            let node = &self.nodes[current];
            if !node.items.is_empty() || !node.children.is_empty() {
                break;
            }
            let Some(parent) = node.parent else {
                break;
            };
            let siblings = &mut self.nodes[parent].children;
            let position = siblings.iter().position(|&child| child == current);
            if let Some(position) = position {
                siblings.remove(position);
            }
            self.nodes.remove(current);
            tracing::trace!(target: targets::GROUP_LIST, node = ?current, ?parent, "pruned empty group");

            let mut properties = PropertySet::of(&[
                NodeProperty::Groups,
                NodeProperty::Count,
                NodeProperty::Structure,
            ]);
            if position == Some(0) {
                properties.insert(NodeProperty::FirstItem);
            }
            if self.nodes[parent].is_leaf() {
                properties.insert(NodeProperty::IsLeaf);
                properties.insert(NodeProperty::DepthDown);
            }
            self.notify(parent, properties, out);
            current = parent;
        }
    }

    /// Drops every descendant of `id` and every item it holds.
    fn detach_subtree(&mut self, id: NodeId) {
        let children = std::mem::take(&mut self.nodes[id].children);
        self.nodes[id].items.clear();
        let mut stack = children;
        while let Some(child) = stack.pop() {
            if let Some(node) = self.nodes.remove(child) {
                stack.extend(node.children);
            }
        }
    }

    /// Removes everything; the root stays as an empty leaf.
    pub(crate) fn clear(&mut self, out: &mut NotificationBuffer) {
        self.detach_subtree(self.root);
        self.notify(self.root, ALL_PROPERTIES.into_iter().collect(), out);
    }

    /// Re-adds every item from scratch.
    pub(crate) fn reset(&mut self, out: &mut NotificationBuffer) {
        self.regroup_below(self.root, out);
    }

    /// Re-adds every item of the subtree at `id`, starting the descent at `id`.
    fn regroup_below(&mut self, id: NodeId, out: &mut NotificationBuffer) {
        let items = self.collect_items(id);
        tracing::debug!(target: targets::GROUP_LIST, node = ?id, count = items.len(), "regrouping subtree");
        self.detach_subtree(id);
        self.notify(id, ALL_PROPERTIES.into_iter().collect(), out);
        for item in items {
            self.add_from(id, item, out);
        }
    }

    /// Re-evaluates one item's placement.
    ///
    /// An item that already satisfies its group and sort neighbours is left
    /// alone with nothing recorded. Otherwise it is removed and re-added;
    /// the notifications of that move are held back and only handed over if
    /// the item's location actually changed. Returns whether it moved.
    pub(crate) fn reset_item(&mut self, item: &T, out: &mut NotificationBuffer) -> bool {
        let Some((leaf, index)) = self.find(item) else {
            return false;
        };
        if self.fits_at(leaf, index) {
            return false;
        }

        let before = self.path_of(leaf, index);
        let mut suppressed = NotificationBuffer::new();
        let taken = self.take_item(leaf, index, &mut suppressed);
        self.prune(leaf, &mut suppressed);
        let (new_leaf, new_index) = self.add(taken, &mut suppressed);

        let moved = new_leaf != leaf || self.path_of(new_leaf, new_index) != before;
        if moved {
            out.extend(suppressed);
        }
        moved
    }

    /// Child positions from the root down to `leaf`, then the item index.
    fn path_of(&self, leaf: NodeId, index: usize) -> Vec<usize> {
        let mut path = vec![index];
        let mut current = leaf;
        while let Some(parent) = self.parent(current) {
            let position = self.nodes[parent]
                .children
                .iter()
                .position(|&child| child == current)
                .unwrap_or(usize::MAX);
            path.push(position);
            current = parent;
        }
        path.reverse();
        path
    }

    /// Whether the item at `leaf[index]` sits where a fresh insert would
    /// accept it: between its sort neighbours and inside every group on its
    /// path.
    fn fits_at(&self, leaf: NodeId, index: usize) -> bool {
        let items = &self.nodes[leaf].items;
        let item = &items[index];

        if let Some(previous) = index.checked_sub(1).and_then(|p| items.get(p)) {
            if self.sort.compare(previous, item) == Ordering::Greater {
                return false;
            }
        }
        if let Some(next) = items.get(index + 1) {
            if self.sort.compare(item, next) == Ordering::Greater {
                return false;
            }
        }

        let mut current = leaf;
        while let Some(parent) = self.parent(current) {
            let depth = self.nodes[parent].depth;
            let Some(comparer) = self.group_bys.get(depth) else {
                return false;
            };
            let fits = match self.representative_excluding(current, leaf, index) {
                Some(representative) => comparer.compare(item, representative).is_eq(),
                None => self.between_siblings(parent, current, item, comparer.as_ref()),
            };
            if !fits {
                return false;
            }
            current = parent;
        }
        true
    }

    /// Any item of the subtree at `id` other than `leaf[index]`.
    fn representative_excluding(&self, id: NodeId, leaf: NodeId, index: usize) -> Option<&T> {
        let node = self.node(id)?;
        if node.is_leaf() {
            return node
                .items
                .iter()
                .enumerate()
                .find(|&(i, _)| id != leaf || i != index)
                .map(|(_, item)| item);
        }
        node.children
            .iter()
            .find_map(|&child| self.representative_excluding(child, leaf, index))
    }

    /// Whether `item` sorts strictly between the groups beside `child`.
    fn between_siblings(&self, parent: NodeId, child: NodeId, item: &T, comparer: &dyn Comparer<T>) -> bool {
        let siblings = &self.nodes[parent].children;
        let Some(position) = siblings.iter().position(|&sibling| sibling == child) else {
            return false;
        };
        let after_previous = position
            .checked_sub(1)
            .and_then(|p| siblings.get(p))
            .and_then(|&previous| self.first_item(previous))
            .is_none_or(|previous| comparer.compare(previous, item) == Ordering::Less);
        let before_next = siblings
            .get(position + 1)
            .and_then(|&next| self.first_item(next))
            .is_none_or(|next| comparer.compare(item, next) == Ordering::Less);
        after_previous && before_next
    }

    pub(crate) fn add_group_by(&mut self, comparer: SharedComparer<T>, out: &mut NotificationBuffer) {
        let depth = self.group_bys.len();
        self.group_bys.push(comparer);

        // Leaves sit at the old grouping depth; each one splits in place.
        for leaf in self.nodes_at_depth(depth) {
            if !self.nodes[leaf].is_leaf() {
                continue;
            }
            let items = std::mem::take(&mut self.nodes[leaf].items);
            if items.is_empty() {
                continue;
            }
            self.notify(
                leaf,
                PropertySet::of(&[NodeProperty::Items, NodeProperty::Structure]),
                out,
            );
            for item in items {
                self.add_from(leaf, item, out);
            }
        }
    }

    /// Removes a grouping level. No incremental merge: the whole tree is reset.
    pub(crate) fn remove_group_by(&mut self, comparer: &SharedComparer<T>, out: &mut NotificationBuffer) -> bool {
        let Some(position) = self.group_bys.iter().position(|c| same_comparer(c, comparer)) else {
            return false;
        };
        self.group_bys.remove(position);
        self.reset(out);
        true
    }

    pub(crate) fn add_sort_by(&mut self, comparer: SharedComparer<T>, out: &mut NotificationBuffer) {
        self.sort_bys.push(comparer);
        self.rebuild_sort();
        self.resort_leaves(out);
    }

    pub(crate) fn remove_sort_by(&mut self, comparer: &SharedComparer<T>, out: &mut NotificationBuffer) -> bool {
        let Some(position) = self.sort_bys.iter().position(|c| same_comparer(c, comparer)) else {
            return false;
        };
        self.sort_bys.remove(position);
        self.rebuild_sort();
        self.resort_leaves(out);
        true
    }

    fn rebuild_sort(&mut self) {
        self.sort = CompositeComparer::new(self.sort_bys.clone());
    }

    /// Stable-sorts every leaf under the current sort criteria.
    fn resort_leaves(&mut self, out: &mut NotificationBuffer) {
        for leaf in self.leaves() {
            let mut items = std::mem::take(&mut self.nodes[leaf].items);
            let before = items.clone();
            items.sort_by(|a, b| self.sort.compare(a, b));
            let changed = items != before;
            let first_changed = items.first() != before.first();
            self.nodes[leaf].items = items;
            if changed {
                let mut properties = PropertySet::of(&[NodeProperty::Items, NodeProperty::Structure]);
                if first_changed {
                    properties.insert(NodeProperty::FirstItem);
                }
                self.notify(leaf, properties, out);
            }
        }
    }

    /// Recomputes every decision made with `comparer` after its criteria
    /// changed. Returns whether the comparer is in use.
    pub(crate) fn reset_comparer(&mut self, comparer: &SharedComparer<T>, out: &mut NotificationBuffer) -> bool {
        let mut used = false;
        let depths: Vec<usize> = self
            .group_bys
            .iter()
            .enumerate()
            .filter(|(_, c)| same_comparer(c, comparer))
            .map(|(depth, _)| depth)
            .collect();
        for depth in depths {
            used = true;
            for node in self.nodes_at_depth(depth) {
                // Regrouping a shallower level may already have replaced it.
                if self.contains_node(node) && !self.nodes[node].is_leaf() {
                    self.regroup_below(node, out);
                }
            }
        }
        if self.sort_bys.iter().any(|c| same_comparer(c, comparer)) {
            used = true;
            self.resort_leaves(out);
        }
        used
    }

    /// Whether `comparer` is a grouping or sorting criterion.
    pub(crate) fn uses_comparer(&self, comparer: &SharedComparer<T>) -> bool {
        self.group_bys
            .iter()
            .chain(self.sort_bys.iter())
            .any(|c| same_comparer(c, comparer))
    }

    fn check_antisymmetry(&self, comparer: &dyn Comparer<T>, a: &T, b: &T, role: &'static str) {
        let forward = comparer.compare(a, b);
        let backward = comparer.compare(b, a);
        if forward != backward.reverse() {
            tracing::warn!(
                target: targets::GROUP_LIST,
                role,
                ?forward,
                ?backward,
                "comparer is not antisymmetric; group shape is unspecified"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compare::{FnComparer, KeyComparer};

    fn initial() -> SharedComparer<String> {
        KeyComparer::shared(|s: &String| s.chars().next().unwrap_or(' '))
    }

    fn alphabetical() -> SharedComparer<String> {
        FnComparer::shared(|a: &String, b: &String| a.cmp(b))
    }

    fn fruit_tree() -> Tree<String> {
        let mut tree = Tree::new(true);
        let mut out = NotificationBuffer::new();
        tree.add_group_by(initial(), &mut out);
        tree.add_sort_by(alphabetical(), &mut out);
        for fruit in ["Banana", "Apple", "Avocado", "Blueberry"] {
            tree.add(fruit.to_string(), &mut out);
        }
        tree
    }

    #[test]
    fn test_groups_are_sorted_and_keyed() {
        let tree = fruit_tree();
        let groups = tree.children(tree.root()).to_vec();
        assert_eq!(groups.len(), 2);
        assert_eq!(tree.key(groups[0]).as_deref(), Some("A"));
        assert_eq!(tree.key(groups[1]).as_deref(), Some("B"));
        assert_eq!(tree.node_items(groups[0]), ["Apple", "Avocado"]);
        assert_eq!(tree.count(tree.root()), 4);
        assert_eq!(tree.depth_down(tree.root()), 1);
        assert!(tree.key(tree.root()).is_none());
    }

    #[test]
    fn test_remove_prunes_empty_group() {
        let mut tree = fruit_tree();
        let mut out = NotificationBuffer::new();

        assert!(tree.remove(&"Apple".to_string(), &mut out));
        assert!(tree.remove(&"Avocado".to_string(), &mut out));
        assert!(!tree.remove(&"Cherry".to_string(), &mut out));

        let groups = tree.children(tree.root()).to_vec();
        assert_eq!(groups.len(), 1);
        assert_eq!(tree.key(groups[0]).as_deref(), Some("B"));
    }

    #[test]
    fn test_equal_items_append_after() {
        let mut tree = Tree::new(true);
        let mut out = NotificationBuffer::new();
        tree.add_sort_by(KeyComparer::shared(|s: &String| s.len()), &mut out);
        for word in ["bb", "a", "cc", "d"] {
            tree.add(word.to_string(), &mut out);
        }
        assert_eq!(tree.node_items(tree.root()), ["a", "d", "bb", "cc"]);
    }

    #[test]
    fn test_notify_bubbles_with_sender() {
        let tree = fruit_tree();
        let leaf = tree.children(tree.root())[0];
        let mut out = NotificationBuffer::new();
        tree.notify(leaf, PropertySet::of(&[NodeProperty::Items]), &mut out);

        let changes = out.into_changes();
        assert_eq!(changes.len(), 2);
        assert_eq!((changes[0].node, changes[0].sender), (leaf, leaf));
        assert_eq!((changes[1].node, changes[1].sender), (tree.root(), leaf));
    }

    #[test]
    fn test_fits_at_single_item_group() {
        let mut tree = fruit_tree();
        let mut out = NotificationBuffer::new();
        tree.add("Cherry".to_string(), &mut out);

        let (leaf, index) = tree.find(&"Cherry".to_string()).unwrap();
        assert!(tree.fits_at(leaf, index));
        assert!(!tree.reset_item(&"Cherry".to_string(), &mut NotificationBuffer::new()));
    }
}
