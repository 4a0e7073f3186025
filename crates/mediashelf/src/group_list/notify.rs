//! Change notifications raised by a group list.

use std::fmt;

use super::NodeId;

/// A named aspect of a group node that can change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeProperty {
    /// The items held directly by a leaf.
    Items,
    /// The child groups of an internal node.
    Groups,
    /// The number of items in the subtree.
    Count,
    /// The flattened structure of the subtree.
    Structure,
    /// The first item in the subtree.
    FirstItem,
    /// Whether the node is a leaf.
    IsLeaf,
    /// The height of the subtree.
    DepthDown,
}

impl NodeProperty {
    /// Every property, in declaration order.
    pub const ALL: [NodeProperty; 7] = [
        NodeProperty::Items,
        NodeProperty::Groups,
        NodeProperty::Count,
        NodeProperty::Structure,
        NodeProperty::FirstItem,
        NodeProperty::IsLeaf,
        NodeProperty::DepthDown,
    ];

    /// The property's display name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Items => "Items",
            Self::Groups => "Groups",
            Self::Count => "Count",
            Self::Structure => "Structure",
            Self::FirstItem => "FirstItem",
            Self::IsLeaf => "IsLeaf",
            Self::DepthDown => "DepthDown",
        }
    }

    const fn bit(self) -> u8 {
        1 << self as u8
    }
}

impl fmt::Display for NodeProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A set of [`NodeProperty`] values.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PropertySet(u8);

impl PropertySet {
    /// The empty set.
    pub const fn empty() -> Self {
        Self(0)
    }

    /// A set holding `properties`.
    pub fn of(properties: &[NodeProperty]) -> Self {
        properties.iter().copied().collect()
    }

    /// Whether `property` is in the set.
    pub fn contains(self, property: NodeProperty) -> bool {
        self.0 & property.bit() != 0
    }

    /// Adds `property`.
    pub fn insert(&mut self, property: NodeProperty) {
        self.0 |= property.bit();
    }

    /// The union of both sets.
    pub fn union(self, other: PropertySet) -> Self {
        Self(self.0 | other.0)
    }

    /// Whether the set is empty.
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Number of properties in the set.
    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// The properties in declaration order.
    pub fn iter(self) -> impl Iterator<Item = NodeProperty> {
        NodeProperty::ALL
            .into_iter()
            .filter(move |property| self.contains(*property))
    }
}

impl FromIterator<NodeProperty> for PropertySet {
    fn from_iter<I: IntoIterator<Item = NodeProperty>>(iter: I) -> Self {
        let mut set = Self::empty();
        for property in iter {
            set.insert(property);
        }
        set
    }
}

impl fmt::Debug for PropertySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

/// A change published on [`GroupList::changed`](super::GroupList::changed).
///
/// `node` is the node the change is raised on; `sender` is the node that was
/// actually mutated. A mutation is raised once on the mutated node itself and
/// once on each of its ancestors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeChange {
    /// Node the notification is raised on.
    pub node: NodeId,
    /// Node whose mutation triggered the notification.
    pub sender: NodeId,
    /// The aspects that changed.
    pub properties: PropertySet,
}

/// Pending notifications deduplicated by `(node, sender)`.
///
/// Repeated entries union their property sets and keep the position of the
/// first occurrence, so flushing fires oldest to newest.
#[derive(Debug, Default)]
pub(crate) struct NotificationBuffer {
    pending: Vec<NodeChange>,
}

impl NotificationBuffer {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, change: NodeChange) {
        if change.properties.is_empty() {
            return;
        }
        match self
            .pending
            .iter_mut()
            .find(|pending| pending.node == change.node && pending.sender == change.sender)
        {
            Some(pending) => pending.properties = pending.properties.union(change.properties),
            None => self.pending.push(change),
        }
    }

    pub(crate) fn extend(&mut self, other: NotificationBuffer) {
        for change in other.pending {
            self.push(change);
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub(crate) fn len(&self) -> usize {
        self.pending.len()
    }

    pub(crate) fn into_changes(self) -> Vec<NodeChange> {
        self.pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    fn ids() -> (NodeId, NodeId) {
        let mut map: SlotMap<NodeId, ()> = SlotMap::with_key();
        (map.insert(()), map.insert(()))
    }

    #[test]
    fn test_property_set_basics() {
        let mut set = PropertySet::of(&[NodeProperty::Items, NodeProperty::Count]);
        assert!(set.contains(NodeProperty::Items));
        assert!(!set.contains(NodeProperty::Groups));
        set.insert(NodeProperty::Structure);
        assert_eq!(set.len(), 3);
        assert_eq!(
            set.iter().collect::<Vec<_>>(),
            vec![NodeProperty::Items, NodeProperty::Count, NodeProperty::Structure]
        );
    }

    #[test]
    fn test_buffer_unions_same_node_and_sender() {
        let (leaf, root) = ids();
        let mut buffer = NotificationBuffer::new();

        buffer.push(NodeChange {
            node: leaf,
            sender: leaf,
            properties: PropertySet::of(&[NodeProperty::Items]),
        });
        buffer.push(NodeChange {
            node: root,
            sender: leaf,
            properties: PropertySet::of(&[NodeProperty::Structure]),
        });
        buffer.push(NodeChange {
            node: leaf,
            sender: leaf,
            properties: PropertySet::of(&[NodeProperty::Count]),
        });

        let changes = buffer.into_changes();
        assert_eq!(changes.len(), 2);
        assert_eq!(changes[0].node, leaf);
        assert_eq!(
            changes[0].properties,
            PropertySet::of(&[NodeProperty::Items, NodeProperty::Count])
        );
        assert_eq!(changes[1].node, root);
    }

    #[test]
    fn test_buffer_ignores_empty_sets() {
        let (leaf, _) = ids();
        let mut buffer = NotificationBuffer::new();
        buffer.push(NodeChange {
            node: leaf,
            sender: leaf,
            properties: PropertySet::empty(),
        });
        assert!(buffer.is_empty());
    }
}
