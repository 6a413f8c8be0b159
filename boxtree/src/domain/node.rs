//! Owned hierarchical container.
//!
//! A [`Node`] is either a [`Leaf`] carrying a value or a [`Group`] owning an
//! ordered list of child nodes. Groups aggregate the values and leaf counts of
//! everything below them.

use std::fmt;
use std::io::{self, Write};

use tracing::{debug, instrument};

use crate::domain::iter::{PostOrderIter, PreOrderIter};
use crate::domain::render::{self, Renderer};

/// Terminal node holding an intrinsic value.
#[derive(Debug, Clone, PartialEq)]
pub struct Leaf {
    name: String,
    value: f64,
}

impl Leaf {
    pub fn new(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> f64 {
        self.value
    }
}

/// Composite node owning its children in insertion order.
///
/// Duplicates are allowed: inserting an equal node twice stores two
/// independent copies.
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    name: String,
    children: Vec<Node>,
}

impl Group {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            children: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    #[instrument(level = "trace", skip(self, child), fields(group = %self.name, child = %child.name()))]
    pub fn insert(&mut self, child: Node) {
        self.children.push(child);
    }

    /// Removes every direct child that is a leaf, keeping the order of the
    /// remaining groups. Nested groups are not pruned.
    ///
    /// Returns the number of removed children.
    #[instrument(level = "debug", skip(self), fields(group = %self.name))]
    pub fn remove_leaves(&mut self) -> usize {
        let before = self.children.len();
        self.children.retain(Node::is_group);
        let removed = before - self.children.len();
        debug!(removed, remaining = self.children.len(), "removed direct leaves");
        removed
    }

    pub fn aggregate_value(&self) -> f64 {
        self.children
            .iter()
            .fold(0.0, |total, child| total + child.aggregate_value())
    }

    pub fn leaf_count(&self) -> usize {
        self.children.iter().map(Node::leaf_count).sum()
    }
}

/// A node of the hierarchy: either a leaf or a group of nodes.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Leaf(Leaf),
    Group(Group),
}

impl Node {
    pub fn leaf(name: impl Into<String>, value: f64) -> Self {
        Node::Leaf(Leaf::new(name, value))
    }

    pub fn group(name: impl Into<String>) -> Self {
        Node::Group(Group::new(name))
    }

    /// Builder-style variant of [`Node::insert`].
    pub fn with_child(mut self, child: Node) -> Self {
        self.insert(child);
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = Node>) -> Self {
        for child in children {
            self.insert(child);
        }
        self
    }

    pub fn name(&self) -> &str {
        match self {
            Node::Leaf(leaf) => leaf.name(),
            Node::Group(group) => group.name(),
        }
    }

    /// Intrinsic value of a leaf, `None` for groups.
    pub fn value(&self) -> Option<f64> {
        match self {
            Node::Leaf(leaf) => Some(leaf.value()),
            Node::Group(_) => None,
        }
    }

    /// Direct children; always empty for a leaf.
    pub fn children(&self) -> &[Node] {
        match self {
            Node::Leaf(_) => &[],
            Node::Group(group) => group.children(),
        }
    }

    /// Number of direct children.
    pub fn len(&self) -> usize {
        self.children().len()
    }

    pub fn is_empty(&self) -> bool {
        self.children().is_empty()
    }

    pub fn is_group(&self) -> bool {
        matches!(self, Node::Group(_))
    }

    /// Appends `child` to a group. Leaves cannot hold children, so inserting
    /// into a leaf does nothing.
    pub fn insert(&mut self, child: Node) {
        match self {
            Node::Leaf(leaf) => {
                debug!(leaf = %leaf.name(), child = %child.name(), "ignoring insert into leaf");
            }
            Node::Group(group) => group.insert(child),
        }
    }

    /// Removes the direct leaf children of a group. No-op on a leaf.
    pub fn remove_leaves(&mut self) -> usize {
        match self {
            Node::Leaf(_) => 0,
            Node::Group(group) => group.remove_leaves(),
        }
    }

    pub fn aggregate_value(&self) -> f64 {
        match self {
            Node::Leaf(leaf) => leaf.value(),
            Node::Group(group) => group.aggregate_value(),
        }
    }

    pub fn leaf_count(&self) -> usize {
        match self {
            Node::Leaf(_) => 1,
            Node::Group(group) => group.leaf_count(),
        }
    }

    /// Height of the subtree rooted here; a leaf or an empty group is 1.
    pub fn depth(&self) -> usize {
        1 + self
            .children()
            .iter()
            .map(Node::depth)
            .max()
            .unwrap_or(0)
    }

    /// Pre-order traversal yielding `(depth, node)`, starting at depth 0.
    pub fn iter(&self) -> PreOrderIter<'_> {
        PreOrderIter::new(self)
    }

    /// Post-order traversal: children are yielded before their group.
    pub fn iter_postorder(&self) -> PostOrderIter<'_> {
        PostOrderIter::new(self)
    }

    /// All leaves of the subtree in pre-order.
    pub fn leaves(&self) -> impl Iterator<Item = &Leaf> + '_ {
        self.iter().filter_map(|(_, node)| match node {
            Node::Leaf(leaf) => Some(leaf),
            Node::Group(_) => None,
        })
    }

    /// Writes this node and its descendants, one line per node, starting at
    /// `depth` indent units.
    #[instrument(level = "debug", skip(self, out), fields(node = %self.name()))]
    pub fn render<W: Write>(&self, depth: usize, out: &mut W) -> io::Result<()> {
        Renderer::default().render(self, depth, out)
    }

    /// Renders to stdout.
    pub fn print(&self, depth: usize) -> io::Result<()> {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        self.render(depth, &mut handle)
    }
}

impl From<Leaf> for Node {
    fn from(leaf: Leaf) -> Self {
        Node::Leaf(leaf)
    }
}

impl From<Group> for Node {
    fn from(group: Group) -> Self {
        Node::Group(group)
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render::label(self))
    }
}
