use std::collections::HashSet;
use std::fmt;
use std::io::Write;

use generational_arena::{Arena, Index};
use termtree::Tree;
use tracing::{debug, instrument};

use crate::domain::error::{DomainError, TreeResult};
use crate::domain::node::Node;
use crate::domain::render::{group_label, leaf_label, Renderer};
use crate::domain::tree_traits::TreeDisplay;

/// Handle of a node stored in a [`NodeArena`].
pub type NodeId = Index;

/// Data payload for arena nodes.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeData {
    Leaf { name: String, value: f64 },
    Group { name: String },
}

impl NodeData {
    pub fn name(&self) -> &str {
        match self {
            NodeData::Leaf { name, .. } | NodeData::Group { name } => name,
        }
    }

    pub fn is_group(&self) -> bool {
        matches!(self, NodeData::Group { .. })
    }
}

impl fmt::Display for NodeData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeData::Leaf { name, .. } => f.write_str(&leaf_label(name)),
            NodeData::Group { name } => f.write_str(&group_label(name)),
        }
    }
}

/// Node in the arena-based hierarchy.
#[derive(Debug)]
pub struct ArenaNode {
    pub data: NodeData,
    /// Handles of child nodes; a handle may appear more than once
    pub children: Vec<NodeId>,
}

/// Arena-backed hierarchy where groups reference children by handle.
///
/// Unlike the owned [`Node`] tree, the same node can be inserted into several
/// groups (or into one group repeatedly) and is counted once per reference.
/// [`NodeArena::insert`] rejects insertions that would close a cycle.
#[derive(Debug)]
pub struct NodeArena {
    arena: Arena<ArenaNode>,
    /// Node shown by the [`TreeDisplay`] impl, None for empty arenas
    root: Option<NodeId>,
}

impl Default for NodeArena {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeArena {
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
            root: None,
        }
    }

    /// Imports an owned tree; the returned handle is also set as root.
    #[instrument(level = "debug", skip(node), fields(root = %node.name()))]
    pub fn from_node(node: &Node) -> (Self, NodeId) {
        let mut arena = Self::new();
        let root = arena.import(node);
        arena.root = Some(root);
        (arena, root)
    }

    fn import(&mut self, node: &Node) -> NodeId {
        let data = match node {
            Node::Leaf(leaf) => NodeData::Leaf {
                name: leaf.name().to_string(),
                value: leaf.value(),
            },
            Node::Group(group) => NodeData::Group {
                name: group.name().to_string(),
            },
        };
        let children = node.children().iter().map(|c| self.import(c)).collect();
        self.arena.insert(ArenaNode { data, children })
    }

    #[instrument(level = "trace", skip(self))]
    pub fn add_leaf(&mut self, name: &str, value: f64) -> NodeId {
        self.arena.insert(ArenaNode {
            data: NodeData::Leaf {
                name: name.to_string(),
                value,
            },
            children: Vec::new(),
        })
    }

    #[instrument(level = "trace", skip(self))]
    pub fn add_group(&mut self, name: &str) -> NodeId {
        self.arena.insert(ArenaNode {
            data: NodeData::Group {
                name: name.to_string(),
            },
            children: Vec::new(),
        })
    }

    pub fn get_node(&self, id: NodeId) -> Option<&ArenaNode> {
        self.arena.get(id)
    }

    fn node(&self, id: NodeId) -> TreeResult<&ArenaNode> {
        self.arena
            .get(id)
            .ok_or_else(|| DomainError::NodeNotFound(format!("{id:?}")))
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn set_root(&mut self, id: NodeId) -> TreeResult<()> {
        self.node(id)?;
        self.root = Some(id);
        Ok(())
    }

    /// Number of nodes stored, regardless of how often they are referenced.
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// Appends `child` to the children of `parent`.
    ///
    /// Inserting into a leaf does nothing. Fails with
    /// [`DomainError::InvalidTopology`] if `parent` is `child` itself or one
    /// of its descendants.
    #[instrument(level = "debug", skip(self))]
    pub fn insert(&mut self, parent: NodeId, child: NodeId) -> TreeResult<()> {
        let parent_node = self.node(parent)?;
        let child_node = self.node(child)?;

        if !parent_node.data.is_group() {
            debug!(leaf = %parent_node.data.name(), "ignoring insert into leaf");
            return Ok(());
        }

        if self.is_reachable(child, parent)? {
            return Err(DomainError::InvalidTopology {
                parent: parent_node.data.name().to_string(),
                child: child_node.data.name().to_string(),
            });
        }

        if let Some(node) = self.arena.get_mut(parent) {
            node.children.push(child);
        }
        Ok(())
    }

    /// True if `target` is `from` or lies below it.
    fn is_reachable(&self, from: NodeId, target: NodeId) -> TreeResult<bool> {
        let mut visited = HashSet::new();
        let mut stack = vec![from];

        while let Some(current) = stack.pop() {
            if current == target {
                return Ok(true);
            }
            if visited.insert(current) {
                stack.extend(self.node(current)?.children.iter().copied());
            }
        }
        Ok(false)
    }

    /// Drops leaf handles from the direct children of `group`, keeping the
    /// order of the remaining groups. The leaf nodes stay in the arena.
    #[instrument(level = "debug", skip(self))]
    pub fn remove_leaves(&mut self, group: NodeId) -> TreeResult<usize> {
        let kept: Vec<NodeId> = self
            .node(group)?
            .children
            .iter()
            .copied()
            .filter(|&c| self.arena.get(c).is_some_and(|n| n.data.is_group()))
            .collect();

        let node = self
            .arena
            .get_mut(group)
            .ok_or_else(|| DomainError::NodeNotFound(format!("{group:?}")))?;
        let removed = node.children.len() - kept.len();
        node.children = kept;
        debug!(removed, "removed direct leaves");
        Ok(removed)
    }

    /// Removes a node from the arena and detaches it from every group.
    ///
    /// Its children are left in place; they are still reachable through any
    /// other group referencing them.
    #[instrument(level = "debug", skip(self))]
    pub fn remove_node(&mut self, id: NodeId) -> TreeResult<NodeData> {
        let removed = self
            .arena
            .remove(id)
            .ok_or_else(|| DomainError::NodeNotFound(format!("{id:?}")))?;
        for (_, node) in self.arena.iter_mut() {
            node.children.retain(|&c| c != id);
        }
        if self.root == Some(id) {
            self.root = None;
        }
        Ok(removed.data)
    }

    pub fn is_group(&self, id: NodeId) -> TreeResult<bool> {
        Ok(self.node(id)?.data.is_group())
    }

    #[instrument(level = "trace", skip(self))]
    pub fn aggregate_value(&self, id: NodeId) -> TreeResult<f64> {
        let node = self.node(id)?;
        match node.data {
            NodeData::Leaf { value, .. } => Ok(value),
            NodeData::Group { .. } => node
                .children
                .iter()
                .try_fold(0.0, |total, &c| Ok(total + self.aggregate_value(c)?)),
        }
    }

    #[instrument(level = "trace", skip(self))]
    pub fn leaf_count(&self, id: NodeId) -> TreeResult<usize> {
        let node = self.node(id)?;
        match node.data {
            NodeData::Leaf { .. } => Ok(1),
            NodeData::Group { .. } => node
                .children
                .iter()
                .try_fold(0, |total, &c| Ok(total + self.leaf_count(c)?)),
        }
    }

    /// Height of the subtree at `id`; a leaf or an empty group is 1.
    pub fn depth(&self, id: NodeId) -> TreeResult<usize> {
        let node = self.node(id)?;
        let mut deepest = 0;
        for &child in &node.children {
            deepest = deepest.max(self.depth(child)?);
        }
        Ok(1 + deepest)
    }

    /// Borrowed view of the subtree at `id`.
    pub fn subtree(&self, id: NodeId) -> TreeResult<Subtree<'_>> {
        self.node(id)?;
        Ok(Subtree { arena: self, id })
    }

    pub fn render<W: Write>(&self, id: NodeId, depth: usize, out: &mut W) -> TreeResult<()> {
        self.render_with(&Renderer::default(), id, depth, out)
    }

    pub fn render_with<W: Write>(
        &self,
        renderer: &Renderer,
        id: NodeId,
        depth: usize,
        out: &mut W,
    ) -> TreeResult<()> {
        renderer.render(&self.subtree(id)?, depth, out)?;
        Ok(())
    }

    /// Copies the subtree at `id` into an owned [`Node`]. Shared references
    /// become independent copies.
    #[instrument(level = "debug", skip(self))]
    pub fn to_node(&self, id: NodeId) -> TreeResult<Node> {
        let node = self.node(id)?;
        match &node.data {
            NodeData::Leaf { name, value } => Ok(Node::leaf(name.clone(), *value)),
            NodeData::Group { name } => {
                let mut group = Node::group(name.clone());
                for &child in &node.children {
                    group.insert(self.to_node(child)?);
                }
                Ok(group)
            }
        }
    }

    /// Pre-order traversal from the root.
    pub fn iter(&self) -> TreeIterator<'_> {
        TreeIterator::new(self, self.root)
    }

    /// Pre-order traversal from an arbitrary node.
    pub fn iter_from(&self, id: NodeId) -> TreeIterator<'_> {
        TreeIterator::new(self, Some(id))
    }
}

/// A node of a [`NodeArena`] viewed as the root of a tree.
#[derive(Debug, Clone, Copy)]
pub struct Subtree<'a> {
    arena: &'a NodeArena,
    id: NodeId,
}

impl Subtree<'_> {
    pub fn id(&self) -> NodeId {
        self.id
    }
}

impl TreeDisplay for Subtree<'_> {
    fn outline(&self) -> Vec<(usize, String)> {
        self.arena
            .iter_from(self.id)
            .map(|(depth, _, node)| (depth, node.data.to_string()))
            .collect()
    }

    fn to_tree_string(&self) -> Tree<String> {
        fn build_tree(arena: &NodeArena, id: NodeId) -> Tree<String> {
            match arena.get_node(id) {
                Some(node) => Tree::new(node.data.to_string()).with_leaves(
                    node.children.iter().map(|&child| build_tree(arena, child)),
                ),
                None => Tree::new(format!("{id:?}")),
            }
        }
        build_tree(self.arena, self.id)
    }
}

impl TreeDisplay for NodeArena {
    fn outline(&self) -> Vec<(usize, String)> {
        match self.root {
            Some(root) => Subtree { arena: self, id: root }.outline(),
            None => vec![(0, "Empty tree".to_string())],
        }
    }

    fn to_tree_string(&self) -> Tree<String> {
        match self.root {
            Some(root) => Subtree { arena: self, id: root }.to_tree_string(),
            None => Tree::new("Empty tree".to_string()),
        }
    }
}

pub struct TreeIterator<'a> {
    arena: &'a NodeArena,
    stack: Vec<(usize, NodeId)>,
}

impl<'a> TreeIterator<'a> {
    fn new(arena: &'a NodeArena, start: Option<NodeId>) -> Self {
        Self {
            arena,
            stack: start.map(|id| (0, id)).into_iter().collect(),
        }
    }
}

impl<'a> Iterator for TreeIterator<'a> {
    type Item = (usize, NodeId, &'a ArenaNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((depth, current)) = self.stack.pop() {
            if let Some(node) = self.arena.get_node(current) {
                // Push children in reverse order for left-to-right traversal
                for &child in node.children.iter().rev() {
                    self.stack.push((depth + 1, child));
                }
                return Some((depth, current, node));
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_self_is_rejected() {
        let mut arena = NodeArena::new();
        let group = arena.add_group("box");
        let err = arena.insert(group, group).unwrap_err();
        assert!(matches!(err, DomainError::InvalidTopology { .. }));
    }

    #[test]
    fn insert_into_leaf_is_ignored() {
        let mut arena = NodeArena::new();
        let leaf = arena.add_leaf("pen", 1.0);
        let other = arena.add_leaf("cap", 2.0);
        arena.insert(leaf, other).unwrap();
        assert!(arena.get_node(leaf).unwrap().children.is_empty());
    }

    #[test]
    fn remove_node_detaches_from_groups() {
        let mut arena = NodeArena::new();
        let group = arena.add_group("box");
        let leaf = arena.add_leaf("pen", 1.0);
        arena.insert(group, leaf).unwrap();
        arena.insert(group, leaf).unwrap();

        let data = arena.remove_node(leaf).unwrap();
        assert_eq!(data.name(), "pen");
        assert!(arena.get_node(group).unwrap().children.is_empty());
        assert!(matches!(
            arena.aggregate_value(leaf),
            Err(DomainError::NodeNotFound(_))
        ));
    }

    #[test]
    fn empty_arena_displays_placeholder() {
        let arena = NodeArena::new();
        assert_eq!(arena.to_tree_string().to_string(), "Empty tree\n");
        assert_eq!(arena.iter().count(), 0);
    }
}
