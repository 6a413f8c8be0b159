use termtree::Tree;
use tracing::instrument;

use crate::domain::node::Node;
use crate::domain::render::label;

/// Views a hierarchy as text.
///
/// Implemented for owned [`Node`] trees and for arena subtrees, so both can be
/// fed to the same [`Renderer`](crate::domain::Renderer).
pub trait TreeDisplay {
    /// Pre-order `(depth, label)` pairs with the root at depth 0.
    fn outline(&self) -> Vec<(usize, String)>;

    /// Box-drawing representation, one label per node.
    fn to_tree_string(&self) -> Tree<String>;
}

impl TreeDisplay for Node {
    fn outline(&self) -> Vec<(usize, String)> {
        self.iter().map(|(depth, node)| (depth, label(node))).collect()
    }

    #[instrument(level = "trace", skip(self), fields(node = %self.name()))]
    fn to_tree_string(&self) -> Tree<String> {
        let leaves: Vec<_> = self.children().iter().map(|c| c.to_tree_string()).collect();
        Tree::new(label(self)).with_leaves(leaves)
    }
}
