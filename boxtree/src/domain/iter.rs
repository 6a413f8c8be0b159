//! Depth-first traversal over an owned [`Node`] tree.

use crate::domain::node::Node;

pub struct PreOrderIter<'a> {
    stack: Vec<(usize, &'a Node)>,
}

impl<'a> PreOrderIter<'a> {
    pub(crate) fn new(root: &'a Node) -> Self {
        Self {
            stack: vec![(0, root)],
        }
    }
}

impl<'a> Iterator for PreOrderIter<'a> {
    type Item = (usize, &'a Node);

    fn next(&mut self) -> Option<Self::Item> {
        let (depth, node) = self.stack.pop()?;
        // Push children in reverse order for left-to-right traversal
        for child in node.children().iter().rev() {
            self.stack.push((depth + 1, child));
        }
        Some((depth, node))
    }
}

pub struct PostOrderIter<'a> {
    stack: Vec<(usize, &'a Node, bool)>,
}

impl<'a> PostOrderIter<'a> {
    pub(crate) fn new(root: &'a Node) -> Self {
        Self {
            stack: vec![(0, root, false)],
        }
    }
}

impl<'a> Iterator for PostOrderIter<'a> {
    type Item = (usize, &'a Node);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((depth, node, visited)) = self.stack.pop() {
            if visited {
                return Some((depth, node));
            }
            self.stack.push((depth, node, true));
            for child in node.children().iter().rev() {
                self.stack.push((depth + 1, child, false));
            }
        }
        None
    }
}
