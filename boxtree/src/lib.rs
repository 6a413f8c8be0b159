//! Hierarchical containers: leaves carry a numeric value, groups aggregate
//! the values and leaf counts of everything below them.
//!
//! ```
//! use boxtree::Node;
//!
//! let mut wires = Node::group("My tangled wires");
//! wires.insert(Node::leaf("Xiaomi2A", 3.0));
//! wires.insert(Node::leaf("PowerPlugCable", 2.0));
//!
//! assert_eq!(wires.aggregate_value(), 5.0);
//! assert_eq!(wires.leaf_count(), 2);
//! ```

pub mod config;
pub mod domain;
pub mod error;
pub mod util;

pub use crate::config::{RenderStyle, Settings, SharedSettings};
pub use crate::domain::{
    DomainError, Group, Leaf, Node, NodeArena, NodeId, Renderer, TreeDisplay, TreeResult,
};
pub use crate::error::{BoxtreeError, BoxtreeResult};
