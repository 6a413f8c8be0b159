//! Domain layer: the hierarchical container and its views
//!
//! This layer is independent of external concerns (no config loading, no
//! global state).

pub mod arena;
pub mod error;
pub mod iter;
pub mod node;
pub mod render;
pub mod tree_traits;

pub use arena::{ArenaNode, NodeArena, NodeData, NodeId, Subtree};
pub use error::{DomainError, TreeResult};
pub use node::{Group, Leaf, Node};
pub use render::Renderer;
pub use tree_traits::TreeDisplay;
