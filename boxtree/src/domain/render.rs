//! Indented textual rendering.
//!
//! Every node occupies one line, prefixed by one indent unit per nesting
//! level:
//!
//! ```text
//! Box with 'My stuff' contains:
//! 	Item with name 'Pen'
//! ```
//!
//! The group line keeps its trailing space.

use std::io::{self, Write};

use itertools::Itertools;
use tracing::instrument;

use crate::config::{RenderSettings, RenderStyle};
use crate::domain::node::Node;
use crate::domain::tree_traits::TreeDisplay;

/// Default indent unit: one tab per level.
pub const INDENT_UNIT: &str = "\t";

pub fn group_label(name: &str) -> String {
    format!("Box with '{name}' contains: ")
}

pub fn leaf_label(name: &str) -> String {
    format!("Item with name '{name}'")
}

/// Line text of a single node, without indentation.
pub fn label(node: &Node) -> String {
    match node {
        Node::Group(group) => group_label(group.name()),
        Node::Leaf(leaf) => leaf_label(leaf.name()),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Renderer {
    indent: String,
    style: RenderStyle,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new(INDENT_UNIT)
    }
}

impl Renderer {
    pub fn new(indent: impl Into<String>) -> Self {
        Self {
            indent: indent.into(),
            style: RenderStyle::Plain,
        }
    }

    pub fn from_settings(settings: &RenderSettings) -> Self {
        Self {
            indent: settings.indent.clone(),
            style: settings.style,
        }
    }

    pub fn with_style(mut self, style: RenderStyle) -> Self {
        self.style = style;
        self
    }

    pub fn indent(&self) -> &str {
        &self.indent
    }

    pub fn style(&self) -> RenderStyle {
        self.style
    }

    /// Rendered lines without line terminators.
    pub fn lines<T: TreeDisplay + ?Sized>(&self, item: &T, depth: usize) -> Vec<String> {
        match self.style {
            RenderStyle::Plain => item
                .outline()
                .into_iter()
                .map(|(level, text)| format!("{}{}", self.indent.repeat(depth + level), text))
                .collect(),
            RenderStyle::Tree => {
                let prefix = self.indent.repeat(depth);
                item.to_tree_string()
                    .to_string()
                    .lines()
                    .map(|line| format!("{prefix}{line}"))
                    .collect()
            }
        }
    }

    #[instrument(level = "trace", skip(self, item, out))]
    pub fn render<T, W>(&self, item: &T, depth: usize, out: &mut W) -> io::Result<()>
    where
        T: TreeDisplay + ?Sized,
        W: Write,
    {
        for line in self.lines(item, depth) {
            writeln!(out, "{line}")?;
        }
        Ok(())
    }

    /// Same output as [`Renderer::render`], collected into a string.
    pub fn render_to_string<T: TreeDisplay + ?Sized>(&self, item: &T, depth: usize) -> String {
        format!("{}\n", self.lines(item, depth).iter().join("\n"))
    }
}
