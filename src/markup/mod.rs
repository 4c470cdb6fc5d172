//! Markup engine: event stream plus on-demand subtree materialization.

pub mod entities;
pub mod reader;
pub mod tree;

pub use reader::{Event, Reader, StartTag};
pub use tree::{Element, Node};
