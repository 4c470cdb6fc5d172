//! Text extraction grammars over materialized element trees.

pub mod section;
pub mod summary;
pub mod text;

pub use section::{heading_level, parse_section, SectionHeading};
pub use summary::summarize;
pub use text::flatten;
