//! First-sentence extraction.
//!
//! Walks text in document order and stops at the first sentence end: a
//! period-class character followed by whitespace or the end of the text.
//! Only the captured prefix is normalized.

use super::text::normalize_space;
use crate::markup::{Element, Node};
use std::ops::ControlFlow;

/// Summary of the documentation below `element`: its first sentence, or
/// all of its text when no sentence end is found.
pub fn summarize(element: &Element) -> String {
    let mut scanner = SentenceScanner::default();
    let _ = scan(&element.children, &mut scanner);
    normalize_space(&scanner.captured)
}

/// Characters that end a sentence.
pub fn is_period(c: char) -> bool {
    matches!(
        c,
        '.' | '!'
            | '?'
            | '\u{0589}' // armenian full stop
            | '\u{06D4}' // arabic full stop
            | '\u{0964}'
            | '\u{0965}' // devanagari danda
            | '\u{203C}'
            | '\u{2047}'..='\u{2049}'
            | '\u{3002}' // ideographic full stop
            | '\u{FE52}'
            | '\u{FF01}'
            | '\u{FF0E}'
            | '\u{FF1F}'
            | '\u{FF61}'
    )
}

#[derive(Default)]
struct SentenceScanner {
    captured: String,
    /// Last captured character was a period; the next one decides.
    after_period: bool,
}

impl SentenceScanner {
    fn feed(&mut self, text: &str) -> ControlFlow<()> {
        for c in text.chars() {
            if self.after_period && c.is_whitespace() {
                return ControlFlow::Break(());
            }
            self.captured.push(c);
            self.after_period = is_period(c);
        }
        ControlFlow::Continue(())
    }
}

fn scan(nodes: &[Node], scanner: &mut SentenceScanner) -> ControlFlow<()> {
    for node in nodes {
        match node {
            Node::Text(text) => scanner.feed(text)?,
            Node::Element(element) => scan(&element.children, scanner)?,
            Node::Comment(_) => {}
        }
    }
    ControlFlow::Continue(())
}
