//! Plain-text flattening of element trees.

use crate::markup::{Element, Node};

/// Concatenate all text below `element` and normalize whitespace.
///
/// Elements are transparent; comments are dropped. Fragments are joined
/// as-is, so `foo<b>bar</b>` flattens to `foobar`.
pub fn flatten(element: &Element) -> String {
    let mut raw = String::new();
    collect_text(&element.children, &mut raw);
    normalize_space(&raw)
}

pub(crate) fn collect_text(nodes: &[Node], out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Element(element) => collect_text(&element.children, out),
            Node::Comment(_) => {}
        }
    }
}

/// Collapse whitespace runs to one space and trim both ends.
pub fn normalize_space(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for word in text.split_whitespace() {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::Reader;

    fn tree(html: &str) -> Element {
        let mut reader = Reader::new(html);
        match reader.next_event() {
            Some(crate::markup::Event::Start(start)) => reader.parse_subtree(&start),
            other => panic!("expected a start tag, got {:?}", other),
        }
    }

    #[test]
    fn flattens_nested_markup() {
        let t = tree("<div>  The <b>quick</b>\n\tbrown <i>fox<!-- x --></i>  </div>");
        assert_eq!(flatten(&t), "The quick brown fox");
    }

    #[test]
    fn adjacent_fragments_join_directly() {
        let t = tree("<span>foo<code>bar</code> baz</span>");
        assert_eq!(flatten(&t), "foobar baz");
    }

    #[test]
    fn nbsp_counts_as_space() {
        let t = tree("<p>a&nbsp;&nbsp;b</p>");
        assert_eq!(flatten(&t), "a b");
    }

    #[test]
    fn empty_tree() {
        assert_eq!(flatten(&tree("<p></p>")), "");
    }
}
