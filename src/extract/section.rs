//! Section heading parsing: number, title and id.

use super::text::flatten;
use crate::diag::Diagnostics;
use crate::markup::Element;

/// Id used for the bibliography, which carries none in the markup.
pub const BIBLIOGRAPHY_ID: &str = "sec:bibliography";

/// Prefix of synthesized section ids.
pub const SECTION_ID_PREFIX: &str = "sec:";

const NUMBER_CLASSES: &[&str] = &["section-number", "sec-nr"];
const TITLE_CLASSES: &[&str] = &["section-title", "sec-title"];

/// A parsed section heading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionHeading {
    pub level: u8,
    /// Section number such as `2.3` or `A.`; empty when unnumbered
    pub number: String,
    pub title: String,
    pub id: String,
}

/// Rank of a heading tag: `h1` → 1 .. `h4` → 4.
pub fn heading_level(tag: &str) -> Option<u8> {
    match tag {
        "h1" => Some(1),
        "h2" => Some(2),
        "h3" => Some(3),
        "h4" => Some(4),
        _ => None,
    }
}

/// Parse a heading element of the given level.
pub fn parse_section(heading: &Element, level: u8, diagnostics: &dyn Diagnostics) -> SectionHeading {
    let (number, title) =
        structured_number_title(heading).unwrap_or_else(|| split_number(&flatten(heading)));

    let id = match heading.attr("id") {
        Some(id) if !id.is_empty() => id.to_string(),
        _ if title == "Bibliography" => BIBLIOGRAPHY_ID.to_string(),
        _ => {
            let id = synthesize_id(&title);
            diagnostics.warning(&format!("section {:?} has no id; using {}", title, id));
            id
        }
    };

    SectionHeading {
        level,
        number,
        title,
        id,
    }
}

/// `Streams and I/O` → `sec:Streams_and_I/O`
pub fn synthesize_id(title: &str) -> String {
    let words: Vec<&str> = title.split_whitespace().collect();
    format!("{}{}", SECTION_ID_PREFIX, words.join("_"))
}

/// Number and title from marked spans: a number element followed, possibly
/// after unmarked siblings, by a title element. A later number element
/// replaces an earlier one.
fn structured_number_title(heading: &Element) -> Option<(String, String)> {
    heading.descendants().into_iter().find_map(|parent| {
        let mut number = None;
        for child in parent.elements() {
            if has_any_class(child, NUMBER_CLASSES) {
                number = Some(child);
            } else if has_any_class(child, TITLE_CLASSES) {
                if let Some(number) = number {
                    return Some((flatten(number), flatten(child)));
                }
            }
        }
        None
    })
}

fn has_any_class(element: &Element, classes: &[&str]) -> bool {
    classes.iter().any(|c| element.has_class(c))
}

/// Peel a leading `N.N ` or `A. ` off a flattened heading.
pub fn split_number(text: &str) -> (String, String) {
    let mut chars = text.chars();
    let numbered = match (chars.next(), chars.next()) {
        (Some(first), _) if first.is_ascii_digit() => true,
        (Some(first), Some('.')) if first.is_uppercase() => true,
        _ => false,
    };
    if numbered {
        if let Some((number, title)) = text.split_once(' ') {
            return (number.to_string(), title.trim_start().to_string());
        }
    }
    (String::new(), text.to_string())
}
