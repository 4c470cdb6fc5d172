//! Index builder: event-driven state machine over one HTML file.
//!
//! Reacts to four start-tag patterns:
//!
//! - `<dt class="pubdef">`: collect the identifier of its first anchor
//! - `<dd>`: first sentence becomes the summary of every pending identifier
//! - `<div class="title">`: whole-document pseudo-section (level 0)
//! - `<h1>`..`<h4>`: numbered or unnumbered section
//!
//! All state lives in a [`FilePass`] that is dropped when the file is done.

use crate::diag::Diagnostics;
use crate::extract::{flatten, heading_level, parse_section, summarize};
use crate::ident::parse_identifier;
use crate::markup::{Element, Event, Reader, StartTag};
use crate::model::{Class, DocObject, IndexRecord};
use std::path::{Path, PathBuf};

/// Class marking a public definition term.
const PUBDEF_CLASS: &str = "pubdef";

/// Class marking the document title block.
const TITLE_CLASS: &str = "title";

/// Anchor attributes holding an identifier, most specific first.
const ANCHOR_ATTRIBUTES: &[&str] = &["data-obj", "id", "name"];

/// Index one decoded HTML document.
///
/// `local_path` is the stable name used for the document's title section.
pub fn index_html(
    text: &str,
    file: &Path,
    class: Class,
    local_path: &str,
    diagnostics: &dyn Diagnostics,
) -> Vec<IndexRecord> {
    let mut pass = FilePass::new(file, class, local_path, diagnostics);
    let mut reader = Reader::new(text);

    while let Some(event) = reader.next_event() {
        if let Event::Start(start) = event {
            pass.on_start(&mut reader, &start);
        }
    }

    pass.records
}

/// Accumulation state for a single file.
struct FilePass<'a> {
    file: &'a Path,
    class: Class,
    local_path: &'a str,
    diagnostics: &'a dyn Diagnostics,
    /// Identifiers awaiting their shared `<dd>`, in discovery order
    pending: Vec<(DocObject, usize)>,
    records: Vec<IndexRecord>,
}

impl<'a> FilePass<'a> {
    fn new(
        file: &'a Path,
        class: Class,
        local_path: &'a str,
        diagnostics: &'a dyn Diagnostics,
    ) -> Self {
        FilePass {
            file,
            class,
            local_path,
            diagnostics,
            pending: Vec::new(),
            records: Vec::new(),
        }
    }

    fn on_start(&mut self, reader: &mut Reader<'_>, start: &StartTag) {
        match start.name.as_str() {
            "dt" if start.has_class(PUBDEF_CLASS) => {
                let term = reader.parse_subtree(start);
                self.on_definition_term(&term, start.offset);
            }
            "dd" if !self.pending.is_empty() => {
                let data = reader.parse_subtree(start);
                self.on_definition_data(&data);
            }
            "div" if start.has_class(TITLE_CLASS) => {
                let title = flatten(&reader.parse_subtree(start));
                self.emit(
                    DocObject::Section {
                        level: 0,
                        number: "0".to_string(),
                        label: self.local_path.to_string(),
                        file: self.file_name(),
                    },
                    title,
                    start.offset,
                );
            }
            tag => {
                if let Some(level) = heading_level(tag) {
                    let heading = reader.parse_subtree(start);
                    let section = parse_section(&heading, level, self.diagnostics);
                    self.emit(
                        DocObject::Section {
                            level: section.level,
                            number: section.number,
                            label: section.id,
                            file: self.file_name(),
                        },
                        section.title,
                        start.offset,
                    );
                }
            }
        }
    }

    fn on_definition_term(&mut self, term: &Element, offset: usize) {
        let Some(object) = anchor_object(term) else {
            return;
        };
        if self.pending.iter().any(|(pending, _)| *pending == object) {
            return;
        }
        self.pending.push((object, offset));
    }

    /// Every pending identifier shares the provenance of the first one.
    fn on_definition_data(&mut self, data: &Element) {
        let summary = summarize(data);
        let pending = std::mem::take(&mut self.pending);
        let Some(&(_, offset)) = pending.first() else {
            return;
        };
        for (object, _) in pending {
            self.emit(object, summary.clone(), offset);
        }
    }

    fn emit(&mut self, object: DocObject, summary: String, offset: usize) {
        self.records.push(IndexRecord {
            object,
            summary,
            file: PathBuf::from(self.file),
            class: self.class,
            offset,
        });
    }

    fn file_name(&self) -> String {
        self.file.to_string_lossy().into_owned()
    }
}

/// Identifier of the first anchor in a definition term. Candidate
/// attributes that do not parse are skipped silently.
fn anchor_object(term: &Element) -> Option<DocObject> {
    let anchor = term.find(&|e| {
        e.name == "a" && ANCHOR_ATTRIBUTES.iter().any(|attr| e.attr(attr).is_some())
    })?;
    ANCHOR_ATTRIBUTES
        .iter()
        .filter_map(|attr| anchor.attr(attr))
        .find_map(|token| parse_identifier(token).ok())
}
