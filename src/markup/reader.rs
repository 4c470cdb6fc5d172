//! Lenient pull reader for HTML.
//!
//! Produces start/end/text/comment events in document order. While a
//! start event is current, [`Reader::parse_subtree`] materializes that
//! element's content and advances the stream past it.
//!
//! Recovery is best-effort: nothing here ever fails. Broken markup
//! degrades into text or a partial tree.

use super::entities::decode;
use super::tree::{attr, has_class, Element, Node};
use memchr::{memchr, memmem};

/// Elements that never have content.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
    "source", "track", "wbr",
];

/// Elements whose content is raw text up to the matching end tag.
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

/// Elements whose end tag may be omitted.
const OPTIONAL_END: &[&str] = &["dt", "dd", "li", "p", "td", "th", "tr", "option"];

const HEADINGS: &[&str] = &["h1", "h2", "h3", "h4", "h5", "h6"];

/// Start tags that close an open `<p>`.
const CLOSES_PARAGRAPH: &[&str] = &[
    "address", "article", "aside", "blockquote", "dd", "div", "dl", "dt", "fieldset", "footer",
    "form", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "main", "nav", "ol", "p", "pre",
    "section", "table", "ul",
];

/// An element start tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartTag {
    /// Lower-cased tag name
    pub name: String,
    /// Attributes in document order, names lower-cased, values decoded
    pub attributes: Vec<(String, String)>,
    /// Character offset of the `<` in the input
    pub offset: usize,
    /// Written as `<name ... />`
    pub self_closing: bool,
}

impl StartTag {
    pub fn attr(&self, name: &str) -> Option<&str> {
        attr(&self.attributes, name)
    }

    pub fn has_class(&self, class: &str) -> bool {
        has_class(&self.attributes, class)
    }

    fn is_empty_element(&self) -> bool {
        self.self_closing || VOID_ELEMENTS.contains(&self.name.as_str())
    }
}

/// A markup event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Start(StartTag),
    End { name: String },
    Text(String),
    Comment(String),
}

/// Outcome of reading at a `<`.
enum Markup {
    Event(Event),
    /// Doctype or processing instruction, consumed without an event
    Skipped,
    NotMarkup,
}

/// Pull reader over decoded document text.
pub struct Reader<'a> {
    input: &'a str,
    pos: usize,
    /// Byte position up to which characters have been counted
    counted_bytes: usize,
    counted_chars: usize,
    /// Event handed back by `parse_subtree` for the outer stream
    pushed_back: Option<Event>,
    /// Set after a `<script>`/`<style>` start: next read is raw text
    raw_text: Option<String>,
}

impl<'a> Reader<'a> {
    pub fn new(input: &'a str) -> Self {
        Reader {
            input,
            pos: 0,
            counted_bytes: 0,
            counted_chars: 0,
            pushed_back: None,
            raw_text: None,
        }
    }

    /// Next event, or `None` at end of input.
    pub fn next_event(&mut self) -> Option<Event> {
        if let Some(event) = self.pushed_back.take() {
            return Some(event);
        }
        if let Some(name) = self.raw_text.take() {
            return Some(self.read_raw_text(name));
        }

        loop {
            if self.pos >= self.input.len() {
                return None;
            }
            if self.input.as_bytes()[self.pos] != b'<' {
                return Some(self.read_text(self.pos));
            }
            match self.read_markup() {
                Markup::Event(event) => return Some(event),
                Markup::Skipped => continue,
                // A '<' that does not start markup is text.
                Markup::NotMarkup => return Some(self.read_text(self.pos + 1)),
            }
        }
    }

    /// Materialize the content of `start`, which must be the event just
    /// returned by [`next_event`](Self::next_event), and advance past it.
    pub fn parse_subtree(&mut self, start: &StartTag) -> Element {
        let root = Element::new(start.name.clone(), start.attributes.clone());
        if start.is_empty_element() {
            return root;
        }

        let mut stack = vec![root];
        while let Some(event) = self.next_event() {
            match event {
                Event::Text(text) => push_node(&mut stack, Node::Text(text)),
                Event::Comment(text) => push_node(&mut stack, Node::Comment(text)),
                Event::Start(tag) => {
                    while implies_end(&stack[stack.len() - 1].name, &tag.name) {
                        if stack.len() == 1 {
                            self.pushed_back = Some(Event::Start(tag));
                            return close_all(stack);
                        }
                        close_top(&mut stack);
                    }
                    if tag.is_empty_element() {
                        push_node(&mut stack, Node::Element(Element::new(tag.name, tag.attributes)));
                    } else {
                        stack.push(Element::new(tag.name, tag.attributes));
                    }
                }
                Event::End { name } => match stack.iter().rposition(|e| closes(&name, &e.name)) {
                    Some(0) => return close_all(stack),
                    Some(index) => {
                        while stack.len() > index {
                            close_top(&mut stack);
                        }
                    }
                    None if OPTIONAL_END.contains(&stack[0].name.as_str()) => {
                        self.pushed_back = Some(Event::End { name });
                        return close_all(stack);
                    }
                    None => {}
                },
            }
        }
        close_all(stack)
    }

    // -- Tokenizing -----------------------------------------------------------

    /// Read markup at `self.pos`, which holds a `<`.
    fn read_markup(&mut self) -> Markup {
        let start = self.pos;
        let rest = &self.input[start..];

        if rest.starts_with("<!--") {
            let body_start = start + 4;
            let (body_end, next) = match memmem::find(&self.input.as_bytes()[body_start..], b"-->") {
                Some(i) => (body_start + i, body_start + i + 3),
                None => (self.input.len(), self.input.len()),
            };
            self.pos = next;
            return Markup::Event(Event::Comment(self.input[body_start..body_end].to_string()));
        }

        if rest.starts_with("<!") || rest.starts_with("<?") {
            self.pos = match memchr(b'>', &self.input.as_bytes()[start..]) {
                Some(i) => start + i + 1,
                None => self.input.len(),
            };
            return Markup::Skipped;
        }

        if let Some(after) = rest.strip_prefix("</") {
            let name_len = name_length(after);
            if name_len == 0 {
                return Markup::NotMarkup;
            }
            let name = after[..name_len].to_ascii_lowercase();
            let name_end = start + 2 + name_len;
            self.pos = match memchr(b'>', &self.input.as_bytes()[name_end..]) {
                Some(i) => name_end + i + 1,
                None => self.input.len(),
            };
            return Markup::Event(Event::End { name });
        }

        let after = &rest[1..];
        if !after.starts_with(|c: char| c.is_ascii_alphabetic()) {
            return Markup::NotMarkup;
        }
        let name_len = name_length(after);
        let name = after[..name_len].to_ascii_lowercase();
        let body_start = start + 1 + name_len;
        let body_end = find_tag_end(self.input.as_bytes(), body_start);
        let body = &self.input[body_start..body_end];
        let self_closing = body.trim_end().ends_with('/');
        let attributes = parse_attributes(body);

        let offset = self.char_offset(start);
        self.pos = (body_end + 1).min(self.input.len());

        if !self_closing && RAW_TEXT_ELEMENTS.contains(&name.as_str()) {
            self.raw_text = Some(name.clone());
        }

        Markup::Event(Event::Start(StartTag {
            name,
            attributes,
            offset,
            self_closing,
        }))
    }

    /// Text from `self.pos` up to the first `<` at or after `search_from`.
    fn read_text(&mut self, search_from: usize) -> Event {
        let start = self.pos;
        let end = match memchr(b'<', &self.input.as_bytes()[search_from..]) {
            Some(i) => search_from + i,
            None => self.input.len(),
        };
        self.pos = end;
        Event::Text(decode(&self.input[start..end]).into_owned())
    }

    /// Raw content of a script/style element; its end tag is left pending.
    fn read_raw_text(&mut self, name: String) -> Event {
        let bytes = self.input.as_bytes();
        let start = self.pos;
        let mut search = start;
        let end = loop {
            match memchr(b'<', &bytes[search..]) {
                Some(i) => {
                    let candidate = search + i;
                    let tail = &bytes[candidate..];
                    if tail.len() >= name.len() + 2
                        && tail[1] == b'/'
                        && tail[2..2 + name.len()].eq_ignore_ascii_case(name.as_bytes())
                    {
                        break candidate;
                    }
                    search = candidate + 1;
                }
                None => break bytes.len(),
            }
        };
        self.pos = end;
        Event::Text(self.input[start..end].to_string())
    }

    /// Character offset of byte position `byte`. Positions are requested in
    /// increasing order, so counting resumes from the last request.
    fn char_offset(&mut self, byte: usize) -> usize {
        if byte < self.counted_bytes {
            self.counted_bytes = 0;
            self.counted_chars = 0;
        }
        self.counted_chars += self.input[self.counted_bytes..byte].chars().count();
        self.counted_bytes = byte;
        self.counted_chars
    }
}

// -- Tree building helpers ----------------------------------------------------

fn push_node(stack: &mut [Element], node: Node) {
    if let Some(top) = stack.last_mut() {
        top.children.push(node);
    }
}

fn close_top(stack: &mut Vec<Element>) {
    if stack.len() > 1 {
        if let Some(done) = stack.pop() {
            push_node(stack, Node::Element(done));
        }
    }
}

fn close_all(mut stack: Vec<Element>) -> Element {
    while stack.len() > 1 {
        close_top(&mut stack);
    }
    stack.pop().unwrap_or_default()
}

/// Whether end tag `</end>` closes an open `<open>`. Any heading end tag
/// closes any open heading.
fn closes(end: &str, open: &str) -> bool {
    end == open || (HEADINGS.contains(&end) && HEADINGS.contains(&open))
}

/// Whether an incoming `<next>` ends an open `<open>` whose end tag was omitted.
fn implies_end(open: &str, next: &str) -> bool {
    match open {
        "p" => CLOSES_PARAGRAPH.contains(&next),
        "dt" | "dd" => matches!(next, "dt" | "dd"),
        "li" => next == "li",
        "option" => next == "option",
        "td" | "th" => matches!(next, "td" | "th" | "tr"),
        "tr" => next == "tr",
        _ => false,
    }
}

// -- Lexical helpers ----------------------------------------------------------

fn is_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b':' | b'.')
}

fn name_length(s: &str) -> usize {
    s.bytes().take_while(|&b| is_name_byte(b)).count()
}

/// Position of the `>` closing a start tag, skipping quoted values.
fn find_tag_end(bytes: &[u8], from: usize) -> usize {
    let mut quote: Option<u8> = None;
    for (i, &b) in bytes[from..].iter().enumerate() {
        match quote {
            Some(q) if b == q => quote = None,
            Some(_) => {}
            None => match b {
                b'"' | b'\'' => quote = Some(b),
                b'>' => return from + i,
                _ => {}
            },
        }
    }
    bytes.len()
}

/// Parse the attribute part of a start tag (everything after the name).
fn parse_attributes(body: &str) -> Vec<(String, String)> {
    let bytes = body.as_bytes();
    let mut attributes = Vec::new();
    let mut i = 0;

    loop {
        while i < bytes.len() && (bytes[i].is_ascii_whitespace() || bytes[i] == b'/') {
            i += 1;
        }
        if i >= bytes.len() {
            break;
        }

        let name_start = i;
        while i < bytes.len() && !bytes[i].is_ascii_whitespace() && !matches!(bytes[i], b'=' | b'/')
        {
            i += 1;
        }
        // A lone '=' cannot start a name.
        if i == name_start {
            i += 1;
            continue;
        }
        let name = body[name_start..i].to_ascii_lowercase();

        let mut j = i;
        while j < bytes.len() && bytes[j].is_ascii_whitespace() {
            j += 1;
        }
        if j >= bytes.len() || bytes[j] != b'=' {
            attributes.push((name, String::new()));
            continue;
        }
        j += 1;
        while j < bytes.len() && bytes[j].is_ascii_whitespace() {
            j += 1;
        }

        let value = match bytes.get(j) {
            Some(&q @ (b'"' | b'\'')) => {
                let value_start = j + 1;
                let value_end = memchr(q, &bytes[value_start..])
                    .map(|k| value_start + k)
                    .unwrap_or(bytes.len());
                i = (value_end + 1).min(bytes.len());
                &body[value_start..value_end]
            }
            _ => {
                let value_start = j;
                let mut k = j;
                while k < bytes.len() && !bytes[k].is_ascii_whitespace() {
                    k += 1;
                }
                i = k;
                &body[value_start..k]
            }
        };
        attributes.push((name, decode(value).into_owned()));
    }

    attributes
}
