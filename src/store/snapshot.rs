//! Snapshot format: one `record/5` fact per line.
//!
//! ```text
//! % Generated by manindex; do not edit.
//! % record(Object, Summary, File, Class, Offset).
//! record(lists:append/3, "Concatenate lists.", '/doc/Manual/lists.html', manual, 1234).
//! ```
//!
//! Atoms are written bare when they are plain lower-case identifiers and
//! single-quoted otherwise; summaries are double-quoted strings. The reader
//! accepts exactly what the writer produces and rejects anything that does
//! not resolve to a fully bound record.

use crate::model::{Class, DocObject, IndexRecord};
use std::fmt::Write as _;
use std::path::PathBuf;

/// First two lines of every snapshot.
pub const HEADER: [&str; 2] = [
    "% Generated by manindex; do not edit.",
    "% record(Object, Summary, File, Class, Offset).",
];

/// Deepest heading rank; level 0 is the document title.
const MAX_SECTION_LEVEL: u8 = 4;

/// A snapshot line that does not resolve to a record.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidRecord {
    #[error("syntax error at column {column}: {message}")]
    Syntax { column: usize, message: String },
    #[error("unbound variable {0}")]
    Unbound(String),
    #[error("not a record: {0}")]
    Shape(String),
    #[error("unknown class {0}")]
    Class(String),
}

// -- Writing ------------------------------------------------------------------

/// Render one record as a snapshot line (without newline).
pub fn format_record(record: &IndexRecord) -> String {
    let mut line = String::from("record(");
    write_object(&mut line, &record.object);
    line.push_str(", ");
    line.push_str(&quote_string(&record.summary));
    line.push_str(", ");
    line.push_str(&quote_atom_always(&record.file.to_string_lossy()));
    let _ = write!(line, ", {}, {}).", record.class, record.offset);
    line
}

fn write_object(out: &mut String, object: &DocObject) {
    match object {
        DocObject::Section {
            level,
            number,
            label,
            file,
        } => {
            let _ = write!(
                out,
                "section({},{},{},{})",
                level,
                quote_atom(number),
                quote_atom(label),
                quote_atom(file)
            );
        }
        DocObject::Callable { name, arity } => {
            let _ = write!(out, "{}/{}", quote_atom(name), arity);
        }
        DocObject::DcgCallable { name, arity } => {
            let _ = write!(out, "{}//{}", quote_atom(name), arity);
        }
        DocObject::Qualified { module, inner } => {
            out.push_str(&quote_atom(module));
            out.push(':');
            write_object(out, inner);
        }
        DocObject::FunctionLike { name, arity } => {
            let _ = write!(out, "f({}/{})", quote_atom(name), arity);
        }
        DocObject::CReference { name } => {
            let _ = write!(out, "c({})", quote_atom(name));
        }
    }
}

/// Write an atom, quoting unless it is a plain lower-case identifier.
pub fn quote_atom(atom: &str) -> String {
    if is_plain_atom(atom) {
        atom.to_string()
    } else {
        quote_atom_always(atom)
    }
}

fn quote_atom_always(atom: &str) -> String {
    let mut out = String::with_capacity(atom.len() + 2);
    out.push('\'');
    push_escaped(&mut out, atom, '\'');
    out.push('\'');
    out
}

fn quote_string(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    push_escaped(&mut out, text, '"');
    out.push('"');
    out
}

fn push_escaped(out: &mut String, text: &str, quote: char) {
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
}

fn is_plain_atom(atom: &str) -> bool {
    let mut chars = atom.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_lowercase())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

// -- Reading ------------------------------------------------------------------

/// Whether a snapshot line carries no record (blank or comment).
pub fn is_ignorable(line: &str) -> bool {
    let line = line.trim();
    line.is_empty() || line.starts_with('%')
}

/// Parse one snapshot line into a record.
pub fn parse_record(line: &str) -> Result<IndexRecord, InvalidRecord> {
    let tokens = tokenize(line)?;
    let mut parser = Parser { tokens, pos: 0 };
    let record = parser.record()?;
    if parser.pos != parser.tokens.len() {
        return Err(parser.syntax("text after end of record"));
    }
    Ok(record)
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Atom(String),
    Var(String),
    Int(u64),
    Str(String),
    Open,
    Close,
    Comma,
    Colon,
    Slash,
    DoubleSlash,
    End,
}

fn tokenize(line: &str) -> Result<Vec<(usize, Token)>, InvalidRecord> {
    let chars: Vec<char> = line.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    let syntax = |column: usize, message: &str| InvalidRecord::Syntax {
        column: column + 1,
        message: message.to_string(),
    };

    while i < chars.len() {
        let c = chars[i];
        let start = i;
        let token = match c {
            c if c.is_whitespace() => {
                i += 1;
                continue;
            }
            '(' => {
                i += 1;
                Token::Open
            }
            ')' => {
                i += 1;
                Token::Close
            }
            ',' => {
                i += 1;
                Token::Comma
            }
            ':' => {
                i += 1;
                Token::Colon
            }
            '/' if chars.get(i + 1) == Some(&'/') => {
                i += 2;
                Token::DoubleSlash
            }
            '/' => {
                i += 1;
                Token::Slash
            }
            '.' if chars.get(i + 1).map_or(true, |n| n.is_whitespace()) => {
                i += 1;
                Token::End
            }
            '\'' | '"' => {
                let (text, next) = read_quoted(&chars, i).ok_or_else(|| syntax(start, "unterminated quoted text"))?;
                i = next;
                if c == '"' {
                    Token::Str(text)
                } else {
                    Token::Atom(text)
                }
            }
            c if c.is_ascii_digit() => {
                while i < chars.len() && chars[i].is_ascii_digit() {
                    i += 1;
                }
                let digits: String = chars[start..i].iter().collect();
                Token::Int(digits.parse().map_err(|_| syntax(start, "integer out of range"))?)
            }
            c if c.is_alphabetic() || c == '_' => {
                while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
                    i += 1;
                }
                let word: String = chars[start..i].iter().collect();
                if c.is_lowercase() {
                    Token::Atom(word)
                } else {
                    Token::Var(word)
                }
            }
            _ => return Err(syntax(start, &format!("unexpected character {:?}", c))),
        };
        tokens.push((start, token));
    }

    Ok(tokens)
}

/// Read quoted text starting at the opening quote. Returns the unescaped
/// text and the index after the closing quote.
fn read_quoted(chars: &[char], open: usize) -> Option<(String, usize)> {
    let quote = chars[open];
    let mut text = String::new();
    let mut i = open + 1;
    loop {
        let c = *chars.get(i)?;
        match c {
            '\\' => {
                let escaped = *chars.get(i + 1)?;
                text.push(match escaped {
                    'n' => '\n',
                    't' => '\t',
                    'r' => '\r',
                    other => other,
                });
                i += 2;
            }
            c if c == quote => {
                if chars.get(i + 1) == Some(&quote) {
                    text.push(quote);
                    i += 2;
                } else {
                    return Some((text, i + 1));
                }
            }
            c => {
                text.push(c);
                i += 1;
            }
        }
    }
}

struct Parser {
    tokens: Vec<(usize, Token)>,
    pos: usize,
}

impl Parser {
    fn record(&mut self) -> Result<IndexRecord, InvalidRecord> {
        match self.next()? {
            Token::Atom(functor) if functor == "record" => {}
            other => return Err(InvalidRecord::Shape(format!("expected record/5, found {:?}", other))),
        }
        self.expect(Token::Open)?;
        let object = self.object()?;
        self.expect(Token::Comma)?;
        let summary = match self.next()? {
            Token::Str(s) => s,
            other => return Err(self.shape("summary string", other)),
        };
        self.expect(Token::Comma)?;
        let file = PathBuf::from(self.atom()?);
        self.expect(Token::Comma)?;
        let class_name = self.atom()?;
        let class: Class = class_name
            .parse()
            .map_err(|_| InvalidRecord::Class(class_name.clone()))?;
        self.expect(Token::Comma)?;
        let offset = self.integer()? as usize;
        self.expect(Token::Close)?;
        self.expect(Token::End)?;

        Ok(IndexRecord {
            object,
            summary,
            file,
            class,
            offset,
        })
    }

    fn object(&mut self) -> Result<DocObject, InvalidRecord> {
        let name = self.atom()?;
        match self.peek() {
            Some(Token::Open) if matches!(name.as_str(), "section" | "f" | "c") => {
                self.pos += 1;
                let object = match name.as_str() {
                    "section" => {
                        let level = self.integer()?;
                        let level = u8::try_from(level)
                            .ok()
                            .filter(|level| *level <= MAX_SECTION_LEVEL)
                            .ok_or_else(|| InvalidRecord::Shape(format!("section level {}", level)))?;
                        self.expect(Token::Comma)?;
                        let number = self.atom()?;
                        self.expect(Token::Comma)?;
                        let label = self.atom()?;
                        self.expect(Token::Comma)?;
                        let file = self.atom()?;
                        DocObject::Section {
                            level,
                            number,
                            label,
                            file,
                        }
                    }
                    "f" => {
                        let name = self.atom()?;
                        self.expect(Token::Slash)?;
                        let arity = self.arity()?;
                        DocObject::FunctionLike { name, arity }
                    }
                    _ => DocObject::CReference { name: self.atom()? },
                };
                self.expect(Token::Close)?;
                Ok(object)
            }
            Some(Token::Colon) => {
                self.pos += 1;
                let inner = self.object()?;
                match inner {
                    DocObject::Callable { .. } | DocObject::DcgCallable { .. } => {
                        Ok(DocObject::Qualified {
                            module: name,
                            inner: Box::new(inner),
                        })
                    }
                    other => Err(InvalidRecord::Shape(format!("cannot qualify {}", other))),
                }
            }
            Some(Token::Slash) => {
                self.pos += 1;
                Ok(DocObject::Callable {
                    name,
                    arity: self.arity()?,
                })
            }
            Some(Token::DoubleSlash) => {
                self.pos += 1;
                Ok(DocObject::DcgCallable {
                    name,
                    arity: self.arity()?,
                })
            }
            _ => Err(InvalidRecord::Shape(format!("{} is not a documentation object", name))),
        }
    }

    fn atom(&mut self) -> Result<String, InvalidRecord> {
        match self.next()? {
            Token::Atom(a) => Ok(a),
            other => Err(self.shape("atom", other)),
        }
    }

    fn integer(&mut self) -> Result<u64, InvalidRecord> {
        match self.next()? {
            Token::Int(n) => Ok(n),
            other => Err(self.shape("integer", other)),
        }
    }

    fn arity(&mut self) -> Result<u32, InvalidRecord> {
        let n = self.integer()?;
        u32::try_from(n).map_err(|_| InvalidRecord::Shape(format!("arity {}", n)))
    }

    fn expect(&mut self, expected: Token) -> Result<(), InvalidRecord> {
        let found = self.next()?;
        if found == expected {
            Ok(())
        } else {
            Err(self.syntax(&format!("expected {:?}, found {:?}", expected, found)))
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(_, t)| t)
    }

    /// Next token; a variable anywhere means the record is not ground.
    fn next(&mut self) -> Result<Token, InvalidRecord> {
        let token = self
            .tokens
            .get(self.pos)
            .map(|(_, t)| t.clone())
            .ok_or_else(|| self.syntax("unexpected end of line"))?;
        self.pos += 1;
        match token {
            Token::Var(name) => Err(InvalidRecord::Unbound(name)),
            token => Ok(token),
        }
    }

    fn shape(&self, expected: &str, found: Token) -> InvalidRecord {
        InvalidRecord::Shape(format!("expected {}, found {:?}", expected, found))
    }

    fn syntax(&self, message: &str) -> InvalidRecord {
        let column = self
            .tokens
            .get(self.pos.saturating_sub(1))
            .map(|(c, _)| c + 1)
            .unwrap_or(1);
        InvalidRecord::Syntax {
            column,
            message: message.to_string(),
        }
    }
}
