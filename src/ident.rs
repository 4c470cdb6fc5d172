//! Identifier grammar for anchor tokens (`data-obj`, `id`, `name`).
//!
//! Recognized forms, tried in order:
//!
//! 1. `Module:Rest`: qualified callable, `Rest` parsed recursively
//! 2. `Name//Arity`: DCG callable
//! 3. `Name/Arity`: callable
//! 4. `f(Name/Arity)`: C-style function
//! 5. `c(Name)`: C symbol

use crate::model::DocObject;
use regex::Regex;
use std::sync::LazyLock;

static RE_QUALIFIED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([a-z][A-Za-z0-9_]*):(\S.*)$").unwrap());

static RE_DCG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\S+)//([0-9]+)$").unwrap());

static RE_CALLABLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\S+)/([0-9]+)$").unwrap());

static RE_FUNCTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^f\((\S+)/([0-9]+)\)$").unwrap());

static RE_CREF: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^c\((\S+)\)$").unwrap());

/// The token is not in any recognized identifier form.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("not a documentation identifier: {token:?}")]
pub struct ParseFailure {
    pub token: String,
}

impl ParseFailure {
    fn new(token: &str) -> Self {
        ParseFailure {
            token: token.to_string(),
        }
    }
}

/// Parse an anchor token into a documentation object.
pub fn parse_identifier(token: &str) -> Result<DocObject, ParseFailure> {
    let token = token.trim();

    if let Some(caps) = RE_QUALIFIED.captures(token) {
        let inner = parse_identifier(&caps[2]).map_err(|_| ParseFailure::new(token))?;
        return match inner {
            DocObject::Callable { .. } | DocObject::DcgCallable { .. } => Ok(DocObject::Qualified {
                module: caps[1].to_string(),
                inner: Box::new(inner),
            }),
            _ => Err(ParseFailure::new(token)),
        };
    }

    if let Some(caps) = RE_DCG.captures(token) {
        return Ok(DocObject::DcgCallable {
            name: unwrap_name(&caps[1]).ok_or_else(|| ParseFailure::new(token))?,
            arity: parse_arity(&caps[2], token)?,
        });
    }

    if let Some(caps) = RE_CALLABLE.captures(token) {
        return Ok(DocObject::Callable {
            name: unwrap_name(&caps[1]).ok_or_else(|| ParseFailure::new(token))?,
            arity: parse_arity(&caps[2], token)?,
        });
    }

    if let Some(caps) = RE_FUNCTION.captures(token) {
        return Ok(DocObject::FunctionLike {
            name: unwrap_name(&caps[1]).ok_or_else(|| ParseFailure::new(token))?,
            arity: parse_arity(&caps[2], token)?,
        });
    }

    if let Some(caps) = RE_CREF.captures(token) {
        return Ok(DocObject::CReference {
            name: unwrap_name(&caps[1]).ok_or_else(|| ParseFailure::new(token))?,
        });
    }

    Err(ParseFailure::new(token))
}

fn parse_arity(digits: &str, token: &str) -> Result<u32, ParseFailure> {
    digits.parse().map_err(|_| ParseFailure::new(token))
}

/// Strip quoting from a name: `'$x'` → `$x`, `(+)` → `+`.
pub(crate) fn unwrap_name(raw: &str) -> Option<String> {
    let name = if raw.len() >= 2 && raw.starts_with('\'') && raw.ends_with('\'') {
        raw[1..raw.len() - 1].replace("''", "'").replace("\\'", "'")
    } else if raw.len() >= 3 && raw.starts_with('(') && raw.ends_with(')') {
        raw[1..raw.len() - 1].to_string()
    } else {
        raw.to_string()
    };
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}
