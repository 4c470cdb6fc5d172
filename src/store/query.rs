//! Structural patterns over documentation objects.
//!
//! A pattern mirrors [`DocObject`] with every field optional; `None`
//! matches anything.

use crate::ident::{unwrap_name, ParseFailure};
use crate::model::DocObject;
use regex::Regex;
use std::sync::LazyLock;

static RE_QUALIFIED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([a-z][A-Za-z0-9_]*|_):(\S.*)$").unwrap());

static RE_DCG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\S+)//([0-9]+|_)$").unwrap());

static RE_CALLABLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\S+)/([0-9]+|_)$").unwrap());

static RE_FUNCTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^f\((\S+)/([0-9]+|_)\)$").unwrap());

static RE_CREF: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^c\((\S+)\)$").unwrap());

static RE_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\S+$").unwrap());

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectPattern {
    Any,
    /// A callable-like object with this name in any form, or a section
    /// with this label.
    Named(String),
    Section {
        level: Option<u8>,
        number: Option<String>,
        label: Option<String>,
        file: Option<String>,
    },
    Callable {
        name: Option<String>,
        arity: Option<u32>,
    },
    DcgCallable {
        name: Option<String>,
        arity: Option<u32>,
    },
    Qualified {
        module: Option<String>,
        inner: Box<ObjectPattern>,
    },
    FunctionLike {
        name: Option<String>,
        arity: Option<u32>,
    },
    CReference {
        name: Option<String>,
    },
}

impl ObjectPattern {
    /// Pattern matching exactly `object`.
    pub fn exact(object: &DocObject) -> Self {
        match object.clone() {
            DocObject::Section {
                level,
                number,
                label,
                file,
            } => ObjectPattern::Section {
                level: Some(level),
                number: Some(number),
                label: Some(label),
                file: Some(file),
            },
            DocObject::Callable { name, arity } => ObjectPattern::Callable {
                name: Some(name),
                arity: Some(arity),
            },
            DocObject::DcgCallable { name, arity } => ObjectPattern::DcgCallable {
                name: Some(name),
                arity: Some(arity),
            },
            DocObject::Qualified { module, inner } => ObjectPattern::Qualified {
                module: Some(module),
                inner: Box::new(ObjectPattern::exact(&inner)),
            },
            DocObject::FunctionLike { name, arity } => ObjectPattern::FunctionLike {
                name: Some(name),
                arity: Some(arity),
            },
            DocObject::CReference { name } => ObjectPattern::CReference { name: Some(name) },
        }
    }

    /// Sections at `level` (any level when `None`).
    pub fn sections(level: Option<u8>) -> Self {
        ObjectPattern::Section {
            level,
            number: None,
            label: None,
            file: None,
        }
    }

    pub fn matches(&self, object: &DocObject) -> bool {
        match (self, object) {
            (ObjectPattern::Any, _) => true,
            (ObjectPattern::Named(n), DocObject::Section { label, .. }) => n == label,
            (ObjectPattern::Named(n), _) => object.name() == Some(n.as_str()),
            (
                ObjectPattern::Section {
                    level,
                    number,
                    label,
                    file,
                },
                DocObject::Section {
                    level: l,
                    number: nr,
                    label: lb,
                    file: f,
                },
            ) => field(level, l) && field(number, nr) && field(label, lb) && field(file, f),
            (ObjectPattern::Callable { name, arity }, DocObject::Callable { name: n, arity: a })
            | (
                ObjectPattern::DcgCallable { name, arity },
                DocObject::DcgCallable { name: n, arity: a },
            )
            | (
                ObjectPattern::FunctionLike { name, arity },
                DocObject::FunctionLike { name: n, arity: a },
            ) => field(name, n) && field(arity, a),
            (
                ObjectPattern::Qualified { module, inner },
                DocObject::Qualified {
                    module: m,
                    inner: i,
                },
            ) => field(module, m) && inner.matches(i),
            (ObjectPattern::CReference { name }, DocObject::CReference { name: n }) => {
                field(name, n)
            }
            _ => false,
        }
    }

    /// Parse a pattern: identifier syntax with `_` as a per-field wildcard
    /// (`append/_`, `_:member/2`). A bare word is [`ObjectPattern::Named`];
    /// `_` alone is [`ObjectPattern::Any`].
    pub fn parse(text: &str) -> Result<Self, ParseFailure> {
        let text = text.trim();
        let fail = || ParseFailure {
            token: text.to_string(),
        };

        if text == "_" {
            return Ok(ObjectPattern::Any);
        }

        // `sec:lists` is not qualified; it falls through to a section name.
        if let Some(caps) = RE_QUALIFIED.captures(text) {
            if let Ok(
                inner @ (ObjectPattern::Any
                | ObjectPattern::Callable { .. }
                | ObjectPattern::DcgCallable { .. }),
            ) = ObjectPattern::parse(&caps[2])
            {
                return Ok(ObjectPattern::Qualified {
                    module: wildcard(&caps[1]).map(str::to_string),
                    inner: Box::new(inner),
                });
            }
        }

        if let Some(caps) = RE_DCG.captures(text) {
            return Ok(ObjectPattern::DcgCallable {
                name: pattern_name(&caps[1]).ok_or_else(fail)?,
                arity: pattern_arity(&caps[2]).ok_or_else(fail)?,
            });
        }

        if let Some(caps) = RE_CALLABLE.captures(text) {
            return Ok(ObjectPattern::Callable {
                name: pattern_name(&caps[1]).ok_or_else(fail)?,
                arity: pattern_arity(&caps[2]).ok_or_else(fail)?,
            });
        }

        if let Some(caps) = RE_FUNCTION.captures(text) {
            return Ok(ObjectPattern::FunctionLike {
                name: pattern_name(&caps[1]).ok_or_else(fail)?,
                arity: pattern_arity(&caps[2]).ok_or_else(fail)?,
            });
        }

        if let Some(caps) = RE_CREF.captures(text) {
            return Ok(ObjectPattern::CReference {
                name: pattern_name(&caps[1]).ok_or_else(fail)?,
            });
        }

        if RE_WORD.is_match(text) {
            return Ok(ObjectPattern::Named(text.to_string()));
        }

        Err(fail())
    }
}

impl From<&DocObject> for ObjectPattern {
    fn from(object: &DocObject) -> Self {
        ObjectPattern::exact(object)
    }
}

fn field<T: PartialEq>(pattern: &Option<T>, value: &T) -> bool {
    pattern.as_ref().map_or(true, |p| p == value)
}

fn wildcard(raw: &str) -> Option<&str> {
    if raw == "_" {
        None
    } else {
        Some(raw)
    }
}

/// `Some(None)` for a wildcard, `None` when the name is unusable.
fn pattern_name(raw: &str) -> Option<Option<String>> {
    match wildcard(raw) {
        None => Some(None),
        Some(name) => unwrap_name(name).map(Some),
    }
}

fn pattern_arity(raw: &str) -> Option<Option<u32>> {
    match wildcard(raw) {
        None => Some(None),
        Some(digits) => digits.parse().ok().map(Some),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn append3() -> DocObject {
        DocObject::Callable {
            name: "append".into(),
            arity: 3,
        }
    }

    fn lists_append3() -> DocObject {
        DocObject::Qualified {
            module: "lists".into(),
            inner: Box::new(append3()),
        }
    }

    #[test]
    fn exact_matches_only_itself() {
        let p = ObjectPattern::exact(&append3());
        assert!(p.matches(&append3()));
        assert!(!p.matches(&lists_append3()));
        assert!(!p.matches(&DocObject::DcgCallable {
            name: "append".into(),
            arity: 3
        }));
    }

    #[test]
    fn wildcard_arity() {
        let p = ObjectPattern::parse("append/_").unwrap();
        assert!(p.matches(&append3()));
        assert!(p.matches(&DocObject::Callable {
            name: "append".into(),
            arity: 2
        }));
        assert!(!p.matches(&lists_append3()));
    }

    #[test]
    fn wildcard_module() {
        let p = ObjectPattern::parse("_:append/3").unwrap();
        assert!(p.matches(&lists_append3()));
        assert!(!p.matches(&append3()));
        assert!(ObjectPattern::parse("lists:_").unwrap().matches(&lists_append3()));
    }

    #[test]
    fn named_matches_any_form() {
        let p = ObjectPattern::parse("append").unwrap();
        assert_eq!(p, ObjectPattern::Named("append".into()));
        assert!(p.matches(&append3()));
        assert!(p.matches(&lists_append3()));
        assert!(p.matches(&DocObject::Section {
            level: 2,
            number: "1".into(),
            label: "append".into(),
            file: "x".into()
        }));
        assert!(!p.matches(&DocObject::CReference {
            name: "PL_append".into()
        }));
    }

    #[test]
    fn section_level_pattern() {
        let top = DocObject::Section {
            level: 0,
            number: "0".into(),
            label: "Manual/index.html".into(),
            file: "/m/index.html".into(),
        };
        assert!(ObjectPattern::sections(Some(0)).matches(&top));
        assert!(ObjectPattern::sections(None).matches(&top));
        assert!(!ObjectPattern::sections(Some(1)).matches(&top));
        assert!(!ObjectPattern::sections(None).matches(&append3()));
    }

    #[test]
    fn parse_other_forms() {
        assert_eq!(
            ObjectPattern::parse("phrase//_").unwrap(),
            ObjectPattern::DcgCallable {
                name: Some("phrase".into()),
                arity: None
            }
        );
        assert_eq!(
            ObjectPattern::parse("f(_/1)").unwrap(),
            ObjectPattern::FunctionLike {
                name: None,
                arity: Some(1)
            }
        );
        assert_eq!(
            ObjectPattern::parse("c(_)").unwrap(),
            ObjectPattern::CReference { name: None }
        );
        assert_eq!(ObjectPattern::parse("_").unwrap(), ObjectPattern::Any);
        assert!(ObjectPattern::parse("two words").is_err());
        assert_eq!(
            ObjectPattern::parse("sec:lists").unwrap(),
            ObjectPattern::Named("sec:lists".into())
        );
        assert!(ObjectPattern::parse("lists:two words").is_err());
    }
}
