//! Format-agnostic data model for the documentation index.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// The key of an index record: what a piece of documentation documents.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DocObject {
    /// A section heading. `level` 0 is the whole-document title, keyed by
    /// its local path in `label` rather than by a number.
    Section {
        level: u8,
        number: String,
        label: String,
        file: String,
    },
    /// `Name/Arity`
    Callable { name: String, arity: u32 },
    /// `Name//Arity`, called with two implicit extra arguments.
    DcgCallable { name: String, arity: u32 },
    /// `Module:Inner` where inner is a `Callable` or `DcgCallable`.
    Qualified { module: String, inner: Box<DocObject> },
    /// `f(Name/Arity)`, a C-style function.
    FunctionLike { name: String, arity: u32 },
    /// `c(Name)`, an opaque C symbol.
    CReference { name: String },
}

impl DocObject {
    /// Name of a callable-like object, looking through module qualification.
    pub fn name(&self) -> Option<&str> {
        match self {
            DocObject::Section { .. } => None,
            DocObject::Callable { name, .. }
            | DocObject::DcgCallable { name, .. }
            | DocObject::FunctionLike { name, .. }
            | DocObject::CReference { name } => Some(name),
            DocObject::Qualified { inner, .. } => inner.name(),
        }
    }

    pub fn is_section(&self) -> bool {
        matches!(self, DocObject::Section { .. })
    }
}

impl fmt::Display for DocObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocObject::Section {
                level,
                number,
                label,
                file,
            } => write!(
                f,
                "section({},{},{},{})",
                level,
                crate::store::snapshot::quote_atom(number),
                crate::store::snapshot::quote_atom(label),
                crate::store::snapshot::quote_atom(file)
            ),
            DocObject::Callable { name, arity } => write!(f, "{}/{}", name, arity),
            DocObject::DcgCallable { name, arity } => write!(f, "{}//{}", name, arity),
            DocObject::Qualified { module, inner } => write!(f, "{}:{}", module, inner),
            DocObject::FunctionLike { name, arity } => write!(f, "f({}/{})", name, arity),
            DocObject::CReference { name } => write!(f, "c({})", name),
        }
    }
}

/// Coarse partition of the documentation corpus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Class {
    Manual,
    Packages,
    Misc,
}

impl Class {
    pub const ALL: [Class; 3] = [Class::Manual, Class::Packages, Class::Misc];

    pub fn as_str(self) -> &'static str {
        match self {
            Class::Manual => "manual",
            Class::Packages => "packages",
            Class::Misc => "misc",
        }
    }

    /// Logical namespace that local paths of this class are re-rooted under.
    pub fn namespace(self) -> Option<&'static str> {
        match self {
            Class::Manual => Some("Manual"),
            Class::Packages => Some("packages"),
            Class::Misc => None,
        }
    }
}

impl fmt::Display for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Class {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "manual" => Ok(Class::Manual),
            "packages" => Ok(Class::Packages),
            "misc" => Ok(Class::Misc),
            _ => Err(format!("unknown class: {}. Use manual, packages, or misc", s)),
        }
    }
}

/// One index entry: `object` is documented in `file` at character `offset`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IndexRecord {
    pub object: DocObject,
    /// First sentence of the documentation.
    pub summary: String,
    pub file: PathBuf,
    pub class: Class,
    /// Character position of the documenting element in the decoded file.
    pub offset: usize,
}
