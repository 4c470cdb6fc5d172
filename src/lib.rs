//! manindex: index HTML reference manuals by documented object.
//!
//! Pages are streamed through a lenient markup reader; public definition
//! terms (`dt.pubdef`), their descriptions, document titles and section
//! headings become [`IndexRecord`]s. The resulting [`IndexStore`] is
//! persisted as a line-oriented snapshot and queried with
//! [`ObjectPattern`]s.
//!
//! ```no_run
//! use manindex::{IndexConfig, ManIndex, ObjectPattern, TracingDiagnostics, Class};
//! use std::sync::Arc;
//!
//! let config = IndexConfig::default().with_root(Class::Manual, "/usr/lib/swipl/doc/Manual");
//! let index = ManIndex::new(config, Arc::new(TracingDiagnostics));
//! let store = index.load_or_build();
//! let pattern = ObjectPattern::parse("append/_").unwrap();
//! for record in store.find(&pattern) {
//!     println!("{}: {}", record.object, record.summary);
//! }
//! ```

pub mod config;
pub mod diag;
pub mod driver;
pub mod extract;
pub mod ident;
pub mod indexer;
pub mod markup;
pub mod model;
pub mod store;

pub use config::{IndexConfig, ManualRoot};
pub use diag::{CollectedDiagnostics, Diagnostics, TracingDiagnostics};
pub use ident::{parse_identifier, ParseFailure};
pub use model::{Class, DocObject, IndexRecord};
pub use store::{
    IndexStore, InvalidRecord, ManIndex, ObjectPattern, PropertyKind, PropertyValue,
    SnapshotError,
};
