//! Index store: the records plus snapshot persistence and queries.

pub mod cache;
pub mod query;
pub mod snapshot;

pub use cache::ManIndex;
pub use query::ObjectPattern;
pub use snapshot::InvalidRecord;

use crate::model::{Class, DocObject, IndexRecord};
use std::collections::BTreeMap;
use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Failure to read or write a snapshot file.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("cannot access snapshot {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{}:{line}: {source}", path.display())]
    Invalid {
        path: PathBuf,
        line: usize,
        #[source]
        source: InvalidRecord,
    },
}

impl SnapshotError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, SnapshotError::Io { source, .. } if source.kind() == io::ErrorKind::NotFound)
    }
}

/// What [`IndexStore::property`] should report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyKind {
    Summary,
    Id,
    Class,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyValue<'a> {
    Summary(&'a str),
    /// Where the documenting element starts
    Id { file: &'a Path, offset: usize },
    Class(Class),
}

/// All index records, in insertion order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct IndexStore {
    records: Vec<IndexRecord>,
}

impl IndexStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: Vec<IndexRecord>) -> Self {
        IndexStore { records }
    }

    pub fn insert(&mut self, record: IndexRecord) {
        self.records.push(record);
    }

    pub fn extend(&mut self, records: impl IntoIterator<Item = IndexRecord>) {
        self.records.extend(records);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[IndexRecord] {
        &self.records
    }

    /// Section records, in insertion order.
    pub fn sections(&self) -> impl Iterator<Item = &IndexRecord> {
        self.records.iter().filter(|record| record.object.is_section())
    }

    /// Drop every record.
    pub fn reset(&mut self) {
        self.records.clear();
    }

    // -- Queries --------------------------------------------------------------

    /// Records whose object matches `pattern`. Each call starts over.
    pub fn find<'a, 'p>(
        &'a self,
        pattern: &'p ObjectPattern,
    ) -> impl Iterator<Item = &'a IndexRecord> + 'p
    where
        'a: 'p,
    {
        self.records
            .iter()
            .filter(move |record| pattern.matches(&record.object))
    }

    /// First record documenting exactly `object`.
    pub fn lookup(&self, object: &DocObject) -> Option<&IndexRecord> {
        self.records.iter().find(|record| &record.object == object)
    }

    pub fn property(&self, object: &DocObject, kind: PropertyKind) -> Option<PropertyValue<'_>> {
        let record = self.lookup(object)?;
        Some(match kind {
            PropertyKind::Summary => PropertyValue::Summary(&record.summary),
            PropertyKind::Id => PropertyValue::Id {
                file: &record.file,
                offset: record.offset,
            },
            PropertyKind::Class => PropertyValue::Class(record.class),
        })
    }

    pub fn summary(&self, object: &DocObject) -> Option<&str> {
        match self.property(object, PropertyKind::Summary)? {
            PropertyValue::Summary(summary) => Some(summary),
            _ => None,
        }
    }

    /// Objects documented in `file`, in document order.
    pub fn objects_in<'a, 'p>(
        &'a self,
        file: &'p Path,
    ) -> impl Iterator<Item = &'a DocObject> + 'p
    where
        'a: 'p,
    {
        self.records
            .iter()
            .filter(move |record| record.file == file)
            .map(|record| &record.object)
    }

    /// Section ids that occur more than once, sorted.
    pub fn check_duplicate_section_ids(&self) -> Vec<String> {
        duplicate_ids(self.records.iter().filter_map(|record| match &record.object {
            DocObject::Section { label, .. } => Some(label.clone()),
            _ => None,
        }))
    }

    // -- Persistence ----------------------------------------------------------

    /// Parse one snapshot line and add the record it describes.
    pub fn validate_and_insert(&mut self, line: &str) -> Result<(), InvalidRecord> {
        let record = snapshot::parse_record(line)?;
        self.insert(record);
        Ok(())
    }

    /// Parse snapshot text. Any bad line rejects the whole snapshot; the
    /// error carries its 1-based line number.
    pub fn read_snapshot(text: &str) -> Result<IndexStore, (usize, InvalidRecord)> {
        let mut store = IndexStore::new();
        for (index, line) in text.lines().enumerate() {
            if snapshot::is_ignorable(line) {
                continue;
            }
            store
                .validate_and_insert(line)
                .map_err(|e| (index + 1, e))?;
        }
        Ok(store)
    }

    pub fn write_snapshot<W: Write>(&self, out: &mut W) -> io::Result<()> {
        for line in snapshot::HEADER {
            writeln!(out, "{}", line)?;
        }
        for record in &self.records {
            writeln!(out, "{}", snapshot::format_record(record))?;
        }
        Ok(())
    }

    pub fn load(path: &Path) -> Result<IndexStore, SnapshotError> {
        let text = fs::read_to_string(path).map_err(|source| SnapshotError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        IndexStore::read_snapshot(&text).map_err(|(line, source)| SnapshotError::Invalid {
            path: path.to_path_buf(),
            line,
            source,
        })
    }

    /// Write the snapshot to a sibling temporary file, then move it in place.
    pub fn persist(&self, path: &Path) -> Result<(), SnapshotError> {
        let io_error = |source| SnapshotError::Io {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_error)?;
        }
        let mut tmp = path.as_os_str().to_owned();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        let written = self
            .write_file(&tmp)
            .and_then(|()| fs::rename(&tmp, path));
        if written.is_err() {
            let _ = fs::remove_file(&tmp);
        }
        written.map_err(io_error)
    }

    fn write_file(&self, path: &Path) -> io::Result<()> {
        let mut out = BufWriter::new(fs::File::create(path)?);
        self.write_snapshot(&mut out)?;
        out.flush()
    }
}

/// Values occurring more than once, each reported once, sorted.
pub fn duplicate_ids(ids: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for id in ids {
        *counts.entry(id).or_default() += 1;
    }
    counts
        .into_iter()
        .filter(|(_, count)| *count > 1)
        .map(|(id, _)| id)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use tempfile::TempDir;

    fn callable(name: &str, arity: u32) -> DocObject {
        DocObject::Callable {
            name: name.into(),
            arity,
        }
    }

    fn section(label: &str) -> DocObject {
        DocObject::Section {
            level: 1,
            number: "1".into(),
            label: label.into(),
            file: "/m/a.html".into(),
        }
    }

    fn rec(object: DocObject, summary: &str, file: &str, offset: usize) -> IndexRecord {
        IndexRecord {
            object,
            summary: summary.into(),
            file: PathBuf::from(file),
            class: Class::Manual,
            offset,
        }
    }

    fn sample() -> IndexStore {
        IndexStore::from_records(vec![
            rec(section("sec:lists"), "Lists", "/m/a.html", 0),
            rec(callable("append", 3), "Join lists.", "/m/a.html", 40),
            rec(callable("append", 2), "Join a list of lists.", "/m/a.html", 90),
            rec(
                DocObject::Qualified {
                    module: "lists".into(),
                    inner: Box::new(callable("last", 2)),
                },
                "Last element.",
                "/m/b.html",
                12,
            ),
            rec(
                DocObject::DcgCallable {
                    name: "phrase".into(),
                    arity: 2,
                },
                "Run a grammar \"body\".",
                "/m/b.html",
                50,
            ),
        ])
    }

    /// Pattern built locally; the record outlives it.
    fn section_named<'a>(store: &'a IndexStore, label: &str) -> Option<&'a IndexRecord> {
        let pattern = ObjectPattern::Section {
            level: None,
            number: None,
            label: Some(label.to_string()),
            file: None,
        };
        let found = store.find(&pattern).next();
        found
    }

    fn objects_in_file<'a>(store: &'a IndexStore, file: &str) -> Vec<&'a DocObject> {
        let path = PathBuf::from(file);
        store.objects_in(&path).collect()
    }

    #[test]
    fn found_records_outlive_pattern() {
        let store = sample();
        let record = section_named(&store, "sec:lists").unwrap();
        assert_eq!(record.summary, "Lists");
        assert!(section_named(&store, "sec:none").is_none());
        assert_eq!(objects_in_file(&store, "/m/a.html").len(), 3);
    }

    #[test]
    fn find_with_wildcards_is_restartable() {
        let store = sample();
        let pattern = ObjectPattern::parse("append/_").unwrap();
        let first: Vec<_> = store.find(&pattern).map(|r| r.offset).collect();
        let again: Vec<_> = store.find(&pattern).map(|r| r.offset).collect();
        assert_eq!(first, vec![40, 90]);
        assert_eq!(first, again);
    }

    #[test]
    fn properties() {
        let store = sample();
        let obj = callable("append", 3);
        assert_eq!(store.summary(&obj), Some("Join lists."));
        assert_eq!(
            store.property(&obj, PropertyKind::Id),
            Some(PropertyValue::Id {
                file: Path::new("/m/a.html"),
                offset: 40
            })
        );
        assert_eq!(
            store.property(&obj, PropertyKind::Class),
            Some(PropertyValue::Class(Class::Manual))
        );
        assert_eq!(store.summary(&callable("append", 9)), None);
    }

    #[test]
    fn objects_in_file_lists_file_objects() {
        let store = sample();
        let objects: Vec<_> = store.objects_in(Path::new("/m/b.html")).collect();
        assert_eq!(objects.len(), 2);
        assert_eq!(store.sections().count(), 1);
    }

    #[test]
    fn snapshot_round_trip() {
        let store = sample();
        let mut out = Vec::new();
        store.write_snapshot(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().take(2).collect::<Vec<_>>(), snapshot::HEADER.to_vec());
        assert_eq!(text.lines().count(), 2 + store.len());

        let mut reread = IndexStore::new();
        for line in text.lines().skip(2) {
            reread.validate_and_insert(line).unwrap();
        }
        let a: HashSet<_> = store.records().iter().collect();
        let b: HashSet<_> = reread.records().iter().collect();
        assert_eq!(a, b);
        assert_eq!(reread, store);
    }

    #[test]
    fn bad_line_rejects_whole_snapshot() {
        let text = format!(
            "{}\n{}\nrecord(a/1, \"x\", 'f', manual, 1).\nrecord(X, \"y\", 'f', manual, 2).\n",
            snapshot::HEADER[0],
            snapshot::HEADER[1]
        );
        let err = IndexStore::read_snapshot(&text).unwrap_err();
        assert_eq!(err, (4, InvalidRecord::Unbound("X".into())));
    }

    #[test]
    fn persist_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/index.db");
        let store = sample();
        store.persist(&path).unwrap();
        assert!(!dir.path().join("nested/index.db.tmp").exists());
        assert_eq!(IndexStore::load(&path).unwrap(), store);
    }

    #[test]
    fn failed_persist_leaves_no_temporary() {
        let dir = TempDir::new().unwrap();
        // The target is a non-empty directory, so the final rename fails
        let path = dir.path().join("index.db");
        fs::create_dir(&path).unwrap();
        fs::write(path.join("keep"), "").unwrap();

        assert!(sample().persist(&path).is_err());
        assert!(!dir.path().join("index.db.tmp").exists());
        assert!(path.join("keep").exists());
    }

    #[test]
    fn load_missing_is_not_found() {
        let dir = TempDir::new().unwrap();
        let err = IndexStore::load(&dir.path().join("absent.db")).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn duplicate_section_ids() {
        let ids = ["a", "a", "b", "c", "c", "c"].map(String::from);
        assert_eq!(duplicate_ids(ids), vec!["a".to_string(), "c".to_string()]);

        let mut store = sample();
        store.insert(rec(section("sec:lists"), "Again", "/m/c.html", 0));
        assert_eq!(store.check_duplicate_section_ids(), vec!["sec:lists".to_string()]);
    }

    #[test]
    fn reset_empties() {
        let mut store = sample();
        store.reset();
        assert!(store.is_empty());
    }
}
