use std::collections::BTreeSet;

use crate::error::ReportError;
use crate::project::CanonicalRecord;
use crate::roster::RosterEntry;

/// Append-only collection of normalized source keys, filled file by file.
#[derive(Debug, Default)]
pub struct KeyCollector {
    keys: BTreeSet<String>,
    files: usize,
    records: usize,
}

impl KeyCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one file's surviving records. Files with no records do not count
    /// as usable sources. Returns the number of keys not seen before.
    pub fn add_file(&mut self, records: &[CanonicalRecord]) -> usize {
        if records.is_empty() {
            return 0;
        }
        self.files += 1;
        self.records += records.len();
        let before = self.keys.len();
        self.keys.extend(records.iter().filter_map(CanonicalRecord::registro_key));
        self.keys.len() - before
    }

    /// Stop collecting; the returned set is read-only.
    pub fn freeze(self) -> SourceKeys {
        SourceKeys {
            keys: self.keys,
            files: self.files,
            records: self.records,
        }
    }
}

/// Frozen union of keys from every usable source file.
#[derive(Debug, Clone, Default)]
pub struct SourceKeys {
    keys: BTreeSet<String>,
    files: usize,
    records: usize,
}

impl SourceKeys {
    pub fn contains(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Number of files that contributed records.
    pub fn file_count(&self) -> usize {
        self.files
    }

    pub fn record_count(&self) -> usize {
        self.records
    }
}

impl<K: Into<String>> FromIterator<K> for SourceKeys {
    /// Treat the keys as one already-normalized source file.
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let keys: BTreeSet<String> = iter.into_iter().map(Into::into).collect();
        let records = keys.len();
        Self {
            files: usize::from(records > 0),
            keys,
            records,
        }
    }
}

/// Roster entries whose key appears in `sources`, in roster order.
pub fn match_roster(
    roster: &[RosterEntry],
    sources: &SourceKeys,
) -> Result<Vec<RosterEntry>, ReportError> {
    if sources.file_count() == 0 {
        return Err(ReportError::EmptySourceSet);
    }
    Ok(roster
        .iter()
        .filter(|entry| entry.key.as_deref().is_some_and(|k| sources.contains(k)))
        .cloned()
        .collect())
}
