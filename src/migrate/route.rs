//! Destination identity and the shared classification maps.
//!
//! ```text
//! pass 1 (parallel)          seal (barrier)          pass 2 / emit
//! Catalog ─ register() ─▶ Catalog::seal() ─▶ Sealed { groups, index }
//!   index:  DashMap            sorted Vec           OldNameIndex (read-only)
//!   groups: DashMap                                 Vec<OutputGroup> (owned)
//! ```

use std::fmt;
use std::path::{Component, Path, PathBuf};

use dashmap::DashMap;
use rustc_hash::FxHashMap;

use crate::markdown::Document;

/// Normalized destination of a document: `bucket/file_name`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RouteKey {
    pub file_name: String,
    pub bucket: String,
}

impl RouteKey {
    pub fn new(file_name: impl Into<String>, bucket: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            bucket: bucket.into(),
        }
    }

    /// Link target relative to the output root.
    pub fn relative_path(&self) -> String {
        if self.bucket.is_empty() {
            self.file_name.clone()
        } else {
            format!("{}/{}", self.bucket, self.file_name)
        }
    }

    /// File path under `root`.
    pub fn output_path(&self, root: &Path) -> PathBuf {
        root.join(&self.bucket).join(&self.file_name)
    }

    /// Whether both parts are single plain path segments, so the output
    /// path always stays directly under the root's bucket directory.
    pub fn is_contained(&self) -> bool {
        is_plain_segment(&self.file_name)
            && (self.bucket.is_empty() || is_plain_segment(&self.bucket))
    }

    fn sort_key(&self) -> (&str, &str) {
        (&self.bucket, &self.file_name)
    }
}

fn is_plain_segment(segment: &str) -> bool {
    let mut components = Path::new(segment).components();
    !segment.contains(['/', '\\'])
        && matches!(components.next(), Some(Component::Normal(_)))
        && components.next().is_none()
}

impl fmt::Display for RouteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.relative_path())
    }
}

/// A parsed document and the source file it came from.
#[derive(Debug, Clone)]
pub struct ClassifiedDoc {
    pub source: PathBuf,
    pub document: Document,
}

/// All documents sharing one destination file.
#[derive(Debug, Clone)]
pub struct OutputGroup {
    pub key: RouteKey,
    pub documents: Vec<ClassifiedDoc>,
}

/// Old file name → new location. Read-only once sealed.
#[derive(Debug, Clone, Default)]
pub struct OldNameIndex {
    map: FxHashMap<String, RouteKey>,
}

impl OldNameIndex {
    pub fn get(&self, old_name: &str) -> Option<&RouteKey> {
        self.map.get(old_name)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Entries sorted by old name.
    pub fn sorted(&self) -> Vec<(&str, &RouteKey)> {
        let mut entries: Vec<_> = self
            .map
            .iter()
            .map(|(name, key)| (name.as_str(), key))
            .collect();
        entries.sort_unstable_by(|a, b| a.0.cmp(b.0));
        entries
    }
}

impl FromIterator<(String, RouteKey)> for OldNameIndex {
    fn from_iter<I: IntoIterator<Item = (String, RouteKey)>>(iter: I) -> Self {
        Self {
            map: iter.into_iter().collect(),
        }
    }
}

/// Shared state of the classification pass.
///
/// Both maps take concurrent inserts: the index keeps the first route
/// registered for a name, groups collect every document.
#[derive(Debug, Default)]
pub struct Catalog {
    index: DashMap<String, RouteKey>,
    groups: DashMap<RouteKey, Vec<ClassifiedDoc>>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `doc` under `key`, and `old_name -> key` unless the name is taken.
    pub fn register(&self, old_name: &str, key: RouteKey, doc: ClassifiedDoc) {
        // Group first: a key visible in the index always has a group
        self.groups.entry(key.clone()).or_default().push(doc);
        self.index.entry(old_name.to_string()).or_insert(key);
    }

    /// Number of distinct old names registered.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// End the classification pass.
    ///
    /// Groups are ordered by `(bucket, file_name)` and documents inside a
    /// group by source path, so merged output is deterministic.
    pub fn seal(self) -> Sealed {
        let mut groups: Vec<_> = self
            .groups
            .into_iter()
            .map(|(key, mut documents)| {
                documents.sort_by(|a, b| a.source.cmp(&b.source));
                OutputGroup { key, documents }
            })
            .collect();
        groups.sort_by(|a, b| a.key.sort_key().cmp(&b.key.sort_key()));

        Sealed {
            groups,
            index: self.index.into_iter().collect(),
        }
    }
}

/// Classification result, ready for link rewriting and emission.
#[derive(Debug, Clone)]
pub struct Sealed {
    pub groups: Vec<OutputGroup>,
    pub index: OldNameIndex,
}

impl Sealed {
    pub fn document_count(&self) -> usize {
        self.groups.iter().map(|g| g.documents.len()).sum()
    }

    /// Groups holding more than one source document.
    pub fn merged_groups(&self) -> impl Iterator<Item = &OutputGroup> {
        self.groups.iter().filter(|g| g.documents.len() > 1)
    }

    pub fn group(&self, key: &RouteKey) -> Option<&OutputGroup> {
        self.groups.iter().find(|g| &g.key == key)
    }
}
