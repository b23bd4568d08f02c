//! Pass 2: point links at their documents' new locations.

use rayon::prelude::*;

use super::route::{OldNameIndex, OutputGroup};
use crate::logger::ProgressLine;
use crate::markdown::Document;

/// Rewrite every resolvable link target in every group, groups in parallel.
///
/// Returns the number of targets changed.
pub fn rewrite_links(
    groups: &mut [OutputGroup],
    index: &OldNameIndex,
    progress: Option<&ProgressLine>,
) -> usize {
    groups
        .par_iter_mut()
        .map(|group| {
            let count: usize = group
                .documents
                .iter_mut()
                .map(|doc| rewrite_document(&mut doc.document, index))
                .sum();
            if let Some(p) = progress {
                p.inc("groups");
            }
            count
        })
        .sum()
}

/// Rewrite the link targets of a single document.
pub fn rewrite_document(doc: &mut Document, index: &OldNameIndex) -> usize {
    let mut rewritten = 0;
    doc.for_each_link_mut(|url| {
        if let Some(target) = resolve(index, &**url) {
            *url = target.into();
            rewritten += 1;
        }
    });
    rewritten
}

/// New target for `url`, if it names a known source file.
///
/// `name.md#section` resolves through `name.md` and keeps the fragment.
pub fn resolve(index: &OldNameIndex, url: &str) -> Option<String> {
    if let Some(key) = index.get(url) {
        return Some(key.relative_path());
    }
    let (name, fragment) = url.split_once('#')?;
    if name.is_empty() {
        return None;
    }
    index
        .get(name)
        .map(|key| format!("{}#{fragment}", key.relative_path()))
}
