//! Corpus indexing: raw records in, normalized documents and tag frequencies out.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::error::Result;
use crate::hash::stable_id;
use crate::types::{Document, RawRecord, TagFrequency, TagLink};

/// Extensions stripped from image filenames to form titles (compared case-insensitively).
pub const IMAGE_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

pub const DEFAULT_SHORT_TITLE_WIDTH: usize = 20;

#[derive(Debug, Clone, Copy)]
pub struct IndexingConfig {
    /// Maximum characters kept in `Document::short_title`.
    pub short_title_width: usize,
}

impl Default for IndexingConfig {
    fn default() -> Self {
        Self { short_title_width: DEFAULT_SHORT_TITLE_WIDTH }
    }
}

/// A record that was left out of the build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedRecord {
    pub index: usize,
    pub reason: String,
}

#[derive(Debug, Clone, Default)]
pub struct CorpusBuild {
    pub documents: Vec<Document>,
    /// Most frequent first; ties keep discovery order.
    pub tag_frequencies: Vec<TagFrequency>,
    pub skipped: Vec<MalformedRecord>,
}

impl CorpusBuild {
    /// Tags in frequency order, as offered by autocomplete.
    pub fn tag_names(&self) -> Vec<String> {
        self.tag_frequencies.iter().map(|t| t.tag.clone()).collect()
    }
}

#[derive(Deserialize)]
struct LooseCorpus {
    #[serde(default)]
    questions: Vec<Value>,
}

#[derive(Default)]
pub struct CorpusIndexer {
    config: IndexingConfig,
}

impl CorpusIndexer {
    pub fn new() -> Self { Self::default() }

    pub fn with_config(config: IndexingConfig) -> Self { Self { config } }

    /// Build documents and tag frequencies from already-decoded records.
    pub fn build(&self, records: &[RawRecord]) -> CorpusBuild {
        let mut out = CorpusBuild::default();
        for (index, record) in records.iter().enumerate() {
            match self.document(index, record) {
                Ok(doc) => out.documents.push(doc),
                Err(m) => {
                    warn!(index = m.index, reason = %m.reason, "skipping malformed corpus record");
                    out.skipped.push(m);
                }
            }
        }
        out.tag_frequencies = tag_frequencies(out.documents.iter().map(Document::tag_names));
        info!(
            documents = out.documents.len(),
            tags = out.tag_frequencies.len(),
            skipped = out.skipped.len(),
            "corpus built"
        );
        out
    }

    /// Build from a `{"questions": [...]}` JSON document.
    ///
    /// Only invalid top-level JSON is an error; a record that fails to decode
    /// is skipped like any other malformed record.
    pub fn build_from_json(&self, json: &str) -> Result<CorpusBuild> {
        let loose: LooseCorpus = serde_json::from_str(json)?;
        let mut records = Vec::with_capacity(loose.questions.len());
        let mut undecodable = Vec::new();
        for (index, value) in loose.questions.into_iter().enumerate() {
            match serde_json::from_value::<RawRecord>(value) {
                Ok(r) => records.push((index, r)),
                Err(e) => undecodable.push(MalformedRecord { index, reason: e.to_string() }),
            }
        }

        // Decoded records keep their original positions in skip reports.
        let positions: Vec<usize> = records.iter().map(|(i, _)| *i).collect();
        let records: Vec<RawRecord> = records.into_iter().map(|(_, r)| r).collect();
        let mut build = self.build(&records);
        for m in &mut build.skipped { m.index = positions[m.index]; }
        for m in undecodable {
            warn!(index = m.index, reason = %m.reason, "skipping undecodable corpus record");
            build.skipped.push(m);
        }
        build.skipped.sort_by_key(|m| m.index);
        Ok(build)
    }

    pub fn build_from_file(&self, path: &Path) -> Result<CorpusBuild> {
        let json = std::fs::read_to_string(path)?;
        self.build_from_json(&json)
    }

    fn document(&self, index: usize, record: &RawRecord) -> std::result::Result<Document, MalformedRecord> {
        let malformed = |reason: &str| MalformedRecord { index, reason: reason.to_string() };
        let image = record.image_filename().filter(|f| !f.is_empty()).ok_or_else(|| malformed("missing image filename"))?;
        let content = record.content().ok_or_else(|| malformed("missing question content"))?;

        let mut body = String::new();
        for (tag, value) in content {
            body.push_str(&format!("{} : {}\n", tag, value_text(value)));
        }
        let title = strip_image_extension(image).to_string();
        Ok(Document {
            id: stable_id(image),
            short_title: short_title(&title, self.config.short_title_width),
            title,
            body,
            search_terms: content.keys().map(String::as_str).collect::<Vec<_>>().join(" "),
            tags: content.keys().map(|k| TagLink::for_tag(k)).collect(),
            image_ref: image.to_string(),
            thumb_ref: record.thumb_filename().unwrap_or_default().to_string(),
        })
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Count tag occurrences across documents in one pass.
///
/// Each inner iterator is one document's tag set. The result is sorted by
/// count descending; equal counts stay in the order tags were first seen.
pub fn tag_frequencies<'a, D, T>(tag_sets: D) -> Vec<TagFrequency>
where
    D: IntoIterator<Item = T>,
    T: IntoIterator<Item = &'a str>,
{
    let mut slots: HashMap<&'a str, usize> = HashMap::new();
    let mut counts: Vec<TagFrequency> = Vec::new();
    for tags in tag_sets {
        for tag in tags {
            let slot = *slots.entry(tag).or_insert_with(|| {
                counts.push(TagFrequency { tag: tag.to_string(), count: 0 });
                counts.len() - 1
            });
            counts[slot].count += 1;
        }
    }
    // stable: ties keep discovery order
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts
}

/// `IMG_01.JPG` -> `IMG_01`. Names without a known image extension are returned unchanged.
pub fn strip_image_extension(filename: &str) -> &str {
    match filename.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && IMAGE_EXTENSIONS.iter().any(|e| ext.eq_ignore_ascii_case(e)) => stem,
        _ => filename,
    }
}

/// Fit `title` into `width` characters. A cut title ends in an ellipsis,
/// which counts toward the width.
pub fn short_title(title: &str, width: usize) -> String {
    if title.chars().count() <= width {
        return title.to_string();
    }
    let mut s: String = title.chars().take(width.saturating_sub(1)).collect();
    s.push('…');
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_known_extensions_only() {
        assert_eq!(strip_image_extension("IMG_0001.JPG"), "IMG_0001");
        assert_eq!(strip_image_extension("beach.jpeg"), "beach");
        assert_eq!(strip_image_extension("scan.Png"), "scan");
        assert_eq!(strip_image_extension("notes.txt"), "notes.txt");
        assert_eq!(strip_image_extension("archive.tar.jpg"), "archive.tar");
        assert_eq!(strip_image_extension(".jpg"), ".jpg");
        assert_eq!(strip_image_extension("noext"), "noext");
    }

    #[test]
    fn short_title_keeps_short_names() {
        assert_eq!(short_title("IMG_0001", 20), "IMG_0001");
        assert_eq!(short_title("abcd", 4), "abcd");
        assert_eq!(short_title("", 4), "");
    }

    #[test]
    fn short_title_ellipsis_fits_width() {
        let cut = short_title("abcdefghij", 4);
        assert_eq!(cut, "abc…");
        assert_eq!(cut.chars().count(), 4);
        assert_eq!(short_title("abcdefghij", 1), "…");
    }

    #[test]
    fn frequencies_break_ties_by_discovery() {
        let sets = vec![vec!["dog", "cat"], vec!["cat", "bird"], vec!["bird", "fish"]];
        let freq = tag_frequencies(sets);
        let got: Vec<(&str, usize)> = freq.iter().map(|f| (f.tag.as_str(), f.count)).collect();
        assert_eq!(got, vec![("cat", 2), ("bird", 2), ("dog", 1), ("fish", 1)]);
    }

    #[test]
    fn frequencies_of_nothing() {
        let sets: Vec<Vec<&str>> = vec![];
        assert!(tag_frequencies(sets).is_empty());
    }
}
