//! Corpus assembly from an image folder.
//!
//! Every image with a sibling `<stem>.txt` tag file (one tag per line) becomes
//! a record. Thumbnails are expected under `thumbs/<stem>.THUMB.JPG` next to
//! the image; a record whose thumbnail is missing is written without one.
//! Images without a readable tag file are not part of the corpus.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::corpus::IMAGE_EXTENSIONS;
use crate::error::Result;
use crate::types::{CorpusFile, RawRecord};

pub const THUMB_DIR: &str = "thumbs";
pub const THUMB_SUFFIX: &str = ".THUMB.JPG";

#[derive(Debug, Clone, Copy, Default)]
pub struct ScanOptions {
    /// Descend into subfolders.
    pub recurse: bool,
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| IMAGE_EXTENSIONS.iter().any(|known| ext.eq_ignore_ascii_case(known)))
}

fn relative_ref(path: &Path, root: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.components().map(|c| c.as_os_str().to_string_lossy()).collect::<Vec<_>>().join("/")
}

/// Read a tag file: trimmed, non-empty lines, first occurrence wins.
pub fn read_tags(path: &Path) -> Result<Vec<String>> {
    let text = fs::read_to_string(path)?;
    let mut tags: Vec<String> = Vec::new();
    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if !tags.iter().any(|t| t == line) { tags.push(line.to_string()); }
    }
    Ok(tags)
}

pub fn scan_image_dir(root: &Path, options: ScanOptions) -> Result<Vec<RawRecord>> {
    let max_depth = if options.recurse { usize::MAX } else { 1 };
    let walker = WalkDir::new(root)
        .max_depth(max_depth)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !(e.file_type().is_dir() && e.file_name() == std::ffi::OsStr::new(THUMB_DIR)));

    let mut records = Vec::new();
    for entry in walker.filter_map(|e| e.ok()).filter(|e| e.file_type().is_file()) {
        let path = entry.path();
        if !is_image(path) { continue; }
        let tag_file = path.with_extension("txt");
        if !tag_file.is_file() {
            debug!(image = %path.display(), "no tag file, skipping");
            continue;
        }
        let tags = match read_tags(&tag_file) {
            Ok(tags) => tags,
            Err(e) => {
                warn!(tag_file = %tag_file.display(), error = %e, "skipping unreadable tag file");
                continue;
            }
        };
        let stem = path.file_stem().map(|s| s.to_string_lossy().to_string()).unwrap_or_default();
        let thumb: PathBuf = path.parent().unwrap_or(root).join(THUMB_DIR).join(format!("{}{}", stem, THUMB_SUFFIX));
        let mut record = RawRecord::new(
            &relative_ref(path, root),
            &relative_ref(&thumb, root),
            tags.into_iter().map(|t| (t, String::new())),
        );
        if !thumb.is_file() {
            warn!(image = %path.display(), thumb = %thumb.display(), "thumbnail missing, writing record without one");
            record.thumb = None;
        }
        records.push(record);
    }
    info!(root = %root.display(), records = records.len(), "scanned image folder");
    Ok(records)
}

/// Write records as a `{"questions": [...]}` corpus file.
pub fn write_corpus(path: &Path, records: Vec<RawRecord>) -> Result<()> {
    let json = serde_json::to_string_pretty(&CorpusFile { questions: records })?;
    fs::write(path, json)?;
    Ok(())
}
