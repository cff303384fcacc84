//! A surface that only records what it was asked to draw.
//!
//! Used headless and in tests to assert on render order.

use qbrowse_core::traits::RenderSurface;
use qbrowse_core::types::{DocId, Document, TagFrequency};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceOp {
    Detail(DocId),
    Clear,
    Append(Vec<DocId>),
    WordList(Vec<String>),
    Status(String),
}

#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub ops: Vec<SurfaceOp>,
}

impl RecordingSurface {
    pub fn new() -> Self { Self::default() }

    /// Ids appended to the list, in order.
    pub fn appended(&self) -> Vec<DocId> {
        self.ops.iter().filter_map(|op| match op { SurfaceOp::Append(ids) => Some(ids.clone()), _ => None }).flatten().collect()
    }

    pub fn last_status(&self) -> Option<&str> {
        self.ops.iter().rev().find_map(|op| match op { SurfaceOp::Status(s) => Some(s.as_str()), _ => None })
    }
}

impl RenderSurface for RecordingSurface {
    fn show_detail(&mut self, doc: &Document) { self.ops.push(SurfaceOp::Detail(doc.id)); }

    fn clear_list(&mut self) { self.ops.push(SurfaceOp::Clear); }

    fn append_list(&mut self, docs: &[Document]) {
        self.ops.push(SurfaceOp::Append(docs.iter().map(|d| d.id).collect()));
    }

    fn show_word_list(&mut self, tags: &[TagFrequency]) {
        self.ops.push(SurfaceOp::WordList(tags.iter().map(|t| t.tag.clone()).collect()));
    }

    fn set_status(&mut self, status: &str) { self.ops.push(SurfaceOp::Status(status.to_string())); }
}
