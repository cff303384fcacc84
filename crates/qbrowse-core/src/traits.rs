use crate::types::{Document, QueryConfig, SearchHit, TagFrequency};

/// Full-text engine the browser registers documents into.
pub trait SearchIndex {
    fn add_document(&mut self, doc: &Document) -> anyhow::Result<()>;
    /// Make added documents visible to `query`.
    fn commit(&mut self) -> anyhow::Result<()> {
        Ok(())
    }
    /// Ranked hits for `term`, best first.
    fn query(&self, term: &str, config: &QueryConfig) -> anyhow::Result<Vec<SearchHit>>;
}

/// Display surface driven by the browser and the render scheduler.
///
/// Implementations own presentation entirely; callers never read back what
/// was drawn.
pub trait RenderSurface {
    /// Single-document detail view.
    fn show_detail(&mut self, doc: &Document);
    fn clear_list(&mut self);
    /// Append to the result list.
    fn append_list(&mut self, docs: &[Document]);
    /// Un-filtered tag list, shown when there is nothing else to list.
    fn show_word_list(&mut self, tags: &[TagFrequency]);
    fn set_status(&mut self, status: &str);
}
