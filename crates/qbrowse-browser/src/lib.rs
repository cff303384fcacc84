//! qbrowse-browser
//!
//! Application context tying the pieces together: the indexed corpus, a
//! search index, the incremental renderer and the display surface. One
//! `Browser` owns everything a session needs; nothing is global.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::rc::Rc;

use anyhow::Result;
use tracing::{info, warn};

use qbrowse_core::autocomplete::prefix_matches;
use qbrowse_core::config::{resolve_with_base, Settings};
use qbrowse_core::corpus::{CorpusBuild, CorpusIndexer};
use qbrowse_core::traits::{RenderSurface, SearchIndex};
use qbrowse_core::types::{DocId, Document, QueryConfig, TagFrequency, TagLink};
use qbrowse_render::{RenderJobHandle, RenderScheduler};
use qbrowse_text::TantivyIndex;

/// What a keystroke in the search box produced.
pub struct InputOutcome {
    pub suggestions: Vec<String>,
    /// Set when the input was long enough to run a full search.
    pub job: Option<RenderJobHandle>,
}

pub struct Browser<I, S>
where
    I: SearchIndex,
    S: RenderSurface,
{
    documents: Vec<Document>,
    by_id: HashMap<DocId, usize>,
    tag_frequencies: Vec<TagFrequency>,
    tag_names: Vec<String>,
    index: I,
    scheduler: RenderScheduler<S>,
    query: QueryConfig,
    suggestion_limit: usize,
    min_query_len: usize,
}

impl<S: RenderSurface + 'static> Browser<TantivyIndex, S> {
    /// Build the configured corpus file into a RAM tantivy index.
    ///
    /// A relative `corpus.data_json` is resolved against `base_dir`.
    pub fn from_settings(settings: &Settings, base_dir: &Path, surface: Rc<RefCell<S>>) -> Result<Self> {
        let path = resolve_with_base(base_dir, &settings.corpus.data_json);
        let build = CorpusIndexer::with_config(settings.indexing()).build_from_file(&path)?;
        info!(path = %path.display(), documents = build.documents.len(), "corpus loaded");
        Self::open(build, TantivyIndex::new_in_ram()?, surface, settings)
    }
}

impl<I, S> Browser<I, S>
where
    I: SearchIndex,
    S: RenderSurface + 'static,
{
    /// Register every document with `index` and draw the start screen:
    /// the first document in detail and the full tag list.
    pub fn open(build: CorpusBuild, mut index: I, surface: Rc<RefCell<S>>, settings: &Settings) -> Result<Self> {
        let tag_names = build.tag_names();
        let CorpusBuild { documents, tag_frequencies, skipped } = build;
        if !skipped.is_empty() { warn!(skipped = skipped.len(), "corpus contained malformed records"); }

        let mut by_id = HashMap::with_capacity(documents.len());
        for (pos, doc) in documents.iter().enumerate() {
            index.add_document(doc)?;
            // ids are not collision-checked; the first document keeps the id
            by_id.entry(doc.id).or_insert(pos);
        }
        index.commit()?;

        let scheduler = RenderScheduler::new(surface, settings.render.chunk_size).with_fallback(tag_frequencies.clone());
        {
            let mut s = scheduler.surface().borrow_mut();
            if let Some(first) = documents.first() { s.show_detail(first); }
            s.show_word_list(&tag_frequencies);
        }
        Ok(Self {
            documents,
            by_id,
            tag_frequencies,
            tag_names,
            index,
            scheduler,
            query: settings.query.clone(),
            suggestion_limit: settings.autocomplete.limit,
            min_query_len: settings.autocomplete.min_query_len,
        })
    }

    pub fn documents(&self) -> &[Document] { &self.documents }

    pub fn tag_frequencies(&self) -> &[TagFrequency] { &self.tag_frequencies }

    pub fn document(&self, id: DocId) -> Option<&Document> {
        self.by_id.get(&id).map(|&pos| &self.documents[pos])
    }

    /// Tag suggestions for the text typed so far, most frequent first.
    pub fn suggest(&self, prefix: &str) -> Vec<String> {
        prefix_matches(prefix.trim(), &self.tag_names, self.suggestion_limit)
    }

    /// Documents matching `term`, in the index's ranking order.
    ///
    /// Each id appears once: documents sharing an id resolve to the one that
    /// kept it, at the rank of its best hit.
    pub fn query(&self, term: &str) -> Result<Vec<Document>> {
        let hits = self.index.query(term, &self.query)?;
        let mut seen = HashSet::with_capacity(hits.len());
        Ok(hits.iter().filter(|h| seen.insert(h.id)).filter_map(|h| self.document(h.id)).cloned().collect())
    }

    /// Run a full search and start rendering its results.
    pub fn search(&self, term: &str) -> Result<RenderJobHandle> {
        let term = term.trim();
        let results = self.query(term)?;
        info!(term, results = results.len(), "search");
        Ok(self.scheduler.start(results, term))
    }

    /// Handle a change of the search box contents.
    pub fn on_input(&self, text: &str) -> Result<InputOutcome> {
        let suggestions = self.suggest(text);
        let job = if text.trim().chars().count() >= self.min_query_len { Some(self.search(text)?) } else { None };
        Ok(InputOutcome { suggestions, job })
    }

    /// A tag link was clicked.
    pub fn activate(&self, link: &TagLink) -> Result<RenderJobHandle> {
        self.search(&link.query)
    }

    /// Show one document in the detail view. Returns `false` for unknown ids.
    pub fn select(&self, id: DocId) -> bool {
        match self.document(id) {
            Some(doc) => {
                self.scheduler.surface().borrow_mut().show_detail(doc);
                true
            }
            None => {
                warn!(id, "selected document is not in the corpus");
                false
            }
        }
    }

    /// Stop any running render and go back to the full tag list.
    pub fn clear(&self) {
        self.scheduler.cancel();
        let mut s = self.scheduler.surface().borrow_mut();
        s.show_word_list(&self.tag_frequencies);
        s.set_status("");
    }
}
