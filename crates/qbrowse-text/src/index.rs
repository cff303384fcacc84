use anyhow::Result;
use tantivy::collector::TopDocs;
use tantivy::query::QueryParser;
use tantivy::schema::{Field, Schema, Value};
use tantivy::{doc, Index, IndexReader, IndexWriter, ReloadPolicy, TantivyDocument};
use tracing::{debug, info};

use qbrowse_core::traits::SearchIndex;
use qbrowse_core::types::{Conjunction, DocId, Document, QueryConfig, SearchField, SearchHit};

use crate::tantivy_utils::{build_schema, register_tokenizer, ID_FIELD};

const WRITER_MEMORY_BYTES: usize = 50_000_000;

struct IndexFields {
	id: Field,
	title: Field,
	search_terms: Field,
	tags: Field,
}

impl IndexFields {
	fn from_schema(schema: &Schema) -> Result<Self> {
		Ok(Self {
			id: schema.get_field(ID_FIELD)?,
			title: schema.get_field(SearchField::Title.name())?,
			search_terms: schema.get_field(SearchField::SearchTerms.name())?,
			tags: schema.get_field(SearchField::Tags.name())?,
		})
	}

	fn text(&self, field: SearchField) -> Field {
		match field {
			SearchField::Title => self.title,
			SearchField::SearchTerms => self.search_terms,
			SearchField::Tags => self.tags,
		}
	}
}

/// In-memory tantivy index over question documents.
///
/// Added documents become searchable after [`SearchIndex::commit`].
pub struct TantivyIndex {
	index: Index,
	writer: IndexWriter,
	reader: IndexReader,
	fields: IndexFields,
	pending: usize,
}

impl TantivyIndex {
	pub fn new_in_ram() -> Result<Self> {
		let index = Index::create_in_ram(build_schema());
		register_tokenizer(&index);
		let fields = IndexFields::from_schema(&index.schema())?;
		// single writer thread keeps segment order, and so tie ranking, reproducible
		let writer = index.writer_with_num_threads(1, WRITER_MEMORY_BYTES)?;
		let reader = index.reader_builder().reload_policy(ReloadPolicy::Manual).try_into()?;
		Ok(Self { index, writer, reader, fields, pending: 0 })
	}

	/// Build and commit an index holding `docs`.
	pub fn from_documents(docs: &[Document]) -> Result<Self> {
		let mut index = Self::new_in_ram()?;
		for d in docs { index.add_document(d)?; }
		index.commit()?;
		Ok(index)
	}

	pub fn num_docs(&self) -> u64 { self.reader.searcher().num_docs() }

	fn parser(&self, config: &QueryConfig) -> QueryParser {
		let fields: Vec<Field> = config.boosts.iter().map(|b| self.fields.text(b.field)).collect();
		let mut qp = QueryParser::for_index(&self.index, fields);
		for b in &config.boosts { qp.set_field_boost(self.fields.text(b.field), b.boost); }
		if config.conjunction == Conjunction::And { qp.set_conjunction_by_default(); }
		qp
	}
}

impl SearchIndex for TantivyIndex {
	fn add_document(&mut self, d: &Document) -> Result<()> {
		let tags = d.tag_names().collect::<Vec<_>>().join(" ");
		self.writer.add_document(doc!(
			self.fields.id => u64::from(d.id),
			self.fields.title => d.title.clone(),
			self.fields.search_terms => d.search_terms.clone(),
			self.fields.tags => tags,
		))?;
		self.pending += 1;
		Ok(())
	}

	fn commit(&mut self) -> Result<()> {
		self.writer.commit()?;
		self.reader.reload()?;
		info!(added = self.pending, total = self.num_docs(), "search index committed");
		self.pending = 0;
		Ok(())
	}

	fn query(&self, term: &str, config: &QueryConfig) -> Result<Vec<SearchHit>> {
		let searcher = self.reader.searcher();
		let (query, errors) = self.parser(config).parse_query_lenient(term);
		if !errors.is_empty() { debug!(term, ?errors, "query parsed leniently"); }
		let limit = usize::try_from(searcher.num_docs()).unwrap_or(usize::MAX).max(1);
		let top_docs = searcher.search(&query, &TopDocs::with_limit(limit))?;
		let mut hits = Vec::with_capacity(top_docs.len());
		for (score, addr) in top_docs {
			let doc: TantivyDocument = searcher.doc(addr)?;
			let id = doc.get_first(self.fields.id).and_then(|v| v.as_u64()).and_then(|raw| DocId::try_from(raw).ok());
			if let Some(id) = id { hits.push(SearchHit { id, score }); }
		}
		Ok(hits)
	}
}
