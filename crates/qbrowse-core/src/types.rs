//! Domain types shared by the indexer, the search adapter and the renderer.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub type DocId = u32;

/// Filename reference inside a raw corpus record (`{"filename": ...}`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
}

impl FileRef {
    pub fn new(filename: impl Into<String>) -> Self {
        Self { filename: Some(filename.into()) }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuestionBody {
    /// Tag name -> free-text annotation, in corpus order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Map<String, Value>>,
}

/// One entry of the `questions` array, exactly as it appears on disk.
///
/// Every field is optional here; required fields are validated when the
/// record is turned into a [`Document`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub img: Option<FileRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumb: Option<FileRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question: Option<QuestionBody>,
}

impl RawRecord {
    /// Build a record from an image, a thumbnail and ordered `(tag, value)` pairs.
    pub fn new<I, K, V>(image: &str, thumb: &str, content: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let content = content.into_iter().map(|(k, v)| (k.into(), Value::String(v.into()))).collect();
        Self {
            img: Some(FileRef::new(image)),
            thumb: Some(FileRef::new(thumb)),
            question: Some(QuestionBody { content: Some(content) }),
        }
    }

    pub fn image_filename(&self) -> Option<&str> {
        self.img.as_ref().and_then(|f| f.filename.as_deref())
    }

    pub fn thumb_filename(&self) -> Option<&str> {
        self.thumb.as_ref().and_then(|f| f.filename.as_deref())
    }

    pub fn content(&self) -> Option<&Map<String, Value>> {
        self.question.as_ref().and_then(|q| q.content.as_ref())
    }
}

/// The on-disk corpus document: `{"questions": [...]}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CorpusFile {
    #[serde(default)]
    pub questions: Vec<RawRecord>,
}

/// Renderable reference to a tag. Activating it submits `query` as a search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagLink {
    pub label: String,
    pub query: String,
}

impl TagLink {
    pub fn for_tag(tag: &str) -> Self {
        Self { label: tag.to_string(), query: tag.to_string() }
    }
}

/// One indexed, searchable question.
///
/// - `id`: MurmurHash3 of `image_ref` with the corpus seed
/// - `title`: image filename without its extension
/// - `short_title`: `title` cut down for list rendering
/// - `body`: `"tag : value\n"` lines in record order
/// - `search_terms`: tag names joined by a space
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocId,
    pub title: String,
    pub short_title: String,
    pub body: String,
    pub search_terms: String,
    pub tags: Vec<TagLink>,
    pub image_ref: String,
    pub thumb_ref: String,
}

impl Document {
    pub fn tag_names(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(|t| t.label.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagFrequency {
    pub tag: String,
    pub count: usize,
}

/// Document fields exposed to the search engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchField {
    Title,
    SearchTerms,
    Tags,
}

impl SearchField {
    pub const ALL: [SearchField; 3] = [SearchField::Title, SearchField::SearchTerms, SearchField::Tags];

    pub fn name(self) -> &'static str {
        match self {
            SearchField::Title => "title",
            SearchField::SearchTerms => "search_terms",
            SearchField::Tags => "tags",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldBoost {
    pub field: SearchField,
    pub boost: f32,
}

/// How query tokens are combined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Conjunction {
    #[default]
    And,
    Or,
}

/// Boosted-field query configuration handed to the search index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryConfig {
    pub boosts: Vec<FieldBoost>,
    #[serde(default)]
    pub conjunction: Conjunction,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            boosts: vec![
                FieldBoost { field: SearchField::SearchTerms, boost: 2.0 },
                FieldBoost { field: SearchField::Title, boost: 1.0 },
            ],
            conjunction: Conjunction::And,
        }
    }
}

/// A ranked reference returned by a [`crate::traits::SearchIndex`].
///
/// `score` is engine-specific; hits arrive best first.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub id: DocId,
    pub score: f32,
}
