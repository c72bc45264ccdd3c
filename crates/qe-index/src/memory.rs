//! In-memory positional index.
//!
//! Documents are analyzed once by [`MemoryIndexWriter`] and frozen into a
//! [`MemoryIndex`], which serves every [`IndexReader`] request from memory.
//! Internal docids are assigned in insertion order starting at 0.

use std::collections::{BTreeMap, HashMap};

use qe_query::Analyze;
use tracing::debug;

use crate::{
    Analyzer, DocId, Document, FieldStats, IndexError, IndexReader, InvertedList, TermVector,
    TermVectorEntry,
};

/// Postings, lengths and term vectors of one field.
#[derive(Debug)]
struct FieldIndex {
    /// Field name.
    name: String,
    /// Term to postings.
    postings: HashMap<String, InvertedList>,
    /// Token count of every document with a non-empty field.
    doc_lengths: HashMap<DocId, u64>,
    /// Per-document `(stem, tf)` pairs, sorted by stem.
    vectors: HashMap<DocId, Vec<(String, u32)>>,
    /// Sum of all document lengths.
    total_terms: u64,
}

impl FieldIndex {
    /// Creates an empty field.
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            postings: HashMap::new(),
            doc_lengths: HashMap::new(),
            vectors: HashMap::new(),
            total_terms: 0,
        }
    }

    /// Adds one analyzed document field.
    fn add(
        &mut self,
        docid: DocId,
        terms: BTreeMap<String, Vec<u32>>,
        length: u64,
    ) -> Result<(), IndexError> {
        self.total_terms += length;
        self.doc_lengths.insert(docid, length);
        self.vectors.insert(
            docid,
            terms
                .iter()
                .map(|(term, positions)| (term.clone(), positions.len() as u32))
                .collect(),
        );
        for (term, positions) in terms {
            self.postings
                .entry(term)
                .or_insert_with(|| InvertedList::new(self.name.as_str()))
                .append_posting(docid, positions)?;
        }
        Ok(())
    }
}

/// Analyzes documents into a [`MemoryIndex`].
#[derive(Debug)]
pub struct MemoryIndexWriter {
    /// Analyzer applied to every field.
    analyzer: Analyzer,
    /// External ids by internal docid.
    external_ids: Vec<String>,
    /// Internal docid by external id.
    internal_ids: HashMap<String, DocId>,
    /// Field name to field data.
    fields: BTreeMap<String, FieldIndex>,
}

impl MemoryIndexWriter {
    /// Creates an empty writer.
    pub fn new(analyzer: Analyzer) -> Self {
        Self {
            analyzer,
            external_ids: Vec::new(),
            internal_ids: HashMap::new(),
            fields: BTreeMap::new(),
        }
    }

    /// Analyzes and adds a document, returning its internal id.
    pub fn add_document(&mut self, doc: &Document) -> Result<DocId, IndexError> {
        if self.internal_ids.contains_key(&doc.id) {
            return Err(IndexError::DuplicateDocument(doc.id.clone()));
        }
        let docid = self.external_ids.len() as DocId;

        for (name, text) in &doc.fields {
            let tokens = self.analyzer.tokens(text);
            if tokens.is_empty() {
                continue;
            }
            let length = tokens.len() as u64;
            let mut terms: BTreeMap<String, Vec<u32>> = BTreeMap::new();
            for token in tokens {
                terms.entry(token.term).or_default().push(token.position);
            }
            self.fields
                .entry(name.clone())
                .or_insert_with(|| FieldIndex::new(name))
                .add(docid, terms, length)?;
        }

        self.external_ids.push(doc.id.clone());
        self.internal_ids.insert(doc.id.clone(), docid);
        Ok(docid)
    }

    /// Freezes the writer into a readable index.
    pub fn commit(self) -> MemoryIndex {
        debug!(
            target: "qe::index",
            documents = self.external_ids.len(),
            fields = self.fields.len(),
            "committed in-memory index"
        );
        MemoryIndex {
            analyzer: self.analyzer,
            external_ids: self.external_ids,
            internal_ids: self.internal_ids,
            fields: self.fields,
        }
    }
}

/// Immutable in-memory index.
#[derive(Debug)]
pub struct MemoryIndex {
    /// Analyzer used at indexing time, reused for queries.
    analyzer: Analyzer,
    /// External ids by internal docid.
    external_ids: Vec<String>,
    /// Internal docid by external id.
    internal_ids: HashMap<String, DocId>,
    /// Field name to field data.
    fields: BTreeMap<String, FieldIndex>,
}

impl MemoryIndex {
    /// Builds an index from documents in order.
    pub fn from_documents<'a>(
        analyzer: Analyzer,
        docs: impl IntoIterator<Item = &'a Document>,
    ) -> Result<Self, IndexError> {
        let mut writer = MemoryIndexWriter::new(analyzer);
        for doc in docs {
            writer.add_document(doc)?;
        }
        Ok(writer.commit())
    }

    /// Returns the analyzer shared by indexing and queries.
    pub fn analyzer(&self) -> &Analyzer {
        &self.analyzer
    }

    /// Names of all fields with at least one token.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Fails unless `docid` names a document.
    fn check_docid(&self, docid: DocId) -> Result<(), IndexError> {
        if (docid as usize) < self.external_ids.len() {
            Ok(())
        } else {
            Err(IndexError::UnknownDocument(docid))
        }
    }
}

impl Analyze for MemoryIndex {
    fn analyze(&self, text: &str) -> Vec<String> {
        self.analyzer.analyze(text)
    }
}

impl IndexReader for MemoryIndex {
    fn inverted_list(&self, term: &str, field: &str) -> InvertedList {
        self.fields
            .get(field)
            .and_then(|f| f.postings.get(term))
            .cloned()
            .unwrap_or_else(|| InvertedList::new(field))
    }

    fn term_vector(&self, docid: DocId, field: &str) -> Result<TermVector, IndexError> {
        self.check_docid(docid)?;
        let Some(index) = self.fields.get(field) else {
            return Ok(TermVector::default());
        };
        let entries = index
            .vectors
            .get(&docid)
            .map(|terms| {
                terms
                    .iter()
                    .map(|(stem, tf)| {
                        let list = index.postings.get(stem);
                        TermVectorEntry {
                            stem: stem.clone(),
                            tf: *tf,
                            df: list.map_or(0, InvertedList::df),
                            ctf: list.map_or(0, InvertedList::ctf),
                        }
                    })
                    .collect()
            })
            .unwrap_or_default();
        Ok(TermVector { entries })
    }

    fn doc_length(&self, field: &str, docid: DocId) -> Result<u64, IndexError> {
        self.check_docid(docid)?;
        Ok(self
            .fields
            .get(field)
            .and_then(|f| f.doc_lengths.get(&docid))
            .copied()
            .unwrap_or(0))
    }

    fn field_stats(&self, field: &str) -> FieldStats {
        self.fields
            .get(field)
            .map(|f| FieldStats {
                total_term_occurrences: f.total_terms,
                doc_count: f.doc_lengths.len() as u64,
            })
            .unwrap_or_default()
    }

    fn num_docs(&self) -> u64 {
        self.external_ids.len() as u64
    }

    fn external_id(&self, docid: DocId) -> Result<&str, IndexError> {
        self.external_ids
            .get(docid as usize)
            .map(String::as_str)
            .ok_or(IndexError::UnknownDocument(docid))
    }

    fn internal_id(&self, external_id: &str) -> Result<DocId, IndexError> {
        self.internal_ids
            .get(external_id)
            .copied()
            .ok_or_else(|| IndexError::ExternalIdNotFound(external_id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Posting;

    fn index() -> MemoryIndex {
        let docs = [
            Document::new("a")
                .with_field("body", "zebra lion zebra")
                .with_field("title", "Zebras"),
            Document::new("b").with_field("body", "the lion"),
            Document::new("c").with_field("title", "tiger"),
        ];
        MemoryIndex::from_documents(Analyzer::default(), &docs).unwrap()
    }

    #[test]
    fn inverted_lists_hold_positions() {
        let index = index();
        let list = index.inverted_list("zebra", "body");
        assert_eq!(list.postings(), &[Posting::new(0, vec![0, 2])]);
        assert_eq!(list.ctf(), 2);

        let lion = index.inverted_list("lion", "body");
        assert_eq!(lion.postings(), &[Posting::new(0, vec![1]), Posting::new(1, vec![1])]);
    }

    #[test]
    fn unseen_terms_give_empty_lists() {
        let index = index();
        let list = index.inverted_list("giraffe", "body");
        assert!(list.is_empty());
        assert_eq!(list.field(), "body");
        assert!(index.inverted_list("zebra", "nowhere").is_empty());
    }

    #[test]
    fn lengths_and_statistics() {
        let index = index();
        assert_eq!(index.doc_length("body", 0).unwrap(), 3);
        assert_eq!(index.doc_length("body", 1).unwrap(), 1);
        assert_eq!(index.doc_length("body", 2).unwrap(), 0);
        assert!(matches!(
            index.doc_length("body", 9),
            Err(IndexError::UnknownDocument(9))
        ));

        let stats = index.field_stats("body");
        assert_eq!(stats.total_term_occurrences, 4);
        assert_eq!(stats.doc_count, 2);
        assert_eq!(stats.average_length(), 2.0);
        assert_eq!(index.field_stats("missing"), FieldStats::default());
        assert_eq!(index.num_docs(), 3);
    }

    #[test]
    fn term_vectors_carry_collection_statistics() {
        let index = index();
        let vector = index.term_vector(0, "body").unwrap();
        let stems: Vec<&str> = vector.entries.iter().map(|e| e.stem.as_str()).collect();
        assert_eq!(stems, vec!["lion", "zebra"]);

        let lion = vector.get("lion").unwrap();
        assert_eq!((lion.tf, lion.df, lion.ctf), (1, 2, 2));
        assert!(index.term_vector(2, "body").unwrap().entries.is_empty());
    }

    #[test]
    fn id_mapping() {
        let index = index();
        assert_eq!(index.external_id(1).unwrap(), "b");
        assert_eq!(index.internal_id("c").unwrap(), 2);
        assert!(matches!(
            index.internal_id("zz"),
            Err(IndexError::ExternalIdNotFound(ref id)) if id == "zz"
        ));
    }

    #[test]
    fn duplicate_ids_rejected() {
        let mut writer = MemoryIndexWriter::new(Analyzer::default());
        writer.add_document(&Document::new("a")).unwrap();
        assert!(matches!(
            writer.add_document(&Document::new("a")),
            Err(IndexError::DuplicateDocument(_))
        ));
    }

    #[test]
    fn queries_use_the_index_analyzer() {
        assert_eq!(index().analyze("Zebras"), vec!["zebra".to_string()]);
    }
}
