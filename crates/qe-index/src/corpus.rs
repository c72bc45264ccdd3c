//! JSON Lines corpus loading.
//!
//! Each non-blank line is one [`Document`]: `{"id": "...", "<field>": "<text>"}`.

use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use tracing::debug;

use crate::{Analyzer, Document, IndexError, MemoryIndex, MemoryIndexWriter};

/// Reads every document of a JSON Lines corpus.
pub fn read_documents(path: &Path) -> Result<Vec<Document>, IndexError> {
    let reader = BufReader::new(File::open(path)?);
    let mut docs = Vec::new();

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let doc = serde_json::from_str(&line).map_err(|e| IndexError::Corpus {
            path: path.to_path_buf(),
            line: index + 1,
            message: e.to_string(),
        })?;
        docs.push(doc);
    }

    Ok(docs)
}

/// Loads a JSON Lines corpus into a [`MemoryIndex`].
pub fn load_corpus(path: &Path, analyzer: Analyzer) -> Result<MemoryIndex, IndexError> {
    let docs = read_documents(path)?;
    let mut writer = MemoryIndexWriter::new(analyzer);
    for doc in &docs {
        writer.add_document(doc)?;
    }
    debug!(target: "qe::index", path = %path.display(), documents = docs.len(), "loaded corpus");
    Ok(writer.commit())
}
