use embedrank_core::{Document, Error, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use tracing::info;

/// Anything able to hand over a finite corpus snapshot.
pub trait CorpusSource {
    fn load(&self) -> Result<Vec<Document>>;
}

/// Reads a corpus exported from a document store.
///
/// Files ending in `.jsonl` or `.ndjson` hold one document per line; anything
/// else is read as a single JSON array of documents.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn is_line_delimited(&self) -> bool {
        matches!(
            self.path.extension().and_then(|e| e.to_str()),
            Some("jsonl") | Some("ndjson")
        )
    }

    fn load_array(&self) -> Result<Vec<Document>> {
        let reader = BufReader::new(File::open(&self.path)?);
        Ok(serde_json::from_reader(reader)?)
    }

    fn load_lines(&self) -> Result<Vec<Document>> {
        let reader = BufReader::new(File::open(&self.path)?);
        let mut documents = Vec::new();
        for (line_no, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let doc: Document = serde_json::from_str(&line).map_err(|e| {
                Error::Serialization(format!("{}:{}: {}", self.path.display(), line_no + 1, e))
            })?;
            documents.push(doc);
        }
        Ok(documents)
    }
}

impl CorpusSource for JsonFileSource {
    fn load(&self) -> Result<Vec<Document>> {
        let documents = if self.is_line_delimited() {
            self.load_lines()?
        } else {
            self.load_array()?
        };
        info!(path = %self.path.display(), documents = documents.len(), "corpus snapshot loaded");
        Ok(documents)
    }
}

/// A corpus already resident in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    documents: Vec<Document>,
}

impl InMemorySource {
    pub fn new(documents: Vec<Document>) -> Self {
        Self { documents }
    }
}

impl CorpusSource for InMemorySource {
    fn load(&self) -> Result<Vec<Document>> {
        Ok(self.documents.clone())
    }
}

impl<S: CorpusSource + ?Sized> CorpusSource for &S {
    fn load(&self) -> Result<Vec<Document>> {
        (**self).load()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedrank_core::{DocumentId, RawEmbedding};
    use std::io::Write;

    #[test]
    fn test_load_json_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corpus.json");
        std::fs::write(
            &path,
            r#"[
                {"id": 1, "text": "alpha", "embedding": [1, 0]},
                {"id": 2, "text": "beta", "embedding": "[0, 1]"},
                {"id": 3, "text": "gamma", "embedding": null}
            ]"#,
        )
        .unwrap();

        let docs = JsonFileSource::new(&path).load().unwrap();
        assert_eq!(docs.len(), 3);
        assert_eq!(docs[1].embedding, RawEmbedding::Encoded("[0, 1]".into()));
        assert!(docs[2].embedding.is_absent());
    }

    #[test]
    fn test_load_jsonl_skips_blank_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corpus.jsonl");
        let mut file = File::create(&path).unwrap();
        writeln!(file, r#"{{"id": "a", "embedding": [0.5]}}"#).unwrap();
        writeln!(file).unwrap();
        writeln!(file, r#"{{"id": "b", "profile_id": 7}}"#).unwrap();

        let docs = JsonFileSource::new(&path).load().unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].id, DocumentId::String("a".into()));
        assert_eq!(docs[1].profile_id.as_deref(), Some("7"));
    }

    #[test]
    fn test_jsonl_error_names_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corpus.ndjson");
        std::fs::write(&path, "{\"id\": 1}\n{\"id\": \n").unwrap();

        match JsonFileSource::new(&path).load() {
            Err(Error::Serialization(msg)) => assert!(msg.contains(":2:"), "{}", msg),
            other => panic!("expected serialization error, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let res = JsonFileSource::new(dir.path().join("missing.json")).load();
        assert!(matches!(res, Err(Error::Io(_))));
    }

    #[test]
    fn test_in_memory_source() {
        let source = InMemorySource::new(vec![Document::new(1, "x", RawEmbedding::Absent)]);
        assert_eq!(source.load().unwrap().len(), 1);
        assert_eq!((&source).load().unwrap().len(), 1);
    }
}
