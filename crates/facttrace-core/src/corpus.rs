//! Case corpus: claim/truth pairs loaded from CSV.
//!
//! Cases get 1-based ids in file order. Columns other than `claim` and
//! `truth` are ignored.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

/// One claim/truth pair from the corpus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseItem {
    /// 1-based position in the corpus
    pub id: usize,
    pub claim: String,
    pub truth: String,
}

/// Errors from loading or querying the corpus.
#[derive(Error, Debug)]
pub enum CorpusError {
    #[error("Case not found: {0}")]
    NotFound(usize),

    #[error("Failed to read corpus: {0}")]
    Io(#[from] io::Error),

    #[error("Malformed corpus row {row}: {source}")]
    Malformed {
        row: usize,
        #[source]
        source: csv::Error,
    },
}

#[derive(Debug, Deserialize)]
struct CaseRow {
    claim: String,
    truth: String,
}

/// Read-only corpus of cases, loaded once.
#[derive(Debug, Clone, Default)]
pub struct CaseCorpus {
    cases: Vec<CaseItem>,
}

impl CaseCorpus {
    /// Build a corpus from in-memory pairs, numbering them from 1.
    pub fn from_pairs<I, C, T>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (C, T)>,
        C: Into<String>,
        T: Into<String>,
    {
        let cases = pairs
            .into_iter()
            .enumerate()
            .map(|(i, (claim, truth))| CaseItem {
                id: i + 1,
                claim: claim.into(),
                truth: truth.into(),
            })
            .collect();
        Self { cases }
    }

    /// Load a corpus from a CSV file with a header row.
    ///
    /// A missing file is not an error: it yields an empty corpus and a warning.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CorpusError> {
        let path = path.as_ref();
        match File::open(path) {
            Ok(file) => {
                let corpus = Self::from_reader(file)?;
                debug!(path = %path.display(), cases = corpus.len(), "Loaded case corpus");
                Ok(corpus)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                warn!(path = %path.display(), "Case corpus not found, starting empty");
                Ok(Self::default())
            }
            Err(e) => Err(CorpusError::Io(e)),
        }
    }

    /// Parse CSV from any reader. Claim and truth values are trimmed.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, CorpusError> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let mut cases = Vec::new();

        for (i, row) in csv_reader.deserialize::<CaseRow>().enumerate() {
            let row = row.map_err(|source| CorpusError::Malformed { row: i + 1, source })?;
            cases.push(CaseItem {
                id: i + 1,
                claim: row.claim.trim().to_string(),
                truth: row.truth.trim().to_string(),
            });
        }

        Ok(Self { cases })
    }

    pub fn list(&self) -> &[CaseItem] {
        &self.cases
    }

    /// Look up a case by its 1-based id. Id 0 is never valid.
    pub fn get(&self, id: usize) -> Result<&CaseItem, CorpusError> {
        id.checked_sub(1)
            .and_then(|i| self.cases.get(i))
            .ok_or(CorpusError::NotFound(id))
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = "claim,truth,source\n\
        \"  Coffee cures cancer. \",\"A study found a weak association.\",paper\n\
        The moon is made of rock.,The moon is mostly rock.,nasa\n";

    #[test]
    fn test_from_reader_assigns_one_based_ids() {
        let corpus = CaseCorpus::from_reader(SAMPLE.as_bytes()).unwrap();
        assert_eq!(corpus.len(), 2);
        assert_eq!(corpus.list()[0].id, 1);
        assert_eq!(corpus.list()[1].id, 2);
        assert_eq!(corpus.list()[0].claim, "Coffee cures cancer.");
    }

    #[test]
    fn test_get_bounds() {
        let corpus = CaseCorpus::from_reader(SAMPLE.as_bytes()).unwrap();
        assert_eq!(corpus.get(2).unwrap().truth, "The moon is mostly rock.");
        assert!(matches!(corpus.get(0), Err(CorpusError::NotFound(0))));
        assert!(matches!(corpus.get(3), Err(CorpusError::NotFound(3))));
    }

    #[test]
    fn test_missing_file_is_empty_corpus() {
        let dir = tempfile::tempdir().unwrap();
        let corpus = CaseCorpus::load(dir.path().join("absent.csv")).unwrap();
        assert!(corpus.is_empty());
        assert!(corpus.get(1).is_err());
    }

    #[test]
    fn test_load_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let corpus = CaseCorpus::load(file.path()).unwrap();
        assert_eq!(corpus.len(), 2);
    }

    #[test]
    fn test_missing_column_is_malformed() {
        let result = CaseCorpus::from_reader("claim\nonly a claim\n".as_bytes());
        assert!(matches!(result, Err(CorpusError::Malformed { row: 1, .. })));
    }

    #[test]
    fn test_from_pairs() {
        let corpus = CaseCorpus::from_pairs([("a", "b"), ("c", "d")]);
        assert_eq!(corpus.get(2).unwrap().claim, "c");
    }
}
