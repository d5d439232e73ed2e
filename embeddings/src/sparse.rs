//! Character n-gram TF-IDF encoder.
//!
//! Mirrors `TfidfVectorizer(analyzer="char", ngram_range=(1, 2))`: text is
//! lowercased, whitespace runs collapse to one space, every character
//! unigram and bigram is a feature, idf is smoothed and rows are
//! L2-normalised.

use crate::error::EmbeddingError;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

const ARTIFACT_MAGIC: [u8; 4] = *b"BNSV";
const ARTIFACT_VERSION: u8 = 1;

/// Row-compressed sparse matrix of `f32` values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SparseMatrix {
    n_cols: usize,
    indptr: Vec<usize>,
    indices: Vec<u32>,
    values: Vec<f32>,
}

impl SparseMatrix {
    /// Empty matrix with `n_cols` columns and no rows
    pub fn new(n_cols: usize) -> Self {
        Self {
            n_cols,
            indptr: vec![0],
            indices: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Append a row given as `(column, value)` pairs sorted by column
    pub fn push_row(&mut self, row: impl IntoIterator<Item = (u32, f32)>) {
        for (column, value) in row {
            self.indices.push(column);
            self.values.push(value);
        }
        self.indptr.push(self.indices.len());
    }

    /// Number of rows
    pub fn rows(&self) -> usize {
        self.indptr.len() - 1
    }

    pub fn n_cols(&self) -> usize {
        self.n_cols
    }

    /// Number of stored entries
    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    /// Column indices and values of row `i`
    pub fn row(&self, i: usize) -> (&[u32], &[f32]) {
        let range = self.indptr[i]..self.indptr[i + 1];
        (&self.indices[range.clone()], &self.values[range])
    }

    /// Dense `[rows × n_cols]` view
    pub fn to_dense(&self) -> Vec<Vec<f32>> {
        (0..self.rows())
            .map(|i| {
                let mut dense = vec![0.0; self.n_cols];
                let (indices, values) = self.row(i);
                for (&column, &value) in indices.iter().zip(values) {
                    dense[column as usize] = value;
                }
                dense
            })
            .collect()
    }

    /// Structural sanity check for matrices read from disk
    pub fn is_well_formed(&self) -> bool {
        self.indptr.first() == Some(&0)
            && self.indptr.last() == Some(&self.indices.len())
            && self.indices.len() == self.values.len()
            && self.indptr.windows(2).all(|w| w[0] <= w[1])
            && self.indices.iter().all(|&c| (c as usize) < self.n_cols)
    }
}

/// Fitted character unigram+bigram TF-IDF vectorizer
#[derive(Debug, Clone, PartialEq)]
pub struct CharNgramVectorizer {
    vocabulary: HashMap<String, u32>,
    idf: Vec<f32>,
}

#[derive(Serialize, Deserialize)]
struct VectorizerArtifact {
    /// Features in column order
    features: Vec<String>,
    idf: Vec<f32>,
}

impl CharNgramVectorizer {
    /// Learn vocabulary and idf weights from `corpus`
    pub fn fit<S: AsRef<str>>(corpus: &[S]) -> Self {
        let mut document_frequency: BTreeMap<String, usize> = BTreeMap::new();
        for text in corpus {
            let distinct: BTreeSet<String> = char_ngrams(text.as_ref()).into_iter().collect();
            for ngram in distinct {
                *document_frequency.entry(ngram).or_default() += 1;
            }
        }

        let n_documents = corpus.len() as f64;
        let mut vocabulary = HashMap::with_capacity(document_frequency.len());
        let mut idf = Vec::with_capacity(document_frequency.len());
        // BTreeMap iterates in sorted order, so the column is the feature rank.
        for (column, (ngram, df)) in document_frequency.into_iter().enumerate() {
            vocabulary.insert(ngram, column as u32);
            idf.push((((1.0 + n_documents) / (1.0 + df as f64)).ln() + 1.0) as f32);
        }

        info!(
            "Fitted character n-gram vectorizer on {} names ({} features)",
            corpus.len(),
            idf.len()
        );
        Self { vocabulary, idf }
    }

    /// Vocabulary size V
    pub fn vocabulary_len(&self) -> usize {
        self.idf.len()
    }

    /// SHA-256 over the features in column order and their idf weights.
    ///
    /// Two vectorizers with equal fingerprints produce identical rows.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        for feature in self.features() {
            hasher.update(feature.as_bytes());
            hasher.update([0x1f]);
        }
        hasher.update([0x1e]);
        for weight in &self.idf {
            hasher.update(weight.to_bits().to_le_bytes());
        }
        format!("{:x}", hasher.finalize())
    }

    /// Features indexed by column
    fn features(&self) -> Vec<&str> {
        let mut features = vec![""; self.idf.len()];
        for (ngram, &column) in &self.vocabulary {
            features[column as usize] = ngram.as_str();
        }
        features
    }

    /// Encode `texts` as rows of a `[texts × V]` sparse matrix
    pub fn transform<S: AsRef<str>>(&self, texts: &[S]) -> SparseMatrix {
        let mut matrix = SparseMatrix::new(self.vocabulary_len());

        for text in texts {
            let mut counts: BTreeMap<u32, u32> = BTreeMap::new();
            for ngram in char_ngrams(text.as_ref()) {
                if let Some(&column) = self.vocabulary.get(&ngram) {
                    *counts.entry(column).or_default() += 1;
                }
            }

            let weighted: Vec<(u32, f32)> = counts
                .into_iter()
                .map(|(column, count)| (column, count as f32 * self.idf[column as usize]))
                .collect();
            let norm = weighted.iter().map(|(_, v)| v * v).sum::<f32>().sqrt();
            if norm > 0.0 {
                matrix.push_row(weighted.into_iter().map(|(c, v)| (c, v / norm)));
            } else {
                matrix.push_row(weighted);
            }
        }

        debug!("Sparse-encoded {} texts", texts.len());
        matrix
    }

    /// Serialize the fitted vectorizer
    pub fn save(&self, mut writer: impl Write) -> Result<(), EmbeddingError> {
        let artifact = VectorizerArtifact {
            features: self.features().into_iter().map(String::from).collect(),
            idf: self.idf.clone(),
        };

        writer.write_all(&ARTIFACT_MAGIC)?;
        writer.write_all(&[ARTIFACT_VERSION])?;
        bincode::serialize_into(&mut writer, &artifact)?;
        writer.flush()?;
        Ok(())
    }

    /// Reconstruct a vectorizer written by [`CharNgramVectorizer::save`]
    pub fn load(mut reader: impl Read) -> Result<Self, EmbeddingError> {
        let mut header = [0u8; 5];
        reader.read_exact(&mut header)?;
        if header[..4] != ARTIFACT_MAGIC {
            return Err(EmbeddingError::InvalidArtifact("bad magic".to_string()));
        }
        if header[4] != ARTIFACT_VERSION {
            return Err(EmbeddingError::InvalidArtifact(format!(
                "unsupported version {} (expected {ARTIFACT_VERSION})",
                header[4]
            )));
        }

        let artifact: VectorizerArtifact = bincode::deserialize_from(reader)?;
        if artifact.features.len() != artifact.idf.len() {
            return Err(EmbeddingError::InvalidArtifact(format!(
                "{} features but {} idf weights",
                artifact.features.len(),
                artifact.idf.len()
            )));
        }

        let vocabulary: HashMap<String, u32> = artifact
            .features
            .into_iter()
            .enumerate()
            .map(|(column, ngram)| (ngram, column as u32))
            .collect();
        if vocabulary.len() != artifact.idf.len() {
            return Err(EmbeddingError::InvalidArtifact(
                "duplicate features".to_string(),
            ));
        }

        Ok(Self {
            vocabulary,
            idf: artifact.idf,
        })
    }

    pub fn save_to_path(&self, path: &Path) -> Result<(), EmbeddingError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = File::create(path)?;
        self.save(BufWriter::new(file))?;
        debug!("Saved sparse encoder to {}", path.display());
        Ok(())
    }

    pub fn load_from_path(path: &Path) -> Result<Self, EmbeddingError> {
        let file = File::open(path)?;
        let vectorizer = Self::load(BufReader::new(file))?;
        debug!(
            "Loaded sparse encoder from {} ({} features)",
            path.display(),
            vectorizer.vocabulary_len()
        );
        Ok(vectorizer)
    }
}

/// Character unigrams followed by bigrams of the lowercased text, with
/// every whitespace run collapsed to one space
fn char_ngrams(text: &str) -> Vec<String> {
    let mut chars: Vec<char> = Vec::with_capacity(text.len());
    for c in text.to_lowercase().chars() {
        if c.is_whitespace() {
            if chars.last() != Some(&' ') {
                chars.push(' ');
            }
        } else {
            chars.push(c);
        }
    }

    let mut ngrams: Vec<String> = chars.iter().map(char::to_string).collect();
    ngrams.extend(chars.windows(2).map(|pair| pair.iter().collect::<String>()));
    ngrams
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn corpus() -> Vec<String> {
        [
            "influenza",
            "influenza human",
            "hypertension",
            "cardiomyopathy",
            "respiratory syncytial virus infections",
        ]
        .into_iter()
        .map(String::from)
        .collect()
    }

    fn dot(a: &SparseMatrix, i: usize, b: &SparseMatrix, j: usize) -> f32 {
        let dense_a = &a.to_dense()[i];
        let dense_b = &b.to_dense()[j];
        dense_a.iter().zip(dense_b).map(|(x, y)| x * y).sum()
    }

    #[test]
    fn test_char_ngrams() {
        assert_eq!(
            char_ngrams("Ab  c"),
            vec!["a", "b", " ", "c", "ab", "b ", " c"]
        );
        assert_eq!(char_ngrams(" x"), vec![" ", "x", " x"]);
        assert!(char_ngrams("").is_empty());
    }

    #[test]
    fn test_vocabulary_is_sorted_and_complete() {
        let vectorizer = CharNgramVectorizer::fit(&["ab", "ba"]);
        // a, b, ab, ba
        assert_eq!(vectorizer.vocabulary_len(), 4);
        assert_eq!(vectorizer.vocabulary["a"], 0);
        assert_eq!(vectorizer.vocabulary["ab"], 1);
        assert_eq!(vectorizer.vocabulary["b"], 2);
        assert_eq!(vectorizer.vocabulary["ba"], 3);
    }

    #[test]
    fn test_smooth_idf() {
        let vectorizer = CharNgramVectorizer::fit(&["ab", "a"]);
        let a = vectorizer.vocabulary["a"] as usize;
        let ab = vectorizer.vocabulary["ab"] as usize;

        assert!((vectorizer.idf[a] - 1.0).abs() < 1e-6);
        assert!((vectorizer.idf[ab] - ((3.0f32 / 2.0).ln() + 1.0)).abs() < 1e-6);
    }

    #[test]
    fn test_rows_are_unit_length() {
        let vectorizer = CharNgramVectorizer::fit(&corpus());
        let matrix = vectorizer.transform(&corpus());

        assert_eq!(matrix.rows(), 5);
        assert_eq!(matrix.n_cols(), vectorizer.vocabulary_len());
        for i in 0..matrix.rows() {
            assert!((dot(&matrix, i, &matrix, i) - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_unknown_ngrams_are_ignored() {
        let vectorizer = CharNgramVectorizer::fit(&["abc"]);
        let matrix = vectorizer.transform(&["xyz", "abz"]);

        assert_eq!(matrix.row(0).0.len(), 0);
        assert_eq!(matrix.to_dense()[0], vec![0.0; vectorizer.vocabulary_len()]);
        // a, b, ab survive
        assert_eq!(matrix.row(1).0.len(), 3);
    }

    #[test]
    fn test_similar_names_score_higher() {
        let vectorizer = CharNgramVectorizer::fit(&corpus());
        let dictionary = vectorizer.transform(&corpus());
        let query = vectorizer.transform(&["influenza in humans"]);

        let scores: Vec<f32> = (0..dictionary.rows())
            .map(|j| dot(&query, 0, &dictionary, j))
            .collect();
        assert!(scores[1] > scores[2]);
        assert!(scores[1] > scores[3]);
    }

    #[test]
    fn test_save_load_round_trip() {
        let vectorizer = CharNgramVectorizer::fit(&corpus());
        let queries = ["influenza", "flu", "heart disease", "RSV"];

        let mut bytes = Vec::new();
        vectorizer.save(&mut bytes).unwrap();
        let restored = CharNgramVectorizer::load(bytes.as_slice()).unwrap();

        assert_eq!(restored, vectorizer);
        assert_eq!(restored.transform(&queries), vectorizer.transform(&queries));
    }

    #[test]
    fn test_path_round_trip() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("models").join("sparse_encoder.bin");
        let vectorizer = CharNgramVectorizer::fit(&corpus());

        vectorizer.save_to_path(&path).unwrap();
        let restored = CharNgramVectorizer::load_from_path(&path).unwrap();

        assert_eq!(restored.transform(&corpus()), vectorizer.transform(&corpus()));
    }

    #[test]
    fn test_fingerprint_tracks_features_and_weights() {
        let ab = CharNgramVectorizer::fit(&["ab"]);
        let ba = CharNgramVectorizer::fit(&["ba"]);
        // same vocabulary size, different features
        assert_eq!(ab.vocabulary_len(), ba.vocabulary_len());
        assert_ne!(ab.fingerprint(), ba.fingerprint());

        let weighted = CharNgramVectorizer::fit(&["ab", "a"]);
        let reweighted = CharNgramVectorizer::fit(&["ab", "a", "b"]);
        assert_eq!(weighted.vocabulary_len(), reweighted.vocabulary_len());
        assert_ne!(weighted.fingerprint(), reweighted.fingerprint());

        let mut bytes = Vec::new();
        ab.save(&mut bytes).unwrap();
        let restored = CharNgramVectorizer::load(bytes.as_slice()).unwrap();
        assert_eq!(restored.fingerprint(), ab.fingerprint());
    }

    #[test]
    fn test_load_rejects_foreign_bytes() {
        let result = CharNgramVectorizer::load(&b"PK\x03\x04 not a vectorizer"[..]);
        assert!(matches!(result, Err(EmbeddingError::InvalidArtifact(_))));
    }

    #[test]
    fn test_sparse_matrix_well_formed() {
        let mut matrix = SparseMatrix::new(3);
        matrix.push_row([(0, 1.0), (2, 0.5)]);
        matrix.push_row(std::iter::empty());
        assert!(matrix.is_well_formed());
        assert_eq!(matrix.nnz(), 2);
        assert_eq!(matrix.to_dense(), vec![vec![1.0, 0.0, 0.5], vec![0.0; 3]]);
    }
}
