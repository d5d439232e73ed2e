//! Persisted dictionary embeddings.
//!
//! A bundle file is the 4-byte magic `BNEB`, a one-byte format version and
//! a bincode payload holding a [`BundleHeader`] and the matrices.

use crate::error::{Result, VectorStoreError};
use crate::matrix::{DenseMatrix, SimilarityMetric};
use bionel_embeddings::SparseMatrix;
use log::warn;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::Path;

const BUNDLE_MAGIC: [u8; 4] = *b"BNEB";
pub const BUNDLE_FORMAT_VERSION: u8 = 2;

/// What a bundle was computed from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundleHeader {
    pub model_id: String,
    pub dictionary_id: String,
    /// SHA-256 of the dictionary entries the rows were computed from
    pub dictionary_fingerprint: String,
    pub metric: SimilarityMetric,
    /// N
    pub rows: usize,
    /// D
    pub dense_dim: usize,
    /// V, when sparse embeddings are present
    pub sparse_vocabulary: Option<usize>,
    /// Fingerprint of the sparse encoder that produced the sparse rows
    pub sparse_fingerprint: Option<String>,
}

/// Dense (and optionally sparse) embeddings of every dictionary name.
///
/// Row `i` of both matrices belongs to dictionary entry `i`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingBundle {
    header: BundleHeader,
    dense: DenseMatrix,
    sparse: Option<SparseMatrix>,
}

impl EmbeddingBundle {
    /// `sparse` pairs the sparse rows with the fingerprint of the encoder
    /// that computed them.
    pub fn new(
        model_id: impl Into<String>,
        dictionary_id: impl Into<String>,
        dictionary_fingerprint: impl Into<String>,
        metric: SimilarityMetric,
        dense: DenseMatrix,
        sparse: Option<(SparseMatrix, String)>,
    ) -> Result<Self> {
        let (sparse, sparse_fingerprint) = sparse.unzip();
        if let Some(sparse) = &sparse {
            if sparse.rows() != dense.rows() {
                return Err(VectorStoreError::Build(format!(
                    "{} dense rows but {} sparse rows",
                    dense.rows(),
                    sparse.rows()
                )));
            }
        }

        let header = BundleHeader {
            model_id: model_id.into(),
            dictionary_id: dictionary_id.into(),
            dictionary_fingerprint: dictionary_fingerprint.into(),
            metric,
            rows: dense.rows(),
            dense_dim: dense.dim(),
            sparse_vocabulary: sparse.as_ref().map(SparseMatrix::n_cols),
            sparse_fingerprint,
        };
        Ok(Self {
            header,
            dense,
            sparse,
        })
    }

    pub fn header(&self) -> &BundleHeader {
        &self.header
    }

    pub fn dense(&self) -> &DenseMatrix {
        &self.dense
    }

    pub fn sparse(&self) -> Option<&SparseMatrix> {
        self.sparse.as_ref()
    }

    pub fn rows(&self) -> usize {
        self.header.rows
    }

    pub(crate) fn into_parts(self) -> (BundleHeader, DenseMatrix, Option<SparseMatrix>) {
        (self.header, self.dense, self.sparse)
    }

    /// Write to `path` via a temporary sibling file and rename
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut data = Vec::new();
        data.extend_from_slice(&BUNDLE_MAGIC);
        data.push(BUNDLE_FORMAT_VERSION);
        bincode::serialize_into(&mut data, self)?;

        let tmp_path = path.with_extension("tmp");
        {
            let mut file = fs::File::create(&tmp_path)?;
            file.write_all(&data)?;
            file.sync_all()?;
        }
        fs::rename(&tmp_path, path)?;
        Ok(())
    }

    /// Read a bundle written by [`EmbeddingBundle::save`]
    pub fn load(path: &Path) -> Result<Self> {
        let data = fs::read(path)?;
        if data.len() < BUNDLE_MAGIC.len() + 1 || data[..BUNDLE_MAGIC.len()] != BUNDLE_MAGIC {
            return Err(VectorStoreError::InvalidArtifact("bad magic".to_string()));
        }
        let version = data[BUNDLE_MAGIC.len()];
        if version != BUNDLE_FORMAT_VERSION {
            return Err(VectorStoreError::InvalidArtifact(format!(
                "format version {version}, expected {BUNDLE_FORMAT_VERSION}"
            )));
        }

        let bundle: Self = bincode::deserialize(&data[BUNDLE_MAGIC.len() + 1..])?;
        bundle.check_consistency()?;
        Ok(bundle)
    }

    /// Like [`EmbeddingBundle::load`], but a missing or unreadable file is
    /// `None`. Unreadable files are logged and removed.
    pub fn load_if_present(path: &Path) -> Option<Self> {
        if !path.exists() {
            return None;
        }
        match Self::load(path) {
            Ok(bundle) => Some(bundle),
            Err(err) => {
                warn!(
                    "embedding bundle at {} is unreadable ({err}); rebuilding",
                    path.display()
                );
                if let Err(remove_err) = fs::remove_file(path) {
                    warn!(
                        "failed to remove unreadable bundle {}: {remove_err}",
                        path.display()
                    );
                }
                None
            }
        }
    }

    fn check_consistency(&self) -> Result<()> {
        let header = &self.header;
        if !self.dense.is_well_formed()
            || self.dense.rows() != header.rows
            || self.dense.dim() != header.dense_dim
        {
            return Err(VectorStoreError::InvalidArtifact(
                "dense matrix does not match header".to_string(),
            ));
        }
        match (&self.sparse, header.sparse_vocabulary, &header.sparse_fingerprint) {
            (None, None, None) => Ok(()),
            (Some(sparse), Some(vocabulary), Some(_))
                if sparse.is_well_formed()
                    && sparse.rows() == header.rows
                    && sparse.n_cols() == vocabulary =>
            {
                Ok(())
            }
            _ => Err(VectorStoreError::InvalidArtifact(
                "sparse matrix does not match header".to_string(),
            )),
        }
    }
}
