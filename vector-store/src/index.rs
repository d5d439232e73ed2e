use crate::bundle::{BundleHeader, EmbeddingBundle};
use crate::error::Result;
use crate::flat::FlatIpIndex;
use crate::matrix::{DenseMatrix, SimilarityMetric};
use crate::sparse_index::SparseIndex;
use bionel_dictionary::{Dictionary, DictionaryEntry};
use bionel_embeddings::{CharNgramVectorizer, DenseEncoder, ProgressCallback, SparseMatrix};
use bionel_preprocess::Preprocessor;
use log::{info, warn};
use std::path::{Path, PathBuf};

/// Subdirectory of the cache root holding embedding bundles
pub const DATASETS_DIR: &str = "datasets";

const CACHE_KEY_PREFIX: &str = "bio_nen";

/// Parameters for [`DictionaryIndex::build_or_load`]
#[derive(Clone)]
pub struct IndexRequest {
    pub cache_root: PathBuf,
    pub metric: SimilarityMetric,
    /// Names per dense encoder call
    pub batch_size: usize,
    pub progress: Option<ProgressCallback>,
}

impl IndexRequest {
    pub fn new(cache_root: impl Into<PathBuf>) -> Self {
        Self {
            cache_root: cache_root.into(),
            metric: SimilarityMetric::default(),
            batch_size: bionel_embeddings::DEFAULT_BATCH_SIZE,
            progress: None,
        }
    }
}

/// Searchable embeddings of a whole dictionary.
///
/// Owns the dictionary entries so rows can be mapped back to concepts.
pub struct DictionaryIndex {
    dictionary: Dictionary,
    header: BundleHeader,
    dense: FlatIpIndex,
    sparse: Option<SparseMatrix>,
    sparse_index: Option<SparseIndex>,
}

impl DictionaryIndex {
    /// Load the cached bundle for `(dense_encoder, dictionary)` or compute
    /// and persist a new one.
    ///
    /// Sparse embeddings are computed and required only when
    /// `sparse_encoder` is given.
    pub fn build_or_load(
        request: &IndexRequest,
        dictionary: Dictionary,
        preprocessor: &Preprocessor,
        dense_encoder: &dyn DenseEncoder,
        sparse_encoder: Option<&CharNgramVectorizer>,
    ) -> Result<Self> {
        let path = bundle_path(
            &request.cache_root,
            dense_encoder.model_id(),
            dictionary.id(),
        );

        let cached = EmbeddingBundle::load_if_present(&path).filter(|bundle| {
            let stale = stale_reason(
                bundle.header(),
                request,
                &dictionary,
                dense_encoder,
                sparse_encoder,
            );
            match stale {
                Some(reason) => {
                    warn!(
                        "Cached embeddings {} are stale ({reason}); rebuilding",
                        path.display()
                    );
                    false
                }
                None => true,
            }
        });

        let bundle = match cached {
            Some(bundle) => {
                info!("Loaded cached dictionary embeddings from {}", path.display());
                bundle
            }
            None => {
                let bundle = compute_bundle(
                    request,
                    &dictionary,
                    preprocessor,
                    dense_encoder,
                    sparse_encoder,
                )?;
                bundle.save(&path)?;
                info!("Cached dictionary embeddings to {}", path.display());
                bundle
            }
        };

        let (header, mut dense, sparse) = bundle.into_parts();
        if request.metric == SimilarityMetric::Cosine {
            dense.l2_normalize_rows();
        }
        let sparse = sparse_encoder.and(sparse);
        let sparse_index = sparse.as_ref().map(SparseIndex::new);

        Ok(Self {
            dictionary,
            header,
            dense: FlatIpIndex::new(dense),
            sparse,
            sparse_index,
        })
    }

    pub fn dictionary(&self) -> &Dictionary {
        &self.dictionary
    }

    pub fn entries(&self) -> &[DictionaryEntry] {
        self.dictionary.entries()
    }

    pub fn entry(&self, row: usize) -> Option<&DictionaryEntry> {
        self.dictionary.entry(row)
    }

    pub fn header(&self) -> &BundleHeader {
        &self.header
    }

    pub fn metric(&self) -> SimilarityMetric {
        self.header.metric
    }

    pub fn dense_index(&self) -> &FlatIpIndex {
        &self.dense
    }

    pub fn sparse_matrix(&self) -> Option<&SparseMatrix> {
        self.sparse.as_ref()
    }

    pub fn sparse_index(&self) -> Option<&SparseIndex> {
        self.sparse_index.as_ref()
    }

    pub fn len(&self) -> usize {
        self.dictionary.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dictionary.is_empty()
    }
}

/// `<cache_root>/datasets/bio_nen_<model>_<dictionary>.bin`
pub fn bundle_path(cache_root: &Path, model_id: &str, dictionary_id: &str) -> PathBuf {
    let key = format!(
        "{CACHE_KEY_PREFIX}_{}_{}",
        sanitize(basename(model_id)),
        sanitize(basename(dictionary_id))
    );
    cache_root.join(DATASETS_DIR).join(format!("{key}.bin"))
}

fn basename(id: &str) -> &str {
    id.trim_end_matches(['/', '\\'])
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(id)
}

fn sanitize(component: &str) -> String {
    component
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

fn stale_reason(
    header: &BundleHeader,
    request: &IndexRequest,
    dictionary: &Dictionary,
    dense_encoder: &dyn DenseEncoder,
    sparse_encoder: Option<&CharNgramVectorizer>,
) -> Option<String> {
    if header.model_id != dense_encoder.model_id() {
        return Some(format!("built with model {}", header.model_id));
    }
    if header.dictionary_id != dictionary.id() {
        return Some(format!("built from dictionary {}", header.dictionary_id));
    }
    if header.dictionary_fingerprint != dictionary.fingerprint() || header.rows != dictionary.len()
    {
        return Some("dictionary contents changed".to_string());
    }
    if header.metric != request.metric {
        return Some(format!("built for metric {}", header.metric));
    }
    if header.dense_dim != dense_encoder.dimension() {
        return Some(format!("dense dimension {}", header.dense_dim));
    }
    if let Some(encoder) = sparse_encoder {
        if header.sparse_vocabulary != Some(encoder.vocabulary_len())
            || header.sparse_fingerprint.as_deref() != Some(encoder.fingerprint().as_str())
        {
            return Some("sparse embeddings missing or from another encoder".to_string());
        }
    }
    None
}

fn compute_bundle(
    request: &IndexRequest,
    dictionary: &Dictionary,
    preprocessor: &Preprocessor,
    dense_encoder: &dyn DenseEncoder,
    sparse_encoder: Option<&CharNgramVectorizer>,
) -> Result<EmbeddingBundle> {
    info!(
        "Computing embeddings for {} names of dictionary {} with {}",
        dictionary.len(),
        dictionary.id(),
        dense_encoder.model_id()
    );

    let names: Vec<String> = dictionary
        .names()
        .map(|name| preprocessor.process_entry(name))
        .collect();

    let dense_rows =
        dense_encoder.embed(&names, request.batch_size, request.progress.as_ref())?;
    let dense = DenseMatrix::from_rows(dense_encoder.dimension(), dense_rows)?;
    let sparse = sparse_encoder
        .map(|encoder| (encoder.transform(&names), encoder.fingerprint()));

    EmbeddingBundle::new(
        dense_encoder.model_id(),
        dictionary.id(),
        dictionary.fingerprint(),
        request.metric,
        dense,
        sparse,
    )
}
