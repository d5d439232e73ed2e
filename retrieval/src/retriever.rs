use crate::error::Result;
use crate::exact::ExactStringMatchRetriever;
use crate::hybrid::HybridRetriever;
use bionel_document::PredictionSet;

/// Candidate generation strategy used by the linker
pub enum EntityRetriever {
    ExactMatch(ExactStringMatchRetriever),
    Hybrid(HybridRetriever),
}

impl EntityRetriever {
    /// Up to `top_k` candidates per mention, best first
    pub fn search(&self, mentions: &[String], top_k: usize) -> Result<Vec<PredictionSet>> {
        match self {
            EntityRetriever::ExactMatch(retriever) => Ok(retriever.search(mentions, top_k)),
            EntityRetriever::Hybrid(retriever) => retriever.search(mentions, top_k),
        }
    }
}

impl From<ExactStringMatchRetriever> for EntityRetriever {
    fn from(retriever: ExactStringMatchRetriever) -> Self {
        EntityRetriever::ExactMatch(retriever)
    }
}

impl From<HybridRetriever> for EntityRetriever {
    fn from(retriever: HybridRetriever) -> Self {
        EntityRetriever::Hybrid(retriever)
    }
}
