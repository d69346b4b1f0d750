use crate::normalizer::normalize;
use crate::segmenter::{JiebaSegmenter, Segmenter};
use crate::table::{FrequencyTable, TokenCount};

pub const DEFAULT_TOP_K: usize = 20;

/// Full frequency table plus its top-k view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ranking {
    pub table: FrequencyTable,
    pub top: Vec<TokenCount>,
}

/// Normalize → segment → count → rank.
pub struct Ranker<S> {
    segmenter: S,
}

impl Ranker<JiebaSegmenter<'static>> {
    pub fn new() -> Self {
        Self { segmenter: JiebaSegmenter::shared() }
    }
}

impl Default for Ranker<JiebaSegmenter<'static>> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Segmenter> Ranker<S> {
    pub fn with_segmenter(segmenter: S) -> Self {
        Self { segmenter }
    }

    pub fn rank(&self, text: &str, k: usize) -> Ranking {
        let normalized = normalize(text);
        if normalized.is_empty() {
            tracing::debug!(input_chars = text.len(), "nothing left after normalization");
            return Ranking::default();
        }
        let tokens = self.segmenter.segment(&normalized);
        let table: FrequencyTable = tokens.iter().collect();
        let top = table.top(k);
        tracing::debug!(
            segmented = tokens.len(),
            counted = table.total(),
            distinct = table.len(),
            top = top.len(),
            "ranked tokens"
        );
        Ranking { table, top }
    }
}

/// Rank `text` with the bundled jieba dictionary.
pub fn rank(text: &str, k: usize) -> Ranking {
    Ranker::new().rank(text, k)
}
