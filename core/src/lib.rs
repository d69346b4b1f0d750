pub mod charts;
pub mod normalizer;
pub mod ranker;
pub mod segmenter;
pub mod table;

pub use charts::{chart_options, ChartKind, NameValue, ParseChartKindError};
pub use ranker::{rank, Ranker, Ranking, DEFAULT_TOP_K};
pub use segmenter::{JiebaSegmenter, Segmenter};
pub use table::{FrequencyTable, TokenCount, MIN_TOKEN_CHARS};
