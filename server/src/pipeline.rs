use fetcher::{FetchError, FetchedPage, Fetcher, ImageOutcome};
use wordfreq_core::{ChartKind, Ranker, Ranking};

/// Everything one request needs to render: the page, its ranking and, for
/// the image listing, the per-image outcomes.
pub struct Analysis {
    pub page: FetchedPage,
    pub ranking: Ranking,
    pub images: Option<Vec<ImageOutcome>>,
}

/// Fetch `url`, rank its text and, when `kind` is the image listing, fetch
/// each image. Runs strictly in that order.
pub async fn analyze(fetcher: &Fetcher, url: &str, kind: ChartKind, k: usize) -> Result<Analysis, FetchError> {
    let page = fetcher.fetch(url).await?;
    let ranking = Ranker::new().rank(&page.text, k);
    tracing::info!(
        distinct = ranking.table.len(),
        counted = ranking.table.total(),
        top = ranking.top.len(),
        images = page.images.len(),
        "ranked page"
    );
    let images = match kind {
        ChartKind::ImageList => Some(fetcher.fetch_images(&page.images).await),
        _ => None,
    };
    Ok(Analysis { page, ranking, images })
}
