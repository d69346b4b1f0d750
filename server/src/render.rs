use crate::pipeline::Analysis;
use askama::Html as HtmlEscaper;
use askama::{MarkupDisplay, Template};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use fetcher::ImageOutcome;
use wordfreq_core::{chart_options, ChartKind};

type SafeJson = MarkupDisplay<HtmlEscaper, String>;

/// The request a page was rendered for, echoed back into the form.
pub struct FormState<'a> {
    pub url: &'a str,
    pub kind: ChartKind,
    pub k: usize,
}

pub struct KindOption {
    pub value: &'static str,
    pub label: &'static str,
    pub selected: bool,
}

impl FormState<'_> {
    pub fn options(&self) -> Vec<KindOption> {
        ChartKind::ALL
            .iter()
            .map(|kind| KindOption { value: kind.as_str(), label: kind.label(), selected: *kind == self.kind })
            .collect()
    }
}

struct Summary {
    url: String,
    distinct: usize,
    counted: u64,
    encoding: &'static str,
}

impl Summary {
    fn of(analysis: &Analysis) -> Self {
        Self {
            url: analysis.page.url.to_string(),
            distinct: analysis.ranking.table.len(),
            counted: analysis.ranking.table.total(),
            encoding: analysis.page.encoding,
        }
    }
}

struct ImageItem {
    url: String,
    ok: bool,
    src: String,
    error: String,
}

impl ImageItem {
    fn from_outcome(outcome: &ImageOutcome) -> Self {
        match outcome {
            Ok(image) => {
                let mime = image.content_type.as_deref().unwrap_or("application/octet-stream");
                Self {
                    url: image.url.clone(),
                    ok: true,
                    src: format!("data:{mime};base64,{}", STANDARD.encode(&image.bytes)),
                    error: String::new(),
                }
            }
            Err(err) => Self { url: err.url.clone(), ok: false, src: String::new(), error: err.source.to_string() },
        }
    }
}

#[derive(Template)]
#[template(path = "index.html")]
struct IndexTemplate<'a> {
    form: &'a FormState<'a>,
    notice: Option<&'a str>,
}

#[derive(Template)]
#[template(path = "error.html")]
struct ErrorTemplate<'a> {
    form: &'a FormState<'a>,
    message: &'a str,
}

#[derive(Template)]
#[template(path = "chart.html")]
struct ChartTemplate<'a> {
    form: &'a FormState<'a>,
    summary: Summary,
    options: Option<SafeJson>,
    height: u32,
    legend_state: bool,
}

#[derive(Template)]
#[template(path = "images.html")]
struct ImagesTemplate<'a> {
    form: &'a FormState<'a>,
    summary: Summary,
    images: Vec<ImageItem>,
}

pub fn index_page(form: &FormState<'_>, notice: Option<&str>) -> askama::Result<String> {
    IndexTemplate { form, notice }.render()
}

pub fn error_page(form: &FormState<'_>, message: &str) -> askama::Result<String> {
    ErrorTemplate { form, message }.render()
}

pub fn analysis_page(form: &FormState<'_>, analysis: &Analysis) -> askama::Result<String> {
    match (&analysis.images, chart_options(form.kind, &analysis.ranking.top)) {
        (Some(images), _) => images_page(form, analysis, images),
        (None, Some(options)) => chart_page(form, analysis, &options),
        (None, None) => images_page(form, analysis, &[]),
    }
}

fn chart_page(form: &FormState<'_>, analysis: &Analysis, options: &serde_json::Value) -> askama::Result<String> {
    // keep "</script>" in token data from closing the tag
    let options = (!analysis.ranking.top.is_empty())
        .then(|| MarkupDisplay::new_safe(options.to_string().replace("</", "<\\/"), HtmlEscaper));
    ChartTemplate {
        form,
        summary: Summary::of(analysis),
        options,
        height: form.kind.height_px(),
        legend_state: form.kind == ChartKind::Pie,
    }
    .render()
}

fn images_page(form: &FormState<'_>, analysis: &Analysis, images: &[ImageOutcome]) -> askama::Result<String> {
    ImagesTemplate { form, summary: Summary::of(analysis), images: images.iter().map(ImageItem::from_outcome).collect() }
        .render()
}
