use lazy_static::lazy_static;
use scraper::{Html, Node, Selector};
use url::Url;

lazy_static! {
    static ref IMG: Selector = Selector::parse("img").expect("valid selector");
}

/// Elements whose text never reaches the reader.
const HIDDEN_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extracted {
    /// Text nodes concatenated in document order, without separators.
    pub text: String,
    /// `src` of every `<img>`, in document order, resolved against the base URL.
    pub images: Vec<String>,
}

pub fn extract(html: &str, base: Option<&Url>) -> Extracted {
    let document = Html::parse_document(html);
    Extracted { text: visible_text(&document), images: image_sources(&document, base) }
}

fn visible_text(document: &Html) -> String {
    let mut text = String::new();
    for node in document.tree.root().descendants() {
        let Node::Text(chunk) = node.value() else { continue };
        let hidden = node.ancestors().any(|a| {
            a.value()
                .as_element()
                .map_or(false, |el| HIDDEN_ELEMENTS.contains(&el.name()))
        });
        if !hidden {
            text.push_str(chunk);
        }
    }
    text
}

fn image_sources(document: &Html, base: Option<&Url>) -> Vec<String> {
    document
        .select(&IMG)
        .filter_map(|img| img.value().attr("src"))
        .map(str::trim)
        .filter(|src| !src.is_empty())
        .map(|src| match base.map(|b| b.join(src)) {
            Some(Ok(resolved)) => resolved.to_string(),
            _ => src.to_string(),
        })
        .collect()
}
