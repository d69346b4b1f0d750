use chardetng::EncodingDetector;
use encoding_rs::Encoding;
use serde::Serialize;

/// How far into the body to look for a `<meta>` charset declaration.
const META_SCAN_BYTES: usize = 8192;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EncodingSource {
    Bom,
    Header,
    Meta,
    Detected,
}

#[derive(Debug, Clone)]
pub struct Decoded {
    pub text: String,
    pub encoding: &'static Encoding,
    pub source: EncodingSource,
}

/// Decode a document body to text.
///
/// Precedence is byte-order mark, then the `Content-Type` charset, then a
/// `<meta>` declaration near the top of the document, then statistical
/// detection. A declared charset that produces malformed sequences is treated
/// as wrong and the body is decoded with the detected one instead. Single-byte
/// declarations never report malformed input, so for those a multi-byte
/// detection result overrides the declaration when the body is not plain
/// ASCII. `tld` is the top-level domain of the page's host, which sharpens
/// detection.
pub fn decode_document(body: &[u8], content_type: Option<&str>, tld: Option<&str>) -> Decoded {
    if let Some((encoding, bom_len)) = Encoding::for_bom(body) {
        let (text, _) = encoding.decode_without_bom_handling(&body[bom_len..]);
        return Decoded { text: text.into_owned(), encoding, source: EncodingSource::Bom };
    }

    let declared = content_type
        .and_then(charset_from_content_type)
        .map(|label| (label, EncodingSource::Header))
        .or_else(|| charset_from_meta(body).map(|label| (label, EncodingSource::Meta)));

    if let Some((label, source)) = declared {
        match Encoding::for_label(label.as_bytes()) {
            Some(encoding) => {
                let (text, had_errors) = encoding.decode_without_bom_handling(body);
                if had_errors {
                    tracing::debug!(declared = encoding.name(), "declared charset does not fit the body");
                } else if encoding.is_single_byte() && !body.is_ascii() {
                    let guessed = detect(body, tld);
                    if guessed == encoding || guessed.is_single_byte() {
                        return Decoded { text: text.into_owned(), encoding, source };
                    }
                    tracing::debug!(
                        declared = encoding.name(),
                        detected = guessed.name(),
                        "single-byte declaration overridden by detection"
                    );
                    let (text, _) = guessed.decode_without_bom_handling(body);
                    return Decoded { text: text.into_owned(), encoding: guessed, source: EncodingSource::Detected };
                } else {
                    return Decoded { text: text.into_owned(), encoding, source };
                }
            }
            None => tracing::debug!(%label, "unknown charset label"),
        }
    }

    let encoding = detect(body, tld);
    let (text, _) = encoding.decode_without_bom_handling(body);
    Decoded { text: text.into_owned(), encoding, source: EncodingSource::Detected }
}

fn detect(body: &[u8], tld: Option<&str>) -> &'static Encoding {
    let mut detector = EncodingDetector::new();
    detector.feed(body, true);
    detector.guess(tld.map(str::as_bytes), true)
}

pub fn charset_from_content_type(content_type: &str) -> Option<String> {
    content_type
        .split(';')
        .skip(1)
        .filter_map(|param| param.split_once('='))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("charset"))
        .map(|(_, value)| value.trim().trim_matches(|c| c == '"' || c == '\'').to_string())
        .filter(|label| !label.is_empty())
}

/// Finds a charset declared by a `<meta>` element near the top of the
/// document, covering both `<meta charset=..>` and
/// `<meta http-equiv="Content-Type" content="..; charset=..">`.
pub fn charset_from_meta(body: &[u8]) -> Option<String> {
    let head = String::from_utf8_lossy(&body[..body.len().min(META_SCAN_BYTES)]);
    let lower = head.to_ascii_lowercase();
    let mut from = 0;
    while let Some(found) = lower[from..].find("<meta") {
        let tag_start = from + found;
        let tag_end = lower[tag_start..].find('>').map_or(lower.len(), |end| tag_start + end);
        if let Some(pos) = lower[tag_start..tag_end].find("charset=") {
            let start = tag_start + pos + "charset=".len();
            if let Some(label) = charset_label(&head[start..tag_end]) {
                return Some(label);
            }
        }
        from = tag_end;
    }
    None
}

fn charset_label(rest: &str) -> Option<String> {
    let rest = rest.trim_start();
    let label = match rest.chars().next()? {
        quote @ ('"' | '\'') => {
            let inner = &rest[1..];
            &inner[..inner.find(quote)?]
        }
        _ => {
            let end = rest
                .find(|c: char| c.is_whitespace() || matches!(c, '"' | '\'' | ';' | '>' | '/'))
                .unwrap_or(rest.len());
            &rest[..end]
        }
    };
    let label = label.trim();
    (!label.is_empty()).then(|| label.to_string())
}
