use crate::config::FetchConfig;
use crate::decode::{decode_document, EncodingSource};
use crate::error::{FetchError, ImageFetchError};
use crate::extract::extract;
use futures::stream::{self, StreamExt};
use reqwest::{header, Client};
use url::Url;

/// Page text and image references, ready for ranking.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub url: Url,
    pub encoding: &'static str,
    pub encoding_source: EncodingSource,
    pub text: String,
    pub images: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct FetchedImage {
    pub url: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

pub type ImageOutcome = Result<FetchedImage, ImageFetchError>;

/// Undecoded response body. Only lives until [`RawDocument::into_page`].
#[derive(Debug, Clone)]
pub struct RawDocument {
    pub url: Url,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl RawDocument {
    pub fn new(url: Url, content_type: Option<String>, body: Vec<u8>) -> Self {
        Self { url, content_type, body }
    }

    /// Decode and extract. Fails when the body is not markup or text.
    pub fn into_page(self) -> Result<FetchedPage, FetchError> {
        if let Some(ct) = self.content_type.as_deref() {
            if !is_textual(ct) {
                return Err(FetchError::Parse {
                    url: self.url.to_string(),
                    reason: format!("unsupported content type {ct}"),
                });
            }
        }
        let tld = self
            .url
            .host_str()
            .and_then(|host| host.rsplit('.').next())
            .filter(|tld| tld.chars().all(|c| c.is_ascii_alphabetic()));
        let decoded = decode_document(&self.body, self.content_type.as_deref(), tld);
        if decoded.text.contains('\0') {
            return Err(FetchError::Parse {
                url: self.url.to_string(),
                reason: "body contains binary data".to_string(),
            });
        }
        let extracted = extract(&decoded.text, Some(&self.url));
        tracing::debug!(
            url = %self.url,
            encoding = decoded.encoding.name(),
            source = ?decoded.source,
            text_chars = extracted.text.chars().count(),
            images = extracted.images.len(),
            "extracted page"
        );
        Ok(FetchedPage {
            url: self.url,
            encoding: decoded.encoding.name(),
            encoding_source: decoded.source,
            text: extracted.text,
            images: extracted.images,
        })
    }
}

fn is_textual(content_type: &str) -> bool {
    let mime = content_type.split(';').next().unwrap_or("").trim().to_ascii_lowercase();
    mime.is_empty() || mime.starts_with("text/") || mime.contains("html") || mime.contains("xml")
}

#[derive(Clone)]
pub struct Fetcher {
    client: Client,
    config: FetchConfig,
}

impl Fetcher {
    pub fn new(config: FetchConfig) -> Result<Self, FetchError> {
        let mut builder = Client::builder()
            .user_agent(config.user_agent.clone())
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects));
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(FetchError::Client)?;
        Ok(Self { client, config })
    }

    /// GET `url` and extract its visible text and image references.
    pub async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        let parsed = parse_http_url(url)?;
        let raw = self.fetch_raw(&parsed).await?;
        tracing::info!(url = %raw.url, bytes = raw.body.len(), "fetched page");
        raw.into_page()
    }

    pub async fn fetch_raw(&self, url: &Url) -> Result<RawDocument, FetchError> {
        let (final_url, content_type, body) = self.get(url).await?;
        Ok(RawDocument::new(final_url, content_type, body))
    }

    /// GET one image. The failure is returned, never propagated past this image.
    pub async fn fetch_image(&self, url: &str) -> ImageOutcome {
        let result = async {
            let parsed = parse_http_url(url)?;
            let (_, content_type, bytes) = self.get(&parsed).await?;
            if let Some(ct) = content_type.as_deref() {
                if !ct.trim_start().to_ascii_lowercase().starts_with("image/") {
                    return Err(FetchError::NotAnImage { url: url.to_string(), content_type: ct.to_string() });
                }
            }
            Ok::<_, FetchError>(FetchedImage { url: url.to_string(), content_type, bytes })
        }
        .await;
        result.map_err(|source| {
            tracing::warn!(%url, kind = source.kind(), error = %source, "image fetch failed");
            ImageFetchError { url: url.to_string(), source }
        })
    }

    /// Fetch every image, keeping input order. Sequential unless
    /// `image_concurrency` allows more than one request in flight.
    pub async fn fetch_images(&self, urls: &[String]) -> Vec<ImageOutcome> {
        let limit = self.config.image_concurrency.max(1);
        let outcomes: Vec<ImageOutcome> = if limit == 1 {
            let mut outcomes = Vec::with_capacity(urls.len());
            for url in urls {
                outcomes.push(self.fetch_image(url).await);
            }
            outcomes
        } else {
            let pending: Vec<_> = urls.iter().map(|url| self.fetch_image(url)).collect();
            stream::iter(pending).buffered(limit).collect().await
        };
        let failed = outcomes.iter().filter(|o| o.is_err()).count();
        tracing::info!(total = urls.len(), failed, "fetched images");
        outcomes
    }

    async fn get(&self, url: &Url) -> Result<(Url, Option<String>, Vec<u8>), FetchError> {
        let resp = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(url.as_str(), e))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status { url: url.to_string(), status: status.as_u16() });
        }
        let final_url = resp.url().clone();
        let content_type = resp
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = resp
            .bytes()
            .await
            .map_err(|e| FetchError::from_reqwest(url.as_str(), e))?;
        Ok((final_url, content_type, body.to_vec()))
    }
}

fn parse_http_url(url: &str) -> Result<Url, FetchError> {
    let parsed = Url::parse(url.trim()).map_err(|e| FetchError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(FetchError::InvalidUrl {
            url: url.to_string(),
            reason: format!("unsupported scheme `{other}`"),
        }),
    }
}
