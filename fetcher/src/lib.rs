//! Single-page fetcher: one GET, charset decoding, visible text and image
//! references, plus isolated per-image fetches.

pub mod client;
pub mod config;
pub mod decode;
pub mod error;
pub mod extract;

pub use client::{FetchedImage, FetchedPage, Fetcher, ImageOutcome, RawDocument};
pub use config::{FetchConfig, DEFAULT_USER_AGENT};
pub use decode::{decode_document, Decoded, EncodingSource};
pub use error::{FetchError, ImageFetchError};
pub use extract::{extract, Extracted};
