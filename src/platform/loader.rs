//! Image loading port used by the export readiness barrier

use crate::{Error, Result};
use base64::Engine as _;
use futures::future::BoxFuture;
use futures::FutureExt;

/// Resolves an image source to its encoded bytes.
///
/// A load either succeeds, fails with `Error::LoadFailure`, or never completes;
/// the caller is responsible for bounding the wait.
pub trait ImageLoader: Send + Sync {
    fn load<'a>(&'a self, src: &'a str) -> BoxFuture<'a, Result<Vec<u8>>>;
}

impl<T: ImageLoader + ?Sized> ImageLoader for std::sync::Arc<T> {
    fn load<'a>(&'a self, src: &'a str) -> BoxFuture<'a, Result<Vec<u8>>> {
        (**self).load(src)
    }
}

fn load_failure(src: &str, reason: impl Into<String>) -> Error {
    Error::LoadFailure {
        src: src.to_string(),
        reason: reason.into(),
    }
}

/// Decode a `data:` URI into its payload bytes.
///
/// Only base64 payloads are accepted; that is what every canvas/PNG producer emits.
pub fn decode_data_uri(src: &str) -> Result<Vec<u8>> {
    let rest = src
        .strip_prefix("data:")
        .ok_or_else(|| load_failure(src, "not a data URI"))?;
    let (meta, payload) = rest
        .split_once(',')
        .ok_or_else(|| load_failure(src, "data URI has no payload separator"))?;
    if !meta.split(';').any(|part| part.eq_ignore_ascii_case("base64")) {
        return Err(load_failure(src, "only base64 data URIs are supported"));
    }
    base64::engine::general_purpose::STANDARD
        .decode(payload.trim())
        .map_err(|e| load_failure(src, format!("invalid base64: {}", e)))
}

/// Encode bytes as a `data:` URI.
pub fn encode_data_uri(mime: &str, bytes: &[u8]) -> String {
    format!(
        "data:{};base64,{}",
        mime,
        base64::engine::general_purpose::STANDARD.encode(bytes)
    )
}

/// Loads inline `data:` URIs
#[derive(Debug, Default, Clone, Copy)]
pub struct DataUriLoader;

impl ImageLoader for DataUriLoader {
    fn load<'a>(&'a self, src: &'a str) -> BoxFuture<'a, Result<Vec<u8>>> {
        async move { decode_data_uri(src) }.boxed()
    }
}

/// Loads local files, either plain paths or `file://` URLs
#[derive(Debug, Default, Clone, Copy)]
pub struct FileLoader;

impl ImageLoader for FileLoader {
    fn load<'a>(&'a self, src: &'a str) -> BoxFuture<'a, Result<Vec<u8>>> {
        async move {
            let path = if src.starts_with("file://") {
                url::Url::parse(src)
                    .ok()
                    .and_then(|u| u.to_file_path().ok())
                    .ok_or_else(|| load_failure(src, "invalid file URL"))?
            } else {
                std::path::PathBuf::from(src)
            };
            tokio::fs::read(&path)
                .await
                .map_err(|e| load_failure(src, e.to_string()))
        }
        .boxed()
    }
}

/// Append a cache-busting `_=<millis>` query parameter so every capture sees
/// fresh bytes.
pub fn cache_busted(src: &str, millis: i64) -> String {
    match url::Url::parse(src) {
        Ok(mut url) => {
            url.query_pairs_mut().append_pair("_", &millis.to_string());
            url.to_string()
        }
        Err(_) => src.to_string(),
    }
}

/// Loads `http`/`https` images
#[cfg(feature = "http")]
#[derive(Debug, Clone)]
pub struct HttpImageLoader {
    client: reqwest::Client,
    cache_bust: bool,
}

#[cfg(feature = "http")]
impl HttpImageLoader {
    pub fn new(cache_bust: bool) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("collagekit/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::ConfigError(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client, cache_bust })
    }
}

#[cfg(feature = "http")]
impl ImageLoader for HttpImageLoader {
    fn load<'a>(&'a self, src: &'a str) -> BoxFuture<'a, Result<Vec<u8>>> {
        async move {
            let target = if self.cache_bust {
                cache_busted(src, crate::now_millis())
            } else {
                src.to_string()
            };
            log::debug!("fetching image {}", target);
            let resp = self
                .client
                .get(&target)
                .header(reqwest::header::CACHE_CONTROL, "no-cache")
                .send()
                .await
                .map_err(|e| load_failure(src, e.to_string()))?;
            let status = resp.status();
            if !status.is_success() {
                return Err(load_failure(src, format!("HTTP {}", status.as_u16())));
            }
            let bytes = resp
                .bytes()
                .await
                .map_err(|e| load_failure(src, e.to_string()))?;
            Ok(bytes.to_vec())
        }
        .boxed()
    }
}

/// Dispatches on the source scheme: `data:`, `http(s)://`, otherwise a file.
pub struct DefaultImageLoader {
    data: DataUriLoader,
    file: FileLoader,
    #[cfg(feature = "http")]
    http: HttpImageLoader,
}

impl DefaultImageLoader {
    pub fn new(cache_bust: bool) -> Result<Self> {
        #[cfg(not(feature = "http"))]
        let _ = cache_bust;
        Ok(Self {
            data: DataUriLoader,
            file: FileLoader,
            #[cfg(feature = "http")]
            http: HttpImageLoader::new(cache_bust)?,
        })
    }
}

impl ImageLoader for DefaultImageLoader {
    fn load<'a>(&'a self, src: &'a str) -> BoxFuture<'a, Result<Vec<u8>>> {
        if src.starts_with("data:") {
            return self.data.load(src);
        }
        if src.starts_with("http://") || src.starts_with("https://") {
            #[cfg(feature = "http")]
            {
                return self.http.load(src);
            }
            #[cfg(not(feature = "http"))]
            {
                return async move {
                    Err(load_failure(src, "remote images need the `http` feature"))
                }
                .boxed();
            }
        }
        self.file.load(src)
    }
}
