use crate::core::constants::USER_AGENT;
use crate::runtime;
use crate::tiles::grid::ImageRequest;
use crate::{MapError, Result};
use async_trait::async_trait;
use crossbeam_channel::{unbounded, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Anything that can turn an image URL into bytes
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

/// Fetches imagery over HTTP with a shared reqwest client
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .pool_max_idle_per_host(16)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl ImageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(MapError::Http {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);

        let bytes = response.bytes().await?;
        if is_service_exception(content_type.as_deref(), &bytes) {
            return Err(MapError::ServiceException(service_exception_text(&bytes)));
        }
        Ok(bytes.to_vec())
    }
}

/// WMS servers report errors as XML with a 200 status. Some send it with an
/// image content type, so the body is checked too.
pub fn is_service_exception(content_type: Option<&str>, body: &[u8]) -> bool {
    if content_type.is_some_and(|content_type| content_type.contains("xml")) {
        return true;
    }
    let start = body
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(body.len());
    let head = &body[start..];
    head.starts_with(b"<?xml") || head.starts_with(b"<ServiceExceptionReport")
}

/// Message of a `<ServiceException>` document, or the start of the body
pub fn service_exception_text(body: &[u8]) -> String {
    const MAX_LEN: usize = 200;
    let text = String::from_utf8_lossy(body);

    const OPEN: &str = "<ServiceException";
    let message = text
        .match_indices(OPEN)
        .map(|(start, _)| start)
        .find(|start| {
            let rest = &text[start + OPEN.len()..];
            rest.starts_with(' ') || rest.starts_with('>')
        })
        .and_then(|start| {
            let open_end = start + text[start..].find('>')? + 1;
            let close = open_end + text[open_end..].find("</ServiceException>")?;
            Some(text[open_end..close].trim().to_string())
        })
        .unwrap_or_else(|| text.trim().to_string());

    message.chars().take(MAX_LEN).collect()
}

/// Destination for image requests issued by the map
pub trait RequestSink: Send + Sync {
    /// Hands off one request; must not block
    fn submit(&self, request: ImageRequest);
}

/// Outcome of one image fetch
#[derive(Debug)]
pub struct ImageResult {
    pub request: ImageRequest,
    pub data: Result<Vec<u8>>,
}

/// Fetches requests in background tasks and reports completed downloads
/// over a channel
pub struct ImageLoader {
    fetcher: Arc<dyn ImageFetcher>,
    tx: Sender<ImageResult>,
    rx: Receiver<ImageResult>,
}

impl ImageLoader {
    pub fn new(fetcher: Arc<dyn ImageFetcher>) -> Self {
        let (tx, rx) = unbounded();
        Self { fetcher, tx, rx }
    }

    /// Loader backed by [`HttpFetcher`]
    pub fn http() -> Result<Self> {
        Ok(Self::new(Arc::new(HttpFetcher::new()?)))
    }

    /// Channel on which completed fetches arrive
    pub fn results(&self) -> Receiver<ImageResult> {
        self.rx.clone()
    }

    /// Results that have arrived so far
    pub fn drain(&self) -> Vec<ImageResult> {
        self.rx.try_iter().collect()
    }
}

impl RequestSink for ImageLoader {
    fn submit(&self, request: ImageRequest) {
        let fetcher = Arc::clone(&self.fetcher);
        let tx = self.tx.clone();
        let task_request = request.clone();

        let scheduled = runtime::spawn(async move {
            let data = fetcher.fetch(&task_request.url).await;
            match &data {
                Ok(bytes) => log::debug!(
                    "fetched {} bytes for layer {}",
                    bytes.len(),
                    task_request.layer_id
                ),
                Err(e) => log::warn!("image fetch failed for {}: {}", task_request.url, e),
            }
            let _ = tx.send(ImageResult {
                request: task_request,
                data,
            });
        });

        if let Err(e) = scheduled {
            log::warn!("could not schedule fetch of {}: {}", request.url, e);
            let _ = self.tx.send(ImageResult {
                request,
                data: Err(e),
            });
        }
    }
}

/// Sink that only records requests, for headless use and tests
#[derive(Debug, Clone, Default)]
pub struct RequestLog {
    requests: Arc<Mutex<Vec<ImageRequest>>>,
}

impl RequestLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every request submitted so far
    pub fn requests(&self) -> Vec<ImageRequest> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.requests.lock().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        if let Ok(mut requests) = self.requests.lock() {
            requests.clear();
        }
    }
}

impl RequestSink for RequestLog {
    fn submit(&self, request: ImageRequest) {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request);
        }
    }
}
