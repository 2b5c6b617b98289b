//! # wmsview
//!
//! A headless web-map viewer bootstrapper for WMS services.
//!
//! A [`ViewerConfig`] names a WMS endpoint, the layers to request, the tiling
//! mode, the controls to attach and the initial viewport. [`bootstrap`] turns
//! it into an owned [`Map`] bound to a container of a [`Document`], sets the
//! initial extent and dispatches the first GetMap requests.

pub mod core;
pub mod input;
pub mod layers;
pub mod prelude;
pub mod runtime;
pub mod tiles;
pub mod traits;
pub mod ui;
pub mod wms;
pub use crate::core::constants;

// Re-export public API
pub use crate::core::{
    bounds::Extent,
    builder::{bootstrap, ViewerConfigBuilder},
    config::{InitialViewport, ViewerConfig, ViewerOptions},
    geo::{Point, Size},
    map::Map,
    viewport::Viewport,
};

pub use crate::layers::{base::LayerTrait, manager::LayerManager, wms::WmsLayer};

pub use crate::input::{events::InputEvent, events::MapEvent, handler::EventManager};

pub use crate::tiles::{
    grid::{ImageRequest, TilingMode},
    loader::{HttpFetcher, ImageFetcher, ImageLoader, ImageResult, RequestLog, RequestSink},
};

pub use crate::ui::{
    container::{Container, Document},
    controls::{ControlKind, ControlManager, MapControl},
    elements::UiElement,
};

pub use crate::wms::{getmap::GetMapRequest, version::WmsVersion};

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, MapError>;

/// Common error types
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid extent: {0}")]
    InvalidExtent(String),

    #[error("Invalid service URL: {0}")]
    InvalidUrl(String),

    #[error("Unsupported WMS version: {0}")]
    UnsupportedVersion(String),

    #[error("Container not found: {0}")]
    ContainerNotFound(String),

    #[error("Layer error: {0}")]
    Layer(String),

    #[error("HTTP {status} from {url}")]
    Http { status: u16, url: String },

    #[error("WMS service exception: {0}")]
    ServiceException(String),

    #[error("Runtime error: {0}")]
    Runtime(String),
}

/// Error type alias for convenience
pub type Error = MapError;

/// Installs `env_logger` as the `log` backend, honouring `RUST_LOG`.
/// Calling it more than once is harmless.
#[cfg(feature = "debug")]
pub fn init_logging() {
    if let Err(e) = env_logger::try_init() {
        log::debug!("logger already initialised: {}", e);
    }
}
