//! Prelude module for common wmsview types and traits
//!
//! This module re-exports the most commonly used types, traits, and functions
//! for easy importing with `use wmsview::prelude::*;`

pub use crate::core::{
    bounds::Extent,
    builder::{bootstrap, ViewerConfigBuilder},
    config::{InitialViewport, ViewerConfig, ViewerOptions},
    geo::{Point, Size},
    map::Map,
    viewport::Viewport,
};

pub use crate::layers::{base::LayerTrait, manager::LayerManager, wms::WmsLayer};

pub use crate::input::{
    events::{Action, InputEvent, MapEvent},
    handler::EventManager,
};

pub use crate::tiles::{
    grid::{ImageRequest, TilingMode},
    loader::{HttpFetcher, ImageFetcher, ImageLoader, ImageResult, RequestLog, RequestSink},
};

pub use crate::ui::{
    container::{Container, Document},
    controls::{ControlKind, MapControl},
    elements::UiElement,
};

pub use crate::wms::version::WmsVersion;

pub use crate::runtime::{spawn, AsyncSpawner};

pub use crate::{Error as MapError, Result};

pub use std::{
    collections::VecDeque,
    sync::Arc,
    time::{Duration, Instant},
};

pub use fxhash::{FxHashMap as HashMap, FxHashSet as HashSet, FxHasher};
