pub mod grid;
pub mod loader;

// Re-exports for convenience
pub use grid::{GridCell, ImageRequest, TileGrid, TilingMode};
pub use loader::{HttpFetcher, ImageFetcher, ImageLoader, ImageResult, RequestLog, RequestSink};
