//! OGC WMS client-side protocol support.
//!
//! Supports WMS 1.1.1 and 1.3.0 GetMap requests.

pub mod getmap;
pub mod version;

pub use getmap::GetMapRequest;
pub use version::{AxisOrder, WmsVersion};
