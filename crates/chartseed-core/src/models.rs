pub mod coordinate;
pub mod seed;
pub mod zoom_box;

pub use coordinate::{LatLng, DEFAULT_CLOSE_TOLERANCE};
pub use seed::{RejectReason, SeedInfo, SeedState, SeedStatus, StartOutcome};
pub use zoom_box::{parse_selection, ZoomBox};
