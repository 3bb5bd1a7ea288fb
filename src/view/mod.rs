//! Interactive state of the map view: the pan/zoom transform and the
//! pointer gesture state machine. Host-independent; the TUI feeds it
//! virtual-pixel coordinates.

pub mod interaction;
pub mod viewport;

pub use interaction::{DraftConnection, Interaction, MapRequest};
pub use viewport::{Viewport, ViewportSize, ViewportTransform};
