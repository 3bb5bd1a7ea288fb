//! A nested task tracker drawn as a mindmap.
//!
//! The `layout` and `view` modules are the host-independent core: a pure
//! tree layout producing node boxes and Bézier connectors, plus the
//! pan/zoom viewport and the pointer state machine that draws connections.
//! `ops`, `io`, `cli` and `tui` wrap them into the `tm` tool.

pub mod cli;
pub mod io;
pub mod layout;
pub mod model;
pub mod ops;
pub mod tui;
pub mod util;
pub mod view;
