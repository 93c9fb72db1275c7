//! Redraw hints.
//!
//! Stored on each option and handed back to the UI after a change; the
//! config core never reads them.

/// Redraw the message index.
pub const INDEX: u32 = 1 << 0;
/// Redraw the pager.
pub const PAGER: u32 = 1 << 1;
/// Redraw the status bar.
pub const STATUS: u32 = 1 << 2;
/// Redraw the sidebar.
pub const SIDEBAR: u32 = 1 << 3;
/// Re-sort the index.
pub const RESORT: u32 = 1 << 4;
/// Re-thread the index.
pub const RETHREAD: u32 = 1 << 5;
