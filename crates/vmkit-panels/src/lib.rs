#![forbid(unsafe_code)]

//! Panel view-models.
//!
//! Every panel is a [`Panel<P>`]: a named decorator host that owns an
//! observable list of shared panes. The tab panel adds synchronized
//! selection; the dock panel adds a derived render order and a
//! [`DockLayout`] adapter that keeps it current while mounted.

pub mod dock;
pub mod dock_layout;
pub mod panel;
pub mod stack;
pub mod tab;

pub use dock::{DockPane, DockPanel, DockPosition};
pub use dock_layout::DockLayout;
pub use panel::Panel;
pub use stack::{StackPane, StackPanel};
pub use tab::{TabHeaderDisplayMode, TabPane, TabPanel};
