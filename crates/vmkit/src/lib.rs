#![forbid(unsafe_code)]

//! vmkit public facade.
//!
//! Re-exports the view-model crates and adds the pieces that sit on top of
//! them: the renderer registry, the application settings node, and the
//! root window node.

pub mod settings;
pub mod views;
pub mod window;

pub use settings::{AppSettings, SettingsSnapshot};
pub use views::ViewRegistry;
pub use window::DesktopWindow;

pub mod prelude {
    pub use vmkit_core as core;
    pub use vmkit_fields as fields;
    pub use vmkit_panels as panels;

    pub use crate::{AppSettings, DesktopWindow, SettingsSnapshot, ViewRegistry};
    pub use vmkit_core::{
        DecoratorHost, ListChange, Node, NodeId, NodeRef, NodeType, ObservableList,
        ObservableNode, PropertyChanged, SubscriptionId, VmError,
    };
    pub use vmkit_fields::{
        BoolField, DoubleField, Field, FloatField, IntField, NumericField, RadioField,
        RadioOption, StringField, UIntField,
    };
    pub use vmkit_panels::{
        DockLayout, DockPane, DockPanel, DockPosition, StackPane, StackPanel,
        TabHeaderDisplayMode, TabPane, TabPanel,
    };
}
