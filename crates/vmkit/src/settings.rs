#![forbid(unsafe_code)]

//! Application settings view-model.
//!
//! [`AppSettings`] groups the user-facing preferences as fields so a
//! settings form can render them generically. The window flags are hidden
//! by default; the theme choices are option sets.
//!
//! [`SettingsSnapshot`] is the plain-data form used for persistence. With
//! the `state-persistence` feature it serializes to JSON.

use std::fmt;
use std::rc::Rc;

use vmkit_core::{DecoratorHost, DecoratorRegistry, Node, ObservableNode, Result, VmError};
use vmkit_fields::{BoolField, RadioField, RadioOption};

pub const THEME_COLORS: [&str; 3] = ["Light", "Dark", "System"];
pub const THEME_SIZE_PRESETS: [&str; 3] = ["Preset4", "Preset6", "Preset8"];

/// Plain-data copy of [`AppSettings`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "state-persistence",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct SettingsSnapshot {
    pub topmost_window: bool,
    pub touch_first: bool,
    pub theme_color: String,
    pub theme_size_preset: String,
}

impl Default for SettingsSnapshot {
    fn default() -> Self {
        Self {
            topmost_window: false,
            touch_first: false,
            theme_color: "Light".to_string(),
            theme_size_preset: "Preset6".to_string(),
        }
    }
}

#[cfg(feature = "state-persistence")]
impl SettingsSnapshot {
    /// Serialize to pretty-printed JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Parse from JSON. Missing keys take their defaults.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

/// Settings node holding one field per preference.
pub struct AppSettings {
    node: ObservableNode,
    decorators: DecoratorRegistry,
    topmost_window: BoolField,
    touch_first: BoolField,
    theme_color: Rc<RadioField<String>>,
    theme_size_preset: Rc<RadioField<String>>,
}

impl fmt::Debug for AppSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppSettings")
            .field("snapshot", &self.snapshot())
            .finish()
    }
}

impl Default for AppSettings {
    fn default() -> Self {
        Self::new()
    }
}

fn option_set(
    name: &str,
    display_name: &str,
    description: &str,
    values: &[&str],
    initial: &str,
) -> Rc<RadioField<String>> {
    let field = RadioField::new(name);
    field.set_display_name(display_name);
    field.set_description(description);
    field.options().reset(
        values
            .iter()
            .map(|v| RadioOption::new(*v, (*v).to_string()))
            .collect(),
    );
    field.set_value(initial.to_string());
    field
}

impl AppSettings {
    #[must_use]
    pub fn new() -> Self {
        Self {
            node: ObservableNode::new("AppSettings"),
            decorators: DecoratorRegistry::new(),
            topmost_window: BoolField::new("TopmostWindow")
                .with_display_name("Topmost Window")
                .with_description(
                    "Determines whether the application window stays on top of all other windows.",
                )
                .with_hidden(true),
            touch_first: BoolField::new("TouchFirst")
                .with_display_name("Touch First")
                .with_description("Enables touch-first interaction mode for the application.")
                .with_hidden(true),
            theme_color: option_set(
                "ThemeColor",
                "Theme Color",
                "Sets the theme color of the application.",
                &THEME_COLORS,
                "Light",
            ),
            theme_size_preset: option_set(
                "ThemeSizePreset",
                "Theme Size Preset",
                "Sets the size preset for the application's theme.",
                &THEME_SIZE_PRESETS,
                "Preset6",
            ),
        }
    }

    #[must_use]
    pub fn topmost_window(&self) -> &BoolField {
        &self.topmost_window
    }

    #[must_use]
    pub fn touch_first(&self) -> &BoolField {
        &self.touch_first
    }

    #[must_use]
    pub fn theme_color(&self) -> &Rc<RadioField<String>> {
        &self.theme_color
    }

    #[must_use]
    pub fn theme_size_preset(&self) -> &Rc<RadioField<String>> {
        &self.theme_size_preset
    }

    #[must_use]
    pub fn snapshot(&self) -> SettingsSnapshot {
        SettingsSnapshot {
            topmost_window: self.topmost_window.value(),
            touch_first: self.touch_first.value(),
            theme_color: self.theme_color.value(),
            theme_size_preset: self.theme_size_preset.value(),
        }
    }

    /// Apply `snapshot` field by field.
    ///
    /// Every field is attempted. A theme value that is not one of the
    /// field's options leaves that field unchanged; the first such failure
    /// is returned after the rest have been applied.
    pub fn apply(&self, snapshot: &SettingsSnapshot) -> Result<()> {
        self.topmost_window.set_value(snapshot.topmost_window);
        self.touch_first.set_value(snapshot.touch_first);

        let color = self.theme_color.select_value(&snapshot.theme_color);
        let preset = self
            .theme_size_preset
            .select_value(&snapshot.theme_size_preset);

        let first_error: Option<VmError> = [color, preset].into_iter().find_map(|r| r.err());
        tracing::debug!(
            message = "settings.apply",
            theme_color = %snapshot.theme_color,
            theme_size_preset = %snapshot.theme_size_preset,
            rejected = first_error.is_some()
        );
        first_error.map_or(Ok(()), Err)
    }
}

impl Node for AppSettings {
    fn node(&self) -> &ObservableNode {
        &self.node
    }
}

impl DecoratorHost for AppSettings {
    fn decorators(&self) -> &DecoratorRegistry {
        &self.decorators
    }
}
