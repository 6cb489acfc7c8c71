use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

pub type PreferenceMap = Map<String, JsonValue>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EditorTheme {
    VsDark,
    VsLight,
    HighContrast,
}

/// User preferences as stored remotely and mirrored locally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPreferences {
    // Appearance
    pub dark_mode: bool,
    pub theme: EditorTheme,
    pub font_size: u32,
    // Editor
    pub tab_size: u32,
    pub word_wrap: bool,
    pub minimap: bool,
    pub line_numbers: bool,
    pub auto_save: bool,
    // Notifications
    pub email_notifications: bool,
    pub push_notifications: bool,
    pub execution_alerts: bool,
    pub marketing_emails: bool,
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            dark_mode: false,
            theme: EditorTheme::VsDark,
            font_size: 14,
            tab_size: 4,
            word_wrap: true,
            minimap: false,
            line_numbers: true,
            auto_save: true,
            email_notifications: true,
            push_notifications: false,
            execution_alerts: true,
            marketing_emails: false,
        }
    }
}

impl UserPreferences {
    /// Defaults with `overrides` laid on top.
    pub fn from_partial(overrides: &PreferenceMap) -> Self {
        Self::default().merged_with(overrides)
    }

    /// Copy of `self` with every known, well-typed key of `overrides`
    /// applied. Unknown keys and values of the wrong type are dropped so
    /// the result is always complete.
    pub fn merged_with(&self, overrides: &PreferenceMap) -> Self {
        let mut current = match serde_json::to_value(self) {
            Ok(JsonValue::Object(map)) => map,
            _ => return self.clone(),
        };

        for (key, value) in overrides {
            if !current.contains_key(key) {
                tracing::debug!(key = %key, "Ignoring unknown preference key");
                continue;
            }

            let mut candidate = current.clone();
            candidate.insert(key.clone(), value.clone());
            if serde_json::from_value::<Self>(JsonValue::Object(candidate)).is_ok() {
                current.insert(key.clone(), value.clone());
            } else {
                tracing::warn!(key = %key, value = %value, "Ignoring preference with invalid value");
            }
        }

        serde_json::from_value(JsonValue::Object(current)).unwrap_or_else(|_| self.clone())
    }

    pub fn apply(&self, patch: &PreferencesPatch) -> Self {
        self.merged_with(&patch.to_map())
    }
}

/// Partial update; only `Some` fields are written.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferencesPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dark_mode: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<EditorTheme>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tab_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub word_wrap: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimap: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_numbers: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_save: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_notifications: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub push_notifications: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub execution_alerts: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marketing_emails: Option<bool>,
}

impl PreferencesPatch {
    pub fn to_map(&self) -> PreferenceMap {
        match serde_json::to_value(self) {
            Ok(JsonValue::Object(map)) => map,
            _ => PreferenceMap::new(),
        }
    }
}
