use super::model::{EditorTheme, UserPreferences};

/// Whatever renders the editor: receives the presentation toggles.
pub trait DisplaySurface {
    fn set_dark_mode(&mut self, enabled: bool);
    fn set_editor_theme(&mut self, theme: EditorTheme);
    fn set_font_size(&mut self, px: u32);
}

/// Plain record of the presentation state, for headless use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplaySettings {
    pub dark_mode: bool,
    pub theme: EditorTheme,
    pub font_size_px: u32,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        let defaults = UserPreferences::default();
        Self {
            dark_mode: defaults.dark_mode,
            theme: defaults.theme,
            font_size_px: defaults.font_size,
        }
    }
}

impl DisplaySurface for DisplaySettings {
    fn set_dark_mode(&mut self, enabled: bool) {
        self.dark_mode = enabled;
    }

    fn set_editor_theme(&mut self, theme: EditorTheme) {
        self.theme = theme;
    }

    fn set_font_size(&mut self, px: u32) {
        self.font_size_px = px;
    }
}

pub fn apply_to(preferences: &UserPreferences, surface: &mut dyn DisplaySurface) {
    surface.set_dark_mode(preferences.dark_mode);
    surface.set_editor_theme(preferences.theme);
    surface.set_font_size(preferences.font_size);
}
