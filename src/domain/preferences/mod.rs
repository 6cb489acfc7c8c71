pub mod display;
pub mod model;
pub mod service;

pub use display::{DisplaySettings, DisplaySurface};
pub use model::{EditorTheme, PreferenceMap, PreferencesPatch, UserPreferences};
pub use service::{PreferenceStore, SaveOutcome};
