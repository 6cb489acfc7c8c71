use crate::e2e::helpers;

use helpers::TestContext;
use pretty_assertions::assert_eq;
use runbox_client::domain::preferences::{
    DisplaySettings, EditorTheme, PreferencesPatch, UserPreferences,
};
use runbox_client::infrastructure::storage::PREFERENCES_KEY;
use serde_json::{json, Value};
use test_context::test_context;

fn cached(ctx: &TestContext) -> Option<Value> {
    ctx.store
        .peek(PREFERENCES_KEY)
        .map(|raw| serde_json::from_str(&raw).unwrap())
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_merge_remote_preferences_over_defaults(ctx: &TestContext) {
    ctx.sign_in(1, "student").await;
    ctx.backend.preferences.lock().insert(
        1,
        json!({ "darkMode": true, "fontSize": "huge", "legacyFlag": 1 }),
    );

    let preferences = ctx.preference_store().load().await;

    assert_eq!(
        preferences,
        UserPreferences {
            dark_mode: true,
            ..UserPreferences::default()
        }
    );
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_write_both_copies_when_backend_is_up(ctx: &TestContext) {
    ctx.sign_in(2, "student").await;
    let store = ctx.preference_store();

    let outcome = store
        .save(&PreferencesPatch {
            font_size: Some(18),
            theme: Some(EditorTheme::VsLight),
            ..PreferencesPatch::default()
        })
        .await;

    assert!(outcome.remote_synced);
    assert!(outcome.cached_locally);

    let remote = ctx.backend.preferences.lock().get(&2).cloned().unwrap();
    assert_eq!(remote["fontSize"], json!(18));
    assert_eq!(remote["theme"], json!("vs-light"));
    assert_eq!(remote["tabSize"], json!(4));
    assert_eq!(cached(ctx), Some(remote));
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_fall_back_to_the_local_copy_when_backend_is_down(ctx: &TestContext) {
    ctx.sign_in(3, "student").await;
    let store = ctx.preference_store();
    store
        .save(&PreferencesPatch {
            dark_mode: Some(true),
            ..PreferencesPatch::default()
        })
        .await;

    ctx.backend.set_preferences_down(true);

    let outcome = store
        .save(&PreferencesPatch {
            font_size: Some(20),
            ..PreferencesPatch::default()
        })
        .await;

    assert!(!outcome.remote_synced);
    assert!(outcome.cached_locally);

    let loaded = store.load().await;
    assert!(loaded.dark_mode);
    assert_eq!(loaded.font_size, 20);

    let remote = ctx.backend.preferences.lock().get(&3).cloned().unwrap();
    assert_eq!(remote["fontSize"], json!(14));
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_use_the_local_copy_without_a_session(ctx: &TestContext) {
    let store = ctx.preference_store();

    let outcome = store
        .save(&PreferencesPatch {
            word_wrap: Some(false),
            ..PreferencesPatch::default()
        })
        .await;

    assert!(!outcome.remote_synced);
    assert_eq!(cached(ctx).unwrap()["wordWrap"], json!(false));
    assert!(!store.load().await.word_wrap);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reset_both_copies(ctx: &TestContext) {
    ctx.sign_in(4, "student").await;
    let store = ctx.preference_store();
    store
        .save(&PreferencesPatch {
            minimap: Some(true),
            ..PreferencesPatch::default()
        })
        .await;

    assert!(store.reset().await);

    assert_eq!(cached(ctx), None);
    assert!(ctx.backend.preferences.lock().get(&4).is_none());
    assert_eq!(store.load().await, UserPreferences::default());
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_clear_the_local_copy_even_if_remote_reset_fails(ctx: &TestContext) {
    ctx.sign_in(5, "student").await;
    let store = ctx.preference_store();
    store
        .save(&PreferencesPatch {
            dark_mode: Some(true),
            ..PreferencesPatch::default()
        })
        .await;
    ctx.backend.set_preferences_down(true);

    assert!(!store.reset().await);

    assert_eq!(cached(ctx), None);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_apply_theme_from_stored_preferences(ctx: &TestContext) {
    ctx.sign_in(6, "student").await;
    ctx.backend.preferences.lock().insert(
        6,
        json!({ "darkMode": true, "theme": "high-contrast", "fontSize": 16 }),
    );

    let mut surface = DisplaySettings::default();
    ctx.preference_store().apply_theme(&mut surface).await;

    assert_eq!(
        surface,
        DisplaySettings {
            dark_mode: true,
            theme: EditorTheme::HighContrast,
            font_size_px: 16,
        }
    );
    assert_eq!(cached(ctx), None);
}
