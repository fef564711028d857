use super::*;

use std::{
    collections::HashMap,
    env,
    time::{SystemTime, UNIX_EPOCH},
};

#[test]
fn defaults_have_no_backend_and_long_query_timeout() {
    let settings = ClientSettings::default();
    assert_eq!(settings.backend_url, None);
    assert_eq!(settings.query_timeout(), Duration::from_secs(120));
    assert_eq!(settings.upload_timeout(), Duration::from_secs(300));
    assert_eq!(settings.listing_timeout(), Duration::from_secs(30));
}

#[test]
fn zero_timeouts_are_clamped_to_one_second() {
    let settings = ClientSettings {
        query_timeout_secs: 0,
        upload_timeout_secs: 0,
        listing_timeout_secs: 0,
        ..ClientSettings::default()
    };
    assert_eq!(settings.query_timeout(), Duration::from_secs(1));
    assert_eq!(settings.upload_timeout(), Duration::from_secs(1));
    assert_eq!(settings.listing_timeout(), Duration::from_secs(1));
}

#[test]
fn normalizes_backend_url_trailing_slash() {
    assert_eq!(
        normalize_backend_url(" http://localhost:8000/ ").expect("url"),
        "http://localhost:8000"
    );
    assert_eq!(
        normalize_backend_url("https://rag.internal/api/").expect("url"),
        "https://rag.internal/api"
    );
}

#[test]
fn rejects_non_http_backend_urls() {
    assert!(normalize_backend_url("ftp://localhost").is_err());
    assert!(normalize_backend_url("localhost:8000/files").is_err());
    assert!(normalize_backend_url("not a url").is_err());
}

#[test]
fn file_values_override_defaults() {
    let mut settings = ClientSettings::default();
    apply_file(
        &mut settings,
        r#"
backend_url = "http://127.0.0.1:8000/"
query_timeout_secs = 30
event_capacity = 16
"#,
    )
    .expect("apply");

    assert_eq!(
        settings.backend_url.as_deref(),
        Some("http://127.0.0.1:8000")
    );
    assert_eq!(settings.query_timeout_secs, 30);
    assert_eq!(settings.upload_timeout_secs, 300);
    assert_eq!(settings.event_capacity, 16);
}

#[test]
fn env_overrides_file_values() {
    let mut settings = ClientSettings::default();
    apply_file(
        &mut settings,
        "backend_url = \"http://from-file:8000\"\nlisting_timeout_secs = 10\n",
    )
    .expect("apply");

    let vars: HashMap<&str, &str> = HashMap::from([
        ("FINCHAT_BACKEND_URL", "http://from-env:9000"),
        ("FINCHAT_UPLOAD_TIMEOUT_SECS", "45"),
        ("FINCHAT_LISTING_TIMEOUT_SECS", " 5 "),
        ("FINCHAT_EVENT_CAPACITY", "32"),
    ]);
    apply_env(&mut settings, |key| vars.get(key).map(|v| v.to_string())).expect("env");

    assert_eq!(settings.backend_url.as_deref(), Some("http://from-env:9000"));
    assert_eq!(settings.query_timeout_secs, 120);
    assert_eq!(settings.upload_timeout_secs, 45);
    assert_eq!(settings.listing_timeout(), Duration::from_secs(5));
    assert_eq!(settings.event_capacity, 32);
}

#[test]
fn unparseable_env_numbers_are_rejected_like_bad_urls() {
    for (key, raw) in [
        ("FINCHAT_QUERY_TIMEOUT_SECS", "soon"),
        ("FINCHAT_UPLOAD_TIMEOUT_SECS", "-3"),
        ("FINCHAT_LISTING_TIMEOUT_SECS", "1.5"),
        ("FINCHAT_EVENT_CAPACITY", "lots"),
    ] {
        let mut settings = ClientSettings::default();
        let err = apply_env(&mut settings, |k| (k == key).then(|| raw.to_string()))
            .expect_err("must fail");
        assert!(err.to_string().contains(key), "{key}: {err}");
        assert_eq!(settings, ClientSettings::default(), "{key} left a partial value");
    }
}

#[test]
fn invalid_toml_is_reported() {
    let mut settings = ClientSettings::default();
    let err = apply_file(&mut settings, "backend_url = ").expect_err("must fail");
    assert!(err.to_string().contains("invalid settings file"));
}

#[test]
fn explicit_settings_file_is_loaded() {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let path = env::temp_dir().join(format!("finchat_settings_test_{suffix}.toml"));
    fs::write(&path, "upload_timeout_secs = 12\n").expect("write settings");

    let settings = load_settings(Some(&path)).expect("load");
    assert_eq!(settings.upload_timeout_secs, 12);

    fs::remove_file(path).expect("cleanup");
}

#[test]
fn missing_explicit_settings_file_is_an_error() {
    let err = load_settings(Some(Path::new("/definitely/missing/finchat.toml")))
        .expect_err("must fail");
    assert!(err.to_string().contains("failed to read settings file"));
}
