use super::*;

#[test]
fn defaults_point_at_public_demo_api_without_timeout() {
    let settings = Settings::default();
    assert_eq!(settings.api_base_url, "https://dummyjson.com");
    assert_eq!(settings.request_timeout(), None);
    assert_eq!(
        settings.base_url().expect("base url").as_str(),
        "https://dummyjson.com/"
    );
}

#[test]
fn file_overrides_accept_integer_and_string_timeouts() {
    let mut settings = Settings::default();
    apply_file_overrides(
        &mut settings,
        r#"
api_base_url = "http://127.0.0.1:9000"
request_timeout_secs = 15
log_filter = "catalog_core=debug"
"#,
    );
    assert_eq!(settings.api_base_url, "http://127.0.0.1:9000");
    assert_eq!(settings.request_timeout(), Some(Duration::from_secs(15)));
    assert_eq!(settings.log_filter, "catalog_core=debug");

    apply_file_overrides(&mut settings, r#"request_timeout_secs = "4""#);
    assert_eq!(settings.request_timeout_secs, Some(4));
}

#[test]
fn malformed_file_keeps_defaults() {
    let mut settings = Settings::default();
    apply_file_overrides(&mut settings, "api_base_url = [not toml");
    assert_eq!(settings, Settings::default());
}

#[test]
fn app_prefixed_env_wins_over_plain_env() {
    let env: HashMap<&str, &str> = HashMap::from([
        ("CATALOG_API_BASE_URL", "http://plain.example"),
        ("APP__API_BASE_URL", "http://app.example"),
        ("APP__REQUEST_TIMEOUT_SECS", "not-a-number"),
    ]);
    let mut settings = Settings::default();
    apply_env_overrides(&mut settings, |key| env.get(key).map(|v| v.to_string()));

    assert_eq!(settings.api_base_url, "http://app.example");
    assert_eq!(settings.request_timeout_secs, None);
    assert_eq!(settings.log_filter, "info");
}

#[test]
fn zero_timeout_means_no_timeout() {
    let settings = Settings {
        request_timeout_secs: Some(0),
        ..Settings::default()
    };
    assert_eq!(settings.request_timeout(), None);
}

#[test]
fn rejects_unparseable_base_url() {
    let settings = Settings {
        api_base_url: "not a url".into(),
        ..Settings::default()
    };
    let err = settings.base_url().expect_err("invalid url");
    assert!(matches!(err, CatalogError::InvalidBaseUrl { .. }));
}
