use llm_oneshot::{
    client::{API_BASE_VAR, API_KEY_VAR, DEFAULT_API_BASE, ORGANIZATION_VAR},
    error::{Error, Result},
    Client,
};
use std::collections::HashMap;

fn env<const N: usize>(pairs: [(&str, &str); N]) -> HashMap<String, String> {
    return pairs
        .into_iter()
        .map(|(k, v)| (k.to_owned(), v.to_owned()))
        .collect();
}

#[test]
fn missing_key_fails_at_construction() {
    let err = Client::from_env(&HashMap::<String, String>::new()).unwrap_err();
    assert!(matches!(err, Error::MissingApiKey(API_KEY_VAR)), "{err:?}");
    assert!(err.is_authentication());
}

#[test]
fn blank_key_is_missing() {
    let err = Client::from_env(&env([(API_KEY_VAR, "   ")])).unwrap_err();
    assert!(err.is_authentication());

    let err = Client::builder("").build().unwrap_err();
    assert!(matches!(err, Error::MissingApiKey(_)));
}

#[test]
fn key_from_env() -> Result<()> {
    let client = Client::from_env(&env([(API_KEY_VAR, "sk-test")]))?;
    assert_eq!(client.base_url(), DEFAULT_API_BASE);
    return Ok(());
}

#[test]
fn base_url_from_env() -> Result<()> {
    let client = Client::from_env(&env([
        (API_KEY_VAR, "sk-test"),
        (ORGANIZATION_VAR, "org-test"),
        (API_BASE_VAR, "http://localhost:8080/v1"),
    ]))?;
    assert_eq!(client.base_url(), "http://localhost:8080/v1");
    return Ok(());
}

#[test]
fn explicit_key() -> Result<()> {
    Client::new(Some("sk-explicit"), Some("org-explicit"))?;
    return Ok(());
}

#[test]
fn invalid_header_value() {
    let err = Client::builder("sk-bad\nkey").build().unwrap_err();
    assert!(matches!(err, Error::InvalidHeader(_)), "{err:?}");
}
