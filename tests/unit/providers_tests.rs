/*!
 * Tests for provider construction, status mapping and the mock provider
 */

use std::sync::Arc;

use srtran::app_config::{Backend, ServiceConfig};
use srtran::errors::{ErrorDisposition, ProviderError};
use srtran::providers::google::classify_google_status;
use srtran::providers::mock::MockProvider;
use srtran::providers::openrouter::classify_openrouter_status;
use srtran::providers::{create_provider, Provider};
use srtran::translation::parser::parse_response;
use srtran::translation::{LogSink, NullSink};

const BATCH: &str = "[1]\nHello\n\n===SUBTITLE===\n[2]\nGood\nmorning\n";

#[test]
fn test_create_provider_withEachBackend_shouldNameIt() {
    let sink: Arc<dyn LogSink> = Arc::new(NullSink);
    let client = reqwest::Client::new();

    let openrouter = create_provider(
        &ServiceConfig::new(Backend::OpenRouter, "sk-or", "openai/gpt-4o"),
        client.clone(),
        sink.clone(),
    );
    let lmstudio = create_provider(&ServiceConfig::new(Backend::LMStudio, "", "local"), client, sink);

    assert_eq!(openrouter.name(), "openrouter");
    assert_eq!(lmstudio.name(), "lmstudio");
}

#[test]
fn test_classify_google_status_withQuotaMessage_shouldBeRateLimited() {
    let body = r#"{"error":{"code":400,"message":"Quota exceeded for metric","status":"FAILED_PRECONDITION"}}"#;
    let error = classify_google_status(400, body);
    assert!(matches!(error, ProviderError::RateLimited(_)));
    assert_eq!(error.disposition(), ErrorDisposition::Retryable);

    let exhausted = classify_google_status(
        429,
        r#"{"error":{"code":429,"message":"Resource has been exhausted","status":"RESOURCE_EXHAUSTED"}}"#,
    );
    assert!(matches!(exhausted, ProviderError::RateLimited(_)));
}

#[test]
fn test_classify_google_status_withInvalidKey_shouldBeFatal() {
    let body = r#"{"error":{"code":400,"message":"API key not valid. Please pass a valid API key.","status":"INVALID_ARGUMENT"}}"#;
    let error = classify_google_status(400, body);
    assert!(matches!(error, ProviderError::AuthenticationError(_)));
    assert_eq!(error.disposition(), ErrorDisposition::Fatal);
}

#[test]
fn test_classify_openrouter_status_withUpstreamFailure_shouldNameProvider() {
    let body = r#"{"error":{"code":502,"message":"bad gateway","metadata":{"provider_name":"Azure"}}}"#;
    match classify_openrouter_status(502, body) {
        ProviderError::ApiError { status_code, message } => {
            assert_eq!(status_code, 502);
            assert!(message.contains("Azure"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_classify_openrouter_status_withForbiddenAndNoDetails_shouldStillReject() {
    let error = classify_openrouter_status(403, r#"{"error":{"code":403,"message":"Key disabled"}}"#);
    assert!(matches!(error, ProviderError::ContentRejected(ref m) if m == "Key disabled"));
    assert_eq!(error.disposition(), ErrorDisposition::Fatal);
}

#[tokio::test]
async fn test_mock_working_shouldAnswerEverySubtitle() {
    let mock = MockProvider::working();

    let response = mock.translate_batch(BATCH, "English", "French").await.unwrap();
    let groups = parse_response(&response, 2);

    assert_eq!(groups, vec![vec!["[French] Hello"], vec!["[French] Good", "[French] morning"]]);
    assert_eq!(mock.call_count(), 1);
    let request = &mock.requests()[0];
    assert_eq!(request.unit_count(), 2);
    assert_eq!(request.source_language, "English");
}

#[tokio::test]
async fn test_mock_failTimes_shouldRecoverAfterFailures() {
    let mock = MockProvider::fail_times(2, || ProviderError::RateLimited("slow down".to_string()));

    assert!(mock.translate_batch(BATCH, "en", "de").await.is_err());
    assert!(mock.translate_batch(BATCH, "en", "de").await.is_err());
    assert!(mock.translate_batch(BATCH, "en", "de").await.is_ok());
    assert_eq!(mock.call_count(), 3);
}

#[tokio::test]
async fn test_mock_droppingLast_shouldAnswerOneShort() {
    let mock = MockProvider::dropping_last();

    let response = mock.translate_batch(BATCH, "en", "de").await.unwrap();

    assert_eq!(parse_response(&response, 2).len(), 1);
}
