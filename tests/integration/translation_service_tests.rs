/*!
 * Translation service behavior through the public API, with mock providers
 */

use log::Level;
use std::sync::Arc;
use std::time::Duration;

use srtran::errors::{ProviderError, TranslationError};
use srtran::providers::mock::MockProvider;
use srtran::subtitle_processor::{SubtitleCollection, SubtitleEntry};
use srtran::translation::{CancellationSignal, CaptureSink, LogSink, RetryPolicy, TranslationService};

use crate::common;

#[tokio::test(start_paused = true)]
async fn test_translate_withMultiLineSubtitles_shouldKeepLinesAndTiming() {
    let units = SubtitleCollection::parse_srt_string(common::SAMPLE_SRT).unwrap();
    let (service, _sink) = common::mock_service(MockProvider::working(), 2);

    let translated = service
        .translate(&units, "English", "German", &CancellationSignal::new())
        .await
        .unwrap();

    assert_eq!(translated.len(), 3);
    for (original, result) in units.iter().zip(&translated) {
        assert_eq!(result.index, original.index);
        assert_eq!(result.start, original.start);
        assert_eq!(result.end, original.end);
        assert_eq!(result.source_lines, original.source_lines);
    }
    assert_eq!(translated[1].translated_lines, vec!["[German] It contains", "[German] multiple lines."]);
}

#[tokio::test(start_paused = true)]
async fn test_translate_shouldNotModifyInput() {
    let units = common::units(5);
    let before = units.clone();
    let (service, _sink) = common::mock_service(MockProvider::working(), 2);

    service
        .translate(&units, "en", "fr", &CancellationSignal::new())
        .await
        .unwrap();

    assert_eq!(units, before);
}

#[tokio::test(start_paused = true)]
async fn test_translate_withBatchSizeOne_shouldSendOneRequestPerSubtitle() {
    let mock = MockProvider::working();
    let (service, sink) = common::mock_service(mock.clone(), 1);

    service
        .translate(&common::units(4), "en", "fr", &CancellationSignal::new())
        .await
        .unwrap();

    assert_eq!(mock.call_count(), 4);
    assert!(mock.requests().iter().all(|request| request.text.starts_with("[1]\n")));
    assert_eq!(sink.progress_updates(), vec![(1, 4), (2, 4), (3, 4), (4, 4)]);
}

#[tokio::test(start_paused = true)]
async fn test_translate_withEmptyResponses_shouldRetryUntilExhausted() {
    let mock = MockProvider::empty();
    let sink = Arc::new(CaptureSink::new());
    let service = TranslationService::with_provider(
        common::mock_config(10, 0),
        Box::new(mock.clone()),
        sink.clone() as Arc<dyn LogSink>,
    )
    .with_retry_policy(RetryPolicy::new(4, Duration::from_millis(100), Duration::from_secs(1)));

    let error = service
        .translate(&common::units(3), "en", "fr", &CancellationSignal::new())
        .await
        .unwrap_err();

    assert_eq!(mock.call_count(), 4);
    match error {
        TranslationError::Batch { start, end, attempts, .. } => {
            assert_eq!((start, end, attempts), (0, 3, 4));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(sink.messages_at(Level::Warn).len(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_translate_withTransientFailure_shouldSucceedAfterRetry() {
    let mock = MockProvider::fail_times(2, || ProviderError::ConnectionError("connection reset".to_string()));
    let (service, sink) = common::mock_service(mock.clone(), 20);

    let translated = service
        .translate(&common::units(3), "en", "es", &CancellationSignal::new())
        .await
        .unwrap();

    assert_eq!(translated.len(), 3);
    assert_eq!(mock.call_count(), 3);
    assert!(sink.contains("connection reset"));
    assert!(sink.messages_at(Level::Error).is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_translate_withRpmLimit_shouldSpaceRequestsAcrossRetries() {
    let mock = MockProvider::fail_times(1, || ProviderError::RateLimited("429".to_string()));
    let sink = Arc::new(CaptureSink::new());
    let service = TranslationService::with_provider(
        common::mock_config(1, 30),
        Box::new(mock.clone()),
        sink as Arc<dyn LogSink>,
    )
    .with_retry_policy(RetryPolicy::new(3, Duration::from_millis(10), Duration::from_millis(10)));

    service
        .translate(&common::units(2), "en", "fr", &CancellationSignal::new())
        .await
        .unwrap();

    let calls: Vec<_> = mock.requests().into_iter().map(|request| request.at).collect();
    assert_eq!(calls.len(), 3);
    for pair in calls.windows(2) {
        assert!(pair[1] - pair[0] >= Duration::from_secs(2));
    }
}

#[tokio::test(start_paused = true)]
async fn test_translate_withCancelBeforeStart_shouldNotCallProvider() {
    let mock = MockProvider::working();
    let (service, _sink) = common::mock_service(mock.clone(), 5);
    let cancel = CancellationSignal::new();
    cancel.cancel();

    let result = service.translate(&common::units(3), "en", "fr", &cancel).await;

    assert!(matches!(result, Err(TranslationError::Cancelled)));
    assert_eq!(mock.call_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_translate_withCancelBetweenBatches_shouldStopAndDiscard() {
    let mock = MockProvider::slow(1_000);
    let (service, _sink) = common::mock_service(mock.clone(), 1);
    let cancel = CancellationSignal::new();

    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(1_500)).await;
        trigger.cancel();
    });

    let result = service.translate(&common::units(5), "en", "fr", &cancel).await;

    assert!(matches!(result, Err(TranslationError::Cancelled)));
    assert_eq!(mock.call_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_translate_withPartialAnswerThenRecovery_shouldMatchLinesToUnits() {
    let units: Vec<SubtitleEntry> = vec![
        SubtitleEntry::new(7, "00:01:00,000", "00:01:02,000", vec!["Seven".to_string()]),
        SubtitleEntry::new(9, "00:01:03,000", "00:01:05,000", vec!["Nine".to_string()]),
    ];
    let mock = MockProvider::fail_on_call(0, || ProviderError::CountMismatch { expected: 2, received: 1 });
    let (service, _sink) = common::mock_service(mock, 10);

    let translated = service
        .translate(&units, "en", "it", &CancellationSignal::new())
        .await
        .unwrap();

    assert_eq!(translated[0].index, 7);
    assert_eq!(translated[0].translated_lines, vec!["[it] Seven"]);
    assert_eq!(translated[1].index, 9);
    assert_eq!(translated[1].translated_lines, vec!["[it] Nine"]);
}
