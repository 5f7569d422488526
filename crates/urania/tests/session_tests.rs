mod common;

use chrono::{Duration, TimeZone, Utc};
use common::MockApi;
use urania::upstream::UpstreamError;
use urania::{render_body, ReportEnvelope, ReportLoader, ReportState};

fn token_at(hours_ago: i64) -> (String, chrono::DateTime<Utc>) {
    let now = Utc.with_ymd_and_hms(2024, 3, 2, 9, 30, 0).unwrap();
    let envelope = ReportEnvelope::new(common::paris_request(), now - Duration::hours(hours_ago));
    (envelope.encode(), now)
}

#[tokio::test]
async fn test_malformed_token() {
    let api = MockApi::new();
    let state = ReportLoader::new().load(&api, "definitely-not-a-token", Utc::now()).await;
    assert!(matches!(state, Some(ReportState::Malformed)));
    assert!(api.calls().is_empty());
}

#[tokio::test]
async fn test_expired_token_fetches_nothing() {
    let api = MockApi::new();
    let (token, now) = token_at(25);
    let state = ReportLoader::new().load(&api, &token, now).await;
    assert!(matches!(state, Some(ReportState::Expired)));
    assert!(api.calls().is_empty());
}

#[tokio::test]
async fn test_ready_report() {
    let api = MockApi::new();
    let (token, now) = token_at(2);
    let Some(ReportState::Ready(report)) = ReportLoader::new().load(&api, &token, now).await else {
        panic!("expected a ready report");
    };

    assert_eq!(report.request().city, "Paris");
    assert_eq!(report.chart_svg.as_deref(), Some(common::CHART_SVG));
    assert_eq!(report.chart.aspects_summary.total, report.chart.aspects.len());
    assert_eq!(report.view.subject.timezone.as_deref(), Some("Europe/Paris"));
    assert_eq!(report.view.aspects.len(), 6);

    let mut calls = api.calls();
    calls.sort();
    assert_eq!(calls, vec!["chart:Ada Example", "natal:Ada Example"]);
}

#[tokio::test]
async fn test_chart_failure_still_renders() {
    let mut api = MockApi::new();
    api.svg = Err(UpstreamError::Timeout);
    let (token, now) = token_at(1);
    let Some(ReportState::Ready(report)) = ReportLoader::new().load(&api, &token, now).await else {
        panic!("expected a ready report without chart");
    };
    assert_eq!(report.chart_svg, None);

    let body = render_body(&report.view);
    assert!(body.text_content(body.root()).contains("Chart image unavailable."));
}

#[tokio::test]
async fn test_natal_failure_reports_retryability() {
    let mut api = MockApi::new();
    api.natal = Err(UpstreamError::Timeout);
    let (token, now) = token_at(1);
    match ReportLoader::new().load(&api, &token, now).await {
        Some(ReportState::Failed { retryable, .. }) => assert!(retryable),
        other => panic!("unexpected state {:?}", other),
    }

    let mut api = MockApi::new();
    api.natal = Err(UpstreamError::Http {
        status: 422,
        body: "bad birth data".into(),
    });
    match ReportLoader::new().load(&api, &token, now).await {
        Some(ReportState::Failed { message, retryable }) => {
            assert!(!retryable);
            assert!(message.contains("422"));
        }
        other => panic!("unexpected state {:?}", other),
    }
}

#[tokio::test]
async fn test_cancelled_load_commits_nothing() {
    let api = MockApi::new();
    let (token, now) = token_at(1);
    let loader = ReportLoader::new();
    let handle = loader.clone();
    handle.cancel();
    assert!(loader.is_cancelled());
    assert!(loader.load(&api, &token, now).await.is_none());
    assert!(loader.load(&api, "garbage", now).await.is_none());
}
