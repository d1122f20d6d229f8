//! Integration tests for a full emit against a wiremock receiver

use chrono::{DateTime, Utc};
use serde_json::{Value, json};
use sts_emitter_lib::{Config, EvaluationContext, MetricDisposition, emit};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

const EVENT_PATH: &str = "/receiver/stsAgent/intake";
const METRIC_PATH: &str = "/receiver/stsAgent/api/v1/series";
const API_KEY: &str = "test-key";

fn now() -> DateTime<Utc> {
    DateTime::from_timestamp(1_700_000_000, 0).unwrap()
}

fn config_for(server: &MockServer) -> Config {
    let mut config = Config {
        api_url: server.uri(),
        api_key: API_KEY.to_string(),
        metric_name: "'emitter.presence'".to_string(),
        ..Config::default()
    };

    config.event.title = "body.name + ' finished'".to_string();
    config.event.text = "'Deployment of ' + body.name".to_string();
    config.event.identifier = "'urn:host:test:' + body.host".to_string();
    config.event.link_title = "'Pipeline'".to_string();
    config.event.link_url = "'https://ci.example.com/' + body.run".to_string();
    config.event.tags = vec!["'env:' + body.env".to_string(), "'plain'".to_string()];
    config
}

fn context() -> EvaluationContext {
    EvaluationContext::try_from(json!({
        "name": "checkout",
        "host": "web1",
        "env": "prod",
        "run": "42"
    }))
    .unwrap()
}

async fn mount(server: &MockServer, route: &str, status: u16) {
    Mock::given(method("POST"))
        .and(path(route))
        .and(query_param("api_key", API_KEY))
        .and(header("content-type", "application/json"))
        .respond_with(ResponseTemplate::new(status).set_body_string(format!("status {status}")))
        .mount(server)
        .await;
}

async fn requests_to(server: &MockServer, route: &str) -> Vec<Request> {
    server
        .received_requests()
        .await
        .unwrap()
        .into_iter()
        .filter(|r| r.url.path() == route)
        .collect()
}

fn json_body(request: &Request) -> Value {
    serde_json::from_slice(&request.body).unwrap()
}

#[tokio::test]
async fn test_event_and_metric_accepted() {
    let server = MockServer::start().await;
    mount(&server, EVENT_PATH, 200).await;
    mount(&server, METRIC_PATH, 200).await;

    let outcome = emit(&config_for(&server), &context(), now()).await.unwrap();
    assert_eq!(outcome.metric, MetricDisposition::Sent);

    let events = requests_to(&server, EVENT_PATH).await;
    assert_eq!(events.len(), 1);
    let body = json_body(&events[0]);

    assert_eq!(body["collection_timestamp"], 1_700_000_000);
    assert_eq!(body["internalHostname"], "localhost");
    assert_eq!(body["metrics"], json!([]));
    assert_eq!(body["service_checks"], json!([]));
    assert_eq!(body["health"], json!([]));
    assert_eq!(body["topologies"], json!([]));

    let event = &body["events"]["emitter_event"][0];
    assert_eq!(event["msg_title"], "checkout finished");
    assert_eq!(event["msg_text"], "Deployment of checkout");
    assert_eq!(event["event_type"], "Emitter Event");
    assert_eq!(event["source_type_name"], "emitter");
    assert_eq!(event["timestamp"], 1_700_000_000);
    assert_eq!(event["tags"], json!(["env:prod", "plain"]));
    assert_eq!(event["context"]["category"], "Alerts");
    assert_eq!(event["context"]["source"], "emitter");
    assert_eq!(event["context"]["data"], json!({}));
    assert_eq!(event["context"]["element_identifiers"], json!(["urn:host:test:web1"]));
    assert_eq!(
        event["context"]["source_links"],
        json!([{"title": "Pipeline", "url": "https://ci.example.com/42"}])
    );

    let metrics = requests_to(&server, METRIC_PATH).await;
    assert_eq!(metrics.len(), 1);
    assert_eq!(
        json_body(&metrics[0]),
        json!({
            "series": [{
                "metric": "emitter.presence",
                "points": [[1_700_000_000, 1.0]],
                "tags": ["env:prod", "event_type:Emitter Event", "identifier:urn:host:test:web1"],
                "host": "urn:host:test:web1",
                "type": "gauge",
                "interval": 0,
                "source_type_name": "emitter"
            }]
        })
    );
}

#[tokio::test]
async fn test_metric_failure_is_not_fatal() {
    let server = MockServer::start().await;
    mount(&server, EVENT_PATH, 200).await;
    mount(&server, METRIC_PATH, 500).await;

    let outcome = emit(&config_for(&server), &context(), now()).await.unwrap();
    match &outcome.metric {
        MetricDisposition::Failed(reason) => assert!(reason.contains("500"), "{reason}"),
        other => panic!("expected a failed metric, got {other:?}"),
    }
    assert_eq!(requests_to(&server, METRIC_PATH).await.len(), 1);
}

#[tokio::test]
async fn test_event_failure_skips_metric() {
    let server = MockServer::start().await;
    mount(&server, EVENT_PATH, 500).await;

    Mock::given(method("POST"))
        .and(path(METRIC_PATH))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let result = emit(&config_for(&server), &context(), now()).await;
    assert!(result.is_err());
    assert_eq!(requests_to(&server, EVENT_PATH).await.len(), 1);
}

#[tokio::test]
async fn test_non_200_success_code_is_a_failure() {
    let server = MockServer::start().await;
    mount(&server, EVENT_PATH, 202).await;

    let result = emit(&config_for(&server), &context(), now()).await;
    assert!(result.is_err());
    assert!(requests_to(&server, METRIC_PATH).await.is_empty());
}

#[tokio::test]
async fn test_trailing_slash_in_base_url() {
    let server = MockServer::start().await;
    mount(&server, EVENT_PATH, 200).await;

    let mut config = config_for(&server);
    config.api_url = format!("{}/", server.uri());
    config.metric_name = String::new();

    let outcome = emit(&config, &context(), now()).await.unwrap();
    assert_eq!(outcome.metric, MetricDisposition::NotRequested);
    assert_eq!(requests_to(&server, EVENT_PATH).await.len(), 1);
}

#[tokio::test]
async fn test_metric_skipped_without_identifier() {
    let server = MockServer::start().await;
    mount(&server, EVENT_PATH, 200).await;

    let mut config = config_for(&server);
    config.event.identifier = "''".to_string();

    let outcome = emit(&config, &context(), now()).await.unwrap();
    assert_eq!(outcome.metric, MetricDisposition::Skipped);
    assert!(requests_to(&server, METRIC_PATH).await.is_empty());

    let body = json_body(&requests_to(&server, EVENT_PATH).await[0]);
    assert_eq!(body["events"]["emitter_event"][0]["context"]["element_identifiers"], json!([]));
}

#[tokio::test]
async fn test_defaults_with_empty_body() {
    let server = MockServer::start().await;
    mount(&server, EVENT_PATH, 200).await;

    let config = Config {
        api_url: server.uri(),
        api_key: API_KEY.to_string(),
        ..Config::default()
    };

    let outcome = emit(&config, &EvaluationContext::parse(None).unwrap(), now()).await.unwrap();
    assert_eq!(outcome.metric, MetricDisposition::NotRequested);

    let body = json_body(&requests_to(&server, EVENT_PATH).await[0]);
    let event = &body["events"]["emitter_event"][0];
    assert_eq!(body["internalHostname"], "localhost");
    assert_eq!(event["msg_title"], "");
    assert_eq!(event["msg_text"], "");
    assert_eq!(event["tags"], json!([]));
    assert_eq!(event["context"]["source_links"], json!([]));
    assert_eq!(event["context"]["category"], "Alerts");
    assert_eq!(event["event_type"], "Emitter Event");
}

#[tokio::test]
async fn test_template_failure_sends_nothing() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut config = config_for(&server);
    config.event.tags.push("body.missing_key".to_string());

    let err = emit(&config, &context(), now()).await.unwrap_err();
    assert!(err.to_string().contains("tags[2]"), "{err}");
}
