use serde_json::Value;
use tokio::time::sleep;
use tracing::info;

use crate::structs::{AnalysisSummary, IzError, PollParams};
use crate::IzClient;

/// Error body the API returns while an analysis is still running.
const ANALYSIS_PENDING: &str = "Image analysis not complete";

/// Fetches the results summary for an upload, without retrying.
pub async fn get_summary(client: &IzClient, upload_id: &str) -> Result<AnalysisSummary, IzError> {
    let value = client
        .get(&format!("/upload-results-summary/{}", upload_id))
        .await?;
    Ok(serde_json::from_value(value)?)
}

/// Polls until the analysis of `upload_id` completes, with [PollParams::default].
pub async fn wait_for_summary(
    client: &IzClient,
    upload_id: &str,
) -> Result<AnalysisSummary, IzError> {
    wait_for_summary_with(client, upload_id, &PollParams::default()).await
}

/// Polls the results summary endpoint until the analysis completes.
///
/// Only the "analysis not complete" error converts into a retry; any other
/// failure, including an error body with a different message or no JSON body
/// at all, propagates on the first occurrence.
///
/// # Arguments
///
/// * `client` - An authenticated client.
/// * `upload_id` - Id returned by [upload_and_analyze](crate::upload_and_analyze).
/// * `params` - Poll interval and optional attempt limit.
///
/// # Returns
///
/// * A Result wrapping the parsed summary, or [IzError::PollTimeout] when an
///   attempt limit is set and reached.
pub async fn wait_for_summary_with(
    client: &IzClient,
    upload_id: &str,
    params: &PollParams,
) -> Result<AnalysisSummary, IzError> {
    let mut attempts: u32 = 0;
    loop {
        match get_summary(client, upload_id).await {
            Ok(summary) => return Ok(summary),
            Err(IzError::Api { ref body, .. }) if is_pending(body) => {
                attempts += 1;
                if let Some(max) = params.max_attempts {
                    if attempts >= max {
                        return Err(IzError::PollTimeout { attempts });
                    }
                }
                info!(
                    "image analysis not complete, retrying in {:?}",
                    params.interval
                );
                sleep(params.interval).await;
            }
            Err(e) => return Err(e),
        }
    }
}

fn is_pending(body: &Value) -> bool {
    body.get("error").and_then(Value::as_str) == Some(ANALYSIS_PENDING)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::connect_mock_client;
    use crate::upload_and_analyze;
    use reqwest::StatusCode;
    use serde_json::json;
    use std::io::Write;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fast_params(max_attempts: Option<u32>) -> PollParams {
        PollParams {
            interval: Duration::from_millis(10),
            max_attempts,
        }
    }

    fn completed_summary() -> serde_json::Value {
        json!({
            "filePath": "a.jpg",
            "passing": true,
            "referenceValuesUsed": "defaults",
            "spec": "v1",
            "targetType": "x",
            "metricGroups": []
        })
    }

    fn pending_response() -> ResponseTemplate {
        ResponseTemplate::new(409).set_body_json(json!({ "error": "Image analysis not complete" }))
    }

    #[tokio::test]
    async fn retries_while_pending_then_returns_summary() {
        let server = MockServer::start().await;
        let client = connect_mock_client(&server).await;

        // First poll sees the pending error, the second the finished summary.
        Mock::given(method("GET"))
            .and(path("/upload-results-summary/u1"))
            .respond_with(pending_response())
            .up_to_n_times(1)
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/upload-results-summary/u1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completed_summary()))
            .expect(1)
            .mount(&server)
            .await;

        let summary = wait_for_summary_with(&client, "u1", &fast_params(None))
            .await
            .unwrap();
        assert_eq!(summary.file_path, "a.jpg");
        assert!(summary.passing);
        assert!(summary.metric_groups.is_empty());
    }

    #[tokio::test]
    async fn other_error_bodies_propagate_on_first_attempt() {
        let server = MockServer::start().await;
        let client = connect_mock_client(&server).await;

        Mock::given(method("GET"))
            .and(path("/upload-results-summary/u2"))
            .respond_with(
                ResponseTemplate::new(409).set_body_json(json!({ "error": "Upload corrupted" })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let err = wait_for_summary_with(&client, "u2", &fast_params(None))
            .await
            .unwrap_err();
        match err {
            IzError::Api { status, body } => {
                assert_eq!(status, StatusCode::CONFLICT);
                assert_eq!(body["error"], "Upload corrupted");
            }
            other => panic!("expected Api error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn non_json_error_propagates_on_first_attempt() {
        let server = MockServer::start().await;
        let client = connect_mock_client(&server).await;

        Mock::given(method("GET"))
            .and(path("/upload-results-summary/u3"))
            .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
            .expect(1)
            .mount(&server)
            .await;

        let err = wait_for_summary_with(&client, "u3", &fast_params(None))
            .await
            .unwrap_err();
        match err {
            IzError::Api { status, body } => {
                assert_eq!(status, StatusCode::BAD_GATEWAY);
                assert_eq!(body, json!({}));
            }
            other => panic!("expected Api error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn bounded_poll_gives_up_after_max_attempts() {
        let server = MockServer::start().await;
        let client = connect_mock_client(&server).await;

        Mock::given(method("GET"))
            .and(path("/upload-results-summary/u4"))
            .respond_with(pending_response())
            .expect(3)
            .mount(&server)
            .await;

        let err = wait_for_summary_with(&client, "u4", &fast_params(Some(3)))
            .await
            .unwrap_err();
        match err {
            IzError::PollTimeout { attempts } => assert_eq!(attempts, 3),
            other => panic!("expected PollTimeout, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn end_to_end_upload_then_poll() {
        let server = MockServer::start().await;
        let client = connect_mock_client(&server).await;

        let dir = tempfile::tempdir().unwrap();
        let image = dir.path().join("a.jpg");
        std::fs::File::create(&image)
            .unwrap()
            .write_all(b"fake image bytes")
            .unwrap();

        Mock::given(method("GET"))
            .and(path("/presigned-urls/a.jpg"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "url": format!("{}/storage", server.uri()),
                "fields": [{ "key": "k", "value": "v" }],
                "uploadId": "u1"
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/storage"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/requests-for-analysis/u1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/upload-results-summary/u1"))
            .respond_with(pending_response())
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/upload-results-summary/u1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completed_summary()))
            .mount(&server)
            .await;

        let upload_id = upload_and_analyze(&client, &image, None).await.unwrap();
        let summary = wait_for_summary_with(&client, &upload_id, &fast_params(None))
            .await
            .unwrap();

        assert_eq!(summary.file_path, "a.jpg");
        assert!(summary.passing);
        assert_eq!(summary.reference_values_used, "defaults");
        assert_eq!(summary.spec, "v1");
        assert_eq!(summary.target_type, "x");
        assert!(summary.metric_groups.is_empty());
    }
}
