//! Zoom REST API client for cloud recording access.
//!
//! Every outbound call goes through the shared process-wide rate limiter
//! before dispatch. A 429 answer reports the throttle to the limiter and is
//! retried exactly once after the limiter's updated spacing; a second 429
//! surfaces as `ApiErrorKind::RateLimited`.

use crate::error::{ApiErrorKind, DomainErrorKind, Error, ExternalErrorKind};
use bytes::Bytes;
use chrono::{Duration as ChronoDuration, NaiveDate, Utc};
use futures::Stream;
use log::*;
use serde::Deserialize;
use session_auth::http::RateLimiter;
use std::sync::Arc;
use std::time::Duration;

/// Zoom caps `page_size` at 300; larger requests are clamped, not rejected.
const MAX_PAGE_SIZE: u32 = 300;

/// Default listing window when the caller supplies no dates.
const DEFAULT_WINDOW_DAYS: i64 = 30;

/// Timeout for recording downloads, which can run to gigabytes.
const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(300);

/// One page of a user's cloud recordings, as returned by
/// `GET /users/me/recordings`.
#[derive(Debug, Deserialize)]
pub struct RecordingPage {
    #[serde(default)]
    pub meetings: Vec<MeetingRecording>,
    pub page_count: u32,
    pub page_number: u32,
    pub page_size: u32,
    pub total_records: u32,
}

/// Recordings attached to a single meeting occurrence.
#[derive(Debug, Clone, Deserialize)]
pub struct MeetingRecording {
    pub id: Option<i64>,
    pub uuid: String,
    #[serde(default)]
    pub topic: String,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub duration: Option<i64>,
    #[serde(default)]
    pub recording_files: Vec<RecordingFile>,
}

/// One downloadable artifact within a meeting recording.
///
/// `download_url` is a time-limited locator; Zoom answers 404 once it
/// expires, which the client maps to `NotFound` rather than a generic fault.
#[derive(Debug, Clone, Deserialize)]
pub struct RecordingFile {
    pub id: String,
    #[serde(default)]
    pub file_type: String,
    #[serde(default)]
    pub file_extension: String,
    #[serde(default)]
    pub file_size: Option<u64>,
    #[serde(default)]
    pub recording_type: String,
    pub download_url: String,
}

/// Error body Zoom attaches to non-2xx answers.
#[derive(Debug, Deserialize, Default)]
struct ZoomErrorBody {
    #[serde(default)]
    code: Option<i64>,
    #[serde(default)]
    message: String,
}

/// Query parameters for a recordings listing.
#[derive(Debug, Clone, Default)]
pub struct ListRecordingsParams {
    /// Inclusive start date; defaults to 30 days before `to`.
    pub from: Option<NaiveDate>,
    /// Inclusive end date; defaults to today.
    pub to: Option<NaiveDate>,
    /// Records per page, clamped to Zoom's cap of 300.
    pub page_size: Option<u32>,
    /// 1-based page number.
    pub page_number: Option<u32>,
}

/// Zoom REST API client.
pub struct ZoomApiClient {
    client: reqwest::Client,
    base_url: String,
    rate_limiter: Arc<RateLimiter>,
}

impl ZoomApiClient {
    /// Create a new Zoom API client sharing the given rate limiter.
    pub fn new(base_url: &str, rate_limiter: Arc<RateLimiter>) -> Result<Self, Error> {
        let client = reqwest::Client::builder()
            .use_rustls_tls()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            rate_limiter,
        })
    }

    /// List cloud recordings for the authorized user, one page at a time.
    pub async fn list_recordings(
        &self,
        access_token: &str,
        params: ListRecordingsParams,
    ) -> Result<RecordingPage, Error> {
        let today = Utc::now().date_naive();
        let to = params.to.unwrap_or(today);
        let from = params
            .from
            .unwrap_or_else(|| to - ChronoDuration::days(DEFAULT_WINDOW_DAYS));
        let page_size = params.page_size.unwrap_or(30).min(MAX_PAGE_SIZE);
        let page_number = params.page_number.unwrap_or(1).max(1);

        let url = format!("{}/users/me/recordings", self.base_url);
        let query = [
            ("from", from.format("%Y-%m-%d").to_string()),
            ("to", to.format("%Y-%m-%d").to_string()),
            ("page_size", page_size.to_string()),
            ("page_number", page_number.to_string()),
        ];

        let response = self
            .get_with_throttle_retry(&url, &query, access_token)
            .await?;

        response.json::<RecordingPage>().await.map_err(|e| {
            warn!("Malformed recordings listing from Zoom: {:?}", e);
            Error {
                source: Some(Box::new(e)),
                error_kind: DomainErrorKind::External(ExternalErrorKind::Api(
                    ApiErrorKind::InvalidRequest,
                )),
            }
        })
    }

    /// Get the recordings attached to one meeting.
    ///
    /// Meeting UUIDs that start with `/` or contain `//` must be
    /// double-URL-encoded per the Zoom API contract.
    pub async fn get_meeting_recordings(
        &self,
        access_token: &str,
        meeting_id: &str,
    ) -> Result<MeetingRecording, Error> {
        let encoded = encode_meeting_id(meeting_id);
        let url = format!("{}/meetings/{}/recordings", self.base_url, encoded);

        let response = self.get_with_throttle_retry(&url, &[], access_token).await?;

        response.json::<MeetingRecording>().await.map_err(|e| {
            warn!("Malformed meeting recording payload from Zoom: {:?}", e);
            Error {
                source: Some(Box::new(e)),
                error_kind: DomainErrorKind::External(ExternalErrorKind::Api(
                    ApiErrorKind::InvalidRequest,
                )),
            }
        })
    }

    /// Download a recording file as a byte stream.
    ///
    /// The body is streamed rather than buffered; callers decide whether to
    /// collect it. An expired download locator answers 404 and maps to
    /// `NotFound` so callers know to re-list rather than retry. Throttle
    /// responses feed the shared limiter and get the same single retry as
    /// every other Zoom call.
    pub async fn download_recording_file(
        &self,
        access_token: &str,
        download_url: &str,
    ) -> Result<impl Stream<Item = Result<Bytes, reqwest::Error>>, Error> {
        self.rate_limiter.acquire().await;

        debug!("Downloading recording file from {}", download_url);

        let mut response = self
            .client
            .get(download_url)
            .bearer_auth(access_token)
            .timeout(DOWNLOAD_TIMEOUT)
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            warn!("Zoom throttled download of {}, retrying once", download_url);
            self.rate_limiter.report_throttled().await;
            self.rate_limiter.acquire().await;

            response = self
                .client
                .get(download_url)
                .bearer_auth(access_token)
                .timeout(DOWNLOAD_TIMEOUT)
                .send()
                .await?;

            if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
                self.rate_limiter.report_throttled().await;
                return Err(Error {
                    source: None,
                    error_kind: DomainErrorKind::External(ExternalErrorKind::Api(
                        ApiErrorKind::RateLimited,
                    )),
                });
            }
        }

        let response = self.check_status(response).await?;
        Ok(response.bytes_stream())
    }

    /// GET with bearer auth, rate limiting, and the single throttle retry.
    async fn get_with_throttle_retry(
        &self,
        url: &str,
        query: &[(&str, String)],
        access_token: &str,
    ) -> Result<reqwest::Response, Error> {
        self.rate_limiter.acquire().await;

        let response = self
            .client
            .get(url)
            .query(query)
            .bearer_auth(access_token)
            .send()
            .await?;

        if response.status() != reqwest::StatusCode::TOO_MANY_REQUESTS {
            return self.check_status(response).await;
        }

        warn!("Zoom throttled request to {}, retrying once", url);
        self.rate_limiter.report_throttled().await;
        self.rate_limiter.acquire().await;

        let response = self
            .client
            .get(url)
            .query(query)
            .bearer_auth(access_token)
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            self.rate_limiter.report_throttled().await;
            return Err(Error {
                source: None,
                error_kind: DomainErrorKind::External(ExternalErrorKind::Api(
                    ApiErrorKind::RateLimited,
                )),
            });
        }

        self.check_status(response).await
    }

    async fn check_status(&self, response: reqwest::Response) -> Result<reqwest::Response, Error> {
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            Err(self.classify_failure(status, response).await)
        }
    }

    /// Map a non-success Zoom status onto the domain API error taxonomy.
    async fn classify_failure(
        &self,
        status: reqwest::StatusCode,
        response: reqwest::Response,
    ) -> Error {
        let body: ZoomErrorBody = response.json().await.unwrap_or_default();
        error!(
            "Zoom API answered {}: code={:?} message={}",
            status, body.code, body.message
        );

        let api_kind = match status.as_u16() {
            401 => ApiErrorKind::AuthExpired,
            404 => ApiErrorKind::NotFound,
            400 | 422 => ApiErrorKind::InvalidRequest,
            429 => ApiErrorKind::RateLimited,
            s if s >= 500 => ApiErrorKind::Transient,
            _ => {
                return Error {
                    source: None,
                    error_kind: DomainErrorKind::External(ExternalErrorKind::Other(body.message)),
                }
            }
        };

        Error {
            source: None,
            error_kind: DomainErrorKind::External(ExternalErrorKind::Api(api_kind)),
        }
    }
}

/// Double-encode meeting UUIDs that begin with `/` or contain `//`.
///
/// Zoom requires these UUIDs to be URL-encoded twice or the path segment
/// is misparsed server-side.
fn encode_meeting_id(meeting_id: &str) -> String {
    if meeting_id.starts_with('/') || meeting_id.contains("//") {
        urlencoding::encode(&urlencoding::encode(meeting_id).into_owned()).into_owned()
    } else {
        urlencoding::encode(meeting_id).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use session_auth::http::RateLimiterConfig;

    fn client_for(server: &mockito::ServerGuard) -> ZoomApiClient {
        // Tiny spacings so wire tests run at full speed
        let limiter = Arc::new(RateLimiter::new(RateLimiterConfig {
            base_spacing: Duration::from_millis(1),
            max_spacing: Duration::from_millis(8),
            quiet_period: Duration::from_secs(60),
        }));
        ZoomApiClient::new(&server.url(), limiter).unwrap()
    }

    fn page_body(meetings: usize, total_records: u32, page_size: u32) -> String {
        let meeting = serde_json::json!({
            "id": 123456789,
            "uuid": "abcd1234==",
            "topic": "Weekly coaching",
            "start_time": "2026-08-12T15:00:00Z",
            "duration": 45,
            "recording_files": [{
                "id": "file-1",
                "file_type": "M4A",
                "file_extension": "M4A",
                "file_size": 1048576,
                "recording_type": "audio_only",
                "download_url": "https://example.invalid/rec/file-1"
            }]
        });
        serde_json::json!({
            "meetings": vec![meeting; meetings],
            "page_count": total_records.div_ceil(page_size),
            "page_number": 1,
            "page_size": page_size,
            "total_records": total_records,
        })
        .to_string()
    }

    #[tokio::test]
    async fn test_list_recordings_parses_envelope() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/users/me/recordings")
            .match_query(mockito::Matcher::Regex(
                "from=\\d{4}-\\d{2}-\\d{2}.*page_number=1.*page_size=30".to_string(),
            ))
            .with_status(200)
            .with_body(page_body(2, 2, 30))
            .create_async()
            .await;

        let client = client_for(&server);
        let page = client
            .list_recordings("token", ListRecordingsParams::default())
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(page.meetings.len(), 2);
        assert_eq!(page.total_records, 2);
        assert_eq!(page.meetings[0].recording_files[0].file_type, "M4A");
    }

    #[tokio::test]
    async fn test_page_count_math_87_records_page_size_30() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/users/me/recordings")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body(page_body(30, 87, 30))
            .create_async()
            .await;

        let client = client_for(&server);
        let page = client
            .list_recordings(
                "token",
                ListRecordingsParams {
                    page_size: Some(30),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(page.page_count, 3);
        assert!(page.meetings.len() <= page.page_size as usize);
    }

    #[tokio::test]
    async fn test_page_size_clamped_to_300() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/users/me/recordings")
            .match_query(mockito::Matcher::Regex("page_size=300".to_string()))
            .with_status(200)
            .with_body(page_body(0, 0, 300))
            .create_async()
            .await;

        let client = client_for(&server);
        client
            .list_recordings(
                "token",
                ListRecordingsParams {
                    page_size: Some(1000),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_expired_access_token_is_auth_expired() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/users/me/recordings")
            .match_query(mockito::Matcher::Any)
            .with_status(401)
            .with_body(r#"{"code": 124, "message": "Invalid access token."}"#)
            .create_async()
            .await;

        let client = client_for(&server);
        let err = client
            .list_recordings("stale", ListRecordingsParams::default())
            .await
            .unwrap_err();

        assert_eq!(
            err.error_kind,
            DomainErrorKind::External(ExternalErrorKind::Api(ApiErrorKind::AuthExpired))
        );
    }

    #[tokio::test]
    async fn test_persistent_throttle_retries_once_then_rate_limited() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/users/me/recordings")
            .match_query(mockito::Matcher::Any)
            .with_status(429)
            .with_body("{}")
            .expect(2)
            .create_async()
            .await;

        let client = client_for(&server);
        let err = client
            .list_recordings("token", ListRecordingsParams::default())
            .await
            .unwrap_err();

        // Exactly one retry: two hits total, then the failure surfaces
        mock.assert_async().await;
        assert_eq!(
            err.error_kind,
            DomainErrorKind::External(ExternalErrorKind::Api(ApiErrorKind::RateLimited))
        );
        // Both throttle signals doubled the spacing: 1ms -> 2ms -> 4ms
        assert_eq!(
            client.rate_limiter.current_spacing().await,
            Duration::from_millis(4)
        );
    }

    #[tokio::test]
    async fn test_download_streams_bytes() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/rec/file-1")
            .with_status(200)
            .with_body(vec![0u8; 4096])
            .create_async()
            .await;

        let client = client_for(&server);
        let stream = client
            .download_recording_file("token", &format!("{}/rec/file-1", server.url()))
            .await
            .unwrap();

        let chunks: Vec<_> = stream.collect().await;
        let total: usize = chunks.into_iter().map(|c| c.unwrap().len()).sum();
        assert_eq!(total, 4096);
    }

    #[tokio::test]
    async fn test_throttled_download_reports_and_retries_once() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/rec/file-1")
            .with_status(429)
            .with_body("{}")
            .expect(2)
            .create_async()
            .await;

        let client = client_for(&server);
        let err = client
            .download_recording_file("token", &format!("{}/rec/file-1", server.url()))
            .await
            .err()
            .unwrap();

        // Exactly one retry: two hits total, then the failure surfaces
        mock.assert_async().await;
        assert_eq!(
            err.error_kind,
            DomainErrorKind::External(ExternalErrorKind::Api(ApiErrorKind::RateLimited))
        );
        // Both throttle signals doubled the spacing: 1ms -> 2ms -> 4ms
        assert_eq!(
            client.rate_limiter.current_spacing().await,
            Duration::from_millis(4)
        );
    }

    #[tokio::test]
    async fn test_expired_download_locator_is_not_found() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/rec/expired")
            .with_status(404)
            .with_body(r#"{"code": 3301, "message": "This recording does not exist."}"#)
            .create_async()
            .await;

        let client = client_for(&server);
        let err = client
            .download_recording_file("token", &format!("{}/rec/expired", server.url()))
            .await
            .err()
            .unwrap();

        assert_eq!(
            err.error_kind,
            DomainErrorKind::External(ExternalErrorKind::Api(ApiErrorKind::NotFound))
        );
    }

    #[test]
    fn test_meeting_id_double_encoding() {
        assert_eq!(encode_meeting_id("abcd1234=="), "abcd1234%3D%3D");
        // Slash-prefixed UUIDs get encoded twice
        assert_eq!(encode_meeting_id("/ab//cd"), "%252Fab%252F%252Fcd");
    }
}
