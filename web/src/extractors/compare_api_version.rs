use crate::extractors::RejectionType;
use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
};
use semver::Version;
use service::config::ApiVersion;

/// Requires a parseable, supported `x-version` header on the request.
#[derive(Debug)]
pub(crate) struct CompareApiVersion(pub Version);

impl<S> FromRequestParts<S> for CompareApiVersion
where
    S: Send + Sync,
{
    type Rejection = RejectionType;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(ApiVersion::field_name())
            .and_then(|value| value.to_str().ok())
            .ok_or((
                StatusCode::BAD_REQUEST,
                format!("Missing {} header", ApiVersion::field_name()),
            ))?;

        let version = Version::parse(header).map_err(|_| {
            (
                StatusCode::BAD_REQUEST,
                format!("Invalid {} header: {header}", ApiVersion::field_name()),
            )
        })?;

        if !ApiVersion::versions().contains(&header) {
            return Err((
                StatusCode::BAD_REQUEST,
                format!("Unsupported API version: {header}"),
            ));
        }

        Ok(CompareApiVersion(version))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn extract(request: Request<()>) -> Result<CompareApiVersion, RejectionType> {
        let (mut parts, _) = request.into_parts();
        CompareApiVersion::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn accepts_the_current_version() {
        let request = Request::builder()
            .header("x-version", ApiVersion::default_version())
            .body(())
            .unwrap();
        let CompareApiVersion(version) = extract(request).await.unwrap();
        assert_eq!(version.to_string(), ApiVersion::default_version());
    }

    #[tokio::test]
    async fn missing_header_is_a_bad_request() {
        let request = Request::builder().body(()).unwrap();
        let (status, _) = extract(request).await.unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unknown_version_is_rejected() {
        let request = Request::builder()
            .header("x-version", "0.0.1")
            .body(())
            .unwrap();
        let (status, message) = extract(request).await.unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(message.contains("Unsupported"));
    }
}
