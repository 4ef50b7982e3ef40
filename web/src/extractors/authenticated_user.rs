use crate::extractors::RejectionType;
use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
};

static X_USER_ID: &str = "x-user-id";

/// The caller identity asserted by the authenticating reverse proxy.
#[derive(Debug)]
pub(crate) struct AuthenticatedUser(pub String);

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = RejectionType;

    // Extracts the caller's user id from the x-user-id header. Requests
    // without the header (or with a non-UTF-8 or empty value) are rejected
    // as Unauthorized before any handler runs.
    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get(X_USER_ID)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty());

        match user_id {
            Some(user_id) => Ok(AuthenticatedUser(user_id.to_string())),
            None => Err((StatusCode::UNAUTHORIZED, "Unauthorized".to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn extract(request: Request<()>) -> Result<AuthenticatedUser, RejectionType> {
        let (mut parts, _) = request.into_parts();
        AuthenticatedUser::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn extracts_the_user_id_header() {
        let request = Request::builder()
            .header("x-user-id", "user-42")
            .body(())
            .unwrap();
        let AuthenticatedUser(user_id) = extract(request).await.unwrap();
        assert_eq!(user_id, "user-42");
    }

    #[tokio::test]
    async fn missing_header_is_unauthorized() {
        let request = Request::builder().body(()).unwrap();
        let (status, _) = extract(request).await.unwrap_err();
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn blank_header_is_unauthorized() {
        let request = Request::builder()
            .header("x-user-id", "   ")
            .body(())
            .unwrap();
        let (status, _) = extract(request).await.unwrap_err();
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}
