use image_labels_shared::error::ServiceError;
use lambda_http::{Request, RequestExt};

/// The gateway's identity-provider authorizer validates the token before the
/// function runs; here we only insist that a bearer token was presented.
pub(crate) fn require_bearer(event: &Request) -> Result<(), ServiceError> {
    let header = event
        .headers()
        .get("Authorization")
        .ok_or_else(|| ServiceError::Unauthorized("Missing Authorization header".to_string()))?
        .to_str()
        .map_err(|_| ServiceError::Unauthorized("Malformed Authorization header".to_string()))?;

    let (scheme, token) = header
        .split_once(' ')
        .ok_or_else(|| ServiceError::Unauthorized("Expected a bearer token".to_string()))?;

    if !scheme.eq_ignore_ascii_case("bearer") || token.trim().is_empty() {
        return Err(ServiceError::Unauthorized("Expected a bearer token".to_string()));
    }
    Ok(())
}

/// Subject of the authenticated caller, from the authorizer context
pub(crate) fn caller_id(event: &Request) -> Option<String> {
    let authorizer = event.request_context_ref()?.authorizer()?;

    // HTTP APIs pass JWT claims under `jwt`, REST API user-pool authorizers under `claims`
    authorizer
        .jwt
        .as_ref()
        .and_then(|jwt| jwt.claims.get("sub"))
        .map(|s| s.to_string())
        .or_else(|| {
            authorizer
                .fields
                .get("claims")
                .and_then(|claims| claims.get("sub"))
                .and_then(|sub| sub.as_str())
                .map(|s| s.to_string())
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use lambda_http::Body;

    fn with_auth(value: &str) -> Request {
        lambda_http::http::Request::builder()
            .header("Authorization", value)
            .body(Body::Empty)
            .unwrap()
    }

    #[test]
    fn test_accepts_bearer_token() {
        assert!(require_bearer(&with_auth("Bearer eyJraWQiOi")).is_ok());
        assert!(require_bearer(&with_auth("bearer abc")).is_ok());
    }

    #[test]
    fn test_rejects_missing_or_malformed_header() {
        assert!(matches!(
            require_bearer(&Request::default()),
            Err(ServiceError::Unauthorized(_))
        ));
        for value in ["Basic dXNlcjpwYXNz", "Bearer ", "token-without-scheme"] {
            assert!(
                matches!(require_bearer(&with_auth(value)), Err(ServiceError::Unauthorized(_))),
                "header {value:?}"
            );
        }
    }

    #[test]
    fn test_caller_id_absent_without_context() {
        assert_eq!(caller_id(&Request::default()), None);
    }
}
