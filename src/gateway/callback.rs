use crate::error::GatewayError;
use crate::gateway::traits::GatewayResult;
use crate::models::ProviderSession;
use reqwest::Url;

/// Read `access_token`, `refresh_token` and `expires_in` from a callback
/// URL's fragment (or query, for PKCE-style redirects)
pub fn session_from_callback(callback_url: &str) -> GatewayResult<ProviderSession> {
    let url = Url::parse(callback_url).map_err(|e| GatewayError::Decode(e.to_string()))?;
    let params = url.fragment().or_else(|| url.query()).unwrap_or("");
    let pairs = Url::parse(&format!("http://callback/?{params}"))
        .map_err(|e| GatewayError::Decode(e.to_string()))?;

    let mut session = ProviderSession {
        access_token: String::new(),
        refresh_token: None,
        expires_in: None,
        user: None,
    };
    for (key, value) in pairs.query_pairs() {
        match key.as_ref() {
            "access_token" => session.access_token = value.into_owned(),
            "refresh_token" => session.refresh_token = Some(value.into_owned()),
            "expires_in" => session.expires_in = value.parse().ok(),
            "error_description" => {
                return Err(GatewayError::provider(400, value.into_owned()));
            }
            _ => {}
        }
    }

    if session.access_token.is_empty() {
        return Err(GatewayError::Decode("callback carries no access token".to_string()));
    }
    Ok(session)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_from_callback_fragment() {
        let session = session_from_callback(
            "http://localhost:3000/auth/callback#access_token=abc&expires_in=3600&refresh_token=def&token_type=bearer",
        )
        .unwrap();
        assert_eq!(session.access_token, "abc");
        assert_eq!(session.refresh_token.as_deref(), Some("def"));
        assert_eq!(session.expires_in, Some(3600));
    }

    #[test]
    fn test_session_from_callback_error() {
        let err = session_from_callback(
            "http://localhost:3000/auth/callback#error=access_denied&error_description=User+cancelled",
        )
        .unwrap_err();
        assert!(err.to_string().contains("User cancelled"));
    }

    #[test]
    fn test_session_from_callback_query() {
        let session =
            session_from_callback("http://localhost:3000/auth/callback?access_token=q1").unwrap();
        assert_eq!(session.access_token, "q1");
        assert_eq!(session.refresh_token, None);
    }

    #[test]
    fn test_callback_without_token_rejected() {
        assert!(session_from_callback("http://localhost:3000/auth/callback").is_err());
        assert!(session_from_callback("not a url").is_err());
    }
}
