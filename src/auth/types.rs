//! Request and response payloads for the auth API. Several of them carry
//! passwords, one-time codes or tokens, so none of them may be logged.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Clone, Serialize)]
pub struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

/// Envelope used by most endpoints: `{ "data": ... }`.
#[derive(Clone, Debug, Deserialize)]
pub struct DataEnvelope<T> {
    pub data: T,
}

/// Partial user returned by a successful password check, before the OTP.
#[derive(Clone, Debug, Deserialize)]
pub struct LoginUser {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyOtpLoginRequest<'a> {
    pub user_id: &'a str,
    pub otp: &'a str,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub context: &'static str,
}

impl<'a> VerifyOtpLoginRequest<'a> {
    /// Email-delivered second factor, the only kind the login flows use.
    #[must_use]
    pub fn email_two_factor(user_id: &'a str, otp: &'a str) -> Self {
        Self {
            user_id,
            otp,
            kind: "EMAIL",
            context: "TWOFA",
        }
    }
}

/// Token pair plus user profile. Tokens are optional here so that a missing one
/// can be reported as an invalid response rather than a decode error.
#[derive(Clone, Deserialize)]
pub struct VerifiedLoginData {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub user: Option<Map<String, Value>>,
}

#[derive(Clone, Debug, Serialize)]
pub struct EmailRequest<'a> {
    pub email: &'a str,
}

#[derive(Clone, Serialize)]
pub struct ConfirmEmailRequest<'a> {
    pub email: &'a str,
    pub otp: &'a str,
}

#[derive(Clone, Serialize)]
pub struct GoogleCallbackRequest<'a> {
    pub code: &'a str,
    pub state: &'a str,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleCallbackResponse {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub is_new_user: bool,
    #[serde(default)]
    pub initial_auth_data: Option<Map<String, Value>>,
}

#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenRequest<'a> {
    pub user_id: &'a str,
    pub refresh_token: &'a str,
}

/// Refreshed token pair. Accepts snake_case and camelCase, wrapped in `data` or not.
#[derive(Clone, Deserialize)]
pub struct RefreshedTokens {
    #[serde(alias = "accessToken")]
    pub access_token: String,
    #[serde(alias = "refreshToken")]
    pub refresh_token: String,
}

#[derive(Clone, Deserialize)]
#[serde(untagged)]
pub enum RefreshTokenResponse {
    Wrapped { data: RefreshedTokens },
    Bare(RefreshedTokens),
}

impl RefreshTokenResponse {
    #[must_use]
    pub fn into_tokens(self) -> RefreshedTokens {
        match self {
            RefreshTokenResponse::Wrapped { data } | RefreshTokenResponse::Bare(data) => data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn verify_otp_login_request_shape() {
        let request = VerifyOtpLoginRequest::email_two_factor("u1", "123456");
        assert_eq!(
            serde_json::to_value(&request).ok(),
            Some(json!({
                "userId": "u1",
                "otp": "123456",
                "type": "EMAIL",
                "context": "TWOFA"
            }))
        );
    }

    #[test]
    fn refresh_response_accepts_both_layouts() {
        let wrapped: Result<RefreshTokenResponse, _> = serde_json::from_value(json!({
            "data": {"access_token": "a", "refresh_token": "r"}
        }));
        let bare: Result<RefreshTokenResponse, _> = serde_json::from_value(json!({
            "accessToken": "a2", "refreshToken": "r2"
        }));

        let wrapped = wrapped.map(RefreshTokenResponse::into_tokens).ok();
        let bare = bare.map(RefreshTokenResponse::into_tokens).ok();
        assert_eq!(
            wrapped.map(|t| (t.access_token, t.refresh_token)),
            Some(("a".to_string(), "r".to_string()))
        );
        assert_eq!(
            bare.map(|t| (t.access_token, t.refresh_token)),
            Some(("a2".to_string(), "r2".to_string()))
        );
    }

    #[test]
    fn google_callback_response_defaults() {
        let response: Result<GoogleCallbackResponse, _> =
            serde_json::from_value(json!({"email": "a@corp.com", "userId": "u1"}));
        let response = response.ok();
        assert_eq!(
            response.as_ref().and_then(|r| r.email.as_deref()),
            Some("a@corp.com")
        );
        assert_eq!(response.as_ref().map(|r| r.is_new_user), Some(false));
        assert!(response.and_then(|r| r.initial_auth_data).is_none());
    }
}
