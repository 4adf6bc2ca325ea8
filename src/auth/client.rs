//! Thin wrappers for the auth endpoints. They fix paths and payload shapes so
//! flow code never builds URLs by hand, and they keep passwords, codes and
//! tokens out of logs.

use crate::{
    api::{
        config::{
            CONFIRM_EMAIL_PATH, LOGIN_PATH, REFRESH_TOKEN_PATH, SEND_CONFIRM_EMAIL_PATH,
            SIGNUP_PATH, VERIFY_OTP_LOGIN_PATH,
        },
        ApiClient, AppError,
    },
    auth::types::{
        ConfirmEmailRequest, DataEnvelope, EmailRequest, GoogleCallbackRequest,
        GoogleCallbackResponse, LoginRequest, LoginUser, RefreshTokenRequest,
        RefreshTokenResponse, RefreshedTokens, VerifiedLoginData, VerifyOtpLoginRequest,
    },
};
use serde::Serialize;
use serde_json::Value;
use tracing::instrument;

/// Checks credentials; on success the server has sent a login OTP.
#[instrument(skip_all)]
pub async fn login(api: &ApiClient, username: &str, password: &str) -> Result<LoginUser, AppError> {
    let response: DataEnvelope<LoginUser> = api
        .post_json(LOGIN_PATH, &LoginRequest { username, password })
        .await?;
    Ok(response.data)
}

/// Exchanges a login OTP for the token pair and user profile.
#[instrument(skip(api, otp))]
pub async fn verify_otp_login(
    api: &ApiClient,
    user_id: &str,
    otp: &str,
) -> Result<VerifiedLoginData, AppError> {
    let response: DataEnvelope<VerifiedLoginData> = api
        .post_json(
            VERIFY_OTP_LOGIN_PATH,
            &VerifyOtpLoginRequest::email_two_factor(user_id, otp),
        )
        .await?;
    Ok(response.data)
}

/// Asks the backend to email a confirmation code.
#[instrument(skip_all)]
pub async fn send_confirm_email(api: &ApiClient, email: &str) -> Result<(), AppError> {
    api.post_json_empty(SEND_CONFIRM_EMAIL_PATH, &EmailRequest { email })
        .await
}

/// Confirms an email address with the code the user received.
#[instrument(skip_all)]
pub async fn confirm_email(api: &ApiClient, email: &str, otp: &str) -> Result<(), AppError> {
    api.post_json_empty(CONFIRM_EMAIL_PATH, &ConfirmEmailRequest { email, otp })
        .await
}

/// Creates the account from a completed signup draft.
#[instrument(skip(api, request))]
pub async fn signup<B: Serialize + ?Sized>(api: &ApiClient, request: &B) -> Result<Value, AppError> {
    api.post_json(SIGNUP_PATH, request).await
}

/// Exchanges the provider authorization code.
#[instrument(skip(api, code, state))]
pub async fn google_callback(
    api: &ApiClient,
    code: &str,
    state: &str,
) -> Result<GoogleCallbackResponse, AppError> {
    let url = api
        .config()
        .google_callback_url()
        .map_err(|err| AppError::Config(format!("Invalid API base URL: {err}")))?;

    api.post_json_to(url.as_str(), &GoogleCallbackRequest { code, state })
        .await
}

/// Trades a refresh token for a new token pair.
#[instrument(skip(api, refresh_token))]
pub async fn refresh_token(
    api: &ApiClient,
    user_id: &str,
    refresh_token: &str,
) -> Result<RefreshedTokens, AppError> {
    let response: RefreshTokenResponse = api
        .post_json(
            REFRESH_TOKEN_PATH,
            &RefreshTokenRequest {
                user_id,
                refresh_token,
            },
        )
        .await?;
    Ok(response.into_tokens())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::tests::{can_bind_localhost, client_for};
    use anyhow::Result;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn login_returns_user_id() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(LOGIN_PATH))
            .and(body_json(json!({"username": "jane@corp.com", "password": "hunter22"})))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"data": {"_id": "u1", "email": "jane@corp.com"}})),
            )
            .mount(&server)
            .await;

        let api = client_for(&server)?;
        let user = login(&api, "jane@corp.com", "hunter22").await?;
        assert_eq!(user.id, "u1");
        assert_eq!(user.rest.get("email"), Some(&json!("jane@corp.com")));
        Ok(())
    }

    #[tokio::test]
    async fn google_callback_sends_redirect_uri() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/auth/oauth/google"))
            .and(query_param(
                "redirect_uri",
                "http://localhost:3000/oauth/google/callback",
            ))
            .and(body_json(json!({"code": "c1", "state": "s1"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "email": "jane@corp.com",
                "userId": "u1",
                "isNewUser": true
            })))
            .mount(&server)
            .await;

        let api = client_for(&server)?;
        let response = google_callback(&api, "c1", "s1").await?;
        assert!(response.is_new_user);
        assert_eq!(response.user_id.as_deref(), Some("u1"));
        Ok(())
    }

    #[tokio::test]
    async fn refresh_token_posts_user_and_token() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(REFRESH_TOKEN_PATH))
            .and(body_json(json!({"userId": "u1", "refreshToken": "r1"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"access_token": "a2", "refresh_token": "r2"}
            })))
            .mount(&server)
            .await;

        let api = client_for(&server)?;
        let tokens = refresh_token(&api, "u1", "r1").await?;
        assert_eq!(tokens.access_token, "a2");
        assert_eq!(tokens.refresh_token, "r2");
        Ok(())
    }
}
