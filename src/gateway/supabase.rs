use crate::error::GatewayError;
use crate::gateway::callback::session_from_callback;
use crate::gateway::traits::{AuthGateway, AuthOutcome, GatewayResult, ProfileGateway, SignUpMetadata};
use crate::models::{
    BusinessListing, Identity, Profile, ProviderSession, SavedBusiness, VerifiedBusinessData,
};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, RequestBuilder, Response, Url};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Supabase auth (GoTrue) and table (PostgREST) client
pub struct SupabaseClient {
    client: Client,
    base_url: String,
    anon_key: String,
    session: RwLock<Option<ProviderSession>>,
}

impl SupabaseClient {
    pub fn new(base_url: &str, anon_key: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key: anon_key.to_string(),
            session: RwLock::new(None),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn bearer(&self) -> String {
        match self.session.read().await.as_ref() {
            Some(session) => session.access_token.clone(),
            None => self.anon_key.clone(),
        }
    }

    async fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.anon_key)
            .bearer_auth(self.bearer().await)
    }

    async fn remember(&self, outcome: &AuthOutcome) {
        if let Some(session) = &outcome.session {
            *self.session.write().await = Some(session.clone());
        }
    }

    async fn insert_rows(&self, table: &str, rows: Value) -> GatewayResult<()> {
        debug!("Inserting into {}", table);
        let request = self
            .client
            .post(self.endpoint(&format!("/rest/v1/{table}")))
            .header("Prefer", "return=minimal")
            .json(&rows);
        let response = self.authorized(request).await.send().await?;
        check(response).await.map(|_| ())
    }
}

/// Fail on non-success statuses, turning the body into a provider message
async fn check(response: Response) -> GatewayResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    warn!("Supabase returned status: {}", status);
    Err(GatewayError::provider(status.as_u16(), error_message(&body)))
}

/// Pull the human message out of a GoTrue/PostgREST error body
pub(crate) fn error_message(body: &str) -> String {
    let parsed: Option<Value> = serde_json::from_str(body).ok();
    parsed
        .as_ref()
        .and_then(|v| {
            ["error_description", "msg", "message", "error"]
                .iter()
                .find_map(|key| v.get(*key).and_then(Value::as_str))
        })
        .map(str::to_string)
        .unwrap_or_else(|| body.trim().to_string())
}

/// Sign-up answers with a full session when confirmation is disabled and with
/// a bare user object otherwise
pub(crate) fn parse_auth_response(value: Value) -> GatewayResult<AuthOutcome> {
    if value.get("access_token").is_some() {
        let session: ProviderSession =
            serde_json::from_value(value).map_err(|e| GatewayError::Decode(e.to_string()))?;
        let identity = session
            .user
            .clone()
            .ok_or_else(|| GatewayError::Decode("session without user".to_string()))?;
        return Ok(AuthOutcome {
            identity,
            session: Some(session),
        });
    }

    let user = value.get("user").cloned().unwrap_or(value);
    let identity: Identity =
        serde_json::from_value(user).map_err(|e| GatewayError::Decode(e.to_string()))?;
    Ok(AuthOutcome {
        identity,
        session: None,
    })
}

#[async_trait]
impl AuthGateway for SupabaseClient {
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: &SignUpMetadata,
    ) -> GatewayResult<AuthOutcome> {
        info!("Creating account for {:?} user", metadata.user_type);
        let request = self.client.post(self.endpoint("/auth/v1/signup")).json(&json!({
            "email": email,
            "password": password,
            "data": {
                "user_type": metadata.user_type.as_str(),
                "name": metadata.name,
            },
        }));
        let response = self.authorized(request).await.send().await?;
        let body: Value = check(response).await?.json().await?;
        let outcome = parse_auth_response(body)?;
        self.remember(&outcome).await;
        Ok(outcome)
    }

    async fn sign_in(&self, email: &str, password: &str) -> GatewayResult<AuthOutcome> {
        info!("Signing in with password");
        let request = self
            .client
            .post(self.endpoint("/auth/v1/token?grant_type=password"))
            .json(&json!({ "email": email, "password": password }));
        let response = self.authorized(request).await.send().await?;
        let body: Value = check(response).await?.json().await?;
        let outcome = parse_auth_response(body)?;
        self.remember(&outcome).await;
        Ok(outcome)
    }

    async fn start_oauth(&self, provider: &str, redirect_to: &str) -> GatewayResult<String> {
        let url = Url::parse_with_params(
            &self.endpoint("/auth/v1/authorize"),
            &[
                ("provider", provider),
                ("redirect_to", redirect_to),
                ("access_type", "offline"),
                ("prompt", "consent"),
            ],
        )
        .map_err(|e| GatewayError::Decode(e.to_string()))?;
        info!("OAuth flow prepared for {}", provider);
        Ok(url.to_string())
    }

    async fn restore_session(&self, session: &ProviderSession) -> GatewayResult<()> {
        debug!("Restoring stored provider session");
        *self.session.write().await = Some(session.clone());
        Ok(())
    }

    async fn complete_oauth_callback(&self, callback_url: &str) -> GatewayResult<ProviderSession> {
        let session = session_from_callback(callback_url)?;
        *self.session.write().await = Some(session.clone());
        info!("OAuth callback session adopted");
        Ok(session)
    }

    async fn current_session(&self) -> GatewayResult<Option<ProviderSession>> {
        let Some(mut session) = self.session.read().await.clone() else {
            return Ok(None);
        };

        let request = self.client.get(self.endpoint("/auth/v1/user"));
        let response = self.authorized(request).await.send().await?;
        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            debug!("Stored provider session is no longer accepted");
            *self.session.write().await = None;
            return Ok(None);
        }
        let user: Identity = check(response).await?.json().await?;
        session.user = Some(user);
        *self.session.write().await = Some(session.clone());
        Ok(Some(session))
    }

    async fn sign_out(&self) -> GatewayResult<()> {
        if self.session.read().await.is_none() {
            return Ok(());
        }
        let request = self.client.post(self.endpoint("/auth/v1/logout"));
        let response = self.authorized(request).await.send().await?;
        *self.session.write().await = None;
        check(response).await.map(|_| ())
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct SavedBusinessRow {
    user_id: String,
    business_id: String,
    business_data: BusinessListing,
    saved_at: DateTime<Utc>,
}

impl From<SavedBusinessRow> for SavedBusiness {
    fn from(row: SavedBusinessRow) -> Self {
        SavedBusiness {
            user_id: row.user_id,
            business: row.business_data,
            saved_at: row.saved_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct VerifiedBusinessRow {
    user_id: String,
    data: VerifiedBusinessData,
}

fn freelancer_row(profile: &Profile) -> Value {
    json!([{
        "name": profile.name,
        "email": profile.email,
        "purpose": profile.purpose,
        "custom_purpose": profile.custom_purpose,
        "linkedin": profile.social_links.linkedin,
        "instagram": profile.social_links.instagram,
        "facebook": profile.social_links.facebook,
        "created_at": Utc::now(),
    }])
}

fn business_row(profile: &Profile) -> Value {
    json!([{
        "business_name": profile.business_name,
        "business_type": profile.business_type,
        "custom_business_type": profile.custom_business_type,
        "email": profile.email,
        "google_maps_url": profile.google_maps_url,
        "business_description": profile.business_description,
        "linkedin": profile.social_links.linkedin,
        "instagram": profile.social_links.instagram,
        "facebook": profile.social_links.facebook,
        "created_at": Utc::now(),
    }])
}

fn eq(value: &str) -> String {
    format!("eq.{value}")
}

#[async_trait]
impl ProfileGateway for SupabaseClient {
    async fn insert_freelancer(&self, profile: &Profile) -> GatewayResult<()> {
        self.insert_rows("freelancers", freelancer_row(profile)).await
    }

    async fn insert_business(&self, profile: &Profile) -> GatewayResult<()> {
        self.insert_rows("businesses", business_row(profile)).await
    }

    async fn list_saved(&self, user_id: &str) -> GatewayResult<Vec<SavedBusiness>> {
        let request = self
            .client
            .get(self.endpoint("/rest/v1/saved_businesses"))
            .query(&[
                ("select", "*".to_string()),
                ("user_id", eq(user_id)),
                ("order", "saved_at.desc".to_string()),
            ]);
        let response = self.authorized(request).await.send().await?;
        let rows: Vec<SavedBusinessRow> = check(response).await?.json().await?;
        debug!("Loaded {} saved businesses", rows.len());
        Ok(rows.into_iter().map(SavedBusiness::from).collect())
    }

    async fn find_saved(
        &self,
        user_id: &str,
        business_id: &str,
    ) -> GatewayResult<Option<SavedBusiness>> {
        let request = self
            .client
            .get(self.endpoint("/rest/v1/saved_businesses"))
            .query(&[
                ("select", "*".to_string()),
                ("user_id", eq(user_id)),
                ("business_id", eq(business_id)),
                ("limit", "1".to_string()),
            ]);
        let response = self.authorized(request).await.send().await?;
        let rows: Vec<SavedBusinessRow> = check(response).await?.json().await?;
        Ok(rows.into_iter().next().map(SavedBusiness::from))
    }

    async fn insert_saved(&self, saved: &SavedBusiness) -> GatewayResult<()> {
        let row = SavedBusinessRow {
            user_id: saved.user_id.clone(),
            business_id: saved.business.id.clone(),
            business_data: saved.business.clone(),
            saved_at: saved.saved_at,
        };
        self.insert_rows("saved_businesses", json!([row])).await
    }

    async fn delete_saved(&self, user_id: &str, business_id: &str) -> GatewayResult<()> {
        let request = self
            .client
            .delete(self.endpoint("/rest/v1/saved_businesses"))
            .query(&[("user_id", eq(user_id)), ("business_id", eq(business_id))]);
        let response = self.authorized(request).await.send().await?;
        check(response).await.map(|_| ())
    }

    async fn get_verified_business(
        &self,
        user_id: &str,
    ) -> GatewayResult<Option<VerifiedBusinessData>> {
        let request = self
            .client
            .get(self.endpoint("/rest/v1/verified_businesses"))
            .query(&[("select", "*".to_string()), ("user_id", eq(user_id))]);
        let response = self.authorized(request).await.send().await?;
        let rows: Vec<VerifiedBusinessRow> = check(response).await?.json().await?;
        Ok(rows.into_iter().next().map(|row| row.data))
    }

    async fn set_verified_business(
        &self,
        user_id: &str,
        data: &VerifiedBusinessData,
    ) -> GatewayResult<()> {
        let row = VerifiedBusinessRow {
            user_id: user_id.to_string(),
            data: data.clone(),
        };
        let request = self
            .client
            .post(self.endpoint("/rest/v1/verified_businesses"))
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(&json!([row]));
        let response = self.authorized(request).await.send().await?;
        check(response).await.map(|_| ())
    }
}
