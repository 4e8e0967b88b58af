//! HTTP client for the session API

use anyhow::{Context, Result, bail};
use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::json;
use tabshare_core::settlement::Settlement;
use tabshare_core::{Item, Participant, Session};
use tabshare_server::ErrorResponse;
use tabshare_server::http::{
    IngestBillRequest, MessageResponse, OwedResponse, ParticipantsResponse,
};
use tracing::debug;
use urlencoding::encode;

/// Thin wrapper over the server's REST routes
pub struct TabshareHttp {
    base_url: String,
    client: reqwest::Client,
}

impl TabshareHttp {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn create_session(&self, session_id: &str) -> Result<String> {
        let request = self
            .client
            .post(self.url("/session"))
            .json(&json!({ "sessionId": session_id }));
        let response: MessageResponse = self.send(request).await?;
        Ok(response.message)
    }

    pub async fn get_session(&self, session_id: &str) -> Result<Session> {
        let request = self.client.get(self.url(&session_path(session_id, "")));
        self.send(request).await
    }

    pub async fn ingest_bill(&self, session_id: &str, bill: &IngestBillRequest) -> Result<Session> {
        let request = self
            .client
            .put(self.url(&session_path(session_id, "/bill")))
            .json(bill);
        self.send(request).await
    }

    pub async fn join(
        &self,
        session_id: &str,
        participant_id: &str,
        display_name: &str,
    ) -> Result<Vec<Participant>> {
        let request = self
            .client
            .post(self.url(&session_path(session_id, "/join")))
            .json(&json!({ "participantId": participant_id, "displayName": display_name }));
        let response: ParticipantsResponse = self.send(request).await?;
        Ok(response.participants)
    }

    pub async fn leave(&self, session_id: &str, participant_id: &str) -> Result<()> {
        let request = self
            .client
            .post(self.url(&session_path(session_id, "/leave")))
            .json(&json!({ "participantId": participant_id }));
        self.execute(request).await?;
        Ok(())
    }

    pub async fn toggle(&self, session_id: &str, item_id: &str, participant_id: &str) -> Result<Item> {
        let request = self
            .client
            .post(self.url(&session_path(
                session_id,
                &format!("/items/{}/toggle", encode(item_id)),
            )))
            .json(&json!({ "participantId": participant_id }));
        self.send(request).await
    }

    pub async fn settlement(&self, session_id: &str) -> Result<Settlement> {
        let request = self
            .client
            .get(self.url(&session_path(session_id, "/settlement")));
        self.send(request).await
    }

    pub async fn owed(&self, session_id: &str, participant_id: &str) -> Result<f64> {
        let request = self.client.get(self.url(&session_path(
            session_id,
            &format!("/settlement/{}", encode(participant_id)),
        )));
        let response: OwedResponse = self.send(request).await?;
        Ok(response.owed)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = self.execute(request).await?;
        response
            .json::<T>()
            .await
            .context("Unexpected response from tabshare server")
    }

    async fn execute(&self, request: RequestBuilder) -> Result<Response> {
        let response = request
            .send()
            .await
            .with_context(|| format!("Failed to reach tabshare server at {}", self.base_url))?;

        let status = response.status();
        debug!(%status, url = %response.url(), "server responded");
        if status.is_success() {
            return Ok(response);
        }

        match response.json::<ErrorResponse>().await {
            Ok(body) => bail!("{} ({})", body.error, status),
            Err(_) => bail!("Request failed with status {}", status),
        }
    }
}

/// `/session/{id}` followed by `rest`, with the id percent-encoded
fn session_path(session_id: &str, rest: &str) -> String {
    format!("/session/{}{}", encode(session_id), rest)
}
