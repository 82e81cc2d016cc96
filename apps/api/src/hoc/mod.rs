//! Questionnaire Fetcher: reads a campaign's recruiting context from the HOC API.
//!
//! The public entry point never fails: any transport, status or parse problem is
//! logged and reported as `None`. A campaign without questions still counts as loaded.

use std::time::Duration;

use reqwest::{header, Client};
use thiserror::Error;
use tracing::{info, warn};

use crate::config::TokenScheme;

pub mod body;
pub mod models;

pub use models::{Priority, Question, Questionnaire};

use body::{recover_object, Recovery};

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HIRINGS_API_URL is not configured")]
    NotConfigured,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("request timed out")]
    Timeout,

    #[error("upstream returned status {0}")]
    Status(u16),

    #[error("response body contains no questionnaire object")]
    Unparseable,
}

#[derive(Clone)]
pub struct HocClient {
    client: Client,
    base_url: Option<String>,
    token: Option<String>,
    scheme: TokenScheme,
}

impl HocClient {
    pub fn new(
        base_url: Option<String>,
        token: Option<String>,
        scheme: TokenScheme,
        timeout: Duration,
    ) -> Self {
        Self {
            client: Client::builder()
                .timeout(timeout)
                .build()
                .expect("Failed to build HTTP client"),
            base_url: base_url.map(|u| u.trim_end_matches('/').to_string()),
            token,
            scheme,
        }
    }

    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    /// Fetches and normalizes the questionnaire; `None` when the fetch failed.
    pub async fn fetch_questionnaire(&self, campaign_id: i64) -> Option<Questionnaire> {
        match self.try_fetch(campaign_id).await {
            Ok(questionnaire) => {
                if questionnaire.questions.is_empty() {
                    info!("Questionnaire for campaign {campaign_id} has no questions configured");
                }
                Some(questionnaire)
            }
            Err(e) => {
                warn!("Questionnaire fetch for campaign {campaign_id} failed, continuing without context: {e}");
                None
            }
        }
    }

    /// Single attempt against `GET {base}/questionnaire/{campaign_id}`.
    pub async fn try_fetch(&self, campaign_id: i64) -> Result<Questionnaire, FetchError> {
        let base_url = self.base_url.as_deref().ok_or(FetchError::NotConfigured)?;
        let url = format!("{base_url}/questionnaire/{campaign_id}");
        info!("Loading questionnaire from HOC: {url}");

        let mut request = self
            .client
            .get(&url)
            .header(header::ACCEPT, "application/json");
        if let Some(token) = &self.token {
            request = match self.scheme {
                TokenScheme::Bearer => request.bearer_auth(token),
                TokenScheme::Raw => request.header(header::AUTHORIZATION, token),
            };
        }

        let response = request.send().await.map_err(classify)?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let text = response.text().await.map_err(classify)?;
        let (object, recovery) = recover_object(&text).ok_or(FetchError::Unparseable)?;
        if recovery != Recovery::Json {
            info!("Questionnaire for campaign {campaign_id} recovered from markup ({recovery:?})");
        }

        let questionnaire = Questionnaire::from_object(&object);
        info!(
            "Questionnaire loaded for campaign {campaign_id}: {} questions, {} pages",
            questionnaire.questions.len(),
            questionnaire.pages.len()
        );
        Ok(questionnaire)
    }
}

fn classify(e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout
    } else {
        FetchError::Http(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer, scheme: TokenScheme) -> HocClient {
        HocClient::new(
            Some(format!("{}/api/v1/", server.uri())),
            Some("hoc-token".to_string()),
            scheme,
            Duration::from_secs(2),
        )
    }

    #[tokio::test]
    async fn test_fetch_parses_json_with_bearer_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/questionnaire/804"))
            .and(header("authorization", "Bearer hoc-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": 804,
                "title": "Erzieher:in",
                "questions": [{"question": "Staatlich anerkannt?", "priority": 1}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let q = client_for(&server, TokenScheme::Bearer)
            .try_fetch(804)
            .await
            .unwrap();
        assert_eq!(q.title.as_deref(), Some("Erzieher:in"));
        assert_eq!(q.questions.len(), 1);
    }

    #[tokio::test]
    async fn test_fetch_uses_raw_token_header() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(header("authorization", "hoc-token"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"title": "Raw"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let q = client_for(&server, TokenScheme::Raw).try_fetch(1).await.unwrap();
        assert_eq!(q.title.as_deref(), Some("Raw"));
    }

    #[tokio::test]
    async fn test_fetch_recovers_json_from_html() {
        let server = MockServer::start().await;
        let html = r#"<html><body><script>{"title": "Pflege", "questions": ["Examen?"]}</script></body></html>"#;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(html))
            .mount(&server)
            .await;

        let q = client_for(&server, TokenScheme::Bearer)
            .fetch_questionnaire(5)
            .await
            .unwrap();
        assert_eq!(q.title.as_deref(), Some("Pflege"));
        assert_eq!(q.questions[0].text, "Examen?");
    }

    #[tokio::test]
    async fn test_questionnaire_without_questions_is_still_loaded() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"questions": []})),
            )
            .mount(&server)
            .await;

        let q = client_for(&server, TokenScheme::Bearer)
            .fetch_questionnaire(804)
            .await
            .unwrap();
        assert!(q.questions.is_empty());
    }

    #[tokio::test]
    async fn test_non_success_status_degrades_to_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
            .mount(&server)
            .await;

        let client = client_for(&server, TokenScheme::Bearer);
        assert!(matches!(
            client.try_fetch(9).await,
            Err(FetchError::Status(404))
        ));
        assert!(client.fetch_questionnaire(9).await.is_none());
    }

    #[tokio::test]
    async fn test_unparseable_body_degrades_to_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<h1>Wartung</h1>"))
            .mount(&server)
            .await;

        let client = client_for(&server, TokenScheme::Bearer);
        assert!(matches!(
            client.try_fetch(9).await,
            Err(FetchError::Unparseable)
        ));
        assert!(client.fetch_questionnaire(9).await.is_none());
    }

    #[tokio::test]
    async fn test_connection_error_degrades_to_empty() {
        let client = HocClient::new(
            Some("http://127.0.0.1:9/api/v1".to_string()),
            None,
            TokenScheme::Bearer,
            Duration::from_secs(1),
        );
        assert!(client.fetch_questionnaire(804).await.is_none());
    }

    #[tokio::test]
    async fn test_missing_base_url_degrades_to_empty() {
        let client = HocClient::new(None, None, TokenScheme::Bearer, Duration::from_secs(1));
        assert!(matches!(
            client.try_fetch(1).await,
            Err(FetchError::NotConfigured)
        ));
        assert!(client.fetch_questionnaire(1).await.is_none());
    }
}
