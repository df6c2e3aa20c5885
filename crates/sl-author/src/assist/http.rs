//! HTTP transport for the generation service.

use serde::Serialize;
use serde::de::DeserializeOwned;

use super::{
    GameForm, IntroResponse, NarrativeRequest, NarrativeResponse, NarrativeService,
    OutcomesRequest, OutcomesResponse,
};
use crate::error::{AssistError, AssistResult};

/// Talks to the generation backend's `/api/generate-*` endpoints.
#[derive(Debug, Clone)]
pub struct HttpGenerator {
    client: reqwest::Client,
    base_url: String,
}

impl HttpGenerator {
    /// A generator for the backend at `base_url` (e.g. `http://127.0.0.1:5000`).
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// A generator using a preconfigured client.
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    /// The backend base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post<B, R>(&self, endpoint: &str, body: &B) -> AssistResult<R>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        let url = format!("{}/api/{endpoint}", self.base_url);
        tracing::debug!(%url, "calling generation service");

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| AssistError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(%url, status = status.as_u16(), "generation service error");
            return Err(AssistError::Status(status.as_u16()));
        }

        response
            .json::<R>()
            .await
            .map_err(|e| AssistError::Malformed(e.to_string()))
    }
}

impl NarrativeService for HttpGenerator {
    async fn generate_game(&self, form: &GameForm) -> AssistResult<String> {
        let response: IntroResponse = self.post("generate-game", form).await?;
        Ok(response.intro)
    }

    async fn generate_narrative(&self, request: &NarrativeRequest) -> AssistResult<String> {
        let response: NarrativeResponse = self.post("generate-narrative", request).await?;
        Ok(response.narrative)
    }

    async fn generate_outcomes(&self, request: &OutcomesRequest) -> AssistResult<Vec<Option<String>>> {
        let response: OutcomesResponse = self.post("generate-outcomes", request).await?;
        Ok(response.outcomes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let generator = HttpGenerator::new("http://localhost:5000/");
        assert_eq!(generator.base_url(), "http://localhost:5000");
    }

    #[tokio::test]
    async fn generate_game_posts_form() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate-game"))
            .and(body_json(json!({
                "gameTitle": "Dragon Keep",
                "genre": "Fantasy",
                "setting": "",
                "tone": "",
                "mainCharacter": "",
                "goal": "",
                "puzzlesEnabled": false,
                "npcEnabled": false
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "intro": "The keep looms.",
                "gameData": {}
            })))
            .mount(&server)
            .await;

        let generator = HttpGenerator::new(server.uri());
        let form = GameForm {
            genre: "Fantasy".to_string(),
            ..GameForm::titled("Dragon Keep")
        };
        let intro = generator.generate_game(&form).await.unwrap();
        assert_eq!(intro, "The keep looms.");
    }

    #[tokio::test]
    async fn generate_narrative_returns_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate-narrative"))
            .and(body_json(json!({
                "parentText": "A fork.",
                "choiceText": "Go left",
                "outcomeText": "You find a path."
            })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"narrative": "A meadow opens."})),
            )
            .mount(&server)
            .await;

        let generator = HttpGenerator::new(server.uri());
        let request = NarrativeRequest {
            parent_text: "A fork.".to_string(),
            choice_text: "Go left".to_string(),
            outcome_text: "You find a path.".to_string(),
        };
        let narrative = generator.generate_narrative(&request).await.unwrap();
        assert_eq!(narrative, "A meadow opens.");
    }

    #[tokio::test]
    async fn generate_outcomes_keeps_gaps() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate-outcomes"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"outcomes": ["You win.", null]})),
            )
            .mount(&server)
            .await;

        let generator = HttpGenerator::new(server.uri());
        let request = OutcomesRequest {
            scene: "A duel.".to_string(),
            choices: vec!["Fight".to_string(), "Flee".to_string()],
        };
        let outcomes = generator.generate_outcomes(&request).await.unwrap();
        assert_eq!(outcomes, vec![Some("You win.".to_string()), None]);
    }

    #[tokio::test]
    async fn server_error_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let generator = HttpGenerator::new(server.uri());
        let err = generator
            .generate_game(&GameForm::titled("x"))
            .await
            .unwrap_err();
        assert_eq!(err, AssistError::Status(500));
    }

    #[tokio::test]
    async fn malformed_body_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let generator = HttpGenerator::new(server.uri());
        let request = NarrativeRequest {
            parent_text: String::new(),
            choice_text: String::new(),
            outcome_text: String::new(),
        };
        let err = generator.generate_narrative(&request).await.unwrap_err();
        assert!(matches!(err, AssistError::Malformed(_)));
    }

    #[tokio::test]
    async fn unreachable_service_is_transport_error() {
        // Port 9 (discard) is not listening on the test host.
        let generator = HttpGenerator::new("http://127.0.0.1:9");
        let err = generator
            .generate_game(&GameForm::titled("x"))
            .await
            .unwrap_err();
        assert!(matches!(err, AssistError::Transport(_)));
    }
}
