//! Google Forms backend for `FormsPublisher`.
//!
//! Authenticates as a service account: the credential blob from
//! `GOOGLE_CREDENTIALS_JSON` is parsed once at startup, and each
//! publication sequence exchanges a signed RS256 assertion for a bearer
//! token at the credential's `token_uri`. Every call is a single
//! best-effort attempt with an explicit timeout.

use async_trait::async_trait;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{FormId, FormsError, FormsPublisher};

const FORMS_API_URL: &str = "https://forms.googleapis.com/v1/forms";
const FORMS_SCOPE: &str = "https://www.googleapis.com/auth/forms.body";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const TOKEN_LIFETIME_SECS: i64 = 3600;

/// The fields of a Google service-account key this client needs.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

#[derive(Debug, Clone)]
pub struct GoogleFormsClient {
    http: Client,
    key: ServiceAccountKey,
}

impl GoogleFormsClient {
    /// Parses the credential blob and validates that the embedded private
    /// key is usable, so a broken credential fails at startup rather than
    /// on the first user action.
    pub fn new(credentials_json: &str) -> Result<Self, FormsError> {
        let key: ServiceAccountKey = serde_json::from_str(credentials_json)
            .map_err(|e| FormsError::Credentials(format!("credential blob is not valid JSON: {e}")))?;
        EncodingKey::from_rsa_pem(key.private_key.as_bytes())
            .map_err(|e| FormsError::Credentials(format!("private_key is not a valid RSA PEM: {e}")))?;

        Ok(Self {
            http: Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .expect("Failed to build HTTP client"),
            key,
        })
    }

    fn signed_assertion(&self) -> Result<String, FormsError> {
        #[derive(Serialize)]
        struct Claims<'a> {
            iss: &'a str,
            scope: &'a str,
            aud: &'a str,
            iat: i64,
            exp: i64,
        }

        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            iss: &self.key.client_email,
            scope: FORMS_SCOPE,
            aud: &self.key.token_uri,
            iat: now,
            exp: now + TOKEN_LIFETIME_SECS,
        };

        let encoding_key = EncodingKey::from_rsa_pem(self.key.private_key.as_bytes())
            .map_err(|e| FormsError::Credentials(e.to_string()))?;
        jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, &encoding_key)
            .map_err(|e| FormsError::Token(e.to_string()))
    }

    async fn access_token(&self) -> Result<String, FormsError> {
        #[derive(Deserialize)]
        struct TokenResponse {
            access_token: String,
        }

        let assertion = self.signed_assertion()?;
        let response = self
            .http
            .post(&self.key.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", &assertion)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FormsError::Token(format!("status {status}: {body}")));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| FormsError::Token(e.to_string()))?;
        Ok(token.access_token)
    }

    async fn check_api_error(response: reqwest::Response) -> Result<reqwest::Response, FormsError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<GoogleApiError>(&body)
            .map(|e| e.error.message)
            .unwrap_or(body);
        Err(FormsError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl FormsPublisher for GoogleFormsClient {
    async fn create_form(&self, title: &str, document_title: &str) -> Result<FormId, FormsError> {
        let token = self.access_token().await?;
        let body = CreateFormRequest {
            info: FormInfo {
                title,
                document_title,
            },
        };

        let response = self
            .http
            .post(FORMS_API_URL)
            .bearer_auth(&token)
            .json(&body)
            .send()
            .await?;
        let response = Self::check_api_error(response).await?;

        let created: CreateFormResponse = response.json().await?;
        debug!("Created form {}", created.form_id);
        Ok(FormId(created.form_id))
    }

    async fn add_short_answer_items(
        &self,
        form: &FormId,
        questions: &[String],
    ) -> Result<(), FormsError> {
        let body = BatchUpdateRequest {
            requests: questions
                .iter()
                .enumerate()
                .map(|(index, question)| FormRequest {
                    create_item: CreateItem {
                        item: short_answer_item(question.clone()),
                        location: Location {
                            index: index as u32,
                        },
                    },
                })
                .collect(),
        };

        let token = self.access_token().await?;
        let url = format!("{FORMS_API_URL}/{}:batchUpdate", form.0);
        let response = self
            .http
            .post(&url)
            .bearer_auth(&token)
            .json(&body)
            .send()
            .await?;
        Self::check_api_error(response).await?;
        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Forms API wire types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct CreateFormRequest<'a> {
    info: FormInfo<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FormInfo<'a> {
    title: &'a str,
    document_title: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateFormResponse {
    form_id: String,
}

#[derive(Debug, Serialize)]
struct BatchUpdateRequest {
    requests: Vec<FormRequest>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FormRequest {
    create_item: CreateItem,
}

#[derive(Debug, Serialize)]
struct CreateItem {
    item: Item,
    location: Location,
}

#[derive(Debug, Serialize)]
struct Location {
    index: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Item {
    title: String,
    question_item: QuestionItem,
}

#[derive(Debug, Serialize)]
struct QuestionItem {
    question: Question,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Question {
    required: bool,
    text_question: TextQuestion,
}

#[derive(Debug, Serialize)]
struct TextQuestion {
    paragraph: bool,
}

fn short_answer_item(title: String) -> Item {
    Item {
        title,
        question_item: QuestionItem {
            question: Question {
                required: true,
                text_question: TextQuestion { paragraph: false },
            },
        },
    }
}

#[derive(Debug, Deserialize)]
struct GoogleApiError {
    error: GoogleApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct GoogleApiErrorBody {
    message: String,
}
