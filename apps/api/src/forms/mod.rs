//! Forms publishing — the narrow contract the assessment flow needs:
//! create a form, append short-answer items, produce a shareable URL.
//! Production backend is Google Forms (`google.rs`); tests use stubs.

use async_trait::async_trait;
use thiserror::Error;

pub mod google;

#[derive(Debug, Error)]
pub enum FormsError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Forms API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Invalid service credentials: {0}")]
    Credentials(String),

    #[error("Token grant failed: {0}")]
    Token(String),
}

/// Opaque identifier of an externally hosted form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormId(pub String);

impl FormId {
    /// Shareable editor URL for a created form.
    pub fn edit_url(&self) -> String {
        format!("https://docs.google.com/forms/d/{}/edit", self.0)
    }
}

/// The forms publisher seam. Carried in `AppState` as `Arc<dyn FormsPublisher>`.
#[async_trait]
pub trait FormsPublisher: Send + Sync {
    /// Creates a new form and returns its id.
    async fn create_form(&self, title: &str, document_title: &str) -> Result<FormId, FormsError>;

    /// Appends one required short-answer item per question, in order.
    async fn add_short_answer_items(
        &self,
        form: &FormId,
        questions: &[String],
    ) -> Result<(), FormsError>;
}
