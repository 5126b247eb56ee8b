//! HTTP client for the external AI webhook.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::AskAiError;

/// Fixed schema description sent alongside every question so the webhook
/// can ground its answers (and generated SQL) in the live `imds` table.
pub const SCHEMA_CONTEXT: &str = "Ini adalah aplikasi untuk data Inisiasi Menyusui Dini (IMD). \
    Data disimpan dalam tabel `imds` dengan kolom: id, nama_pasien, alamat, no_rm, \
    tanggal_lahir, cara_persalinan, tanggal_imd, waktu_imd, nama_petugas, created_at, \
    updated_at, deleted_at. Mohon berikan jawaban yang relevan dengan data IMD atau \
    buatkan query SQL jika diperlukan.";

/// Outbound call timeout.
const WEBHOOK_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Serialize)]
struct WebhookRequest<'a> {
    question: &'a str,
    context: &'a str,
}

#[derive(Deserialize)]
struct WebhookReply {
    output: Option<String>,
}

/// Client for the AI webhook endpoint.
#[derive(Debug, Clone)]
pub struct WebhookClient {
    client: reqwest::Client,
    url: String,
}

impl WebhookClient {
    /// Build a client for the given webhook URL.
    pub fn new(url: impl Into<String>) -> Result<Self, AskAiError> {
        let client = reqwest::Client::builder()
            .timeout(WEBHOOK_TIMEOUT)
            .build()
            .map_err(|e| AskAiError::WebhookUnreachable(e.to_string()))?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }

    /// The configured webhook URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// POST a question plus the fixed schema context and return the reply's
    /// `output` field. `None` when the field is absent or the body is not
    /// the expected JSON shape; the classifier turns that into its fallback
    /// answer.
    pub async fn ask(&self, question: &str) -> Result<Option<String>, AskAiError> {
        tracing::debug!(url = %self.url, "calling AI webhook");

        let response = self
            .client
            .post(&self.url)
            .json(&WebhookRequest {
                question,
                context: SCHEMA_CONTEXT,
            })
            .send()
            .await
            .map_err(|e| AskAiError::WebhookUnreachable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(%status, "AI webhook returned an error status");
            return Err(AskAiError::WebhookUnavailable(status.as_u16()));
        }

        let output = response
            .json::<WebhookReply>()
            .await
            .ok()
            .and_then(|reply| reply.output);

        Ok(output)
    }
}
