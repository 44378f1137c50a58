//! Signature-generator utility: `POST /tools/signature-generator`.
//!
//! A documentation convenience, not part of the delivery path: given a
//! payload and a secret, returns the exact header an integrator should
//! expect their subscriber endpoint to receive.

use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use webhook_common::signing;

use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct SignatureGeneratorRequest {
    pub payload: Value,
    pub secret_key: String,
}

#[derive(Debug, Serialize)]
pub struct SignatureGeneratorResponse {
    pub x_hub_signature_256: String,
    pub instructions: String,
    pub curl_example: String,
}

pub async fn generate_signature(
    Json(request): Json<SignatureGeneratorRequest>,
) -> Result<Json<SignatureGeneratorResponse>, ApiError> {
    let body = serde_json::to_vec(&request.payload).map_err(|e| ApiError::Internal(e.into()))?;
    let digest = signing::sign(&body, &request.secret_key);
    let header_value = format!("{}{}", signing::SIGNATURE_PREFIX, digest);

    let curl_example = format!(
        "curl -X POST http://localhost:8080/ingest/{{subscription_id}} \\\n  -H 'Content-Type: application/json' \\\n  -H 'X-Hub-Signature-256: {header_value}' \\\n  -d '{}'",
        String::from_utf8_lossy(&body)
    );

    Ok(Json(SignatureGeneratorResponse {
        x_hub_signature_256: header_value,
        instructions: "Send this value as the X-Hub-Signature-256 header on your POST to /ingest/{subscription_id}. The ingestion gate recomputes the HMAC over the exact request body and rejects the request if it doesn't match.".to_string(),
        curl_example,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_generate_signature_matches_signing_module() {
        let request = SignatureGeneratorRequest {
            payload: serde_json::json!({"event": "test"}),
            secret_key: "my-secret".to_string(),
        };
        let body = serde_json::to_vec(&request.payload).unwrap();
        let expected = signing::sign(&body, &request.secret_key);

        let Json(response) = generate_signature(Json(request)).await.unwrap();
        assert_eq!(
            response.x_hub_signature_256,
            format!("{}{}", signing::SIGNATURE_PREFIX, expected)
        );
    }
}
