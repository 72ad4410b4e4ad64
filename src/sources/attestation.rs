//! Identity source: EAS attestations plus an optional passport score

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::warn;

use super::http::ProviderHttpClient;
use super::{IdentitySource, SourceError};
use crate::collector::IdentityData;
use crate::registry::normalize_address;

const ATTESTATION_QUERY: &str = r#"
query GetAttestations($recipient: String!, $schemaId: String!) {
  attestations(
    where: {
      recipient: { equals: $recipient, mode: insensitive }
      schemaId: { equals: $schemaId }
      revoked: { equals: false }
    }
    take: 1
  ) {
    id
    attester
    recipient
    revoked
    timeCreated
  }
}
"#;

#[derive(Debug, Deserialize)]
struct GraphQlResponse {
    #[serde(default)]
    data: Option<AttestationsData>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Debug, Default, Deserialize)]
struct AttestationsData {
    #[serde(default)]
    attestations: Vec<Attestation>,
}

#[derive(Debug, Deserialize)]
struct Attestation {
    #[serde(default)]
    revoked: bool,
}

/// Passport scorer client; only built when an API key is configured
pub struct PassportClient {
    base_url: String,
    api_key: String,
    http: ProviderHttpClient,
}

impl PassportClient {
    pub fn new(base_url: impl Into<String>, api_key: String, http: ProviderHttpClient) -> Self {
        Self {
            base_url: base_url.into(),
            api_key,
            http,
        }
    }

    /// Passport score for `address`; `None` when the account has no passport
    pub async fn score(&self, address: &str) -> Result<Option<f64>, SourceError> {
        let url = self
            .http
            .endpoint(&self.base_url, &format!("registry/score/{}", address), &[])?;
        let response: Option<Value> = self
            .http
            .get_json_optional(url, &[("X-API-Key", self.api_key.as_str())])
            .await?;
        Ok(response.as_ref().and_then(passport_score))
    }
}

/// `score` or `passport_score`, as a number or numeric string
fn passport_score(body: &Value) -> Option<f64> {
    ["score", "passport_score"]
        .iter()
        .filter_map(|field| body.get(*field))
        .find_map(|value| match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        })
        .filter(|score| score.is_finite() && *score >= 0.0)
}

pub struct AttestationSource {
    name: String,
    graphql_url: String,
    schema_id: String,
    http: ProviderHttpClient,
    passport: Option<PassportClient>,
}

impl AttestationSource {
    pub fn new(
        name: impl Into<String>,
        graphql_url: impl Into<String>,
        schema_id: impl Into<String>,
        http: ProviderHttpClient,
        passport: Option<PassportClient>,
    ) -> Self {
        Self {
            name: name.into(),
            graphql_url: graphql_url.into(),
            schema_id: schema_id.into(),
            http,
            passport,
        }
    }

    async fn has_attestation(&self, address: &str) -> Result<bool, SourceError> {
        let url = self.http.validate_url(&self.graphql_url)?;
        let body = json!({
            "query": ATTESTATION_QUERY,
            "variables": { "recipient": address, "schemaId": self.schema_id },
        });
        let response: GraphQlResponse = self.http.post_json(url, &body, &[]).await?;
        verified_from(response)
    }

    async fn passport_score(&self, address: &str) -> Option<f64> {
        let passport = self.passport.as_ref()?;
        match passport.score(address).await {
            Ok(score) => score,
            Err(e) => {
                warn!("Passport lookup failed for {} (optional): {}", address, e);
                None
            }
        }
    }
}

#[async_trait]
impl IdentitySource for AttestationSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch_identity(&self, address: &str) -> Result<IdentityData, SourceError> {
        let address = normalize_address(address);
        let (verified, passport_score) = tokio::join!(
            self.has_attestation(&address),
            self.passport_score(&address)
        );

        Ok(IdentityData {
            has_verified_attestation: verified?,
            passport_score,
        })
    }
}

fn verified_from(response: GraphQlResponse) -> Result<bool, SourceError> {
    if let Some(error) = response.errors.first() {
        return Err(SourceError::Malformed(format!(
            "GraphQL error: {}",
            error.message
        )));
    }
    let data = response
        .data
        .ok_or_else(|| SourceError::Malformed("GraphQL response without data".to_string()))?;
    Ok(data.attestations.iter().any(|a| !a.revoked))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graphql(json: &str) -> GraphQlResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_verified_attestation() {
        let response = graphql(r#"{"data":{"attestations":[{"id":"0x1","revoked":false}]}}"#);
        assert!(verified_from(response).unwrap());

        let response = graphql(r#"{"data":{"attestations":[]}}"#);
        assert!(!verified_from(response).unwrap());

        let response = graphql(r#"{"data":{"attestations":[{"id":"0x1","revoked":true}]}}"#);
        assert!(!verified_from(response).unwrap());
    }

    #[test]
    fn test_graphql_errors_are_malformed() {
        let response = graphql(r#"{"errors":[{"message":"bad query"}]}"#);
        assert!(matches!(
            verified_from(response),
            Err(SourceError::Malformed(msg)) if msg.contains("bad query")
        ));

        let response = graphql("{}");
        assert!(verified_from(response).is_err());
    }

    #[test]
    fn test_passport_score_formats() {
        assert_eq!(passport_score(&json!({"score": 23.5})), Some(23.5));
        assert_eq!(passport_score(&json!({"score": "31.25"})), Some(31.25));
        assert_eq!(passport_score(&json!({"passport_score": 18})), Some(18.0));
        assert_eq!(passport_score(&json!({"score": null})), None);
        assert_eq!(passport_score(&json!({"status": "ERROR"})), None);
    }
}
