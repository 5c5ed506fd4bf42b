//! HTTP client for the hosted content store.
//!
//! Reads go through the GROQ query endpoint, writes through the mutate
//! endpoint, and images through the asset endpoint. Every non-success
//! response is turned into [`AppError::ContentStore`].

use reqwest::{Client, Response, Url};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};
use std::time::Duration;

use crate::{
    config::Config,
    error::{AppError, Result},
};

#[derive(Debug, Clone)]
pub struct ContentClient {
    http: Client,
    api_url: String,
    dataset: String,
    token: String,
}

#[derive(Debug, Deserialize)]
struct QueryResponse<T> {
    result: T,
}

/// A single entry of a mutation transaction.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Mutation {
    Create(Value),
    CreateIfNotExists(Value),
    Patch(Patch),
    Delete { id: String },
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Patch {
    pub id: String,
    #[serde(rename = "ifRevisionID", skip_serializing_if = "Option::is_none")]
    pub if_revision_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub set: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unset: Vec<String>,
}

impl Patch {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn if_revision(mut self, revision: Option<String>) -> Self {
        self.if_revision_id = revision;
        self
    }

    pub fn set(mut self, field: &str, value: Value) -> Self {
        self.set
            .get_or_insert_with(Map::new)
            .insert(field.to_string(), value);
        self
    }

    pub fn unset(mut self, field: &str) -> Self {
        self.unset.push(field.to_string());
        self
    }
}

#[derive(Debug, Serialize)]
struct MutationRequest<'a> {
    mutations: &'a [Mutation],
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MutationResponse {
    pub transaction_id: String,
    #[serde(default)]
    pub results: Vec<MutationResult>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MutationResult {
    pub id: String,
    #[serde(default)]
    pub document: Option<Value>,
}

impl MutationResult {
    /// Decodes the returned document, if the store sent one back.
    pub fn document_as<T: DeserializeOwned>(&self) -> Result<Option<T>> {
        self.document
            .clone()
            .map(serde_json::from_value)
            .transpose()
            .map_err(AppError::from)
    }
}

#[derive(Debug, Deserialize)]
struct AssetResponse {
    document: AssetDocument,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssetDocument {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StoreErrorBody {
    error: StoreErrorDetail,
}

#[derive(Debug, Deserialize)]
struct StoreErrorDetail {
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl ContentClient {
    pub fn new(api_url: &str, dataset: &str, token: &str) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http,
            api_url: api_url.trim_end_matches('/').to_string(),
            dataset: dataset.to_string(),
            token: token.to_string(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            &config.content_api_url(),
            &config.sanity_dataset,
            &config.sanity_api_token,
        )
    }

    fn endpoint(&self, kind: &str) -> Result<Url> {
        Url::parse(&format!("{}/{}/{}", self.api_url, kind, self.dataset))
            .map_err(|e| AppError::Internal(format!("Invalid content store URL: {}", e)))
    }

    /// Runs a GROQ query. Parameters are passed as `$name` and JSON encoded,
    /// as the query endpoint expects.
    pub async fn fetch<T: DeserializeOwned>(&self, query: &str, params: &[(&str, &str)]) -> Result<T> {
        let mut url = self.endpoint("data/query")?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("query", query);
            for (name, value) in params {
                pairs.append_pair(&format!("${}", name), &serde_json::to_string(value)?);
            }
        }

        let response = self
            .http
            .get(url)
            .bearer_auth(&self.token)
            .send()
            .await?;

        let body: QueryResponse<T> = Self::check(response).await?.json().await?;
        Ok(body.result)
    }

    /// Commits all mutations in one transaction.
    pub async fn mutate(&self, mutations: &[Mutation]) -> Result<MutationResponse> {
        let mut url = self.endpoint("data/mutate")?;
        url.query_pairs_mut()
            .append_pair("returnIds", "true")
            .append_pair("returnDocuments", "true")
            .append_pair("visibility", "sync");

        let response = self
            .http
            .post(url)
            .bearer_auth(&self.token)
            .json(&MutationRequest { mutations })
            .send()
            .await?;

        let body: MutationResponse = Self::check(response).await?.json().await?;
        tracing::debug!(
            "Committed transaction {} with {} mutation(s)",
            body.transaction_id,
            body.results.len()
        );
        Ok(body)
    }

    async fn mutate_one(&self, mutation: Mutation) -> Result<MutationResult> {
        self.mutate(std::slice::from_ref(&mutation))
            .await?
            .results
            .into_iter()
            .next()
            .ok_or_else(|| AppError::Internal("Content store returned no mutation result".to_string()))
    }

    pub async fn create<T: Serialize>(&self, document: &T) -> Result<MutationResult> {
        self.mutate_one(Mutation::Create(serde_json::to_value(document)?))
            .await
    }

    pub async fn create_if_not_exists<T: Serialize>(&self, document: &T) -> Result<MutationResult> {
        self.mutate_one(Mutation::CreateIfNotExists(serde_json::to_value(document)?))
            .await
    }

    pub async fn patch(&self, patch: Patch) -> Result<MutationResult> {
        self.mutate_one(Mutation::Patch(patch)).await
    }

    pub async fn delete(&self, id: &str) -> Result<MutationResult> {
        self.mutate_one(Mutation::Delete { id: id.to_string() })
            .await
    }

    pub async fn upload_image(
        &self,
        bytes: Vec<u8>,
        filename: &str,
        content_type: &str,
    ) -> Result<AssetDocument> {
        let mut url = self.endpoint("assets/images")?;
        url.query_pairs_mut().append_pair("filename", filename);

        let response = self
            .http
            .post(url)
            .bearer_auth(&self.token)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await?;

        let body: AssetResponse = Self::check(response).await?.json().await?;
        Ok(body.document)
    }

    async fn check(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<StoreErrorBody>(&text)
            .ok()
            .and_then(|body| body.error.description.or(body.error.message))
            .unwrap_or(text);

        if status == reqwest::StatusCode::CONFLICT {
            return Err(AppError::Conflict(message));
        }

        Err(AppError::ContentStore {
            status: status.as_u16(),
            message,
        })
    }
}
