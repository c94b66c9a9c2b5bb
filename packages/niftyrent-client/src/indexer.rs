//! Read-only client for the off-chain NFT index (Mintbase GraphQL).

use niftyrent_types::NftRecord;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::warn;

const TOKENS_BY_OWNER: &str = r#"
query TokensByOwner($owner: String!) {
  mb_views_nft_tokens(where: {owner: {_eq: $owner}, burned_timestamp: {_is_null: true}}) {
    nft_contract_id token_id title media owner description nft_contract_name
  }
}"#;

const TOKENS_BY_IDS: &str = r#"
query TokensByIds($nft_contract_id: String!, $token_ids: [String!]!) {
  mb_views_nft_tokens(where: {nft_contract_id: {_eq: $nft_contract_id}, token_id: {_in: $token_ids}, burned_timestamp: {_is_null: true}}) {
    nft_contract_id token_id title media owner description nft_contract_name
  }
}"#;

const TOKEN: &str = r#"
query Token($nft_contract_id: String!, $token_id: String!) {
  mb_views_nft_tokens(where: {nft_contract_id: {_eq: $nft_contract_id}, token_id: {_eq: $token_id}}, limit: 1) {
    nft_contract_id token_id title media owner description nft_contract_name
  }
}"#;

/// Queries against the NFT index. Results may lag behind the chain.
#[allow(async_fn_in_trait)]
pub trait NftIndex {
    /// Unburned tokens currently owned by `owner`.
    async fn tokens_by_owner(&self, owner: &str) -> Result<Vec<NftRecord>, crate::Error>;

    async fn tokens_by_ids(
        &self,
        nft_contract_id: &str,
        token_ids: &[String],
    ) -> Result<Vec<NftRecord>, crate::Error>;

    /// At most one row.
    async fn token(
        &self,
        nft_contract_id: &str,
        token_id: &str,
    ) -> Result<Vec<NftRecord>, crate::Error>;
}

#[derive(Serialize)]
struct GraphQlRequest<'a> {
    query: &'a str,
    variables: Value,
}

#[derive(Deserialize)]
struct GraphQlResponse {
    #[serde(default)]
    data: Option<TokensData>,
    #[serde(default)]
    errors: Option<Vec<GraphQlError>>,
}

#[derive(Deserialize)]
struct TokensData {
    mb_views_nft_tokens: Vec<NftRecord>,
}

#[derive(Deserialize)]
struct GraphQlError {
    message: String,
}

/// [`NftIndex`] over HTTP.
pub struct IndexerClient {
    http: reqwest::Client,
    url: String,
}

impl IndexerClient {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn query(&self, query: &str, variables: Value) -> Result<Vec<NftRecord>, crate::Error> {
        let resp = self
            .http
            .post(&self.url)
            .header("mb-api-key", "anon")
            .json(&GraphQlRequest { query, variables })
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| {
                warn!(url = %self.url, error = %e, "Index query failed");
                crate::Error::Indexer(e.to_string())
            })?;
        let body: GraphQlResponse = resp
            .json()
            .await
            .map_err(|e| crate::Error::Decode(format!("index response: {e}")))?;
        parse_tokens(body)
    }
}

fn parse_tokens(body: GraphQlResponse) -> Result<Vec<NftRecord>, crate::Error> {
    if let Some(errors) = body.errors.filter(|e| !e.is_empty()) {
        let messages: Vec<String> = errors.into_iter().map(|e| e.message).collect();
        return Err(crate::Error::Indexer(messages.join("; ")));
    }
    body.data
        .map(|d| d.mb_views_nft_tokens)
        .ok_or_else(|| crate::Error::Indexer("response carried no data".into()))
}

impl NftIndex for IndexerClient {
    async fn tokens_by_owner(&self, owner: &str) -> Result<Vec<NftRecord>, crate::Error> {
        if owner.is_empty() {
            return Ok(Vec::new());
        }
        self.query(TOKENS_BY_OWNER, json!({ "owner": owner })).await
    }

    async fn tokens_by_ids(
        &self,
        nft_contract_id: &str,
        token_ids: &[String],
    ) -> Result<Vec<NftRecord>, crate::Error> {
        if token_ids.is_empty() {
            return Ok(Vec::new());
        }
        self.query(
            TOKENS_BY_IDS,
            json!({ "nft_contract_id": nft_contract_id, "token_ids": token_ids }),
        )
        .await
    }

    async fn token(
        &self,
        nft_contract_id: &str,
        token_id: &str,
    ) -> Result<Vec<NftRecord>, crate::Error> {
        self.query(
            TOKEN,
            json!({ "nft_contract_id": nft_contract_id, "token_id": token_id }),
        )
        .await
    }
}
