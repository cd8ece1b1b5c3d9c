use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::index::query;
use crate::index::types::{MintBaton, TokenBalance, TokenMetadata, TokenUtxo};
use crate::index::TokenIndex;

/// Public mainnet SLPDB instance.
pub const MAIN_ENDPOINT: &str = "https://slpdb.fountainhead.cash/q/";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("transport failure: {0}")]
    Transport(reqwest::Error),
    #[error("index returned http {0}")]
    BadStatus(reqwest::StatusCode),
    #[error("response body is not json: {0}")]
    MalformedBody(reqwest::Error),
    #[error("response is missing the {0:?} collection")]
    MissingCollection(&'static str),
    #[error("unexpected document shape: {0}")]
    BadDocument(serde_json::Error),
    #[error("balance row has an empty token join")]
    MissingJoin,
}

/// HTTP client for an SLPDB ledger-graph index.
///
/// Wraps `reqwest::Client` with the index endpoint and a fixed request
/// timeout. Every lookup is a single GET of the base64-encoded query with
/// no retries and no caching; failures surface directly to the caller.
#[derive(Debug, Clone)]
pub struct SlpdbClient {
    http: reqwest::Client,
    endpoint: String,
}

impl SlpdbClient {
    /// Client for an explicit endpoint (e.g. `https://slpdb.example/q/`)
    /// with the default 30-second timeout.
    pub fn new(endpoint: impl Into<String>) -> Result<Self, Error> {
        Self::with_timeout(endpoint, DEFAULT_TIMEOUT)
    }

    /// Client for the public mainnet instance.
    pub fn mainnet() -> Result<Self, Error> {
        Self::new(MAIN_ENDPOINT)
    }

    pub fn with_timeout(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, Error> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(Error::Transport)?;
        Ok(Self {
            http,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Run one query and return the rows under the named collection key
    /// (`"g"` for graph queries, `"t"` for token queries).
    async fn run(&self, collection: &'static str, query: &Value) -> Result<Vec<Value>, Error> {
        let url = query::encode_path(&self.endpoint, query);
        log::debug!("slpdb {collection} query: {url}");

        let response = self.http.get(&url).send().await.map_err(Error::Transport)?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::BadStatus(status));
        }

        let mut body: Value = response.json().await.map_err(Error::MalformedBody)?;
        match body.get_mut(collection).map(Value::take) {
            Some(Value::Array(rows)) => Ok(rows),
            _ => Err(Error::MissingCollection(collection)),
        }
    }
}

fn decode_rows<T: DeserializeOwned>(rows: Vec<Value>) -> Result<Vec<T>, Error> {
    rows.into_iter()
        .map(|row| serde_json::from_value(row).map_err(Error::BadDocument))
        .collect()
}

// Row shapes as SLPDB returns them, pre-flattening.

#[derive(Deserialize)]
struct BalanceRow {
    #[serde(rename = "slpAmount")]
    slp_amount: u64,
    token: Vec<TokenJoin>,
}

#[derive(Deserialize)]
struct TokenJoin {
    #[serde(rename = "tokenDetails")]
    token_details: JoinDetails,
}

#[derive(Deserialize)]
struct JoinDetails {
    name: String,
}

#[derive(Deserialize)]
struct TokenRow {
    #[serde(rename = "tokenDetails")]
    token_details: TokenDetails,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenDetails {
    token_id_hex: String,
    document_uri: String,
    // null for tokens issued without a document hash
    document_sha256_hex: Option<String>,
    symbol: String,
    name: String,
    genesis_or_mint_quantity: u64,
}

#[async_trait]
impl TokenIndex for SlpdbClient {
    type Error = Error;

    async fn balances(
        &self,
        address: &str,
        token_id: Option<&str>,
        limit: u64,
        skip: u64,
    ) -> Result<Vec<TokenBalance>, Error> {
        let query = match token_id {
            Some(token_id) => query::balance_for_token(address, token_id),
            None => query::balance(address, limit, skip),
        };
        let rows: Vec<BalanceRow> = decode_rows(self.run("g", &query).await?)?;

        rows.into_iter()
            .map(|row| {
                let joined = row.token.into_iter().next().ok_or(Error::MissingJoin)?;
                Ok(TokenBalance {
                    token_name: joined.token_details.name,
                    amount: row.slp_amount,
                })
            })
            .collect()
    }

    async fn token_by_id(&self, token_id: &str) -> Result<Vec<TokenMetadata>, Error> {
        let rows: Vec<TokenRow> =
            decode_rows(self.run("t", &query::token_by_id(token_id)).await?)?;

        Ok(rows
            .into_iter()
            .map(|row| TokenMetadata {
                token_id: row.token_details.token_id_hex,
                document_uri: row.token_details.document_uri,
                document_hash: row.token_details.document_sha256_hex.unwrap_or_default(),
                symbol: row.token_details.symbol,
                name: row.token_details.name,
                genesis_or_mint_quantity: row.token_details.genesis_or_mint_quantity,
            })
            .collect())
    }

    async fn utxos_by_token(
        &self,
        address: &str,
        token_id: &str,
        limit: u64,
    ) -> Result<Vec<TokenUtxo>, Error> {
        let rows = self
            .run("g", &query::utxos_by_token(address, token_id, limit))
            .await?;
        decode_rows(rows)
    }

    async fn mint_batons(&self, token_id: &str, limit: u64) -> Result<Vec<MintBaton>, Error> {
        let rows = self.run("g", &query::mint_batons(token_id, limit)).await?;
        decode_rows(rows)
    }

    async fn all_token_utxos(&self, address: &str, limit: u64) -> Result<Vec<TokenUtxo>, Error> {
        let rows = self
            .run("g", &query::all_token_utxos(address, limit))
            .await?;
        decode_rows(rows)
    }
}
