use async_trait::async_trait;

use self::types::{MintBaton, TokenBalance, TokenMetadata, TokenUtxo};

pub mod query;
#[cfg(feature = "slpdb")]
pub mod slpdb;
pub mod types;

/// Named lookups against a hosted token ledger-graph index.
///
/// Every lookup is a pure read against the remote index at call time: no
/// retries, no caching. A malformed response surfaces as a decode failure
/// and a timed-out or failed request as a transport failure, both through
/// the implementation's `Error`.
#[async_trait]
pub trait TokenIndex {
    type Error: std::error::Error;

    /// Aggregated unspent token balances held by `address`, descending by
    /// amount. With `token_id` the result is restricted to that token and
    /// holds at most one row; otherwise up to `limit` rows after skipping
    /// `skip`.
    async fn balances(
        &self,
        address: &str,
        token_id: Option<&str>,
        limit: u64,
        skip: u64,
    ) -> Result<Vec<TokenBalance>, Self::Error>;

    /// Metadata for one token id (0 or 1 practical rows).
    async fn token_by_id(&self, token_id: &str) -> Result<Vec<TokenMetadata>, Self::Error>;

    /// Unspent outputs of one token at one address, descending by balance.
    async fn utxos_by_token(
        &self,
        address: &str,
        token_id: &str,
        limit: u64,
    ) -> Result<Vec<TokenUtxo>, Self::Error>;

    /// Outputs still holding minting authority for a token.
    async fn mint_batons(&self, token_id: &str, limit: u64)
        -> Result<Vec<MintBaton>, Self::Error>;

    /// Unspent token-tagged outputs at one address across all tokens,
    /// descending by balance. This is the feed the classifier consumes.
    async fn all_token_utxos(
        &self,
        address: &str,
        limit: u64,
    ) -> Result<Vec<TokenUtxo>, Self::Error>;
}
