//! Partition of a wallet's unspent set into token-bearing and value-only
//! coins, so token-bearing outputs are never picked as plain fee or change
//! inputs.
//!
//! The index reports token ownership under its own address notation, which
//! may differ from the wallet's notation for the same key material, so
//! address equality is unsound here. Membership is decided by the
//! `(txid, vout)` outpoint alone; the `address` field of a [`TokenUtxo`]
//! is never consulted.

use std::collections::HashSet;

use crate::index::types::TokenUtxo;
use crate::index::TokenIndex;
use crate::types::{Classification, OutPoint, Unspent};
use crate::unspent::UnspentSource;

/// Duplicate identity key in the unspent input.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("duplicate outpoint in unspent input: {0}")]
pub struct DuplicateOutpoint(pub OutPoint);

#[derive(thiserror::Error, Debug)]
pub enum Error<U, I>
where
    U: std::error::Error,
    I: std::error::Error,
{
    #[error("unspent source error: {0}")]
    UnspentSource(U),
    #[error("token index error: {0}")]
    TokenIndex(I),
    #[error(transparent)]
    Invariant(#[from] DuplicateOutpoint),
}

/// Partition `unspents` by outpoint membership in `token_utxos`.
///
/// One pass over `unspents` in original order after an O(m) set build;
/// no re-sorting, no deduplication, no re-fetching. Token records whose
/// outpoint is absent from `unspents` (e.g. already spent elsewhere) are
/// ignored. Total over well-formed input; assumes the caller's list is
/// already deduplicated by outpoint — see [`partition_strict`].
pub fn partition(unspents: Vec<Unspent>, token_utxos: &[TokenUtxo]) -> Classification {
    let token_keys: HashSet<(&str, u32)> = token_utxos
        .iter()
        .map(|token_utxo| (token_utxo.txid.as_str(), token_utxo.vout))
        .collect();

    let mut result = Classification::default();
    for unspent in unspents {
        if token_keys.contains(&(unspent.txid.as_str(), unspent.vout)) {
            result.token_bearing.push(unspent);
        } else {
            result.value_only.push(unspent);
        }
    }
    result
}

/// [`partition`], but rejects duplicate outpoints in the unspent input
/// instead of silently miscounting.
pub fn partition_strict(
    unspents: Vec<Unspent>,
    token_utxos: &[TokenUtxo],
) -> Result<Classification, DuplicateOutpoint> {
    {
        let mut seen = HashSet::with_capacity(unspents.len());
        for unspent in &unspents {
            if !seen.insert((unspent.txid.as_str(), unspent.vout)) {
                return Err(DuplicateOutpoint(unspent.outpoint()));
            }
        }
    }
    Ok(partition(unspents, token_utxos))
}

/// Classification over live collaborators: an [`UnspentSource`] for the
/// wallet's outputs and a [`TokenIndex`] for the token-tagged set.
#[derive(Debug, Clone)]
pub struct Classifier<U, I> {
    unspent_source: U,
    token_index: I,
}

impl<U, I> Classifier<U, I>
where
    U: UnspentSource,
    I: TokenIndex,
{
    pub fn new(unspent_source: U, token_index: I) -> Self {
        Self {
            unspent_source,
            token_index,
        }
    }

    /// Fetch both inputs concurrently, then partition strictly.
    ///
    /// `wallet_address` is the notation the unspent source speaks and
    /// `token_address` the notation the index speaks, both for the same
    /// underlying key material. Collaborator failures propagate
    /// unmodified; nothing is caught or retried here.
    pub async fn classify_address(
        &self,
        wallet_address: &str,
        token_address: &str,
        limit: u64,
    ) -> Result<Classification, Error<U::Error, I::Error>> {
        let (unspents, token_utxos) = tokio::join!(
            self.unspent_source.unspents(wallet_address),
            self.token_index.all_token_utxos(token_address, limit),
        );
        let unspents = unspents.map_err(Error::UnspentSource)?;
        let token_utxos = token_utxos.map_err(Error::TokenIndex)?;

        Ok(partition_strict(unspents, &token_utxos)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::types::{MintBaton, TokenBalance, TokenMetadata};
    use async_trait::async_trait;

    const WALLET_ADDRESS: &str = "bitcoincash:qpt8z56sjcng8eux4pgvl7msnns2fzj05sh209src0g";
    const TOKEN_ADDRESS: &str = "simpleledger:qpt8z56sjcng8eux4pgvl7msnns2fzj05s89rl7w90";
    const TOKEN_ID: &str = "7f27766677948e02aca409bf344632f3e8e350105017ef14d88fc2c048347146";

    fn txid(byte: u8) -> String {
        format!("{byte:02x}").repeat(32)
    }

    fn unspent(txid_byte: u8, vout: u32) -> Unspent {
        Unspent {
            txid: txid(txid_byte),
            vout,
            satoshis: 546,
            address: WALLET_ADDRESS.into(),
            script: vec![0x76, 0xa9, 0x14],
        }
    }

    fn token_utxo(txid_byte: u8, vout: u32) -> TokenUtxo {
        TokenUtxo {
            token_balance: 100,
            // the notation the index speaks, not the wallet's
            address: TOKEN_ADDRESS.into(),
            txid: txid(txid_byte),
            vout,
            token_id: TOKEN_ID.into(),
        }
    }

    fn outpoints(unspents: &[Unspent]) -> Vec<OutPoint> {
        unspents.iter().map(Unspent::outpoint).collect()
    }

    #[test]
    fn empty_token_set_leaves_everything_value_only() {
        let unspents = vec![unspent(0xaa, 0), unspent(0xaa, 1)];
        let result = partition(unspents.clone(), &[]);

        assert!(result.token_bearing.is_empty());
        assert_eq!(result.value_only, unspents);
    }

    #[test]
    fn empty_unspent_list_yields_empty_result() {
        let result = partition(Vec::new(), &[token_utxo(0xaa, 0)]);
        assert!(result.token_bearing.is_empty());
        assert!(result.value_only.is_empty());
    }

    #[test]
    fn partial_match_splits_by_outpoint() {
        let unspents = vec![unspent(0xaa, 0), unspent(0xaa, 1), unspent(0xbb, 0)];
        let result = partition(unspents, &[token_utxo(0xaa, 1)]);

        assert_eq!(outpoints(&result.token_bearing), vec![OutPoint::new(txid(0xaa), 1)]);
        assert_eq!(
            outpoints(&result.value_only),
            vec![OutPoint::new(txid(0xaa), 0), OutPoint::new(txid(0xbb), 0)]
        );
    }

    #[test]
    fn token_record_for_unknown_coin_is_ignored() {
        let unspents = vec![unspent(0xaa, 0)];
        let result = partition(unspents.clone(), &[token_utxo(0xcc, 5)]);

        assert!(result.token_bearing.is_empty());
        assert_eq!(result.value_only, unspents);
    }

    #[test]
    fn matching_never_consults_the_address_field() {
        // index-notation address on the record, wallet-notation on the coin
        let unspents = vec![unspent(0xaa, 0), unspent(0xbb, 3)];
        let result = partition(unspents, &[token_utxo(0xbb, 3)]);

        assert_eq!(outpoints(&result.token_bearing), vec![OutPoint::new(txid(0xbb), 3)]);
        assert_eq!(outpoints(&result.value_only), vec![OutPoint::new(txid(0xaa), 0)]);
    }

    #[test]
    fn partition_is_exhaustive_and_disjoint() {
        let unspents: Vec<Unspent> = (0..20).map(|vout| unspent(0xaa, vout)).collect();
        let tokens: Vec<TokenUtxo> = (0..20)
            .filter(|vout| vout % 3 == 0)
            .map(|vout| token_utxo(0xaa, vout))
            .collect();

        let input_keys: HashSet<OutPoint> = outpoints(&unspents).into_iter().collect();
        let result = partition(unspents, &tokens);

        let bearing: HashSet<OutPoint> = outpoints(&result.token_bearing).into_iter().collect();
        let value: HashSet<OutPoint> = outpoints(&result.value_only).into_iter().collect();

        assert!(bearing.is_disjoint(&value));
        assert_eq!(
            result.token_bearing.len() + result.value_only.len(),
            input_keys.len()
        );
        let union: HashSet<OutPoint> = bearing.union(&value).cloned().collect();
        assert_eq!(union, input_keys);
    }

    #[test]
    fn relative_order_is_preserved_within_each_side() {
        let unspents = vec![
            unspent(0xaa, 2),
            unspent(0xbb, 0),
            unspent(0xaa, 0),
            unspent(0xcc, 7),
            unspent(0xbb, 1),
        ];
        let tokens = vec![token_utxo(0xbb, 0), token_utxo(0xbb, 1)];
        let result = partition(unspents, &tokens);

        assert_eq!(
            outpoints(&result.token_bearing),
            vec![OutPoint::new(txid(0xbb), 0), OutPoint::new(txid(0xbb), 1)]
        );
        assert_eq!(
            outpoints(&result.value_only),
            vec![
                OutPoint::new(txid(0xaa), 2),
                OutPoint::new(txid(0xaa), 0),
                OutPoint::new(txid(0xcc), 7),
            ]
        );
    }

    #[test]
    fn classification_is_idempotent() {
        let unspents = vec![unspent(0xaa, 0), unspent(0xbb, 0), unspent(0xcc, 1)];
        let tokens = vec![token_utxo(0xbb, 0)];

        let first = partition(unspents.clone(), &tokens);
        let second = partition(unspents, &tokens);
        assert_eq!(first, second);
    }

    #[test]
    fn strict_mode_rejects_duplicate_outpoints() {
        let unspents = vec![unspent(0xaa, 0), unspent(0xbb, 1), unspent(0xaa, 0)];
        let err = partition_strict(unspents, &[]).unwrap_err();
        assert_eq!(err, DuplicateOutpoint(OutPoint::new(txid(0xaa), 0)));
    }

    #[test]
    fn strict_mode_passes_clean_input_through() {
        let unspents = vec![unspent(0xaa, 0), unspent(0xaa, 1)];
        let tokens = vec![token_utxo(0xaa, 1)];

        let strict = partition_strict(unspents.clone(), &tokens).unwrap();
        assert_eq!(strict, partition(unspents, &tokens));
    }

    // Composition over fake collaborators.

    #[derive(thiserror::Error, Debug)]
    #[error("fake collaborator failure")]
    struct FakeError;

    struct FakeUnspents(Vec<Unspent>);

    #[async_trait]
    impl UnspentSource for FakeUnspents {
        type Error = FakeError;

        async fn unspents(&self, address: &str) -> Result<Vec<Unspent>, FakeError> {
            assert_eq!(address, WALLET_ADDRESS);
            Ok(self.0.clone())
        }
    }

    struct FailingUnspents;

    #[async_trait]
    impl UnspentSource for FailingUnspents {
        type Error = FakeError;

        async fn unspents(&self, _address: &str) -> Result<Vec<Unspent>, FakeError> {
            Err(FakeError)
        }
    }

    struct FakeIndex(Vec<TokenUtxo>);

    #[async_trait]
    impl TokenIndex for FakeIndex {
        type Error = FakeError;

        async fn balances(
            &self,
            _address: &str,
            _token_id: Option<&str>,
            _limit: u64,
            _skip: u64,
        ) -> Result<Vec<TokenBalance>, FakeError> {
            Ok(Vec::new())
        }

        async fn token_by_id(&self, _token_id: &str) -> Result<Vec<TokenMetadata>, FakeError> {
            Ok(Vec::new())
        }

        async fn utxos_by_token(
            &self,
            _address: &str,
            _token_id: &str,
            _limit: u64,
        ) -> Result<Vec<TokenUtxo>, FakeError> {
            Ok(Vec::new())
        }

        async fn mint_batons(
            &self,
            _token_id: &str,
            _limit: u64,
        ) -> Result<Vec<MintBaton>, FakeError> {
            Ok(Vec::new())
        }

        async fn all_token_utxos(
            &self,
            address: &str,
            _limit: u64,
        ) -> Result<Vec<TokenUtxo>, FakeError> {
            assert_eq!(address, TOKEN_ADDRESS);
            Ok(self.0.clone())
        }
    }

    #[tokio::test]
    async fn classify_address_partitions_fetched_snapshots() {
        let unspents = vec![unspent(0xaa, 0), unspent(0xaa, 1), unspent(0xbb, 0)];
        let classifier = Classifier::new(
            FakeUnspents(unspents),
            FakeIndex(vec![token_utxo(0xaa, 1)]),
        );

        let result = classifier
            .classify_address(WALLET_ADDRESS, TOKEN_ADDRESS, 100)
            .await
            .unwrap();

        assert_eq!(outpoints(&result.token_bearing), vec![OutPoint::new(txid(0xaa), 1)]);
        assert_eq!(
            outpoints(&result.value_only),
            vec![OutPoint::new(txid(0xaa), 0), OutPoint::new(txid(0xbb), 0)]
        );
    }

    #[tokio::test]
    async fn collaborator_failure_propagates_unmodified() {
        let classifier = Classifier::new(FailingUnspents, FakeIndex(Vec::new()));

        let err = classifier
            .classify_address(WALLET_ADDRESS, TOKEN_ADDRESS, 100)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::UnspentSource(FakeError)));
    }

    #[tokio::test]
    async fn duplicate_unspent_input_is_an_invariant_violation() {
        let unspents = vec![unspent(0xaa, 0), unspent(0xaa, 0)];
        let classifier = Classifier::new(FakeUnspents(unspents), FakeIndex(Vec::new()));

        let err = classifier
            .classify_address(WALLET_ADDRESS, TOKEN_ADDRESS, 100)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Invariant(DuplicateOutpoint(op)) if op == OutPoint::new(txid(0xaa), 0)
        ));
    }
}
