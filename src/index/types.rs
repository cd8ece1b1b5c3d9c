use serde::{Deserialize, Serialize};

use crate::types::OutPoint;

/// An output the index reports as carrying a token balance.
///
/// Ephemeral: recomputed on every query, never cached. The `address` here
/// is the notation the index speaks (which may differ from the wallet's
/// notation for the same key material), so classification matches on the
/// outpoint only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUtxo {
    pub token_balance: u64,
    pub address: String,
    pub txid: String,
    pub vout: u32,
    #[serde(rename = "tokenId")]
    pub token_id: String,
}

impl TokenUtxo {
    pub fn outpoint(&self) -> OutPoint {
        OutPoint::new(self.txid.clone(), self.vout)
    }
}

/// Read-only token metadata, identified by `token_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenMetadata {
    pub token_id: String,
    pub document_uri: String,
    pub document_hash: String,
    pub symbol: String,
    pub name: String,
    pub genesis_or_mint_quantity: u64,
}

/// One aggregated balance row: total unspent amount of a token at an
/// address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenBalance {
    pub token_name: String,
    pub amount: u64,
}

/// An output still holding minting authority for a token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintBaton {
    pub address: String,
    pub txid: String,
    pub vout: u32,
}
