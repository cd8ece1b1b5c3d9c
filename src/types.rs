use std::fmt;

use serde::{Deserialize, Serialize};

/// Identity of an unspent output: the pair `(txid, vout)`.
///
/// This pair is globally unique across all valid outputs ever created and
/// is the only identity that survives address re-notation, so it is the key
/// everything in this crate matches on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OutPoint {
    pub txid: String,
    pub vout: u32,
}

impl OutPoint {
    pub fn new(txid: impl Into<String>, vout: u32) -> Self {
        Self {
            txid: txid.into(),
            vout,
        }
    }
}

impl fmt::Display for OutPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.txid, self.vout)
    }
}

/// A spendable output as the wallet layer sees it.
///
/// Owned by the wallet layer; this crate only reads it. `satoshis` is the
/// value in the smallest base-currency unit and says nothing about any
/// token balance the same output may carry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unspent {
    pub txid: String,
    pub vout: u32,
    pub satoshis: u64,
    pub address: String,
    pub script: Vec<u8>,
}

impl Unspent {
    pub fn outpoint(&self) -> OutPoint {
        OutPoint::new(self.txid.clone(), self.vout)
    }
}

/// Result of partitioning a wallet's unspent set against the token index.
///
/// The two sequences are disjoint, together contain every input output
/// exactly once, and each preserves the relative order of the input list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    pub token_bearing: Vec<Unspent>,
    pub value_only: Vec<Unspent>,
}
