//! SLPDB aggregation-query templates.
//!
//! Each lookup substitutes its parameters into a fixed pipeline (match →
//! unwind → match → group/project → sort → limit, with an optional join
//! against the `tokens` collection), serialized to compact JSON and
//! base64-encoded onto the endpoint path.

use serde_json::{json, Value};

/// Aggregated unspent balances for every token held by `address`.
pub fn balance(address: &str, limit: u64, skip: u64) -> Value {
    json!({
        "v": 3,
        "q": {
            "db": ["g"],
            "aggregate": [
                { "$match": { "graphTxn.outputs.address": address } },
                { "$unwind": "$graphTxn.outputs" },
                { "$match": {
                    "graphTxn.outputs.status": "UNSPENT",
                    "graphTxn.outputs.address": address
                } },
                { "$group": {
                    "_id": "$tokenDetails.tokenIdHex",
                    "slpAmount": { "$sum": "$graphTxn.outputs.slpAmount" }
                } },
                { "$sort": { "slpAmount": -1 } },
                { "$match": { "slpAmount": { "$gt": 0 } } },
                { "$lookup": {
                    "from": "tokens",
                    "localField": "_id",
                    "foreignField": "tokenDetails.tokenIdHex",
                    "as": "token"
                } }
            ],
            "sort": { "slpAmount": -1 },
            "skip": skip,
            "limit": limit
        }
    })
}

/// Same aggregation restricted to one token id. The grouping stage leaves
/// at most one row for the token, so the inner paging is fixed.
pub fn balance_for_token(address: &str, token_id: &str) -> Value {
    json!({
        "v": 3,
        "q": {
            "db": ["g"],
            "aggregate": [
                { "$match": { "graphTxn.outputs.address": address } },
                { "$unwind": "$graphTxn.outputs" },
                { "$match": {
                    "graphTxn.outputs.status": "UNSPENT",
                    "graphTxn.outputs.address": address
                } },
                { "$group": {
                    "_id": "$tokenDetails.tokenIdHex",
                    "slpAmount": { "$sum": "$graphTxn.outputs.slpAmount" }
                } },
                { "$sort": { "slpAmount": -1 } },
                { "$match": { "slpAmount": { "$gt": 0 } } },
                { "$lookup": {
                    "from": "tokens",
                    "localField": "_id",
                    "foreignField": "tokenDetails.tokenIdHex",
                    "as": "token"
                } },
                { "$match": { "_id": token_id } }
            ],
            "sort": { "slpAmount": -1 },
            "skip": 0,
            "limit": 10
        }
    })
}

/// Token metadata by token id, from the `tokens` collection.
pub fn token_by_id(token_id: &str) -> Value {
    json!({
        "v": 3,
        "q": {
            "db": ["t"],
            "find": {
                "$query": { "tokenDetails.tokenIdHex": token_id }
            },
            "project": { "tokenDetails": 1, "tokenStats": 1, "_id": 0 },
            "limit": 1000
        }
    })
}

/// Unspent outputs of one token at one address, descending by balance.
pub fn utxos_by_token(address: &str, token_id: &str, limit: u64) -> Value {
    json!({
        "v": 3,
        "q": {
            "db": ["g"],
            "aggregate": [
                { "$match": {
                    "graphTxn.outputs": {
                        "$elemMatch": {
                            "status": "UNSPENT",
                            "slpAmount": { "$gte": 0 }
                        }
                    },
                    "tokenDetails.tokenIdHex": token_id
                } },
                { "$unwind": "$graphTxn.outputs" },
                { "$match": {
                    "graphTxn.outputs.status": "UNSPENT",
                    "graphTxn.outputs.slpAmount": { "$gte": 0 },
                    "tokenDetails.tokenIdHex": token_id
                } },
                { "$project": {
                    "token_balance": "$graphTxn.outputs.slpAmount",
                    "address": "$graphTxn.outputs.address",
                    "txid": "$graphTxn.txid",
                    "vout": "$graphTxn.outputs.vout",
                    "tokenId": "$tokenDetails.tokenIdHex"
                } },
                { "$match": { "address": address } },
                { "$sort": { "token_balance": -1 } }
            ],
            "limit": limit
        }
    })
}

/// Outputs with status `BATON_UNSPENT`, i.e. live minting authority.
pub fn mint_batons(token_id: &str, limit: u64) -> Value {
    json!({
        "v": 3,
        "q": {
            "db": ["g"],
            "aggregate": [
                { "$match": {
                    "graphTxn.outputs": {
                        "$elemMatch": { "status": "BATON_UNSPENT" }
                    },
                    "tokenDetails.tokenIdHex": token_id
                } },
                { "$unwind": "$graphTxn.outputs" },
                { "$match": { "graphTxn.outputs.status": "BATON_UNSPENT" } },
                { "$project": {
                    "address": "$graphTxn.outputs.address",
                    "txid": "$graphTxn.txid",
                    "vout": "$graphTxn.outputs.vout",
                    "tokenId": "$tokenDetails.tokenIdHex"
                } }
            ],
            "limit": limit
        }
    })
}

/// Unspent token-tagged outputs at one address across all tokens,
/// descending by balance.
pub fn all_token_utxos(address: &str, limit: u64) -> Value {
    json!({
        "v": 3,
        "q": {
            "db": ["g"],
            "aggregate": [
                { "$match": {
                    "graphTxn.outputs": {
                        "$elemMatch": {
                            "status": "UNSPENT",
                            "slpAmount": { "$gte": 0 },
                            "address": address
                        }
                    }
                } },
                { "$unwind": "$graphTxn.outputs" },
                { "$match": {
                    "graphTxn.outputs.status": "UNSPENT",
                    "graphTxn.outputs.slpAmount": { "$gte": 0 },
                    "graphTxn.outputs.address": address
                } },
                { "$project": {
                    "token_balance": "$graphTxn.outputs.slpAmount",
                    "address": "$graphTxn.outputs.address",
                    "txid": "$graphTxn.txid",
                    "vout": "$graphTxn.outputs.vout",
                    "tokenId": "$tokenDetails.tokenIdHex"
                } },
                { "$sort": { "token_balance": -1 } }
            ],
            "limit": limit
        }
    })
}

/// Turn a query document into the request path: compact JSON, UTF-8,
/// standard base64 with no internal whitespace, appended verbatim to the
/// endpoint. The request itself is a parameterless GET of this URL.
#[cfg(feature = "slpdb")]
pub fn encode_path(endpoint: &str, query: &Value) -> String {
    format!("{}{}", endpoint, base64::encode(query.to_string()))
}
