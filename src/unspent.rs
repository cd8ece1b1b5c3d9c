use async_trait::async_trait;

use crate::types::Unspent;

/// Source of the wallet's spendable outputs for one address.
///
/// The list is fetched once per classification and handed to the classifier
/// as an explicit argument; implementations must not be re-queried mid-pass.
#[async_trait]
pub trait UnspentSource {
    type Error: std::error::Error;

    async fn unspents(&self, address: &str) -> Result<Vec<Unspent>, Self::Error>;
}
