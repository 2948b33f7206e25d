use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::path::{Path, PathBuf};

use crate::models::{PoolCollection, PoolRecord, PriceFeed, UserPositionEntry};

/// Reads fetch results from JSON files on disk.
///
/// Layout under the data directory:
/// - `farms.json`, `pools.json`, `maximus.json` - public pool records
/// - `users/<account>/<collection>.json` - user positions per collection
/// - `prices.json` - price-feed body
/// - `block.json` - `{"blockNumber": n}` or a bare number
///
/// Stands in for the node/API transport that normally produces these payloads.
#[derive(Debug, Clone)]
pub struct FileSource {
    data_dir: PathBuf,
}

impl FileSource {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    async fn read_json<T: DeserializeOwned>(&self, path: PathBuf) -> Result<T> {
        let bytes = tokio::fs::read(&path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;

        serde_json::from_slice(&bytes).with_context(|| format!("Invalid JSON in {}", path.display()))
    }

    pub async fn public_data(&self, collection: PoolCollection) -> Result<Vec<PoolRecord>> {
        let path = self.data_dir.join(format!("{}.json", collection.as_str()));
        self.read_json(path).await
    }

    /// User positions for one collection. A missing file means the account
    /// has no positions there and yields an empty list.
    pub async fn user_data(
        &self,
        collection: PoolCollection,
        account: &str,
    ) -> Result<Vec<UserPositionEntry>> {
        let path = self
            .data_dir
            .join("users")
            .join(account.to_lowercase())
            .join(format!("{}.json", collection.as_str()));

        let exists = tokio::fs::try_exists(&path)
            .await
            .with_context(|| format!("Failed to stat {}", path.display()))?;
        if !exists {
            return Ok(Vec::new());
        }

        self.read_json(path).await
    }

    pub async fn prices(&self) -> Result<PriceFeed> {
        let value: Value = self.read_json(self.data_dir.join("prices.json")).await?;
        Ok(PriceFeed::from_json(&value))
    }

    pub async fn block_number(&self) -> Result<u64> {
        let value: Value = self.read_json(self.data_dir.join("block.json")).await?;

        value
            .as_u64()
            .or_else(|| value.get("blockNumber").and_then(Value::as_u64))
            .context("block.json holds no block number")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bigdecimal::BigDecimal;
    use std::str::FromStr;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("farmsync-{}-{}", name, std::process::id()));
        std::fs::create_dir_all(dir.join("users").join("0xabc")).unwrap();
        dir
    }

    #[tokio::test]
    async fn test_reads_all_payloads() {
        let dir = scratch_dir("all");
        std::fs::write(
            dir.join("farms.json"),
            r#"[{"pid":1,"lpSymbol":"AVAX-USDT LP","quoteTokenSymbol":"USDT","tokenPriceVsQuote":"2.0"}]"#,
        )
        .unwrap();
        std::fs::write(
            dir.join("users/0xabc/farms.json"),
            r#"[{"pid":1,"stakedBalance":"10"}]"#,
        )
        .unwrap();
        std::fs::write(dir.join("prices.json"), r#"{"avax":"20.5"}"#).unwrap();
        std::fs::write(dir.join("block.json"), r#"{"blockNumber":1234}"#).unwrap();

        let source = FileSource::new(&dir);

        let farms = source.public_data(PoolCollection::Farms).await.unwrap();
        assert_eq!(farms.len(), 1);

        let users = source.user_data(PoolCollection::Farms, "0xABC").await.unwrap();
        assert_eq!(users[0].position.staked_balance, Some(BigDecimal::from(10)));

        let prices = source.prices().await.unwrap();
        assert_eq!(prices.get("avax"), Some(&BigDecimal::from_str("20.5").unwrap()));

        assert_eq!(source.block_number().await.unwrap(), 1234);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[tokio::test]
    async fn test_missing_files() {
        let dir = scratch_dir("missing");
        let source = FileSource::new(&dir);

        assert!(source.user_data(PoolCollection::Maximus, "0xabc").await.unwrap().is_empty());
        assert!(source.public_data(PoolCollection::Pools).await.is_err());

        // a file where the account directory should be is an error, not "no positions"
        std::fs::write(dir.join("users").join("0xdef"), "").unwrap();
        assert!(source.user_data(PoolCollection::Farms, "0xdef").await.is_err());

        std::fs::write(dir.join("block.json"), "\"soon\"").unwrap();
        assert!(source.block_number().await.is_err());

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
