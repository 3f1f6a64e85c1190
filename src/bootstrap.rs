// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Command-line entry point, configured from the environment.
//!
//! | Variable          | Meaning                                              |
//! |-------------------|------------------------------------------------------|
//! | `ARCHIVE_PATH`    | Bloom archive file (required)                        |
//! | `CHAIN`           | Chain id, default 1                                  |
//! | `BASE_BLOCK`      | Block of the archive's first record                  |
//! | `START_BLOCK`     | First block to search, default the base block        |
//! | `SEARCH_ADDRESS`  | Emitting contract, also the call target              |
//! | `SEARCH_TOPICS`   | Comma separated event signature alternatives         |
//! | `SEARCH_TOPICS_N` | Comma separated alternatives for topic position N    |
//! | `RPC_URL`         | Node endpoint; without it only candidates are counted|
//! | `CHECKPOINT_PATH` | Checkpoint file, default `checkpoint.json`           |
//! | `CALL_SELECTORS`  | Comma separated selectors whose call input to record |
//! | `REQUEST_DELAY_MS`| Delay before each remote request                     |
//!
//! `SEARCH_TOPICS_0` to `SEARCH_TOPICS_3` constrain each indexed topic position;
//! `SEARCH_TOPICS` adds to position 0.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use alloy_chains::NamedChain;
use alloy_primitives::{Address, BlockNumber, Selector, B256};
use alloy_provider::{Provider, ProviderBuilder, RootProvider};
use anyhow::{bail, Context};
use dotenvy::dotenv;
use tracing::info;
use url::Url;

use crate::{
    BloomArchive, CallMatcher, Checkpoint, LogCollector, LogQuery, RpcChainSource,
    ScanConfigBuilder, TopicPosition,
};

const DEFAULT_CHECKPOINT_PATH: &str = "checkpoint.json";

/// Settings read from the environment.
#[derive(Debug, Clone)]
struct Settings {
    archive_path: PathBuf,
    chain: NamedChain,
    base_block: Option<BlockNumber>,
    start_block: Option<BlockNumber>,
    address: Option<Address>,
    topics: Vec<(TopicPosition, B256)>,
    rpc_url: Option<Url>,
    checkpoint_path: PathBuf,
    selectors: Vec<Selector>,
    request_delay: Option<Duration>,
}

impl Settings {
    fn from_env() -> anyhow::Result<Self> {
        Self::from_vars(|name| dotenvy::var(name).ok())
    }

    fn from_vars(var: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let archive_path = var("ARCHIVE_PATH")
            .context("'ARCHIVE_PATH' environment variable must point to the Bloom archive")?
            .into();

        let chain_id: u64 = optional(&var, "CHAIN")?.unwrap_or(1);
        let chain = NamedChain::try_from(chain_id)
            .map_err(|_| anyhow::anyhow!("Unsupported chain id {chain_id} in 'CHAIN'"))?;

        let mut topics: Vec<(TopicPosition, B256)> = list(&var, "SEARCH_TOPICS")?
            .into_iter()
            .map(|topic| (TopicPosition::Topic0, topic))
            .collect();
        for position in TopicPosition::ALL {
            let name = format!("SEARCH_TOPICS_{}", position.index());
            topics.extend(
                list(&var, &name)?
                    .into_iter()
                    .map(|topic| (position, topic)),
            );
        }

        Ok(Self {
            archive_path,
            chain,
            base_block: optional(&var, "BASE_BLOCK")?,
            start_block: optional(&var, "START_BLOCK")?,
            address: optional(&var, "SEARCH_ADDRESS")?,
            topics,
            rpc_url: optional(&var, "RPC_URL")?,
            checkpoint_path: var("CHECKPOINT_PATH")
                .unwrap_or_else(|| DEFAULT_CHECKPOINT_PATH.to_string())
                .into(),
            selectors: list(&var, "CALL_SELECTORS")?,
            request_delay: optional::<u64>(&var, "REQUEST_DELAY_MS")?.map(Duration::from_millis),
        })
    }

    fn query(&self) -> LogQuery {
        let query = self
            .topics
            .iter()
            .fold(LogQuery::new(), |query, (position, topic)| {
                query.with_topic(*position, *topic)
            });
        match self.address {
            Some(address) => query.with_address(address),
            None => query,
        }
    }

    fn matcher(&self) -> anyhow::Result<Option<CallMatcher>> {
        if self.selectors.is_empty() {
            return Ok(None);
        }
        let Some(target) = self.address else {
            bail!("'CALL_SELECTORS' requires 'SEARCH_ADDRESS' as the call target");
        };
        Ok(Some(CallMatcher::new(target, self.selectors.iter().copied())?))
    }
}

/// Main entry point for the application.
pub async fn run() -> anyhow::Result<()> {
    // Load environment variables
    dotenv().ok();

    let settings = Settings::from_env()?;

    let mut builder = ScanConfigBuilder::with_defaults();
    if let Some(base_block) = settings.base_block {
        builder = builder.chain_base_block(settings.chain, base_block);
    }
    if let Some(delay) = settings.request_delay {
        builder = builder.chain_request_delay(settings.chain, delay);
    }
    let config = builder.build();

    let base_block = config.get_base_block(settings.chain);
    let archive = BloomArchive::new(&settings.archive_path).with_base_block(base_block);
    let query = settings.query();
    let from_block = settings.start_block.unwrap_or(base_block);
    let last_block = archive.last_block()?;

    info!(
        chain = %settings.chain,
        archive = %settings.archive_path.display(),
        base_block = base_block,
        from_block = from_block,
        last_block = ?last_block,
        "Opened Bloom archive"
    );

    let Some(rpc_url) = settings.rpc_url.clone() else {
        return count_candidates(&archive, &query, from_block);
    };

    let provider = connect(rpc_url).await?;
    let chain_id = provider.get_chain_id().await?;
    if chain_id != settings.chain as u64 {
        bail!(
            "RPC endpoint serves chain {chain_id}, expected {}",
            settings.chain as u64
        );
    }

    let matcher = settings.matcher()?;
    let collector = LogCollector::with_pacer(
        RpcChainSource::new(provider),
        config.pacer(settings.chain),
    )
    .with_chain(settings.chain);

    let mut checkpoint = Checkpoint::load(&settings.checkpoint_path).await?;
    let result = collector
        .collect(&archive, &query, matcher.as_ref(), from_block, &mut checkpoint)
        .await;

    // Completed blocks are kept even when the run fails
    checkpoint.save(&settings.checkpoint_path).await?;
    let summary = result?;

    info!(
        checkpoint = %settings.checkpoint_path.display(),
        records = checkpoint.records.len(),
        false_positive_rate = summary.false_positive_rate(),
        "Saved checkpoint"
    );

    Ok(())
}

fn count_candidates(
    archive: &BloomArchive,
    query: &LogQuery,
    from_block: BlockNumber,
) -> anyhow::Result<()> {
    let mut candidates = 0u64;
    for block in archive.scan(from_block, query.composite_filter())?.candidates() {
        block?;
        candidates += 1;
    }

    info!(
        from_block = from_block,
        candidates = candidates,
        "Counted candidate blocks"
    );
    Ok(())
}

async fn connect(url: Url) -> anyhow::Result<RootProvider> {
    #[cfg(feature = "ws")]
    {
        use alloy_provider::WsConnect;

        if matches!(url.scheme(), "ws" | "wss") {
            return Ok(ProviderBuilder::new()
                .disable_recommended_fillers()
                .connect_ws(WsConnect::new(url.as_str()))
                .await?);
        }
    }

    Ok(ProviderBuilder::new()
        .disable_recommended_fillers()
        .connect_http(url))
}

fn optional<T>(var: impl Fn(&str) -> Option<String>, name: &str) -> anyhow::Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match var(name) {
        Some(value) if !value.trim().is_empty() => value
            .trim()
            .parse()
            .map(Some)
            .with_context(|| format!("Invalid value for '{name}'")),
        _ => Ok(None),
    }
}

fn list<T>(var: impl Fn(&str) -> Option<String>, name: &str) -> anyhow::Result<Vec<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let Some(value) = var(name) else {
        return Ok(Vec::new());
    };
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| {
            item.parse()
                .with_context(|| format!("Invalid entry '{item}' in '{name}'"))
        })
        .collect()
}
