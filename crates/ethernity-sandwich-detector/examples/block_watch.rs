use std::collections::HashMap;
use std::env;
use std::sync::Arc;

use anyhow::{Context, Result};
use ethernity_rpc::{EthernityRpcClient, RpcConfig};
use ethernity_sandwich_detector::{
    BuilderRegistry, DetectorConfig, DetectorService, ObservedBlock, ObservedTx, PairRegistry, SandwichDetector,
};
use ethers::prelude::*;
use futures::StreamExt;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let ws_url = env::var("ETHERNITY_WS_URL").unwrap_or_else(|_| "ws://localhost:8546".to_string());
    let pairs_file = env::var("ETHERNITY_SANDWICH_PAIRS_FILE").context("ETHERNITY_SANDWICH_PAIRS_FILE ausente")?;

    let config = DetectorConfig::from_env()?;
    let pairs = PairRegistry::from_file(&pairs_file, config.num_trading_pairs)?;
    let builders = match env::var("ETHERNITY_SANDWICH_BUILDERS_FILE") {
        Ok(path) => BuilderRegistry::from_file(path)?,
        Err(_) => BuilderRegistry::new(),
    };
    info!(pairs = pairs.len(), builders = builders.len(), "dados de referência carregados");

    let rpc = EthernityRpcClient::new(RpcConfig { endpoint: ws_url.clone(), ..RpcConfig::default() }).await?;
    let detector = SandwichDetector::new(config, Arc::new(pairs), Arc::new(builders));
    let (handle, _worker) = DetectorService::spawn(Arc::new(rpc), detector);

    let provider = Provider::<Ws>::connect(&ws_url).await?;
    let mut blocks = provider.subscribe_blocks().await?;

    while let Some(header) = blocks.next().await {
        let Some(number) = header.number.map(|n| n.as_u64()) else { continue };
        let Some(block) = provider.get_block_with_txs(number).await? else { continue };

        if let Some(miner) = block.author {
            for finding in handle.on_block(ObservedBlock { number, miner }).await? {
                println!("{}", serde_json::to_string(&finding)?);
            }
        }

        let mut touched: HashMap<H256, Vec<Address>> = HashMap::new();
        match provider.get_block_receipts(number).await {
            Ok(receipts) => {
                for receipt in receipts {
                    touched
                        .entry(receipt.transaction_hash)
                        .or_default()
                        .extend(receipt.logs.iter().map(|l| l.address));
                }
            }
            Err(err) => warn!(block = number, error = %err, "recibos do bloco indisponíveis"),
        }

        for tx in block.transactions {
            let mut addresses: Vec<Address> = tx.to.into_iter().collect();
            addresses.extend(touched.remove(&tx.hash).unwrap_or_default());
            handle
                .on_transaction(ObservedTx {
                    block_number: number,
                    hash: tx.hash,
                    from: tx.from,
                    to: tx.to,
                    gas_price: tx.gas_price.unwrap_or_default(),
                    addresses,
                })
                .await?;
        }
        handle.drain().await?;
    }

    Ok(())
}
