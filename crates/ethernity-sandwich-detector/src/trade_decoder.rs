use crate::config::DetectorConfig;
use crate::events::ObservedTx;
use crate::log_semantics::{map_logs, MappedLog};
use crate::registry::{BuilderRegistry, PairRegistry};
use crate::trade_path::{PathSegment, TradePath, TradePathBuilder};
use ethernity_core::{
    error::Result,
    types::TransactionHash,
    utils::{format_address, format_h256, format_token_amount},
    ReceiptLogs,
};
use ethereum_types::{Address, U256};
use serde::Serialize;
use std::sync::Arc;

/// Transferência ERC-20 observada no recibo
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenTransfer {
    pub token: Address,
    pub amount: U256,
}

/// Uma transação que tocou um par monitorado, normalizada para o matcher
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeRecord {
    pub block_number: u64,
    pub position: u64,
    pub trade_summary: TradePath,
    pub trade_summary_reverse: TradePath,
    pub pair_address: Address,
    pub from: Address,
    pub to: Option<Address>,
    pub tx_hash: TransactionHash,
    /// Valor da primeira transferência do token nativo embrulhado
    pub eth_equivalent_amount: Option<U256>,
    pub weth_position: Option<usize>,
    pub gas_price: U256,
    pub miner: Option<Address>,
    /// Preenchido apenas quando o minerador do bloco é um builder conhecido
    pub flashbot_miner: Option<Address>,
    pub input_amount: U256,
    pub output_amount: U256,
    pub transfers: Vec<TokenTransfer>,
    pub contract_address: Option<Address>,
}

impl TradeRecord {
    pub const CSV_HEADER: &'static str = "block,position,ethEquivAmount,gasPriceGwei,currentMinerAddr,flashbotMiner,pairAddress,tradeSummary,tradeSummaryReverse,numTransfers,inputAmount,outputAmount,wethPosition,hash,from,to,contractAddress";

    pub fn gas_price_gwei(&self) -> String {
        format_token_amount(&self.gas_price, 9)
    }

    pub fn eth_equivalent(&self) -> String {
        self.eth_equivalent_amount
            .map(|v| format_token_amount(&v, 18))
            .unwrap_or_else(|| "0".to_string())
    }

    pub fn csv_row(&self) -> String {
        let opt_addr = |a: &Option<Address>| a.as_ref().map(format_address).unwrap_or_default();
        [
            self.block_number.to_string(),
            self.position.to_string(),
            self.eth_equivalent(),
            self.gas_price_gwei(),
            opt_addr(&self.miner),
            opt_addr(&self.flashbot_miner),
            format_address(&self.pair_address),
            self.trade_summary.to_string(),
            self.trade_summary_reverse.to_string(),
            self.transfers.len().to_string(),
            self.input_amount.to_string(),
            self.output_amount.to_string(),
            self.weth_position.map(|p| p.to_string()).unwrap_or_default(),
            format_h256(&self.tx_hash),
            format_address(&self.from),
            opt_addr(&self.to),
            opt_addr(&self.contract_address),
        ]
        .join(",")
    }
}

/// Converte recibos em [`TradeRecord`]s
#[derive(Debug, Clone)]
pub struct TradeDecoder {
    pairs: Arc<PairRegistry>,
    builders: Arc<BuilderRegistry>,
    max_position_in_block: u64,
    wrapped_native_token: Address,
}

impl TradeDecoder {
    pub fn new(config: &DetectorConfig, pairs: Arc<PairRegistry>, builders: Arc<BuilderRegistry>) -> Self {
        Self {
            pairs,
            builders,
            max_position_in_block: config.max_position_in_block,
            wrapped_native_token: config.wrapped_native_token,
        }
    }

    /// Último par monitorado entre os endereços tocados pela transação
    pub fn tracked_pair(&self, tx: &ObservedTx) -> Option<Address> {
        tx.addresses.iter().rev().find(|a| self.pairs.contains(a)).copied()
    }

    /// Decodifica o recibo de `tx`.
    ///
    /// `Ok(None)` quando a transação não toca par monitorado, está além da
    /// posição máxima no bloco ou não emitiu nenhum `Swap`.
    pub fn decode(
        &self,
        tx: &ObservedTx,
        receipt: &ReceiptLogs,
        miner: Option<Address>,
    ) -> Result<Option<TradeRecord>> {
        let Some(pair_address) = self.tracked_pair(tx) else {
            return Ok(None);
        };
        let position = receipt.position();
        if position > self.max_position_in_block {
            return Ok(None);
        }

        let mut path = TradePathBuilder::new();
        let mut transfers = Vec::new();
        let mut input_amount = U256::zero();
        let mut output_amount = U256::zero();

        for mapped in map_logs(&receipt.logs)? {
            match mapped {
                MappedLog::Transfer { token, amount } => {
                    transfers.push(TokenTransfer { token, amount });
                }
                MappedLog::Swap { pair, amounts } => {
                    let Some(tokens) = self.pairs.symbols(&pair) else {
                        path.push(PathSegment::NoPair);
                        continue;
                    };
                    let input = if amounts.amount0_in.is_zero() { &tokens.token1 } else { &tokens.token0 };
                    let output = if amounts.amount0_out.is_zero() { &tokens.token1 } else { &tokens.token0 };
                    path.push(PathSegment::swap(input.as_str(), output.as_str()));
                    input_amount = amounts.input();
                    output_amount = amounts.output();
                }
            }
        }

        if path.is_empty() {
            return Ok(None);
        }
        let (trade_summary, trade_summary_reverse) = path.finish();

        let weth_position = transfers.iter().position(|t| t.token == self.wrapped_native_token);
        let eth_equivalent_amount = weth_position.map(|i| transfers[i].amount);

        Ok(Some(TradeRecord {
            block_number: tx.block_number,
            position,
            trade_summary,
            trade_summary_reverse,
            pair_address,
            from: tx.from,
            to: tx.to,
            tx_hash: tx.hash,
            eth_equivalent_amount,
            weth_position,
            gas_price: tx.gas_price,
            miner,
            flashbot_miner: self.builders.lookup(miner),
            input_amount,
            output_amount,
            transfers,
            contract_address: receipt.contract_address,
        }))
    }
}
