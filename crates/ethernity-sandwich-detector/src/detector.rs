use crate::attack_matcher::AttackMatcher;
use crate::block_window::{BlockWindowBuffer, ReadyBlock};
use crate::config::DetectorConfig;
use crate::events::{ObservedBlock, ObservedTx};
use crate::findings::{Finding, FindingSink};
use crate::registry::{BuilderRegistry, PairRegistry};
use crate::trade_decoder::{TradeDecoder, TradeRecord};
use ethernity_core::ReceiptLogs;
use ethereum_types::Address;
use std::sync::Arc;
use tracing::{debug, info};

/// Estado completo do detector. Deve ter um único dono (o worker de
/// [`crate::service::DetectorService`] ou um teste); nenhum campo usa lock.
#[derive(Debug)]
pub struct SandwichDetector {
    config: DetectorConfig,
    decoder: TradeDecoder,
    window: BlockWindowBuffer,
    matcher: AttackMatcher,
    sink: FindingSink,
}

impl SandwichDetector {
    pub fn new(config: DetectorConfig, pairs: Arc<PairRegistry>, builders: Arc<BuilderRegistry>) -> Self {
        Self {
            decoder: TradeDecoder::new(&config, pairs, builders),
            window: BlockWindowBuffer::from_config(&config),
            matcher: AttackMatcher::new(),
            sink: FindingSink::new(),
            config,
        }
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    pub fn window(&self) -> &BlockWindowBuffer {
        &self.window
    }

    pub fn pending_findings(&self) -> usize {
        self.sink.len()
    }

    /// Avança a janela com o bloco da transação. Retorna `true` quando a
    /// transação toca um par monitorado e o recibo precisa ser buscado.
    pub fn observe_transaction(&mut self, tx: &ObservedTx) -> bool {
        self.advance(tx.block_number);
        self.decoder.tracked_pair(tx).is_some()
    }

    /// Registra o minerador de um bloco ainda sem minerador conhecido.
    /// O valor entregue por [`Self::observe_block`] tem precedência.
    pub fn learn_miner(&mut self, block: u64, miner: Address) {
        if self.window.miner_of(block).is_none() {
            self.window.record_miner(block, miner);
        }
    }

    /// Decodifica o recibo e guarda a trade no bloco correspondente.
    ///
    /// Falhas de decodificação e blocos já processados apenas descartam a
    /// transação.
    pub fn ingest_receipt(&mut self, tx: &ObservedTx, receipt: &ReceiptLogs) -> bool {
        let miner = self.window.miner_of(tx.block_number);
        match self.decoder.decode(tx, receipt, miner) {
            Ok(Some(record)) => {
                let block = record.block_number;
                let position = record.position;
                let accepted = self.window.insert(record);
                if accepted {
                    debug!(block, position, tx_hash = ?tx.hash, "trade registrada");
                } else {
                    debug!(block, tx_hash = ?tx.hash, "trade descartada: bloco já processado ou duplicada");
                }
                accepted
            }
            Ok(None) => {
                debug!(block = tx.block_number, tx_hash = ?tx.hash, "recibo sem trade elegível");
                false
            }
            Err(err) => {
                debug!(block = tx.block_number, tx_hash = ?tx.hash, error = %err, "falha ao decodificar recibo");
                false
            }
        }
    }

    /// Limite de bloco: registra o minerador, avança a janela e devolve
    /// todos os alertas acumulados.
    pub fn observe_block(&mut self, block: &ObservedBlock) -> Vec<Finding> {
        self.window.record_miner(block.number, block.miner);
        self.advance(block.number);
        let findings = self.sink.flush();
        if !findings.is_empty() {
            info!(block = block.number, findings = findings.len(), "alertas entregues");
        }
        findings
    }

    fn advance(&mut self, block: u64) {
        for ready in self.window.observe(block) {
            self.process_block(ready);
        }
    }

    fn process_block(&mut self, ready: ReadyBlock) {
        if ready.trades.is_empty() {
            return;
        }
        if self.config.dump_block_trades {
            dump_trades(ready.number, &ready.trades);
        }

        let findings = self.matcher.match_block(&ready.trades);
        for finding in &findings {
            info!(
                block = ready.number,
                tx_hash = %finding.metadata.hash,
                position = finding.metadata.position,
                attack = %finding.attack_type,
                trade = %finding.metadata.trade_summary,
                "ataque detectado"
            );
        }
        debug!(block = ready.number, trades = ready.trades.len(), findings = findings.len(), "bloco processado");
        self.sink.extend(findings);
    }
}

fn dump_trades(block: u64, trades: &[TradeRecord]) {
    let mut csv = String::from(TradeRecord::CSV_HEADER);
    for trade in trades {
        csv.push('\n');
        csv.push_str(&trade.csv_row());
    }
    debug!(block, "trades do bloco\n{}", csv);
}
