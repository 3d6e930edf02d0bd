use crate::config::DetectorConfig;
use crate::trade_decoder::TradeRecord;
use ethereum_types::Address;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Bloco que saiu da janela e está pronto para o matcher
#[derive(Debug, Clone)]
pub struct ReadyBlock {
    pub number: u64,
    /// Vazio para blocos sem atividade em pares monitorados
    pub trades: Vec<TradeRecord>,
}

/// Janela deslizante de blocos.
///
/// Os recibos chegam de forma assíncrona, então um bloco só é liberado depois
/// que mais de `window_size` números de bloco distintos estão pendentes. Isso
/// reduz a chance de perder trades atrasadas, mas não é garantia: registros
/// que chegam depois que o bloco foi liberado são descartados.
#[derive(Debug)]
pub struct BlockWindowBuffer {
    window_size: usize,
    miner_retention: usize,
    pending_blocks: BTreeSet<u64>,
    block_trades: HashMap<u64, Vec<TradeRecord>>,
    last_processed_block: Option<u64>,
    miner_by_block: BTreeMap<u64, Address>,
}

impl BlockWindowBuffer {
    pub fn new(window_size: usize, miner_retention: usize) -> Self {
        Self {
            window_size,
            miner_retention,
            pending_blocks: BTreeSet::new(),
            block_trades: HashMap::new(),
            last_processed_block: None,
            miner_by_block: BTreeMap::new(),
        }
    }

    pub fn from_config(config: &DetectorConfig) -> Self {
        Self::new(config.block_queue_size, config.miner_retention())
    }

    /// Já liberado (ou anterior ao último liberado)
    pub fn is_evicted(&self, block: u64) -> bool {
        self.last_processed_block.map_or(false, |last| block <= last)
    }

    /// Registra um número de bloco visto e libera, do mais antigo para o mais
    /// novo, os blocos que excedem a janela.
    pub fn observe(&mut self, block: u64) -> Vec<ReadyBlock> {
        if !self.is_evicted(block) {
            self.pending_blocks.insert(block);
        }

        let mut ready = Vec::new();
        while self.pending_blocks.len() > self.window_size {
            let Some(oldest) = self.pending_blocks.pop_first() else { break };
            self.last_processed_block = Some(self.last_processed_block.map_or(oldest, |l| l.max(oldest)));
            ready.push(ReadyBlock {
                number: oldest,
                trades: self.block_trades.remove(&oldest).unwrap_or_default(),
            });
        }
        ready
    }

    /// Adiciona o registro ao seu bloco. Retorna `false` (e descarta o
    /// registro) se o bloco já foi liberado ou se a transação já está no bloco.
    pub fn insert(&mut self, record: TradeRecord) -> bool {
        let block = record.block_number;
        if self.is_evicted(block) {
            return false;
        }
        let trades = self.block_trades.entry(block).or_default();
        if trades.iter().any(|t| t.tx_hash == record.tx_hash) {
            return false;
        }
        trades.push(record);
        self.pending_blocks.insert(block);
        true
    }

    /// Guarda o minerador do bloco, podando entradas além da retenção
    pub fn record_miner(&mut self, block: u64, miner: Address) {
        self.miner_by_block.insert(block, miner);
        while self.miner_by_block.len() > self.miner_retention {
            self.miner_by_block.pop_first();
        }
    }

    pub fn miner_of(&self, block: u64) -> Option<Address> {
        self.miner_by_block.get(&block).copied()
    }

    pub fn pending_blocks(&self) -> impl Iterator<Item = u64> + '_ {
        self.pending_blocks.iter().copied()
    }

    pub fn last_processed_block(&self) -> Option<u64> {
        self.last_processed_block
    }

    pub fn buffered_trades(&self, block: u64) -> Option<&[TradeRecord]> {
        self.block_trades.get(&block).map(Vec::as_slice)
    }

    pub fn tracked_miners(&self) -> usize {
        self.miner_by_block.len()
    }
}
