use crate::findings::Finding;
use ethernity_core::{types::TransactionHash, ReceiptLogs};
use ethereum_types::{Address, U256};
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, oneshot};

/// Transação entregue pelo host
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservedTx {
    pub block_number: u64,
    pub hash: TransactionHash,
    pub from: Address,
    pub to: Option<Address>,
    pub gas_price: U256,
    /// Contratos com os quais a transação interagiu
    pub addresses: Vec<Address>,
}

/// Bloco entregue pelo host
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ObservedBlock {
    pub number: u64,
    pub miner: Address,
}

/// Mensagens consumidas pelo worker do detector
#[derive(Debug)]
pub enum DetectorEvent {
    TransactionObserved(ObservedTx),
    ReceiptArrived {
        tx: ObservedTx,
        receipt: ReceiptLogs,
        /// Autor do bloco obtido via RPC quando o minerador ainda não era conhecido
        miner: Option<Address>,
    },
    BlockObserved {
        block: ObservedBlock,
        reply: oneshot::Sender<Vec<Finding>>,
    },
}

/// Simple event bus wrapper over [`tokio::sync::mpsc`] channels.
pub struct EventBus<T> {
    sender: mpsc::Sender<T>,
}

impl<T> EventBus<T> {
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<T>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { sender: tx }, rx)
    }

    pub fn sender(&self) -> mpsc::Sender<T> {
        self.sender.clone()
    }
}
