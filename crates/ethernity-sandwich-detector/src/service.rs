//! Worker assíncrono dono do [`SandwichDetector`].
//!
//! Notificações de transação e de bloco entram por uma fila `mpsc`. A busca de
//! recibos roda em tarefas separadas que devolvem o resultado à mesma fila,
//! então o estado só é tocado pelo worker.
//!
//! Quando a transação chega antes do seu bloco, o minerador é obtido com
//! [`RpcProvider::get_block_author`] junto com o recibo.

use crate::detector::SandwichDetector;
use crate::events::{DetectorEvent, EventBus, ObservedBlock, ObservedTx};
use crate::findings::Finding;
use ethernity_core::{
    error::{Error, Result},
    traits::RpcProvider,
    types::TransactionHash,
    ReceiptLogs,
};
use ethereum_types::Address;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Mensagens internas além dos eventos do host
enum WorkerMessage {
    Event(DetectorEvent),
    ReceiptFailed(TransactionHash),
    Drain(oneshot::Sender<()>),
}

impl From<DetectorEvent> for WorkerMessage {
    fn from(event: DetectorEvent) -> Self {
        WorkerMessage::Event(event)
    }
}

/// Ponto de entrada do host. Clonável; o worker encerra quando todos os
/// handles são descartados.
#[derive(Clone)]
pub struct DetectorHandle {
    sender: mpsc::Sender<WorkerMessage>,
}

impl DetectorHandle {
    /// Enfileira a transação. Nunca devolve alertas diretamente: eles saem no
    /// próximo [`Self::on_block`].
    pub async fn on_transaction(&self, tx: ObservedTx) -> Result<Vec<Finding>> {
        self.send(DetectorEvent::TransactionObserved(tx).into()).await?;
        Ok(Vec::new())
    }

    /// Limite de bloco: devolve os alertas acumulados até aqui
    pub async fn on_block(&self, block: ObservedBlock) -> Result<Vec<Finding>> {
        let (reply, rx) = oneshot::channel();
        self.send(DetectorEvent::BlockObserved { block, reply }.into()).await?;
        rx.await
            .map_err(|_| Error::ChannelClosed("worker encerrado antes de responder".into()))
    }

    /// Aguarda até que todas as buscas de recibo iniciadas antes desta chamada
    /// tenham sido incorporadas (ou descartadas).
    pub async fn drain(&self) -> Result<()> {
        let (reply, rx) = oneshot::channel();
        self.send(WorkerMessage::Drain(reply)).await?;
        rx.await
            .map_err(|_| Error::ChannelClosed("worker encerrado antes de responder".into()))
    }

    async fn send(&self, msg: WorkerMessage) -> Result<()> {
        self.sender
            .send(msg)
            .await
            .map_err(|_| Error::ChannelClosed("fila do detector".into()))
    }
}

/// Serviço que conecta o detector a um [`RpcProvider`]
pub struct DetectorService<P> {
    provider: Arc<P>,
    detector: SandwichDetector,
    receiver: mpsc::Receiver<WorkerMessage>,
    loopback: mpsc::WeakSender<WorkerMessage>,
    in_flight: usize,
    drain_waiters: Vec<oneshot::Sender<()>>,
}

impl<P> DetectorService<P>
where
    P: RpcProvider + 'static,
{
    /// Inicia o worker. O `JoinHandle` devolve o detector quando o worker
    /// termina.
    pub fn spawn(provider: Arc<P>, detector: SandwichDetector) -> (DetectorHandle, JoinHandle<SandwichDetector>) {
        let (bus, receiver) = EventBus::new(detector.config().channel_capacity);
        let sender = bus.sender();
        let service = Self {
            provider,
            detector,
            receiver,
            loopback: sender.downgrade(),
            in_flight: 0,
            drain_waiters: Vec::new(),
        };
        let join = tokio::spawn(service.run());
        (DetectorHandle { sender }, join)
    }

    async fn run(mut self) -> SandwichDetector {
        while let Some(msg) = self.receiver.recv().await {
            match msg {
                WorkerMessage::Event(DetectorEvent::TransactionObserved(tx)) => {
                    if self.detector.observe_transaction(&tx) {
                        self.fetch_receipt(tx);
                    }
                }
                WorkerMessage::Event(DetectorEvent::ReceiptArrived { tx, receipt, miner }) => {
                    if let Some(miner) = miner {
                        self.detector.learn_miner(tx.block_number, miner);
                    }
                    self.detector.ingest_receipt(&tx, &receipt);
                    self.receipt_settled();
                }
                WorkerMessage::Event(DetectorEvent::BlockObserved { block, reply }) => {
                    let findings = self.detector.observe_block(&block);
                    if reply.send(findings).is_err() {
                        debug!(block = block.number, "host descartou a resposta do bloco");
                    }
                }
                WorkerMessage::ReceiptFailed(_) => self.receipt_settled(),
                WorkerMessage::Drain(reply) => {
                    if self.in_flight == 0 {
                        let _ = reply.send(());
                    } else {
                        self.drain_waiters.push(reply);
                    }
                }
            }
        }
        self.detector
    }

    fn fetch_receipt(&mut self, tx: ObservedTx) {
        let Some(loopback) = self.loopback.upgrade() else { return };
        let provider = Arc::clone(&self.provider);
        let needs_miner = self.detector.window().miner_of(tx.block_number).is_none();
        self.in_flight += 1;

        tokio::spawn(async move {
            let fetched = provider
                .get_transaction_receipt(tx.hash)
                .await
                .and_then(|bytes| ReceiptLogs::from_json(&bytes));
            let msg: WorkerMessage = match fetched {
                Ok(receipt) => {
                    let miner = if needs_miner {
                        resolve_author(provider.as_ref(), tx.block_number).await
                    } else {
                        None
                    };
                    DetectorEvent::ReceiptArrived { tx, receipt, miner }.into()
                }
                Err(err) => {
                    warn!(tx_hash = ?tx.hash, block = tx.block_number, error = %err, "falha ao obter recibo");
                    WorkerMessage::ReceiptFailed(tx.hash)
                }
            };
            let _ = loopback.send(msg).await;
        });
    }

    fn receipt_settled(&mut self) {
        self.in_flight = self.in_flight.saturating_sub(1);
        if self.in_flight == 0 {
            for waiter in self.drain_waiters.drain(..) {
                let _ = waiter.send(());
            }
        }
    }
}

/// Autor do bloco via RPC; falhas apenas deixam o minerador desconhecido
async fn resolve_author<P: RpcProvider + ?Sized>(provider: &P, block: u64) -> Option<Address> {
    match provider.get_block_author(block).await {
        Ok(author) => Some(author),
        Err(err) => {
            debug!(block, error = %err, "autor do bloco indisponível");
            None
        }
    }
}
