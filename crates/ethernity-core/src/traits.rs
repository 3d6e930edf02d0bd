/*!
 * Ethernity Traits
 *
 * Traits comuns usados em toda a workspace Ethernity
 */

use async_trait::async_trait;
use crate::error::Result;
use crate::types::TransactionHash;
use ethereum_types::Address;

/// Trait para provedores RPC
#[async_trait]
pub trait RpcProvider: Send + Sync {
    /// Obtém o recibo de uma transação serializado em JSON
    async fn get_transaction_receipt(&self, tx_hash: TransactionHash) -> Result<Vec<u8>>;

    /// Obtém o endereço do minerador/builder de um bloco
    async fn get_block_author(&self, block_number: u64) -> Result<Address>;
}
