/*!
 * Ethernity Types
 *
 * Tipos comuns usados em toda a workspace Ethernity
 */

use crate::error::Result;
use ethereum_types::{Address, H256, U64};
use ethers::types::Log;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Alias para hash de transação
pub type TransactionHash = H256;

/// Tipo de ataque reconhecido pelos detectores
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttackType {
    FrontRunning,
    SandwichAttack,
}

impl fmt::Display for AttackType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttackType::FrontRunning => write!(f, "Frontrunning"),
            AttackType::SandwichAttack => write!(f, "Sandwich"),
        }
    }
}

/// Severidade
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    Info,
    Low,
    Medium,
    High,
    Critical,
}

/// Categoria de um alerta emitido para o host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FindingType {
    Info,
    Suspicious,
    Exploit,
    Degraded,
}

/// Subconjunto do recibo de transação usado pelos detectores.
///
/// Campos desconhecidos do JSON do node são ignorados.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptLogs {
    pub transaction_hash: TransactionHash,
    pub transaction_index: U64,
    pub logs: Vec<Log>,
    #[serde(default)]
    pub contract_address: Option<Address>,
}

impl ReceiptLogs {
    /// Decodifica o recibo a partir do JSON retornado por [`crate::traits::RpcProvider`]
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Posição da transação dentro do bloco
    pub fn position(&self) -> u64 {
        self.transaction_index.as_u64()
    }
}
