use ethernity_core::{error::{Error, Result}, utils::event_topic};
use ethers::abi::{self, ParamType, Token};
use ethers::types::Log;
use ethereum_types::{Address, H256, U256};
use once_cell::sync::Lazy;

pub const TRANSFER_SIGNATURE: &str = "Transfer(address,address,uint256)";
pub const SWAP_SIGNATURE: &str = "Swap(address,uint256,uint256,uint256,uint256,address)";

/// topic0 do evento ERC-20 `Transfer`
pub static TRANSFER_TOPIC: Lazy<H256> = Lazy::new(|| event_topic(TRANSFER_SIGNATURE));
/// topic0 do evento Uniswap V2 `Swap`
pub static SWAP_TOPIC: Lazy<H256> = Lazy::new(|| event_topic(SWAP_SIGNATURE));

/// Valores não indexados de um `Swap` V2
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapAmounts {
    pub amount0_in: U256,
    pub amount1_in: U256,
    pub amount0_out: U256,
    pub amount1_out: U256,
}

impl SwapAmounts {
    pub fn input(&self) -> U256 {
        self.amount0_in.max(self.amount1_in)
    }

    pub fn output(&self) -> U256 {
        self.amount0_out.max(self.amount1_out)
    }
}

/// Log de um recibo interpretado segundo os eventos conhecidos
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MappedLog {
    Transfer { token: Address, amount: U256 },
    Swap { pair: Address, amounts: SwapAmounts },
}

fn uint_at(tokens: &[Token], idx: usize) -> Result<U256> {
    tokens
        .get(idx)
        .cloned()
        .and_then(Token::into_uint)
        .ok_or_else(|| Error::DecodeError(format!("uint256 ausente na posição {idx}")))
}

pub fn decode_transfer_amount(data: &[u8]) -> Result<U256> {
    let tokens = abi::decode(&[ParamType::Uint(256)], data)?;
    uint_at(&tokens, 0)
}

pub fn decode_swap_amounts(data: &[u8]) -> Result<SwapAmounts> {
    let types = [
        ParamType::Uint(256),
        ParamType::Uint(256),
        ParamType::Uint(256),
        ParamType::Uint(256),
    ];
    let tokens = abi::decode(&types, data)?;
    Ok(SwapAmounts {
        amount0_in: uint_at(&tokens, 0)?,
        amount1_in: uint_at(&tokens, 1)?,
        amount0_out: uint_at(&tokens, 2)?,
        amount1_out: uint_at(&tokens, 3)?,
    })
}

/// Interpreta os logs na ordem de emissão, ignorando eventos desconhecidos.
///
/// Um `Transfer` ou `Swap` com payload inválido invalida o conjunto inteiro.
pub fn map_logs(logs: &[Log]) -> Result<Vec<MappedLog>> {
    let mut mapped = Vec::new();
    for log in logs {
        let Some(topic0) = log.topics.first() else { continue };
        if *topic0 == *TRANSFER_TOPIC {
            mapped.push(MappedLog::Transfer {
                token: log.address,
                amount: decode_transfer_amount(&log.data)?,
            });
        } else if *topic0 == *SWAP_TOPIC {
            mapped.push(MappedLog::Swap {
                pair: log.address,
                amounts: decode_swap_amounts(&log.data)?,
            });
        }
    }
    Ok(mapped)
}
