/*!
 * Ethernity Utils
 *
 * Utilitários comuns usados em toda a workspace Ethernity
 */

use ethereum_types::{Address, H256, U256};
use std::str::FromStr;
use tiny_keccak::{Hasher, Keccak};

/// Converte uma string hexadecimal para Address
pub fn hex_to_address(hex: &str) -> Option<Address> {
    let trimmed = hex.trim();
    let hex_str = trimmed.strip_prefix("0x").unwrap_or(trimmed);
    Address::from_str(hex_str).ok()
}

/// Formata um Address para exibição (minúsculo, com prefixo 0x)
pub fn format_address(address: &Address) -> String {
    format!("0x{:x}", address)
}

/// Formata um H256 para exibição
pub fn format_h256(hash: &H256) -> String {
    format!("0x{:x}", hash)
}

/// Calcula o hash Keccak-256 de dados
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak::v256();
    let mut result = [0u8; 32];
    hasher.update(data);
    hasher.finalize(&mut result);
    result
}

/// Calcula o topic0 de um evento a partir da assinatura canônica
pub fn event_topic(signature: &str) -> H256 {
    H256::from(keccak256(signature.as_bytes()))
}

/// Formata um valor com decimais para exibição
pub fn format_token_amount(amount: &U256, decimals: u8) -> String {
    if decimals == 0 {
        return amount.to_string();
    }

    let divisor = U256::from(10).pow(U256::from(decimals));
    let integer_part = amount / divisor;
    let fractional_part = amount % divisor;

    // Parte fracionária com zeros à esquerda
    let fractional_str = fractional_part.to_string();
    let padding = decimals as usize - fractional_str.len();
    let mut padded_fractional = String::with_capacity(decimals as usize);
    for _ in 0..padding {
        padded_fractional.push('0');
    }
    padded_fractional.push_str(&fractional_str);

    while padded_fractional.ends_with('0') {
        padded_fractional.pop();
    }

    if padded_fractional.is_empty() {
        integer_part.to_string()
    } else {
        format!("{}.{}", integer_part, padded_fractional)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transfer_topic_matches_known_hash() {
        let topic = event_topic("Transfer(address,address,uint256)");
        assert_eq!(
            format_h256(&topic),
            "0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef"
        );
    }

    #[test]
    fn swap_topic_matches_known_hash() {
        let topic = event_topic("Swap(address,uint256,uint256,uint256,uint256,address)");
        assert_eq!(
            format_h256(&topic),
            "0xd78ad95fa46c994b6551d0da85fc275fe613ce37657fb8d5e3d130840159d822"
        );
    }

    #[test]
    fn hex_to_address_accepts_mixed_case() {
        let a = hex_to_address("0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2").unwrap();
        let b = hex_to_address("c02aaa39b223fe8d0a0e5c4f27ead9083c756cc2").unwrap();
        assert_eq!(a, b);
        assert_eq!(format_address(&a), "0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2");
        assert!(hex_to_address("0xzz").is_none());
    }

    #[test]
    fn token_amount_formatting() {
        let one_and_half_eth = U256::from(1_500_000_000_000_000_000u128);
        assert_eq!(format_token_amount(&one_and_half_eth, 18), "1.5");
        assert_eq!(format_token_amount(&U256::from(42_000_000_000u64), 9), "42");
        assert_eq!(format_token_amount(&U256::from(7u64), 0), "7");
        assert_eq!(format_token_amount(&U256::from(1u64), 9), "0.000000001");
    }
}
