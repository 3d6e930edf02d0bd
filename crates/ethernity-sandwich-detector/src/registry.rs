//! Dados de referência estáticos: pares monitorados e builders conhecidos.

use ethernity_core::{error::{Error, Result}, utils::hex_to_address};
use ethereum_types::Address;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::path::Path;

/// Símbolos dos dois tokens de um par
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairTokens {
    pub token0: String,
    pub token1: String,
}

#[derive(Deserialize)]
struct PairListFile {
    #[serde(alias = "Pairs")]
    pairs: Vec<PairEntry>,
}

#[derive(Deserialize)]
struct PairEntry {
    id: String,
    token0: TokenEntry,
    token1: TokenEntry,
}

#[derive(Deserialize)]
struct TokenEntry {
    symbol: String,
}

/// Tabela par → símbolos dos tokens, limitada aos N primeiros pares da lista
#[derive(Debug, Clone, Default)]
pub struct PairRegistry {
    pairs: HashMap<Address, PairTokens>,
}

impl PairRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Carrega a lista no formato do subgraph Uniswap V2, mantendo os
    /// primeiros `limit` pares.
    pub fn from_json(json: &str, limit: usize) -> Result<Self> {
        let file: PairListFile = serde_json::from_str(json)?;
        let mut registry = Self::new();
        for entry in file.pairs.into_iter().take(limit) {
            let address = hex_to_address(&entry.id)
                .ok_or_else(|| Error::DecodeError(format!("endereço de par inválido: {}", entry.id)))?;
            registry.pairs.entry(address).or_insert(PairTokens {
                token0: entry.token0.symbol,
                token1: entry.token1.symbol,
            });
        }
        Ok(registry)
    }

    pub fn from_file(path: impl AsRef<Path>, limit: usize) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| Error::NotFound(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&json, limit)
    }

    pub fn insert(&mut self, pair: Address, token0: impl Into<String>, token1: impl Into<String>) {
        self.pairs.insert(
            pair,
            PairTokens { token0: token0.into(), token1: token1.into() },
        );
    }

    pub fn contains(&self, pair: &Address) -> bool {
        self.pairs.contains_key(pair)
    }

    pub fn symbols(&self, pair: &Address) -> Option<&PairTokens> {
        self.pairs.get(pair)
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum BuilderListFile {
    Wrapped {
        #[serde(alias = "Addresses")]
        addresses: Vec<String>,
    },
    Bare(Vec<String>),
}

/// Conjunto de mineradores/builders conhecidos (flashbots).
///
/// Os endereços são comparados como bytes, o que equivale à comparação em
/// minúsculas das strings hex.
#[derive(Debug, Clone, Default)]
pub struct BuilderRegistry {
    addresses: HashSet<Address>,
}

impl BuilderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let raw = match serde_json::from_str::<BuilderListFile>(json)? {
            BuilderListFile::Wrapped { addresses } => addresses,
            BuilderListFile::Bare(addresses) => addresses,
        };
        let mut registry = Self::new();
        for item in raw {
            let address = hex_to_address(&item)
                .ok_or_else(|| Error::DecodeError(format!("endereço de builder inválido: {item}")))?;
            registry.addresses.insert(address);
        }
        Ok(registry)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| Error::NotFound(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&json)
    }

    pub fn insert(&mut self, address: Address) {
        self.addresses.insert(address);
    }

    /// Retorna o builder se o minerador informado for conhecido
    pub fn lookup(&self, miner: Option<Address>) -> Option<Address> {
        miner.filter(|m| self.addresses.contains(m))
    }

    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAIRS: &str = r#"{
        "Pairs": [
            {"id": "0xB4e16d0168e52d35CaCD2c6185b44281Ec28C9Dc",
             "token0": {"symbol": "USDC"}, "token1": {"symbol": "WETH"}},
            {"id": "0x0d4a11d5eeaac28ec3f61d100daf4d40471f1852",
             "token0": {"symbol": "WETH"}, "token1": {"symbol": "USDT"}},
            {"id": "0xa478c2975ab1ea89e8196811f51a7b7ade33eb11",
             "token0": {"symbol": "DAI"}, "token1": {"symbol": "WETH"}}
        ]
    }"#;

    #[test]
    fn pairs_truncated_to_limit() {
        let registry = PairRegistry::from_json(PAIRS, 2).unwrap();
        assert_eq!(registry.len(), 2);

        let usdc_weth = hex_to_address("0xb4e16d0168e52d35cacd2c6185b44281ec28c9dc").unwrap();
        let tokens = registry.symbols(&usdc_weth).unwrap();
        assert_eq!(tokens.token0, "USDC");
        assert_eq!(tokens.token1, "WETH");

        let dai_weth = hex_to_address("0xa478c2975ab1ea89e8196811f51a7b7ade33eb11").unwrap();
        assert!(!registry.contains(&dai_weth));
    }

    #[test]
    fn invalid_pair_address_is_rejected() {
        let json = r#"{"pairs":[{"id":"nope","token0":{"symbol":"A"},"token1":{"symbol":"B"}}]}"#;
        assert!(matches!(PairRegistry::from_json(json, 10), Err(Error::DecodeError(_))));
    }

    #[test]
    fn builders_accept_both_layouts() {
        let wrapped = BuilderRegistry::from_json(
            r#"{"Addresses": ["0x5A0b54D5dc17e0AadC383d2db43B0a0D3E029c4c"]}"#,
        )
        .unwrap();
        let bare = BuilderRegistry::from_json(r#"["0x5a0b54d5dc17e0aadc383d2db43b0a0d3e029c4c"]"#).unwrap();

        let miner = hex_to_address("0x5a0b54d5dc17e0aadc383d2db43b0a0d3e029c4c");
        assert_eq!(wrapped.lookup(miner), miner);
        assert_eq!(bare.lookup(miner), miner);
        assert_eq!(bare.lookup(Some(Address::repeat_byte(0x01))), None);
        assert_eq!(bare.lookup(None), None);
    }
}
