use ethernity_core::{error::{Error, Result}, utils::hex_to_address};
use ethereum_types::Address;
use std::str::FromStr;

/// Endereço do WETH na mainnet
pub const WETH_MAINNET: &str = "0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2";

/// Configuração do detector de sandwich/frontrunning
#[derive(Debug, Clone)]
pub struct DetectorConfig {
    /// Quantidade de blocos mantidos abertos antes do processamento
    pub block_queue_size: usize,
    /// Transações além desta posição no bloco são ignoradas
    pub max_position_in_block: u64,
    /// Margem extra (em blocos) para o mapa de mineradores
    pub miner_retention_margin: usize,
    /// Quantidade de pares da lista de referência monitorados
    pub num_trading_pairs: usize,
    /// Token nativo "embrulhado" usado para o valor equivalente em ETH
    pub wrapped_native_token: Address,
    /// Emite as trades de cada bloco processado em CSV via `tracing::debug!`
    pub dump_block_trades: bool,
    /// Capacidade da fila de eventos do serviço
    pub channel_capacity: usize,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            block_queue_size: 3,
            max_position_in_block: 15,
            miner_retention_margin: 20,
            num_trading_pairs: 5000,
            wrapped_native_token: hex_to_address(WETH_MAINNET).unwrap_or_default(),
            dump_block_trades: false,
            channel_capacity: 1024,
        }
    }
}

impl DetectorConfig {
    /// Horizonte de retenção do mapa bloco → minerador
    pub fn miner_retention(&self) -> usize {
        self.block_queue_size + self.miner_retention_margin
    }

    /// Lê a configuração das variáveis `ETHERNITY_SANDWICH_*`, mantendo os
    /// valores padrão para as ausentes.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Mesma lógica de [`Self::from_env`] com uma fonte arbitrária de valores
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();
        if let Some(v) = lookup("ETHERNITY_SANDWICH_BLOCK_QUEUE") {
            cfg.block_queue_size = parse_var("ETHERNITY_SANDWICH_BLOCK_QUEUE", &v)?;
        }
        if let Some(v) = lookup("ETHERNITY_SANDWICH_MAX_POSITION") {
            cfg.max_position_in_block = parse_var("ETHERNITY_SANDWICH_MAX_POSITION", &v)?;
        }
        if let Some(v) = lookup("ETHERNITY_SANDWICH_MINER_MARGIN") {
            cfg.miner_retention_margin = parse_var("ETHERNITY_SANDWICH_MINER_MARGIN", &v)?;
        }
        if let Some(v) = lookup("ETHERNITY_SANDWICH_NUM_PAIRS") {
            cfg.num_trading_pairs = parse_var("ETHERNITY_SANDWICH_NUM_PAIRS", &v)?;
        }
        if let Some(v) = lookup("ETHERNITY_SANDWICH_WRAPPED_NATIVE") {
            cfg.wrapped_native_token = hex_to_address(&v).ok_or_else(|| {
                Error::ValidationError(format!("ETHERNITY_SANDWICH_WRAPPED_NATIVE inválido: {v}"))
            })?;
        }
        if let Some(v) = lookup("ETHERNITY_SANDWICH_DUMP_TRADES") {
            cfg.dump_block_trades = parse_var("ETHERNITY_SANDWICH_DUMP_TRADES", &v)?;
        }
        if let Some(v) = lookup("ETHERNITY_SANDWICH_CHANNEL_CAPACITY") {
            cfg.channel_capacity = parse_var("ETHERNITY_SANDWICH_CHANNEL_CAPACITY", &v)?;
        }
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.block_queue_size == 0 {
            return Err(Error::ValidationError("block_queue_size deve ser maior que zero".into()));
        }
        if self.channel_capacity == 0 {
            return Err(Error::ValidationError("channel_capacity deve ser maior que zero".into()));
        }
        Ok(())
    }
}

fn parse_var<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::ValidationError(format!("{key} inválido: {value}")))
}
