/*!
 * Ethernity RPC
 *
 * Cliente RPC para interação com nodes Ethereum
 */

use ethernity_core::{Error, error::Result, types::TransactionHash};
use ethereum_types::Address;
use web3::{
    Web3,
    transports::{Http, WebSocket},
    types::{BlockNumber, BlockId, U64, H256 as Web3H256},
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use std::collections::HashMap;
use parking_lot::RwLock;
use async_trait::async_trait;
use tracing::debug;

/// Configuração do cliente RPC
#[derive(Debug, Clone)]
pub struct RpcConfig {
    pub endpoint: String,
    pub timeout: Duration,
    pub use_cache: bool,
    pub cache_ttl: Duration,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:8545".to_string(),
            timeout: Duration::from_secs(30),
            use_cache: true,
            cache_ttl: Duration::from_secs(60),
        }
    }
}

/// Enum para diferentes tipos de transporte
pub enum TransportType {
    Http(Web3<Http>),
    WebSocket(Web3<WebSocket>),
}

/// Cache de respostas com expiração por TTL
#[derive(Debug, Default)]
pub struct ResponseCache {
    entries: RwLock<HashMap<String, (Vec<u8>, Instant)>>,
}

impl ResponseCache {
    /// Retorna a entrada se ainda estiver dentro do TTL
    pub fn get(&self, key: &str, ttl: Duration) -> Option<Vec<u8>> {
        let entries = self.entries.read();
        entries
            .get(key)
            .filter(|(_, stored_at)| stored_at.elapsed() < ttl)
            .map(|(data, _)| data.clone())
    }

    pub fn insert(&self, key: String, data: Vec<u8>) {
        self.entries.write().insert(key, (data, Instant::now()));
    }

    /// Remove entradas expiradas, retornando quantas foram removidas
    pub fn prune(&self, ttl: Duration) -> usize {
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|_, (_, stored_at)| stored_at.elapsed() < ttl);
        before - entries.len()
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }

    /// Obtém estatísticas do cache
    pub fn stats(&self, ttl: Duration) -> CacheStats {
        let entries = self.entries.read();
        let expired = entries
            .values()
            .filter(|(_, stored_at)| stored_at.elapsed() >= ttl)
            .count();
        CacheStats {
            total_entries: entries.len(),
            expired_entries: expired,
        }
    }
}

/// Estatísticas do cache
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheStats {
    pub total_entries: usize,
    pub expired_entries: usize,
}

/// Cliente RPC para Ethereum
pub struct EthernityRpcClient {
    transport: TransportType,
    config: RpcConfig,
    cache: Arc<ResponseCache>,
}

impl EthernityRpcClient {
    /// Cria um novo cliente RPC HTTP
    pub async fn new_http(config: RpcConfig) -> Result<Self> {
        let transport = Http::new(&config.endpoint)
            .map_err(|e| Error::RpcError(format!("Falha ao conectar via HTTP: {}", e)))?;

        let web3 = Web3::new(transport);

        // Verifica a conexão
        web3.eth().block_number()
            .await
            .map_err(|e| Error::RpcError(format!("Falha ao conectar ao node Ethereum: {}", e)))?;

        Ok(Self {
            transport: TransportType::Http(web3),
            config,
            cache: Arc::new(ResponseCache::default()),
        })
    }

    /// Cria um novo cliente RPC WebSocket
    pub async fn new_websocket(config: RpcConfig) -> Result<Self> {
        let transport = WebSocket::new(&config.endpoint)
            .await
            .map_err(|e| Error::RpcError(format!("Falha ao conectar via WebSocket: {}", e)))?;

        let web3 = Web3::new(transport);

        web3.eth().block_number()
            .await
            .map_err(|e| Error::RpcError(format!("Falha ao conectar ao node Ethereum: {}", e)))?;

        Ok(Self {
            transport: TransportType::WebSocket(web3),
            config,
            cache: Arc::new(ResponseCache::default()),
        })
    }

    /// Cria um novo cliente baseado na URL
    pub async fn new(config: RpcConfig) -> Result<Self> {
        if config.endpoint.starts_with("ws") {
            Self::new_websocket(config).await
        } else {
            Self::new_http(config).await
        }
    }

    /// Aplica o timeout configurado a uma chamada RPC
    async fn with_timeout<T, F>(&self, what: &str, fut: F) -> Result<T>
    where
        F: std::future::Future<Output = web3::Result<T>>,
    {
        match tokio::time::timeout(self.config.timeout, fut).await {
            Ok(res) => res.map_err(|e| Error::RpcError(format!("Falha ao obter {}: {}", what, e))),
            Err(_) => Err(Error::TimeoutError(format!("{} excedeu {:?}", what, self.config.timeout))),
        }
    }

    /// Obtém o recibo de uma transação
    pub async fn get_transaction_receipt(&self, tx_hash: TransactionHash) -> Result<Vec<u8>> {
        let cache_key = format!("receipt_{:x}", tx_hash);

        if self.config.use_cache {
            if let Some(data) = self.cache.get(&cache_key, self.config.cache_ttl) {
                return Ok(data);
            }
        }

        // Converte para o formato do web3
        let web3_hash = Web3H256::from_slice(tx_hash.as_bytes());

        let receipt = match &self.transport {
            TransportType::Http(web3) => {
                self.with_timeout("recibo da transação", web3.eth().transaction_receipt(web3_hash)).await?
            },
            TransportType::WebSocket(web3) => {
                self.with_timeout("recibo da transação", web3.eth().transaction_receipt(web3_hash)).await?
            }
        };

        let receipt = receipt.ok_or_else(|| Error::NotFound("Recibo da transação não encontrado".to_string()))?;

        let receipt_bytes = serde_json::to_vec(&receipt)
            .map_err(|e| Error::DecodeError(format!("Falha ao serializar recibo: {}", e)))?;

        if self.config.use_cache {
            self.cache.insert(cache_key, receipt_bytes.clone());
        }
        debug!(tx_hash = ?tx_hash, bytes = receipt_bytes.len(), "recibo obtido");

        Ok(receipt_bytes)
    }

    /// Obtém o endereço do minerador (campo `miner`) de um bloco
    pub async fn get_block_author(&self, block_number: u64) -> Result<Address> {
        let cache_key = format!("author_{}", block_number);

        if self.config.use_cache {
            if let Some(data) = self.cache.get(&cache_key, self.config.cache_ttl) {
                return Ok(Address::from_slice(&data));
            }
        }

        let id = BlockId::Number(BlockNumber::Number(U64::from(block_number)));
        let block = match &self.transport {
            TransportType::Http(web3) => self.with_timeout("bloco", web3.eth().block(id)).await?,
            TransportType::WebSocket(web3) => self.with_timeout("bloco", web3.eth().block(id)).await?,
        };

        let block = block.ok_or_else(|| Error::NotFound("Bloco não encontrado".to_string()))?;
        let author = Address::from_slice(block.author.as_bytes());

        if self.config.use_cache {
            self.cache.insert(cache_key, author.as_bytes().to_vec());
        }

        Ok(author)
    }

    /// Remove entradas expiradas do cache
    pub fn prune_cache(&self) -> usize {
        self.cache.prune(self.config.cache_ttl)
    }

    /// Limpa o cache
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    /// Obtém estatísticas do cache
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats(self.config.cache_ttl)
    }
}

/// Implementação da trait RpcProvider do ethernity-core
#[async_trait]
impl ethernity_core::traits::RpcProvider for EthernityRpcClient {
    async fn get_transaction_receipt(&self, tx_hash: TransactionHash) -> Result<Vec<u8>> {
        self.get_transaction_receipt(tx_hash).await
    }

    async fn get_block_author(&self, block_number: u64) -> Result<Address> {
        self.get_block_author(block_number).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_respects_ttl() {
        let cache = ResponseCache::default();
        cache.insert("receipt_01".into(), vec![1, 2, 3]);

        assert_eq!(cache.get("receipt_01", Duration::from_secs(60)), Some(vec![1, 2, 3]));
        assert_eq!(cache.get("receipt_01", Duration::ZERO), None);
        assert_eq!(cache.get("receipt_02", Duration::from_secs(60)), None);
    }

    #[test]
    fn prune_removes_expired_entries() {
        let cache = ResponseCache::default();
        cache.insert("a".into(), vec![]);
        cache.insert("b".into(), vec![]);

        let stats = cache.stats(Duration::ZERO);
        assert_eq!(stats, CacheStats { total_entries: 2, expired_entries: 2 });

        assert_eq!(cache.prune(Duration::from_secs(60)), 0);
        assert_eq!(cache.prune(Duration::ZERO), 2);
        assert_eq!(cache.stats(Duration::ZERO).total_entries, 0);
    }

    #[test]
    fn default_config_points_to_local_node() {
        let config = RpcConfig::default();
        assert_eq!(config.endpoint, "http://localhost:8545");
        assert!(config.use_cache);
    }
}
