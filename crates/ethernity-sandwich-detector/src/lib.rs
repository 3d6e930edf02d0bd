/*!
 * Ethernity Sandwich Detector
 *
 * Detecção passiva de frontrunning e ataques sandwich em pares Uniswap V2,
 * a partir de transações e recibos observados bloco a bloco.
 */

pub mod config;
pub mod registry;
pub mod log_semantics;
pub mod trade_path;
pub mod trade_decoder;
pub mod block_window;
pub mod attack_matcher;
pub mod findings;
pub mod events;
pub mod detector;
pub mod service;

pub use config::*;
pub use registry::*;
pub use log_semantics::*;
pub use trade_path::*;
pub use trade_decoder::*;
pub use block_window::*;
pub use attack_matcher::*;
pub use findings::*;
pub use events::*;
pub use detector::*;
pub use service::*;
