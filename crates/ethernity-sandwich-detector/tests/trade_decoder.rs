use ethernity_core::{Error, ReceiptLogs};
use ethernity_sandwich_detector::{
    BuilderRegistry, DetectorConfig, ObservedTx, PairRegistry, PathSegment, TradeDecoder, TradePath, SWAP_TOPIC,
    TRANSFER_TOPIC,
};
use ethers::abi::{encode, Token};
use ethers::types::{Bytes, Log, H256, U256, U64};
use ethereum_types::Address;
use std::sync::Arc;

fn weth() -> Address {
    DetectorConfig::default().wrapped_native_token
}

fn pair_a() -> Address {
    Address::repeat_byte(0xa1)
}

fn pair_b() -> Address {
    Address::repeat_byte(0xb2)
}

fn registry() -> PairRegistry {
    let mut pairs = PairRegistry::new();
    pairs.insert(pair_a(), "WETH", "USDC");
    pairs.insert(pair_b(), "USDC", "DAI");
    pairs
}

fn decoder(builders: BuilderRegistry) -> TradeDecoder {
    TradeDecoder::new(&DetectorConfig::default(), Arc::new(registry()), Arc::new(builders))
}

fn swap_log(pair: Address, a0_in: u64, a1_in: u64, a0_out: u64, a1_out: u64) -> Log {
    let data = encode(&[
        Token::Uint(a0_in.into()),
        Token::Uint(a1_in.into()),
        Token::Uint(a0_out.into()),
        Token::Uint(a1_out.into()),
    ]);
    Log {
        address: pair,
        topics: vec![*SWAP_TOPIC, H256::repeat_byte(0x01), H256::repeat_byte(0x02)],
        data: Bytes::from(data),
        ..Default::default()
    }
}

fn transfer_log(token: Address, amount: U256) -> Log {
    Log {
        address: token,
        topics: vec![*TRANSFER_TOPIC, H256::repeat_byte(0x03), H256::repeat_byte(0x04)],
        data: Bytes::from(encode(&[Token::Uint(amount)])),
        ..Default::default()
    }
}

fn observed(addresses: Vec<Address>) -> ObservedTx {
    ObservedTx {
        block_number: 100,
        hash: H256::repeat_byte(0x42),
        from: Address::repeat_byte(0x0f),
        to: Some(Address::repeat_byte(0xbb)),
        gas_price: U256::from(42_000_000_000u64),
        addresses,
    }
}

fn receipt(position: u64, logs: Vec<Log>) -> ReceiptLogs {
    ReceiptLogs {
        transaction_hash: H256::repeat_byte(0x42),
        transaction_index: U64::from(position),
        logs,
        contract_address: None,
    }
}

#[test]
fn two_hop_path_and_reverse() {
    let logs = vec![
        transfer_log(weth(), U256::exp10(18)),
        swap_log(pair_a(), 1_000, 0, 0, 2_000),
        swap_log(pair_b(), 2_000, 0, 0, 1_990),
    ];
    let record = decoder(BuilderRegistry::new())
        .decode(&observed(vec![pair_a()]), &receipt(2, logs), None)
        .unwrap()
        .expect("trade esperada");

    assert_eq!(record.trade_summary.to_string(), "WETH for USDC->USDC for DAI");
    assert_eq!(record.trade_summary_reverse.to_string(), "DAI for USDC->USDC for WETH");
    assert_eq!(record.trade_summary.inverse(), record.trade_summary_reverse);
    assert_eq!(record.position, 2);
    assert_eq!(record.pair_address, pair_a());
    assert_eq!(record.input_amount, U256::from(2_000u64));
    assert_eq!(record.output_amount, U256::from(1_990u64));
    assert_eq!(record.weth_position, Some(0));
    assert_eq!(record.eth_equivalent(), "1");
    assert_eq!(record.gas_price_gwei(), "42");
    assert_eq!(record.transfers.len(), 1);
}

#[test]
fn untracked_swap_becomes_nopair() {
    let unknown = Address::repeat_byte(0xee);
    let logs = vec![swap_log(unknown, 5, 0, 0, 7), swap_log(pair_a(), 0, 7, 9, 0)];
    let record = decoder(BuilderRegistry::new())
        .decode(&observed(vec![pair_a()]), &receipt(1, logs), None)
        .unwrap()
        .unwrap();

    assert_eq!(record.trade_summary.segments()[0], PathSegment::NoPair);
    assert_eq!(record.trade_summary.to_string(), "NOPAIR->USDC for WETH");
    assert_eq!(record.trade_summary_reverse.to_string(), "WETH for USDC->NOPAIR");
    assert!(record.eth_equivalent_amount.is_none());
    assert_eq!(record.eth_equivalent(), "0");
}

#[test]
fn nopair_never_equals_token_named_nopair() {
    let structural = TradePath::new(vec![PathSegment::NoPair]);
    let lookalike = TradePath::new(vec![PathSegment::swap("NOPAIR", "X")]);
    assert_ne!(structural, lookalike);
}

#[test]
fn skips_position_beyond_limit() {
    let logs = vec![swap_log(pair_a(), 1, 0, 0, 1)];
    let decoded = decoder(BuilderRegistry::new())
        .decode(&observed(vec![pair_a()]), &receipt(16, logs.clone()), None)
        .unwrap();
    assert!(decoded.is_none());

    let at_limit = decoder(BuilderRegistry::new())
        .decode(&observed(vec![pair_a()]), &receipt(15, logs), None)
        .unwrap();
    assert!(at_limit.is_some());
}

#[test]
fn no_swap_yields_no_record() {
    let logs = vec![transfer_log(weth(), U256::from(10u64))];
    let decoded = decoder(BuilderRegistry::new())
        .decode(&observed(vec![pair_a()]), &receipt(0, logs), None)
        .unwrap();
    assert!(decoded.is_none());
}

#[test]
fn untracked_transaction_is_ignored() {
    let logs = vec![swap_log(pair_a(), 1, 0, 0, 1)];
    let decoded = decoder(BuilderRegistry::new())
        .decode(&observed(vec![Address::repeat_byte(0x99)]), &receipt(0, logs), None)
        .unwrap();
    assert!(decoded.is_none());
}

#[test]
fn last_tracked_address_is_pair() {
    let tx = observed(vec![pair_a(), Address::repeat_byte(0x99), pair_b()]);
    assert_eq!(decoder(BuilderRegistry::new()).tracked_pair(&tx), Some(pair_b()));
}

#[test]
fn truncated_swap_data_fails_transaction() {
    let mut log = swap_log(pair_a(), 1, 0, 0, 1);
    log.data = Bytes::from(vec![0u8; 40]);
    let err = decoder(BuilderRegistry::new())
        .decode(&observed(vec![pair_a()]), &receipt(0, vec![log]), None)
        .unwrap_err();
    assert!(matches!(err, Error::DecodeError(_)));
}

#[test]
fn flashbot_miner_only_for_known_builders() {
    let builder = Address::repeat_byte(0xf1);
    let mut builders = BuilderRegistry::new();
    builders.insert(builder);
    let dec = decoder(builders);
    let logs = vec![swap_log(pair_a(), 1, 0, 0, 1)];

    let known = dec.decode(&observed(vec![pair_a()]), &receipt(0, logs.clone()), Some(builder)).unwrap().unwrap();
    assert_eq!(known.miner, Some(builder));
    assert_eq!(known.flashbot_miner, Some(builder));

    let other = Address::repeat_byte(0xf2);
    let unknown = dec.decode(&observed(vec![pair_a()]), &receipt(0, logs), Some(other)).unwrap().unwrap();
    assert_eq!(unknown.miner, Some(other));
    assert!(unknown.flashbot_miner.is_none());
}

#[test]
fn csv_row_matches_header_columns() {
    let logs = vec![swap_log(pair_a(), 1, 0, 0, 1)];
    let record = decoder(BuilderRegistry::new())
        .decode(&observed(vec![pair_a()]), &receipt(0, logs), None)
        .unwrap()
        .unwrap();
    let header_cols = ethernity_sandwich_detector::TradeRecord::CSV_HEADER.split(',').count();
    assert_eq!(record.csv_row().split(',').count(), header_cols);
}
