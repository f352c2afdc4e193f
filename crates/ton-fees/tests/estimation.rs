//! End-to-end estimation over orders produced by the order builder.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Notify, Semaphore};

use ton_cell::{CellBuilder, MsgAddress};
use ton_fees::{
    compute_gas_prices, estimate_fee, reconstruct_messages, AccountSnapshot, BackoffPolicy, BlockRef,
    ChainClient, ChainConfigSnapshot, EstimateInput, EstimationRequest, EstimationScheduler, FeeError,
    FeeResult, GasPrices, StoragePrices, StorageStat, StorageUsed,
};
use ton_order::{build_order, Asset, MessageOrder, Order, OrderInput, OrderMessage};
use ton_wallet::{resolve_contract, WalletCodes, WalletContract, WalletVersion};

const TARGET: &str = "EQCt2mgAsbnGFKRhlLjiJvScCYbe4lqEHRMvIs-IR7T-1J6p";
const NOW: u32 = 1_700_000_000;

fn codes() -> WalletCodes {
    let mut v4 = CellBuilder::new();
    v4.store_u64(0x0404_0404).unwrap();
    let mut v5 = CellBuilder::new();
    v5.store_u64(0x0505_0505).unwrap();
    WalletCodes::new(Arc::new(v4.build().unwrap()), Arc::new(v5.build().unwrap()))
}

fn contract(version: WalletVersion) -> WalletContract {
    resolve_contract(&[0x2a; 32], version, false, &codes(), None).unwrap()
}

/// All prices zero except one nanocoin per gas unit.
fn gas_only_config() -> ChainConfigSnapshot {
    let mut config = ChainConfigSnapshot::default();
    config.workchain.gas = GasPrices {
        flat_limit: 0,
        flat_price: 0,
        price: 65_536,
        ..Default::default()
    };
    config
}

fn mainnet_like_config() -> ChainConfigSnapshot {
    let mut config = ChainConfigSnapshot::default();
    config.storage = vec![StoragePrices {
        utime_since: 0,
        bit_price_ps: 1,
        cell_price_ps: 500,
        mc_bit_price_ps: 1000,
        mc_cell_price_ps: 500_000,
    }];
    config.workchain.gas = GasPrices {
        flat_limit: 100,
        flat_price: 40_000,
        price: 26_214_400,
        ..Default::default()
    };
    config.workchain.message.lump_price = 400_000;
    config.workchain.message.bit_price = 26_214_400;
    config.workchain.message.cell_price = 2_621_440_000;
    config.workchain.message.first_frac = 21_845;
    config
}

fn simple_order() -> Order {
    build_order(&OrderInput {
        target: TARGET.into(),
        amount: "10.5".into(),
        ..Default::default()
    })
    .unwrap()
}

#[test]
fn simple_order_with_zero_prices_costs_only_gas() {
    let order = simple_order();
    let Order::Simple(inner) = &order else {
        panic!("expected simple order");
    };
    assert_eq!(inner.messages[0].amount, 10_500_000_000);
    assert!(!inner.messages[0].amount_all);
    assert_eq!(inner.messages[0].target, TARGET);

    let config = gas_only_config();
    for version in [WalletVersion::V4R2, WalletVersion::V5R1] {
        let contract = contract(version);
        let planned = reconstruct_messages(Some(&order), contract.address(), "", None).unwrap();
        let estimate = estimate_fee(&EstimateInput {
            contract: &contract,
            transfer: &planned,
            seqno: 0,
            config: &config,
            storage: &[None, None],
            now: NOW,
        })
        .unwrap();
        assert_eq!(estimate.storage, 0);
        assert_eq!(estimate.import, 0);
        assert_eq!(estimate.forward, 0);
        assert_eq!(estimate.total(), compute_gas_prices(3308, &config.workchain.gas));
        assert_eq!(estimate.total(), 3308);
    }
}

#[test]
fn two_message_order_uses_second_gas_entry() {
    let jetton = build_order(&OrderInput {
        target: TARGET.into(),
        amount: "3".into(),
        asset: Asset::Jetton {
            wallet: MsgAddress::Internal {
                workchain: 0,
                address: [0x77; 32],
            },
            decimals: 9,
        },
        own_address: MsgAddress::Internal {
            workchain: 0,
            address: [0x2a; 32],
        },
        ..Default::default()
    })
    .unwrap();

    let mut messages = jetton.messages().unwrap();
    messages.push(OrderMessage {
        target: TARGET.into(),
        amount: 1_000_000,
        amount_all: false,
        payload: None,
        state_init: None,
    });
    let order = Order::Jetton(MessageOrder::from_messages(messages, None, None));
    assert_eq!(order.message_count(), 2);

    let contract = contract(WalletVersion::V4R2);
    let config = gas_only_config();
    let planned = reconstruct_messages(Some(&order), contract.address(), "", None).unwrap();
    assert_eq!(planned.accounts.len(), 3);
    let estimate = estimate_fee(&EstimateInput {
        contract: &contract,
        transfer: &planned,
        seqno: 4,
        config: &config,
        storage: &[],
        now: NOW,
    })
    .unwrap();
    assert_eq!(estimate.gas, 3950);
}

#[test]
fn five_messages_are_rejected() {
    let message = OrderMessage {
        target: TARGET.into(),
        amount: 1,
        amount_all: false,
        payload: None,
        state_init: None,
    };
    let order = Order::Simple(MessageOrder::from_messages(vec![message; 5], None, None));
    let contract = contract(WalletVersion::V5R1);
    let config = gas_only_config();
    let planned = reconstruct_messages(Some(&order), contract.address(), "", None).unwrap();
    let result = estimate_fee(&EstimateInput {
        contract: &contract,
        transfer: &planned,
        seqno: 1,
        config: &config,
        storage: &[],
        now: NOW,
    });
    assert!(matches!(result, Err(FeeError::UnsupportedMessageCount(5))));
}

#[test]
fn estimate_is_deterministic() {
    let order = simple_order();
    let contract = contract(WalletVersion::V5R1);
    let config = mainnet_like_config();
    let storage = [
        Some(StorageStat {
            last_paid: NOW - 86_400,
            due_payment: None,
            used: StorageUsed {
                bits: 10_000,
                cells: 20,
                public_cells: 0,
            },
        }),
        None,
    ];
    let planned = reconstruct_messages(Some(&order), contract.address(), "", None).unwrap();
    let input = EstimateInput {
        contract: &contract,
        transfer: &planned,
        seqno: 12,
        config: &config,
        storage: &storage,
        now: NOW,
    };
    let first = estimate_fee(&input).unwrap();
    let second = estimate_fee(&input).unwrap();
    assert_eq!(first, second);
    assert!(first.storage > 0);
    assert!(first.import > 0);
    assert!(first.forward > 0);
    assert!(first.total() >= first.gas);
}

/// Chain client whose first `last_block` call waits until the test opens the gate.
struct GatedClient {
    calls: AtomicUsize,
    entered: Arc<Notify>,
    gate: Arc<Semaphore>,
}

impl ChainClient for GatedClient {
    async fn last_block(&self) -> FeeResult<BlockRef> {
        if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
            self.entered.notify_one();
            let permit = self
                .gate
                .acquire()
                .await
                .map_err(|e| FeeError::Client(e.to_string()))?;
            permit.forget();
        }
        Ok(BlockRef { seqno: 7, utime: NOW })
    }

    async fn account(&self, _block_seqno: u32, _address: &MsgAddress) -> FeeResult<AccountSnapshot> {
        Ok(AccountSnapshot::default())
    }

    async fn seqno(&self, _block_seqno: u32, _address: &MsgAddress) -> FeeResult<u32> {
        Ok(1)
    }
}

fn request_with_flat_gas(flat_price: u64) -> EstimationRequest {
    let mut config = ChainConfigSnapshot::default();
    config.workchain.gas = GasPrices {
        flat_limit: 100_000,
        flat_price,
        ..Default::default()
    };
    EstimationRequest {
        contract: contract(WalletVersion::V4R2),
        config: Arc::new(config),
        order: Some(simple_order()),
        comment: String::new(),
        state_init: None,
    }
}

#[tokio::test]
async fn superseded_estimation_never_overwrites_newer_result() {
    let entered = Arc::new(Notify::new());
    let gate = Arc::new(Semaphore::new(0));
    let client = GatedClient {
        calls: AtomicUsize::new(0),
        entered: entered.clone(),
        gate: gate.clone(),
    };
    let policy = BackoffPolicy {
        initial_delay: Duration::ZERO,
        max_delay: Duration::ZERO,
        max_attempts: 1,
    };
    let scheduler = Arc::new(EstimationScheduler::new(client, policy));

    let first = tokio::spawn({
        let scheduler = scheduler.clone();
        async move { scheduler.estimate(request_with_flat_gas(1_000)).await }
    });
    entered.notified().await;

    // The second request supersedes the first while it is still waiting on the chain.
    let ticket = scheduler.begin();
    let second = tokio::spawn({
        let scheduler = scheduler.clone();
        async move { scheduler.run(ticket, request_with_flat_gas(2_000)).await }
    });

    gate.add_permits(1);

    let first = first.await.unwrap().unwrap();
    let second = second.await.unwrap().unwrap();
    assert_eq!(first, None);
    assert_eq!(second.map(|e| e.total()), Some(2_000));
    assert_eq!(scheduler.latest().map(|e| e.total()), Some(2_000));
}
