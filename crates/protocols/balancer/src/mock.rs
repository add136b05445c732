//! In-memory chain and oracle used by the orchestrator tests

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use alloy::primitives::{Address, Bytes, B256, U256};
use alloy::sol_types::{SolCall, SolValue};
use async_trait::async_trait;
use bigdecimal::BigDecimal;
use evm_node_client::{ChainReader, TransactionSender};
use evm_tx::{TxReceipt, TxRequest};
use weir_core::{ChainConfig, RpcError};

use crate::client::{Balancer, Result};
use crate::constants::{IBPool, IProxyRegistry, IERC20};
use crate::sor::RouteOracle;
use crate::state::{BalancerError, Route, SwapHop, SwapSide};

pub const ACCOUNT: Address = Address::new([0xac; 20]);

/// One chain interaction, in the order the mock saw it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainEvent {
    Read { to: Address, selector: [u8; 4] },
    Send { to: Address, selector: [u8; 4] },
}

#[derive(Default)]
struct ChainState {
    events: Vec<ChainEvent>,
    proxies: HashMap<Address, Address>,
    token_balances: HashMap<(Address, Address), U256>,
    allowances: HashMap<(Address, Address, Address), U256>,
    native_balances: HashMap<Address, U256>,
    pool_tokens: HashMap<Address, Vec<Address>>,
    sent: Vec<TxRequest>,
    builds: usize,
    calls: usize,
    revert_next: Option<String>,
    race_build: Option<(Address, Address)>,
}

/// Scripted chain: answers registry, ERC20 and BPool reads from memory and
/// records every transaction sent.
#[derive(Clone)]
pub struct MockChain {
    state: Arc<Mutex<ChainState>>,
    account: Option<Address>,
    config: ChainConfig,
}

impl MockChain {
    pub fn new() -> Self {
        Self {
            state: Arc::default(),
            account: Some(ACCOUNT),
            config: ChainConfig::default(),
        }
    }

    pub fn without_account() -> Self {
        Self {
            account: None,
            ..Self::new()
        }
    }

    pub fn config(&self) -> &ChainConfig {
        &self.config
    }

    pub fn set_proxy(&self, owner: Address, proxy: Address) {
        self.state.lock().unwrap().proxies.insert(owner, proxy);
    }

    pub fn proxy_of(&self, owner: Address) -> Option<Address> {
        self.state.lock().unwrap().proxies.get(&owner).copied()
    }

    pub fn set_token_balance(&self, token: Address, owner: Address, amount: U256) {
        self.state
            .lock()
            .unwrap()
            .token_balances
            .insert((token, owner), amount);
    }

    pub fn set_native_balance(&self, owner: Address, amount: U256) {
        self.state.lock().unwrap().native_balances.insert(owner, amount);
    }

    pub fn set_pool_tokens(&self, pool: Address, tokens: Vec<Address>) {
        self.state.lock().unwrap().pool_tokens.insert(pool, tokens);
    }

    /// Revert the next transaction with `reason`
    pub fn revert_next(&self, reason: &str) {
        self.state.lock().unwrap().revert_next = Some(reason.to_string());
    }

    /// Make the next build by `owner` revert after `proxy` got registered
    /// for it by someone else
    pub fn race_build_with(&self, owner: Address, proxy: Address) {
        self.state.lock().unwrap().race_build = Some((owner, proxy));
    }

    pub fn sent(&self) -> Vec<TxRequest> {
        self.state.lock().unwrap().sent.clone()
    }

    pub fn builds(&self) -> usize {
        self.state.lock().unwrap().builds
    }

    pub fn calls(&self) -> usize {
        self.state.lock().unwrap().calls
    }

    pub fn events(&self) -> Vec<ChainEvent> {
        self.state.lock().unwrap().events.clone()
    }

    fn answer(&self, to: Address, data: &[u8]) -> std::result::Result<Vec<u8>, RpcError> {
        let mut state = self.state.lock().unwrap();
        state.calls += 1;

        let selector: [u8; 4] = data
            .get(..4)
            .and_then(|s| s.try_into().ok())
            .ok_or_else(|| RpcError::Decode("short calldata".into()))?;
        state.events.push(ChainEvent::Read { to, selector });
        let decode_err = |e: alloy::sol_types::Error| RpcError::Decode(e.to_string());

        // ERC20 and BPool share the `balanceOf` selector
        let encoded = match selector {
            IProxyRegistry::proxiesCall::SELECTOR => {
                let call = IProxyRegistry::proxiesCall::abi_decode(data).map_err(decode_err)?;
                let proxy = state.proxies.get(&call.owner).copied().unwrap_or_default();
                (proxy,).abi_encode_params()
            }
            IERC20::balanceOfCall::SELECTOR => {
                let call = IERC20::balanceOfCall::abi_decode(data).map_err(decode_err)?;
                let amount = state
                    .token_balances
                    .get(&(to, call.owner))
                    .copied()
                    .unwrap_or_default();
                (amount,).abi_encode_params()
            }
            IERC20::allowanceCall::SELECTOR => {
                let call = IERC20::allowanceCall::abi_decode(data).map_err(decode_err)?;
                let amount = state
                    .allowances
                    .get(&(to, call.owner, call.spender))
                    .copied()
                    .unwrap_or_default();
                (amount,).abi_encode_params()
            }
            IBPool::getCurrentTokensCall::SELECTOR => {
                let tokens = state.pool_tokens.get(&to).cloned().unwrap_or_default();
                (tokens,).abi_encode_params()
            }
            _ => {
                return Err(RpcError::Node {
                    message: "execution reverted".into(),
                })
            }
        };
        Ok(encoded)
    }

    fn apply(&self, request: &TxRequest) -> TxReceipt {
        let mut state = self.state.lock().unwrap();
        state.sent.push(request.clone());
        state.events.push(ChainEvent::Send {
            to: request.to,
            selector: request.selector().unwrap_or_default(),
        });
        let tx_hash = B256::with_last_byte(state.sent.len() as u8);

        if request.selector() == Some(IProxyRegistry::buildCall::SELECTOR) {
            if let Some((owner, proxy)) = state.race_build.take() {
                if owner == request.from {
                    state.proxies.insert(owner, proxy);
                    return TxReceipt::reverted(tx_hash, Some("nonce too low".into()));
                }
            }
        }

        if let Some(reason) = state.revert_next.take() {
            return TxReceipt::reverted(tx_hash, Some(reason));
        }

        match request.selector() {
            Some(IProxyRegistry::buildCall::SELECTOR) => {
                state.builds += 1;
                let proxy = Address::with_last_byte(0xf0 + state.builds as u8);
                state.proxies.insert(request.from, proxy);
            }
            Some(IERC20::approveCall::SELECTOR) => {
                if let Ok(call) = IERC20::approveCall::abi_decode(&request.data) {
                    state
                        .allowances
                        .insert((request.to, request.from, call.spender), call.amount);
                }
            }
            _ => {}
        }

        TxReceipt::confirmed(tx_hash, 100 + state.sent.len() as u64)
    }
}

#[async_trait]
impl ChainReader for MockChain {
    async fn call(&self, to: Address, data: Bytes) -> std::result::Result<Bytes, RpcError> {
        tokio::task::yield_now().await;
        self.answer(to, &data).map(Bytes::from)
    }

    async fn native_balance(&self, account: Address) -> std::result::Result<U256, RpcError> {
        let state = self.state.lock().unwrap();
        Ok(state.native_balances.get(&account).copied().unwrap_or_default())
    }
}

#[async_trait]
impl TransactionSender for MockChain {
    async fn account(&self) -> std::result::Result<Option<Address>, RpcError> {
        Ok(self.account)
    }

    async fn send(&self, request: TxRequest) -> std::result::Result<TxReceipt, RpcError> {
        // Leave room for other tasks to interleave while "mining"
        tokio::time::sleep(Duration::from_millis(5)).await;
        Ok(self.apply(&request))
    }
}

/// Oracle returning a fixed answer and recording the queries it saw
#[derive(Clone)]
pub struct MockOracle {
    answer: std::result::Result<Route, String>,
    queries: Arc<Mutex<Vec<(Address, Address, SwapSide, U256)>>>,
}

impl MockOracle {
    pub fn returning(route: Route) -> Self {
        Self {
            answer: Ok(route),
            queries: Arc::default(),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            answer: Err(message.to_string()),
            queries: Arc::default(),
        }
    }

    pub fn queries(&self) -> Vec<(Address, Address, SwapSide, U256)> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl RouteOracle for MockOracle {
    async fn get_swaps(
        &self,
        token_in: Address,
        token_out: Address,
        side: SwapSide,
        amount: U256,
    ) -> Result<Route> {
        self.queries
            .lock()
            .unwrap()
            .push((token_in, token_out, side, amount));
        self.answer
            .clone()
            .map_err(|message| BalancerError::Oracle { message })
    }
}

pub fn single_hop_route(
    token_in: Address,
    token_out: Address,
    swap_amount: U256,
    return_amount: U256,
) -> Route {
    Route {
        sequences: vec![vec![SwapHop {
            pool: Address::repeat_byte(0xb1),
            token_in,
            token_out,
            swap_amount,
            limit_return_amount: U256::ZERO,
            max_price: U256::MAX,
        }]],
        return_amount,
        spot_price: BigDecimal::from(2),
    }
}

pub fn balancer_with_oracle(chain: &MockChain, oracle: &MockOracle) -> Balancer {
    Balancer::new(
        chain.config.clone(),
        Arc::new(chain.clone()),
        Arc::new(chain.clone()),
        Arc::new(oracle.clone()),
    )
}

pub fn balancer_with(chain: &MockChain) -> Balancer {
    balancer_with_oracle(chain, &MockOracle::failing("no oracle configured"))
}
