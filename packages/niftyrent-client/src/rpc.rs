//! Read-only RPC client with a primary → fallback circuit breaker.
//!
//! A failed call is reported, never retried. Repeated primary failures open
//! the circuit so later calls go to the fallback until the window passes.

use near_jsonrpc_client::methods;
use near_jsonrpc_client::JsonRpcClient;
use near_jsonrpc_primitives::types::query::QueryResponseKind;
use near_primitives::types::{AccountId, BlockReference, Finality, FunctionArgs};
use near_primitives::views::QueryRequest;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use tracing::{info, warn};

const CIRCUIT_BREAKER_THRESHOLD: u64 = 5;
const CIRCUIT_BREAKER_WINDOW_MS: u64 = 30_000;

struct CircuitState {
    failures: u64,
    last_failure_ms: u64,
    open: bool,
}

/// RPC client for contract view calls.
pub struct RpcClient {
    primary: JsonRpcClient,
    fallback: JsonRpcClient,
    primary_url: String,
    fallback_url: String,
    circuit: Mutex<CircuitState>,
    total_failovers: AtomicU64,
    total_errors: AtomicU64,
}

impl RpcClient {
    pub fn new(primary_url: &str, fallback_url: &str) -> Self {
        info!(
            primary = primary_url,
            fallback = fallback_url,
            "RPC client initialized with failover"
        );
        Self {
            primary: JsonRpcClient::connect(primary_url),
            fallback: JsonRpcClient::connect(fallback_url),
            primary_url: primary_url.to_string(),
            fallback_url: fallback_url.to_string(),
            circuit: Mutex::new(CircuitState {
                failures: 0,
                last_failure_ms: 0,
                open: false,
            }),
            total_failovers: AtomicU64::new(0),
            total_errors: AtomicU64::new(0),
        }
    }

    /// Call a view method with JSON args at final finality; raw result bytes.
    pub async fn view_function<A: Serialize + ?Sized>(
        &self,
        contract_id: &str,
        method_name: &str,
        args: &A,
    ) -> Result<Vec<u8>, crate::Error> {
        let account_id: AccountId = contract_id
            .parse()
            .map_err(|e| crate::Error::Config(format!("invalid contract id {contract_id}: {e}")))?;
        let args = serde_json::to_vec(args)
            .map_err(|e| crate::Error::Decode(format!("{method_name} args: {e}")))?;

        let request = methods::query::RpcQueryRequest {
            block_reference: BlockReference::Finality(Finality::Final),
            request: QueryRequest::CallFunction {
                account_id,
                method_name: method_name.to_string(),
                args: FunctionArgs::from(args),
            },
        };

        let resp = match self.active().call(request).await {
            Ok(r) => {
                self.record_success();
                r
            }
            Err(e) => {
                self.record_failure();
                warn!(
                    contract = contract_id,
                    method = method_name,
                    error = %e,
                    "RPC view call failed"
                );
                return Err(crate::Error::Rpc(format!(
                    "{contract_id}.{method_name} failed: {e}"
                )));
            }
        };

        match resp.kind {
            QueryResponseKind::CallResult(result) => Ok(result.result),
            other => Err(crate::Error::Rpc(format!(
                "unexpected query response: {other:?}"
            ))),
        }
    }

    /// [`Self::view_function`] decoded from JSON.
    pub async fn view_json<T: DeserializeOwned, A: Serialize + ?Sized>(
        &self,
        contract_id: &str,
        method_name: &str,
        args: &A,
    ) -> Result<T, crate::Error> {
        let bytes = self.view_function(contract_id, method_name, args).await?;
        serde_json::from_slice(&bytes).map_err(|e| {
            crate::Error::Decode(format!("{contract_id}.{method_name} result: {e}"))
        })
    }

    // --- Failover / circuit breaker ---

    /// Active client (primary unless circuit is open).
    fn active(&self) -> &JsonRpcClient {
        if self.is_circuit_open() {
            &self.fallback
        } else {
            &self.primary
        }
    }

    fn record_success(&self) {
        let mut circuit = self.circuit.lock().unwrap_or_else(|e| e.into_inner());
        if circuit.failures > 0 && !circuit.open {
            info!(primary = %self.primary_url, "Primary RPC recovered");
            circuit.failures = 0;
        }
    }

    fn record_failure(&self) {
        self.total_errors.fetch_add(1, Ordering::Relaxed);
        let mut circuit = self.circuit.lock().unwrap_or_else(|e| e.into_inner());
        circuit.failures += 1;
        circuit.last_failure_ms = now_ms();
        if circuit.failures >= CIRCUIT_BREAKER_THRESHOLD && !circuit.open {
            circuit.open = true;
            self.total_failovers.fetch_add(1, Ordering::Relaxed);
            warn!(
                failures = circuit.failures,
                fallback = %self.fallback_url,
                "Circuit breaker opened, routing to fallback"
            );
        }
    }

    pub fn is_circuit_open(&self) -> bool {
        let mut circuit = self.circuit.lock().unwrap_or_else(|e| e.into_inner());
        if !circuit.open {
            return false;
        }
        if now_ms().saturating_sub(circuit.last_failure_ms) > CIRCUIT_BREAKER_WINDOW_MS {
            circuit.open = false;
            circuit.failures = 0;
            info!(primary = %self.primary_url, "Circuit breaker half-open, retrying primary");
            return false;
        }
        true
    }

    pub fn failover_count(&self) -> u64 {
        self.total_failovers.load(Ordering::Relaxed)
    }

    pub fn error_count(&self) -> u64 {
        self.total_errors.load(Ordering::Relaxed)
    }

    /// Currently active RPC URL.
    pub fn active_url(&self) -> &str {
        if self.is_circuit_open() {
            &self.fallback_url
        } else {
            &self.primary_url
        }
    }
}

fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// Current wall-clock time in nanoseconds, the unit of lease timestamps.
pub fn now_ns() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos() as u64
}
