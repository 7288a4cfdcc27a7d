// ABOUTME: Session cache — remembered method arguments, deploy arguments, and recent addresses.
// ABOUTME: Bounded in memory, serializable as a plain SessionState, guarded by a single mutex.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::recency::RecencyList;

/// Maximum remembered method-argument entries before the map is cleared.
pub const DEFAULT_METHOD_ARGS_CAPACITY: usize = 30;
/// Maximum addresses kept per scope.
pub const DEFAULT_ADDRESS_CAPACITY: usize = 10;

const DEPLOY_ARGS_KEY: &str = "args";
const DONT_ASK_KEY: &str = "dontask";

/// Which deployment target an address belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AddressScope {
    Local,
    Remote,
}

/// The persistable backing record of a [`SessionCache`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionState {
    pub method_args: HashMap<String, Vec<String>>,
    pub deploy_args: HashMap<String, String>,
    pub local_contract_addresses: RecencyList,
    pub remote_contract_addresses: RecencyList,
}

impl SessionState {
    fn addresses(&self, scope: AddressScope) -> &RecencyList {
        match scope {
            AddressScope::Local => &self.local_contract_addresses,
            AddressScope::Remote => &self.remote_contract_addresses,
        }
    }

    fn addresses_mut(&mut self, scope: AddressScope) -> &mut RecencyList {
        match scope {
            AddressScope::Local => &mut self.local_contract_addresses,
            AddressScope::Remote => &mut self.remote_contract_addresses,
        }
    }
}

/// Capacity limits for a [`SessionCache`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheLimits {
    pub method_args: usize,
    pub addresses: usize,
}

impl Default for CacheLimits {
    fn default() -> Self {
        Self {
            method_args: DEFAULT_METHOD_ARGS_CAPACITY,
            addresses: DEFAULT_ADDRESS_CAPACITY,
        }
    }
}

/// Deterministic key for a method signature: `name-` followed by each
/// parameter type and a trailing comma.
pub fn encode_method_key<S: AsRef<str>>(method_name: &str, param_types: &[S]) -> String {
    let mut key = String::with_capacity(method_name.len() + 1);
    key.push_str(method_name);
    key.push('-');
    for param in param_types {
        key.push_str(param.as_ref());
        key.push(',');
    }
    key
}

fn deploy_args_key(module: &str) -> String {
    module_key(module, DEPLOY_ARGS_KEY)
}

fn dont_ask_key(module: &str) -> String {
    module_key(module, DONT_ASK_KEY)
}

fn module_key(module: &str, suffix: &str) -> String {
    if module.trim().is_empty() {
        suffix.to_string()
    } else {
        format!("{module}.{suffix}")
    }
}

/// Apply the same bounds to loaded state that inserts maintain.
fn fit_to_limits(mut state: SessionState, limits: CacheLimits) -> SessionState {
    if state.method_args.len() > limits.method_args {
        debug!(
            entries = state.method_args.len(),
            "loaded method argument cache over capacity, clearing"
        );
        state.method_args.clear();
    }
    state.local_contract_addresses.truncate_oldest(limits.addresses);
    state.remote_contract_addresses.truncate_oldest(limits.addresses);
    state
}

/// Mutable developer-session state owned by one project session.
///
/// All operations are total; a poisoned lock is recovered rather than propagated.
#[derive(Debug, Default)]
pub struct SessionCache {
    state: Mutex<SessionState>,
    limits: CacheLimits,
}

impl SessionCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limits(limits: CacheLimits) -> Self {
        Self {
            state: Mutex::new(SessionState::default()),
            limits,
        }
    }

    /// Build a cache around previously persisted state, trimmed to `limits`.
    pub fn from_state(state: SessionState, limits: CacheLimits) -> Self {
        Self {
            state: Mutex::new(fit_to_limits(state, limits)),
            limits,
        }
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Snapshot of the backing state for persistence.
    pub fn state(&self) -> SessionState {
        self.lock().clone()
    }

    /// Swap in reloaded state wholesale. Nothing is merged; oversized
    /// collections are trimmed to the cache limits.
    pub fn replace_state(&self, state: SessionState) {
        *self.lock() = fit_to_limits(state, self.limits);
    }

    /// Host-facing alias of [`replace_state`](Self::replace_state).
    pub fn load_state(&self, state: SessionState) {
        self.replace_state(state);
    }

    /// Last arguments used for this method signature, if any.
    pub fn get_args<S: AsRef<str>>(&self, method_name: &str, param_types: &[S]) -> Option<Vec<String>> {
        let key = encode_method_key(method_name, param_types);
        self.lock().method_args.get(&key).cloned()
    }

    /// Remember arguments for a method signature.
    ///
    /// Once the map holds `limits.method_args` entries it is cleared entirely
    /// before the new entry goes in.
    pub fn put_args<S: AsRef<str>>(&self, method_name: &str, param_types: &[S], args: Vec<String>) {
        if self.limits.method_args == 0 {
            return;
        }
        let key = encode_method_key(method_name, param_types);
        let mut state = self.lock();
        if state.method_args.len() >= self.limits.method_args {
            debug!(
                entries = state.method_args.len(),
                "method argument cache full, clearing"
            );
            state.method_args.clear();
        }
        state.method_args.insert(key, args);
    }

    pub fn get_deploy_args(&self, module: &str) -> Option<String> {
        self.lock().deploy_args.get(&deploy_args_key(module)).cloned()
    }

    /// Remember deploy arguments for a module. Blank modules share one key.
    pub fn put_deploy_args(&self, module: &str, value: &str) {
        self.lock()
            .deploy_args
            .insert(deploy_args_key(module), value.trim().to_string());
    }

    /// True only if the stored flag is exactly `"true"`.
    pub fn should_skip_deploy_prompt(&self, module: &str) -> bool {
        self.lock()
            .deploy_args
            .get(&dont_ask_key(module))
            .is_some_and(|flag| flag == "true")
    }

    pub fn set_skip_deploy_prompt(&self, module: &str, flag: bool) {
        self.lock()
            .deploy_args
            .insert(dont_ask_key(module), flag.to_string());
    }

    /// Non-blank deploy arguments keyed by their module key, for summaries.
    pub fn list_deploy_args_by_module(&self) -> BTreeMap<String, String> {
        self.lock()
            .deploy_args
            .iter()
            .filter(|(key, value)| key.ends_with(DEPLOY_ARGS_KEY) && !value.trim().is_empty())
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }

    /// Remember a deployed contract address. Repeats neither grow nor reorder the list.
    pub fn record_address(&self, scope: AddressScope, address: &str) {
        let inserted = self
            .lock()
            .addresses_mut(scope)
            .record(address, self.limits.addresses);
        if !inserted {
            debug!(?scope, address, "address already recorded");
        }
    }

    /// Addresses for the scope, most recent first.
    pub fn list_addresses(&self, scope: AddressScope) -> Vec<String> {
        self.lock().addresses(scope).newest_first()
    }
}
