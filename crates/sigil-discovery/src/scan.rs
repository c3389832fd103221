//! Gap-limit multi-scheme address discovery.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinSet;
use tokio::time::timeout;

use crate::client::ChainClient;
use crate::error::DiscoveryError;
use crate::schemes::Scheme;
use sigil_cache::Utxo;

pub const DEFAULT_GAP_LIMIT: u32 = 20;
pub const DEFAULT_CONCURRENCY: usize = 8;
pub const DEFAULT_OVERALL_TIMEOUT: Duration = Duration::from_secs(60);
pub const DEFAULT_ADDRESS_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredAddress {
    pub scheme: String,
    pub address: String,
    pub path: String,
    pub balance_sat: u64,
    pub utxo_count: usize,
    pub is_change: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Scanning,
    Found,
    Done,
}

#[derive(Debug, Clone)]
pub struct ProgressEvent {
    pub phase: Phase,
    pub scheme_name: String,
    pub current_address: Option<String>,
    pub balance_found: Option<u64>,
}

pub type ProgressCallback = Arc<dyn Fn(ProgressEvent) + Send + Sync>;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscoveryResult {
    pub addresses: Vec<DiscoveredAddress>,
    pub total_balance_sat: u64,
    pub total_utxos: usize,
    pub addresses_scanned: usize,
    pub errors: Vec<String>,
}

pub struct DiscoveryRequest {
    pub seed: Vec<u8>,
    pub schemes: Vec<Scheme>,
    pub gap_limit: u32,
    pub concurrency: usize,
    pub overall_timeout: Duration,
    pub address_timeout: Duration,
}

impl DiscoveryRequest {
    pub fn new(seed: Vec<u8>, schemes: Vec<Scheme>) -> Self {
        Self {
            seed,
            schemes,
            gap_limit: DEFAULT_GAP_LIMIT,
            concurrency: DEFAULT_CONCURRENCY,
            overall_timeout: DEFAULT_OVERALL_TIMEOUT,
            address_timeout: DEFAULT_ADDRESS_TIMEOUT,
        }
    }
}

struct ProbeOutcome {
    address: String,
    path: String,
    utxos: Vec<Utxo>,
    has_activity: bool,
}

fn derive_address(seed: &[u8], scheme: &Scheme, account: u32, branch: u32, index: u32) -> Result<(String, String), DiscoveryError> {
    let key = if scheme.legacy_handcash {
        sigil_hdkey::derive_legacy(seed, index).map_err(|e| DiscoveryError::DerivationFailed(e.to_string()))?
    } else {
        sigil_hdkey::derive(seed, scheme.coin_type, account, branch, index)
            .map_err(|e| DiscoveryError::DerivationFailed(e.to_string()))?
    };
    let address = sigil_address::address_for_coin(&key, scheme.coin_type)
        .map_err(|e| DiscoveryError::DerivationFailed(e.to_string()))?;
    Ok((address, key.path.clone()))
}

async fn probe_index(
    client: Arc<dyn ChainClient>,
    seed: Vec<u8>,
    scheme: Scheme,
    account: u32,
    branch: u32,
    index: u32,
    address_timeout: Duration,
) -> Result<ProbeOutcome, DiscoveryError> {
    let (address, path) = derive_address(&seed, &scheme, account, branch, index)?;
    let fut = async {
        let utxos = client.list_utxos(&address).await?;
        let has_activity = if utxos.is_empty() { client.has_activity(&address).await? } else { true };
        Ok::<_, DiscoveryError>((utxos, has_activity))
    };
    let (utxos, has_activity) = match timeout(address_timeout, fut).await {
        Ok(result) => result?,
        Err(_) => return Err(DiscoveryError::ClientError(format!("timed out probing {address}"))),
    };
    Ok(ProbeOutcome { address, path, utxos, has_activity })
}

/// Scans one `(scheme, account, branch)` to gap-limit termination. Issues
/// up to `request.concurrency` probes per look-ahead window in parallel
/// via `JoinSet`, but only ever advances `consecutive_empty` (and thus
/// reports branch completion) after observing every earlier index, so
/// out-of-order completions inside a window never let the scanner stop
/// too early.
async fn scan_branch(
    client: &Arc<dyn ChainClient>,
    request: &DiscoveryRequest,
    scheme: &Scheme,
    account: u32,
    branch: u32,
    progress: Option<&ProgressCallback>,
    found: &mut Vec<DiscoveredAddress>,
    errors: &mut Vec<String>,
) -> usize {
    let mut next_index: u32 = 0;
    let mut consecutive_empty: u32 = 0;
    let mut scanned = 0usize;

    while consecutive_empty < request.gap_limit {
        let window = request.concurrency.max(1) as u32;

        let mut set: JoinSet<(u32, Result<ProbeOutcome, DiscoveryError>)> = JoinSet::new();
        for index in next_index..(next_index + window) {
            let client = Arc::clone(client);
            let seed = request.seed.clone();
            let scheme = scheme.clone();
            let address_timeout = request.address_timeout;
            set.spawn(async move {
                let result = probe_index(client, seed, scheme, account, branch, index, address_timeout).await;
                (index, result)
            });
        }

        let mut batch_results: Vec<(u32, Result<ProbeOutcome, DiscoveryError>)> = Vec::with_capacity(window as usize);
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok(pair) => batch_results.push(pair),
                Err(e) => errors.push(format!("{}: task join error: {e}", scheme.name)),
            }
        }
        batch_results.sort_by_key(|(index, _)| *index);

        for (_, result) in batch_results {
            scanned += 1;
            match result {
                Ok(outcome) => {
                    if let Some(cb) = progress {
                        cb(ProgressEvent {
                            phase: Phase::Scanning,
                            scheme_name: scheme.name.to_string(),
                            current_address: Some(outcome.address.clone()),
                            balance_found: None,
                        });
                    }
                    if !outcome.utxos.is_empty() || outcome.has_activity {
                        consecutive_empty = 0;
                        let balance_sat: u64 = outcome.utxos.iter().map(|u| u.amount_sat).sum();
                        if let Some(cb) = progress {
                            cb(ProgressEvent {
                                phase: Phase::Found,
                                scheme_name: scheme.name.to_string(),
                                current_address: Some(outcome.address.clone()),
                                balance_found: Some(balance_sat),
                            });
                        }
                        found.push(DiscoveredAddress {
                            scheme: scheme.name.to_string(),
                            address: outcome.address,
                            path: outcome.path,
                            balance_sat,
                            utxo_count: outcome.utxos.len(),
                            is_change: branch != 0,
                        });
                    } else {
                        consecutive_empty += 1;
                    }
                }
                Err(e) => {
                    errors.push(format!("{}: {e}", scheme.name));
                    consecutive_empty += 1;
                }
            }
            if consecutive_empty >= request.gap_limit {
                break;
            }
        }

        next_index += window;
    }

    scanned
}

pub async fn discover(client: Arc<dyn ChainClient>, request: DiscoveryRequest, progress: Option<ProgressCallback>) -> DiscoveryResult {
    let mut addresses = Vec::new();
    let mut errors = Vec::new();
    let mut scanned = 0usize;

    let scan_fut = async {
        for scheme in &request.schemes {
            for &account in &scheme.accounts {
                for &branch in &scheme.branches {
                    scanned += scan_branch(&client, &request, scheme, account, branch, progress.as_ref(), &mut addresses, &mut errors).await;
                }
            }
            if let Some(cb) = &progress {
                cb(ProgressEvent { phase: Phase::Done, scheme_name: scheme.name.to_string(), current_address: None, balance_found: None });
            }
        }
    };

    if timeout(request.overall_timeout, scan_fut).await.is_err() {
        errors.push("discovery cancelled: overall timeout exceeded".to_string());
    }

    let total_balance_sat = addresses.iter().map(|a| a.balance_sat).sum();
    let total_utxos = addresses.iter().map(|a| a.utxo_count).sum();

    DiscoveryResult { addresses, total_balance_sat, total_utxos, addresses_scanned: scanned, errors }
}
