//! Pure spending-policy evaluator consulted by an agent credential before
//! every send. Contains no I/O: callers own counter persistence and pass
//! in `spent_today` freshly read under their own lock.

use num_bigint::BigUint;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Chain {
    Eth,
    Bsv,
}

/// A spend amount, denominated the way its chain natively counts money:
/// BSV in satoshis (fits comfortably in `u64`), ETH in wei (arbitrary
/// precision, since wei amounts can exceed `u64::MAX`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Amount {
    Bsv(u64),
    Eth(BigUint),
}

impl Amount {
    pub fn chain(&self) -> Chain {
        match self {
            Amount::Bsv(_) => Chain::Bsv,
            Amount::Eth(_) => Chain::Eth,
        }
    }

    /// Saturating addition. Panics if `self` and `other` are on different
    /// chains — callers never mix denominations; mixing is an internal
    /// invariant breach, not a policy outcome.
    pub fn saturating_add(&self, other: &Amount) -> Amount {
        match (self, other) {
            (Amount::Bsv(a), Amount::Bsv(b)) => Amount::Bsv(a.saturating_add(*b)),
            (Amount::Eth(a), Amount::Eth(b)) => Amount::Eth(a + b),
            _ => panic!("sigil-policy: cannot add amounts across chains"),
        }
    }

    fn exceeds(&self, cap: &Amount) -> bool {
        match (self, cap) {
            (Amount::Bsv(a), Amount::Bsv(c)) => a > c,
            (Amount::Eth(a), Amount::Eth(c)) => a > c,
            _ => panic!("sigil-policy: cannot compare amounts across chains"),
        }
    }

    /// True iff the cap is set to "no limit" (zero).
    fn is_uncapped(cap: &Amount) -> bool {
        match cap {
            Amount::Bsv(0) => true,
            Amount::Eth(v) => v == &BigUint::from(0u32),
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Policy {
    pub chains: Vec<Chain>,
    /// Non-empty means only these destinations are allowed.
    pub allowed_addrs: Vec<String>,
    pub max_per_tx: Option<Amount>,
    pub max_daily: Option<Amount>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PolicyDecision {
    Allowed,
    ChainNotAllowed,
    DestinationNotAllowed,
    PerTxExceeded,
    DailyExceeded,
}

/// Evaluates a prospective spend against a credential's policy. Pure and
/// total: never blocks, never fails, always returns a decision.
pub fn evaluate(
    policy: &Policy,
    chain: Chain,
    amount: &Amount,
    destination: &str,
    spent_today: &Amount,
) -> PolicyDecision {
    if !policy.chains.contains(&chain) {
        return PolicyDecision::ChainNotAllowed;
    }
    if !policy.allowed_addrs.is_empty() && !policy.allowed_addrs.iter().any(|a| a == destination) {
        return PolicyDecision::DestinationNotAllowed;
    }
    if let Some(cap) = &policy.max_per_tx {
        if !Amount::is_uncapped(cap) && amount.exceeds(cap) {
            return PolicyDecision::PerTxExceeded;
        }
    }
    if let Some(cap) = &policy.max_daily {
        if !Amount::is_uncapped(cap) {
            let projected = spent_today.saturating_add(amount);
            if projected.exceeds(cap) {
                return PolicyDecision::DailyExceeded;
            }
        }
    }
    PolicyDecision::Allowed
}
