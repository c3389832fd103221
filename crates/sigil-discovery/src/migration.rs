//! Consolidation planning for everything a discovery scan turned up.

use crate::error::DiscoveryError;
use crate::scan::DiscoveryResult;

const INPUT_SIZE_BYTES: u64 = 148;
const OUTPUT_SIZE_BYTES: u64 = 34;
const FIXED_OVERHEAD_BYTES: u64 = 10;
const LARGE_INPUT_COUNT_WARNING: usize = 50;
const HIGH_FEE_RATIO_WARNING: f64 = 0.01;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationPlan {
    pub destination: String,
    pub n_inputs: usize,
    pub total_input_sat: u64,
    pub estimated_fee_sat: u64,
    pub net_amount_sat: u64,
    pub warning: Option<String>,
}

/// Aggregates every UTXO a scan found into a single consolidation transaction
/// plan targeting `destination`. Transaction size is estimated as
/// `n_inputs * 148 + 2 * 34 + 10` bytes (one change output alongside the
/// destination output), scaled by `fee_rate_sat_per_byte`. Never signs or
/// broadcasts anything.
pub fn create_migration_plan(
    result: &DiscoveryResult,
    destination: &str,
    fee_rate_sat_per_byte: u64,
) -> Result<MigrationPlan, DiscoveryError> {
    let n_inputs: usize = result.addresses.iter().map(|a| a.utxo_count).sum();
    if n_inputs == 0 {
        return Err(DiscoveryError::NoInputs);
    }

    let total_input_sat = result.total_balance_sat;
    let size_bytes = n_inputs as u64 * INPUT_SIZE_BYTES + 2 * OUTPUT_SIZE_BYTES + FIXED_OVERHEAD_BYTES;
    let estimated_fee_sat = size_bytes * fee_rate_sat_per_byte;

    if estimated_fee_sat > total_input_sat {
        return Err(DiscoveryError::InsufficientForFee);
    }
    let net_amount_sat = total_input_sat - estimated_fee_sat;

    let mut warnings = Vec::new();
    if n_inputs > LARGE_INPUT_COUNT_WARNING {
        warnings.push(format!("{n_inputs} inputs is unusually large; consider migrating in batches"));
    }
    if total_input_sat > 0 && estimated_fee_sat as f64 / total_input_sat as f64 > HIGH_FEE_RATIO_WARNING {
        warnings.push("estimated fee exceeds 1% of the migrated value".to_string());
    }

    Ok(MigrationPlan {
        destination: destination.to_string(),
        n_inputs,
        total_input_sat,
        estimated_fee_sat,
        net_amount_sat,
        warning: if warnings.is_empty() { None } else { Some(warnings.join("; ")) },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::DiscoveredAddress;

    fn result_with(utxo_count: usize, balance_sat: u64) -> DiscoveryResult {
        DiscoveryResult {
            addresses: vec![DiscoveredAddress {
                scheme: "BSV Standard".to_string(),
                address: "addr".to_string(),
                path: "m/44'/236'/0'/0/0".to_string(),
                balance_sat,
                utxo_count,
                is_change: false,
            }],
            total_balance_sat: balance_sat,
            total_utxos: utxo_count,
            addresses_scanned: 21,
            errors: vec![],
        }
    }

    #[test]
    fn computes_fee_and_net_amount() {
        let result = result_with(2, 100_000);
        let plan = create_migration_plan(&result, "dest", 1).unwrap();
        let expected_size = 2 * 148 + 2 * 34 + 10;
        assert_eq!(plan.estimated_fee_sat, expected_size);
        assert_eq!(plan.net_amount_sat, 100_000 - expected_size);
        assert!(plan.warning.is_none());
    }

    #[test]
    fn rejects_when_fee_exceeds_total() {
        let result = result_with(1, 10);
        let err = create_migration_plan(&result, "dest", 100).unwrap_err();
        assert_eq!(err, DiscoveryError::InsufficientForFee);
    }

    #[test]
    fn rejects_empty_result() {
        let result = DiscoveryResult::default();
        let err = create_migration_plan(&result, "dest", 1).unwrap_err();
        assert_eq!(err, DiscoveryError::NoInputs);
    }

    #[test]
    fn warns_on_high_fee_ratio() {
        let result = result_with(1, 1_000);
        let plan = create_migration_plan(&result, "dest", 5).unwrap();
        assert!(plan.warning.as_ref().unwrap().contains("1%"));
    }

    #[test]
    fn warns_on_large_input_count() {
        let result = result_with(60, 10_000_000);
        let plan = create_migration_plan(&result, "dest", 1).unwrap();
        assert!(plan.warning.as_ref().unwrap().contains("unusually large"));
    }
}
