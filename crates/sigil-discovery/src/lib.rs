//! Multi-scheme HD address discovery: gap-limit scanning across coin types
//! and legacy derivation schemes, plus consolidation migration planning.

pub mod client;
pub mod error;
pub mod migration;
pub mod scan;
pub mod schemes;

pub use client::ChainClient;
pub use error::DiscoveryError;
pub use migration::{create_migration_plan, MigrationPlan};
pub use scan::{
    discover, DiscoveredAddress, DiscoveryRequest, DiscoveryResult, Phase, ProgressCallback,
    ProgressEvent, DEFAULT_ADDRESS_TIMEOUT, DEFAULT_CONCURRENCY, DEFAULT_GAP_LIMIT,
    DEFAULT_OVERALL_TIMEOUT,
};
pub use schemes::{all, bitcoin_cash, bitcoin_legacy, bsv_standard, builtin_default, handcash_legacy, Scheme};
