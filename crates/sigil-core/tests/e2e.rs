//! Full-lifecycle scenarios driven through a single `Context`: generate a
//! wallet, seal it, start a session, mint an agent credential, take a
//! backup, and restore it — exercising every sub-store `Context::open`
//! wires together.

use std::collections::BTreeMap;
use std::time::Duration;

use sigil_core::Context;
use sigil_wallet_store::{Address, ChainId, KdfParamsDto, NewWallet, SEED_AAD_CONTEXT};

fn derive_eth_wallet(seed: &[u8]) -> (String, String) {
    let key = sigil_hdkey::derive(seed, sigil_hdkey::CoinType::Eth, 0, 0, 0).unwrap();
    let address = sigil_address::address_for_coin(&key, sigil_hdkey::CoinType::Eth).unwrap();
    (key.path.clone(), address)
}

fn seal_and_save(ctx: &Context, name: &str, password: &[u8], seed: &[u8]) {
    let params = sigil_crypto::KdfParams::default();
    let salt = sigil_crypto::generate_salt();
    let key = sigil_crypto::derive_key(password, &salt, &params).unwrap();
    let sealed = sigil_crypto::seal(&key, seed, SEED_AAD_CONTEXT.as_bytes()).unwrap();
    let mut encrypted_seed = sealed.nonce.to_vec();
    encrypted_seed.extend_from_slice(&sealed.ciphertext);

    let (path, address) = derive_eth_wallet(seed);
    let mut addresses = BTreeMap::new();
    addresses.insert(ChainId::Eth, vec![Address { index: 0, path, address }]);

    ctx.storage
        .save(&NewWallet {
            name: name.to_string(),
            enabled_chains: vec![ChainId::Eth],
            addresses,
            change_addresses: None,
            kdf: KdfParamsDto {
                algorithm: params.algorithm,
                salt_hex: hex::encode(salt),
                memory_kib: params.memory_kib,
                iterations: params.iterations,
                parallelism: params.parallelism,
            },
            encrypted_seed,
            mac: Vec::new(),
        })
        .unwrap();
}

#[test]
fn create_scan_session_and_backup_roundtrip() {
    sigil_crypto::use_fast_params_for_tests();
    let home = tempfile::tempdir().unwrap();
    let ctx = Context::open(home.path()).unwrap();

    let mnemonic = sigil_bip39::generate_mnemonic(12).unwrap();
    let seed = mnemonic.to_seed("");
    seal_and_save(&ctx, "main", b"hunter2", &seed);

    let metadata = ctx.storage.load_metadata("main").unwrap();
    assert_eq!(metadata.addresses[&ChainId::Eth].len(), 1);

    ctx.session_mgr.start("main", &seed, Duration::from_secs(60)).unwrap();
    assert!(ctx.session_mgr.has_valid("main"));
    let (session_seed, _record) = ctx.session_mgr.get("main").unwrap();
    assert_eq!(session_seed, seed.to_vec());

    let (_, path) = ctx.backups.create(&ctx.storage, "main", b"hunter2").unwrap();
    let manifest = ctx.backups.verify_with_decryption(&path, b"hunter2").unwrap();
    assert_eq!(manifest.wallet_name, "main");

    ctx.backups.restore(&ctx.storage, &path, b"hunter2", Some("main_restored")).unwrap();
    let restored = ctx.storage.load_metadata("main_restored").unwrap();
    assert_eq!(restored.addresses[&ChainId::Eth][0].address, metadata.addresses[&ChainId::Eth][0].address);

    ctx.session_mgr.end("main").unwrap();
    assert!(!ctx.session_mgr.has_valid("main"));
}

#[test]
fn agent_credential_is_constrained_by_policy() {
    sigil_crypto::use_fast_params_for_tests();
    let home = tempfile::tempdir().unwrap();
    let ctx = Context::open(home.path()).unwrap();

    let mnemonic = sigil_bip39::generate_mnemonic(12).unwrap();
    let seed = mnemonic.to_seed("");
    seal_and_save(&ctx, "main", b"hunter2", &seed);

    let policy = sigil_policy::Policy {
        chains: vec![sigil_policy::Chain::Eth],
        allowed_addrs: vec!["0xdeadbeef".to_string()],
        max_per_tx: Some(sigil_policy::Amount::Eth(100u32.into())),
        max_daily: None,
    };

    let (token, cred) = ctx
        .agent_store
        .create(sigil_agent::NewCredentialRequest {
            wallet_name: "main",
            label: "ci-bot",
            seed: &seed,
            chains: vec![sigil_policy::Chain::Eth],
            xpubs: BTreeMap::new(),
            policy: policy.clone(),
            ttl: Duration::from_secs(3600),
        })
        .unwrap();

    let (unwrapped_seed, authed) = ctx.agent_store.authenticate("main", &token).unwrap();
    assert_eq!(unwrapped_seed, seed.to_vec());
    assert_eq!(authed.id, cred.id);

    let decision = sigil_policy::evaluate(
        &policy,
        sigil_policy::Chain::Eth,
        &sigil_policy::Amount::Eth(1000u32.into()),
        "0xdeadbeef",
        &sigil_policy::Amount::Eth(0u32.into()),
    );
    assert_eq!(decision, sigil_policy::PolicyDecision::PerTxExceeded);

    ctx.agent_store.revoke("main", &cred.id).unwrap();
    assert!(ctx.agent_store.authenticate("main", &token).is_err());
}

#[test]
fn config_overrides_flow_through_context() {
    let home = tempfile::tempdir().unwrap();
    let mut ctx = Context::open(home.path()).unwrap();
    assert_eq!(ctx.config.get_config().discovery.gap_limit, 20);

    ctx.config.set("discovery.gap_limit", "40").unwrap();
    assert_eq!(ctx.config.get_config().discovery.gap_limit, 40);

    let reopened = Context::open(home.path()).unwrap();
    assert_eq!(reopened.config.get_config().discovery.gap_limit, 40);
}
