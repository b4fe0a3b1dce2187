//! Loading configuration files from disk.

use std::io::Write;
use tempfile::NamedTempFile;

use batch_sender::chain::Commitment;
use batch_sender::config::{load_config, ConfigError};
use batch_sender::endpoints::{EndpointRegistry, StaticRegistry};

fn write_config(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn test_load_full_config() {
    std::env::set_var("BATCH_SENDER_IT_HELIUS_KEY", "k-123");
    let file = write_config(
        r#"
network = "devnet"

[networks.devnet]
primary_endpoint = "helius"
min_consensus = 2

[[networks.devnet.endpoints]]
id = "public"
label = "Public"
url = "https://api.devnet.solana.com"

[[networks.devnet.endpoints]]
id = "helius"
label = "Helius"
url = "https://devnet.helius-rpc.com"
api_key = "${BATCH_SENDER_IT_HELIUS_KEY}"

[[networks.devnet.endpoints]]
id = "backup"
label = "Backup"
url = "https://backup.example.com"
enabled = false

[batch]
default_size = 6

[rpc]
confirm_commitment = "finalized"

[consensus]
delay_ms = 1500
"#,
    );

    let config = load_config(file.path()).unwrap();
    assert_eq!(config.batch.default_size, 6);
    assert_eq!(config.batch.max_size, 12);
    assert_eq!(config.rpc.confirm_commitment, Commitment::Finalized);
    assert_eq!(config.consensus.delay_ms, 1500);
    assert_eq!(config.consensus.query_timeout_secs, 10);

    let registry = StaticRegistry::from_config(&config).unwrap();
    assert_eq!(registry.list_enabled_endpoints().len(), 2);
    assert_eq!(registry.min_consensus_threshold(), 2);

    let primary = registry.primary_endpoint().unwrap();
    assert_eq!(primary.id, "helius");
    assert_eq!(primary.api_key, "k-123");
    assert_eq!(
        primary.request_url().unwrap().as_str(),
        "https://devnet.helius-rpc.com/?api-key=k-123"
    );
}

#[test]
fn test_load_reports_all_validation_errors() {
    let file = write_config(
        r#"
network = "devnet"

[networks.devnet]
primary_endpoint = "missing"
min_consensus = 0

[[networks.devnet.endpoints]]
id = "a"
label = "A"
url = "not a url"

[[networks.devnet.endpoints]]
id = "a"
label = "A again"
url = "https://a.example.com"

[batch]
max_size = 20
"#,
    );

    match load_config(file.path()) {
        Err(ConfigError::Validation(errors)) => assert!(errors.len() >= 4, "{:?}", errors),
        other => panic!("unexpected {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_load_missing_file_and_bad_toml() {
    let missing = load_config(std::path::Path::new("/nonexistent/batch-sender.toml"));
    assert!(matches!(missing, Err(ConfigError::Io(_))));

    let file = write_config("network = [");
    assert!(matches!(load_config(file.path()), Err(ConfigError::Parse(_))));
}
