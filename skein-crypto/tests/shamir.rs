//! End-to-end secret-sharing flows with OS randomness.

use std::sync::Arc;
use std::thread;

use skein_crypto::config::ShamirConfig;
use skein_crypto::primitives::{sha512, Sha512Primitives};
use skein_crypto::random::array_random_subset;
use skein_crypto::shamir::{restore_secret, split_secret, SecretSharer, Share};
use skein_types::error::{ErrorKind, SkeinError};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[test]
fn test_ten_shares_threshold_six() {
    init_tracing();
    let secret = sha512(b"a 64-byte secret derived from a digest");
    let shares = split_secret(&secret, 10, 6).unwrap();
    assert_eq!(shares.len(), 10);
    assert!(shares.iter().all(|s| s.as_bytes().len() == 65));

    for n in 6..=10 {
        let subset = array_random_subset(&Sha512Primitives, &shares, n).unwrap();
        assert_eq!(restore_secret(&subset).unwrap(), secret.to_vec(), "{n} shares");
    }

    let subset = array_random_subset(&Sha512Primitives, &shares, 5).unwrap();
    let restored = restore_secret(&subset).unwrap();
    assert_eq!(restored.len(), 64);
    assert_ne!(restored, secret.to_vec());
}

#[test]
fn test_shares_travel_as_hex() {
    let secret = b"correct horse battery staple";
    let config = ShamirConfig::new(4, 3);
    let shares = SecretSharer::new().split_with(secret, &config).unwrap();

    let wire: Vec<String> = shares.iter().map(Share::to_hex).collect();
    let received: Vec<Share> = wire[1..]
        .iter()
        .map(|h| Share::from_hex(h).unwrap())
        .collect();
    assert_eq!(restore_secret(&received).unwrap(), secret.to_vec());
}

#[test]
fn test_parameter_errors() {
    let secret = [9u8; 32];
    let cases = [
        (split_secret(&[9], 5, 3), "short secret"),
        (split_secret(&secret, 5, 1), "threshold 1"),
        (split_secret(&secret, 2, 3), "fewer shares than threshold"),
        (split_secret(&secret, 300, 3), "too many shares"),
    ];
    for (result, label) in cases {
        let err = result.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput, "{label}");
    }
}

#[test]
fn test_restore_rejects_mixed_splits() {
    let a = split_secret(b"first secret", 3, 2).unwrap();
    let b = split_secret(b"second secret", 3, 2).unwrap();
    let mixed = [a[0].as_bytes().to_vec(), b[1].as_bytes().to_vec()];
    assert!(matches!(
        restore_secret(&mixed),
        Err(SkeinError::LengthMismatch { index: 1, .. })
    ));
}

#[test]
fn test_sharer_is_shareable_across_threads() {
    let sharer = Arc::new(SecretSharer::new());
    let handles: Vec<_> = (0..4u8)
        .map(|t| {
            let sharer = Arc::clone(&sharer);
            thread::spawn(move || {
                let secret = vec![t; 24];
                let shares = sharer.split(&secret, 5, 3).unwrap();
                let restored = sharer.restore(&shares[2..]).unwrap();
                assert_eq!(restored, secret);
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
}
