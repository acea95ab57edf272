//! End-to-end hash-tree flows: build, prove, ship the proof, verify.

use skein_crypto::merkle::{
    merkle_proof, merkle_proof_at, merkle_root, verify_merkle_proof, HashTree, Leaf, MerkleProof,
    ProofTarget, Side,
};
use skein_crypto::primitives::sha512;
use skein_crypto::scratch::MerkleScratch;
use skein_types::error::{ErrorKind, SkeinError};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn numbered_leaves(n: usize) -> Vec<Vec<u8>> {
    (0..n).map(|i| format!("element {i}").into_bytes()).collect()
}

#[test]
fn test_every_leaf_of_201_verifies() {
    init_tracing();
    let leaves = numbered_leaves(201);
    let root = merkle_root(&leaves).unwrap();

    let mut scratch = MerkleScratch::for_leaves(leaves.len());
    let tree = HashTree::new();
    let refs: Vec<Leaf<'_, [u8]>> = leaves.iter().map(|l| Leaf::Bytes(l.as_slice())).collect();

    for (i, leaf) in leaves.iter().enumerate() {
        let proof = tree
            .proof_with_scratch(&refs, ProofTarget::Index(i), None, &mut scratch)
            .unwrap();
        // ceil(log2(201)) = 8 levels.
        assert_eq!(proof.len(), 8);
        assert!(verify_merkle_proof(&sha512(leaf), &root, proof.as_bytes()).unwrap());
    }
}

#[test]
fn test_proof_from_smaller_tree_fails() {
    let big = numbered_leaves(201);
    let small = numbered_leaves(200);
    let big_root = merkle_root(&big).unwrap();
    let small_root = merkle_root(&small).unwrap();
    assert_ne!(big_root, small_root);

    // The last element only exists in the larger tree.
    let last = &big[200];
    assert_eq!(
        merkle_proof(&small, last).unwrap_err(),
        SkeinError::ElementNotFound
    );

    // A proof from the 200-leaf tree leads to the 200-leaf root only.
    let proof = merkle_proof(&small, &small[17]).unwrap();
    let digest = sha512(&small[17]);
    assert!(verify_merkle_proof(&digest, &small_root, proof.as_bytes()).unwrap());
    assert!(!verify_merkle_proof(&digest, &big_root, proof.as_bytes()).unwrap());
}

#[test]
fn test_shipped_proof_roundtrip() {
    let leaves = numbered_leaves(37);
    let root = merkle_root(&leaves).unwrap();
    let proof = merkle_proof_at(&leaves, 36).unwrap();

    // The trailing leaf of an odd level pairs with itself.
    let first = proof.steps().next().unwrap();
    assert_eq!(first.side, Side::Left);
    assert_eq!(first.sibling, sha512(&leaves[36]));

    let wire = proof.to_hex();
    let received = MerkleProof::from_hex(&wire).unwrap();
    assert!(verify_merkle_proof(&sha512(&leaves[36]), &root, received.as_bytes()).unwrap());

    let json = serde_json::to_vec(&proof).unwrap();
    let received: MerkleProof = serde_json::from_slice(&json).unwrap();
    assert_eq!(received, proof);
}

#[test]
fn test_serialized_records() {
    #[derive(Debug)]
    struct Transfer {
        from: &'static str,
        to: &'static str,
        amount: u64,
    }
    let encode = |t: &Transfer| {
        let mut out = Vec::new();
        out.extend_from_slice(t.from.as_bytes());
        out.push(b'>');
        out.extend_from_slice(t.to.as_bytes());
        out.extend_from_slice(&t.amount.to_le_bytes());
        out
    };

    let transfers = [
        Transfer { from: "ana", to: "bo", amount: 5 },
        Transfer { from: "bo", to: "cy", amount: 12 },
        Transfer { from: "cy", to: "ana", amount: 1 },
        Transfer { from: "ana", to: "cy", amount: 40 },
        Transfer { from: "dee", to: "bo", amount: 3 },
    ];
    let items: Vec<Leaf<'_, Transfer>> = transfers.iter().map(Leaf::Item).collect();

    let tree = HashTree::new();
    let root = tree.root(&items, Some(&encode)).unwrap();

    let to_cy = |bytes: &[u8]| bytes.windows(3).any(|w| w == b">cy");
    let proof = tree
        .proof(&items, ProofTarget::Matching(&to_cy), Some(&encode))
        .unwrap();
    let digest = tree
        .leaf_digest(Leaf::Item(&transfers[1]), Some(&encode))
        .unwrap();
    assert!(tree.verify_proof(&digest, &root, proof.as_bytes()).unwrap());

    let wrong = tree
        .leaf_digest(Leaf::Item(&transfers[3]), Some(&encode))
        .unwrap();
    assert!(!tree.verify_proof(&wrong, &root, proof.as_bytes()).unwrap());
}

#[test]
fn test_malformed_proofs_are_errors() {
    let leaves = numbered_leaves(9);
    let root = merkle_root(&leaves).unwrap();
    let digest = sha512(&leaves[4]);
    let proof = merkle_proof_at(&leaves, 4).unwrap().into_bytes();

    let truncated = &proof[..proof.len() - 1];
    let err = verify_merkle_proof(&digest, &root, truncated).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MalformedProof);

    let mut bad_side = proof.clone();
    bad_side[64] = 7;
    let err = verify_merkle_proof(&digest, &root, &bad_side).unwrap_err();
    assert_eq!(err, SkeinError::InvalidSide { step: 0, side: 7 });

    let mut flipped = proof;
    flipped[3] ^= 0x80;
    assert!(!verify_merkle_proof(&digest, &root, &flipped).unwrap());
}

#[test]
fn test_single_leaf_tree() {
    let leaves = [b"alone".to_vec()];
    let root = merkle_root(&leaves).unwrap();
    assert_eq!(root, sha512(b"alone"));

    let proof = merkle_proof(&leaves, b"alone").unwrap();
    assert!(proof.is_single_leaf());
    assert_eq!(proof.as_bytes(), &[1u8; 65][..]);
    assert!(verify_merkle_proof(&root, &root, proof.as_bytes()).unwrap());
}

#[test]
fn test_empty_tree_is_rejected() {
    let none: Vec<Vec<u8>> = Vec::new();
    assert_eq!(merkle_root(&none), Err(SkeinError::EmptyTree));
    assert_eq!(merkle_proof_at(&none, 0), Err(SkeinError::EmptyTree));
}
