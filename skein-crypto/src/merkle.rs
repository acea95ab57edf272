use std::borrow::Cow;

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};
use skein_types::constants::{
    DIGEST_BYTES, PROOF_STEP_BYTES, SIDE_LEFT, SIDE_RIGHT, SINGLE_LEAF_PROOF_BYTE,
};
use skein_types::error::{SkeinError, SkeinResult};
use skein_types::primitives::Digest;

use crate::primitives::{Primitives, Sha512Primitives};
use crate::scratch::MerkleScratch;

/// Converts a non-byte leaf into the bytes that get hashed.
pub type Serializer<'s, T> = &'s dyn Fn(&T) -> Vec<u8>;

/// One item contributing to a hash tree.
///
/// Raw byte leaves are hashed as-is; `Item` leaves need a [`Serializer`].
#[derive(Debug)]
pub enum Leaf<'a, T: ?Sized> {
    Bytes(&'a [u8]),
    Item(&'a T),
}

impl<T: ?Sized> Clone for Leaf<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: ?Sized> Copy for Leaf<'_, T> {}

impl<'a, T: ?Sized> From<&'a [u8]> for Leaf<'a, T> {
    fn from(bytes: &'a [u8]) -> Self {
        Leaf::Bytes(bytes)
    }
}

impl<'a, T: ?Sized> Leaf<'a, T> {
    /// Resolve the bytes that represent this leaf.
    fn serialize(
        &self,
        index: usize,
        serializer: Option<Serializer<'_, T>>,
    ) -> SkeinResult<Cow<'a, [u8]>> {
        match (*self, serializer) {
            (Leaf::Bytes(bytes), _) => Ok(Cow::Borrowed(bytes)),
            (Leaf::Item(item), Some(serialize)) => Ok(Cow::Owned(serialize(item))),
            (Leaf::Item(_), None) => Err(SkeinError::MissingSerializer { index }),
        }
    }
}

/// How the leaf to prove is identified.
pub enum ProofTarget<'a, T: ?Sized> {
    /// First leaf whose serialized bytes equal this element's.
    Element(Leaf<'a, T>),
    /// Leaf at a known position. No search is performed.
    Index(usize),
    /// First leaf whose serialized bytes satisfy the predicate.
    Matching(&'a dyn Fn(&[u8]) -> bool),
}

/// Which side of the tracked node a proof sibling sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    /// Decode a side byte. Anything other than 0 or 1 is `None`.
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            SIDE_LEFT => Some(Side::Left),
            SIDE_RIGHT => Some(Side::Right),
            _ => None,
        }
    }

    /// The side byte written into a proof record.
    pub fn to_byte(self) -> u8 {
        match self {
            Side::Left => SIDE_LEFT,
            Side::Right => SIDE_RIGHT,
        }
    }
}

/// A decoded proof step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProofStep {
    pub sibling: Digest,
    pub side: Side,
}

/// An inclusion proof in its wire encoding: `(digest, side)` records of 65
/// bytes each, ordered from the leaf up to the root.
///
/// A tree with a single leaf has no siblings; its proof is one record of all
/// `1` bytes instead.
///
/// Every way of building one, decoders included, checks the encoding.
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, Serialize, Deserialize)]
#[serde(try_from = "RawProof")]
pub struct MerkleProof {
    bytes: Vec<u8>,
}

#[derive(Deserialize)]
struct RawProof {
    bytes: Vec<u8>,
}

impl TryFrom<RawProof> for MerkleProof {
    type Error = SkeinError;

    fn try_from(raw: RawProof) -> SkeinResult<Self> {
        Self::from_bytes(raw.bytes)
    }
}

impl BorshDeserialize for MerkleProof {
    fn deserialize_reader<R: borsh::io::Read>(reader: &mut R) -> borsh::io::Result<Self> {
        let bytes = Vec::<u8>::deserialize_reader(reader)?;
        Self::from_bytes(bytes).map_err(|e| {
            borsh::io::Error::new(borsh::io::ErrorKind::InvalidData, e.to_string())
        })
    }
}

impl MerkleProof {
    /// The proof of the only leaf of a one-leaf tree.
    pub fn single_leaf() -> Self {
        Self {
            bytes: vec![SINGLE_LEAF_PROOF_BYTE; PROOF_STEP_BYTES],
        }
    }

    /// Wrap an encoded proof, checking its structure.
    pub fn from_bytes(bytes: Vec<u8>) -> SkeinResult<Self> {
        check_proof(&bytes)?;
        Ok(Self { bytes })
    }

    /// Parse a hex-encoded proof.
    pub fn from_hex(s: &str) -> SkeinResult<Self> {
        let bytes = hex::decode(s).map_err(|e| SkeinError::InvalidEncoding {
            reason: e.to_string(),
        })?;
        Self::from_bytes(bytes)
    }

    /// Lowercase hex of the wire encoding.
    pub fn to_hex(&self) -> String {
        hex::encode(&self.bytes)
    }

    /// The wire encoding.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Consume the proof, returning its wire encoding.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Whether this is the all-ones proof of a one-leaf tree.
    pub fn is_single_leaf(&self) -> bool {
        is_single_leaf_proof(&self.bytes)
    }

    /// Number of sibling steps. Zero for the single-leaf proof.
    pub fn len(&self) -> usize {
        if self.is_single_leaf() {
            0
        } else {
            self.bytes.len() / PROOF_STEP_BYTES
        }
    }

    /// True when there are no sibling steps to replay.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate over the decoded steps, leaf first.
    pub fn steps(&self) -> impl Iterator<Item = ProofStep> + '_ {
        let body: &[u8] = if self.is_single_leaf() {
            &[]
        } else {
            &self.bytes
        };
        body.chunks_exact(PROOF_STEP_BYTES).filter_map(|record| {
            Side::from_byte(record[DIGEST_BYTES]).map(|side| ProofStep {
                sibling: sibling_of(record),
                side,
            })
        })
    }

    fn push(&mut self, sibling: &Digest, side: Side) {
        self.bytes.extend_from_slice(sibling);
        self.bytes.push(side.to_byte());
    }
}

impl AsRef<[u8]> for MerkleProof {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

/// Binary hash-tree engine.
///
/// Stateless: every call builds its levels from the given leaves and throws
/// them away. Pairs are hashed as `hash(left ‖ right)`; a level with an odd
/// number of nodes pairs its last node with a copy of itself.
#[derive(Debug, Clone, Default)]
pub struct HashTree<P = Sha512Primitives> {
    primitives: P,
}

impl HashTree {
    /// Engine hashing with SHA-512.
    pub fn new() -> Self {
        Self::with_primitives(Sha512Primitives)
    }
}

impl<P: Primitives> HashTree<P> {
    /// Engine hashing through the given provider.
    pub fn with_primitives(primitives: P) -> Self {
        Self { primitives }
    }

    /// The provider this engine hashes with.
    pub fn primitives(&self) -> &P {
        &self.primitives
    }

    /// Digest of one leaf: `hash(serialize(leaf))`.
    pub fn leaf_digest<T: ?Sized>(
        &self,
        leaf: Leaf<'_, T>,
        serializer: Option<Serializer<'_, T>>,
    ) -> SkeinResult<Digest> {
        let bytes = leaf.serialize(0, serializer)?;
        self.primitives.hash(&bytes)
    }

    /// Compute the root of the tree over `leaves`.
    pub fn root<T: ?Sized>(
        &self,
        leaves: &[Leaf<'_, T>],
        serializer: Option<Serializer<'_, T>>,
    ) -> SkeinResult<Digest> {
        let mut scratch = MerkleScratch::for_leaves(leaves.len());
        self.root_with_scratch(leaves, serializer, &mut scratch)
    }

    /// [`HashTree::root`] using caller-provided working memory.
    pub fn root_with_scratch<T: ?Sized>(
        &self,
        leaves: &[Leaf<'_, T>],
        serializer: Option<Serializer<'_, T>>,
        scratch: &mut MerkleScratch,
    ) -> SkeinResult<Digest> {
        if leaves.is_empty() {
            return Err(SkeinError::EmptyTree);
        }
        tracing::debug!(leaves = leaves.len(), "computing merkle root");

        let level = scratch.reset(leaves.len());
        for (index, leaf) in leaves.iter().enumerate() {
            let bytes = leaf.serialize(index, serializer)?;
            level.push(self.primitives.hash(&bytes)?);
        }
        self.fold(level, None)
    }

    /// Build the inclusion proof of `target` in the tree over `leaves`.
    pub fn proof<T: ?Sized>(
        &self,
        leaves: &[Leaf<'_, T>],
        target: ProofTarget<'_, T>,
        serializer: Option<Serializer<'_, T>>,
    ) -> SkeinResult<MerkleProof> {
        let mut scratch = MerkleScratch::for_leaves(leaves.len());
        self.proof_with_scratch(leaves, target, serializer, &mut scratch)
    }

    /// [`HashTree::proof`] using caller-provided working memory.
    pub fn proof_with_scratch<T: ?Sized>(
        &self,
        leaves: &[Leaf<'_, T>],
        target: ProofTarget<'_, T>,
        serializer: Option<Serializer<'_, T>>,
        scratch: &mut MerkleScratch,
    ) -> SkeinResult<MerkleProof> {
        if leaves.is_empty() {
            return Err(SkeinError::EmptyTree);
        }

        let wanted = match &target {
            ProofTarget::Element(element) => Some(element.serialize(0, serializer)?),
            _ => None,
        };

        let level = scratch.reset(leaves.len());
        let mut position = match target {
            ProofTarget::Index(index) if index >= leaves.len() => {
                return Err(SkeinError::IndexOutOfRange {
                    index,
                    len: leaves.len(),
                });
            }
            ProofTarget::Index(index) => Some(index),
            _ => None,
        };

        for (index, leaf) in leaves.iter().enumerate() {
            let bytes = leaf.serialize(index, serializer)?;
            if position.is_none() {
                let hit = match (&target, &wanted) {
                    (ProofTarget::Element(_), Some(wanted)) => *bytes == **wanted,
                    (ProofTarget::Matching(predicate), _) => predicate(&bytes[..]),
                    _ => false,
                };
                if hit {
                    position = Some(index);
                }
            }
            // A lone leaf never needs hashing: its proof is fixed.
            if leaves.len() > 1 {
                level.push(self.primitives.hash(&bytes)?);
            }
        }

        let position = position.ok_or(SkeinError::ElementNotFound)?;
        if leaves.len() == 1 {
            return Ok(MerkleProof::single_leaf());
        }

        tracing::debug!(
            leaves = leaves.len(),
            position,
            "building merkle proof"
        );

        let mut proof = MerkleProof {
            bytes: Vec::with_capacity(proof_capacity(leaves.len())),
        };
        self.fold(level, Some((position, &mut proof)))?;
        Ok(proof)
    }

    /// Replay `proof` from `leaf_digest` and return the root it leads to.
    pub fn root_from_proof(&self, leaf_digest: &Digest, proof: &[u8]) -> SkeinResult<Digest> {
        let steps = match check_proof(proof)? {
            ProofShape::SingleLeaf => return Ok(*leaf_digest),
            ProofShape::Steps(steps) => steps,
        };
        tracing::trace!(steps, "replaying merkle proof");

        let mut acc = *leaf_digest;
        for record in proof.chunks_exact(PROOF_STEP_BYTES) {
            let sibling = sibling_of(record);
            acc = if record[DIGEST_BYTES] == SIDE_LEFT {
                self.primitives.hash_pair(&sibling, &acc)?
            } else {
                self.primitives.hash_pair(&acc, &sibling)?
            };
        }
        Ok(acc)
    }

    /// Check that `proof` links `leaf_digest` to `root`.
    ///
    /// # Errors
    /// A proof that cannot be decoded is an error; a well-formed proof that
    /// leads elsewhere is `Ok(false)`.
    pub fn verify_proof(
        &self,
        leaf_digest: &Digest,
        root: &Digest,
        proof: &[u8],
    ) -> SkeinResult<bool> {
        let computed = self.root_from_proof(leaf_digest, proof)?;
        Ok(computed == *root)
    }

    /// Fold a level of digests into the root. When `track` is given, record
    /// the sibling of the tracked node at each level into the proof.
    fn fold(
        &self,
        level: &mut Vec<Digest>,
        mut track: Option<(usize, &mut MerkleProof)>,
    ) -> SkeinResult<Digest> {
        let mut height = 0usize;
        while level.len() > 1 {
            let width = level.len();
            let mut next = 0;
            for i in (0..width).step_by(2) {
                let left = level[i];
                let paired = i + 1 < width;
                let right = if paired { level[i + 1] } else { left };

                if let Some((position, proof)) = track.as_mut() {
                    if *position == i {
                        // An unpaired node is its own sibling, recorded on the left.
                        let side = if paired { Side::Right } else { Side::Left };
                        proof.push(&right, side);
                    } else if *position == i + 1 {
                        proof.push(&left, Side::Left);
                    }
                }

                level[next] = self.primitives.hash_pair(&left, &right)?;
                next += 1;
            }
            level.truncate(next);
            if let Some((position, _)) = track.as_mut() {
                *position /= 2;
            }
            height += 1;
            tracing::trace!(height, width = next, "folded merkle level");
        }
        Ok(level[0])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ProofShape {
    SingleLeaf,
    Steps(usize),
}

/// Validate the encoding of a proof buffer.
fn check_proof(proof: &[u8]) -> SkeinResult<ProofShape> {
    if is_single_leaf_proof(proof) {
        return Ok(ProofShape::SingleLeaf);
    }
    if proof.len() % PROOF_STEP_BYTES != 0 {
        return Err(SkeinError::ProofLength {
            len: proof.len(),
            step: PROOF_STEP_BYTES,
        });
    }
    for (step, record) in proof.chunks_exact(PROOF_STEP_BYTES).enumerate() {
        let side = record[DIGEST_BYTES];
        if Side::from_byte(side).is_none() {
            return Err(SkeinError::InvalidSide { step, side });
        }
    }
    Ok(ProofShape::Steps(proof.len() / PROOF_STEP_BYTES))
}

fn is_single_leaf_proof(proof: &[u8]) -> bool {
    proof.len() == PROOF_STEP_BYTES && proof.iter().all(|&b| b == SINGLE_LEAF_PROOF_BYTE)
}

fn sibling_of(record: &[u8]) -> Digest {
    let mut sibling = [0u8; DIGEST_BYTES];
    sibling.copy_from_slice(&record[..DIGEST_BYTES]);
    sibling
}

/// Proof bytes for a tree of `leaves` leaves: one record per level.
fn proof_capacity(leaves: usize) -> usize {
    let mut levels = 0;
    let mut width = leaves;
    while width > 1 {
        width = width.div_ceil(2);
        levels += 1;
    }
    levels * PROOF_STEP_BYTES
}

// ─── Byte-leaf shortcuts ─────────────────────────────────────────────────────

fn byte_leaves<B: AsRef<[u8]>>(leaves: &[B]) -> Vec<Leaf<'_, [u8]>> {
    leaves.iter().map(|b| Leaf::Bytes(b.as_ref())).collect()
}

/// Merkle root over raw byte leaves, hashed with SHA-512.
pub fn merkle_root<B: AsRef<[u8]>>(leaves: &[B]) -> SkeinResult<Digest> {
    HashTree::new().root(&byte_leaves(leaves), None)
}

/// Proof for the first leaf equal to `element`.
pub fn merkle_proof<B: AsRef<[u8]>>(leaves: &[B], element: &[u8]) -> SkeinResult<MerkleProof> {
    HashTree::new().proof(
        &byte_leaves(leaves),
        ProofTarget::Element(Leaf::Bytes(element)),
        None,
    )
}

/// Proof for the leaf at `index`.
pub fn merkle_proof_at<B: AsRef<[u8]>>(leaves: &[B], index: usize) -> SkeinResult<MerkleProof> {
    HashTree::new().proof(&byte_leaves(leaves), ProofTarget::Index(index), None)
}

/// Root reached by replaying `proof` from `leaf_digest`.
pub fn merkle_root_from_proof(leaf_digest: &Digest, proof: &[u8]) -> SkeinResult<Digest> {
    HashTree::new().root_from_proof(leaf_digest, proof)
}

/// Verify a proof against a root.
pub fn verify_merkle_proof(leaf_digest: &Digest, root: &Digest, proof: &[u8]) -> SkeinResult<bool> {
    HashTree::new().verify_proof(leaf_digest, root, proof)
}
