//! Kademlia XOR distance.

use std::cmp::Ordering;
use std::fmt;

use crate::domain::{DiscoveryError, PeerId};

/// XOR of two peer ids, read as a big-endian unsigned integer.
///
/// Only distances of the same width are ever compared (both sides are
/// measured against the same target), so the derived lexicographic order on
/// the bytes is the numeric order.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Distance(Box<[u8]>);

impl Distance {
    /// Wrap raw big-endian distance bytes.
    pub fn from_be_bytes(bytes: impl Into<Box<[u8]>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|b| *b == 0)
    }

    /// Number of leading zero bits (the shared prefix length).
    pub fn leading_zeros(&self) -> u32 {
        let mut zeros = 0;
        for byte in self.0.iter() {
            if *byte == 0 {
                zeros += 8;
            } else {
                return zeros + byte.leading_zeros();
            }
        }
        zeros
    }

    /// Index of the highest set bit, counted from the least significant bit.
    ///
    /// This is the k-bucket a peer at this distance belongs to. `None` for a
    /// zero distance (the id itself).
    pub fn bucket_index(&self) -> Option<usize> {
        let bits = self.0.len() * 8;
        let zeros = self.leading_zeros() as usize;
        (zeros < bits).then(|| bits - 1 - zeros)
    }

    /// Low 128 bits as an integer. Handy for logs and tests.
    pub fn low_u128(&self) -> u128 {
        let start = self.0.len().saturating_sub(16);
        self.0[start..]
            .iter()
            .fold(0u128, |acc, b| (acc << 8) | u128::from(*b))
    }
}

impl Ord for Distance {
    fn cmp(&self, other: &Self) -> Ordering {
        // shorter widths sort first so mixed widths still have a total order
        self.0
            .len()
            .cmp(&other.0.len())
            .then_with(|| self.0.cmp(&other.0))
    }
}

impl PartialOrd for Distance {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Debug for Distance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Distance(")?;
        for byte in self.0.iter() {
            write!(f, "{:02x}", byte)?;
        }
        write!(f, ")")
    }
}

/// Calculate the XOR distance between two peer ids.
///
/// Symmetric, and zero exactly when `a == b`. Ids of different widths are a
/// programming error and fail with [`DiscoveryError::InvalidIdWidth`].
pub fn xor_distance(a: &PeerId, b: &PeerId) -> Result<Distance, DiscoveryError> {
    ensure_same_width(a, b)?;
    let bytes: Box<[u8]> = a
        .as_bytes()
        .iter()
        .zip(b.as_bytes())
        .map(|(x, y)| x ^ y)
        .collect();
    Ok(Distance(bytes))
}

/// Fail with `InvalidIdWidth` unless `candidate` has the same width as `reference`.
pub fn ensure_same_width(reference: &PeerId, candidate: &PeerId) -> Result<(), DiscoveryError> {
    if reference.width() == candidate.width() {
        Ok(())
    } else {
        Err(DiscoveryError::InvalidIdWidth {
            expected: reference.width(),
            actual: candidate.width(),
        })
    }
}

/// Bucket index of `remote` relative to `local`, `None` when they are equal.
#[inline]
pub fn bucket_index(local: &PeerId, remote: &PeerId) -> Result<Option<usize>, DiscoveryError> {
    Ok(xor_distance(local, remote)?.bucket_index())
}
