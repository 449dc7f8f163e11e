//! Sequence value type over the `{A, C, G, T, N}` alphabet

use std::fmt;
use std::ops::Range;
use std::str::FromStr;

use crate::error::{Result, SequenceError};

/// Complement of a validated base symbol (`N` is fixed under complement)
#[inline]
fn complement(base: u8) -> u8 {
    match base {
        b'A' => b'T',
        b'T' => b'A',
        b'C' => b'G',
        b'G' => b'C',
        other => other,
    }
}

/// An owned base-call sequence over the `{A, C, G, T, N}` alphabet
///
/// `Seq` is an opaque value type: construction validates the alphabet, and
/// every derived value (slices, reverse complements) is a `Seq` again, so the
/// capability survives sub-ranges. All transforms are pure and return new
/// values.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Seq {
    bytes: Vec<u8>,
}

impl Seq {
    /// Creates a sequence from a byte buffer, validating the alphabet
    ///
    /// # Errors
    ///
    /// Returns [`SequenceError::InvalidSymbol`] on the first byte outside
    /// `{A, C, G, T, N}`.
    pub fn new<B: Into<Vec<u8>>>(bytes: B) -> Result<Self> {
        let bytes = bytes.into();
        for &b in &bytes {
            match b {
                b'A' | b'C' | b'G' | b'T' | b'N' => {}
                invalid => return Err(SequenceError::InvalidSymbol(invalid as char).into()),
            }
        }
        Ok(Self { bytes })
    }

    /// Creates a sequence from bytes already known to be within the alphabet
    ///
    /// Only the decode path uses this, which emits validated symbols by
    /// construction.
    pub(crate) fn from_validated(bytes: Vec<u8>) -> Self {
        debug_assert!(bytes
            .iter()
            .all(|b| matches!(b, b'A' | b'C' | b'G' | b'T' | b'N')));
        Self { bytes }
    }

    /// Returns the number of bases in the sequence
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns true if the sequence holds no bases
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Returns the sequence as raw ASCII bytes
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Returns the sequence as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        std::str::from_utf8(&self.bytes).expect("sequence bytes are validated ASCII")
    }

    /// Returns the reverse complement as a new sequence
    ///
    /// Maps A to T and C to G (and vice versa), leaves N unchanged under
    /// complement, and reverses the base order. The original is unmodified.
    #[must_use]
    pub fn reverse_complement(&self) -> Self {
        let bytes = self.bytes.iter().rev().map(|&b| complement(b)).collect();
        Self { bytes }
    }

    /// Returns a sub-range of the sequence as a new sequence
    ///
    /// # Panics
    ///
    /// Panics if the range is out of bounds, matching slice indexing.
    #[must_use]
    pub fn slice(&self, range: Range<usize>) -> Self {
        Self {
            bytes: self.bytes[range].to_vec(),
        }
    }
}

impl FromStr for Seq {
    type Err = crate::error::Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s.as_bytes().to_vec())
    }
}

impl AsRef<[u8]> for Seq {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

impl fmt::Display for Seq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, SequenceError};

    #[test]
    fn test_complement_pairs() {
        let seq: Seq = "A".parse().unwrap();
        assert_eq!(seq.reverse_complement().as_str(), "T");
        let seq: Seq = "C".parse().unwrap();
        assert_eq!(seq.reverse_complement().as_str(), "G");
    }

    #[test]
    fn test_reverse_complement_palindrome() {
        // complement("ACGT") == "TGCA", reversed == "ACGT"
        let seq: Seq = "ACGT".parse().unwrap();
        assert_eq!(seq.reverse_complement().as_str(), "ACGT");
    }

    #[test]
    fn test_reverse_complement() {
        let seq: Seq = "AACCGGTT".parse().unwrap();
        assert_eq!(seq.reverse_complement().as_str(), "AACCGGTT");
        let seq: Seq = "ATGCAACG".parse().unwrap();
        assert_eq!(seq.reverse_complement().as_str(), "CGTTGCAT");
    }

    #[test]
    fn test_n_fixed_under_complement_but_reversed() {
        let seq: Seq = "ACGNT".parse().unwrap();
        assert_eq!(seq.reverse_complement().as_str(), "ANCGT");
    }

    #[test]
    fn test_double_reverse_complement_roundtrip() {
        let seq: Seq = "GATTACAGATTACA".parse().unwrap();
        assert_eq!(seq.reverse_complement().reverse_complement(), seq);
    }

    #[test]
    fn test_original_unmodified() {
        let seq: Seq = "ACGT".parse().unwrap();
        let _rc = seq.reverse_complement();
        assert_eq!(seq.as_str(), "ACGT");
    }

    #[test]
    fn test_slice_preserves_type() {
        let seq: Seq = "NACGT".parse().unwrap();
        let sub = seq.slice(1..5);
        assert_eq!(sub.as_str(), "ACGT");
        assert_eq!(sub.reverse_complement().as_str(), "ACGT");
    }

    #[test]
    fn test_invalid_symbol() {
        let err = Seq::new(b"ACGZ".to_vec()).unwrap_err();
        assert!(matches!(
            err,
            Error::SequenceError(SequenceError::InvalidSymbol('Z'))
        ));
    }

    #[test]
    fn test_display() {
        let seq: Seq = "ACGTN".parse().unwrap();
        assert_eq!(seq.to_string(), "ACGTN");
        assert_eq!(seq.len(), 5);
        assert!(!seq.is_empty());
    }
}
