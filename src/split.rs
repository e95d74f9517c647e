//! Fixed-count contiguous partitioning of the input buffer.
//!
//! With `base = len / n` and `rem = len % n`, the first `rem` segments carry
//! `base + 1` bytes and the rest carry `base`. Segment `i` therefore starts at
//! `i * base + min(i, rem)`.

use crate::error::{Error, Result};

/// One owned, contiguous slice of the input, assigned to exactly one unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub index: usize,
    pub data: Vec<u8>,
}

impl Segment {
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Check a caller-supplied part count against the input length.
pub fn validate_parts(parts: i64, len: usize) -> Result<usize> {
    match usize::try_from(parts) {
        Ok(n) if n >= 1 && n <= len => Ok(n),
        _ => Err(Error::InvalidPartition { parts, len }),
    }
}

/// Byte range of segment `index` when `len` bytes are split into `parts`.
pub fn segment_bounds(len: usize, parts: usize, index: usize) -> (usize, usize) {
    let base = len / parts;
    let rem = len % parts;
    let start = index * base + index.min(rem);
    let end = start + base + usize::from(index < rem);
    (start, end)
}

pub fn split(buffer: &[u8], parts: usize) -> Result<Vec<Segment>> {
    if parts == 0 || parts > buffer.len() {
        return Err(Error::InvalidPartition {
            parts: i64::try_from(parts).unwrap_or(i64::MAX),
            len: buffer.len(),
        });
    }

    Ok((0..parts)
        .map(|index| {
            let (start, end) = segment_bounds(buffer.len(), parts, index);
            Segment {
                index,
                data: buffer[start..end].to_vec(),
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(segments: &[Segment]) -> Vec<&str> {
        segments
            .iter()
            .map(|s| std::str::from_utf8(&s.data).unwrap())
            .collect()
    }

    #[test]
    fn even_split() -> Result<()> {
        let segments = split(b"AAAABBBCCDAA", 3)?;
        assert_eq!(texts(&segments), vec!["AAAA", "BBBC", "CDAA"]);
        assert_eq!(
            segments.iter().map(|s| s.index).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );
        Ok(())
    }

    #[test]
    fn remainder_goes_to_earlier_segments() -> Result<()> {
        let segments = split(b"abcdefghij", 3)?;
        assert_eq!(texts(&segments), vec!["abcd", "efg", "hij"]);

        let segments = split(b"abcdefghijk", 4)?;
        assert_eq!(texts(&segments), vec!["abc", "def", "ghi", "jk"]);
        Ok(())
    }

    #[test]
    fn concatenation_reproduces_buffer() -> Result<()> {
        let buffer: Vec<u8> = (0..97u8).map(|b| b'a' + b % 26).collect();
        for parts in 1..=buffer.len() {
            let segments = split(&buffer, parts)?;
            assert_eq!(segments.len(), parts);
            assert!(segments.iter().all(|s| !s.is_empty()));
            let joined: Vec<u8> = segments.into_iter().flat_map(|s| s.data).collect();
            assert_eq!(joined, buffer, "parts = {parts}");
        }
        Ok(())
    }

    #[test]
    fn one_byte_per_part_at_the_limit() -> Result<()> {
        let segments = split(b"AAAB", 4)?;
        assert!(segments.iter().all(|s| s.len() == 1));
        Ok(())
    }

    #[test]
    fn rejects_too_many_parts() {
        let err = split(b"AAAB", 5).unwrap_err();
        assert!(matches!(err, Error::InvalidPartition { parts: 5, len: 4 }));
        assert!(split(b"", 1).is_err());
        assert!(split(b"AAAB", 0).is_err());
    }

    #[test]
    fn validate_parts_rejects_non_positive() {
        assert!(matches!(
            validate_parts(0, 10),
            Err(Error::InvalidPartition { parts: 0, .. })
        ));
        assert!(matches!(
            validate_parts(-3, 10),
            Err(Error::InvalidPartition { parts: -3, .. })
        ));
        assert!(validate_parts(11, 10).is_err());
        assert_eq!(validate_parts(10, 10).unwrap(), 10);
        assert_eq!(validate_parts(1, 1).unwrap(), 1);
    }
}
