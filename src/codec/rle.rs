//! Run-length text codec.

use log::warn;

use super::Codec;
use crate::error::Result;

/// LOLS run-length text encoding.
///
/// Alphabetic runs are written as `c` (length 1), `cc` (length 2) or `<n>c`
/// (length 3 and up). Non-alphabetic bytes would make the counts ambiguous, so
/// they are skipped and do not break the surrounding run.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunLengthCodec;

impl Codec for RunLengthCodec {
    fn name(&self) -> &'static str {
        "rle"
    }

    fn compress(&self, input: &[u8]) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(input.len());
        let mut run: Option<(u8, usize)> = None;
        let mut skipped = 0usize;

        for &byte in input {
            if !byte.is_ascii_alphabetic() {
                skipped += 1;
                continue;
            }
            run = match run {
                Some((current, len)) if current == byte => Some((current, len + 1)),
                Some((current, len)) => {
                    emit_run(&mut out, current, len);
                    Some((byte, 1))
                }
                None => Some((byte, 1)),
            };
        }
        if let Some((current, len)) = run {
            emit_run(&mut out, current, len);
        }

        if skipped > 0 {
            warn!("rle: skipped {skipped} non-alphabetic byte(s)");
        }
        Ok(out)
    }

    fn is_textual(&self) -> bool {
        true
    }
}

fn emit_run(out: &mut Vec<u8>, byte: u8, len: usize) {
    match len {
        1 => out.push(byte),
        2 => out.extend_from_slice(&[byte, byte]),
        n => {
            out.extend_from_slice(n.to_string().as_bytes());
            out.push(byte);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rle(input: &str) -> String {
        String::from_utf8(RunLengthCodec.compress(input.as_bytes()).unwrap()).unwrap()
    }

    #[test]
    fn encodes_runs_by_length() {
        assert_eq!(rle("AAAB"), "3AB");
        assert_eq!(rle("AAAABBBCCDAA"), "4A3BCCDAA");
        assert_eq!(rle("abc"), "abc");
        assert_eq!(rle(&"z".repeat(12)), "12z");
    }

    #[test]
    fn skips_non_alphabetic_bytes() {
        assert_eq!(rle("AA A\nA1"), "4A");
        assert_eq!(rle("123 "), "");
        assert_eq!(rle(""), "");
    }

    #[test]
    fn case_sensitive_runs() {
        assert_eq!(rle("aaAA"), "aaAA");
    }
}
