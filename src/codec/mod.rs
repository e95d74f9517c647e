//! Compression primitives applied to a single segment.
//!
//! The orchestration never looks inside a codec: it hands over a byte slice and
//! persists whatever comes back. Every codec is stateless, so one instance can be
//! shared by all thread units, and a worker process can rebuild the same codec
//! from its [`CodecKind`] name.

mod rle;
#[cfg(feature = "zstd")]
mod zstd_codec;

use std::fmt;
use std::str::FromStr;

use crate::error::Result;

pub use rle::RunLengthCodec;
#[cfg(feature = "zstd")]
pub use zstd_codec::ZstdCodec;

pub const DEFAULT_ZSTD_LEVEL: i32 = 3;

/// A deterministic, possibly fallible `bytes -> bytes` transform.
pub trait Codec: Send + Sync {
    fn name(&self) -> &'static str;

    fn compress(&self, input: &[u8]) -> Result<Vec<u8>>;

    /// Whether the output is printable text.
    fn is_textual(&self) -> bool {
        false
    }
}

/// Passes input through unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityCodec;

impl Codec for IdentityCodec {
    fn name(&self) -> &'static str {
        "identity"
    }

    fn compress(&self, input: &[u8]) -> Result<Vec<u8>> {
        Ok(input.to_vec())
    }

    fn is_textual(&self) -> bool {
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CodecKind {
    #[default]
    RunLength,
    #[cfg(feature = "zstd")]
    Zstd,
    Identity,
}

impl CodecKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CodecKind::RunLength => "rle",
            #[cfg(feature = "zstd")]
            CodecKind::Zstd => "zstd",
            CodecKind::Identity => "identity",
        }
    }

    /// Build the codec. `zstd_level` is ignored by the other codecs.
    #[cfg_attr(not(feature = "zstd"), allow(unused_variables))]
    pub fn build(&self, zstd_level: i32) -> Box<dyn Codec> {
        match self {
            CodecKind::RunLength => Box::new(RunLengthCodec),
            #[cfg(feature = "zstd")]
            CodecKind::Zstd => Box::new(ZstdCodec::new(zstd_level)),
            CodecKind::Identity => Box::new(IdentityCodec),
        }
    }
}

impl fmt::Display for CodecKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CodecKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "rle" | "lols" => Ok(CodecKind::RunLength),
            #[cfg(feature = "zstd")]
            "zstd" => Ok(CodecKind::Zstd),
            "identity" => Ok(CodecKind::Identity),
            other => Err(format!("unknown codec: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codec_kind_name_round_trips() {
        for kind in [CodecKind::RunLength, CodecKind::Identity] {
            assert_eq!(kind.as_str().parse::<CodecKind>().unwrap(), kind);
            assert_eq!(kind.build(3).name(), kind.as_str());
        }
        assert!("lz4".parse::<CodecKind>().is_err());
    }

    #[test]
    fn identity_returns_input() -> Result<()> {
        let out = IdentityCodec.compress(b"AAAB")?;
        assert_eq!(out, b"AAAB");
        Ok(())
    }

    #[cfg(feature = "zstd")]
    #[test]
    fn zstd_kind_builds_zstd_codec() {
        let kind: CodecKind = "zstd".parse().unwrap();
        assert_eq!(kind, CodecKind::Zstd);
        assert!(!kind.build(3).is_textual());
    }
}
