//! zstd codec for arbitrary segment bytes.

use super::{Codec, DEFAULT_ZSTD_LEVEL};
use crate::error::{Error, Result};

/// Single-frame zstd compression of a whole segment.
#[derive(Debug, Clone, Copy)]
pub struct ZstdCodec {
    level: i32,
}

impl ZstdCodec {
    pub fn new(level: i32) -> Self {
        Self { level }
    }
}

impl Default for ZstdCodec {
    fn default() -> Self {
        Self::new(DEFAULT_ZSTD_LEVEL)
    }
}

impl Codec for ZstdCodec {
    fn name(&self) -> &'static str {
        "zstd"
    }

    fn compress(&self, input: &[u8]) -> Result<Vec<u8>> {
        zstd::bulk::compress(input, self.level).map_err(|e| Error::Codec {
            codec: "zstd",
            message: e.to_string(),
        })
    }
}
