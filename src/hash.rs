//! Streaming content digests for chain-of-custody
//!
//! Both digests are computed in a single pass with a bounded buffer, so
//! memory stays constant regardless of file size.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use sha2::{Digest, Sha256, Sha512};

use crate::error::Result;

/// The two digests carried by every document handle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigestPair {
    pub sha256: String,
    pub sha512: String,
}

/// Digests a file with chunked reads of `chunk_size` bytes
pub fn stream_digests(path: &Path, chunk_size: usize) -> Result<(DigestPair, u64)> {
    let mut file = File::open(path)?;
    let mut sha256 = Sha256::new();
    let mut sha512 = Sha512::new();
    let mut buf = vec![0u8; chunk_size];
    let mut total: u64 = 0;

    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        sha256.update(&buf[..n]);
        sha512.update(&buf[..n]);
        total += n as u64;
    }

    let pair = DigestPair {
        sha256: hex::encode(sha256.finalize()),
        sha512: hex::encode(sha512.finalize()),
    };
    Ok((pair, total))
}

/// Digests an in-memory buffer; used by tests and fixtures
pub fn digest_bytes(data: &[u8]) -> DigestPair {
    DigestPair {
        sha256: hex::encode(Sha256::digest(data)),
        sha512: hex::encode(Sha512::digest(data)),
    }
}
