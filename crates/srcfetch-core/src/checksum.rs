//! In-process file hashing for the sha2 family.
//!
//! md5 and sha1 are not computed here; their verification always goes
//! through the system `<type>sum` tool.

use sha2::{Digest, Sha224, Sha256, Sha384, Sha512};
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use crate::digest::DigestType;

const BUF_SIZE: usize = 64 * 1024;

/// True when [`hex_digest_path`] can hash this type in process.
pub fn supports(digest_type: DigestType) -> bool {
    !matches!(digest_type, DigestType::Md5 | DigestType::Sha1)
}

/// Lowercase hex digest of the file at `path`, or `None` for types this
/// module does not compute. Reads in chunks to keep memory bounded.
pub fn hex_digest_path(digest_type: DigestType, path: &Path) -> io::Result<Option<String>> {
    let digest = match digest_type {
        DigestType::Sha224 => hash_file::<Sha224>(path)?,
        DigestType::Sha256 => hash_file::<Sha256>(path)?,
        DigestType::Sha384 => hash_file::<Sha384>(path)?,
        DigestType::Sha512 => hash_file::<Sha512>(path)?,
        DigestType::Md5 | DigestType::Sha1 => return Ok(None),
    };
    Ok(Some(digest))
}

fn hash_file<D: Digest>(path: &Path) -> io::Result<String> {
    let mut f = File::open(path)?;
    let mut hasher = D::new();
    let mut buf = vec![0u8; BUF_SIZE];
    loop {
        let n = f.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}
