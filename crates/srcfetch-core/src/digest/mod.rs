//! Digest algorithms, on-disk digest records and the resolver that
//! materializes them before an artifact is verified.

mod record;
mod resolver;

pub use record::{parse_record, record_line, RecordEntry};
pub use resolver::{DigestResolver, DigestStatus};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Digest algorithms with a matching `<type>sum` coreutils tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum DigestType {
    #[default]
    Md5,
    Sha1,
    Sha224,
    Sha256,
    Sha384,
    Sha512,
}

impl DigestType {
    pub const ALL: [DigestType; 6] = [
        DigestType::Md5,
        DigestType::Sha1,
        DigestType::Sha224,
        DigestType::Sha256,
        DigestType::Sha384,
        DigestType::Sha512,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            DigestType::Md5 => "md5",
            DigestType::Sha1 => "sha1",
            DigestType::Sha224 => "sha224",
            DigestType::Sha256 => "sha256",
            DigestType::Sha384 => "sha384",
            DigestType::Sha512 => "sha512",
        }
    }

    /// Name of the verification tool, e.g. `sha256sum`.
    pub fn tool(self) -> String {
        format!("{}sum", self.as_str())
    }

    /// Length of the lowercase hex digest this algorithm produces.
    pub fn hex_len(self) -> usize {
        match self {
            DigestType::Md5 => 32,
            DigestType::Sha1 => 40,
            DigestType::Sha224 => 56,
            DigestType::Sha256 => 64,
            DigestType::Sha384 => 96,
            DigestType::Sha512 => 128,
        }
    }
}

impl fmt::Display for DigestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DigestType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DigestType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| Error::UnsupportedDigest(s.to_string()))
    }
}

impl TryFrom<String> for DigestType {
    type Error = Error;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<DigestType> for String {
    fn from(t: DigestType) -> Self {
        t.as_str().to_string()
    }
}

/// The command that checks an artifact against its digest record,
/// e.g. `sha256sum -c foo.tar.gz.sha256`. Run with `targetDir` as cwd.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChecksumCommand {
    pub digest_type: DigestType,
    /// Digest record file name, relative to the target directory.
    pub record: String,
}

impl ChecksumCommand {
    /// Parses a command line of the shape `<type>sum -c <record>`.
    pub fn parse(line: &str) -> Option<Self> {
        let mut parts = line.split_whitespace();
        let tool = parts.next()?;
        if parts.next()? != "-c" {
            return None;
        }
        let record = parts.next()?.to_string();
        if parts.next().is_some() {
            return None;
        }
        let digest_type = tool.strip_suffix("sum")?.parse().ok()?;
        Some(Self {
            digest_type,
            record,
        })
    }
}

impl fmt::Display for ChecksumCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -c {}", self.digest_type.tool(), self.record)
    }
}

/// Registry lookup: checksum command for `name` under the given digest type name.
pub fn command_for(digest_type: &str, name: &str) -> Result<ChecksumCommand, Error> {
    let digest_type: DigestType = digest_type.parse()?;
    Ok(ChecksumCommand {
        digest_type,
        record: record_file_name(name, digest_type),
    })
}

/// File name of the digest record for artifact `name`: `{name}.{type}`.
pub fn record_file_name(name: &str, digest_type: DigestType) -> String {
    format!("{}.{}", name, digest_type)
}
