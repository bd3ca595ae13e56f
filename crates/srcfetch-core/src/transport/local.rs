//! Local-copy transport for `file://` sources.

use std::fs;
use std::io;
use std::path::Path;

use super::LocalCopier;
use crate::storage;

/// Copies through a `.part` temp file so `dest` appears only when complete.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsCopier;

impl LocalCopier for FsCopier {
    fn copy(&self, source: &Path, dest: &Path) -> io::Result<()> {
        let temp = storage::temp_path(dest);
        let copied = fs::copy(source, &temp).and_then(|_| storage::finalize(&temp, dest));
        if copied.is_err() {
            storage::discard(&temp);
        }
        copied
    }
}
