//! Sync Repository Contract
//!
//! The account's `sync/` directory is, from this crate's point of view, an
//! opaque key/value store that some other layer replicates across a user's
//! devices — how that replication happens is explicitly out of scope here.
//! [`Repo`] is the seam: account creation and recovery rotation write
//! through it, a host wires up whatever actually syncs the bytes.

use crate::error::WalletResult;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::RwLock;

pub trait Repo: Send + Sync {
    fn get(&self, key: &str) -> WalletResult<Option<Vec<u8>>>;
    fn put(&self, key: &str, value: &[u8]) -> WalletResult<()>;
}

/// Plain-filesystem repo: each key is a filename under `root`. Adequate for
/// a single-process client; a real sync backend replaces this wholesale.
pub struct FsRepo {
    root: PathBuf,
}

impl FsRepo {
    pub fn new(root: impl Into<PathBuf>) -> WalletResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }
}

impl Repo for FsRepo {
    fn get(&self, key: &str) -> WalletResult<Option<Vec<u8>>> {
        match fs::read(self.root.join(key)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn put(&self, key: &str, value: &[u8]) -> WalletResult<()> {
        fs::write(self.root.join(key), value)?;
        Ok(())
    }
}

/// In-memory repo for tests and embedders that don't need persistence.
#[derive(Default)]
pub struct InMemoryRepo {
    entries: RwLock<HashMap<String, Vec<u8>>>,
}

impl InMemoryRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Repo for InMemoryRepo {
    fn get(&self, key: &str) -> WalletResult<Option<Vec<u8>>> {
        Ok(self.entries.read().expect("repo lock poisoned").get(key).cloned())
    }

    fn put(&self, key: &str, value: &[u8]) -> WalletResult<()> {
        self.entries
            .write()
            .expect("repo lock poisoned")
            .insert(key.to_string(), value.to_vec());
        Ok(())
    }
}
