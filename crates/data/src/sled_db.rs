// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use anyhow::{Context, Result};
use sled::Tree;
use std::path::Path;

use crate::{
    sled_utils::{clear_all_caches, get_or_open_db_tree},
    Get, Insert, Remove,
};

pub struct SledDb {
    db: Tree,
}

impl SledDb {
    pub fn new(path: &Path, tree: &str) -> Result<Self> {
        let db = get_or_open_db_tree(path, tree)?;
        Ok(Self { db })
    }

    pub fn close_all_connections() {
        clear_all_caches()
    }

    pub fn insert(&mut self, msg: Insert) -> Result<()> {
        self.db
            .insert(msg.key(), msg.value().to_vec())
            .context("Could not insert data into db")?;
        Ok(())
    }

    /// Block until all pending writes reached disk
    pub fn flush(&self) -> Result<()> {
        self.db.flush().context("Could not flush db")?;
        Ok(())
    }

    pub fn remove(&mut self, msg: Remove) -> Result<()> {
        self.db
            .remove(msg.key())
            .context("Could not remove data from db")?;
        Ok(())
    }

    pub fn get(&self, event: Get) -> Result<Option<Vec<u8>>> {
        let key = event.key();
        let res = self
            .db
            .get(key)
            .with_context(|| format!("Failed to fetch {}", String::from_utf8_lossy(key)))?;

        Ok(res.map(|v| v.to_vec()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn shares_one_connection_per_path() -> Result<()> {
        let temp_dir = tempdir()?;
        let db_path = temp_dir.path().join("shared.db");

        let mut db1 = SledDb::new(&db_path, "datastore")?;
        let mut db2 = SledDb::new(&db_path, "datastore")?;
        db1.insert(Insert::new("//slot", b"one".to_vec()))?;
        assert_eq!(db2.get(Get::new("//slot"))?, Some(b"one".to_vec()));

        db2.insert(Insert::new("//acl", b"two".to_vec()))?;
        assert_eq!(db1.get(Get::new("//acl"))?, Some(b"two".to_vec()));

        let other = SledDb::new(&temp_dir.path().join("other.db"), "datastore")?;
        assert!(other.get(Get::new("//slot"))?.is_none());
        Ok(())
    }

    #[test]
    fn flush_persists_pending_writes() -> Result<()> {
        let temp_dir = tempdir()?;
        let db_path = temp_dir.path().join("durable.db");
        {
            let mut db = SledDb::new(&db_path, "datastore")?;
            db.insert(Insert::new("//k", b"v".to_vec()))?;
            db.flush()?;
        }

        let db = SledDb::new(&db_path, "datastore")?;
        assert_eq!(db.get(Get::new("//k"))?, Some(b"v".to_vec()));
        Ok(())
    }
}
