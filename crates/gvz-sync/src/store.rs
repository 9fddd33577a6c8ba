//! In-memory store of loaded databases
//!
//! Owned by one gateway. Readers get clones; only gateway completion paths
//! write.

use gvz_schema::Database;
use parking_lot::RwLock;

#[derive(Debug, Default)]
pub struct DatabaseStore {
    databases: RwLock<Vec<Database>>,
}

impl DatabaseStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every loaded database, in load order
    pub fn all(&self) -> Vec<Database> {
        self.databases.read().clone()
    }

    pub fn get(&self, id: &str) -> Option<Database> {
        self.databases.read().iter().find(|db| db.id() == id).cloned()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.databases.read().iter().any(|db| db.id() == id)
    }

    pub fn len(&self) -> usize {
        self.databases.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.databases.read().is_empty()
    }

    /// Insert, replacing any database with the same id
    pub fn upsert(&self, database: Database) {
        let mut databases = self.databases.write();
        databases.retain(|db| db.id() != database.id());
        databases.push(database);
    }

    /// Replace the whole collection
    pub fn replace_all(&self, databases: Vec<Database>) {
        *self.databases.write() = databases;
    }

    pub fn remove(&self, id: &str) -> Option<Database> {
        let mut databases = self.databases.write();
        let position = databases.iter().position(|db| db.id() == id)?;
        Some(databases.remove(position))
    }
}
