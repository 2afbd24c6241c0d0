use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{DatabaseError, Table, TableStore};

#[derive(Debug, Default)]
pub struct InMemoryTableStore {
    tables: RwLock<HashMap<String, Table>>,
}

impl InMemoryTableStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(self, name: &str, table: Table) -> Self {
        let mut tables = self.tables.into_inner();
        tables.insert(name.to_string(), table);
        Self { tables: RwLock::new(tables) }
    }

    pub async fn contains(&self, name: &str) -> bool {
        self.tables.read().await.contains_key(name)
    }
}

#[async_trait]
impl TableStore for InMemoryTableStore {
    async fn read_all(&self, table: &str) -> Result<Table, DatabaseError> {
        self.tables
            .read()
            .await
            .get(table)
            .cloned()
            .ok_or_else(|| DatabaseError::TableNotFound(table.to_string()))
    }

    async fn overwrite_all(&self, table: &str, contents: &Table) -> Result<(), DatabaseError> {
        self.tables
            .write()
            .await
            .insert(table.to_string(), contents.clone());
        Ok(())
    }
}
