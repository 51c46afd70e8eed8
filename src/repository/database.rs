use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous},
    Pool, QueryBuilder, Row, Sqlite, Transaction,
};
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::CacheError;
use crate::model::{NodeKind, TreeNode};

use super::store::TreeMeta;

/// Bumped whenever the table layout changes; older artifacts are rebuilt
const SCHEMA_VERSION: &str = "1";

/// A flattened tree node for database storage (zero-copy friendly)
#[derive(Debug, Clone)]
pub struct NodeRecord<'a> {
    pub id: i64,
    pub parent_id: Option<i64>,
    pub name: Cow<'a, str>,
    pub is_dir: bool,
    /// Bit-cast from `u64`: SQLite integers are signed, sizes above
    /// `i64::MAX` are stored negative and cast back on load
    pub size: i64,
    pub file_count: i64,
}

impl<'a> NodeRecord<'a> {
    /// Flatten a tree in pre-order: every parent id is lower than its children's ids
    pub fn flatten(root: &'a TreeNode) -> Vec<NodeRecord<'a>> {
        let mut records = Vec::new();
        let mut stack: Vec<(&TreeNode, Option<i64>)> = vec![(root, None)];

        while let Some((node, parent_id)) = stack.pop() {
            let id = records.len() as i64;
            records.push(NodeRecord {
                id,
                parent_id,
                name: Cow::Borrowed(node.name.as_str()),
                is_dir: node.is_dir(),
                size: node.size as i64,
                file_count: node.file_count as i64,
            });
            if let Some(children) = node.children() {
                for child in children.values() {
                    stack.push((child, Some(id)));
                }
            }
        }

        records
    }
}

/// Database abstraction for the SQLite cache artifact
pub struct Database {
    pool: Pool<Sqlite>,
    path: PathBuf,
}

impl Database {
    /// Open (creating if needed) a database file for writing
    pub async fn create(db_path: &Path) -> Result<Self, CacheError> {
        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Delete)
            .synchronous(SqliteSynchronous::Normal)
            .pragma("temp_store", "MEMORY");
        Self::connect(options, db_path).await
    }

    /// Open an existing database file without ever modifying it
    pub async fn open_read_only(db_path: &Path) -> Result<Self, CacheError> {
        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .read_only(true)
            .create_if_missing(false);
        Self::connect(options, db_path).await
    }

    /// In-memory database (tests, benchmarks)
    pub async fn in_memory() -> Result<Self, CacheError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        Self::connect(options, Path::new(":memory:")).await
    }

    async fn connect(options: SqliteConnectOptions, db_path: &Path) -> Result<Self, CacheError> {
        // A single long-lived connection: an in-memory database lives and dies with it
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        Ok(Self { pool, path: db_path.to_path_buf() })
    }

    /// Close the pool, flushing the file to disk
    pub async fn close(self) {
        self.pool.close().await;
    }

    /// Initialize database schema, returns true if schema was rebuilt
    pub async fn init_schema(&self) -> Result<bool, CacheError> {
        // Create metadata table first (needed to check version)
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS metadata (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )"
        ).execute(&self.pool).await?;

        let stored_version = self.get_metadata("schema_version").await;
        let needs_rebuild = stored_version.as_deref() != Some(SCHEMA_VERSION);

        if needs_rebuild {
            sqlx::query("DROP TABLE IF EXISTS nodes").execute(&self.pool).await?;
            sqlx::query("DELETE FROM metadata").execute(&self.pool).await?;
        }

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS nodes (
                id INTEGER PRIMARY KEY,
                parent_id INTEGER,
                name TEXT NOT NULL,
                is_dir INTEGER NOT NULL,
                size INTEGER NOT NULL,
                file_count INTEGER NOT NULL
            )"
        ).execute(&self.pool).await?;

        if needs_rebuild {
            self.set_metadata("schema_version", SCHEMA_VERSION).await?;
        }

        Ok(needs_rebuild)
    }

    /// Get metadata value by key
    pub async fn get_metadata(&self, key: &str) -> Option<String> {
        sqlx::query("SELECT value FROM metadata WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .ok()
            .flatten()
            .map(|row| row.get("value"))
    }

    /// Set metadata value
    pub async fn set_metadata(&self, key: &str, value: &str) -> Result<(), CacheError> {
        sqlx::query("INSERT OR REPLACE INTO metadata (key, value) VALUES (?, ?)")
            .bind(key)
            .bind(value)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Replace the stored tree and its metadata in one transaction
    pub async fn save_tree(&self, root: &TreeNode, meta: TreeMeta) -> Result<(), CacheError> {
        let records = NodeRecord::flatten(root);

        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM nodes").execute(&mut *tx).await?;
        Self::save_nodes_in_tx(&mut tx, &records).await?;

        let node_count = records.len().to_string();
        let built_at = meta.built_at.to_string();
        let fold_case = if meta.fold_case { "1" } else { "0" };
        for (key, value) in [
            ("node_count", node_count.as_str()),
            ("built_at", built_at.as_str()),
            ("fold_case", fold_case),
        ] {
            sqlx::query("INSERT OR REPLACE INTO metadata (key, value) VALUES (?, ?)")
                .bind(key)
                .bind(value)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn save_nodes_in_tx(
        tx: &mut Transaction<'_, Sqlite>,
        records: &[NodeRecord<'_>],
    ) -> Result<(), CacheError> {
        // 6 binds per row stays under SQLite's variable limit
        const BATCH_SIZE: usize = 4000;

        for chunk in records.chunks(BATCH_SIZE) {
            let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(
                "INSERT INTO nodes (id, parent_id, name, is_dir, size, file_count) "
            );
            qb.push_values(chunk, |mut row, record| {
                row.push_bind(record.id)
                    .push_bind(record.parent_id)
                    .push_bind(record.name.as_ref())
                    .push_bind(record.is_dir)
                    .push_bind(record.size)
                    .push_bind(record.file_count);
            });
            qb.build().execute(&mut **tx).await?;
        }

        Ok(())
    }

    /// Load the stored tree, checking it is complete and well-formed.
    ///
    /// Aggregate sizes are taken as stored; nothing is recomputed.
    pub async fn load_tree(&self) -> Result<(TreeNode, TreeMeta), CacheError> {
        let version = self.get_metadata("schema_version").await;
        if version.as_deref() != Some(SCHEMA_VERSION) {
            return Err(self.corrupt(format!(
                "schema version {} (expected {})",
                version.as_deref().unwrap_or("missing"),
                SCHEMA_VERSION
            )));
        }

        let expected: usize = self.required_metadata("node_count").await?;
        let built_at: i64 = self.required_metadata("built_at").await?;
        let fold_case = self.get_metadata("fold_case").await.as_deref() == Some("1");

        let rows = sqlx::query(
            "SELECT id, parent_id, name, is_dir, size, file_count FROM nodes ORDER BY id"
        )
        .fetch_all(&self.pool)
        .await?;

        if rows.len() != expected {
            return Err(self.corrupt(format!("{} nodes stored, {} expected", rows.len(), expected)));
        }

        let mut nodes: Vec<Option<TreeNode>> = Vec::with_capacity(rows.len());
        let mut parents: Vec<usize> = Vec::with_capacity(rows.len());

        for (index, row) in rows.iter().enumerate() {
            let id: i64 = row.try_get("id")?;
            let parent_id: Option<i64> = row.try_get("parent_id")?;
            let name: String = row.try_get("name")?;
            let is_dir: bool = row.try_get("is_dir")?;
            let size: i64 = row.try_get("size")?;
            let file_count: i64 = row.try_get("file_count")?;

            if id != index as i64 {
                return Err(self.corrupt(format!("node ids are not contiguous at {}", id)));
            }
            match (index, parent_id) {
                (0, None) => {}
                (0, Some(_)) => return Err(self.corrupt("root has a parent".to_string())),
                (_, Some(p)) if p >= 0 && p < id => parents.push(p as usize),
                (_, _) => return Err(self.corrupt(format!("node {} has an invalid parent", id))),
            }
            if file_count < 0 {
                return Err(self.corrupt(format!("node {} has a negative file count", id)));
            }

            let mut node = if is_dir { TreeNode::directory(&name) } else { TreeNode::file(&name, 0) };
            node.size = size as u64;
            node.file_count = file_count as u64;
            nodes.push(Some(node));
        }

        if !matches!(nodes.first(), Some(Some(root)) if root.is_dir()) {
            return Err(self.corrupt("missing root directory".to_string()));
        }

        // Children always have higher ids than their parents, so walking ids
        // downwards attaches every subtree before its own parent is attached.
        for index in (1..nodes.len()).rev() {
            let Some(child) = nodes[index].take() else {
                return Err(self.corrupt(format!("node {} attached twice", index)));
            };
            let parent_index = parents[index - 1];
            let Some(NodeKind::Directory(children)) = nodes[parent_index].as_mut().map(|p| &mut p.kind) else {
                return Err(self.corrupt(format!("parent of node {} is not a directory", index)));
            };
            if children.contains_key(&child.name) {
                return Err(self.corrupt(format!("duplicate name {:?}", child.name)));
            }
            children.insert(child.name.clone(), child);
        }

        let root = nodes
            .into_iter()
            .next()
            .flatten()
            .ok_or_else(|| self.corrupt("missing root directory".to_string()))?;

        Ok((root, TreeMeta { built_at, fold_case }))
    }

    async fn required_metadata<T: FromStr>(&self, key: &str) -> Result<T, CacheError> {
        self.get_metadata(key)
            .await
            .and_then(|v| v.parse().ok())
            .ok_or_else(|| self.corrupt(format!("missing or invalid {}", key)))
    }

    fn corrupt(&self, reason: String) -> CacheError {
        CacheError::Corrupt { path: self.path.clone(), reason }
    }
}
