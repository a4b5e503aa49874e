//! In-memory store for the mock admin backend

use parking_lot::Mutex;
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{Branch, DiningTable, DiningTableCreate, DiningTableUpdate};
use shared::util::{now_millis, random_token};
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;

pub struct AppState {
    pub store: RwLock<AdminStore>,
    /// Bearer token required on `/admin` routes, if set
    pub api_token: Option<String>,
    pending_failure: Mutex<Option<AppError>>,
}

impl AppState {
    pub fn new(api_token: Option<String>) -> Self {
        Self {
            store: RwLock::new(AdminStore::default()),
            api_token,
            pending_failure: Mutex::new(None),
        }
    }

    /// Make the next `/admin` request fail with `err`
    pub fn fail_next(&self, err: AppError) {
        *self.pending_failure.lock() = Some(err);
    }

    /// Take the injected failure, if any
    pub fn take_failure(&self) -> Option<AppError> {
        self.pending_failure.lock().take()
    }

    /// Two branches with a couple of tables, for manual runs
    pub async fn seed_demo(&self) {
        let mut store = self.store.write().await;
        let main = store.add_branch("Main St.", Some("1 Main Street"));
        let harbour = store.add_branch("Harbour View", None);
        let demo = [
            (main.id, "Table 01"),
            (main.id, "Table 02"),
            (harbour.id, "Patio 1"),
        ];
        for (branch, number) in demo {
            if let Err(e) = store.create_table(DiningTableCreate {
                branch_id: branch,
                table_number: number.to_string(),
            }) {
                tracing::warn!(error = %e, "seed table skipped");
            }
        }
        tracing::info!(
            branches = store.branches.len(),
            tables = store.tables.len(),
            "demo data seeded"
        );
    }
}

/// Branches and tables, plus a token index that enforces token uniqueness
#[derive(Debug)]
pub struct AdminStore {
    branches: Vec<Branch>,
    tables: BTreeMap<i64, DiningTable>,
    tokens: HashMap<String, i64>,
    next_branch_id: i64,
    next_table_id: i64,
}

impl Default for AdminStore {
    fn default() -> Self {
        Self {
            branches: Vec::new(),
            tables: BTreeMap::new(),
            tokens: HashMap::new(),
            next_branch_id: 1,
            next_table_id: 1,
        }
    }
}

impl AdminStore {
    pub fn add_branch(&mut self, name: &str, address: Option<&str>) -> Branch {
        let branch = Branch {
            id: self.next_branch_id,
            name: name.to_string(),
            address: address.map(str::to_string),
        };
        self.next_branch_id += 1;
        self.branches.push(branch.clone());
        branch
    }

    pub fn branches(&self) -> Vec<Branch> {
        self.branches.clone()
    }

    fn ensure_branch(&self, branch_id: i64) -> AppResult<()> {
        if self.branches.iter().any(|b| b.id == branch_id) {
            Ok(())
        } else {
            Err(AppError::branch_not_found(branch_id))
        }
    }

    /// Tables of one branch, ordered by id (creation order)
    pub fn tables_for(&self, branch_id: i64) -> AppResult<Vec<DiningTable>> {
        self.ensure_branch(branch_id)?;
        Ok(self
            .tables
            .values()
            .filter(|t| t.branch_id == branch_id)
            .cloned()
            .collect())
    }

    fn fresh_token(&self) -> String {
        loop {
            let token = random_token();
            if !self.tokens.contains_key(&token) {
                return token;
            }
        }
    }

    fn validated_number(raw: &str) -> AppResult<String> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(AppError::table_number_required());
        }
        Ok(trimmed.to_string())
    }

    pub fn create_table(&mut self, payload: DiningTableCreate) -> AppResult<DiningTable> {
        let token = self.fresh_token();
        self.insert_table(payload, token)
    }

    /// Create a table with a caller-chosen token (fixtures)
    pub fn insert_table(
        &mut self,
        payload: DiningTableCreate,
        token: String,
    ) -> AppResult<DiningTable> {
        self.ensure_branch(payload.branch_id)?;
        let table_number = Self::validated_number(&payload.table_number)?;
        if self.tokens.contains_key(&token) {
            return Err(AppError::new(ErrorCode::QrTokenConflict));
        }

        let now = now_millis();
        let table = DiningTable {
            id: self.next_table_id,
            branch_id: payload.branch_id,
            table_number,
            qr_code_token: token.clone(),
            created_at: now,
            updated_at: now,
        };
        self.next_table_id += 1;
        self.tokens.insert(token, table.id);
        self.tables.insert(table.id, table.clone());
        Ok(table)
    }

    /// Skip table ids up to (not including) `id`
    pub fn advance_table_id(&mut self, id: i64) {
        self.next_table_id = self.next_table_id.max(id);
    }

    pub fn rename_table(&mut self, id: i64, payload: DiningTableUpdate) -> AppResult<DiningTable> {
        let table_number = Self::validated_number(&payload.table_number)?;
        let table = self
            .tables
            .get_mut(&id)
            .ok_or_else(|| AppError::table_not_found(id))?;
        table.table_number = table_number;
        table.updated_at = now_millis();
        Ok(table.clone())
    }

    /// Swap the token in one step: the old token stops resolving as the new
    /// one is indexed.
    pub fn regenerate(&mut self, id: i64) -> AppResult<DiningTable> {
        let token = self.fresh_token();
        let table = self
            .tables
            .get_mut(&id)
            .ok_or_else(|| AppError::table_not_found(id))?;

        let old = std::mem::replace(&mut table.qr_code_token, token.clone());
        table.updated_at = now_millis();
        self.tokens.remove(&old);
        self.tokens.insert(token, id);
        Ok(table.clone())
    }

    pub fn delete_table(&mut self, id: i64) -> AppResult<()> {
        let table = self
            .tables
            .remove(&id)
            .ok_or_else(|| AppError::table_not_found(id))?;
        self.tokens.remove(&table.qr_code_token);
        Ok(())
    }

    /// Resolve a scanned token to its live table
    pub fn resolve(&self, token: &str) -> AppResult<DiningTable> {
        self.tokens
            .get(token)
            .and_then(|id| self.tables.get(id))
            .cloned()
            .ok_or_else(|| AppError::new(ErrorCode::QrTokenNotFound))
    }
}
