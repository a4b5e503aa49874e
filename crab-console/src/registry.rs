//! Table registry
//!
//! Owns the table cache for the selected branch and fronts every table
//! operation: validation, busy tracking, confirmation of destructive
//! actions, cache merging and operator notices.
//!
//! All methods take `&self`. The cache lives behind a `parking_lot::Mutex`
//! which is only ever locked between awaits, so several operations can be
//! in flight at once (regenerating one table while deleting another).

use crate::clipboard::Clipboard;
use crate::confirm::{ConfirmOutcome, DestructiveAction, PendingAction};
use crate::export::{ExportFormat, ExportRequest, Exporter, RenderedQr};
use crate::http::AdminApi;
use crate::notice::Notice;
use crate::scan::ScanUrl;
use crate::{ClientError, ClientResult};
use crab_qr::{ErrorCorrection, QrSize};
use parking_lot::Mutex;
use shared::models::{Branch, DiningTable, DiningTableCreate, DiningTableUpdate};
use std::collections::HashSet;
use std::path::PathBuf;

/// Reloads a list whose response raced a mutation before giving up on caching it
const MAX_LIST_ATTEMPTS: u32 = 3;

/// An action that may only have one request in flight per target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum BusyKey {
    Create(i64),
    Rename(i64),
    Regenerate(i64),
    Delete(i64),
}

impl BusyKey {
    fn label(&self) -> String {
        match self {
            BusyKey::Create(branch_id) => format!("Create table in branch {}", branch_id),
            BusyKey::Rename(id) => format!("Rename of table {}", id),
            BusyKey::Regenerate(id) => format!("Regenerate of table {}", id),
            BusyKey::Delete(id) => format!("Delete of table {}", id),
        }
    }
}

#[derive(Debug, Default)]
struct RegistryState {
    branches: Vec<Branch>,
    selected: Option<i64>,
    /// Bumped on every list request; a response carrying an older epoch is stale
    epoch: u64,
    /// Bumped on every successful mutation; a list started before it may predate it
    generation: u64,
    tables: Vec<DiningTable>,
    busy: HashSet<BusyKey>,
    notices: Vec<Notice>,
}

/// Releases its busy flag when dropped
struct BusyGuard<'a> {
    state: &'a Mutex<RegistryState>,
    key: BusyKey,
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.state.lock().busy.remove(&self.key);
    }
}

pub struct TableRegistry<A> {
    api: A,
    scan: ScanUrl,
    state: Mutex<RegistryState>,
}

impl<A: AdminApi> TableRegistry<A> {
    pub fn new(api: A, scan: ScanUrl) -> Self {
        Self {
            api,
            scan,
            state: Mutex::new(RegistryState::default()),
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    // ==================== Branches ====================

    pub async fn list_branches(&self) -> ClientResult<Vec<Branch>> {
        match self.api.list_branches().await {
            Ok(branches) => {
                self.state.lock().branches = branches.clone();
                Ok(branches)
            }
            Err(e) => Err(self.fail(e, "Failed to load branches")),
        }
    }

    /// Switch to `branch_id`: the cache is cleared immediately, then reloaded
    pub async fn select_branch(&self, branch_id: i64) -> ClientResult<Vec<DiningTable>> {
        {
            let mut st = self.state.lock();
            st.selected = Some(branch_id);
            st.tables.clear();
        }
        self.list_tables(branch_id).await
    }

    pub fn selected_branch_id(&self) -> Option<i64> {
        self.state.lock().selected
    }

    /// Name of a branch from the last `list_branches`
    pub fn branch_name(&self, branch_id: i64) -> Option<String> {
        self.state
            .lock()
            .branches
            .iter()
            .find(|b| b.id == branch_id)
            .map(|b| b.name.clone())
    }

    // ==================== Listing ====================

    /// Fetch the tables of `branch_id` and make them the cache.
    ///
    /// Only the most recent list request may replace the cache; an older
    /// response that arrives late is returned to the caller but not cached.
    /// A response that raced a successful mutation is fetched again, since
    /// it may predate that mutation. The selection moves to `branch_id` only
    /// together with the new cache; on failure both are kept.
    pub async fn list_tables(&self, branch_id: i64) -> ClientResult<Vec<DiningTable>> {
        let epoch = {
            let mut st = self.state.lock();
            st.epoch += 1;
            st.epoch
        };

        let mut attempt = 1;
        loop {
            let generation = self.state.lock().generation;
            let tables = match self.api.list_tables(branch_id).await {
                Ok(tables) => tables,
                Err(e) => return Err(self.fail(e, "Failed to load tables")),
            };

            let mut st = self.state.lock();
            if st.epoch != epoch {
                tracing::debug!(branch_id, epoch, current = st.epoch, "discarding stale table list");
                return Ok(tables);
            }
            if st.generation != generation {
                if attempt < MAX_LIST_ATTEMPTS {
                    tracing::debug!(branch_id, attempt, "tables changed during list, reloading");
                    attempt += 1;
                    continue;
                }
                tracing::warn!(branch_id, "tables kept changing during list, cache not replaced");
                return Ok(tables);
            }
            st.selected = Some(branch_id);
            st.tables = tables.clone();
            return Ok(tables);
        }
    }

    /// Snapshot of the cache
    pub fn tables(&self) -> Vec<DiningTable> {
        self.state.lock().tables.clone()
    }

    /// Cached tables whose label contains `query`, ignoring case
    pub fn filtered(&self, query: &str) -> Vec<DiningTable> {
        let needle = query.trim().to_lowercase();
        let st = self.state.lock();
        if needle.is_empty() {
            return st.tables.clone();
        }
        st.tables
            .iter()
            .filter(|t| t.table_number.to_lowercase().contains(&needle))
            .cloned()
            .collect()
    }

    pub fn find(&self, table_id: i64) -> Option<DiningTable> {
        self.state
            .lock()
            .tables
            .iter()
            .find(|t| t.id == table_id)
            .cloned()
    }

    /// The cached table a token currently belongs to, if any
    pub fn resolve_cached(&self, token: &str) -> Option<DiningTable> {
        self.state
            .lock()
            .tables
            .iter()
            .find(|t| t.qr_code_token == token)
            .cloned()
    }

    // ==================== Mutations ====================

    pub async fn create_table(
        &self,
        branch_id: i64,
        table_number: &str,
    ) -> ClientResult<DiningTable> {
        let table_number = self.require_label(table_number)?;
        let _busy = self.begin(BusyKey::Create(branch_id))?;

        let payload = DiningTableCreate {
            branch_id,
            table_number,
        };
        let table = match self.api.create_table(&payload).await {
            Ok(table) => table,
            Err(e) => return Err(self.fail(e, "Failed to create table")),
        };

        let mut st = self.state.lock();
        st.generation += 1;
        if st.selected == Some(branch_id) && !st.tables.iter().any(|t| t.id == table.id) {
            st.tables.push(table.clone());
        }
        st.notices
            .push(Notice::success(format!("Table \"{}\" created", table.table_number)));
        tracing::info!(table_id = table.id, branch_id, "table created");
        Ok(table)
    }

    /// Change a table's label. The token is untouched.
    ///
    /// Only the label of the cached entry is taken from the response, so a
    /// rename that overlaps a regenerate cannot bring back the old token.
    pub async fn rename_table(
        &self,
        table_id: i64,
        table_number: &str,
    ) -> ClientResult<DiningTable> {
        let table_number = self.require_label(table_number)?;
        let _busy = self.begin(BusyKey::Rename(table_id))?;

        let payload = DiningTableUpdate { table_number };
        let table = match self.api.update_table(table_id, &payload).await {
            Ok(table) => table,
            Err(e) => return Err(self.fail(e, "Failed to rename table")),
        };

        let mut st = self.state.lock();
        st.generation += 1;
        let merged = merge_cached(&mut st.tables, &table, |slot, updated| {
            slot.table_number = updated.table_number.clone();
        });
        st.notices
            .push(Notice::success(format!("Table renamed to \"{}\"", table.table_number)));
        tracing::info!(table_id, "table renamed");
        Ok(merged)
    }

    /// First step of regenerating a token; nothing is sent until confirmed
    pub fn request_regenerate(&self, table_id: i64) -> ClientResult<PendingAction> {
        self.request(DestructiveAction::RegenerateToken, table_id)
    }

    /// First step of deleting a table; nothing is sent until confirmed
    pub fn request_delete(&self, table_id: i64) -> ClientResult<PendingAction> {
        self.request(DestructiveAction::Delete, table_id)
    }

    fn request(&self, action: DestructiveAction, table_id: i64) -> ClientResult<PendingAction> {
        match self.find(table_id) {
            Some(table) => Ok(PendingAction::new(action, &table)),
            None => Err(self.fail(
                ClientError::NotFound(format!("Table {}", table_id)),
                "Table not found",
            )),
        }
    }

    /// Carry out a confirmed destructive action
    pub async fn confirm(&self, pending: PendingAction) -> ClientResult<ConfirmOutcome> {
        let table_id = pending.table_id();
        match pending.action() {
            DestructiveAction::RegenerateToken => {
                let _busy = self.begin(BusyKey::Regenerate(table_id))?;
                let table = match self.api.regenerate_token(table_id).await {
                    Ok(table) => table,
                    Err(e) => return Err(self.fail(e, "Failed to regenerate QR code")),
                };

                let mut st = self.state.lock();
                st.generation += 1;
                let merged = merge_cached(&mut st.tables, &table, |slot, updated| {
                    slot.qr_code_token = updated.qr_code_token.clone();
                });
                st.notices.push(Notice::success(format!(
                    "QR code for \"{}\" regenerated",
                    merged.table_number
                )));
                tracing::info!(table_id, "table token regenerated");
                Ok(ConfirmOutcome::Regenerated(merged))
            }
            DestructiveAction::Delete => {
                let _busy = self.begin(BusyKey::Delete(table_id))?;
                if let Err(e) = self.api.delete_table(table_id).await {
                    return Err(self.fail(e, "Failed to delete table"));
                }

                let mut st = self.state.lock();
                st.generation += 1;
                st.tables.retain(|t| t.id != table_id);
                st.notices.push(Notice::success(format!(
                    "Table \"{}\" deleted",
                    pending.table_number()
                )));
                tracing::info!(table_id, "table deleted");
                Ok(ConfirmOutcome::Deleted(table_id))
            }
        }
    }

    /// Abandon a destructive action without contacting the backend
    pub fn cancel(&self, pending: PendingAction) {
        tracing::debug!(table_id = pending.table_id(), action = %pending.action(), "cancelled");
    }

    // ==================== Links and rendering ====================

    pub fn scan_url_for(&self, token: &str) -> String {
        self.scan.for_token(token)
    }

    pub fn render_qr(
        &self,
        token: &str,
        size: QrSize,
        ec: ErrorCorrection,
    ) -> ClientResult<RenderedQr> {
        RenderedQr::render(&self.scan, token, size, ec)
            .map_err(|e| self.fail(e, "Failed to render QR code"))
    }

    /// Render a cached table's code at export size and write it out
    pub fn export_table(
        &self,
        exporter: &Exporter,
        table_id: i64,
        format: ExportFormat,
    ) -> ClientResult<PathBuf> {
        let table = match self.find(table_id) {
            Some(table) => table,
            None => {
                return Err(self.fail(
                    ClientError::NotFound(format!("Table {}", table_id)),
                    "Table not found",
                ));
            }
        };
        let branch_name = self
            .branch_name(table.branch_id)
            .unwrap_or_else(|| format!("Branch {}", table.branch_id));

        let qr = self.render_qr(&table.qr_code_token, QrSize::EXPORT, ErrorCorrection::High)?;
        let request = ExportRequest::new(branch_name, table.table_number.clone());
        let path = exporter
            .export(format, &qr, &request)
            .map_err(|e| self.fail(e, "Failed to export QR code"))?;

        self.note(Notice::success(format!("Saved {}", path.display())));
        Ok(path)
    }

    /// Put the scan link for `token` on the clipboard
    pub fn copy_scan_link(
        &self,
        token: &str,
        clipboard: &mut dyn Clipboard,
    ) -> ClientResult<String> {
        let url = self.scan.for_token(token);
        clipboard
            .set_text(&url)
            .map_err(|e| self.fail(e, "Failed to copy link"))?;
        self.note(Notice::success("Scan link copied"));
        Ok(url)
    }

    // ==================== Notices ====================

    /// Drain the notices recorded since the last call
    pub fn take_notices(&self) -> Vec<Notice> {
        std::mem::take(&mut self.state.lock().notices)
    }

    // ==================== Internals ====================

    fn require_label(&self, raw: &str) -> ClientResult<String> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(self.fail(
                ClientError::Validation("Table number is required".to_string()),
                "Table number is required",
            ));
        }
        Ok(trimmed.to_string())
    }

    fn begin(&self, key: BusyKey) -> ClientResult<BusyGuard<'_>> {
        let inserted = self.state.lock().busy.insert(key);
        if !inserted {
            return Err(self.fail(ClientError::Busy(key.label()), "Operation already in progress"));
        }
        Ok(BusyGuard {
            state: &self.state,
            key,
        })
    }

    fn note(&self, notice: Notice) {
        self.state.lock().notices.push(notice);
    }

    /// Record an error notice and hand the error back
    fn fail(&self, err: ClientError, fallback: &str) -> ClientError {
        tracing::warn!(error = %err, "{}", fallback);
        self.note(Notice::error(err.user_message(fallback)));
        err
    }
}

/// Copy the fields `apply` picks from a mutation response into the cached
/// entry and return that entry; the response itself when not cached.
fn merge_cached(
    tables: &mut [DiningTable],
    updated: &DiningTable,
    apply: impl FnOnce(&mut DiningTable, &DiningTable),
) -> DiningTable {
    match tables.iter_mut().find(|t| t.id == updated.id) {
        Some(slot) => {
            apply(slot, updated);
            slot.updated_at = slot.updated_at.max(updated.updated_at);
            slot.clone()
        }
        None => updated.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryClipboard;
    use crate::clipboard::DeniedClipboard;
    use crate::notice::NoticeLevel;
    use async_trait::async_trait;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Notify;

    /// In-memory stand-in for the admin API
    #[derive(Default)]
    struct FakeApi {
        tables: Mutex<Vec<DiningTable>>,
        next_id: Mutex<i64>,
        calls: AtomicUsize,
        fail_next: Mutex<Option<ClientError>>,
        hold_list: Mutex<Option<(i64, Arc<Notify>)>>,
        hold_regenerate: Mutex<Option<Arc<Notify>>>,
        hold_update: Mutex<Option<Arc<Notify>>>,
    }

    impl FakeApi {
        fn with_tables(tables: Vec<DiningTable>) -> Self {
            let next = tables.iter().map(|t| t.id).max().unwrap_or(0) + 1;
            Self {
                tables: Mutex::new(tables),
                next_id: Mutex::new(next),
                ..Default::default()
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn enter(&self) -> ClientResult<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.fail_next.lock().take() {
                Some(e) => Err(e),
                None => Ok(()),
            }
        }
    }

    fn table(id: i64, branch_id: i64, label: &str, token: &str) -> DiningTable {
        DiningTable {
            id,
            branch_id,
            table_number: label.to_string(),
            qr_code_token: token.to_string(),
            created_at: 0,
            updated_at: 0,
        }
    }

    #[async_trait]
    impl AdminApi for FakeApi {
        async fn list_branches(&self) -> ClientResult<Vec<Branch>> {
            self.enter()?;
            Ok(vec![
                Branch {
                    id: 1,
                    name: "Main St.".into(),
                    address: None,
                },
                Branch {
                    id: 2,
                    name: "Harbour View".into(),
                    address: None,
                },
            ])
        }

        async fn list_tables(&self, branch_id: i64) -> ClientResult<Vec<DiningTable>> {
            self.enter()?;
            let snapshot: Vec<DiningTable> = self
                .tables
                .lock()
                .iter()
                .filter(|t| t.branch_id == branch_id)
                .cloned()
                .collect();
            let hold = self.hold_list.lock().clone();
            if let Some((held_branch, notify)) = hold {
                if held_branch == branch_id {
                    notify.notified().await;
                }
            }
            Ok(snapshot)
        }

        async fn create_table(&self, payload: &DiningTableCreate) -> ClientResult<DiningTable> {
            self.enter()?;
            let id = {
                let mut next = self.next_id.lock();
                let id = *next;
                *next += 1;
                id
            };
            let created = table(
                id,
                payload.branch_id,
                &payload.table_number,
                &format!("token{}", id),
            );
            self.tables.lock().push(created.clone());
            Ok(created)
        }

        async fn update_table(
            &self,
            id: i64,
            payload: &DiningTableUpdate,
        ) -> ClientResult<DiningTable> {
            self.enter()?;
            let updated = {
                let mut tables = self.tables.lock();
                let t = tables
                    .iter_mut()
                    .find(|t| t.id == id)
                    .ok_or_else(|| ClientError::NotFound(format!("Table {}", id)))?;
                t.table_number = payload.table_number.clone();
                t.clone()
            };
            // The response is built before the hold, like a slow reply in transit
            let hold = self.hold_update.lock().clone();
            if let Some(notify) = hold {
                notify.notified().await;
            }
            Ok(updated)
        }

        async fn regenerate_token(&self, id: i64) -> ClientResult<DiningTable> {
            self.enter()?;
            let hold = self.hold_regenerate.lock().clone();
            if let Some(notify) = hold {
                notify.notified().await;
            }
            let mut tables = self.tables.lock();
            let t = tables
                .iter_mut()
                .find(|t| t.id == id)
                .ok_or_else(|| ClientError::NotFound(format!("Table {}", id)))?;
            t.qr_code_token = format!("{}x", t.qr_code_token);
            Ok(t.clone())
        }

        async fn delete_table(&self, id: i64) -> ClientResult<()> {
            self.enter()?;
            let mut tables = self.tables.lock();
            let before = tables.len();
            tables.retain(|t| t.id != id);
            if tables.len() == before {
                return Err(ClientError::Api {
                    status: 404,
                    code: Some(7001),
                    message: format!("Table {} not found", id),
                });
            }
            Ok(())
        }
    }

    fn registry(api: FakeApi) -> TableRegistry<FakeApi> {
        TableRegistry::new(api, ScanUrl::new("https://shop.example"))
    }

    #[tokio::test]
    async fn test_blank_label_rejected_without_request() {
        let reg = registry(FakeApi::default());
        let err = reg.create_table(1, "   ").await.unwrap_err();
        assert!(matches!(err, ClientError::Validation(_)));
        assert_eq!(reg.api().calls(), 0);

        let notices = reg.take_notices();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].level, NoticeLevel::Error);
        assert_eq!(notices[0].message, "Table number is required");
    }

    #[tokio::test]
    async fn test_create_then_list_uses_trimmed_label() {
        let reg = registry(FakeApi::default());
        reg.select_branch(1).await.unwrap();
        assert!(reg.tables().is_empty());

        let created = reg.create_table(1, "  Table 01 ").await.unwrap();
        assert_eq!(created.table_number, "Table 01");
        assert_eq!(reg.tables().len(), 1);

        let listed = reg.list_tables(1).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].table_number, "Table 01");
        assert!(!listed[0].qr_code_token.is_empty());
    }

    #[tokio::test]
    async fn test_create_for_other_branch_not_cached() {
        let reg = registry(FakeApi::default());
        reg.select_branch(1).await.unwrap();
        reg.create_table(2, "Bar 1").await.unwrap();
        assert!(reg.tables().is_empty());
    }

    #[tokio::test]
    async fn test_rename_keeps_token() {
        let reg = registry(FakeApi::with_tables(vec![table(3, 1, "T3", "tok3")]));
        reg.select_branch(1).await.unwrap();

        let renamed = reg.rename_table(3, " Window ").await.unwrap();
        assert_eq!(renamed.table_number, "Window");
        assert_eq!(renamed.qr_code_token, "tok3");
        assert_eq!(reg.find(3).unwrap().table_number, "Window");

        let calls = reg.api().calls();
        assert!(reg.rename_table(3, "").await.is_err());
        assert_eq!(reg.api().calls(), calls);
    }

    #[tokio::test]
    async fn test_regenerate_replaces_token() {
        let reg = registry(FakeApi::with_tables(vec![
            table(7, 1, "Patio 1", "abc123"),
            table(8, 1, "Patio 2", "def456"),
        ]));
        reg.select_branch(1).await.unwrap();
        let old_url = reg.scan_url_for("abc123");

        let pending = reg.request_regenerate(7).unwrap();
        let outcome = reg.confirm(pending).await.unwrap();
        let ConfirmOutcome::Regenerated(updated) = outcome else {
            panic!("expected regenerate outcome");
        };

        assert_ne!(updated.qr_code_token, "abc123");
        assert_ne!(reg.scan_url_for(&updated.qr_code_token), old_url);
        assert!(reg.resolve_cached("abc123").is_none());
        assert_eq!(reg.resolve_cached(&updated.qr_code_token).unwrap().id, 7);
        assert_eq!(reg.find(8).unwrap().qr_code_token, "def456");
    }

    #[tokio::test]
    async fn test_cancel_sends_nothing() {
        let reg = registry(FakeApi::with_tables(vec![table(7, 1, "Patio 1", "abc123")]));
        reg.select_branch(1).await.unwrap();
        let calls = reg.api().calls();

        let pending = reg.request_delete(7).unwrap();
        reg.cancel(pending);
        assert_eq!(reg.api().calls(), calls);
        assert!(reg.find(7).is_some());
    }

    #[tokio::test]
    async fn test_second_delete_is_error() {
        let reg = registry(FakeApi::with_tables(vec![table(7, 1, "Patio 1", "abc123")]));
        reg.select_branch(1).await.unwrap();

        let pending = reg.request_delete(7).unwrap();
        let outcome = reg.confirm(pending).await.unwrap();
        assert_eq!(outcome, ConfirmOutcome::Deleted(7));
        assert!(reg.tables().is_empty());

        let err = reg.request_delete(7).unwrap_err();
        assert!(err.is_not_found());
        assert!(reg.api().delete_table(7).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_failed_list_keeps_cache() {
        let reg = registry(FakeApi::with_tables(vec![table(1, 1, "T1", "a")]));
        reg.select_branch(1).await.unwrap();
        reg.take_notices();

        *reg.api().fail_next.lock() = Some(ClientError::Api {
            status: 503,
            code: Some(9001),
            message: "Database unavailable".into(),
        });
        assert!(reg.list_tables(1).await.is_err());
        assert_eq!(reg.tables().len(), 1);

        let notices = reg.take_notices();
        assert_eq!(notices, vec![Notice::error("Database unavailable")]);
    }

    #[tokio::test]
    async fn test_failed_list_for_other_branch_keeps_selection() {
        let reg = registry(FakeApi::with_tables(vec![table(1, 1, "Main 1", "a")]));
        reg.select_branch(1).await.unwrap();

        *reg.api().fail_next.lock() = Some(ClientError::Internal("timeout".into()));
        assert!(reg.list_tables(2).await.is_err());
        assert_eq!(reg.selected_branch_id(), Some(1));

        reg.create_table(2, "Bar 1").await.unwrap();
        let branches: Vec<i64> = reg.tables().iter().map(|t| t.branch_id).collect();
        assert_eq!(branches, vec![1]);
    }

    #[tokio::test]
    async fn test_failed_regenerate_keeps_token() {
        let reg = registry(FakeApi::with_tables(vec![table(7, 1, "Patio 1", "abc123")]));
        reg.select_branch(1).await.unwrap();
        reg.take_notices();

        let pending = reg.request_regenerate(7).unwrap();
        *reg.api().fail_next.lock() = Some(ClientError::Api {
            status: 500,
            code: Some(9001),
            message: "Token service unavailable".into(),
        });
        assert!(reg.confirm(pending).await.is_err());

        assert_eq!(reg.find(7).unwrap().qr_code_token, "abc123");
        assert_eq!(reg.api().tables.lock()[0].qr_code_token, "abc123");
        assert_eq!(reg.take_notices(), vec![Notice::error("Token service unavailable")]);
    }

    #[tokio::test]
    async fn test_failed_delete_keeps_table() {
        let reg = registry(FakeApi::with_tables(vec![table(7, 1, "Patio 1", "abc123")]));
        reg.select_branch(1).await.unwrap();
        reg.take_notices();

        let pending = reg.request_delete(7).unwrap();
        *reg.api().fail_next.lock() = Some(ClientError::Api {
            status: 409,
            code: None,
            message: "Table has open orders".into(),
        });
        assert!(reg.confirm(pending).await.is_err());

        assert_eq!(reg.find(7).unwrap().table_number, "Patio 1");
        assert_eq!(reg.take_notices(), vec![Notice::error("Table has open orders")]);

        // Nothing changed, so the table can still be deleted afterwards
        let pending = reg.request_delete(7).unwrap();
        assert_eq!(reg.confirm(pending).await.unwrap(), ConfirmOutcome::Deleted(7));
    }

    #[tokio::test]
    async fn test_rename_overlapping_regenerate_keeps_new_token() {
        let api = FakeApi::with_tables(vec![table(7, 1, "Patio 1", "abc123")]);
        let gate = Arc::new(Notify::new());
        *api.hold_update.lock() = Some(gate.clone());
        let reg = registry(api);
        reg.select_branch(1).await.unwrap();

        let pending = reg.request_regenerate(7).unwrap();
        let (renamed, regenerated) = tokio::join!(reg.rename_table(7, "Window"), async {
            let r = reg.confirm(pending).await;
            gate.notify_one();
            r
        });

        let Ok(ConfirmOutcome::Regenerated(regenerated)) = regenerated else {
            panic!("expected regenerate outcome");
        };
        assert_eq!(regenerated.qr_code_token, "abc123x");

        // The rename reply still carries the old token; only its label is taken
        let renamed = renamed.unwrap();
        assert_eq!(renamed.table_number, "Window");
        assert_eq!(renamed.qr_code_token, "abc123x");

        let cached = reg.find(7).unwrap();
        assert_eq!(cached.table_number, "Window");
        assert_eq!(cached.qr_code_token, "abc123x");
        assert!(reg.resolve_cached("abc123").is_none());
    }

    #[tokio::test]
    async fn test_list_racing_regenerate_is_reloaded() {
        let reg = registry(FakeApi::with_tables(vec![table(7, 1, "Patio 1", "abc123")]));
        reg.select_branch(1).await.unwrap();
        let gate = Arc::new(Notify::new());
        *reg.api().hold_list.lock() = Some((1, gate.clone()));
        let calls = reg.api().calls();

        let pending = reg.request_regenerate(7).unwrap();
        let (listed, regenerated) = tokio::join!(reg.list_tables(1), async {
            let r = reg.confirm(pending).await;
            *reg.api().hold_list.lock() = None;
            gate.notify_one();
            r
        });

        assert!(regenerated.is_ok());
        assert_eq!(listed.unwrap()[0].qr_code_token, "abc123x");
        assert_eq!(reg.find(7).unwrap().qr_code_token, "abc123x");
        assert!(reg.resolve_cached("abc123").is_none());
        // list, regenerate, reload
        assert_eq!(reg.api().calls(), calls + 3);
    }

    #[tokio::test]
    async fn test_select_branch_racing_create_keeps_new_table() {
        let api = FakeApi::with_tables(vec![table(1, 1, "Main 1", "a")]);
        let gate = Arc::new(Notify::new());
        *api.hold_list.lock() = Some((1, gate.clone()));
        let reg = registry(api);

        let (selected, created) = tokio::join!(reg.select_branch(1), async {
            let r = reg.create_table(1, "Bar 1").await;
            *reg.api().hold_list.lock() = None;
            gate.notify_one();
            r
        });

        assert_eq!(selected.unwrap().len(), 2);
        let created = created.unwrap();
        let ids: Vec<i64> = reg.tables().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![1, created.id]);
    }

    #[tokio::test]
    async fn test_generic_fallback_message() {
        let reg = registry(FakeApi::default());
        *reg.api().fail_next.lock() = Some(ClientError::Internal("<html>".into()));
        assert!(reg.create_table(1, "T").await.is_err());
        assert_eq!(reg.take_notices()[0].message, "Failed to create table");
    }

    #[tokio::test]
    async fn test_stale_list_discarded() {
        let api = FakeApi::with_tables(vec![
            table(1, 1, "Main 1", "a"),
            table(2, 2, "Harbour 1", "b"),
        ]);
        let gate = Arc::new(Notify::new());
        *api.hold_list.lock() = Some((1, gate.clone()));
        let reg = registry(api);

        let slow = reg.list_tables(1);
        let fast = async {
            let r = reg.list_tables(2).await;
            gate.notify_one();
            r
        };
        let (slow, fast) = tokio::join!(slow, fast);

        assert_eq!(slow.unwrap()[0].branch_id, 1);
        assert_eq!(fast.unwrap()[0].branch_id, 2);
        let cached = reg.tables();
        assert_eq!(cached.len(), 1);
        assert_eq!(cached[0].branch_id, 2);
        assert_eq!(reg.selected_branch_id(), Some(2));
    }

    #[tokio::test]
    async fn test_duplicate_regenerate_is_busy() {
        let api = FakeApi::with_tables(vec![table(7, 1, "Patio 1", "abc123")]);
        let gate = Arc::new(Notify::new());
        *api.hold_regenerate.lock() = Some(gate.clone());
        let reg = registry(api);
        reg.select_branch(1).await.unwrap();

        let first = reg.request_regenerate(7).unwrap();
        let second = reg.request_regenerate(7).unwrap();
        let calls_before = reg.api().calls();

        let (a, b) = tokio::join!(reg.confirm(first), async {
            let r = reg.confirm(second).await;
            gate.notify_one();
            r
        });

        assert!(a.is_ok());
        assert!(matches!(b, Err(ClientError::Busy(_))));
        assert_eq!(reg.api().calls(), calls_before + 1);

        // Guard released: a later regenerate goes through
        *reg.api().hold_regenerate.lock() = None;
        let again = reg.request_regenerate(7).unwrap();
        assert!(reg.confirm(again).await.is_ok());
    }

    #[tokio::test]
    async fn test_unrelated_actions_run_concurrently() {
        let reg = registry(FakeApi::with_tables(vec![
            table(1, 1, "A", "tokA"),
            table(2, 1, "B", "tokB"),
        ]));
        reg.select_branch(1).await.unwrap();

        let regen = reg.request_regenerate(1).unwrap();
        let delete = reg.request_delete(2).unwrap();
        let (a, b) = tokio::join!(reg.confirm(regen), reg.confirm(delete));

        assert!(matches!(a, Ok(ConfirmOutcome::Regenerated(_))));
        assert_eq!(b.unwrap(), ConfirmOutcome::Deleted(2));
        let cached = reg.tables();
        assert_eq!(cached.len(), 1);
        assert_ne!(cached[0].qr_code_token, "tokA");
    }

    #[tokio::test]
    async fn test_filtered_is_case_insensitive() {
        let reg = registry(FakeApi::with_tables(vec![
            table(1, 1, "Patio 1", "a"),
            table(2, 1, "Bar", "b"),
            table(3, 1, "PATIO 2", "c"),
        ]));
        reg.select_branch(1).await.unwrap();

        let hits: Vec<i64> = reg.filtered("patio").iter().map(|t| t.id).collect();
        assert_eq!(hits, vec![1, 3]);
        assert_eq!(reg.filtered("  ").len(), 3);
        assert!(reg.filtered("zzz").is_empty());
    }

    #[tokio::test]
    async fn test_copy_scan_link() {
        let reg = registry(FakeApi::default());
        let mut clip = MemoryClipboard::new();
        let url = reg.copy_scan_link("abc123", &mut clip).unwrap();
        assert_eq!(url, "https://shop.example/menu/scan/abc123");
        assert_eq!(clip.contents(), Some(url.as_str()));
        assert_eq!(reg.api().calls(), 0);

        assert!(reg.copy_scan_link("abc123", &mut DeniedClipboard).is_err());
        let notices = reg.take_notices();
        assert_eq!(notices.len(), 2);
        assert!(notices[1].is_error());
    }

    #[tokio::test]
    async fn test_branch_names() {
        let reg = registry(FakeApi::default());
        assert!(reg.branch_name(1).is_none());
        reg.list_branches().await.unwrap();
        assert_eq!(reg.branch_name(1).as_deref(), Some("Main St."));
    }
}
