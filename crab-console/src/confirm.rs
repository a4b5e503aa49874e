//! Confirmation gate for destructive table actions
//!
//! Regenerating a token or deleting a table invalidates printed QR codes.
//! The registry never performs either directly: it hands out a
//! [`PendingAction`] that must be passed back to
//! [`TableRegistry::confirm`](crate::TableRegistry::confirm). Dropping it or
//! passing it to [`TableRegistry::cancel`](crate::TableRegistry::cancel)
//! leaves the backend untouched.

use shared::models::DiningTable;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DestructiveAction {
    RegenerateToken,
    Delete,
}

impl DestructiveAction {
    pub fn label(&self) -> &'static str {
        match self {
            DestructiveAction::RegenerateToken => "Regenerate QR code",
            DestructiveAction::Delete => "Delete table",
        }
    }
}

impl fmt::Display for DestructiveAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A destructive action awaiting operator confirmation
#[derive(Debug)]
#[must_use = "a pending action does nothing until confirmed"]
pub struct PendingAction {
    action: DestructiveAction,
    table_id: i64,
    table_number: String,
}

impl PendingAction {
    pub(crate) fn new(action: DestructiveAction, table: &DiningTable) -> Self {
        Self {
            action,
            table_id: table.id,
            table_number: table.table_number.clone(),
        }
    }

    pub fn action(&self) -> DestructiveAction {
        self.action
    }

    pub fn table_id(&self) -> i64 {
        self.table_id
    }

    pub fn table_number(&self) -> &str {
        &self.table_number
    }

    /// Question to put to the operator
    pub fn prompt(&self) -> String {
        match self.action {
            DestructiveAction::RegenerateToken => format!(
                "Regenerate the QR code for \"{}\"? Printed codes for this table will stop working.",
                self.table_number
            ),
            DestructiveAction::Delete => format!(
                "Delete table \"{}\"? Its QR code will stop working. This cannot be undone.",
                self.table_number
            ),
        }
    }
}

/// Result of a confirmed destructive action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmOutcome {
    Regenerated(DiningTable),
    Deleted(i64),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> DiningTable {
        DiningTable {
            id: 7,
            branch_id: 1,
            table_number: "Patio 1".into(),
            qr_code_token: "abc123".into(),
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn test_prompt_names_table() {
        let pending = PendingAction::new(DestructiveAction::Delete, &table());
        assert!(pending.prompt().contains("\"Patio 1\""));
        assert!(pending.prompt().contains("cannot be undone"));
        assert_eq!(pending.table_id(), 7);

        let pending = PendingAction::new(DestructiveAction::RegenerateToken, &table());
        assert!(pending.prompt().starts_with("Regenerate"));
        assert_eq!(pending.action(), DestructiveAction::RegenerateToken);
    }
}
