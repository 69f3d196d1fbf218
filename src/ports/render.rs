use serde::Serialize;

use crate::domain::TokenRow;

/// Severity of a status line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusKind {
    Ok,
    Warn,
}

/// Output surface for a load: status line, table rows and summary fields.
///
/// Implementations use interior mutability; the orchestrator only holds `&self`.
pub trait RenderSink: Send + Sync {
    fn set_status(&self, text: &str, kind: StatusKind);

    fn append_row(&self, row: &TokenRow);

    fn clear_rows(&self);

    fn set_total(&self, text: &str);

    fn set_meta(&self, text: &str);
}
