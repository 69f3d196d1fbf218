//! Terminal render sink
//!
//! Status lines go to stderr. Table rows and the summary go to stdout, unless the
//! sink is in JSON mode, where the caller prints the final report instead.

use std::io::{self, Write};
use std::sync::{Mutex, PoisonError};

use crate::domain::{shorten_address, TokenRow};
use crate::ports::{RenderSink, StatusKind};

/// How the table is presented
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    #[default]
    Text,
    /// Statuses only; rows and summary are left to the caller
    Json,
}

struct Surface {
    out: Box<dyn Write + Send>,
    err: Box<dyn Write + Send>,
    rows: usize,
}

pub struct ConsoleSink {
    mode: OutputMode,
    surface: Mutex<Surface>,
}

impl ConsoleSink {
    pub fn new(mode: OutputMode) -> Self {
        Self::with_writers(mode, Box::new(io::stdout()), Box::new(io::stderr()))
    }

    pub fn with_writers(mode: OutputMode, out: Box<dyn Write + Send>, err: Box<dyn Write + Send>) -> Self {
        Self {
            mode,
            surface: Mutex::new(Surface { out, err, rows: 0 }),
        }
    }

    fn with_surface<F>(&self, f: F)
    where
        F: FnOnce(&mut Surface) -> io::Result<()>,
    {
        let mut surface = self.surface.lock().unwrap_or_else(PoisonError::into_inner);
        // A closed pipe must not take the load down with it
        if let Err(e) = f(&mut surface) {
            tracing::debug!(error = %e, "console write failed");
        }
    }
}

pub fn format_header() -> String {
    format!(
        "{:<12} {:<13} {:>18} {:>16} {:>16} {:>9}  {}",
        "TOKEN", "ADDRESS", "BALANCE", "PRICE", "VALUE", "24H", "NOTE"
    )
}

pub fn format_row(row: &TokenRow) -> String {
    format!(
        "{:<12} {:<13} {:>18} {:>16} {:>16} {:>9}  {}",
        row.label,
        shorten_address(row.address.as_str()),
        row.balance,
        row.price,
        row.value,
        row.change_24h,
        row.error.as_deref().unwrap_or("")
    )
    .trim_end()
    .to_string()
}

impl RenderSink for ConsoleSink {
    fn set_status(&self, text: &str, kind: StatusKind) {
        let tag = match kind {
            StatusKind::Ok => "ok",
            StatusKind::Warn => "warn",
        };
        self.with_surface(|s| writeln!(s.err, "[{}] {}", tag, text));
    }

    fn append_row(&self, row: &TokenRow) {
        if self.mode == OutputMode::Json {
            return;
        }
        self.with_surface(|s| {
            if s.rows == 0 {
                writeln!(s.out, "{}", format_header())?;
            }
            s.rows += 1;
            writeln!(s.out, "{}", format_row(row))
        });
    }

    fn clear_rows(&self) {
        self.with_surface(|s| {
            s.rows = 0;
            Ok(())
        });
    }

    // Summary lines only follow a printed table; the reset values are not echoed.
    fn set_total(&self, text: &str) {
        if self.mode == OutputMode::Json {
            return;
        }
        self.with_surface(|s| if s.rows > 0 { writeln!(s.out, "Total: {}", text) } else { Ok(()) });
    }

    fn set_meta(&self, text: &str) {
        if self.mode == OutputMode::Json {
            return;
        }
        self.with_surface(|s| if s.rows > 0 { writeln!(s.out, "{}", text) } else { Ok(()) });
    }
}
