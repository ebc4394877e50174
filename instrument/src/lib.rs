//! Event recorder for play sessions.
//!
//! A `tracing` subscriber that turns each gameplay event into a row of a
//! column table named after the event's target (`spawn`, `serve`, ...).
//! Columns appear as fields are first seen; rows missing a field get the
//! column's zero value.
//!
//! ```ignore
//! // In game code:
//! tracing::info!(target: "serve", tick, customer_id, tier);
//!
//! // In a test:
//! let (_, log) = instrument::capture(|| run_session());
//! let serves = log.table("serve").unwrap().to_dataframe()?;
//! ```

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use polars::prelude::*;
use tracing::field::{Field, Visit};
use tracing::span::{Attributes, Record};
use tracing::subscriber::DefaultGuard;
use tracing::{Event, Id, Metadata, Subscriber};

// ============================================================================
// Tables
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    U64(u64),
    I64(i64),
    F64(f64),
    Bool(bool),
    Str(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    U64(Vec<u64>),
    I64(Vec<i64>),
    F64(Vec<f64>),
    Bool(Vec<bool>),
    Str(Vec<String>),
}

impl ColumnData {
    /// Empty column of the cell's type, pre-filled with `rows` zero values.
    fn for_cell(cell: &Cell, rows: usize) -> Self {
        match cell {
            Cell::U64(_) => ColumnData::U64(vec![0; rows]),
            Cell::I64(_) => ColumnData::I64(vec![0; rows]),
            Cell::F64(_) => ColumnData::F64(vec![0.0; rows]),
            Cell::Bool(_) => ColumnData::Bool(vec![false; rows]),
            Cell::Str(_) => ColumnData::Str(vec![String::new(); rows]),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ColumnData::U64(v) => v.len(),
            ColumnData::I64(v) => v.len(),
            ColumnData::F64(v) => v.len(),
            ColumnData::Bool(v) => v.len(),
            ColumnData::Str(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append a cell. Integer cells widen into the column's type; any other
    /// mismatch stores the zero value so rows stay aligned.
    fn push(&mut self, cell: Option<Cell>) {
        match (self, cell) {
            (ColumnData::U64(v), Some(Cell::U64(x))) => v.push(x),
            (ColumnData::U64(v), Some(Cell::I64(x))) => v.push(u64::try_from(x).unwrap_or(0)),
            (ColumnData::U64(v), _) => v.push(0),
            (ColumnData::I64(v), Some(Cell::I64(x))) => v.push(x),
            (ColumnData::I64(v), Some(Cell::U64(x))) => v.push(i64::try_from(x).unwrap_or(i64::MAX)),
            (ColumnData::I64(v), _) => v.push(0),
            (ColumnData::F64(v), Some(Cell::F64(x))) => v.push(x),
            (ColumnData::F64(v), _) => v.push(0.0),
            (ColumnData::Bool(v), Some(Cell::Bool(x))) => v.push(x),
            (ColumnData::Bool(v), _) => v.push(false),
            (ColumnData::Str(v), Some(Cell::Str(x))) => v.push(x),
            (ColumnData::Str(v), _) => v.push(String::new()),
        }
    }

    fn to_column(&self, name: &str) -> Column {
        match self {
            ColumnData::U64(v) => Column::new(name.into(), v),
            ColumnData::I64(v) => Column::new(name.into(), v),
            ColumnData::F64(v) => Column::new(name.into(), v),
            ColumnData::Bool(v) => Column::new(name.into(), v),
            ColumnData::Str(v) => Column::new(name.into(), v),
        }
    }
}

/// Rows recorded for one event target. Columns are kept in name order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventTable {
    columns: BTreeMap<String, ColumnData>,
    rows: usize,
}

impl EventTable {
    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn column(&self, name: &str) -> Option<&ColumnData> {
        self.columns.get(name)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    /// Append one row.
    pub fn push_row(&mut self, mut row: BTreeMap<String, Cell>) {
        for (name, column) in self.columns.iter_mut() {
            column.push(row.remove(name));
        }
        for (name, cell) in row {
            let mut column = ColumnData::for_cell(&cell, self.rows);
            column.push(Some(cell));
            self.columns.insert(name, column);
        }
        self.rows += 1;
    }

    pub fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        DataFrame::new(
            self.columns
                .iter()
                .map(|(name, data)| data.to_column(name))
                .collect(),
        )
    }
}

/// Every table recorded on this thread, keyed by target.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventLog {
    tables: BTreeMap<String, EventTable>,
}

impl EventLog {
    pub fn table(&self, target: &str) -> Option<&EventTable> {
        self.tables.get(target)
    }

    /// Rows recorded under `target`, zero if none.
    pub fn count(&self, target: &str) -> usize {
        self.tables.get(target).map_or(0, EventTable::rows)
    }

    pub fn targets(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn to_dataframes(&self) -> PolarsResult<BTreeMap<String, DataFrame>> {
        self.tables
            .iter()
            .map(|(name, table)| Ok((name.clone(), table.to_dataframe()?)))
            .collect()
    }

    /// Write each table to `{dir}/{target}.parquet`.
    pub fn write_parquet(&self, dir: &Path) -> PolarsResult<()> {
        std::fs::create_dir_all(dir).map_err(io_error)?;
        for (name, mut df) in self.to_dataframes()? {
            let file = std::fs::File::create(dir.join(format!("{name}.parquet"))).map_err(io_error)?;
            ParquetWriter::new(file).finish(&mut df)?;
        }
        Ok(())
    }
}

fn io_error(error: std::io::Error) -> PolarsError {
    PolarsError::IO {
        error: error.into(),
        msg: None,
    }
}

thread_local! {
    static LOG: RefCell<EventLog> = RefCell::default();
}

/// Take everything recorded on this thread so far.
pub fn drain() -> EventLog {
    LOG.with(|log| std::mem::take(&mut *log.borrow_mut()))
}

pub fn clear() {
    LOG.with(|log| *log.borrow_mut() = EventLog::default());
}

// ============================================================================
// Subscriber
// ============================================================================

#[derive(Default)]
struct RowVisitor {
    row: BTreeMap<String, Cell>,
}

impl RowVisitor {
    fn set(&mut self, field: &Field, cell: Cell) {
        self.row.insert(field.name().to_string(), cell);
    }
}

impl Visit for RowVisitor {
    fn record_u64(&mut self, field: &Field, value: u64) {
        self.set(field, Cell::U64(value));
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.set(field, Cell::I64(value));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.set(field, Cell::F64(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.set(field, Cell::Bool(value));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.set(field, Cell::Str(value.to_string()));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.set(field, Cell::Str(format!("{value:?}")));
    }
}

/// Records info-level events into the thread-local [`EventLog`]. Spans are
/// ignored.
pub struct TableSubscriber;

impl Subscriber for TableSubscriber {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.is_event() && *metadata.level() <= tracing::Level::INFO
    }

    fn new_span(&self, _span: &Attributes<'_>) -> Id {
        Id::from_u64(1)
    }

    fn record(&self, _span: &Id, _values: &Record<'_>) {}

    fn record_follows_from(&self, _span: &Id, _follows: &Id) {}

    fn event(&self, event: &Event<'_>) {
        let mut visitor = RowVisitor::default();
        event.record(&mut visitor);
        let target = event.metadata().target();
        LOG.with(|log| {
            log.borrow_mut()
                .tables
                .entry(target.to_string())
                .or_default()
                .push_row(visitor.row);
        });
    }

    fn enter(&self, _span: &Id) {}

    fn exit(&self, _span: &Id) {}
}

/// Run `f` with the recorder installed on this thread and return what it
/// logged. Anything recorded earlier on the thread is discarded.
pub fn capture<R>(f: impl FnOnce() -> R) -> (R, EventLog) {
    clear();
    let out = tracing::subscriber::with_default(TableSubscriber, f);
    (out, drain())
}

// ============================================================================
// Session recorder
// ============================================================================

/// RAII guard that records one play session and writes it out on drop.
///
/// Installs [`TableSubscriber`] as this thread's default for its lifetime.
/// On drop the tables land in `{parent}/{name}_seed{seed}/*.parquet`,
/// followed by an empty `_ready` marker once every file is written.
///
/// ```ignore
/// let mut rec = instrument::SessionRecorder::new("runs", "smoke", 42);
/// // ... play ...
/// assert!(rec.log().count("serve") > 0);
/// ```
pub struct SessionRecorder {
    dir: PathBuf,
    log: Option<EventLog>,
    _guard: DefaultGuard,
}

impl SessionRecorder {
    pub fn new(parent: impl Into<PathBuf>, name: &str, seed: u64) -> Self {
        let name: String = name
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
            .collect();
        clear();
        Self {
            dir: parent.into().join(format!("{name}_seed{seed}")),
            log: None,
            _guard: tracing::subscriber::set_default(TableSubscriber),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// The recorded tables. The first call drains the thread's log; later
    /// events are not picked up.
    pub fn log(&mut self) -> &EventLog {
        self.log.get_or_insert_with(drain)
    }
}

impl Drop for SessionRecorder {
    fn drop(&mut self) {
        let log = self.log.take().unwrap_or_else(drain);
        if log.is_empty() {
            return;
        }
        if let Err(e) = log.write_parquet(&self.dir) {
            eprintln!("SessionRecorder: failed to write {}: {e}", self.dir.display());
            return;
        }
        if let Err(e) = std::fs::File::create(self.dir.join("_ready")) {
            eprintln!("SessionRecorder: failed to mark {} ready: {e}", self.dir.display());
        }
    }
}
