//! Selection state and sample-data fetch tickets.
//!
//! Sample rows for the selected table are fetched outside the engine. Each
//! request is tagged with a ticket; a result is applied only if its ticket is
//! still the current one, so a reply that arrives after the selection moved on
//! is dropped.

use serde::{Deserialize, Serialize};

/// A cell in the sample-data grid (row, column).
pub type SampleCell = (usize, usize);

/// What the user has selected on the canvas.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub table: Option<String>,
    pub field: Option<String>,
    /// Index into the model's relationship list
    pub relationship: Option<usize>,
    pub sample_cell: Option<SampleCell>,
}

/// Which stage of Escape handling ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscapeStage {
    /// Only the sample cell was cleared.
    SampleCell,
    /// Table, field and relationship selection were cleared.
    Selection,
    /// Nothing was selected.
    Nothing,
}

impl Selection {
    pub fn is_empty(&self) -> bool {
        self.table.is_none()
            && self.field.is_none()
            && self.relationship.is_none()
            && self.sample_cell.is_none()
    }

    /// Select a whole table.
    pub fn select_table(&mut self, table: impl Into<String>) {
        *self = Self {
            table: Some(table.into()),
            ..Self::default()
        };
    }

    /// Select a field; also selects its table.
    pub fn select_field(&mut self, table: impl Into<String>, field: impl Into<String>) {
        *self = Self {
            table: Some(table.into()),
            field: Some(field.into()),
            ..Self::default()
        };
    }

    pub fn select_relationship(&mut self, index: usize) {
        *self = Self {
            relationship: Some(index),
            ..Self::default()
        };
    }

    /// Select a sample-data cell of the selected table.
    pub fn select_sample_cell(&mut self, cell: SampleCell) {
        self.sample_cell = Some(cell);
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Clear the most specific selection: the sample cell first, everything
    /// else on the next call.
    pub fn escape(&mut self) -> EscapeStage {
        if self.sample_cell.take().is_some() {
            return EscapeStage::SampleCell;
        }
        if self.is_empty() {
            return EscapeStage::Nothing;
        }
        self.clear();
        EscapeStage::Selection
    }
}

/// Ticket handed out for one sample-data request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FetchTicket {
    pub id: u64,
    pub table: String,
}

/// Tracks the one sample-data request that may still be applied.
#[derive(Debug, Clone, Default)]
pub struct SampleFetchTracker {
    next_id: u64,
    current: Option<FetchTicket>,
}

impl SampleFetchTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a request for `table`, superseding any request in flight.
    pub fn begin(&mut self, table: impl Into<String>) -> FetchTicket {
        self.next_id += 1;
        let ticket = FetchTicket {
            id: self.next_id,
            table: table.into(),
        };
        self.current = Some(ticket.clone());
        ticket
    }

    /// Whether a result carrying `ticket` may be applied. Consumes the
    /// current ticket on success.
    pub fn accept(&mut self, ticket: &FetchTicket) -> bool {
        if self.current.as_ref() == Some(ticket) {
            self.current = None;
            true
        } else {
            tracing::debug!(id = ticket.id, table = %ticket.table, "stale sample result discarded");
            false
        }
    }

    /// Drop the request in flight. Returns whether there was one.
    pub fn cancel(&mut self) -> bool {
        self.current.take().is_some()
    }

    pub fn in_flight(&self) -> Option<&FetchTicket> {
        self.current.as_ref()
    }
}
