//! Append-only typed event journal
//!
//! Every state transition a registry performs is recorded as a domain event.
//! The journal is the durable, ordered record an off-chain observer replays
//! to reconstruct ownership and storage allocation, so events are appended in
//! exactly the order their effects were applied and are never rewritten.
//!
//! # Example
//!
//! ```ignore
//! let mut journal = Journal::new();
//! journal.record(block, IdentityEvent::Register { to, fid, recovery });
//! for envelope in journal.envelopes() {
//!     println!("{}", serde_json::to_string(&envelope)?);
//! }
//! ```

use crate::types::Block;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::sync::atomic::{AtomicU64, Ordering};

/// Emission stamps shared by every journal in the process.
static EMISSION_COUNTER: AtomicU64 = AtomicU64::new(0);

fn next_emission() -> u64 {
    EMISSION_COUNTER.fetch_add(1, Ordering::SeqCst)
}

/// A domain event type.
pub trait DomainEvent: Debug + Clone + Serialize + Send + Sync + 'static {
    /// Domain identifier, e.g. `"identity"`
    fn type_id(&self) -> &'static str;

    /// Variant name, e.g. `"register"`
    fn sub_type(&self) -> &'static str;

    /// Schema version; bump on breaking payload changes
    fn schema_version(&self) -> u16 {
        1
    }
}

/// An event with its position in the journal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recorded<E> {
    /// Position in this journal, starting at 0
    pub sequence: u64,
    /// Emission stamp, strictly increasing across all journals in the process.
    ///
    /// Stamps are not dense: a rolled-back transaction leaves a gap.
    pub emission: u64,
    /// Block the event was emitted in
    pub block: Block,
    /// The event itself
    pub event: E,
}

/// Serialized form of a recorded event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventEnvelope {
    /// Domain identifier
    pub type_id: String,
    /// Variant name
    pub sub_type: String,
    /// Schema version
    pub schema_version: u16,
    /// Position in the source journal
    pub sequence: u64,
    /// Emission stamp; merge journals by sorting on it
    pub emission: u64,
    /// Block the event was emitted in
    pub block: Block,
    /// JSON payload
    pub payload: serde_json::Value,
}

/// Ordered event log for one registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Journal<E> {
    entries: Vec<Recorded<E>>,
    next_sequence: u64,
}

impl<E> Default for Journal<E> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            next_sequence: 0,
        }
    }
}

impl<E: DomainEvent> Journal<E> {
    /// Empty journal
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `event` emitted in `block`
    pub fn record(&mut self, block: Block, event: E) {
        tracing::trace!(
            domain = event.type_id(),
            event = event.sub_type(),
            sequence = self.next_sequence,
            "event recorded"
        );
        self.entries.push(Recorded {
            sequence: self.next_sequence,
            emission: next_emission(),
            block,
            event,
        });
        self.next_sequence += 1;
    }

    /// Events still held, in emission order
    pub fn entries(&self) -> &[Recorded<E>] {
        &self.entries
    }

    /// Events still held, without metadata
    pub fn events(&self) -> impl Iterator<Item = &E> {
        self.entries.iter().map(|recorded| &recorded.event)
    }

    /// Most recent event
    pub fn last(&self) -> Option<&E> {
        self.entries.last().map(|recorded| &recorded.event)
    }

    /// Number of events held
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no events are held
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove and return held events; sequence numbering continues
    pub fn drain(&mut self) -> Vec<Recorded<E>> {
        std::mem::take(&mut self.entries)
    }

    /// Serialize held events
    pub fn envelopes(&self) -> Result<Vec<EventEnvelope>, serde_json::Error> {
        self.entries
            .iter()
            .map(|recorded| {
                Ok(EventEnvelope {
                    type_id: recorded.event.type_id().to_string(),
                    sub_type: recorded.event.sub_type().to_string(),
                    schema_version: recorded.event.schema_version(),
                    sequence: recorded.sequence,
                    emission: recorded.emission,
                    block: recorded.block,
                    payload: serde_json::to_value(&recorded.event)?,
                })
            })
            .collect()
    }

    /// Serialize and remove held events; nothing is removed on failure
    pub fn drain_envelopes(&mut self) -> Result<Vec<EventEnvelope>, serde_json::Error> {
        let envelopes = self.envelopes()?;
        self.entries.clear();
        Ok(envelopes)
    }
}
