//! Events emitted by committed ledger operations.
//!
//! An event is appended if and only if the state mutation it describes
//! committed. The [`EventLog`] is the append-only record; the [`EventBus`]
//! pushes the same events to live subscribers.

use serde::{Deserialize, Serialize};
use x1c_types::{Address, Timestamp, TokenAmount};

/// Ledger-level events that observers can read from the log or subscribe to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerEvent {
    /// Spendable tokens moved between two holders.
    Transferred {
        from: Address,
        to: Address,
        amount: TokenAmount,
    },
    /// An allowance was set (overwritten).
    Approved {
        owner: Address,
        spender: Address,
        amount: TokenAmount,
    },
    /// Tokens became spendable for the first time: genesis allocation,
    /// team release, or staking reward.
    Issued { to: Address, amount: TokenAmount },
    /// Principal moved from a spendable balance into stake escrow.
    Staked {
        address: Address,
        amount: TokenAmount,
        start: Timestamp,
    },
    /// A stake was withdrawn with its reward.
    Unstaked {
        address: Address,
        principal: TokenAmount,
        reward: TokenAmount,
    },
}

/// A log entry: the event plus its position in commit order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Zero-based, gap-free sequence number.
    pub seq: u64,
    /// Time of the operation that emitted the event.
    pub at: Timestamp,
    pub event: LedgerEvent,
}

/// Append-only event log.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct EventLog {
    records: Vec<EventRecord>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the events of one committed operation; returns their records.
    pub fn append(&mut self, at: Timestamp, events: Vec<LedgerEvent>) -> &[EventRecord] {
        let first = self.records.len();
        for event in events {
            let seq = self.records.len() as u64;
            self.records.push(EventRecord { seq, at, event });
        }
        &self.records[first..]
    }

    pub fn records(&self) -> &[EventRecord] {
        &self.records
    }

    /// Records with `seq >= from`.
    pub fn since(&self, from: u64) -> &[EventRecord] {
        let start = usize::try_from(from)
            .unwrap_or(usize::MAX)
            .min(self.records.len());
        &self.records[start..]
    }
}

/// Synchronous fan-out event bus.
///
/// Listeners are invoked inline while the ledger lock is held; keep handlers
/// fast and never call back into the ledger from one.
pub struct EventBus {
    listeners: Vec<Box<dyn Fn(&EventRecord) + Send + Sync>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }

    pub fn subscribe(&mut self, listener: Box<dyn Fn(&EventRecord) + Send + Sync>) {
        self.listeners.push(listener);
    }

    pub fn emit(&self, record: &EventRecord) {
        for listener in &self.listeners {
            listener(record);
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
