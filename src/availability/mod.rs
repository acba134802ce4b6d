//! Room availability and reservation engine.
//!
//! Everything in here except the aggregator and the reservation checker is
//! pure: it works on events that have already been fetched and never blocks.

pub mod aggregator;
pub mod event_set;
pub mod reducer;
pub mod reservation;
pub mod resolver;

pub use aggregator::{snapshot, FailureReason, RoomFailure, Snapshot, SnapshotOptions};
pub use event_set::{EventSet, TimeWindow};
pub use reducer::{busy_spans, free_slots, reduce, OccupiedSpan};
pub use reservation::{check_and_reserve, find_conflicts, ReservationOutcome, ReservationRequest};
pub use resolver::{resolve, RoomStatus};
