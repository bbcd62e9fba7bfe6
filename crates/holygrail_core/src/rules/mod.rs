//! Store-agnostic rules over domain records.
//!
//! # Responsibility
//! - Resolve effective due dates from mission and quest.
//! - Validate blocked-by links between missions.
//! - Decide mission visibility against one consistent snapshot.
//!
//! # Invariants
//! - Rules never read storage; callers hand them records.

pub mod due;
pub mod visibility;
pub mod wait_chain;
