//! Database operations for the evaluation engine
//!
//! Schema is owned by `dealdesk_common::db`; these modules hold the
//! service's queries. Ids are stored as hyphenated UUID text, timestamps as
//! RFC3339, documents as serialized JSON.

pub mod activity;
pub mod analysis;
pub mod costs;
pub mod deals;
pub mod enrichment;
pub mod settings;
pub mod strategies;
pub mod switches;
