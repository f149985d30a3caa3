//! ICS file parsing.
//!
//! Events are read from .ics files according to RFC 5545. focustime never writes them.

mod parse;

pub use parse::{parse_event, parse_events};
