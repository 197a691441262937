//! Core domain layer for Audience Report.
//!
//! Defines the cell-grid input model, the normalized viewing-figure and
//! schedule types, and the parsers that turn loosely formatted spreadsheet
//! tokens (time slots, dates, filenames) into canonical values.

pub mod dates;
pub mod demographics;
pub mod error;
pub mod grid;
pub mod labels;
pub mod models;
pub mod time_slots;
