//! Chunk-oriented batch ETL for daily order files
//!
//! Records flow from a [`io::CsvRecordStream`] through a per-record
//! [`engine::Transform`] into a [`engine::ChunkWriter`], one store
//! transaction per chunk. [`job::Job`] chains steps; [`report`] wires the
//! concrete order import, daily summary and user initialisation pipelines.

pub mod app;
pub mod domain;
pub mod engine;
pub mod io;
pub mod job;
pub mod prelude;
pub mod report;
pub mod storage;
