//! File formats: IDF text records and Schedule:File CSV columns.

pub mod idf;
pub mod schedule_file;
