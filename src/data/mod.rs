//! Data module - CSV loading and row normalization

mod loader;
mod normalizer;
mod record;

pub use loader::{DataLoader, LoaderError};
pub use normalizer::RowNormalizer;
pub use record::{AttendanceRecord, Field, RawRow};
