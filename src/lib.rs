pub mod adas_errors;
pub mod block_reader;
pub mod constants;
pub mod conversion;
pub mod formats;
pub mod labeled_array;
pub mod provider;
pub mod rate;

pub use adas_errors::AdasError;
pub use formats::{read_lines, read_str, AdasData, AdasFormat, OutputMode};
pub use labeled_array::{AttrValue, Coordinate, LabeledArray, LabeledDataset};
pub use provider::{load, ContentProvider, LocalCache, LocalDirectory, ProviderSettings};
pub use rate::{maxwell_rate, rate_coefficient, Temperature};
