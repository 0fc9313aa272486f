//! Statement text acquisition and garbled-text detection.

pub mod acquisition;
pub mod garbled;

pub use acquisition::{first_page_sample, AcquiredText, DefaultTextAcquisition, TextAcquisition};
pub use garbled::{non_ascii_ratio, GarbledTextDetector};
