pub mod tables;
pub mod tiff;
