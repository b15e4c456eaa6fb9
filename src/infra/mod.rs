//! Pure building blocks with no I/O: frame checksum and fixed-point
//! conversions.
pub mod checksum;
pub mod conversion;
