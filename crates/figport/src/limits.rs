//! Format constants and decoding limits.

/// Version number written to the `format:` header line.
pub const FORMAT_VERSION: u32 = 1;

/// Maximum decompressed document size in bytes (256 MiB).
pub const MAX_DOCUMENT_SIZE: usize = 256 * 1024 * 1024;

/// zstd level used when the caller does not pick one.
pub const DEFAULT_COMPRESSION_LEVEL: i32 = 19;
