//! Chunked upload range validation.
//!
//! The chunk relay is stateless: every call re-validates the byte range
//! against the declared total before anything is sent upstream.

use crate::error::AppError;

/// Default cap on a single relayed chunk.
pub const DEFAULT_MAX_CHUNK_BYTES: usize = 2 * 1024 * 1024;

/// One byte range of a chunked upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkRange {
    pub start: u64,
    pub end_exclusive: u64,
    pub total_bytes: u64,
}

impl ChunkRange {
    /// Validate the range against the chunk body and the configured cap.
    /// `end_exclusive - start` must equal the body length, the range must
    /// lie within `total_bytes`, and the body must not exceed the cap.
    pub fn validate(&self, chunk_len: usize, max_chunk_bytes: usize) -> Result<(), AppError> {
        if self.total_bytes == 0 {
            return Err(AppError::InvalidInput(
                "Total size must be greater than 0".to_string(),
            ));
        }
        if self.end_exclusive <= self.start {
            return Err(AppError::InvalidInput(format!(
                "Byte range is empty or inverted: {}..{}",
                self.start, self.end_exclusive
            )));
        }
        if self.end_exclusive > self.total_bytes {
            return Err(AppError::InvalidInput(format!(
                "Byte range {}..{} exceeds declared total of {} bytes",
                self.start, self.end_exclusive, self.total_bytes
            )));
        }
        let span = self.end_exclusive - self.start;
        if span != chunk_len as u64 {
            return Err(AppError::InvalidInput(format!(
                "Byte range spans {} bytes but chunk body has {} bytes",
                span, chunk_len
            )));
        }
        if chunk_len > max_chunk_bytes {
            return Err(AppError::PayloadTooLarge(format!(
                "Chunk of {} bytes exceeds maximum of {} bytes",
                chunk_len, max_chunk_bytes
            )));
        }
        Ok(())
    }

    /// Whether this range is the final one of the upload.
    pub fn is_final(&self) -> bool {
        self.end_exclusive == self.total_bytes
    }

    /// Content-Range header value for the upstream PUT:
    /// `bytes start-last/total`.
    pub fn content_range(&self) -> String {
        format!(
            "bytes {}-{}/{}",
            self.start,
            self.end_exclusive - 1,
            self.total_bytes
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(start: u64, end_exclusive: u64, total: u64) -> ChunkRange {
        ChunkRange {
            start,
            end_exclusive,
            total_bytes: total,
        }
    }

    #[test]
    fn well_formed_range_passes() {
        let r = range(0, 1024, 4096);
        assert!(r.validate(1024, DEFAULT_MAX_CHUNK_BYTES).is_ok());
        assert!(!r.is_final());
        assert_eq!(r.content_range(), "bytes 0-1023/4096");
    }

    #[test]
    fn final_range_is_detected() {
        let r = range(3072, 4096, 4096);
        assert!(r.validate(1024, DEFAULT_MAX_CHUNK_BYTES).is_ok());
        assert!(r.is_final());
        assert_eq!(r.content_range(), "bytes 3072-4095/4096");
    }

    #[test]
    fn length_mismatch_is_rejected() {
        let r = range(0, 1024, 4096);
        let err = r.validate(512, DEFAULT_MAX_CHUNK_BYTES).unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }

    #[test]
    fn inverted_and_out_of_bounds_ranges_are_rejected() {
        assert!(range(1024, 1024, 4096)
            .validate(0, DEFAULT_MAX_CHUNK_BYTES)
            .is_err());
        assert!(range(2048, 1024, 4096)
            .validate(1024, DEFAULT_MAX_CHUNK_BYTES)
            .is_err());
        assert!(range(3072, 5000, 4096)
            .validate(1928, DEFAULT_MAX_CHUNK_BYTES)
            .is_err());
    }

    #[test]
    fn oversized_chunk_is_rejected() {
        let total = (DEFAULT_MAX_CHUNK_BYTES * 2) as u64;
        let too_big = DEFAULT_MAX_CHUNK_BYTES + 1;
        let r = range(0, too_big as u64, total);
        let err = r.validate(too_big, DEFAULT_MAX_CHUNK_BYTES).unwrap_err();
        assert!(matches!(err, AppError::PayloadTooLarge(_)));
    }

    #[test]
    fn zero_total_is_rejected() {
        assert!(range(0, 1, 0).validate(1, DEFAULT_MAX_CHUNK_BYTES).is_err());
    }
}
