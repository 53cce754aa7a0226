use crate::psnr::{self, Parallelism};
use crate::sse::{self, Backend};
use std::io;

/// Checked front end over the raw primitives.
///
/// ```
/// use libpsnr::{Comparator, Parallelism};
///
/// let reference = vec![128u8; 1024];
/// let mut decoded = reference.clone();
/// decoded[0] = 129;
///
/// let comparator = Comparator::new().with_parallelism(Parallelism::Serial);
/// assert_eq!(comparator.sum_square_error(&reference, &decoded)?, 1);
/// assert!(comparator.psnr(&reference, &decoded)? > 70.0);
/// # Ok::<(), std::io::Error>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Comparator {
    backend: Backend,
    parallelism: Parallelism,
}

impl Comparator {
    pub fn new() -> Self {
        Self {
            backend: Backend::active(),
            parallelism: Parallelism::default(),
        }
    }

    pub fn with_backend(mut self, backend: Backend) -> io::Result<Self> {
        if !backend.is_available() {
            return Err(io::Error::new(
                io::ErrorKind::Unsupported,
                format!("{backend} backend is not supported on this CPU"),
            ));
        }
        self.backend = backend;
        Ok(self)
    }

    pub fn with_parallelism(mut self, parallelism: Parallelism) -> Self {
        self.parallelism = parallelism;
        self
    }

    pub fn backend(&self) -> Backend {
        self.backend
    }

    pub fn parallelism(&self) -> Parallelism {
        self.parallelism
    }

    pub fn sum_square_error(&self, src_a: &[u8], src_b: &[u8]) -> io::Result<u64> {
        check_lengths(src_a, src_b)?;
        Ok(psnr::accumulate(
            sse::kernel_or_scalar(self.backend),
            self.parallelism,
            src_a,
            src_b,
        ))
    }

    /// Mean squared error per sample.
    pub fn mse(&self, src_a: &[u8], src_b: &[u8]) -> io::Result<f64> {
        check_non_empty(src_a)?;
        let sse = self.sum_square_error(src_a, src_b)?;
        Ok(sse as f64 / src_a.len() as f64)
    }

    pub fn psnr(&self, src_a: &[u8], src_b: &[u8]) -> io::Result<f64> {
        check_non_empty(src_a)?;
        let sse = self.sum_square_error(src_a, src_b)?;
        Ok(psnr::compute_psnr(sse as f64, src_a.len() as f64))
    }
}

impl Default for Comparator {
    fn default() -> Self {
        Self::new()
    }
}

fn check_lengths(src_a: &[u8], src_b: &[u8]) -> io::Result<()> {
    if src_a.len() != src_b.len() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!(
                "buffer lengths differ: {} vs {}",
                src_a.len(),
                src_b.len()
            ),
        ));
    }
    Ok(())
}

fn check_non_empty(src: &[u8]) -> io::Result<()> {
    if src.is_empty() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "PSNR is undefined for empty buffers",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::MAX_PSNR;

    #[test]
    fn defaults_follow_active_backend() {
        let comparator = Comparator::default();
        assert_eq!(comparator.backend(), Backend::active());
        assert_eq!(comparator.parallelism(), Parallelism::Parallel);
    }

    #[test]
    fn scalar_backend_is_always_accepted() {
        let comparator = Comparator::new().with_backend(Backend::Scalar).unwrap();
        assert_eq!(comparator.backend(), Backend::Scalar);
    }

    #[test]
    fn unsupported_backend_is_rejected() {
        for backend in Backend::PREFERENCE {
            let result = Comparator::new().with_backend(backend);
            if backend.is_available() {
                assert!(result.is_ok());
            } else {
                assert_eq!(result.unwrap_err().kind(), io::ErrorKind::Unsupported);
            }
        }
    }

    #[test]
    fn mismatched_lengths_are_rejected() {
        let comparator = Comparator::new();
        let err = comparator.sum_square_error(&[1, 2, 3], &[1, 2]).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
        let err = comparator.psnr(&[1, 2, 3], &[1, 2]).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }

    #[test]
    fn empty_buffers() {
        let comparator = Comparator::new();
        assert_eq!(comparator.sum_square_error(&[], &[]).unwrap(), 0);
        let err = comparator.psnr(&[], &[]).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
        let err = comparator.mse(&[], &[]).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }

    #[test]
    fn identical_buffers_hit_ceiling() {
        let data: Vec<u8> = (0..100_000).map(|i| (i % 251) as u8).collect();
        let comparator = Comparator::new();
        assert_eq!(comparator.psnr(&data, &data).unwrap(), MAX_PSNR);
        assert_eq!(comparator.mse(&data, &data).unwrap(), 0.0);
    }

    #[test]
    fn mse_known_value() {
        let comparator = Comparator::new();
        // (9 + 16) / 2
        assert_eq!(comparator.mse(&[0, 0], &[3, 4]).unwrap(), 12.5);
    }
}
