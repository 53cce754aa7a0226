use crate::common::{BLOCK_SIZE, MAX_PSNR, PEAK_SQUARED, VECTOR_WIDTH};
use crate::sse::{self, Backend, SumSquareErrorFn, sum_square_error_scalar};
use rayon::prelude::*;

/// How full blocks are reduced. The result is identical either way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Parallelism {
    Serial,
    #[default]
    Parallel,
}

/// PSNR in dB for a sum of squared errors over `size` samples, capped at
/// [`MAX_PSNR`].
///
/// `size` must be positive; zero gives NaN.
pub fn compute_psnr(sse: f64, size: f64) -> f64 {
    let min_sse = PEAK_SQUARED * size / 10f64.powf(MAX_PSNR / 10.0);
    if sse <= min_sse {
        return MAX_PSNR;
    }
    (10.0 * (PEAK_SQUARED * size / sse).log10()).min(MAX_PSNR)
}

/// Sum of squared differences over the first `count` bytes of both buffers,
/// using the fastest kernel for this CPU and reducing blocks on the rayon pool.
///
/// # Panics
/// If either buffer is shorter than `count`.
pub fn compute_sum_square_error(src_a: &[u8], src_b: &[u8], count: usize) -> f64 {
    accumulate(
        sse::active_kernel(),
        Parallelism::Parallel,
        &src_a[..count],
        &src_b[..count],
    ) as f64
}

/// Same as [`compute_sum_square_error`] with every block reduced on the
/// calling thread.
pub fn compute_sum_square_error_serial(src_a: &[u8], src_b: &[u8], count: usize) -> f64 {
    accumulate(
        sse::active_kernel(),
        Parallelism::Serial,
        &src_a[..count],
        &src_b[..count],
    ) as f64
}

/// Same as [`compute_sum_square_error`] with an explicit bulk backend and
/// reduction strategy. An unavailable backend falls back to scalar.
pub fn compute_sum_square_error_with(
    backend: Backend,
    parallelism: Parallelism,
    src_a: &[u8],
    src_b: &[u8],
    count: usize,
) -> f64 {
    accumulate(
        sse::kernel_or_scalar(backend),
        parallelism,
        &src_a[..count],
        &src_b[..count],
    ) as f64
}

// Full blocks go to `kernel`, one call each. What is left is split into a
// vector-width multiple (one more `kernel` call) and a 0..16 byte tail that
// only the scalar kernel may touch.
pub(crate) fn accumulate(
    kernel: SumSquareErrorFn,
    parallelism: Parallelism,
    src_a: &[u8],
    src_b: &[u8],
) -> u64 {
    debug_assert_eq!(src_a.len(), src_b.len());
    let count = src_a.len();

    let block_len = count & !(BLOCK_SIZE - 1);
    let (blocks_a, rest_a) = src_a.split_at(block_len);
    let (blocks_b, rest_b) = src_b.split_at(block_len);

    let mut sse: u64 = match parallelism {
        Parallelism::Parallel => blocks_a
            .par_chunks_exact(BLOCK_SIZE)
            .zip(blocks_b.par_chunks_exact(BLOCK_SIZE))
            .map(|(a, b)| u64::from(unsafe { kernel(a, b) }))
            .sum(),
        Parallelism::Serial => blocks_a
            .chunks_exact(BLOCK_SIZE)
            .zip(blocks_b.chunks_exact(BLOCK_SIZE))
            .map(|(a, b)| u64::from(unsafe { kernel(a, b) }))
            .sum(),
    };

    let vector_len = rest_a.len() & !(VECTOR_WIDTH - 1);
    let (vector_a, tail_a) = rest_a.split_at(vector_len);
    let (vector_b, tail_b) = rest_b.split_at(vector_len);

    if !vector_a.is_empty() {
        sse += u64::from(unsafe { kernel(vector_a, vector_b) });
    }
    if !tail_a.is_empty() {
        sse += u64::from(sum_square_error_scalar(tail_a, tail_b));
    }
    sse
}
