/// Bytes consumed per step by the vectorized kernels. Bulk kernels only
/// accept lengths that are a multiple of this.
pub const VECTOR_WIDTH: usize = 16;

/// Reduction unit for the block loop. 32768 * 255^2 still fits in a u32, so
/// a single kernel call over one block never wraps.
pub const BLOCK_SIZE: usize = 1 << 15;

/// Largest reportable PSNR in dB. An SSE of zero maps here instead of +inf.
pub const MAX_PSNR: f64 = 128.0;

pub const PEAK_SAMPLE: f64 = 255.0;
pub const PEAK_SQUARED: f64 = PEAK_SAMPLE * PEAK_SAMPLE;

const _: () = assert!(BLOCK_SIZE.is_power_of_two());
const _: () = assert!(BLOCK_SIZE % VECTOR_WIDTH == 0);
const _: () = assert!((BLOCK_SIZE as u64) * 65025 <= u32::MAX as u64);
