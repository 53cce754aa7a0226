#![allow(unsafe_op_in_unsafe_fn)]
pub mod api;
pub mod common;
pub mod psnr;
pub mod sse;

pub use api::Comparator;
pub use common::{BLOCK_SIZE, MAX_PSNR, VECTOR_WIDTH};
pub use psnr::{
    Parallelism, compute_psnr, compute_sum_square_error, compute_sum_square_error_serial,
    compute_sum_square_error_with,
};
pub use sse::Backend;
