#[cfg(target_arch = "aarch64")]
use core::arch::aarch64::*;

use crate::common::VECTOR_WIDTH;

// vabd gives |a - b| directly, 255^2 fits in a u16 lane after vmull, and
// vpadal folds pairs into the u32 accumulators.
#[cfg(target_arch = "aarch64")]
#[target_feature(enable = "neon")]
pub unsafe fn sum_square_error_neon(src_a: &[u8], src_b: &[u8]) -> u32 {
    let len = src_a.len().min(src_b.len()) & !(VECTOR_WIDTH - 1);
    let pa = src_a.as_ptr();
    let pb = src_b.as_ptr();

    let mut acc = [vdupq_n_u32(0); 4];

    let mut i = 0;
    while i + 32 <= len {
        let a0 = vld1q_u8(pa.add(i));
        let b0 = vld1q_u8(pb.add(i));
        let a1 = vld1q_u8(pa.add(i + 16));
        let b1 = vld1q_u8(pb.add(i + 16));

        let d0 = vabdq_u8(a0, b0);
        let d1 = vabdq_u8(a1, b1);

        acc[0] = vpadalq_u16(acc[0], vmull_u8(vget_low_u8(d0), vget_low_u8(d0)));
        acc[1] = vpadalq_u16(acc[1], vmull_high_u8(d0, d0));
        acc[2] = vpadalq_u16(acc[2], vmull_u8(vget_low_u8(d1), vget_low_u8(d1)));
        acc[3] = vpadalq_u16(acc[3], vmull_high_u8(d1, d1));

        i += 32;
    }
    if i < len {
        let a0 = vld1q_u8(pa.add(i));
        let b0 = vld1q_u8(pb.add(i));
        let d0 = vabdq_u8(a0, b0);
        acc[0] = vpadalq_u16(acc[0], vmull_u8(vget_low_u8(d0), vget_low_u8(d0)));
        acc[1] = vpadalq_u16(acc[1], vmull_high_u8(d0, d0));
    }

    vaddvq_u32(vaddq_u32(vaddq_u32(acc[0], acc[1]), vaddq_u32(acc[2], acc[3])))
}
