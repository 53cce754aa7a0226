#[cfg(target_arch = "x86")]
use core::arch::x86::*;
#[cfg(target_arch = "x86_64")]
use core::arch::x86_64::*;

use crate::common::VECTOR_WIDTH;

// |a - b| per byte without signed overflow: saturating subtract both ways, one
// side is zero. Widened to 16 bits and squared with pmaddwd, which also folds
// neighbouring pairs into 32-bit lanes.
#[inline]
#[target_feature(enable = "sse2")]
unsafe fn squared_diff_epi32(a: __m128i, b: __m128i, zero: __m128i) -> __m128i {
    let diff = _mm_or_si128(_mm_subs_epu8(a, b), _mm_subs_epu8(b, a));
    let lo = _mm_unpacklo_epi8(diff, zero);
    let hi = _mm_unpackhi_epi8(diff, zero);
    _mm_add_epi32(_mm_madd_epi16(lo, lo), _mm_madd_epi16(hi, hi))
}

#[inline]
#[target_feature(enable = "sse2")]
unsafe fn hsum_epi32(v: __m128i) -> u32 {
    let v = _mm_add_epi32(v, _mm_shuffle_epi32(v, 0xEE));
    let v = _mm_add_epi32(v, _mm_shuffle_epi32(v, 0x01));
    _mm_cvtsi128_si32(v) as u32
}

#[target_feature(enable = "sse2")]
pub unsafe fn sum_square_error_sse2(src_a: &[u8], src_b: &[u8]) -> u32 {
    let len = src_a.len().min(src_b.len()) & !(VECTOR_WIDTH - 1);
    let pa = src_a.as_ptr();
    let pb = src_b.as_ptr();

    let zero = _mm_setzero_si128();
    let mut acc0 = _mm_setzero_si128();
    let mut acc1 = _mm_setzero_si128();

    let mut i = 0;
    // Optimization: two accumulators so consecutive 16-byte steps don't serialize on paddd.
    while i + 32 <= len {
        let a0 = _mm_loadu_si128(pa.add(i) as *const __m128i);
        let b0 = _mm_loadu_si128(pb.add(i) as *const __m128i);
        let a1 = _mm_loadu_si128(pa.add(i + 16) as *const __m128i);
        let b1 = _mm_loadu_si128(pb.add(i + 16) as *const __m128i);

        acc0 = _mm_add_epi32(acc0, squared_diff_epi32(a0, b0, zero));
        acc1 = _mm_add_epi32(acc1, squared_diff_epi32(a1, b1, zero));

        i += 32;
    }
    if i < len {
        let a0 = _mm_loadu_si128(pa.add(i) as *const __m128i);
        let b0 = _mm_loadu_si128(pb.add(i) as *const __m128i);
        acc0 = _mm_add_epi32(acc0, squared_diff_epi32(a0, b0, zero));
    }

    hsum_epi32(_mm_add_epi32(acc0, acc1))
}

#[target_feature(enable = "avx2")]
pub unsafe fn sum_square_error_avx2(src_a: &[u8], src_b: &[u8]) -> u32 {
    let len = src_a.len().min(src_b.len()) & !(VECTOR_WIDTH - 1);
    let pa = src_a.as_ptr();
    let pb = src_b.as_ptr();

    let zero = _mm256_setzero_si256();
    let mut acc0 = _mm256_setzero_si256();
    let mut acc1 = _mm256_setzero_si256();

    let mut i = 0;
    while i + 64 <= len {
        let a0 = _mm256_loadu_si256(pa.add(i) as *const __m256i);
        let b0 = _mm256_loadu_si256(pb.add(i) as *const __m256i);
        let a1 = _mm256_loadu_si256(pa.add(i + 32) as *const __m256i);
        let b1 = _mm256_loadu_si256(pb.add(i + 32) as *const __m256i);

        let d0 = _mm256_or_si256(_mm256_subs_epu8(a0, b0), _mm256_subs_epu8(b0, a0));
        let d1 = _mm256_or_si256(_mm256_subs_epu8(a1, b1), _mm256_subs_epu8(b1, a1));

        // Unpack works per 128-bit lane; the interleaving doesn't matter for a sum.
        let d0_lo = _mm256_unpacklo_epi8(d0, zero);
        let d0_hi = _mm256_unpackhi_epi8(d0, zero);
        let d1_lo = _mm256_unpacklo_epi8(d1, zero);
        let d1_hi = _mm256_unpackhi_epi8(d1, zero);

        acc0 = _mm256_add_epi32(
            acc0,
            _mm256_add_epi32(_mm256_madd_epi16(d0_lo, d0_lo), _mm256_madd_epi16(d0_hi, d0_hi)),
        );
        acc1 = _mm256_add_epi32(
            acc1,
            _mm256_add_epi32(_mm256_madd_epi16(d1_lo, d1_lo), _mm256_madd_epi16(d1_hi, d1_hi)),
        );

        i += 64;
    }
    if i + 32 <= len {
        let a0 = _mm256_loadu_si256(pa.add(i) as *const __m256i);
        let b0 = _mm256_loadu_si256(pb.add(i) as *const __m256i);
        let d0 = _mm256_or_si256(_mm256_subs_epu8(a0, b0), _mm256_subs_epu8(b0, a0));
        let d0_lo = _mm256_unpacklo_epi8(d0, zero);
        let d0_hi = _mm256_unpackhi_epi8(d0, zero);
        acc0 = _mm256_add_epi32(
            acc0,
            _mm256_add_epi32(_mm256_madd_epi16(d0_lo, d0_lo), _mm256_madd_epi16(d0_hi, d0_hi)),
        );
        i += 32;
    }

    let acc = _mm256_add_epi32(acc0, acc1);
    let mut sum = _mm_add_epi32(
        _mm256_castsi256_si128(acc),
        _mm256_extracti128_si256(acc, 1),
    );

    // Lengths are multiples of 16, so at most one half-width step is left.
    if i < len {
        let a0 = _mm_loadu_si128(pa.add(i) as *const __m128i);
        let b0 = _mm_loadu_si128(pb.add(i) as *const __m128i);
        sum = _mm_add_epi32(sum, squared_diff_epi32(a0, b0, _mm_setzero_si128()));
    }

    hsum_epi32(sum)
}
