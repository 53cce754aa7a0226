use proptest::prelude::*;

use super::*;

fn sum_square_error_reference(src_a: &[u8], src_b: &[u8]) -> u64 {
    src_a
        .iter()
        .zip(src_b)
        .map(|(&a, &b)| {
            let diff = i64::from(a) - i64::from(b);
            (diff * diff) as u64
        })
        .sum()
}

fn aligned_pair(max_vectors: usize) -> impl Strategy<Value = (Vec<u8>, Vec<u8>)> {
    (0..=max_vectors).prop_flat_map(|vectors| {
        let len = vectors * VECTOR_WIDTH;
        (
            proptest::collection::vec(any::<u8>(), len),
            proptest::collection::vec(any::<u8>(), len),
        )
    })
}

fn unaligned_pair(max_len: usize) -> impl Strategy<Value = (Vec<u8>, Vec<u8>)> {
    (0..=max_len).prop_flat_map(|len| {
        (
            proptest::collection::vec(any::<u8>(), len),
            proptest::collection::vec(any::<u8>(), len),
        )
    })
}

proptest! {
    #[test]
    fn scalar_matches_reference((a, b) in unaligned_pair(4096)) {
        let ours = u64::from(sum_square_error_scalar(&a, &b));
        prop_assert_eq!(ours, sum_square_error_reference(&a, &b));
    }

    #[test]
    fn every_backend_matches_scalar((a, b) in aligned_pair(256)) {
        let scalar = sum_square_error_scalar(&a, &b);
        for backend in Backend::available() {
            prop_assert_eq!(backend.sum_square_error(&a, &b), scalar, "backend {}", backend);
        }
    }

    #[test]
    fn every_backend_is_symmetric((a, b) in aligned_pair(64)) {
        for backend in Backend::available() {
            prop_assert_eq!(backend.sum_square_error(&a, &b), backend.sum_square_error(&b, &a));
        }
    }

    #[test]
    fn vector_kernels_ignore_trailing_partial_vector((a, b) in unaligned_pair(1024)) {
        let aligned = a.len() & !(VECTOR_WIDTH - 1);
        let expected = sum_square_error_scalar(&a[..aligned], &b[..aligned]);
        for backend in Backend::available() {
            if backend == Backend::Scalar {
                continue;
            }
            let Some(kernel) = backend.kernel() else { continue };
            let ours = unsafe { kernel(&a, &b) };
            prop_assert_eq!(ours, expected, "backend {}", backend);
        }
    }
}
