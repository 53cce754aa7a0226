use crate::common::VECTOR_WIDTH;
use std::fmt;
use std::sync::OnceLock;

/// Sum of squared differences of two equal-length slices, wrapping modulo 2^32.
///
/// Valid for any length. The dispatcher also uses it for the sub-vector tail.
#[inline]
pub fn sum_square_error_scalar(src_a: &[u8], src_b: &[u8]) -> u32 {
    debug_assert_eq!(src_a.len(), src_b.len());
    let mut sse = 0u32;

    // Optimization: four independent lanes break the dependency on `sse`.
    let mut chunks_a = src_a.chunks_exact(4);
    let mut chunks_b = src_b.chunks_exact(4);
    let mut lanes = [0u32; 4];
    for (ca, cb) in chunks_a.by_ref().zip(chunks_b.by_ref()) {
        for k in 0..4 {
            let diff = ca[k] as i32 - cb[k] as i32;
            lanes[k] = lanes[k].wrapping_add((diff * diff) as u32);
        }
    }
    for lane in lanes {
        sse = sse.wrapping_add(lane);
    }

    for (&a, &b) in chunks_a.remainder().iter().zip(chunks_b.remainder()) {
        let diff = a as i32 - b as i32;
        sse = sse.wrapping_add((diff * diff) as u32);
    }
    sse
}

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
mod x86;

#[cfg(target_arch = "aarch64")]
mod arm;

#[cfg(test)]
mod proptests;

/// Kernel signature shared by every backend.
///
/// # Safety
/// The CPU must support the backend's instruction set. Vector kernels only
/// read `len & !(VECTOR_WIDTH - 1)` bytes, so callers must pass a multiple of
/// [`VECTOR_WIDTH`] to get the whole slice counted.
pub type SumSquareErrorFn = unsafe fn(&[u8], &[u8]) -> u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Backend {
    Scalar,
    Sse2,
    Avx2,
    Neon,
}

impl Backend {
    /// Probe order, best first.
    pub const PREFERENCE: [Backend; 4] =
        [Backend::Avx2, Backend::Sse2, Backend::Neon, Backend::Scalar];

    pub fn name(self) -> &'static str {
        match self {
            Backend::Scalar => "scalar",
            Backend::Sse2 => "sse2",
            Backend::Avx2 => "avx2",
            Backend::Neon => "neon",
        }
    }

    /// Whether this backend is compiled in and the running CPU supports it.
    pub fn is_available(self) -> bool {
        match self {
            Backend::Scalar => true,
            Backend::Sse2 => has_sse2(),
            Backend::Avx2 => has_avx2(),
            Backend::Neon => has_neon(),
        }
    }

    /// Best backend for the running CPU. Probes every time it is called; see
    /// [`Backend::active`] for the cached choice.
    pub fn detect() -> Backend {
        Backend::PREFERENCE
            .into_iter()
            .find(|backend| backend.is_available())
            .unwrap_or(Backend::Scalar)
    }

    /// Every usable backend on this CPU, best first. Always ends with `Scalar`.
    pub fn available() -> Vec<Backend> {
        Backend::PREFERENCE
            .into_iter()
            .filter(|backend| backend.is_available())
            .collect()
    }

    /// The process-wide bulk backend, resolved once on first use.
    pub fn active() -> Backend {
        dispatch().backend
    }

    #[allow(unreachable_patterns)]
    pub(crate) fn kernel(self) -> Option<SumSquareErrorFn> {
        if !self.is_available() {
            return None;
        }
        match self {
            Backend::Scalar => Some(sum_square_error_scalar as SumSquareErrorFn),
            #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
            Backend::Sse2 => Some(x86::sum_square_error_sse2 as SumSquareErrorFn),
            #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
            Backend::Avx2 => Some(x86::sum_square_error_avx2 as SumSquareErrorFn),
            #[cfg(target_arch = "aarch64")]
            Backend::Neon => Some(arm::sum_square_error_neon as SumSquareErrorFn),
            _ => None,
        }
    }

    /// Runs this backend's kernel directly.
    ///
    /// # Panics
    /// If the backend is unavailable, the lengths differ, or a vector backend
    /// is handed a length that is not a multiple of [`VECTOR_WIDTH`].
    pub fn sum_square_error(self, src_a: &[u8], src_b: &[u8]) -> u32 {
        assert_eq!(src_a.len(), src_b.len(), "buffer lengths differ");
        let Some(kernel) = self.kernel() else {
            panic!("{self} backend is not supported on this CPU");
        };
        if self != Backend::Scalar {
            assert!(
                src_a.len() % VECTOR_WIDTH == 0,
                "{self} backend needs a multiple of {VECTOR_WIDTH} bytes, got {}",
                src_a.len()
            );
        }
        unsafe { kernel(src_a, src_b) }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

struct Dispatch {
    backend: Backend,
    kernel: SumSquareErrorFn,
}

fn dispatch() -> &'static Dispatch {
    // Optimization: feature detection runs once per process, not once per call.
    static IMPL: OnceLock<Dispatch> = OnceLock::new();
    IMPL.get_or_init(|| {
        let backend = Backend::detect();
        log::debug!("sum-square-error backend selected: {backend}");
        Dispatch {
            backend,
            kernel: kernel_or_scalar(backend),
        }
    })
}

/// Cached bulk kernel for the running CPU.
pub(crate) fn active_kernel() -> SumSquareErrorFn {
    dispatch().kernel
}

pub(crate) fn kernel_or_scalar(backend: Backend) -> SumSquareErrorFn {
    match backend.kernel() {
        Some(kernel) => kernel,
        None => {
            log::warn!("{backend} backend unavailable, falling back to scalar");
            sum_square_error_scalar as SumSquareErrorFn
        }
    }
}

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
fn has_sse2() -> bool {
    is_x86_feature_detected!("sse2")
}

#[cfg(not(any(target_arch = "x86", target_arch = "x86_64")))]
fn has_sse2() -> bool {
    false
}

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
fn has_avx2() -> bool {
    is_x86_feature_detected!("avx2")
}

#[cfg(not(any(target_arch = "x86", target_arch = "x86_64")))]
fn has_avx2() -> bool {
    false
}

#[cfg(target_arch = "aarch64")]
fn has_neon() -> bool {
    std::arch::is_aarch64_feature_detected!("neon")
}

#[cfg(not(target_arch = "aarch64"))]
fn has_neon() -> bool {
    false
}
