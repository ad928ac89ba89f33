use core::{f64::consts::PI, marker::PhantomData};

use tracing::trace;

use crate::Complex64;

/// Transform direction, which only decides the sign of the twiddle exponent.
pub trait Direction {
    /// Sign of the exponent in `exp(SIGN · 2πi·k/n)`.
    const SIGN: f64;
}

/// Marker type for forward FFT direction.
#[derive(Debug, Clone, Copy)]
pub struct Forward;

/// Marker type for inverse FFT direction.
#[derive(Debug, Clone, Copy)]
pub struct Inverse;

impl Direction for Forward {
    const SIGN: f64 = -1.0;
}

impl Direction for Inverse {
    const SIGN: f64 = 1.0;
}

/// Recursive radix-2 decimation-in-time FFT.
///
/// Generic over direction type (`Forward` or `Inverse`).
///
/// # Normalization
///
/// This FFT implementation does **not** normalize outputs:
///  - Forward FFT produces raw DFT values (no scaling applied)
///  - Inverse FFT produces raw IDFT values (no `1/N` scaling applied)
///  - `process_real` on the inverse FFT is the exception: it divides by `N` and drops the
///    imaginary residue, so a forward + `process_real` round-trip reproduces the input
///
/// # Memory
///
/// The even/odd split is never materialized. Each recursion level reads the input through a
/// doubled stride and writes its two half-size results into the lower and upper halves of the
/// caller's output buffer, where the butterflies then combine them in place. Twiddle factors
/// are derived per level and only for the first half, the second half follows from
/// `factor[k + n/2] = -factor[k]`.
#[derive(Debug, Clone)]
pub struct Radix2Fft<D> {
    len: usize,
    _direction: PhantomData<D>,
}

impl<D: Direction> Radix2Fft<D> {
    /// Constructs a new [`Radix2Fft`] instance.
    ///
    /// # Panics
    ///
    /// Panics if `len` is not a power of two. Callers that start from arbitrary lengths must
    /// zero-pad first, as the convolution engine does.
    pub fn new(len: usize) -> Self {
        assert!(
            len.is_power_of_two(),
            "FFT length must be a power of two, got {len}"
        );

        Self {
            len,
            _direction: PhantomData,
        }
    }

    /// Returns the transform length.
    pub fn fft_size(&self) -> usize {
        self.len
    }

    /// Returns the required scratchpad size for `process_real` on the inverse FFT.
    pub fn scratchpad_size(&self) -> usize {
        self.len
    }

    fn process_internal<T>(&self, input: &[T], output: &mut [Complex64])
    where
        T: Copy + Into<Complex64>,
    {
        assert_eq!(input.len(), self.len, "Input length must match FFT size");
        assert_eq!(output.len(), self.len, "Output length must match FFT size");

        trace!(len = self.len, sign = D::SIGN, "radix-2 transform");

        transform_strided::<D, T>(input, 1, output);
    }
}

/// Transforms the `output.len()` input samples `input[0], input[stride], input[2·stride], ...`
/// into `output`.
fn transform_strided<D, T>(input: &[T], stride: usize, output: &mut [Complex64])
where
    D: Direction,
    T: Copy + Into<Complex64>,
{
    let n = output.len();
    if n == 1 {
        output[0] = input[0].into();
        return;
    }

    let half = n / 2;
    let (even, odd) = output.split_at_mut(half);

    transform_strided::<D, T>(input, stride * 2, even);
    transform_strided::<D, T>(&input[stride..], stride * 2, odd);

    let step = D::SIGN * 2.0 * PI / n as f64;
    for (k, (e, o)) in even.iter_mut().zip(odd.iter_mut()).enumerate() {
        let factor = Complex64::from_angle(step * k as f64);
        let t = factor.mul(o);
        let a = *e;
        *e = a.add(&t);
        *o = a.sub(&t);
    }
}

impl Radix2Fft<Forward> {
    /// Forward real -> complex FFT.
    ///
    /// **Note:** Output is unnormalized. No scaling is applied to the result.
    ///
    /// # Arguments
    /// * `input` - Real-valued input samples (length == fft_size)
    /// * `output` - Full complex spectrum (length == fft_size)
    pub fn process(&self, input: &[f64], output: &mut [Complex64]) {
        self.process_internal(input, output);
    }
}

impl Radix2Fft<Inverse> {
    /// Inverse complex -> complex FFT.
    ///
    /// **Note:** Output is unnormalized (no `1/N` scaling applied).
    ///
    /// # Arguments
    /// * `input` - Complex spectrum (length == fft_size)
    /// * `output` - Complex time-domain samples scaled by `N` (length == fft_size)
    pub fn process(&self, input: &[Complex64], output: &mut [Complex64]) {
        self.process_internal(input, output);
    }

    /// Normalized inverse complex -> real FFT.
    ///
    /// Discards the imaginary parts, which are rounding residue for a Hermitian spectrum, and
    /// divides every sample by `N`.
    ///
    /// # Arguments
    /// * `input` - Complex spectrum (length == fft_size)
    /// * `output` - Real-valued output samples (length == fft_size)
    /// * `scratchpad` - Workspace for the complex result (length >= fft_size)
    pub fn process_real(
        &self,
        input: &[Complex64],
        output: &mut [f64],
        scratchpad: &mut [Complex64],
    ) {
        assert_eq!(output.len(), self.len, "Output length must match FFT size");
        assert!(
            scratchpad.len() >= self.scratchpad_size(),
            "Scratchpad size must be at least {}",
            self.scratchpad_size()
        );

        let fft_scratch = &mut scratchpad[..self.len];
        self.process_internal(input, fft_scratch);

        let scale = 1.0 / self.len as f64;
        for (sample, value) in output.iter_mut().zip(fft_scratch.iter()) {
            *sample = value.re * scale;
        }
    }
}
