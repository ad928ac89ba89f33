mod radix2;

pub use radix2::{Direction, Forward, Inverse, Radix2Fft};

/// Simple complex number struct
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[repr(C)]
pub struct Complex64 {
    pub re: f64,
    pub im: f64,
}

impl Complex64 {
    #[inline(always)]
    pub const fn new(re: f64, im: f64) -> Self {
        Self { re, im }
    }

    #[inline(always)]
    pub const fn zero() -> Self {
        Self { re: 0.0, im: 0.0 }
    }

    /// Unit complex number `cos(angle) + i·sin(angle)`.
    #[inline(always)]
    pub fn from_angle(angle: f64) -> Self {
        let (sin, cos) = angle.sin_cos();
        Self { re: cos, im: sin }
    }

    #[inline(always)]
    pub const fn conj(&self) -> Self {
        Self {
            re: self.re,
            im: -self.im,
        }
    }

    #[inline(always)]
    pub const fn add(&self, o: &Self) -> Self {
        Self {
            re: self.re + o.re,
            im: self.im + o.im,
        }
    }

    #[inline(always)]
    pub const fn sub(&self, o: &Self) -> Self {
        Self {
            re: self.re - o.re,
            im: self.im - o.im,
        }
    }

    #[inline(always)]
    pub const fn mul(&self, o: &Self) -> Self {
        Self {
            re: self.re * o.re - self.im * o.im,
            im: self.re * o.im + self.im * o.re,
        }
    }

    #[inline(always)]
    pub const fn scale(&self, f: f64) -> Self {
        Self {
            re: self.re * f,
            im: self.im * f,
        }
    }

    /// Squared magnitude.
    #[inline(always)]
    pub const fn norm_sqr(&self) -> f64 {
        self.re * self.re + self.im * self.im
    }
}

impl From<f64> for Complex64 {
    #[inline(always)]
    fn from(re: f64) -> Self {
        Self { re, im: 0.0 }
    }
}

/// Forward DFT of a real sequence whose length is a power of two.
///
/// Convenience wrapper around [`Radix2Fft<Forward>`] that allocates the output.
///
/// # Panics
///
/// Panics if `input.len()` is not a power of two.
pub fn transform(input: &[f64]) -> Vec<Complex64> {
    let fft = Radix2Fft::<Forward>::new(input.len());
    let mut output = vec![Complex64::zero(); fft.fft_size()];
    fft.process(input, &mut output);
    output
}

/// Unnormalized inverse DFT of a complex sequence whose length is a power of two.
///
/// The result is `N` times the true inverse.
///
/// # Panics
///
/// Panics if `input.len()` is not a power of two.
pub fn inverse_transform(input: &[Complex64]) -> Vec<Complex64> {
    let ifft = Radix2Fft::<Inverse>::new(input.len());
    let mut output = vec![Complex64::zero(); ifft.fft_size()];
    ifft.process(input, &mut output);
    output
}

/// Normalized inverse DFT returning only the real part.
///
/// The imaginary residue is dropped and every sample is divided by `N`, so
/// `inverse_real(&transform(x))` reproduces `x` up to rounding.
///
/// # Panics
///
/// Panics if `input.len()` is not a power of two.
pub fn inverse_real(input: &[Complex64]) -> Vec<f64> {
    let ifft = Radix2Fft::<Inverse>::new(input.len());
    let mut output = vec![0.0; ifft.fft_size()];
    let mut scratchpad = vec![Complex64::zero(); ifft.scratchpad_size()];
    ifft.process_real(input, &mut output, &mut scratchpad);
    output
}
