//! Linear convolution of real sequences through a recursive radix-2 FFT.
//!
//! Both inputs are zero-padded to the next power of two of their full convolution length,
//! transformed, multiplied in the frequency domain and transformed back. The two forward
//! transforms can run on separate threads, see [`Dispatch`].
//!
//! ```rust
//! let output = fftconv::convolve(&[1.0, 2.0, 3.0], &[0.0, 1.0, 0.5]).unwrap();
//!
//! let expected = [0.0, 1.0, 2.5, 4.0, 1.5];
//! for (a, e) in output.iter().zip(expected) {
//!     assert!((a - e).abs() < 1e-12);
//! }
//! ```

pub mod audio;
mod convolution;
mod display;
mod error;
mod fft;
pub mod source;

pub use convolution::{ConvolutionEngine, ConvolutionSizes, Dispatch};
pub use display::SequenceTable;
pub use error::ConvolveError;
pub use fft::*;
pub use source::NoiseGenerator;

/// Convolves `signal` with `kernel` using the default [`ConvolutionEngine`].
///
/// The result has `signal.len() + kernel.len() - 1` samples.
pub fn convolve(signal: &[f64], kernel: &[f64]) -> Result<Vec<f64>, ConvolveError> {
    ConvolutionEngine::default().convolve(signal, kernel)
}
