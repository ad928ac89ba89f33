use std::{panic, thread};

use tracing::debug;

use crate::{Complex64, Forward, Inverse, Radix2Fft, error::ConvolveError};

/// How the two independent forward transforms of a convolution are scheduled.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub enum Dispatch {
    /// Both transforms run one after another on the calling thread.
    Sequential,
    /// The signal transform runs on a scoped thread while the kernel transform runs on the
    /// calling thread. Both are joined before the spectra are multiplied.
    #[default]
    Concurrent,
}

/// Output and FFT lengths of a linear convolution.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ConvolutionSizes {
    /// `signal_len + kernel_len - 1`.
    pub output_len: usize,
    /// Smallest power of two that is `>= output_len`, so the circular convolution computed by
    /// the FFT does not wrap around.
    pub fft_len: usize,
}

impl ConvolutionSizes {
    /// Computes the sizes for convolving `signal_len` samples with `kernel_len` samples.
    pub fn new(signal_len: usize, kernel_len: usize) -> Result<Self, ConvolveError> {
        if signal_len == 0 {
            return Err(ConvolveError::EmptySignal);
        }
        if kernel_len == 0 {
            return Err(ConvolveError::EmptyKernel);
        }

        let output_len = signal_len
            .checked_add(kernel_len - 1)
            .ok_or(ConvolveError::LengthOverflow)?;
        let fft_len = output_len
            .checked_next_power_of_two()
            .ok_or(ConvolveError::LengthOverflow)?;

        Ok(Self {
            output_len,
            fft_len,
        })
    }
}

/// FFT-based linear convolution of real sequences.
///
/// Both inputs are zero-padded to the next power of two of the full convolution length,
/// transformed, multiplied bin by bin, transformed back and cropped to
/// `signal.len() + kernel.len() - 1` samples.
///
/// ## Example
///
/// ```rust
/// use fftconv::{ConvolutionEngine, Dispatch};
///
/// let engine = ConvolutionEngine::new(Dispatch::Sequential);
/// let output = engine.convolve(&[1.0, 2.0, 3.0], &[0.0, 1.0, 0.5]).unwrap();
///
/// assert_eq!(output.len(), 5);
/// assert!((output[2] - 2.5).abs() < 1e-12);
/// ```
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct ConvolutionEngine {
    dispatch: Dispatch,
}

impl ConvolutionEngine {
    /// Create a new [`ConvolutionEngine`] with the given scheduling of the forward transforms.
    pub fn new(dispatch: Dispatch) -> Self {
        Self { dispatch }
    }

    /// Returns how the forward transforms are scheduled.
    pub fn dispatch(&self) -> Dispatch {
        self.dispatch
    }

    /// Computes the linear convolution of `signal` and `kernel`.
    ///
    /// Returns an error before doing any work if either input is empty or the padded
    /// transform size does not fit in `usize`.
    pub fn convolve(&self, signal: &[f64], kernel: &[f64]) -> Result<Vec<f64>, ConvolveError> {
        let sizes = ConvolutionSizes::new(signal.len(), kernel.len())?;

        debug!(
            signal_len = signal.len(),
            kernel_len = kernel.len(),
            output_len = sizes.output_len,
            fft_len = sizes.fft_len,
            dispatch = ?self.dispatch,
            "convolving"
        );

        let fft = Radix2Fft::<Forward>::new(sizes.fft_len);
        let (mut spectrum, kernel_spectrum) = self.forward_pair(&fft, signal, kernel);

        spectrum
            .iter_mut()
            .zip(kernel_spectrum.iter())
            .for_each(|(bin, kernel_bin)| *bin = bin.mul(kernel_bin));

        // The kernel spectrum is no longer needed and has the scratchpad size.
        let mut scratchpad = kernel_spectrum;
        let ifft = Radix2Fft::<Inverse>::new(sizes.fft_len);
        let mut output = vec![0.0; sizes.fft_len];
        ifft.process_real(&spectrum, &mut output, &mut scratchpad);

        output.truncate(sizes.output_len);
        Ok(output)
    }

    /// Zero-pads and transforms both inputs according to the configured [`Dispatch`].
    ///
    /// Returns `(signal_spectrum, kernel_spectrum)`.
    fn forward_pair(
        &self,
        fft: &Radix2Fft<Forward>,
        signal: &[f64],
        kernel: &[f64],
    ) -> (Vec<Complex64>, Vec<Complex64>) {
        match self.dispatch {
            Dispatch::Sequential => (padded_spectrum(fft, signal), padded_spectrum(fft, kernel)),
            Dispatch::Concurrent => thread::scope(|scope| {
                let signal_handle = scope.spawn(|| padded_spectrum(fft, signal));
                let kernel_spectrum = padded_spectrum(fft, kernel);
                let signal_spectrum = match signal_handle.join() {
                    Ok(spectrum) => spectrum,
                    Err(payload) => panic::resume_unwind(payload),
                };
                (signal_spectrum, kernel_spectrum)
            }),
        }
    }
}

/// Copies `samples` into a zero-filled buffer of the FFT size and returns its spectrum.
fn padded_spectrum(fft: &Radix2Fft<Forward>, samples: &[f64]) -> Vec<Complex64> {
    let mut padded = vec![0.0; fft.fft_size()];
    padded[..samples.len()].copy_from_slice(samples);

    let mut spectrum = vec![Complex64::zero(); fft.fft_size()];
    fft.process(&padded, &mut spectrum);
    spectrum
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NoiseGenerator;

    const EPSILON: f64 = 1e-9;

    fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
        (a - b).abs() < epsilon
    }

    // Direct time-domain convolution as reference.
    fn direct_convolution(signal: &[f64], kernel: &[f64]) -> Vec<f64> {
        let mut output = vec![0.0; signal.len() + kernel.len() - 1];
        for (i, &x) in signal.iter().enumerate() {
            for (j, &h) in kernel.iter().enumerate() {
                output[i + j] += x * h;
            }
        }
        output
    }

    fn assert_close(actual: &[f64], expected: &[f64], desc: &str) {
        assert_eq!(actual.len(), expected.len(), "{desc}: length mismatch");
        for (i, (&a, &e)) in actual.iter().zip(expected).enumerate() {
            assert!(
                approx_eq(a, e, EPSILON * e.abs().max(1.0)),
                "{desc}: sample {i} = {a}, expected {e}"
            );
        }
    }

    #[test]
    fn test_known_small_case() {
        for dispatch in [Dispatch::Sequential, Dispatch::Concurrent] {
            let output = ConvolutionEngine::new(dispatch)
                .convolve(&[1.0, 2.0, 3.0], &[0.0, 1.0, 0.5])
                .unwrap();
            assert_close(&output, &[0.0, 1.0, 2.5, 4.0, 1.5], &format!("{dispatch:?}"));
        }
    }

    #[test]
    fn test_output_length() {
        let engine = ConvolutionEngine::default();
        for signal_len in [1, 2, 3, 7, 8, 9, 31, 100] {
            for kernel_len in [1, 2, 5, 16, 33] {
                let signal = vec![1.0; signal_len];
                let kernel = vec![0.5; kernel_len];
                let output = engine.convolve(&signal, &kernel).unwrap();
                assert_eq!(
                    output.len(),
                    signal_len + kernel_len - 1,
                    "signal {signal_len}, kernel {kernel_len}"
                );
            }
        }
    }

    #[test]
    fn test_identity_kernel() {
        let signal: Vec<f64> = (0..23).map(|i| (i as f64 * 0.41).sin() * 10.0).collect();
        let output = ConvolutionEngine::default().convolve(&signal, &[1.0]).unwrap();
        assert_close(&output, &signal, "identity");
    }

    #[test]
    fn test_single_samples() {
        let output = ConvolutionEngine::default().convolve(&[2.0], &[3.0]).unwrap();
        assert_close(&output, &[6.0], "single samples");
    }

    #[test]
    fn test_commutativity() {
        let engine = ConvolutionEngine::default();
        let signal: Vec<f64> = (0..19).map(|i| (i as f64).cos() * 2.0 + 1.0).collect();
        let kernel: Vec<f64> = (0..6).map(|i| 1.0 / (i as f64 + 1.0)).collect();

        let forward = engine.convolve(&signal, &kernel).unwrap();
        let swapped = engine.convolve(&kernel, &signal).unwrap();
        assert_close(&forward, &swapped, "commutativity");
    }

    #[test]
    fn test_averaging_filter() {
        let kernel = [0.2; 5];
        let mut generator = NoiseGenerator::uniform(Some(7)).unwrap();

        for len in [11, 12, 50, 257, 1000] {
            let signal = generator.samples(len);
            let output = ConvolutionEngine::default().convolve(&signal, &kernel).unwrap();
            let expected = direct_convolution(&signal, &kernel);
            assert_close(&output, &expected, &format!("moving average, length {len}"));
        }
    }

    #[test]
    fn test_matches_direct_convolution() {
        let mut generator = NoiseGenerator::gaussian(Some(42)).unwrap();
        for (signal_len, kernel_len) in [(64, 64), (100, 3), (3, 100), (127, 2), (513, 17)] {
            let signal = generator.samples(signal_len);
            let kernel = generator.samples(kernel_len);
            let output = ConvolutionEngine::default().convolve(&signal, &kernel).unwrap();
            assert_close(
                &output,
                &direct_convolution(&signal, &kernel),
                &format!("{signal_len}x{kernel_len}"),
            );
        }
    }

    #[test]
    fn test_dispatch_is_deterministic() {
        let mut generator = NoiseGenerator::uniform(Some(3)).unwrap();
        let signal = generator.samples(300);
        let kernel = generator.samples(45);
        let fft = Radix2Fft::<Forward>::new(ConvolutionSizes::new(300, 45).unwrap().fft_len);

        let sequential = ConvolutionEngine::new(Dispatch::Sequential);
        let concurrent = ConvolutionEngine::new(Dispatch::Concurrent);
        assert_eq!(sequential.dispatch(), Dispatch::Sequential);
        assert_eq!(concurrent.dispatch(), Dispatch::Concurrent);
        assert_eq!(ConvolutionEngine::default().dispatch(), Dispatch::Concurrent);

        let (seq_signal, seq_kernel) = sequential.forward_pair(&fft, &signal, &kernel);
        let (con_signal, con_kernel) = concurrent.forward_pair(&fft, &signal, &kernel);
        assert_eq!(seq_signal, con_signal);
        assert_eq!(seq_kernel, con_kernel);

        let seq_output = sequential.convolve(&signal, &kernel).unwrap();
        let con_output = concurrent.convolve(&signal, &kernel).unwrap();
        assert!(
            seq_output
                .iter()
                .zip(&con_output)
                .all(|(a, b)| a.to_bits() == b.to_bits()),
            "Sequential and concurrent results differ"
        );
    }

    #[test]
    fn test_empty_inputs() {
        let engine = ConvolutionEngine::default();
        assert_eq!(engine.convolve(&[], &[1.0]), Err(ConvolveError::EmptySignal));
        assert_eq!(engine.convolve(&[1.0], &[]), Err(ConvolveError::EmptyKernel));
        assert_eq!(engine.convolve(&[], &[]), Err(ConvolveError::EmptySignal));
    }

    #[test]
    fn test_sizes() {
        let cases = [
            ((1, 1), (1, 1)),
            ((3, 3), (5, 8)),
            ((4, 5), (8, 8)),
            ((5, 5), (9, 16)),
            ((1000, 5), (1004, 1024)),
            ((513, 512), (1024, 1024)),
        ];
        for ((signal_len, kernel_len), (output_len, fft_len)) in cases {
            assert_eq!(
                ConvolutionSizes::new(signal_len, kernel_len),
                Ok(ConvolutionSizes {
                    output_len,
                    fft_len
                }),
                "signal {signal_len}, kernel {kernel_len}"
            );
        }
    }

    #[test]
    fn test_sizes_overflow() {
        assert_eq!(
            ConvolutionSizes::new(usize::MAX, 2),
            Err(ConvolveError::LengthOverflow)
        );
        assert_eq!(
            ConvolutionSizes::new(usize::MAX / 2 + 2, 1),
            Err(ConvolveError::LengthOverflow)
        );
    }
}
