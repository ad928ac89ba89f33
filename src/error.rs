/// Errors the convolution functions can return.
#[derive(Copy, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub enum ConvolveError {
    /// The input signal has no samples.
    EmptySignal,
    /// The kernel (impulse response) has no samples.
    EmptyKernel,
    /// The convolution length or its padded FFT size does not fit in `usize`.
    LengthOverflow,
}

impl core::fmt::Display for ConvolveError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::EmptySignal => "Input signal is empty".fmt(f),
            Self::EmptyKernel => "Convolution kernel is empty".fmt(f),
            Self::LengthOverflow => "Convolution length overflows the FFT size".fmt(f),
        }
    }
}

impl core::fmt::Debug for ConvolveError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self, f)
    }
}

impl std::error::Error for ConvolveError {}
