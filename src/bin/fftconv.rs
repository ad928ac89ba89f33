use std::{
    error::Error,
    path::{Path, PathBuf},
    time::Instant,
};

use clap::{Parser, Subcommand};
use fftconv::{
    ConvolutionEngine, Dispatch, NoiseGenerator, SequenceTable,
    audio::{self, MonoSignal},
};
use tracing::debug;

/// Moving-average kernel of the `average` task.
const AVERAGE_KERNEL: [f64; 5] = [0.2; 5];

#[derive(Parser, Debug)]
#[command(name = "fftconv")]
#[command(about = "Linear convolution of sequences and WAV files via FFT", long_about = None)]
struct Cli {
    /// Run both forward transforms on the calling thread.
    #[arg(long, global = true)]
    sequential: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convolve a uniform random sequence with a 5-point moving average.
    Average {
        /// Length of the random sequence, must be greater than 10.
        #[arg(long, value_name = "N", value_parser = parse_length)]
        length: usize,
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long)]
        print_input: bool,
        #[arg(long)]
        print_output: bool,
    },
    /// Convolve the first channels of two WAV files.
    Files {
        signal: PathBuf,
        kernel: PathBuf,
        output: PathBuf,
    },
    /// Convolve the first channel of a WAV file with Gaussian white noise of the same length.
    WhiteNoise {
        signal: PathBuf,
        output: PathBuf,
        #[arg(long)]
        seed: Option<u64>,
    },
}

fn parse_length(value: &str) -> Result<usize, String> {
    let length: usize = value
        .parse()
        .map_err(|error| format!("Invalid length {value}: {error}"))?;
    if length <= 10 {
        return Err(format!("Invalid length {length}. Must be greater than 10"));
    }
    Ok(length)
}

fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(error) = run(cli) {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let dispatch = if cli.sequential {
        Dispatch::Sequential
    } else {
        Dispatch::Concurrent
    };
    let engine = ConvolutionEngine::new(dispatch);
    debug!(dispatch = ?engine.dispatch(), "engine ready");

    match cli.command {
        Command::Average {
            length,
            seed,
            print_input,
            print_output,
        } => {
            let mut generator = NoiseGenerator::uniform(seed)?;
            println!("Seed: {}", generator.seed());

            let signal = generator.samples(length);
            if print_input {
                print!("{}", SequenceTable(&signal));
            }

            let output = timed(|| engine.convolve(&signal, &AVERAGE_KERNEL))?;
            println!("Results size: {}", output.len());
            if print_output {
                print!("{}", SequenceTable(&output));
            }
        }
        Command::Files {
            signal,
            kernel,
            output,
        } => {
            let result = timed(|| audio::convolve_files(&engine, &signal, &kernel))?;
            save(&output, &result)?;
        }
        Command::WhiteNoise {
            signal,
            output,
            seed,
        } => {
            let signal = audio::read_first_channel(&signal)?;
            let mut generator = NoiseGenerator::gaussian(seed)?;
            println!("Seed: {}", generator.seed());

            let noise = generator.samples(signal.samples.len());
            let samples = timed(|| engine.convolve(&signal.samples, &noise))?;
            save(
                &output,
                &MonoSignal {
                    samples,
                    sample_rate: signal.sample_rate,
                },
            )?;
        }
    }

    Ok(())
}

/// Runs `f`, printing how long it took.
fn timed<T>(f: impl FnOnce() -> T) -> T {
    println!("Calculating convolution... ");
    let start = Instant::now();
    let result = f();
    let elapsed = start.elapsed();
    println!("Done! Time elapsed: {:.3} ms", elapsed.as_secs_f64() * 1000.0);
    result
}

fn save(path: &Path, signal: &MonoSignal) -> Result<(), Box<dyn Error>> {
    audio::write_mono(path, signal)?;
    println!("File {} created.", path.display());
    println!(
        "Channels: 1, sample rate: {} Hz, samples: {}, length: {:.3} s",
        signal.sample_rate,
        signal.samples.len(),
        signal.duration_secs()
    );
    Ok(())
}
