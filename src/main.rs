use anyhow::{Context, Result};
use beat_align::analysis::AudioDecoder;
use beat_align::external::{AubioOnsetDetector, FfmpegDecoder, OnsetMethod, SymphoniaDecoder};
use beat_align::report::{write_alignment, write_envelope};
use beat_align::{AnalysisConfig, BeatAnalysis};
use clap::{Parser, Subcommand, ValueEnum};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "beat-align")]
#[command(about = "Audio envelope and beat/segment alignment checks", long_about = None)]
struct Args {
    /// Verbose logging
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compute the RMS envelope of an audio file with its detected beats
    Envelope {
        /// Audio file to analyse
        audio: String,

        /// Seconds of audio to analyse (default: 10)
        #[arg(short = 'd', long, default_value = "10.0")]
        duration: f64,

        #[command(flatten)]
        detection: DetectionArgs,

        /// Decoder used to read the audio
        #[arg(long, value_enum, default_value_t = DecoderKind::Symphonia)]
        decoder: DecoderKind,

        /// Write the envelope here instead of stdout
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,
    },

    /// Check that beats land on segment boundaries of a timing record
    Align {
        /// Timing data file (<video>_timing_data.txt)
        timing: String,

        /// Re-detect beats from this audio instead of the record's beat section
        #[arg(long)]
        audio: Option<String>,

        #[command(flatten)]
        detection: DetectionArgs,

        /// Allowed beat-to-boundary distance in seconds (default: 0.05)
        #[arg(long, default_value = "0.05")]
        tolerance: f64,

        /// Report path (default: <timing>_alignment.txt)
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,
    },
}

#[derive(clap::Args, Debug)]
struct DetectionArgs {
    /// Onset detection threshold (default: 0.3)
    #[arg(short = 't', long, default_value = "0.3")]
    threshold: f32,

    /// Onset detection method
    #[arg(short = 'm', long, value_enum, default_value_t = OnsetMethod::Default)]
    method: OnsetMethod,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum DecoderKind {
    /// Decode in-process at the file's native sample rate
    Symphonia,
    /// Resample to 44.1 kHz mono through ffmpeg
    Ffmpeg,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    match args.command {
        Command::Envelope {
            audio,
            duration,
            detection,
            decoder,
            output,
        } => {
            let audio_path = expand(&audio);
            let mut config = AnalysisConfig::new()
                .with_duration(duration)
                .with_detection(detection.threshold, detection.method);
            if let Some(output) = output {
                config = config.with_output(output);
            }

            let decoder: Box<dyn AudioDecoder> = match decoder {
                DecoderKind::Symphonia => Box::new(SymphoniaDecoder::new()),
                DecoderKind::Ffmpeg => Box::new(FfmpegDecoder::new()),
            };
            let analysis = BeatAnalysis::new(config, decoder, AubioOnsetDetector::new());
            let view = analysis.envelope_view(&audio_path)?;

            match &analysis.config().output {
                Some(path) => {
                    let mut out = create_output(path)?;
                    write_envelope(&mut out, &view.envelope, &view.beats, view.duration)?;
                    out.flush()?;
                    log::info!("Envelope saved to {:?}", path);
                }
                None => {
                    let stdout = io::stdout();
                    let mut out = stdout.lock();
                    write_envelope(&mut out, &view.envelope, &view.beats, view.duration)?;
                }
            }
        }

        Command::Align {
            timing,
            audio,
            detection,
            tolerance,
            output,
        } => {
            let timing_path = expand(&timing);
            let audio_path = audio.as_deref().map(expand);

            let mut config = AnalysisConfig::new()
                .with_detection(detection.threshold, detection.method)
                .with_tolerance(tolerance);
            if let Some(output) = output {
                config = config.with_output(output);
            }
            let output_path = config.alignment_output(&timing_path);

            let analysis =
                BeatAnalysis::new(config, SymphoniaDecoder::new(), AubioOnsetDetector::new());
            let view = analysis.alignment_view(&timing_path, audio_path.as_deref())?;

            let mut out = create_output(&output_path)?;
            write_alignment(&mut out, &view.timing.timeline, &view.report)?;
            out.flush()?;
            log::info!("Alignment report saved to: {:?}", output_path);
        }
    }

    Ok(())
}

/// Expand ~ in a user-supplied path
fn expand(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).as_ref())
}

fn create_output(path: &Path) -> Result<BufWriter<File>> {
    let file =
        File::create(path).with_context(|| format!("Failed to create output: {:?}", path))?;
    Ok(BufWriter::new(file))
}
