use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;

use transcript_align::{
    AlignConfig, AlignError, ForcedAlignerBuilder, Progress, VoskBackend, WavFileSource,
};

/// Align a transcript to audio using a constrained second decoding pass.
/// Outputs JSON.
#[derive(Debug, Parser)]
#[command(name = "align", version)]
struct Args {
    /// Path to a mono 16-bit PCM WAV file
    audio: PathBuf,
    /// Path to the transcript text file
    transcript: PathBuf,
    /// Path to the recognition model directory
    model: PathBuf,
    /// Output filename (stdout when omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Log filter (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log: String,
}

fn main() -> ExitCode {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&args.log).unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(%err, "alignment failed");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), AlignError> {
    let transcript = std::fs::read_to_string(&args.transcript)
        .map_err(|e| AlignError::Io {
            context: "reading transcript file",
            source: e,
        })?;

    tracing::info!(model = %args.model.display(), "loading model");
    let backend = Arc::new(VoskBackend::open(&args.model)?);
    let aligner = ForcedAlignerBuilder::new(AlignConfig::default())
        .with_engine(Box::new(Arc::clone(&backend)))
        .with_vocabulary(Box::new(backend))
        .build()?;

    let mut audio = WavFileSource::open(&args.audio)?;

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner} {msg}").unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.enable_steady_tick(Duration::from_millis(120));
    let report = |status: Progress| {
        spinner.set_message(match status {
            Progress::Transcribing => "transcribing",
            Progress::Aligning => "aligning",
        });
    };

    tracing::info!("starting alignment");
    let result = aligner.transcribe(&transcript, &mut audio, Some(&report))?;
    spinner.finish_and_clear();

    let stats = result.stats();
    tracing::info!(
        total = stats.total,
        success = stats.success,
        not_found_in_audio = stats.not_found_in_audio,
        not_found_in_transcript = stats.not_found_in_transcript,
        "alignment finished"
    );

    let json = result.to_json_pretty()?;
    match &args.output {
        Some(path) => {
            std::fs::write(path, json).map_err(|e| AlignError::Io {
                context: "writing output file",
                source: e,
            })?;
            tracing::info!(output = %path.display(), "output written");
        }
        None => println!("{json}"),
    }
    Ok(())
}
