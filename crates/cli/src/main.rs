use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;

use voicedesk_core::shared::constants::DEFAULT_MODEL_NAME;
use voicedesk_core::{
    format_progress, FfmpegExtractor, FileKind, JobKind, JobState, ProgressSink, ProgressUpdate,
    StderrTaskLogger, TaskRunner, Transcriber, WhisperTranscriber, WorkerContext,
    WorkflowOrchestrator, WorkspaceLayout,
};

/// Extract audio from video and transcribe audio to text.
#[derive(Parser)]
#[command(name = "voicedesk")]
struct Cli {
    /// Video or audio file to process. Videos go through extraction
    /// and transcription; audio files are transcribed directly.
    input: PathBuf,

    /// Speech model file name.
    #[arg(long, default_value = DEFAULT_MODEL_NAME)]
    model: String,

    /// Only extract the audio track, skip transcription.
    #[arg(long)]
    extract_only: bool,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let input = cli.input.canonicalize()?;
    let kind = job_kind_for(&input, cli.extract_only)?;

    let layout = WorkspaceLayout::new(base_dir_for(&input));
    layout.ensure_dirs()?;
    log::info!("using workspace {}", layout.base().display());

    let context = WorkerContext::new();
    let extractor = FfmpegExtractor::new(TaskRunner::new(context.registry().clone()));
    let transcriber: Box<dyn Transcriber> = Box::new(WhisperTranscriber::new(cli.model));
    let orchestrator =
        WorkflowOrchestrator::new(layout, context, Box::new(extractor), transcriber);

    let mut logger = StderrTaskLogger::new();
    let mut sink = StderrProgressSink::default();
    let job = orchestrator.run(kind, &input, &mut logger, &mut sink);
    sink.finish();

    match job.state {
        JobState::Succeeded => {
            if let Some(output) = &job.output {
                println!("{}", output.display());
            }
            Ok(())
        }
        JobState::Cancelled => Err("job was cancelled".into()),
        _ => Err(format!("{kind} failed, see log output").into()),
    }
}

fn job_kind_for(input: &Path, extract_only: bool) -> Result<JobKind, String> {
    match FileKind::of(input) {
        Some(FileKind::Video) if extract_only => Ok(JobKind::ExtractAudio),
        Some(FileKind::Video) => Ok(JobKind::FullCycle),
        Some(FileKind::Audio) => Ok(JobKind::Transcribe),
        _ => Err(format!(
            "unsupported input file: {} (expected a video or audio file)",
            input.display()
        )),
    }
}

/// The workspace base is the directory holding the input file, except
/// when the file already sits inside a workspace `audio` folder, in
/// which case the existing workspace is reused.
fn base_dir_for(input: &Path) -> PathBuf {
    let parent = input
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    if parent.file_name().is_some_and(|n| n == "audio") {
        if let Some(grandparent) = parent.parent() {
            return grandparent.to_path_buf();
        }
    }
    parent
}

/// Redraws one progress line in place on stderr.
#[derive(Default)]
struct StderrProgressSink {
    drawn: bool,
}

impl StderrProgressSink {
    fn finish(&mut self) {
        if self.drawn {
            eprintln!();
            self.drawn = false;
        }
    }
}

impl ProgressSink for StderrProgressSink {
    fn tick(&mut self, update: &ProgressUpdate) -> bool {
        eprint!("\r{}", format_progress(update));
        self.drawn = true;
        true
    }
}
