mod logging;

use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use clap::Parser;

use dailies_core::config::infrastructure::settings_loader;
use dailies_core::encoding::infrastructure::process_encoder::ProcessEncoderLauncher;
use dailies_core::imaging::infrastructure::image_decoder::ImageCrateDecoder;
use dailies_core::imaging::infrastructure::oiiotool_color_transformer::OiiotoolColorTransformer;
use dailies_core::pipeline::infrastructure::sequential_pipeline_executor::SequentialPipelineExecutor;
use dailies_core::pipeline::infrastructure::threaded_pipeline_executor::ThreadedPipelineExecutor;
use dailies_core::pipeline::pipeline_executor::PipelineExecutor;
use dailies_core::pipeline::pipeline_logger::LogPipelineLogger;
use dailies_core::pipeline::render_dailies_use_case::RenderDailiesUseCase;
use dailies_core::sequence::infrastructure::glob_frame_locator::GlobFrameLocator;

/// Render a review movie from a numbered image sequence.
#[derive(Parser, Debug)]
#[command(name = "dailies", version)]
struct Cli {
    /// Image sequence: a folder, the path to one frame, or a `%04d` /
    /// `####` pattern.
    #[arg(short = 'i', long, alias = "image_sequence", default_value = ".")]
    image_sequence: PathBuf,

    /// Codec profile from the settings file.
    #[arg(short, long)]
    codec: Option<String>,

    /// Settings file (default: $DAILIES_CONFIG, then the user config dir).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Transform threads; 0 = one per CPU, 1 = transform on the main thread.
    #[arg(long)]
    workers: Option<usize>,

    /// Print the codec profiles of the settings file and exit.
    #[arg(long)]
    list_codecs: bool,
}

fn main() {
    logging::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config_path = settings_loader::resolve_config_path(cli.config.as_deref())?;
    let document = settings_loader::load(&config_path)?;
    if cli.list_codecs {
        for name in document.codec_names() {
            println!("{name}");
        }
        return Ok(());
    }

    let mut settings = document.resolve(cli.codec.as_deref())?;
    if let Some(workers) = cli.workers {
        settings.globals.workers = workers;
    }
    logging::set_debug(settings.globals.debug);

    let mut use_case = RenderDailiesUseCase::new(
        Box::new(GlobFrameLocator::new()),
        Arc::new(ImageCrateDecoder::new()),
        Box::new(ProcessEncoderLauncher::new()),
        executor(settings.globals.workers),
    )
    .with_color_transformer(Arc::new(OiiotoolColorTransformer::new()))
    .with_logger(Box::new(LogPipelineLogger::default()));

    let plan = use_case.prepare(&cli.image_sequence, &settings)?;
    logging::attach_file(&plan.movie_path.with_extension("log"))?;

    log::debug!(
        "Settings: {}\n\tCodec: {}\n\tImage sequence: {}",
        config_path.display(),
        settings.codec_key,
        cli.image_sequence.display()
    );
    log::info!("Encoder command:\n\t{}", plan.command);

    let report = use_case.run(plan)?;
    log::info!(
        "Wrote {} frames to {}",
        report.frames_written,
        report.movie_path.display()
    );
    log::info!("Total processing time: \t{:.2?}", report.elapsed);
    Ok(())
}

fn executor(workers: usize) -> Box<dyn PipelineExecutor> {
    if workers == 1 {
        Box::new(SequentialPipelineExecutor)
    } else {
        let executor = ThreadedPipelineExecutor::new(workers);
        log::debug!("Transforming on {} threads", executor.workers());
        Box::new(executor)
    }
}
