use anyhow::{anyhow, bail, Context};
use clap::Parser;
use compress_quick::cli::{Args, Commands};
use compress_quick::utils::{
    create_progress_spinner, print_compression_result, print_preview_locations,
};
use compress_quick::{
    error, info, inspect_source, logger, print_source_report, success, verbose, warn,
    BackendConfig, DirectorySink, HttpEndpoint, Phase, SourceFile, TempFilePreviewStore,
    UploadError, UploadWorkflow,
};
use indicatif::ProgressBar;
use std::path::{Path, PathBuf};
use std::time::Duration;

fn main() {
    let args = Args::parse();
    logger::init(args.quiet, args.verbose);

    if let Err(e) = run(args.command) {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

fn run(command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Compress {
            input,
            output_dir,
            backend_url,
            timeout,
        } => {
            let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
            runtime.block_on(compress(&input, output_dir, backend_url, timeout))
        }
        Commands::Check { input } => check(&input),
    }
}

async fn compress(
    input: &Path,
    output_dir: PathBuf,
    backend_url: Option<String>,
    timeout: Option<u64>,
) -> anyhow::Result<()> {
    info!("🗜️  Compressing image: {:?}", input);

    let source = match SourceFile::from_path(input) {
        Ok(source) => source,
        Err(e @ UploadError::Io(_)) => {
            return Err(anyhow!(e).context(format!("Failed to read {:?}", input)));
        }
        Err(e) => bail!(e.user_message()),
    };
    let endpoint = match timeout {
        Some(secs) => HttpEndpoint::with_timeout(Duration::from_secs(secs))?,
        None => HttpEndpoint::new(),
    };
    let workflow = UploadWorkflow::new(
        BackendConfig::resolve(backend_url),
        endpoint,
        TempFilePreviewStore::new()?,
        DirectorySink::new(&output_dir),
    );

    let mut phases = workflow.subscribe();
    let submit = workflow.submit(source);
    tokio::pin!(submit);

    let interrupt = tokio::signal::ctrl_c();
    tokio::pin!(interrupt);
    let mut listening = true;

    let mut spinner: Option<ProgressBar> = None;
    let result = loop {
        tokio::select! {
            result = &mut submit => break Some(result),
            Ok(phase) = phases.recv() => {
                if phase == Phase::Uploading && spinner.is_none() && !logger::is_quiet() {
                    spinner = Some(create_progress_spinner("Uploading to compression service..."));
                }
            }
            signal = &mut interrupt, if listening => {
                listening = false;
                match signal {
                    Ok(()) => {
                        workflow.cancel();
                        verbose!("Interrupted, abandoning upload");
                        break None;
                    }
                    Err(e) => {
                        warn!("Cannot listen for Ctrl-C: {}", e);
                    }
                }
            }
        }
    };
    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }

    let Some(result) = result else {
        bail!("Upload cancelled");
    };
    let outcome = result.map_err(|e| {
        verbose!("{}", e);
        anyhow!(e.user_message())
    })?;

    print_compression_result(outcome.original_size, outcome.compressed_size);
    print_preview_locations(&workflow.snapshot());
    if !outcome.delivered {
        bail!(
            "Could not save {} to {:?}",
            outcome.download_file_name,
            output_dir
        );
    }
    success!(
        "Saved {:?}",
        output_dir.join(&outcome.download_file_name)
    );

    Ok(())
}

fn check(input: &Path) -> anyhow::Result<()> {
    let report = inspect_source(input).with_context(|| format!("Failed to read {:?}", input))?;
    print_source_report(&report);

    if !report.is_acceptable() {
        bail!("{} would be rejected", report.name);
    }
    Ok(())
}
