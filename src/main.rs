use anyhow::{Context, Result};
use clap::Parser;
use img_shrink::cli::{Args, Commands};
use img_shrink::constants::{
    COMPRESSED_SIZE_PREFIX, COMPRESSION_RATIO_PREFIX, MAX_BATCH_FILES, ORIGINAL_SIZE_PREFIX,
};
use img_shrink::progress::ConsoleProgress;
use img_shrink::formats::mime_type_for_path;
use img_shrink::input::display_name;
use img_shrink::{
    collect_input_paths, ensure_within_batch_limit, export_results, format_file_size, info,
    logger, parse_size, select_image_paths, success, warn, BatchProcessor, BatchTotals,
    CompressionOptions, OutputFormat, SessionState,
};
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;

fn main() -> Result<()> {
    let args = Args::parse();
    logger::init(args.quiet, args.verbose);

    match args.command {
        Commands::Compress {
            inputs,
            output,
            max_size,
            max_dimension,
            quality,
            preserve_resolution,
            convert_to,
            download_format,
            recursive,
            no_export,
        } => {
            let max_size_mb = max_size
                .as_deref()
                .map(|s| parse_size(s).map(|bytes| bytes as f64 / (1024.0 * 1024.0)))
                .transpose()
                .context("invalid --max-size")?;
            let convert_to = parse_format(convert_to.as_deref()).context("invalid --convert-to")?;
            let download_format =
                parse_format(download_format.as_deref()).context("invalid --download-format")?;

            let options = CompressionOptions::new(
                max_size_mb,
                max_dimension,
                quality,
                preserve_resolution,
                convert_to,
            )?;

            run_compress(&inputs, recursive, options, output, download_format, no_export)?;
        }
        Commands::Scan { inputs, recursive } => {
            run_scan(&inputs, recursive)?;
        }
    }

    Ok(())
}

fn parse_format(value: Option<&str>) -> img_shrink::Result<Option<OutputFormat>> {
    value.map(OutputFormat::from_str).transpose()
}

fn run_compress(
    inputs: &[String],
    recursive: bool,
    options: CompressionOptions,
    output: PathBuf,
    download_format: Option<OutputFormat>,
    no_export: bool,
) -> Result<()> {
    let paths = collect_input_paths(inputs, recursive)?;

    info!("🗜️  Compressing {} selected file(s)", paths.len());
    info!(
        "⚙️  Max size: {} | Max dimension: {}px | Quality: {:.0}",
        format_file_size(options.max_size_bytes()),
        options.max_dimension,
        options.initial_quality * 100.0
    );
    if let Some(target) = options.convert_to {
        info!("🔄 Converting to {} before compression", target);
    }

    let processor = BatchProcessor::new(options);
    let mut state = SessionState::new();
    let progress = ConsoleProgress::new();

    let report = processor
        .submit_paths(&mut state, &paths, &progress)
        .context("selection rejected")?;

    if report.submitted == 0 {
        warn!("No image files found in the selection");
        return Ok(());
    }

    if !report.failed.is_empty() {
        warn!("{} file(s) could not be processed", report.failed.len());
    }

    if state.results().is_empty() {
        return Ok(());
    }

    print_results(&state);

    if no_export {
        return Ok(());
    }

    let written = export_results(state.results(), &output, download_format)?;
    success!("Wrote {} file(s) to {:?}", written.len(), output);

    Ok(())
}

fn print_results(state: &SessionState) {
    info!("\n📋 Results:");
    for result in state.results() {
        let marker = if result.converted { " (converted)" } else { "" };
        info!(
            "  {} {} -> {}{}",
            result.id, result.original_name, result.result_format, marker
        );
        info!("     {} {}", ORIGINAL_SIZE_PREFIX, result.original_size_display());
        info!("     {} {}", COMPRESSED_SIZE_PREFIX, result.optimized_size_display());
        info!("     {} {}%", COMPRESSION_RATIO_PREFIX, result.compression_ratio_percent);
    }

    let totals = BatchTotals::from_results(state.results());
    info!("\n📊 Summary:");
    info!("  📁 Files compressed: {}", totals.count);
    info!("  📊 Total original size: {}", format_file_size(totals.original_bytes));
    info!("  📊 Total compressed size: {}", format_file_size(totals.optimized_bytes));
    info!("  🎯 Overall reduction: {}%", state.aggregate_reduction_percent());
}

fn run_scan(inputs: &[String], recursive: bool) -> Result<()> {
    let paths = collect_input_paths(inputs, recursive)?;
    let images = select_image_paths(&paths);

    info!("📋 Scanned {} file(s):", paths.len());
    for path in &paths {
        let verdict = if images.contains(path) { "accepted" } else { "ignored" };
        let size = fs::metadata(path)
            .map(|m| format_file_size(m.len()))
            .unwrap_or_else(|_| "unreadable".to_string());
        info!(
            "  {} [{}] {} - {}",
            display_name(path),
            mime_type_for_path(path),
            size,
            verdict
        );
    }

    ensure_within_batch_limit(images.len()).context("selection would be rejected")?;
    success!(
        "{} image(s) would be processed (limit {})",
        images.len(),
        MAX_BATCH_FILES
    );

    Ok(())
}
