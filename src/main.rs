/*!
 * Command-line interface for codemapper
 */

use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::{CommandFactory, Parser};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::ThreadPoolBuilder;

use codemapper::config::{Args, Config, OpenTarget};
use codemapper::profile::{Profile, ProfileStore};
use codemapper::report::{ReportFormat, Reporter, ScanReport};
use codemapper::scanner::Scanner;
use codemapper::utils::open_in_file_browser;
use codemapper::writer::MapWriter;

fn main() -> io::Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    let level = match args.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    if let Some(shell) = args.generate {
        let mut cmd = Args::command();
        let name = cmd.get_name().to_string();
        clap_complete::generate(shell, &mut cmd, name, &mut io::stdout());
        return Ok(());
    }

    let store = match &args.profile_dir {
        Some(dir) => ProfileStore::new(dir),
        None => ProfileStore::default_location(),
    };

    // Save the flags and stop
    if let Some(name) = &args.save_profile {
        let path = store.save(name, &Profile::from_args(&args))?;
        println!("💾 Profile saved: {}", path.display());
        println!("To use: codemapper --profile {}", name);
        return Ok(());
    }

    // Create and validate configuration
    let config = Config::resolve(&args, &store)?;
    config.validate()?;

    if config.scan.num_threads > 1 {
        if let Err(e) = ThreadPoolBuilder::new()
            .num_threads(config.scan.num_threads)
            .build_global()
        {
            log::warn!("Failed to set thread pool size: {}", e);
        }
    }

    let progress = if args.quiet {
        ProgressBar::hidden()
    } else {
        ProgressBar::new_spinner()
    };
    progress.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {prefix:.bold.cyan} {pos} files {wide_msg:.dim.white}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    progress.enable_steady_tick(Duration::from_millis(100));
    progress.set_prefix("📊 Mapping");

    let scanner = Scanner::new(config.scan.clone(), Arc::new(progress.clone()));
    let writer = MapWriter::new(&config.output_file);

    let start_time = Instant::now();
    let output = scanner.scan()?;
    writer.write(&output)?;
    let duration = start_time.elapsed();

    progress.finish_and_clear();

    let report = ScanReport {
        output_file: config.output_file.display().to_string(),
        duration,
        map_chars: output.text.chars().count(),
        summary: output.summary,
    };
    let format = if args.quiet {
        ReportFormat::Plain
    } else {
        ReportFormat::ConsoleTable
    };
    Reporter::new(format).print_report(&report);

    if let Some(target) = config.open {
        let path = match target {
            OpenTarget::File => config.output_file.clone(),
            OpenTarget::Folder => config
                .output_file
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map(|p| p.to_path_buf())
                .unwrap_or_else(|| ".".into()),
        };
        if let Err(e) = open_in_file_browser(&path) {
            log::warn!("Could not open {}: {}", path.display(), e);
        }
    }

    Ok(())
}
