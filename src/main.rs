use std::{
    path::{Path, PathBuf},
    process::ExitCode,
};

use clap::{Parser, Subcommand};
use magolor::{
    driver::{
        driver::{CheckReport, Compilation, DriverError},
        project::loose_module_path,
    },
    module::module::PackageOrigin,
    query::query::symbols,
};
use tracing_subscriber::{
    fmt::{format::FmtSpan, time::FormatTime},
    EnvFilter,
};

/// Magolor compiler front-end
#[derive(Parser)]
#[command(name = "magolor")]
#[command(version)]
#[command(about = "Resolve and type-check Magolor sources", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check loose source files as one package
    Check {
        #[arg(value_name = "FILES", required = true)]
        files: Vec<PathBuf>,

        /// Package the files belong to
        #[arg(long, default_value = "main")]
        package: String,
    },
    /// Check every source of a project described by project.toml
    CheckProject {
        #[arg(long, value_name = "DIR", default_value = ".")]
        root: PathBuf,
    },
    /// List the top-level symbols declared in the given files
    Symbols {
        #[arg(value_name = "FILES", required = true)]
        files: Vec<PathBuf>,

        #[arg(long, default_value = "main")]
        package: String,
    },
}

struct NoTimestamp;

impl FormatTime for NoTimestamp {
    fn format_time(&self, _w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        Ok(())
    }
}

fn main() -> ExitCode {
    if let Ok(filter) = EnvFilter::try_from_env("MAGOLOR_LOG") {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_level(true)
            .with_timer(NoTimestamp)
            .with_span_events(FmtSpan::NEW | FmtSpan::CLOSE)
            .with_writer(std::io::stderr)
            .init();
        tracing::debug!("tracing initialized");
    }

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Check { files, package } => check_files(&files, &package),
        Commands::CheckProject { root } => check_project(&root),
        Commands::Symbols { files, package } => list_symbols(&files, &package),
    };

    match result {
        Ok(code) => code,
        Err(error) => {
            eprintln!("error: {}", error);
            ExitCode::FAILURE
        }
    }
}

fn load_files(files: &[PathBuf], package: &str) -> Result<Compilation, DriverError> {
    let mut compilation = Compilation::new();
    let package = PackageOrigin::Root(package.to_string());
    let cwd = std::env::current_dir().unwrap_or_default();

    for path in files {
        let display = path.to_string_lossy().replace('\\', "/");
        let module_path = loose_module_path(path, &cwd, &package);
        compilation.add_file(path, &display, &module_path, package.clone())?;
    }

    Ok(compilation)
}

fn check_files(files: &[PathBuf], package: &str) -> Result<ExitCode, DriverError> {
    let mut compilation = load_files(files, package)?;
    let report = compilation.check();
    Ok(print_report(&compilation, &report))
}

fn check_project(root: &Path) -> Result<ExitCode, DriverError> {
    let mut compilation = Compilation::new();
    let config = compilation.load_project(root)?;
    let report = compilation.check();

    println!(
        "{} {}: {} modules",
        config.project.name,
        config.project.version,
        report.modules.len()
    );
    Ok(print_report(&compilation, &report))
}

fn list_symbols(files: &[PathBuf], package: &str) -> Result<ExitCode, DriverError> {
    let compilation = load_files(files, package)?;

    for symbol in symbols(compilation.registry()) {
        let visibility = if symbol.is_public { "pub" } else { "priv" };
        println!("{}.{}\t{}\t{}", symbol.module, symbol.name, symbol.kind, visibility);
    }

    Ok(ExitCode::SUCCESS)
}

fn print_report(compilation: &Compilation, report: &CheckReport) -> ExitCode {
    for error in report.diagnostics() {
        eprintln!("{}", compilation.render(error));
    }

    if report.has_errors() {
        eprintln!("{} error(s) found", report.error_count());
        ExitCode::FAILURE
    } else {
        println!("no errors found");
        ExitCode::SUCCESS
    }
}
