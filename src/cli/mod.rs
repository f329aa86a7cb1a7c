//! Command-line front end.

pub mod prompt;

pub use prompt::TerminalPrompt;

use crate::audit::AuditLog;
use crate::config::AppConfig;
use crate::engine::{timestamped_root, CancelReason, DistributionEngine, RunOutcome};
use crate::error::DistributionError;
use crate::fs_port::LocalFileSystem;
use crate::license::JsonLicenseRenderer;
use crate::ports::{ConfirmationPort, NullSink, ReportSink};
use crate::report::OperationKind;
use crate::roster::{load_csv, write_template, TemplateKind};
use chrono::Local;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "roster-dist")]
#[command(about = "Roster-driven folder creation, file renaming and distribution", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Debug-level logging for this crate
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Approve every confirmation
    #[arg(short = 'y', long, global = true)]
    pub yes: bool,

    /// Audit trail directory (overrides configuration)
    #[arg(long, global = true)]
    pub log_dir: Option<PathBuf>,

    /// Do not write the audit trail
    #[arg(long, global = true)]
    pub no_audit: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create one folder per account identifier (column E)
    CreateFolders {
        /// Roster CSV
        #[arg(long)]
        roster: PathBuf,

        /// Base directory for the timestamped output root
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },

    /// Rename a folder's files after one course's roster rows
    RenameFiles {
        /// Roster CSV (course name, account identifier)
        #[arg(long)]
        roster: PathBuf,

        /// Folder whose files are renamed
        #[arg(long)]
        folder: PathBuf,

        /// Course name; asked for when omitted
        #[arg(long)]
        course: Option<String>,

        /// Category inserted into each name; asked for when omitted
        #[arg(long)]
        category: Option<String>,
    },

    /// Copy files into the subfolder sharing their name prefix
    OrganizeFiles {
        /// Folder holding the files to distribute
        #[arg(long)]
        source: PathBuf,

        /// Folder holding one subfolder per account
        #[arg(long)]
        target: PathBuf,

        /// Prefix length used for matching
        #[arg(long)]
        match_length: Option<usize>,
    },

    /// Copy one file into every subfolder, overwriting existing copies
    BroadcastCopy {
        /// File to copy
        #[arg(long)]
        file: PathBuf,

        /// Folder whose subfolders receive the file
        #[arg(long)]
        target: PathBuf,
    },

    /// Generate one license document per roster row
    Licenses {
        /// License roster CSV
        #[arg(long)]
        roster: PathBuf,

        /// Existing output folder
        #[arg(long)]
        output: PathBuf,
    },

    /// Write an empty roster template
    Template {
        #[arg(value_enum)]
        kind: TemplateArg,

        /// Output file or directory (defaults to the template's file name)
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TemplateArg {
    /// Course name and account identifier
    Rename,
    /// Student roster for folder creation
    Folders,
    /// Textbook license credentials
    Licenses,
}

impl From<TemplateArg> for TemplateKind {
    fn from(arg: TemplateArg) -> Self {
        match arg {
            TemplateArg::Rename => TemplateKind::RenameFiles,
            TemplateArg::Folders => TemplateKind::CreateFolders,
            TemplateArg::Licenses => TemplateKind::Licenses,
        }
    }
}

/// Run a parsed command line
pub fn execute(cli: Cli) -> Result<(), DistributionError> {
    let mut config = AppConfig::from_env()?;
    if let Some(dir) = cli.log_dir {
        config.log_dir = dir;
    }

    if let Commands::Template { kind, output } = &cli.command {
        let path = template_path(*kind, output.as_deref());
        write_template((*kind).into(), &path)?;
        println!("Template written: {}", path.display());
        return Ok(());
    }

    let sink = open_sink(&config, cli.no_audit);
    let fs = LocalFileSystem::new();
    let prompt = TerminalPrompt::new(cli.yes);
    let engine = DistributionEngine::new(&fs, &prompt);

    let outcome = match cli.command {
        Commands::CreateFolders { roster, output_dir } => {
            let table = load_csv(&roster)?;
            let base = output_dir.unwrap_or_else(|| config.output_dir.clone());
            let root = timestamped_root(&base, &Local::now());
            engine.create_folders(&table, &root)?
        }
        Commands::RenameFiles {
            roster,
            folder,
            course,
            category,
        } => {
            let table = load_csv(&roster)?;
            let course = course.or_else(|| prompt.prompt_text("Course name (e.g. 数学Ⅰイ①)", None));
            let category = category.or_else(|| prompt.prompt_text("Category (e.g. 課題)", None));

            match (non_blank(course), non_blank(category)) {
                (Some(course), Some(category)) => {
                    engine.rename_files(&table, &course, &folder, &category)?
                }
                _ => RunOutcome::cancelled(OperationKind::RenameFiles, CancelReason::InputWithdrawn),
            }
        }
        Commands::OrganizeFiles {
            source,
            target,
            match_length,
        } => engine.organize_files(
            &source,
            &target,
            match_length.unwrap_or(config.match_length),
        )?,
        Commands::BroadcastCopy { file, target } => engine.broadcast_copy(&file, &target)?,
        Commands::Licenses { roster, output } => {
            let table = load_csv(&roster)?;
            engine.generate_licenses(
                &table,
                &output,
                Local::now().date_naive(),
                &config.license_file_label,
                &JsonLicenseRenderer,
            )?
        }
        Commands::Template { .. } => return Ok(()),
    };

    print_outcome(&outcome);

    if let Err(e) = sink.record(&outcome) {
        tracing::warn!(error = %e, "Failed to record audit entry");
    }
    Ok(())
}

fn open_sink(config: &AppConfig, disabled: bool) -> Box<dyn ReportSink> {
    if disabled {
        return Box::new(NullSink);
    }
    match AuditLog::open(&config.log_dir, config.log_retention_days) {
        Ok(log) => Box::new(log),
        Err(e) => {
            tracing::warn!(error = %e, "Audit trail unavailable, continuing without it");
            Box::new(NullSink)
        }
    }
}

fn print_outcome(outcome: &RunOutcome) {
    match outcome {
        RunOutcome::Completed { report } => print!("{}", report),
        RunOutcome::Cancelled { operation, reason } => {
            println!("{} cancelled ({:?})", operation, reason);
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Template destination: a directory gets the default file name appended
fn template_path(kind: TemplateArg, output: Option<&Path>) -> PathBuf {
    let file_name = TemplateKind::from(kind).default_file_name();
    match output {
        Some(path) if path.is_dir() => path.join(file_name),
        Some(path) => path.to_path_buf(),
        None => PathBuf::from(file_name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use tempfile::tempdir;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parses_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "roster-dist",
            "organize-files",
            "--source",
            "/in",
            "--target",
            "/out",
            "--match-length",
            "6",
            "--yes",
            "-v",
        ])
        .unwrap();

        assert!(cli.yes);
        assert!(cli.verbose);
        match cli.command {
            Commands::OrganizeFiles { match_length, .. } => assert_eq!(match_length, Some(6)),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_template_kind_parses() {
        let cli = Cli::try_parse_from(["roster-dist", "template", "licenses"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Template {
                kind: TemplateArg::Licenses,
                output: None
            }
        ));
    }

    #[test]
    fn test_template_path_into_directory() {
        let dir = tempdir().unwrap();
        assert_eq!(
            template_path(TemplateArg::Folders, Some(dir.path())),
            dir.path().join("step2_folder_create.csv")
        );
        assert_eq!(
            template_path(TemplateArg::Rename, None),
            PathBuf::from("step1_file_rename.csv")
        );
    }

    #[test]
    fn test_non_blank() {
        assert_eq!(non_blank(Some(" 英語 ".into())), Some("英語".to_string()));
        assert_eq!(non_blank(Some("  ".into())), None);
        assert_eq!(non_blank(None), None);
    }
}
