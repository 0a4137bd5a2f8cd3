//! Command-line front end for relocating mutation-testing findings.
//!
//! Matches two revisions of a source file and carries PIT mutations, or
//! single mappings, from the old revision over to the new one.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use ast_remap::{
    parse_path, report, xml, Matcher, MatcherConfig, Remapper, SyntaxTree, MAX_SIZE, MIN_DICE,
    MIN_HEIGHT,
};
use clap::{Args, Parser, Subcommand};
use log::info;

/// Relocate mutation-testing findings across source revisions
#[derive(Parser)]
#[command(name = "remap")]
#[command(version)]
#[command(about = "Relocate mutation-testing findings across source revisions", long_about = None)]
struct Cli {
    #[command(flatten)]
    matcher: MatcherArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct MatcherArgs {
    /// Subtrees of this height or lower are left to the bottom-up phase
    #[arg(long, global = true, default_value_t = MIN_HEIGHT)]
    min_height: usize,

    /// Minimum Dice similarity for matching two containers
    #[arg(long, global = true, default_value_t = MIN_DICE)]
    min_dice: f64,

    /// Combined reduced-tree size at which edit-distance refinement is skipped
    #[arg(long, global = true, default_value_t = MAX_SIZE)]
    max_size: usize,
}

impl MatcherArgs {
    fn config(&self) -> MatcherConfig {
        MatcherConfig::default()
            .with_min_height(self.min_height)
            .with_min_dice(self.min_dice)
            .with_max_size(self.max_size)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Relocate the mutations of a PIT report onto a new revision
    #[command(visible_alias = "m")]
    Mutations {
        /// Old revision (the one the report was produced for)
        old: String,
        /// New revision
        new: String,
        /// PIT mutations.xml report
        report: String,
        /// Output file (default: stdout)
        output: Option<String>,
    },

    /// Print the node mappings between two revisions
    #[command(visible_alias = "d")]
    Diff {
        /// Old revision
        old: String,
        /// New revision
        new: String,
    },

    /// Print the syntax tree of a file in the XML interchange format
    #[command(visible_alias = "t")]
    Tree {
        /// Source file (.java) or tree file (.xml)
        file: String,
    },
}

fn main() -> std::process::ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    let config = cli.matcher.config();

    let result = match cli.command {
        Commands::Mutations {
            old,
            new,
            report,
            output,
        } => run_mutations(&old, &new, &report, output.as_deref(), config),
        Commands::Diff { old, new } => run_diff(&old, &new, config),
        Commands::Tree { file } => run_tree(&file),
    };

    match result {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::ExitCode::FAILURE
        }
    }
}

fn load(label: &str, path: &str) -> Result<SyntaxTree, Box<dyn std::error::Error>> {
    eprintln!("Parsing {}: {}", label, path);
    Ok(parse_path(Path::new(path))?)
}

/// Relocates every mutation of the report that belongs to the old file.
fn run_mutations(
    old_path: &str,
    new_path: &str,
    report_path: &str,
    output_path: Option<&str>,
    config: MatcherConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let old = load("old revision", old_path)?;
    let new = load("new revision", new_path)?;

    eprintln!("Reading report: {}", report_path);
    let entries = report::parse_file(report_path)?;

    let file_name = Path::new(old_path)
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or("old revision path has no file name")?;
    let records: Vec<_> = entries
        .iter()
        .filter(|r| r.is_in_file(file_name))
        .cloned()
        .collect();
    info!("{} of {} report entries belong to {}", records.len(), entries.len(), file_name);

    eprintln!("Matching and relocating {} mutations...", records.len());
    let results = Remapper::new(config).remap_all(&old, &new, &records, &entries);

    let mut updated = Vec::with_capacity(results.len());
    for (record, result) in records.iter().zip(results) {
        match result {
            Some(u) => updated.push(u),
            None => eprintln!("Could not relocate {}", record),
        }
    }

    let mut output: Box<dyn Write> = match output_path {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(io::stdout()),
    };
    report::write_remapped(&mut output, &updated)?;

    eprintln!(
        "Relocated {} of {} mutations.",
        updated.len(),
        records.len()
    );
    Ok(())
}

/// Prints one line per mapping, in commit order.
fn run_diff(
    old_path: &str,
    new_path: &str,
    config: MatcherConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let old = load("old revision", old_path)?;
    let new = load("new revision", new_path)?;

    eprintln!("Building matching...");
    let result = Matcher::new(config).match_trees(&old, &new);

    let mut output = BufWriter::new(io::stdout());
    for mapping in &result.mappings {
        writeln!(output, "{} => {}", mapping.src, mapping.dst)?;
    }
    output.flush()?;

    eprintln!(
        "Mapped {} of {} old and {} new nodes.",
        result.mappings.len(),
        result.src_root.size(),
        result.dst_root.size()
    );
    Ok(())
}

fn run_tree(path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let tree = load("file", path)?;
    let mut output = io::stdout();
    xml::XmlPrinter::new(&mut output).print(tree.root())?;
    Ok(())
}
