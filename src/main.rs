use anyhow::Result;
use clap::{Parser, Subcommand};
use codescout::patch::{self, EditRequest};
use codescout::search::{self, SearchRequest};
use codescout::tool;
use colored::Colorize;
use similar::{ChangeTag, TextDiff};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "codescout")]
#[command(about = "Concurrent file search and safe Rust source patching", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search for files by glob, path regex, and content regex
    Search {
        /// Directory to search in
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Glob pattern for files (e.g. '**/*.rs')
        #[arg(short, long)]
        pattern: Option<String>,

        /// Regex applied to full file paths
        #[arg(short, long)]
        filter: Option<String>,

        /// Regex searched inside file contents
        #[arg(short, long)]
        contains: Option<String>,

        /// Emit results as JSON instead of human-readable output
        #[arg(long)]
        json: bool,
    },

    /// Replace exact text in a file (must match exactly once)
    Edit {
        /// File to edit
        path: PathBuf,

        /// Exact text to replace
        #[arg(long)]
        old: String,

        /// Replacement text; empty deletes the old text
        #[arg(long, default_value = "")]
        new: String,

        #[command(flatten)]
        opts: EditOpts,
    },

    /// Add a `use` declaration to a Rust file
    AddImport {
        path: PathBuf,

        /// Import path, e.g. 'std::fs'
        import: String,

        /// Optional alias (`use path as alias;`)
        #[arg(long)]
        alias: Option<String>,

        #[command(flatten)]
        opts: EditOpts,
    },

    /// Remove a `use` declaration from a Rust file
    RemoveImport {
        path: PathBuf,

        /// Import path to remove
        import: String,

        #[command(flatten)]
        opts: EditOpts,
    },

    /// Add a top-level `static` item to a Rust file
    AddVar {
        path: PathBuf,

        /// Item name
        name: String,

        /// Type annotation (optional if --value is given)
        #[arg(long = "type")]
        declared_type: Option<String>,

        /// Initializer expression (optional if --type is given)
        #[arg(long)]
        value: Option<String>,

        #[command(flatten)]
        opts: EditOpts,
    },

    /// Add a top-level `const` item to a Rust file
    AddConst {
        path: PathBuf,

        name: String,

        #[arg(long = "type")]
        declared_type: Option<String>,

        #[arg(long)]
        value: Option<String>,

        #[command(flatten)]
        opts: EditOpts,
    },

    /// Append a complete function to a Rust file
    AddFn {
        path: PathBuf,

        /// Complete function source, signature to closing brace
        #[arg(long)]
        code: String,

        #[command(flatten)]
        opts: EditOpts,
    },

    /// Replace a 1-indexed inclusive line range with new declarations
    ReplaceLines {
        path: PathBuf,

        start_line: usize,

        end_line: usize,

        /// Complete, syntactically valid declarations
        #[arg(long)]
        code: String,

        #[command(flatten)]
        opts: EditOpts,
    },

    /// Read a file with line numbers
    Read {
        path: PathBuf,

        /// First line to read (1-indexed)
        #[arg(long)]
        start: Option<usize>,

        /// Last line to read (inclusive)
        #[arg(long)]
        end: Option<usize>,
    },

    /// Print the tool specs as JSON for host-side registration
    Tools,

    /// Dispatch a raw tool call: NAME plus a JSON argument object
    Call {
        /// Tool name (search_files, edit_file, edit_source, read_file)
        name: String,

        /// JSON object with the tool arguments
        args: String,
    },
}

#[derive(clap::Args)]
struct EditOpts {
    /// Show what would change without modifying the file
    #[arg(short = 'n', long)]
    dry_run: bool,

    /// Show a unified diff of the change
    #[arg(short, long)]
    diff: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Search {
            path,
            pattern,
            filter,
            contains,
            json,
        } => cmd_search(path, pattern, filter, contains, json),

        Commands::Edit {
            path,
            old,
            new,
            opts,
        } => run_edit(
            EditRequest::ReplaceExact {
                path,
                old_text: old,
                new_text: new,
            },
            &opts,
        ),

        Commands::AddImport {
            path,
            import,
            alias,
            opts,
        } => run_edit(
            EditRequest::AddImport {
                path,
                import_path: import,
                alias,
            },
            &opts,
        ),

        Commands::RemoveImport { path, import, opts } => run_edit(
            EditRequest::RemoveImport {
                path,
                import_path: import,
            },
            &opts,
        ),

        Commands::AddVar {
            path,
            name,
            declared_type,
            value,
            opts,
        } => run_edit(
            EditRequest::AddDeclaration {
                path,
                name,
                declared_type,
                value_expr: value,
                is_const: false,
            },
            &opts,
        ),

        Commands::AddConst {
            path,
            name,
            declared_type,
            value,
            opts,
        } => run_edit(
            EditRequest::AddDeclaration {
                path,
                name,
                declared_type,
                value_expr: value,
                is_const: true,
            },
            &opts,
        ),

        Commands::AddFn { path, code, opts } => run_edit(
            EditRequest::AddFunction {
                path,
                source_code: code,
            },
            &opts,
        ),

        Commands::ReplaceLines {
            path,
            start_line,
            end_line,
            code,
            opts,
        } => run_edit(
            EditRequest::ReplaceLineRange {
                path,
                start_line,
                end_line,
                new_text: code,
            },
            &opts,
        ),

        Commands::Read { path, start, end } => cmd_read(path, start, end),

        Commands::Tools => {
            println!("{}", serde_json::to_string_pretty(&tool::specs())?);
            Ok(())
        }

        Commands::Call { name, args } => cmd_call(&name, &args),
    }
}

fn cmd_search(
    path: PathBuf,
    pattern: Option<String>,
    filter: Option<String>,
    contains: Option<String>,
    json: bool,
) -> Result<()> {
    let content_search = contains.is_some();
    let mut req = SearchRequest::new(path);
    req.glob = pattern;
    req.path_filter = filter;
    req.content = contains;

    let matches = search::search(&req)?;

    if json {
        let out: Vec<_> = matches
            .iter()
            .map(|m| {
                serde_json::json!({
                    "file": m.path.to_string_lossy(),
                    "lines": m.matched_lines,
                    "total_lines": m.total_lines,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    for found in &matches {
        if content_search {
            println!(
                "{} ({} matching {})",
                found.path.display().to_string().bold(),
                found.matched_lines.len(),
                if found.matched_lines.len() == 1 {
                    "line"
                } else {
                    "lines"
                }
            );
            for snippet in &found.snippets {
                println!("{}", snippet.dimmed());
                println!();
            }
        } else {
            println!("{}", found.path.display());
        }
    }

    println!(
        "{}",
        format!(
            "{} {} found",
            matches.len(),
            if matches.len() == 1 { "file" } else { "files" }
        )
        .dimmed()
    );

    Ok(())
}

fn run_edit(req: EditRequest, opts: &EditOpts) -> Result<()> {
    let planned = patch::plan(&req)?;

    if opts.diff {
        if let Some(candidate) = &planned.candidate {
            display_diff(req.path(), &planned.file.text, candidate);
        }
    }

    if opts.dry_run {
        println!(
            "{} {} {}",
            "[dry run]".cyan(),
            "Would apply:".bold(),
            planned.message
        );
        return Ok(());
    }

    let outcome = planned.commit()?;
    if outcome.changed {
        println!("{} {}", "✓".green(), outcome.message);
    } else {
        println!("{} {}", "⊙".yellow(), outcome.message);
    }

    Ok(())
}

fn cmd_read(path: PathBuf, start: Option<usize>, end: Option<usize>) -> Result<()> {
    let out = tool::read_file(tool::ReadFileArgs {
        path: path.to_string_lossy().into_owned(),
        start_line: start,
        end_line: end,
    });

    if let Some(error) = out.error {
        anyhow::bail!(error);
    }

    println!("{}", out.content);
    println!(
        "{}",
        format!(
            "lines {}-{} of {} ({} bytes)",
            out.start_line, out.end_line, out.total_lines, out.file_size
        )
        .dimmed()
    );

    Ok(())
}

fn cmd_call(name: &str, args: &str) -> Result<()> {
    let parsed: serde_json::Value = serde_json::from_str(args)
        .map_err(|e| anyhow::anyhow!("arguments are not valid JSON: {e}"))?;

    let result = tool::dispatch(name, parsed);
    println!("{}", serde_json::to_string_pretty(&result)?);

    // Mirror the error into the exit code so shells can branch on it.
    if result.get("error").is_some_and(|e| !e.is_null()) {
        std::process::exit(1);
    }

    Ok(())
}

/// Show a unified diff between the current and candidate file content.
fn display_diff(file: &Path, original: &str, modified: &str) {
    println!(
        "\n{}",
        format!("--- {} (original)", file.display()).dimmed()
    );
    println!("{}", format!("+++ {} (edited)", file.display()).dimmed());

    let diff = TextDiff::from_lines(original, modified);

    for change in diff.iter_all_changes() {
        let sign = match change.tag() {
            ChangeTag::Delete => format!("-{}", change).red(),
            ChangeTag::Insert => format!("+{}", change).green(),
            ChangeTag::Equal => format!(" {}", change).normal(),
        };
        print!("{}", sign);
    }
    println!();
}
