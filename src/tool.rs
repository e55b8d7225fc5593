//! Tool surfaces for external agents.
//!
//! Every tool has the same shape: structured JSON input, structured JSON
//! output embedding either a success payload or a human-readable `error`
//! string. The dispatch boundary never raises for expected failures — an
//! autonomous caller always gets a result it can act on, and every error
//! message states the corrective action.

use crate::patch::{self, EditRequest};
use crate::search::{self, SearchRequest};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::io::{BufRead, BufReader};
use std::path::PathBuf;

/// Safety cap on lines returned by a single `read_file` call.
const MAX_READ_LINES: usize = 5000;

/// Name, description, and input schema for host-side tool registration.
#[derive(Debug, Clone, Serialize)]
pub struct ToolSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub input_schema: Value,
}

/// Dispatch a raw tool call by name. Unknown tools, malformed arguments, and
/// every operational failure all come back as a JSON object with an `error`
/// field.
pub fn dispatch(name: &str, args: Value) -> Value {
    match name {
        "search_files" => run(args, search_files),
        "edit_file" => run(args, edit_file),
        "edit_source" => run(args, edit_source),
        "read_file" => run(args, read_file),
        _ => json!({
            "error": format!(
                "unknown tool '{name}'. Available tools: search_files, edit_file, edit_source, read_file"
            )
        }),
    }
}

fn run<A, O>(args: Value, f: fn(A) -> O) -> Value
where
    A: DeserializeOwned,
    O: Serialize,
{
    match serde_json::from_value::<A>(args) {
        Ok(parsed) => serde_json::to_value(f(parsed))
            .unwrap_or_else(|e| json!({ "error": format!("failed to serialize result: {e}") })),
        Err(e) => json!({ "error": format!("invalid arguments: {e}") }),
    }
}

// ---------------------------------------------------------------------------
// search_files

#[derive(Debug, Deserialize)]
pub struct SearchFilesArgs {
    /// Directory to search in; defaults to the current directory.
    #[serde(default = "default_path")]
    pub path: String,
    /// Glob pattern for files, e.g. `**/*.rs`.
    #[serde(default)]
    pub pattern: Option<String>,
    /// Regex applied to full file paths.
    #[serde(default)]
    pub filter: Option<String>,
    /// Regex searched inside file contents.
    #[serde(default)]
    pub contains: Option<String>,
}

fn default_path() -> String {
    ".".to_string()
}

#[derive(Debug, Serialize)]
pub struct FileMatchOutput {
    pub file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lines: Option<Vec<usize>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snippets: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_lines: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct SearchFilesOutput {
    pub matches: Vec<FileMatchOutput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub fn search_files(args: SearchFilesArgs) -> SearchFilesOutput {
    let mut req = SearchRequest::new(&args.path);
    req.glob = args.pattern;
    req.path_filter = args.filter;
    req.content = args.contains;

    let had_content_pattern = req.content.is_some();
    match search::search(&req) {
        Ok(matches) => SearchFilesOutput {
            matches: matches
                .into_iter()
                .map(|m| FileMatchOutput {
                    file: m.path.to_string_lossy().into_owned(),
                    lines: had_content_pattern.then_some(m.matched_lines),
                    snippets: had_content_pattern.then_some(m.snippets),
                    total_lines: had_content_pattern.then_some(m.total_lines),
                })
                .collect(),
            error: None,
        },
        Err(e) => SearchFilesOutput {
            matches: Vec::new(),
            error: Some(e.to_string()),
        },
    }
}

// ---------------------------------------------------------------------------
// edit_file (exact-text variant)

#[derive(Debug, Deserialize)]
pub struct EditFileArgs {
    pub path: String,
    /// The exact text to replace; must occur exactly once.
    pub old_string: String,
    /// Replacement text; empty deletes the old text.
    #[serde(default)]
    pub new_string: String,
}

#[derive(Debug, Serialize)]
pub struct EditOutput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl EditOutput {
    fn ok(message: String) -> Self {
        Self {
            message: Some(message),
            error: None,
        }
    }

    fn err(error: String) -> Self {
        Self {
            message: None,
            error: Some(error),
        }
    }
}

pub fn edit_file(args: EditFileArgs) -> EditOutput {
    if args.path.is_empty() {
        return EditOutput::err("path cannot be empty".to_string());
    }

    let req = EditRequest::ReplaceExact {
        path: PathBuf::from(&args.path),
        old_text: args.old_string,
        new_text: args.new_string,
    };

    match patch::apply(&req) {
        Ok(outcome) => EditOutput::ok(format!("{} in {}", outcome.message, args.path)),
        Err(e) => EditOutput::err(e.to_string()),
    }
}

// ---------------------------------------------------------------------------
// edit_source (structured variant)

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    AddImport,
    RemoveImport,
    AddVar,
    AddConst,
    AddFunction,
    ReplaceCodeBlock,
}

#[derive(Debug, Deserialize)]
pub struct EditSourceArgs {
    pub path: String,
    pub operation: Operation,
    #[serde(default)]
    pub import_path: Option<String>,
    #[serde(default)]
    pub import_alias: Option<String>,
    #[serde(default)]
    pub var_name: Option<String>,
    #[serde(default)]
    pub var_type: Option<String>,
    #[serde(default)]
    pub var_value: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub start_line: Option<usize>,
    #[serde(default)]
    pub end_line: Option<usize>,
}

/// Decode the flat tool arguments into a closed [`EditRequest`] variant.
/// This is the single place where the string-tagged surface meets the sum
/// type; past here, matching is compiler-checked and exhaustive.
fn decode_edit_source(args: EditSourceArgs) -> Result<EditRequest, String> {
    let path = PathBuf::from(&args.path);
    if args.path.is_empty() {
        return Err("path cannot be empty".to_string());
    }

    match args.operation {
        Operation::AddImport => Ok(EditRequest::AddImport {
            path,
            import_path: args.import_path.unwrap_or_default(),
            alias: args.import_alias,
        }),
        Operation::RemoveImport => Ok(EditRequest::RemoveImport {
            path,
            import_path: args.import_path.unwrap_or_default(),
        }),
        Operation::AddVar | Operation::AddConst => Ok(EditRequest::AddDeclaration {
            path,
            name: args.var_name.unwrap_or_default(),
            declared_type: args.var_type,
            value_expr: args.var_value,
            is_const: matches!(args.operation, Operation::AddConst),
        }),
        Operation::AddFunction => Ok(EditRequest::AddFunction {
            path,
            source_code: args.code.unwrap_or_default(),
        }),
        Operation::ReplaceCodeBlock => {
            let (Some(start_line), Some(end_line)) = (args.start_line, args.end_line) else {
                return Err(
                    "start_line and end_line are required for replace_code_block".to_string()
                );
            };
            Ok(EditRequest::ReplaceLineRange {
                path,
                start_line,
                end_line,
                new_text: args.code.unwrap_or_default(),
            })
        }
    }
}

pub fn edit_source(args: EditSourceArgs) -> EditOutput {
    let path = args.path.clone();
    let req = match decode_edit_source(args) {
        Ok(req) => req,
        Err(e) => return EditOutput::err(e),
    };

    match patch::apply(&req) {
        Ok(outcome) => EditOutput::ok(format!("{} in {}", outcome.message, path)),
        Err(e) => EditOutput::err(e.to_string()),
    }
}

// ---------------------------------------------------------------------------
// read_file

#[derive(Debug, Deserialize)]
pub struct ReadFileArgs {
    pub path: String,
    /// First line to read (1-indexed).
    #[serde(default)]
    pub start_line: Option<usize>,
    /// Last line to read (inclusive).
    #[serde(default)]
    pub end_line: Option<usize>,
}

#[derive(Debug, Serialize, Default)]
pub struct ReadFileOutput {
    pub content: String,
    pub total_lines: usize,
    pub file_size: u64,
    pub start_line: usize,
    pub end_line: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ReadFileOutput {
    fn err(error: String) -> Self {
        Self {
            error: Some(error),
            ..Default::default()
        }
    }
}

pub fn read_file(args: ReadFileArgs) -> ReadFileOutput {
    if args.path.is_empty() {
        return ReadFileOutput::err("path cannot be empty".to_string());
    }

    let meta = match std::fs::metadata(&args.path) {
        Ok(meta) => meta,
        Err(_) => {
            return ReadFileOutput::err(format!(
                "file '{}' not found. Use search_files to find the correct path",
                args.path
            ))
        }
    };
    if meta.is_dir() {
        return ReadFileOutput::err(format!("path '{}' is a directory, not a file", args.path));
    }

    let file = match std::fs::File::open(&args.path) {
        Ok(file) => file,
        Err(e) => return ReadFileOutput::err(format!("failed to open '{}': {e}", args.path)),
    };

    let start_line = args.start_line.unwrap_or(1).max(1);
    let mut end_line = args.end_line;
    if let Some(end) = end_line {
        if end < start_line {
            return ReadFileOutput::err(format!(
                "end_line {end} is before start_line {start_line}"
            ));
        }
        // Clamp oversized requests instead of failing them.
        if end - start_line + 1 > MAX_READ_LINES {
            end_line = Some(start_line + MAX_READ_LINES - 1);
        }
    }

    let mut content = String::new();
    let mut total_lines = 0usize;
    let mut lines_read = 0usize;
    let mut actual_end = 0usize;

    for line in BufReader::new(file).lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                return ReadFileOutput::err(format!("error while reading '{}': {e}", args.path))
            }
        };
        total_lines += 1;

        let in_range = total_lines >= start_line
            && end_line.map(|end| total_lines <= end).unwrap_or(true)
            && lines_read < MAX_READ_LINES;
        if in_range {
            if lines_read > 0 {
                content.push('\n');
            }
            content.push_str(&format!("{total_lines:>4}|{line}"));
            lines_read += 1;
            actual_end = total_lines;
        }
    }

    if total_lines > 0 && start_line > total_lines {
        return ReadFileOutput::err(format!(
            "start_line {start_line} is beyond file end (total lines: {total_lines})"
        ));
    }

    ReadFileOutput {
        content,
        total_lines,
        file_size: meta.len(),
        start_line,
        end_line: actual_end,
        error: None,
    }
}

// ---------------------------------------------------------------------------
// registration

/// Tool specs for host-side registration with a tool-calling model.
pub fn specs() -> Vec<ToolSpec> {
    vec![
        ToolSpec {
            name: "search_files",
            description: "Recursively search for files by glob pattern, regex filter, and \
                content. Returns full file paths for use with other tools. Content searches \
                ('contains') are parallelized and return exact line numbers and snippets. \
                Example: search_files(path='src', pattern='**/*.rs', contains='fn.*Error').",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "path": { "type": "string", "description": "Directory to search in (default: current directory '.')." },
                    "pattern": { "type": "string", "description": "Glob pattern for files (e.g. '**/*.rs', '*.md')." },
                    "filter": { "type": "string", "description": "Regex to filter file paths, for matching not expressible as a glob." },
                    "contains": { "type": "string", "description": "Regex to search inside file contents. Returns line numbers and snippets." }
                }
            }),
        },
        ToolSpec {
            name: "edit_file",
            description: "Replace text in a file. old_string must match the file content \
                exactly once, including whitespace; add surrounding context to disambiguate. \
                An empty new_string deletes the old text. The edit is validated and written \
                atomically; a failed edit leaves the file unchanged.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "path": { "type": "string", "description": "Path to the Rust file to edit." },
                    "old_string": { "type": "string", "description": "Exact text to replace (must occur exactly once)." },
                    "new_string": { "type": "string", "description": "Replacement text. Empty string deletes old_string." }
                },
                "required": ["path", "old_string"]
            }),
        },
        ToolSpec {
            name: "edit_source",
            description: "Structured edits to a Rust file: add_import, remove_import, \
                add_var, add_const, add_function, or replace_code_block. Code for \
                add_function and replace_code_block MUST be complete declarations (a full \
                'fn ...' from signature to closing brace); partial snippets are rejected. \
                All edits are syntax-validated and written atomically.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "path": { "type": "string", "description": "Path to the Rust file to edit." },
                    "operation": {
                        "type": "string",
                        "enum": ["add_import", "remove_import", "add_var", "add_const", "add_function", "replace_code_block"],
                        "description": "The edit operation to perform."
                    },
                    "import_path": { "type": "string", "description": "For add_import/remove_import: the import path (e.g. 'std::fs')." },
                    "import_alias": { "type": "string", "description": "For add_import: optional alias for the import." },
                    "var_name": { "type": "string", "description": "For add_var/add_const: the item name." },
                    "var_type": { "type": "string", "description": "For add_var/add_const: the type (e.g. 'usize'). Optional if var_value is provided." },
                    "var_value": { "type": "string", "description": "For add_var/add_const: the initializer expression. Optional if var_type is provided." },
                    "code": { "type": "string", "description": "For add_function/replace_code_block: complete, syntactically valid Rust declarations." },
                    "start_line": { "type": "integer", "description": "For replace_code_block: first line to replace (1-indexed)." },
                    "end_line": { "type": "integer", "description": "For replace_code_block: last line to replace (inclusive)." }
                },
                "required": ["path", "operation"]
            }),
        },
        ToolSpec {
            name: "read_file",
            description: "Read a file with line numbers. Can read slices of large files via \
                start_line/end_line; returns total line count and size so callers can decide \
                what to read next. Capped at 5000 lines per call.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "path": { "type": "string", "description": "Path of the file to read." },
                    "start_line": { "type": "integer", "description": "Line to start reading from (1-indexed)." },
                    "end_line": { "type": "integer", "description": "Line to stop reading at (inclusive)." }
                },
                "required": ["path"]
            }),
        },
    ]
}
