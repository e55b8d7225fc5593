//! Structured edits: declaration-level operations guided by the parse tree.
//!
//! Spans come from the tree-sitter inventory so splices never disturb
//! comments or formatting outside the edited range; fragments and rendered
//! declarations are checked with syn before the splice is even computed. The
//! final safety gates in [`SourceFile::commit`] run regardless — a sound
//! splice plan can still produce invalid text if this logic has a defect.
//!
//! Every add/remove operation is idempotent: repeating it reports
//! "already exists" / "not found" and leaves the file unchanged.

use crate::patch::errors::PatchError;
use crate::patch::source::SourceFile;
use crate::pool;
use crate::syntax::{validate, DeclInventory, SyntaxError};
use tracing::debug;

/// Candidate content plus the human-readable message for one operation.
/// `None` content means the operation was an idempotent no-op.
pub type PlanOutput = (Option<String>, String);

fn inventory(text: &str) -> Result<DeclInventory, SyntaxError> {
    pool::with_parser(|parser| {
        let parsed = parser.parse_with_source(text)?;
        Ok(DeclInventory::collect(&parsed))
    })?
}

/// One importable path inside a `use` declaration.
#[derive(Debug, PartialEq, Eq)]
struct UseLeaf {
    path: String,
    alias: Option<String>,
}

/// Flatten a `use` declaration into its leaf paths.
///
/// `use a::{b, c as d};` yields `a::b` and `a::c` (alias `d`); `use a::{self}`
/// yields `a` itself.
fn flatten_use(item: &syn::ItemUse) -> Vec<UseLeaf> {
    let mut leaves = Vec::new();
    walk_use_tree(String::new(), &item.tree, &mut leaves);
    leaves
}

fn walk_use_tree(prefix: String, tree: &syn::UseTree, out: &mut Vec<UseLeaf>) {
    let join = |prefix: &str, segment: &str| {
        if prefix.is_empty() {
            segment.to_string()
        } else {
            format!("{prefix}::{segment}")
        }
    };

    match tree {
        syn::UseTree::Path(p) => {
            walk_use_tree(join(&prefix, &p.ident.to_string()), &p.tree, out)
        }
        syn::UseTree::Name(n) => {
            let ident = n.ident.to_string();
            let path = if ident == "self" && !prefix.is_empty() {
                prefix
            } else {
                join(&prefix, &ident)
            };
            out.push(UseLeaf { path, alias: None });
        }
        syn::UseTree::Rename(r) => out.push(UseLeaf {
            path: join(&prefix, &r.ident.to_string()),
            alias: Some(r.rename.to_string()),
        }),
        syn::UseTree::Glob(_) => out.push(UseLeaf {
            path: join(&prefix, "*"),
            alias: None,
        }),
        syn::UseTree::Group(g) => {
            for t in &g.items {
                walk_use_tree(prefix.clone(), t, out);
            }
        }
    }
}

/// Leaf paths of one inventoried `use` declaration, or empty when the text
/// does not parse (the commit gates will flag the file itself).
fn use_leaves(text: &str) -> Vec<UseLeaf> {
    syn::parse_str::<syn::ItemUse>(text)
        .map(|item| flatten_use(&item))
        .unwrap_or_default()
}

pub fn add_import(
    file: &SourceFile,
    import_path: &str,
    alias: Option<&str>,
) -> Result<PlanOutput, PatchError> {
    if import_path.is_empty() {
        return Err(PatchError::EmptyField {
            field: "import_path",
        });
    }
    syn::parse_str::<syn::Path>(import_path).map_err(|e| PatchError::BadImportPath {
        import_path: import_path.to_string(),
        message: e.to_string(),
    })?;
    if let Some(alias) = alias {
        syn::parse_str::<syn::Ident>(alias).map_err(|_| PatchError::BadIdentifier {
            name: alias.to_string(),
        })?;
    }

    let inv = inventory(&file.text)?;

    let exists = inv
        .uses
        .iter()
        .flat_map(|u| use_leaves(&u.text))
        .any(|leaf| leaf.path == import_path);
    if exists {
        return Ok((None, format!("Import '{import_path}' already exists")));
    }

    let rendered = match alias {
        Some(alias) => format!("use {import_path} as {alias};"),
        None => format!("use {import_path};"),
    };

    let candidate = if let Some(end) = inv.use_block_end() {
        file.splice(end, end, &format!("\n{rendered}"))
    } else if let Some(start) = inv.first_item_start {
        file.splice(start, start, &format!("{rendered}\n\n"))
    } else {
        let mut out = file.text.clone();
        if !out.is_empty() && !out.ends_with('\n') {
            out.push('\n');
        }
        out.push_str(&rendered);
        out.push('\n');
        out
    };

    let message = match alias {
        Some(alias) => format!("Added import '{import_path}' as '{alias}'"),
        None => format!("Added import '{import_path}'"),
    };
    debug!(path = %file.path.display(), import = import_path, "planned add_import");
    Ok((Some(candidate), message))
}

pub fn remove_import(file: &SourceFile, import_path: &str) -> Result<PlanOutput, PatchError> {
    if import_path.is_empty() {
        return Err(PatchError::EmptyField {
            field: "import_path",
        });
    }

    let inv = inventory(&file.text)?;

    for decl in &inv.uses {
        let leaves = use_leaves(&decl.text);
        if !leaves.iter().any(|leaf| leaf.path == import_path) {
            continue;
        }
        if leaves.len() > 1 {
            return Err(PatchError::GroupedImport {
                import_path: import_path.to_string(),
            });
        }

        // Take the trailing newline with the declaration.
        let mut end = decl.byte_end;
        if file.text[end..].starts_with('\n') {
            end += 1;
        }
        let candidate = file.splice(decl.byte_start, end, "");
        return Ok((
            Some(candidate),
            format!("Removed import '{import_path}'"),
        ));
    }

    Ok((None, format!("Import '{import_path}' not found")))
}

pub fn add_declaration(
    file: &SourceFile,
    name: &str,
    declared_type: Option<&str>,
    value_expr: Option<&str>,
    is_const: bool,
) -> Result<PlanOutput, PatchError> {
    if name.is_empty() {
        return Err(PatchError::EmptyField { field: "var_name" });
    }
    syn::parse_str::<syn::Ident>(name).map_err(|_| PatchError::BadIdentifier {
        name: name.to_string(),
    })?;
    if declared_type.is_none() && value_expr.is_none() {
        return Err(PatchError::MissingTypeAndValue);
    }
    if let Some(ty) = declared_type {
        validate::validate_type(ty)?;
    }
    if let Some(expr) = value_expr {
        validate::validate_expr(expr)?;
    }

    let inv = inventory(&file.text)?;
    let (keyword, existing) = if is_const {
        ("const", inv.const_item(name))
    } else {
        ("static", inv.static_item(name))
    };
    if existing.is_some() {
        let kind = if is_const { "Const" } else { "Static" };
        return Ok((None, format!("{kind} '{name}' already exists")));
    }

    // Syntax-level placeholders keep the declaration parseable when the
    // caller omits a part; semantic validity is the compiler's concern.
    let ty = declared_type.unwrap_or("_");
    let value = value_expr.unwrap_or("Default::default()");
    let rendered = format!("{keyword} {name}: {ty} = {value};");

    let candidate = append_item(&file.text, &rendered);
    Ok((Some(candidate), format!("Added {keyword} '{name}'")))
}

pub fn add_function(file: &SourceFile, code: &str) -> Result<PlanOutput, PatchError> {
    if code.is_empty() {
        return Err(PatchError::EmptyField { field: "code" });
    }

    let parsed_fn = validate::parse_function_fragment(code)?;
    let name = parsed_fn.sig.ident.to_string();

    let inv = inventory(&file.text)?;
    if inv.function(&name).is_some() {
        return Ok((None, format!("Function '{name}' already exists")));
    }

    let candidate = append_item(&file.text, code.trim());
    Ok((Some(candidate), format!("Added function '{name}'")))
}

pub fn replace_line_range(
    file: &SourceFile,
    start_line: usize,
    end_line: usize,
    new_text: &str,
) -> Result<PlanOutput, PatchError> {
    if new_text.is_empty() {
        return Err(PatchError::EmptyField { field: "code" });
    }

    // Reject malformed replacements before any mutation.
    validate::validate_items_fragment(new_text)?;

    let lines: Vec<&str> = file.text.split('\n').collect();
    let total_lines = lines.len();
    // A trailing newline splits into a phantom empty final segment. It stays
    // addressable, but error messages report the real line count.
    let reported_lines = if file.text.ends_with('\n') {
        total_lines - 1
    } else {
        total_lines
    };

    if start_line == 0 || start_line > total_lines || end_line < start_line || end_line > total_lines
    {
        return Err(PatchError::InvalidRange {
            start_line,
            end_line,
            total_lines: reported_lines,
        });
    }

    let mut out: Vec<&str> = Vec::with_capacity(total_lines);
    out.extend_from_slice(&lines[..start_line - 1]);
    out.push(new_text.trim_end_matches('\n'));
    out.extend_from_slice(&lines[end_line..]);

    Ok((
        Some(out.join("\n")),
        format!("Replaced code block from line {start_line} to {end_line}"),
    ))
}

/// Append a top-level item at end of file, separated by a blank line.
fn append_item(text: &str, item: &str) -> String {
    let mut out = text.to_string();
    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
    if !out.is_empty() {
        out.push('\n');
    }
    out.push_str(item.trim_end());
    out.push('\n');
    out
}
