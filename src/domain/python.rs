//! Static extraction of Python import statements
//!
//! Recognises the two import forms of the Python grammar:
//!
//! ```text
//! import_stmt     ::=  "import" module ["as" identifier] ("," module ["as" identifier])*
//!                   |  "from" relative_module "import" identifier ["as" identifier]
//!                      ("," identifier ["as" identifier])*
//!                   |  "from" relative_module "import" "(" identifier ["as" identifier]
//!                      ("," identifier ["as" identifier])* [","] ")"
//!                   |  "from" relative_module "import" "*"
//! module          ::=  (identifier ".")* identifier
//! relative_module ::=  "."* module | "."+
//! ```
//!
//! Source is never executed. Comments and string literals are blanked out
//! before statements are matched, so imports mentioned in docstrings are ignored.

use std::sync::LazyLock;

use regex::Regex;

use crate::domain::stdlib::is_stdlib_module;
use crate::domain::FileImports;

static IMPORT_STMT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^import\s+(.+)$").expect("valid import regex"));

static FROM_STMT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^from\b\s*((?:\.\s*)*)([^\W\d]\w*(?:\s*\.\s*[^\W\d]\w*)*)?\s*import\b(.*)$")
        .expect("valid from-import regex")
});

static ALIASED_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([^\W\d]\w*(?:\s*\.\s*[^\W\d]\w*)*)(?:\s+as\s+([^\W\d]\w*))?$")
        .expect("valid alias regex")
});

static COMPOUND_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:async\s+)?(?:if|elif|else|while|for|try|except|finally|with|def|class|match|case)\b",
    )
    .expect("valid compound header regex")
});

/// A name in an import statement, with its optional `as` alias.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportedName {
    pub name: String,
    pub alias: Option<String>,
}

/// A parsed import statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportStmt {
    /// `import a.b as c, d`
    Import(Vec<ImportedName>),
    /// `from .a import x as y` (module keeps its leading dots)
    From {
        module: String,
        names: Vec<ImportedName>,
    },
}

/// Extract all import statements from Python source, in source order.
pub fn parse_imports(source: &str) -> Vec<ImportStmt> {
    logical_statements(source)
        .iter()
        .filter_map(|stmt| parse_statement(strip_compound_headers(stmt)))
        .collect()
}

/// Collect dependencies from parsed statements.
///
/// With `include_stdlib == false`, library dependencies that belong to the
/// standard library are dropped. Specific submodules are always kept.
pub fn collect_imports(statements: &[ImportStmt], include_stdlib: bool) -> FileImports {
    let mut imports = FileImports::default();
    let add_library = |name: &str, imports: &mut FileImports| {
        if include_stdlib || !is_stdlib_module(name) {
            imports.library_dependencies.insert(name.to_string());
        }
    };

    for stmt in statements {
        match stmt {
            ImportStmt::Import(names) => {
                for n in names {
                    add_library(&n.name, &mut imports);
                }
            }
            ImportStmt::From { module, names } => {
                if names.is_empty() {
                    continue;
                }
                add_library(module, &mut imports);
                for n in names {
                    imports
                        .specific_submodules_imported
                        .insert(qualify(module, &n.name));
                }
            }
        }
    }
    imports
}

/// `module.name`, or `..name` when the module is only dots.
fn qualify(module: &str, name: &str) -> String {
    if module.ends_with('.') {
        format!("{module}{name}")
    } else {
        format!("{module}.{name}")
    }
}

/// Drop leading block headers so `try: import yaml` yields `import yaml`.
fn strip_compound_headers(mut stmt: &str) -> &str {
    while COMPOUND_HEADER.is_match(stmt) {
        match header_end(stmt) {
            Some(end) => stmt = stmt[end..].trim_start(),
            None => break,
        }
    }
    stmt
}

/// Byte index just past the header's `:` (outside brackets, not `:=`).
fn header_end(stmt: &str) -> Option<usize> {
    let bytes = stmt.as_bytes();
    let mut depth: usize = 0;
    for (i, c) in stmt.char_indices() {
        match c {
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => depth = depth.saturating_sub(1),
            ':' if depth == 0 && bytes.get(i + 1) != Some(&b'=') => return Some(i + 1),
            _ => {}
        }
    }
    None
}

fn parse_statement(stmt: &str) -> Option<ImportStmt> {
    if let Some(caps) = IMPORT_STMT.captures(stmt) {
        let names = split_names(&caps[1])?;
        if names.iter().any(|n| n.name == "*") {
            return None;
        }
        return Some(ImportStmt::Import(names));
    }

    let caps = FROM_STMT.captures(stmt)?;
    let dots: String = caps[1].chars().filter(|c| *c == '.').collect();
    let module = caps.get(2).map(|m| normalize_dotted(m.as_str()));
    let module = match (dots.is_empty(), module) {
        (true, None) => return None,
        (_, Some(m)) => format!("{dots}{m}"),
        (false, None) => dots,
    };

    let rest = caps[3].trim();
    let rest = match rest.strip_prefix('(') {
        Some(inner) => inner.strip_suffix(')')?,
        None => rest,
    };
    if rest.trim() == "*" {
        return Some(ImportStmt::From {
            module,
            names: vec![ImportedName {
                name: "*".into(),
                alias: None,
            }],
        });
    }
    let names = split_names(rest)?;
    if names.iter().any(|n| n.name.contains('.')) {
        return None;
    }
    Some(ImportStmt::From { module, names })
}

/// Split `a as b, c.d` into names. A trailing comma is allowed.
fn split_names(list: &str) -> Option<Vec<ImportedName>> {
    let parts: Vec<&str> = list.split(',').map(str::trim).collect();
    let mut names = Vec::new();
    for (i, part) in parts.iter().enumerate() {
        if part.is_empty() {
            // Only a single trailing comma is legal
            if i == parts.len() - 1 && i > 0 {
                continue;
            }
            return None;
        }
        if *part == "*" {
            names.push(ImportedName {
                name: "*".into(),
                alias: None,
            });
            continue;
        }
        let caps = ALIASED_NAME.captures(part)?;
        names.push(ImportedName {
            name: normalize_dotted(&caps[1]),
            alias: caps.get(2).map(|a| a.as_str().to_string()),
        });
    }
    (!names.is_empty()).then_some(names)
}

fn normalize_dotted(s: &str) -> String {
    s.split('.').map(str::trim).collect::<Vec<_>>().join(".")
}

/// Split source into logical statements.
///
/// Joins bracketed and backslash continuations, splits on `;`, strips
/// comments and replaces string literals with an empty `""`.
/// Unterminated strings run to the end of their line (or file, if triple-quoted).
fn logical_statements(source: &str) -> Vec<String> {
    let chars: Vec<char> = source.chars().collect();
    let mut statements = Vec::new();
    let mut current = String::new();
    let mut depth: usize = 0;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            '#' => {
                while i < chars.len() && chars[i] != '\n' {
                    i += 1;
                }
                continue;
            }
            '\'' | '"' => {
                i = skip_string(&chars, i);
                current.push_str("\"\"");
                continue;
            }
            '\\' if chars.get(i + 1) == Some(&'\n') => {
                current.push(' ');
                i += 2;
                continue;
            }
            '\\' if chars.get(i + 1) == Some(&'\r') && chars.get(i + 2) == Some(&'\n') => {
                current.push(' ');
                i += 3;
                continue;
            }
            '(' | '[' | '{' => {
                depth += 1;
                current.push(c);
            }
            ')' | ']' | '}' => {
                depth = depth.saturating_sub(1);
                current.push(c);
            }
            '\n' if depth > 0 => current.push(' '),
            '\n' => flush(&mut current, &mut statements),
            ';' if depth == 0 => flush(&mut current, &mut statements),
            '\r' | '\t' => current.push(' '),
            _ => current.push(c),
        }
        i += 1;
    }
    flush(&mut current, &mut statements);
    statements
}

fn flush(current: &mut String, statements: &mut Vec<String>) {
    let stmt = current.trim();
    if !stmt.is_empty() {
        statements.push(stmt.to_string());
    }
    current.clear();
}

/// Return the index just past the string literal starting at `start`.
fn skip_string(chars: &[char], start: usize) -> usize {
    let quote = chars[start];
    let triple = chars.get(start + 1) == Some(&quote) && chars.get(start + 2) == Some(&quote);
    let mut i = if triple { start + 3 } else { start + 1 };

    while i < chars.len() {
        match chars[i] {
            '\\' => i += 2,
            '\n' if !triple => return i,
            c if c == quote => {
                if !triple {
                    return i + 1;
                }
                if chars.get(i + 1) == Some(&quote) && chars.get(i + 2) == Some(&quote) {
                    return i + 3;
                }
                i += 1;
            }
            _ => i += 1,
        }
    }
    chars.len()
}
