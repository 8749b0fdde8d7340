use anyhow::{Context, Result};
use std::path::Path;
use swc_common::sync::Lrc;
use swc_common::{SourceMap, SourceMapper, Span};
use swc_ecma_ast::{CallExpr, Expr, Lit};
use swc_ecma_visit::{Visit, VisitWith};

use crate::config::Config;
use crate::extractor::parse_module;
use crate::resolve::callee_ident;

/// A lint issue found in source code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LintIssue {
    pub file_path: String,
    pub line: usize,
    pub column: usize,
    pub message: String,
    pub text: String,
}

/// Result of linting multiple files
#[derive(Debug, Default)]
pub struct LintResult {
    pub issues: Vec<LintIssue>,
    pub files_checked: usize,
}

/// Flags translate calls whose first argument is not a string literal.
///
/// Such calls are silently dropped by the extractor; this makes them visible.
/// Only the plain `function(...)` form is checked, regardless of imports or
/// scope.
pub struct LintVisitor {
    /// Source map for line number lookup
    source_map: Lrc<SourceMap>,
    /// Lint issues found
    pub issues: Vec<LintIssue>,
    /// File path being linted
    file_path: String,
    /// Translate function name
    function: String,
}

impl LintVisitor {
    pub fn new(source_map: Lrc<SourceMap>, file_path: String, function: &str) -> Self {
        Self {
            source_map,
            issues: Vec::new(),
            file_path,
            function: function.to_string(),
        }
    }

    /// Get line and column from span
    fn get_location(&self, span: Span) -> (usize, usize) {
        let loc = self.source_map.lookup_char_pos(span.lo);
        (loc.line, loc.col_display + 1)
    }

    fn has_literal_first_arg(call: &CallExpr) -> bool {
        match call.args.first() {
            Some(arg) if arg.spread.is_none() => matches!(arg.expr.as_ref(), Expr::Lit(Lit::Str(_))),
            _ => false,
        }
    }
}

impl Visit for LintVisitor {
    fn visit_call_expr(&mut self, call: &CallExpr) {
        if callee_ident(&call.callee) == Some(self.function.as_str())
            && !Self::has_literal_first_arg(call)
        {
            let (line, column) = self.get_location(call.span);
            let text = self
                .source_map
                .span_to_snippet(call.span)
                .unwrap_or_default();
            self.issues.push(LintIssue {
                file_path: self.file_path.clone(),
                line,
                column,
                message: format!(
                    "The first argument of function `{}` must be a literal string",
                    self.function
                ),
                text,
            });
        }

        call.visit_children_with(self);
    }
}

/// Lint source code string
pub fn lint_source<P: AsRef<Path>>(source: &str, path: P, config: &Config) -> Vec<LintIssue> {
    let path = path.as_ref();
    let Some((module, cm)) = parse_module(source, path) else {
        return Vec::new();
    };

    let mut visitor = LintVisitor::new(cm, path.display().to_string(), &config.extract.function);
    module.visit_with(&mut visitor);
    visitor.issues
}

/// Lint a single file
pub fn lint_file<P: AsRef<Path>>(path: P, config: &Config) -> Result<Vec<LintIssue>> {
    let path = path.as_ref();
    let source_code = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;

    Ok(lint_source(&source_code, path, config))
}

/// Lint every non-excluded file matched by `config.input`
pub fn lint_from_glob(config: &Config) -> Result<LintResult> {
    let mut result = LintResult::default();

    for pattern in &config.input {
        let matches =
            glob::glob(pattern).with_context(|| format!("Invalid glob pattern: {}", pattern))?;

        for entry in matches {
            match entry {
                Ok(path) if path.is_file() && !config.is_excluded(&path) => {
                    result.files_checked += 1;
                    match lint_file(&path, config) {
                        Ok(issues) => result.issues.extend(issues),
                        Err(e) => log::warn!("{:#}", e),
                    }
                }
                Ok(_) => {}
                Err(e) => log::warn!("Glob error: {}", e),
            }
        }
    }

    Ok(result)
}
