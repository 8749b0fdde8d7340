use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use swc_common::sync::Lrc;
use swc_common::{FileName, SourceMap, Spanned};
use swc_ecma_ast::{
    BlockStmt, CallExpr, ImportDecl, JSXElement, Module, ModuleDecl, ModuleItem, Pat,
    VarDeclarator,
};
use swc_ecma_parser::{lexer::Lexer, EsSyntax, Parser, StringInput, Syntax, TsSyntax};
use swc_ecma_visit::{Visit, VisitWith};

use crate::config::Config;
use crate::fs::LocaleAdapter;
use crate::locale::{self, SyncResult};
use crate::resolve::{
    callee_ident, is_call_to, is_component, is_import_from, is_member_call, jsx_attr_value,
    pattern_binding, resolve_literal,
};
use crate::scope::FileExtractionState;

/// Messages found in one source file, in discovery order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileMessages {
    pub file_path: String,
    pub messages: Vec<String>,
}

/// Error encountered during extraction
#[derive(Debug, Clone)]
pub struct ExtractionError {
    pub file_path: String,
    pub message: String,
}

/// Result of extraction from multiple files
#[derive(Debug, Default)]
pub struct ExtractionResult {
    /// Files that yielded at least one message
    pub files: Vec<FileMessages>,
    /// Files matched by the input globs, including empty and excluded ones
    pub files_scanned: usize,
    pub errors: Vec<ExtractionError>,
    /// Locale sync outcomes, one per (file, language) when syncing per file
    pub sync_results: Vec<SyncResult>,
}

impl ExtractionResult {
    pub fn unique_messages(&self) -> Vec<String> {
        let mut seen = indexmap::IndexSet::new();
        for file in &self.files {
            seen.extend(file.messages.iter().cloned());
        }
        seen.into_iter().collect()
    }
}

/// Visitor that walks one module and collects statically known messages.
///
/// The visitor owns the file's [`FileExtractionState`]; a fresh visitor is
/// built for every file so nothing leaks between files.
pub struct MessageVisitor {
    strict: bool,
    state: FileExtractionState,
}

impl MessageVisitor {
    pub fn new(config: &Config) -> Self {
        Self {
            strict: config.strict,
            state: FileExtractionState::new(&config.extract),
        }
    }

    pub fn state(&self) -> &FileExtractionState {
        &self.state
    }

    pub fn into_state(self) -> FileExtractionState {
        self.state
    }

    /// t('hello') with the binding active in this scope, or i18n.t('hello')
    fn is_translation_call(&self, call: &CallExpr) -> bool {
        callee_ident(&call.callee) == Some(self.state.scope.active())
            || is_member_call(
                call,
                self.state.targets.instance(),
                self.state.targets.function(),
            )
    }
}

impl Visit for MessageVisitor {
    /// Strict mode: a file that never imports the target package is skipped
    fn visit_module(&mut self, module: &Module) {
        if self.strict {
            let package = self.state.targets.package();
            let imports_package = module.body.iter().any(|item| match item {
                ModuleItem::ModuleDecl(ModuleDecl::Import(decl)) => is_import_from(decl, package),
                _ => false,
            });
            if !imports_package {
                self.state.should_skip = true;
            }
        }

        module.visit_children_with(self);
    }

    /// import { useTranslation as useT, Trans as Translate } from '@scope/i18n'
    fn visit_import_decl(&mut self, decl: &ImportDecl) {
        if !self.state.should_skip && self.strict {
            self.state.targets.rebind_from_import(decl);
        }

        decl.visit_children_with(self);
    }

    /// {
    ///   const { t: t1 } = useTranslation();
    /// }
    fn visit_block_stmt(&mut self, block: &BlockStmt) {
        self.state.scope.enter_block();
        block.visit_children_with(self);
        self.state.scope.exit_block();
    }

    /// const { t } = useTranslation()
    /// const { t: translate } = useTranslation()
    fn visit_var_declarator(&mut self, decl: &VarDeclarator) {
        if !self.state.should_skip {
            if let (Some(init), Pat::Object(pattern)) = (&decl.init, &decl.name) {
                if is_call_to(init, self.state.targets.hook()) {
                    if let Some(name) =
                        pattern_binding(&pattern.props, self.state.targets.function())
                    {
                        self.state.scope.rebind(name);
                    }
                }
            }
        }

        decl.visit_children_with(self);
    }

    /// t('hello'), aliasT('hello'), i18n.t('hello')
    fn visit_call_expr(&mut self, call: &CallExpr) {
        if !self.state.should_skip && self.is_translation_call(call) {
            // Dynamic first arguments are dropped without a warning
            if let Some(message) = call
                .args
                .first()
                .filter(|arg| arg.spread.is_none())
                .and_then(|arg| resolve_literal(arg.expr.as_ref()))
            {
                self.state.collect(message);
            }
        }

        call.visit_children_with(self);
    }

    /// <Trans>hello</Trans>
    /// <Trans>{'hello'}</Trans>
    /// <Trans message="hello" />
    /// <Trans message={'hello'} />
    fn visit_jsx_element(&mut self, elem: &JSXElement) {
        if !self.state.should_skip && is_component(elem, self.state.targets.component()) {
            let message = resolve_literal(elem.children.as_slice())
                .or_else(|| jsx_attr_value(elem, "message").and_then(resolve_literal));
            if let Some(message) = message {
                self.state.collect(message);
            }
        }

        elem.visit_children_with(self);
    }
}

fn syntax_for(path: &Path) -> Syntax {
    let ext = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default();

    match ext {
        "ts" | "mts" | "cts" => Syntax::Typescript(TsSyntax {
            decorators: true,
            ..Default::default()
        }),
        "tsx" => Syntax::Typescript(TsSyntax {
            tsx: true,
            decorators: true,
            ..Default::default()
        }),
        _ => Syntax::Es(EsSyntax {
            jsx: true,
            decorators: true,
            ..Default::default()
        }),
    }
}

/// Parse a source string into a module. Parse errors are logged with their
/// location and reported as `None`.
pub fn parse_module(source: &str, path: &Path) -> Option<(Module, Lrc<SourceMap>)> {
    let cm: Lrc<SourceMap> = Default::default();
    let fm = cm.new_source_file(
        FileName::Real(path.to_path_buf()).into(),
        source.to_string(),
    );

    let lexer = Lexer::new(
        syntax_for(path),
        Default::default(),
        StringInput::from(&*fm),
        None,
    );
    let mut parser = Parser::new_from(lexer);

    match parser.parse_module() {
        Ok(module) => Some((module, cm)),
        Err(e) => {
            let loc = cm.lookup_char_pos(e.span().lo);
            log::warn!(
                "Parse error in {}:{}:{}: {:?}",
                path.display(),
                loc.line,
                loc.col_display + 1,
                e.kind()
            );
            None
        }
    }
}

/// Extract messages from an already parsed module
pub fn extract_from_module(module: &Module, config: &Config) -> Vec<String> {
    let mut visitor = MessageVisitor::new(config);
    module.visit_with(&mut visitor);
    visitor.into_state().into_messages()
}

/// Extract messages from a source string.
///
/// Excluded paths and unparsable sources yield no messages.
pub fn extract_from_source<P: AsRef<Path>>(
    source: &str,
    path: P,
    config: &Config,
) -> Vec<String> {
    let path = path.as_ref();
    if config.is_excluded(path) {
        log::debug!("Skipping excluded file: {}", path.display());
        return Vec::new();
    }

    match parse_module(source, path) {
        Some((module, _)) => extract_from_module(&module, config),
        None => Vec::new(),
    }
}

/// Extract messages from a file on disk
pub fn extract_from_file<P: AsRef<Path>>(path: P, config: &Config) -> Result<Vec<String>> {
    let path = path.as_ref();
    // Excluded files are never read
    if config.is_excluded(path) {
        log::debug!("Skipping excluded file: {}", path.display());
        return Ok(Vec::new());
    }

    let source_code = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;

    Ok(extract_from_source(&source_code, path, config))
}

/// Enum to represent either a valid path or an error during glob iteration
enum GlobItem {
    Path(PathBuf),
    GlobError { pattern: String, message: String },
    PatternError { pattern: String, message: String },
}

/// Resolve the configured input globs to candidate source files
fn input_files(patterns: &[String]) -> Vec<GlobItem> {
    patterns
        .iter()
        .flat_map(|pattern| match glob::glob(pattern) {
            Ok(paths) => paths
                .filter_map(|entry| match entry {
                    Ok(path) if path.is_file() => Some(GlobItem::Path(path)),
                    // Skip directories
                    Ok(_) => None,
                    Err(e) => Some(GlobItem::GlobError {
                        pattern: pattern.clone(),
                        message: e.to_string(),
                    }),
                })
                .collect::<Vec<_>>(),
            Err(e) => vec![GlobItem::PatternError {
                pattern: pattern.clone(),
                message: e.to_string(),
            }],
        })
        .collect()
}

/// Result type for a single file (used internally for lock-free processing)
enum FileOutcome {
    Messages {
        file: FileMessages,
        sync: Vec<SyncResult>,
    },
    Empty,
    Error(ExtractionError),
}

/// Extract messages from every file matched by `config.input`.
///
/// Files are processed in parallel, each with its own extraction state. When
/// an adapter is given, every file with messages is merged into each
/// language's resource right after it is traversed; the adapter serializes
/// concurrent merges into the same resource.
pub fn extract_from_glob(
    config: &Config,
    base_dir: &Path,
    adapter: Option<&dyn LocaleAdapter>,
) -> Result<ExtractionResult> {
    use rayon::prelude::*;

    let items = input_files(&config.input);
    let files_scanned = items
        .iter()
        .filter(|item| matches!(item, GlobItem::Path(_)))
        .count();

    let outcomes: Vec<FileOutcome> = items
        .into_par_iter()
        .map(|item| match item {
            GlobItem::Path(path) => match extract_from_file(&path, config) {
                Ok(messages) if messages.is_empty() => FileOutcome::Empty,
                Ok(messages) => {
                    let sync = match adapter {
                        Some(adapter) => {
                            locale::sync_messages(config, base_dir, &messages, adapter)
                        }
                        None => Vec::new(),
                    };
                    FileOutcome::Messages {
                        file: FileMessages {
                            file_path: path.display().to_string(),
                            messages,
                        },
                        sync,
                    }
                }
                Err(e) => FileOutcome::Error(ExtractionError {
                    file_path: path.display().to_string(),
                    message: format!("{:#}", e),
                }),
            },
            GlobItem::GlobError { pattern, message } => FileOutcome::Error(ExtractionError {
                file_path: pattern,
                message: format!("Glob error: {}", message),
            }),
            GlobItem::PatternError { pattern, message } => {
                FileOutcome::Error(ExtractionError {
                    file_path: pattern,
                    message: format!("Invalid glob pattern: {}", message),
                })
            }
        })
        .collect();

    // Aggregate results (single-threaded, no lock contention)
    let mut result = ExtractionResult {
        files_scanned,
        ..Default::default()
    };
    for outcome in outcomes {
        match outcome {
            FileOutcome::Messages { file, sync } => {
                result.files.push(file);
                result.sync_results.extend(sync);
            }
            FileOutcome::Empty => {}
            FileOutcome::Error(error) => result.errors.push(error),
        }
    }

    // Sort by path for deterministic output
    result.files.sort_by(|a, b| a.file_path.cmp(&b.file_path));

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const IMPORT: &str = "import { useTranslation, Trans } from '@scope/i18n';\n";

    fn extract(source: &str) -> Vec<String> {
        extract_from_source(source, "test.tsx", &Config::default())
    }

    fn non_strict() -> Config {
        Config {
            strict: false,
            ..Config::default()
        }
    }

    #[test]
    fn test_simple_call() {
        let source = format!("{}const {{ t }} = useTranslation();\nt('hello');", IMPORT);
        assert_eq!(extract(&source), vec!["hello"]);
    }

    #[test]
    fn test_member_call() {
        let source = format!("{}i18n.t('from instance');", IMPORT);
        assert_eq!(extract(&source), vec!["from instance"]);
    }

    #[test]
    fn test_member_call_other_object_ignored() {
        let source = format!("{}other.t('nope');\ni18n.translate('nope');", IMPORT);
        assert!(extract(&source).is_empty());
    }

    #[test]
    fn test_default_binding_without_hook() {
        // The configured function name is active until something rebinds it
        let source = format!("{}t('direct');", IMPORT);
        assert_eq!(extract(&source), vec!["direct"]);
    }

    #[test]
    fn test_renamed_destructuring() {
        let source = format!(
            "{}function A() {{\n  const {{ t: translate }} = useTranslation();\n  translate('renamed');\n  t('stale');\n}}",
            IMPORT
        );
        assert_eq!(extract(&source), vec!["renamed"]);
    }

    #[test]
    fn test_parenthesized_message_and_hook() {
        let source = format!(
            "{}const {{ t: tr }} = (useTranslation());\ntr(('x'));\nt('stale');",
            IMPORT
        );
        assert_eq!(extract(&source), vec!["x"]);
    }

    #[test]
    fn test_block_shadowing() {
        let source = format!(
            r#"{}
const {{ t }} = useTranslation();
t('a');
{{
  const {{ t: t2 }} = useTranslation();
  t2('b');
  t('not collected');
}}
t('c');
t2('not collected either');
"#,
            IMPORT
        );
        assert_eq!(extract(&source), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_function_bodies_are_scopes() {
        let source = format!(
            r#"{}
function First() {{
  const {{ t: first }} = useTranslation();
  return first('one');
}}
const Second = () => {{
  const {{ t: second }} = useTranslation();
  first('leaked');
  return second('two');
}};
"#,
            IMPORT
        );
        assert_eq!(extract(&source), vec!["one", "two"]);
    }

    #[test]
    fn test_last_rebind_in_block_wins() {
        let source = format!(
            r#"{}
function A() {{
  const {{ t: one }} = useTranslation();
  const {{ t: two }} = useTranslation();
  one('dropped');
  two('kept');
}}
"#,
            IMPORT
        );
        assert_eq!(extract(&source), vec!["kept"]);
    }

    #[test]
    fn test_unrelated_destructuring_ignored() {
        let source = format!(
            "{}const {{ t: other }} = somethingElse();\nother('x');\nt('y');",
            IMPORT
        );
        assert_eq!(extract(&source), vec!["y"]);
    }

    #[test]
    fn test_nested_destructuring_not_resolved() {
        let source = format!(
            "{}const {{ t: {{ inner }} }} = useTranslation();\ninner('x');\nt('y');",
            IMPORT
        );
        assert_eq!(extract(&source), vec!["y"]);
    }

    #[test]
    fn test_import_alias() {
        let source = r#"
import { useTranslation as useT, Trans as Translate } from '@scope/i18n';
function A() {
  const { t } = useT();
  return <div>{t('hi')}<Translate>hi2</Translate><Trans>ignored</Trans></div>;
}
"#;
        assert_eq!(extract(source), vec!["hi", "hi2"]);
    }

    #[test]
    fn test_alias_hook_original_name_no_longer_matches() {
        let source = r#"
import { useTranslation as useT } from '@scope/i18n';
function A() {
  const { t: x } = useTranslation();
  x('nope');
}
"#;
        assert!(extract(source).is_empty());
    }

    #[test]
    fn test_strict_mode_requires_import() {
        let source = r#"
function t(value) { return value; }
t('literal');
i18n.t('member');
<Trans>child</Trans>;
"#;
        assert!(extract(source).is_empty());
    }

    #[test]
    fn test_strict_mode_other_package_does_not_count() {
        let source = "import { useTranslation } from 'react-i18next';\nt('x');";
        assert!(extract(source).is_empty());
    }

    #[test]
    fn test_non_strict_mode_uses_defaults() {
        let source = "t('literal');\n<Trans>child</Trans>;";
        assert_eq!(
            extract_from_source(source, "a.jsx", &non_strict()),
            vec!["literal", "child"]
        );
    }

    #[test]
    fn test_non_strict_mode_ignores_aliases() {
        let source = r#"
import { Trans as Translate } from '@scope/i18n';
<Translate>aliased</Translate>;
<Trans>default</Trans>;
"#;
        assert_eq!(
            extract_from_source(source, "a.tsx", &non_strict()),
            vec!["default"]
        );
    }

    #[test]
    fn test_dynamic_arguments_dropped() {
        let source = format!(
            "{}const key = 'x';\nt(key);\nt(`a ${{key}}`);\nt(obj.key);\nt();\nt('literal');",
            IMPORT
        );
        assert_eq!(extract(&source), vec!["literal"]);
    }

    #[test]
    fn test_template_literal_without_expressions() {
        let source = format!("{}t(`static`);", IMPORT);
        assert_eq!(extract(&source), vec!["static"]);
    }

    #[test]
    fn test_duplicates_collapsed_in_order() {
        let source = format!("{}t('b');\nt('a');\nt('b');\ni18n.t('a');", IMPORT);
        assert_eq!(extract(&source), vec!["b", "a"]);
    }

    #[test]
    fn test_nested_calls_visited() {
        let source = format!("{}wrap(t('inner'), i18n.t('member'));", IMPORT);
        assert_eq!(extract(&source), vec!["inner", "member"]);
    }

    #[test]
    fn test_trans_children_and_message_attr() {
        let source = format!(
            r#"{}
const a = <Trans>hello</Trans>;
const b = <Trans>{{'expr'}}</Trans>;
const c = <Trans message="attr" />;
const d = <Trans message={{'attr expr'}} />;
const e = <Trans message="fallback">{{name}}</Trans>;
const f = <Trans message={{name}} />;
"#,
            IMPORT
        );
        assert_eq!(
            extract(&source),
            vec!["hello", "expr", "attr", "attr expr", "fallback"]
        );
    }

    #[test]
    fn test_trans_children_preferred_over_message() {
        let source = format!("{}<Trans message=\"attr\">child</Trans>;", IMPORT);
        assert_eq!(extract(&source), vec!["child"]);
    }

    #[test]
    fn test_trans_multiline_children() {
        let source = format!(
            "{}const a = (\n  <Trans>\n    Hello\n    world\n  </Trans>\n);",
            IMPORT
        );
        assert_eq!(extract(&source), vec!["Hello world"]);
    }

    #[test]
    fn test_nested_trans_elements_visited() {
        let source = format!("{}<div><p><Trans>deep</Trans></p></div>;", IMPORT);
        assert_eq!(extract(&source), vec!["deep"]);
    }

    #[test]
    fn test_excluded_path_yields_nothing() {
        let source = format!("{}t('vendored');", IMPORT);
        let messages = extract_from_source(
            &source,
            "/app/node_modules/lib/index.js",
            &Config::default(),
        );
        assert!(messages.is_empty());
    }

    #[test]
    fn test_parse_error_yields_nothing() {
        let source = format!("{}t('a'", IMPORT);
        assert!(extract(&source).is_empty());
    }

    #[test]
    fn test_custom_targets() {
        let config = Config::from_json_string(
            r#"{ "extract": { "package": "my-i18n", "instance": "tr", "hook": "useLocale", "function": "translate", "component": "Msg" } }"#,
        )
        .unwrap();
        let source = r#"
import { useLocale } from 'my-i18n';
const { translate: tx } = useLocale();
tx('hook');
tr.translate('member');
<Msg>component</Msg>;
t('default name ignored');
"#;
        assert_eq!(
            extract_from_source(source, "a.tsx", &config),
            vec!["hook", "member", "component"]
        );
    }

    #[test]
    fn test_plain_js_with_jsx() {
        let source = format!("{}export const A = () => <Trans>js file</Trans>;", IMPORT);
        assert_eq!(
            extract_from_source(&source, "a.js", &Config::default()),
            vec!["js file"]
        );
    }

    #[test]
    fn test_typescript_generics() {
        let source = format!(
            "{}const {{ t }} = useTranslation<Locale>();\nconst x: string = t('typed');",
            "import { useTranslation } from '@scope/i18n';\n"
        );
        assert_eq!(
            extract_from_source(&source, "a.ts", &Config::default()),
            vec!["typed"]
        );
    }

    #[test]
    fn test_visitor_state_is_per_file() {
        let config = Config::default();
        let first = format!(
            "{}{{ const {{ t: other }} = useTranslation(); }}\nt('one');",
            IMPORT
        );
        let second = format!("{}t('two');", IMPORT);
        assert_eq!(extract_from_source(&first, "a.ts", &config), vec!["one"]);
        assert_eq!(extract_from_source(&second, "b.ts", &config), vec!["two"]);
    }
}
