use i18n_extractor::config::Config;
use i18n_extractor::extractor::{extract_from_glob, extract_from_source};
use i18n_extractor::fs::{BufferedAdapter, FileAdapter, LocaleAdapter};
use i18n_extractor::locale;
use std::path::Path;

const IMPORT: &str = "import { useTranslation, Trans } from '@scope/i18n';\n";

fn extract(source: &str) -> Vec<String> {
    extract_from_source(source, "component.tsx", &Config::default())
}

fn sorted(mut messages: Vec<String>) -> Vec<String> {
    messages.sort();
    messages
}

#[test]
fn pattern_hook_destructured_call() {
    let source = format!("{}const {{ t }} = useTranslation();\nt('Save');", IMPORT);
    assert_eq!(extract(&source), vec!["Save"]);
}

#[test]
fn pattern_instance_member_call() {
    let source = format!("{}i18n.t('Saved');\nother.t('nope');", IMPORT);
    assert_eq!(extract(&source), vec!["Saved"]);
}

#[test]
fn pattern_trans_component() {
    let source = format!(
        "{}const a = <Trans>Hello</Trans>;\nconst b = <Trans message=\"Bye\" />;",
        IMPORT
    );
    assert_eq!(extract(&source), vec!["Hello", "Bye"]);
}

#[test]
fn pattern_block_shadowing() {
    let source = format!(
        "{}const {{ t }} = useTranslation();\nt('a');\n{{\n  const {{ t: t2 }} = useTranslation();\n  t2('b');\n  t('not outer here');\n}}\nt('c');",
        IMPORT
    );
    // Inside the block only `t2` translates; after it `t` is restored
    assert_eq!(sorted(extract(&source)), vec!["a", "b", "c"]);
}

#[test]
fn pattern_import_aliases() {
    let source = r#"
        import { useTranslation as useT, Trans as Translate } from '@scope/i18n';
        const { t } = useT();
        t('hi');
        const el = <Translate>hi2</Translate>;
    "#;
    assert_eq!(extract(source), vec!["hi", "hi2"]);
}

#[test]
fn pattern_strict_mode_gating() {
    let source = r#"
        function t(s) { return s; }
        t('local');
        const el = <Trans>nope</Trans>;
    "#;
    assert!(extract(source).is_empty());
}

#[test]
fn pattern_dynamic_argument_excluded() {
    let source = format!(
        "{}const {{ t }} = useTranslation();\nconst someVariable = 'x';\nt(someVariable);\nt(`a${{someVariable}}`);\nt('literal');",
        IMPORT
    );
    assert_eq!(extract(&source), vec!["literal"]);
}

#[test]
fn pattern_multiple_rebinds_last_wins() {
    let source = format!(
        "{}function C() {{\n  const {{ t: first }} = useTranslation();\n  const {{ t: second }} = useTranslation();\n  first('dropped');\n  second('kept');\n}}",
        IMPORT
    );
    assert_eq!(extract(&source), vec!["kept"]);
}

#[test]
fn pattern_custom_package_and_names() {
    let config = Config::from_json_string(
        r#"{ "extract": { "package": "my-i18n", "hook": "useI18n", "component": "T" } }"#,
    )
    .unwrap();
    let source = r#"
        import { useI18n, T } from 'my-i18n';
        const { t } = useI18n();
        t('one');
        const el = <T>two</T>;
    "#;
    assert_eq!(
        extract_from_source(source, "a.jsx", &config),
        vec!["one", "two"]
    );
}

#[test]
fn glob_extraction_merges_all_files_concurrently() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path();
    std::fs::create_dir_all(root.join("src")).unwrap();
    for i in 0..16 {
        std::fs::write(
            root.join(format!("src/f{}.ts", i)),
            format!(
                "{}const {{ t }} = useTranslation();\nt('key {}');\nt('common');\n",
                IMPORT, i
            ),
        )
        .unwrap();
    }
    let config = Config {
        langs: vec!["en".to_string()],
        output: "locales".to_string(),
        input: vec![format!("{}/src/**/*.ts", root.display())],
        ..Config::default()
    };

    let adapter = FileAdapter::new();
    let result = extract_from_glob(&config, root, Some(&adapter)).unwrap();
    assert_eq!(result.files_scanned, 16);
    assert_eq!(result.files.len(), 16);
    assert_eq!(result.unique_messages().len(), 17);
    assert!(result.errors.is_empty());

    let en = locale::read_locale_file(&config.locale_path(root, "en"));
    assert_eq!(en.len(), 17);
}

#[test]
fn glob_extraction_buffered_writes_once() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path();
    std::fs::create_dir_all(root.join("src")).unwrap();
    std::fs::write(
        root.join("src/a.tsx"),
        format!("{}const x = <Trans>Hi</Trans>;", IMPORT),
    )
    .unwrap();
    let config = Config {
        langs: vec!["en".to_string(), "ja".to_string()],
        output: "locales".to_string(),
        input: vec![format!("{}/src/*.tsx", root.display())],
        ..Config::default()
    };

    let adapter = BufferedAdapter::new(FileAdapter::new());
    extract_from_glob(&config, root, Some(&adapter)).unwrap();
    assert!(!config.locale_path(root, "en").exists());
    assert_eq!(adapter.pending_files(), 2);

    let results = adapter.flush();
    assert_eq!(results.len(), 2);
    assert!(results.iter().all(|r| r.added_keys == vec!["Hi"]));
    assert!(config.locale_path(root, "ja").exists());
}

#[test]
fn merge_subset_reports_no_change() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("en.json");
    std::fs::write(&path, "{\"a\": \"A\", \"b\": \"B\"}").unwrap();

    let adapter = FileAdapter::new();
    let added = adapter
        .merge_into(&path, &["a".to_string(), "b".to_string()])
        .unwrap();
    assert!(added.is_empty());
    assert_eq!(
        std::fs::read_to_string(Path::new(&path)).unwrap(),
        "{\"a\": \"A\", \"b\": \"B\"}"
    );
}
