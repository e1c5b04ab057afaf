use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

const FTL_FILENAME: &str = "druglens-ui.ftl";
const I18N_DIR: &str = "i18n";
const FALLBACK: &str = "en-US";

fn valid_key_char(c: char) -> bool {
    matches!(c, 'a'..='z' | '0'..='9' | '-')
}

/// Message ids (`id = ...`) defined in a Fluent file. Terms (`-id`) and
/// comments are skipped.
fn parse_ftl_keys(content: &str) -> BTreeSet<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#') && !line.starts_with('-'))
        .filter_map(|line| line.split_once('='))
        .map(|(id, _)| id.trim())
        .filter(|id| !id.is_empty() && id.chars().all(valid_key_char))
        .map(str::to_string)
        .collect()
}

fn rust_sources(root: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    let mut stack = vec![root.to_path_buf()];
    while let Some(path) = stack.pop() {
        if path.is_dir() {
            if let Ok(entries) = fs::read_dir(&path) {
                stack.extend(entries.flatten().map(|entry| entry.path()));
            }
        } else if path.extension().and_then(|s| s.to_str()) == Some("rs") {
            files.push(path);
        }
    }
    files
}

/// Literal first arguments of every `t!("...")` call under `src/`.
/// Keys built at runtime or looked up through `fl!` directly are not seen.
fn referenced_keys(src_root: &Path) -> BTreeSet<String> {
    const NEEDLE: &str = "t!(\"";
    let mut found = BTreeSet::new();

    for path in rust_sources(src_root) {
        let Ok(content) = fs::read_to_string(&path) else {
            continue;
        };
        let mut rest = content.as_str();
        while let Some(pos) = rest.find(NEEDLE) {
            rest = &rest[pos + NEEDLE.len()..];
            let Some(end) = rest.find('"') else {
                break;
            };
            let key = &rest[..end];
            if !key.is_empty() && key.chars().all(valid_key_char) {
                found.insert(key.to_string());
            }
            rest = &rest[end..];
        }
    }

    found
}

fn locale_dirs(i18n_root: &Path) -> Vec<String> {
    let mut dirs: Vec<String> = fs::read_dir(i18n_root)
        .map(|entries| {
            entries
                .flatten()
                .filter(|entry| entry.path().is_dir())
                .filter_map(|entry| entry.file_name().to_str().map(str::to_string))
                .filter(|name| name.contains('-'))
                .collect()
        })
        .unwrap_or_default();
    dirs.sort();
    dirs
}

#[test]
fn i18n_completeness() {
    let crate_root = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let i18n_root = crate_root.join(I18N_DIR);

    let fallback_file = i18n_root.join(FALLBACK).join(FTL_FILENAME);
    let fallback_content =
        fs::read_to_string(&fallback_file).expect("Failed to read fallback FTL file");
    let fallback_keys = parse_ftl_keys(&fallback_content);
    assert!(
        !fallback_keys.is_empty(),
        "No message keys parsed from fallback FTL: {fallback_file:?}"
    );

    let referenced = referenced_keys(&crate_root.join("src"));
    let missing_in_fallback: Vec<_> = referenced.difference(&fallback_keys).collect();
    assert!(
        missing_in_fallback.is_empty(),
        "Referenced translation keys missing in {FALLBACK}: {missing_in_fallback:?}"
    );

    let mut per_locale_missing: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for locale in locale_dirs(&i18n_root) {
        let path = i18n_root.join(&locale).join(FTL_FILENAME);
        let content = fs::read_to_string(&path)
            .unwrap_or_else(|_| panic!("Locale {locale} missing expected file {path:?}"));
        let keys = parse_ftl_keys(&content);
        let missing: Vec<String> = fallback_keys.difference(&keys).cloned().collect();
        if !missing.is_empty() {
            per_locale_missing.insert(locale, missing);
        }
    }
    assert!(
        per_locale_missing.is_empty(),
        "Locales with missing translations relative to {FALLBACK}: {per_locale_missing:#?}"
    );

    let unused: Vec<_> = fallback_keys.difference(&referenced).collect();
    if !unused.is_empty() {
        eprintln!("[i18n] NOTE: fallback keys unused in Rust sources: {unused:?}");
    }
}

#[test]
fn scanner_finds_literal_keys_only() {
    let keys = parse_ftl_keys("# comment\n-term = x\nnav-home = Home\nbad key = y\n");
    assert_eq!(keys.into_iter().collect::<Vec<_>>(), vec!["nav-home"]);
}

#[test]
fn fluent_domain_matches_the_ftl_files() {
    let crate_root = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let config =
        fs::read_to_string(crate_root.join("i18n.toml")).expect("Failed to read i18n.toml");
    let domain = config
        .lines()
        .filter_map(|line| line.split_once('='))
        .find(|(key, _)| key.trim() == "domain")
        .map(|(_, value)| value.trim().trim_matches('"').to_string())
        .expect("i18n.toml must name the fluent domain");

    assert_eq!(format!("{domain}.ftl"), FTL_FILENAME);
    assert!(crate_root
        .join(I18N_DIR)
        .join(FALLBACK)
        .join(FTL_FILENAME)
        .is_file());
}
