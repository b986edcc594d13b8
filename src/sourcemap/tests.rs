use super::*;
use serde_json::{json, Value};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Lay out `app/` sources and a `dist/main.js.map` referencing them
fn project(map: Value, sources: &[(&str, &str)]) -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join("dist")).unwrap();
    for (path, text) in sources {
        let full = dir.path().join(path);
        fs::create_dir_all(full.parent().unwrap()).unwrap();
        fs::write(full, text).unwrap();
    }
    fs::write(
        dir.path().join("dist/main.js.map"),
        serde_json::to_vec(&map).unwrap(),
    )
    .unwrap();
    dir
}

fn read_json(path: &Path) -> Value {
    serde_json::from_slice(&fs::read(path).unwrap()).unwrap()
}

#[test]
fn test_sanitize_inlines_and_relativizes_sources() {
    let dir = project(
        json!({ "version": 3, "sources": ["../app/foo.js"], "mappings": "AAAA" }),
        &[("app/foo.js", "export const foo = 1;\n")],
    );
    let map_path = dir.path().join("dist/main.js.map");

    let outcome = sanitize(&map_path, &SanitizeOptions::new(dir.path().join("app"))).unwrap();

    assert_eq!(outcome.sources, vec!["foo.js".to_string()]);
    assert!(!outcome.skipped);

    let written = read_json(&map_path);
    assert_eq!(written["sources"], json!(["foo.js"]));
    assert_eq!(written["sourcesContent"], json!(["export const foo = 1;\n"]));
    assert_eq!(written["sourceRoot"], json!("/"));
    assert_eq!(written["file"], json!("main.js"));
    assert_eq!(written["mappings"], json!("AAAA"));
    assert_eq!(written["version"], json!(3));
}

#[test]
fn test_sources_content_is_parallel_to_sources() {
    let dir = project(
        json!({
            "version": 3,
            "sources": ["../app/b.js", "../app/lib/a.js", "../jspm_packages/dep.js"],
            "mappings": ""
        }),
        &[
            ("app/b.js", "b"),
            ("app/lib/a.js", "a"),
            ("jspm_packages/dep.js", "dep"),
        ],
    );
    let map_path = dir.path().join("dist/main.js.map");

    sanitize(&map_path, &SanitizeOptions::new(dir.path().join("app"))).unwrap();

    let written: SourceMap = serde_json::from_slice(&fs::read(&map_path).unwrap()).unwrap();
    let contents = written.sources_content.unwrap();
    assert_eq!(written.sources.len(), contents.len());
    assert_eq!(
        written.sources,
        vec!["b.js", "lib/a.js", "../jspm_packages/dep.js"]
    );
    assert_eq!(
        contents,
        vec![Some("b".to_string()), Some("a".to_string()), Some("dep".to_string())]
    );
}

#[test]
fn test_explicit_source_root_and_file() {
    let dir = project(
        json!({ "sources": ["../app/main.less"] }),
        &[("app/main.less", "@c: red;")],
    );
    let map_path = dir.path().join("dist/main.js.map");
    let options = SanitizeOptions::new(dir.path().join("app"))
        .source_root("/sources/")
        .file("bundle.js");

    sanitize(&map_path, &options).unwrap();

    let written = read_json(&map_path);
    assert_eq!(written["sourceRoot"], json!("/sources/"));
    assert_eq!(written["file"], json!("bundle.js"));
}

#[test]
fn test_empty_source_root_falls_back_to_slash() {
    let options = SanitizeOptions::new("app").source_root("");
    assert_eq!(options.effective_source_root(), "/");
}

#[test]
fn test_output_is_compact_json() {
    let dir = project(json!({ "sources": ["../app/x.js"] }), &[("app/x.js", "x")]);
    let map_path = dir.path().join("dist/main.js.map");

    sanitize(&map_path, &SanitizeOptions::new(dir.path().join("app"))).unwrap();

    let text = fs::read_to_string(&map_path).unwrap();
    assert!(!text.contains('\n'));
    assert!(!text.contains(": "));
}

#[test]
fn test_unknown_fields_are_preserved() {
    let dir = project(
        json!({
            "sources": ["../app/x.js"],
            "names": ["x"],
            "x_google_ignoreList": [0]
        }),
        &[("app/x.js", "x")],
    );
    let map_path = dir.path().join("dist/main.js.map");

    sanitize(&map_path, &SanitizeOptions::new(dir.path().join("app"))).unwrap();

    let written = read_json(&map_path);
    assert_eq!(written["x_google_ignoreList"], json!([0]));
    assert_eq!(written["names"], json!(["x"]));
}

#[test]
fn test_missing_source_fails_without_touching_map() {
    let dir = project(
        json!({ "sources": ["../app/present.js", "../app/missing.js"] }),
        &[("app/present.js", "here")],
    );
    let map_path = dir.path().join("dist/main.js.map");
    let before = fs::read(&map_path).unwrap();

    let err = sanitize(&map_path, &SanitizeOptions::new(dir.path().join("app"))).unwrap_err();

    assert!(matches!(err, SourceMapError::Read { .. }));
    assert!(err.path().ends_with("app/missing.js"));
    assert_eq!(fs::read(&map_path).unwrap(), before);
}

#[test]
fn test_malformed_map_is_parse_error() {
    let dir = TempDir::new().unwrap();
    let map_path = dir.path().join("broken.js.map");
    fs::write(&map_path, b"{ \"sources\": [").unwrap();

    let err = sanitize(&map_path, &SanitizeOptions::new(dir.path())).unwrap_err();

    assert!(matches!(err, SourceMapError::Parse { .. }));
    assert_eq!(fs::read(&map_path).unwrap(), b"{ \"sources\": [");
}

#[test]
fn test_map_without_sources_is_parse_error() {
    let dir = TempDir::new().unwrap();
    let map_path = dir.path().join("index.js.map");
    fs::write(&map_path, br#"{"version":3,"sections":[]}"#).unwrap();

    let err = sanitize(&map_path, &SanitizeOptions::new(dir.path())).unwrap_err();
    assert!(matches!(err, SourceMapError::Parse { .. }));
}

#[test]
fn test_missing_map_is_read_error() {
    let dir = TempDir::new().unwrap();
    let err = sanitize(
        &dir.path().join("nope.js.map"),
        &SanitizeOptions::new(dir.path()),
    )
    .unwrap_err();
    assert!(matches!(err, SourceMapError::Read { .. }));
}

#[test]
fn test_digest_matches_written_bytes() {
    let dir = project(json!({ "sources": ["../app/x.js"] }), &[("app/x.js", "x")]);
    let map_path = dir.path().join("dist/main.js.map");

    let outcome = sanitize(&map_path, &SanitizeOptions::new(dir.path().join("app"))).unwrap();

    assert_eq!(outcome.digest, digest(&fs::read(&map_path).unwrap()));
    assert_eq!(outcome.digest.len(), 64);
}

#[test]
fn test_no_temporary_file_left_behind() {
    let dir = project(json!({ "sources": ["../app/x.js"] }), &[("app/x.js", "x")]);
    let map_path = dir.path().join("dist/main.js.map");

    sanitize(&map_path, &SanitizeOptions::new(dir.path().join("app"))).unwrap();

    let entries: Vec<_> = fs::read_dir(dir.path().join("dist"))
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .collect();
    assert_eq!(entries, vec![std::ffi::OsString::from("main.js.map")]);
}

#[test]
fn test_rerun_resolves_rewritten_paths_against_map_dir() {
    // Sources now relative to `app`, but resolved against `dist` on the second pass
    let dir = project(json!({ "sources": ["../app/foo.js"] }), &[("app/foo.js", "foo")]);
    let map_path = dir.path().join("dist/main.js.map");
    let options = SanitizeOptions::new(dir.path().join("app"));

    sanitize(&map_path, &options).unwrap();
    let err = sanitize(&map_path, &options).unwrap_err();

    assert!(matches!(err, SourceMapError::Read { .. }));
    assert!(err.path().ends_with("dist/foo.js"));
}

#[test]
fn test_skip_sanitized_leaves_map_alone() {
    let dir = project(json!({ "sources": ["../app/foo.js"] }), &[("app/foo.js", "foo")]);
    let map_path = dir.path().join("dist/main.js.map");
    let options = SanitizeOptions::new(dir.path().join("app")).skip_sanitized(true);

    let first = sanitize(&map_path, &options).unwrap();
    let after_first = fs::read(&map_path).unwrap();
    let second = sanitize(&map_path, &options).unwrap();

    assert!(!first.skipped);
    assert!(second.skipped);
    assert_eq!(second.sources, vec!["foo.js".to_string()]);
    assert_eq!(second.digest, first.digest);
    assert_eq!(fs::read(&map_path).unwrap(), after_first);
}

#[test]
fn test_skip_sanitized_still_rewrites_when_root_differs() {
    let dir = project(
        json!({
            "sources": ["../app/foo.js"],
            "sourcesContent": ["stale"],
            "sourceRoot": "."
        }),
        &[("app/foo.js", "fresh")],
    );
    let map_path = dir.path().join("dist/main.js.map");
    let options = SanitizeOptions::new(dir.path().join("app")).skip_sanitized(true);

    let outcome = sanitize(&map_path, &options).unwrap();

    assert!(!outcome.skipped);
    assert_eq!(read_json(&map_path)["sourcesContent"], json!(["fresh"]));
}

#[test]
fn test_is_sanitized_for_requires_complete_contents() {
    let map: SourceMap = serde_json::from_value(json!({
        "sources": ["a.js", "b.js"],
        "sourcesContent": ["a", null],
        "sourceRoot": "/"
    }))
    .unwrap();
    assert!(!map.is_sanitized_for("/"));
}

#[test]
fn test_sanitize_all_processes_independent_maps() {
    let dir = project(json!({ "sources": ["../app/a.js"] }), &[("app/a.js", "a")]);
    fs::write(dir.path().join("app/main.less"), "body {}").unwrap();
    let css_map = dir.path().join("dist/main.css.map");
    fs::write(&css_map, br#"{"version":3,"sources":["../app/main.less"]}"#).unwrap();

    let maps = vec![dir.path().join("dist/main.js.map"), css_map.clone()];
    let outcomes = sanitize_all(&maps, &SanitizeOptions::new(dir.path().join("app"))).unwrap();

    assert_eq!(outcomes.len(), 2);
    assert_eq!(outcomes[0].sources, vec!["a.js".to_string()]);
    assert_eq!(outcomes[1].sources, vec!["main.less".to_string()]);
    assert_eq!(read_json(&css_map)["file"], json!("main.css"));
}

#[test]
fn test_sanitize_all_reports_first_failure() {
    let dir = project(json!({ "sources": ["../app/a.js"] }), &[("app/a.js", "a")]);
    let missing = dir.path().join("dist/missing.css.map");
    let good = dir.path().join("dist/main.js.map");

    let err = sanitize_all(
        &[missing.clone(), good.clone()],
        &SanitizeOptions::new(dir.path().join("app")),
    )
    .unwrap_err();

    assert_eq!(err.path(), &missing);
    // The independent map still got rewritten
    assert_eq!(read_json(&good)["sources"], json!(["a.js"]));
}

#[test]
fn test_sanitize_all_handles_repeated_map_once() {
    let dir = project(json!({ "sources": ["../app/a.js"] }), &[("app/a.js", "a")]);
    let map_path = dir.path().join("dist/main.js.map");
    let same_map = dir.path().join("dist/../dist/main.js.map");
    let maps = vec![map_path.clone(); 8]
        .into_iter()
        .chain(std::iter::once(same_map))
        .collect::<Vec<_>>();

    let outcomes = sanitize_all(&maps, &SanitizeOptions::new(dir.path().join("app"))).unwrap();

    assert_eq!(outcomes.len(), 1);
    assert_eq!(outcomes[0].map_path, map_path);
    assert_eq!(read_json(&map_path)["sources"], json!(["a.js"]));
    assert_eq!(read_json(&map_path)["sourcesContent"], json!(["a"]));
}

#[test]
fn test_failed_write_keeps_old_map() {
    let dir = project(json!({ "sources": ["../app/x.js"] }), &[("app/x.js", "x")]);
    let map_path = dir.path().join("dist/main.js.map");
    let before = fs::read(&map_path).unwrap();
    // A directory in the temporary file's place makes the write fail
    fs::create_dir(dir.path().join("dist/main.js.map.tmp")).unwrap();

    let err = sanitize(&map_path, &SanitizeOptions::new(dir.path().join("app"))).unwrap_err();

    assert!(matches!(err, SourceMapError::Write { .. }));
    assert_eq!(fs::read(&map_path).unwrap(), before);
}

#[cfg(unix)]
#[test]
fn test_symlinked_map_is_written_through() {
    use std::os::unix::fs::{symlink, PermissionsExt};

    let dir = project(json!({ "sources": ["../app/a.js"] }), &[("app/a.js", "a")]);
    let real = dir.path().join("dist/main.js.map");
    let link = dir.path().join("dist/link.js.map");
    symlink("main.js.map", &link).unwrap();
    fs::set_permissions(&real, fs::Permissions::from_mode(0o640)).unwrap();

    sanitize(&link, &SanitizeOptions::new(dir.path().join("app"))).unwrap();

    assert!(fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
    let written = read_json(&real);
    assert_eq!(written["sources"], json!(["a.js"]));
    assert_eq!(written["sourcesContent"], json!(["a"]));
    assert_eq!(written["file"], json!("link.js"));
    assert_eq!(fs::metadata(&real).unwrap().permissions().mode() & 0o777, 0o640);
    assert!(!dir.path().join("dist/main.js.map.tmp").exists());
}
