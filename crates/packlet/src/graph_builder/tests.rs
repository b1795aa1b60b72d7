//! Tests for module discovery and identity assignment

use std::path::Path;

use pretty_assertions::assert_eq;
use tempfile::TempDir;

use super::*;
use crate::{analyzer::EsModuleAnalyzer, error::AnalysisError};

/// Treats every `use <target>` line as an import and keeps the text as code
struct LineAnalyzer;

impl SourceAnalyzer for LineAnalyzer {
    fn extract_imports(&self, source: &str) -> std::result::Result<Vec<String>, AnalysisError> {
        source
            .lines()
            .enumerate()
            .filter_map(|(index, line)| {
                let line = line.trim();
                if line == "broken" {
                    Some(Err(AnalysisError::new("broken module", index + 1)))
                } else {
                    line.strip_prefix("use ").map(|target| Ok(target.to_owned()))
                }
            })
            .collect()
    }

    fn compile_body(&self, source: &str) -> std::result::Result<String, AnalysisError> {
        Ok(source.to_owned())
    }
}

fn write_tree(files: &[(&str, &str)]) -> TempDir {
    let temp_dir = TempDir::new().expect("create temp dir");
    for (name, content) in files {
        let path = temp_dir.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create fixture dir");
        }
        fs::write(&path, content).expect("write fixture");
    }
    temp_dir
}

fn build(root: &Path, entry: &str) -> Result<ModuleGraph> {
    GraphBuilder::new(LineAnalyzer).build(&root.join(entry))
}

/// (identity, path relative to root, mapping) for every module
fn summarize(graph: &ModuleGraph, root: &Path) -> Vec<(u32, String, Vec<(String, u32)>)> {
    graph
        .iter()
        .map(|module| {
            let relative = module
                .path
                .strip_prefix(root)
                .expect("module inside fixture")
                .to_string_lossy()
                .replace('\\', "/");
            let mapping = module
                .path_to_id
                .iter()
                .map(|(target, id)| (target.clone(), id.as_u32()))
                .collect();
            (module.id.as_u32(), relative, mapping)
        })
        .collect()
}

fn assert_mappings_resolve(graph: &ModuleGraph) {
    for module in graph {
        for (target, id) in &module.path_to_id {
            let dependency = graph.get(*id).expect("mapped identity exists");
            assert_eq!(resolve_import(&module.path, target), dependency.path);
        }
    }
}

#[test]
fn test_single_dependency() {
    let fixture = write_tree(&[("a.js", "use ./b.js\n"), ("b.js", "")]);
    let root = normalize_path(fixture.path());

    let graph = build(&root, "a.js").expect("build graph");

    assert_eq!(
        summarize(&graph, &root),
        vec![
            (0, "a.js".to_owned(), vec![("./b.js".to_owned(), 1)]),
            (1, "b.js".to_owned(), vec![]),
        ]
    );
    assert_mappings_resolve(&graph);
}

#[test]
fn test_depth_first_preorder_identities() {
    let fixture = write_tree(&[
        ("main.js", "use ./lib/b.js\nuse ./c.js\n"),
        ("lib/b.js", "use ../d.js\n"),
        ("c.js", "use ./d.js\n"),
        ("d.js", ""),
    ]);
    let root = normalize_path(fixture.path());

    let graph = build(&root, "main.js").expect("build graph");

    assert_eq!(
        summarize(&graph, &root),
        vec![
            (
                0,
                "main.js".to_owned(),
                vec![("./lib/b.js".to_owned(), 1), ("./c.js".to_owned(), 3)]
            ),
            (1, "lib/b.js".to_owned(), vec![("../d.js".to_owned(), 2)]),
            (2, "d.js".to_owned(), vec![]),
            (3, "c.js".to_owned(), vec![("./d.js".to_owned(), 4)]),
            (4, "d.js".to_owned(), vec![]),
        ]
    );
    assert_mappings_resolve(&graph);
}

#[test]
fn test_same_target_twice_creates_two_modules() {
    let fixture = write_tree(&[("a.js", "use ./b.js\nuse ./b.js\n"), ("b.js", "")]);
    let root = normalize_path(fixture.path());

    let graph = build(&root, "a.js").expect("build graph");

    assert_eq!(graph.len(), 3);
    assert_eq!(graph.get(ModuleId::new(1)).map(|m| &m.path), Some(&root.join("b.js")));
    assert_eq!(graph.get(ModuleId::new(2)).map(|m| &m.path), Some(&root.join("b.js")));

    let entry = graph.entry().expect("entry module");
    assert_eq!(entry.imports, vec!["./b.js", "./b.js"]);
    assert_eq!(entry.path_to_id.len(), 1);
    assert_eq!(entry.resolve("./b.js"), Some(ModuleId::new(2)));
}

#[test]
fn test_dedupe_reuses_first_discovery() {
    let fixture = write_tree(&[
        ("main.js", "use ./b.js\nuse ./c.js\nuse ./b.js\n"),
        ("b.js", "use ./d.js\n"),
        ("c.js", "use ./d.js\n"),
        ("d.js", ""),
    ]);
    let root = normalize_path(fixture.path());

    let graph = GraphBuilder::new(LineAnalyzer)
        .with_dedupe(true)
        .build(&root.join("main.js"))
        .expect("build graph");

    assert_eq!(
        summarize(&graph, &root),
        vec![
            (
                0,
                "main.js".to_owned(),
                vec![("./b.js".to_owned(), 1), ("./c.js".to_owned(), 3)]
            ),
            (1, "b.js".to_owned(), vec![("./d.js".to_owned(), 2)]),
            (2, "d.js".to_owned(), vec![]),
            (3, "c.js".to_owned(), vec![("./d.js".to_owned(), 2)]),
        ]
    );
    assert_mappings_resolve(&graph);
}

#[test]
fn test_cycle_is_reported_with_chain() {
    let fixture = write_tree(&[
        ("a.js", "use ./b.js\n"),
        ("b.js", "use ./c.js\n"),
        ("c.js", "use ./b.js\n"),
    ]);
    let root = normalize_path(fixture.path());

    let error = build(&root, "a.js").expect_err("cycle must fail");

    match error {
        BuildError::CyclicDependency { cycle } => assert_eq!(
            cycle,
            vec![root.join("b.js"), root.join("c.js"), root.join("b.js")]
        ),
        other => panic!("expected a cycle error, got {other}"),
    }
}

#[test]
fn test_two_module_cycle_fails_even_with_dedupe() {
    let fixture = write_tree(&[("a.js", "use ./b.js\n"), ("b.js", "use ./a.js\n")]);
    let root = normalize_path(fixture.path());

    let error = GraphBuilder::new(LineAnalyzer)
        .with_dedupe(true)
        .build(&root.join("a.js"))
        .expect_err("cycle must fail");

    assert!(
        matches!(&error, BuildError::CyclicDependency { cycle } if cycle.len() == 3),
        "unexpected error: {error}"
    );
}

#[test]
fn test_self_import_is_a_cycle() {
    let fixture = write_tree(&[("a.js", "use ./a.js\n")]);
    let root = normalize_path(fixture.path());

    let error = build(&root, "a.js").expect_err("cycle must fail");

    assert!(matches!(
        error,
        BuildError::CyclicDependency { ref cycle } if cycle == &vec![root.join("a.js"), root.join("a.js")]
    ));
}

#[test]
fn test_missing_dependency_is_unreadable() {
    let fixture = write_tree(&[("a.js", "use ./missing.js\n")]);
    let root = normalize_path(fixture.path());

    let error = build(&root, "a.js").expect_err("missing file must fail");

    match error {
        BuildError::UnreadableSource { path, .. } => assert_eq!(path, root.join("missing.js")),
        other => panic!("expected an unreadable source error, got {other}"),
    }
}

#[test]
fn test_analyzer_failure_names_the_file() {
    let fixture = write_tree(&[("a.js", "use ./b.js\n"), ("b.js", "ok\nbroken\n")]);
    let root = normalize_path(fixture.path());

    let error = build(&root, "a.js").expect_err("analysis must fail");

    match error {
        BuildError::Analysis { path, error } => {
            assert_eq!(path, root.join("b.js"));
            assert_eq!(error, AnalysisError::new("broken module", 2));
        }
        other => panic!("expected an analysis error, got {other}"),
    }
}

#[test]
fn test_rebuild_is_identical() {
    let fixture = write_tree(&[
        ("a.js", "use ./b.js\nuse ./c.js\n"),
        ("b.js", "use ./c.js\n"),
        ("c.js", ""),
    ]);
    let builder = GraphBuilder::new(LineAnalyzer);
    let entry = fixture.path().join("a.js");

    let first = builder.build(&entry).expect("first build");
    let second = builder.build(&entry).expect("second build");

    assert_eq!(first, second);
    assert_eq!(first.len(), 4);
}

#[test]
fn test_es_module_sources() {
    let fixture = write_tree(&[
        (
            "src/index.js",
            "import { greet } from './greet.js';\nexport * from './util/names.js';\nconsole.log(greet());\n",
        ),
        ("src/greet.js", "import name from './util/names.js';\nexport const greet = () => `hi ${name}`;\n"),
        ("src/util/names.js", "export default 'world';\n"),
    ]);
    let root = normalize_path(fixture.path());

    let graph = GraphBuilder::new(EsModuleAnalyzer)
        .build(&root.join("src/index.js"))
        .expect("build graph");

    assert_eq!(
        summarize(&graph, &root),
        vec![
            (
                0,
                "src/index.js".to_owned(),
                vec![("./greet.js".to_owned(), 1), ("./util/names.js".to_owned(), 3)]
            ),
            (1, "src/greet.js".to_owned(), vec![("./util/names.js".to_owned(), 2)]),
            (2, "src/util/names.js".to_owned(), vec![]),
            (3, "src/util/names.js".to_owned(), vec![]),
        ]
    );
    let entry = graph.entry().expect("entry module");
    assert!(entry.code.contains("localRequire(\"./greet.js\")"));
}
