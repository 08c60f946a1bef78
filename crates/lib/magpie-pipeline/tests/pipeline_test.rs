use std::fs;
use std::path::{Path, PathBuf};

use magpie_ast::{AstProvider, Diagnostic, Node, NodeKind, QualType, Severity, TranslationUnit};
use magpie_emit::BuiltinTemplates;
use magpie_pipeline::{InputConfig, Pipeline, ProjectConfig};

struct FakeProvider {
    unit: TranslationUnit,
}

impl AstProvider for FakeProvider {
    fn parse(&self, umbrella: &Path, _flags: &[String]) -> anyhow::Result<TranslationUnit> {
        // the driver must have synthesized the umbrella before parsing
        assert!(umbrella.exists());
        Ok(self.unit.clone())
    }
}

fn annotation(text: &str) -> Node {
    Node::new(NodeKind::Annotation, text)
}

fn reflected_field(name: &str) -> Node {
    Node::new(NodeKind::Field, name)
        .with_type(QualType::builtin("float"))
        .with_child(annotation("%REFLECTION ENABLE"))
}

/// Classes A (no base) and B (base A), both in Scene.h, one field each.
fn scene_unit(diagnostics: Vec<Diagnostic>) -> TranslationUnit {
    let class_a = Node::new(NodeKind::Class, "A")
        .in_file("engine/Scene.h")
        .with_child(annotation("%REFL_SER_CLASS "))
        .with_child(reflected_field("m_a"));
    let class_b = Node::new(NodeKind::Class, "B")
        .in_file("engine/Scene.h")
        .with_child(annotation("%REFL_SER_CLASS "))
        .with_child(Node::new(NodeKind::BaseSpecifier, "A").with_type(QualType::record(["A"])))
        .with_child(reflected_field("m_b"));

    TranslationUnit {
        // B first, so the A-before-B ordering has to come from the graph
        root: Node::new(NodeKind::TranslationUnit, "")
            .with_child(class_b)
            .with_child(class_a),
        diagnostics,
    }
}

fn test_config(tag: &str) -> (ProjectConfig, PathBuf) {
    let root = std::env::temp_dir().join(format!("magpie-pipe-{}-{}", tag, std::process::id()));
    let _ = fs::remove_dir_all(&root);
    let output_dir = root.join("generated");

    let config = ProjectConfig {
        output_dir,
        inputs: vec![InputConfig {
            file: PathBuf::from("engine/Scene.h"),
            registration: None,
            serialization: None,
        }],
        ast_flags: vec!["-std=c++20".to_owned()],
        upstream_caches: Vec::new(),
        cache_file: None,
    };
    (config, root)
}

fn generated_files(output_dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(output_dir)
        .map(|entries| {
            entries
                .filter_map(|entry| entry.ok())
                .filter(|entry| entry.path().is_file())
                .map(|entry| entry.file_name().to_string_lossy().into_owned())
                .collect()
        })
        .unwrap_or_default();
    names.sort();
    names
}

#[test]
fn end_to_end_hierarchy_emits_ordered_artifacts() {
    let (config, root) = test_config("hierarchy");
    let output_dir = config.output_dir.clone();
    let provider = FakeProvider {
        unit: scene_unit(Vec::new()),
    };
    let engine = BuiltinTemplates;

    let summary = Pipeline::new(config, &provider, &engine).run().unwrap();
    assert_eq!(summary.types, 2);
    assert_eq!(summary.enums, 0);

    let files = generated_files(&output_dir);
    assert_eq!(
        files,
        vec![
            "Scene.refl.gen.cpp",
            "Scene.ser.gen.cpp",
            "all_headers.gen.hpp",
            "all_reflected_types.gen.hpp",
            "metadata_cache.toml",
            "register_reflected_types.gen.cpp",
        ]
    );

    let sequence =
        fs::read_to_string(output_dir.join("register_reflected_types.gen.cpp")).unwrap();
    let a_call = sequence.find("    Register_A1();").unwrap();
    let b_call = sequence.find("    Register_B1();").unwrap();
    assert!(a_call < b_call, "base A must register before derived B");

    let registration = fs::read_to_string(output_dir.join("Scene.refl.gen.cpp")).unwrap();
    let a_def = registration.find("void Register_A1()").unwrap();
    let b_def = registration.find("void Register_B1()").unwrap();
    assert!(a_def < b_def);

    let cache = fs::read_to_string(output_dir.join("metadata_cache.toml")).unwrap();
    assert!(cache.contains("engine/Scene.h"));

    let _ = fs::remove_dir_all(&root);
}

#[test]
fn rerunning_on_unchanged_input_rewrites_nothing() {
    let (config, root) = test_config("idempotent");
    let provider = FakeProvider {
        unit: scene_unit(Vec::new()),
    };
    let engine = BuiltinTemplates;

    let first = Pipeline::new(config.clone(), &provider, &engine).run().unwrap();
    assert!(first.written > 0);
    assert_eq!(first.unchanged, 0);

    let second = Pipeline::new(config, &provider, &engine).run().unwrap();
    assert_eq!(second.written, 0);
    assert_eq!(second.unchanged, first.written);

    let _ = fs::remove_dir_all(&root);
}

#[test]
fn warnings_allow_the_run_to_complete() {
    let (config, root) = test_config("warnings");
    let output_dir = config.output_dir.clone();
    let provider = FakeProvider {
        unit: scene_unit(vec![Diagnostic::new(
            Severity::Warning,
            "implicit conversion loses precision",
        )]),
    };
    let engine = BuiltinTemplates;

    Pipeline::new(config, &provider, &engine).run().unwrap();
    assert!(!generated_files(&output_dir).is_empty());

    let _ = fs::remove_dir_all(&root);
}

#[test]
fn error_diagnostics_abort_before_any_output() {
    let (config, root) = test_config("errors");
    let output_dir = config.output_dir.clone();
    let provider = FakeProvider {
        unit: scene_unit(vec![
            Diagnostic::new(Severity::Warning, "minor issue"),
            Diagnostic::new(Severity::Error, "expected ';'").at("engine/Scene.h", 12, 8),
        ]),
    };
    let engine = BuiltinTemplates;

    let err = Pipeline::new(config, &provider, &engine).run().unwrap_err();
    assert!(err.to_string().contains("no output written"));
    assert!(generated_files(&output_dir).is_empty());

    let _ = fs::remove_dir_all(&root);
}

#[test]
fn misapplied_marker_aborts_the_run() {
    let (config, root) = test_config("misuse");
    let output_dir = config.output_dir.clone();

    let free_function = Node::new(NodeKind::Other, "UpdateAll")
        .in_file("engine/Scene.h")
        .with_child(annotation("%REFL_SER_CLASS "));
    let provider = FakeProvider {
        unit: TranslationUnit {
            root: Node::new(NodeKind::TranslationUnit, "").with_child(free_function),
            diagnostics: Vec::new(),
        },
    };
    let engine = BuiltinTemplates;

    let err = Pipeline::new(config, &provider, &engine).run().unwrap_err();
    assert!(err.to_string().contains("UpdateAll"));
    assert!(generated_files(&output_dir).is_empty());

    let _ = fs::remove_dir_all(&root);
}

#[test]
fn upstream_cache_entries_survive_into_the_saved_cache() {
    let (mut config, root) = test_config("upstream");
    let output_dir = config.output_dir.clone();

    // upstream project already reflected Engine::Object
    let upstream = root.join("upstream_cache.toml");
    fs::create_dir_all(&root).unwrap();
    fs::write(
        &upstream,
        "[types]\n\"Engine::Object\" = \"upstream/Object.h\"\n",
    )
    .unwrap();
    config.upstream_caches = vec![upstream];

    let provider = FakeProvider {
        unit: scene_unit(Vec::new()),
    };
    let engine = BuiltinTemplates;
    Pipeline::new(config, &provider, &engine).run().unwrap();

    let saved = fs::read_to_string(output_dir.join("metadata_cache.toml")).unwrap();
    assert!(saved.contains("Engine::Object"));
    assert!(saved.contains("upstream/Object.h"));
    assert!(saved.contains('A'));

    let _ = fs::remove_dir_all(&root);
}
