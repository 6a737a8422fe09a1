use criterion::{Criterion, criterion_group, criterion_main};
use joiner::config::Config;
use joiner::engine::BundleEngine;
use std::fmt::Write as _;
use std::fs;
use std::hint::black_box;
use std::path::Path;
use tempfile::TempDir;

/// Create a package document with a flat, a grouped and a templated package
fn create_test_site(dir: &Path) -> std::io::Result<()> {
    fs::create_dir_all(dir.join("js"))?;
    fs::create_dir_all(dir.join("css"))?;

    let mut scripts = Vec::new();
    for i in 0..40 {
        let mut source = String::new();
        for j in 0..50 {
            let _ = writeln!(
                source,
                "function handler_{i}_{j}(event) {{ return event.target.value + {j}; }}"
            );
        }
        let name = format!("js/module_{i}.js");
        fs::write(dir.join(&name), source)?;
        scripts.push(format!("\"{name}\""));
    }

    let mut styles = Vec::new();
    for i in 0..10 {
        let mut source = String::new();
        for j in 0..50 {
            let _ = writeln!(source, ".block-{i}-{j} {{\n  margin: {j}px;\n  color: red;\n}}");
        }
        let name = format!("css/sheet_{i}.css");
        fs::write(dir.join(&name), source)?;
        styles.push(format!("\"{name}\""));
    }

    let document = format!(
        r#"{{
  "scripts": [{scripts}],
  "styles": {{ "base": [{base}], "theme": [{theme}] }},
  "page": {{ "base": [{base}], "output": ["/* generated */", "base", "/* end */"] }}
}}"#,
        scripts = scripts.join(", "),
        base = styles[..5].join(", "),
        theme = styles[5..].join(", "),
    );
    fs::write(dir.join("joiner.json"), document)
}

fn engine_for(dir: &Path, parallel_reads: bool) -> BundleEngine {
    let config = Config {
        packages: dir.join("joiner.json"),
        parallel_reads,
        ..Default::default()
    };
    BundleEngine::from_config(&config).expect("Failed to create engine")
}

/// Benchmark joining without minification
fn benchmark_join(c: &mut Criterion) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    create_test_site(temp_dir.path()).expect("Failed to create test site");

    let sequential = engine_for(temp_dir.path(), false);
    let parallel = engine_for(temp_dir.path(), true);

    c.bench_function("join_scripts_sequential", |b| {
        b.iter(|| {
            sequential
                .build(black_box("scripts"), false)
                .expect("Build should succeed")
        });
    });

    c.bench_function("join_scripts_parallel", |b| {
        b.iter(|| {
            parallel
                .build(black_box("scripts"), false)
                .expect("Build should succeed")
        });
    });
}

/// Benchmark the full pipeline including the compactors
fn benchmark_minify(c: &mut Criterion) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    create_test_site(temp_dir.path()).expect("Failed to create test site");
    let engine = engine_for(temp_dir.path(), false);

    c.bench_function("minify_scripts", |b| {
        b.iter(|| {
            engine
                .build(black_box("scripts"), true)
                .expect("Build should succeed")
        });
    });

    c.bench_function("minify_styles_template", |b| {
        b.iter(|| {
            engine
                .build(black_box("page"), true)
                .expect("Build should succeed")
        });
    });
}

criterion_group!(benches, benchmark_join, benchmark_minify);
criterion_main!(benches);
