//! Benchmarks for pattern matching and archive packing.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use criterion::BenchmarkId;
use criterion::Criterion;
use criterion::Throughput;
use criterion::criterion_group;
use criterion::criterion_main;
use scanpack_core::ArchiveBuilder;
use scanpack_core::ArchiveFormat;
use scanpack_core::EntryNaming;
use scanpack_core::SourceDescriptor;
use scanpack_core::matcher::first_match;
use std::fs;
use std::hint::black_box;
use std::path::PathBuf;
use tempfile::TempDir;

/// Creates `dirs` directories with `files` 1 KB files each.
fn create_tree(temp: &TempDir, dirs: usize, files: usize) -> PathBuf {
    let root = temp.path().join("bench_data");
    let content = "x".repeat(1024);
    for d in 0..dirs {
        let dir = root.join(format!("module_{d:03}/src"));
        fs::create_dir_all(&dir).unwrap();
        for f in 0..files {
            let ext = if f % 4 == 0 { "bin" } else { "rs" };
            fs::write(dir.join(format!("file_{f:04}.{ext}")), &content).unwrap();
        }
    }
    root
}

fn bench_matcher(c: &mut Criterion) {
    let patterns = [
        "**/test/**",
        "**/.git/**",
        "**/node_modules/**",
        "*.min.js",
        "build/generated/**/*.java",
    ];

    let paths = [
        "src/main/java/com/example/service/UserService.java",
        "web/node_modules/left-pad/index.js",
        "build/generated/sources/a/b/c/Model.java",
        "assets/app.min.js",
    ];

    c.bench_function("matcher/first_match", |b| {
        b.iter(|| {
            for path in &paths {
                black_box(first_match(black_box(path), patterns));
            }
        });
    });
}

fn bench_packing(c: &mut Criterion) {
    let mut group = c.benchmark_group("packing");
    let temp = TempDir::new().unwrap();
    let root = create_tree(&temp, 10, 50);
    group.throughput(Throughput::Elements(500));

    for format in [ArchiveFormat::Zip, ArchiveFormat::Tar, ArchiveFormat::TarGz] {
        group.bench_with_input(BenchmarkId::from_parameter(format), &format, |b, format| {
            let out_dir = TempDir::new().unwrap();
            b.iter(|| {
                let output = out_dir.path().join("out.archive");
                let report = ArchiveBuilder::new()
                    .output(&output)
                    .format(*format)
                    .naming(EntryNaming::SourceRoot)
                    .source(
                        SourceDescriptor::anonymous()
                            .with_folder(&root)
                            .with_suffixes([".rs"])
                            .with_default_excludes(),
                    )
                    .build()
                    .unwrap();
                black_box(report);
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_matcher, bench_packing);
criterion_main!(benches);
