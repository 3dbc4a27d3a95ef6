use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rustf_view_driver::{AppPaths, PathResolver, Route, ViewConfig};
use std::fs;

fn benchmark_relative_name(c: &mut Criterion) {
    let config = ViewConfig::default();
    let paths = AppPaths::from_root("/srv/site");
    let resolver = PathResolver::new(&config, &paths);
    let route = Route::new("admin.UserProfile", "showList");

    c.bench_function("PathResolver::relative_name", |b| {
        b.iter(|| {
            let name = resolver.relative_name(black_box(""), &route);
            black_box(name);
        })
    });
}

fn benchmark_resolve(c: &mut Criterion) {
    let temp_dir = tempfile::TempDir::new().unwrap();
    fs::create_dir_all(temp_dir.path().join("view")).unwrap();

    let config = ViewConfig::default();
    let paths = AppPaths::from_root(temp_dir.path());
    let resolver = PathResolver::new(&config, &paths);
    let route = Route::new("blog.post", "showList");

    c.bench_function("PathResolver::resolve", |b| {
        b.iter(|| {
            let path = resolver.resolve(black_box(""), &route);
            black_box(path)
        })
    });

    c.bench_function("PathResolver::resolve absolute", |b| {
        b.iter(|| {
            let path = resolver.resolve(black_box("/public/header"), &route);
            black_box(path)
        })
    });
}

criterion_group!(benches, benchmark_relative_name, benchmark_resolve);
criterion_main!(benches);
