use criterion::{Criterion, black_box, criterion_group, criterion_main};
use crumbs_fs::io::{self, RobustnessConfig};
use crumbs_fs::{NormalizedPath, Walker, fingerprint};
use std::fs;
use tempfile::tempdir;

fn write_atomic_benchmark(c: &mut Criterion) {
    c.bench_function("io::write_atomic", |b| {
        let dir = tempdir().unwrap();
        let path = NormalizedPath::new(dir.path().join("manifest.json"));
        let content = "{\"files\": []}".as_bytes();
        let config = RobustnessConfig::default();

        b.iter(|| {
            io::write_atomic(black_box(&path), black_box(content), config).unwrap();
        })
    });
}

fn fingerprint_benchmark(c: &mut Criterion) {
    c.bench_function("fingerprint::fingerprint (1 MiB)", |b| {
        let dir = tempdir().unwrap();
        let path = dir.path().join("blob.bin");
        fs::write(&path, vec![0x5au8; 1024 * 1024]).unwrap();

        b.iter(|| {
            fingerprint::fingerprint(black_box(&path)).unwrap();
        })
    });
}

fn walk_benchmark(c: &mut Criterion) {
    c.bench_function("Walker::walk (500 files)", |b| {
        let dir = tempdir().unwrap();
        for i in 0..50 {
            let sub = dir.path().join(format!("dir{i}"));
            fs::create_dir_all(&sub).unwrap();
            for j in 0..10 {
                fs::write(sub.join(format!("f{j}.txt")), "x").unwrap();
            }
        }
        let walker = Walker::new(dir.path());

        b.iter(|| {
            let files = walker.walk();
            assert_eq!(files.len(), 500);
        })
    });
}

criterion_group!(benches, write_atomic_benchmark, fingerprint_benchmark, walk_benchmark);
criterion_main!(benches);
