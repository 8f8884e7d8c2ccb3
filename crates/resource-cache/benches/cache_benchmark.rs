use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use resource_cache::{ResourceCache, ResourceFactory};

struct BlobFactory;

impl ResourceFactory for BlobFactory {
	type Key = u64;
	type Resource = Vec<u8>;
	type Error = std::convert::Infallible;

	fn create(&self, key: &u64) -> Result<Vec<u8>, Self::Error> {
		Ok(vec![*key as u8; 64])
	}
}

fn bench_get_hit(c: &mut Criterion) {
	let cache = ResourceCache::new(BlobFactory);
	let warm: Vec<_> = (0..1000).map(|i| cache.get(&i).unwrap()).collect();

	c.bench_function("get_hit", |b| {
		b.iter(|| {
			for i in 0..1000 {
				drop(cache.get(&black_box(i)).unwrap());
			}
		});
	});

	drop(warm);
}

fn bench_handle_reads(c: &mut Criterion) {
	let cache = ResourceCache::new(BlobFactory);
	let handle = cache.get(&7).unwrap();

	let mut group = c.benchmark_group("handle_reads");

	group.bench_function("get", |b| {
		b.iter(|| black_box(handle.get()[0]));
	});

	group.bench_function("get_arc", |b| {
		b.iter(|| black_box(handle.get_arc()));
	});

	group.finish();
	drop(handle);
}

fn bench_recreate_all(c: &mut Criterion) {
	let mut group = c.benchmark_group("recreate_all");

	for size in [10u64, 100, 1000] {
		let cache = ResourceCache::new(BlobFactory);
		let handles: Vec<_> = (0..size).map(|i| cache.get(&i).unwrap()).collect();

		group.throughput(Throughput::Elements(size));
		group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
			b.iter(|| black_box(cache.recreate_all().is_ok()));
		});

		drop(handles);
	}

	group.finish();
}

criterion_group!(benches, bench_get_hit, bench_handle_reads, bench_recreate_all);
criterion_main!(benches);
