use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use serde::{Deserialize, Serialize};
use tsbridge::router::MemoryRouter;
use tsbridge::typegen::TypeCompiler;
use tsbridge::{Describe, Registry, RequestContext, RouteIdentity};

#[derive(Deserialize, Describe)]
struct Query {
    owner: String,
    limit: Option<u32>,
}

#[derive(Serialize, Describe)]
struct Node {
    label: String,
    weight: f64,
    children: Vec<Node>,
    parent: Option<Box<Node>>,
}

fn lookup(_ctx: &RequestContext<'_>, input: Query) -> anyhow::Result<Vec<Node>> {
    let count = input.limit.unwrap_or(1) as usize;
    Ok((0..count)
        .map(|i| Node {
            label: format!("{}-{i}", input.owner),
            weight: i as f64,
            children: Vec::new(),
            parent: None,
        })
        .collect())
}

fn wide_registry(handlers: usize) -> (Registry, MemoryRouter) {
    let mut router = MemoryRouter::new();
    let mut registry = Registry::new();
    for i in 0..handlers {
        let identity = RouteIdentity::new(format!("ns{}", i % 10), format!("lookup{i}"))
            .expect("valid identity");
        registry
            .register(&mut router, identity, lookup)
            .expect("unique identity");
    }
    (registry, router)
}

fn bench_compile(c: &mut Criterion) {
    c.bench_function("compile_recursive_type", |b| {
        b.iter(|| {
            let mut compiler = TypeCompiler::new();
            black_box(compiler.compile(&Node::describe()).expect("compile"));
        })
    });
}

fn bench_generate(c: &mut Criterion) {
    let mut group = c.benchmark_group("generate_client");
    for handlers in [10, 100, 500] {
        let (registry, _router) = wide_registry(handlers);
        group.bench_with_input(BenchmarkId::from_parameter(handlers), &registry, |b, r| {
            b.iter(|| black_box(r.generate_client().expect("generate")))
        });
    }
    group.finish();
}

fn bench_dispatch(c: &mut Criterion) {
    let (_registry, router) = wide_registry(100);
    let body = br#"{"owner":"ada","limit":3}"#;
    c.bench_function("dispatch_decode_encode", |b| {
        b.iter(|| black_box(router.dispatch("/ns7.lookup57", black_box(body))))
    });
}

criterion_group!(benches, bench_compile, bench_generate, bench_dispatch);
criterion_main!(benches);
