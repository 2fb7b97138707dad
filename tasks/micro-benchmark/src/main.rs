use std::time::Duration;

use clap::Parser;
use criterion::{Criterion, Throughput};
use deptree_cache::MemoryCacheStore;
use deptree_network::ThrottledClient;
use deptree_registry::{HttpRegistry, RegistryFetcher};
use deptree_resolver::{resolve_version, DependencyTreeBuilder};
use deptree_testing_utils::FakeRegistry;
use indexmap::IndexMap;
use mockito::ServerGuard;
use pipe_trait::Pipe;

const CACHE_TTL: Duration = Duration::from_secs(60);

/// Number of packages in the generated registry.
const PACKAGE_COUNT: usize = 40;

/// Number of published versions per package.
const VERSION_COUNT: usize = 20;

#[derive(Debug, Parser)]
struct CliArgs {
    #[clap(long)]
    save_baseline: Option<String>,
}

fn package_name(index: usize) -> String {
    format!("package-{index}")
}

fn version(minor: usize) -> String {
    format!("1.{minor}.0")
}

/// Every package depends on the next three, so the graph is full of shared subtrees.
fn create_registry() -> FakeRegistry {
    (0..PACKAGE_COUNT).fold(FakeRegistry::new(), |registry, index| {
        let dependencies: Vec<(String, &str)> =
            (index + 1..PACKAGE_COUNT).take(3).map(|dep| (package_name(dep), "^1.0.0")).collect();
        let dependencies: Vec<(&str, &str)> =
            dependencies.iter().map(|(name, range)| (name.as_str(), *range)).collect();
        let name = package_name(index);
        (0..VERSION_COUNT)
            .fold(registry, |registry, minor| {
                registry.publish(&name, &version(minor), &dependencies)
            })
            .tag(&name, "latest", &version(VERSION_COUNT - 1))
    })
}

fn bench_resolve_version(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolve_version");
    let versions: Vec<String> = (0..1000)
        .map(|index| format!("{}.{}.{}", index / 100, index % 100 / 10, index % 10))
        .collect();
    let tags: IndexMap<String, String> = [("latest".to_string(), "9.9.9".to_string())].into();

    group.throughput(Throughput::Elements(versions.len() as u64));
    for requested in ["5.5.5", "^5.0.0", ">=1.2.3 <4.0.0", "latest"] {
        group.bench_function(requested, |b| {
            b.iter(|| {
                let versions = versions.iter().map(String::as_str);
                resolve_version("my-package", requested, versions, &tags)
            })
        });
    }

    group.finish();
}

fn bench_build_tree(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_tree");
    let rt = tokio::runtime::Builder::new_multi_thread().enable_all().build().unwrap();
    let registry = create_registry();
    let root = package_name(0);

    group.bench_function("cold_cache", |b| {
        b.to_async(&rt).iter(|| async {
            let cache = MemoryCacheStore::new();
            DependencyTreeBuilder::new(&registry, &cache, CACHE_TTL)
                .build_tree(&root, "latest")
                .await
                .unwrap()
                .count_nodes()
        });
    });

    let warm_cache = MemoryCacheStore::new();
    DependencyTreeBuilder::new(&registry, &warm_cache, CACHE_TTL)
        .build_tree(&root, "latest")
        .pipe(|future| rt.block_on(future))
        .unwrap();
    group.bench_function("warm_cache", |b| {
        b.to_async(&rt).iter(|| async {
            DependencyTreeBuilder::new(&registry, &warm_cache, CACHE_TTL)
                .build_tree(&root, "latest")
                .await
                .unwrap()
                .count_nodes()
        });
    });

    group.finish();
}

fn bench_http_registry(c: &mut Criterion, server: &mut ServerGuard) {
    let mut group = c.benchmark_group("http_registry");
    let versions = (0..VERSION_COUNT)
        .map(|minor| {
            let dependencies = r#"{ "a": "^1.0.0", "b": "~2.1.0" }"#;
            format!(r#""{}": {{ "dependencies": {dependencies} }}"#, version(minor))
        })
        .collect::<Vec<_>>()
        .join(",");
    let body = format!(
        r#"{{ "name": "my-package", "dist-tags": {{ "latest": "1.0.0" }}, "versions": {{ {versions} }} }}"#
    );
    let _mock = server.mock("GET", "/my-package").with_status(200).with_body(&body).create();

    let rt = tokio::runtime::Builder::new_multi_thread().enable_all().build().unwrap();
    let http_client = ThrottledClient::new_from_cpu_count();
    let registry_url = format!("{}/", server.url());

    group.throughput(Throughput::Bytes(body.len() as u64));
    group.bench_function("fetch_package", |b| {
        b.to_async(&rt).iter(|| async {
            HttpRegistry { http_client: &http_client, registry: &registry_url }
                .fetch_package("my-package")
                .await
                .unwrap()
                .versions
                .len()
        });
    });

    group.finish();
}

pub fn main() -> Result<(), String> {
    let mut server = mockito::Server::new();
    let CliArgs { save_baseline } = CliArgs::parse();

    let mut criterion = Criterion::default().without_plots();
    if let Some(baseline) = save_baseline {
        criterion = criterion.save_baseline(baseline);
    }

    bench_resolve_version(&mut criterion);
    bench_build_tree(&mut criterion);
    bench_http_registry(&mut criterion, &mut server);

    Ok(())
}
