//! Conversion throughput benchmarks
//!
//! Measures a full two-pass conversion into memory with varying:
//! - Document counts (1, 10, 100)
//! - Multi-value behaviour (Lazy, Greedy)
//!
//! Run benchmarks: `cargo bench --bench conversion_throughput`

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;
use xmltab::core::{ContainerDefinition, MappingConfiguration, MultiValueBehaviour, ValueDefinition};
use xmltab::{ConverterBuilder, InMemoryDocument, MemorySink, StoreBacking};

/// An order with `lines` lines, each carrying two tags.
fn order_document(id: usize, lines: usize) -> String {
    let mut xml = format!(r#"<orders><order id="{}"><customer>Customer {}</customer>"#, id, id);
    for line in 0..lines {
        xml.push_str(&format!(
            r#"<line sku="SKU-{}" qty="{}"><tag>a</tag><tag>b</tag></line>"#,
            line,
            line % 7 + 1
        ));
    }
    xml.push_str("</order></orders>");
    xml
}

fn generate_documents(count: usize) -> Vec<InMemoryDocument> {
    (0..count)
        .map(|i| InMemoryDocument::new(format!("order-{}.xml", i), order_document(i, 1 + i % 5)))
        .collect()
}

fn mapping(behaviour: MultiValueBehaviour) -> MappingConfiguration {
    MappingConfiguration::builder()
        .with_default_behaviour(behaviour)
        .with_container(
            ContainerDefinition::new("Order", "/orders/order")
                .with_value(ValueDefinition::new("Id", "@id"))
                .with_value(ValueDefinition::new("Customer", "normalize-space(customer)"))
                .with_container(
                    ContainerDefinition::new("Line", "line")
                        .with_value(ValueDefinition::new("Sku", "@sku"))
                        .with_value(ValueDefinition::new("Qty", "@qty"))
                        .with_value(ValueDefinition::new("Tag", "tag")),
                ),
        )
        .build()
        .expect("benchmark mapping is valid")
}

fn bench_document_counts(c: &mut Criterion) {
    let mut group = c.benchmark_group("document_count");
    for count in [1, 10, 100] {
        let docs = generate_documents(count);
        let converter = ConverterBuilder::new()
            .with_mapping(mapping(MultiValueBehaviour::Lazy))
            .with_store_backing(StoreBacking::Memory)
            .build()
            .expect("converter builds");
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &docs, |b, docs| {
            b.iter(|| {
                let mut sink = MemorySink::new();
                converter.convert(docs, &mut sink).expect("conversion succeeds");
                black_box(sink)
            })
        });
    }
    group.finish();
}

fn bench_behaviours(c: &mut Criterion) {
    let mut group = c.benchmark_group("multi_value_behaviour");
    let docs = generate_documents(50);
    for (label, behaviour) in [
        ("lazy", MultiValueBehaviour::Lazy),
        ("greedy", MultiValueBehaviour::Greedy),
    ] {
        let converter = ConverterBuilder::new()
            .with_mapping(mapping(behaviour))
            .with_store_backing(StoreBacking::Memory)
            .build()
            .expect("converter builds");
        group.bench_function(label, |b| {
            b.iter(|| {
                let mut sink = MemorySink::new();
                converter.convert(&docs, &mut sink).expect("conversion succeeds");
                black_box(sink)
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_document_counts, bench_behaviours);
criterion_main!(benches);
