use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use headerparser::{scan, scan_stanzas, types, Additional, Field, HeaderParser};

const CONTROL: &str = include_str!("../tests/fixtures/control.txt");

fn control_parser() -> HeaderParser {
    let mut parser = HeaderParser::new();
    parser.add_field(Field::new("Package").alias("Source").required()).unwrap();
    parser.add_field(Field::new("Description").unfold()).unwrap();
    parser
        .add_field(Field::new("Essential").with_type(types::boolean).default(false))
        .unwrap();
    parser
        .add_additional(Additional::new().multiple())
        .unwrap();
    parser
}

fn generated_header(fields: usize) -> String {
    let mut text = String::new();
    for i in 0..fields {
        text.push_str(&format!("X-Field-{}: value number {}\n", i, i));
        if i % 4 == 0 {
            text.push_str("  with a folded continuation line\n");
        }
    }
    text.push_str("\nAnd a short body.\n");
    text
}

pub fn scan_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("scan");
    for size in [4, 16, 64, 256].iter() {
        let data = generated_header(*size);
        group.throughput(Throughput::Bytes(data.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &data, |b, data| {
            b.iter(|| scan(black_box(data)).count())
        });
    }
    group.finish();
}

pub fn stanzas_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("stanzas");
    group.throughput(Throughput::Bytes(CONTROL.len() as u64));
    group.bench_function("control", |b| {
        b.iter(|| {
            scan_stanzas(black_box(CONTROL))
                .collect::<Result<Vec<_>, _>>()
                .unwrap()
        })
    });
    group.finish();
}

pub fn parse_benchmark(c: &mut Criterion) {
    let parser = control_parser();
    let mut group = c.benchmark_group("parse");
    group.throughput(Throughput::Bytes(CONTROL.len() as u64));
    group.bench_function(BenchmarkId::new("stanzas", "control"), |b| {
        b.iter(|| {
            parser
                .parse_stanzas(black_box(CONTROL))
                .collect::<Result<Vec<_>, _>>()
                .unwrap()
        })
    });

    let mut additional = HeaderParser::new();
    additional.add_additional(Additional::new()).unwrap();
    let data = generated_header(64);
    group.throughput(Throughput::Bytes(data.len() as u64));
    group.bench_function(BenchmarkId::new("additional", 64), |b| {
        b.iter(|| additional.parse(black_box(&data)).unwrap())
    });
    group.finish();
}

pub fn unfold_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("unfold");
    group.bench_function("single-line", |b| {
        b.iter(|| types::unfold(black_box("no line breaks in this value")))
    });
    group.bench_function("folded", |b| {
        b.iter(|| types::unfold(black_box("a value\n  folded over\n\tthree lines\n")))
    });
    group.finish();
}

criterion_group!(
    benches,
    scan_benchmark,
    stanzas_benchmark,
    parse_benchmark,
    unfold_benchmark,
);
criterion_main!(benches);
