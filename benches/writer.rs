use std::io;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use xmlwriter::{
    Attribute, CData, Comment, Document, Element, EncodingWriter, NodeKind, Text, Writer, WriterConfig,
};

fn write_document<W: io::Write>(w: &mut Writer<W>, items: usize) -> xmlwriter::Result<()> {
    w.start(Document::new())?;
    w.start(Element::new("catalog").attrs(&[Attribute::new("version", "").uint(3u32)]))?;
    for i in 0..items {
        w.start(Element::new("item").attrs(&[
            Attribute::new("id", "").uint(i as u64),
            Attribute::new("lang", "en").namespace("xml", "http://www.w3.org/XML/1998/namespace"),
        ]))?;
        w.write(Element::new("name").content(&["Widget & <Gadget>".into()]))?;
        w.write(Comment::new("restocked weekly"))?;
        w.write(CData::new("if (a < b && c > d) { return; }"))?;
        w.write(Text("Plain text with a few \"quotes\" in it."))?;
        w.end_named(NodeKind::Element, "item")?;
    }
    w.end_doc()?;
    w.flush()
}

fn bench_write(c: &mut Criterion) {
    let mut group = c.benchmark_group("write");
    for &items in &[10usize, 100, 1000] {
        group.throughput(Throughput::Elements(items as u64));

        group.bench_with_input(BenchmarkId::new("plain", items), &items, |b, &items| {
            let mut w = Writer::new(io::sink());
            b.iter(|| write_document(&mut w, black_box(items)).unwrap())
        });

        group.bench_with_input(BenchmarkId::new("indented", items), &items, |b, &items| {
            let mut w = WriterConfig::new().perform_indent(true).create_writer(io::sink());
            b.iter(|| write_document(&mut w, black_box(items)).unwrap())
        });

        group.bench_with_input(BenchmarkId::new("unvalidated", items), &items, |b, &items| {
            let mut w = WriterConfig::new().perform_validation(false).create_writer(io::sink());
            b.iter(|| write_document(&mut w, black_box(items)).unwrap())
        });

        group.bench_with_input(BenchmarkId::new("windows-1252", items), &items, |b, &items| {
            let mut w = Writer::new(EncodingWriter::new(io::sink(), "windows-1252").unwrap());
            b.iter(|| write_document(&mut w, black_box(items)).unwrap())
        });
    }
    group.finish();
}

fn bench_escape(c: &mut Criterion) {
    let clean = "the quick brown fox jumps over the lazy dog ".repeat(64);
    let dirty = "<the> \"quick\" & 'brown' fox\n".repeat(64);

    let mut group = c.benchmark_group("escape");
    group.throughput(Throughput::Bytes(clean.len() as u64));
    group.bench_function("text/clean", |b| b.iter(|| xmlwriter::escape::escape_text(black_box(&clean)).len()));
    group.throughput(Throughput::Bytes(dirty.len() as u64));
    group.bench_function("text/dirty", |b| b.iter(|| xmlwriter::escape::escape_text(black_box(&dirty)).len()));
    group.bench_function("attribute/dirty", |b| {
        b.iter(|| xmlwriter::escape::escape_attribute(black_box(&dirty)).len())
    });
    group.finish();
}

criterion_group!(benches, bench_write, bench_escape);
criterion_main!(benches);
