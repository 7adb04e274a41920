//! Benchmarks for parsing, serialization, and model field access.

#![allow(clippy::unwrap_used)]

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use lazy_xml_model::prelude::*;
use lazy_xml_model::serial::serialize;
use lazy_xml_model::Document;
use std::fmt::Write;

xml_model! {
    /// Benchmark root.
    pub struct Catalog as "catalog" {
        attribute name = "name";
        has_one summary: Summary = "summary";
        has_many books: Book = "book";
    }
}

xml_model! {
    /// Benchmark single child.
    pub struct Summary as "summary" {
        attribute kind = "type";
    }
}

xml_model! {
    /// Benchmark collection member.
    pub struct Book as "book" {
        attribute id = "id";
        element title = "title";
    }
}

// ---------------------------------------------------------------------------
// Document generators
// ---------------------------------------------------------------------------

/// Generates a catalog with `count` books.
fn make_catalog_xml(count: usize) -> String {
    let mut xml = String::from("<?xml version=\"1.0\"?>\n<catalog name=\"bench\">\n");
    xml.push_str("  <summary type=\"about\"/>\n");
    for i in 0..count {
        let _ = writeln!(xml, "  <book id=\"bk{i}\"><title>Title {i}</title></book>");
    }
    xml.push_str("</catalog>\n");
    xml
}

// ---------------------------------------------------------------------------
// Engine benchmarks
// ---------------------------------------------------------------------------

fn bench_parse_catalog(c: &mut Criterion) {
    let xml = make_catalog_xml(1000);
    c.bench_function("parse_catalog", |b| {
        b.iter(|| Document::parse_str(black_box(&xml)));
    });
}

fn bench_serialize_catalog(c: &mut Criterion) {
    let doc = Document::parse_str(&make_catalog_xml(1000)).unwrap();
    c.bench_function("serialize_catalog", |b| {
        b.iter(|| serialize(black_box(&doc)));
    });
}

// ---------------------------------------------------------------------------
// Model benchmarks
// ---------------------------------------------------------------------------

fn bench_read_has_one(c: &mut Criterion) {
    let catalog = Catalog::parse(&make_catalog_xml(100)).unwrap();
    c.bench_function("read_has_one", |b| {
        b.iter(|| black_box(catalog.summary().get()).map(|s| s.kind().get()));
    });
}

fn bench_iterate_has_many(c: &mut Criterion) {
    let catalog = Catalog::parse(&make_catalog_xml(1000)).unwrap();
    c.bench_function("iterate_has_many", |b| {
        b.iter(|| {
            catalog
                .books()
                .iter()
                .filter_map(|book| book.id().get())
                .count()
        });
    });
}

fn bench_build_members(c: &mut Criterion) {
    c.bench_function("build_100_members", |b| {
        b.iter(|| {
            let catalog = Catalog::new();
            for i in 0..100 {
                let book = catalog.books().build([("id", format!("bk{i}"))]).unwrap();
                book.title().set("Title").unwrap();
            }
            black_box(catalog.to_xml())
        });
    });
}

fn bench_cross_document_append(c: &mut Criterion) {
    c.bench_function("cross_document_append", |b| {
        b.iter(|| {
            let catalog = Catalog::new();
            for _ in 0..50 {
                let book = Book::with_attributes([("id", "x")]).unwrap();
                catalog.books().append(&book).unwrap();
            }
            black_box(catalog.books().len())
        });
    });
}

criterion_group!(engine, bench_parse_catalog, bench_serialize_catalog);

criterion_group!(
    model,
    bench_read_has_one,
    bench_iterate_has_many,
    bench_build_members,
    bench_cross_document_append,
);

criterion_main!(engine, model);
