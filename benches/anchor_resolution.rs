//! Anchor Resolution Benchmarks
//!
//! Measures quote-to-range resolution over a long article, for both the
//! exact match path and the whitespace-normalized fallback.
//!
//! Run with: `cargo bench --bench anchor_resolution`

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::time::Duration;

use scholia::anchor::{resolve, TextIndex};
use scholia::dom::Document;

/// Build an article with `paragraph_count` paragraphs of mixed markup and
/// deliberately uneven whitespace.
fn build_page(paragraph_count: usize) -> String {
    let mut page = String::from("<html><body><h1>A Long Article</h1>");
    for i in 0..paragraph_count {
        page.push_str(&format!(
            "<p>Paragraph {i} opens with a plain sentence. It continues with an \
             <em>emphasized aside</em> and then settles into the quiet record of \
             paragraph {i}, which   spreads\n across uneven whitespace.</p>"
        ));
    }
    page.push_str("</body></html>");
    page
}

fn bench_resolution(c: &mut Criterion) {
    let page = build_page(200);
    let doc = Document::parse(&page).unwrap();
    let body = doc.body();

    let mut group = c.benchmark_group("anchor_resolution");
    group.measurement_time(Duration::from_secs(10));
    group.sample_size(50);

    // Anchor near the end of the article, worst case for the exact scan.
    group.bench_function("exact_match", |b| {
        let anchor = "the quiet record of paragraph 199";
        b.iter(|| {
            let range = resolve(&doc, body, black_box(anchor));
            black_box(range)
        })
    });

    // The page's run of spaces and the newline defeat the exact scan, so
    // this exercises the normalized fallback end to end.
    group.bench_function("normalized_fallback", |b| {
        let anchor = "paragraph 199, which spreads across uneven whitespace";
        b.iter(|| {
            let range = resolve(&doc, body, black_box(anchor));
            black_box(range)
        })
    });

    group.finish();
}

fn bench_index_build(c: &mut Criterion) {
    let page = build_page(200);
    let doc = Document::parse(&page).unwrap();
    let body = doc.body();

    let mut group = c.benchmark_group("text_index");
    group.measurement_time(Duration::from_secs(10));

    group.bench_function("build_200_paragraphs", |b| {
        b.iter(|| {
            let index = TextIndex::build(black_box(&doc), body);
            black_box(index)
        })
    });

    group.finish();
}

criterion_group!(benches, bench_resolution, bench_index_build);
criterion_main!(benches);
