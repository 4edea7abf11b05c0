use criterion::{criterion_group, criterion_main, Criterion};
use engine::{StopWords, TermCounter};

fn bench_count(c: &mut Criterion) {
    let stop_words = StopWords::default();
    let block = "The quick brown fox jumps over the lazy dog and the dog barks back at the fox again".to_string();
    let blocks: Vec<String> = std::iter::repeat(block).take(200).collect();
    c.bench_function("count_200_blocks", |b| {
        b.iter(|| TermCounter::count("https://example.com/bench", &blocks, &stop_words))
    });
}

criterion_group!(benches, bench_count);
criterion_main!(benches);
