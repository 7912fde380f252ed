use boolsearch_core::{build, search, DocId, Document, Normalizer, NormalizerConfig, TextNormalizer};
use criterion::{criterion_group, criterion_main, Criterion};

const WORDS: &[&str] = &["casa", "rua", "bola", "pedra", "janela", "porta", "livro", "mesa", "gato", "cidade"];

fn corpus(num_docs: usize) -> Vec<String> {
    (0..num_docs)
        .map(|i| (0..40).map(|j| WORDS[(i * 7 + j * 3) % WORDS.len()]).collect::<Vec<_>>().join(" "))
        .collect()
}

fn bench_tokenize(c: &mut Criterion) {
    let n = TextNormalizer::default();
    let text = corpus(50).join(". ");
    c.bench_function("tokenize_corpus", |b| b.iter(|| n.terms(&text)));
}

fn bench_build(c: &mut Criterion) {
    let n = TextNormalizer::default();
    let texts = corpus(1_000);
    let docs: Vec<Document> =
        texts.iter().enumerate().map(|(i, t)| Document::from_text(i as DocId + 1, format!("{i}.txt"), t, &n)).collect();
    c.bench_function("build_1k_docs", |b| b.iter(|| build(&docs)));

    let index = build(&docs);
    c.bench_function("evaluate_query", |b| b.iter(|| search("casa & !rua | bola & !gato", &index, &n)));
}

criterion_group!(benches, bench_tokenize, bench_build);
criterion_main!(benches);
