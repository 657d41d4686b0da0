use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use sgnl_core::{
    BoilerplateExtractor, DomainReputationResolver, ExtractConfig, LexicalDensityScorer, ScoreContext, SignalConfig,
    SignalPipeline, StructuralHeuristicScorer,
};

const FIXTURES: [&str; 3] = ["code_walkthrough.html", "technical_article.html", "affiliate_spam.html"];

fn load(name: &str) -> String {
    std::fs::read_to_string(format!("../../tests/fixtures/{}", name)).unwrap()
}

fn bench_heuristics(c: &mut Criterion) {
    let scorer = StructuralHeuristicScorer::from_config(&SignalConfig::default()).unwrap();
    let mut group = c.benchmark_group("heuristics");

    for name in FIXTURES {
        let html = load(name);
        group.bench_with_input(BenchmarkId::from_parameter(name), &html, |b, html| {
            b.iter(|| scorer.score(black_box(html), Some("rust example")))
        });
    }

    group.finish();
}

fn bench_extraction(c: &mut Criterion) {
    let extractor = BoilerplateExtractor::new(ExtractConfig::default());
    let html = load("technical_article.html");

    c.bench_function("extract_primary", |b| b.iter(|| extractor.extract(black_box(&html), false)));
    c.bench_function("extract_force_deep", |b| b.iter(|| extractor.extract(black_box(&html), true)));
}

fn bench_density(c: &mut Criterion) {
    let scorer = LexicalDensityScorer::from_config(&SignalConfig::default()).unwrap();
    let text = BoilerplateExtractor::new(ExtractConfig::default())
        .extract(&load("technical_article.html"), false)
        .text;

    c.bench_function("density", |b| b.iter(|| scorer.score(black_box(&text))));
}

fn bench_reputation(c: &mut Criterion) {
    let resolver = DomainReputationResolver::default();

    c.bench_function("resolve_url", |b| {
        b.iter(|| resolver.resolve_url(black_box("https://cs.stanford.edu/people/someone/notes.html")))
    });
}

fn bench_full_pipeline(c: &mut Criterion) {
    let pipeline = SignalPipeline::new(&SignalConfig::default()).unwrap();
    let html = load("code_walkthrough.html");
    let context = ScoreContext::default();

    c.bench_function("score_html", |b| {
        b.iter(|| pipeline.score_html(black_box(&html), Some("https://github.com/x/y"), &context))
    });
}

criterion_group!(
    benches,
    bench_heuristics,
    bench_extraction,
    bench_density,
    bench_reputation,
    bench_full_pipeline
);
criterion_main!(benches);
