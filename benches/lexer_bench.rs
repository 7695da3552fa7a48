use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use lisplet::lexer::tokenize;

// A reasonably complex input string for benchmarking
const BENCH_INPUT: &str = r#"
(begin
  (define square (lambda (x) (* x x)))
  (define cube (lambda (x) (* x (square x))))
  (define hypot (lambda (a b) (sqrt (+ (square a) (square b)))))
  (define sum-of-cubes (lambda (a b c) (+ (cube a) (+ (cube b) (cube c)))))
  (define average (lambda (a b) (/ (+ a b) 2)))
  (define choose-twice (lambda (n r) (* 2 (ncr n r))))
  (begin
    (square 12)
    (cube -3)
    (hypot 3 4)
    (sum-of-cubes 1 2 3)
    (average 10.5 -2.25)
    (choose-twice 10 4)
    (mean 1 2 3 4 5 6 7 8 9 10)
    (variance 2 4 4 4 5 5 7 9)
    (stddev 2 4 4 4 5 5 7 9)
    (factorial 12)
    (npr 10 3)
    (pow 2 16)
    (floor 9.81)
    (ceil 2.718)
    (sin 0.5)
    (cos 0.5)
    (tan 0.5)))
"#;

fn bench_tokenizer(c: &mut Criterion) {
    let mut group = c.benchmark_group("Tokenizer");

    group.bench_with_input(
        BenchmarkId::new("tokenize", "nested_program"),
        &BENCH_INPUT,
        |b, input| b.iter(|| tokenize(black_box(input))),
    );

    group.finish();
}

criterion_group!(benches, bench_tokenizer);
criterion_main!(benches);
