use criterion::{Criterion, black_box, criterion_group, criterion_main};
use augrex::{Pattern, SearchTarget, split, replace};

fn bench_compile(c: &mut Criterion) {
    let source = r"(?x)
        (?<user> [\w.%+-]+ )   # local part
        @
        (?<host> [\w.-]+ \. [a-z]{2,} )";

    c.bench_function("compile_free_spacing", |b| {
        b.iter(|| black_box(Pattern::new(black_box(source), "i").unwrap()))
    });
}

fn bench_named_backreference(c: &mut Criterion) {
    let pattern = Pattern::new(r"(?<word>\w+) is \k<word>", "").unwrap();
    let input = "John is John and Jane is Jane";

    c.bench_function("named_backref_match", |b| {
        b.iter(|| black_box(pattern.exec(black_box(input)).unwrap()))
    });
}

fn bench_find_all(c: &mut Criterion) {
    let pattern = Pattern::new(r"\d+", "g").unwrap();
    let input = "abc 123 def 456 ghi 789 jkl 012 mno 345 pqr 678 stu 901";

    c.bench_function("find_all_numbers", |b| {
        b.iter(|| black_box(pattern.matches(black_box(input)).count()))
    });
}

fn bench_replace_named(c: &mut Criterion) {
    let pattern = Pattern::new(r"(?<first>\w+)\s(?<last>\w+)", "g").unwrap();
    let input = "John Smith, Jane Doe, Alan Turing, Grace Hopper";

    c.bench_function("replace_named_template", |b| {
        b.iter(|| {
            black_box(
                replace(
                    black_box(input),
                    SearchTarget::Pattern(&pattern),
                    "${last} ${first}".into(),
                    None,
                )
                .unwrap(),
            )
        })
    });
}

fn bench_split(c: &mut Criterion) {
    let pattern = Pattern::new(r"\s*(?<sep>[,;])\s*", "").unwrap();
    let input = "alpha, beta; gamma ,delta;epsilon , zeta";

    c.bench_function("split_captured_delimiter", |b| {
        b.iter(|| black_box(split(black_box(input), &pattern, None).unwrap()))
    });
}

criterion_group!(
    benches,
    bench_compile,
    bench_named_backreference,
    bench_find_all,
    bench_replace_named,
    bench_split,
);

criterion_main!(benches);
