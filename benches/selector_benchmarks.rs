use criterion::{Criterion, black_box, criterion_group, criterion_main};
use rand::SeedableRng;
use rand::rngs::SmallRng;

use kanadrill::dataset::{BundledDatasets, DatasetProvider};
use kanadrill::engine::judge::evaluate_text;
use kanadrill::engine::pool::{Pool, PromptItem};
use kanadrill::engine::selector::{build_choice_set, pick_next};

fn make_pool(size: usize) -> Pool {
    let items = (0..size).map(|i| {
        PromptItem::new(format!("k{i}"), [format!("answer {i}"), format!("alt {i}")])
            .expect("generated items have answers")
    });
    Pool::new(items).expect("generated pool is non-empty")
}

fn bench_pick_next(c: &mut Criterion) {
    let mut rng = SmallRng::seed_from_u64(7);

    let pair = make_pool(2);
    c.bench_function("pick_next (2 items, excluding one)", |b| {
        b.iter(|| pick_next(black_box(&pair), Some("k0"), &mut rng))
    });

    let large = make_pool(2_000);
    c.bench_function("pick_next (2000 items, excluding one)", |b| {
        b.iter(|| pick_next(black_box(&large), Some("k0"), &mut rng))
    });
}

fn bench_choice_set(c: &mut Criterion) {
    let mut rng = SmallRng::seed_from_u64(7);
    let datasets = BundledDatasets::load(None).expect("bundled datasets parse");
    let ids: Vec<String> = datasets.group_ids().iter().map(|s| s.to_string()).collect();
    let pool = datasets.pool(&ids).expect("bundled pool is non-empty");
    let correct = pool.items()[0].clone();

    c.bench_function("build_choice_set (all bundled groups, 3 distractors)", |b| {
        b.iter(|| build_choice_set(black_box(&pool), &correct, 3, &mut rng))
    });
}

fn bench_judge(c: &mut Criterion) {
    let accepted = vec!["good afternoon".to_string(), "hello".to_string()];

    c.bench_function("evaluate_text (normalized hit)", |b| {
        b.iter(|| evaluate_text(black_box("  Hello "), &accepted))
    });
}

criterion_group!(benches, bench_pick_next, bench_choice_set, bench_judge);
criterion_main!(benches);
