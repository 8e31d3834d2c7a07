// Criterion benchmarks for Mentor Match

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use mentor_match::core::{CompatibilityScorer, MatchBreakdown, Ranker, DEFAULT_THRESHOLD, DEFAULT_TOP_N};
use mentor_match::models::{Personality, Profile, Role};

const INTERESTS: [&str; 8] = [
    "cooking", "reading", "travel", "chess", "gardening", "music", "history", "hiking",
];

fn create_profile(id: usize) -> Profile {
    let role = if id % 2 == 0 { Role::Mentor } else { Role::Seeker };
    let interests: Vec<&str> = INTERESTS.iter().skip(id % 5).take(1 + id % 4).copied().collect();
    let base = (id % 11) as f64;

    Profile::new(format!("user-{}", id), role)
        .with_interests(interests)
        .with_personality(Personality::new(base, 10.0 - base, (base + 3.0) % 10.0, 5.0))
        .with_location(if id % 3 == 0 { "Berkeley, CA" } else { "Oakland, CA" })
}

fn bench_score_pair(c: &mut Criterion) {
    let scorer = CompatibilityScorer::default();
    let a = create_profile(0);
    let b = create_profile(1);

    c.bench_function("score_pair", |bench| {
        bench.iter(|| scorer.score(black_box(&a), black_box(&b)));
    });
}

fn bench_breakdown(c: &mut Criterion) {
    let a = create_profile(2);
    let b = create_profile(7);

    c.bench_function("explain_pair", |bench| {
        bench.iter(|| MatchBreakdown::explain(black_box(&a), black_box(&b)));
    });
}

fn bench_ranking(c: &mut Criterion) {
    let ranker = Ranker::default();
    let subject = create_profile(0);

    let mut group = c.benchmark_group("ranking");

    for candidate_count in [10, 100, 1000, 5000].iter() {
        let candidates: Vec<Profile> = (1..=*candidate_count).map(create_profile).collect();

        group.bench_with_input(
            BenchmarkId::new("rank", candidate_count),
            candidate_count,
            |bench, _| {
                bench.iter(|| {
                    ranker.rank(
                        black_box(&subject),
                        black_box(&candidates),
                        DEFAULT_THRESHOLD,
                        DEFAULT_TOP_N,
                    )
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_score_pair, bench_breakdown, bench_ranking);

criterion_main!(benches);
