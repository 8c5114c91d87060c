use chrono::{TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use glosor_core::catalogue::Catalogue;
use glosor_core::model::{CandidateRow, PartOfSpeech, WordCategory};
use glosor_core::sampler::sample_inflections;
use glosor_core::selector::select;

/// `groups` word groups of four inflections, each with up to 20 marks.
fn make_catalogue(groups: i64) -> Catalogue {
    let mut rng = ChaCha8Rng::seed_from_u64(0);
    let mut rows = Vec::new();
    for group in 0..groups {
        for form in 0..4 {
            let id = group * 4 + form;
            let base = CandidateRow {
                inflection_id: id,
                group_id: group,
                source_text: format!("ord{id}"),
                target_text: format!("word{id}"),
                part_of_speech: PartOfSpeech::Noun,
                word_category: WordCategory::General,
                grammar_hint: None,
                context_hint: None,
                link: None,
                mark: None,
                mark_timestamp: None,
            };
            let marks = rng.gen_range(0..20);
            if marks == 0 {
                rows.push(base);
                continue;
            }
            for i in 0..marks {
                let mut row = base.clone();
                row.mark = Some(rng.gen_range(0..=1));
                row.mark_timestamp = Utc.timestamp_opt(1_700_000_000 + i * 60, 0).single();
                rows.push(row);
            }
        }
    }
    Catalogue::from_rows(rows)
}

fn bench_sampling(c: &mut Criterion) {
    let mut group = c.benchmark_group("sample_inflections");

    for size in [100, 2_000] {
        let catalogue = make_catalogue(size);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        group.bench_function(format!("groups={size}"), |b| {
            b.iter(|| sample_inflections(black_box(&catalogue), &mut rng))
        });
    }

    group.finish();
}

fn bench_selection(c: &mut Criterion) {
    let mut group = c.benchmark_group("select");

    for size in [100, 2_000] {
        let catalogue = make_catalogue(size);
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let statistics = sample_inflections(&catalogue, &mut rng);
        group.bench_function(format!("groups={size},target=15"), |b| {
            b.iter(|| select(black_box(&statistics), black_box(15), &mut rng))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_sampling, bench_selection);
criterion_main!(benches);
