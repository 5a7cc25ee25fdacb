use crate::{
    DISCRIMINATOR_SPACE, Error, RandSource, RandomSinGenerator, SequentialSinGenerator, SinCode,
    SinGenerator, SinPolicy, TagPair, ThreadRandom,
};
use core::cell::Cell;
use std::collections::HashSet;

/// Replays a fixed list of values, repeating the last one forever.
struct ScriptedRand {
    values: Vec<u64>,
    index: Cell<usize>,
}

impl ScriptedRand {
    fn new(values: &[u64]) -> Self {
        Self {
            values: values.to_vec(),
            index: Cell::new(0),
        }
    }

    fn calls(&self) -> usize {
        self.index.get()
    }
}

impl RandSource<u64> for ScriptedRand {
    fn rand(&self) -> u64 {
        let i = self.index.get();
        self.index.set(i + 1);
        self.values[i.min(self.values.len() - 1)]
    }
}

fn code(program: &str, course: &str, discriminator: u64) -> String {
    SinCode::new(TagPair::derive(program, course), discriminator).to_string()
}

fn run_generates_many_unique_codes<G>(generator: G, count: usize, existing: &mut HashSet<String>)
where
    G: SinGenerator,
{
    let seeded: HashSet<String> = existing.clone();
    let mut minted = HashSet::with_capacity(count);

    for _ in 0..count {
        let sin = generator
            .generate_unique("polytechnic", "civil", existing)
            .unwrap()
            .to_string();
        assert!(sin.starts_with("POLY-CIV-"), "unexpected prefix: {sin}");
        assert!(!seeded.contains(&sin), "reissued a pre-existing code: {sin}");
        assert!(minted.insert(sin.clone()), "duplicate code: {sin}");
        existing.insert(sin);
    }
}

fn run_does_not_mutate_existing<G>(generator: G)
where
    G: SinGenerator,
{
    let existing: HashSet<String> = (0..10).map(|d| code("ug", "bca", d)).collect();
    let before = existing.clone();
    let _ = generator.generate_unique("ug", "bca", &existing).unwrap();
    assert_eq!(existing, before);
}

fn run_reports_exhaustion<G>(generator: G, space: u64)
where
    G: SinGenerator,
{
    let existing: HashSet<String> = (0..space).map(|d| code("iti", "fitter", d)).collect();
    let err = generator
        .generate_unique("iti", "fitter", &existing)
        .unwrap_err();
    assert_eq!(
        err,
        Error::Exhausted {
            prefix: "ITI-FIT".into()
        }
    );
}

fn run_other_tag_pairs_do_not_count<G>(generator: G, space: u64)
where
    G: SinGenerator,
{
    // A full ITI-FIT space says nothing about ITI-ELE.
    let existing: HashSet<String> = (0..space).map(|d| code("iti", "fitter", d)).collect();
    let sin = generator
        .generate_unique("iti", "electrician", &existing)
        .unwrap();
    assert_eq!(sin.course_tag(), "ELE");
}

#[test]
fn random_generates_10k_unique_codes_against_10k_synthetic() {
    let mut existing: HashSet<String> = (0..10_000)
        .map(|d| code("polytechnic", "civil", d * 7))
        .collect();
    run_generates_many_unique_codes(RandomSinGenerator::default(), 10_000, &mut existing);
    assert_eq!(existing.len(), 20_000);
}

#[test]
fn sequential_generates_unique_codes_against_growing_set() {
    let mut existing: HashSet<String> = (1..=500)
        .map(|d| code("polytechnic", "civil", d * 3))
        .collect();
    run_generates_many_unique_codes(SequentialSinGenerator::default(), 1_000, &mut existing);
}

#[test]
fn random_does_not_mutate_existing() {
    run_does_not_mutate_existing(RandomSinGenerator::default());
}

#[test]
fn sequential_does_not_mutate_existing() {
    run_does_not_mutate_existing(SequentialSinGenerator::default());
}

#[test]
fn random_reports_exhaustion_instead_of_looping() {
    run_reports_exhaustion(RandomSinGenerator::with_space(ThreadRandom, 4), 4);
}

#[test]
fn sequential_reports_exhaustion_instead_of_looping() {
    run_reports_exhaustion(SequentialSinGenerator::with_space(4), 4);
}

#[test]
fn random_exhaustion_is_per_tag_pair() {
    run_other_tag_pairs_do_not_count(RandomSinGenerator::with_space(ThreadRandom, 4), 4);
}

#[test]
fn sequential_exhaustion_is_per_tag_pair() {
    run_other_tag_pairs_do_not_count(SequentialSinGenerator::with_space(4), 4);
}

#[test]
fn random_uses_first_free_draw() {
    let taken: HashSet<String> = [code("ug", "bca", 5)].into_iter().collect();
    let rng = ScriptedRand::new(&[5, 5, 9]);
    let generator = RandomSinGenerator::new(&rng);

    let sin = generator.generate_unique("ug", "bca", &taken).unwrap();

    assert_eq!(sin.discriminator(), 9);
    assert_eq!(rng.calls(), 3);
}

#[test]
fn random_reduces_draws_into_space() {
    let rng = ScriptedRand::new(&[DISCRIMINATOR_SPACE + 3]);
    let generator = RandomSinGenerator::new(&rng);
    let sin = generator
        .generate_unique("ug", "bca", &HashSet::new())
        .unwrap();
    assert_eq!(sin.discriminator(), 3);
}

#[test]
fn random_walks_after_repeated_collisions() {
    let existing: HashSet<String> = (0..3).map(|d| code("others", "na", d)).collect();
    // every draw lands on 1, which is taken; the walk moves on to 3
    let rng = ScriptedRand::new(&[1]);
    let generator = RandomSinGenerator::new(&rng);

    let sin = generator.generate_unique("others", "na", &existing).unwrap();

    assert_eq!(sin.to_string(), "OTH-NA-00003");
}

#[test]
fn random_walk_wraps_around_the_space() {
    let existing: HashSet<String> = [2, 3].iter().map(|&d| code("iti", "copa", d)).collect();
    let rng = ScriptedRand::new(&[3]);
    let generator = RandomSinGenerator::with_space(&rng, 4);

    let sin = generator.generate_unique("iti", "copa", &existing).unwrap();

    assert_eq!(sin.discriminator(), 0);
}

#[test]
fn sequential_starts_after_issued_count() {
    let generator = SequentialSinGenerator::default();
    let mut existing = HashSet::new();

    let first = generator
        .generate_unique("polytechnic", "mechanical_engineering", &existing)
        .unwrap();
    assert_eq!(first.to_string(), "POLY-ME-00001");
    existing.insert(first.to_string());

    let second = generator
        .generate_unique("polytechnic", "mechanical_engineering", &existing)
        .unwrap();
    assert_eq!(second.to_string(), "POLY-ME-00002");
}

#[test]
fn sequential_skips_taken_discriminators() {
    // one code issued, but slot 2 was imported from elsewhere
    let existing: HashSet<String> = [code("ug", "bca", 2)].into_iter().collect();
    let sin = SequentialSinGenerator::default()
        .generate_unique("ug", "bca", &existing)
        .unwrap();
    assert_eq!(sin.to_string(), "UG-BCA-00003");
}

#[test]
fn non_canonical_codes_do_not_count_as_taken() {
    // "0000O" aliases 0 but is not a canonical spelling; only one slot is taken
    let existing: HashSet<String> = ["ITI-FIT-00000".to_owned(), "ITI-FIT-0000O".to_owned()]
        .into_iter()
        .collect();
    let sin = SequentialSinGenerator::with_space(4)
        .generate_unique("iti", "fitter", &existing)
        .unwrap();
    assert_eq!(sin.discriminator(), 2);
}

#[test]
fn unknown_program_and_course_use_fallback_tags() {
    let sin = RandomSinGenerator::default()
        .generate_unique("medical", "nursing", &HashSet::new())
        .unwrap();
    assert!(sin.to_string().starts_with("GEN-GEN-"));
}

#[test]
fn policy_parses_and_boxes_generators() {
    assert_eq!("random".parse::<SinPolicy>().unwrap(), SinPolicy::Random);
    assert_eq!(" Sequential ".parse::<SinPolicy>().unwrap(), SinPolicy::Sequential);
    assert!("fibonacci".parse::<SinPolicy>().is_err());

    let generator = SinPolicy::Sequential.generator();
    let sin = generator
        .generate_unique("ug", "bca", &HashSet::new())
        .unwrap();
    assert_eq!(sin.to_string(), "UG-BCA-00001");
}
