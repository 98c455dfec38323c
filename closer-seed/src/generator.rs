//! Synthetic sales tasks for when no snapshot is available.
//!
//! Deterministic for a given seed and `now`, so demos and tests are reproducible.

use chrono::{DateTime, Duration, Utc};
use closer_core::{Priority, Task, TaskStatus};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Default size of a generated collection.
pub const DEFAULT_SEED_COUNT: usize = 50;

const ACTIONS: &[&str] = &[
    "Follow up with",
    "Discovery call with",
    "Send proposal to",
    "Demo for",
    "Negotiate renewal with",
    "Qualify lead at",
    "Prepare quote for",
    "Onboarding kickoff with",
    "Upsell review with",
    "Close contract with",
];

const ACCOUNTS: &[&str] = &[
    "Acme Corp",
    "Globex",
    "Initech",
    "Umbrella Health",
    "Stark Logistics",
    "Wayne Retail",
    "Hooli",
    "Soylent Foods",
    "Vandelay Imports",
    "Tyrell Systems",
    "Cyberdyne",
    "Wonka Industries",
];

const NOTES: &[&str] = &[
    "Decision maker is the VP of Sales",
    "Budget approved for next quarter",
    "Waiting on legal review",
    "Asked for a case study",
    "Competitor pricing came in lower",
];

/// Seeded when `seed` is set, otherwise drawn from the thread RNG.
pub fn generate(count: usize, seed: Option<u64>, now: DateTime<Utc>) -> Vec<Task> {
    match seed {
        Some(seed) => generate_seeded(count, seed, now),
        None => generate_sales_tasks(count, &mut rand::thread_rng(), now),
    }
}

/// Generate `count` tasks using a seeded RNG.
pub fn generate_seeded(count: usize, seed: u64, now: DateTime<Utc>) -> Vec<Task> {
    let mut rng = StdRng::seed_from_u64(seed);
    generate_sales_tasks(count, &mut rng, now)
}

pub fn generate_sales_tasks<R: Rng>(count: usize, rng: &mut R, now: DateTime<Utc>) -> Vec<Task> {
    (0..count).map(|_| generate_one(&mut *rng, now)).collect()
}

fn generate_one<R: Rng>(rng: &mut R, now: DateTime<Utc>) -> Task {
    let action = ACTIONS[rng.gen_range(0..ACTIONS.len())];
    let account = ACCOUNTS[rng.gen_range(0..ACCOUNTS.len())];

    let priority = match rng.gen_range(0..10) {
        0..=2 => Priority::High,
        3..=6 => Priority::Medium,
        _ => Priority::Low,
    };
    let status = match rng.gen_range(0..10) {
        0..=3 => TaskStatus::Todo,
        4..=6 => TaskStatus::InProgress,
        _ => TaskStatus::Done,
    };

    // Whole currency units, half-hour granularity.
    let revenue = rng.gen_range(100..=20_000) as f64;
    let time_taken = rng.gen_range(1..=80) as f64 / 2.0;

    let created_at = now - Duration::minutes(rng.gen_range(60..=60 * 24 * 60));
    let completed_at = (status == TaskStatus::Done)
        .then(|| created_at + Duration::minutes(rng.gen_range(30..=60 * 72)))
        .map(|t| t.min(now));

    let notes = rng
        .gen_bool(0.3)
        .then(|| NOTES[rng.gen_range(0..NOTES.len())].to_string());

    Task {
        id: uuid::Builder::from_random_bytes(rng.r#gen()).into_uuid().to_string(),
        title: format!("{action} {account}"),
        revenue,
        time_taken,
        priority,
        status,
        notes,
        created_at,
        completed_at,
    }
}
