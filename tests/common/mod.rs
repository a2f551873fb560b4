use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;
use ticketassist::tickets::{TicketGenerator, TicketRecord};

/// Generate a reproducible batch as a list, in key order of the batch map
#[allow(dead_code)]
pub fn seeded_batch(count: usize, seed: u64) -> Vec<TicketRecord> {
    let mut rng = StdRng::seed_from_u64(seed);
    TicketGenerator::default()
        .generate_with_rng(count, &mut rng)
        .expect("failed to generate tickets")
        .into_values()
        .collect()
}

#[allow(dead_code)]
pub fn temp_config_file(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(&config_path, contents).expect("failed to write config file");
    (temp_dir, config_path)
}
