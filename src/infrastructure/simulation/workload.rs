//! Workload sampling for simulated clients

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::domain::{CategoryKey, DomainError, ImageIdentity};

/// Shape of one simulated client run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulationWorkload {
    pub num_categories: usize,
    pub num_images: usize,
}

impl SimulationWorkload {
    pub fn new(num_categories: usize, num_images: usize) -> Self {
        Self {
            num_categories,
            num_images,
        }
    }
}

/// One client's request sequence, replayed once per cache mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trial {
    pub list_index: usize,
    pub client_id: usize,
    pub workload: SimulationWorkload,
    pub images: Vec<ImageIdentity>,
}

/// Category with its images, as seen by the sampler
pub type CategoryImages = (CategoryKey, Vec<ImageIdentity>);

/// Deterministic per-trial RNG so results do not depend on scheduling
pub fn trial_rng(seed: u64, list_index: usize, client_id: usize) -> StdRng {
    let slot = ((list_index as u64) << 32) | (client_id as u64 & 0xFFFF_FFFF);
    StdRng::seed_from_u64(seed ^ slot.wrapping_mul(0x9E37_79B9_7F4A_7C15))
}

/// Picks `num_categories` distinct categories, then `num_images` images with
/// replacement from their union
pub fn sample_images<R: Rng + ?Sized>(
    rng: &mut R,
    categories: &[CategoryImages],
    workload: SimulationWorkload,
) -> Result<Vec<ImageIdentity>, DomainError> {
    if workload.num_categories > categories.len() {
        return Err(DomainError::validation(format!(
            "Workload wants {} categories but only {} exist",
            workload.num_categories,
            categories.len()
        )));
    }

    let pool: Vec<&ImageIdentity> = categories
        .choose_multiple(rng, workload.num_categories)
        .flat_map(|(_, images)| images.iter())
        .collect();

    if pool.is_empty() {
        return if workload.num_images == 0 {
            Ok(Vec::new())
        } else {
            Err(DomainError::validation(
                "Sampled categories contain no images",
            ))
        };
    }

    Ok((0..workload.num_images)
        .filter_map(|_| pool.choose(rng).map(|id| (*id).clone()))
        .collect())
}
