use rand::rngs::StdRng;
use rand::SeedableRng;

/// Where phrase selection draws its randomness from.
///
/// `Seeded` hands out a fresh generator with the same seed on every call, so
/// identical inputs produce identical narratives.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RandomSource {
    #[default]
    Entropy,
    Seeded(u64),
}

impl RandomSource {
    pub fn from_seed(seed: Option<u64>) -> Self {
        seed.map_or(RandomSource::Entropy, RandomSource::Seeded)
    }

    pub fn rng(&self) -> StdRng {
        match self {
            RandomSource::Entropy => StdRng::from_os_rng(),
            RandomSource::Seeded(seed) => StdRng::seed_from_u64(*seed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn seeded_source_repeats() {
        let source = RandomSource::from_seed(Some(42));
        let a: u64 = source.rng().random();
        let b: u64 = source.rng().random();
        assert_eq!(a, b);
    }

    #[test]
    fn no_seed_means_entropy() {
        assert_eq!(RandomSource::from_seed(None), RandomSource::Entropy);
    }
}
