use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::Delay;
use crate::error::CrawlError;

/// Draws the wait applied before every fetch, uniformly within bounds
#[derive(Debug, Clone)]
pub struct Politeness {
    min: Duration,
    max: Duration,
    rng: StdRng,
}

impl Politeness {
    pub fn new(delay: &Delay, seed: Option<u64>) -> Result<Self, CrawlError> {
        let (min, max) = delay.bounds()?;
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(Self { min, max, rng })
    }

    pub fn next_delay(&mut self) -> Duration {
        if self.max <= self.min {
            return self.min;
        }
        let secs = self
            .rng
            .gen_range(self.min.as_secs_f64()..=self.max.as_secs_f64());
        Duration::from_secs_f64(secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delays_stay_within_bounds() {
        let mut politeness = Politeness::new(&Delay { min: 2.0, max: 5.0 }, None).unwrap();
        for _ in 0..1000 {
            let delay = politeness.next_delay();
            assert!(delay >= Duration::from_secs(2), "{delay:?}");
            assert!(delay <= Duration::from_secs(5), "{delay:?}");
        }
    }

    #[test]
    fn fixed_seed_repeats_the_sequence() {
        let delay = Delay { min: 0.5, max: 1.5 };
        let mut one = Politeness::new(&delay, Some(42)).unwrap();
        let mut two = Politeness::new(&delay, Some(42)).unwrap();
        for _ in 0..20 {
            assert_eq!(one.next_delay(), two.next_delay());
        }
    }

    #[test]
    fn overflowing_bound_is_an_error() {
        let delay = Delay { min: 0.0, max: 1e30 };
        assert!(matches!(
            Politeness::new(&delay, None),
            Err(CrawlError::Config(_))
        ));
    }

    #[test]
    fn degenerate_range_is_constant() {
        let mut politeness = Politeness::new(&Delay::none(), None).unwrap();
        assert_eq!(politeness.next_delay(), Duration::ZERO);
    }
}
