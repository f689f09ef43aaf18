//! Fair multiplexing of several finite sources into one stream.
//!
//! [`FairMux`] either drains its sources one after another or, in random
//! mode, picks a source uniformly among those that still have elements at
//! every step. A source with many elements left is no more likely to be
//! picked than one with a single element left.

use std::fmt;
use std::iter::Peekable;

use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::domain::{Domain, DomainIter, Order};

/// Combined stream over a fixed collection of sources.
pub struct FairMux<I: Iterator, R = StdRng> {
    /// Sources with at least one element left, in construction order
    /// until the first random removal.
    active: Vec<Peekable<I>>,
    interleave: Order,
    rng: R,
}

impl<I: Iterator, R: Rng> FairMux<I, R> {
    /// Combine `sources`: one after another for [`Order::Natural`], fairly
    /// interleaved for [`Order::Random`]. Empty sources are dropped here.
    pub fn new(sources: impl IntoIterator<Item = I>, interleave: Order, rng: R) -> Self {
        let active = sources
            .into_iter()
            .map(Iterator::peekable)
            .filter_map(|mut source| if source.peek().is_some() { Some(source) } else { None })
            .collect();

        FairMux { active, interleave, rng }
    }

    /// Number of sources not yet exhausted.
    pub fn active(&self) -> usize {
        self.active.len()
    }

    pub fn interleave(&self) -> Order {
        self.interleave
    }
}

impl<I: Iterator, R: Rng> Iterator for FairMux<I, R> {
    type Item = I::Item;

    fn next(&mut self) -> Option<I::Item> {
        if self.active.is_empty() {
            return None;
        }

        let index = match self.interleave {
            Order::Natural => 0,
            Order::Random => self.rng.gen_range(0..self.active.len()),
        };

        let source = &mut self.active[index];
        let item = source.next();

        if source.peek().is_none() {
            let exhausted = match self.interleave {
                Order::Natural => self.active.remove(index),
                Order::Random => self.active.swap_remove(index),
            };
            drop(exhausted);
        }

        item
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.active.iter().fold((0, Some(0)), |(low, high), source| {
            let (source_low, source_high) = source.size_hint();
            let high = match (high, source_high) {
                (Some(high), Some(source_high)) => high.checked_add(source_high),
                _ => None,
            };
            (low.saturating_add(source_low), high)
        })
    }
}

impl<I: Iterator, R> fmt::Debug for FairMux<I, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FairMux")
            .field("active", &self.active.len())
            .field("interleave", &self.interleave)
            .finish()
    }
}

/// Combine domains into one stream.
///
/// Each domain is walked in its own [`Order`]; `interleave` decides how the
/// walks are combined. Per-domain generators are seeded from `rng`, so one
/// seeded generator reproduces the whole enumeration.
pub fn fair_mux<'a, D, R>(
    domains: impl IntoIterator<Item = (&'a D, Order)>,
    interleave: Order,
    mut rng: R,
) -> FairMux<DomainIter<'a, D, R>, R>
where
    D: Domain + ?Sized + 'a,
    R: Rng + SeedableRng,
{
    let sources: Vec<_> = domains
        .into_iter()
        .map(|(domain, order)| DomainIter::new(domain, order, R::seed_from_u64(rng.gen())))
        .collect();

    debug!("Multiplexing {} domains with {:?} interleave", sources.len(), interleave);

    FairMux::new(sources, interleave, rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn seeded(seed: u64) -> StdRng {
        StdRng::seed_from_u64(seed)
    }

    #[test]
    fn test_sequential_two_domains() {
        let a = vec!["A0", "A1"];
        let b = vec!["B0", "B1", "B2"];
        let combined: Vec<&str> =
            fair_mux([(&a, Order::Natural), (&b, Order::Natural)], Order::Natural, seeded(0)).collect();
        assert_eq!(combined, vec!["A0", "A1", "B0", "B1", "B2"]);
    }

    #[test]
    fn test_random_interleave_two_domains() {
        let a = vec!["A0", "A1"];
        let b = vec!["B0", "B1", "B2"];

        for seed in 0..50 {
            let combined: Vec<&str> =
                fair_mux([(&a, Order::Natural), (&b, Order::Natural)], Order::Random, seeded(seed)).collect();
            assert_eq!(combined.len(), 5);

            let unique: HashSet<&str> = combined.iter().copied().collect();
            assert_eq!(unique, ["A0", "A1", "B0", "B1", "B2"].into_iter().collect::<HashSet<_>>());

            let position = |name: &str| combined.iter().position(|&item| item == name).unwrap();
            assert!(position("A0") < position("A1"));
            assert!(position("B0") < position("B1") && position("B1") < position("B2"));
        }
    }

    #[test]
    fn test_sequential_keeps_domains_contiguous() {
        let first: Vec<u32> = (0..6).collect();
        let second: Vec<u32> = (100..104).collect();
        let combined: Vec<u32> =
            fair_mux([(&first, Order::Random), (&second, Order::Random)], Order::Natural, seeded(4)).collect();

        assert_eq!(combined.len(), 10);
        assert!(combined[..6].iter().all(|value| *value < 100));
        assert!(combined[6..].iter().all(|value| *value >= 100));
    }

    #[test]
    fn test_pick_ignores_remaining_size() {
        let small = vec![0u32];
        let large: Vec<u32> = (1..1001).collect();

        let mut small_first = 0;
        for seed in 0..2000 {
            let mut mux = fair_mux([(&small, Order::Natural), (&large, Order::Natural)], Order::Random, seeded(seed));
            if mux.next() == Some(0) {
                small_first += 1;
            }
        }

        // Expected 1000 with a standard deviation of about 22.
        assert!((850..=1150).contains(&small_first), "small domain first {} times", small_first);
    }

    #[test]
    fn test_empty_sources_dropped() {
        let mux = FairMux::new(vec![0..3, 10..10, 20..22], Order::Random, seeded(1));
        assert_eq!(mux.active(), 2);
        assert_eq!(mux.size_hint(), (5, Some(5)));

        let mut values: Vec<i32> = mux.collect();
        values.sort_unstable();
        assert_eq!(values, vec![0, 1, 2, 20, 21]);
    }

    #[test]
    fn test_active_shrinks_to_zero() {
        let mut mux = FairMux::new(vec![0..1, 5..7], Order::Natural, seeded(2));
        assert_eq!(mux.active(), 2);
        assert_eq!(mux.next(), Some(0));
        assert_eq!(mux.active(), 1);
        assert_eq!(mux.by_ref().collect::<Vec<_>>(), vec![5, 6]);
        assert_eq!(mux.active(), 0);
        assert_eq!(mux.next(), None);
    }

    #[test]
    fn test_random_mode_drops_exhausted_sources() {
        let mut mux = FairMux::new(vec![0..1, 5..6, 9..12], Order::Random, seeded(6));
        let mut seen = 0;
        while mux.next().is_some() {
            seen += 1;
            assert_eq!(mux.size_hint().0, 5 - seen);
            assert!(mux.active() <= 5 - seen);
        }
        assert_eq!(seen, 5);
        assert_eq!(mux.active(), 0);
    }

    #[test]
    fn test_no_sources() {
        let mut mux = FairMux::new(Vec::<std::ops::Range<u8>>::new(), Order::Random, seeded(3));
        assert_eq!(mux.next(), None);
        assert_eq!(mux.size_hint(), (0, Some(0)));
    }
}
