//! Indexable domains and per-domain iteration.
//!
//! A [`Domain`] is anything with a size and an index-to-element mapping: a
//! network's address space or a plain slice. [`DomainIter`] walks one domain
//! either in index order or through a [`RangeSampler`] over its indices.

use std::ops::Range;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::range::RangeSampler;

/// Visiting order for a domain, or for a set of domains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Order {
    /// Index order, or domain-by-domain when combining.
    #[default]
    Natural,
    /// Uniformly random permutation, or fair random interleaving when combining.
    Random,
}

impl Order {
    pub fn from_flag(random: bool) -> Self {
        if random {
            Order::Random
        } else {
            Order::Natural
        }
    }

    pub fn is_random(self) -> bool {
        self == Order::Random
    }
}

/// Finite indexable collection.
///
/// `at` is only called with indices in `[0, count())`.
pub trait Domain {
    type Element;

    fn count(&self) -> u128;

    fn at(&self, index: u128) -> Self::Element;
}

impl<T: Clone> Domain for [T] {
    type Element = T;

    fn count(&self) -> u128 {
        self.len() as u128
    }

    fn at(&self, index: u128) -> T {
        self[index as usize].clone()
    }
}

impl<T: Clone> Domain for Vec<T> {
    type Element = T;

    fn count(&self) -> u128 {
        <[T] as Domain>::count(self)
    }

    fn at(&self, index: u128) -> T {
        <[T] as Domain>::at(self, index)
    }
}

impl<D: Domain + ?Sized> Domain for &D {
    type Element = D::Element;

    fn count(&self) -> u128 {
        (**self).count()
    }

    fn at(&self, index: u128) -> D::Element {
        (**self).at(index)
    }
}

#[derive(Debug, Clone)]
enum Indices<R> {
    Natural(Range<u128>),
    Random(RangeSampler<R>),
}

/// Iterator over the elements of one domain.
#[derive(Debug, Clone)]
pub struct DomainIter<'a, D: ?Sized, R = StdRng> {
    domain: &'a D,
    indices: Indices<R>,
}

impl<'a, D: Domain + ?Sized, R: Rng> DomainIter<'a, D, R> {
    /// Walk `domain` in `order`. An empty domain yields nothing in either order.
    pub fn new(domain: &'a D, order: Order, rng: R) -> Self {
        let count = domain.count();
        let indices = match order {
            Order::Natural => Indices::Natural(0..count),
            // Only an empty domain fails here, and it has nothing to yield.
            Order::Random => RangeSampler::up_to(count, rng).map_or(Indices::Natural(0..0), Indices::Random),
        };

        DomainIter { domain, indices }
    }
}

impl<D: Domain + ?Sized, R: Rng> Iterator for DomainIter<'_, D, R> {
    type Item = D::Element;

    fn next(&mut self) -> Option<D::Element> {
        let index = match &mut self.indices {
            Indices::Natural(range) => range.next()?,
            Indices::Random(sampler) => sampler.next()?,
        };
        Some(self.domain.at(index))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match &self.indices {
            Indices::Natural(range) => range.size_hint(),
            Indices::Random(sampler) => sampler.size_hint(),
        }
    }
}

/// Elements of `domain` in random order, using an entropy-seeded generator.
pub fn shuffled<D: Domain + ?Sized>(domain: &D) -> DomainIter<'_, D, StdRng> {
    DomainIter::new(domain, Order::Random, StdRng::from_entropy())
}

/// Elements of `domain` in random order, drawn from `rng`.
pub fn shuffled_with<D: Domain + ?Sized, R: Rng>(domain: &D, rng: R) -> DomainIter<'_, D, R> {
    DomainIter::new(domain, Order::Random, rng)
}
