//! Dice rolls and random draws shared by combat resolution and the quest policy.
//!
//! Every function takes the RNG explicitly so callers can seed it.

use rand::seq::SliceRandom;
use rand::Rng;

/// Roll `count` dice with `sides` faces and add `modifier` (e.g. 1d20+2).
pub fn roll_dice(sides: u32, count: u32, modifier: i32, rng: &mut impl Rng) -> i32 {
    let sides = sides.max(1);
    let total: i32 = (0..count).map(|_| rng.gen_range(1..=sides) as i32).sum();
    let result = total + modifier;
    tracing::debug!("Dice roll: {}d{}{:+} = {}", count, sides, modifier, result);
    result
}

/// D&D style modifier: +0 at 10 strength, +1 per two points above.
pub fn strength_modifier(strength: i32) -> i32 {
    strength.div_euclid(2) - 5
}

/// Pick one item uniformly. Returns None for an empty slice.
pub fn choose_uniform<'a, T>(items: &'a [T], rng: &mut impl Rng) -> Option<&'a T> {
    items.choose(rng)
}

/// Weighted categorical draw over `(item, weight)` pairs.
///
/// Zero-weight entries are never drawn. Returns None if the slice is empty or
/// every weight is zero.
pub fn choose_weighted<T: Copy>(weighted: &[(T, u32)], rng: &mut impl Rng) -> Option<T> {
    weighted
        .choose_weighted(rng, |(_, weight)| *weight)
        .ok()
        .map(|(item, _)| *item)
}

/// Bernoulli trial with the given probability.
pub fn roll_chance(probability: f64, rng: &mut impl Rng) -> bool {
    rng.gen::<f64>() < probability
}
