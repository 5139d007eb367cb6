//! Deterministic string hashing and seeded pseudo-random streams.
//!
//! Every generator in the crate draws from a `SeededRandom` built from a
//! string seed. Independent concerns derive their own stream with
//! `SeededRandom::derived(base, discriminator)`, which hashes
//! `"{base}:{discriminator}"`, so adding draws to one concern never shifts
//! the output of another.

use std::fmt::Display;

const FNV_OFFSET_BASIS: u32 = 2_166_136_261;
const FNV_PRIME: u32 = 16_777_619;
const MULBERRY_INCREMENT: u32 = 0x6D2B_79F5;
const TWO_POW_32: f64 = 4_294_967_296.0;

/// FNV-1a over the UTF-16 code units of `input`.
pub fn hash_string(input: &str) -> u32 {
    input.encode_utf16().fold(FNV_OFFSET_BASIS, |hash, unit| {
        (hash ^ u32::from(unit)).wrapping_mul(FNV_PRIME)
    })
}

/// `hash_string` rendered as eight lowercase hex digits.
pub fn hash_hex(input: &str) -> String {
    format!("{:08x}", hash_string(input))
}

const BASE36_DIGITS: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Six-character upper-case base-36 digest of `hash_string(payload)`,
/// zero-padded on the left and cut to the first six digits.
pub fn make_checksum(payload: &str) -> String {
    let mut value = hash_string(payload);
    let mut digits = Vec::new();
    loop {
        digits.push(char::from(BASE36_DIGITS[(value % 36) as usize]));
        value /= 36;
        if value == 0 {
            break;
        }
    }
    let encoded: String = digits.into_iter().rev().collect();
    format!("{encoded:0>6}").chars().take(6).collect()
}

pub fn derive_seed(base: &str, discriminator: impl Display) -> String {
    format!("{base}:{discriminator}")
}

#[derive(Clone, Debug)]
pub struct SeededRandom {
    state: u32,
}

impl SeededRandom {
    pub fn new(seed: &str) -> Self {
        let state = match hash_string(seed) {
            0 => 1,
            hashed => hashed,
        };
        Self { state }
    }

    pub fn derived(base: &str, discriminator: impl Display) -> Self {
        Self::new(&derive_seed(base, discriminator))
    }

    pub fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_add(MULBERRY_INCREMENT);
        let mut value = self.state;
        value = (value ^ (value >> 15)).wrapping_mul(value | 1);
        value ^= value.wrapping_add((value ^ (value >> 7)).wrapping_mul(value | 61));
        value ^ (value >> 14)
    }

    /// Uniform float in `[0, 1)`.
    pub fn next(&mut self) -> f64 {
        f64::from(self.next_u32()) / TWO_POW_32
    }

    /// Uniform integer in `[min, max_inclusive]`.
    pub fn next_int(&mut self, min: i64, max_inclusive: i64) -> i64 {
        debug_assert!(min <= max_inclusive);
        let span = (max_inclusive - min + 1) as f64;
        (self.next() * span).floor() as i64 + min
    }

    pub fn next_index(&mut self, len: usize) -> usize {
        debug_assert!(len > 0);
        self.next_int(0, len as i64 - 1) as usize
    }

    pub fn pick<'a, T>(&mut self, values: &'a [T]) -> Option<&'a T> {
        if values.is_empty() {
            return None;
        }
        let index = self.next_index(values.len());
        values.get(index)
    }

    /// Fisher-Yates from the back, one draw per swap.
    pub fn shuffle<T>(&mut self, values: &mut [T]) {
        for index in (1..values.len()).rev() {
            let swap_index = self.next_int(0, index as i64) as usize;
            values.swap(index, swap_index);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_string_matches_reference_fnv1a_values() {
        assert_eq!(hash_string(""), 0x811c_9dc5);
        assert_eq!(hash_string("hello"), 0x4f9f_2cab);
        assert_eq!(hash_hex("demo:1"), "943a624f");
    }

    #[test]
    fn checksum_is_six_upper_case_base36_digits() {
        assert_eq!(make_checksum(""), "ZTNTFP");
        assert_eq!(make_checksum("hello"), "M3BICR");
        assert_eq!(make_checksum("hello"), make_checksum("hello"));
        assert_ne!(make_checksum("hello"), make_checksum("hellp"));
    }

    #[test]
    fn seeded_sequence_is_pinned_for_known_seed() {
        let mut random = SeededRandom::new("demo:1");
        let drawn: Vec<u32> = (0..3).map(|_| random.next_u32()).collect();
        assert_eq!(drawn, vec![2_873_278_282, 388_544_398, 185_749_681]);
    }

    #[test]
    fn next_int_uses_floor_scaling() {
        let mut random = SeededRandom::new("seed");
        let drawn: Vec<i64> = (0..6).map(|_| random.next_int(1, 6)).collect();
        assert_eq!(drawn, vec![6, 1, 1, 4, 1, 1]);
    }

    #[test]
    fn next_stays_in_unit_interval() {
        let mut random = SeededRandom::new("bounds");
        for _ in 0..10_000 {
            let value = random.next();
            assert!((0.0..1.0).contains(&value));
        }
    }

    #[test]
    fn derived_streams_are_independent_of_each_other() {
        let mut hazards = SeededRandom::derived("943a624f", "hazards");
        let mut items = SeededRandom::derived("943a624f", "items");
        let hazard_draws: Vec<u32> = (0..4).map(|_| hazards.next_u32()).collect();
        let item_draws: Vec<u32> = (0..4).map(|_| items.next_u32()).collect();
        assert_ne!(hazard_draws, item_draws);

        let mut again = SeededRandom::derived("943a624f", "hazards");
        let replay: Vec<u32> = (0..4).map(|_| again.next_u32()).collect();
        assert_eq!(hazard_draws, replay);
    }

    #[test]
    fn pick_on_empty_slice_returns_none() {
        let mut random = SeededRandom::new("empty");
        let empty: [u8; 0] = [];
        assert!(random.pick(&empty).is_none());
    }

    #[test]
    fn shuffle_is_a_permutation() {
        let mut random = SeededRandom::new("perm");
        let mut values: Vec<u32> = (0..32).collect();
        random.shuffle(&mut values);
        let mut sorted = values.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..32).collect::<Vec<_>>());
    }
}
