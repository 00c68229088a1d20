//! Stat conversion.
//!
//! Pure numeric functions that map a source challenge rating, hit points,
//! and armor class onto target tier, difficulty, thresholds, hit points,
//! stress, and evasion. Nothing here fails except challenge-rating parsing.

use crate::adversary::{CoreStats, Difficulty, Thresholds, Tier};
use crate::classifier::Archetype;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error type for challenge rating parsing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChallengeRatingError {
    #[error("Empty challenge rating")]
    Empty,
    #[error("Invalid challenge rating: {0}")]
    Invalid(String),
    #[error("Zero denominator in challenge rating: {0}")]
    ZeroDenominator(String),
}

// ============================================================================
// Challenge Rating
// ============================================================================

/// A challenge rating held as an exact fraction ("1/8", "1/2", "17").
///
/// Serializes as its printed form and deserializes through [`FromStr`], so
/// a zero denominator never gets in.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ChallengeRating {
    numerator: u64,
    denominator: u64,
}

impl ChallengeRating {
    pub fn whole(value: u32) -> Self {
        Self {
            numerator: u64::from(value),
            denominator: 1,
        }
    }

    /// A reduced fraction. Returns `None` for a zero denominator.
    pub fn fraction(numerator: u64, denominator: u64) -> Option<Self> {
        if denominator == 0 {
            return None;
        }
        let g = gcd(numerator, denominator).max(1);
        Some(Self {
            numerator: numerator / g,
            denominator: denominator / g,
        })
    }

    /// Challenge 1/4 or lower.
    pub fn is_minimal(&self) -> bool {
        *self <= MINIMAL_CHALLENGE
    }
}

const MINIMAL_CHALLENGE: ChallengeRating = ChallengeRating {
    numerator: 1,
    denominator: 4,
};

fn gcd(a: u64, b: u64) -> u64 {
    if b == 0 {
        a
    } else {
        gcd(b, a % b)
    }
}

fn parse_whole(s: &str, original: &str) -> Result<u64, ChallengeRatingError> {
    s.trim()
        .parse()
        .map_err(|_| ChallengeRatingError::Invalid(original.to_string()))
}

impl FromStr for ChallengeRating {
    type Err = ChallengeRatingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ChallengeRatingError::Empty);
        }

        if let Some((num, den)) = trimmed.split_once('/') {
            let numerator = parse_whole(num, s)?;
            let denominator = parse_whole(den, s)?;
            return ChallengeRating::fraction(numerator, denominator)
                .ok_or_else(|| ChallengeRatingError::ZeroDenominator(s.to_string()));
        }

        // Some sources print "0.25" or "0.5"
        if let Some((int, frac)) = trimmed.split_once('.') {
            if frac.is_empty() || frac.len() > 6 || !frac.chars().all(|c| c.is_ascii_digit()) {
                return Err(ChallengeRatingError::Invalid(s.to_string()));
            }
            let scale = 10u64.pow(frac.len() as u32);
            let int = if int.is_empty() { 0 } else { parse_whole(int, s)? };
            let frac = parse_whole(frac, s)?;
            let numerator = int
                .checked_mul(scale)
                .and_then(|n| n.checked_add(frac))
                .ok_or_else(|| ChallengeRatingError::Invalid(s.to_string()))?;
            return ChallengeRating::fraction(numerator, scale)
                .ok_or_else(|| ChallengeRatingError::Invalid(s.to_string()));
        }

        parse_whole(trimmed, s).map(|n| ChallengeRating {
            numerator: n,
            denominator: 1,
        })
    }
}

impl TryFrom<String> for ChallengeRating {
    type Error = ChallengeRatingError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ChallengeRating> for String {
    fn from(value: ChallengeRating) -> Self {
        value.to_string()
    }
}

impl PartialEq for ChallengeRating {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ChallengeRating {}

impl PartialOrd for ChallengeRating {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ChallengeRating {
    fn cmp(&self, other: &Self) -> Ordering {
        let lhs = u128::from(self.numerator) * u128::from(other.denominator);
        let rhs = u128::from(other.numerator) * u128::from(self.denominator);
        lhs.cmp(&rhs)
    }
}

impl fmt::Display for ChallengeRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.denominator == 1 {
            write!(f, "{}", self.numerator)
        } else {
            write!(f, "{}/{}", self.numerator, self.denominator)
        }
    }
}

// ============================================================================
// Conversion Formulas
// ============================================================================

/// Tier breakpoints: CR 0-4, 5-10, 11-16, 17+.
pub fn tier(challenge: ChallengeRating) -> Tier {
    if challenge <= ChallengeRating::whole(4) {
        Tier::One
    } else if challenge <= ChallengeRating::whole(10) {
        Tier::Two
    } else if challenge <= ChallengeRating::whole(16) {
        Tier::Three
    } else {
        Tier::Four
    }
}

pub fn difficulty(archetype: Archetype, challenge: ChallengeRating, tier: Tier) -> Difficulty {
    match archetype {
        Archetype::Minion => Difficulty::Minor,
        Archetype::Solo | Archetype::Leader => Difficulty::Severe,
        _ if challenge >= ChallengeRating::whole(tier.number() * 3) => Difficulty::Major,
        _ => Difficulty::Minor,
    }
}

/// `(k1, k2)` per difficulty row and threshold column; both columns grow
/// left to right so every tier yields strictly ascending thresholds.
const THRESHOLD_CONSTANTS: [[(u32, u32); 3]; 3] = [
    // Minor
    [(2, 1), (4, 2), (6, 4)],
    // Major
    [(3, 2), (5, 4), (8, 6)],
    // Severe
    [(4, 3), (6, 6), (10, 8)],
];

pub fn thresholds(tier: Tier, difficulty: Difficulty) -> Thresholds {
    let row = match difficulty {
        Difficulty::Minor => &THRESHOLD_CONSTANTS[0],
        Difficulty::Major => &THRESHOLD_CONSTANTS[1],
        Difficulty::Severe => &THRESHOLD_CONSTANTS[2],
    };
    let t = tier.number();
    let at = |(k1, k2): (u32, u32)| t * k1 + k2;
    Thresholds {
        minor: at(row[0]),
        major: at(row[1]),
        severe: at(row[2]),
    }
}

pub fn hit_points(archetype: Archetype, source_hp: u32, tier: Tier) -> u32 {
    let t = tier.number();
    match archetype {
        Archetype::Minion => 1,
        Archetype::Solo => (source_hp / 8).max(t * 4),
        _ => (source_hp / 10).max(t * 2),
    }
}

pub fn stress(archetype: Archetype, tier: Tier) -> u32 {
    match archetype {
        Archetype::Minion => 0,
        Archetype::Solo => tier.number() * 2,
        _ => tier.number(),
    }
}

/// `floor(armor * 0.8) + tier`, kept in integers.
pub fn evasion(armor_class: u32, tier: Tier) -> u32 {
    armor_class * 4 / 5 + tier.number()
}

/// Attack bonus from the source to-hit bonus: `floor(bonus / 2) + tier - 1`,
/// at least 1. Without a known bonus the tier number is used.
pub fn attack_modifier(to_hit: Option<i32>, tier: Tier) -> i32 {
    let t = tier.number() as i32;
    match to_hit {
        Some(bonus) => (bonus.div_euclid(2) + t - 1).max(1),
        None => t,
    }
}

/// Compute the full core stat bundle.
pub fn convert_stats(
    challenge: ChallengeRating,
    source_hp: u32,
    armor_class: u32,
    archetype: Archetype,
) -> CoreStats {
    let tier = tier(challenge);
    let difficulty = difficulty(archetype, challenge, tier);
    CoreStats {
        tier,
        difficulty,
        thresholds: thresholds(tier, difficulty),
        hit_points: hit_points(archetype, source_hp, tier),
        stress: stress(archetype, tier),
        evasion: evasion(armor_class, tier),
    }
}

// ============================================================================
// Validation
// ============================================================================

pub const EVASION_RANGE: std::ops::RangeInclusive<u32> = 5..=30;

/// A non-blocking finding about a stat bundle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
pub enum StatWarning {
    #[error("tier {0} is outside 1-4")]
    TierOutOfRange(u32),
    #[error("evasion {0} is outside 5-30")]
    EvasionOutOfRange(u32),
    #[error("hit points must be at least 1")]
    NoHitPoints,
    #[error("thresholds {0} are not strictly ascending")]
    ThresholdsNotAscending(String),
}

/// Sanity-check a stat bundle. Findings never block a conversion.
pub fn validate_stats(stats: &CoreStats) -> Vec<StatWarning> {
    let mut warnings = Vec::new();
    let tier = stats.tier.number();
    if !(1..=4).contains(&tier) {
        warnings.push(StatWarning::TierOutOfRange(tier));
    }
    if !EVASION_RANGE.contains(&stats.evasion) {
        warnings.push(StatWarning::EvasionOutOfRange(stats.evasion));
    }
    if stats.hit_points == 0 {
        warnings.push(StatWarning::NoHitPoints);
    }
    if !stats.thresholds.is_ascending() {
        warnings.push(StatWarning::ThresholdsNotAscending(
            stats.thresholds.to_string(),
        ));
    }
    warnings
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cr(s: &str) -> ChallengeRating {
        s.parse().unwrap()
    }

    #[test]
    fn test_parse_fractions_and_decimals() {
        assert_eq!(cr("1/4"), ChallengeRating::fraction(1, 4).unwrap());
        assert_eq!(cr("2/8"), cr("1/4"));
        assert_eq!(cr("0.5"), cr("1/2"));
        assert_eq!(cr(" 17 "), ChallengeRating::whole(17));
        assert_eq!(cr("1/8").to_string(), "1/8");
        assert_eq!(cr("0.125"), ChallengeRating::fraction(2, 16).unwrap());
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert_eq!("".parse::<ChallengeRating>(), Err(ChallengeRatingError::Empty));
        assert!(matches!(
            "1/0".parse::<ChallengeRating>(),
            Err(ChallengeRatingError::ZeroDenominator(_))
        ));
        assert!(matches!(
            "abc".parse::<ChallengeRating>(),
            Err(ChallengeRatingError::Invalid(_))
        ));
        assert!(matches!(
            "1+1".parse::<ChallengeRating>(),
            Err(ChallengeRatingError::Invalid(_))
        ));
    }

    #[test]
    fn test_oversized_decimal_is_an_error() {
        assert!(matches!(
            "18446744073709551615.5".parse::<ChallengeRating>(),
            Err(ChallengeRatingError::Invalid(_))
        ));
        assert!(matches!(
            "99999999999999999.999999".parse::<ChallengeRating>(),
            Err(ChallengeRatingError::Invalid(_))
        ));
        assert!(matches!(
            "99999999999999999999/2".parse::<ChallengeRating>(),
            Err(ChallengeRatingError::Invalid(_))
        ));
    }

    #[test]
    fn test_serde_goes_through_parsing() {
        assert_eq!(serde_json::to_string(&cr("2/8")).unwrap(), "\"1/4\"");
        let parsed: ChallengeRating = serde_json::from_str("\"0.5\"").unwrap();
        assert_eq!(parsed, cr("1/2"));
        assert!(serde_json::from_str::<ChallengeRating>("\"1/0\"").is_err());
        assert!(serde_json::from_str::<ChallengeRating>(r#"{"numerator":1,"denominator":0}"#).is_err());
    }

    #[test]
    fn test_minimal_challenge() {
        assert!(cr("0").is_minimal());
        assert!(cr("1/8").is_minimal());
        assert!(cr("1/4").is_minimal());
        assert!(!cr("1/2").is_minimal());
    }

    #[test]
    fn test_tier_breakpoints() {
        assert_eq!(tier(cr("1/4")), Tier::One);
        assert_eq!(tier(cr("4")), Tier::One);
        assert_eq!(tier(cr("5")), Tier::Two);
        assert_eq!(tier(cr("10")), Tier::Two);
        assert_eq!(tier(cr("11")), Tier::Three);
        assert_eq!(tier(cr("16")), Tier::Three);
        assert_eq!(tier(cr("17")), Tier::Four);
        assert_eq!(tier(cr("30")), Tier::Four);
    }

    #[test]
    fn test_difficulty_rules() {
        assert_eq!(
            difficulty(Archetype::Minion, cr("4"), Tier::One),
            Difficulty::Minor
        );
        assert_eq!(
            difficulty(Archetype::Leader, cr("1"), Tier::One),
            Difficulty::Severe
        );
        assert_eq!(
            difficulty(Archetype::Standard, cr("3"), Tier::One),
            Difficulty::Major
        );
        assert_eq!(
            difficulty(Archetype::Standard, cr("2"), Tier::One),
            Difficulty::Minor
        );
    }

    #[test]
    fn test_evasion_example() {
        assert_eq!(evasion(15, Tier::One), 13);
        assert_eq!(evasion(19, Tier::Four), 19);
    }

    #[test]
    fn test_hit_points() {
        assert_eq!(hit_points(Archetype::Minion, 200, Tier::Two), 1);
        assert_eq!(hit_points(Archetype::Solo, 256, Tier::Four), 32);
        assert_eq!(hit_points(Archetype::Solo, 40, Tier::Two), 8);
        assert_eq!(hit_points(Archetype::Standard, 7, Tier::One), 2);
        assert_eq!(hit_points(Archetype::Bruiser, 59, Tier::One), 5);
    }

    #[test]
    fn test_attack_modifier() {
        assert_eq!(attack_modifier(Some(4), Tier::One), 2);
        assert_eq!(attack_modifier(Some(14), Tier::Four), 10);
        assert_eq!(attack_modifier(Some(-1), Tier::One), 1);
        assert_eq!(attack_modifier(None, Tier::Three), 3);
    }

    #[test]
    fn test_validator_flags_bad_bundles() {
        let good = convert_stats(cr("1/4"), 7, 15, Archetype::Standard);
        assert!(validate_stats(&good).is_empty());

        let bad = CoreStats {
            hit_points: 0,
            evasion: 2,
            thresholds: Thresholds {
                minor: 5,
                major: 5,
                severe: 4,
            },
            ..good
        };
        let warnings = validate_stats(&bad);
        assert!(warnings.contains(&StatWarning::NoHitPoints));
        assert!(warnings.contains(&StatWarning::EvasionOutOfRange(2)));
        assert!(warnings
            .iter()
            .any(|w| matches!(w, StatWarning::ThresholdsNotAscending(_))));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn any_tier() -> impl Strategy<Value = Tier> {
            prop_oneof![
                Just(Tier::One),
                Just(Tier::Two),
                Just(Tier::Three),
                Just(Tier::Four),
            ]
        }

        fn any_difficulty() -> impl Strategy<Value = Difficulty> {
            prop_oneof![
                Just(Difficulty::Minor),
                Just(Difficulty::Major),
                Just(Difficulty::Severe),
            ]
        }

        proptest! {
            #[test]
            fn thresholds_strictly_ascend(tier in any_tier(), difficulty in any_difficulty()) {
                let t = thresholds(tier, difficulty);
                prop_assert!(t.minor < t.major);
                prop_assert!(t.major < t.severe);
            }

            #[test]
            fn minion_has_one_hp_and_no_stress(hp in 0u32..10_000, tier in any_tier()) {
                prop_assert_eq!(hit_points(Archetype::Minion, hp, tier), 1);
                prop_assert_eq!(stress(Archetype::Minion, tier), 0);
            }

            #[test]
            fn solo_stress_is_double_tier(tier in any_tier()) {
                prop_assert_eq!(stress(Archetype::Solo, tier), tier.number() * 2);
            }

            #[test]
            fn evasion_matches_formula(armor in 0u32..40, tier in any_tier()) {
                let expected = (f64::from(armor) * 0.8).floor() as u32 + tier.number();
                prop_assert_eq!(evasion(armor, tier), expected);
            }

            #[test]
            fn hit_points_are_positive(hp in 0u32..10_000, cr in 0u32..30) {
                for archetype in Archetype::all() {
                    let stats = convert_stats(ChallengeRating::whole(cr), hp, 12, archetype);
                    prop_assert!(stats.hit_points >= 1);
                }
            }

            #[test]
            fn fraction_parse_orders_like_floats(n in 1u64..8, d in 1u64..9) {
                let parsed: ChallengeRating = format!("{n}/{d}").parse().unwrap();
                let whole = ChallengeRating::whole(1);
                prop_assert_eq!(parsed <= whole, n <= d);
            }
        }
    }
}
