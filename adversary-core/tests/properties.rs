//! Property tests over whole conversions.

use adversary_core::creature::HitPoints;
use adversary_core::testing::{adult_red_dragon, convert_sample, goblin, veteran};
use adversary_core::{Archetype, ChallengeRating};
use proptest::prelude::*;

fn any_challenge() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("0".to_string()),
        Just("1/8".to_string()),
        Just("1/4".to_string()),
        Just("1/2".to_string()),
        (1u32..=30).prop_map(|cr| cr.to_string()),
    ]
}

proptest! {
    #[test]
    fn thresholds_ascend_for_any_record(
        cr in any_challenge(),
        hp in 1u32..700,
        ac in 5u32..26,
    ) {
        let mut creature = veteran();
        creature.challenge_rating = cr;
        creature.hit_points = HitPoints::new(hp);
        creature.armor_class = ac;
        let adversary = convert_sample(&creature);

        let t = adversary.stats.thresholds;
        prop_assert!(t.minor < t.major && t.major < t.severe);
        prop_assert!(adversary.stats.hit_points >= 1);
        prop_assert_eq!(
            adversary.stats.evasion,
            ac * 4 / 5 + adversary.tier().number()
        );
    }

    #[test]
    fn minions_always_have_one_hit_point(hp in 0u32..10_000) {
        let mut creature = goblin();
        creature.hit_points = HitPoints::new(hp);
        let adversary = convert_sample(&creature);
        prop_assert_eq!(adversary.archetype, Archetype::Minion);
        prop_assert_eq!(adversary.stats.hit_points, 1);
        prop_assert_eq!(adversary.stats.stress, 0);
    }

    #[test]
    fn solo_stress_is_twice_tier(cr in 1u32..=30) {
        let mut creature = adult_red_dragon();
        creature.challenge_rating = cr.to_string();
        let adversary = convert_sample(&creature);
        prop_assert_eq!(adversary.archetype, Archetype::Solo);
        prop_assert_eq!(adversary.stats.stress, adversary.tier().number() * 2);
    }

    #[test]
    fn conversion_is_deterministic(cr in any_challenge(), hp in 1u32..400) {
        let mut creature = adult_red_dragon();
        creature.challenge_rating = cr;
        creature.hit_points = HitPoints::new(hp);
        prop_assert_eq!(convert_sample(&creature), convert_sample(&creature));
    }

    #[test]
    fn fractional_ratings_parse(numerator in 1u64..8, denominator in 1u64..9) {
        let parsed: ChallengeRating = format!("{numerator}/{denominator}").parse().unwrap();
        prop_assert_eq!(
            parsed,
            ChallengeRating::fraction(numerator, denominator).unwrap()
        );
    }
}
