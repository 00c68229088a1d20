//! Testing utilities for conversions.
//!
//! This module provides tools for integration testing:
//! - Sample stat blocks covering every archetype the classifier tells apart
//! - `convert_sample` for converting with the default configuration
//! - Assertion helpers for verifying converted adversaries

use crate::adversary::{Adversary, ConvertedFeature, FeatureKind, ResourceKind};
use crate::classifier::Archetype;
use crate::creature::{
    Ability, AbilityScores, AttackProfile, Condition, CreatureAbility, CreatureType, DamageType,
    HitPoints, Lair, LegendaryAction, LegendaryActions, Size, SourceCreature, SpellEntry,
    Spellcasting, Speeds,
};
use crate::engine::AdversaryConverter;
use crate::stats;

// ============================================================================
// Sample creatures
// ============================================================================

/// CR 1/4 with nothing distinctive: a Minion.
pub fn goblin() -> SourceCreature {
    SourceCreature::new(
        "Goblin",
        Size::Small,
        CreatureType::Humanoid,
        "1/4",
        15,
        HitPoints::new(7).with_formula("2d6"),
        AbilityScores::new(8, 14, 10, 10, 8, 8),
    )
    .with_subtype("goblinoid")
    .with_description("Goblins are small, black-hearted humanoids. They lair in caves.")
    .with_skill("Stealth", 6)
    .with_trait(CreatureAbility::new(
        "Nimble Escape",
        "The goblin can take the Disengage or Hide action as a bonus action on each of its turns.",
    ))
    .with_action(CreatureAbility::new(
        "Scimitar",
        "Melee Weapon Attack: +4 to hit, reach 5 ft., one target. Hit: 5 (1d6 + 2) slashing damage.",
    ))
    .with_action(CreatureAbility::new(
        "Shortbow",
        "Ranged Weapon Attack: +4 to hit, range 80/320 ft., one target. Hit: 5 (1d6 + 2) piercing damage.",
    ))
}

/// Pack tactics: a Horde.
pub fn wolf() -> SourceCreature {
    SourceCreature::new(
        "Wolf",
        Size::Medium,
        CreatureType::Beast,
        "1/4",
        13,
        HitPoints::new(11).with_formula("2d8+2"),
        AbilityScores::new(12, 15, 12, 3, 12, 6),
    )
    .with_speeds(Speeds::walking(40))
    .with_skill("Perception", 3)
    .with_skill("Stealth", 4)
    .with_trait(CreatureAbility::new(
        "Keen Hearing and Smell",
        "The wolf has advantage on Wisdom (Perception) checks that rely on hearing or smell.",
    ))
    .with_trait(CreatureAbility::new(
        "Pack Tactics",
        "The wolf has advantage on an attack roll against a creature if at least one of the \
         wolf's allies is within 5 feet of the creature and the ally isn't incapacitated.",
    ))
    .with_action(CreatureAbility::new(
        "Bite",
        "Melee Weapon Attack: +4 to hit, reach 5 ft., one target. Hit: 7 (2d4 + 2) piercing \
         damage. If the target is a creature, it must succeed on a DC 11 Strength saving throw \
         or be knocked prone.",
    ))
}

/// Legendary actions, lair actions, and a bite-claw-claw multiattack: a Solo.
pub fn adult_red_dragon() -> SourceCreature {
    SourceCreature::new(
        "Adult Red Dragon",
        Size::Huge,
        CreatureType::Dragon,
        "17",
        19,
        HitPoints::new(256).with_formula("19d12+133"),
        AbilityScores::new(27, 10, 25, 16, 13, 21),
    )
    .with_speeds(Speeds::walking(40).with_climb(40).with_fly(80))
    .with_skill("Perception", 13)
    .with_skill("Stealth", 6)
    .with_immunities(vec![DamageType::Fire])
    .with_trait(CreatureAbility::new(
        "Legendary Resistance (3/Day)",
        "If the dragon fails a saving throw, it can choose to succeed instead.",
    ))
    .with_action(CreatureAbility::new(
        "Multiattack",
        "The dragon can use its Frightful Presence. It then makes three attacks: one with its \
         bite and two with its claws.",
    ))
    .with_action(CreatureAbility::new(
        "Bite",
        "Melee Weapon Attack: +14 to hit, reach 10 ft., one target. Hit: 19 (2d10 + 8) piercing \
         damage plus 7 (2d6) fire damage.",
    ))
    .with_action(CreatureAbility::new(
        "Claw",
        "Melee Weapon Attack: +14 to hit, reach 5 ft., one target. Hit: 15 (2d6 + 8) slashing damage.",
    ))
    .with_action(CreatureAbility::new(
        "Tail",
        "Melee Weapon Attack: +14 to hit, reach 15 ft., one target. Hit: 17 (2d8 + 8) bludgeoning damage.",
    ))
    .with_action(CreatureAbility::new(
        "Frightful Presence",
        "Each creature of the dragon's choice that is within 120 feet of the dragon and aware of \
         it must succeed on a DC 19 Wisdom saving throw or become frightened for 1 minute.",
    ))
    .with_action(CreatureAbility::new(
        "Fire Breath (Recharge 5-6)",
        "The dragon exhales fire in a 60-foot cone. Each creature in that area must make a DC 21 \
         Dexterity saving throw, taking 63 (18d6) fire damage on a failed save, or half as much \
         damage on a successful one.",
    ))
    .with_legendary_actions(LegendaryActions::new(
        3,
        vec![
            LegendaryAction::new("Detect", "The dragon makes a Wisdom (Perception) check."),
            LegendaryAction::new("Tail Attack", "The dragon makes a tail attack."),
            LegendaryAction::new(
                "Wing Attack (Costs 2 Actions)",
                "The dragon beats its wings. Each creature within 10 feet of the dragon must \
                 succeed on a DC 22 Dexterity saving throw or take 15 (2d6 + 8) bludgeoning \
                 damage and be knocked prone.",
            ),
        ],
    ))
    .with_lair(Lair {
        description: Some("Red dragons lair in volcanic caverns.".to_string()),
        actions: vec![CreatureAbility::new(
            "Magma Eruption",
            "Magma erupts from a point on the ground the dragon can see within 120 feet of it. \
             Each creature within 20 feet of that point must make a DC 15 Dexterity saving throw, \
             taking 21 (6d6) fire damage on a failed save.",
        )],
    })
}

/// A "Swarm of" name and swarm subtype: a Swarm.
pub fn swarm_of_rats() -> SourceCreature {
    SourceCreature::new(
        "Swarm of Rats",
        Size::Medium,
        CreatureType::Beast,
        "1/4",
        10,
        HitPoints::new(24).with_formula("7d8-7"),
        AbilityScores::new(9, 11, 9, 2, 10, 3),
    )
    .with_subtype("swarm of Tiny beasts")
    .with_resistances(vec![
        DamageType::Bludgeoning,
        DamageType::Piercing,
        DamageType::Slashing,
    ])
    .with_condition_immunities(vec![
        Condition::Charmed,
        Condition::Frightened,
        Condition::Grappled,
    ])
    .with_trait(CreatureAbility::new(
        "Swarm",
        "The swarm can occupy another creature's space and vice versa, and the swarm can move \
         through any opening large enough for a Tiny rat.",
    ))
    .with_action(CreatureAbility::new(
        "Bites",
        "Melee Weapon Attack: +2 to hit, reach 0 ft., one target in the swarm's space. \
         Hit: 7 (2d6) piercing damage.",
    ))
}

/// Command vocabulary: a Leader.
pub fn hobgoblin_captain() -> SourceCreature {
    SourceCreature::new(
        "Hobgoblin Captain",
        Size::Medium,
        CreatureType::Humanoid,
        "3",
        17,
        HitPoints::new(39).with_formula("6d8+12"),
        AbilityScores::new(15, 14, 14, 12, 10, 13),
    )
    .with_subtype("goblinoid")
    .with_action(CreatureAbility::new(
        "Multiattack",
        "The hobgoblin makes two greatsword attacks.",
    ))
    .with_action(CreatureAbility::new(
        "Greatsword",
        "Melee Weapon Attack: +4 to hit, reach 5 ft., one target. Hit: 9 (2d6 + 2) slashing damage.",
    ))
    .with_action(CreatureAbility::new(
        "Javelin",
        "Ranged Weapon Attack: +4 to hit, range 30/120 ft., one target. Hit: 5 (1d6 + 2) piercing damage.",
    ))
    .with_action(CreatureAbility::new(
        "Leadership (Recharges after a Short or Long Rest)",
        "The hobgoblin lets out a battle cry. For 1 minute, each ally that can hear it adds a d4 \
         to its attack rolls.",
    ))
}

/// Healing spells: a Support caster.
pub fn priest() -> SourceCreature {
    SourceCreature::new(
        "Priest",
        Size::Medium,
        CreatureType::Humanoid,
        "2",
        13,
        HitPoints::new(27).with_formula("5d8+5"),
        AbilityScores::new(10, 10, 12, 13, 16, 13),
    )
    .with_subtype("any race")
    .with_skill("Medicine", 7)
    .with_skill("Persuasion", 3)
    .with_skill("Religion", 4)
    .with_trait(CreatureAbility::new(
        "Spellcasting",
        "The priest is a 5th-level spellcaster. Its spellcasting ability is Wisdom (spell save DC 13).",
    ))
    .with_action(CreatureAbility::new(
        "Mace",
        "Melee Weapon Attack: +2 to hit, reach 5 ft., one target. Hit: 3 (1d6) bludgeoning damage.",
    ))
    .with_spellcasting(Spellcasting::new(Ability::Wisdom, 13).with_spells(vec![
        SpellEntry::new("Sacred Flame", 0),
        SpellEntry::new("Cure Wounds", 1),
        SpellEntry::new("Lesser Restoration", 2),
        SpellEntry::new("Spirit Guardians", 3),
    ]))
}

/// Bow first: a Ranged adversary.
pub fn scout() -> SourceCreature {
    SourceCreature::new(
        "Scout",
        Size::Medium,
        CreatureType::Humanoid,
        "1/2",
        13,
        HitPoints::new(16).with_formula("3d8+3"),
        AbilityScores::new(11, 14, 12, 11, 13, 11),
    )
    .with_subtype("any race")
    .with_skill("Nature", 4)
    .with_skill("Perception", 5)
    .with_skill("Stealth", 6)
    .with_skill("Survival", 5)
    .with_action(
        CreatureAbility::new("Longbow", "Hit: 6 (1d8 + 2) piercing damage.")
            .with_attack(AttackProfile::ranged(4, 150)),
    )
    .with_action(
        CreatureAbility::new("Shortsword", "Hit: 5 (1d6 + 2) piercing damage.")
            .with_attack(AttackProfile::melee(4, 5)),
    )
}

/// Strength-skewed with a heavy club: a Bruiser.
pub fn ogre() -> SourceCreature {
    SourceCreature::new(
        "Ogre",
        Size::Large,
        CreatureType::Giant,
        "2",
        11,
        HitPoints::new(59).with_formula("7d10+21"),
        AbilityScores::new(19, 8, 16, 5, 7, 7),
    )
    .with_speeds(Speeds::walking(40))
    .with_action(CreatureAbility::new(
        "Greatclub",
        "Melee Weapon Attack: +6 to hit, reach 5 ft., one target. Hit: 13 (2d8 + 4) bludgeoning damage.",
    ))
    .with_action(CreatureAbility::new(
        "Javelin",
        "Melee or Ranged Weapon Attack: +6 to hit, reach 5 ft. or range 30/120 ft., one target. \
         Hit: 11 (2d6 + 4) piercing damage.",
    ))
}

/// A trained soldier with no distinctive signal: Standard.
pub fn veteran() -> SourceCreature {
    SourceCreature::new(
        "Veteran",
        Size::Medium,
        CreatureType::Humanoid,
        "3",
        17,
        HitPoints::new(58).with_formula("9d8+18"),
        AbilityScores::new(16, 13, 14, 10, 11, 10),
    )
    .with_subtype("any race")
    .with_skill("Athletics", 5)
    .with_skill("Perception", 2)
    .with_action(CreatureAbility::new(
        "Multiattack",
        "The veteran makes two longsword attacks.",
    ))
    .with_action(CreatureAbility::new(
        "Longsword",
        "Melee Weapon Attack: +5 to hit, reach 5 ft., one target. Hit: 7 (1d8 + 3) slashing damage.",
    ))
    .with_action(CreatureAbility::new(
        "Heavy Crossbow",
        "Ranged Weapon Attack: +3 to hit, range 100/400 ft., one target. Hit: 6 (1d10 + 1) piercing damage.",
    ))
    .with_reaction(CreatureAbility::new(
        "Parry",
        "The veteran adds 2 to its AC against one melee attack that would hit it.",
    ))
}

/// Every sample with the archetype it should classify as.
pub fn samples() -> Vec<(SourceCreature, Archetype)> {
    vec![
        (goblin(), Archetype::Minion),
        (wolf(), Archetype::Horde),
        (adult_red_dragon(), Archetype::Solo),
        (swarm_of_rats(), Archetype::Swarm),
        (hobgoblin_captain(), Archetype::Leader),
        (priest(), Archetype::Support),
        (scout(), Archetype::Ranged),
        (ogre(), Archetype::Bruiser),
        (veteran(), Archetype::Standard),
    ]
}

// ============================================================================
// Assertion helpers
// ============================================================================

/// Convert with the default configuration, panicking on failure.
#[track_caller]
pub fn convert_sample(creature: &SourceCreature) -> Adversary {
    match AdversaryConverter::default().convert(creature) {
        Ok(adversary) => adversary,
        Err(e) => panic!("converting {} failed: {e}", creature.name),
    }
}

#[track_caller]
pub fn assert_archetype(adversary: &Adversary, expected: Archetype) {
    assert_eq!(
        adversary.archetype, expected,
        "{} classified as {} ({})",
        adversary.name,
        adversary.archetype,
        adversary.classification.reasoning()
    );
}

/// Find a feature or attack by name, panicking with the available names.
#[track_caller]
pub fn assert_feature<'a>(adversary: &'a Adversary, name: &str) -> &'a ConvertedFeature {
    if let Some(found) = adversary.feature(name).or_else(|| adversary.attack(name)) {
        return found;
    }
    let available: Vec<&str> = adversary
        .attacks
        .iter()
        .chain(adversary.features.iter())
        .map(|f| f.name())
        .collect();
    panic!(
        "{} has no feature named {name:?}; available: {available:?}",
        adversary.name
    );
}

#[track_caller]
pub fn assert_no_feature(adversary: &Adversary, name: &str) {
    assert!(
        adversary.feature(name).is_none() && adversary.attack(name).is_none(),
        "{} unexpectedly has feature {name:?}",
        adversary.name
    );
}

#[track_caller]
pub fn assert_kind(feature: &ConvertedFeature, expected: FeatureKind) {
    assert_eq!(
        feature.kind(),
        expected,
        "feature {} has the wrong kind",
        feature.name()
    );
}

#[track_caller]
pub fn assert_cost(feature: &ConvertedFeature, resource: ResourceKind, amount: u32) {
    let cost = feature
        .feature
        .cost
        .unwrap_or_else(|| panic!("feature {} has no cost", feature.name()));
    assert_eq!(
        (cost.resource, cost.amount),
        (resource, amount),
        "feature {} has cost {cost}",
        feature.name()
    );
}

#[track_caller]
pub fn assert_thresholds_ascending(adversary: &Adversary) {
    assert!(
        adversary.stats.thresholds.is_ascending(),
        "{} has thresholds {}",
        adversary.name,
        adversary.stats.thresholds
    );
}

#[track_caller]
pub fn assert_valid_stats(adversary: &Adversary) {
    let warnings = stats::validate_stats(&adversary.stats);
    assert!(
        warnings.is_empty(),
        "{} has stat warnings: {warnings:?}",
        adversary.name
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_samples_parse_challenge() {
        for (creature, _) in samples() {
            assert!(creature.challenge().is_ok(), "{}", creature.name);
        }
    }

    #[test]
    fn test_assert_feature_finds_attacks() {
        let adversary = convert_sample(&goblin());
        assert_eq!(assert_feature(&adversary, "Scimitar").name(), "Scimitar");
        assert_no_feature(&adversary, "Fire Breath");
    }

    #[test]
    #[should_panic(expected = "has no feature named")]
    fn test_assert_feature_panics_on_missing() {
        let adversary = convert_sample(&goblin());
        assert_feature(&adversary, "Wing Attack");
    }
}
