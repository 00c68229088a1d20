//! Archetype classification.
//!
//! Layered heuristics: absolute overrides first, then text vocabulary, then
//! a statistical fallback. The first signal to fire picks the archetype;
//! later signals that agree raise the confidence.

use crate::abilities::damage;
use crate::creature::{Ability, SourceCreature};
use crate::patterns;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Target-system archetype.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Archetype {
    Minion,
    Horde,
    Swarm,
    Standard,
    Bruiser,
    Ranged,
    Skulk,
    Support,
    Leader,
    Solo,
}

impl Archetype {
    pub fn name(&self) -> &'static str {
        match self {
            Archetype::Minion => "Minion",
            Archetype::Horde => "Horde",
            Archetype::Swarm => "Swarm",
            Archetype::Standard => "Standard",
            Archetype::Bruiser => "Bruiser",
            Archetype::Ranged => "Ranged",
            Archetype::Skulk => "Skulk",
            Archetype::Support => "Support",
            Archetype::Leader => "Leader",
            Archetype::Solo => "Solo",
        }
    }

    pub fn all() -> [Archetype; 10] {
        [
            Archetype::Minion,
            Archetype::Horde,
            Archetype::Swarm,
            Archetype::Standard,
            Archetype::Bruiser,
            Archetype::Ranged,
            Archetype::Skulk,
            Archetype::Support,
            Archetype::Leader,
            Archetype::Solo,
        ]
    }
}

impl fmt::Display for Archetype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// How the adversary behaves in a fight, independent of its archetype.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CombatRole {
    Controller,
    Artillery,
    Support,
    Leader,
    Skirmisher,
    Bruiser,
    Soldier,
}

impl CombatRole {
    pub fn name(&self) -> &'static str {
        match self {
            CombatRole::Controller => "Controller",
            CombatRole::Artillery => "Artillery",
            CombatRole::Support => "Support",
            CombatRole::Leader => "Leader",
            CombatRole::Skirmisher => "Skirmisher",
            CombatRole::Bruiser => "Bruiser",
            CombatRole::Soldier => "Soldier",
        }
    }
}

impl fmt::Display for CombatRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// The classifier's verdict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub archetype: Archetype,
    pub role: CombatRole,
    /// In [0, 1].
    pub confidence: f64,
    /// Signals that support the archetype, in firing order.
    pub signals: Vec<String>,
}

impl ClassificationResult {
    pub fn reasoning(&self) -> String {
        self.signals.join("; ")
    }
}

const BASE_CONFIDENCE: f64 = 0.4;
const AGREEING_SIGNAL_BONUS: f64 = 0.2;
const FALLBACK_CONFIDENCE: f64 = 0.3;

/// One heuristic that fired.
struct Signal {
    archetype: Archetype,
    reason: String,
}

impl Signal {
    fn new(archetype: Archetype, reason: impl Into<String>) -> Self {
        Self {
            archetype,
            reason: reason.into(),
        }
    }
}

/// Facts about the creature that several heuristics share.
struct Profile {
    text: String,
    melee_attacks: usize,
    ranged_attacks: usize,
    first_attack_ranged: bool,
    heavy_melee: bool,
}

impl Profile {
    fn of(creature: &SourceCreature) -> Self {
        let mut text = creature.ability_text();
        if let Some(spellcasting) = &creature.spellcasting {
            for spell in &spellcasting.spells {
                text.push_str(&spell.name.to_lowercase());
                text.push('\n');
            }
        }

        let mut melee_attacks = 0;
        let mut ranged_attacks = 0;
        let mut first_attack_ranged = None;
        let mut heavy_melee = false;
        for (ability, attack) in creature.attack_actions() {
            first_attack_ranged.get_or_insert(attack.is_ranged());
            if attack.is_ranged() {
                ranged_attacks += 1;
            } else {
                melee_attacks += 1;
                // Average damage of 10 or more, doubled
                heavy_melee |= damage::extract(&ability.description)
                    .is_some_and(|m| m.expression.doubled_average() >= 20);
            }
        }

        Self {
            text,
            melee_attacks,
            ranged_attacks,
            first_attack_ranged: first_attack_ranged.unwrap_or(false),
            heavy_melee,
        }
    }

    fn ranged_dominant(&self) -> bool {
        self.ranged_attacks > self.melee_attacks || self.first_attack_ranged
    }
}

fn strength_skewed(creature: &SourceCreature) -> bool {
    let scores = &creature.ability_scores;
    let str_score = scores.get(Ability::Strength);
    let dex_score = scores.get(Ability::Dexterity);
    str_score >= 16 && str_score >= dex_score.saturating_add(4)
}

fn override_signals(creature: &SourceCreature, signals: &mut Vec<Signal>) {
    if creature
        .subtypes
        .iter()
        .any(|s| s.to_lowercase().contains("swarm"))
    {
        signals.push(Signal::new(Archetype::Swarm, "swarm subtype"));
    }
    if patterns::SWARM_NAME.is_match(&creature.name) {
        signals.push(Signal::new(Archetype::Swarm, "\"Swarm of\" name"));
    }
    if creature.has_legendary_actions() {
        signals.push(Signal::new(Archetype::Solo, "legendary actions"));
    }
    if creature.effective_legendary_resistance().is_some() {
        signals.push(Signal::new(Archetype::Solo, "legendary resistance"));
    }
    if creature.has_lair_actions() {
        signals.push(Signal::new(Archetype::Solo, "lair actions"));
    }
    if creature.has_mythic_actions() {
        signals.push(Signal::new(Archetype::Solo, "mythic actions"));
    }
}

fn text_signals(creature: &SourceCreature, profile: &Profile) -> Vec<Signal> {
    let mut signals = Vec::new();
    if patterns::LEADER_VOCAB.is_match(&profile.text) {
        signals.push(Signal::new(Archetype::Leader, "command or rally vocabulary"));
    }
    if creature.spellcasting.is_some() && patterns::SUPPORT_VOCAB.is_match(&profile.text) {
        signals.push(Signal::new(
            Archetype::Support,
            "healing or protective vocabulary with spellcasting",
        ));
    }
    if patterns::PACK_VOCAB.is_match(&profile.text) {
        signals.push(Signal::new(Archetype::Horde, "pack tactics vocabulary"));
    }
    let dex = creature.ability_scores.get(Ability::Dexterity);
    if dex >= 15 && patterns::MOBILITY_VOCAB.is_match(&profile.text) {
        signals.push(Signal::new(
            Archetype::Skulk,
            format!("Dexterity {dex} with mobility vocabulary"),
        ));
    }
    if creature.speeds.can_fly() && patterns::SKIRMISH_VOCAB.is_match(&profile.text) {
        signals.push(Signal::new(
            Archetype::Skulk,
            "flight with skirmish vocabulary",
        ));
    }
    signals
}

fn statistical_signals(creature: &SourceCreature, profile: &Profile, signals: &mut Vec<Signal>) {
    if profile.ranged_attacks > profile.melee_attacks {
        signals.push(Signal::new(
            Archetype::Ranged,
            format!(
                "{} ranged attacks against {} melee",
                profile.ranged_attacks, profile.melee_attacks
            ),
        ));
    } else if profile.first_attack_ranged {
        signals.push(Signal::new(Archetype::Ranged, "primary attack is ranged"));
    }
    if strength_skewed(creature) && profile.heavy_melee {
        signals.push(Signal::new(
            Archetype::Bruiser,
            "Strength-skewed scores with a heavy melee attack",
        ));
    }
}

fn combat_role(creature: &SourceCreature, profile: &Profile) -> CombatRole {
    let mut control_words: Vec<String> = patterns::CONTROL_VOCAB
        .find_iter(&profile.text)
        .map(|m| m.as_str().to_string())
        .collect();
    control_words.sort_unstable();
    control_words.dedup();

    if control_words.len() >= 2 {
        CombatRole::Controller
    } else if profile.ranged_dominant() {
        CombatRole::Artillery
    } else if creature.spellcasting.is_some() && patterns::SUPPORT_VOCAB.is_match(&profile.text) {
        CombatRole::Support
    } else if patterns::LEADER_VOCAB.is_match(&profile.text) {
        CombatRole::Leader
    } else if patterns::MOBILITY_VOCAB.is_match(&profile.text)
        || creature.speeds.can_fly()
        || creature.speeds.walk.is_some_and(|w| w >= 40)
    {
        CombatRole::Skirmisher
    } else if strength_skewed(creature) {
        CombatRole::Bruiser
    } else {
        CombatRole::Soldier
    }
}

/// Classify a creature. Never fails; an unreadable challenge rating only
/// disables the Minion check.
pub fn classify(creature: &SourceCreature) -> ClassificationResult {
    let profile = Profile::of(creature);
    let mut signals = Vec::new();

    override_signals(creature, &mut signals);
    let text = text_signals(creature, &profile);

    let minimal = creature.challenge().is_ok_and(|cr| cr.is_minimal());
    if signals.is_empty()
        && text.is_empty()
        && minimal
        && creature.spellcasting.is_none()
        && creature.effective_multiattack().is_none()
    {
        signals.push(Signal::new(
            Archetype::Minion,
            format!("challenge {} with no other signal", creature.challenge_rating.trim()),
        ));
    }
    signals.extend(text);
    statistical_signals(creature, &profile, &mut signals);

    let role = combat_role(creature, &profile);

    let Some(first) = signals.first() else {
        tracing::trace!(creature = %creature.name, "no classifier signal fired");
        return ClassificationResult {
            archetype: Archetype::Standard,
            role,
            confidence: FALLBACK_CONFIDENCE,
            signals: vec!["no distinctive signals".to_string()],
        };
    };

    let archetype = first.archetype;
    let agreeing: Vec<String> = signals
        .iter()
        .filter(|s| s.archetype == archetype)
        .map(|s| s.reason.clone())
        .collect();
    for signal in &signals {
        tracing::trace!(
            creature = %creature.name,
            archetype = %signal.archetype,
            reason = %signal.reason,
            "classifier signal"
        );
    }

    ClassificationResult {
        archetype,
        role,
        confidence: confidence(agreeing.len()),
        signals: agreeing,
    }
}

/// Confidence for a winning archetype backed by `agreeing` signals, capped at 1.0.
fn confidence(agreeing: usize) -> f64 {
    let extra = agreeing.saturating_sub(1) as f64;
    (BASE_CONFIDENCE + AGREEING_SIGNAL_BONUS * extra).min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::creature::{
        AbilityScores, CreatureAbility, CreatureType, HitPoints, Lair, LegendaryAction,
        LegendaryActions, Mythic, Size,
    };

    fn commoner(cr: &str) -> SourceCreature {
        SourceCreature::new(
            "Commoner",
            Size::Medium,
            CreatureType::Humanoid,
            cr,
            10,
            HitPoints::new(4),
            AbilityScores::new(10, 10, 10, 10, 10, 10),
        )
    }

    #[test]
    fn test_minimal_challenge_without_signals_is_minion() {
        let result = classify(&commoner("0"));
        assert_eq!(result.archetype, Archetype::Minion);
        assert!((result.confidence - BASE_CONFIDENCE).abs() < 1e-9);
    }

    #[test]
    fn test_fallback_is_standard() {
        let result = classify(&commoner("2"));
        assert_eq!(result.archetype, Archetype::Standard);
        assert_eq!(result.reasoning(), "no distinctive signals");
        assert!((result.confidence - FALLBACK_CONFIDENCE).abs() < 1e-9);
    }

    #[test]
    fn test_swarm_beats_everything() {
        let creature = SourceCreature::new(
            "Swarm of Bats",
            Size::Medium,
            CreatureType::Beast,
            "1/4",
            12,
            HitPoints::new(22),
            AbilityScores::new(5, 15, 10, 2, 12, 4),
        )
        .with_subtype("swarm of Tiny beasts")
        .with_legendary_resistance(1);
        let result = classify(&creature);
        assert_eq!(result.archetype, Archetype::Swarm);
        // subtype and name agree
        assert_eq!(result.signals.len(), 2);
        assert!((result.confidence - 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_solo_signals_stack_confidence() {
        let creature = commoner("10")
            .with_legendary_resistance(3)
            .with_legendary_actions(LegendaryActions::new(
                3,
                vec![LegendaryAction::new("Detect", "The creature makes a check.")],
            ));
        let result = classify(&creature);
        assert_eq!(result.archetype, Archetype::Solo);
        assert_eq!(
            result.reasoning(),
            "legendary actions; legendary resistance"
        );
        assert!((result.confidence - 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_legendary_resistance_trait_alone_is_solo() {
        let creature = commoner("1/4").with_trait(CreatureAbility::new(
            "Legendary Resistance (3/Day)",
            "If the creature fails a saving throw, it can choose to succeed instead.",
        ));
        assert_eq!(creature.effective_legendary_resistance(), Some(3));
        let result = classify(&creature);
        assert_eq!(result.archetype, Archetype::Solo);
        assert_eq!(result.reasoning(), "legendary resistance");
    }

    #[test]
    fn test_confidence_is_capped() {
        assert!((confidence(1) - BASE_CONFIDENCE).abs() < 1e-9);
        assert!((confidence(3) - 0.8).abs() < 1e-9);
        assert!((confidence(4) - 1.0).abs() < 1e-9);
        assert!((confidence(9) - 1.0).abs() < 1e-9);
        assert!((confidence(0) - BASE_CONFIDENCE).abs() < 1e-9);
    }

    #[test]
    fn test_every_solo_signal_reaches_full_confidence() {
        let creature = commoner("12")
            .with_legendary_resistance(3)
            .with_legendary_actions(LegendaryActions::new(
                3,
                vec![LegendaryAction::new("Detect", "The creature makes a check.")],
            ))
            .with_lair(Lair {
                description: None,
                actions: vec![CreatureAbility::new(
                    "Tremor",
                    "The ground shakes in a 20-foot radius.",
                )],
            })
            .with_mythic(Mythic {
                trait_ability: CreatureAbility::new(
                    "Undying (Recharges after a Long Rest)",
                    "When reduced to 0 hit points, the creature regains 50 hit points.",
                ),
                actions: Vec::new(),
            });
        let result = classify(&creature);
        assert_eq!(result.archetype, Archetype::Solo);
        assert_eq!(result.signals.len(), 4);
        assert!((result.confidence - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_leader_from_vocabulary() {
        let creature = commoner("3").with_action(CreatureAbility::new(
            "Leadership (Recharges after a Short or Long Rest)",
            "For 1 minute, the captain can utter a special command or warning whenever a \
             nonhostile creature that it can see within 30 feet of it makes an attack roll.",
        ));
        assert_eq!(classify(&creature).archetype, Archetype::Leader);
    }

    #[test]
    fn test_ranged_by_attack_count() {
        let creature = commoner("1").with_action(CreatureAbility::new(
            "Longbow",
            "Ranged Weapon Attack: +4 to hit, range 150/600 ft., one target. \
             Hit: 6 (1d8 + 2) piercing damage.",
        ));
        let result = classify(&creature);
        assert_eq!(result.archetype, Archetype::Ranged);
        assert_eq!(result.role, CombatRole::Artillery);
    }

    #[test]
    fn test_controller_role_needs_two_conditions() {
        let creature = commoner("2").with_action(CreatureAbility::new(
            "Tentacles",
            "The target is grappled. Until this grapple ends, the target is restrained.",
        ));
        assert_eq!(classify(&creature).role, CombatRole::Controller);
    }
}
