//! Conversion engine.
//!
//! Orchestrates classification, stat conversion, ability compilation, and
//! folding, then assembles the [`Adversary`]. Conversion is synchronous and
//! deterministic: the same record always yields the same output.

use crate::abilities::{special, text, AbilityCompiler, AbilitySection, DEFAULT_SENTENCE_LIMIT};
use crate::adversary::{Adversary, ConvertedFeature, Experience};
use crate::classifier::{self, Archetype};
use crate::creature::{CreatureType, SourceCreature};
use crate::multiattack::{self, CompiledAttack};
use crate::stats::{self, ChallengeRatingError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from a conversion.
#[derive(Debug, Error)]
pub enum ConversionError {
    #[error("Invalid challenge rating: {0}")]
    InvalidChallengeRating(#[from] ChallengeRatingError),

    #[error("Invalid creature record: {0}")]
    InvalidRecord(#[from] serde_json::Error),
}

/// Options for a conversion run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionConfig {
    /// Sentences kept from each rewritten description.
    pub sentence_limit: usize,

    /// Emit a combined "Multiattack" action when several attacks are named.
    pub emit_multiattack_feature: bool,

    /// Compile lair actions.
    pub include_lair_actions: bool,

    /// Compile flight, swimming, and other movement passives.
    pub include_movement_features: bool,

    /// Keep the conversion notes on every feature.
    pub keep_conversion_notes: bool,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl ConversionConfig {
    pub fn new() -> Self {
        Self {
            sentence_limit: DEFAULT_SENTENCE_LIMIT,
            emit_multiattack_feature: true,
            include_lair_actions: true,
            include_movement_features: true,
            keep_conversion_notes: true,
        }
    }

    /// Set how many sentences each description keeps.
    pub fn with_sentence_limit(mut self, limit: usize) -> Self {
        self.sentence_limit = limit;
        self
    }

    pub fn with_multiattack_feature(mut self, emit: bool) -> Self {
        self.emit_multiattack_feature = emit;
        self
    }

    pub fn with_lair_actions(mut self, include: bool) -> Self {
        self.include_lair_actions = include;
        self
    }

    pub fn with_movement_features(mut self, include: bool) -> Self {
        self.include_movement_features = include;
        self
    }

    pub fn with_conversion_notes(mut self, keep: bool) -> Self {
        self.keep_conversion_notes = keep;
        self
    }
}

const MAX_EXPERIENCES: usize = 3;

fn archetype_motives(archetype: Archetype) -> [&'static str; 2] {
    match archetype {
        Archetype::Minion => ["Follow orders", "Overwhelm by numbers"],
        Archetype::Horde => ["Surround", "Tear down the weak"],
        Archetype::Swarm => ["Engulf", "Devour"],
        Archetype::Standard => ["Defend territory", "Drive off intruders"],
        Archetype::Bruiser => ["Smash", "Crush resistance"],
        Archetype::Ranged => ["Keep distance", "Pick off targets"],
        Archetype::Skulk => ["Ambush", "Strike from hiding"],
        Archetype::Support => ["Protect allies", "Mend the wounded"],
        Archetype::Leader => ["Command", "Rally troops"],
        Archetype::Solo => ["Dominate", "Destroy challengers"],
    }
}

fn type_motive(creature_type: CreatureType) -> Option<&'static str> {
    match creature_type {
        CreatureType::Aberration => Some("Twist minds"),
        CreatureType::Beast => Some("Hunt"),
        CreatureType::Celestial => Some("Uphold divine order"),
        CreatureType::Construct => Some("Obey its maker"),
        CreatureType::Dragon => Some("Hoard treasure"),
        CreatureType::Elemental => Some("Unleash raw power"),
        CreatureType::Fey => Some("Bargain and beguile"),
        CreatureType::Fiend => Some("Corrupt"),
        CreatureType::Giant => Some("Lord over lesser folk"),
        CreatureType::Humanoid => Some("Seek advantage"),
        CreatureType::Monstrosity => Some("Feed"),
        CreatureType::Ooze => Some("Consume"),
        CreatureType::Plant => Some("Spread"),
        CreatureType::Undead => Some("Consume the living"),
        CreatureType::Unknown => None,
    }
}

/// Archetype motives first, then the creature type's.
pub fn motives(archetype: Archetype, creature_type: CreatureType) -> Vec<String> {
    let mut motives: Vec<String> = archetype_motives(archetype)
        .iter()
        .map(|m| m.to_string())
        .collect();
    if let Some(motive) = type_motive(creature_type) {
        if !motives.iter().any(|m| m == motive) {
            motives.push(motive.to_string());
        }
    }
    motives
}

/// Top skills by bonus: +3 for a bonus of 8 or more, otherwise +2.
pub fn experiences(creature: &SourceCreature) -> Vec<Experience> {
    let mut skills = creature.skills.clone();
    // Stable sort keeps listing order among equal bonuses
    skills.sort_by(|a, b| b.bonus.cmp(&a.bonus));
    skills
        .into_iter()
        .take(MAX_EXPERIENCES)
        .map(|skill| Experience {
            name: skill.name,
            modifier: if skill.bonus >= 8 { 3 } else { 2 },
        })
        .collect()
}

/// "Small humanoid (goblinoid)." plus the first sentence of the source
/// description when there is one.
pub fn describe(creature: &SourceCreature) -> String {
    let mut line = format!("{} {}", creature.size.name(), creature.creature_type.name());
    if !creature.subtypes.is_empty() {
        line.push_str(&format!(" ({})", creature.subtypes.join(", ")));
    }
    line.push('.');
    if let Some(description) = creature.description.as_deref().map(str::trim) {
        if !description.is_empty() {
            line.push(' ');
            line.push_str(&text::truncate_sentences(description, 1));
        }
    }
    line
}

/// Converts source creatures into adversaries.
#[derive(Debug, Clone, Default)]
pub struct AdversaryConverter {
    config: ConversionConfig,
}

impl AdversaryConverter {
    pub fn new(config: ConversionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ConversionConfig {
        &self.config
    }

    /// Parse adapter JSON and convert it.
    pub fn convert_json(&self, json: &str) -> Result<Adversary, ConversionError> {
        let creature = SourceCreature::from_json(json)?;
        self.convert(&creature)
    }

    /// Convert one creature. The only failure is an unreadable challenge rating.
    pub fn convert(&self, creature: &SourceCreature) -> Result<Adversary, ConversionError> {
        let challenge = creature.challenge()?;

        let classification = classifier::classify(creature);
        tracing::debug!(
            creature = %creature.name,
            archetype = %classification.archetype,
            role = %classification.role,
            confidence = classification.confidence,
            reasoning = %classification.reasoning(),
            "Classified creature"
        );

        let core = stats::convert_stats(
            challenge,
            creature.hit_points.effective_average(),
            creature.armor_class,
            classification.archetype,
        );
        for warning in stats::validate_stats(&core) {
            tracing::warn!(creature = %creature.name, %warning, "Stat bundle failed validation");
        }
        tracing::debug!(
            creature = %creature.name,
            tier = core.tier.number(),
            difficulty = %core.difficulty,
            hp = core.hit_points,
            stress = core.stress,
            evasion = core.evasion,
            "Converted stats"
        );

        let compiler = AbilityCompiler::new(self.config.sentence_limit);
        let mut attacks = Vec::new();
        let mut features = self.compile_features(creature, &compiler, &mut attacks);
        tracing::debug!(
            creature = %creature.name,
            attacks = attacks.len(),
            features = features.len(),
            "Compiled abilities"
        );

        let mut primary = None;
        if let Some(multiattack) = creature.effective_multiattack() {
            let fold = multiattack::fold_multiattack(
                &multiattack,
                &mut attacks,
                self.config.emit_multiattack_feature,
            );
            tracing::debug!(
                creature = %creature.name,
                primary = ?fold.primary,
                extra_dice = fold.extra_dice,
                "Folded multiattack"
            );
            primary = fold.primary;
            features.extend(fold.combined);
        }

        let legendary = multiattack::fold_legendary(creature, &compiler);
        if legendary.bonus_stress > 0 || !legendary.features.is_empty() {
            tracing::debug!(
                creature = %creature.name,
                bonus_stress = legendary.bonus_stress,
                features = legendary.features.len(),
                "Folded legendary actions"
            );
        }
        features.extend(legendary.features);

        let to_hit = attacks
            .get(primary.unwrap_or(0))
            .and_then(|attack| attack.profile.to_hit);
        let attack_modifier = stats::attack_modifier(to_hit, core.tier);

        let mut attacks: Vec<ConvertedFeature> = attacks.into_iter().map(|a| a.feature).collect();
        if !self.config.keep_conversion_notes {
            for feature in attacks.iter_mut().chain(features.iter_mut()) {
                feature.conversion_notes.clear();
            }
        }

        Ok(Adversary {
            name: creature.name.clone(),
            description: describe(creature),
            archetype: classification.archetype,
            role: classification.role,
            motives: motives(classification.archetype, creature.creature_type),
            classification,
            stats: core,
            bonus_stress: legendary.bonus_stress,
            attack_modifier,
            experiences: experiences(creature),
            attacks,
            features,
            source_challenge: creature.challenge_rating.trim().to_string(),
        })
    }

    /// Compile every non-folded ability in stat-block order. Attack actions
    /// go to `attacks`; everything else is returned.
    fn compile_features(
        &self,
        creature: &SourceCreature,
        compiler: &AbilityCompiler,
        attacks: &mut Vec<CompiledAttack>,
    ) -> Vec<ConvertedFeature> {
        let mut features = Vec::new();

        for ability in &creature.traits {
            if creature.spellcasting.is_some() && special::is_spellcasting_trait(&ability.name) {
                tracing::trace!(ability = %ability.name, "trait covered by spellcasting block");
                continue;
            }
            features.extend(compiler.compile(ability, AbilitySection::Trait));
        }

        for ability in &creature.actions {
            let Some(compiled) = compiler.compile(ability, AbilitySection::Action) else {
                continue;
            };
            match ability.effective_attack() {
                Some(profile) => attacks.push(CompiledAttack {
                    feature: compiled,
                    profile,
                }),
                None => features.push(compiled),
            }
        }

        for ability in &creature.bonus_actions {
            features.extend(compiler.compile(ability, AbilitySection::BonusAction));
        }
        for ability in &creature.reactions {
            features.extend(compiler.compile(ability, AbilitySection::Reaction));
        }

        if let Some(spellcasting) = &creature.spellcasting {
            features.extend(special::compile_spellcasting(spellcasting));
        }
        if self.config.include_movement_features {
            features.extend(special::compile_movement(&creature.speeds));
        }
        features.extend(special::compile_damage_defenses(
            &creature.damage_resistances,
            &creature.damage_immunities,
            &creature.damage_vulnerabilities,
        ));
        features.extend(special::compile_condition_immunities(
            &creature.condition_immunities,
        ));

        if self.config.include_lair_actions {
            if let Some(lair) = &creature.lair {
                for ability in &lair.actions {
                    features.extend(compiler.compile(ability, AbilitySection::Lair));
                }
            }
        }

        features
    }
}

/// Convert with the default configuration.
pub fn convert(creature: &SourceCreature) -> Result<Adversary, ConversionError> {
    AdversaryConverter::default().convert(creature)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::creature::{AbilityScores, HitPoints, Size};

    fn bandit() -> SourceCreature {
        SourceCreature::new(
            "Bandit",
            Size::Medium,
            CreatureType::Humanoid,
            "1/8",
            12,
            HitPoints::new(11).with_formula("2d8+2"),
            AbilityScores::new(11, 12, 12, 10, 10, 10),
        )
        .with_subtype("any race")
        .with_description("Bandits rove in gangs. They are led by thugs.")
    }

    #[test]
    fn test_config_builder() {
        let config = ConversionConfig::new()
            .with_sentence_limit(1)
            .with_multiattack_feature(false)
            .with_conversion_notes(false);
        assert_eq!(config.sentence_limit, 1);
        assert!(!config.emit_multiattack_feature);
        assert!(config.include_lair_actions);
        assert!(!config.keep_conversion_notes);
    }

    #[test]
    fn test_config_from_partial_json() {
        let config: ConversionConfig = serde_json::from_str(r#"{"sentence_limit": 2}"#).unwrap();
        assert_eq!(config.sentence_limit, 2);
        assert!(config.emit_multiattack_feature);
    }

    #[test]
    fn test_describe() {
        assert_eq!(
            describe(&bandit()),
            "Medium humanoid (any race). Bandits rove in gangs."
        );
    }

    #[test]
    fn test_experiences_top_three() {
        let creature = bandit()
            .with_skill("Athletics", 3)
            .with_skill("Stealth", 8)
            .with_skill("Perception", 4)
            .with_skill("Deception", 4);
        let experiences = experiences(&creature);
        let rendered: Vec<String> = experiences.iter().map(|e| e.to_string()).collect();
        assert_eq!(rendered, vec!["Stealth +3", "Perception +2", "Deception +2"]);
    }

    #[test]
    fn test_motives_do_not_repeat() {
        assert_eq!(
            motives(Archetype::Skulk, CreatureType::Beast),
            vec!["Ambush", "Strike from hiding", "Hunt"]
        );
        assert_eq!(motives(Archetype::Swarm, CreatureType::Unknown).len(), 2);
    }

    #[test]
    fn test_invalid_challenge_rating_is_the_only_failure() {
        let mut creature = bandit();
        creature.challenge_rating = "one eighth".to_string();
        assert!(matches!(
            convert(&creature),
            Err(ConversionError::InvalidChallengeRating(_))
        ));
    }

    #[test]
    fn test_invalid_json() {
        let result = AdversaryConverter::default().convert_json("{\"name\": 3}");
        assert!(matches!(result, Err(ConversionError::InvalidRecord(_))));
    }
}
