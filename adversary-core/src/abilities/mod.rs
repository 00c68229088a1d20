//! Ability compilation.
//!
//! Turns each source trait, action, bonus action, reaction, legendary
//! action, lair action, and mythic entry into at most one target feature.
//! Costs come from usage metadata and the costly-name floors; triggers come
//! from the reaction table or the ability text. Every feature records the
//! rules that produced it in its conversion notes.
//!
//! # Example
//!
//! ```
//! use adversary_core::abilities::{AbilityCompiler, AbilitySection};
//! use adversary_core::creature::CreatureAbility;
//!
//! let compiler = AbilityCompiler::default();
//! let breath = CreatureAbility::new(
//!     "Lightning Burst (Recharge 6)",
//!     "Each creature within 10 feet must make a DC 13 Dexterity saving throw, \
//!      taking 22 (5d8) lightning damage on a failed save.",
//! );
//! let feature = compiler.compile(&breath, AbilitySection::Action).unwrap();
//! assert_eq!(feature.name(), "Lightning Burst");
//! assert_eq!(feature.feature.cost_amount(), 2);
//! ```

pub mod damage;
pub mod special;
pub mod text;

use crate::adversary::{ConvertedFeature, Cost, Feature, FeatureKind, RangeBand};
use crate::creature::{
    AttackKind, AttackProfile, CreatureAbility, LegendaryAction, SavingThrow, Usage,
};
use crate::patterns::{self, TraitOutcome, COSTLY_ACTIONS, REACTION_RULES, TRAIT_RULES};

/// Which stat-block section an ability came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AbilitySection {
    Trait,
    Action,
    BonusAction,
    Reaction,
    Lair,
    MythicTrait,
}

impl AbilitySection {
    pub fn name(&self) -> &'static str {
        match self {
            AbilitySection::Trait => "trait",
            AbilitySection::Action => "action",
            AbilitySection::BonusAction => "bonus action",
            AbilitySection::Reaction => "reaction",
            AbilitySection::Lair => "lair action",
            AbilitySection::MythicTrait => "mythic trait",
        }
    }
}

pub const DEFAULT_SENTENCE_LIMIT: usize = 3;

/// Stress cost implied by limited-use metadata.
pub fn usage_cost(usage: Usage) -> u32 {
    match usage {
        Usage::Recharge { min } if min >= 6 => 2,
        Usage::Recharge { .. } => 1,
        Usage::PerLongRest { count } if count <= 1 => 2,
        Usage::PerLongRest { .. } | Usage::PerShortRest { .. } | Usage::PerDay { .. } => 1,
    }
}

/// Target text for an attack ("Melee", "Far") or an area ("Close cone").
pub fn target_text(attack: Option<&AttackProfile>, description: &str) -> Option<String> {
    if let Some(attack) = attack {
        let melee = RangeBand::from_feet(attack.reach_ft.unwrap_or(5));
        let ranged = attack
            .range_ft
            .map(RangeBand::from_feet)
            .unwrap_or(RangeBand::Far);
        return Some(match attack.kind {
            AttackKind::Melee => melee.name().to_string(),
            AttackKind::Ranged => ranged.name().to_string(),
            AttackKind::MeleeOrRanged => format!("{} or {}", melee, ranged),
        });
    }
    let caps = patterns::AREA.captures(description)?;
    let feet = caps["feet"].parse().ok()?;
    Some(format!(
        "{} {}",
        RangeBand::from_feet(feet),
        caps["shape"].to_lowercase()
    ))
}

/// Compiles single abilities into converted features.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AbilityCompiler {
    sentence_limit: usize,
}

impl Default for AbilityCompiler {
    fn default() -> Self {
        Self::new(DEFAULT_SENTENCE_LIMIT)
    }
}

impl AbilityCompiler {
    pub fn new(sentence_limit: usize) -> Self {
        Self { sentence_limit }
    }

    pub fn rewrite(&self, description: &str) -> String {
        text::rewrite(description, self.sentence_limit)
    }

    /// Compile one ability. Returns `None` when the ability is folded into
    /// another component (multiattack, legendary resistance).
    pub fn compile(
        &self,
        ability: &CreatureAbility,
        section: AbilitySection,
    ) -> Option<ConvertedFeature> {
        let compiled = match section {
            AbilitySection::Trait => self.compile_trait(ability),
            AbilitySection::Action | AbilitySection::BonusAction => {
                self.compile_action(ability, section)
            }
            AbilitySection::Reaction => Some(self.compile_reaction(ability)),
            AbilitySection::Lair => Some(self.compile_lair(ability)),
            AbilitySection::MythicTrait => Some(self.compile_mythic_trait(ability)),
        };
        if compiled.is_none() {
            tracing::trace!(ability = %ability.name, section = section.name(), "ability folded");
        }
        compiled
    }

    /// Legendary and mythic actions become costed reactions with a fixed trigger.
    pub fn compile_legendary(&self, action: &LegendaryAction, trigger: &str) -> ConvertedFeature {
        let cost = action.point_cost();
        let feature = Feature::reaction(action.bare_name(), trigger, self.rewrite(&action.description))
            .with_cost(Cost::stress(cost));
        let attack = AttackProfile::from_text(&action.description);
        let save = SavingThrow::from_text(&action.description);
        let (feature, notes) = self.finish(feature, &action.description, attack.as_ref(), save);
        let plural = if cost == 1 { "" } else { "s" };
        let mut converted = ConvertedFeature::new(feature, action.name.clone())
            .with_note(format!("legendary action costing {cost} point{plural}"));
        converted.conversion_notes.extend(notes);
        converted
    }

    fn compile_trait(&self, ability: &CreatureAbility) -> Option<ConvertedFeature> {
        let name = ability.bare_name();
        if name.to_lowercase().contains("legendary resistance") {
            return None;
        }

        for rule in TRAIT_RULES.iter() {
            let Some(caps) = rule.pattern.captures(&ability.description) else {
                continue;
            };
            tracing::trace!(rule = rule.id, ability = %name, "trait rule matched");
            let (target_name, kind, template) = match &rule.outcome {
                TraitOutcome::Folded { .. } => return None,
                TraitOutcome::Feature {
                    name,
                    kind,
                    template,
                } => (*name, *kind, *template),
            };
            let mut filled = String::new();
            caps.expand(template, &mut filled);
            let description = self.rewrite(&filled);
            let feature = match kind {
                FeatureKind::Passive => Feature::passive(target_name, description),
                FeatureKind::Action => Feature::action(target_name, description),
                FeatureKind::Reaction => Feature::reaction(
                    target_name,
                    patterns::DEFAULT_REACTION_TRIGGER,
                    description,
                ),
            };
            let (feature, notes) = self.finish(feature, &filled, None, None);
            let mut converted = ConvertedFeature::new(feature, ability.name.clone())
                .with_note(format!("trait rule '{}'", rule.id));
            converted.conversion_notes.extend(notes);
            return Some(converted);
        }

        let description = self.rewrite(&ability.description);
        let usage = ability.effective_usage();
        let (feature, usage_note) = match usage {
            Some(usage) => {
                let cost = usage_cost(usage);
                (
                    Feature::action(&name, description).with_cost(Cost::stress(cost)),
                    Some(format!("{} costs {cost} Stress", usage.label())),
                )
            }
            None => (Feature::passive(&name, description), None),
        };
        let (feature, notes) = self.finish(
            feature,
            &ability.description,
            ability.effective_attack().as_ref(),
            ability.effective_save(),
        );
        let mut converted = ConvertedFeature::new(feature, ability.name.clone())
            .with_note("no trait rule matched");
        converted.conversion_notes.extend(usage_note);
        converted.conversion_notes.extend(notes);
        Some(converted)
    }

    fn compile_action(
        &self,
        ability: &CreatureAbility,
        section: AbilitySection,
    ) -> Option<ConvertedFeature> {
        if ability.is_multiattack() {
            return None;
        }
        let name = ability.bare_name();
        let mut notes = vec![section.name().to_string()];

        let mut cost = 0;
        if let Some(usage) = ability.effective_usage() {
            cost = usage_cost(usage);
            notes.push(format!("{} costs {cost} Stress", usage.label()));
        }
        if let Some(rule) = COSTLY_ACTIONS.iter().find(|r| r.pattern.is_match(&name)) {
            if rule.floor > cost {
                cost = rule.floor;
                notes.push(format!("costly action '{}' raises cost to {cost}", rule.id));
            }
        }

        let cost = (cost > 0).then(|| Cost::stress(cost));
        let feature =
            Feature::action(&name, self.rewrite(&ability.description)).with_optional_cost(cost);
        let (feature, finish_notes) = self.finish(
            feature,
            &ability.description,
            ability.effective_attack().as_ref(),
            ability.effective_save(),
        );
        notes.extend(finish_notes);
        Some(ConvertedFeature {
            feature,
            source_ability: ability.name.clone(),
            conversion_notes: notes,
        })
    }

    fn compile_reaction(&self, ability: &CreatureAbility) -> ConvertedFeature {
        let name = ability.bare_name();
        let mut notes = Vec::new();

        let (cost, trigger) = match REACTION_RULES.iter().find(|r| r.pattern.is_match(&name)) {
            Some(rule) => {
                notes.push(format!("reaction rule '{}'", rule.id));
                (rule.cost, rule.trigger.to_string())
            }
            None => {
                let cost = ability.effective_usage().map(usage_cost).unwrap_or(0).max(1);
                let trigger = patterns::REACTION_TRIGGER
                    .captures(&ability.description)
                    .map(|caps| format!("When {}", caps["clause"].trim()))
                    .unwrap_or_else(|| patterns::DEFAULT_REACTION_TRIGGER.to_string());
                notes.push(format!("default reaction cost {cost}"));
                (cost, trigger)
            }
        };

        let feature = Feature::reaction(&name, trigger, self.rewrite(&ability.description))
            .with_cost(Cost::stress(cost));
        let (feature, finish_notes) = self.finish(
            feature,
            &ability.description,
            ability.effective_attack().as_ref(),
            ability.effective_save(),
        );
        notes.extend(finish_notes);
        ConvertedFeature {
            feature,
            source_ability: ability.name.clone(),
            conversion_notes: notes,
        }
    }

    fn compile_lair(&self, ability: &CreatureAbility) -> ConvertedFeature {
        let name = format!("Lair: {}", ability.bare_name());
        let feature =
            Feature::action(name, self.rewrite(&ability.description)).with_cost(Cost::fear(1));
        let (feature, notes) = self.finish(
            feature,
            &ability.description,
            ability.effective_attack().as_ref(),
            ability.effective_save(),
        );
        let mut converted =
            ConvertedFeature::new(feature, ability.name.clone()).with_note("lair action costs 1 Fear");
        converted.conversion_notes.extend(notes);
        converted
    }

    fn compile_mythic_trait(&self, ability: &CreatureAbility) -> ConvertedFeature {
        let feature = Feature::passive(ability.bare_name(), self.rewrite(&ability.description));
        let (feature, notes) =
            self.finish(feature, &ability.description, None, ability.effective_save());
        let mut converted = ConvertedFeature::new(feature, ability.name.clone())
            .with_note("mythic trait");
        converted.conversion_notes.extend(notes);
        converted
    }

    /// Attach damage, save, target, and condition data found in `source_text`.
    fn finish(
        &self,
        mut feature: Feature,
        source_text: &str,
        attack: Option<&AttackProfile>,
        save: Option<SavingThrow>,
    ) -> (Feature, Vec<String>) {
        let mut notes = Vec::new();

        if let Some(found) = damage::extract(source_text) {
            let expression = if attack.is_some() {
                found.expression
            } else {
                found.expression.direct()
            };
            notes.push(format!("damage from layer '{}'", found.layer));
            feature = feature.with_damage(expression);
        }

        if let Some(save) = save {
            let check = text::save_check(save);
            notes.push(format!(
                "DC {} {} save becomes {} {}",
                save.dc,
                save.ability.name(),
                check.attribute,
                check.difficulty
            ));
            feature = feature.with_save(check);
        }

        if let Some(target) = target_text(attack, source_text) {
            feature = feature.with_target(target);
        }

        let tagged_text = format!("{}. {}", feature.name, source_text);
        for tag in text::condition_tags(&tagged_text) {
            feature = feature.with_condition(tag);
        }

        (feature, notes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adversary::{CheckAttribute, ConditionTag, DamageCategory, ResourceKind};

    fn compiler() -> AbilityCompiler {
        AbilityCompiler::default()
    }

    #[test]
    fn test_usage_costs() {
        assert_eq!(usage_cost(Usage::Recharge { min: 6 }), 2);
        assert_eq!(usage_cost(Usage::Recharge { min: 5 }), 1);
        assert_eq!(usage_cost(Usage::Recharge { min: 4 }), 1);
        assert_eq!(usage_cost(Usage::PerLongRest { count: 1 }), 2);
        assert_eq!(usage_cost(Usage::PerLongRest { count: 2 }), 1);
        assert_eq!(usage_cost(Usage::PerShortRest { count: 1 }), 1);
        assert_eq!(usage_cost(Usage::PerDay { count: 3 }), 1);
    }

    #[test]
    fn test_trait_rule_fills_template() {
        let ability = CreatureAbility::new(
            "Keen Hearing and Smell",
            "The wolf has advantage on Wisdom (Perception) checks that rely on hearing or smell.",
        );
        let converted = compiler().compile(&ability, AbilitySection::Trait).unwrap();
        assert_eq!(converted.name(), "Keen Senses");
        assert_eq!(converted.kind(), FeatureKind::Passive);
        assert_eq!(
            converted.feature.description,
            "This adversary has advantage on rolls to notice things by hearing or smell."
        );
        assert_eq!(converted.source_ability, "Keen Hearing and Smell");
        assert_eq!(converted.conversion_notes[0], "trait rule 'keen_senses'");
    }

    #[test]
    fn test_legendary_resistance_trait_is_folded() {
        let ability = CreatureAbility::new(
            "Legendary Resistance (3/Day)",
            "If the dragon fails a saving throw, it can choose to succeed instead.",
        );
        assert!(compiler().compile(&ability, AbilitySection::Trait).is_none());
    }

    #[test]
    fn test_unmatched_trait_is_passive_without_cost() {
        let ability = CreatureAbility::new("Stench", "Anything nearby smells terrible.");
        let converted = compiler().compile(&ability, AbilitySection::Trait).unwrap();
        assert_eq!(converted.kind(), FeatureKind::Passive);
        assert!(converted.feature.cost.is_none());
    }

    #[test]
    fn test_limited_use_trait_becomes_action() {
        let ability = CreatureAbility::new(
            "Relentless (Recharges after a Short or Long Rest)",
            "If the boar takes 7 damage or less that would reduce it to 0 hit points, \
             it is reduced to 1 hit point instead.",
        );
        let converted = compiler().compile(&ability, AbilitySection::Trait).unwrap();
        assert_eq!(converted.name(), "Relentless");
        assert_eq!(converted.kind(), FeatureKind::Action);
        assert_eq!(converted.feature.cost_amount(), 1);
    }

    #[test]
    fn test_recharge_costs_on_actions() {
        let six = CreatureAbility::new("Lightning Burst (Recharge 6)", "A flash of light.");
        let five = CreatureAbility::new("Lightning Burst (Recharge 5\u{2013}6)", "A flash of light.");
        assert_eq!(
            compiler()
                .compile(&six, AbilitySection::Action)
                .unwrap()
                .feature
                .cost_amount(),
            2
        );
        assert_eq!(
            compiler()
                .compile(&five, AbilitySection::Action)
                .unwrap()
                .feature
                .cost_amount(),
            1
        );
    }

    #[test]
    fn test_costly_name_floor() {
        let breath = CreatureAbility::new("Fire Breath (Recharge 5\u{2013}6)", "Fire everywhere.");
        let converted = compiler().compile(&breath, AbilitySection::Action).unwrap();
        assert_eq!(converted.feature.cost_amount(), 2);
        assert!(converted
            .conversion_notes
            .iter()
            .any(|n| n.contains("breath_weapon")));

        let gaze = CreatureAbility::new("Petrifying Gaze", "Stone.");
        assert_eq!(
            compiler()
                .compile(&gaze, AbilitySection::Action)
                .unwrap()
                .feature
                .cost_amount(),
            1
        );
    }

    #[test]
    fn test_attack_action() {
        let ability = CreatureAbility::new(
            "Scimitar",
            "Melee Weapon Attack: +4 to hit, reach 5 ft., one target. Hit: 5 (1d6 + 2) slashing damage.",
        );
        let converted = compiler().compile(&ability, AbilitySection::Action).unwrap();
        let feature = &converted.feature;
        assert!(feature.cost.is_none());
        assert_eq!(feature.description, "**1d6+2 phy** damage.");
        assert_eq!(feature.target.as_deref(), Some("Melee"));
        let damage = feature.damage.unwrap();
        assert_eq!(damage.category, DamageCategory::Physical);
        assert!(!damage.direct);
    }

    #[test]
    fn test_save_action_is_direct_with_check() {
        let ability = CreatureAbility::new(
            "Frightful Presence",
            "Each creature of the dragon's choice within 120 feet must succeed on a DC 19 \
             Wisdom saving throw or become frightened for 1 minute.",
        );
        let converted = compiler().compile(&ability, AbilitySection::Action).unwrap();
        let feature = &converted.feature;
        assert_eq!(feature.cost_amount(), 1);
        let save = feature.save.unwrap();
        assert_eq!(save.attribute, CheckAttribute::Instinct);
        assert_eq!(save.difficulty, 17);
        assert!(feature.conditions.contains(&ConditionTag::Frightened));
        assert!(feature
            .description
            .contains("**mark 1 Fear** and become Frightened"));
    }

    #[test]
    fn test_area_target() {
        let ability = CreatureAbility::new(
            "Cold Breath (Recharge 5\u{2013}6)",
            "The dragon exhales an icy blast in a 30-foot cone. Each creature in that area \
             must make a DC 12 Constitution saving throw, taking 22 (5d8) cold damage on a failed save.",
        );
        let converted = compiler().compile(&ability, AbilitySection::Action).unwrap();
        assert_eq!(converted.feature.target.as_deref(), Some("Close cone"));
        assert!(converted.feature.damage.unwrap().direct);
    }

    #[test]
    fn test_multiattack_action_is_folded() {
        let ability = CreatureAbility::new("Multiattack", "The wolf makes two attacks.");
        assert!(compiler().compile(&ability, AbilitySection::Action).is_none());
    }

    #[test]
    fn test_known_reaction_overrides() {
        let parry = CreatureAbility::new(
            "Parry",
            "The knight adds 2 to its AC against one melee attack that would hit it.",
        );
        let converted = compiler().compile(&parry, AbilitySection::Reaction).unwrap();
        assert_eq!(converted.kind(), FeatureKind::Reaction);
        assert_eq!(converted.feature.cost_amount(), 1);
        assert_eq!(
            converted.feature.trigger.as_deref(),
            Some("When this adversary would be hit by a melee attack")
        );
    }

    #[test]
    fn test_shield_override_needs_the_whole_name() {
        let shield = CreatureAbility::new(
            "Shield",
            "The mage gains a +5 bonus to AC until the start of its next turn.",
        );
        let converted = compiler().compile(&shield, AbilitySection::Reaction).unwrap();
        assert_eq!(converted.conversion_notes[0], "reaction rule 'shield'");
        assert_eq!(
            converted.feature.trigger.as_deref(),
            Some("When an attack would hit this adversary")
        );

        let bash = CreatureAbility::new(
            "Shield Bash",
            "When a creature moves within 5 feet of the knight, the knight shoves it.",
        );
        let converted = compiler().compile(&bash, AbilitySection::Reaction).unwrap();
        assert!(!converted
            .conversion_notes
            .iter()
            .any(|n| n.starts_with("reaction rule")));
        assert_ne!(
            converted.feature.trigger.as_deref(),
            Some("When an attack would hit this adversary")
        );
    }

    #[test]
    fn test_default_reaction_trigger_from_text() {
        let ability = CreatureAbility::new(
            "Split",
            "When a pudding that is Medium or larger is subjected to lightning damage, it splits.",
        );
        let converted = compiler().compile(&ability, AbilitySection::Reaction).unwrap();
        assert_eq!(converted.feature.cost_amount(), 1);
        assert_eq!(
            converted.feature.trigger.as_deref(),
            Some("When a pudding that is Medium or larger is subjected to lightning damage")
        );
    }

    #[test]
    fn test_legendary_action_cost_passes_through() {
        let action = LegendaryAction::new(
            "Wing Attack (Costs 2 Actions)",
            "The dragon beats its wings.",
        );
        let converted = compiler().compile_legendary(&action, patterns::LEGENDARY_TRIGGER);
        assert_eq!(converted.name(), "Wing Attack");
        assert_eq!(converted.kind(), FeatureKind::Reaction);
        assert_eq!(converted.feature.cost_amount(), 2);
        assert_eq!(
            converted.feature.trigger.as_deref(),
            Some("at the end of another creature's turn")
        );
    }

    #[test]
    fn test_lair_actions_cost_fear() {
        let ability = CreatureAbility::new("Magma Eruption", "Magma erupts from the ground.");
        let converted = compiler().compile(&ability, AbilitySection::Lair).unwrap();
        assert_eq!(converted.name(), "Lair: Magma Eruption");
        assert_eq!(converted.feature.cost.unwrap().resource, ResourceKind::Fear);
    }
}
