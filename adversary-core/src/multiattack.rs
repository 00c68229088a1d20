//! Multiattack and legendary folding.
//!
//! A multiattack is not converted on its own. Instead the primary attack it
//! names gets extra damage dice, and a combined "Multiattack" action is
//! emitted when several different attacks are involved. Legendary, mythic,
//! and legendary-resistance entries fold into bonus stress plus costed
//! reactions.

use crate::abilities::{AbilityCompiler, AbilitySection};
use crate::adversary::{ConvertedFeature, Cost, Feature};
use crate::creature::{AttackProfile, Multiattack, MultiattackEntry, SourceCreature};
use crate::patterns::{self, GENERIC_ATTACK_WORDS, NUMBER_WORDS};

/// A compiled attack together with the source profile it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledAttack {
    pub feature: ConvertedFeature,
    pub profile: AttackProfile,
}

/// Which of the three cascading patterns produced a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanSource {
    Structured,
    CountPhrase,
    Fragments,
}

impl PlanSource {
    pub fn name(&self) -> &'static str {
        match self {
            PlanSource::Structured => "structured list",
            PlanSource::CountPhrase => "\"makes N attacks\"",
            PlanSource::Fragments => "\"N with its X\" fragments",
        }
    }
}

/// Attack names and counts recovered from a multiattack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiattackPlan {
    /// Entries with an empty name stand for unnamed attacks.
    pub entries: Vec<MultiattackEntry>,
    pub source: PlanSource,
}

impl MultiattackPlan {
    pub fn total_attacks(&self) -> u32 {
        self.entries.iter().map(|e| e.count).sum()
    }

    /// Extra dice for the primary attack: +1 for two attacks, +2 for three or more.
    pub fn extra_dice(&self) -> u32 {
        match self.total_attacks() {
            0 | 1 => 0,
            2 => 1,
            _ => 2,
        }
    }

    fn named_entries(&self) -> impl Iterator<Item = &MultiattackEntry> {
        self.entries.iter().filter(|e| !e.name.is_empty())
    }
}

/// Naive singular form for matching "claws" against "Claw".
pub fn singularize(word: &str) -> String {
    let lower = word.trim().to_lowercase();
    match lower.strip_suffix('s') {
        Some(stem) if !stem.ends_with('s') && !stem.is_empty() => stem.to_string(),
        _ => lower,
    }
}

fn names_match(attack_name: &str, entry_name: &str) -> bool {
    let attack = singularize(attack_name);
    let entry = singularize(entry_name);
    attack == entry
        || attack.split_whitespace().any(|w| w == entry)
        || entry.split_whitespace().any(|w| w == attack)
}

fn clean_name(name: Option<&str>) -> String {
    let name = name.unwrap_or_default().trim().to_lowercase();
    if GENERIC_ATTACK_WORDS.contains(&name.as_str()) {
        String::new()
    } else {
        singularize(&name)
    }
}

/// Merge repeated names, keeping first-seen order.
fn merge(entries: Vec<MultiattackEntry>) -> Vec<MultiattackEntry> {
    let mut merged: Vec<MultiattackEntry> = Vec::new();
    for entry in entries {
        match merged
            .iter_mut()
            .find(|m| singularize(&m.name) == singularize(&entry.name))
        {
            Some(existing) => existing.count += entry.count,
            None => merged.push(entry),
        }
    }
    merged
}

/// Recover attack names and counts. The first pattern that yields anything
/// is used alone.
pub fn parse_multiattack(multiattack: &Multiattack) -> Option<MultiattackPlan> {
    if !multiattack.attacks.is_empty() {
        return Some(MultiattackPlan {
            entries: merge(multiattack.attacks.clone()),
            source: PlanSource::Structured,
        });
    }

    let text = &multiattack.description;
    if let Some(caps) = patterns::MULTIATTACK_COUNT.captures(text) {
        if let Some(count) = patterns::parse_count(&caps["count"]) {
            let named = clean_name(caps.name("name").map(|m| m.as_str()));
            let name = if named.is_empty() {
                clean_name(caps.name("weapon").map(|m| m.as_str()))
            } else {
                named
            };
            return Some(MultiattackPlan {
                entries: vec![MultiattackEntry::new(name, count)],
                source: PlanSource::CountPhrase,
            });
        }
    }

    let fragments: Vec<MultiattackEntry> = patterns::MULTIATTACK_FRAGMENT
        .captures_iter(text)
        .filter_map(|caps| {
            let count = patterns::parse_count(&caps["count"])?;
            let raw = caps.name("name").or_else(|| caps.name("named"));
            let name = clean_name(raw.map(|m| m.as_str()));
            (!name.is_empty()).then(|| MultiattackEntry::new(name, count))
        })
        .collect();
    if fragments.is_empty() {
        return None;
    }
    Some(MultiattackPlan {
        entries: merge(fragments),
        source: PlanSource::Fragments,
    })
}

/// Pick the attack to enhance: the best name match for the highest-count
/// entry, else the hardest-hitting melee attack, else the first attack.
pub fn select_primary(plan: &MultiattackPlan, attacks: &[CompiledAttack]) -> Option<usize> {
    if attacks.is_empty() {
        return None;
    }

    let mut top: Option<&MultiattackEntry> = None;
    for entry in &plan.entries {
        if top.map_or(true, |t| entry.count > t.count) {
            top = Some(entry);
        }
    }
    if let Some(top) = top.filter(|t| !t.name.is_empty()) {
        if let Some(index) = attacks
            .iter()
            .position(|a| names_match(a.feature.name(), &top.name))
        {
            return Some(index);
        }
    }

    let mut best: Option<(usize, i64)> = None;
    for (index, attack) in attacks.iter().enumerate() {
        if !attack.profile.is_melee() {
            continue;
        }
        let Some(damage) = attack.feature.feature.damage else {
            continue;
        };
        let average = damage.doubled_average();
        if best.map_or(true, |(_, b)| average > b) {
            best = Some((index, average));
        }
    }
    Some(best.map(|(index, _)| index).unwrap_or(0))
}

fn count_word(count: u32) -> String {
    NUMBER_WORDS
        .iter()
        .find(|(_, n)| *n == count)
        .map(|(w, _)| w.to_string())
        .unwrap_or_else(|| count.to_string())
}

/// Result of folding a multiattack.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultiattackFold {
    /// Index of the enhanced attack.
    pub primary: Option<usize>,
    pub extra_dice: u32,
    /// The combined "Multiattack" action, when several named attacks are involved.
    pub combined: Option<ConvertedFeature>,
}

/// Enhance the primary attack in place and build the combined action.
pub fn fold_multiattack(
    multiattack: &Multiattack,
    attacks: &mut [CompiledAttack],
    emit_combined: bool,
) -> MultiattackFold {
    let Some(plan) = parse_multiattack(multiattack) else {
        tracing::trace!(text = %multiattack.description, "multiattack not recognized");
        return MultiattackFold::default();
    };

    let mut fold = MultiattackFold {
        primary: select_primary(&plan, attacks),
        extra_dice: plan.extra_dice(),
        combined: None,
    };

    if let Some(index) = fold.primary {
        let attack = &mut attacks[index].feature;
        match attack.feature.damage {
            Some(damage) if fold.extra_dice > 0 => {
                let enhanced = damage.with_extra_dice(fold.extra_dice);
                attack.feature.description = attack.feature.description.replacen(
                    &damage.emphasized(),
                    &enhanced.emphasized(),
                    1,
                );
                attack.feature.damage = Some(enhanced);
                attack.conversion_notes.push(format!(
                    "multiattack ({}) of {} attacks adds {} dice",
                    plan.source.name(),
                    plan.total_attacks(),
                    fold.extra_dice
                ));
            }
            Some(_) => {}
            None => {
                fold.extra_dice = 0;
                attack
                    .conversion_notes
                    .push("multiattack primary has no damage to enhance".to_string());
            }
        }
    }

    let named: Vec<&MultiattackEntry> = plan.named_entries().collect();
    if emit_combined && named.len() > 1 {
        let parts: Vec<String> = named
            .iter()
            .map(|entry| {
                let display = attacks
                    .iter()
                    .find(|a| names_match(a.feature.name(), &entry.name))
                    .map(|a| a.feature.name().to_string())
                    .unwrap_or_else(|| entry.name.clone());
                let noun = if entry.count == 1 { "attack" } else { "attacks" };
                format!("{} {display} {noun}", count_word(entry.count))
            })
            .collect();
        let description = match parts.split_last() {
            Some((last, rest)) if !rest.is_empty() => {
                format!("This adversary makes {} and {last}.", rest.join(", "))
            }
            _ => format!("This adversary makes {}.", parts.join("")),
        };
        fold.combined = Some(
            ConvertedFeature::new(Feature::action("Multiattack", description), "Multiattack")
                .with_note(format!("{} named attacks via {}", named.len(), plan.source.name())),
        );
    }

    fold
}

/// Result of folding legendary, mythic, and legendary-resistance entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LegendaryFold {
    pub bonus_stress: u32,
    pub features: Vec<ConvertedFeature>,
}

pub fn fold_legendary(creature: &SourceCreature, compiler: &AbilityCompiler) -> LegendaryFold {
    let mut fold = LegendaryFold::default();

    if let Some(legendary) = &creature.legendary_actions {
        fold.bonus_stress = legendary.count;
        for action in &legendary.actions {
            fold.features
                .push(compiler.compile_legendary(action, patterns::LEGENDARY_TRIGGER));
        }
    }

    if let Some(count) = creature.effective_legendary_resistance() {
        let feature = Feature::reaction(
            "Legendary Resistance",
            patterns::LEGENDARY_RESISTANCE_TRIGGER,
            "This adversary succeeds on the Reaction Roll instead.",
        )
        .with_cost(Cost::stress(patterns::LEGENDARY_RESISTANCE_COST));
        fold.features.push(
            ConvertedFeature::new(feature, format!("Legendary Resistance ({count}/Day)"))
                .with_note(format!("{count} uses per day become a Stress cost")),
        );
    }

    if let Some(mythic) = &creature.mythic {
        fold.features.extend(
            compiler.compile(&mythic.trait_ability, AbilitySection::MythicTrait),
        );
        for action in &mythic.actions {
            fold.features
                .push(compiler.compile_legendary(action, patterns::MYTHIC_TRIGGER));
        }
    }

    fold
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::creature::CreatureAbility;

    fn compile_attacks(abilities: &[CreatureAbility]) -> Vec<CompiledAttack> {
        let compiler = AbilityCompiler::default();
        abilities
            .iter()
            .map(|a| CompiledAttack {
                feature: compiler.compile(a, AbilitySection::Action).unwrap(),
                profile: a.effective_attack().unwrap(),
            })
            .collect()
    }

    fn dragon_attacks() -> Vec<CompiledAttack> {
        compile_attacks(&[
            CreatureAbility::new(
                "Bite",
                "Melee Weapon Attack: +14 to hit, reach 10 ft., one target. \
                 Hit: 19 (2d10 + 8) piercing damage plus 7 (2d6) fire damage.",
            ),
            CreatureAbility::new(
                "Claw",
                "Melee Weapon Attack: +14 to hit, reach 5 ft., one target. \
                 Hit: 15 (2d6 + 8) slashing damage.",
            ),
        ])
    }

    #[test]
    fn test_singularize() {
        assert_eq!(singularize("Claws"), "claw");
        assert_eq!(singularize("scimitar"), "scimitar");
        assert_eq!(singularize("Grass"), "grass");
    }

    #[test]
    fn test_structured_list_merges_repeats() {
        let multiattack = Multiattack::new("").with_attacks(vec![
            MultiattackEntry::new("Bite", 1),
            MultiattackEntry::new("Claw", 1),
            MultiattackEntry::new("Claw", 1),
        ]);
        let plan = parse_multiattack(&multiattack).unwrap();
        assert_eq!(plan.source, PlanSource::Structured);
        assert_eq!(plan.entries.len(), 2);
        assert_eq!(plan.total_attacks(), 3);
    }

    #[test]
    fn test_count_phrase() {
        let plan =
            parse_multiattack(&Multiattack::new("The goblin makes two attacks with its scimitar."))
                .unwrap();
        assert_eq!(plan.source, PlanSource::CountPhrase);
        assert_eq!(plan.entries, vec![MultiattackEntry::new("scimitar", 2)]);

        let plan = parse_multiattack(&Multiattack::new("The knight makes two melee attacks."))
            .unwrap();
        assert_eq!(plan.entries, vec![MultiattackEntry::new("", 2)]);
    }

    #[test]
    fn test_fragments() {
        let plan = parse_multiattack(&Multiattack::new(
            "The dragon makes three attacks: one with its bite and two with its claws.",
        ))
        .unwrap();
        assert_eq!(plan.source, PlanSource::Fragments);
        assert_eq!(
            plan.entries,
            vec![
                MultiattackEntry::new("bite", 1),
                MultiattackEntry::new("claw", 2)
            ]
        );
    }

    #[test]
    fn test_unrecognized_multiattack() {
        assert!(parse_multiattack(&Multiattack::new("It attacks wildly.")).is_none());
    }

    #[test]
    fn test_highest_count_entry_is_enhanced() {
        let mut attacks = dragon_attacks();
        let fold = fold_multiattack(
            &Multiattack::new(
                "The dragon makes three attacks: one with its bite and two with its claws.",
            ),
            &mut attacks,
            true,
        );
        assert_eq!(fold.primary, Some(1));
        assert_eq!(fold.extra_dice, 2);
        let claw = &attacks[1].feature.feature;
        assert_eq!(claw.damage.unwrap().notation(), "4d6+8");
        assert_eq!(claw.description, "**4d6+8 phy** damage.");
        // Bite untouched
        assert_eq!(attacks[0].feature.feature.damage.unwrap().notation(), "2d10+8");

        let combined = fold.combined.unwrap();
        assert_eq!(combined.name(), "Multiattack");
        assert_eq!(
            combined.feature.description,
            "This adversary makes one Bite attack and two Claw attacks."
        );
    }

    #[test]
    fn test_unnamed_attacks_enhance_strongest_melee() {
        let mut attacks = dragon_attacks();
        let fold = fold_multiattack(&Multiattack::new("It makes two attacks."), &mut attacks, true);
        // Bite averages 19 against the claw's 15
        assert_eq!(fold.primary, Some(0));
        assert_eq!(fold.extra_dice, 1);
        assert_eq!(attacks[0].feature.feature.damage.unwrap().notation(), "3d10+8");
        assert!(fold.combined.is_none());
    }

    #[test]
    fn test_combined_action_can_be_disabled() {
        let mut attacks = dragon_attacks();
        let fold = fold_multiattack(
            &Multiattack::new("It makes two attacks: one with its bite and one with its claw."),
            &mut attacks,
            false,
        );
        assert!(fold.combined.is_none());
        assert_eq!(fold.extra_dice, 1);
    }
}
