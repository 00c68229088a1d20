//! Source creature records.
//!
//! Contains the normalized stat-block shape that dialect adapters produce:
//! identity, numbers, ability scores, and the open-ended lists of traits
//! and actions the conversion engine compiles. Every optional field means
//! "not applicable" when absent.

use crate::dice::Dice;
use crate::patterns;
use crate::stats::{ChallengeRating, ChallengeRatingError};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Identity
// ============================================================================

/// Creature size categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Size {
    Tiny,
    Small,
    #[default]
    Medium,
    Large,
    Huge,
    Gargantuan,
}

impl Size {
    pub fn name(&self) -> &'static str {
        match self {
            Size::Tiny => "Tiny",
            Size::Small => "Small",
            Size::Medium => "Medium",
            Size::Large => "Large",
            Size::Huge => "Huge",
            Size::Gargantuan => "Gargantuan",
        }
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Creature type tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CreatureType {
    Aberration,
    Beast,
    Celestial,
    Construct,
    Dragon,
    Elemental,
    Fey,
    Fiend,
    Giant,
    Humanoid,
    Monstrosity,
    Ooze,
    Plant,
    Undead,
    #[default]
    #[serde(other)]
    Unknown,
}

impl CreatureType {
    pub fn name(&self) -> &'static str {
        match self {
            CreatureType::Aberration => "aberration",
            CreatureType::Beast => "beast",
            CreatureType::Celestial => "celestial",
            CreatureType::Construct => "construct",
            CreatureType::Dragon => "dragon",
            CreatureType::Elemental => "elemental",
            CreatureType::Fey => "fey",
            CreatureType::Fiend => "fiend",
            CreatureType::Giant => "giant",
            CreatureType::Humanoid => "humanoid",
            CreatureType::Monstrosity => "monstrosity",
            CreatureType::Ooze => "ooze",
            CreatureType::Plant => "plant",
            CreatureType::Undead => "undead",
            CreatureType::Unknown => "creature",
        }
    }
}

impl fmt::Display for CreatureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

// ============================================================================
// Ability Scores
// ============================================================================

/// The six ability scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Ability {
    Strength,
    Dexterity,
    Constitution,
    Intelligence,
    Wisdom,
    Charisma,
}

impl Ability {
    pub fn abbreviation(&self) -> &'static str {
        match self {
            Ability::Strength => "STR",
            Ability::Dexterity => "DEX",
            Ability::Constitution => "CON",
            Ability::Intelligence => "INT",
            Ability::Wisdom => "WIS",
            Ability::Charisma => "CHA",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Ability::Strength => "Strength",
            Ability::Dexterity => "Dexterity",
            Ability::Constitution => "Constitution",
            Ability::Intelligence => "Intelligence",
            Ability::Wisdom => "Wisdom",
            Ability::Charisma => "Charisma",
        }
    }

    /// Parse either the full name or the three-letter abbreviation.
    pub fn parse(s: &str) -> Option<Ability> {
        let s = s.trim().to_lowercase();
        Ability::all()
            .into_iter()
            .find(|a| a.name().to_lowercase() == s || a.abbreviation().to_lowercase() == s)
    }

    pub fn all() -> [Ability; 6] {
        [
            Ability::Strength,
            Ability::Dexterity,
            Ability::Constitution,
            Ability::Intelligence,
            Ability::Wisdom,
            Ability::Charisma,
        ]
    }
}

impl fmt::Display for Ability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.abbreviation())
    }
}

/// Ability scores container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilityScores {
    pub strength: u8,
    pub dexterity: u8,
    pub constitution: u8,
    pub intelligence: u8,
    pub wisdom: u8,
    pub charisma: u8,
}

impl AbilityScores {
    pub fn new(str: u8, dex: u8, con: u8, int: u8, wis: u8, cha: u8) -> Self {
        Self {
            strength: str,
            dexterity: dex,
            constitution: con,
            intelligence: int,
            wisdom: wis,
            charisma: cha,
        }
    }

    pub fn get(&self, ability: Ability) -> u8 {
        match ability {
            Ability::Strength => self.strength,
            Ability::Dexterity => self.dexterity,
            Ability::Constitution => self.constitution,
            Ability::Intelligence => self.intelligence,
            Ability::Wisdom => self.wisdom,
            Ability::Charisma => self.charisma,
        }
    }
}

impl Default for AbilityScores {
    fn default() -> Self {
        Self::new(10, 10, 10, 10, 10, 10)
    }
}

// ============================================================================
// Defenses
// ============================================================================

/// Source damage types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DamageType {
    Slashing,
    Piercing,
    Bludgeoning,
    Fire,
    Cold,
    Lightning,
    Thunder,
    Acid,
    Poison,
    Necrotic,
    Radiant,
    Force,
    Psychic,
}

impl DamageType {
    pub fn name(&self) -> &'static str {
        match self {
            DamageType::Slashing => "slashing",
            DamageType::Piercing => "piercing",
            DamageType::Bludgeoning => "bludgeoning",
            DamageType::Fire => "fire",
            DamageType::Cold => "cold",
            DamageType::Lightning => "lightning",
            DamageType::Thunder => "thunder",
            DamageType::Acid => "acid",
            DamageType::Poison => "poison",
            DamageType::Necrotic => "necrotic",
            DamageType::Radiant => "radiant",
            DamageType::Force => "force",
            DamageType::Psychic => "psychic",
        }
    }

    pub fn is_physical(&self) -> bool {
        matches!(
            self,
            DamageType::Slashing | DamageType::Piercing | DamageType::Bludgeoning
        )
    }
}

impl fmt::Display for DamageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Source conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Condition {
    Blinded,
    Charmed,
    Deafened,
    Exhaustion,
    Frightened,
    Grappled,
    Incapacitated,
    Invisible,
    Paralyzed,
    Petrified,
    Poisoned,
    Prone,
    Restrained,
    Stunned,
    Unconscious,
}

impl Condition {
    pub fn name(&self) -> &'static str {
        match self {
            Condition::Blinded => "Blinded",
            Condition::Charmed => "Charmed",
            Condition::Deafened => "Deafened",
            Condition::Exhaustion => "Exhaustion",
            Condition::Frightened => "Frightened",
            Condition::Grappled => "Grappled",
            Condition::Incapacitated => "Incapacitated",
            Condition::Invisible => "Invisible",
            Condition::Paralyzed => "Paralyzed",
            Condition::Petrified => "Petrified",
            Condition::Poisoned => "Poisoned",
            Condition::Prone => "Prone",
            Condition::Restrained => "Restrained",
            Condition::Stunned => "Stunned",
            Condition::Unconscious => "Unconscious",
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

// ============================================================================
// Numbers
// ============================================================================

/// Hit points as printed: an average plus the dice formula.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HitPoints {
    pub average: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formula: Option<String>,
}

impl HitPoints {
    pub fn new(average: u32) -> Self {
        Self {
            average,
            formula: None,
        }
    }

    pub fn with_formula(mut self, formula: impl Into<String>) -> Self {
        self.formula = Some(formula.into());
        self
    }

    /// The printed average, or the formula's average when the adapter left
    /// the average at zero.
    pub fn effective_average(&self) -> u32 {
        if self.average > 0 {
            return self.average;
        }
        self.formula
            .as_deref()
            .and_then(|f| Dice::parse(f).ok())
            .map(|dice| u32::try_from(dice.average().max(0)).unwrap_or(u32::MAX))
            .unwrap_or(0)
    }
}

/// Movement speeds in feet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Speeds {
    pub walk: Option<u32>,
    pub fly: Option<u32>,
    pub swim: Option<u32>,
    pub climb: Option<u32>,
    pub burrow: Option<u32>,
    pub hover: bool,
}

impl Speeds {
    pub fn walking(feet: u32) -> Self {
        Self {
            walk: Some(feet),
            ..Default::default()
        }
    }

    pub fn with_fly(mut self, feet: u32) -> Self {
        self.fly = Some(feet);
        self
    }

    pub fn with_swim(mut self, feet: u32) -> Self {
        self.swim = Some(feet);
        self
    }

    pub fn with_climb(mut self, feet: u32) -> Self {
        self.climb = Some(feet);
        self
    }

    pub fn with_burrow(mut self, feet: u32) -> Self {
        self.burrow = Some(feet);
        self
    }

    pub fn hovering(mut self) -> Self {
        self.hover = true;
        self
    }

    pub fn can_fly(&self) -> bool {
        self.fly.is_some_and(|f| f > 0)
    }
}

/// A skill line such as "Stealth +6".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillBonus {
    pub name: String,
    pub bonus: i32,
}

impl SkillBonus {
    pub fn new(name: impl Into<String>, bonus: i32) -> Self {
        Self {
            name: name.into(),
            bonus,
        }
    }
}

// ============================================================================
// Abilities
// ============================================================================

/// Limited-use metadata attached to a trait or action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Usage {
    /// "Recharge 5–6": usable again on a d6 roll of `min` or higher.
    Recharge { min: u8 },
    PerDay { count: u32 },
    PerLongRest { count: u32 },
    PerShortRest { count: u32 },
}

impl Usage {
    /// Split a printed name like "Fire Breath (Recharge 5–6)" into the bare
    /// name and its usage metadata.
    pub fn split_name(name: &str) -> (String, Option<Usage>) {
        if let Some(caps) = patterns::RECHARGE_SUFFIX.captures(name) {
            let min = caps[1].parse().unwrap_or(6);
            return (strip_match(name, &caps[0]), Some(Usage::Recharge { min }));
        }
        if let Some(caps) = patterns::PER_DAY_SUFFIX.captures(name) {
            let count = caps[1].parse().unwrap_or(1);
            return (strip_match(name, &caps[0]), Some(Usage::PerDay { count }));
        }
        if let Some(caps) = patterns::REST_SUFFIX.captures(name) {
            let usage = if caps[1].to_lowercase().contains("short") {
                Usage::PerShortRest { count: 1 }
            } else {
                Usage::PerLongRest { count: 1 }
            };
            return (strip_match(name, &caps[0]), Some(usage));
        }
        (name.trim().to_string(), None)
    }

    pub fn label(&self) -> String {
        match self {
            Usage::Recharge { min } if *min >= 6 => "Recharge 6".to_string(),
            Usage::Recharge { min } => format!("Recharge {min}-6"),
            Usage::PerDay { count } => format!("{count}/Day"),
            Usage::PerLongRest { count } => format!("{count}/Long Rest"),
            Usage::PerShortRest { count } => format!("{count}/Short Rest"),
        }
    }
}

fn strip_match(name: &str, matched: &str) -> String {
    name.replacen(matched, "", 1).trim().to_string()
}

/// How an attack reaches its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttackKind {
    Melee,
    Ranged,
    MeleeOrRanged,
}

/// Structured attack data an adapter may have already extracted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackProfile {
    pub kind: AttackKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_hit: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reach_ft: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range_ft: Option<u32>,
}

impl AttackProfile {
    pub fn melee(to_hit: i32, reach_ft: u32) -> Self {
        Self {
            kind: AttackKind::Melee,
            to_hit: Some(to_hit),
            reach_ft: Some(reach_ft),
            range_ft: None,
        }
    }

    pub fn ranged(to_hit: i32, range_ft: u32) -> Self {
        Self {
            kind: AttackKind::Ranged,
            to_hit: Some(to_hit),
            reach_ft: None,
            range_ft: Some(range_ft),
        }
    }

    /// Derive an attack profile from "Melee Weapon Attack: +4 to hit, reach 5 ft." text.
    pub fn from_text(text: &str) -> Option<Self> {
        let melee = patterns::MELEE_ATTACK.is_match(text);
        let ranged = patterns::RANGED_ATTACK.is_match(text);
        let kind = match (melee, ranged) {
            (true, true) => AttackKind::MeleeOrRanged,
            (true, false) => AttackKind::Melee,
            (false, true) => AttackKind::Ranged,
            (false, false) => return None,
        };
        let to_hit = patterns::TO_HIT
            .captures(text)
            .and_then(|c| c[1].replace(&['\u{2212}', '\u{2013}'][..], "-").parse().ok());
        let reach_ft = patterns::REACH
            .captures(text)
            .and_then(|c| c[1].parse().ok());
        let range_ft = patterns::RANGE
            .captures(text)
            .and_then(|c| c[1].parse().ok());
        Some(Self {
            kind,
            to_hit,
            reach_ft,
            range_ft,
        })
    }

    pub fn is_melee(&self) -> bool {
        matches!(self.kind, AttackKind::Melee | AttackKind::MeleeOrRanged)
    }

    pub fn is_ranged(&self) -> bool {
        self.kind == AttackKind::Ranged
    }
}

/// A saving throw an ability forces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavingThrow {
    pub ability: Ability,
    pub dc: u32,
}

impl SavingThrow {
    pub fn new(ability: Ability, dc: u32) -> Self {
        Self { ability, dc }
    }

    /// Find "DC 15 Dexterity saving throw" in free text.
    pub fn from_text(text: &str) -> Option<Self> {
        let caps = patterns::SAVE_DC.captures(text)?;
        let dc = caps.name("dc")?.as_str().parse().ok()?;
        let ability = Ability::parse(caps.name("ability")?.as_str())?;
        Some(Self { ability, dc })
    }
}

/// A trait, action, bonus action, reaction, or lair action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatureAbility {
    pub name: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attack: Option<AttackProfile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub save: Option<SavingThrow>,
}

impl CreatureAbility {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            usage: None,
            attack: None,
            save: None,
        }
    }

    pub fn with_usage(mut self, usage: Usage) -> Self {
        self.usage = Some(usage);
        self
    }

    pub fn with_attack(mut self, attack: AttackProfile) -> Self {
        self.attack = Some(attack);
        self
    }

    pub fn with_save(mut self, save: SavingThrow) -> Self {
        self.save = Some(save);
        self
    }

    /// Name with any usage suffix removed.
    pub fn bare_name(&self) -> String {
        Usage::split_name(&self.name).0
    }

    /// Structured usage, falling back to the name suffix.
    pub fn effective_usage(&self) -> Option<Usage> {
        self.usage.or_else(|| Usage::split_name(&self.name).1)
    }

    /// Structured attack profile, falling back to the description text.
    pub fn effective_attack(&self) -> Option<AttackProfile> {
        self.attack
            .clone()
            .or_else(|| AttackProfile::from_text(&self.description))
    }

    /// Structured save, falling back to the description text.
    pub fn effective_save(&self) -> Option<SavingThrow> {
        self.save.or_else(|| SavingThrow::from_text(&self.description))
    }

    pub fn is_multiattack(&self) -> bool {
        self.bare_name().eq_ignore_ascii_case("multiattack")
    }
}

/// One entry of a structured multiattack list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiattackEntry {
    pub name: String,
    pub count: u32,
}

impl MultiattackEntry {
    pub fn new(name: impl Into<String>, count: u32) -> Self {
        Self {
            name: name.into(),
            count,
        }
    }
}

/// The multiattack action: free text plus an optional structured list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Multiattack {
    pub description: String,
    #[serde(default)]
    pub attacks: Vec<MultiattackEntry>,
}

impl Multiattack {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            attacks: Vec::new(),
        }
    }

    pub fn with_attacks(mut self, attacks: Vec<MultiattackEntry>) -> Self {
        self.attacks = attacks;
        self
    }
}

/// A single legendary (or mythic) action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegendaryAction {
    pub name: String,
    pub description: String,
    /// Point cost; parsed from "(Costs 2 Actions)" when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<u32>,
}

impl LegendaryAction {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            cost: None,
        }
    }

    pub fn with_cost(mut self, cost: u32) -> Self {
        self.cost = Some(cost);
        self
    }

    pub fn point_cost(&self) -> u32 {
        self.cost.unwrap_or_else(|| {
            patterns::LEGENDARY_COST
                .captures(&self.name)
                .and_then(|c| c[1].parse().ok())
                .unwrap_or(1)
        })
    }

    pub fn bare_name(&self) -> String {
        patterns::LEGENDARY_COST
            .replace(&self.name, "")
            .trim()
            .to_string()
    }
}

/// The legendary-action pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegendaryActions {
    #[serde(default = "default_legendary_count")]
    pub count: u32,
    #[serde(default)]
    pub actions: Vec<LegendaryAction>,
}

fn default_legendary_count() -> u32 {
    3
}

impl LegendaryActions {
    pub fn new(count: u32, actions: Vec<LegendaryAction>) -> Self {
        Self { count, actions }
    }
}

/// Lair actions, usable on initiative count 20.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Lair {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub actions: Vec<CreatureAbility>,
}

/// Mythic trait plus the mythic actions it unlocks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mythic {
    pub trait_ability: CreatureAbility,
    #[serde(default)]
    pub actions: Vec<LegendaryAction>,
}

/// How often a listed spell can be cast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SpellFrequency {
    AtWill,
    PerDay { count: u32 },
    #[default]
    Slots,
}

/// A spell listed in a spellcasting block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpellEntry {
    pub name: String,
    /// Spell level, 0 for cantrips. Innate lists often omit it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<u8>,
    #[serde(default)]
    pub frequency: SpellFrequency,
}

impl SpellEntry {
    pub fn new(name: impl Into<String>, level: u8) -> Self {
        Self {
            name: name.into(),
            level: Some(level),
            frequency: SpellFrequency::Slots,
        }
    }

    pub fn innate(name: impl Into<String>, frequency: SpellFrequency) -> Self {
        Self {
            name: name.into(),
            level: None,
            frequency,
        }
    }
}

/// A spellcasting block (regular or innate).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Spellcasting {
    #[serde(default = "default_spellcasting_name")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ability: Option<Ability>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub save_dc: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attack_bonus: Option<i32>,
    #[serde(default)]
    pub spells: Vec<SpellEntry>,
}

fn default_spellcasting_name() -> String {
    "Spellcasting".to_string()
}

impl Spellcasting {
    pub fn new(ability: Ability, save_dc: u32) -> Self {
        Self {
            name: default_spellcasting_name(),
            ability: Some(ability),
            save_dc: Some(save_dc),
            attack_bonus: None,
            spells: Vec::new(),
        }
    }

    pub fn with_spells(mut self, spells: Vec<SpellEntry>) -> Self {
        self.spells = spells;
        self
    }
}

// ============================================================================
// Source Creature
// ============================================================================

/// A monster stat block normalized by a dialect adapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceCreature {
    pub name: String,
    pub size: Size,
    pub creature_type: CreatureType,
    #[serde(default)]
    pub subtypes: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Printed challenge rating, e.g. "1/4" or "17".
    pub challenge_rating: String,
    pub armor_class: u32,
    pub hit_points: HitPoints,
    pub ability_scores: AbilityScores,
    #[serde(default)]
    pub speeds: Speeds,
    #[serde(default)]
    pub skills: Vec<SkillBonus>,
    #[serde(default)]
    pub damage_resistances: Vec<DamageType>,
    #[serde(default)]
    pub damage_immunities: Vec<DamageType>,
    #[serde(default)]
    pub damage_vulnerabilities: Vec<DamageType>,
    #[serde(default)]
    pub condition_immunities: Vec<Condition>,
    #[serde(default)]
    pub traits: Vec<CreatureAbility>,
    #[serde(default)]
    pub actions: Vec<CreatureAbility>,
    #[serde(default)]
    pub bonus_actions: Vec<CreatureAbility>,
    #[serde(default)]
    pub reactions: Vec<CreatureAbility>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multiattack: Option<Multiattack>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legendary_actions: Option<LegendaryActions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legendary_resistance: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lair: Option<Lair>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mythic: Option<Mythic>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spellcasting: Option<Spellcasting>,
}

impl SourceCreature {
    /// Create a record with the required fields; everything optional starts empty.
    pub fn new(
        name: impl Into<String>,
        size: Size,
        creature_type: CreatureType,
        challenge_rating: impl Into<String>,
        armor_class: u32,
        hit_points: HitPoints,
        ability_scores: AbilityScores,
    ) -> Self {
        Self {
            name: name.into(),
            size,
            creature_type,
            subtypes: Vec::new(),
            description: None,
            challenge_rating: challenge_rating.into(),
            armor_class,
            hit_points,
            ability_scores,
            speeds: Speeds::default(),
            skills: Vec::new(),
            damage_resistances: Vec::new(),
            damage_immunities: Vec::new(),
            damage_vulnerabilities: Vec::new(),
            condition_immunities: Vec::new(),
            traits: Vec::new(),
            actions: Vec::new(),
            bonus_actions: Vec::new(),
            reactions: Vec::new(),
            multiattack: None,
            legendary_actions: None,
            legendary_resistance: None,
            lair: None,
            mythic: None,
            spellcasting: None,
        }
    }

    /// Deserialize a record from adapter JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Parse the printed challenge rating.
    pub fn challenge(&self) -> Result<ChallengeRating, ChallengeRatingError> {
        self.challenge_rating.parse()
    }

    pub fn with_subtype(mut self, subtype: impl Into<String>) -> Self {
        self.subtypes.push(subtype.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_speeds(mut self, speeds: Speeds) -> Self {
        self.speeds = speeds;
        self
    }

    pub fn with_skill(mut self, name: impl Into<String>, bonus: i32) -> Self {
        self.skills.push(SkillBonus::new(name, bonus));
        self
    }

    pub fn with_resistances(mut self, types: Vec<DamageType>) -> Self {
        self.damage_resistances = types;
        self
    }

    pub fn with_immunities(mut self, types: Vec<DamageType>) -> Self {
        self.damage_immunities = types;
        self
    }

    pub fn with_vulnerabilities(mut self, types: Vec<DamageType>) -> Self {
        self.damage_vulnerabilities = types;
        self
    }

    pub fn with_condition_immunities(mut self, conditions: Vec<Condition>) -> Self {
        self.condition_immunities = conditions;
        self
    }

    pub fn with_trait(mut self, ability: CreatureAbility) -> Self {
        self.traits.push(ability);
        self
    }

    pub fn with_action(mut self, ability: CreatureAbility) -> Self {
        self.actions.push(ability);
        self
    }

    pub fn with_bonus_action(mut self, ability: CreatureAbility) -> Self {
        self.bonus_actions.push(ability);
        self
    }

    pub fn with_reaction(mut self, ability: CreatureAbility) -> Self {
        self.reactions.push(ability);
        self
    }

    pub fn with_multiattack(mut self, multiattack: Multiattack) -> Self {
        self.multiattack = Some(multiattack);
        self
    }

    pub fn with_legendary_actions(mut self, legendary: LegendaryActions) -> Self {
        self.legendary_actions = Some(legendary);
        self
    }

    pub fn with_legendary_resistance(mut self, count: u32) -> Self {
        self.legendary_resistance = Some(count);
        self
    }

    pub fn with_lair(mut self, lair: Lair) -> Self {
        self.lair = Some(lair);
        self
    }

    pub fn with_mythic(mut self, mythic: Mythic) -> Self {
        self.mythic = Some(mythic);
        self
    }

    pub fn with_spellcasting(mut self, spellcasting: Spellcasting) -> Self {
        self.spellcasting = Some(spellcasting);
        self
    }

    /// The multiattack block, or one recovered from a "Multiattack" entry in
    /// the action list.
    pub fn effective_multiattack(&self) -> Option<Multiattack> {
        self.multiattack.clone().or_else(|| {
            self.actions
                .iter()
                .find(|a| a.is_multiattack())
                .map(|a| Multiattack::new(a.description.clone()))
        })
    }

    /// Actions that carry an attack roll.
    pub fn attack_actions(&self) -> impl Iterator<Item = (&CreatureAbility, AttackProfile)> {
        self.actions
            .iter()
            .filter_map(|a| a.effective_attack().map(|profile| (a, profile)))
    }

    /// Every trait, action, bonus action, and reaction in listing order.
    pub fn all_abilities(&self) -> impl Iterator<Item = &CreatureAbility> {
        self.traits
            .iter()
            .chain(self.actions.iter())
            .chain(self.bonus_actions.iter())
            .chain(self.reactions.iter())
    }

    /// Lowercased name and description text of every ability, used by
    /// vocabulary matching.
    pub fn ability_text(&self) -> String {
        let mut text = String::new();
        for ability in self.all_abilities() {
            text.push_str(&ability.name);
            text.push_str(". ");
            text.push_str(&ability.description);
            text.push('\n');
        }
        text.to_lowercase()
    }

    pub fn has_legendary_actions(&self) -> bool {
        self.legendary_actions
            .as_ref()
            .is_some_and(|l| !l.actions.is_empty() || l.count > 0)
    }

    pub fn has_lair_actions(&self) -> bool {
        self.lair.as_ref().is_some_and(|l| !l.actions.is_empty())
    }

    pub fn has_mythic_actions(&self) -> bool {
        self.mythic.is_some()
    }

    /// Daily legendary resistance uses, from the field or a
    /// "Legendary Resistance (N/Day)" trait.
    pub fn effective_legendary_resistance(&self) -> Option<u32> {
        self.legendary_resistance.filter(|n| *n > 0).or_else(|| {
            self.traits
                .iter()
                .find(|t| t.bare_name().to_lowercase().contains("legendary resistance"))
                .map(|t| match t.effective_usage() {
                    Some(Usage::PerDay { count }) => count,
                    _ => 1,
                })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usage_split_recharge() {
        let (name, usage) = Usage::split_name("Fire Breath (Recharge 5\u{2013}6)");
        assert_eq!(name, "Fire Breath");
        assert_eq!(usage, Some(Usage::Recharge { min: 5 }));

        let (_, usage) = Usage::split_name("Lightning Breath (Recharge 6)");
        assert_eq!(usage, Some(Usage::Recharge { min: 6 }));
    }

    #[test]
    fn test_usage_split_per_day_and_rest() {
        assert_eq!(
            Usage::split_name("Teleport (3/Day)"),
            ("Teleport".to_string(), Some(Usage::PerDay { count: 3 }))
        );
        assert_eq!(
            Usage::split_name("Change Shape (Recharges after a Short or Long Rest)").1,
            Some(Usage::PerShortRest { count: 1 })
        );
        assert_eq!(Usage::split_name("Bite"), ("Bite".to_string(), None));
    }

    #[test]
    fn test_attack_profile_from_text() {
        let profile = AttackProfile::from_text(
            "Melee Weapon Attack: +4 to hit, reach 5 ft., one target. Hit: 5 (1d6 + 2) slashing damage.",
        )
        .unwrap();
        assert_eq!(profile.kind, AttackKind::Melee);
        assert_eq!(profile.to_hit, Some(4));
        assert_eq!(profile.reach_ft, Some(5));

        let profile = AttackProfile::from_text(
            "Ranged Weapon Attack: +4 to hit, range 80/320 ft., one target.",
        )
        .unwrap();
        assert!(profile.is_ranged());
        assert_eq!(profile.range_ft, Some(80));

        assert!(AttackProfile::from_text("The goblin hides.").is_none());
    }

    #[test]
    fn test_saving_throw_from_text() {
        let save = SavingThrow::from_text(
            "Each creature in that area must make a DC 21 Dexterity saving throw.",
        )
        .unwrap();
        assert_eq!(save, SavingThrow::new(Ability::Dexterity, 21));
    }

    #[test]
    fn test_legendary_point_cost() {
        let wing = LegendaryAction::new("Wing Attack (Costs 2 Actions)", "The dragon beats its wings.");
        assert_eq!(wing.point_cost(), 2);
        assert_eq!(wing.bare_name(), "Wing Attack");
        assert_eq!(LegendaryAction::new("Detect", "").point_cost(), 1);
        assert_eq!(LegendaryAction::new("Detect", "").with_cost(3).point_cost(), 3);
    }

    #[test]
    fn test_hit_points_fall_back_to_formula() {
        assert_eq!(HitPoints::new(0).with_formula("2d6").effective_average(), 7);
        assert_eq!(HitPoints::new(11).with_formula("2d8+2").effective_average(), 11);
        assert_eq!(HitPoints::new(0).with_formula("bogus").effective_average(), 0);
    }

    #[test]
    fn test_from_json_defaults_optional_fields() {
        let json = r#"{
            "name": "Goblin",
            "size": "Small",
            "creature_type": "humanoid",
            "challenge_rating": "1/4",
            "armor_class": 15,
            "hit_points": { "average": 7, "formula": "2d6" },
            "ability_scores": {
                "strength": 8, "dexterity": 14, "constitution": 10,
                "intelligence": 10, "wisdom": 8, "charisma": 8
            }
        }"#;
        let goblin = SourceCreature::from_json(json).unwrap();
        assert_eq!(goblin.name, "Goblin");
        assert!(goblin.traits.is_empty());
        assert!(goblin.legendary_actions.is_none());
        assert_eq!(goblin.speeds, Speeds::default());
    }
}
