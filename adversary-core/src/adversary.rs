//! Target-system adversary types.
//!
//! Everything the conversion produces: the core stat bundle, costed
//! features with their provenance, damage expressions, and the assembled
//! adversary aggregate.

use crate::classifier::{Archetype, ClassificationResult, CombatRole};
use crate::dice::Dice;
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Core Stats
// ============================================================================

/// Coarse power band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Tier {
    One,
    Two,
    Three,
    Four,
}

impl Tier {
    pub fn number(&self) -> u32 {
        match self {
            Tier::One => 1,
            Tier::Two => 2,
            Tier::Three => 3,
            Tier::Four => 4,
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tier {}", self.number())
    }
}

/// Difficulty band driving the threshold formulas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Difficulty {
    Minor,
    Major,
    Severe,
}

impl Difficulty {
    pub fn name(&self) -> &'static str {
        match self {
            Difficulty::Minor => "Minor",
            Difficulty::Major => "Major",
            Difficulty::Severe => "Severe",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Three ascending damage thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thresholds {
    pub minor: u32,
    pub major: u32,
    pub severe: u32,
}

impl Thresholds {
    pub fn is_ascending(&self) -> bool {
        self.minor < self.major && self.major < self.severe
    }
}

impl fmt::Display for Thresholds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.minor, self.major, self.severe)
    }
}

/// The numeric core of an adversary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoreStats {
    pub tier: Tier,
    pub difficulty: Difficulty,
    pub thresholds: Thresholds,
    pub hit_points: u32,
    /// Resource pool ("Stress").
    pub stress: u32,
    /// Defense value ("Evasion").
    pub evasion: u32,
}

// ============================================================================
// Damage
// ============================================================================

/// Coarse damage category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DamageCategory {
    Physical,
    Magic,
}

impl DamageCategory {
    pub fn abbreviation(&self) -> &'static str {
        match self {
            DamageCategory::Physical => "phy",
            DamageCategory::Magic => "mag",
        }
    }
}

impl fmt::Display for DamageCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.abbreviation())
    }
}

/// A damage roll extracted from ability text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamageExpression {
    pub dice: Dice,
    pub category: DamageCategory,
    /// Damage that lands without an attack roll (saves, auras, automatic).
    pub direct: bool,
}

impl DamageExpression {
    pub fn new(dice: Dice, category: DamageCategory) -> Self {
        Self {
            dice,
            category,
            direct: false,
        }
    }

    pub fn direct(mut self) -> Self {
        self.direct = true;
        self
    }

    pub fn doubled_average(&self) -> i64 {
        self.dice.doubled_average()
    }

    /// A copy with `extra` more dice of the same size.
    pub fn with_extra_dice(&self, extra: u32) -> Self {
        Self {
            dice: self.dice.with_extra_dice(extra),
            ..*self
        }
    }

    /// Dice notation without the category, e.g. "2d6+3".
    pub fn notation(&self) -> String {
        self.dice.to_string()
    }

/// Emphasized canonical form used inside descriptions.
    pub fn emphasized(&self) -> String {
        format!("**{} {}**", self.notation(), self.category)
    }
}

impl fmt::Display for DamageExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.notation(), self.category)
    }
}

// ============================================================================
// Features
// ============================================================================

/// How a feature is used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FeatureKind {
    Passive,
    Action,
    Reaction,
}

impl FeatureKind {
    pub fn name(&self) -> &'static str {
        match self {
            FeatureKind::Passive => "Passive",
            FeatureKind::Action => "Action",
            FeatureKind::Reaction => "Reaction",
        }
    }
}

impl fmt::Display for FeatureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Spendable resource gating a feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    Stress,
    Fear,
}

/// Activation cost of a feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cost {
    pub resource: ResourceKind,
    pub amount: u32,
}

impl Cost {
    pub fn stress(amount: u32) -> Self {
        Self {
            resource: ResourceKind::Stress,
            amount,
        }
    }

    pub fn fear(amount: u32) -> Self {
        Self {
            resource: ResourceKind::Fear,
            amount,
        }
    }
}

impl fmt::Display for Cost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let resource = match self.resource {
            ResourceKind::Stress => "Stress",
            ResourceKind::Fear => "Fear",
        };
        let verb = match self.resource {
            ResourceKind::Stress => "Mark",
            ResourceKind::Fear => "Spend",
        };
        if self.amount == 1 {
            write!(f, "{verb} a {resource}")
        } else {
            write!(f, "{verb} {} {resource}", self.amount)
        }
    }
}

/// Target-system check attributes used for Reaction Rolls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CheckAttribute {
    Agility,
    Strength,
    Finesse,
    Instinct,
    Presence,
    Knowledge,
}

impl CheckAttribute {
    pub fn name(&self) -> &'static str {
        match self {
            CheckAttribute::Agility => "Agility",
            CheckAttribute::Strength => "Strength",
            CheckAttribute::Finesse => "Finesse",
            CheckAttribute::Instinct => "Instinct",
            CheckAttribute::Presence => "Presence",
            CheckAttribute::Knowledge => "Knowledge",
        }
    }
}

impl fmt::Display for CheckAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A Reaction Roll the feature forces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveCheck {
    pub attribute: CheckAttribute,
    pub difficulty: u32,
}

/// Conditions a feature can apply in the target system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ConditionTag {
    Frightened,
    Restrained,
    Vulnerable,
    Hidden,
}

impl ConditionTag {
    pub fn name(&self) -> &'static str {
        match self {
            ConditionTag::Frightened => "Frightened",
            ConditionTag::Restrained => "Restrained",
            ConditionTag::Vulnerable => "Vulnerable",
            ConditionTag::Hidden => "Hidden",
        }
    }
}

/// Target-system range bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RangeBand {
    Melee,
    VeryClose,
    Close,
    Far,
    VeryFar,
}

impl RangeBand {
    pub fn from_feet(feet: u32) -> Self {
        match feet {
            0..=5 => RangeBand::Melee,
            6..=10 => RangeBand::VeryClose,
            11..=30 => RangeBand::Close,
            31..=100 => RangeBand::Far,
            _ => RangeBand::VeryFar,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            RangeBand::Melee => "Melee",
            RangeBand::VeryClose => "Very Close",
            RangeBand::Close => "Close",
            RangeBand::Far => "Far",
            RangeBand::VeryFar => "Very Far",
        }
    }
}

impl fmt::Display for RangeBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A structured, costed special ability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feature {
    pub name: String,
    pub kind: FeatureKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<Cost>,
    /// Always present for reactions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger: Option<String>,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub damage: Option<DamageExpression>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub save: Option<SaveCheck>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<ConditionTag>,
}

impl Feature {
    fn base(name: impl Into<String>, kind: FeatureKind, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            cost: None,
            trigger: None,
            description: description.into(),
            damage: None,
            target: None,
            save: None,
            conditions: Vec::new(),
        }
    }

    pub fn passive(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::base(name, FeatureKind::Passive, description)
    }

    pub fn action(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::base(name, FeatureKind::Action, description)
    }

    /// Reactions cannot exist without a trigger.
    pub fn reaction(
        name: impl Into<String>,
        trigger: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        let mut feature = Self::base(name, FeatureKind::Reaction, description);
        feature.trigger = Some(trigger.into());
        feature
    }

    pub fn with_cost(mut self, cost: Cost) -> Self {
        self.cost = Some(cost);
        self
    }

    pub fn with_optional_cost(mut self, cost: Option<Cost>) -> Self {
        self.cost = cost;
        self
    }

    pub fn with_damage(mut self, damage: DamageExpression) -> Self {
        self.damage = Some(damage);
        self
    }

    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    pub fn with_save(mut self, save: SaveCheck) -> Self {
        self.save = Some(save);
        self
    }

    pub fn with_condition(mut self, condition: ConditionTag) -> Self {
        if !self.conditions.contains(&condition) {
            self.conditions.push(condition);
        }
        self
    }

    pub fn cost_amount(&self) -> u32 {
        self.cost.map(|c| c.amount).unwrap_or(0)
    }
}

/// A feature plus the audit trail of how it was produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConvertedFeature {
    #[serde(flatten)]
    pub feature: Feature,
    /// Name of the source ability this came from.
    pub source_ability: String,
    /// Which rules fired, in order.
    #[serde(default)]
    pub conversion_notes: Vec<String>,
}

impl ConvertedFeature {
    pub fn new(feature: Feature, source_ability: impl Into<String>) -> Self {
        Self {
            feature,
            source_ability: source_ability.into(),
            conversion_notes: Vec::new(),
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.conversion_notes.push(note.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.feature.name
    }

    pub fn kind(&self) -> FeatureKind {
        self.feature.kind
    }
}

// ============================================================================
// Adversary
// ============================================================================

/// A trained specialty of the adversary, e.g. "Stealth +2".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Experience {
    pub name: String,
    pub modifier: i32,
}

impl fmt::Display for Experience {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:+}", self.name, self.modifier)
    }
}

/// The assembled conversion output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Adversary {
    pub name: String,
    pub description: String,
    pub archetype: Archetype,
    pub role: CombatRole,
    pub classification: ClassificationResult,
    pub stats: CoreStats,
    /// Stress added by a folded legendary-action pool.
    pub bonus_stress: u32,
    pub attack_modifier: i32,
    pub motives: Vec<String>,
    pub experiences: Vec<Experience>,
    pub attacks: Vec<ConvertedFeature>,
    pub features: Vec<ConvertedFeature>,
    /// Printed challenge rating of the source creature.
    pub source_challenge: String,
}

impl Adversary {
    pub fn tier(&self) -> Tier {
        self.stats.tier
    }

    /// Stress pool including any legendary bonus.
    pub fn total_stress(&self) -> u32 {
        self.stats.stress + self.bonus_stress
    }

    pub fn feature(&self, name: &str) -> Option<&ConvertedFeature> {
        self.features
            .iter()
            .find(|f| f.feature.name.eq_ignore_ascii_case(name))
    }

    pub fn attack(&self, name: &str) -> Option<&ConvertedFeature> {
        self.attacks
            .iter()
            .find(|f| f.feature.name.eq_ignore_ascii_case(name))
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
