//! Sub-compilers for the blocks that are not single abilities: spellcasting,
//! movement, damage defenses, and condition immunities.

use crate::adversary::{ConvertedFeature, Cost, DamageCategory, Feature};
use crate::creature::{Condition, DamageType, SpellEntry, SpellFrequency, Spellcasting, Speeds};

// ============================================================================
// Spellcasting
// ============================================================================

/// Spell power bands: cantrips, 1st-3rd, 4th-6th, 7th-9th.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SpellBand {
    Cantrip,
    Lesser,
    Greater,
    Mighty,
}

impl SpellBand {
    pub fn from_level(level: u8) -> Self {
        match level {
            0 => SpellBand::Cantrip,
            1..=3 => SpellBand::Lesser,
            4..=6 => SpellBand::Greater,
            _ => SpellBand::Mighty,
        }
    }

    /// Band for a spell, inferring one from the casting frequency when the
    /// level is missing.
    pub fn of(spell: &SpellEntry) -> Self {
        match (spell.level, spell.frequency) {
            (Some(level), _) => SpellBand::from_level(level),
            (None, SpellFrequency::AtWill) => SpellBand::Cantrip,
            (None, SpellFrequency::PerDay { count }) if count <= 1 => SpellBand::Greater,
            (None, _) => SpellBand::Lesser,
        }
    }

    pub fn cost(&self) -> u32 {
        match self {
            SpellBand::Cantrip => 0,
            SpellBand::Lesser => 1,
            SpellBand::Greater => 2,
            SpellBand::Mighty => 3,
        }
    }

    pub fn feature_name(&self) -> &'static str {
        match self {
            SpellBand::Cantrip => "At-Will Magic",
            SpellBand::Lesser => "Lesser Spellcasting",
            SpellBand::Greater => "Greater Spellcasting",
            SpellBand::Mighty => "Mighty Spellcasting",
        }
    }

    fn all() -> [SpellBand; 4] {
        [
            SpellBand::Cantrip,
            SpellBand::Lesser,
            SpellBand::Greater,
            SpellBand::Mighty,
        ]
    }
}

/// One Spellcaster passive plus one action per populated spell band.
pub fn compile_spellcasting(spellcasting: &Spellcasting) -> Vec<ConvertedFeature> {
    let mut features = Vec::new();

    let mut summary = String::from("This adversary can cast spells.");
    if let Some(dc) = spellcasting.save_dc {
        summary.push_str(&format!(
            " Reaction Rolls against its spells have difficulty {}.",
            dc / 2 + 8
        ));
    }
    features.push(
        ConvertedFeature::new(
            Feature::passive("Spellcaster", summary),
            spellcasting.name.clone(),
        )
        .with_note("spellcasting block"),
    );

    for band in SpellBand::all() {
        let names: Vec<&str> = spellcasting
            .spells
            .iter()
            .filter(|spell| SpellBand::of(spell) == band)
            .map(|spell| spell.name.as_str())
            .collect();
        if names.is_empty() {
            continue;
        }
        let description = format!("This adversary casts one of: {}.", names.join(", "));
        let cost = (band.cost() > 0).then(|| Cost::stress(band.cost()));
        features.push(
            ConvertedFeature::new(
                Feature::action(band.feature_name(), description).with_optional_cost(cost),
                spellcasting.name.clone(),
            )
            .with_note(format!("{} spells cost {}", names.len(), band.cost())),
        );
    }

    features
}

// ============================================================================
// Movement
// ============================================================================

/// Walking speed at which a creature counts as swift.
pub const SWIFT_WALK_FT: u32 = 50;

pub fn compile_movement(speeds: &Speeds) -> Vec<ConvertedFeature> {
    let mut features = Vec::new();
    let mut push = |name: &str, description: String, note: String| {
        features.push(
            ConvertedFeature::new(Feature::passive(name, description), "Speed").with_note(note),
        );
    };

    if let Some(fly) = speeds.fly.filter(|f| *f > 0) {
        let description = if speeds.hover {
            "This adversary can fly and hover in place.".to_string()
        } else {
            "This adversary can fly.".to_string()
        };
        push("Flight", description, format!("fly {fly} ft."));
    }
    if let Some(swim) = speeds.swim.filter(|s| *s > 0) {
        push(
            "Aquatic",
            "This adversary can move and act underwater without penalty.".to_string(),
            format!("swim {swim} ft."),
        );
    }
    if let Some(burrow) = speeds.burrow.filter(|b| *b > 0) {
        push(
            "Burrower",
            "This adversary can tunnel through earth and loose stone.".to_string(),
            format!("burrow {burrow} ft."),
        );
    }
    if let Some(climb) = speeds.climb.filter(|c| *c > 0) {
        push(
            "Climber",
            "This adversary can climb without rolling.".to_string(),
            format!("climb {climb} ft."),
        );
    }
    if let Some(walk) = speeds.walk.filter(|w| *w >= SWIFT_WALK_FT) {
        push(
            "Swift",
            "This adversary can move to Far range as part of a single move.".to_string(),
            format!("walk {walk} ft."),
        );
    }

    features
}

// ============================================================================
// Defenses
// ============================================================================

fn type_list(types: &[&DamageType]) -> String {
    types
        .iter()
        .map(|t| t.name())
        .collect::<Vec<_>>()
        .join(", ")
}

fn split_by_category(types: &[DamageType]) -> [(DamageCategory, Vec<&DamageType>); 2] {
    let (physical, magic): (Vec<&DamageType>, Vec<&DamageType>) =
        types.iter().partition(|t| t.is_physical());
    [
        (DamageCategory::Physical, physical),
        (DamageCategory::Magic, magic),
    ]
}

/// Resistances and immunities split by damage category, then vulnerabilities.
pub fn compile_damage_defenses(
    resistances: &[DamageType],
    immunities: &[DamageType],
    vulnerabilities: &[DamageType],
) -> Vec<ConvertedFeature> {
    let mut features = Vec::new();

    let groups = [
        ("Resistance", "resistant", "Damage Resistances", resistances),
        ("Immunity", "immune", "Damage Immunities", immunities),
    ];
    for (label, adjective, source, types) in groups {
        for (category, members) in split_by_category(types) {
            if members.is_empty() {
                continue;
            }
            let category_name = match category {
                DamageCategory::Physical => "Physical",
                DamageCategory::Magic => "Magic",
            };
            let description = format!(
                "This adversary is {adjective} to {} damage ({}).",
                category_name.to_lowercase(),
                type_list(&members)
            );
            features.push(
                ConvertedFeature::new(
                    Feature::passive(format!("{label}: {category_name}"), description),
                    source,
                )
                .with_note(format!("{} {} types", members.len(), category.abbreviation())),
            );
        }
    }

    if !vulnerabilities.is_empty() {
        let members: Vec<&DamageType> = vulnerabilities.iter().collect();
        features.push(
            ConvertedFeature::new(
                Feature::passive(
                    "Vulnerability",
                    format!(
                        "This adversary takes extra damage from {}.",
                        type_list(&members)
                    ),
                ),
                "Damage Vulnerabilities",
            )
            .with_note(format!("{} vulnerable types", members.len())),
        );
    }

    features
}

pub fn compile_condition_immunities(conditions: &[Condition]) -> Option<ConvertedFeature> {
    if conditions.is_empty() {
        return None;
    }
    let names: Vec<String> = conditions
        .iter()
        .map(|c| c.name().to_lowercase())
        .collect();
    let feature = Feature::passive(
        "Condition Immunity",
        format!("This adversary cannot be {}.", join_or(&names)),
    );
    Some(
        ConvertedFeature::new(feature, "Condition Immunities")
            .with_note(format!("{} conditions", conditions.len())),
    )
}

fn join_or(items: &[String]) -> String {
    match items {
        [] => String::new(),
        [only] => only.clone(),
        [rest @ .., last] => format!("{}, or {last}", rest.join(", ")),
    }
}

/// True when a trait duplicates the spellcasting block.
pub fn is_spellcasting_trait(name: &str) -> bool {
    name.to_lowercase().contains("spellcasting")
}
