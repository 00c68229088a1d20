//! Pattern library.
//!
//! Static, ordered tables of text patterns and the templates or values they
//! map to. Rule order is load-bearing everywhere in this module: callers
//! walk each table front to back and stop at the first hit, so every table
//! is a `Vec` or array, never a map.

use crate::adversary::{CheckAttribute, ConditionTag, DamageCategory, FeatureKind};
use crate::creature::Ability;
use regex::Regex;
use std::sync::LazyLock;

fn re(pattern: &str) -> Regex {
    Regex::new(pattern).expect("valid regex")
}

// ============================================================================
// Trait Rules
// ============================================================================

/// What a matching trait rule produces.
#[derive(Debug, Clone)]
pub enum TraitOutcome {
    /// Build a feature; `template` may reference captures as `${name}`.
    Feature {
        name: &'static str,
        kind: FeatureKind,
        template: &'static str,
    },
    /// The trait is folded into another component and produces nothing here.
    Folded { into: &'static str },
}

/// One row of the trait table.
#[derive(Debug, Clone)]
pub struct TraitRule {
    pub id: &'static str,
    pub pattern: Regex,
    pub outcome: TraitOutcome,
}

fn passive(id: &'static str, pattern: &str, name: &'static str, template: &'static str) -> TraitRule {
    TraitRule {
        id,
        pattern: re(pattern),
        outcome: TraitOutcome::Feature {
            name,
            kind: FeatureKind::Passive,
            template,
        },
    }
}

lazy_static::lazy_static! {
    /// Trait description patterns, tried in order against the description text.
    pub static ref TRAIT_RULES: Vec<TraitRule> = vec![
        TraitRule {
            id: "legendary_resistance",
            pattern: re(r"(?i)fails a saving throw, it can choose to succeed instead"),
            outcome: TraitOutcome::Folded { into: "legendary folder" },
        },
        passive(
            "magic_resistance",
            r"(?i)advantage on saving throws against spells and other magical effects",
            "Magic Resistance",
            "This adversary has advantage on Reaction Rolls against spells and other magical effects.",
        ),
        passive(
            "pack_tactics",
            r"(?i)advantage on an attack roll against a creature if at least one of .+? allies is within (?P<feet>\d+) feet",
            "Pack Tactics",
            "This adversary has advantage on attacks against a target that has at least one of its allies within Melee range.",
        ),
        passive(
            "keen_senses",
            r"(?i)advantage on Wisdom \(Perception\) checks that rely on (?P<senses>[a-z]+(?:,? (?:and |or )?[a-z]+)*)",
            "Keen Senses",
            "This adversary has advantage on rolls to notice things by ${senses}.",
        ),
        passive(
            "regeneration",
            r"(?i)regains (?P<hp>\d+) hit points at the start of its turn",
            "Regeneration",
            "At the start of its turn, this adversary clears a Hit Point. Damage it is vulnerable to stops this until its next turn.",
        ),
        passive(
            "undead_fortitude",
            r"(?i)if damage reduces .+? to 0 hit points, it must make a Constitution saving throw",
            "Unyielding Dead",
            "When this adversary would mark its last Hit Point from anything but radiant damage or a critical success, it makes a Reaction Roll. On a success, it marks a Stress instead.",
        ),
        passive(
            "amphibious",
            r"(?i)can breathe air and water",
            "Amphibious",
            "This adversary can breathe and act freely both on land and underwater.",
        ),
        passive(
            "spider_climb",
            r"(?i)can climb difficult surfaces, including upside down on ceilings",
            "Wall Crawler",
            "This adversary can climb any surface, including ceilings, without rolling.",
        ),
        passive(
            "sunlight_sensitivity",
            r"(?i)while in sunlight, .+? has disadvantage on attack rolls",
            "Sunlight Sensitivity",
            "While in direct sunlight, this adversary has disadvantage on attacks and on rolls that rely on sight.",
        ),
        passive(
            "false_appearance",
            r"(?i)while .+? remains motionless, it is indistinguishable from (?P<disguise>[^.]+)",
            "Camouflaged",
            "While motionless, this adversary is indistinguishable from ${disguise}.",
        ),
        passive(
            "incorporeal_movement",
            r"(?i)can move through other creatures and objects as if they were difficult terrain",
            "Incorporeal",
            "This adversary can move through creatures and objects, but can't end its move inside an object.",
        ),
        passive(
            "charge",
            r"(?i)moves at least (?P<feet>\d+) (?:feet|ft\.?) straight toward a (?:target|creature) and then hits it with an? (?P<attack>[a-z ]+?) attack on the same turn, the target takes an extra (?P<extra>[^.]+)",
            "Charge",
            "If this adversary moves from Close range straight toward a target and hits it with its ${attack} attack on the same turn, the target takes an extra ${extra}.",
        ),
        passive(
            "flyby",
            r"(?i)doesn't provoke (?:an )?opportunity attacks when it flies out of an enemy's reach",
            "Flyby",
            "This adversary can fly out of an enemy's Melee range without provoking a reaction.",
        ),
        passive(
            "cunning_action",
            r"(?i)can take the Dash, Disengage, or Hide action as a bonus action",
            "Cunning Action",
            "This adversary can move a Close distance, leave Melee range safely, or become Hidden without spending its action.",
        ),
        passive(
            "nimble_escape",
            r"(?i)can take the Disengage or Hide action as a bonus action",
            "Nimble Escape",
            "This adversary can leave Melee range safely or become Hidden without spending its action.",
        ),
        passive(
            "shapechanger",
            r"(?i)can use its action to polymorph into",
            "Shapechanger",
            "This adversary can spend an action to shift between its forms. Its statistics are unchanged.",
        ),
        passive(
            "immutable_form",
            r"(?i)immune to any spell or effect that would alter its form",
            "Immutable Form",
            "This adversary's form cannot be altered by any spell or effect.",
        ),
        passive(
            "siege_monster",
            r"(?i)deals double damage to objects and structures",
            "Siege Monster",
            "This adversary deals double damage to objects and structures.",
        ),
        passive(
            "devils_sight",
            r"(?i)magical darkness doesn't impede",
            "Devil's Sight",
            "Darkness, including magical darkness, doesn't hinder this adversary's vision.",
        ),
        passive(
            "evasion",
            r"(?i)subjected to an effect that allows it to make a Dexterity saving throw to take only half damage",
            "Evasion",
            "When an effect lets this adversary make an Agility Reaction Roll for half damage, it takes no damage on a success and half on a failure.",
        ),
        passive(
            "blood_frenzy",
            r"(?i)advantage on melee attack rolls against any creature that doesn't have all its hit points",
            "Blood Frenzy",
            "This adversary has advantage on attacks against targets that have marked Hit Points.",
        ),
        passive(
            "reckless",
            r"(?i)can gain advantage on all melee weapon attack rolls during that turn",
            "Reckless",
            "At the start of its turn, this adversary can gain advantage on its attacks. Attacks against it have advantage until its next turn.",
        ),
        passive(
            "aggressive",
            r"(?i)as a bonus action, .+? can move up to its speed toward a hostile creature",
            "Aggressive",
            "This adversary can move into Close range of an enemy it can see without spending its action.",
        ),
        passive(
            "martial_advantage",
            r"(?i)can deal an extra (?P<extra>[^.]+?) to a creature it hits with a weapon attack if that creature is within (?P<feet>\d+) feet of an ally",
            "Martial Advantage",
            "Once per turn, this adversary deals an extra ${extra} to a target it hits while one of its allies is within Melee range of that target.",
        ),
        passive(
            "brute",
            r"(?i)a melee weapon deals one extra die of its damage",
            "Brute",
            "This adversary's melee attacks deal one extra damage die.",
        ),
        passive(
            "retaliating_body",
            r"(?i)a creature that touches .+? or hits it with a melee attack while within (?P<feet>\d+) feet of it takes (?P<damage>[^.]+)",
            "Retaliating Body",
            "A creature that touches this adversary or hits it with a melee attack takes ${damage}.",
        ),
        passive(
            "turn_resistance",
            r"(?i)advantage on saving throws against any effect that turns undead",
            "Turn Resistance",
            "This adversary has advantage on Reaction Rolls against effects that turn or rebuke undead.",
        ),
        passive(
            "magic_weapons",
            r"(?i)weapon attacks are magical",
            "Magic Weapons",
            "This adversary's attacks count as magical.",
        ),
        passive(
            "death_burst",
            r"(?i)when .+? dies, it explodes(?P<rest>[^.]*)",
            "Death Burst",
            "When this adversary is defeated, it explodes${rest}.",
        ),
        passive(
            "swarm",
            r"(?i)can occupy another creature's space and vice versa",
            "Swarm",
            "This adversary can share space with other creatures and move through any opening large enough for its smallest member.",
        ),
        passive(
            "rampage",
            r"(?i)reduces a creature to 0 hit points with a melee attack on its turn, .+? can take a bonus action to move up to half its speed and make an? (?P<attack>[a-z ]+?) attack",
            "Rampage",
            "When this adversary defeats a target with a melee attack, it can immediately move a Very Close distance and make a ${attack} attack.",
        ),
        passive(
            "hold_breath",
            r"(?i)can hold its breath for (?P<duration>[^.]+)",
            "Hold Breath",
            "This adversary can hold its breath for ${duration}.",
        ),
        passive(
            "spellcasting_trait",
            r"(?i)(?:innate )?spellcasting ability is (?P<ability>[A-Za-z]+)",
            "Spellcaster",
            "This adversary casts spells using its ${ability}.",
        ),
    ];
}

// ============================================================================
// Action and Reaction Rules
// ============================================================================

/// An action name that always costs at least `floor`.
#[derive(Debug, Clone)]
pub struct CostFloorRule {
    pub id: &'static str,
    pub pattern: Regex,
    pub floor: u32,
}

/// A known reaction whose cost and trigger replace the defaults.
#[derive(Debug, Clone)]
pub struct ReactionRule {
    pub id: &'static str,
    pub pattern: Regex,
    pub cost: u32,
    pub trigger: &'static str,
}

lazy_static::lazy_static! {
    /// Action names that imply an expensive effect even without recharge metadata.
    pub static ref COSTLY_ACTIONS: Vec<CostFloorRule> = vec![
        CostFloorRule { id: "breath_weapon", pattern: re(r"(?i)\bbreath\b"), floor: 2 },
        CostFloorRule { id: "frightful_presence", pattern: re(r"(?i)frightful presence"), floor: 1 },
        CostFloorRule { id: "gaze", pattern: re(r"(?i)\bgaze\b"), floor: 1 },
        CostFloorRule { id: "swallow", pattern: re(r"(?i)\bswallow\b"), floor: 1 },
        CostFloorRule { id: "shapechange", pattern: re(r"(?i)shape ?change|change shape"), floor: 1 },
        CostFloorRule { id: "teleport", pattern: re(r"(?i)\bteleport"), floor: 1 },
    ];

    /// Reaction names with a fixed cost and trigger.
    pub static ref REACTION_RULES: Vec<ReactionRule> = vec![
        ReactionRule {
            id: "parry",
            pattern: re(r"(?i)\bparry\b"),
            cost: 1,
            trigger: "When this adversary would be hit by a melee attack",
        },
        ReactionRule {
            id: "shield",
            pattern: re(r"(?i)^\s*shield\s*$"),
            cost: 1,
            trigger: "When an attack would hit this adversary",
        },
        ReactionRule {
            id: "counterspell",
            pattern: re(r"(?i)\bcounterspell\b"),
            cost: 2,
            trigger: "When a creature within Far range casts a spell",
        },
        ReactionRule {
            id: "opportunity_attack",
            pattern: re(r"(?i)opportunity attack"),
            cost: 1,
            trigger: "When an enemy leaves this adversary's Melee range",
        },
        ReactionRule {
            id: "uncanny_dodge",
            pattern: re(r"(?i)uncanny dodge"),
            cost: 1,
            trigger: "When an attacker this adversary can see hits it with an attack",
        },
    ];

    /// Source conditions mapped onto target condition tags.
    pub static ref CONDITION_RULES: Vec<(Regex, ConditionTag)> = vec![
        (re(r"(?i)\b(?:restrained|grappled)\b"), ConditionTag::Restrained),
        (re(r"(?i)\b(?:prone|stunned|paralyzed|incapacitated|blinded)\b"), ConditionTag::Vulnerable),
        (re(r"(?i)\binvisible\b"), ConditionTag::Hidden),
    ];
}

/// Fixed trigger for legendary actions.
pub const LEGENDARY_TRIGGER: &str = "at the end of another creature's turn";

/// Fixed trigger for mythic actions.
pub const MYTHIC_TRIGGER: &str =
    "at the end of another creature's turn, once the mythic trait has activated";

/// Fixed cost and trigger of the folded legendary-resistance reaction.
pub const LEGENDARY_RESISTANCE_COST: u32 = 1;
pub const LEGENDARY_RESISTANCE_TRIGGER: &str = "When this adversary fails a Reaction Roll";

// ============================================================================
// Damage Extraction
// ============================================================================

/// One damage-extraction layer.
#[derive(Debug, Clone)]
pub struct DamageLayer {
    pub id: &'static str,
    pub pattern: Regex,
}

lazy_static::lazy_static! {
    /// Damage layers in priority order; the first layer with any match wins.
    pub static ref DAMAGE_LAYERS: Vec<DamageLayer> = vec![
        DamageLayer {
            id: "average_and_dice",
            pattern: re(r"(?i)(?P<avg>\d+)\s*\(\s*(?P<count>\d+)d(?P<size>\d+)(?:\s*(?P<sign>[-+\x{2212}\x{2013}])\s*(?P<flat>\d+))?\s*\)\s*(?P<dtype>[a-z]+) damage"),
        },
        DamageLayer {
            id: "bare_dice",
            pattern: re(r"(?i)\b(?P<count>\d+)d(?P<size>\d+)(?:\s*(?P<sign>[-+\x{2212}\x{2013}])\s*(?P<flat>\d+))?\s+(?P<dtype>[a-z]+) damage"),
        },
        DamageLayer {
            id: "untyped_takes",
            pattern: re(r"(?i)takes (?P<count>\d+)d(?P<size>\d+)(?:\s*(?P<sign>[-+\x{2212}\x{2013}])\s*(?P<flat>\d+))? damage"),
        },
    ];
}

/// A whole single-term dice string such as a hit-dice formula.
pub static DICE_NOTATION: LazyLock<Regex> = LazyLock::new(|| {
    re(r"(?i)^\s*(?P<count>\d+)\s*d\s*(?P<size>\d+)(?:\s*(?P<sign>[-+\x{2212}\x{2013}\x{2014}])\s*(?P<flat>\d+))?\s*$")
});

/// Source damage-type names mapped to the coarse target category.
pub const DAMAGE_TYPE_CATEGORIES: [(&str, DamageCategory); 13] = [
    ("bludgeoning", DamageCategory::Physical),
    ("piercing", DamageCategory::Physical),
    ("slashing", DamageCategory::Physical),
    ("acid", DamageCategory::Magic),
    ("cold", DamageCategory::Magic),
    ("fire", DamageCategory::Magic),
    ("force", DamageCategory::Magic),
    ("lightning", DamageCategory::Magic),
    ("necrotic", DamageCategory::Magic),
    ("poison", DamageCategory::Magic),
    ("psychic", DamageCategory::Magic),
    ("radiant", DamageCategory::Magic),
    ("thunder", DamageCategory::Magic),
];

/// Coarse category for a damage-type word; any named type that isn't
/// physical is magic.
pub fn damage_category(type_name: &str) -> DamageCategory {
    let lower = type_name.trim().to_lowercase();
    DAMAGE_TYPE_CATEGORIES
        .iter()
        .find(|(name, _)| *name == lower)
        .map(|(_, category)| *category)
        .unwrap_or(DamageCategory::Magic)
}

/// Source save abilities mapped to target check attributes.
pub const SAVE_ATTRIBUTES: [(Ability, CheckAttribute); 6] = [
    (Ability::Strength, CheckAttribute::Strength),
    (Ability::Dexterity, CheckAttribute::Agility),
    (Ability::Constitution, CheckAttribute::Strength),
    (Ability::Intelligence, CheckAttribute::Knowledge),
    (Ability::Wisdom, CheckAttribute::Instinct),
    (Ability::Charisma, CheckAttribute::Presence),
];

pub fn check_attribute(ability: Ability) -> CheckAttribute {
    SAVE_ATTRIBUTES
        .iter()
        .find(|(a, _)| *a == ability)
        .map(|(_, attr)| *attr)
        .unwrap_or(CheckAttribute::Instinct)
}

// ============================================================================
// Text Rewriting
// ============================================================================

pub static SAVE_DC: LazyLock<Regex> = LazyLock::new(|| {
    re(r"(?i)DC\s*(?P<dc>\d+)\s+(?P<ability>Strength|Dexterity|Constitution|Intelligence|Wisdom|Charisma|STR|DEX|CON|INT|WIS|CHA)\s+saving throw")
});
pub static DC_PHRASE: LazyLock<Regex> = LazyLock::new(|| {
    re(r"(?i)\s*\(\s*(?:escape\s+)?DC\s*\d+\s*\)|\bDC\s*\d+\s*")
});
pub static ABILITY_SAVING_THROW: LazyLock<Regex> = LazyLock::new(|| {
    re(r"(?i)\b(?P<ability>Strength|Dexterity|Constitution|Intelligence|Wisdom|Charisma) saving throw(?P<plural>s?)")
});
pub static SAVING_THROW: LazyLock<Regex> = LazyLock::new(|| re(r"(?i)saving throw(?P<plural>s?)"));
/// "Melee Weapon Attack: +4 to hit, reach 5 ft., one target. Hit: "
pub static ATTACK_PREAMBLE: LazyLock<Regex> = LazyLock::new(|| {
    re(r"(?i)^\s*(?:melee or ranged|melee|ranged) (?:weapon |spell )?attack(?: roll)?\s*:.*?\bhit:\s*")
});
pub static REACTION_TRIGGER: LazyLock<Regex> =
    LazyLock::new(|| re(r"(?i)\b(?:when|whenever|if) (?P<clause>[^,.;]+)"));
pub const DEFAULT_REACTION_TRIGGER: &str = "When an enemy within Melee range acts against this adversary";
pub static ARTICLE_BEFORE_VOWEL: LazyLock<Regex> =
    LazyLock::new(|| re(r"\b(?P<article>[aA]) (?P<word>[AEIOU])"));
pub static FEAR_VOCAB: LazyLock<Regex> = LazyLock::new(|| {
    re(r"(?i)\b(?:fright\w*|fear\w*|terrif\w*|horrif\w*|dread\w*|panic\w*)")
});
pub static BECOME_FRIGHTENED: LazyLock<Regex> =
    LazyLock::new(|| re(r"(?i)\b(?:become|be) frightened\b"));
pub const MARK_FEAR: &str = "**mark 1 Fear**";

// ============================================================================
// Attack and Usage Metadata
// ============================================================================

pub static MELEE_ATTACK: LazyLock<Regex> =
    LazyLock::new(|| re(r"(?i)\bmelee (?:or ranged )?(?:weapon |spell )?attack(?: roll)?\s*:"));
pub static RANGED_ATTACK: LazyLock<Regex> =
    LazyLock::new(|| re(r"(?i)\branged (?:weapon |spell )?attack(?: roll)?\s*:"));
pub static TO_HIT: LazyLock<Regex> =
    LazyLock::new(|| re(r"(?i)(?P<bonus>[-+\x{2212}\x{2013}]\d+)(?: to hit|, reach|, range)"));
pub static REACH: LazyLock<Regex> = LazyLock::new(|| re(r"(?i)reach (?P<feet>\d+) ?(?:ft|feet)"));
pub static RANGE: LazyLock<Regex> =
    LazyLock::new(|| re(r"(?i)range (?P<normal>\d+)(?:/(?P<long>\d+))? ?(?:ft|feet)"));
pub static AREA: LazyLock<Regex> = LazyLock::new(|| {
    re(r"(?i)(?P<feet>\d+)-(?:foot|ft\.?)[- ](?P<shape>cone|line|radius|sphere|cube|cylinder|emanation)")
});
pub static RECHARGE_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| re(r"(?i)\(\s*recharge (\d)(?:\s*[-\x{2013}\x{2014}]\s*\d)?\s*\)"));
pub static PER_DAY_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| re(r"(?i)\(\s*(\d+)\s*/\s*day(?: each)?\s*\)"));
pub static REST_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| re(r"(?i)\(\s*recharges after a (short or long|long) rest\s*\)"));
pub static LEGENDARY_COST: LazyLock<Regex> =
    LazyLock::new(|| re(r"(?i)\s*\(\s*costs? (\d+) actions?\s*\)"));

// ============================================================================
// Multiattack
// ============================================================================

/// "makes two attacks." / "makes two claw attacks." / "makes two attacks with its scimitar."
pub static MULTIATTACK_COUNT: LazyLock<Regex> = LazyLock::new(|| {
    re(r"(?i)makes (?P<count>\w+) (?:(?P<name>[a-z]+) )?attacks?(?: with its (?P<weapon>[a-z]+(?: [a-z]+)?))?\s*(?:\.|$)")
});

/// "one with its bite" / "two with its claws" / "two claw attacks".
pub static MULTIATTACK_FRAGMENT: LazyLock<Regex> = LazyLock::new(|| {
    re(r"(?i)\b(?P<count>one|two|three|four|five|six|seven|eight|\d+) (?:with its (?P<name>[a-z]+)|(?P<named>[a-z]+) attacks?\b)")
});

/// Words that describe an attack without naming one.
pub const GENERIC_ATTACK_WORDS: [&str; 6] = ["melee", "ranged", "weapon", "spell", "its", "of"];

pub const NUMBER_WORDS: [(&str, u32); 10] = [
    ("one", 1),
    ("two", 2),
    ("three", 3),
    ("four", 4),
    ("five", 5),
    ("six", 6),
    ("seven", 7),
    ("eight", 8),
    ("nine", 9),
    ("ten", 10),
];

/// Parse "three" or "3".
pub fn parse_count(word: &str) -> Option<u32> {
    let lower = word.trim().to_lowercase();
    NUMBER_WORDS
        .iter()
        .find(|(w, _)| *w == lower)
        .map(|(_, n)| *n)
        .or_else(|| lower.parse().ok())
}

// ============================================================================
// Classifier Vocabulary
// ============================================================================

pub static SWARM_NAME: LazyLock<Regex> = LazyLock::new(|| re(r"(?i)^\s*swarm of\b"));
pub static LEADER_VOCAB: LazyLock<Regex> = LazyLock::new(|| {
    re(r"(?i)\b(?:leadership|rally(?:ing)?|commands? (?:its |an? |one |up to \w+ )?all(?:y|ies)|battle cry|war cry|inspir(?:e|es|ing)|allies? (?:can|may) use (?:its|their) reaction)")
});
pub static SUPPORT_VOCAB: LazyLock<Regex> = LazyLock::new(|| {
    re(r"(?i)\b(?:heal(?:s|ing)?|cure wounds|regains? hit points|restor(?:e|es|ation)|protective|aura of protection|ward(?:s|ing)?|shield of faith|bless|sanctuary|spirit guardians)\b")
});
pub static PACK_VOCAB: LazyLock<Regex> = LazyLock::new(|| {
    re(r"(?i)\b(?:pack tactics|at least one of .+? allies is within|martial advantage|hive mind|swarming)")
});
pub static MOBILITY_VOCAB: LazyLock<Regex> = LazyLock::new(|| {
    re(r"(?i)\b(?:nimble escape|cunning action|disengage|evasion|hide action|uncanny dodge|skirmish\w*|shadow step|invisib\w+|blink\w*|teleport\w*)")
});
pub static SKIRMISH_VOCAB: LazyLock<Regex> = LazyLock::new(|| {
    re(r"(?i)\b(?:flyby|dive attack|swoop\w*|hit and run|doesn't provoke (?:an )?opportunity attacks)")
});
pub static CONTROL_VOCAB: LazyLock<Regex> = LazyLock::new(|| {
    re(r"(?i)\b(?:restrained|grappled|paralyzed|stunned|charmed|frightened|prone|incapacitated|petrified|blinded)\b")
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trait_rule_ids_are_unique() {
        let mut ids: Vec<_> = TRAIT_RULES.iter().map(|r| r.id).collect();
        let total = ids.len();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), total);
    }

    #[test]
    fn test_damage_category_lookup() {
        assert_eq!(damage_category("Slashing"), DamageCategory::Physical);
        assert_eq!(damage_category("fire"), DamageCategory::Magic);
        assert_eq!(damage_category("radiant"), DamageCategory::Magic);
        // Unknown words still count as a named, non-physical type
        assert_eq!(damage_category("sonic"), DamageCategory::Magic);
    }

    #[test]
    fn test_save_attribute_table_covers_every_ability() {
        for ability in Ability::all() {
            assert!(SAVE_ATTRIBUTES.iter().any(|(a, _)| *a == ability));
        }
        assert_eq!(check_attribute(Ability::Dexterity), CheckAttribute::Agility);
        assert_eq!(check_attribute(Ability::Wisdom), CheckAttribute::Instinct);
    }

    #[test]
    fn test_parse_count() {
        assert_eq!(parse_count("Three"), Some(3));
        assert_eq!(parse_count("4"), Some(4));
        assert_eq!(parse_count("several"), None);
    }

    #[test]
    fn test_multiattack_count_requires_sentence_end() {
        assert!(MULTIATTACK_COUNT.is_match("The goblin makes two attacks with its scimitar."));
        assert!(!MULTIATTACK_COUNT
            .is_match("The dragon makes three attacks: one with its bite and two with its claws."));
    }

    #[test]
    fn test_first_damage_layer_takes_precedence() {
        let text = "Hit: 17 (2d10 + 6) piercing damage plus 7 (2d6) fire damage.";
        assert!(DAMAGE_LAYERS[0].pattern.is_match(text));
        let matches: Vec<_> = DAMAGE_LAYERS[0].pattern.captures_iter(text).collect();
        assert_eq!(matches.len(), 2);
        assert_eq!(&matches[0]["dtype"], "piercing");
    }
}
