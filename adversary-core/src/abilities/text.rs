//! Description rewriting.

use super::damage;
use crate::adversary::{ConditionTag, SaveCheck};
use crate::creature::{Ability, SavingThrow};
use crate::patterns::{self, CONDITION_RULES};
use regex::Captures;

/// Rewrite source ability text into target phrasing and cut it to
/// `sentence_limit` sentences.
pub fn rewrite(text: &str, sentence_limit: usize) -> String {
    let text = patterns::ATTACK_PREAMBLE.replace(text, "");
    let text = damage::emphasize(&text);
    let text = patterns::DC_PHRASE.replace_all(&text, "");
    let text = patterns::ABILITY_SAVING_THROW.replace_all(&text, |caps: &Captures| {
        let attribute = Ability::parse(&caps["ability"])
            .map(patterns::check_attribute)
            .map(|a| a.name())
            .unwrap_or("Instinct");
        format!("{attribute} Reaction Roll{}", &caps["plural"])
    });
    let text = patterns::SAVING_THROW.replace_all(&text, "Reaction Roll$plural");
    let text = fix_articles(&text);
    let text = apply_fear(&text);
    truncate_sentences(text.trim(), sentence_limit)
}

/// "a Agility" becomes "an Agility".
pub fn fix_articles(text: &str) -> String {
    patterns::ARTICLE_BEFORE_VOWEL
        .replace_all(text, |caps: &Captures| {
            let article = if &caps["article"] == "A" { "An" } else { "an" };
            format!("{article} {}", &caps["word"])
        })
        .into_owned()
}

/// Insert the Fear cost in front of "become frightened". Text that already
/// carries the cost is left alone.
pub fn apply_fear(text: &str) -> String {
    if text.contains(patterns::MARK_FEAR) {
        return text.to_string();
    }
    patterns::BECOME_FRIGHTENED
        .replace_all(text, format!("{} and become Frightened", patterns::MARK_FEAR))
        .into_owned()
}

/// Keep the first `limit` sentences. A sentence ends at `.`, `!` or `?`
/// followed by whitespace and an uppercase letter.
pub fn truncate_sentences(text: &str, limit: usize) -> String {
    if limit == 0 {
        return String::new();
    }
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let mut sentences = 0;
    for (i, &(pos, ch)) in chars.iter().enumerate() {
        if !matches!(ch, '.' | '!' | '?') {
            continue;
        }
        let mut j = i + 1;
        let mut saw_space = false;
        while j < chars.len() && chars[j].1.is_whitespace() {
            saw_space = true;
            j += 1;
        }
        let next_upper = chars.get(j).is_some_and(|(_, c)| c.is_uppercase());
        if saw_space && next_upper {
            sentences += 1;
            if sentences == limit {
                return text[..pos + ch.len_utf8()].to_string();
            }
        }
    }
    text.to_string()
}

/// Map a source save onto a target check: `floor(DC / 2) + 8`.
pub fn save_check(save: SavingThrow) -> SaveCheck {
    SaveCheck {
        attribute: patterns::check_attribute(save.ability),
        difficulty: save.dc / 2 + 8,
    }
}

/// Condition tags implied by the text, in table order with Frightened first.
pub fn condition_tags(text: &str) -> Vec<ConditionTag> {
    let mut tags = Vec::new();
    if patterns::FEAR_VOCAB.is_match(text) {
        tags.push(ConditionTag::Frightened);
    }
    for (pattern, tag) in CONDITION_RULES.iter() {
        if pattern.is_match(text) && !tags.contains(tag) {
            tags.push(*tag);
        }
    }
    tags
}
