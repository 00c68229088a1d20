//! Damage extraction.
//!
//! Three layered patterns, most specific first. The first layer with any
//! usable match supplies the expression; later layers are never consulted.

use crate::adversary::{DamageCategory, DamageExpression};
use crate::dice::Dice;
use crate::patterns::{self, DAMAGE_LAYERS};
use regex::Captures;

/// An extracted expression and the layer that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DamageMatch {
    pub expression: DamageExpression,
    pub layer: &'static str,
}

fn expression_from(caps: &Captures) -> Option<DamageExpression> {
    let dice = Dice::from_captures(caps).ok()?;
    // Untyped "takes XdY damage" counts as physical
    let category = caps
        .name("dtype")
        .map(|m| patterns::damage_category(m.as_str()))
        .unwrap_or(DamageCategory::Physical);
    Some(DamageExpression::new(dice, category))
}

/// Find the first damage expression in `text`.
pub fn extract(text: &str) -> Option<DamageMatch> {
    DAMAGE_LAYERS.iter().find_map(|layer| {
        layer
            .pattern
            .captures_iter(text)
            .find_map(|caps| expression_from(&caps))
            .map(|expression| DamageMatch {
                expression,
                layer: layer.id,
            })
    })
}

/// Rewrite every recognizable damage phrase as "**2d6+3 phy** damage".
pub fn emphasize(text: &str) -> String {
    let mut out = text.to_string();
    for layer in DAMAGE_LAYERS.iter() {
        out = layer
            .pattern
            .replace_all(&out, |caps: &Captures| match expression_from(caps) {
                Some(expr) if caps[0].to_lowercase().starts_with("takes") => {
                    format!("takes {} damage", expr.emphasized())
                }
                Some(expr) => format!("{} damage", expr.emphasized()),
                None => caps[0].to_string(),
            })
            .into_owned();
    }
    out
}
