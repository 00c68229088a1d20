//! Adversary conversion engine.
//!
//! This crate provides:
//! - A source creature record for D&D-style stat blocks
//! - A classifier that picks a target archetype and combat role
//! - Stat conversion onto tiers, difficulty thresholds, hit points, stress, and evasion
//! - An ability compiler that turns traits and actions into costed features
//! - Multiattack and legendary-action folding
//!
//! # Quick Start
//!
//! ```
//! use adversary_core::testing::wolf;
//! use adversary_core::{AdversaryConverter, Archetype, ConversionConfig};
//!
//! let converter = AdversaryConverter::new(ConversionConfig::new().with_sentence_limit(2));
//! let adversary = converter.convert(&wolf()).unwrap();
//!
//! assert_eq!(adversary.archetype, Archetype::Horde);
//! println!("{}", adversary.to_json_pretty().unwrap());
//! ```

pub mod abilities;
pub mod adversary;
pub mod classifier;
pub mod creature;
pub mod dice;
pub mod engine;
pub mod multiattack;
pub mod patterns;
pub mod stats;
pub mod testing;

// Primary public API
pub use adversary::{Adversary, ConvertedFeature, CoreStats, Difficulty, Feature, Tier};
pub use classifier::{classify, Archetype, ClassificationResult, CombatRole};
pub use creature::SourceCreature;
pub use engine::{convert, AdversaryConverter, ConversionConfig, ConversionError};
pub use stats::{ChallengeRating, ChallengeRatingError, StatWarning};
