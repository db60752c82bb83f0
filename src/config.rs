//! Engine settings. Defaults match how tournaments are usually run; each can be
//! overridden from the environment.

use serde::Deserialize;
use std::str::FromStr;

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub struct EngineConfig {
    /// How many players each group sends to the main bracket.
    #[serde(default = "default_qualifiers_per_group")]
    pub qualifiers_per_group: usize,
    /// Gap between consecutive preliminary matches.
    #[serde(default = "default_match_interval_minutes")]
    pub match_interval_minutes: i64,
    /// Delay before the first main-bracket match.
    #[serde(default = "default_main_round_lead_minutes")]
    pub main_round_lead_minutes: i64,
    /// Gap between main-bracket matches of the first round.
    #[serde(default = "default_main_match_spacing_minutes")]
    pub main_match_spacing_minutes: i64,
    /// Delay before matches of an advanced round.
    #[serde(default = "default_next_round_delay_minutes")]
    pub next_round_delay_minutes: i64,
}

fn default_qualifiers_per_group() -> usize {
    2
}

fn default_match_interval_minutes() -> i64 {
    20
}

fn default_main_round_lead_minutes() -> i64 {
    60
}

fn default_main_match_spacing_minutes() -> i64 {
    15
}

fn default_next_round_delay_minutes() -> i64 {
    120
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            qualifiers_per_group: default_qualifiers_per_group(),
            match_interval_minutes: default_match_interval_minutes(),
            main_round_lead_minutes: default_main_round_lead_minutes(),
            main_match_spacing_minutes: default_main_match_spacing_minutes(),
            next_round_delay_minutes: default_next_round_delay_minutes(),
        }
    }
}

impl EngineConfig {
    /// Read overrides from `QUALIFIERS_PER_GROUP` and `MATCH_INTERVAL_MINUTES`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            qualifiers_per_group: parse_or(
                &lookup,
                "QUALIFIERS_PER_GROUP",
                defaults.qualifiers_per_group,
            )
            .max(1),
            match_interval_minutes: parse_or(
                &lookup,
                "MATCH_INTERVAL_MINUTES",
                defaults.match_interval_minutes,
            ),
            ..defaults
        }
    }
}

fn parse_or<T: FromStr + Copy>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> T {
    match lookup(key) {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            log::warn!("ignoring invalid {key}={raw:?}");
            default
        }),
    }
}
