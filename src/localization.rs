//! Display strings resolved per guild.

use std::collections::HashMap;

use serde::Deserialize;
use tracing::warn;

use crate::dao::models::GuildId;

/// Language used when neither the guild nor the configuration picks one.
pub const FALLBACK_LANGUAGE: &str = "en";

/// Resolve a display string for a guild.
pub trait Localizer: Send + Sync {
    /// Localized string for `key`; unknown keys resolve to the key itself.
    fn get(&self, key: &str, guild_id: GuildId) -> String;
}

/// Language tables loaded from configuration, layered over built-in English strings.
#[derive(Debug, Clone)]
pub struct LangFile {
    default_language: String,
    languages: HashMap<String, HashMap<String, String>>,
    guild_languages: HashMap<GuildId, String>,
}

/// JSON shape of the `localization` configuration section.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RawLangFile {
    default_language: Option<String>,
    languages: HashMap<String, HashMap<String, String>>,
    guild_languages: HashMap<GuildId, String>,
}

impl LangFile {
    /// Language configured for a guild, or the default one.
    pub fn language_of(&self, guild_id: GuildId) -> &str {
        self.guild_languages
            .get(&guild_id)
            .map(String::as_str)
            .unwrap_or(&self.default_language)
    }

    fn lookup(&self, language: &str, key: &str) -> Option<&str> {
        self.languages
            .get(language)
            .and_then(|table| table.get(key))
            .map(String::as_str)
    }
}

impl Default for LangFile {
    fn default() -> Self {
        RawLangFile::default().into()
    }
}

impl From<RawLangFile> for LangFile {
    fn from(raw: RawLangFile) -> Self {
        let mut languages = raw.languages;
        let english = languages.entry(FALLBACK_LANGUAGE.to_owned()).or_default();
        for (key, value) in built_in_strings() {
            english
                .entry(key.to_owned())
                .or_insert_with(|| value.to_owned());
        }

        Self {
            default_language: raw
                .default_language
                .unwrap_or_else(|| FALLBACK_LANGUAGE.to_owned()),
            languages,
            guild_languages: raw.guild_languages,
        }
    }
}

impl Localizer for LangFile {
    fn get(&self, key: &str, guild_id: GuildId) -> String {
        let language = self.language_of(guild_id);
        let found = self
            .lookup(language, key)
            .or_else(|| self.lookup(&self.default_language, key))
            .or_else(|| self.lookup(FALLBACK_LANGUAGE, key));

        match found {
            Some(value) => value.to_owned(),
            None => {
                warn!(key, language, guild_id, "missing localization key");
                key.to_owned()
            }
        }
    }
}

fn built_in_strings() -> [(&'static str, &'static str); 14] {
    [
        ("general_yes", "Yes"),
        ("general_no", "No"),
        ("coc_game_title", "Clash of Code"),
        ("coc_started", "Started"),
        ("coc_finished", "Finished"),
        ("coc_game_modes", "Possible modes"),
        ("coc_game_mode", "Mode"),
        ("coc_mode_fastest", "Fastest"),
        ("coc_mode_reverse", "Reverse"),
        ("coc_mode_shortest", "Shortest"),
        ("coc_game_players", "Players"),
        ("coc_game_languages", "Languages"),
        ("coc_all_languages", "All languages"),
        ("coc_game_winner", "Winner"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn lang_file() -> LangFile {
        let raw: RawLangFile = serde_json::from_value(json!({
            "languages": {
                "fr": {"general_yes": "Oui", "coc_game_winner": "Gagnant"}
            },
            "guild_languages": {"42": "fr"}
        }))
        .unwrap();
        raw.into()
    }

    #[test]
    fn uses_guild_language_then_english() {
        let lang = lang_file();
        assert_eq!(lang.get("general_yes", 42), "Oui");
        assert_eq!(lang.get("general_no", 42), "No");
        assert_eq!(lang.get("general_yes", 7), "Yes");
    }

    #[test]
    fn unknown_key_resolves_to_itself() {
        assert_eq!(LangFile::default().get("coc_unknown", 1), "coc_unknown");
    }

    #[test]
    fn configured_english_overrides_built_ins() {
        let raw: RawLangFile = serde_json::from_value(json!({
            "languages": {"en": {"coc_game_title": "CoC"}}
        }))
        .unwrap();
        let lang = LangFile::from(raw);
        assert_eq!(lang.get("coc_game_title", 1), "CoC");
        assert_eq!(lang.get("coc_game_mode", 1), "Mode");
    }
}
