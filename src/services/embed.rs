//! Presentation of hydrated clashes as chat embeds.

use crate::{
    dao::models::GuildId,
    dto::embed::{BLURPLE, Embed},
    localization::Localizer,
    state::clash::Game,
};

/// Render a clash for a guild.
///
/// Lobby and running clashes list players and allowed languages; finished
/// clashes show the winner instead. The drawn mode replaces the candidate
/// modes once known.
pub fn render_game_embed(game: &Game, lang: &dyn Localizer, guild_id: GuildId) -> Embed {
    let yes_no = |flag: bool| {
        let key = if flag { "general_yes" } else { "general_no" };
        lang.get(key, guild_id)
    };

    let mut embed = Embed::new(lang.get("coc_game_title", guild_id), BLURPLE)
        .field(lang.get("coc_started", guild_id), yes_no(game.started), true)
        .field(lang.get("coc_finished", guild_id), yes_no(game.finished), true);

    embed = match game.active_mode {
        None => {
            let modes = game
                .modes
                .iter()
                .map(|mode| {
                    let key = format!("coc_mode_{}", mode.as_str().to_lowercase());
                    format!(" - {}", lang.get(&key, guild_id))
                })
                .collect::<Vec<_>>()
                .join("\n");
            embed.field(lang.get("coc_game_modes", guild_id), modes, false)
        }
        Some(mode) => embed.field(
            lang.get("coc_game_mode", guild_id),
            format!("`{}`", mode.as_str().to_lowercase()),
            false,
        ),
    };

    if !game.finished {
        let players = code_list(game.players.iter().map(|player| player.name.as_str()));
        let languages = if game.allowed_languages.is_empty() {
            lang.get("coc_all_languages", guild_id)
        } else {
            code_list(game.allowed_languages.iter().map(String::as_str))
        };

        embed
            .field(lang.get("coc_game_players", guild_id), players, false)
            .field(lang.get("coc_game_languages", guild_id), languages, true)
    } else if let Some(winner) = game.winner() {
        embed.field(
            lang.get("coc_game_winner", guild_id),
            format!("`{}`", winner.name),
            false,
        )
    } else {
        embed
    }
}

fn code_list<'a>(items: impl Iterator<Item = &'a str>) -> String {
    items
        .map(|item| format!("`{item}`"))
        .collect::<Vec<_>>()
        .join(", ")
}
