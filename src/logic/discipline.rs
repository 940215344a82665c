//! Card tallies and bans.

use crate::models::{Card, CardKind, PlayerId, TeamId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct PlayerDiscipline {
    pub player_id: PlayerId,
    pub player_name: String,
    pub team_id: TeamId,
    pub team_name: String,
    pub yellow_cards: u32,
    pub red_cards: u32,
    pub banned: bool,
}

/// Cards per player. A player is banned after `yellow_threshold` yellows or any red.
/// Banned players come first, then by red and yellow count.
pub fn player_discipline(cards: &[Card], yellow_threshold: u32) -> Vec<PlayerDiscipline> {
    let mut players: Vec<PlayerDiscipline> = Vec::new();
    let mut index: HashMap<PlayerId, usize> = HashMap::new();
    for card in cards {
        let i = *index.entry(card.player_id).or_insert_with(|| {
            players.push(PlayerDiscipline {
                player_id: card.player_id,
                player_name: card.player_name.clone(),
                team_id: card.team_id,
                team_name: card.team_name.clone(),
                yellow_cards: 0,
                red_cards: 0,
                banned: false,
            });
            players.len() - 1
        });
        match card.kind {
            CardKind::Yellow => players[i].yellow_cards += 1,
            CardKind::Red => players[i].red_cards += 1,
        }
    }
    for p in &mut players {
        p.banned = p.yellow_cards >= yellow_threshold || p.red_cards > 0;
    }
    players.sort_by(|a, b| {
        b.banned
            .cmp(&a.banned)
            .then_with(|| b.red_cards.cmp(&a.red_cards))
            .then_with(|| b.yellow_cards.cmp(&a.yellow_cards))
    });
    players
}
