use super::*;
use crate::test_fixtures::{base_content, duel_state, make_rng};

mod combat;
mod turn;

// --- Shared test helpers ------------------------------------------------

fn power_up(state: &mut GameState, player_index: usize, kind: SubsystemKind, amount: u32) {
    let content = base_content();
    let applied = crate::allocate_energy(
        &mut state.players[player_index].ship,
        kind,
        amount,
        &content,
    );
    assert!(applied, "fixture allocation of {amount} to {kind:?} failed");
}

fn envelope(player: &str, sequence: Option<u32>, action: Action) -> ActionEnvelope {
    ActionEnvelope {
        player_id: PlayerId(player.to_string()),
        sequence,
        action,
    }
}

fn coast(player: &str, sequence: u32) -> ActionEnvelope {
    envelope(player, Some(sequence), Action::Coast)
}

/// Content with the critical-hit roll pinned to always or never succeed.
fn content_with_crit(chance: f32) -> GameContent {
    let mut content = base_content();
    content.constants.crit_chance = chance;
    content
}

fn ship(state: &GameState, player_index: usize) -> &ShipState {
    &state.players[player_index].ship
}
