//! Local view state for one wallet's game.
//!
//! One struct owns everything the UI shows, and the methods here are the
//! only mutation path. Histories are append-only linear cell indices in
//! confirmation order; the board itself always mirrors the chain.

use crate::{
    board::{index_of, Board},
    logs::GameOutcome,
};

#[derive(Clone, Debug, Default)]
pub struct Session {
    /// Last board observed on chain; `None` until the account exists.
    pub board: Option<Board>,
    /// Our confirmed moves, in order.
    pub local_moves: Vec<u8>,
    /// The opponent's confirmed moves, in order.
    pub opponent_moves: Vec<u8>,
    /// Terminal banner text, when the game has ended.
    pub popup: Option<String>,
    /// Cell the user is currently considering.
    pub hover: Option<u8>,
    /// Cell with a transaction in flight.
    pub pending: Option<u8>,
}

impl Session {
    pub fn new() -> Session {
        Session::default()
    }

    /// A different board was observed on chain.
    pub fn observe_board(&mut self, board: Board) {
        self.board = Some(board);
    }

    pub fn set_hover(&mut self, index: Option<u8>) {
        self.hover = index;
    }

    /// A move was requested; mark the cell until it resolves.
    pub fn begin_move(&mut self, index: u8) {
        self.pending = Some(index);
    }

    /// The in-flight move resolved (either way).
    pub fn clear_pending(&mut self) {
        self.pending = None;
    }

    /// Record our own move as echoed back by the program.
    pub fn record_local(&mut self, row: u8, col: u8) {
        let index = index_of(row, col);
        if !self.local_moves.contains(&index) {
            self.local_moves.push(index);
        }
    }

    /// Record the opponent's reciprocal move from the transaction logs.
    pub fn record_opponent(&mut self, row: u8, col: u8) {
        let index = index_of(row, col);
        if !self.opponent_moves.contains(&index) {
            self.opponent_moves.push(index);
        }
    }

    /// The game ended; show the terminal board and banner.
    pub fn finish(&mut self, outcome: GameOutcome) {
        self.board = Some(Board::game_over(outcome == GameOutcome::Won));
        self.popup = Some(outcome.banner().to_string());
        self.pending = None;
    }

    pub fn game_over(&self) -> bool {
        self.popup.is_some()
    }

    /// Whether a game is actually underway: the account exists and at
    /// least one cell has been consumed. Gates the forfeit offer, like the
    /// original's Give Up button.
    pub fn game_in_progress(&self) -> bool {
        self.board.map_or(false, |board| board.any_eaten())
    }

    /// Clear everything: wallet change, popup close, or forfeit.
    pub fn reset(&mut self) {
        *self = Session::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn histories_are_append_only_and_ordered() {
        let mut session = Session::new();
        session.record_local(0, 0);
        session.record_local(1, 4);
        session.record_opponent(2, 3);
        assert_eq!(session.local_moves, vec![0, 12]);
        assert_eq!(session.opponent_moves, vec![19]);
    }

    #[test]
    fn duplicate_echo_is_ignored() {
        let mut session = Session::new();
        session.record_local(1, 1);
        session.record_local(1, 1);
        assert_eq!(session.local_moves, vec![9]);
    }

    #[test]
    fn pending_marker_tracks_the_in_flight_move() {
        let mut session = Session::new();
        session.begin_move(12);
        assert_eq!(session.pending, Some(12));
        session.clear_pending();
        assert_eq!(session.pending, None);
    }

    #[test]
    fn finish_sets_terminal_board_and_popup() {
        let mut session = Session::new();
        session.begin_move(3);
        session.finish(GameOutcome::Won);
        assert_eq!(session.popup.as_deref(), Some("You win!"));
        assert_eq!(session.board, Some(Board::game_over(true)));
        assert_eq!(session.pending, None);
        assert!(session.game_over());

        session.finish(GameOutcome::Lost);
        assert_eq!(session.popup.as_deref(), Some("You Lose!"));
        assert_eq!(session.board, Some(Board::game_over(false)));
    }

    #[test]
    fn forfeit_gate_requires_a_started_game() {
        let mut session = Session::new();
        assert!(!session.game_in_progress());
        session.observe_board(Board::default());
        assert!(!session.game_in_progress());
        session.observe_board(Board::decode(&[0x80, 0, 0, 0, 0]).unwrap());
        assert!(session.game_in_progress());
    }

    #[test]
    fn reset_clears_everything() {
        let mut session = Session::new();
        session.observe_board(Board::game_over(false));
        session.record_local(0, 0);
        session.record_opponent(0, 1);
        session.finish(GameOutcome::Lost);
        session.reset();
        assert!(session.board.is_none());
        assert!(session.local_moves.is_empty());
        assert!(session.opponent_moves.is_empty());
        assert!(session.popup.is_none());
    }
}
