//! Program log scanning.
//!
//! The program's log lines are the only channel carrying the opponent's
//! reciprocal move and the game outcome, so their exact wording is a wire
//! contract. The opponent-move line is split on single spaces and tokens 4
//! and 5 hold the 1-indexed row and column; do not loosen this without
//! confirming the program's actual format.

/// How a finished game ended, from the player's perspective.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameOutcome {
    Won,
    Lost,
}

impl GameOutcome {
    /// Popup text, matching the original client's capitalization.
    pub fn banner(self) -> &'static str {
        match self {
            GameOutcome::Won => "You win!",
            GameOutcome::Lost => "You Lose!",
        }
    }
}

/// Everything learned from one transaction's log lines.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LogReport {
    pub outcome: Option<GameOutcome>,
    /// 0-indexed (row, col) the opponent ate in response.
    pub opponent_move: Option<(u8, u8)>,
}

/// Scan log lines in order. The first terminal line wins and stops the
/// scan; opponent-move lines before it are still collected.
pub fn scan_logs<'a, I>(lines: I) -> LogReport
where
    I: IntoIterator<Item = &'a str>,
{
    let mut report = LogReport::default();
    for line in lines {
        if line.contains("Opponent Move:") {
            if let Some(mv) = parse_opponent_move(line) {
                report.opponent_move = Some(mv);
            }
        } else if line.contains("You lose!") {
            report.outcome = Some(GameOutcome::Lost);
            break;
        } else if line.contains("You win!") {
            report.outcome = Some(GameOutcome::Won);
            break;
        }
    }
    report
}

fn parse_opponent_move(line: &str) -> Option<(u8, u8)> {
    let fields: Vec<&str> = line.split(' ').collect();
    let row: u8 = fields.get(4)?.parse().ok()?;
    let col: u8 = fields.get(5)?.parse().ok()?;
    // log values are 1-indexed
    Some((row.checked_sub(1)?, col.checked_sub(1)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::index_of;

    #[test]
    fn opponent_move_uses_fixed_field_positions() {
        let report = scan_logs(["Program log: Opponent Move: is 3 4"]);
        assert_eq!(report.opponent_move, Some((2, 3)));
        assert_eq!(index_of(2, 3), 19);
        assert_eq!(report.outcome, None);
    }

    #[test]
    fn opponent_move_ignores_malformed_lines() {
        assert_eq!(scan_logs(["Opponent Move: 3 4"]).opponent_move, None);
        assert_eq!(
            scan_logs(["Program log: Opponent Move: is x 4"]).opponent_move,
            None
        );
        // 0 cannot be 1-indexed
        assert_eq!(
            scan_logs(["Program log: Opponent Move: is 0 4"]).opponent_move,
            None
        );
    }

    #[test]
    fn terminal_lines_match_by_substring() {
        assert_eq!(
            scan_logs(["Program log: You lose!"]).outcome,
            Some(GameOutcome::Lost)
        );
        assert_eq!(
            scan_logs(["Program log: You win!"]).outcome,
            Some(GameOutcome::Won)
        );
    }

    #[test]
    fn terminal_line_stops_the_scan() {
        let report = scan_logs([
            "Program log: Opponent Move: is 1 2",
            "Program log: You lose!",
            "Program log: Opponent Move: is 3 4",
        ]);
        assert_eq!(report.outcome, Some(GameOutcome::Lost));
        // the move after the terminal line was never read
        assert_eq!(report.opponent_move, Some((0, 1)));
    }

    #[test]
    fn empty_logs_report_nothing() {
        assert_eq!(scan_logs([]), LogReport::default());
    }

    #[test]
    fn banners_keep_original_capitalization() {
        assert_eq!(GameOutcome::Won.banner(), "You win!");
        assert_eq!(GameOutcome::Lost.banner(), "You Lose!");
    }
}
