//! Pure presentation derivation: what each cell should look like given the
//! session state. The terminal renderer sits on top of the same per-cell
//! decision the original grid made.

use crate::{
    board::{col_of, index_of, row_of, COLS, GLASS_INDEX, ROWS},
    session::Session,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Fill {
    /// Cell has been consumed.
    Eaten,
    /// Cell would be consumed by the hovered/pending move.
    Preview,
    Clear,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Label {
    /// Our n-th move (1-based), shown in blue.
    Mine(usize),
    /// Opponent's n-th move (1-based), shown in red.
    Theirs(usize),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CellPaint {
    pub fill: Fill,
    pub label: Option<Label>,
    pub glass: bool,
}

/// Derive the paint for one cell.
pub fn cell_paint(session: &Session, index: u8) -> CellPaint {
    let eaten = session
        .board
        .map(|board| board.eaten_at(index))
        .unwrap_or(false);

    let fill = if eaten {
        Fill::Eaten
    } else if in_preview(session, index) || session.pending == Some(index) {
        Fill::Preview
    } else {
        Fill::Clear
    };

    let label = if let Some(pos) = position(&session.local_moves, index) {
        Some(Label::Mine(pos + 1))
    } else {
        position(&session.opponent_moves, index).map(|pos| Label::Theirs(pos + 1))
    };

    CellPaint {
        fill,
        label,
        glass: index == GLASS_INDEX && !eaten && label.is_none(),
    }
}

/// Eating a cell consumes everything at its row or above AND its column or
/// left; the glass cell is never part of the highlighted rectangle.
fn in_preview(session: &Session, index: u8) -> bool {
    match session.hover {
        Some(hover) => {
            row_of(index) <= row_of(hover) && col_of(index) <= col_of(hover) && index != GLASS_INDEX
        }
        None => false,
    }
}

fn position(history: &[u8], index: u8) -> Option<usize> {
    history.iter().position(|&i| i == index)
}

const BLUE: &str = "\x1b[34m";
const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[43m";
const DIM: &str = "\x1b[90m";
const RESET: &str = "\x1b[0m";

/// Render the whole grid for a terminal.
pub fn render(session: &Session) -> String {
    let mut out = String::new();

    out.push_str("     ");
    for col in 1..=COLS {
        out.push_str(&format!(" {col}  "));
    }
    out.push('\n');
    out.push_str("   ┌");
    out.push_str(&"────".repeat(COLS));
    out.push_str("┐\n");

    for row in 0..ROWS as u8 {
        out.push_str(&format!(" {} │", row + 1));
        for col in 0..COLS as u8 {
            let paint = cell_paint(session, index_of(row, col));
            out.push_str(&cell_text(paint));
        }
        out.push_str("│\n");
    }

    out.push_str("   └");
    out.push_str(&"────".repeat(COLS));
    out.push_str("┘\n");
    out.push_str(&format!(
        "   {BLUE}n{RESET}=your move  {RED}n{RESET}=opponent  {DIM}::{RESET}=eaten  #=glass  *=candy\n"
    ));

    if let Some(popup) = &session.popup {
        out.push_str(&format!("\n   ===== {popup} =====\n"));
    }
    out
}

fn cell_text(paint: CellPaint) -> String {
    let body = match (paint.label, paint.fill, paint.glass) {
        (Some(Label::Mine(n)), _, _) => format!("{BLUE}{n:>2}{RESET}"),
        (Some(Label::Theirs(n)), _, _) => format!("{RED}{n:>2}{RESET}"),
        (None, Fill::Eaten, _) => format!("{DIM}::{RESET}"),
        (None, _, true) => " #".to_string(),
        (None, _, false) => " *".to_string(),
    };
    match paint.fill {
        Fill::Preview => format!("{YELLOW} {body}{YELLOW} {RESET}"),
        _ => format!(" {body} "),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        board::{Board, CELLS},
        logs::GameOutcome,
    };

    #[test]
    fn preview_rectangle_is_above_left_of_hover() {
        let mut session = Session::new();
        session.set_hover(Some(index_of(1, 2)));

        assert_eq!(cell_paint(&session, index_of(0, 0)).fill, Fill::Preview);
        assert_eq!(cell_paint(&session, index_of(1, 2)).fill, Fill::Preview);
        assert_eq!(cell_paint(&session, index_of(1, 3)).fill, Fill::Clear);
        assert_eq!(cell_paint(&session, index_of(2, 0)).fill, Fill::Clear);
    }

    #[test]
    fn preview_never_includes_the_glass() {
        let mut session = Session::new();
        session.set_hover(Some(index_of(4, 6)));
        assert_eq!(cell_paint(&session, GLASS_INDEX).fill, Fill::Clear);
        // pending marker still highlights its own cell
        session.set_hover(None);
        session.begin_move(index_of(4, 6));
        assert_eq!(cell_paint(&session, index_of(4, 6)).fill, Fill::Preview);
    }

    #[test]
    fn labels_are_one_based_and_local_wins() {
        let mut session = Session::new();
        session.record_local(0, 3);
        session.record_local(1, 1);
        session.record_opponent(0, 3);
        session.record_opponent(2, 2);

        assert_eq!(
            cell_paint(&session, index_of(1, 1)).label,
            Some(Label::Mine(2))
        );
        assert_eq!(
            cell_paint(&session, index_of(2, 2)).label,
            Some(Label::Theirs(2))
        );
        assert_eq!(
            cell_paint(&session, index_of(0, 3)).label,
            Some(Label::Mine(1))
        );
    }

    #[test]
    fn glass_icon_only_on_uneaten_unlabeled_glass() {
        let session = Session::new();
        assert!(cell_paint(&session, GLASS_INDEX).glass);
        for i in 0..CELLS as u8 - 1 {
            assert!(!cell_paint(&session, i).glass);
        }

        let mut lost = Session::new();
        lost.finish(GameOutcome::Lost);
        assert!(!cell_paint(&lost, GLASS_INDEX).glass);
    }

    #[test]
    fn eaten_cells_come_from_the_board() {
        let mut session = Session::new();
        session.observe_board(Board::decode(&[0x80, 0, 0, 0, 0]).unwrap());
        assert_eq!(cell_paint(&session, 0).fill, Fill::Eaten);
        assert_eq!(cell_paint(&session, 1).fill, Fill::Clear);
    }

    #[test]
    fn render_smoke() {
        let mut session = Session::new();
        session.record_local(0, 0);
        session.finish(GameOutcome::Won);
        let text = render(&session);
        assert!(text.contains("You win!"));
        assert!(text.contains('#'));
    }
}
