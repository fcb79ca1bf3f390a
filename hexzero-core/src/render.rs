//! Text rendering of a board

use std::fmt;

use crate::board::{Board, Player};

/// Character for a cell
fn symbol(occupant: Option<Player>) -> char {
    match occupant {
        Some(Player::One) => 'X',
        Some(Player::Two) => 'O',
        None => '-',
    }
}

/// Each row is shifted half a cell to the right of the one above it, which
/// lines cells up with their hex neighbours.
impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Player {} with X (top to bottom)", Player::One)?;
        writeln!(f, "Player {} with O (left to right)", Player::Two)?;
        writeln!(f)?;

        write!(f, "{:4}", "")?;
        for col in 0..self.width() {
            write!(f, "{:^4}", col)?;
        }
        writeln!(f)?;

        for row in 0..self.height() {
            write!(f, "{:>4}{}", row, " ".repeat(2 * row))?;
            for col in 0..self.width() {
                let mv = row * self.width() + col;
                write!(f, "{:^4}", symbol(self.occupant(mv)))?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_stones() {
        let mut board = Board::new(3, 2).unwrap();
        board.do_move(0).unwrap();
        board.do_move(5).unwrap();

        let text = board.to_string();
        let rows: Vec<&str> = text.lines().skip(4).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].split_whitespace().collect::<Vec<_>>(), ["0", "X", "-", "-"]);
        assert_eq!(rows[1].split_whitespace().collect::<Vec<_>>(), ["1", "-", "-", "O"]);
        // Second row is indented further than the first
        assert!(rows[1].find('-').unwrap() > rows[0].find('X').unwrap());
    }
}
