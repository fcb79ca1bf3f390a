//! Human player reading moves from a terminal

use std::io::{BufRead, Write};

use hexzero_core::{Agent, Board, HexError, Player, Result};

/// Reads `row,col` lines until a free cell is named
pub struct HumanAgent<R, W> {
    input: R,
    output: W,
    player: Option<Player>,
}

impl<R: BufRead, W: Write> HumanAgent<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            input,
            output,
            player: None,
        }
    }
}

impl<R: BufRead, W: Write> Agent for HumanAgent<R, W> {
    fn set_player(&mut self, player: Player) {
        self.player = Some(player);
    }

    fn get_action(&mut self, board: &Board, _temperature: f32) -> Result<usize> {
        loop {
            write!(self.output, "Your move: ")?;
            self.output.flush()?;

            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                return Err(HexError::Agent("input closed".to_string()));
            }

            match parse_location(&line).and_then(|loc| board.location_to_move_slice(&loc)) {
                Some(mv) if board.is_available(mv) => return Ok(mv),
                _ => writeln!(self.output, "invalid move")?,
            }
        }
    }

    fn name(&self) -> &str {
        "human"
    }
}

/// `"3,4"` -> `[3, 4]`; anything that is not a list of integers is rejected
fn parse_location(line: &str) -> Option<Vec<isize>> {
    line.trim()
        .split(',')
        .map(|part| part.trim().parse::<isize>().ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn human(input: &str) -> HumanAgent<Cursor<Vec<u8>>, Vec<u8>> {
        HumanAgent::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    #[test]
    fn test_parse_location() {
        assert_eq!(parse_location("2,3\n"), Some(vec![2, 3]));
        assert_eq!(parse_location(" 0 , 10 "), Some(vec![0, 10]));
        assert_eq!(parse_location("a,b"), None);
        assert_eq!(parse_location("4"), Some(vec![4]));
    }

    #[test]
    fn test_human_reads_row_col() {
        let board = Board::new(5, 5).unwrap();
        let mut agent = human("1,2\n");
        assert_eq!(agent.get_action(&board, 1.0).unwrap(), 7);
    }

    #[test]
    fn test_human_reprompts_on_bad_input() {
        let mut board = Board::new(3, 3).unwrap();
        board.do_move(0).unwrap();
        // Garbage, wrong arity, occupied, out of range, then valid
        let mut agent = human("x\n1\n0,0\n9,9\n2,2\n");

        assert_eq!(agent.get_action(&board, 1.0).unwrap(), 8);
        let shown = String::from_utf8(agent.output.clone()).unwrap();
        assert_eq!(shown.matches("invalid move").count(), 4);
    }

    #[test]
    fn test_human_input_closed() {
        let board = Board::new(3, 3).unwrap();
        let mut agent = human("");
        assert!(matches!(agent.get_action(&board, 1.0), Err(HexError::Agent(_))));
    }
}
