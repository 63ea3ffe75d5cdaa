//! Tests for board addressing: wire indices and screen coordinates.

use tictactoe_webapp::{Board, Move, Position, Side};

#[test]
fn test_position_to_index() {
    assert_eq!(Position::TopLeft.to_index(), 0);
    assert_eq!(Position::Center.to_index(), 4);
    assert_eq!(Position::BottomRight.to_index(), 8);
}

#[test]
fn test_position_from_index() {
    assert_eq!(Position::from_index(0), Some(Position::TopLeft));
    assert_eq!(Position::from_index(4), Some(Position::Center));
    assert_eq!(Position::from_index(8), Some(Position::BottomRight));
    assert_eq!(Position::from_index(9), None);
}

#[test]
fn test_coords_are_row_major() {
    assert_eq!(Position::from_coords(2, 1), Some(Position::MiddleRight));
    assert_eq!(Position::from_coords(0, 2), Some(Position::BottomLeft));
    assert_eq!(Position::from_coords(3, 0), None);
    for pos in Position::ALL {
        let (x, y) = pos.coords();
        assert_eq!(x + y * 3, pos.to_index());
    }
}

#[test]
fn test_out_of_range_wire_index_is_rejected() {
    let json = r#"{"gameId":"7","moveIndex":0,"movePosition":9,"player":"guest"}"#;
    assert!(serde_json::from_str::<Move>(json).is_err());
}

#[test]
fn test_board_lookup_by_coords() {
    let mut board = Board::new();
    board.set(Position::TopRight, tictactoe_board::Cell::Occupied(Side::Defender));
    assert_eq!(
        board.at(2, 0),
        Some(tictactoe_board::Cell::Occupied(Side::Defender))
    );
    assert_eq!(board.at(0, 3), None);
    assert!(board.is_empty(Position::Center));
}
