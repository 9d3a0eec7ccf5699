use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};

use crate::game::Direction;

/// Minimum drag length, in terminal cells, before a drag counts as a swipe.
pub const MIN_SWIPE_DISTANCE: i32 = 2;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Action {
    Move(Direction),
    Undo,
    Restart,
    KeepPlaying,
    Quit,
}

pub fn action_for_key(code: KeyCode) -> Option<Action> {
    let action = match code {
        KeyCode::Esc => Action::Quit,
        KeyCode::Left => Action::Move(Direction::Left),
        KeyCode::Right => Action::Move(Direction::Right),
        KeyCode::Up => Action::Move(Direction::Up),
        KeyCode::Down => Action::Move(Direction::Down),
        KeyCode::Char(c) => match c.to_ascii_lowercase() {
            'a' | 'h' => Action::Move(Direction::Left),
            'd' | 'l' => Action::Move(Direction::Right),
            'w' | 'k' => Action::Move(Direction::Up),
            's' | 'j' => Action::Move(Direction::Down),
            'u' => Action::Undo,
            'n' | 'r' => Action::Restart,
            'c' => Action::KeepPlaying,
            'q' => Action::Quit,
            _ => return None,
        },
        _ => return None,
    };
    Some(action)
}

/// Key releases and repeats are ignored so one press is one move.
pub fn action_for_key_event(event: KeyEvent) -> Option<Action> {
    if event.kind != KeyEventKind::Press {
        return None;
    }
    action_for_key(event.code)
}

/// Turns a drag from `start` to `end` (column, row) into a direction.
///
/// The dominant axis wins; a drag no longer than `min_distance` on that axis
/// is ignored.
pub fn swipe_direction(start: (u16, u16), end: (u16, u16), min_distance: i32) -> Option<Direction> {
    let dx = end.0 as i32 - start.0 as i32;
    let dy = end.1 as i32 - start.1 as i32;

    if dx.abs() > dy.abs() && dx.abs() > min_distance {
        Some(if dx > 0 {
            Direction::Right
        } else {
            Direction::Left
        })
    } else if dy.abs() > min_distance {
        Some(if dy > 0 { Direction::Down } else { Direction::Up })
    } else {
        None
    }
}

/// Tracks a mouse drag between press and release.
#[derive(Default, Debug)]
pub struct DragTracker {
    start: Option<(u16, u16)>,
}

impl DragTracker {
    pub fn press(&mut self, column: u16, row: u16) {
        self.start = Some((column, row));
    }

    pub fn release(&mut self, column: u16, row: u16) -> Option<Direction> {
        let start = self.start.take()?;
        swipe_direction(start, (column, row), MIN_SWIPE_DISTANCE)
    }
}
