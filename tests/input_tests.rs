//! Tests for key and drag decoding

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use twenty48::game::Direction;
use twenty48::input::{
    action_for_key, action_for_key_event, swipe_direction, Action, DragTracker, MIN_SWIPE_DISTANCE,
};

// ============================================================================
// Key Tests
// ============================================================================

mod keys {
    use super::*;

    #[test]
    fn arrows_move() {
        assert_eq!(action_for_key(KeyCode::Left), Some(Action::Move(Direction::Left)));
        assert_eq!(action_for_key(KeyCode::Right), Some(Action::Move(Direction::Right)));
        assert_eq!(action_for_key(KeyCode::Up), Some(Action::Move(Direction::Up)));
        assert_eq!(action_for_key(KeyCode::Down), Some(Action::Move(Direction::Down)));
    }

    #[test]
    fn letter_keys_ignore_case() {
        for (keys, direction) in [
            (['a', 'A', 'h', 'H'], Direction::Left),
            (['d', 'D', 'l', 'L'], Direction::Right),
            (['w', 'W', 'k', 'K'], Direction::Up),
            (['s', 'S', 'j', 'J'], Direction::Down),
        ] {
            for key in keys {
                assert_eq!(
                    action_for_key(KeyCode::Char(key)),
                    Some(Action::Move(direction)),
                    "key {:?}",
                    key
                );
            }
        }
    }

    #[test]
    fn command_keys() {
        assert_eq!(action_for_key(KeyCode::Char('u')), Some(Action::Undo));
        assert_eq!(action_for_key(KeyCode::Char('n')), Some(Action::Restart));
        assert_eq!(action_for_key(KeyCode::Char('R')), Some(Action::Restart));
        assert_eq!(action_for_key(KeyCode::Char('c')), Some(Action::KeepPlaying));
        assert_eq!(action_for_key(KeyCode::Char('q')), Some(Action::Quit));
        assert_eq!(action_for_key(KeyCode::Esc), Some(Action::Quit));
    }

    #[test]
    fn unbound_keys_do_nothing() {
        assert_eq!(action_for_key(KeyCode::Char('x')), None);
        assert_eq!(action_for_key(KeyCode::Enter), None);
        assert_eq!(action_for_key(KeyCode::Tab), None);
    }

    #[test]
    fn only_presses_count() {
        let press = KeyEvent::new(KeyCode::Left, KeyModifiers::NONE);
        assert_eq!(action_for_key_event(press), Some(Action::Move(Direction::Left)));

        let release = KeyEvent::new_with_kind(KeyCode::Left, KeyModifiers::NONE, KeyEventKind::Release);
        assert_eq!(action_for_key_event(release), None);

        let repeat = KeyEvent::new_with_kind(KeyCode::Left, KeyModifiers::NONE, KeyEventKind::Repeat);
        assert_eq!(action_for_key_event(repeat), None);
    }
}

// ============================================================================
// Swipe Tests
// ============================================================================

mod swipes {
    use super::*;

    #[test]
    fn dominant_axis_wins() {
        assert_eq!(swipe_direction((10, 10), (15, 11), 2), Some(Direction::Right));
        assert_eq!(swipe_direction((10, 10), (4, 12), 2), Some(Direction::Left));
        assert_eq!(swipe_direction((10, 10), (11, 4), 2), Some(Direction::Up));
        assert_eq!(swipe_direction((10, 10), (9, 16), 2), Some(Direction::Down));
    }

    #[test]
    fn short_drags_are_ignored() {
        assert_eq!(swipe_direction((10, 10), (12, 10), 2), None);
        assert_eq!(swipe_direction((10, 10), (10, 8), 2), None);
        assert_eq!(swipe_direction((10, 10), (10, 10), 2), None);
    }

    #[test]
    fn diagonal_tie_goes_vertical() {
        assert_eq!(swipe_direction((10, 10), (13, 13), 2), Some(Direction::Down));
        assert_eq!(swipe_direction((10, 10), (7, 7), 2), Some(Direction::Up));
    }

    #[test]
    fn drag_tracker_needs_a_press() {
        let mut drag = DragTracker::default();
        assert_eq!(drag.release(20, 5), None);

        drag.press(5, 5);
        assert_eq!(
            drag.release(5 + MIN_SWIPE_DISTANCE as u16 + 1, 5),
            Some(Direction::Right)
        );
        // the press is consumed by the release
        assert_eq!(drag.release(30, 5), None);
    }
}
