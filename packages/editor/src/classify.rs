//! # Classification State Machine
//!
//! Two transition tables keyed only on the type of the block holding the
//! caret. No history, no look-ahead.
//!
//! ## Break (Enter)
//!
//! A new block is inserted after the current one and tagged `next_on_break`:
//!
//! | current        | new block      |
//! |----------------|----------------|
//! | scene-heading  | character      |
//! | character      | dialogue       |
//! | parenthetical  | dialogue       |
//! | dialogue       | character      |
//! | transition     | scene-heading  |
//! | anything else  | action         |
//!
//! ## Cycle (Tab)
//!
//! The current block is re-tagged in place:
//!
//! | current        | becomes        |
//! |----------------|----------------|
//! | action         | character      |
//! | character      | transition     |
//! | transition     | action         |
//! | dialogue       | parenthetical  |
//! | parenthetical  | dialogue       |
//! | anything else  | unchanged      |
//!
//! Scene headings and legacy tags are fixed points of the cycle while still
//! having a break successor. That asymmetry is intentional and kept.

use crate::document::ElementType;

/// Type assigned to the block created by a paragraph break
pub fn next_on_break(current: &ElementType) -> ElementType {
    match current {
        ElementType::SceneHeading => ElementType::Character,
        ElementType::Character => ElementType::Dialogue,
        ElementType::Parenthetical => ElementType::Dialogue,
        ElementType::Dialogue => ElementType::Character,
        ElementType::Transition => ElementType::SceneHeading,
        ElementType::Action | ElementType::Legacy(_) => ElementType::Action,
    }
}

/// Type the current block takes on an explicit cycle command
pub fn cycle(current: &ElementType) -> ElementType {
    match current {
        ElementType::Action => ElementType::Character,
        ElementType::Character => ElementType::Transition,
        ElementType::Transition => ElementType::Action,
        ElementType::Dialogue => ElementType::Parenthetical,
        ElementType::Parenthetical => ElementType::Dialogue,
        ElementType::SceneHeading | ElementType::Legacy(_) => current.clone(),
    }
}

/// Whether cycling leaves this type unchanged
pub fn is_cycle_fixed_point(current: &ElementType) -> bool {
    cycle(current) == *current
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_break_table() {
        let cases = [
            (ElementType::SceneHeading, ElementType::Character),
            (ElementType::Character, ElementType::Dialogue),
            (ElementType::Parenthetical, ElementType::Dialogue),
            (ElementType::Dialogue, ElementType::Character),
            (ElementType::Transition, ElementType::SceneHeading),
            (ElementType::Action, ElementType::Action),
        ];

        for (current, expected) in cases {
            assert_eq!(next_on_break(&current), expected, "break from {}", current);
        }
    }

    #[test]
    fn test_break_from_legacy_is_action() {
        for tag in ["paragraph", "slugline", "shot"] {
            assert_eq!(next_on_break(&ElementType::from(tag)), ElementType::Action);
        }
    }

    #[test]
    fn test_cycle_table() {
        let cases = [
            (ElementType::Action, ElementType::Character),
            (ElementType::Character, ElementType::Transition),
            (ElementType::Transition, ElementType::Action),
            (ElementType::Dialogue, ElementType::Parenthetical),
            (ElementType::Parenthetical, ElementType::Dialogue),
        ];

        for (current, expected) in cases {
            assert_eq!(cycle(&current), expected, "cycle from {}", current);
            assert!(!is_cycle_fixed_point(&current));
        }
    }

    #[test]
    fn test_cycle_fixed_points() {
        assert!(is_cycle_fixed_point(&ElementType::SceneHeading));
        assert!(is_cycle_fixed_point(&ElementType::from("paragraph")));
        assert_eq!(
            cycle(&ElementType::from("slugline")),
            ElementType::Legacy("slugline".to_string())
        );
    }

    #[test]
    fn test_action_character_transition_loop() {
        let mut current = ElementType::Action;
        for _ in 0..3 {
            current = cycle(&current);
        }
        assert_eq!(current, ElementType::Action);
    }
}
