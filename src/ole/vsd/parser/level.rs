//! Shape boundaries derived from chunk levels.
//!
//! The drawing stream has no explicit end-of-shape marker. A shape ends when
//! a record at its own level or shallower arrives, when another shape opens,
//! or when the stream runs out. The transitions live here as plain functions
//! over a small state value so they can be tested without any I/O.

/// Level bookkeeping of a stream walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LevelState {
    /// Level of the last record seen
    pub current_level: u32,
    /// Level of the shape being assembled, if any
    pub shape_level: Option<u32>,
}

/// What the walker has to do after a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelAction {
    None,
    /// Hand the shape opened at `level` to the collector and start afresh
    FlushShape { level: u32 },
}

impl LevelState {
    /// A record at `new_level` arrived.
    pub fn change_level(self, new_level: u32) -> (Self, LevelAction) {
        if new_level == self.current_level {
            return (self, LevelAction::None);
        }
        match self.shape_level {
            Some(level) if new_level <= level => (
                Self {
                    current_level: new_level,
                    shape_level: None,
                },
                LevelAction::FlushShape { level },
            ),
            _ => (
                Self {
                    current_level: new_level,
                    ..self
                },
                LevelAction::None,
            ),
        }
    }

    /// A shape record at `level` opens a new shape.
    pub fn open_shape(self, level: u32) -> (Self, LevelAction) {
        let action = match self.shape_level {
            Some(previous) => LevelAction::FlushShape { level: previous },
            None => LevelAction::None,
        };
        (
            Self {
                current_level: level,
                shape_level: Some(level),
            },
            action,
        )
    }

    /// The stream ended; whatever is open gets flushed.
    pub fn finish(self) -> (Self, LevelAction) {
        let action = match self.shape_level {
            Some(level) => LevelAction::FlushShape { level },
            None => LevelAction::None,
        };
        (Self::default(), action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drive(state: &mut LevelState, level: u32) -> LevelAction {
        let (next, action) = state.change_level(level);
        *state = next;
        action
    }

    #[test]
    fn test_same_level_is_noop() {
        let state = LevelState {
            current_level: 3,
            shape_level: Some(2),
        };
        assert_eq!(state.change_level(3), (state, LevelAction::None));
    }

    #[test]
    fn test_nested_records_keep_shape_open() {
        let (mut state, action) = LevelState::default().open_shape(2);
        assert_eq!(action, LevelAction::None);
        assert_eq!(drive(&mut state, 3), LevelAction::None);
        assert_eq!(drive(&mut state, 4), LevelAction::None);
        assert_eq!(drive(&mut state, 3), LevelAction::None);
        assert_eq!(state.shape_level, Some(2));
    }

    #[test]
    fn test_shallower_record_flushes() {
        let (mut state, _) = LevelState::default().open_shape(2);
        drive(&mut state, 3);
        assert_eq!(drive(&mut state, 1), LevelAction::FlushShape { level: 2 });
        assert_eq!(state.shape_level, None);
        assert_eq!(state.current_level, 1);
        // nothing left to flush
        assert_eq!(drive(&mut state, 0), LevelAction::None);
    }

    #[test]
    fn test_sibling_shape_flushes_exactly_once() {
        // shape at 2, children at 3, next shape at 2
        let mut state = LevelState::default();
        let mut flushes = 0;
        for (level, opens_shape) in [(2, true), (3, false), (3, false), (2, true), (3, false)] {
            if let LevelAction::FlushShape { .. } = drive(&mut state, level) {
                flushes += 1;
            }
            if opens_shape {
                let (next, action) = state.open_shape(level);
                state = next;
                if let LevelAction::FlushShape { .. } = action {
                    flushes += 1;
                }
            }
        }
        assert_eq!(flushes, 1);
        assert_eq!(state.shape_level, Some(2));
    }

    #[test]
    fn test_open_shape_without_level_change_flushes_previous() {
        let (state, _) = LevelState::default().open_shape(2);
        let (state, action) = state.open_shape(2);
        assert_eq!(action, LevelAction::FlushShape { level: 2 });
        assert_eq!(state.shape_level, Some(2));
    }

    #[test]
    fn test_finish() {
        let (state, _) = LevelState::default().open_shape(5);
        assert_eq!(state.finish(), (LevelState::default(), LevelAction::FlushShape { level: 5 }));
        assert_eq!(LevelState::default().finish().1, LevelAction::None);
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(100))]

            #[test]
            fn prop_flush_only_at_or_above_shape_level(
                shape_level in 0u32..6,
                levels in prop::collection::vec(0u32..8, 0..40)
            ) {
                let (mut state, _) = LevelState::default().open_shape(shape_level);
                let mut open = true;
                for level in levels {
                    let (next, action) = state.change_level(level);
                    match action {
                        LevelAction::FlushShape { level: flushed } => {
                            prop_assert!(open);
                            prop_assert_eq!(flushed, shape_level);
                            prop_assert!(level <= shape_level);
                            open = false;
                        },
                        LevelAction::None => {},
                    }
                    state = next;
                    prop_assert_eq!(state.shape_level.is_some(), open);
                }
            }
        }
    }
}
