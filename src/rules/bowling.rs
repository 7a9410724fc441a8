//! Bowling frame scoring.
//!
//! Frames are never stored as the source of truth: they are rebuilt from
//! the ordered list of rolls, which in turn comes from the shot log. That
//! makes undoing a roll a matter of dropping it and rebuilding.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Frames in a game.
pub const FRAMES: usize = 10;

/// Pins (balls) racked per frame.
pub const PINS: u8 = 10;

/// One bowlard frame.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BowlingFrame {
    /// Pins knocked down by each roll.
    pub rolls: SmallVec<[u8; 3]>,

    /// Cumulative score through this frame, once its bonus rolls are known.
    pub score: Option<i64>,

    /// No further rolls belong to this frame.
    pub is_complete: bool,
}

impl BowlingFrame {
    #[must_use]
    pub fn is_strike(&self) -> bool {
        self.rolls.first() == Some(&PINS)
    }

    #[must_use]
    pub fn is_spare(&self) -> bool {
        !self.is_strike() && self.rolls.len() >= 2 && self.rolls[0] + self.rolls[1] == PINS
    }
}

/// Rebuild frames from rolls.
///
/// Rolls beyond the tenth frame are ignored.
#[must_use]
pub fn build_frames(rolls: &[u8]) -> Vec<BowlingFrame> {
    let mut frames: Vec<BowlingFrame> = Vec::with_capacity(FRAMES);
    let mut i = 0;

    while i < rolls.len() && frames.len() < FRAMES {
        let last_frame = frames.len() + 1 == FRAMES;
        let mut frame = BowlingFrame::default();

        if last_frame {
            let end = (i + 3).min(rolls.len());
            frame.rolls.extend_from_slice(&rolls[i..end]);
            frame.is_complete = match frame.rolls.as_slice() {
                [a, b, ..] if *a == PINS || a + b == PINS => frame.rolls.len() == 3,
                [_, _] => true,
                _ => false,
            };
            i = end;
        } else if rolls[i] == PINS {
            frame.rolls.push(PINS);
            frame.is_complete = true;
            i += 1;
        } else if i + 1 < rolls.len() {
            frame.rolls.extend_from_slice(&rolls[i..i + 2]);
            frame.is_complete = true;
            i += 2;
        } else {
            frame.rolls.push(rolls[i]);
            i += 1;
        }

        frames.push(frame);
    }

    score_frames(&mut frames, rolls);
    frames
}

fn score_frames(frames: &mut [BowlingFrame], rolls: &[u8]) {
    let mut running = 0i64;
    let mut roll_index = 0;
    let bonus = |from: usize, count: usize| -> Option<i64> {
        let slice = rolls.get(from..from + count)?;
        Some(slice.iter().map(|&p| i64::from(p)).sum())
    };

    for (n, frame) in frames.iter_mut().enumerate() {
        let pins: i64 = frame.rolls.iter().map(|&p| i64::from(p)).sum();
        let value = if !frame.is_complete {
            None
        } else if n + 1 == FRAMES {
            Some(pins)
        } else if frame.is_strike() {
            bonus(roll_index + 1, 2).map(|b| PINS as i64 + b)
        } else if frame.is_spare() {
            bonus(roll_index + 2, 1).map(|b| PINS as i64 + b)
        } else {
            Some(pins)
        };
        roll_index += frame.rolls.len();

        match value {
            Some(v) => {
                running += v;
                frame.score = Some(running);
            }
            // Later frames cannot have a cumulative score either.
            None => break,
        }
    }
}

/// Pins standing for the next roll.
#[must_use]
pub fn standing_pins(frames: &[BowlingFrame]) -> u8 {
    let Some(frame) = frames.last() else {
        return PINS;
    };
    if frame.is_complete {
        return if frames.len() >= FRAMES { 0 } else { PINS };
    }

    if frames.len() < FRAMES {
        return PINS - frame.rolls[0];
    }

    // Tenth frame: pins are reset after every strike or spare.
    match frame.rolls.as_slice() {
        [a] if *a == PINS => PINS,
        [a] => PINS - a,
        [a, b] if *a == PINS && *b == PINS => PINS,
        [a, b] if *a == PINS => PINS - b,
        [_, _] => PINS,
        _ => 0,
    }
}

/// Has the tenth frame been completed?
#[must_use]
pub fn is_finished(frames: &[BowlingFrame]) -> bool {
    frames.len() == FRAMES && frames[FRAMES - 1].is_complete
}

/// Number of completed frames.
#[must_use]
pub fn completed_frames(frames: &[BowlingFrame]) -> usize {
    frames.iter().filter(|f| f.is_complete).count()
}

/// Latest known cumulative score.
#[must_use]
pub fn total_score(frames: &[BowlingFrame]) -> i64 {
    frames.iter().filter_map(|f| f.score).last().unwrap_or(0)
}
