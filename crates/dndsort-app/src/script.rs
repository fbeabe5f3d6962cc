//! Scripted pointer gestures.

use dndsort_core::PointerInput;
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// One step of a scripted gesture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum Step {
    /// Press on the item currently rendered at `index`.
    Grab { index: usize, at: Point },
    /// Move the pointer.
    MoveTo { at: Point },
    /// Let the clock run, delivering due timers and frames.
    Wait { ms: u64 },
    /// Lift the pointer.
    Release { at: Point },
}

/// A gesture replayed against the demo list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DragScript {
    /// Replay as touch input instead of mouse input.
    #[serde(default)]
    pub touch: bool,
    pub steps: Vec<Step>,
}

impl DragScript {
    /// Drag the first item of a default column down until it lands in
    /// slot 3, pausing one collision interval between moves.
    pub fn drag_first_down() -> Self {
        let x = 175.0;
        let mut steps = vec![Step::Grab {
            index: 0,
            at: Point::new(x, 29.0),
        }];
        for y in [69.0, 149.0, 229.0] {
            steps.push(Step::MoveTo { at: Point::new(x, y) });
            steps.push(Step::Wait { ms: 150 });
        }
        steps.push(Step::Release {
            at: Point::new(x, 229.0),
        });
        Self {
            touch: false,
            steps,
        }
    }

    /// Pointer input for a position, in this script's modality.
    pub fn input(&self, at: Point) -> PointerInput {
        if self.touch {
            PointerInput::touch(at.x, at.y)
        } else {
            PointerInput::mouse(at.x, at.y)
        }
    }

    /// Input for lifting the pointer.
    pub fn release_input(&self, at: Point) -> PointerInput {
        if self.touch {
            PointerInput::touch_lifted()
        } else {
            PointerInput::mouse(at.x, at.y)
        }
    }
}

impl Default for DragScript {
    fn default() -> Self {
        Self::drag_first_down()
    }
}
