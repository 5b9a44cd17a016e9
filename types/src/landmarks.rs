//! Eye landmarks and per-tick detection results.

use serde::{Deserialize, Serialize};

/// A 2-D point in frame pixel coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// The four eye landmarks a detector must report for a present face.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EyeLandmarks {
    pub left_eye_top: Point,
    pub left_eye_bottom: Point,
    pub right_eye_top: Point,
    pub right_eye_bottom: Point,
}

impl EyeLandmarks {
    /// Landmarks whose left and right eyes are both open by `opening` pixels,
    /// with the upper lids on `top_y`.
    pub fn with_opening(top_y: f32, opening: f32) -> Self {
        Self {
            left_eye_top: Point::new(100.0, top_y),
            left_eye_bottom: Point::new(100.0, top_y + opening),
            right_eye_top: Point::new(160.0, top_y),
            right_eye_bottom: Point::new(160.0, top_y + opening),
        }
    }

    /// Vertical gap between the upper and lower left-eye landmarks.
    ///
    /// Only the left eye is measured; the right-eye pair is carried for
    /// detectors and callers that want a different proxy.
    pub fn eye_opening(&self) -> f32 {
        (self.left_eye_bottom.y - self.left_eye_top.y).abs()
    }
}

/// Outcome of a single detection call.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum DetectionResult {
    /// A single face was found.
    Present(EyeLandmarks),
    /// No face in the current frame.
    Absent,
}

impl DetectionResult {
    /// Eye-opening distance when a face is present.
    pub fn eye_opening(&self) -> Option<f32> {
        match self {
            DetectionResult::Present(landmarks) => Some(landmarks.eye_opening()),
            DetectionResult::Absent => None,
        }
    }
}

impl From<Option<EyeLandmarks>> for DetectionResult {
    fn from(value: Option<EyeLandmarks>) -> Self {
        match value {
            Some(landmarks) => DetectionResult::Present(landmarks),
            None => DetectionResult::Absent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eye_opening_uses_left_eye_gap() {
        let mut lm = EyeLandmarks::with_opening(40.0, 10.0);
        lm.right_eye_bottom.y = 80.0;
        assert_eq!(lm.eye_opening(), 10.0);
    }

    #[test]
    fn eye_opening_is_orientation_independent() {
        let mut lm = EyeLandmarks::with_opening(40.0, 10.0);
        std::mem::swap(&mut lm.left_eye_top, &mut lm.left_eye_bottom);
        assert_eq!(lm.eye_opening(), 10.0);
    }

    #[test]
    fn detection_result_from_option() {
        let lm = EyeLandmarks::with_opening(0.0, 4.0);
        assert_eq!(DetectionResult::from(Some(lm)).eye_opening(), Some(4.0));
        assert_eq!(DetectionResult::from(None), DetectionResult::Absent);
        assert_eq!(DetectionResult::Absent.eye_opening(), None);
    }
}
