//! Pointer drag tracking for resize handles
//!
//! Data flows: pointer events (client coordinates) → DragGesture →
//! handle-relative callbacks on a [`DragTarget`]

/// Receives a drag as coordinates relative to the dragged element's
/// top-left corner.
pub trait DragTarget {
    fn on_drag_start(&mut self, x: f32, y: f32);
    fn on_drag(&mut self, x: f32, y: f32);
    fn on_drag_end(&mut self);
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    fn relative_to(self, origin: Point) -> Point {
        Point::new(self.x - origin.x, self.y - origin.y)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
enum DragPhase {
    #[default]
    Idle,
    /// Pointer is down but has not moved yet.
    Pressed { press_position: Point },
    Dragging,
}

/// Turns a press / move / release sequence into drag callbacks.
///
/// The start callback is deferred to the first move so a plain click on the
/// handle never counts as a drag. The element origin is passed with every
/// event because the handle itself moves while it is being dragged.
#[derive(Clone, Copy, Debug, Default)]
pub struct DragGesture {
    phase: DragPhase,
}

impl DragGesture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dragging(&self) -> bool {
        self.phase == DragPhase::Dragging
    }

    pub fn pointer_down(&mut self, element_origin: Point, client: Point) {
        self.phase = DragPhase::Pressed {
            press_position: client.relative_to(element_origin),
        };
    }

    pub fn pointer_move(&mut self, target: &mut impl DragTarget, element_origin: Point, client: Point) {
        match self.phase {
            DragPhase::Idle => return,
            DragPhase::Pressed { press_position } => {
                target.on_drag_start(press_position.x, press_position.y);
                self.phase = DragPhase::Dragging;
            }
            DragPhase::Dragging => {}
        }
        let position = client.relative_to(element_origin);
        target.on_drag(position.x, position.y);
    }

    pub fn pointer_up(&mut self, target: &mut impl DragTarget) {
        if self.phase == DragPhase::Dragging {
            target.on_drag_end();
        }
        self.phase = DragPhase::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        events: Vec<String>,
    }

    impl DragTarget for Recorder {
        fn on_drag_start(&mut self, x: f32, y: f32) {
            self.events.push(format!("start {x} {y}"));
        }

        fn on_drag(&mut self, x: f32, y: f32) {
            self.events.push(format!("drag {x} {y}"));
        }

        fn on_drag_end(&mut self) {
            self.events.push("end".to_string());
        }
    }

    #[test]
    fn coordinates_are_relative_to_current_element_origin() {
        let mut gesture = DragGesture::new();
        let mut recorder = Recorder::default();

        gesture.pointer_down(Point::new(0.0, 500.0), Point::new(10.0, 514.0));
        gesture.pointer_move(&mut recorder, Point::new(0.0, 500.0), Point::new(12.0, 480.0));
        // Handle moved up after the first resize
        gesture.pointer_move(&mut recorder, Point::new(0.0, 466.0), Point::new(12.0, 470.0));
        gesture.pointer_up(&mut recorder);

        assert_eq!(
            recorder.events,
            vec!["start 10 14", "drag 12 -20", "drag 12 4", "end"]
        );
        assert!(!gesture.is_dragging());
    }

    #[test]
    fn click_without_move_is_not_a_drag() {
        let mut gesture = DragGesture::new();
        let mut recorder = Recorder::default();

        gesture.pointer_down(Point::default(), Point::new(5.0, 5.0));
        gesture.pointer_up(&mut recorder);
        gesture.pointer_move(&mut recorder, Point::default(), Point::new(6.0, 6.0));

        assert!(recorder.events.is_empty());
    }
}
