//! Gradient editing session.
//!
//! Every edit keeps the stops sorted, leaves the outer stops pinned at 0 and
//! 1, and re-derives the four channel curves for the observer.

use super::bridge::{ChannelCurves, gradient_to_bezier_curves};
use super::model::{GradientError, GradientModel, GradientStop, StopColor};

/// Receives the gradient and its derived channel curves after every edit.
pub trait GradientObserver {
    fn gradient_changed(&mut self, gradient: &GradientModel, curves: &ChannelCurves);
}

/// An editing session over one gradient.
pub struct GradientEditorSession {
    gradient: GradientModel,
    revision: u64,
    observer: Option<Box<dyn GradientObserver>>,
}

impl GradientEditorSession {
    pub fn new(gradient: GradientModel) -> Self {
        Self {
            gradient,
            revision: 0,
            observer: None,
        }
    }

    pub fn with_observer(mut self, observer: Box<dyn GradientObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn gradient(&self) -> &GradientModel {
        &self.gradient
    }

    pub fn into_gradient(self) -> GradientModel {
        self.gradient
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Channel curves for the current stops.
    pub fn curves(&self) -> Result<ChannelCurves, GradientError> {
        gradient_to_bezier_curves(self.gradient.stops())
    }

    /// Preview strip of `width` colors.
    pub fn preview(&self, width: usize) -> Vec<StopColor> {
        self.gradient.preview(width)
    }

    /// Insert a stop at `position` with the color currently shown there.
    /// Returns the new stop's index.
    pub fn add_stop(&mut self, position: f32) -> Result<usize, GradientError> {
        let position = position.clamp(0.0, 1.0);
        let color = self.gradient.sample(position);
        let stops = self.gradient.stops_mut();
        // Never in front of the first stop or behind the last one.
        let index = stops
            .partition_point(|s| s.position <= position)
            .clamp(1, stops.len() - 1);
        stops.insert(index, GradientStop::new(position, color));
        self.commit()?;
        Ok(index)
    }

    /// Move an interior stop. Returns its index after re-sorting.
    pub fn move_stop(&mut self, index: usize, position: f32) -> Result<usize, GradientError> {
        self.check_interior(index)?;
        let position = position.clamp(0.0, 1.0);
        let stops = self.gradient.stops_mut();
        let mut stop = stops.remove(index);
        stop.position = position;
        let target = stops
            .partition_point(|s| s.position <= position)
            .clamp(1, stops.len() - 1);
        stops.insert(target, stop);
        self.commit()?;
        Ok(target)
    }

    /// Delete an interior stop.
    pub fn remove_stop(&mut self, index: usize) -> Result<(), GradientError> {
        self.check_interior(index)?;
        self.gradient.stops_mut().remove(index);
        self.commit()
    }

    /// Replace a stop's color. Outer stops may be recolored.
    pub fn set_color(&mut self, index: usize, color: StopColor) -> Result<(), GradientError> {
        let len = self.gradient.len();
        let Some(stop) = self.gradient.stops_mut().get_mut(index) else {
            return Err(GradientError::StopIndexOutOfRange { index, len });
        };
        stop.color = color.clamped();
        self.commit()
    }

    /// Replace the whole gradient, e.g. from a preset or a reloaded document.
    pub fn replace(&mut self, gradient: GradientModel) -> Result<(), GradientError> {
        self.gradient = gradient;
        self.commit()
    }

    fn check_interior(&self, index: usize) -> Result<(), GradientError> {
        let len = self.gradient.len();
        if index >= len {
            return Err(GradientError::StopIndexOutOfRange { index, len });
        }
        if index == 0 || index == len - 1 {
            tracing::debug!("gradient stop {index} is pinned");
            return Err(GradientError::PinnedStop { index });
        }
        Ok(())
    }

    fn commit(&mut self) -> Result<(), GradientError> {
        self.revision = self.revision.wrapping_add(1);
        if let Some(observer) = self.observer.as_mut() {
            let curves = gradient_to_bezier_curves(self.gradient.stops())?;
            observer.gradient_changed(&self.gradient, &curves);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gradient::model::Channel;
    use std::cell::RefCell;
    use std::rc::Rc;

    const EPSILON: f32 = 1e-4;

    struct Recorder(Rc<RefCell<Vec<ChannelCurves>>>);

    impl GradientObserver for Recorder {
        fn gradient_changed(&mut self, _gradient: &GradientModel, curves: &ChannelCurves) {
            self.0.borrow_mut().push(curves.clone());
        }
    }

    fn positions(session: &GradientEditorSession) -> Vec<f32> {
        session.gradient().stops().iter().map(|s| s.position).collect()
    }

    #[test]
    fn test_add_stop_interpolates_color() {
        let mut session = GradientEditorSession::new(GradientModel::white_to_transparent());
        let index = session.add_stop(0.25).expect("valid");
        assert_eq!(index, 1);
        let stop = session.gradient().stops()[1];
        assert!((stop.color.a - 191.25).abs() < EPSILON);
        assert!((stop.color.r - 255.0).abs() < EPSILON);
        assert_eq!(positions(&session), vec![0.0, 0.25, 1.0]);
    }

    #[test]
    fn test_add_stop_at_the_ends_stays_inside() {
        let mut session = GradientEditorSession::new(GradientModel::white_to_transparent());
        assert_eq!(session.add_stop(0.0).expect("valid"), 1);
        assert_eq!(session.add_stop(1.0).expect("valid"), 2);
        let stops = session.gradient().stops();
        assert_eq!(stops.first().map(|s| s.position), Some(0.0));
        assert_eq!(stops.last().map(|s| s.color), Some(StopColor::TRANSPARENT_WHITE));
    }

    #[test]
    fn test_move_stop_resorts() {
        let mut session = GradientEditorSession::new(GradientModel::white_to_transparent());
        session.add_stop(0.2).expect("valid");
        session.add_stop(0.6).expect("valid");
        let new_index = session.move_stop(1, 0.8).expect("interior");
        assert_eq!(new_index, 2);
        assert_eq!(positions(&session), vec![0.0, 0.6, 0.8, 1.0]);
    }

    #[test]
    fn test_outer_stops_are_pinned() {
        let mut session = GradientEditorSession::new(GradientModel::white_to_transparent());
        assert_eq!(
            session.move_stop(0, 0.5),
            Err(GradientError::PinnedStop { index: 0 })
        );
        assert_eq!(
            session.remove_stop(1),
            Err(GradientError::PinnedStop { index: 1 })
        );
        assert_eq!(
            session.remove_stop(5),
            Err(GradientError::StopIndexOutOfRange { index: 5, len: 2 })
        );
        assert_eq!(session.revision(), 0);
    }

    #[test]
    fn test_remove_interior_stop() {
        let mut session = GradientEditorSession::new(GradientModel::white_to_transparent());
        session.add_stop(0.5).expect("valid");
        session.remove_stop(1).expect("interior");
        assert_eq!(positions(&session), vec![0.0, 1.0]);
    }

    #[test]
    fn test_set_color_notifies_with_curves() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut session = GradientEditorSession::new(GradientModel::white_to_transparent())
            .with_observer(Box::new(Recorder(log.clone())));
        session
            .set_color(0, StopColor::new(0.0, 51.0, 255.0, 255.0))
            .expect("valid");
        let log = log.borrow();
        assert_eq!(log.len(), 1);
        let g = log[0].get(Channel::G).value_at(0.0);
        assert!((g - 0.2).abs() < EPSILON);
    }
}
