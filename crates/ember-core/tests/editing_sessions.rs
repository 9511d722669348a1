use std::cell::RefCell;
use std::f32::consts::PI;
use std::rc::Rc;

use ember_core::curve::model::PointRole;
use ember_core::schema::field::CurveField;
use ember_core::{
    ChannelCurves, Curve, CurveEditorConfig, CurveEditorSession, CurveObserver, CurvePreset,
    EffectDocument, GradientEditorSession, GradientModel, GradientObserver, LifetimeCurve,
    StopColor, bezier_curves_to_gradient, evaluate, is_current_schema,
};
use glam::Vec2;

const EPSILON: f32 = 1e-4;

struct CurveLog(Rc<RefCell<Vec<Curve>>>);

impl CurveObserver for CurveLog {
    fn curve_changed(&mut self, curve: &Curve) {
        self.0.borrow_mut().push(curve.clone());
    }
}

struct CurvesLog(Rc<RefCell<Vec<ChannelCurves>>>);

impl GradientObserver for CurvesLog {
    fn gradient_changed(&mut self, _gradient: &GradientModel, curves: &ChannelCurves) {
        self.0.borrow_mut().push(curves.clone());
    }
}

fn assert_endpoints_pinned(curve: &Curve) {
    let first = curve.first_anchor();
    let last = curve.last_anchor();
    assert_eq!((first.x, first.percentage), (0.0, Some(0.0)));
    assert_eq!((last.x, last.percentage), (1.0, Some(1.0)));
}

#[test]
fn test_handle_drag_keeps_mirror_invariant() {
    let config = CurveEditorConfig::default();
    let viewport = config.viewport;
    let mut session = CurveEditorSession::new(CurvePreset::EaseInOut.curve(), config);

    // Left handle of the middle anchor.
    let handle = 2;
    let Some(PointRole::Handle { anchor, .. }) = session.curve().role(handle) else {
        panic!("point 2 should be a handle");
    };
    let mirror = session.curve().sibling_handle(handle).expect("interior anchor");
    let anchor_pos = session.curve().points()[anchor].position();
    let mirror_distance = session.curve().points()[mirror].position().distance(anchor_pos);

    assert!(session.begin_drag(handle));
    assert_eq!(session.mirror_target(), Some(mirror));
    assert!(session.pointer_move(viewport.to_canvas(Vec2::new(0.3, 0.6))));
    session.pointer_release();
    assert_eq!(session.selection(), None);

    let moved = session.curve().points()[handle].position() - anchor_pos;
    let mirrored = session.curve().points()[mirror].position() - anchor_pos;
    let mut delta = (mirrored.to_angle() - moved.to_angle()).abs();
    if delta > PI {
        delta = 2.0 * PI - delta;
    }
    assert!((delta - PI).abs() < EPSILON, "angle delta {delta}");
    assert!((mirrored.length() - mirror_distance).abs() < EPSILON);
    assert_endpoints_pinned(session.curve());
}

#[test]
fn test_endpoint_drags_stay_pinned() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let config = CurveEditorConfig::default();
    let viewport = config.viewport;
    let mut session = CurveEditorSession::new(CurvePreset::Linear.curve(), config)
        .with_observer(Box::new(CurveLog(log.clone())));

    let last = session.curve().len() - 1;
    for (index, target) in [(0, Vec2::new(0.4, 0.7)), (last, Vec2::new(-2.0, 3.0))] {
        assert!(session.begin_drag(index));
        session.pointer_move(viewport.to_canvas(target));
        session.pointer_release();
        assert_endpoints_pinned(session.curve());
    }

    assert!((evaluate(session.curve(), 0.0) - 0.7).abs() < EPSILON);
    assert!((evaluate(session.curve(), 1.0) - 1.0).abs() < EPSILON);
    assert!(!log.borrow().is_empty());
    for curve in log.borrow().iter() {
        assert_endpoints_pinned(curve);
    }
}

#[test]
fn test_curve_edit_is_written_back_to_document() {
    let mut document = EffectDocument::default();
    let field = document
        .curve_field("sizeOverLifetime")
        .expect("decodes")
        .expect("default size curve");
    let mut session =
        CurveEditorSession::new(field.lifetime_curve.bezier_points, CurveEditorConfig::default());
    session.apply_preset(CurvePreset::FadeInOut);

    let edited = CurveField::new(true, LifetimeCurve::new(session.curve().clone()));
    document
        .set_curve_field("sizeOverLifetime", &edited)
        .expect("encodes");

    assert!(is_current_schema(&document.to_value()));
    let reread = document
        .curve_field("sizeOverLifetime")
        .expect("decodes")
        .expect("present");
    assert!(reread.is_active);
    assert!((reread.lifetime_curve.value_at(0.5) - 1.0).abs() < EPSILON);
}

#[test]
fn test_gradient_edits_drive_channel_curves() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let mut session = GradientEditorSession::new(GradientModel::white_to_transparent())
        .with_observer(Box::new(CurvesLog(log.clone())));

    let mid = session.add_stop(0.5).expect("valid position");
    session
        .set_color(mid, StopColor::new(255.0, 128.0, 0.0, 255.0))
        .expect("valid index");
    assert_eq!(log.borrow().len(), 2);

    let curves = log.borrow().last().cloned().expect("observer notified");
    let mut document = EffectDocument::default();
    document.set_channel_curves(&curves).expect("encodes");
    let stored = document
        .channel_curves()
        .expect("decodes")
        .expect("all channels present");

    let rebuilt = bezier_curves_to_gradient(&stored, 3);
    let expected = session.gradient().stops();
    for (a, b) in expected.iter().zip(&rebuilt) {
        assert!((a.position - b.position).abs() < EPSILON);
        assert!((a.color.r - b.color.r).abs() <= 1.0);
        assert!((a.color.g - b.color.g).abs() <= 1.0);
        assert!((a.color.b - b.color.b).abs() <= 1.0);
        assert!((a.color.a - b.color.a).abs() <= 1.0);
    }
}
