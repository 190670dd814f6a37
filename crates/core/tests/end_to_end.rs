//! End-to-end behaviour of the coordinator as a presentation layer drives it

use inkmargin_core::{
    Anchor, DrawingSurface, EngineConfig, MarginSettings, Mode, PageInfo, Point, Region, Rotation,
    Size, StaticPages, Stroke, StrokeStyle, SurfaceLifecycleCoordinator, Tool,
};
use std::cell::RefCell;
use std::rc::Rc;

const EPS: f32 = 0.001;

#[derive(Default)]
struct TestSurface {
    tool: RefCell<Option<Tool>>,
    drawing: RefCell<Vec<Stroke>>,
    size: RefCell<Option<Size>>,
}

impl DrawingSurface for TestSurface {
    fn apply_tool(&self, tool: &Tool) {
        *self.tool.borrow_mut() = Some(*tool);
    }
    fn set_drawing(&self, strokes: &[Stroke]) {
        *self.drawing.borrow_mut() = strokes.to_vec();
    }
    fn resize(&self, size: Size) {
        *self.size.borrow_mut() = Some(size);
    }
    fn set_selection_active(&self, _active: bool) {}
}

fn engine(pages: StaticPages) -> SurfaceLifecycleCoordinator<StaticPages> {
    SurfaceLifecycleCoordinator::in_memory(pages, EngineConfig::default()).unwrap()
}

fn line(from: (f32, f32), to: (f32, f32)) -> Stroke {
    Stroke::new(vec![Point::new(from.0, from.1), Point::new(to.0, to.1)], StrokeStyle::pen())
}

#[test]
fn stroke_left_of_centered_page_is_margin() {
    let mut engine = engine(StaticPages::uniform(1, 100.0, 100.0));
    engine.set_current_page(0).unwrap();
    engine.set_mode(Mode::Drawing);

    let frame = engine.page_frame().unwrap();
    assert!((frame.rect.x - 90.0).abs() < EPS && (frame.rect.y - 90.0).abs() < EPS);
    assert!((frame.surface.width - 280.0).abs() < EPS);

    let transformer = *engine.transformer().unwrap();
    let unit = transformer.normalize_point(Point::new(50.0, 50.0));
    assert!((unit.x + 0.4).abs() < EPS && (unit.y + 0.4).abs() < EPS);

    let stroke = Stroke::new(vec![Point::new(50.0, 50.0)], StrokeStyle::pen());
    assert_eq!(transformer.classify_stroke(&stroke), Region::Margin);

    assert!(engine.add_stroke(stroke.clone()));
    let set = engine.store().get(0).unwrap();
    assert!(set.page_anchored.is_empty());
    assert_eq!(set.margin_anchored, vec![stroke]);
}

#[test]
fn tool_survives_selection_and_surface_recreation() {
    let mut engine = engine(StaticPages::uniform(3, 612.0, 792.0));
    let highlighter = StrokeStyle::highlighter();

    let first = Rc::new(TestSurface::default());
    engine.attach_surface(first.clone());
    engine.set_current_page(0).unwrap();
    engine.set_ink_tool(highlighter);
    engine.set_mode(Mode::Drawing);
    engine.set_mode(Mode::Selecting);
    engine.set_mode(Mode::Drawing);
    assert_eq!(engine.active_tool(), Tool::Ink(highlighter));

    // Page switch tears the old surface down and builds a new one
    drop(first);
    engine.set_current_page(1).unwrap();
    let second = Rc::new(TestSurface::default());
    engine.attach_surface(second.clone());

    assert_eq!(*second.tool.borrow(), Some(Tool::Ink(highlighter)));
    assert_eq!(engine.tools().live_surface_count(), 1);
}

#[test]
fn page_switch_round_trip_preserves_ink() {
    let mut engine = engine(StaticPages::new(vec![
        PageInfo::new(100.0, 100.0),
        PageInfo::new(200.0, 100.0).rotated(Rotation::Deg90),
    ]));
    let surface = Rc::new(TestSurface::default());
    engine.attach_surface(surface.clone());
    engine.set_current_page(0).unwrap();
    engine.set_mode(Mode::Drawing);

    let on_page = line((100.0, 100.0), (150.0, 120.0));
    let in_margin = line((10.0, 10.0), (30.0, 12.0));
    engine.add_stroke(on_page.clone());
    engine.add_stroke(in_margin.clone());

    engine.set_current_page(1).unwrap();
    assert!(surface.drawing.borrow().is_empty());
    let size = surface.size.borrow().unwrap();
    // 200x100 rotated 90 degrees: surface is 280x560
    assert!((size.width - 280.0).abs() < 0.01 && (size.height - 560.0).abs() < 0.01);

    engine.set_current_page(0).unwrap();
    let restored = surface.drawing.borrow().clone();
    assert_eq!(restored.len(), 2);
    assert!(restored[0].approx_eq(&on_page, 0.01));
    assert_eq!(restored[1], in_margin);
}

#[test]
fn margin_change_keeps_all_ink_in_place() {
    let mut engine = engine(StaticPages::uniform(1, 100.0, 100.0));
    engine.set_current_page(0).unwrap();
    engine.set_mode(Mode::Drawing);

    let on_page = line((140.0, 140.0), (150.0, 140.0));
    let in_margin = line((250.0, 20.0), (260.0, 20.0));
    engine.add_stroke(on_page.clone());
    engine.add_stroke(in_margin.clone());

    engine.update_margin_settings(MarginSettings::new(Anchor::BottomRight, 1.0).unwrap()).unwrap();
    // Reclassification keeps both strokes where they were
    let drawing = engine.drawing().to_vec();
    assert!(drawing.iter().any(|s| s.approx_eq(&on_page, 0.01)));
    assert!(drawing.iter().any(|s| s.approx_eq(&in_margin, 0.01)));

    let frame = engine.page_frame().unwrap();
    assert!((frame.rect.x - 180.0).abs() < EPS && (frame.rect.y - 180.0).abs() < EPS);

    // The stroke that was on the page is now margin ink (the page moved away from it)
    let set = engine.store().get(0).unwrap();
    assert_eq!(set.page_anchored.len(), 0);
    assert_eq!(set.margin_anchored.len(), 2);

    // Ink added on the relocated page is page ink until the next move
    let late = line((200.0, 200.0), (210.0, 205.0));
    engine.add_stroke(late.clone());
    assert_eq!(engine.store().get(0).unwrap().page_anchored.len(), 1);

    engine.update_margin_settings(MarginSettings::new(Anchor::TopLeft, 1.0).unwrap()).unwrap();
    assert_eq!(engine.drawing().len(), 3);
    assert!(engine.drawing().iter().any(|s| s.approx_eq(&late, 0.01)));
    assert!(engine.store().get(0).unwrap().page_anchored.is_empty());
}

#[test]
fn blobs_survive_a_new_session() {
    let mut first = engine(StaticPages::uniform(2, 100.0, 100.0));
    first.set_current_page(1).unwrap();
    first.set_mode(Mode::Drawing);
    first.add_stroke(line((120.0, 120.0), (130.0, 125.0)));
    first.add_stroke(line((5.0, 5.0), (6.0, 6.0)));
    let blobs = first.export_page_blobs().unwrap();

    let mut second = engine(StaticPages::uniform(2, 100.0, 100.0));
    second.set_current_page(1).unwrap();
    let report = second.import_page_blobs(blobs);
    assert_eq!(report.loaded, vec![1]);
    assert_eq!(second.drawing().len(), 2);
    let expected = first.store().get(1).unwrap();
    let imported = second.store().get(1).unwrap();
    assert_eq!(imported.page_anchored, expected.page_anchored);
    assert_eq!(imported.margin_anchored, expected.margin_anchored);
}
