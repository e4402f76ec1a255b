//! Drawing overlay for a rendered page.
//!
//! Shapes are captured from pointer events in page pixels and stored in
//! normalized page coordinates (`0..=1` on both axes) together with the page
//! size they were drawn on, so they can be rendered at any later page size.

use serde::{Deserialize, Serialize};

pub const MIN_ZOOM: f32 = 0.2;
pub const MAX_ZOOM: f32 = 5.0;
pub const ZOOM_STEP: f32 = 0.1;

/// Rendered size of a page, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageSize {
    pub width: f32,
    pub height: f32,
}

impl PageSize {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    fn is_drawable(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormPoint {
    pub x: f32,
    pub y: f32,
}

impl NormPoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            x: clamp_unit(x),
            y: clamp_unit(y),
        }
    }

    pub fn from_pixels(x: f32, y: f32, page: PageSize) -> Self {
        Self::new(x / page.width, y / page.height)
    }

    pub fn to_pixels(self, page: PageSize) -> (f32, f32) {
        (self.x * page.width, self.y * page.height)
    }
}

fn clamp_unit(v: f32) -> f32 {
    if v.is_nan() {
        0.0
    } else {
        v.clamp(0.0, 1.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormRect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl NormRect {
    /// Rectangle spanned by two corners, in either order.
    pub fn from_corners(a: NormPoint, b: NormPoint) -> Self {
        Self {
            x: a.x.min(b.x),
            y: a.y.min(b.y),
            w: (a.x - b.x).abs(),
            h: (a.y - b.y).abs(),
        }
    }

    pub fn is_degenerate(&self) -> bool {
        self.w <= f32::EPSILON || self.h <= f32::EPSILON
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Geometry {
    Rect(NormRect),
    Path { points: Vec<NormPoint> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnnotationMode {
    Box,
    Free,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: u32,
    pub name: String,
    pub color: String,
}

pub fn default_categories() -> Vec<Category> {
    [
        (1, "Instrument", "#1976d2"),
        (2, "Valve", "#e53935"),
        (3, "Equipment", "#43a047"),
        (4, "Pipe", "#fbc02d"),
        (5, "Specialty Item", "#8e24aa"),
        (6, "Package", "#00838f"),
        (7, "Miscellaneous", "#6d4c41"),
    ]
    .into_iter()
    .map(|(id, name, color)| Category {
        id,
        name: name.to_string(),
        color: color.to_string(),
    })
    .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub mode: AnnotationMode,
    pub category: Category,
    pub geometry: Geometry,
    /// Page size at capture time.
    pub reference: PageSize,
}

/// An annotation placed on a page of a given size.
#[derive(Debug, Clone, PartialEq)]
pub enum PixelShape {
    Rect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    },
    Path(Vec<(f32, f32)>),
}

impl Annotation {
    pub fn render(&self, page: PageSize) -> PixelShape {
        match &self.geometry {
            Geometry::Rect(r) => PixelShape::Rect {
                x: r.x * page.width,
                y: r.y * page.height,
                width: r.w * page.width,
                height: r.h * page.height,
            },
            Geometry::Path { points } => {
                PixelShape::Path(points.iter().map(|p| p.to_pixels(page)).collect())
            }
        }
    }
}

#[derive(Debug, Clone)]
enum Draft {
    Box { start: NormPoint, current: NormPoint },
    Free(Vec<NormPoint>),
}

/// Pointer-driven capture of one shape at a time.
#[derive(Debug, Clone)]
pub struct OverlayCapture {
    page: PageSize,
    mode: Option<AnnotationMode>,
    category: Option<Category>,
    draft: Option<Draft>,
}

impl OverlayCapture {
    pub fn new(page: PageSize) -> Self {
        Self {
            page,
            mode: None,
            category: None,
            draft: None,
        }
    }

    pub fn set_mode(&mut self, mode: Option<AnnotationMode>) {
        self.mode = mode;
        self.draft = None;
    }

    pub fn set_category(&mut self, category: Option<Category>) {
        self.category = category;
    }

    pub fn resize(&mut self, page: PageSize) {
        self.page = page;
    }

    pub fn is_drawing(&self) -> bool {
        self.draft.is_some()
    }

    /// Start a shape. Ignored unless a mode and a category are chosen.
    pub fn pointer_down(&mut self, x: f32, y: f32) -> bool {
        if self.category.is_none() || !self.page.is_drawable() {
            return false;
        }
        let p = NormPoint::from_pixels(x, y, self.page);
        self.draft = match self.mode {
            Some(AnnotationMode::Box) => Some(Draft::Box {
                start: p,
                current: p,
            }),
            Some(AnnotationMode::Free) => Some(Draft::Free(vec![p])),
            None => None,
        };
        self.draft.is_some()
    }

    pub fn pointer_move(&mut self, x: f32, y: f32) {
        let p = NormPoint::from_pixels(x, y, self.page);
        match &mut self.draft {
            Some(Draft::Box { current, .. }) => *current = p,
            Some(Draft::Free(points)) => points.push(p),
            None => {}
        }
    }

    /// Finish the shape. Zero-area boxes and single-point paths yield nothing.
    pub fn pointer_up(&mut self, x: f32, y: f32) -> Option<Annotation> {
        self.pointer_move(x, y);
        let draft = self.draft.take()?;
        let category = self.category.clone()?;

        let (mode, geometry) = match draft {
            Draft::Box { start, current } => {
                let rect = NormRect::from_corners(start, current);
                if rect.is_degenerate() {
                    return None;
                }
                (AnnotationMode::Box, Geometry::Rect(rect))
            }
            Draft::Free(mut points) => {
                points.dedup();
                if points.len() < 2 {
                    return None;
                }
                (AnnotationMode::Free, Geometry::Path { points })
            }
        };

        Some(Annotation {
            mode,
            category,
            geometry,
            reference: self.page,
        })
    }

    /// Shape in progress, for live preview.
    pub fn preview(&self) -> Option<Geometry> {
        match self.draft.as_ref()? {
            Draft::Box { start, current } => Some(Geometry::Rect(NormRect::from_corners(*start, *current))),
            Draft::Free(points) => Some(Geometry::Path {
                points: points.clone(),
            }),
        }
    }
}

/// Annotations of one viewing session, in drawing order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnnotationLayer {
    annotations: Vec<Annotation>,
}

impl AnnotationLayer {
    pub fn push(&mut self, annotation: Annotation) {
        self.annotations.push(annotation);
    }

    pub fn undo(&mut self) -> Option<Annotation> {
        self.annotations.pop()
    }

    pub fn clear(&mut self) {
        self.annotations.clear();
    }

    pub fn len(&self) -> usize {
        self.annotations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }

    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    /// Every annotation placed on a page of `page` size, with its color.
    pub fn render(&self, page: PageSize) -> Vec<(&str, PixelShape)> {
        self.annotations
            .iter()
            .map(|a| (a.category.color.as_str(), a.render(page)))
            .collect()
    }
}

/// Viewer zoom factor, stepped by the zoom buttons.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Zoom(f32);

impl Default for Zoom {
    fn default() -> Self {
        Zoom(1.0)
    }
}

impl Zoom {
    pub fn level(self) -> f32 {
        self.0
    }

    pub fn zoom_in(&mut self) {
        self.set(self.0 + ZOOM_STEP);
    }

    pub fn zoom_out(&mut self) {
        self.set(self.0 - ZOOM_STEP);
    }

    pub fn reset(&mut self) {
        self.0 = 1.0;
    }

    fn set(&mut self, level: f32) {
        // Round to the step grid so repeated steps do not drift.
        self.0 = ((level * 10.0).round() / 10.0).clamp(MIN_ZOOM, MAX_ZOOM);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valve() -> Category {
        default_categories().into_iter().find(|c| c.name == "Valve").unwrap()
    }

    fn capture(mode: AnnotationMode) -> OverlayCapture {
        let mut c = OverlayCapture::new(PageSize::new(800.0, 1100.0));
        c.set_mode(Some(mode));
        c.set_category(Some(valve()));
        c
    }

    #[test]
    fn box_is_normalized_regardless_of_drag_direction() {
        let mut c = capture(AnnotationMode::Box);
        assert!(c.pointer_down(400.0, 550.0));
        c.pointer_move(300.0, 400.0);
        let a = c.pointer_up(200.0, 275.0).unwrap();

        assert_eq!(a.category.color, "#e53935");
        assert_eq!(a.reference, PageSize::new(800.0, 1100.0));
        match a.geometry {
            Geometry::Rect(r) => {
                assert_eq!((r.x, r.y), (0.25, 0.25));
                assert_eq!((r.w, r.h), (0.25, 0.25));
            }
            other => panic!("expected rect, got {:?}", other),
        }
        assert!(!c.is_drawing());
    }

    #[test]
    fn box_scales_to_another_page_size() {
        let mut c = capture(AnnotationMode::Box);
        c.pointer_down(80.0, 110.0);
        let a = c.pointer_up(400.0, 550.0).unwrap();

        assert_eq!(
            a.render(PageSize::new(1600.0, 2200.0)),
            PixelShape::Rect {
                x: 160.0,
                y: 220.0,
                width: 640.0,
                height: 880.0
            }
        );
    }

    #[test]
    fn preview_tracks_the_drag_across_a_resize() {
        let mut c = capture(AnnotationMode::Box);
        assert!(c.preview().is_none());
        c.pointer_down(200.0, 275.0);
        c.pointer_move(400.0, 550.0);
        assert_eq!(
            c.preview(),
            Some(Geometry::Rect(NormRect::from_corners(
                NormPoint::new(0.25, 0.25),
                NormPoint::new(0.5, 0.5)
            )))
        );

        // zooming mid-drag keeps the pointer in page-relative terms
        c.resize(PageSize::new(1600.0, 2200.0));
        let a = c.pointer_up(1200.0, 1650.0).unwrap();
        assert_eq!(a.reference, PageSize::new(1600.0, 2200.0));
        match a.geometry {
            Geometry::Rect(r) => assert_eq!((r.x, r.y, r.w, r.h), (0.25, 0.25, 0.5, 0.5)),
            other => panic!("expected rect, got {:?}", other),
        }
        assert!(c.preview().is_none());
    }

    #[test]
    fn degenerate_shapes_are_discarded() {
        let mut c = capture(AnnotationMode::Box);
        c.pointer_down(100.0, 100.0);
        assert!(c.pointer_up(100.0, 300.0).is_none());

        let mut c = capture(AnnotationMode::Free);
        c.pointer_down(10.0, 10.0);
        assert!(c.pointer_up(10.0, 10.0).is_none());
    }

    #[test]
    fn free_path_collects_points_and_clamps() {
        let mut c = capture(AnnotationMode::Free);
        c.pointer_down(0.0, 0.0);
        c.pointer_move(400.0, 550.0);
        let a = c.pointer_up(2000.0, -50.0).unwrap();

        match &a.geometry {
            Geometry::Path { points } => {
                assert_eq!(points.len(), 3);
                assert_eq!(points[2], NormPoint { x: 1.0, y: 0.0 });
            }
            other => panic!("expected path, got {:?}", other),
        }
        assert_eq!(a.mode, AnnotationMode::Free);
    }

    #[test]
    fn nothing_is_captured_without_mode_or_category() {
        let mut c = OverlayCapture::new(PageSize::new(800.0, 1100.0));
        c.set_category(Some(valve()));
        assert!(!c.pointer_down(1.0, 1.0));

        let mut c = OverlayCapture::new(PageSize::new(800.0, 1100.0));
        c.set_mode(Some(AnnotationMode::Box));
        assert!(!c.pointer_down(1.0, 1.0));
        assert!(c.pointer_up(50.0, 50.0).is_none());
    }

    #[test]
    fn layer_undo_and_clear() {
        let mut layer = AnnotationLayer::default();
        let mut c = capture(AnnotationMode::Box);
        for i in 0..3 {
            let offset = i as f32 * 10.0;
            c.pointer_down(offset, offset);
            layer.push(c.pointer_up(offset + 100.0, offset + 100.0).unwrap());
        }

        assert_eq!(layer.len(), 3);
        assert!(layer.undo().is_some());
        assert_eq!(layer.render(PageSize::new(800.0, 1100.0)).len(), 2);
        layer.clear();
        assert!(layer.is_empty());
        assert!(layer.undo().is_none());
    }

    #[test]
    fn zoom_steps_within_bounds() {
        let mut z = Zoom::default();
        for _ in 0..100 {
            z.zoom_in();
        }
        assert_eq!(z.level(), MAX_ZOOM);
        for _ in 0..100 {
            z.zoom_out();
        }
        assert_eq!(z.level(), MIN_ZOOM);
        z.reset();
        assert_eq!(z.level(), 1.0);
    }

    #[test]
    fn seven_default_categories() {
        let names: Vec<String> = default_categories().into_iter().map(|c| c.name).collect();
        assert_eq!(names.len(), 7);
        assert_eq!(names[0], "Instrument");
        assert_eq!(names[6], "Miscellaneous");
    }
}
