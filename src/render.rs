//! Rendering seam.
//!
//! The controller never draws. It assembles a [`RenderFrame`] describing
//! what is visible and hands it to a [`Renderer`] supplied by the host.

use std::fmt::Write as _;

use crate::controller::RadialPicker;
use crate::geometry::{Point, Viewport};
use crate::model::{Figure, MaskMode};

/// Color used for figures whose label is not in the label set.
pub const UNKNOWN_LABEL_COLOR: [u8; 3] = [128, 128, 128];

/// A figure with its per-frame display state.
#[derive(Debug, Clone, Copy)]
pub struct DrawnFigure<'a> {
    pub figure: &'a Figure,
    pub color: [u8; 3],
    pub selected: bool,
    /// Handle to highlight, if the selection is on a handle
    pub active_point: Option<usize>,
}

/// Vertices of a mask polygon still being drawn.
#[derive(Debug, Clone, Copy)]
pub struct PolygonPreview<'a> {
    pub vertices: &'a [Point],
    /// Last pointer position, for the rubber-band edge
    pub cursor: Point,
}

/// Everything a renderer needs for one frame.
#[derive(Debug, Clone)]
pub struct RenderFrame<'a> {
    /// Figures in draw order: largest surface first
    pub figures: Vec<DrawnFigure<'a>>,
    pub preview: Option<&'a Figure>,
    pub polygon: Option<PolygonPreview<'a>>,
    pub picker: Option<&'a RadialPicker>,
    pub viewport: Viewport,
    pub mask_mode: MaskMode,
}

/// Draws a frame onto a host canvas.
pub trait Renderer {
    type Canvas;

    /// Draw `frame` onto `canvas` and return it.
    fn render(&mut self, canvas: Self::Canvas, frame: &RenderFrame<'_>) -> Self::Canvas;
}

/// Renderer that describes each drawn element as a line of text, in
/// screen coordinates. Used by the headless binary.
#[derive(Debug, Default)]
pub struct TextRenderer;

impl TextRenderer {
    fn screen(viewport: &Viewport, p: &Point) -> String {
        let (x, y) = viewport.image_to_screen(p);
        format!("({x:.1}, {y:.1})")
    }

    fn describe(viewport: &Viewport, figure: &Figure) -> String {
        let mut line = format!("{} '{}'", figure.figure_type().name(), figure.label());
        match figure {
            Figure::Mask(mask) => {
                let _ = write!(line, " {}x{} fg={}", mask.width, mask.height, mask.foreground());
            }
            _ => {
                let points: Vec<String> = figure
                    .points()
                    .iter()
                    .map(|p| Self::screen(viewport, p))
                    .collect();
                let _ = write!(line, " [{}]", points.join(", "));
            }
        }
        line
    }
}

impl Renderer for TextRenderer {
    type Canvas = Vec<String>;

    fn render(&mut self, mut canvas: Vec<String>, frame: &RenderFrame<'_>) -> Vec<String> {
        let viewport = &frame.viewport;
        for drawn in &frame.figures {
            let mut line = Self::describe(viewport, drawn.figure);
            if drawn.selected {
                line.push_str(" *");
                if let Some(point) = drawn.active_point {
                    let _ = write!(line, " handle {point}");
                }
            }
            canvas.push(line);
        }
        if let Some(preview) = frame.preview {
            canvas.push(format!("preview {}", Self::describe(viewport, preview)));
        }
        if let Some(polygon) = &frame.polygon {
            canvas.push(format!(
                "polygon {} vertices ({:?})",
                polygon.vertices.len(),
                frame.mask_mode
            ));
        }
        if let Some(picker) = frame.picker {
            canvas.push(format!("picker [{}]", picker.labels().join(", ")));
        }
        canvas
    }
}
