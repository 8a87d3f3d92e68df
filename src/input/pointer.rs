use crate::geometry::Rect;
use crate::surface::{self, SurfaceId};

use super::scroll::{self, Viewport};

/// Pointer offset from the centre of a reference rectangle, in pixels.
///
/// Positive `x` is right of centre, positive `y` below it.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PointerSample {
    pub x: f32,
    pub y: f32,
    pub half_width: f32,
    pub half_height: f32,
}

impl PointerSample {
    /// Sample a client position against a rectangle in client coordinates.
    pub fn relative_to(rect: Rect, client_x: f32, client_y: f32) -> Self {
        let (cx, cy) = rect.center();
        Self {
            x: client_x - cx,
            y: client_y - cy,
            half_width: rect.width / 2.0,
            half_height: rect.height / 2.0,
        }
    }

    /// Sample a client position against the whole viewport.
    pub fn in_viewport(client_x: f32, client_y: f32, viewport: &Viewport) -> Self {
        Self::relative_to(
            Rect::new(0.0, 0.0, viewport.width, viewport.height),
            client_x,
            client_y,
        )
    }

    /// Offset divided by the half extents: ±1 at the edges, 0 at the centre.
    /// A degenerate axis reads as 0.
    pub fn normalized(&self) -> (f32, f32) {
        fn ratio(offset: f32, half: f32) -> f32 {
            if half > 0.0 {
                offset / half
            } else {
                0.0
            }
        }
        (ratio(self.x, self.half_width), ratio(self.y, self.half_height))
    }

    pub fn offset(&self) -> (f32, f32) {
        (self.x, self.y)
    }
}

/// Sample a client position against a surface's on-screen rectangle.
pub fn sample_in(target: SurfaceId, client_x: f32, client_y: f32) -> Option<PointerSample> {
    let bounds = surface::bounds(target)?;
    let rect = scroll::viewport().client_rect(bounds);
    Some(PointerSample::relative_to(rect, client_x, client_y))
}

/// Sample a client position against the current viewport.
pub fn viewport_sample(client_x: f32, client_y: f32) -> PointerSample {
    PointerSample::in_viewport(client_x, client_y, &scroll::viewport())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_to_centre() {
        let sample = PointerSample::relative_to(Rect::new(100.0, 50.0, 200.0, 100.0), 240.0, 80.0);
        assert_eq!(sample.offset(), (40.0, -20.0));
        assert_eq!(sample.normalized(), (0.4, -0.4));
    }

    #[test]
    fn test_degenerate_rect_normalizes_to_zero() {
        let sample = PointerSample::relative_to(Rect::new(0.0, 0.0, 0.0, 0.0), 5.0, 5.0);
        assert_eq!(sample.normalized(), (0.0, 0.0));
    }

    #[test]
    fn test_viewport_sample_edges() {
        let viewport = Viewport::new(0.0, 1000.0, 500.0);
        let corner = PointerSample::in_viewport(0.0, 500.0, &viewport);
        assert_eq!(corner.normalized(), (-1.0, 1.0));
    }

    #[test]
    fn test_sample_in_accounts_for_scroll() {
        let card = surface::create_surface("card", Rect::new(0.0, 1000.0, 200.0, 200.0));
        scroll::set_viewport(Viewport::new(900.0, 1280.0, 800.0));

        let sample = sample_in(card, 100.0, 200.0).unwrap();

        assert_eq!(sample.offset(), (0.0, 0.0));
    }
}
