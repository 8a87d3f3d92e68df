use log::debug;

use super::{power3, Component};
use crate::animation::animate_from_to;
use crate::lifecycle::{mount, Teardown};
use crate::property::Property;
use crate::surface::SurfaceId;

/// Eyebrow, heading and subtitle block that fades up when mounted.
#[derive(Clone, Debug)]
pub struct SectionTitle {
    pub title: SurfaceId,
}

impl SectionTitle {
    pub fn new(title: SurfaceId) -> Self {
        Self { title }
    }
}

impl Component for SectionTitle {
    fn mount(&self) -> Teardown {
        mount(Some(self.title), |title| {
            debug!("section title mounted");
            animate_from_to(title, Property::Opacity, 0.0, 1.0, power3(800.0));
            animate_from_to(title, Property::TranslateY, 20.0, 0.0, power3(800.0));
        })
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::animation::{active_count, tick};
    use crate::geometry::Rect;
    use crate::surface;

    #[test]
    fn test_fades_up_and_is_owned() {
        let title = surface::create_surface("title", Rect::new(0.0, 0.0, 600.0, 80.0));
        tick(Duration::ZERO);

        let teardown = SectionTitle::new(title).mount();

        assert_eq!(surface::value(title, Property::Opacity), Some(0.0));
        assert_eq!(surface::value(title, Property::TranslateY), Some(20.0));
        assert_eq!(active_count(), 2);

        teardown.run();
        assert_eq!(active_count(), 0);
    }

    #[test]
    fn test_settles_at_rest() {
        let title = surface::create_surface("title", Rect::new(0.0, 0.0, 600.0, 80.0));
        tick(Duration::ZERO);
        SectionTitle::new(title).mount();

        tick(Duration::from_millis(800));

        assert_eq!(surface::value(title, Property::Opacity), Some(1.0));
        assert_eq!(surface::value(title, Property::TranslateY), Some(0.0));
    }
}
