//! The assembled page.
//!
//! [`Site`] lays out the page's surfaces, mounts every section under a single
//! root mount and forwards host input and frames to the pipeline.

use std::rc::Rc;
use std::time::Duration;

use log::{debug, info};

use crate::components::{
    Component, Hero, ModelReveal, MotionBands, ParallaxScene, ParticleBackdrop, ProjectGrid,
    RendererFactory, StatsStrip,
};
use crate::config::SiteConfig;
use crate::content::{HERO_WORDS, PARALLAX_BANDS, PROJECTS, STATS};
use crate::error::{Error, Result};
use crate::frame::{self, FrameTime};
use crate::geometry::Rect;
use crate::input::{self, scroll, Event, Viewport};
use crate::lifecycle::{mount, MountState, Teardown};
use crate::platform::FrameLoop;
use crate::scene3d::{
    HeadlessRenderer, ModelLoader, NodeFilter, ParticleField, Renderer, StaticModelLoader,
};
use crate::surface::{self, SurfaceId};

const MARGIN: f32 = 80.0;
const GAP: f32 = 24.0;

/// Surfaces of the laid-out page, in page coordinates.
#[derive(Clone, Debug)]
pub struct PageLayout {
    pub page: SurfaceId,
    /// Fixed full-viewport layer behind the page
    pub backdrop: SurfaceId,
    pub header: SurfaceId,
    pub hero: Hero,
    pub model: SurfaceId,
    pub bands: MotionBands,
    pub parallax: ParallaxScene,
    pub grid: ProjectGrid,
    pub stats: StatsStrip,
    pub footer: SurfaceId,
}

/// Vertical cursor that stacks sections down the page.
struct Column {
    x: f32,
    width: f32,
    y: f32,
}

impl Column {
    fn take(&mut self, height: f32, gap: f32) -> Rect {
        let rect = Rect::new(self.x, self.y, self.width, height);
        self.y += height + gap;
        rect
    }
}

fn stack(parent: SurfaceId, name: &str, count: usize, first: Rect, step: f32) -> Vec<SurfaceId> {
    (0..count)
        .map(|i| {
            let rect = first.offset(0.0, i as f32 * step);
            surface::create_child(parent, format!("{}-{}", name, i), rect)
        })
        .collect()
}

impl PageLayout {
    fn build(config: &SiteConfig) -> Self {
        let width = config.width.max(0.0);
        let content = (width - 2.0 * MARGIN).max(0.0);
        let mut column = Column {
            x: MARGIN,
            width: content,
            y: 0.0,
        };

        let page = surface::create_surface("page", Rect::new(0.0, 0.0, width, 0.0));
        let viewport = Rect::new(0.0, 0.0, width, config.height);
        let backdrop = surface::create_surface("backdrop", viewport);
        let header = surface::create_child(page, "header", column.take(60.0, 20.0));

        let hero_rect = column.take(520.0, 80.0);
        let hero = {
            let section = surface::create_child(page, "hero", hero_rect);
            let left = hero_rect.x + 40.0;
            let words = HERO_WORDS
                .iter()
                .enumerate()
                .map(|(i, word)| {
                    let rect = Rect::new(left + i as f32 * 110.0, hero_rect.y + 120.0, 100.0, 44.0);
                    surface::create_child(section, *word, rect)
                })
                .collect();
            let subtext = surface::create_child(
                section,
                "hero-subtext",
                Rect::new(left, hero_rect.y + 190.0, 520.0, 70.0),
            );
            let cta_rect = Rect::new(left, hero_rect.y + 290.0, 420.0, 44.0);
            let cta = surface::create_child(section, "hero-cta", cta_rect);
            let button_rect = Rect::new(left, cta_rect.y, 200.0, 44.0);
            let button = surface::create_child(cta, "hero-button", button_rect);
            let card_rect = Rect::new(
                hero_rect.x + hero_rect.width - 420.0,
                hero_rect.y + 50.0,
                380.0,
                420.0,
            );
            let card_float = surface::create_child(section, "card-float", card_rect);
            let card = surface::create_child(card_float, "card", card_rect);
            let chip_rect = Rect::new(card_rect.x + 18.0, card_rect.y + 60.0, 120.0, 28.0);
            let chips = stack(card, "chip", 3, chip_rect, 70.0);
            Hero {
                section,
                words,
                subtext: Some(subtext),
                cta: Some(cta),
                button: Some(button),
                card,
                card_float: Some(card_float),
                chips,
                motion: config.motion.clone(),
                seed: config.seed,
            }
        };

        let model_rect = column.take(540.0, 80.0);
        let model_width = model_rect.width.min(900.0);
        let model = surface::create_child(
            page,
            "model",
            Rect::new(
                (width - model_width) / 2.0,
                model_rect.y,
                model_width,
                model_rect.height,
            ),
        );

        let bands_rect = column.take(700.0, 80.0);
        let bands = {
            let wrapper = surface::create_child(page, "motion-bands", bands_rect);
            let title_rect = Rect::new(bands_rect.x, bands_rect.y, content, 120.0);
            let title = surface::create_child(wrapper, "motion-bands-title", title_rect);
            let first = Rect::new(bands_rect.x, bands_rect.y + 140.0, content, 120.0);
            MotionBands {
                wrapper,
                title: Some(title),
                bands: stack(wrapper, "motion-band", 3, first, 140.0),
                motion: config.motion.clone(),
            }
        };

        let parallax_rect = column.take(700.0, 80.0);
        let parallax = {
            let section = surface::create_child(page, "parallax", parallax_rect);
            let title_rect = Rect::new(parallax_rect.x, parallax_rect.y, content, 120.0);
            let title = surface::create_child(section, "parallax-title", title_rect);
            let first = Rect::new(parallax_rect.x, parallax_rect.y + 140.0, content, 120.0);
            let bands = PARALLAX_BANDS
                .iter()
                .enumerate()
                .map(|(i, label)| {
                    surface::create_child(section, *label, first.offset(0.0, i as f32 * 134.0))
                })
                .collect();
            ParallaxScene {
                section,
                title: Some(title),
                bands,
                motion: config.motion.clone(),
            }
        };

        let grid_rect = column.take(900.0, 80.0);
        let grid = {
            let section = surface::create_child(page, "projects", grid_rect);
            let title_rect = Rect::new(grid_rect.x, grid_rect.y, content, 120.0);
            let title = surface::create_child(section, "projects-title", title_rect);
            let card_width = ((content - 2.0 * GAP) / 3.0).max(0.0);
            let cards = PROJECTS
                .iter()
                .enumerate()
                .map(|(i, project)| {
                    let (row, col) = (i / 3, i % 3);
                    let rect = Rect::new(
                        grid_rect.x + col as f32 * (card_width + GAP),
                        grid_rect.y + 150.0 + row as f32 * (300.0 + GAP),
                        card_width,
                        300.0,
                    );
                    surface::create_child(section, project.name, rect)
                })
                .collect();
            ProjectGrid {
                section,
                title: Some(title),
                cards,
                motion: config.motion.clone(),
            }
        };

        let stats_rect = column.take(260.0, 56.0);
        let stats = {
            let section = surface::create_child(page, "stats", stats_rect);
            let cell = ((content - 3.0 * GAP) / 4.0).max(0.0);
            let counters = STATS
                .iter()
                .enumerate()
                .map(|(i, stat)| {
                    let x = stats_rect.x + i as f32 * (cell + GAP);
                    let rect = Rect::new(x, stats_rect.y + 60.0, cell, 120.0);
                    (surface::create_child(section, stat.label, rect), stat.value as f32)
                })
                .collect();
            StatsStrip { section, counters }
        };

        let footer = surface::create_child(page, "footer", column.take(40.0, 40.0));
        surface::set_bounds(page, Rect::new(0.0, 0.0, width, column.y));
        debug!("page laid out, {}px tall", column.y);

        Self {
            page,
            backdrop,
            header,
            hero,
            model,
            bands,
            parallax,
            grid,
            stats,
            footer,
        }
    }

    /// Total scrollable height of the page.
    pub fn height(&self) -> f32 {
        surface::bounds(self.page).map(|b| b.height).unwrap_or_default()
    }
}

/// The whole site: configuration, page layout and the root mount.
///
/// One site per thread: dropping it resets all pipeline state.
pub struct Site {
    config: SiteConfig,
    renderer: RendererFactory,
    loader: Rc<dyn ModelLoader>,
    layout: Option<PageLayout>,
    teardown: Teardown,
}

impl Site {
    pub fn new() -> Self {
        Self::with_config(SiteConfig::default())
    }

    pub fn with_config(config: SiteConfig) -> Self {
        Self {
            config,
            renderer: Rc::new(|| Box::new(HeadlessRenderer::new()) as Box<dyn Renderer>),
            loader: Rc::new(StaticModelLoader::new()),
            layout: None,
            teardown: Teardown::inert(),
        }
    }

    pub fn width(mut self, width: f32) -> Self {
        self.config.width = width;
        self
    }

    pub fn height(mut self, height: f32) -> Self {
        self.config.height = height;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = seed;
        self
    }

    pub fn frame_interval(mut self, interval: Duration) -> Self {
        self.config.frame_interval = interval;
        self
    }

    pub fn frame_budget(mut self, frames: u64) -> Self {
        self.config.frame_budget = Some(frames);
        self
    }

    pub fn model_path(mut self, path: impl Into<String>) -> Self {
        self.config.model_path = path.into();
        self
    }

    /// Renderer created for each 3D scene mount.
    pub fn renderer<F: Fn() -> Box<dyn Renderer> + 'static>(mut self, factory: F) -> Self {
        self.renderer = Rc::new(factory);
        self
    }

    pub fn loader<L: ModelLoader + 'static>(mut self, loader: L) -> Self {
        self.loader = Rc::new(loader);
        self
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    pub fn layout(&self) -> Option<&PageLayout> {
        self.layout.as_ref()
    }

    pub fn is_mounted(&self) -> bool {
        self.teardown.state() == MountState::Mounted
    }

    fn sections(&self, layout: &PageLayout) -> Vec<Box<dyn Component>> {
        vec![
            Box::new(ParticleBackdrop {
                host: layout.backdrop,
                page: layout.page,
                renderer: self.renderer.clone(),
                field: ParticleField {
                    count: self.config.particle_count,
                    seed: self.config.seed,
                    ..ParticleField::default()
                },
                motion: self.config.motion.clone(),
            }),
            Box::new(layout.hero.clone()),
            Box::new(ModelReveal {
                host: layout.model,
                loader: self.loader.clone(),
                path: self.config.model_path.clone(),
                renderer: self.renderer.clone(),
                filter: NodeFilter::default(),
                motion: self.config.motion.clone(),
            }),
            Box::new(layout.bands.clone()),
            Box::new(layout.parallax.clone()),
            Box::new(layout.grid.clone()),
            Box::new(layout.stats.clone()),
        ]
    }

    /// Lay out the page on first use and mount every section. Mounting an
    /// already mounted site does nothing.
    pub fn mount(&mut self) -> Result<&PageLayout> {
        if !self.is_mounted() {
            let viewport = scroll::viewport();
            scroll::set_viewport(Viewport::new(
                viewport.scroll_y,
                self.config.width,
                self.config.height,
            ));

            let layout = match self.layout.take() {
                Some(layout) if surface::exists(layout.page) => layout,
                _ => PageLayout::build(&self.config),
            };
            let sections = self.sections(&layout);
            self.teardown = mount(Some(layout.page), |_| {
                for section in &sections {
                    section.mount();
                }
            });
            self.layout = Some(layout);
            if self.teardown.is_inert() {
                return Err(Error::NotMounted);
            }
            info!("site mounted with {} sections", sections.len());
        }
        self.layout.as_ref().ok_or(Error::NotMounted)
    }

    /// Tear down every section. The page surfaces stay so the site can be
    /// mounted again.
    pub fn unmount(&mut self) {
        if self.is_mounted() {
            info!("site unmounted");
        }
        self.teardown.run();
    }

    pub fn dispatch(&self, event: Event) {
        input::dispatch(event);
    }

    pub fn advance(&self, now: Duration) -> FrameTime {
        frame::advance(now)
    }

    /// Mount, drive frames at the configured interval until the budget is
    /// spent, then unmount. Returns the number of frames produced.
    pub fn run(mut self) -> Result<u64> {
        let _ = env_logger::try_init();

        self.mount()?;
        let mut frame_loop = FrameLoop::new(self.config.frame_interval);
        if let Some(budget) = self.config.frame_budget {
            frame_loop = frame_loop.budget(budget);
        }
        let frames = frame_loop.run(&mut |now: Duration| {
            frame::advance(now);
            true
        });
        self.unmount();
        frames
    }
}

impl Default for Site {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Site {
    /// Tears the site down and wipes every surface, transition and listener
    /// on this thread.
    fn drop(&mut self) {
        self.teardown.run();
        crate::reset_pipeline();
    }
}
