//! Static copy shown on the page.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Project {
    pub id: u32,
    pub name: &'static str,
    pub tag: &'static str,
    pub description: &'static str,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Stat {
    pub label: &'static str,
    pub value: u32,
}

/// Heading block above a section.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SectionCopy {
    pub eyebrow: &'static str,
    pub title: &'static str,
    pub subtitle: &'static str,
}

pub const PROJECTS: [Project; 6] = [
    Project {
        id: 1,
        name: "Orbit Commerce",
        tag: "3D product gallery",
        description: "A 3D storefront where products float in space and respond to scroll depth.",
    },
    Project {
        id: 2,
        name: "Neon District",
        tag: "Immersive city tour",
        description: "A scroll-driven cityscape with parallax skylines and layered neon motion.",
    },
    Project {
        id: 3,
        name: "Lens Studio",
        tag: "Portfolio engine",
        description: "Cinematic portfolio layouts with timeline-scrolled case studies.",
    },
    Project {
        id: 4,
        name: "Nova Launch",
        tag: "Product launch page",
        description: "A launch page where every section feels like a cut from a motion reel.",
    },
    Project {
        id: 5,
        name: "Synthwave Docs",
        tag: "Docs, but alive",
        description:
            "Technical documentation pages with subtle 3D cards and scroll-linked indicators.",
    },
    Project {
        id: 6,
        name: "Constellation UI",
        tag: "Design system",
        description: "A design system demo where components orbit and snap into constellations.",
    },
];

pub const STATS: [Stat; 4] = [
    Stat {
        label: "Frames per second budget",
        value: 60,
    },
    Stat {
        label: "Timed motion sequences",
        value: 18,
    },
    Stat {
        label: "Interactive surfaces",
        value: 12,
    },
    Stat {
        label: "Lines of motion config",
        value: 300,
    },
];

pub const HERO_WORDS: [&str; 5] = ["3D", "experiences", "for", "modern", "interfaces."];

pub const MOTION_BANDS: SectionCopy = SectionCopy {
    eyebrow: "Motion system",
    title: "Scroll defines the camera move.",
    subtitle: "Rather than scrolling text blocks, we treat every section like a shot \
               in a 3D scene and move layers at different depths.",
};

pub const PARALLAX_SCENE: SectionCopy = SectionCopy {
    eyebrow: "Motion system",
    title: "Scroll defines the story.",
    subtitle: "We layer content in depth so each scroll step feels like a camera move \
               inside a 3D set.",
};

pub const PROJECT_GRID: SectionCopy = SectionCopy {
    eyebrow: "Case studies",
    title: "Concept projects wired to motion.",
    subtitle: "Every card below is static data; the motion pipeline turns it into a motion system.",
};

pub const PARALLAX_BANDS: [&str; 3] = ["01 · Layers", "02 · Timelines", "03 · Control"];
