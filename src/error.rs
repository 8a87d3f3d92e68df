use thiserror::Error;

use crate::input::AnchorError;
use crate::scene3d::AssetError;

/// Failures surfaced to whoever runs the site. Inside the pipeline every
/// failure degrades to "no animation" instead.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Asset(#[from] AssetError),
    #[error("invalid trigger region: {0}")]
    Region(#[from] AnchorError),
    #[error("frame loop failed: {0}")]
    EventLoop(#[from] calloop::Error),
    #[error("site is not mounted")]
    NotMounted,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
