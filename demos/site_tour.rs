use std::time::Duration;

use nebula::prelude::*;
use nebula::scene3d::{ModelNode, StaticModelLoader};

fn main() -> nebula::Result<()> {
    // A stand-in for the logo model: a body and the floor it was scanned on
    let badge = vec![[-1.0, -0.5, -0.2], [1.0, 0.5, 0.2]];
    let floor = vec![[-2.0, -0.6, -2.0], [2.0, -0.6, 2.0]];
    let logo = ModelNode::new("logo")
        .with_child(ModelNode::new("Badge").with_vertices(badge))
        .with_child(ModelNode::new("ShadowPlane").with_vertices(floor));

    // About five seconds of frames
    let frames = Site::new()
        .width(1280.0)
        .height(800.0)
        .frame_interval(Duration::from_millis(16))
        .frame_budget(300)
        .loader(StaticModelLoader::new().with("/models/logo.glb", logo))
        .run()?;

    println!("rendered {} frames", frames);
    Ok(())
}
