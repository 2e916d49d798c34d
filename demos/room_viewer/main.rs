//! # Room Viewer Demo
//!
//! Opens a window on a room model and logs navigation as you click around.
//! There is no renderer attached: watch the log to follow the camera, the
//! overlay placements and the shop props.
//!
//! ## Usage:
//! ```bash
//! RUST_LOG=debug cargo run --example room_viewer -- path/to/room.obj [config.json]
//! ```
//!
//! The model should contain `TV_Third/TV_Screen` and
//! `Computer_Second/Comp_Screen` objects (OBJ object names with `/` become
//! nested nodes). Click either one to fly in, press Escape to fly back out.

use anyhow::Context;
use log::{debug, info};
use roomscope::prelude::*;

fn main() -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);
    let model_path = args
        .next()
        .context("usage: room_viewer <room.obj> [config.json]")?;
    let config = match args.next() {
        Some(path) => RoomConfig::load(&path).with_context(|| format!("reading {path}"))?,
        None => RoomConfig::default(),
    };

    let mut app = RoomApp::new(config)?;
    app.load_model(&model_path)?;

    let mut last_state = NavigationState::Idle;
    app.set_frame_callback(move |room: &RoomExperience| {
        let state = room.navigation().state();
        if state == last_state {
            return;
        }
        last_state = state;

        info!(
            "state {} (stage: {:?}, back button: {})",
            state,
            room.navigation().active_stage().map(|s| s.as_str()),
            room.back_visible()
        );
        debug!("view-proj {:?}", room.camera().get_view_proj_matrix());
        for overlay in room.overlays().iter().filter(|o| o.is_visible()) {
            if let Some(placement) = overlay.placement() {
                info!(
                    "overlay {} at {:?} scale {:?}",
                    overlay.stage(),
                    placement.position,
                    placement.scale
                );
            }
        }
    });

    app.run()
}
