//! # Overlay Synchronizer
//!
//! Keeps each stage's 2D panel registered on its 3D screen and decides, once
//! per frame, whether the panel is shown and whether it takes the pointer.
//!
//! A panel is visible only while its stage is the focused one, and
//! interactive only while visible *and* the last pointer ray hits the
//! screen; otherwise pointer input falls through to the 3D scene.

pub mod placement;

use cgmath::Vector2;
use log::{debug, info, warn};

use crate::error::Result;
use crate::gfx::camera::OrbitCamera;
use crate::gfx::scene::{NodeId, SceneGraph};
use crate::navigation::{Navigation, NavigationState, StageId, StageRegistry};

pub use placement::{compute_placement, OverlayConfig, OverlayPlacement};

#[derive(Debug, Clone)]
pub struct Overlay {
    config: OverlayConfig,
    screen: Option<NodeId>,
    placement: Option<OverlayPlacement>,
    visible: bool,
    interactive: bool,
}

impl Overlay {
    pub fn new(config: OverlayConfig) -> Self {
        Self {
            config,
            screen: None,
            placement: None,
            visible: false,
            interactive: false,
        }
    }

    pub fn stage(&self) -> &StageId {
        &self.config.stage
    }

    pub fn config(&self) -> &OverlayConfig {
        &self.config
    }

    pub fn screen(&self) -> Option<NodeId> {
        self.screen
    }

    /// Last computed placement; `None` until attached to a screen
    pub fn placement(&self) -> Option<&OverlayPlacement> {
        self.placement.as_ref()
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_interactive(&self) -> bool {
        self.interactive
    }

    fn hide(&mut self) {
        self.visible = false;
        self.interactive = false;
    }
}

#[derive(Debug, Clone, Default)]
pub struct OverlaySynchronizer {
    overlays: Vec<Overlay>,
    pointer: Option<Vector2<f32>>,
}

impl OverlaySynchronizer {
    pub fn new(configs: Vec<OverlayConfig>) -> Result<Self> {
        for config in &configs {
            config.validate()?;
        }
        Ok(Self {
            overlays: configs.into_iter().map(Overlay::new).collect(),
            pointer: None,
        })
    }

    /// Hooks every overlay to its stage's bound screen and computes the
    /// initial placement. Overlays whose stage has no screen stay hidden.
    pub fn attach(&mut self, graph: &SceneGraph, registry: &StageRegistry) {
        for overlay in &mut self.overlays {
            overlay.screen = registry.get(overlay.stage()).and_then(|s| s.screen);
            match overlay.screen {
                Some(screen) => {
                    let placement = compute_placement(&overlay.config, graph, screen);
                    info!(
                        "[Overlay] {} attached at {:?}, scale {:?}",
                        overlay.stage(),
                        placement.position,
                        placement.scale
                    );
                    overlay.placement = Some(placement);
                }
                None => warn!(
                    "[Overlay] {} has no screen to attach to, overlay disabled",
                    overlay.stage()
                ),
            }
        }
    }

    /// Records the pointer position (NDC) used for hover tests
    pub fn set_pointer(&mut self, ndc: Vector2<f32>) {
        self.pointer = Some(ndc);
    }

    pub fn pointer(&self) -> Option<Vector2<f32>> {
        self.pointer
    }

    pub fn get(&self, stage: &StageId) -> Option<&Overlay> {
        self.overlays.iter().find(|o| o.stage() == stage)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Overlay> {
        self.overlays.iter()
    }

    /// The overlay currently taking pointer input, if any
    pub fn interactive_overlay(&self) -> Option<&Overlay> {
        self.overlays.iter().find(|o| o.interactive)
    }

    /// Per-frame visibility, placement and hover update. Must run after the
    /// navigation update so it sees this frame's state.
    pub fn update(&mut self, navigation: &Navigation, camera: &OrbitCamera, graph: &SceneGraph) {
        let focused = navigation.state() == NavigationState::Focused;
        let ray = self.pointer.map(|ndc| camera.ray_from_ndc(ndc));

        for overlay in &mut self.overlays {
            let Some(screen) = overlay.screen else {
                overlay.hide();
                continue;
            };
            if !focused || navigation.active_stage() != Some(overlay.stage()) {
                overlay.hide();
                continue;
            }

            overlay.visible = true;
            overlay.placement = Some(compute_placement(&overlay.config, graph, screen));

            let hovering = ray
                .as_ref()
                .is_some_and(|ray| !graph.raycast(ray, screen).is_empty());
            if hovering != overlay.interactive {
                debug!("[Overlay] {} interactive: {}", overlay.stage(), hovering);
            }
            overlay.interactive = hovering;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::camera::{CameraManager, CameraPose, OrbitControls};
    use crate::gfx::scene::{Geometry, Node};
    use crate::navigation::StageConfig;
    use cgmath::{Vector3, Zero};

    struct Fixture {
        graph: SceneGraph,
        rig: CameraManager,
        nav: Navigation,
        overlays: OverlaySynchronizer,
    }

    fn fixture() -> Fixture {
        let mut graph = SceneGraph::new();
        let root = graph.add_node(Node::new("Room"), None);
        let tv = graph.add_node(
            Node::new("TV_Third").with_translation(Vector3::new(-2.0, 0.0, 0.0)),
            Some(root),
        );
        graph.add_node(
            Node::new("TV_Screen")
                .with_translation(Vector3::new(0.0, 1.0, 0.0))
                .with_geometry(Geometry::quad(1.0, 0.6)),
            Some(tv),
        );
        let computer = graph.add_node(
            Node::new("Computer_Second").with_translation(Vector3::new(2.0, 0.0, 0.0)),
            Some(root),
        );
        graph.add_node(
            Node::new("Comp_Screen")
                .with_translation(Vector3::new(0.0, 1.0, 0.0))
                .with_geometry(Geometry::quad(0.4, 0.25)),
            Some(computer),
        );

        let configs = [StageConfig::tv(), StageConfig::computer()]
            .into_iter()
            .map(|mut c| {
                c.duration_in = 0.0;
                c.duration_out = 0.0;
                c
            })
            .collect();
        let mut nav = Navigation::new(StageRegistry::new(configs).unwrap());
        nav.bind_model(&graph, root);

        let mut overlays =
            OverlaySynchronizer::new(vec![OverlayConfig::tv(), OverlayConfig::computer()]).unwrap();
        overlays.attach(&graph, nav.registry());

        let camera = OrbitCamera::new(Vector3::new(6.0, 3.0, 10.0), Vector3::zero(), 1.0);
        let rig = CameraManager::new(camera, Some(OrbitControls::new(Vector3::zero())));
        Fixture {
            graph,
            rig,
            nav,
            overlays,
        }
    }

    impl Fixture {
        fn frame(&mut self) {
            self.nav.update(0.016, &self.graph, &mut self.rig);
            self.overlays.update(&self.nav, &self.rig.camera, &self.graph);
        }

        fn visible(&self, stage: &str) -> bool {
            self.overlays.get(&stage.into()).unwrap().is_visible()
        }

        fn interactive(&self, stage: &str) -> bool {
            self.overlays.get(&stage.into()).unwrap().is_interactive()
        }
    }

    #[test]
    fn test_attach_places_overlays() {
        let fx = fixture();
        for overlay in fx.overlays.iter() {
            assert!(overlay.screen().is_some());
            assert!(overlay.placement().is_some());
            assert!(!overlay.is_visible());
        }
    }

    #[test]
    fn test_only_focused_stage_is_visible() {
        let mut fx = fixture();
        fx.nav.focus_stage(&"tv".into(), &fx.graph, &mut fx.rig);
        fx.overlays.update(&fx.nav, &fx.rig.camera, &fx.graph);
        // Still entering
        assert!(!fx.visible("tv"));

        fx.frame();
        assert!(fx.visible("tv"));
        assert!(!fx.visible("computer"));

        fx.nav.escape(&mut fx.rig);
        fx.frame();
        assert!(!fx.visible("tv"));
        assert!(!fx.visible("computer"));
    }

    #[test]
    fn test_interactivity_needs_visibility_and_hover() {
        let mut fx = fixture();
        fx.nav.focus_stage(&"computer".into(), &fx.graph, &mut fx.rig);
        fx.frame();
        assert!(fx.visible("computer"));

        // No pointer yet
        assert!(!fx.interactive("computer"));

        // Pointer straight through the view center lands on the framed screen
        fx.overlays.set_pointer(Vector2::new(0.0, 0.0));
        fx.frame();
        assert!(fx.interactive("computer"));
        assert_eq!(
            fx.overlays.interactive_overlay().map(|o| o.stage().as_str()),
            Some("computer")
        );

        // Pointer at the corner misses the screen
        fx.overlays.set_pointer(Vector2::new(0.99, 0.99));
        fx.frame();
        assert!(fx.visible("computer"));
        assert!(!fx.interactive("computer"));

        // Back on the screen but no longer focused
        fx.overlays.set_pointer(Vector2::new(0.0, 0.0));
        fx.nav.escape(&mut fx.rig);
        fx.frame();
        assert!(!fx.interactive("computer"));
        assert!(fx.overlays.interactive_overlay().is_none());
    }

    #[test]
    fn test_other_stage_overlay_ignores_hover() {
        let mut fx = fixture();
        fx.nav.focus_stage(&"computer".into(), &fx.graph, &mut fx.rig);
        fx.frame();
        assert!(fx.visible("computer"));

        // Turn the camera onto the tv screen while computer stays focused
        fx.rig.camera.eye = Vector3::new(-2.0, 1.0, 4.0);
        fx.rig.camera.look_at(Vector3::new(-2.0, 1.0, 0.0));
        fx.overlays.set_pointer(Vector2::new(0.0, 0.0));

        let tv_screen = fx.overlays.get(&"tv".into()).unwrap().screen().unwrap();
        let ray = fx.rig.camera.ray_from_ndc(Vector2::new(0.0, 0.0));
        assert!(!fx.graph.raycast(&ray, tv_screen).is_empty());

        fx.frame();
        assert_eq!(fx.nav.state(), NavigationState::Focused);
        assert_eq!(fx.nav.active_stage(), Some(&"computer".into()));
        assert!(!fx.visible("tv"));
        assert!(!fx.interactive("tv"));
        assert!(!fx.interactive("computer"));
        assert!(fx.overlays.interactive_overlay().is_none());
    }

    #[test]
    fn test_hidden_screen_is_not_hoverable() {
        let mut fx = fixture();
        fx.nav.focus_stage(&"computer".into(), &fx.graph, &mut fx.rig);
        fx.frame();
        fx.overlays.set_pointer(Vector2::new(0.0, 0.0));

        let screen = fx.overlays.get(&"computer".into()).unwrap().screen().unwrap();
        fx.graph.set_visible(screen, false);
        fx.frame();
        assert!(!fx.interactive("computer"));
    }

    #[test]
    fn test_overlay_without_screen_stays_hidden() {
        let mut graph = SceneGraph::new();
        let root = graph.add_node(Node::new("Room"), None);
        graph.add_node(
            Node::new("TV_Third").with_geometry(Geometry::cuboid([-0.5, 0.0, -0.5], [0.5, 1.0, 0.5])),
            Some(root),
        );
        let mut nav = Navigation::new(StageRegistry::new(vec![StageConfig::tv()]).unwrap());
        nav.bind_model(&graph, root);
        let mut overlays = OverlaySynchronizer::new(vec![OverlayConfig::tv()]).unwrap();
        overlays.attach(&graph, nav.registry());

        let camera = OrbitCamera::new(Vector3::new(6.0, 3.0, 10.0), Vector3::zero(), 1.0);
        let mut rig = CameraManager::new(camera, None);
        nav.focus_stage(&"tv".into(), &graph, &mut rig);
        nav.update(10.0, &graph, &mut rig);
        assert_eq!(nav.state(), NavigationState::Focused);

        overlays.update(&nav, &rig.camera, &graph);
        assert!(!overlays.get(&"tv".into()).unwrap().is_visible());
        assert_ne!(rig.pose(), CameraPose::new(Vector3::new(6.0, 3.0, 10.0), Vector3::zero()));
    }
}
