use glam::Vec3;

use crate::controller::weapon::{MUZZLE_LIGHT_COLOR, MUZZLE_LIGHT_INTENSITY, MUZZLE_LIGHT_RANGE};

#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
}

#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightingUniform {
    pub sun_dir: [f32; 3],
    pub sun_intensity: f32,
    pub ambient: f32,
    pub _pad0: f32,
    pub _pad1: f32,
    pub _pad2: f32,
    pub flash_pos: [f32; 3],
    pub flash_intensity: f32,
    pub flash_color: [f32; 3],
    pub flash_range: f32,
}

#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TransformUniform {
    pub transform: [[f32; 4]; 4],
}

impl LightingUniform {
    /// Fixed arena daylight: sun from (10, 20, 10), flat ambient, muzzle
    /// flash off.
    pub fn arena_daylight() -> Self {
        let sun = Vec3::new(10.0, 20.0, 10.0).normalize();
        Self {
            sun_dir: sun.to_array(),
            sun_intensity: 1.0,
            ambient: 0.5,
            _pad0: 0.0,
            _pad1: 0.0,
            _pad2: 0.0,
            flash_pos: [0.0; 3],
            flash_intensity: 0.0,
            flash_color: MUZZLE_LIGHT_COLOR,
            flash_range: MUZZLE_LIGHT_RANGE,
        }
    }

    /// Mirror the muzzle flash flag into the light each frame.
    pub fn set_flash(&mut self, position: Vec3, lit: bool) {
        self.flash_pos = position.to_array();
        self.flash_intensity = if lit { MUZZLE_LIGHT_INTENSITY } else { 0.0 };
    }
}

#[cfg(target_arch = "wasm32")]
pub use wasm::FrameLoopContext;

#[cfg(target_arch = "wasm32")]
mod wasm {
    use std::cell::RefCell;
    use std::rc::Rc;

    use web_sys::Window;
    use wgpu::{Device, Queue, Surface, TextureView};

    use super::{CameraUniform, LightingUniform, TransformUniform};
    use crate::controller::input::{EventQueue, InputState};
    use crate::controller::player::PlayerController;
    use crate::controller::session::GameState;
    use crate::controller::weapon::WeaponViewModel;
    use crate::model::Camera;
    use crate::render::RenderState;
    use crate::ui;

    /// Main game loop state and update logic
    pub struct FrameLoopContext {
        pub cam: Rc<RefCell<Camera>>,
        pub cam_buf: wgpu::Buffer,
        pub cam_buf_data: Rc<RefCell<CameraUniform>>,
        pub lighting_buf: wgpu::Buffer,
        pub lighting_buf_data: Rc<RefCell<LightingUniform>>,
        pub weapon_buf: wgpu::Buffer,
        pub depth_view_cell: Rc<RefCell<TextureView>>,
        pub event_queue: EventQueue,
        pub input_state: Rc<RefCell<InputState>>,
        pub game_state: Rc<RefCell<GameState>>,
        pub player: PlayerController,
        pub weapon: WeaponViewModel,
        pub egui_ctx: egui::Context,
        pub egui_events: Rc<RefCell<Vec<egui::Event>>>,
        /// DOM listener guards; dropping the context unregisters them all
        pub listeners: Vec<crate::ListenerHandle>,
        pub last_time: Rc<RefCell<f64>>,
    }

    impl FrameLoopContext {
        /// Advance input, movement, and the weapon by one frame, then stage
        /// uniforms and the HUD for rendering.
        pub fn update(
            &mut self,
            device: &Device,
            queue: &Queue,
            window: &Window,
            surface: &Surface,
            render_state: &mut RenderState,
        ) {
            // Time step
            let now = window.performance().map(|p| p.now()).unwrap_or(0.0);
            let mut last = self.last_time.borrow_mut();
            let dt = ((now - *last) / 1000.0).clamp(0.0, 0.1) as f32;
            *last = now;
            drop(last);

            // All event-callback writes funnel through the queue, so state
            // only ever mutates inside this pass
            self.event_queue.drain_into(&mut self.input_state.borrow_mut());

            let (dx, dy) = self.input_state.borrow_mut().consume_look();
            self.player.apply_look(&mut self.cam.borrow_mut(), dx, dy);

            {
                let input = self.input_state.borrow();
                self.player.update(&mut self.cam.borrow_mut(), &input, dt);
            }

            if self.input_state.borrow_mut().take_fire() {
                self.weapon.trigger(now);
            }
            self.weapon.follow(&self.cam.borrow());

            // Resize handling
            self.handle_resize(window, device, surface, render_state);

            // Update camera uniform
            self.cam_buf_data.borrow_mut().view_proj =
                self.cam.borrow().view_proj().to_cols_array_2d();
            queue.write_buffer(&self.cam_buf, 0, bytemuck::bytes_of(&*self.cam_buf_data.borrow()));

            // Muzzle light follows the weapon; visibility mirrors the flash flag
            self.lighting_buf_data
                .borrow_mut()
                .set_flash(self.weapon.muzzle_position(), self.weapon.flash_lit(now));
            queue.write_buffer(&self.lighting_buf, 0, bytemuck::bytes_of(&*self.lighting_buf_data.borrow()));

            // Weapon model transform
            let weapon_uniform = TransformUniform {
                transform: self.weapon.transform().to_cols_array_2d(),
            };
            queue.write_buffer(&self.weapon_buf, 0, bytemuck::bytes_of(&weapon_uniform));

            // Build egui input from queued events
            let dpr = window.device_pixel_ratio() as f32;
            let mut raw_input = egui::RawInput::default();
            raw_input.time = Some(now / 1000.0);
            raw_input.screen_rect = Some(egui::Rect::from_min_size(
                egui::Pos2::new(0.0, 0.0),
                egui::vec2(
                    render_state.width as f32 / dpr,
                    render_state.height as f32 / dpr,
                ),
            ));
            raw_input.events.extend(self.egui_events.borrow_mut().drain(..));
            self.egui_ctx.set_pixels_per_point(dpr);

            // Build UI and store output for rendering
            let mut full_output = ui::build_ui(&self.egui_ctx, raw_input, &self.game_state);

            let primitives = self.egui_ctx.tessellate(std::mem::take(&mut full_output.shapes), dpr);
            render_state.egui_primitives = Some(primitives);
            render_state.egui_full_output = Some(full_output);
            render_state.egui_dpr = dpr;
        }

        fn handle_resize(
            &self,
            window: &Window,
            device: &Device,
            surface: &Surface,
            render_state: &mut RenderState,
        ) {
            if let (Ok(w), Ok(h)) = (window.inner_width(), window.inner_height()) {
                let nw = w.as_f64().unwrap_or(800.0) as u32;
                let nh = h.as_f64().unwrap_or(600.0) as u32;
                if nw != render_state.width || nh != render_state.height {
                    self.cam.borrow_mut().set_aspect(nw, nh);
                    render_state.width = nw;
                    render_state.height = nh;

                    let config = wgpu::SurfaceConfiguration {
                        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
                        format: render_state.format,
                        width: nw,
                        height: nh,
                        present_mode: wgpu::PresentMode::Fifo,
                        alpha_mode: render_state.alpha_mode,
                        view_formats: vec![],
                        desired_maximum_frame_latency: 2,
                    };
                    surface.configure(device, &config);

                    let (_, depth_view) = crate::render::create_depth_texture(device, nw, nh);
                    *self.depth_view_cell.borrow_mut() = depth_view;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lighting_defaults() {
        let lighting = LightingUniform::arena_daylight();
        let len: f32 = lighting.sun_dir.iter().map(|c| c * c).sum::<f32>().sqrt();
        assert!((len - 1.0).abs() < 1e-5, "sun direction is normalized");
        assert_eq!(lighting.flash_intensity, 0.0, "flash starts dark");
        assert_eq!(lighting.ambient, 0.5);
    }

    #[test]
    fn test_flash_mirrors_flag() {
        let mut lighting = LightingUniform::arena_daylight();
        lighting.set_flash(Vec3::new(1.0, 2.0, 3.0), true);
        assert_eq!(lighting.flash_pos, [1.0, 2.0, 3.0]);
        assert!(lighting.flash_intensity > 0.0);

        lighting.set_flash(Vec3::ZERO, false);
        assert_eq!(lighting.flash_intensity, 0.0);
    }

    #[test]
    fn test_uniform_sizes_match_shader_layout() {
        assert_eq!(std::mem::size_of::<CameraUniform>(), 64);
        assert_eq!(std::mem::size_of::<LightingUniform>(), 64);
        assert_eq!(std::mem::size_of::<TransformUniform>(), 64);
    }
}
