use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use glam::Vec3;
use winit::{
    event::*,
    event_loop::EventLoop,
    keyboard::{KeyCode, PhysicalKey},
    window::Window,
};

// Import from the library crate
use skirmish::{controller, logging, model, render, ui, view};

use controller::{
    CameraUniform, EventQueue, GameState, InputEvent, InputState, LightingUniform, MouseButton,
    PlayerController, TransformUniform, WeaponViewModel,
};
use model::{Camera, Level, EYE_HEIGHT};
use view::GpuContext;

struct App {
    // Core GPU resources
    surface: wgpu::Surface<'static>,
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    config: wgpu::SurfaceConfiguration,
    window: Arc<Window>,

    // Rendering state
    render_state: render::RenderState,
    depth_view: wgpu::TextureView,
    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
    lighting_buffer: wgpu::Buffer,
    lighting_data: LightingUniform,
    level_bind_group: wgpu::BindGroup,
    weapon_buffer: wgpu::Buffer,
    weapon_bind_group: wgpu::BindGroup,

    // egui
    egui_state: egui_winit::State,
    egui_ctx: egui::Context,

    // Game state
    camera: Camera,
    game_state: Rc<RefCell<GameState>>,
    input_state: InputState,
    event_queue: EventQueue,
    player: PlayerController,
    weapon: WeaponViewModel,

    // Input handling
    mouse_locked: bool,

    // Frame timing
    start_time: std::time::Instant,
    last_frame_time: std::time::Instant,
}

impl App {
    async fn new(window: Arc<Window>) -> Self {
        let size = window.inner_size();

        let gpu = GpuContext::new_native(window.clone(), size.width, size.height).await;
        let device = gpu.device.clone();
        let queue = gpu.queue.clone();
        let config = gpu.config.clone();

        // Create depth texture
        let depth_format = wgpu::TextureFormat::Depth32Float;
        let (_depth_texture, depth_view) = render::create_depth_texture(&device, size.width, size.height);

        // Camera starts behind the central block, facing it
        let mut camera = Camera::new(size.width, size.height);
        camera.set_look_at(Vec3::new(0.0, EYE_HEIGHT, 0.0));

        // Camera, lighting buffers & bind groups
        let camera_resources = render::create_camera_resources(&device);
        let camera_buffer = camera_resources.camera_buffer;
        let lighting_buffer = camera_resources.lighting_buffer;
        let camera_bgl = camera_resources.bind_group_layout;
        let camera_bind_group = camera_resources.camera_bind_group;

        let cam_buf_data = CameraUniform {
            view_proj: camera.view_proj().to_cols_array_2d(),
        };
        queue.write_buffer(&camera_buffer, 0, bytemuck::bytes_of(&cam_buf_data));

        let lighting_data = LightingUniform::arena_daylight();
        queue.write_buffer(&lighting_buffer, 0, bytemuck::bytes_of(&lighting_data));

        // Per-draw transforms and the scene pipeline
        let transforms = render::create_transform_resources(&device);
        let pipeline = render::create_scene_pipeline(
            &device,
            config.format,
            &camera_bgl,
            &transforms.bind_group_layout,
            depth_format,
        );

        let level_mesh = Level::arena().to_mesh().upload(&device);
        let weapon_mesh = WeaponViewModel::mesh().upload(&device);

        // Initialize egui
        let egui_ctx = egui::Context::default();
        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            None,
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(
            &device,
            config.format,
            egui_wgpu::RendererOptions::default(),
        );

        let render_state = render::RenderState {
            format: config.format,
            alpha_mode: config.alpha_mode,
            width: size.width,
            height: size.height,
            pipeline,
            level_mesh,
            weapon_mesh,
            egui_renderer,
            egui_primitives: None,
            egui_full_output: None,
            egui_dpr: 1.0,
        };

        let now = std::time::Instant::now();

        Self {
            surface: gpu.surface,
            device,
            queue,
            config,
            window,
            render_state,
            depth_view,
            camera_buffer,
            camera_bind_group,
            lighting_buffer,
            lighting_data,
            level_bind_group: transforms.level_bind_group,
            weapon_buffer: transforms.weapon_buffer,
            weapon_bind_group: transforms.weapon_bind_group,
            egui_state,
            egui_ctx,
            camera,
            game_state: Rc::new(RefCell::new(GameState::new())),
            input_state: InputState::new(),
            event_queue: EventQueue::new(),
            player: PlayerController::new(),
            weapon: WeaponViewModel::new(),
            mouse_locked: false,
            start_time: now,
            last_frame_time: now,
        }
    }

    /// Milliseconds since launch, the native stand-in for the browser's
    /// frame clock.
    fn now_ms(&self) -> f64 {
        self.start_time.elapsed().as_secs_f64() * 1000.0
    }

    fn input(&mut self, event: &WindowEvent) -> bool {
        // egui sees everything first so the start overlay stays clickable
        let egui_captured = self.egui_state.on_window_event(self.window.as_ref(), event).consumed;

        match event {
            WindowEvent::KeyboardInput { event: KeyEvent { state, physical_key, .. }, .. } => {
                if let PhysicalKey::Code(code) = physical_key {
                    if *code == KeyCode::Escape && *state == ElementState::Pressed {
                        self.release_cursor();
                    }
                    if let Some(key) = logical_key(*code) {
                        let event = match state {
                            ElementState::Pressed => InputEvent::KeyDown(key.to_string()),
                            ElementState::Released => InputEvent::KeyUp(key.to_string()),
                        };
                        self.event_queue.push(event);
                    }
                }
                true
            }
            WindowEvent::MouseInput { state, button, .. } => {
                let mapped = match button {
                    winit::event::MouseButton::Left => MouseButton::Left,
                    winit::event::MouseButton::Right => MouseButton::Right,
                    _ => MouseButton::Middle,
                };
                match state {
                    ElementState::Pressed => {
                        // Fire edges come from anywhere, like the web listener
                        self.event_queue.push(InputEvent::MouseDown(mapped));
                        let may_lock = !egui_captured
                            && !self.mouse_locked
                            && self.game_state.borrow().started();
                        if mapped == MouseButton::Left && may_lock {
                            self.grab_cursor();
                        }
                    }
                    ElementState::Released => {
                        self.event_queue.push(InputEvent::MouseUp(mapped));
                    }
                }
                true
            }
            WindowEvent::Focused(false) => {
                self.event_queue.push(InputEvent::FocusLost);
                false
            }
            _ => egui_captured,
        }
    }

    fn grab_cursor(&mut self) {
        tracing::debug!("grabbing cursor for mouse look");
        let _ = self.window.set_cursor_visible(false);
        let _ = self
            .window
            .set_cursor_grab(winit::window::CursorGrabMode::Locked)
            .or_else(|_| self.window.set_cursor_grab(winit::window::CursorGrabMode::Confined));
        self.mouse_locked = true;
        self.event_queue.push(InputEvent::PointerLockChanged { locked: true });
    }

    fn release_cursor(&mut self) {
        let _ = self.window.set_cursor_visible(true);
        let _ = self.window.set_cursor_grab(winit::window::CursorGrabMode::None);
        self.mouse_locked = false;
        self.event_queue.push(InputEvent::PointerLockChanged { locked: false });
    }

    fn handle_mouse_motion(&mut self, dx: f64, dy: f64) {
        if self.mouse_locked {
            self.event_queue.push(InputEvent::MouseMove {
                dx: dx as f32,
                dy: dy as f32,
            });
        }
    }

    fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);

            let (_depth_texture, depth_view) =
                render::create_depth_texture(&self.device, new_size.width, new_size.height);
            self.depth_view = depth_view;

            self.camera.set_aspect(new_size.width, new_size.height);
            self.render_state.width = new_size.width;
            self.render_state.height = new_size.height;
        }
    }

    fn update(&mut self, dt: f32) {
        let now = self.now_ms();

        self.event_queue.drain_into(&mut self.input_state);

        let (dx, dy) = self.input_state.consume_look();
        self.player.apply_look(&mut self.camera, dx, dy);
        self.player.update(&mut self.camera, &self.input_state, dt);

        if self.input_state.take_fire() {
            self.weapon.trigger(now);
        }
        self.weapon.follow(&self.camera);

        // Camera uniform
        let cam_buf_data = CameraUniform {
            view_proj: self.camera.view_proj().to_cols_array_2d(),
        };
        self.queue.write_buffer(&self.camera_buffer, 0, bytemuck::bytes_of(&cam_buf_data));

        // Muzzle light mirrors the flash flag
        self.lighting_data
            .set_flash(self.weapon.muzzle_position(), self.weapon.flash_lit(now));
        self.queue.write_buffer(&self.lighting_buffer, 0, bytemuck::bytes_of(&self.lighting_data));

        // Weapon model transform
        let weapon_uniform = TransformUniform {
            transform: self.weapon.transform().to_cols_array_2d(),
        };
        self.queue.write_buffer(&self.weapon_buffer, 0, bytemuck::bytes_of(&weapon_uniform));
    }

    fn render(&mut self) {
        let raw_input = self.egui_state.take_egui_input(&self.window);
        let mut full_output = ui::build_ui(&self.egui_ctx, raw_input, &self.game_state);
        self.egui_state
            .handle_platform_output(&self.window, std::mem::take(&mut full_output.platform_output));

        let dpr = self.window.scale_factor() as f32;
        let primitives = self.egui_ctx.tessellate(std::mem::take(&mut full_output.shapes), dpr);
        self.render_state.egui_primitives = Some(primitives);
        self.render_state.egui_full_output = Some(full_output);
        self.render_state.egui_dpr = dpr;

        self.render_state.draw_frame(
            &self.device,
            &self.queue,
            &self.surface,
            &self.depth_view,
            &self.camera_bind_group,
            &self.level_bind_group,
            &self.weapon_bind_group,
        );
    }
}

/// Map physical keys onto the browser-style logical key names the input
/// tracker matches on.
fn logical_key(code: KeyCode) -> Option<&'static str> {
    match code {
        KeyCode::KeyW => Some("w"),
        KeyCode::KeyA => Some("a"),
        KeyCode::KeyS => Some("s"),
        KeyCode::KeyD => Some("d"),
        KeyCode::ShiftLeft | KeyCode::ShiftRight => Some("Shift"),
        _ => None,
    }
}

fn main() {
    logging::init();

    let event_loop = EventLoop::new().unwrap();
    let window_attributes = Window::default_attributes()
        .with_title("Skirmish")
        .with_inner_size(winit::dpi::LogicalSize::new(1280, 720));
    let window = event_loop.create_window(window_attributes).unwrap();
    let window = Arc::new(window);

    let mut app = pollster::block_on(App::new(window.clone()));
    tracing::info!("session ready, entering event loop");

    event_loop.run(move |event, elwt| {
        match event {
            Event::WindowEvent {
                ref event,
                window_id,
            } if window_id == app.window.id() => {
                if !app.input(event) {
                    match event {
                        WindowEvent::CloseRequested => elwt.exit(),
                        WindowEvent::Resized(physical_size) => {
                            app.resize(*physical_size);
                        }
                        WindowEvent::RedrawRequested => {
                            let now = std::time::Instant::now();
                            let dt = (now - app.last_frame_time).as_secs_f32().clamp(0.0, 0.1);
                            app.last_frame_time = now;

                            app.update(dt);
                            app.render();
                        }
                        _ => {}
                    }
                }
            }
            Event::DeviceEvent { event: winit::event::DeviceEvent::MouseMotion { delta }, .. } => {
                app.handle_mouse_motion(delta.0, delta.1);
            }
            Event::AboutToWait => {
                app.window.request_redraw();
            }
            _ => {}
        }
    }).unwrap();
}
