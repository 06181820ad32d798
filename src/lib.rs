// Re-export all public modules so they can be used from main.rs
pub mod logging;
pub mod render;
pub mod ui;
pub mod utils;

// MVC Architecture
pub mod controller;
pub mod model;
pub mod view;

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::wasm_bindgen;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Event, EventTarget, Window};

/// A registered DOM listener, removed again on drop so registration and
/// teardown stay paired across remounts.
pub struct ListenerHandle {
    target: EventTarget,
    name: &'static str,
    closure: Closure<dyn FnMut(Event)>,
}

impl ListenerHandle {
    pub fn add(
        target: &EventTarget,
        name: &'static str,
        f: impl FnMut(Event) + 'static,
    ) -> Result<Self, JsValue> {
        let closure = Closure::wrap(Box::new(f) as Box<dyn FnMut(Event)>);
        target.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref())?;
        Ok(Self {
            target: target.clone(),
            name,
            closure,
        })
    }
}

impl Drop for ListenerHandle {
    fn drop(&mut self) {
        let _ = self
            .target
            .remove_event_listener_with_callback(self.name, self.closure.as_ref().unchecked_ref());
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn start() -> Result<(), JsValue> {
    logging::init();
    let (window, document, canvas) = init_canvas()?;
    setup_app(&window, &document, &canvas).await
}

/// Main application setup for WASM
#[cfg(target_arch = "wasm32")]
async fn setup_app(
    window: &Window,
    document: &web_sys::Document,
    canvas: &web_sys::HtmlCanvasElement,
) -> Result<(), JsValue> {
    use crate::controller::{
        CameraUniform, EventQueue, FrameLoopContext, GameState, InputState, LightingUniform,
        PlayerController, WeaponViewModel,
    };
    use crate::model::{Camera, Level, EYE_HEIGHT};
    use crate::view::GpuContext;
    use glam::Vec3;

    let width = canvas.width();
    let height = canvas.height();

    // Initialize GPU
    let gpu = GpuContext::new(canvas, width, height)
        .await
        .map_err(|e| js_error(format!("GPU init failed: {e:?}")))?;
    tracing::info!("GPU ready, {width}x{height} canvas");

    // Camera starts behind the central block, facing it
    let cam = Rc::new(RefCell::new(Camera::new(width, height)));
    cam.borrow_mut().set_look_at(Vec3::new(0.0, EYE_HEIGHT, 0.0));

    // Camera, lighting buffers & bind groups
    let camera_resources = render::create_camera_resources(gpu.device.as_ref());
    let cam_buf = camera_resources.camera_buffer;
    let cam_bgl = camera_resources.bind_group_layout;
    let cam_bg = camera_resources.camera_bind_group;

    let cam_buf_data = Rc::new(RefCell::new(CameraUniform {
        view_proj: (cam.borrow().view_proj()).to_cols_array_2d(),
    }));
    gpu.queue.as_ref().write_buffer(&cam_buf, 0, bytemuck::bytes_of(&*cam_buf_data.borrow()));

    let lighting_buf_data = Rc::new(RefCell::new(LightingUniform::arena_daylight()));
    let lighting_buf = camera_resources.lighting_buffer;
    gpu.queue.as_ref().write_buffer(&lighting_buf, 0, bytemuck::bytes_of(&*lighting_buf_data.borrow()));

    // Depth texture
    let depth_format = wgpu::TextureFormat::Depth32Float;
    let (_depth_tex, depth_view) = render::create_depth_texture(gpu.device.as_ref(), width, height);
    let depth_view_cell: Rc<RefCell<wgpu::TextureView>> = Rc::new(RefCell::new(depth_view));

    // Per-draw transforms (identity for the level, per-frame for the weapon)
    let transforms = render::create_transform_resources(gpu.device.as_ref());

    let pipeline = render::create_scene_pipeline(
        gpu.device.as_ref(),
        gpu.format,
        &cam_bgl,
        &transforms.bind_group_layout,
        depth_format,
    );

    // Retained scene: level baked to world space once, weapon in local space
    let level_mesh = Level::arena().to_mesh().upload(gpu.device.as_ref());
    let weapon_mesh = WeaponViewModel::mesh().upload(gpu.device.as_ref());

    // Session state
    let game_state = Rc::new(RefCell::new(GameState::new()));
    let input_state = Rc::new(RefCell::new(InputState::new()));
    let event_queue = EventQueue::new();
    let egui_events: Rc<RefCell<Vec<egui::Event>>> = Rc::new(RefCell::new(Vec::new()));

    // egui setup
    let egui_ctx = egui::Context::default();
    let egui_renderer = egui_wgpu::Renderer::new(gpu.device.as_ref(), gpu.format, egui_wgpu::RendererOptions::default());

    let listeners = setup_input_listeners(
        document,
        window,
        canvas,
        event_queue.clone(),
        game_state.clone(),
        egui_events.clone(),
    )?;

    let mut render_state = render::RenderState {
        format: gpu.format,
        alpha_mode: gpu.config.alpha_mode,
        width,
        height,
        pipeline,
        level_mesh,
        weapon_mesh,
        egui_renderer,
        egui_primitives: None,
        egui_full_output: None,
        egui_dpr: 1.0,
    };

    let mut frame_ctx = FrameLoopContext {
        cam: cam.clone(),
        cam_buf,
        cam_buf_data,
        lighting_buf,
        lighting_buf_data,
        weapon_buf: transforms.weapon_buffer,
        depth_view_cell,
        event_queue,
        input_state,
        game_state,
        player: PlayerController::new(),
        weapon: WeaponViewModel::new(),
        egui_ctx,
        egui_events,
        listeners,
        last_time: Rc::new(RefCell::new(window.performance().map(|p| p.now()).unwrap_or(0.0))),
    };

    let level_bg = transforms.level_bind_group;
    let weapon_bg = transforms.weapon_bind_group;

    tracing::info!("session wired, entering frame loop");

    // Continuous redraw using requestAnimationFrame
    let f = RcCellCallback::new(window.clone(), {
        let window_for_loop = window.clone();

        move || {
            frame_ctx.update(gpu.device.as_ref(), gpu.queue.as_ref(), &window_for_loop, &gpu.surface, &mut render_state);

            let dv = frame_ctx.depth_view_cell.borrow();
            render_state.draw_frame(
                gpu.device.as_ref(),
                gpu.queue.as_ref(),
                &gpu.surface,
                &dv,
                &cam_bg,
                &level_bg,
                &weapon_bg,
            );
        }
    });
    f.start();

    Ok(())
}

/// Wire every DOM listener into the session-owned event queue. The returned
/// guards keep the listeners alive; dropping them unregisters everything.
#[cfg(target_arch = "wasm32")]
fn setup_input_listeners(
    document: &web_sys::Document,
    window: &Window,
    canvas: &web_sys::HtmlCanvasElement,
    queue: controller::EventQueue,
    game_state: Rc<RefCell<controller::GameState>>,
    egui_events: Rc<RefCell<Vec<egui::Event>>>,
) -> Result<Vec<ListenerHandle>, JsValue> {
    use crate::controller::{InputEvent, KeyMap, MouseButton};
    use web_sys::{HtmlElement, KeyboardEvent, MouseEvent};

    let mut listeners = Vec::new();

    // Keyboard down
    {
        let queue = queue.clone();
        let keymap = KeyMap::default();
        let document_for_exit = document.clone();
        listeners.push(ListenerHandle::add(document.as_ref(), "keydown", move |e: Event| {
            let e: KeyboardEvent = e.unchecked_into();
            let key = e.key();

            if key == "Escape" {
                document_for_exit.exit_pointer_lock();
            }
            // Keep recognized movement keys away from the browser
            if keymap.action(&key).is_some() {
                e.prevent_default();
            }

            queue.push(InputEvent::KeyDown(key));
        })?);
    }

    // Keyboard up
    {
        let queue = queue.clone();
        listeners.push(ListenerHandle::add(document.as_ref(), "keyup", move |e: Event| {
            let e: KeyboardEvent = e.unchecked_into();
            queue.push(InputEvent::KeyUp(e.key()));
        })?);
    }

    // Focus loss - clear all keys
    {
        let queue = queue.clone();
        listeners.push(ListenerHandle::add(window.as_ref(), "blur", move |_e: Event| {
            queue.push(InputEvent::FocusLost);
        })?);
    }

    // Visibility change - clear all keys
    {
        let queue = queue.clone();
        listeners.push(ListenerHandle::add(document.as_ref(), "visibilitychange", move |_e: Event| {
            queue.push(InputEvent::FocusLost);
        })?);
    }

    // Pointer lock change
    {
        let queue = queue.clone();
        let doc = document.clone();
        listeners.push(ListenerHandle::add(document.as_ref(), "pointerlockchange", move |_e: Event| {
            queue.push(InputEvent::PointerLockChanged {
                locked: doc.pointer_lock_element().is_some(),
            });
        })?);
    }

    // Canvas click enters pointer lock, but only once the game has started
    {
        let canvas_click = canvas.clone();
        listeners.push(ListenerHandle::add(canvas.as_ref(), "click", move |_e: Event| {
            if game_state.borrow().started() {
                if let Ok(html_el) = canvas_click.clone().dyn_into::<HtmlElement>() {
                    html_el.request_pointer_lock();
                }
            }
        })?);
    }

    // Mouse move: look input while locked, egui cursor otherwise
    {
        let queue = queue.clone();
        let doc = document.clone();
        let egui_events = egui_events.clone();
        listeners.push(ListenerHandle::add(document.as_ref(), "mousemove", move |e: Event| {
            let e: MouseEvent = e.unchecked_into();
            if doc.pointer_lock_element().is_some() {
                queue.push(InputEvent::MouseMove {
                    dx: e.movement_x() as f32,
                    dy: e.movement_y() as f32,
                });
            } else {
                let pos = egui::pos2(e.client_x() as f32, e.client_y() as f32);
                egui_events.borrow_mut().push(egui::Event::PointerMoved(pos));
            }
        })?);
    }

    // Mouse down: fire edge, plus egui click-through while unlocked
    {
        let queue = queue.clone();
        let doc = document.clone();
        let egui_events = egui_events.clone();
        listeners.push(ListenerHandle::add(document.as_ref(), "mousedown", move |e: Event| {
            let e: MouseEvent = e.unchecked_into();
            queue.push(InputEvent::MouseDown(MouseButton::from_web_button(e.button())));
            if doc.pointer_lock_element().is_none() {
                egui_events.borrow_mut().push(pointer_button_event(&e, true));
            }
        })?);
    }

    // Mouse up
    {
        let queue = queue.clone();
        let doc = document.clone();
        let egui_events = egui_events.clone();
        listeners.push(ListenerHandle::add(document.as_ref(), "mouseup", move |e: Event| {
            let e: MouseEvent = e.unchecked_into();
            queue.push(InputEvent::MouseUp(MouseButton::from_web_button(e.button())));
            if doc.pointer_lock_element().is_none() {
                egui_events.borrow_mut().push(pointer_button_event(&e, false));
            }
        })?);
    }

    // Context menu prevention
    {
        listeners.push(ListenerHandle::add(document.as_ref(), "contextmenu", move |e: Event| {
            e.prevent_default();
        })?);
    }

    Ok(listeners)
}

#[cfg(target_arch = "wasm32")]
fn pointer_button_event(e: &web_sys::MouseEvent, pressed: bool) -> egui::Event {
    let button = match e.button() {
        1 => egui::PointerButton::Middle,
        2 => egui::PointerButton::Secondary,
        _ => egui::PointerButton::Primary,
    };
    egui::Event::PointerButton {
        pos: egui::pos2(e.client_x() as f32, e.client_y() as f32),
        button,
        pressed,
        modifiers: egui::Modifiers::default(),
    }
}

#[cfg(target_arch = "wasm32")]
fn init_canvas() -> Result<(Window, web_sys::Document, web_sys::HtmlCanvasElement), JsValue> {
    let window = web_sys::window().ok_or(js_error("no global `window`"))?;
    let document = window.document().ok_or(js_error("no document on window"))?;
    let body = document.body().ok_or(js_error("no body on document"))?;

    // Fill the viewport; per-frame resize handling keeps it current
    let width = window.inner_width()?.as_f64().unwrap_or(800.0) as u32;
    let height = window.inner_height()?.as_f64().unwrap_or(600.0) as u32;

    let canvas_el = document
        .create_element("canvas")?
        .dyn_into::<web_sys::HtmlCanvasElement>()
        .map_err(|_| js_error("failed to create canvas"))?;
    canvas_el.set_width(width);
    canvas_el.set_height(height);
    body.append_child(&canvas_el)?;
    Ok((window, document, canvas_el))
}

#[cfg(target_arch = "wasm32")]
fn js_error<E: Into<String>>(msg: E) -> JsValue {
    JsValue::from_str(&msg.into())
}

struct RcCellCallback {
    inner: Rc<RefCell<Box<dyn FnMut()>>>,
    window: Window,
}

impl RcCellCallback {
    fn new(window: Window, f: impl FnMut() + 'static) -> Self {
        Self {
            inner: Rc::new(RefCell::new(Box::new(f))),
            window,
        }
    }

    fn start(self) {
        let inner = self.inner.clone();
        let window = self.window.clone();

        let callback = Rc::new(RefCell::new(None::<Closure<dyn FnMut()>>));
        let callback_clone = callback.clone();

        *callback.borrow_mut() = Some(Closure::wrap(Box::new(move || {
            inner.borrow_mut().as_mut()();

            // Recursively schedule next frame
            let cb_ref = callback_clone.borrow();
            window
                .request_animation_frame(cb_ref.as_ref().unwrap().as_ref().unchecked_ref())
                .expect("RAF failed");
        }) as Box<dyn FnMut()>));

        self.window
            .request_animation_frame(
                callback.borrow().as_ref().unwrap().as_ref().unchecked_ref(),
            )
            .expect("RAF start failed");

        // Keep the schedule-next-frame cycle alive for the session lifetime
        std::mem::forget(callback);
    }
}
