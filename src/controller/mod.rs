// CONTROLLER: Input, game logic, and update loop
pub mod frame_loop;
pub mod input;
pub mod player;
pub mod session;
pub mod weapon;

pub use frame_loop::{CameraUniform, LightingUniform, TransformUniform};
#[cfg(target_arch = "wasm32")]
pub use frame_loop::FrameLoopContext;
pub use input::{Action, EventQueue, InputEvent, InputState, KeyMap, MouseButton};
pub use player::{MovementObserver, PlayerController};
pub use session::GameState;
pub use weapon::WeaponViewModel;
