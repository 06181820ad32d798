// VIEW: GPU acquisition
pub mod gpu_init;

pub use gpu_init::GpuContext;
