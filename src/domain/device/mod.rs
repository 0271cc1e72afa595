//! Device domain module

mod name;
mod registry;

pub use name::{sanitize_device_name, MAX_DEVICE_NAME_LEN, UNKNOWN_DEVICE};
pub use registry::{Device, DeviceRegistry};
