//! Mock device implementations for testing and development.
//!
//! This module provides simulated devices that can be controlled
//! programmatically without requiring physical hardware.

pub mod outputs;
pub mod tag_sensor;

// Re-export commonly used types
pub use outputs::{MockSignalOutputs, MockSignalOutputsHandle, SignalChange};
pub use tag_sensor::{MockTagSensor, MockTagSensorHandle};
