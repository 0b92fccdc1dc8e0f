//! Mock tag sensor implementation for testing and development.
//!
//! This module provides a simulated tag sensor that models the RF field of a
//! real transceiver: a tag can be placed in the field, halted, and removed.

use crate::{HardwareError, Result, traits::TagSensor};
use std::sync::Arc;
use tapgate_core::TagUid;
use tokio::sync::Mutex;

/// Mock tag sensor for testing and development.
///
/// The sensor reports a tag for as long as it sits in the field un-halted,
/// the same way a real transceiver answers a request command. Halting the tag
/// silences it until it is removed and presented again.
///
/// # Examples
///
/// ```
/// use tapgate_hardware::mock::MockTagSensor;
/// use tapgate_hardware::traits::TagSensor;
///
/// #[tokio::main]
/// async fn main() -> tapgate_hardware::Result<()> {
///     let (mut sensor, handle) = MockTagSensor::new();
///
///     handle.present_tag(vec![0x04, 0xA1, 0xB2, 0xC3]).await?;
///
///     let uid = sensor.poll_new_tag().await?.unwrap();
///     assert_eq!(uid.to_hex(), "04A1B2C3");
///
///     sensor.halt().await?;
///     assert!(sensor.poll_new_tag().await?.is_none());
///
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct MockTagSensor {
    /// Shared RF field state
    field: Arc<Mutex<Field>>,
}

impl MockTagSensor {
    /// Create a new mock sensor with the default name.
    ///
    /// Returns a tuple of (MockTagSensor, MockTagSensorHandle) where the
    /// handle can be used to simulate tag presentations.
    pub fn new() -> (Self, MockTagSensorHandle) {
        Self::with_name("Mock Tag Sensor".to_string())
    }

    /// Create a new mock sensor with a custom name.
    ///
    /// # Examples
    ///
    /// ```
    /// use tapgate_hardware::mock::MockTagSensor;
    ///
    /// let (sensor, handle) = MockTagSensor::with_name("Entry".to_string());
    /// assert_eq!(handle.name(), "Entry");
    /// ```
    pub fn with_name(name: String) -> (Self, MockTagSensorHandle) {
        let field = Arc::new(Mutex::new(Field::default()));

        let sensor = Self {
            field: Arc::clone(&field),
        };

        let handle = MockTagSensorHandle { field, name };

        (sensor, handle)
    }
}

impl TagSensor for MockTagSensor {
    async fn poll_new_tag(&mut self) -> Result<Option<TagUid>> {
        let mut field = self.field.lock().await;
        field.polls += 1;

        if let Some(message) = field.pending_failure.take() {
            return Err(HardwareError::tag_read(message));
        }

        Ok(field
            .tag
            .as_ref()
            .filter(|tag| !tag.halted)
            .map(|tag| tag.uid.clone()))
    }

    async fn halt(&mut self) -> Result<()> {
        let mut field = self.field.lock().await;
        field.halts += 1;

        if let Some(tag) = field.tag.as_mut() {
            tag.halted = true;
        }

        Ok(())
    }
}

/// RF field state shared between a sensor and its handle.
#[derive(Debug, Default)]
struct Field {
    /// Tag currently in the field
    tag: Option<TagInField>,

    /// Number of `poll_new_tag` calls
    polls: usize,

    /// Number of `halt` calls
    halts: usize,

    /// Error to return from the next poll
    pending_failure: Option<String>,
}

#[derive(Debug)]
struct TagInField {
    uid: TagUid,
    halted: bool,
}

/// Handle for controlling a mock tag sensor.
///
/// Cloned handles share the same field as the sensor they came from.
#[derive(Debug, Clone)]
pub struct MockTagSensorHandle {
    /// Shared RF field state
    field: Arc<Mutex<Field>>,

    /// Device name
    name: String,
}

impl MockTagSensorHandle {
    /// Place a tag in the field.
    ///
    /// Any tag already in the field is replaced.
    ///
    /// # Errors
    ///
    /// Returns an error if the UID is empty or longer than 10 bytes.
    pub async fn present_tag(&self, uid: Vec<u8>) -> Result<()> {
        let uid = TagUid::new(uid)?;
        self.field.lock().await.tag = Some(TagInField { uid, halted: false });
        Ok(())
    }

    /// Take the current tag out of the field.
    pub async fn remove_tag(&self) {
        self.field.lock().await.tag = None;
    }

    /// Make the next poll fail with a read error.
    pub async fn fail_next_read(&self, message: impl Into<String>) {
        self.field.lock().await.pending_failure = Some(message.into());
    }

    /// Check if a tag is in the field (halted or not).
    pub async fn is_tag_in_field(&self) -> bool {
        self.field.lock().await.tag.is_some()
    }

    /// Check if the tag in the field has been halted.
    pub async fn is_halted(&self) -> bool {
        self.field
            .lock()
            .await
            .tag
            .as_ref()
            .is_some_and(|tag| tag.halted)
    }

    /// Number of times the sensor has been polled.
    pub async fn poll_count(&self) -> usize {
        self.field.lock().await.polls
    }

    /// Number of times the sensor has been asked to halt.
    pub async fn halt_count(&self) -> usize {
        self.field.lock().await.halts
    }

    /// Get the device name.
    pub fn name(&self) -> &str {
        &self.name
    }
}
