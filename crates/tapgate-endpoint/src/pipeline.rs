//! Tap event pipeline.
//!
//! For each newly presented tag the pipeline builds one [`TapEvent`], asks
//! the decision service about it, renders the matching feedback and then
//! halts the tag. The halt is what makes a held tag count once: the sensor
//! stays silent about it until it leaves the field and comes back.

use tapgate_core::{AuthorizationResult, Direction, ReaderId, TagUid, TapEvent};
use tapgate_hardware::{SignalOutputs, TagSensor};
use tapgate_network::{AuthorizationClient, Transport};
use tracing::{info, warn};

use crate::boot;
use crate::error::Result;
use crate::feedback::{FeedbackController, FeedbackKind};

/// A tag sensor bound to its reader position.
#[derive(Debug)]
pub struct TagReader<S> {
    id: ReaderId,
    sensor: S,
}

impl<S: TagSensor> TagReader<S> {
    /// Bind a sensor to a reader position.
    pub fn new(id: ReaderId, sensor: S) -> Self {
        Self { id, sensor }
    }

    /// Reader position.
    pub fn id(&self) -> ReaderId {
        self.id
    }

    /// Direction of taps on this reader.
    pub fn direction(&self) -> Direction {
        self.id.direction()
    }

    /// Get a reference to the sensor.
    pub fn sensor(&self) -> &S {
        &self.sensor
    }

    /// Poll for a new tag, treating read errors as an empty field.
    pub async fn poll(&mut self) -> Option<TagUid> {
        match self.sensor.poll_new_tag().await {
            Ok(uid) => uid,
            Err(e) => {
                warn!(reader = %self.id, error = %e, "Tag read failed");
                None
            }
        }
    }

    /// Halt the tag just processed. Failures are logged only.
    pub async fn halt(&mut self) {
        if let Err(e) = self.sensor.halt().await {
            warn!(reader = %self.id, error = %e, "Failed to halt tag");
        }
    }
}

/// Result of one processed tap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TapOutcome {
    pub event: TapEvent,
    pub result: AuthorizationResult,
}

/// Tap pipeline
///
/// Owns the authorization client and the feedback controller. The main loop
/// borrows the controller between taps to render hazard sequences.
#[derive(Debug)]
pub struct TapPipeline<T, O> {
    client: AuthorizationClient<T>,
    feedback: FeedbackController<O>,
}

impl<T: Transport, O: SignalOutputs> TapPipeline<T, O> {
    /// Create a pipeline.
    pub fn new(client: AuthorizationClient<T>, feedback: FeedbackController<O>) -> Self {
        Self { client, feedback }
    }

    /// Get a reference to the authorization client.
    pub fn client(&self) -> &AuthorizationClient<T> {
        &self.client
    }

    /// Get a reference to the feedback controller.
    pub fn feedback(&self) -> &FeedbackController<O> {
        &self.feedback
    }

    /// Get a mutable reference to the feedback controller.
    pub fn feedback_mut(&mut self) -> &mut FeedbackController<O> {
        &mut self.feedback
    }

    /// Run the power-on sequence on this pipeline's link and outputs.
    ///
    /// # Errors
    ///
    /// Returns the first output failure.
    pub async fn boot(&mut self) -> Result<()> {
        boot::await_link(self.client.transport(), &mut self.feedback).await
    }

    /// Service one reader.
    ///
    /// Returns `None` when the reader had no new tag. Otherwise the tap has
    /// been submitted, its feedback fully rendered and the tag halted.
    pub async fn service<S: TagSensor>(&mut self, reader: &mut TagReader<S>) -> Option<TapOutcome> {
        let uid = reader.poll().await?;
        let event = TapEvent::new(reader.id(), uid);
        info!(
            uid = %event.uid,
            direction = %event.direction,
            reader = %event.reader,
            "tag_detected"
        );

        let result = self.client.submit_tap(&event).await;

        let kind = if result.is_allowed() {
            FeedbackKind::Success
        } else {
            FeedbackKind::Deny
        };
        if let Err(e) = self.feedback.render(kind).await {
            warn!(%kind, error = %e, "Feedback incomplete");
        }

        reader.halt().await;

        Some(TapOutcome { event, result })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tapgate_hardware::OutputLine;
    use tapgate_hardware::mock::{MockSignalOutputs, MockSignalOutputsHandle, MockTagSensor};
    use tapgate_network::MockTransport;

    fn pipeline(
        transport: &MockTransport,
    ) -> (
        TapPipeline<MockTransport, MockSignalOutputs>,
        MockSignalOutputsHandle,
    ) {
        let (outputs, handle) = MockSignalOutputs::new();
        let pipeline = TapPipeline::new(
            AuthorizationClient::new(transport.clone()),
            FeedbackController::new(outputs),
        );
        (pipeline, handle)
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_field_does_nothing() {
        let transport = MockTransport::new();
        let (mut pipeline, outputs) = pipeline(&transport);
        let (sensor, sensor_handle) = MockTagSensor::new();
        let mut reader = TagReader::new(ReaderId::ENTRY, sensor);

        assert!(pipeline.service(&mut reader).await.is_none());
        assert_eq!(sensor_handle.poll_count().await, 1);
        assert_eq!(sensor_handle.halt_count().await, 0);
        assert!(transport.requests().await.is_empty());
        assert!(outputs.changes().await.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_allowed_tap_renders_success_and_halts() {
        let transport = MockTransport::new();
        transport.reply("/tap", 200, r#"{"status":"allowed"}"#).await;
        let (mut pipeline, outputs) = pipeline(&transport);
        let (sensor, sensor_handle) = MockTagSensor::new();
        sensor_handle.present_tag(vec![0x04, 0xA1, 0xB2, 0xC3]).await.unwrap();
        let mut reader = TagReader::new(ReaderId::ENTRY, sensor);

        let outcome = pipeline.service(&mut reader).await.unwrap();

        assert!(outcome.result.is_allowed());
        assert_eq!(outcome.event.direction, Direction::Entry);
        assert_eq!(outcome.event.uid.to_hex(), "04A1B2C3");
        assert_eq!(outputs.activations(OutputLine::AccessGreen).await, 1);
        assert_eq!(outputs.activations(OutputLine::AccessRed).await, 0);
        assert!(sensor_handle.is_halted().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_read_error_is_no_tag() {
        let transport = MockTransport::new();
        let (mut pipeline, _outputs) = pipeline(&transport);
        let (sensor, sensor_handle) = MockTagSensor::new();
        sensor_handle.present_tag(vec![0x01]).await.unwrap();
        sensor_handle.fail_next_read("CRC error").await;
        let mut reader = TagReader::new(ReaderId::EXIT, sensor);

        assert!(pipeline.service(&mut reader).await.is_none());
        assert!(transport.requests().await.is_empty());

        // The next poll reads the tag normally
        transport.reply("/tap", 200, r#"{"status":"denied"}"#).await;
        let outcome = pipeline.service(&mut reader).await.unwrap();
        assert!(!outcome.result.is_allowed());
        assert_eq!(outcome.event.direction, Direction::Exit);
    }

    #[tokio::test(start_paused = true)]
    async fn test_held_tag_is_processed_once() {
        let transport = MockTransport::new();
        transport
            .always_reply("/tap", 200, r#"{"status":"allowed"}"#)
            .await;
        let (mut pipeline, _outputs) = pipeline(&transport);
        let (sensor, sensor_handle) = MockTagSensor::new();
        sensor_handle.present_tag(vec![0xAA, 0xBB]).await.unwrap();
        let mut reader = TagReader::new(ReaderId::ENTRY, sensor);

        assert!(pipeline.service(&mut reader).await.is_some());
        assert!(pipeline.service(&mut reader).await.is_none());
        assert!(pipeline.service(&mut reader).await.is_none());
        assert_eq!(transport.request_count("/tap").await, 1);

        sensor_handle.remove_tag().await;
        sensor_handle.present_tag(vec![0xAA, 0xBB]).await.unwrap();
        assert!(pipeline.service(&mut reader).await.is_some());
        assert_eq!(transport.request_count("/tap").await, 2);
    }
}
