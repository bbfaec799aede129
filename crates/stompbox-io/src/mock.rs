//! In-process backend for tests.
//!
//! [`MockBackend`] never touches a sound card. Streams are recorded instead of
//! started and audio moves only when a test calls [`MockBackend::pump`], so
//! engine behaviour is deterministic down to the sample. Failures can be
//! injected per direction and the reported capture permission is settable.
//!
//! The backend is a cheap handle around shared state: clone it before boxing
//! it into the engine and keep the clone to drive audio.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::backend::{
    AudioBackend, BackendStreamConfig, ErrorCallback, InputCallback, OutputCallback,
    PermissionState, StreamHandle,
};
use crate::{AudioDevice, Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Input,
    Output,
}

struct Open<C> {
    id: u64,
    config: BackendStreamConfig,
    callback: Option<C>,
    on_error: ErrorCallback,
}

struct MockState {
    devices: Vec<AudioDevice>,
    permission: PermissionState,
    fail_input: Option<Error>,
    fail_output: Option<Error>,
    input: Option<Open<InputCallback>>,
    output: Option<Open<OutputCallback>>,
    input_opens: usize,
    output_opens: usize,
    next_id: u64,
}

impl MockState {
    fn close(&mut self, direction: Direction, id: u64) {
        match direction {
            Direction::Input if self.input.as_ref().is_some_and(|s| s.id == id) => {
                self.input = None;
            }
            Direction::Output if self.output.as_ref().is_some_and(|s| s.id == id) => {
                self.output = None;
            }
            _ => {}
        }
    }
}

/// Clears its stream slot when the owning [`StreamHandle`] is dropped.
struct MockStream {
    state: Arc<Mutex<MockState>>,
    direction: Direction,
    id: u64,
}

impl Drop for MockStream {
    fn drop(&mut self) {
        self.state.lock().close(self.direction, self.id);
    }
}

fn default_devices() -> Vec<AudioDevice> {
    vec![
        AudioDevice {
            name: "Mock Input".to_string(),
            is_input: true,
            is_output: false,
            default_sample_rate: 44100,
        },
        AudioDevice {
            name: "Mock Output".to_string(),
            is_input: false,
            is_output: true,
            default_sample_rate: 44100,
        },
    ]
}

/// Deterministic backend driven by hand.
#[derive(Clone)]
pub struct MockBackend {
    state: Arc<Mutex<MockState>>,
}

impl MockBackend {
    /// One mock input, one mock output, permission granted.
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(MockState {
                devices: default_devices(),
                permission: PermissionState::Granted,
                fail_input: None,
                fail_output: None,
                input: None,
                output: None,
                input_opens: 0,
                output_opens: 0,
                next_id: 0,
            })),
        }
    }

    /// Replaces the device list.
    pub fn set_devices(&self, devices: Vec<AudioDevice>) {
        self.state.lock().devices = devices;
    }

    /// Sets what [`AudioBackend::permission_state`] reports.
    pub fn set_permission(&self, permission: PermissionState) {
        self.state.lock().permission = permission;
    }

    /// Makes every subsequent input stream request fail with `error`.
    pub fn fail_input(&self, error: Option<Error>) {
        self.state.lock().fail_input = error;
    }

    /// Makes every subsequent output stream request fail with `error`.
    pub fn fail_output(&self, error: Option<Error>) {
        self.state.lock().fail_output = error;
    }

    /// True while an input stream handle is alive.
    pub fn is_input_open(&self) -> bool {
        self.state.lock().input.is_some()
    }

    /// True while an output stream handle is alive.
    pub fn is_output_open(&self) -> bool {
        self.state.lock().output.is_some()
    }

    /// Configuration of the open input stream.
    pub fn input_config(&self) -> Option<BackendStreamConfig> {
        self.state.lock().input.as_ref().map(|s| s.config.clone())
    }

    /// Configuration of the open output stream.
    pub fn output_config(&self) -> Option<BackendStreamConfig> {
        self.state.lock().output.as_ref().map(|s| s.config.clone())
    }

    /// Successful stream opens so far, `(input, output)`.
    pub fn open_counts(&self) -> (usize, usize) {
        let state = self.state.lock();
        (state.input_opens, state.output_opens)
    }

    /// Runs one device period.
    ///
    /// Delivers `input` to the input callback (when one is open and `input`
    /// is non-empty), then asks the output callback for `frames` frames and
    /// returns the interleaved result. Without an open output stream nothing
    /// is rendered and the result is empty.
    ///
    /// Callbacks run with the shared state unlocked, like a real device
    /// thread would run them.
    pub fn pump(&self, input: &[f32], frames: usize) -> Vec<f32> {
        if !input.is_empty() {
            let taken = {
                let mut state = self.state.lock();
                state
                    .input
                    .as_mut()
                    .and_then(|s| s.callback.take().map(|cb| (s.id, cb)))
            };
            if let Some((id, mut callback)) = taken {
                callback(input);
                let mut state = self.state.lock();
                if let Some(open) = state.input.as_mut().filter(|s| s.id == id) {
                    open.callback = Some(callback);
                }
            }
        }

        let taken = {
            let mut state = self.state.lock();
            state.output.as_mut().and_then(|s| {
                let channels = usize::from(s.config.channels.max(1));
                s.callback.take().map(|cb| (s.id, channels, cb))
            })
        };
        let Some((id, channels, mut callback)) = taken else {
            return Vec::new();
        };
        let mut buffer = vec![0.0; frames * channels];
        callback(&mut buffer);
        let mut state = self.state.lock();
        if let Some(open) = state.output.as_mut().filter(|s| s.id == id) {
            open.callback = Some(callback);
        }
        buffer
    }

    /// Reports a runtime failure on every open stream.
    pub fn emit_error(&self, message: &str) {
        let mut state = self.state.lock();
        if let Some(open) = state.input.as_mut() {
            (open.on_error)(message);
        }
        if let Some(open) = state.output.as_mut() {
            (open.on_error)(message);
        }
    }

    fn handle(&self, direction: Direction, id: u64) -> StreamHandle {
        StreamHandle::new(MockStream {
            state: Arc::clone(&self.state),
            direction,
            id,
        })
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for MockBackend {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("MockBackend")
            .field("devices", &state.devices.len())
            .field("permission", &state.permission)
            .field("input_open", &state.input.is_some())
            .field("output_open", &state.output.is_some())
            .finish()
    }
}

impl AudioBackend for MockBackend {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn list_devices(&self) -> Result<Vec<AudioDevice>> {
        Ok(self.state.lock().devices.clone())
    }

    fn default_output_device(&self) -> Result<Option<AudioDevice>> {
        Ok(self
            .state
            .lock()
            .devices
            .iter()
            .find(|d| d.is_output)
            .cloned())
    }

    fn default_input_device(&self) -> Result<Option<AudioDevice>> {
        Ok(self
            .state
            .lock()
            .devices
            .iter()
            .find(|d| d.is_input)
            .cloned())
    }

    fn build_output_stream(
        &self,
        config: &BackendStreamConfig,
        callback: OutputCallback,
        error_callback: ErrorCallback,
    ) -> Result<StreamHandle> {
        let id = {
            let mut state = self.state.lock();
            if let Some(err) = state.fail_output.clone() {
                return Err(err);
            }
            if state.output.is_some() {
                return Err(Error::DeviceBusy("mock output already open".to_string()));
            }
            state.next_id += 1;
            let id = state.next_id;
            state.output = Some(Open {
                id,
                config: config.clone(),
                callback: Some(callback),
                on_error: error_callback,
            });
            state.output_opens += 1;
            id
        };
        tracing::debug!(channels = config.channels, "mock output stream opened");
        Ok(self.handle(Direction::Output, id))
    }

    fn build_input_stream(
        &self,
        config: &BackendStreamConfig,
        callback: InputCallback,
        error_callback: ErrorCallback,
    ) -> Result<StreamHandle> {
        let id = {
            let mut state = self.state.lock();
            if state.permission == PermissionState::Denied {
                return Err(Error::PermissionDenied(
                    "mock capture permission denied".to_string(),
                ));
            }
            if let Some(err) = state.fail_input.clone() {
                return Err(err);
            }
            if state.input.is_some() {
                return Err(Error::DeviceBusy("mock input already open".to_string()));
            }
            state.next_id += 1;
            let id = state.next_id;
            state.input = Some(Open {
                id,
                config: config.clone(),
                callback: Some(callback),
                on_error: error_callback,
            });
            state.input_opens += 1;
            id
        };
        tracing::debug!(channels = config.channels, "mock input stream opened");
        Ok(self.handle(Direction::Input, id))
    }

    fn permission_state(&self) -> PermissionState {
        self.state.lock().permission
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    fn mono() -> BackendStreamConfig {
        BackendStreamConfig {
            channels: 1,
            ..BackendStreamConfig::default()
        }
    }

    #[test]
    fn dropping_handle_closes_stream() {
        let backend = MockBackend::new();
        let handle = backend
            .build_input_stream(&mono(), Box::new(|_| {}), Box::new(|_| {}))
            .unwrap();
        assert!(backend.is_input_open());
        drop(handle);
        assert!(!backend.is_input_open());
        assert_eq!(backend.open_counts(), (1, 0));
    }

    #[test]
    fn second_open_is_busy() {
        let backend = MockBackend::new();
        let _first = backend
            .build_output_stream(&mono(), Box::new(|_| {}), Box::new(|_| {}))
            .unwrap();
        let err = backend
            .build_output_stream(&mono(), Box::new(|_| {}), Box::new(|_| {}))
            .unwrap_err();
        assert!(matches!(err, Error::DeviceBusy(_)));
    }

    #[test]
    fn pump_interleaves_channels() {
        let backend = MockBackend::new();
        let _out = backend
            .build_output_stream(
                &BackendStreamConfig::default(),
                Box::new(|buf| {
                    for (i, s) in buf.iter_mut().enumerate() {
                        *s = i as f32;
                    }
                }),
                Box::new(|_| {}),
            )
            .unwrap();
        assert_eq!(backend.pump(&[], 3).len(), 6);
    }

    #[test]
    fn pump_without_output_is_empty() {
        let backend = MockBackend::new();
        assert!(backend.pump(&[0.5; 8], 8).is_empty());
    }

    #[test]
    fn errors_reach_callbacks() {
        let backend = MockBackend::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        let _in = backend
            .build_input_stream(
                &mono(),
                Box::new(|_| {}),
                Box::new(move |_| {
                    counter.fetch_add(1, Ordering::Relaxed);
                }),
            )
            .unwrap();
        backend.emit_error("device unplugged");
        assert_eq!(hits.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn denied_permission_blocks_input_only() {
        let backend = MockBackend::new();
        backend.set_permission(PermissionState::Denied);
        assert_eq!(backend.permission_state(), PermissionState::Denied);
        assert!(matches!(
            backend.build_input_stream(&mono(), Box::new(|_| {}), Box::new(|_| {})),
            Err(Error::PermissionDenied(_))
        ));
        assert!(
            backend
                .build_output_stream(&mono(), Box::new(|_| {}), Box::new(|_| {}))
                .is_ok()
        );
    }
}
