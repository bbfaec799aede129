//! Integration tests for the backend trait through the mock backend.

use std::sync::Arc;

use parking_lot::Mutex;
use stompbox_io::{
    AudioBackend, BackendStreamConfig, Error, MockBackend, PermissionState, StreamHandle,
};

fn open_passthrough(backend: &dyn AudioBackend) -> (StreamHandle, StreamHandle) {
    let shared: Arc<Mutex<Vec<f32>>> = Arc::new(Mutex::new(Vec::new()));
    let writer = Arc::clone(&shared);
    let input = backend
        .build_input_stream(
            &BackendStreamConfig {
                channels: 1,
                ..BackendStreamConfig::default()
            },
            Box::new(move |data| writer.lock().extend_from_slice(data)),
            Box::new(|_| {}),
        )
        .unwrap();
    let output = backend
        .build_output_stream(
            &BackendStreamConfig::default(),
            Box::new(move |buf| {
                let mut pending = shared.lock();
                let frames = buf.len() / 2;
                let take = frames.min(pending.len());
                for (frame, s) in buf.chunks_mut(2).zip(pending.drain(..take)) {
                    frame.fill(s);
                }
            }),
            Box::new(|_| {}),
        )
        .unwrap();
    (input, output)
}

#[test]
fn boxed_backend_moves_audio_from_input_to_output() {
    let mock = MockBackend::new();
    let backend: Box<dyn AudioBackend> = Box::new(mock.clone());
    assert_eq!(backend.name(), "mock");

    let (_in, _out) = open_passthrough(backend.as_ref());
    let out = mock.pump(&[0.1, 0.2, 0.3, 0.4], 4);
    assert_eq!(out, vec![0.1, 0.1, 0.2, 0.2, 0.3, 0.3, 0.4, 0.4]);

    // underrun leaves silence
    let out = mock.pump(&[], 2);
    assert_eq!(out, vec![0.0; 4]);
}

#[test]
fn stream_configs_are_recorded() {
    let mock = MockBackend::new();
    let (_in, _out) = open_passthrough(&mock);
    assert_eq!(mock.input_config().map(|c| c.channels), Some(1));
    assert_eq!(mock.output_config().map(|c| c.channels), Some(2));
    assert_eq!(mock.open_counts(), (1, 1));
}

#[test]
fn dropping_handles_releases_devices_and_allows_reopen() {
    let mock = MockBackend::new();
    let handles = open_passthrough(&mock);
    assert!(mock.is_input_open() && mock.is_output_open());
    drop(handles);
    assert!(!mock.is_input_open() && !mock.is_output_open());

    let _again = open_passthrough(&mock);
    assert_eq!(mock.open_counts(), (2, 2));
}

#[test]
fn injected_failures_surface_as_typed_errors() {
    let mock = MockBackend::new();
    mock.fail_input(Some(Error::DeviceBusy("held by another app".into())));
    let err = mock
        .build_input_stream(
            &BackendStreamConfig::default(),
            Box::new(|_| {}),
            Box::new(|_| {}),
        )
        .unwrap_err();
    assert_eq!(err, Error::DeviceBusy("held by another app".into()));

    mock.fail_input(None);
    mock.fail_output(Some(Error::NoDevice));
    let err = mock
        .build_output_stream(
            &BackendStreamConfig::default(),
            Box::new(|_| {}),
            Box::new(|_| {}),
        )
        .unwrap_err();
    assert_eq!(err, Error::NoDevice);
    assert!(!mock.is_output_open());
}

#[test]
fn permission_and_devices_are_configurable() {
    let mock = MockBackend::new();
    assert_eq!(mock.permission_state(), PermissionState::Granted);
    mock.set_permission(PermissionState::Prompt);
    assert_eq!(mock.permission_state(), PermissionState::Prompt);

    assert_eq!(
        mock.default_input_device().unwrap().map(|d| d.name),
        Some("Mock Input".to_string())
    );
    mock.set_devices(Vec::new());
    assert!(mock.list_devices().unwrap().is_empty());
    assert!(mock.default_output_device().unwrap().is_none());
}

#[test]
fn actual_sample_rate_defaults_to_requested() {
    let mock = MockBackend::new();
    let config = BackendStreamConfig {
        sample_rate: 48000,
        ..BackendStreamConfig::default()
    };
    assert_eq!(mock.actual_sample_rate(&config), 48000);
}
