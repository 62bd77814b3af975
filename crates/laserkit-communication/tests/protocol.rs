//! Handshake and line protocol tests against a scripted mock transport.

use laserkit_communication::{
    shared, ConnectionState, Handshake, LineSink, LineSession, SessionOptions, Transport,
};
use laserkit_core::error::{ConnectionError, ProtocolErrorKind};
use laserkit_core::listener::{NullProgressListener, ProgressListener};
use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Everything the protocol layers did to the transport, in order.
#[derive(Debug, Clone, PartialEq)]
enum Event {
    Line(String),
    Bytes(Vec<u8>),
    Read,
    Reset(bool),
    Close,
}

#[derive(Default)]
struct MockState {
    events: Vec<Event>,
    responses: VecDeque<io::Result<Option<String>>>,
}

#[derive(Clone)]
struct MockHandle(Arc<Mutex<MockState>>);

impl MockHandle {
    fn new() -> Self {
        MockHandle(Arc::new(Mutex::new(MockState::default())))
    }

    fn respond(&self, response: io::Result<Option<String>>) {
        self.0.lock().unwrap().responses.push_back(response);
    }

    fn respond_line(&self, line: &str) {
        self.respond(Ok(Some(line.to_string())));
    }

    fn events(&self) -> Vec<Event> {
        self.0.lock().unwrap().events.clone()
    }

    fn read_count(&self) -> usize {
        self.events().iter().filter(|e| **e == Event::Read).count()
    }

    fn closed(&self) -> bool {
        self.events().contains(&Event::Close)
    }
}

struct MockTransport {
    state: Arc<Mutex<MockState>>,
}

impl MockTransport {
    fn new(handle: &MockHandle) -> Box<dyn Transport> {
        Box::new(MockTransport {
            state: handle.0.clone(),
        })
    }
}

impl Transport for MockTransport {
    fn write_line(&mut self, line: &str) -> io::Result<()> {
        self.state
            .lock()
            .unwrap()
            .events
            .push(Event::Line(line.to_string()));
        Ok(())
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.state
            .lock()
            .unwrap()
            .events
            .push(Event::Bytes(bytes.to_vec()));
        Ok(())
    }

    fn read_line(&mut self, _timeout: Duration) -> io::Result<Option<String>> {
        let mut state = self.state.lock().unwrap();
        state.events.push(Event::Read);
        state.responses.pop_front().unwrap_or(Ok(None))
    }

    fn set_reset(&mut self, asserted: bool) -> io::Result<()> {
        self.state
            .lock()
            .unwrap()
            .events
            .push(Event::Reset(asserted));
        Ok(())
    }

    fn close(&mut self) -> io::Result<()> {
        self.state.lock().unwrap().events.push(Event::Close);
        Ok(())
    }

    fn name(&self) -> &str {
        "mock"
    }
}

#[derive(Default)]
struct RecordingListener {
    tasks: Mutex<Vec<String>>,
}

impl ProgressListener for RecordingListener {
    fn task_changed(&self, task: &str) {
        self.tasks.lock().unwrap().push(task.to_string());
    }
}

fn grbl_handshake() -> Handshake {
    Handshake {
        identification_prefix: "Grbl".to_string(),
        homing: false,
        reset_wait_secs: 0,
    }
}

#[test]
fn soft_reset_precedes_first_identification_read() {
    let handle = MockHandle::new();
    handle.respond_line("Grbl 1.1f ['$' for help]");

    grbl_handshake()
        .negotiate(
            shared(MockTransport::new(&handle)),
            SessionOptions::default(),
            &NullProgressListener,
        )
        .unwrap();

    let events = handle.events();
    let reset_pos = events
        .iter()
        .position(|e| *e == Event::Bytes(vec![0x18]))
        .expect("soft reset byte sent");
    let read_pos = events.iter().position(|e| *e == Event::Read).unwrap();
    assert!(reset_pos < read_pos);
}

#[test]
fn reset_wait_reports_each_second_and_skips_soft_reset() {
    let handle = MockHandle::new();
    handle.respond_line("Grbl 0.9i ['$' for help]");
    let listener = RecordingListener::default();

    let handshake = Handshake {
        reset_wait_secs: 2,
        ..grbl_handshake()
    };
    handshake
        .negotiate(
            shared(MockTransport::new(&handle)),
            SessionOptions::default(),
            &listener,
        )
        .unwrap();

    let tasks = listener.tasks.lock().unwrap();
    assert!(tasks.contains(&"Waiting 2s".to_string()));
    assert!(tasks.contains(&"Waiting 1s".to_string()));
    assert!(!handle
        .events()
        .iter()
        .any(|e| matches!(e, Event::Bytes(_))));
}

#[test]
fn identification_tolerates_garbage_first_line() {
    let handle = MockHandle::new();
    handle.respond_line("\u{fffd}\u{fffd}x"); // port-open noise
    handle.respond_line("Grbl 1.1h ['$' for help]");

    let session = grbl_handshake()
        .negotiate(
            shared(MockTransport::new(&handle)),
            SessionOptions::default(),
            &NullProgressListener,
        )
        .unwrap();
    assert_eq!(session.state(), ConnectionState::Ready);
    assert_eq!(handle.read_count(), 2);
}

#[test]
fn identification_tolerates_read_errors_within_budget() {
    let handle = MockHandle::new();
    handle.respond(Err(io::Error::other("serial glitch")));
    handle.respond_line("Grbl 1.1f ['$' for help]");

    assert!(grbl_handshake()
        .negotiate(
            shared(MockTransport::new(&handle)),
            SessionOptions::default(),
            &NullProgressListener,
        )
        .is_ok());
}

#[test]
fn unrecognized_controller_after_three_attempts_closes_transport() {
    let handle = MockHandle::new();
    handle.respond_line("Marlin 2.0");
    handle.respond_line("echo: unknown");
    handle.respond_line("start");

    let err = grbl_handshake()
        .negotiate(
            shared(MockTransport::new(&handle)),
            SessionOptions::default(),
            &NullProgressListener,
        )
        .err()
        .expect("handshake must fail");

    match err {
        ConnectionError::UnrecognizedController { last_response, .. } => {
            assert_eq!(last_response.as_deref(), Some("start"));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(handle.read_count(), 3);
    assert!(handle.closed());
}

#[test]
fn homing_consumes_one_extra_line_after_banner() {
    let handle = MockHandle::new();
    handle.respond_line("Grbl 1.1f ['$' for help]");
    handle.respond_line("[MSG:Homing done]");

    let handshake = Handshake {
        homing: true,
        ..grbl_handshake()
    };
    handshake
        .negotiate(
            shared(MockTransport::new(&handle)),
            SessionOptions::default(),
            &NullProgressListener,
        )
        .unwrap();
    assert_eq!(handle.read_count(), 2);
}

#[test]
fn empty_identification_prefix_skips_reads() {
    let handle = MockHandle::new();
    let handshake = Handshake {
        identification_prefix: String::new(),
        ..grbl_handshake()
    };
    handshake
        .negotiate(
            shared(MockTransport::new(&handle)),
            SessionOptions::default(),
            &NullProgressListener,
        )
        .unwrap();
    assert_eq!(handle.read_count(), 0);
}

#[test]
fn session_send_waits_for_ok() {
    let handle = MockHandle::new();
    handle.respond_line("ok");

    let mut session = LineSession::new(
        shared(MockTransport::new(&handle)),
        SessionOptions::default(),
    );
    session.send("G21").unwrap();
    assert_eq!(session.state(), ConnectionState::Ready);
    assert_eq!(handle.events()[0], Event::Line("G21".to_string()));
}

#[test]
fn rejection_fails_session_terminally() {
    let handle = MockHandle::new();
    handle.respond_line("error:20");

    let mut session = LineSession::new(
        shared(MockTransport::new(&handle)),
        SessionOptions::default(),
    );
    let err = session.send("G1 X9999").unwrap_err();
    assert_eq!(err.kind, ProtocolErrorKind::RejectedByDevice);
    assert_eq!(err.detail, "error:20");
    assert_eq!(session.state(), ConnectionState::Failed);
    assert!(handle.closed());

    // a failed session rejects further sends without touching the wire
    let writes_before = handle.events().len();
    assert!(session.send("M5").is_err());
    assert_eq!(handle.events().len(), writes_before);
}

#[test]
fn read_fault_is_a_transport_error() {
    let handle = MockHandle::new();
    handle.respond(Err(io::Error::other("device unplugged")));

    let mut session = LineSession::new(
        shared(MockTransport::new(&handle)),
        SessionOptions::default(),
    );
    let err = session.send("G0 X0 Y0").unwrap_err();
    assert_eq!(err.kind, ProtocolErrorKind::TransportFault);
    assert_eq!(session.state(), ConnectionState::Failed);
}

#[test]
fn ack_timeout_fails_the_session() {
    let handle = MockHandle::new();
    // no responses scripted: every poll returns Ok(None)

    let mut session = LineSession::new(
        shared(MockTransport::new(&handle)),
        SessionOptions {
            wait_for_ack: true,
            ack_timeout: Some(Duration::from_millis(300)),
        },
    );
    let err = session.send("G0 X0 Y0").unwrap_err();
    assert_eq!(err.kind, ProtocolErrorKind::TransportFault);
}

#[test]
fn fire_and_forget_mode_never_reads() {
    let handle = MockHandle::new();
    let mut session = LineSession::new(
        shared(MockTransport::new(&handle)),
        SessionOptions {
            wait_for_ack: false,
            ack_timeout: None,
        },
    );
    session.send("M5").unwrap();
    assert_eq!(handle.read_count(), 0);
}
