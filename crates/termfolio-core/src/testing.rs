//! Test harnesses: a headless model driver and an in-memory transport.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use ratatui::buffer::Buffer;
use ratatui::Terminal;
use tokio::sync::{mpsc, watch};

use crate::command::{Command, Effect};
use crate::event::{Geometry, InputEvent};
use crate::frame::{buffer_to_ansi, OutputFrame};
use crate::model::Model;
use crate::transport::{FrameSink, FrameSource, Inbound, TransportError};

/// A headless test harness that drives a [`Model`] without a connection.
///
/// `TestProgram` exercises the init/update/view cycle in a plain `#[test]`
/// function, no tokio runtime required. Synchronous commands (e.g.
/// [`Command::message`]) are collected and can be flushed with
/// [`drain_messages`](TestProgram::drain_messages); async commands are
/// ignored and a quit request is recorded.
///
/// # Example
///
/// ```rust,ignore
/// use termfolio_core::testing::TestProgram;
///
/// let mut prog = TestProgram::<Counter>::new((), Geometry::FALLBACK);
/// prog.send_input(InputEvent::Char('+'));
/// assert_eq!(prog.model().count, 1);
/// assert!(prog.render_string().contains("Count: 1"));
/// ```
pub struct TestProgram<M: Model> {
    model: M,
    geometry: Geometry,
    pending_messages: Vec<M::Message>,
    quit: bool,
}

impl<M: Model> TestProgram<M> {
    /// Create a test program by calling [`Model::init`].
    pub fn new(flags: M::Flags, geometry: Geometry) -> Self {
        let (model, init_cmd) = M::init(flags, geometry);
        let mut program = Self {
            model,
            geometry,
            pending_messages: Vec::new(),
            quit: false,
        };
        program.collect(init_cmd);
        program
    }

    /// Send a message, triggering a single update.
    pub fn send(&mut self, msg: M::Message) {
        let cmd = self.model.update(msg);
        self.collect(cmd);
    }

    /// Send a decoded keystroke, exactly as a session would.
    pub fn send_input(&mut self, event: InputEvent) {
        self.send(M::Message::from(event));
    }

    /// Change the geometry and notify the model.
    pub fn resize(&mut self, geometry: Geometry) {
        self.geometry = geometry;
        let cmd = self.model.resize(geometry);
        self.collect(cmd);
    }

    /// Process pending synchronous messages until none are generated.
    pub fn drain_messages(&mut self) {
        while !self.pending_messages.is_empty() {
            let messages: Vec<_> = self.pending_messages.drain(..).collect();
            for msg in messages {
                let cmd = self.model.update(msg);
                self.collect(cmd);
            }
        }
    }

    /// Whether any command so far asked to quit.
    pub fn quit_requested(&self) -> bool {
        self.quit
    }

    /// Get a shared reference to the model for assertions.
    pub fn model(&self) -> &M {
        &self.model
    }

    /// Get a mutable reference to the model for direct test setup.
    pub fn model_mut(&mut self) -> &mut M {
        &mut self.model
    }

    /// The geometry the model was last told about.
    pub fn geometry(&self) -> Geometry {
        self.geometry
    }

    /// Render the model to a ratatui [`Buffer`] at the current geometry.
    pub fn render(&self) -> Buffer {
        let backend = ratatui::backend::TestBackend::new(self.geometry.cols(), self.geometry.rows());
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|frame| {
                self.model.view(frame);
            })
            .unwrap();
        terminal.backend().buffer().clone()
    }

    /// Render the model and return the visible content as plain text.
    ///
    /// Rows are separated by newlines; trailing whitespace is preserved.
    pub fn render_string(&self) -> String {
        let buf = self.render();
        let area = buf.area;
        let mut output = String::new();
        for y in area.top()..area.bottom() {
            for x in area.left()..area.right() {
                output.push_str(buf[(x, y)].symbol());
            }
            if y < area.bottom() - 1 {
                output.push('\n');
            }
        }
        output
    }

    /// Render the model to the ANSI text a session would send.
    pub fn render_ansi(&self) -> String {
        buffer_to_ansi(&self.render()).unwrap()
    }

    fn collect(&mut self, cmd: Command<M::Message>) {
        match cmd.effect {
            Effect::Nothing => {}
            Effect::Send(msg) => self.pending_messages.push(msg),
            Effect::Quit => self.quit = true,
            Effect::Many(cmds) => {
                for cmd in cmds {
                    self.collect(cmd);
                }
            }
            // tasks need a runtime; the harness only follows synchronous effects
            Effect::Task(_) => {}
        }
    }
}

/// Create a connected in-memory transport.
///
/// The returned [`MemoryClient`] plays the remote peer; hand the source and
/// sink to a [`Session`](crate::Session).
pub fn memory_transport() -> (MemoryClient, MemorySource, MemorySink) {
    let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
    let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
    let (paused_tx, paused_rx) = watch::channel(false);
    let closed = Arc::new(AtomicBool::new(false));
    let broken = Arc::new(AtomicBool::new(false));
    let client = MemoryClient {
        inbound: Some(inbound_tx),
        outbound: outbound_rx,
        paused: paused_tx,
        closed: Arc::clone(&closed),
        broken: Arc::clone(&broken),
    };
    let source = MemorySource { inbound: inbound_rx };
    let sink = MemorySink {
        outbound: outbound_tx,
        paused: paused_rx,
        closed,
        broken,
    };
    (client, source, sink)
}

/// The remote end of a [`memory_transport`].
pub struct MemoryClient {
    inbound: Option<mpsc::UnboundedSender<Result<Inbound, TransportError>>>,
    outbound: mpsc::UnboundedReceiver<OutputFrame>,
    paused: watch::Sender<bool>,
    closed: Arc<AtomicBool>,
    broken: Arc<AtomicBool>,
}

impl MemoryClient {
    /// Send a text frame.
    pub fn send_text(&self, text: impl Into<String>) {
        self.push(Ok(Inbound::Text(text.into())));
    }

    /// Send a binary frame.
    pub fn send_binary(&self, bytes: impl Into<Vec<u8>>) {
        self.push(Ok(Inbound::Binary(bytes.into())));
    }

    /// Send a resize control envelope.
    pub fn send_resize(&self, cols: u16, rows: u16) {
        self.send_text(format!(
            r#"{{"type":"resize","data":{{"cols":{cols},"rows":{rows}}}}}"#
        ));
    }

    /// Make the next receive fail with an abnormal close.
    pub fn fail(&self) {
        self.push(Err(TransportError::Closed));
    }

    /// Make every later write fail while reads keep working.
    pub fn fail_writes(&self) {
        self.broken.store(true, Ordering::SeqCst);
    }

    /// Close the connection in an orderly way.
    pub fn hang_up(&mut self) {
        self.inbound = None;
    }

    /// Block every write until [`resume`](MemoryClient::resume).
    pub fn pause(&self) {
        self.paused.send_replace(true);
    }

    /// Let blocked writes through.
    pub fn resume(&self) {
        self.paused.send_replace(false);
    }

    /// Whether the session closed its sink.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Wait up to `within` for the next frame.
    pub async fn next_frame(&mut self, within: Duration) -> Option<OutputFrame> {
        tokio::time::timeout(within, self.outbound.recv())
            .await
            .ok()
            .flatten()
    }

    /// Collect frames until none arrives for `quiet`; returns the last one.
    pub async fn settle(&mut self, quiet: Duration) -> Option<OutputFrame> {
        let mut last = None;
        while let Some(frame) = self.next_frame(quiet).await {
            last = Some(frame);
        }
        last
    }

    /// Every frame already delivered, without waiting.
    pub fn drain(&mut self) -> Vec<OutputFrame> {
        let mut frames = Vec::new();
        while let Ok(frame) = self.outbound.try_recv() {
            frames.push(frame);
        }
        frames
    }

    fn push(&self, frame: Result<Inbound, TransportError>) {
        if let Some(inbound) = &self.inbound {
            let _ = inbound.send(frame);
        }
    }
}

/// Session-side receiving half of a [`memory_transport`].
pub struct MemorySource {
    inbound: mpsc::UnboundedReceiver<Result<Inbound, TransportError>>,
}

#[async_trait]
impl FrameSource for MemorySource {
    async fn recv(&mut self) -> Result<Option<Inbound>, TransportError> {
        self.inbound.recv().await.transpose()
    }
}

/// Session-side sending half of a [`memory_transport`].
pub struct MemorySink {
    outbound: mpsc::UnboundedSender<OutputFrame>,
    paused: watch::Receiver<bool>,
    closed: Arc<AtomicBool>,
    broken: Arc<AtomicBool>,
}

#[async_trait]
impl FrameSink for MemorySink {
    async fn send(&mut self, frame: &OutputFrame) -> Result<(), TransportError> {
        if self.broken.load(Ordering::SeqCst) {
            return Err(TransportError::Closed);
        }
        if self.paused.wait_for(|paused| !*paused).await.is_err() {
            return Err(TransportError::Closed);
        }
        self.outbound
            .send(frame.clone())
            .map_err(|_| TransportError::Closed)
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::widgets::Paragraph;

    // A minimal counter model for testing
    struct Counter {
        count: i64,
        width: u16,
    }

    #[derive(Debug)]
    enum CounterMsg {
        Increment,
        Decrement,
        Twice,
        Quit,
        Ignore,
    }

    impl From<InputEvent> for CounterMsg {
        fn from(event: InputEvent) -> Self {
            match event {
                InputEvent::Char('+') | InputEvent::ArrowUp => CounterMsg::Increment,
                InputEvent::Char('-') | InputEvent::ArrowDown => CounterMsg::Decrement,
                InputEvent::Char('q') => CounterMsg::Quit,
                _ => CounterMsg::Ignore,
            }
        }
    }

    impl Model for Counter {
        type Message = CounterMsg;
        type Flags = i64;

        fn init(initial: i64, geometry: Geometry) -> (Self, Command<CounterMsg>) {
            (
                Counter {
                    count: initial,
                    width: geometry.cols(),
                },
                Command::none(),
            )
        }

        fn update(&mut self, msg: CounterMsg) -> Command<CounterMsg> {
            match msg {
                CounterMsg::Increment => self.count += 1,
                CounterMsg::Decrement => self.count -= 1,
                CounterMsg::Twice => {
                    return Command::batch([
                        Command::message(CounterMsg::Increment),
                        Command::message(CounterMsg::Increment),
                    ])
                }
                CounterMsg::Quit => return Command::quit(),
                CounterMsg::Ignore => {}
            }
            Command::none()
        }

        fn view(&self, frame: &mut ratatui::Frame) {
            let text = format!("Count: {} @{}", self.count, self.width);
            frame.render_widget(Paragraph::new(text), frame.area());
        }

        fn resize(&mut self, geometry: Geometry) -> Command<CounterMsg> {
            self.width = geometry.cols();
            Command::none()
        }
    }

    #[test]
    fn test_program_init_with_flags() {
        let prog = TestProgram::<Counter>::new(42, Geometry::FALLBACK);
        assert_eq!(prog.model().count, 42);
        assert_eq!(prog.model().width, 80);
    }

    #[test]
    fn test_program_send_input() {
        let mut prog = TestProgram::<Counter>::new(0, Geometry::FALLBACK);
        prog.send_input(InputEvent::Char('+'));
        prog.send_input(InputEvent::ArrowUp);
        prog.send_input(InputEvent::Char('-'));
        prog.send_input(InputEvent::Unrecognized);
        assert_eq!(prog.model().count, 1);
    }

    #[test]
    fn test_program_drain_messages() {
        let mut prog = TestProgram::<Counter>::new(0, Geometry::FALLBACK);
        prog.send(CounterMsg::Twice);
        assert_eq!(prog.model().count, 0);
        prog.drain_messages();
        assert_eq!(prog.model().count, 2);
    }

    #[test]
    fn test_program_records_quit() {
        let mut prog = TestProgram::<Counter>::new(0, Geometry::FALLBACK);
        assert!(!prog.quit_requested());
        prog.send_input(InputEvent::Char('q'));
        assert!(prog.quit_requested());
    }

    #[test]
    fn test_program_render_uses_geometry() {
        let mut prog = TestProgram::<Counter>::new(3, Geometry::new(30, 2));
        assert!(prog.render_string().starts_with("Count: 3 @30"));
        prog.resize(Geometry::new(40, 3));
        let content = prog.render_string();
        assert!(content.starts_with("Count: 3 @40"));
        assert_eq!(content.lines().count(), 3);
        assert_eq!(content.lines().next().map(|l| l.chars().count()), Some(40));
    }

    #[test]
    fn test_program_render_ansi_is_trimmed() {
        let prog = TestProgram::<Counter>::new(7, Geometry::new(30, 3));
        assert_eq!(prog.render_ansi(), "Count: 7 @30");
    }

    #[tokio::test]
    async fn memory_transport_round_trip() {
        let (mut client, mut source, mut sink) = memory_transport();
        client.send_text("q");
        client.send_binary(vec![0x1b, b'[', b'A']);
        assert_eq!(source.recv().await.unwrap(), Some(Inbound::Text("q".into())));
        assert_eq!(
            source.recv().await.unwrap(),
            Some(Inbound::Binary(vec![0x1b, b'[', b'A']))
        );

        let frame = OutputFrame::repaint("hi").unwrap();
        sink.send(&frame).await.unwrap();
        let got = client.next_frame(Duration::from_millis(50)).await.unwrap();
        assert_eq!(got.body(), "hi");

        client.hang_up();
        assert_eq!(source.recv().await.unwrap(), None);
        sink.close().await.unwrap();
        assert!(client.is_closed());
    }

    #[tokio::test]
    async fn memory_sink_blocks_while_paused() {
        let (mut client, _source, mut sink) = memory_transport();
        client.pause();
        let writer = tokio::spawn(async move {
            let frame = OutputFrame::repaint("late").unwrap();
            sink.send(&frame).await
        });
        assert!(client.next_frame(Duration::from_millis(30)).await.is_none());
        client.resume();
        writer.await.unwrap().unwrap();
        let got = client.next_frame(Duration::from_millis(100)).await.unwrap();
        assert_eq!(got.body(), "late");
    }

    #[tokio::test]
    async fn memory_source_reports_failure() {
        let (client, mut source, _sink) = memory_transport();
        client.fail();
        assert!(matches!(source.recv().await, Err(TransportError::Closed)));
    }
}
