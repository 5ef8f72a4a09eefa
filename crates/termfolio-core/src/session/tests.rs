use std::time::Duration;

use ratatui::widgets::Paragraph;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::*;
use crate::command::Command;
use crate::testing::{memory_transport, MemoryClient};

struct Counter {
    count: i64,
    width: u16,
}

#[derive(Debug)]
enum Msg {
    Increment,
    Chain,
    Fetch,
    Add(i64),
    Quit,
    Ignore,
}

impl From<InputEvent> for Msg {
    fn from(event: InputEvent) -> Self {
        match event {
            InputEvent::Char('+') | InputEvent::ArrowUp => Msg::Increment,
            InputEvent::Char('c') => Msg::Chain,
            InputEvent::Char('f') => Msg::Fetch,
            InputEvent::Char('q') => Msg::Quit,
            _ => Msg::Ignore,
        }
    }
}

impl Model for Counter {
    type Message = Msg;
    type Flags = i64;

    fn init(initial: i64, geometry: Geometry) -> (Self, Command<Msg>) {
        (
            Counter {
                count: initial,
                width: geometry.cols(),
            },
            Command::none(),
        )
    }

    fn update(&mut self, msg: Msg) -> Command<Msg> {
        match msg {
            Msg::Increment => self.count += 1,
            Msg::Chain => {
                self.count += 1;
                return Command::message(Msg::Chain);
            }
            Msg::Fetch => return Command::perform(async { 5 }, Msg::Add),
            Msg::Add(n) => self.count += n,
            Msg::Quit => return Command::quit(),
            Msg::Ignore => {}
        }
        Command::none()
    }

    fn view(&self, frame: &mut ratatui::Frame) {
        let text = format!("Count: {} @{}", self.count, self.width);
        frame.render_widget(Paragraph::new(text), frame.area());
    }

    fn resize(&mut self, geometry: Geometry) -> Command<Msg> {
        self.width = geometry.cols();
        Command::none()
    }
}

/// Draws nothing at all.
struct Blank;

impl Model for Blank {
    type Message = Msg;
    type Flags = ();

    fn init(_: (), _: Geometry) -> (Self, Command<Msg>) {
        (Blank, Command::none())
    }

    fn update(&mut self, _msg: Msg) -> Command<Msg> {
        Command::none()
    }

    fn view(&self, _frame: &mut ratatui::Frame) {}
}

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

fn quiet_options() -> SessionOptions {
    SessionOptions {
        render_interval: Duration::from_secs(3600),
        settle_delay: ms(5),
        follow_up_delay: ms(5),
        read_deadline: ms(50),
        ..SessionOptions::default()
    }
}

type Reader = JoinHandle<Result<(), SessionError>>;

async fn connect(options: SessionOptions) -> (Session<Counter>, MemoryClient, Reader) {
    let (client, source, sink) = memory_transport();
    let session = Session::<Counter>::new(0, options);
    session.start(sink).await.unwrap();
    let reader = {
        let session = session.clone();
        tokio::spawn(async move { session.run(source).await })
    };
    (session, client, reader)
}

async fn finish(reader: Reader) -> Result<(), SessionError> {
    tokio::time::timeout(Duration::from_secs(2), reader)
        .await
        .expect("reader loop should exit")
        .unwrap()
}

#[test]
fn default_options() {
    let options = SessionOptions::default();
    assert_eq!(options.render_interval, ms(500));
    assert_eq!(options.settle_delay, ms(50));
    assert_eq!(options.follow_up_delay, ms(50));
    assert_eq!(options.read_deadline, Duration::from_secs(5));
    assert_eq!(options.queue_capacity, 256);
    assert_eq!(options.enqueue_wait, ms(100));
    assert_eq!(options.geometry, Geometry::new(80, 24));
}

#[tokio::test]
async fn start_twice_is_an_error() {
    let (_client, _source, sink) = memory_transport();
    let (_other_client, _other_source, other_sink) = memory_transport();
    let session = Session::<Counter>::new(0, quiet_options());
    session.start(sink).await.unwrap();
    assert!(matches!(
        session.start(other_sink).await,
        Err(SessionError::AlreadyStarted)
    ));
    session.shutdown().await;
}

#[tokio::test]
async fn run_before_start_is_an_error() {
    let (_client, source, _sink) = memory_transport();
    let session = Session::<Counter>::new(0, quiet_options());
    assert!(matches!(
        session.run(source).await,
        Err(SessionError::NotStarted)
    ));
}

#[tokio::test]
async fn operations_before_start_are_ignored() {
    let session = Session::<Counter>::new(3, quiet_options());
    session.handle_input_event(InputEvent::Char('+')).await;
    session.handle_resize(Geometry::new(100, 40)).await;
    session.force_render().await;
    assert_eq!(session.inspect(|m| m.count), None);
    assert_eq!(session.geometry(), Geometry::FALLBACK);
    assert_eq!(session.queued_frames(), 0);
}

#[tokio::test]
async fn first_frame_arrives_after_start() {
    let (session, mut client, reader) = connect(quiet_options()).await;
    let frame = client.next_frame(ms(500)).await.expect("initial frame");
    assert!(frame.as_str().starts_with("\x1b[2J\x1b[1;1H\x1b[?25l"));
    assert!(frame.as_str().ends_with("\x1b[?25h"));
    assert_eq!(frame.body(), "Count: 0 @80");

    client.hang_up();
    finish(reader).await.unwrap();
    assert!(session.is_terminated());
    assert!(client.is_closed());
}

#[tokio::test]
async fn keystrokes_update_and_repaint() {
    let (session, mut client, reader) = connect(quiet_options()).await;
    client.next_frame(ms(500)).await.expect("initial frame");

    client.send_text("+");
    client.send_binary(vec![0x1b, b'[', b'A']);
    let last = client.settle(ms(100)).await.expect("repaint");
    assert_eq!(last.body(), "Count: 2 @80");
    assert_eq!(session.inspect(|m| m.count), Some(2));

    client.hang_up();
    finish(reader).await.unwrap();
}

#[tokio::test]
async fn each_keystroke_renders_twice() {
    let (_session, mut client, reader) = connect(quiet_options()).await;
    client.next_frame(ms(500)).await.expect("initial frame");

    client.send_text("+");
    let first = client.next_frame(ms(500)).await.expect("immediate repaint");
    let second = client.next_frame(ms(500)).await.expect("delayed repaint");
    assert_eq!(first.body(), "Count: 1 @80");
    assert_eq!(second, first);

    client.hang_up();
    finish(reader).await.unwrap();
}

#[tokio::test]
async fn resize_sets_geometry_exactly() {
    let (session, mut client, reader) = connect(quiet_options()).await;
    client.next_frame(ms(500)).await.expect("initial frame");

    client.send_resize(100, 40);
    client.send_resize(100, 40);
    let last = client.settle(ms(100)).await.expect("repaint");
    assert_eq!(session.geometry(), Geometry::new(100, 40));
    assert_eq!(last.body(), "Count: 0 @100");

    client.send_resize(60, 20);
    client.settle(ms(100)).await;
    assert_eq!(session.geometry(), Geometry::new(60, 20));

    client.hang_up();
    finish(reader).await.unwrap();
}

#[tokio::test]
async fn malformed_resize_is_raw_input() {
    let (session, mut client, reader) = connect(quiet_options()).await;
    client.next_frame(ms(500)).await.expect("initial frame");

    client.send_text(r#"{"type":"resize","data":{"cols":0,"rows":40}}"#);
    client.send_text(r#"{"type":"resize","data":{"cols":"x","rows":40}}"#);
    // Still a frame: the decoder saw a '{' keystroke.
    client.settle(ms(100)).await.expect("repaint");
    assert_eq!(session.geometry(), Geometry::FALLBACK);

    client.hang_up();
    finish(reader).await.unwrap();
}

#[tokio::test]
async fn follow_up_messages_stop_at_max_depth() {
    let (session, mut client, reader) = connect(quiet_options()).await;
    client.next_frame(ms(500)).await.expect("initial frame");

    client.send_text("c");
    client.settle(ms(100)).await;
    assert_eq!(
        session.inspect(|m| m.count),
        Some(1 + MAX_EFFECT_DEPTH as i64)
    );

    client.hang_up();
    finish(reader).await.unwrap();
}

#[tokio::test]
async fn async_effects_feed_back_and_repaint() {
    let (session, mut client, reader) = connect(quiet_options()).await;
    client.next_frame(ms(500)).await.expect("initial frame");

    client.send_text("f");
    let last = client.settle(ms(100)).await.expect("repaint");
    assert_eq!(last.body(), "Count: 5 @80");
    assert_eq!(session.inspect(|m| m.count), Some(5));

    client.hang_up();
    finish(reader).await.unwrap();
}

#[tokio::test]
async fn quit_closes_the_connection() {
    let (session, mut client, reader) = connect(quiet_options()).await;
    client.next_frame(ms(500)).await.expect("initial frame");

    client.send_text("q");
    finish(reader).await.unwrap();
    assert!(session.is_terminated());
    assert!(client.is_closed());
    tokio::time::timeout(Duration::from_secs(1), session.join())
        .await
        .expect("loops should exit");
}

#[tokio::test]
async fn read_failure_ends_the_session() {
    let (session, client, reader) = connect(quiet_options()).await;
    client.fail();
    assert!(matches!(
        finish(reader).await,
        Err(SessionError::Transport(TransportError::Closed))
    ));
    assert!(session.is_terminated());
}

#[tokio::test]
async fn idle_connection_survives_read_deadlines() {
    let options = SessionOptions {
        read_deadline: ms(10),
        ..quiet_options()
    };
    let (session, mut client, reader) = connect(options).await;
    client.next_frame(ms(500)).await.expect("initial frame");

    tokio::time::sleep(ms(60)).await;
    assert!(!session.is_terminated());
    client.send_text("+");
    let last = client.settle(ms(100)).await.expect("repaint");
    assert_eq!(last.body(), "Count: 1 @80");

    client.hang_up();
    finish(reader).await.unwrap();
}

#[tokio::test]
async fn heartbeat_repaints_without_input() {
    let options = SessionOptions {
        render_interval: ms(20),
        ..quiet_options()
    };
    let (_session, mut client, reader) = connect(options).await;
    let mut frames = 0;
    while frames < 3 {
        client.next_frame(ms(500)).await.expect("heartbeat frame");
        frames += 1;
    }

    client.hang_up();
    finish(reader).await.unwrap();
}

#[tokio::test]
async fn blank_views_are_never_sent() {
    let (mut client, source, sink) = memory_transport();
    let session = Session::<Blank>::new((), quiet_options());
    session.start(sink).await.unwrap();
    let reader = {
        let session = session.clone();
        tokio::spawn(async move { session.run(source).await })
    };

    client.send_text("x");
    assert!(client.next_frame(ms(100)).await.is_none());

    client.hang_up();
    finish(reader).await.unwrap();
}

#[tokio::test]
async fn slow_consumer_never_deadlocks() {
    let options = SessionOptions {
        queue_capacity: 4,
        enqueue_wait: ms(10),
        ..quiet_options()
    };
    let (session, mut client, reader) = connect(options).await;
    client.next_frame(ms(500)).await.expect("initial frame");

    client.pause();
    for _ in 0..10 {
        tokio::time::timeout(Duration::from_secs(1), session.force_render())
            .await
            .expect("render must not block indefinitely");
        assert!(session.queued_frames() <= session.queue_capacity());
    }
    assert!(session.queued_frames() <= 4);

    client.resume();
    client.settle(ms(100)).await.expect("queued frames drain");
    assert_eq!(session.queued_frames(), 0);

    client.send_text("+");
    let last = client.settle(ms(100)).await.expect("session still live");
    assert_eq!(last.body(), "Count: 1 @80");

    client.hang_up();
    finish(reader).await.unwrap();
}

#[tokio::test]
async fn shutdown_while_writer_is_blocked() {
    let (session, mut client, reader) = connect(quiet_options()).await;
    client.next_frame(ms(500)).await.expect("initial frame");

    client.pause();
    session.force_render().await;
    tokio::time::sleep(ms(10)).await;

    session.shutdown().await;
    session.shutdown().await;
    finish(reader).await.unwrap();
    tokio::time::timeout(Duration::from_secs(1), session.join())
        .await
        .expect("loops should exit");
    assert!(client.is_closed());
}

#[tokio::test]
async fn write_failure_ends_the_session() {
    let (session, mut client, reader) = connect(quiet_options()).await;
    client.next_frame(ms(500)).await.expect("initial frame");

    client.fail_writes();
    client.send_text("+");
    finish(reader).await.unwrap();
    assert!(session.is_terminated());
    assert!(client.is_closed());
    tokio::time::timeout(Duration::from_secs(1), session.join())
        .await
        .expect("loops should exit");
}

#[tokio::test]
async fn cancelling_the_parent_token_ends_the_session() {
    let server = CancellationToken::new();
    let (mut client, source, sink) = memory_transport();
    let session = Session::<Counter>::with_shutdown(0, quiet_options(), server.child_token());
    session.start(sink).await.unwrap();
    let reader = {
        let session = session.clone();
        tokio::spawn(async move { session.run(source).await })
    };
    client.next_frame(ms(500)).await.expect("initial frame");

    server.cancel();
    finish(reader).await.unwrap();
    assert!(session.is_terminated());
    assert!(client.is_closed());
}

#[tokio::test]
async fn session_shutdown_leaves_the_parent_running() {
    let server = CancellationToken::new();
    let (_client, _source, sink) = memory_transport();
    let session = Session::<Counter>::with_shutdown(0, quiet_options(), server.child_token());
    session.start(sink).await.unwrap();
    session.shutdown().await;
    assert!(session.is_terminated());
    assert!(!server.is_cancelled());
}

#[tokio::test]
async fn dropped_client_ends_the_session() {
    let (session, client, reader) = connect(quiet_options()).await;
    drop(client);
    finish(reader).await.unwrap();
    assert!(session.is_terminated());
}
