//! End-to-end session tests against a scripted server on loopback.

#![cfg(feature = "tokio")]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use smirc::{Session, SessionConfig, SessionState};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpListener;
use tokio::time::timeout;

const WAIT: Duration = Duration::from_secs(5);

type Output = Arc<Mutex<Vec<(String, String)>>>;

fn recording_session(port: u16) -> (Session, Output) {
    let seen: Output = Arc::new(Mutex::new(Vec::new()));
    let recorder = Arc::clone(&seen);
    let config = SessionConfig::new("127.0.0.1", port)
        .with_nick("alice")
        .with_user("ali")
        .with_password("secret")
        .with_full_name("Alice Liddell");
    let session = Session::new(config, move |dest: &str, line: &str| {
        recorder
            .lock()
            .unwrap()
            .push((dest.to_owned(), line.to_owned()));
    });
    (session, seen)
}

async fn wait_for_output(seen: &Output, destination: &str, line: &str) {
    let found = timeout(WAIT, async {
        loop {
            if seen
                .lock()
                .unwrap()
                .iter()
                .any(|(d, l)| d == destination && l == line)
            {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await;
    assert!(found.is_ok(), "never saw [{}] {}", destination, line);
}

async fn next_line(lines: &mut Lines<BufReader<OwnedReadHalf>>) -> Option<String> {
    timeout(WAIT, lines.next_line())
        .await
        .expect("server read timed out")
        .expect("server read failed")
}

async fn accept(listener: &TcpListener) -> (Lines<BufReader<OwnedReadHalf>>, OwnedWriteHalf) {
    let (stream, _) = timeout(WAIT, listener.accept())
        .await
        .expect("accept timed out")
        .expect("accept failed");
    let (read, write) = stream.into_split();
    (BufReader::new(read).lines(), write)
}

async fn expect_registration(lines: &mut Lines<BufReader<OwnedReadHalf>>) {
    assert_eq!(next_line(lines).await.as_deref(), Some("PASS secret"));
    assert_eq!(next_line(lines).await.as_deref(), Some("NICK alice"));
    assert_eq!(
        next_line(lines).await.as_deref(),
        Some("USER alice 4 ali :Alice Liddell")
    );
}

#[tokio::test]
async fn test_full_session() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let (mut session, seen) = recording_session(port);

    session.start();
    assert!(session.is_running());

    let (mut lines, mut writer) = accept(&listener).await;
    expect_registration(&mut lines).await;
    wait_for_output(&seen, "Status", &format!("Connected to 127.0.0.1 {}", port)).await;

    writer.write_all(b"PING :irc.test\r\n").await.unwrap();
    assert_eq!(next_line(&mut lines).await.as_deref(), Some("PONG :irc.test"));

    writer
        .write_all(b":irc.test 001 alice :Welcome to the test network\r\n")
        .await
        .unwrap();
    wait_for_output(&seen, "Status", "Connected to server.").await;
    assert_eq!(session.state(), SessionState::Active);

    session.process_client_input("/join #rust");
    assert_eq!(next_line(&mut lines).await.as_deref(), Some("JOIN #rust"));
    writer
        .write_all(b":alice!ali@localhost JOIN #rust\r\n")
        .await
        .unwrap();
    wait_for_output(&seen, "Status", "You are now entering channel #rust.").await;

    session.process_client_input("hello everyone");
    assert_eq!(
        next_line(&mut lines).await.as_deref(),
        Some("PRIVMSG #rust :hello everyone")
    );

    writer
        .write_all(b":bob!b@elsewhere PRIVMSG #rust :\x01ACTION waves\x01\r\n")
        .await
        .unwrap();
    let waved = timeout(WAIT, async {
        loop {
            if seen
                .lock()
                .unwrap()
                .iter()
                .any(|(d, l)| d == "#rust" && l.ends_with(" <bob> * waves"))
            {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await;
    assert!(waved.is_ok());

    session.stop("bye");
    session.stop("again");
    assert_eq!(next_line(&mut lines).await.as_deref(), Some("QUIT :bye"));
    assert_eq!(next_line(&mut lines).await, None);

    timeout(WAIT, session.wait_disconnected()).await.unwrap();
    assert_eq!(session.state(), SessionState::Disconnected);
    assert!(!session.is_running());

    let seen = seen.lock().unwrap();
    let disconnects = seen
        .iter()
        .filter(|(d, l)| d == "Status" && l == "Disconnected.")
        .count();
    assert_eq!(disconnects, 1);
}

#[tokio::test]
async fn test_server_close_disconnects() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let (mut session, seen) = recording_session(port);

    session.start();
    let (mut lines, writer) = accept(&listener).await;
    expect_registration(&mut lines).await;
    drop(writer);
    drop(lines);

    timeout(WAIT, session.wait_disconnected()).await.unwrap();
    assert!(!session.is_running());
    wait_for_output(&seen, "Status", "Disconnected.").await;

    // Input after the connection is gone is dropped quietly.
    session.process_client_input("/join #late");
    session.stop("late");
    assert_eq!(session.state(), SessionState::Disconnected);
}

#[tokio::test]
async fn test_input_before_connect_waits_for_registration() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let (mut session, _seen) = recording_session(port);

    session.start();
    session.process_client_input("/join #early");
    session.process_client_input("/nick alicia");

    let (mut lines, _writer) = accept(&listener).await;
    assert_eq!(next_line(&mut lines).await.as_deref(), Some("PASS secret"));
    let nick = next_line(&mut lines).await;
    assert!(matches!(nick.as_deref(), Some("NICK alice") | Some("NICK alicia")));
    assert!(next_line(&mut lines)
        .await
        .is_some_and(|line| line.starts_with("USER ")));
    assert_eq!(next_line(&mut lines).await.as_deref(), Some("JOIN #early"));
    assert_eq!(next_line(&mut lines).await.as_deref(), Some("NICK alicia"));

    session.stop("bye");
    timeout(WAIT, session.wait_disconnected()).await.unwrap();
}

#[tokio::test]
async fn test_dropping_handle_quits_and_disconnects() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let (mut session, seen) = recording_session(port);

    session.start();
    let (mut lines, mut writer) = accept(&listener).await;
    expect_registration(&mut lines).await;
    writer
        .write_all(b":irc.test 001 alice :Welcome\r\n")
        .await
        .unwrap();
    wait_for_output(&seen, "Status", "Connected to server.").await;

    drop(session);
    assert_eq!(next_line(&mut lines).await.as_deref(), Some("QUIT :Quitting."));
    assert_eq!(next_line(&mut lines).await, None);

    wait_for_output(&seen, "Status", "Disconnected.").await;
    let seen = seen.lock().unwrap();
    assert!(!seen.iter().any(|(_, l)| l.starts_with("Error: ")));
}

#[tokio::test]
async fn test_quit_command_closes_connection() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let (mut session, seen) = recording_session(port);

    session.start();
    let (mut lines, _writer) = accept(&listener).await;
    expect_registration(&mut lines).await;

    session.process_client_input("/quit see you");
    assert_eq!(next_line(&mut lines).await.as_deref(), Some("QUIT :see you"));
    assert_eq!(next_line(&mut lines).await, None);

    timeout(WAIT, session.wait_disconnected()).await.unwrap();
    wait_for_output(&seen, "Status", "Closing the connection to server.").await;
}

#[tokio::test]
async fn test_connection_refused_reports_error() {
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap().port()
    };
    let (mut session, seen) = recording_session(port);

    session.start();
    timeout(WAIT, session.wait_disconnected()).await.unwrap();
    assert!(!session.is_running());

    let seen = seen.lock().unwrap();
    assert_eq!(
        seen[0],
        (
            "Status".to_owned(),
            format!("Creating client for 127.0.0.1 port {}", port)
        )
    );
    assert!(seen
        .iter()
        .any(|(d, l)| d == "Status" && l.starts_with("Error: ")));
    assert!(!seen.iter().any(|(_, l)| l == "Disconnected."));
}
