use std::collections::VecDeque;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use cantstop_client::api::{ChooseRequest, ClientError, GameId, GameService, HttpGameService};
use cantstop_client::config::ClientConfig;
use cantstop_client::session::{Applied, Session};
use cantstop_client::types::Player;
use serde_json::{Value, json};

#[derive(Debug, Clone)]
struct ScriptedResponse {
    status: u16,
    body: String,
}

impl ScriptedResponse {
    fn json(body: Value) -> Self {
        Self {
            status: 200,
            body: body.to_string(),
        }
    }

    fn status(status: u16, body: &str) -> Self {
        Self {
            status,
            body: body.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
struct TranscriptEntry {
    method: String,
    path: String,
    body: String,
}

struct ServerHarness {
    endpoint: String,
    transcripts: Arc<Mutex<Vec<TranscriptEntry>>>,
    stop: Arc<AtomicBool>,
    join_handle: Option<thread::JoinHandle<()>>,
}

impl ServerHarness {
    fn service(&self) -> HttpGameService {
        let config = ClientConfig {
            base_url: format!("{}api", self.endpoint),
            connect_timeout: Duration::from_secs(2),
            timeout: Duration::from_secs(5),
            ..ClientConfig::default()
        };
        HttpGameService::new(&config).expect("http client")
    }

    fn transcripts(&self) -> Vec<TranscriptEntry> {
        self.transcripts.lock().expect("transcript lock").clone()
    }
}

impl Drop for ServerHarness {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
        let _ = TcpStream::connect(
            self.endpoint
                .trim_start_matches("http://")
                .trim_end_matches('/'),
        );
        if let Some(handle) = self.join_handle.take() {
            let _ = handle.join();
        }
    }
}

fn find_header_end(bytes: &[u8]) -> Option<usize> {
    bytes.windows(4).position(|window| window == b"\r\n\r\n")
}

fn parse_request(stream: &mut TcpStream) -> Option<TranscriptEntry> {
    let mut bytes = Vec::new();
    let mut buf = [0_u8; 4096];
    let mut content_length = 0_usize;
    let mut header_end = None;

    stream.set_read_timeout(Some(Duration::from_secs(2))).ok()?;

    loop {
        match stream.read(&mut buf) {
            Ok(0) => break,
            Ok(read) => {
                bytes.extend_from_slice(&buf[..read]);

                if header_end.is_none() {
                    if let Some(pos) = find_header_end(&bytes) {
                        header_end = Some(pos + 4);
                        let header_text = String::from_utf8_lossy(&bytes[..pos]).to_string();
                        for line in header_text.lines() {
                            if line.to_ascii_lowercase().starts_with("content-length:") {
                                content_length = line
                                    .split(':')
                                    .nth(1)
                                    .and_then(|value| value.trim().parse().ok())
                                    .unwrap_or(0);
                            }
                        }
                    }
                }

                if let Some(end) = header_end {
                    if bytes.len() >= end + content_length {
                        break;
                    }
                }
            }
            Err(error)
                if error.kind() == std::io::ErrorKind::WouldBlock
                    || error.kind() == std::io::ErrorKind::TimedOut =>
            {
                break;
            }
            Err(_) => return None,
        }
    }

    let end = header_end?;
    if bytes.len() < end + content_length {
        return None;
    }

    let header_text = String::from_utf8_lossy(&bytes[..end]).to_string();
    let request_line = header_text.lines().next()?.to_string();
    let mut parts = request_line.split_whitespace();
    let method = parts.next()?.to_string();
    let path = parts.next().unwrap_or("/").to_string();
    let body = String::from_utf8_lossy(&bytes[end..end + content_length]).to_string();

    Some(TranscriptEntry { method, path, body })
}

fn write_response(stream: &mut TcpStream, response: &ScriptedResponse) {
    let reason = if response.status < 400 { "OK" } else { "Error" };
    let payload = format!(
        "HTTP/1.1 {} {reason}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        response.status,
        response.body.len(),
        response.body
    );
    let _ = stream.write_all(payload.as_bytes());
    let _ = stream.flush();
}

fn start_scripted_server(responses: Vec<ScriptedResponse>) -> ServerHarness {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind test server");
    listener
        .set_nonblocking(true)
        .expect("set nonblocking listener");

    let endpoint = format!("http://{}/", listener.local_addr().expect("local addr"));
    let stop = Arc::new(AtomicBool::new(false));
    let transcripts = Arc::new(Mutex::new(Vec::new()));
    let mut queue = VecDeque::from(responses);

    let stop_clone = Arc::clone(&stop);
    let transcripts_clone = Arc::clone(&transcripts);

    let join_handle = thread::spawn(move || {
        loop {
            if stop_clone.load(Ordering::SeqCst) {
                break;
            }

            match listener.accept() {
                Ok((mut stream, _addr)) => {
                    let _ = stream.set_nonblocking(false);
                    if let Some(entry) = parse_request(&mut stream) {
                        transcripts_clone
                            .lock()
                            .expect("transcript lock")
                            .push(entry);
                        let response = queue
                            .pop_front()
                            .unwrap_or_else(|| ScriptedResponse::status(500, "script exhausted"));
                        write_response(&mut stream, &response);
                    }
                }
                Err(error) if error.kind() == std::io::ErrorKind::WouldBlock => {
                    thread::sleep(Duration::from_millis(10));
                }
                Err(_) => break,
            }
        }
    });

    ServerHarness {
        endpoint,
        transcripts,
        stop,
        join_handle: Some(join_handle),
    }
}

fn board_state() -> Value {
    json!({
        "current_dice": null,
        "available_pairings": [],
        "valid_pairings": [],
        "pairing_playability": [],
        "column_lengths": {"2": 3, "3": 5, "4": 7, "5": 9, "6": 11, "7": 13, "8": 11, "9": 9, "10": 7, "11": 5, "12": 3},
        "player1_permanent": {},
        "player2_permanent": {},
        "temp_progress": {},
        "active_runners": [],
        "player1_completed": [],
        "player2_completed": [],
        "current_player": 1,
        "is_bust": false,
        "game_over": false,
        "winner": null,
        "last_chosen_pairing_index": null
    })
}

fn rolled_state() -> Value {
    let mut state = board_state();
    state["current_dice"] = json!([3, 4, 3, 4]);
    state["available_pairings"] = json!([[7, 7], [6, 8], [7, 7]]);
    state["valid_pairings"] = json!([[7, 7], [6, 8]]);
    state["pairing_playability"] = json!([
        {"sum1_playable": true, "sum2_playable": true, "both_can_apply": false, "needs_choice": true},
        {"sum1_playable": true, "sum2_playable": true, "both_can_apply": true, "needs_choice": false}
    ]);
    state
}

#[test]
fn calls_follow_the_service_routes() {
    let server = start_scripted_server(vec![
        ScriptedResponse::json(json!({"game_id": "g1", "state": board_state()})),
        ScriptedResponse::json(json!({"state": rolled_state()})),
        ScriptedResponse::json(json!({"state": board_state()})),
        ScriptedResponse::json(json!({"state": board_state()})),
    ]);
    let service = server.service();

    let created = service.create_game().expect("create game");
    assert_eq!(created.game_id, GameId::new("g1"));
    assert_eq!(created.state.column_length(7), Some(13));

    let rolled = service.roll_dice(&created.game_id).expect("roll");
    assert_eq!(rolled.dice(), Some([3, 4, 3, 4]));

    service.stop_turn(&created.game_id).expect("stop");
    service.continue_after_bust(&created.game_id).expect("continue");

    let paths: Vec<(String, String)> = server
        .transcripts()
        .into_iter()
        .map(|entry| (entry.method, entry.path))
        .collect();
    assert_eq!(
        paths,
        vec![
            ("POST".to_string(), "/api/games".to_string()),
            ("POST".to_string(), "/api/games/g1/roll".to_string()),
            ("POST".to_string(), "/api/games/g1/stop".to_string()),
            ("POST".to_string(), "/api/games/g1/continue".to_string()),
        ]
    );
}

#[test]
fn choose_posts_index_and_chosen_number() {
    let server = start_scripted_server(vec![ScriptedResponse::json(
        json!({"state": board_state()}),
    )]);
    let service = server.service();

    service
        .choose_pairing(
            &GameId::new("g7"),
            ChooseRequest {
                pairing_index: 0,
                chosen_number: Some(7),
            },
        )
        .expect("choose");

    let transcripts = server.transcripts();
    assert_eq!(transcripts.len(), 1);
    assert_eq!(transcripts[0].path, "/api/games/g7/choose");
    let body: Value = serde_json::from_str(&transcripts[0].body).expect("json body");
    assert_eq!(body, json!({"pairing_index": 0, "chosen_number": 7}));
}

#[test]
fn error_status_keeps_the_service_message() {
    let server = start_scripted_server(vec![ScriptedResponse::status(
        400,
        r#"{"detail": "Invalid pairing"}"#,
    )]);
    let service = server.service();

    let err = service
        .roll_dice(&GameId::new("g1"))
        .expect_err("status error");
    match err {
        ClientError::Status {
            operation,
            status,
            body,
        } => {
            assert_eq!(operation, "roll");
            assert_eq!(status, 400);
            assert!(body.contains("Invalid pairing"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn malformed_payload_is_a_decode_error() {
    let server = start_scripted_server(vec![ScriptedResponse {
        status: 200,
        body: "not json".to_string(),
    }]);
    let service = server.service();

    let err = service.create_game().expect_err("decode error");
    assert!(matches!(err, ClientError::Decode { operation: "create game", .. }));
}

#[test]
fn unreachable_service_is_an_http_error() {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);

    let config = ClientConfig {
        base_url: format!("http://{addr}/api"),
        ..ClientConfig::default()
    };
    let service = HttpGameService::new(&config).expect("http client");
    assert!(matches!(service.create_game(), Err(ClientError::Http(_))));
}

#[test]
fn session_plays_a_choose_one_move_over_http() {
    let mut after_choice = rolled_state();
    after_choice["temp_progress"] = json!({"7": 1});
    after_choice["active_runners"] = json!([7]);
    after_choice["last_chosen_pairing_index"] = json!(0);

    let server = start_scripted_server(vec![
        ScriptedResponse::json(json!({"game_id": 11, "state": board_state()})),
        ScriptedResponse::json(json!({"state": rolled_state()})),
        ScriptedResponse::json(json!({"state": after_choice})),
    ]);
    let service = server.service();
    let mut session = Session::new();

    let request = session.new_game();
    assert_eq!(session.apply(request.execute(&service)), Applied::Updated);
    assert_eq!(session.game_id(), Some(&GameId::new("11")));

    let request = session.roll().expect("roll allowed");
    assert_eq!(session.apply(request.execute(&service)), Applied::Updated);

    session.hover_pairing(Some(0));
    assert!(session.activate().is_none());
    session.hover_sum_slot(cantstop_client::types::PairColor::Pair1);
    let request = session.activate().expect("choice confirmed");
    assert_eq!(session.apply(request.execute(&service)), Applied::Updated);

    let snapshot = session.snapshot().expect("snapshot");
    assert!(snapshot.is_locked());
    assert_eq!(snapshot.current_player, Player::One);
    assert_eq!(snapshot.temp(7), 1);

    let transcripts = server.transcripts();
    assert_eq!(transcripts[2].path, "/api/games/11/choose");
    let body: Value = serde_json::from_str(&transcripts[2].body).expect("json body");
    assert_eq!(body, json!({"pairing_index": 0, "chosen_number": 7}));
}
