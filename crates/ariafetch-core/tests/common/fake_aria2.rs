//! Minimal aria2 JSON-RPC WebSocket server for integration tests.
//!
//! Understands `aria2.getVersion`, `aria2.addUri` and `aria2.tellStatus` for a
//! single download. After `addUri` the download advances on every progress
//! poll and finishes `finish_after` later, announced with a notification.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Map, Value};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;

pub const GID: &str = "2089b05ecca3d829";
const OTHER_GID: &str = "0000000000000001";

#[derive(Debug, Clone)]
pub enum Finish {
    Complete,
    Error { code: u32, message: String },
}

#[derive(Debug, Clone)]
pub struct FakeOptions {
    pub total_length: u64,
    pub finish: Finish,
    pub finish_after: Duration,
    /// If false the end of the download is only visible through `tellStatus`.
    pub notify: bool,
    /// Required `token:<secret>` first parameter, if set.
    pub secret: Option<String>,
    /// If non-zero, the first status-only `tellStatus` is preceded by this many
    /// notifications for another download. It still answers `active`, but the
    /// download completes silently right after.
    pub flood: usize,
}

impl Default for FakeOptions {
    fn default() -> Self {
        Self {
            total_length: 1_000_000,
            finish: Finish::Complete,
            finish_after: Duration::from_millis(300),
            notify: true,
            secret: None,
            flood: 0,
        }
    }
}

#[derive(Debug, Default)]
struct Download {
    state: &'static str,
    completed: u64,
    error: Option<(u32, String)>,
}

/// Requests seen by the server, in order: (method, params without token).
pub type CallLog = Arc<Mutex<Vec<(String, Value)>>>;

/// Starts the server on an ephemeral port. Returns the `ws://` URL and the call log.
pub async fn start(opts: FakeOptions) -> (String, CallLog) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr: SocketAddr = listener.local_addr().unwrap();
    let calls: CallLog = Arc::default();
    let log = Arc::clone(&calls);
    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            tokio::spawn(serve(stream, opts.clone(), Arc::clone(&log)));
        }
    });
    (format!("ws://{addr}/jsonrpc"), calls)
}

async fn serve(stream: TcpStream, opts: FakeOptions, calls: CallLog) {
    let ws = match tokio_tungstenite::accept_async(stream).await {
        Ok(ws) => ws,
        Err(_) => return,
    };
    let (mut sink, mut source) = ws.split();
    let (out_tx, mut out_rx) = mpsc::unbounded_channel::<String>();
    tokio::spawn(async move {
        while let Some(text) = out_rx.recv().await {
            if sink.send(Message::Text(text)).await.is_err() {
                break;
            }
        }
    });

    let download = Arc::new(Mutex::new(Download {
        state: "waiting",
        ..Default::default()
    }));
    let mut flooded = false;

    while let Some(Ok(frame)) = source.next().await {
        let Message::Text(text) = frame else { continue };
        let req: Value = serde_json::from_str(&text).expect("request json");
        let id = req["id"].clone();
        let method = req["method"].as_str().unwrap_or_default().to_string();
        let mut params = req["params"].as_array().cloned().unwrap_or_default();

        if let Some(secret) = &opts.secret {
            let expected = format!("token:{secret}");
            if params.first().and_then(Value::as_str) != Some(expected.as_str()) {
                let reply = json!({"jsonrpc": "2.0", "id": id,
                    "error": {"code": 1, "message": "Unauthorized"}});
                let _ = out_tx.send(reply.to_string());
                continue;
            }
            params.remove(0);
        }
        calls
            .lock()
            .unwrap()
            .push((method.clone(), Value::Array(params.clone())));

        let result = match method.as_str() {
            "aria2.getVersion" => json!({
                "version": "1.36.0",
                "enabledFeatures": ["Async DNS", "HTTPS", "Message Digest"]
            }),
            "aria2.addUri" => {
                start_download(&download, &opts, out_tx.clone());
                json!(GID)
            }
            "aria2.tellStatus" => {
                let keys: Option<Vec<String>> = params
                    .get(1)
                    .and_then(|k| serde_json::from_value(k.clone()).ok());
                let status_only = keys.as_deref() == Some(&["status".to_string()][..]);
                if opts.flood > 0 && status_only && !flooded {
                    flooded = true;
                    for _ in 0..opts.flood {
                        let note = json!({"jsonrpc": "2.0", "method": "aria2.onDownloadStart",
                            "params": [{"gid": OTHER_GID}]});
                        let _ = out_tx.send(note.to_string());
                    }
                    let reply = status_reply(&download, &opts, keys.as_deref());
                    finish(&mut download.lock().unwrap(), &opts);
                    reply
                } else {
                    status_reply(&download, &opts, keys.as_deref())
                }
            }
            other => {
                let reply = json!({"jsonrpc": "2.0", "id": id,
                    "error": {"code": 1, "message": format!("No such method: {other}")}});
                let _ = out_tx.send(reply.to_string());
                continue;
            }
        };
        let reply = json!({"jsonrpc": "2.0", "id": id, "result": result});
        let _ = out_tx.send(reply.to_string());
    }
}

fn start_download(
    download: &Arc<Mutex<Download>>,
    opts: &FakeOptions,
    out_tx: mpsc::UnboundedSender<String>,
) {
    download.lock().unwrap().state = "active";
    if opts.finish_after.is_zero() {
        finish(&mut download.lock().unwrap(), opts);
        return;
    }
    let download = Arc::clone(download);
    let opts = opts.clone();
    tokio::spawn(async move {
        tokio::time::sleep(opts.finish_after).await;
        let method = {
            let mut d = download.lock().unwrap();
            finish(&mut d, &opts);
            match opts.finish {
                Finish::Complete => "aria2.onDownloadComplete",
                Finish::Error { .. } => "aria2.onDownloadError",
            }
        };
        if opts.notify {
            let note = json!({"jsonrpc": "2.0", "method": method, "params": [{"gid": GID}]});
            let _ = out_tx.send(note.to_string());
        }
    });
}

fn finish(d: &mut Download, opts: &FakeOptions) {
    match &opts.finish {
        Finish::Complete => {
            d.state = "complete";
            d.completed = opts.total_length;
        }
        Finish::Error { code, message } => {
            d.state = "error";
            d.error = Some((*code, message.clone()));
        }
    }
}

fn status_reply(download: &Arc<Mutex<Download>>, opts: &FakeOptions, keys: Option<&[String]>) -> Value {
    let mut d = download.lock().unwrap();
    if d.state == "active" {
        d.completed = (d.completed + opts.total_length / 4).min(opts.total_length);
    }

    let mut all = Map::new();
    all.insert("gid".into(), json!(GID));
    all.insert("status".into(), json!(d.state));
    all.insert("totalLength".into(), json!(opts.total_length.to_string()));
    all.insert("completedLength".into(), json!(d.completed.to_string()));
    if let Some((code, message)) = &d.error {
        all.insert("errorCode".into(), json!(code.to_string()));
        all.insert("errorMessage".into(), json!(message));
    }

    match keys {
        None => Value::Object(all),
        Some(keys) => Value::Object(
            all.into_iter()
                .filter(|(k, _)| keys.iter().any(|want| want == k))
                .collect(),
        ),
    }
}
