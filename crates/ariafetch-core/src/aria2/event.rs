//! Download lifecycle notifications pushed by the daemon.

use serde::Deserialize;

use super::Gid;
use crate::rpc::Notification;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Start,
    Pause,
    /// Stopped by the user (`aria2.remove`).
    Stop,
    Complete,
    Error,
    /// Torrent payload finished; seeding may continue.
    BtComplete,
}

impl EventKind {
    fn from_method(method: &str) -> Option<Self> {
        let kind = match method {
            "aria2.onDownloadStart" => EventKind::Start,
            "aria2.onDownloadPause" => EventKind::Pause,
            "aria2.onDownloadStop" => EventKind::Stop,
            "aria2.onDownloadComplete" => EventKind::Complete,
            "aria2.onDownloadError" => EventKind::Error,
            "aria2.onBtDownloadComplete" => EventKind::BtComplete,
            _ => return None,
        };
        Some(kind)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadEvent {
    pub kind: EventKind,
    pub gid: Gid,
}

#[derive(Deserialize)]
struct EventParam {
    gid: Gid,
}

impl DownloadEvent {
    /// Decodes a notification; `None` for methods that are not download events
    /// or that carry no gid.
    pub fn from_notification(n: &Notification) -> Option<Self> {
        let kind = EventKind::from_method(&n.method)?;
        let params: Vec<EventParam> = serde_json::from_value(n.params.clone()).ok()?;
        let gid = params.into_iter().next()?.gid;
        Some(Self { kind, gid })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn notification(method: &str, params: serde_json::Value) -> Notification {
        Notification {
            method: method.to_string(),
            params,
        }
    }

    #[test]
    fn decodes_complete() {
        let n = notification("aria2.onDownloadComplete", json!([{"gid": "abc"}]));
        assert_eq!(
            DownloadEvent::from_notification(&n),
            Some(DownloadEvent {
                kind: EventKind::Complete,
                gid: Gid::new("abc")
            })
        );
    }

    #[test]
    fn ignores_unknown_method_and_bad_params() {
        let n = notification("system.somethingElse", json!([{"gid": "abc"}]));
        assert_eq!(DownloadEvent::from_notification(&n), None);
        let n = notification("aria2.onDownloadError", json!([]));
        assert_eq!(DownloadEvent::from_notification(&n), None);
        let n = notification("aria2.onDownloadError", json!({"gid": "abc"}));
        assert_eq!(DownloadEvent::from_notification(&n), None);
    }
}
