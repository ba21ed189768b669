use std::collections::HashMap;
use std::sync::Mutex;

use serde_json::{json, Value};
use tokio::sync::broadcast;

/// Delivery scope of a realtime envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    All,
    User(i64),
}

#[derive(Debug, Clone)]
pub struct Envelope {
    pub target: Target,
    pub message: Value,
}

impl Envelope {
    pub fn is_for(&self, user_id: Option<i64>) -> bool {
        match self.target {
            Target::All => true,
            Target::User(id) => user_id == Some(id),
        }
    }
}

/// Fan-out point between the scheduler and connected WebSocket clients.
///
/// Appointment events broadcast to everyone; personal alerts target a single
/// user id. The connection registry lets the reminder sweep confirm a
/// notification actually reached someone before marking it delivered.
pub struct RealtimeHub {
    sender: broadcast::Sender<Envelope>,
    connections: Mutex<HashMap<i64, usize>>,
}

const CHANNEL_CAPACITY: usize = 256;

impl Default for RealtimeHub {
    fn default() -> Self {
        Self::new()
    }
}

impl RealtimeHub {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            sender,
            connections: Mutex::new(HashMap::new()),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Envelope> {
        self.sender.subscribe()
    }

    pub fn register_user(&self, user_id: i64) {
        let mut connections = self.connections.lock().unwrap();
        *connections.entry(user_id).or_insert(0) += 1;
    }

    pub fn unregister_user(&self, user_id: i64) {
        let mut connections = self.connections.lock().unwrap();
        if let Some(count) = connections.get_mut(&user_id) {
            *count -= 1;
            if *count == 0 {
                connections.remove(&user_id);
            }
        }
    }

    pub fn is_user_connected(&self, user_id: i64) -> bool {
        self.connections.lock().unwrap().contains_key(&user_id)
    }

    /// Broadcast a `created`/`updated`/`deleted` appointment event to every
    /// observer.
    pub fn send_appointment_update(&self, event: &str, payload: Value) {
        let message = json!({
            "type": "appointments:update",
            "event": event,
            "payload": payload,
            "timestamp": chrono::Utc::now().to_rfc3339(),
        });
        // No subscribers is fine
        let _ = self.sender.send(Envelope {
            target: Target::All,
            message,
        });
    }

    /// Send a personal alert. Returns whether the user had a live connection
    /// to receive it.
    pub fn send_user_notification(&self, user_id: i64, notification: Value) -> bool {
        if !self.is_user_connected(user_id) {
            return false;
        }
        let message = json!({
            "type": "user:notification",
            "userId": user_id,
            "notification": notification,
            "timestamp": chrono::Utc::now().to_rfc3339(),
        });
        self.sender
            .send(Envelope {
                target: Target::User(user_id),
                message,
            })
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_notification_requires_live_connection() {
        let hub = RealtimeHub::new();
        let _rx = hub.subscribe();

        assert!(!hub.send_user_notification(7, json!({"title": "hi"})));

        hub.register_user(7);
        assert!(hub.send_user_notification(7, json!({"title": "hi"})));

        hub.unregister_user(7);
        assert!(!hub.send_user_notification(7, json!({"title": "hi"})));
    }

    #[test]
    fn test_envelope_targeting() {
        let broadcast = Envelope {
            target: Target::All,
            message: json!({}),
        };
        assert!(broadcast.is_for(Some(1)));
        assert!(broadcast.is_for(None));

        let personal = Envelope {
            target: Target::User(2),
            message: json!({}),
        };
        assert!(personal.is_for(Some(2)));
        assert!(!personal.is_for(Some(3)));
        assert!(!personal.is_for(None));
    }

    #[tokio::test]
    async fn test_broadcast_reaches_subscribers() {
        let hub = RealtimeHub::new();
        let mut rx = hub.subscribe();

        hub.send_appointment_update("created", json!({"appointment": {"id": 1}}));

        let envelope = rx.recv().await.unwrap();
        assert_eq!(envelope.target, Target::All);
        assert_eq!(envelope.message["type"], "appointments:update");
        assert_eq!(envelope.message["event"], "created");
        assert_eq!(envelope.message["payload"]["appointment"]["id"], 1);
    }
}
