//! Event bus for broadcasting order lifecycle events.
//!
//! Wraps a tokio broadcast channel so observers such as the audit log can
//! follow order activity without being wired to each producer. Publishing
//! is fire-and-forget: a mutation never fails because nobody is listening.

use tokio::sync::broadcast;
use waybill_types::OrderEvent;

/// Broadcast-based event bus for order lifecycle events.
#[derive(Clone)]
pub struct EventBus {
	sender: broadcast::Sender<OrderEvent>,
}

impl EventBus {
	/// Creates a new event bus with the given channel capacity.
	///
	/// Slow subscribers that fall more than `capacity` events behind start
	/// missing the oldest events.
	pub fn new(capacity: usize) -> Self {
		let (sender, _) = broadcast::channel(capacity);
		Self { sender }
	}

	/// Publishes an event to all current subscribers.
	///
	/// Returns the subscriber count on success, or the event back when
	/// there are no subscribers. Producers call `.ok()` on the result.
	pub fn publish(
		&self,
		event: OrderEvent,
	) -> Result<usize, broadcast::error::SendError<OrderEvent>> {
		self.sender.send(event)
	}

	/// Creates a new subscription receiving events published from now on.
	pub fn subscribe(&self) -> broadcast::Receiver<OrderEvent> {
		self.sender.subscribe()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use chrono::Utc;

	fn created(order_id: &str) -> OrderEvent {
		OrderEvent::Created {
			order_id: order_id.to_string(),
			actor_id: "ops-1".to_string(),
			at: Utc::now(),
		}
	}

	#[test]
	fn test_publish_without_subscribers_is_harmless() {
		let bus = EventBus::new(4);
		assert!(bus.publish(created("a")).is_err());
	}

	#[tokio::test]
	async fn test_subscribers_receive_events_in_order() {
		let bus = EventBus::new(4);
		let mut receiver = bus.subscribe();

		bus.publish(created("a")).unwrap();
		bus.publish(created("b")).unwrap();

		assert_eq!(receiver.recv().await.unwrap().order_id(), "a");
		assert_eq!(receiver.recv().await.unwrap().order_id(), "b");
	}

	#[tokio::test]
	async fn test_each_subscriber_gets_every_event() {
		let bus = EventBus::new(4);
		let mut first = bus.subscribe();
		let mut second = bus.subscribe();

		assert_eq!(bus.publish(created("a")).unwrap(), 2);

		assert_eq!(first.recv().await.unwrap().order_id(), "a");
		assert_eq!(second.recv().await.unwrap().order_id(), "a");
	}
}
