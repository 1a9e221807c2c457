use std::net::SocketAddr;

use tracing::{debug, trace};

use crate::adapters::codec::{Message, MessageBody};
use crate::domain::{DiscoveryError, InsertOutcome, Peer};
use crate::ports::Transport;
use crate::service::KademliaDiscovery;

impl<T: Transport> KademliaDiscovery<T> {
    /// Decode and handle one received datagram.
    pub async fn handle_datagram(&self, from: SocketAddr, bytes: &[u8]) -> Result<(), DiscoveryError> {
        let message = Message::decode(bytes, self.config.id_width)?;
        self.handle_message(from, message).await
    }

    /// React to a decoded message from `from`.
    ///
    /// The sender is recorded as a live peer. Requests are answered; responses
    /// complete the matching in-flight request and are otherwise dropped.
    pub async fn handle_message(&self, from: SocketAddr, message: Message) -> Result<(), DiscoveryError> {
        let Message {
            request_id,
            sender,
            body,
        } = message;
        trace!(%from, %sender, request_id, kind = ?body.message_type(), "received");

        let outcome = self
            .routing_table
            .write()
            .insert(Peer::new(sender.clone(), from))?;
        if outcome == InsertOutcome::Inserted {
            debug!(peer = %sender, %from, "learned peer");
        }

        match body {
            MessageBody::Ping => {
                self.send_message(from, request_id, MessageBody::Pong).await
            }
            MessageBody::FindNode { target } => {
                let k = self.config.k;
                let peers: Vec<Peer> = self
                    .routing_table
                    .read()
                    .closest(&target, k + 1)?
                    .into_iter()
                    .filter(|p| p.id != sender)
                    .take(k)
                    .collect();
                self.send_message(from, request_id, MessageBody::Nodes { peers })
                    .await
            }
            body @ (MessageBody::Pong | MessageBody::Nodes { .. }) => {
                self.complete_request(from, Message::new(request_id, sender, body));
                Ok(())
            }
        }
    }

    fn complete_request(&self, from: SocketAddr, message: Message) {
        let pending = {
            let mut pending = self.pending.lock();
            match pending.get(&message.request_id) {
                Some(request) if request.to == from => pending.remove(&message.request_id),
                _ => None,
            }
        };

        match pending {
            Some(request) => {
                // receiver may have timed out in the meantime
                let _ = request.reply.send(message);
            }
            None => {
                trace!(%from, request_id = message.request_id, "unsolicited response dropped");
            }
        }
    }

    /// Drop every in-flight request; their callers see `NetworkError::Closed`.
    pub(crate) fn fail_pending(&self) {
        self.pending.lock().clear();
    }
}
