// ============================================================================
// UdpTransport - Production UDP Socket (requires "network" feature)
// ============================================================================

#[cfg(feature = "network")]
mod udp_socket {
    use std::net::SocketAddr;
    use std::sync::Arc;

    use async_trait::async_trait;
    use tokio::net::UdpSocket;
    use tracing::trace;

    use crate::domain::NetworkError;
    use crate::ports::Transport;

    /// Largest payload a single UDP datagram can carry.
    pub const MAX_DATAGRAM_SIZE: usize = 65_507;

    /// UDP-based transport for the discovery protocol.
    ///
    /// One socket is shared by the receive loop and every lookup task; the
    /// handle is cheap to clone.
    #[derive(Debug, Clone)]
    pub struct UdpTransport {
        socket: Arc<UdpSocket>,
        local_addr: SocketAddr,
    }

    impl UdpTransport {
        /// Bind to a local address (e.g. `"0.0.0.0:30303"`, port 0 for any).
        ///
        /// # Errors
        ///
        /// Returns error if socket binding fails.
        pub async fn bind(bind_addr: &str) -> Result<Self, NetworkError> {
            let socket = UdpSocket::bind(bind_addr).await?;
            let local_addr = socket.local_addr()?;
            Ok(Self {
                socket: Arc::new(socket),
                local_addr,
            })
        }
    }

    #[async_trait]
    impl Transport for UdpTransport {
        async fn send(&self, to: SocketAddr, payload: &[u8]) -> Result<(), NetworkError> {
            if payload.len() > MAX_DATAGRAM_SIZE {
                return Err(NetworkError::MessageTooLarge);
            }
            self.socket.send_to(payload, to).await?;
            trace!(%to, len = payload.len(), "udp send");
            Ok(())
        }

        async fn recv(&self) -> Result<(SocketAddr, Vec<u8>), NetworkError> {
            let mut buf = vec![0u8; MAX_DATAGRAM_SIZE];
            let (len, from) = self.socket.recv_from(&mut buf).await?;
            buf.truncate(len);
            Ok((from, buf))
        }

        fn local_addr(&self) -> SocketAddr {
            self.local_addr
        }
    }

}

#[cfg(feature = "network")]
pub use udp_socket::{UdpTransport, MAX_DATAGRAM_SIZE};
