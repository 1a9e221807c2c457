//! Wire format for discovery messages.
//!
//! ```text
//! magic(4) = E4 E5 F3 C6
//! type(1)          PING=0x01 PONG=0x02 FIND_NODE=0x03 NODES=0x04
//! request_id(8)    big-endian, echoed by responses
//! width(1)         peer id width in bytes
//! sender(width)
//! payload:
//!   FIND_NODE  target(width)
//!   NODES      count(1) then per peer:
//!              id(width) family(1: 4|6) ip(4|16) port(2, big-endian)
//! ```

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};

use crate::domain::{CodecError, Peer, PeerId};

/// Prefix of every datagram; anything else is dropped.
pub const MAGIC: [u8; 4] = [0xe4, 0xe5, 0xf3, 0xc6];

/// Most peers a single NODES message can carry.
pub const MAX_NODES_PER_MESSAGE: usize = u8::MAX as usize;

const HEADER_LEN: usize = MAGIC.len() + 1 + 8 + 1;

/// Kademlia message types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum MessageType {
    /// PING request to check if peer is alive.
    Ping = 0x01,
    /// PONG response to a PING.
    Pong = 0x02,
    /// Request to find nodes close to a target ID.
    FindNode = 0x03,
    /// Response containing list of nodes.
    Nodes = 0x04,
}

impl TryFrom<u8> for MessageType {
    type Error = CodecError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x01 => Ok(Self::Ping),
            0x02 => Ok(Self::Pong),
            0x03 => Ok(Self::FindNode),
            0x04 => Ok(Self::Nodes),
            other => Err(CodecError::UnknownType(other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageBody {
    Ping,
    Pong,
    FindNode { target: PeerId },
    Nodes { peers: Vec<Peer> },
}

impl MessageBody {
    pub fn message_type(&self) -> MessageType {
        match self {
            Self::Ping => MessageType::Ping,
            Self::Pong => MessageType::Pong,
            Self::FindNode { .. } => MessageType::FindNode,
            Self::Nodes { .. } => MessageType::Nodes,
        }
    }

    /// PONG and NODES answer an earlier request.
    pub fn is_response(&self) -> bool {
        matches!(self, Self::Pong | Self::Nodes { .. })
    }
}

/// One datagram's worth of protocol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub request_id: u64,
    pub sender: PeerId,
    pub body: MessageBody,
}

impl Message {
    pub fn new(request_id: u64, sender: PeerId, body: MessageBody) -> Self {
        Self {
            request_id,
            sender,
            body,
        }
    }

    /// Serialize to bytes.
    ///
    /// Fails if a peer id is wider than 255 bytes, widths disagree within the
    /// message, or a NODES message carries more than 255 peers.
    pub fn encode(&self) -> Result<Vec<u8>, CodecError> {
        let width = self.sender.width();
        let width_byte = u8::try_from(width).map_err(|_| CodecError::WidthMismatch {
            expected: u8::MAX as usize,
            actual: width,
        })?;

        let mut out = Vec::with_capacity(HEADER_LEN + width * 2);
        out.extend_from_slice(&MAGIC);
        out.push(self.body.message_type() as u8);
        out.extend_from_slice(&self.request_id.to_be_bytes());
        out.push(width_byte);
        out.extend_from_slice(self.sender.as_bytes());

        match &self.body {
            MessageBody::Ping | MessageBody::Pong => {}
            MessageBody::FindNode { target } => {
                put_id(&mut out, target, width)?;
            }
            MessageBody::Nodes { peers } => {
                if peers.len() > MAX_NODES_PER_MESSAGE {
                    return Err(CodecError::TooManyPeers(peers.len()));
                }
                out.push(peers.len() as u8);
                for peer in peers {
                    put_id(&mut out, &peer.id, width)?;
                    put_addr(&mut out, &peer.address);
                }
            }
        }
        Ok(out)
    }

    /// Parse a datagram whose peer ids must be `id_width` bytes wide.
    pub fn decode(bytes: &[u8], id_width: usize) -> Result<Self, CodecError> {
        let mut reader = Reader::new(bytes);

        if reader.take(MAGIC.len())? != MAGIC {
            return Err(CodecError::BadMagic);
        }
        let message_type = MessageType::try_from(reader.u8()?)?;
        let request_id = reader.u64()?;
        let width = reader.u8()? as usize;
        if width != id_width {
            return Err(CodecError::WidthMismatch {
                expected: id_width,
                actual: width,
            });
        }
        let sender = reader.id(width)?;

        let body = match message_type {
            MessageType::Ping => MessageBody::Ping,
            MessageType::Pong => MessageBody::Pong,
            MessageType::FindNode => MessageBody::FindNode {
                target: reader.id(width)?,
            },
            MessageType::Nodes => {
                let count = reader.u8()? as usize;
                let mut peers = Vec::with_capacity(count);
                for _ in 0..count {
                    let id = reader.id(width)?;
                    let address = reader.addr()?;
                    peers.push(Peer::new(id, address));
                }
                MessageBody::Nodes { peers }
            }
        };

        if reader.remaining() > 0 {
            return Err(CodecError::TrailingBytes(reader.remaining()));
        }
        Ok(Self::new(request_id, sender, body))
    }
}

fn put_id(out: &mut Vec<u8>, id: &PeerId, width: usize) -> Result<(), CodecError> {
    if id.width() != width {
        return Err(CodecError::WidthMismatch {
            expected: width,
            actual: id.width(),
        });
    }
    out.extend_from_slice(id.as_bytes());
    Ok(())
}

fn put_addr(out: &mut Vec<u8>, addr: &SocketAddr) {
    match addr.ip() {
        IpAddr::V4(ip) => {
            out.push(4);
            out.extend_from_slice(&ip.octets());
        }
        IpAddr::V6(ip) => {
            out.push(6);
            out.extend_from_slice(&ip.octets());
        }
    }
    out.extend_from_slice(&addr.port().to_be_bytes());
}

struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], CodecError> {
        if self.remaining() < n {
            return Err(CodecError::Truncated {
                needed: self.pos + n,
                available: self.buf.len(),
            });
        }
        let slice = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn u8(&mut self) -> Result<u8, CodecError> {
        Ok(self.take(1)?[0])
    }

    fn u64(&mut self) -> Result<u64, CodecError> {
        let mut raw = [0u8; 8];
        raw.copy_from_slice(self.take(8)?);
        Ok(u64::from_be_bytes(raw))
    }

    fn id(&mut self, width: usize) -> Result<PeerId, CodecError> {
        Ok(PeerId::new(self.take(width)?))
    }

    fn addr(&mut self) -> Result<SocketAddr, CodecError> {
        let ip = match self.u8()? {
            4 => {
                let mut raw = [0u8; 4];
                raw.copy_from_slice(self.take(4)?);
                IpAddr::V4(Ipv4Addr::from(raw))
            }
            6 => {
                let mut raw = [0u8; 16];
                raw.copy_from_slice(self.take(16)?);
                IpAddr::V6(Ipv6Addr::from(raw))
            }
            other => return Err(CodecError::BadAddressFamily(other)),
        };
        let mut port = [0u8; 2];
        port.copy_from_slice(self.take(2)?);
        Ok(SocketAddr::new(ip, u16::from_be_bytes(port)))
    }
}
