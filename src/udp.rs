//! UDP chat roles.
//!
//! Same turn-taking exchange as TCP, but addressed per-datagram. The server
//! records the sender of each datagram it receives and replies to that
//! address, so it always answers the most recent sender. No retry, no
//! dedup, no sequencing: a lost datagram stalls the waiting side until the
//! configured receive timeout, if any, fires.

use crate::config::Config;
use crate::console::StdConsole;
use crate::message::{Message, MAX_MESSAGE_SIZE};
use crate::session::{self, CloseReason, Received, Role, SessionError, Transport};
use bytes::BytesMut;
use std::io;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr, UdpSocket};
use tracing::{debug, info};

/// Client-side transport: every send goes to the fixed server address.
pub struct DatagramTransport {
    socket: UdpSocket,
    server: SocketAddr,
    buf: BytesMut,
}

impl DatagramTransport {
    pub fn new(socket: UdpSocket, server: SocketAddr) -> Self {
        DatagramTransport {
            socket,
            server,
            buf: BytesMut::zeroed(MAX_MESSAGE_SIZE),
        }
    }
}

impl Transport for DatagramTransport {
    fn send(&mut self, message: &Message) -> Result<(), SessionError> {
        self.socket.send_to(message.as_bytes(), self.server)?;
        Ok(())
    }

    fn recv(&mut self) -> Result<Received, SessionError> {
        // An oversized datagram is truncated to the buffer and the rest is
        // discarded; an empty datagram is a valid empty message.
        let (n, _) = self.socket.recv_from(&mut self.buf)?;
        Ok(Received::Message(Message::from_payload(&self.buf[..n])?))
    }
}

/// Server-side transport: replies go to the sender of the most recently
/// received datagram.
pub struct ReplyTransport {
    socket: UdpSocket,
    peer: Option<SocketAddr>,
    buf: BytesMut,
}

impl ReplyTransport {
    pub fn new(socket: UdpSocket) -> Self {
        ReplyTransport {
            socket,
            peer: None,
            buf: BytesMut::zeroed(MAX_MESSAGE_SIZE),
        }
    }

    /// Sender of the most recently received datagram.
    pub fn peer(&self) -> Option<SocketAddr> {
        self.peer
    }
}

impl Transport for ReplyTransport {
    fn send(&mut self, message: &Message) -> Result<(), SessionError> {
        let peer = self.peer.ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotConnected, "no datagram received yet")
        })?;
        self.socket.send_to(message.as_bytes(), peer)?;
        Ok(())
    }

    fn recv(&mut self) -> Result<Received, SessionError> {
        let (n, addr) = self.socket.recv_from(&mut self.buf)?;
        debug!(peer = %addr, len = n, "Datagram received");
        self.peer = Some(addr);
        Ok(Received::Message(Message::from_payload(&self.buf[..n])?))
    }
}

/// Local wildcard address in the same family as the remote.
fn local_any(remote: SocketAddr) -> SocketAddr {
    match remote {
        SocketAddr::V4(_) => (Ipv4Addr::UNSPECIFIED, 0).into(),
        SocketAddr::V6(_) => (Ipv6Addr::UNSPECIFIED, 0).into(),
    }
}

/// Run the UDP client role.
pub fn run_client(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let socket = UdpSocket::bind(local_any(config.addr))?;
    socket.set_read_timeout(config.recv_timeout)?;
    info!(peer = %config.addr, "UDP client ready, type 'bye' to exit");

    let mut transport = DatagramTransport::new(socket, config.addr);
    let mut console = StdConsole::new();
    let reason = session::run(Role::Initiator, &mut transport, &mut console)?;

    match reason {
        CloseReason::LocalBye => info!("Client closed the connection"),
        CloseReason::PeerBye => info!("Server closed the connection"),
        // Datagram sockets have no disconnect notification.
        CloseReason::PeerClosed => unreachable!("no stream close over UDP"),
    }
    Ok(())
}

/// Run the UDP server role.
pub fn run_server(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let socket = UdpSocket::bind(config.addr)?;
    socket.set_read_timeout(config.recv_timeout)?;
    info!(address = %config.addr, "UDP server listening");

    let mut transport = ReplyTransport::new(socket);
    let mut console = StdConsole::new();
    let reason = session::run(Role::Responder, &mut transport, &mut console)?;

    let peer = transport.peer();
    match reason {
        CloseReason::LocalBye => info!("Server closed the connection"),
        CloseReason::PeerBye => match peer {
            Some(addr) => info!(peer = %addr, "Client disconnected"),
            None => info!("Client disconnected"),
        },
        CloseReason::PeerClosed => unreachable!("no stream close over UDP"),
    }
    Ok(())
}
