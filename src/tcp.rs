//! TCP chat roles.
//!
//! The client connects and speaks first; the server accepts exactly one
//! connection per process run and lets the peer speak first. Messages ride
//! the stream with no framing: one read, capped at 1024 bytes, is one
//! message. A write split across packets can therefore arrive as two
//! messages; the protocol accepts that gap.

use crate::config::Config;
use crate::console::StdConsole;
use crate::message::{Message, MAX_MESSAGE_SIZE};
use crate::session::{self, CloseReason, Received, Role, SessionError, Transport};
use bytes::BytesMut;
use socket2::{Domain, Socket, Type};
use std::io::{Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use tracing::{debug, info};

/// Transport over a connected stream socket.
pub struct StreamTransport {
    stream: TcpStream,
    buf: BytesMut,
}

impl StreamTransport {
    pub fn new(stream: TcpStream) -> Self {
        StreamTransport {
            stream,
            buf: BytesMut::zeroed(MAX_MESSAGE_SIZE),
        }
    }
}

impl Transport for StreamTransport {
    fn send(&mut self, message: &Message) -> Result<(), SessionError> {
        self.stream.write_all(message.as_bytes())?;
        Ok(())
    }

    fn recv(&mut self) -> Result<Received, SessionError> {
        // One read is one message; anything past MAX_MESSAGE_SIZE stays in
        // the stream for the next turn.
        let n = self.stream.read(&mut self.buf)?;
        if n == 0 {
            return Ok(Received::Closed);
        }
        Ok(Received::Message(Message::from_payload(&self.buf[..n])?))
    }
}

/// Bind a listener with an explicit backlog. `std`'s `TcpListener::bind`
/// hardcodes a larger backlog, and this protocol queues at most one
/// extra connection attempt.
fn listen_with_backlog(addr: SocketAddr, backlog: i32) -> std::io::Result<TcpListener> {
    let socket = Socket::new(Domain::for_address(addr), Type::STREAM, None)?;
    socket.bind(&addr.into())?;
    socket.listen(backlog)?;
    Ok(socket.into())
}

/// Run the TCP client role.
pub fn run_client(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let stream = TcpStream::connect(config.addr)?;
    stream.set_read_timeout(config.recv_timeout)?;
    info!(peer = %config.addr, "Connected to server, type 'bye' to exit");

    let mut transport = StreamTransport::new(stream);
    let mut console = StdConsole::new();
    let reason = session::run(Role::Initiator, &mut transport, &mut console)?;

    match reason {
        CloseReason::LocalBye => info!("Client closed the connection"),
        CloseReason::PeerBye => info!("Server closed the connection"),
        CloseReason::PeerClosed => info!("Server disconnected"),
    }
    Ok(())
}

/// Run the TCP server role: accept one connection, chat, exit.
pub fn run_server(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let listener = listen_with_backlog(config.addr, 1)?;
    info!(address = %config.addr, "Server listening");

    let (stream, peer) = listener.accept()?;
    info!(peer = %peer, "Connected by client");
    stream.set_read_timeout(config.recv_timeout)?;

    let mut transport = StreamTransport::new(stream);
    let mut console = StdConsole::new();
    let reason = session::run(Role::Responder, &mut transport, &mut console)?;

    match reason {
        CloseReason::LocalBye => info!("Server closed the connection"),
        CloseReason::PeerBye | CloseReason::PeerClosed => {
            info!(peer = %peer, "Client disconnected")
        }
    }
    debug!("Session over, releasing socket");
    Ok(())
}
