//! The turn-taking exchange shared by all four roles.
//!
//! Both sides alternate sending one message and receiving one message until a
//! sentinel ends the session. The loop is an explicit state machine so each
//! role is a straight walk over [`State`]:
//!
//! ```text
//! WaitingForLocalInput <-> WaitingForPeer -> Closed
//! ```
//!
//! Clients are initiators (local turn first), servers are responders (peer
//! turn first). The transport underneath is a connected TCP stream or a UDP
//! socket; the session logic does not care which.

use crate::console::Console;
use crate::message::{Message, MessageError};
use std::io;

/// One receive call's outcome.
#[derive(Debug)]
pub enum Received {
    /// A message payload, possibly empty.
    Message(Message),
    /// The peer went away without a sentinel (TCP zero-length read).
    Closed,
}

/// Why the session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    /// We sent the sentinel.
    LocalBye,
    /// The peer sent the sentinel.
    PeerBye,
    /// The peer disconnected without a sentinel.
    PeerClosed,
}

/// A blocking one-message-per-call transport.
pub trait Transport {
    fn send(&mut self, message: &Message) -> Result<(), SessionError>;
    fn recv(&mut self) -> Result<Received, SessionError>;
}

/// Session states. The machine only ever moves forward out of `Closed`.
#[derive(Debug)]
enum State {
    WaitingForLocalInput,
    WaitingForPeer,
    Closed(CloseReason),
}

/// Which side speaks first.
#[derive(Debug, Clone, Copy)]
pub enum Role {
    /// Local turn first (client).
    Initiator,
    /// Peer turn first (server).
    Responder,
}

impl Role {
    /// Prompt label for locally entered lines.
    pub fn local_label(self) -> &'static str {
        match self {
            Role::Initiator => "Client",
            Role::Responder => "Server",
        }
    }

    /// Display label for peer messages.
    pub fn peer_label(self) -> &'static str {
        match self {
            Role::Initiator => "Server",
            Role::Responder => "Client",
        }
    }
}

/// Run the exchange to completion.
///
/// A local sentinel is sent and then the loop stops without awaiting a
/// reply; a received sentinel stops the loop without a further send. Any
/// transport or console error aborts the session.
pub fn run<T: Transport, C: Console>(
    role: Role,
    transport: &mut T,
    console: &mut C,
) -> Result<CloseReason, SessionError> {
    let mut state = match role {
        Role::Initiator => State::WaitingForLocalInput,
        Role::Responder => State::WaitingForPeer,
    };

    loop {
        state = match state {
            State::WaitingForLocalInput => {
                let prompt = format!("{}: ", role.local_label());
                let line = console.read_line(&prompt)?;
                let message = Message::from_line(line);
                transport.send(&message)?;

                if message.is_sentinel() {
                    State::Closed(CloseReason::LocalBye)
                } else {
                    State::WaitingForPeer
                }
            }

            State::WaitingForPeer => match transport.recv()? {
                Received::Closed => State::Closed(CloseReason::PeerClosed),
                Received::Message(message) if message.is_sentinel() => {
                    State::Closed(CloseReason::PeerBye)
                }
                Received::Message(message) => {
                    console.show(role.peer_label(), message.as_str());
                    State::WaitingForLocalInput
                }
            },

            State::Closed(reason) => return Ok(reason),
        };
    }
}

/// Errors that abort a session.
#[derive(Debug)]
pub enum SessionError {
    Io(io::Error),
    Decode(MessageError),
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionError::Io(e) => write!(f, "socket error: {e}"),
            SessionError::Decode(e) => write!(f, "decode error: {e}"),
        }
    }
}

impl std::error::Error for SessionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SessionError::Io(e) => Some(e),
            SessionError::Decode(e) => Some(e),
        }
    }
}

impl From<io::Error> for SessionError {
    fn from(e: io::Error) -> Self {
        SessionError::Io(e)
    }
}

impl From<MessageError> for SessionError {
    fn from(e: MessageError) -> Self {
        SessionError::Decode(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::testing::ScriptConsole;
    use std::collections::VecDeque;

    /// Transport that replays scripted receives and records every send.
    struct MockTransport {
        inbound: VecDeque<Received>,
        sent: Vec<String>,
    }

    impl MockTransport {
        fn new(inbound: Vec<Received>) -> Self {
            MockTransport {
                inbound: inbound.into(),
                sent: Vec::new(),
            }
        }

        fn message(text: &str) -> Received {
            Received::Message(Message::from_line(text.to_string()))
        }
    }

    impl Transport for MockTransport {
        fn send(&mut self, message: &Message) -> Result<(), SessionError> {
            self.sent.push(message.as_str().to_string());
            Ok(())
        }

        fn recv(&mut self) -> Result<Received, SessionError> {
            self.inbound.pop_front().ok_or_else(|| {
                SessionError::Io(io::Error::new(
                    io::ErrorKind::WouldBlock,
                    "unexpected receive",
                ))
            })
        }
    }

    #[test]
    fn test_initiator_exchange_then_local_bye() {
        // Client sends "hello", gets "hi", sends "bye" and stops without
        // awaiting a reply.
        let mut transport = MockTransport::new(vec![MockTransport::message("hi")]);
        let mut console = ScriptConsole::new(&["hello", "bye"]);

        let reason = run(Role::Initiator, &mut transport, &mut console).unwrap();

        assert_eq!(reason, CloseReason::LocalBye);
        assert_eq!(transport.sent, vec!["hello", "bye"]);
        assert_eq!(console.shown, vec![("Server".to_string(), "hi".to_string())]);
    }

    #[test]
    fn test_initiator_stops_on_peer_bye() {
        let mut transport = MockTransport::new(vec![MockTransport::message("BYE")]);
        let mut console = ScriptConsole::new(&["hello"]);

        let reason = run(Role::Initiator, &mut transport, &mut console).unwrap();

        assert_eq!(reason, CloseReason::PeerBye);
        assert_eq!(transport.sent, vec!["hello"]);
        // The sentinel is never displayed.
        assert!(console.shown.is_empty());
    }

    #[test]
    fn test_responder_exchange_then_local_bye() {
        let mut transport = MockTransport::new(vec![MockTransport::message("hello")]);
        let mut console = ScriptConsole::new(&["bye"]);

        let reason = run(Role::Responder, &mut transport, &mut console).unwrap();

        assert_eq!(reason, CloseReason::LocalBye);
        assert_eq!(transport.sent, vec!["bye"]);
        assert_eq!(
            console.shown,
            vec![("Client".to_string(), "hello".to_string())]
        );
    }

    #[test]
    fn test_responder_stops_on_peer_bye_without_reply() {
        let mut transport = MockTransport::new(vec![MockTransport::message("bye")]);
        let mut console = ScriptConsole::new(&[]);

        let reason = run(Role::Responder, &mut transport, &mut console).unwrap();

        assert_eq!(reason, CloseReason::PeerBye);
        assert!(transport.sent.is_empty());
    }

    #[test]
    fn test_responder_stops_on_peer_disconnect() {
        let mut transport = MockTransport::new(vec![Received::Closed]);
        let mut console = ScriptConsole::new(&[]);

        let reason = run(Role::Responder, &mut transport, &mut console).unwrap();

        assert_eq!(reason, CloseReason::PeerClosed);
        assert!(transport.sent.is_empty());
    }

    #[test]
    fn test_multi_turn_exchange() {
        let mut transport = MockTransport::new(vec![
            MockTransport::message("one"),
            MockTransport::message("two"),
        ]);
        let mut console = ScriptConsole::new(&["a", "b", "bye"]);

        let reason = run(Role::Initiator, &mut transport, &mut console).unwrap();

        assert_eq!(reason, CloseReason::LocalBye);
        assert_eq!(transport.sent, vec!["a", "b", "bye"]);
        assert_eq!(console.shown.len(), 2);
    }

    #[test]
    fn test_sentinel_whitespace_variant_is_forwarded() {
        // " bye" is an ordinary message and must be displayed, not treated
        // as a close.
        let mut transport = MockTransport::new(vec![
            MockTransport::message(" bye"),
            MockTransport::message("bye"),
        ]);
        let mut console = ScriptConsole::new(&["hello", "still here"]);

        let reason = run(Role::Initiator, &mut transport, &mut console).unwrap();

        assert_eq!(reason, CloseReason::PeerBye);
        assert_eq!(
            console.shown,
            vec![("Server".to_string(), " bye".to_string())]
        );
    }

    #[test]
    fn test_exhausted_input_is_an_error() {
        let mut transport = MockTransport::new(vec![]);
        let mut console = ScriptConsole::new(&[]);

        let result = run(Role::Initiator, &mut transport, &mut console);
        assert!(matches!(result, Err(SessionError::Io(_))));
    }
}
