//! Wire messages: protocol control or application payload.

use strum::{AsRefStr, EnumString};

/// Subscription control messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AsRefStr, EnumString, strum::Display)]
pub enum Control {
    /// Sender wants to receive future publications.
    #[strum(serialize = "SUBSCRIBE")]
    Subscribe,
    /// Confirms a prior `SUBSCRIBE` was accepted.
    #[strum(serialize = "SUBSCRIBED")]
    Subscribed,
}

/// A datagram classified at the transport boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// Protocol control message.
    Control(Control),
    /// Anything else, handed to the rules engine untouched.
    Application(Vec<u8>),
}

impl Message {
    /// Classifies raw datagram bytes. Only an exact control keyword is control.
    pub fn decode(payload: Vec<u8>) -> Self {
        match std::str::from_utf8(&payload).ok().and_then(|s| s.parse().ok()) {
            Some(control) => Message::Control(control),
            None => Message::Application(payload),
        }
    }

    /// Wire bytes for this message.
    pub fn encode(&self) -> &[u8] {
        match self {
            Message::Control(control) => control.as_ref().as_bytes(),
            Message::Application(payload) => payload,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_control_keywords() {
        assert_eq!(
            Message::decode(b"SUBSCRIBE".to_vec()),
            Message::Control(Control::Subscribe)
        );
        assert_eq!(
            Message::decode(b"SUBSCRIBED".to_vec()),
            Message::Control(Control::Subscribed)
        );
    }

    #[test]
    fn test_decode_is_exact_match() {
        for payload in [&b"subscribe"[..], b"SUBSCRIBE ", b"SUBSCRIBEDX", b""] {
            assert_eq!(
                Message::decode(payload.to_vec()),
                Message::Application(payload.to_vec())
            );
        }
    }

    #[test]
    fn test_decode_application_json() {
        let payload = br#"{"row": 0, "col": 2}"#.to_vec();
        assert_eq!(
            Message::decode(payload.clone()),
            Message::Application(payload)
        );
    }

    #[test]
    fn test_decode_invalid_utf8_is_application() {
        let payload = vec![0xff, 0xfe];
        assert_eq!(
            Message::decode(payload.clone()),
            Message::Application(payload)
        );
    }

    #[test]
    fn test_encode_control() {
        assert_eq!(Message::Control(Control::Subscribe).encode(), b"SUBSCRIBE");
        assert_eq!(Message::Control(Control::Subscribed).encode(), b"SUBSCRIBED");
    }
}
