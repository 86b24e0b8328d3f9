//! src/protocol.rs
//!
//! The Protocol Codec (§4.1): tokenizes an inbound line and classifies it
//! into one of the four command kinds, or `Invalid`. Isolating this logic
//! lets it be tested exhaustively against the wire-format rules without
//! needing sockets or a running server.

use crate::domain::Location;

/// A parsed, validated command. `Invalid` carries nothing beyond the fact
/// that the line failed classification — the original line is what the
/// caller echoes back in the `?` response (§4.4).
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    IAmAt {
        client_name: String,
        location: Location,
        ts_sent: String,
    },
    WhatsAt {
        client_name: String,
        radius_km: u32,
        limit: u32,
    },
    Update {
        client_name: String,
        location: Location,
        ts_received: String,
        ts_sent: String,
        origin_server: String,
    },
    Invalid,
}

/// Tokenizes and classifies one line (without its trailing newline) per the
/// table in §4.1. The first matching rule wins; anything else is `Invalid`.
pub fn classify(line: &str) -> Command {
    let tokens: Vec<&str> = line.split_ascii_whitespace().collect();
    if tokens.is_empty() {
        return Command::Invalid;
    }

    match tokens[0] {
        "IAMAT" if tokens.len() == 4 => match Location::parse(tokens[2]) {
            Some(location) => Command::IAmAt {
                client_name: tokens[1].to_string(),
                location,
                ts_sent: tokens[3].to_string(),
            },
            None => Command::Invalid,
        },
        "WHATSAT" if tokens.len() == 4 => {
            match (tokens[2].parse::<u32>(), tokens[3].parse::<u32>()) {
                (Ok(radius_km), Ok(limit))
                    if radius_km > 0 && radius_km <= 50 && limit > 0 && limit <= 20 =>
                {
                    Command::WhatsAt {
                        client_name: tokens[1].to_string(),
                        radius_km,
                        limit,
                    }
                }
                _ => Command::Invalid,
            }
        }
        // UPDATE's location field carries no validation beyond arity
        // (§4.1): it is forwarded verbatim between servers, and an
        // already-accepted IAMAT on the originating server is the only
        // thing that ever puts a location on the wire in the first place.
        "UPDATE" if tokens.len() == 6 => Command::Update {
            client_name: tokens[1].to_string(),
            location: Location::from_wire(tokens[2]),
            ts_received: tokens[3].to_string(),
            ts_sent: tokens[4].to_string(),
            origin_server: tokens[5].to_string(),
        },
        _ => Command::Invalid,
    }
}
