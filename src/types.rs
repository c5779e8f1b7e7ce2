// src/types.rs
//! Identity types shared by the transport, the dispatcher and the agent loop.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identity of the user who sent a command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CallerId(pub i64);

/// Chat a reply is delivered to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChatId(pub i64);

impl fmt::Display for CallerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for CallerId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<i64>().map(CallerId)
    }
}

impl From<CallerId> for ChatId {
    /// Private chats share their id with the user on the other end.
    fn from(caller: CallerId) -> Self {
        ChatId(caller.0)
    }
}
