//! Adapter runtime - drives a session from protocol lines.
//!
//! One request line in, one or more reply lines out. A `pick` or `tick` streams the
//! events it caused before its terminal reply.

use std::io::{BufRead, Write};

use anyhow::Context;
use tracing::{debug, info, warn};

use crate::core::{GameSession, GridError};
use crate::protocol::{
    create_ack, create_error, create_event, create_hint, create_observation, create_outcome,
    parse_message, ClientMessage, ErrorCode, ServerMessage,
};
use crate::types::GameEvent;

/// Session plus the protocol state around it
pub struct Runtime {
    session: GameSession,
    events: Vec<GameEvent>,
    handled: u64,
}

impl Runtime {
    pub fn new(session: GameSession) -> Self {
        Self {
            session,
            events: Vec::new(),
            handled: 0,
        }
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    /// Requests handled so far, malformed ones included
    pub fn handled(&self) -> u64 {
        self.handled
    }

    /// Handle one request and collect the replies
    pub fn handle_message(&mut self, msg: ClientMessage) -> Vec<ServerMessage> {
        let seq = msg.seq();
        self.events.clear();
        let mut out = Vec::new();

        match msg {
            ClientMessage::Pick { col, row, .. } => {
                match self.session.pick(col, row, &mut self.events) {
                    Ok(outcome) => {
                        out.extend(self.events.drain(..).map(|e| create_event(seq, e)));
                        out.push(create_outcome(seq, &outcome));
                    }
                    Err(err @ GridError::OutOfBounds { .. }) => {
                        out.push(create_error(seq, ErrorCode::OutOfBounds, &err.to_string()));
                    }
                    Err(err) => {
                        warn!(%err, "pick failed");
                        out.extend(self.events.drain(..).map(|e| create_event(seq, e)));
                        out.push(create_error(seq, ErrorCode::InvalidPick, &err.to_string()));
                    }
                }
            }
            ClientMessage::Tick { elapsed_ms, .. } => {
                self.session.tick(elapsed_ms, &mut self.events);
                out.extend(self.events.drain(..).map(|e| create_event(seq, e)));
                out.push(create_ack(
                    seq,
                    self.session.is_locked(),
                    self.session.remaining_ms(),
                ));
            }
            ClientMessage::Hint { .. } => {
                out.push(create_hint(seq, self.session.hint()));
            }
            ClientMessage::Snapshot { .. } => {
                out.push(create_observation(seq, &self.session.snapshot()));
            }
            ClientMessage::Restart { .. } => {
                self.session.restart();
                out.push(create_observation(seq, &self.session.snapshot()));
            }
        }
        out
    }

    /// Handle one raw line; blank lines produce nothing
    pub fn handle_line(&mut self, line: &str) -> Vec<ServerMessage> {
        let line = line.trim();
        if line.is_empty() {
            return Vec::new();
        }
        self.handled += 1;
        match parse_message(line) {
            Ok(msg) => {
                debug!(?msg, "request");
                self.handle_message(msg)
            }
            Err(err) => {
                debug!(%err, "rejected request");
                vec![create_error(err.seq(), err.code(), &err.to_string())]
            }
        }
    }

    /// Serve requests from `input` until EOF, writing replies to `output`
    ///
    /// Returns the number of requests handled.
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, mut output: W) -> anyhow::Result<u64> {
        info!(episode = self.session.episode_id(), "adapter started");
        let mut buf = Vec::with_capacity(256);
        for line in input.lines() {
            let line = line.context("failed to read request line")?;
            for msg in self.handle_line(&line) {
                buf.clear();
                serde_json::to_writer(&mut buf, &msg).context("failed to encode reply")?;
                buf.push(b'\n');
                output.write_all(&buf).context("failed to write reply")?;
            }
            output.flush().context("failed to flush replies")?;
        }
        info!(requests = self.handled, "adapter input closed");
        Ok(self.handled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{GameConfig, Grid};

    fn runtime(layout: &[&str]) -> Runtime {
        let grid = Grid::parse(layout).unwrap();
        let config = GameConfig {
            cols: grid.cols(),
            rows: grid.rows(),
            ..GameConfig::default()
        };
        Runtime::new(GameSession::from_grid(config, grid, 1).unwrap())
    }

    #[test]
    fn test_pick_streams_events_then_outcome() {
        let mut rt = runtime(&["AB", "BA"]);
        let replies = rt.handle_line(r#"{"type":"pick","seq":1,"col":0,"row":0}"#);
        assert_eq!(replies.len(), 2);
        assert!(matches!(replies[0], ServerMessage::Event(_)));
        let ServerMessage::Outcome(outcome) = &replies[1] else {
            panic!("expected outcome, got {:?}", replies[1]);
        };
        assert_eq!(outcome.seq, 1);
        assert_eq!(outcome.result, "selected");
    }

    #[test]
    fn test_out_of_bounds_pick_is_error_reply() {
        let mut rt = runtime(&["AB", "BA"]);
        let replies = rt.handle_line(r#"{"type":"pick","seq":4,"col":5,"row":0}"#);
        assert_eq!(replies.len(), 1);
        let ServerMessage::Error(err) = &replies[0] else {
            panic!("expected error, got {:?}", replies[0]);
        };
        assert_eq!(err.code, ErrorCode::OutOfBounds);
        assert_eq!(err.seq, 4);
    }

    #[test]
    fn test_blank_lines_are_skipped() {
        let mut rt = runtime(&["AB", "BA"]);
        assert!(rt.handle_line("   ").is_empty());
        assert_eq!(rt.handled(), 0);
    }

    #[test]
    fn test_run_writes_one_json_line_per_reply() {
        let mut rt = runtime(&["AB", "BA"]);
        let input = concat!(
            r#"{"type":"snapshot","seq":1}"#,
            "\n",
            r#"{"type":"hint","seq":2}"#,
            "\n",
            "garbage\n",
        );
        let mut output = Vec::new();

        let handled = rt.run(input.as_bytes(), &mut output).unwrap();

        assert_eq!(handled, 3);
        let text = String::from_utf8(output).unwrap();
        let lines: Vec<serde_json::Value> = text
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0]["type"], "observation");
        assert_eq!(lines[0]["board"][0], "AB");
        assert_eq!(lines[1]["type"], "hint");
        assert!(lines[1]["move"].is_null());
        assert_eq!(lines[2]["type"], "error");
        assert_eq!(lines[2]["code"], "invalid_message");
    }
}
