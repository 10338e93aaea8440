//! Protocol module - JSON message types for external controllers
//!
//! Line-delimited JSON. Every message carries `type` and `seq`; server messages also
//! carry `ts` (timestamp in ms). Server messages echo the `seq` of the request they
//! answer, events included.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::{CascadeReport, GameSnapshot, Hint, IgnoreReason, PickOutcome};
use crate::types::{GameEvent, Pos, Tile};

// ============== Client -> Game Messages ==============

/// Request from the controller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ClientMessage {
    Pick {
        #[serde(default)]
        seq: u64,
        col: i64,
        row: i64,
    },
    Tick {
        #[serde(default)]
        seq: u64,
        elapsed_ms: u32,
    },
    Hint {
        #[serde(default)]
        seq: u64,
    },
    Snapshot {
        #[serde(default)]
        seq: u64,
    },
    Restart {
        #[serde(default)]
        seq: u64,
    },
}

impl ClientMessage {
    pub fn seq(&self) -> u64 {
        match self {
            ClientMessage::Pick { seq, .. }
            | ClientMessage::Tick { seq, .. }
            | ClientMessage::Hint { seq }
            | ClientMessage::Snapshot { seq }
            | ClientMessage::Restart { seq } => *seq,
        }
    }
}

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("invalid message: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unknown message type {msg_type:?}")]
    UnknownType { seq: u64, msg_type: String },
}

impl ProtocolError {
    pub fn code(&self) -> ErrorCode {
        match self {
            ProtocolError::Json(_) => ErrorCode::InvalidMessage,
            ProtocolError::UnknownType { .. } => ErrorCode::UnknownType,
        }
    }

    /// Request seq, when it could be recovered
    pub fn seq(&self) -> u64 {
        match self {
            ProtocolError::Json(_) => 0,
            ProtocolError::UnknownType { seq, .. } => *seq,
        }
    }
}

/// Parse one request line
pub fn parse_message(json: &str) -> Result<ClientMessage, ProtocolError> {
    match serde_json::from_str::<ClientMessage>(json) {
        Ok(msg) => Ok(msg),
        Err(e) => {
            // Tell an unknown type apart from a malformed known one.
            #[derive(Debug, Deserialize)]
            struct TypeOnly {
                #[serde(rename = "type")]
                msg_type: Option<String>,
                seq: Option<u64>,
            }
            let probe = serde_json::from_str::<TypeOnly>(json)?;
            match probe.msg_type.as_deref() {
                Some("pick" | "tick" | "hint" | "snapshot" | "restart") | None => Err(e.into()),
                Some(other) => Err(ProtocolError::UnknownType {
                    seq: probe.seq.unwrap_or(0),
                    msg_type: other.to_string(),
                }),
            }
        }
    }
}

// ============== Game -> Client Messages ==============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PosView {
    pub col: u16,
    pub row: u16,
}

impl From<Pos> for PosView {
    fn from(pos: Pos) -> Self {
        Self {
            col: pos.col,
            row: pos.row,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileView {
    pub id: u32,
    pub kind: u8,
    pub col: u16,
    pub row: u16,
    pub special: bool,
}

impl From<Tile> for TileView {
    fn from(tile: Tile) -> Self {
        Self {
            id: tile.id.0,
            kind: tile.kind.index(),
            col: tile.pos.col,
            row: tile.pos.row,
            special: tile.is_special(),
        }
    }
}

/// Wire form of [`GameEvent`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "name", rename_all = "camelCase")]
pub enum EventPayload {
    Highlighted { tile: TileView },
    Unhighlighted { tile: TileView },
    Swapped { a: TileView, b: TileView, accepted: bool },
    SwapReverted { a: TileView, b: TileView },
    PhaseChanged { phase: String, round: u32 },
    Cleared { tile: TileView, cause: String },
    Fell { tile: TileView, from_row: u16, to_row: u16 },
    Spawned { tile: TileView },
    ScoreChanged { score: u32, delta: u32 },
    Detonated { bomb: TileView, target: u8 },
    Relocated { tile: TileView, from: PosView },
    Reshuffled,
    TimeUp { score: u32 },
}

impl From<GameEvent> for EventPayload {
    fn from(event: GameEvent) -> Self {
        match event {
            GameEvent::Highlighted { tile } => Self::Highlighted { tile: tile.into() },
            GameEvent::Unhighlighted { tile } => Self::Unhighlighted { tile: tile.into() },
            GameEvent::Swapped { a, b, accepted } => Self::Swapped {
                a: a.into(),
                b: b.into(),
                accepted,
            },
            GameEvent::SwapReverted { a, b } => Self::SwapReverted {
                a: a.into(),
                b: b.into(),
            },
            GameEvent::PhaseChanged { phase, round } => Self::PhaseChanged {
                phase: phase.as_str().to_string(),
                round,
            },
            GameEvent::Cleared { tile, cause } => Self::Cleared {
                tile: tile.into(),
                cause: cause.as_str().to_string(),
            },
            GameEvent::Fell {
                tile,
                from_row,
                to_row,
            } => Self::Fell {
                tile: tile.into(),
                from_row,
                to_row,
            },
            GameEvent::Spawned { tile } => Self::Spawned { tile: tile.into() },
            GameEvent::ScoreChanged { score, delta } => Self::ScoreChanged { score, delta },
            GameEvent::Detonated { bomb, target } => Self::Detonated {
                bomb: bomb.into(),
                target: target.index(),
            },
            GameEvent::Relocated { tile, from } => Self::Relocated {
                tile: tile.into(),
                from: from.into(),
            },
            GameEvent::Reshuffled => Self::Reshuffled,
            GameEvent::TimeUp { score } => Self::TimeUp { score },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReportView {
    pub rounds: u32,
    pub cleared: u32,
    pub fallen: u32,
    pub spawned: u32,
    pub score_delta: u32,
    pub animation_ms: u32,
    pub capped: bool,
}

impl From<CascadeReport> for ReportView {
    fn from(r: CascadeReport) -> Self {
        Self {
            rounds: r.rounds,
            cleared: r.cleared,
            fallen: r.fallen,
            spawned: r.spawned,
            score_delta: r.score_delta,
            animation_ms: r.animation_ms,
            capped: r.capped,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum HintView {
    Swap { a: PosView, b: PosView },
    Tap { at: PosView },
}

impl From<Hint> for HintView {
    fn from(hint: Hint) -> Self {
        match hint {
            Hint::Swap(a, b) => Self::Swap {
                a: a.into(),
                b: b.into(),
            },
            Hint::Tap(at) => Self::Tap { at: at.into() },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    #[serde(rename = "invalid_message")]
    InvalidMessage,
    #[serde(rename = "unknown_type")]
    UnknownType,
    #[serde(rename = "out_of_bounds")]
    OutOfBounds,
    #[serde(rename = "invalid_pick")]
    InvalidPick,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventMessage {
    pub seq: u64,
    pub ts: u64,
    pub event: EventPayload,
}

/// Terminal reply to `pick`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeMessage {
    pub seq: u64,
    pub ts: u64,
    pub result: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<ReportView>,
}

/// Terminal reply to `tick`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AckMessage {
    pub seq: u64,
    pub ts: u64,
    pub locked: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining_ms: Option<u32>,
}

/// Terminal reply to `snapshot` and `restart`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservationMessage {
    pub seq: u64,
    pub ts: u64,
    pub cols: u16,
    pub rows: u16,
    /// One string per row: kind letters, lower-case for area-clear tiles
    pub board: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected: Option<PosView>,
    pub phase: String,
    pub locked: bool,
    pub playable: bool,
    pub score: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining_ms: Option<u32>,
    pub moves: u32,
    pub game_over: bool,
    pub episode_id: u32,
    pub seed: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HintMessage {
    pub seq: u64,
    pub ts: u64,
    /// `None` when the board has no move
    #[serde(rename = "move")]
    pub hint: Option<HintView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorMessage {
    pub seq: u64,
    pub ts: u64,
    pub code: ErrorCode,
    pub message: String,
}

/// Anything the game writes to the controller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ServerMessage {
    Event(EventMessage),
    Outcome(OutcomeMessage),
    Ack(AckMessage),
    Observation(ObservationMessage),
    Hint(HintMessage),
    Error(ErrorMessage),
}

// ============== Utility Functions ==============

pub fn create_event(seq: u64, event: GameEvent) -> ServerMessage {
    ServerMessage::Event(EventMessage {
        seq,
        ts: current_timestamp_ms(),
        event: event.into(),
    })
}

pub fn create_outcome(seq: u64, outcome: &PickOutcome) -> ServerMessage {
    let reason = match outcome {
        PickOutcome::Ignored(reason) => Some(IgnoreReason::as_str(reason).to_string()),
        _ => None,
    };
    ServerMessage::Outcome(OutcomeMessage {
        seq,
        ts: current_timestamp_ms(),
        result: outcome.as_str().to_string(),
        reason,
        report: outcome.report().copied().map(ReportView::from),
    })
}

pub fn create_ack(seq: u64, locked: bool, remaining_ms: Option<u32>) -> ServerMessage {
    ServerMessage::Ack(AckMessage {
        seq,
        ts: current_timestamp_ms(),
        locked,
        remaining_ms,
    })
}

pub fn create_observation(seq: u64, snapshot: &GameSnapshot) -> ServerMessage {
    ServerMessage::Observation(ObservationMessage {
        seq,
        ts: current_timestamp_ms(),
        cols: snapshot.cols,
        rows: snapshot.rows,
        board: snapshot.layout(),
        selected: snapshot.selected.map(PosView::from),
        phase: snapshot.phase.as_str().to_string(),
        locked: snapshot.locked,
        playable: snapshot.playable(),
        score: snapshot.score,
        remaining_ms: snapshot.remaining_ms,
        moves: snapshot.moves,
        game_over: snapshot.game_over,
        episode_id: snapshot.episode_id,
        seed: snapshot.seed,
    })
}

pub fn create_hint(seq: u64, hint: Option<Hint>) -> ServerMessage {
    ServerMessage::Hint(HintMessage {
        seq,
        ts: current_timestamp_ms(),
        hint: hint.map(HintView::from),
    })
}

pub fn create_error(seq: u64, code: ErrorCode, message: &str) -> ServerMessage {
    ServerMessage::Error(ErrorMessage {
        seq,
        ts: current_timestamp_ms(),
        code,
        message: message.to_string(),
    })
}

/// Get current timestamp in milliseconds
fn current_timestamp_ms() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
