//! JSON messages exchanged over a battle connection.
//!
//! Inbound messages carry an `action` tag, outbound ones a `type` tag. Field
//! names are camelCase on the wire.

use battle_core::{CardSnapshot, Element, EncounterId, RoundRecord, Side};
use serde::{Deserialize, Serialize};

/// Request sent by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "kebab-case")]
pub enum ClientMessage {
    #[serde(alias = "start_battle")]
    Start,
    #[serde(alias = "auto_save")]
    Heartbeat,
}

impl ClientMessage {
    pub fn parse(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }
}

/// Card as shown to the client during a reveal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardView {
    pub name: String,
    pub power: u32,
    pub vitality: u32,
    pub element: Element,
    pub leader: bool,
}

impl From<&CardSnapshot> for CardView {
    fn from(card: &CardSnapshot) -> Self {
        Self {
            name: card.name.clone(),
            power: card.stats.power,
            vitality: card.stats.vitality,
            element: card.stats.element,
            leader: card.leader,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementPair {
    pub player: Element,
    pub enemy: Element,
}

/// Event pushed to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    rename_all = "kebab-case",
    rename_all_fields = "camelCase"
)]
pub enum ServerMessage {
    ConnectionAck,
    BattleStart {
        total_rounds: u32,
        challenge: String,
    },
    RoundStart {
        round: u32,
    },
    CardReveal {
        side: Side,
        round: u32,
        card: CardView,
    },
    BattleAnimation {
        round: u32,
        winner_side: Side,
        elements: ElementPair,
    },
    RoundResult {
        round: u32,
        winner_side: Side,
        reason: String,
        running_player_wins: u32,
    },
    BattleEnd {
        encounter_id: EncounterId,
        winner_side: Side,
        player_wins: u32,
        total_rounds: u32,
        reward: Option<String>,
    },
    Error {
        message: String,
    },
}

impl ServerMessage {
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    /// The five events of one round, in emission order.
    pub fn round_events(round: &RoundRecord, running_player_wins: u32) -> [Self; 5] {
        [
            Self::RoundStart { round: round.index },
            Self::CardReveal {
                side: Side::Player,
                round: round.index,
                card: CardView::from(&round.attacker),
            },
            Self::CardReveal {
                side: Side::Enemy,
                round: round.index,
                card: CardView::from(&round.defender),
            },
            Self::BattleAnimation {
                round: round.index,
                winner_side: round.winner,
                elements: ElementPair {
                    player: round.attacker.stats.element,
                    enemy: round.defender.stats.element,
                },
            },
            Self::RoundResult {
                round: round.index,
                winner_side: round.winner,
                reason: round.reason_text(),
                running_player_wins,
            },
        ]
    }

    /// Wire name of the message.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ConnectionAck => "connection-ack",
            Self::BattleStart { .. } => "battle-start",
            Self::RoundStart { .. } => "round-start",
            Self::CardReveal { .. } => "card-reveal",
            Self::BattleAnimation { .. } => "battle-animation",
            Self::RoundResult { .. } => "round-result",
            Self::BattleEnd { .. } => "battle-end",
            Self::Error { .. } => "error",
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn client_actions_accept_legacy_names() {
        assert_eq!(
            ClientMessage::parse(r#"{"action":"start"}"#).unwrap(),
            ClientMessage::Start
        );
        assert_eq!(
            ClientMessage::parse(r#"{"action":"start_battle"}"#).unwrap(),
            ClientMessage::Start
        );
        assert_eq!(
            ClientMessage::parse(r#"{"action":"auto_save"}"#).unwrap(),
            ClientMessage::Heartbeat
        );
        assert!(ClientMessage::parse(r#"{"action":"surrender"}"#).is_err());
    }

    #[test]
    fn server_messages_use_kebab_tags_and_camel_fields() {
        let message = ServerMessage::RoundResult {
            round: 2,
            winner_side: Side::Enemy,
            reason: "defender wins ties".into(),
            running_player_wins: 1,
        };

        assert_eq!(
            serde_json::to_value(&message).unwrap(),
            json!({
                "type": "round-result",
                "round": 2,
                "winnerSide": "enemy",
                "reason": "defender wins ties",
                "runningPlayerWins": 1
            })
        );
        assert_eq!(message.kind(), "round-result");
    }

    #[test]
    fn battle_end_without_reward_is_null() {
        let message = ServerMessage::BattleEnd {
            encounter_id: EncounterId(4),
            winner_side: Side::Enemy,
            player_wins: 0,
            total_rounds: 1,
            reward: None,
        };

        let value = serde_json::to_value(&message).unwrap();
        assert_eq!(value["reward"], serde_json::Value::Null);
        assert_eq!(value["encounterId"], 4);
    }

    #[test]
    fn connection_ack_is_a_bare_tag() {
        assert_eq!(
            ServerMessage::ConnectionAck.to_json().unwrap(),
            r#"{"type":"connection-ack"}"#
        );
    }
}
