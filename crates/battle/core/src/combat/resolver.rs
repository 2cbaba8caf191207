//! The clash cascade.

use crate::card::CardStats;

use super::result::{ClashOutcome, ClashReason, Side};

/// Decide one clash between the player's `attacker` and the enemy's `defender`.
///
/// # Cascade
///
/// ```text
/// 1. lethality   attacker.power > defender.vitality XOR the reverse
/// 2. element     attacker.element beats defender.element, or the reverse
/// 3. default     defender wins
/// ```
///
/// The first rule that decides wins. Rule 3 covers equal elements and the
/// opposite pairs that [`Element::beats`] leaves undecided.
///
/// [`Element::beats`]: crate::card::Element::beats
pub fn resolve_clash(attacker: &CardStats, defender: &CardStats) -> ClashOutcome {
    let attacker_lethal = attacker.power > defender.vitality;
    let defender_lethal = defender.power > attacker.vitality;

    match (attacker_lethal, defender_lethal) {
        (true, false) => {
            return ClashOutcome {
                winner: Side::Player,
                reason: ClashReason::Lethal {
                    winner: Side::Player,
                    power: attacker.power,
                    vitality: defender.vitality,
                },
            };
        }
        (false, true) => {
            return ClashOutcome {
                winner: Side::Enemy,
                reason: ClashReason::Lethal {
                    winner: Side::Enemy,
                    power: defender.power,
                    vitality: attacker.vitality,
                },
            };
        }
        _ => {}
    }

    if attacker.element.beats(defender.element) {
        return ClashOutcome {
            winner: Side::Player,
            reason: ClashReason::ElementalAdvantage {
                winner: Side::Player,
                stronger: attacker.element,
                weaker: defender.element,
            },
        };
    }

    if defender.element.beats(attacker.element) {
        return ClashOutcome {
            winner: Side::Enemy,
            reason: ClashReason::ElementalAdvantage {
                winner: Side::Enemy,
                stronger: defender.element,
                weaker: attacker.element,
            },
        };
    }

    ClashOutcome {
        winner: Side::Enemy,
        reason: ClashReason::DefenderWinsTies,
    }
}
