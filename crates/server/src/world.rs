//! Seeding the in-memory world from loaded content.

use anyhow::Result;
use battle_content::World;
use battle_runtime::{GameRecord, MemoryWorld};

/// Build a [`MemoryWorld`] holding every challenge and starting game.
pub fn seed(content: &World) -> Result<MemoryWorld> {
    let world = MemoryWorld::new();

    for challenge in &content.challenges {
        world.insert_challenge(challenge.clone())?;
    }

    for entry in &content.games {
        let mut game = GameRecord::new(entry.owner);
        game.collection = entry
            .collection
            .iter()
            .map(|card| (card.id, card.clone()))
            .collect();
        game.deck = entry.deck.clone();
        world.insert_game(entry.id, game)?;
    }

    tracing::info!(
        challenges = content.challenges.len(),
        games = content.games.len(),
        "World seeded"
    );
    Ok(world)
}

#[cfg(test)]
mod tests {
    use battle_content::GameSeed;
    use battle_core::{CardId, CardStats, CollectionCard, Element, GameId, PlayerId};

    use super::*;

    #[test]
    fn seeds_games_with_their_decks() {
        let content = World {
            challenges: Vec::new(),
            games: vec![GameSeed {
                id: GameId(3),
                owner: PlayerId(9),
                collection: vec![CollectionCard::new(
                    CardId(1),
                    "Frodo",
                    CardStats::new(2, 2, Element::Water),
                )],
                deck: Some(vec![CardId(1)]),
            }],
        };

        let world = seed(&content).unwrap();
        let game = world.game(GameId(3)).unwrap().unwrap();
        assert_eq!(game.owner, PlayerId(9));
        assert_eq!(game.collection[&CardId(1)].name, "Frodo");
        assert_eq!(game.deck, Some(vec![CardId(1)]));
    }
}
