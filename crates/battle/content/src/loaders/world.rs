//! World loader.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use anyhow::{bail, ensure};
use battle_core::{
    Card, CardId, CardStats, Challenge, ChallengeId, ChallengeTier, CollectionCard, GameId,
    PlayerId,
};

use crate::loaders::{LoadResult, read_file};
use crate::world::{GameSeed, World, WorldSpec};

/// Loader for world content from RON files.
pub struct WorldLoader;

impl WorldLoader {
    /// Load and resolve a world from a RON file.
    pub fn load(path: &Path) -> LoadResult<World> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    /// Parse and resolve a world from RON text.
    pub fn parse(content: &str) -> LoadResult<World> {
        let spec: WorldSpec = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse world RON: {}", e))?;
        Self::resolve(&spec)
    }

    /// Resolve name references into concrete cards.
    pub fn resolve(spec: &WorldSpec) -> LoadResult<World> {
        let mut cards: HashMap<&str, Card> = HashMap::new();
        let mut base_stats: HashMap<&str, CardStats> = HashMap::new();

        for card in &spec.cards {
            let stats = CardStats::new(card.power, card.vitality, card.element);
            ensure!(
                cards
                    .insert(card.name.as_str(), Card::base(card.name.clone(), stats))
                    .is_none(),
                "duplicate card name {:?}",
                card.name
            );
            base_stats.insert(card.name.as_str(), stats);
        }

        for leader in &spec.leaders {
            let Some(base) = base_stats.get(leader.base.as_str()) else {
                bail!(
                    "leader {:?} is based on unknown card {:?}",
                    leader.name,
                    leader.base
                );
            };
            ensure!(
                cards
                    .insert(
                        leader.name.as_str(),
                        Card::leader(leader.name.clone(), *base, leader.doubles),
                    )
                    .is_none(),
                "leader name {:?} is already taken",
                leader.name
            );
        }

        let mut challenges = Vec::with_capacity(spec.challenges.len());
        let mut challenge_ids = HashSet::new();
        for entry in &spec.challenges {
            ensure!(
                challenge_ids.insert(entry.id),
                "duplicate challenge id {}",
                entry.id
            );
            let lineup = entry
                .cards
                .iter()
                .map(|name| {
                    cards.get(name.as_str()).cloned().ok_or_else(|| {
                        anyhow::anyhow!("challenge {:?} uses unknown card {:?}", entry.name, name)
                    })
                })
                .collect::<LoadResult<Vec<_>>>()?;

            let tier: ChallengeTier = entry.tier.parse().map_err(|_| {
                anyhow::anyhow!("challenge {:?} has unknown tier {:?}", entry.name, entry.tier)
            })?;
            let challenge = Challenge {
                id: ChallengeId(entry.id),
                name: entry.name.clone(),
                tier,
                cards: lineup,
            };
            ensure!(
                challenge.is_well_formed(),
                "challenge {:?} is a {} but has {} cards, expected {}",
                entry.name,
                tier,
                challenge.len(),
                tier.expected_cards()
            );
            challenges.push(challenge);
        }

        let mut games = Vec::with_capacity(spec.games.len());
        let mut game_ids = HashSet::new();
        for entry in &spec.games {
            ensure!(game_ids.insert(entry.id), "duplicate game id {}", entry.id);

            let mut collection = Vec::with_capacity(entry.collection.len());
            for (slot, name) in entry.collection.iter().enumerate() {
                let Some(stats) = base_stats.get(name.as_str()) else {
                    bail!("game {} collects unknown card {:?}", entry.id, name);
                };
                ensure!(
                    !collection
                        .iter()
                        .any(|card: &CollectionCard| card.name == *name),
                    "game {} collects {:?} twice",
                    entry.id,
                    name
                );
                collection.push(CollectionCard::new(
                    CardId(slot as u64 + 1),
                    name.clone(),
                    *stats,
                ));
            }

            let deck = match &entry.deck {
                None => None,
                Some(names) => Some(
                    names
                        .iter()
                        .map(|name| {
                            collection
                                .iter()
                                .find(|card| card.name == *name)
                                .map(|card| card.id)
                                .ok_or_else(|| {
                                    anyhow::anyhow!(
                                        "deck of game {} uses {:?}, which is not in its collection",
                                        entry.id,
                                        name
                                    )
                                })
                        })
                        .collect::<LoadResult<Vec<_>>>()?,
                ),
            };

            games.push(GameSeed {
                id: GameId(entry.id),
                owner: PlayerId(entry.owner),
                collection,
                deck,
            });
        }

        Ok(World { challenges, games })
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use battle_core::Element;

    use super::*;

    const WORLD: &str = r#"
(
    cards: [
        (name: "Aragorn", power: 2, vitality: 5, element: fire),
        (name: "Luke", power: 3, vitality: 3, element: air),
        (name: "Merry", power: 2, vitality: 3, element: air),
    ],
    leaders: [
        (name: "Master Luke", base: "Luke", doubles: vitality),
    ],
    challenges: [
        (id: 1, name: "First Trial", tier: "skirmish", cards: ["Merry"]),
        (id: 2, name: "Jedi", tier: "skirmish", cards: ["Master Luke"]),
    ],
    games: [
        (id: 1, owner: 7, collection: ["Aragorn", "Merry"], deck: Some(["Merry"])),
        (id: 2, owner: 8, collection: ["Luke"]),
    ],
)
"#;

    #[test]
    fn resolves_names_into_cards() {
        let world = WorldLoader::parse(WORLD).unwrap();

        let jedi = world.challenge(ChallengeId(2)).unwrap();
        assert_eq!(jedi.tier, ChallengeTier::Skirmish);
        assert!(jedi.cards[0].kind.is_leader());
        assert_eq!(jedi.cards[0].stats(), CardStats::new(3, 6, Element::Air));

        let game = world.game(GameId(1)).unwrap();
        assert_eq!(game.owner, PlayerId(7));
        assert_eq!(game.collection[1].id, CardId(2));
        assert_eq!(game.deck, Some(vec![CardId(2)]));
        assert_eq!(world.game(GameId(2)).unwrap().deck, None);
    }

    #[test]
    fn rejects_tier_size_mismatch() {
        let broken = WORLD.replace(
            r#"tier: "skirmish", cards: ["Merry"]"#,
            r#"tier: "small-dungeon", cards: ["Merry"]"#,
        );
        let error = WorldLoader::parse(&broken).unwrap_err();
        assert!(error.to_string().contains("expected 4"), "{error}");
    }

    #[test]
    fn rejects_unknown_tier() {
        let broken = WORLD.replace(r#"tier: "skirmish", cards: ["Merry"]"#, r#"tier: "raid", cards: ["Merry"]"#);
        let error = WorldLoader::parse(&broken).unwrap_err();
        assert!(error.to_string().contains("unknown tier"), "{error}");
    }

    #[test]
    fn rejects_deck_outside_collection() {
        let broken = WORLD.replace(r#"deck: Some(["Merry"])"#, r#"deck: Some(["Luke"])"#);
        assert!(WorldLoader::parse(&broken).is_err());
    }

    #[test]
    fn rejects_leader_on_unknown_card() {
        let broken = WORLD.replace(r#"base: "Luke""#, r#"base: "Leia""#);
        assert!(WorldLoader::parse(&broken).is_err());
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(WORLD.as_bytes()).unwrap();

        let world = WorldLoader::load(file.path()).unwrap();
        assert_eq!(world.challenges.len(), 2);
    }

    #[test]
    fn shipped_world_is_consistent() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../../data/world.ron");
        let world = WorldLoader::load(&path).unwrap();

        assert_eq!(world.challenges.len(), 4);
        let abyss = world.challenge(ChallengeId(3)).unwrap();
        assert_eq!(abyss.tier, ChallengeTier::LargeDungeon);
        assert_eq!(abyss.cards[5].stats(), CardStats::new(10, 4, Element::Fire));

        let game = world.game(GameId(1)).unwrap();
        assert_eq!(game.collection.len(), 7);
        assert_eq!(game.deck.as_ref().map(Vec::len), Some(4));
    }
}
