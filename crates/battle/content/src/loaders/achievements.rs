//! Achievement catalog loader.

use std::collections::HashSet;
use std::path::Path;

use anyhow::ensure;
use battle_core::{AchievementCatalog, AchievementDefinition};
use serde::Deserialize;

use crate::loaders::{LoadResult, read_file};

#[derive(Deserialize)]
struct AchievementFile {
    #[serde(default)]
    achievement: Vec<AchievementDefinition>,
}

/// Loader for achievement definitions from TOML files.
///
/// Each definition is an `[[achievement]]` table:
///
/// ```toml
/// [[achievement]]
/// id = 1
/// name = "First Victory"
/// category = "win-count"
/// threshold = 1
/// reward_points = 10
/// ```
pub struct AchievementLoader;

impl AchievementLoader {
    /// Load a catalog from a TOML file.
    pub fn load(path: &Path) -> LoadResult<AchievementCatalog> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> LoadResult<AchievementCatalog> {
        let file: AchievementFile = toml::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse achievements TOML: {}", e))?;

        let mut ids = HashSet::new();
        for definition in &file.achievement {
            ensure!(
                ids.insert(definition.id),
                "duplicate achievement id {}",
                definition.id
            );
            ensure!(
                definition.threshold > 0,
                "achievement {:?} needs a positive threshold",
                definition.name
            );
        }

        Ok(AchievementCatalog::new(file.achievement))
    }
}

#[cfg(test)]
mod tests {
    use battle_core::{AchievementCategory, AchievementId};

    use super::*;

    const CATALOG: &str = r#"
[[achievement]]
id = 1
name = "First Victory"
category = "win-count"
threshold = 1
reward_points = 10

[[achievement]]
id = 5
name = "On a Roll"
category = "streak"
threshold = 3
reward_points = 25
"#;

    #[test]
    fn parses_definitions_in_order() {
        let catalog = AchievementLoader::parse(CATALOG).unwrap();

        assert_eq!(catalog.len(), 2);
        let streak = catalog.get(AchievementId(5)).unwrap();
        assert_eq!(streak.category, AchievementCategory::Streak);
        assert_eq!(streak.threshold, 3);
        assert_eq!(catalog.definitions()[0].name, "First Victory");
    }

    #[test]
    fn rejects_duplicate_ids() {
        let broken = CATALOG.replace("id = 5", "id = 1");
        let error = AchievementLoader::parse(&broken).unwrap_err();
        assert!(error.to_string().contains("duplicate"), "{error}");
    }

    #[test]
    fn rejects_zero_threshold() {
        let broken = CATALOG.replace("threshold = 3", "threshold = 0");
        assert!(AchievementLoader::parse(&broken).is_err());
    }

    #[test]
    fn rejects_unknown_category() {
        let broken = CATALOG.replace("\"streak\"", "\"draw-count\"");
        assert!(AchievementLoader::parse(&broken).is_err());
    }

    #[test]
    fn empty_file_is_an_empty_catalog() {
        assert!(AchievementLoader::parse("").unwrap().is_empty());
    }

    #[test]
    fn shipped_catalog_matches_standard() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../../data/achievements.toml");
        let catalog = AchievementLoader::load(&path).unwrap();
        assert_eq!(catalog, AchievementCatalog::standard());
    }
}
