//! Game configuration validation.

use std::fs;
use std::path::{Path, PathBuf};

use warbound_core::config::GameConfig;
use warbound_core::game::Game;
use warbound_core::roster::UnitRoster;
use warbound_core::terrain::TerrainKind;
use warbound_core::unit::Player;

use crate::error::{Result, ToolError};

/// Summary of a configuration that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    /// File the configuration came from.
    pub path: PathBuf,
    /// Board height.
    pub rows: i32,
    /// Board width.
    pub cols: i32,
    /// Cells per terrain kind, in [`TerrainKind::ALL`] order.
    pub census: [usize; 3],
    /// Units fielded by Player One.
    pub player1_units: usize,
    /// Units fielded by Player Two.
    pub player2_units: usize,
}

impl std::fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {}x{} board, {} units vs {}",
            self.path.display(),
            self.rows,
            self.cols,
            self.player1_units,
            self.player2_units
        )?;
        for (kind, count) in TerrainKind::ALL.iter().zip(self.census) {
            write!(f, ", {count} {}", kind.name().to_lowercase())?;
        }
        Ok(())
    }
}

/// Read and parse a RON configuration file.
///
/// # Errors
///
/// [`ToolError::Io`] if the file cannot be read, and [`ToolError::Game`]
/// if it is not a valid configuration.
pub fn load_config(path: &Path) -> Result<GameConfig> {
    let text = fs::read_to_string(path).map_err(|source| ToolError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(GameConfig::from_ron(&text, &path.display().to_string())?)
}

/// Check that a configuration describes a playable game.
///
/// # Errors
///
/// [`ToolError::Invalid`] listing every problem found, or the first error
/// from starting the game.
pub fn validate_config(config: &GameConfig, path: &Path) -> Result<ValidationReport> {
    let problems = config.validate();
    if !problems.is_empty() {
        return Err(ToolError::Invalid {
            path: path.to_path_buf(),
            problems,
        });
    }

    let game = Game::from_config(config)?;
    let roster = game.roster();
    Ok(ValidationReport {
        path: path.to_path_buf(),
        rows: game.graph().rows(),
        cols: game.graph().cols(),
        census: game.terrain().census(),
        player1_units: roster.living(Player::One).len(),
        player2_units: roster.living(Player::Two).len(),
    })
}

/// Load and validate one configuration file.
///
/// # Errors
///
/// Any error from [`load_config`] or [`validate_config`].
pub fn validate_config_file(path: &Path) -> Result<ValidationReport> {
    let config = load_config(path)?;
    validate_config(&config, path)
}

/// Validate every `.ron` file in a directory, in name order.
///
/// Returns one entry per file so a single bad file does not hide the rest.
///
/// # Errors
///
/// [`ToolError::Io`] if the directory cannot be listed.
pub fn validate_data_directory(dir: &Path) -> Result<Vec<(PathBuf, Result<ValidationReport>)>> {
    let io_error = |source| ToolError::Io {
        path: dir.to_path_buf(),
        source,
    };

    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_error)? {
        let path = entry.map_err(io_error)?.path();
        if path.extension().is_some_and(|ext| ext == "ron") {
            files.push(path);
        }
    }
    files.sort();

    Ok(files
        .into_iter()
        .map(|path| {
            let result = validate_config_file(&path);
            (path, result)
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use warbound_core::config::TerrainSource;

    const SKIRMISH: &str = include_str!("../data/skirmish.ron");

    #[test]
    fn test_bundled_skirmish_is_valid() {
        let config = GameConfig::from_ron(SKIRMISH, "skirmish.ron").unwrap();
        let report = validate_config(&config, Path::new("skirmish.ron")).unwrap();
        assert_eq!((report.rows, report.cols), (10, 12));
        assert_eq!(report.census.iter().sum::<usize>(), 120);
        assert!(report.player1_units > 0 && report.player2_units > 0);
        assert!(report.to_string().starts_with("skirmish.ron: 10x12 board"));
    }

    #[test]
    fn test_problems_are_collected() {
        let config = GameConfig {
            terrain: TerrainSource::Layout(vec!["..".into(), ".X".into()]),
            rows: 2,
            cols: 2,
            player1_army: vec![],
            ..GameConfig::default()
        };
        let err = validate_config(&config, Path::new("bad.ron")).unwrap_err();
        let problems = match err {
            ToolError::Invalid { problems, .. } => problems,
            other => panic!("expected a list of problems, got {other}"),
        };
        assert_eq!(problems.len(), 2);
        assert!(problems[0].starts_with("terrain"));
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = validate_config_file(Path::new("does/not/exist.ron")).unwrap_err();
        assert!(matches!(err, ToolError::Io { .. }));
        assert!(err.to_string().contains("does/not/exist.ron"));
    }

    #[test]
    fn test_bundled_data_directory() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("data");
        let results = validate_data_directory(&dir).unwrap();
        assert!(!results.is_empty());
        for (path, result) in results {
            assert!(result.is_ok(), "{}: {:?}", path.display(), result);
        }
    }
}
