//! Brick layouts and level providers
//!
//! A layout is a 2D grid of small integers: 0 is empty, any other value is a
//! brick whose color is picked from the palette by value. Providers produce a
//! layout per level number; the fallback generator never fails.

use std::path::PathBuf;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::LayoutError;
use crate::sim::state::{Brick, BrickColor, GridSlot, PowerKind};

/// Row-major brick grid as produced by a level provider
///
/// Rows may be ragged or longer than the play field; cells outside the
/// `BRICK_ROWS x BRICK_COLS` grid are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BrickLayout(pub Vec<Vec<u32>>);

impl BrickLayout {
    /// Parse provider output, rejecting anything that places no bricks
    pub fn parse(json: &str) -> Result<Self, LayoutError> {
        let layout: Self = serde_json::from_str(json.trim())?;
        layout.validate()?;
        Ok(layout)
    }

    /// Generated level used when no provider answer is usable
    ///
    /// Full rows striped by color; one extra row every three levels.
    pub fn fallback(level: u32) -> Self {
        let rows = (4 + level as usize / 3).min(BRICK_ROWS);
        Self(
            (0..rows)
                .map(|r| vec![(r % BrickColor::PALETTE.len()) as u32 + 1; BRICK_COLS])
                .collect(),
        )
    }

    /// Non-empty cells that land inside the grid, row-major
    pub fn cells(&self) -> impl Iterator<Item = (GridSlot, u32)> + '_ {
        self.0.iter().take(BRICK_ROWS).enumerate().flat_map(|(r, row)| {
            row.iter()
                .take(BRICK_COLS)
                .enumerate()
                .filter(|(_, v)| **v > 0)
                .map(move |(c, v)| (GridSlot::new(r, c), *v))
        })
    }

    pub fn brick_count(&self) -> usize {
        self.cells().count()
    }

    pub fn validate(&self) -> Result<(), LayoutError> {
        if self.brick_count() == 0 {
            return Err(LayoutError::Empty);
        }
        Ok(())
    }

    /// Build full-health bricks, rolling a power-up for each one
    pub fn to_bricks<R: Rng>(&self, rng: &mut R, power_up_chance: f64) -> Vec<Brick> {
        self.cells()
            .filter_map(|(slot, value)| {
                let color = BrickColor::from_cell(value)?;
                let power_up = (rng.random::<f64>() < power_up_chance)
                    .then(|| PowerKind::ALL[rng.random_range(0..PowerKind::ALL.len())]);
                Some(Brick::at(slot, color, power_up))
            })
            .collect()
    }
}

/// Source of level layouts
///
/// Implementations may be slow or fail; the session bounds them with a timeout
/// and substitutes [`BrickLayout::fallback`].
#[allow(async_fn_in_trait)]
pub trait LevelProvider {
    async fn generate_level(&self, level: u32) -> Result<BrickLayout, LayoutError>;
}

/// Always answers with the generated fallback level
#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackLevels;

impl LevelProvider for FallbackLevels {
    async fn generate_level(&self, level: u32) -> Result<BrickLayout, LayoutError> {
        Ok(BrickLayout::fallback(level))
    }
}

/// Reads hand-made layouts from `level_<n>.json` files in a directory
#[derive(Debug, Clone)]
pub struct DirectoryLevels {
    pub dir: PathBuf,
}

impl DirectoryLevels {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, level: u32) -> PathBuf {
        self.dir.join(format!("level_{}.json", level))
    }
}

impl LevelProvider for DirectoryLevels {
    async fn generate_level(&self, level: u32) -> Result<BrickLayout, LayoutError> {
        let path = self.path_for(level);
        let json = tokio::fs::read_to_string(&path).await?;
        log::debug!("Read layout {}", path.display());
        BrickLayout::parse(&json)
    }
}
