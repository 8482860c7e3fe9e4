use std::collections::HashSet;
use std::fmt;
use std::hash::Hash;
use std::str::FromStr;

use crate::foundation::error::SketchreelError;
use crate::reveal::grid::{BlockId, GridModel};

/// Axis and sense along which every block is swept.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    serde::Serialize,
    serde::Deserialize,
    clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum Direction {
    #[default]
    #[serde(alias = "top-bottom")]
    #[value(alias = "top-bottom")]
    TopToBottom,
    #[serde(alias = "bottom-top")]
    #[value(alias = "bottom-top")]
    BottomToTop,
    #[serde(alias = "left-right")]
    #[value(alias = "left-right")]
    LeftToRight,
    #[serde(alias = "right-left")]
    #[value(alias = "right-left")]
    RightToLeft,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::TopToBottom,
        Direction::BottomToTop,
        Direction::LeftToRight,
        Direction::RightToLeft,
    ];

    pub fn is_vertical(self) -> bool {
        matches!(self, Direction::TopToBottom | Direction::BottomToTop)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::TopToBottom => "top-to-bottom",
            Direction::BottomToTop => "bottom-to-top",
            Direction::LeftToRight => "left-to-right",
            Direction::RightToLeft => "right-to-left",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = SketchreelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "top-to-bottom" | "top-bottom" => Ok(Direction::TopToBottom),
            "bottom-to-top" | "bottom-top" => Ok(Direction::BottomToTop),
            "left-to-right" | "left-right" => Ok(Direction::LeftToRight),
            "right-to-left" | "right-left" => Ok(Direction::RightToLeft),
            other => Err(SketchreelError::invalid_input(format!(
                "unknown direction \"{other}\""
            ))),
        }
    }
}

/// Ordered block selection; the first selected block is drawn first.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Selection {
    ids: Vec<BlockId>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keeps the first occurrence of each id.
    pub fn from_ids(ids: impl IntoIterator<Item = BlockId>) -> Self {
        let mut out = Self::new();
        for id in ids {
            if !out.ids.contains(&id) {
                out.ids.push(id);
            }
        }
        out
    }

    /// Parse textual ids, skipping any that are malformed.
    pub fn parse_lenient<S: AsRef<str>>(ids: impl IntoIterator<Item = S>) -> Self {
        Self::from_ids(ids.into_iter().filter_map(|s| {
            let s = s.as_ref();
            match s.parse::<BlockId>() {
                Ok(id) => Some(id),
                Err(_) => {
                    tracing::debug!(id = s, "ignoring malformed selection id");
                    None
                }
            }
        }))
    }

    /// Select `id` if absent, otherwise deselect it. Returns whether `id` is now selected.
    pub fn toggle(&mut self, id: BlockId) -> bool {
        if let Some(i) = self.ids.iter().position(|x| *x == id) {
            self.ids.remove(i);
            false
        } else {
            self.ids.push(id);
            true
        }
    }

    /// 1-based draw rank of a selected block.
    pub fn rank(&self, id: BlockId) -> Option<usize> {
        self.ids.iter().position(|x| *x == id).map(|i| i + 1)
    }

    pub fn ids(&self) -> &[BlockId] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Deterministic order in which content units are painted.
///
/// Always a permutation of the units it was built from: selected units first in selection
/// order, then the remaining units in their natural order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RevealPlan<U> {
    units: Vec<U>,
    selected: usize,
}

impl<U: Copy + Eq + Hash + fmt::Debug> RevealPlan<U> {
    /// Selection entries not among `all` are dropped.
    pub fn build(all: impl IntoIterator<Item = U>, selection: impl IntoIterator<Item = U>) -> Self {
        let all: Vec<U> = all.into_iter().collect();
        let universe: HashSet<U> = all.iter().copied().collect();

        let mut taken = HashSet::with_capacity(all.len());
        let mut units = Vec::with_capacity(all.len());
        for u in selection {
            if !universe.contains(&u) {
                tracing::debug!(unit = ?u, "ignoring selection outside the plan");
                continue;
            }
            if taken.insert(u) {
                units.push(u);
            }
        }
        let selected = units.len();
        units.extend(all.into_iter().filter(|u| !taken.contains(u)));

        Self { units, selected }
    }
}

impl<U> RevealPlan<U> {
    pub fn units(&self) -> &[U] {
        &self.units
    }

    pub fn iter(&self) -> std::slice::Iter<'_, U> {
        self.units.iter()
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// How many leading units came from the selection.
    pub fn selected_len(&self) -> usize {
        self.selected
    }
}

impl RevealPlan<BlockId> {
    pub fn for_grid(grid: &GridModel, selection: &Selection) -> Self {
        let plan = Self::build(grid.blocks(), selection.ids().iter().copied());
        tracing::debug!(
            blocks = plan.len(),
            selected = plan.selected_len(),
            "grid reveal plan"
        );
        plan
    }
}

impl RevealPlan<usize> {
    /// Characters are revealed in reading order.
    pub fn for_chars(count: usize) -> Self {
        Self {
            units: (0..count).collect(),
            selected: 0,
        }
    }
}

impl<'a, U> IntoIterator for &'a RevealPlan<U> {
    type Item = &'a U;
    type IntoIter = std::slice::Iter<'a, U>;

    fn into_iter(self) -> Self::IntoIter {
        self.units.iter()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/reveal/plan.rs"]
mod tests;
