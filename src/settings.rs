use serde::{Deserialize, Serialize};

/// Which surrounding cells count as "touching" the cluster
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Adjacency {
    /// 8 neighbors (orthogonal + diagonal) - conventional lattice DLA
    #[default]
    Moore,
    /// 4 diagonal neighbors only - grows on a checkerboard sub-lattice
    Diagonal,
    /// 4 neighbors (orthogonal only) - angular, cross-like patterns
    VonNeumann,
}

impl Adjacency {
    pub fn name(&self) -> &str {
        match self {
            Adjacency::Moore => "Moore",
            Adjacency::Diagonal => "Diagonal",
            Adjacency::VonNeumann => "VonNeumann",
        }
    }

    /// Parse a user-supplied adjacency name, accepting common aliases
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "moore" | "8" => Some(Adjacency::Moore),
            "diagonal" | "diag" | "x" => Some(Adjacency::Diagonal),
            "vonneumann" | "von-neumann" | "vn" | "4" => Some(Adjacency::VonNeumann),
            _ => None,
        }
    }

    /// Get the neighbor offsets for this adjacency policy
    pub fn offsets(&self) -> &'static [(i64, i64)] {
        match self {
            Adjacency::Moore => &[
                (-1, -1), (0, -1), (1, -1),
                (-1, 0),           (1, 0),
                (-1, 1),  (0, 1),  (1, 1),
            ],
            Adjacency::Diagonal => &[(-1, -1), (1, -1), (-1, 1), (1, 1)],
            Adjacency::VonNeumann => &[(-1, 0), (1, 0), (0, -1), (0, 1)],
        }
    }

    /// Whether every interior cell is reachable from the seed by chaining offsets.
    /// Diagonal steps preserve the parity of `x + y`, so only half the lattice is.
    pub fn covers_full_lattice(&self) -> bool {
        !matches!(self, Adjacency::Diagonal)
    }
}

/// Parameters of one aggregation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationSettings {
    /// Grid width in cells
    pub width: usize,
    /// Grid height in cells
    pub height: usize,
    /// Number of particles that must stick before the run ends
    pub target_count: usize,
    /// Neighbor policy used for sticking checks
    #[serde(default)]
    pub adjacency: Adjacency,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            target_count: 20000,
            adjacency: Adjacency::default(),
        }
    }
}

impl SimulationSettings {
    pub fn new(width: usize, height: usize, target_count: usize) -> Self {
        Self {
            width,
            height,
            target_count,
            adjacency: Adjacency::default(),
        }
    }

    pub fn with_adjacency(mut self, adjacency: Adjacency) -> Self {
        self.adjacency = adjacency;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offsets_exclude_center() {
        for adjacency in [Adjacency::Moore, Adjacency::Diagonal, Adjacency::VonNeumann] {
            assert!(!adjacency.offsets().contains(&(0, 0)));
        }
        assert_eq!(Adjacency::Moore.offsets().len(), 8);
        assert_eq!(Adjacency::Diagonal.offsets().len(), 4);
        assert_eq!(Adjacency::VonNeumann.offsets().len(), 4);
    }

    #[test]
    fn test_diagonal_offsets_change_both_axes() {
        assert!(Adjacency::Diagonal
            .offsets()
            .iter()
            .all(|&(dx, dy)| dx != 0 && dy != 0));
    }

    #[test]
    fn test_parse_aliases() {
        assert_eq!(Adjacency::parse("MOORE"), Some(Adjacency::Moore));
        assert_eq!(Adjacency::parse("diag"), Some(Adjacency::Diagonal));
        assert_eq!(Adjacency::parse("von-neumann"), Some(Adjacency::VonNeumann));
        assert_eq!(Adjacency::parse("hex"), None);
    }

    #[test]
    fn test_default_settings_are_640x480_with_20000() {
        let settings = SimulationSettings::default();
        assert_eq!(settings.width, 640);
        assert_eq!(settings.height, 480);
        assert_eq!(settings.target_count, 20000);
        assert_eq!(settings.adjacency, Adjacency::Moore);
    }

    #[test]
    fn test_missing_adjacency_defaults_to_moore() {
        let parsed: SimulationSettings =
            serde_json::from_str(r#"{"width": 9, "height": 7, "target_count": 3}"#).unwrap();
        assert_eq!(parsed, SimulationSettings::new(9, 7, 3));
    }
}
