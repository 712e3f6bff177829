/// Named anatomical landmarks and the store holding their placed positions
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use nalgebra::Point3;

use crate::error::LandmarkError;

/// The fixed set of landmarks a clinician can place on the femur.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Landmark {
    FemurCenter,
    HipCenter,
    FemurProximalCanal,
    FemurDistalCanal,
    MedialEpicondyle,
    LateralEpicondyle,
    DistalMedialPt,
    DistalLateralPt,
    PosteriorMedialPt,
    PosteriorLateralPt,
}

impl Landmark {
    pub const COUNT: usize = 10;

    /// All landmarks in placement order.
    pub const ALL: [Landmark; Self::COUNT] = [
        Landmark::FemurCenter,
        Landmark::HipCenter,
        Landmark::FemurProximalCanal,
        Landmark::FemurDistalCanal,
        Landmark::MedialEpicondyle,
        Landmark::LateralEpicondyle,
        Landmark::DistalMedialPt,
        Landmark::DistalLateralPt,
        Landmark::PosteriorMedialPt,
        Landmark::PosteriorLateralPt,
    ];

    /// Display name used in landmark files and user interfaces.
    pub fn name(self) -> &'static str {
        match self {
            Landmark::FemurCenter => "Femur Center",
            Landmark::HipCenter => "Hip Center",
            Landmark::FemurProximalCanal => "Femur Proximal Canal",
            Landmark::FemurDistalCanal => "Femur Distal Canal",
            Landmark::MedialEpicondyle => "Medial Epicondyle",
            Landmark::LateralEpicondyle => "Lateral Epicondyle",
            Landmark::DistalMedialPt => "Distal Medial Pt",
            Landmark::DistalLateralPt => "Distal Lateral Pt",
            Landmark::PosteriorMedialPt => "Posterior Medial Pt",
            Landmark::PosteriorLateralPt => "Posterior Lateral Pt",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Landmark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Landmark {
    type Err = LandmarkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Landmark::ALL
            .iter()
            .copied()
            .find(|landmark| landmark.name().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| LandmarkError::UnknownName(s.to_string()))
    }
}

/// Placed landmark positions, at most one per name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LandmarkStore {
    points: [Option<Point3<f64>>; Landmark::COUNT],
}

impl LandmarkStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Place or move a landmark. Returns the previous position, if any.
    pub fn place(
        &mut self,
        landmark: Landmark,
        position: Point3<f64>,
    ) -> Result<Option<Point3<f64>>, LandmarkError> {
        if !position.coords.iter().all(|c| c.is_finite()) {
            return Err(LandmarkError::NonFinite(landmark));
        }
        Ok(self.points[landmark.index()].replace(position))
    }

    pub fn clear(&mut self, landmark: Landmark) -> Option<Point3<f64>> {
        self.points[landmark.index()].take()
    }

    pub fn get(&self, landmark: Landmark) -> Option<Point3<f64>> {
        self.points[landmark.index()]
    }

    pub fn is_placed(&self, landmark: Landmark) -> bool {
        self.points[landmark.index()].is_some()
    }

    /// Placed landmarks in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (Landmark, Point3<f64>)> + '_ {
        Landmark::ALL
            .iter()
            .filter_map(move |&landmark| self.get(landmark).map(|p| (landmark, p)))
    }

    pub fn len(&self) -> usize {
        self.points.iter().filter(|p| p.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Parse a JSON object mapping display names to `[x, y, z]`.
    pub fn from_json_str(input: &str) -> Result<Self, LandmarkError> {
        let raw: BTreeMap<String, [f64; 3]> = serde_json::from_str(input)?;
        let mut store = Self::new();
        for (name, [x, y, z]) in raw {
            let landmark: Landmark = name.parse()?;
            store.place(landmark, Point3::new(x, y, z))?;
        }
        Ok(store)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, LandmarkError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| LandmarkError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let store = Self::from_json_str(&text)?;
        log::info!("loaded {} landmarks from {}", store.len(), path.display());
        Ok(store)
    }

    pub fn to_json_string(&self) -> Result<String, LandmarkError> {
        let raw: BTreeMap<&str, [f64; 3]> = self
            .iter()
            .map(|(landmark, p)| (landmark.name(), [p.x, p.y, p.z]))
            .collect();
        Ok(serde_json::to_string_pretty(&raw)?)
    }
}
