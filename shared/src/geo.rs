use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BoundaryError {
    #[error("boundary dataset is not a valid feature collection: {0}")]
    Parse(#[from] serde_json::Error),
}

/// GeoJSON position; anything past longitude and latitude is ignored.
pub type Position = Vec<f64>;
pub type Ring = Vec<Position>;

/// Department boundary feature collection, one feature per department.
#[derive(Debug, Clone, Deserialize)]
pub struct BoundaryCollection {
    pub features: Vec<DepartmentFeature>,
}

impl BoundaryCollection {
    pub fn from_slice(bytes: &[u8]) -> Result<Self, BoundaryError> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DepartmentFeature {
    pub properties: DepartmentProperties,
    #[serde(default)]
    pub geometry: Option<Geometry>,
}

impl DepartmentFeature {
    pub fn code(&self) -> &str {
        &self.properties.code
    }

    pub fn name(&self) -> &str {
        &self.properties.name
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DepartmentProperties {
    pub code: String,
    #[serde(rename = "nom")]
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    Polygon {
        coordinates: Vec<Ring>,
    },
    MultiPolygon {
        coordinates: Vec<Vec<Ring>>,
    },
    #[serde(other)]
    Unsupported,
}

impl Geometry {
    /// Every ring of the geometry, outer rings and holes alike.
    pub fn rings(&self) -> Vec<&Ring> {
        match self {
            Self::Polygon { coordinates } => coordinates.iter().collect(),
            Self::MultiPolygon { coordinates } => coordinates.iter().flatten().collect(),
            Self::Unsupported => Vec::new(),
        }
    }
}
