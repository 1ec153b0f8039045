pub mod colors;
pub mod department;
pub mod geo;
pub mod map;
pub mod projection;
pub mod registry;

pub use colors::{UNASSIGNED_COLOR, representative_color};
pub use department::{UNASSIGNED_LABEL, normalize_department_code};
pub use geo::{BoundaryCollection, BoundaryError, DepartmentFeature, Geometry};
pub use map::{MAP_HEIGHT, MAP_WIDTH, render_empty_surface, render_map_svg};
pub use projection::ConicConformal;
pub use registry::{DuplicateAssignment, Registry, Representative};
