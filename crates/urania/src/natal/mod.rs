pub mod dominants;
pub mod request;
pub mod types;

pub use dominants::Dominants;
pub use request::{HouseSystem, NatalRequest, ValidationIssue, ZodiacType};
pub use types::{
    Angles, AspectsSummary, ChartAngle, HouseCusp, NatalChart, Planet, SubjectInfo,
    UpstreamAspect,
};
