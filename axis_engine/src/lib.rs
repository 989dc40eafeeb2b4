pub mod engine;
pub mod joint;
pub mod model;
pub mod state;

pub use engine::{Engine, EngineError};
pub use joint::{JointInfo, JointType, clamp_qpos, find_body_joint};
pub use model::{GeomKind, Model};
pub use state::State;
