pub mod cli;
pub mod convert;
pub mod drag;
pub mod joint_drag;
pub mod mode;
pub mod noise;
pub mod pick;
pub mod scene;
pub mod theme;
pub mod viewer;

pub use mode::InteractionMode;
pub use pick::{PickHit, Ray, RayCaster};
pub use scene::{BodyNode, BuiltScene, LightNode};
pub use viewer::{LoadedScene, Viewer};
