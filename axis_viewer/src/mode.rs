//! Interaction mode: paused scenes take kinematic joint drags, simulating
//! scenes take physics drags. Exactly one of the two controllers is enabled
//! at any time; the viewer enforces that on every transition.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InteractionMode {
    #[default]
    Paused,
    Simulating,
}

impl InteractionMode {
    pub fn is_paused(self) -> bool {
        self == InteractionMode::Paused
    }
}
