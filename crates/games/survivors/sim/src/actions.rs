/// Player inputs. Attacking is automatic; the player only steers and decides.
#[derive(Clone, Debug, PartialEq)]
pub enum SurvivorsInput {
    /// Movement direction. Longer vectors are clamped to unit length; zero stops.
    Move { x: f32, y: f32 },
    /// Pick one of the choices of the pending upgrade offer.
    ChooseUpgrade { index: usize },
    TogglePause,
}
