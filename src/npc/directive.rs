// Motion directive: the only thing an agent hands back to the host each tick

use serde::{Deserialize, Serialize};

use crate::geometry::{Vec2, WorldPosition};

/// Directive type (wire names match the host's lowercase tags)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DirectiveKind {
    Move,
    Attack,
    Patrol,
    Block,
    Wait,
}

impl DirectiveKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DirectiveKind::Move => "move",
            DirectiveKind::Attack => "attack",
            DirectiveKind::Patrol => "patrol",
            DirectiveKind::Block => "block",
            DirectiveKind::Wait => "wait",
        }
    }
}

/// `{type, direction, target}` for one agent for one tick
///
/// `direction` is a unit vector or zero. `target` is the world point the agent
/// is currently heading for (next waypoint, player, strategic point), if any.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MotionDirective {
    #[serde(rename = "type")]
    pub kind: DirectiveKind,
    pub direction: Vec2,
    pub target: Option<WorldPosition>,
}

impl MotionDirective {
    pub fn new(kind: DirectiveKind, direction: Vec2, target: Option<WorldPosition>) -> Self {
        Self {
            kind,
            direction: direction.normalize(),
            target,
        }
    }

    /// Head from `from` toward `to`
    pub fn toward(kind: DirectiveKind, from: WorldPosition, to: WorldPosition) -> Self {
        Self::new(kind, from.direction_to(&to), Some(to))
    }

    /// Hold position (no target)
    pub fn hold() -> Self {
        Self::new(DirectiveKind::Wait, Vec2::ZERO, None)
    }

    /// Hold position while facing `look`
    pub fn wait_facing(look: Vec2) -> Self {
        Self::new(DirectiveKind::Wait, look, None)
    }

    pub fn is_motionless(&self) -> bool {
        self.direction.is_zero()
    }
}

impl Default for MotionDirective {
    fn default() -> Self {
        Self::hold()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toward_normalizes() {
        let d = MotionDirective::toward(
            DirectiveKind::Attack,
            WorldPosition::new(100.0, 100.0),
            WorldPosition::new(140.0, 100.0),
        );
        assert_eq!(d.kind, DirectiveKind::Attack);
        assert!((d.direction.x - 1.0).abs() < 0.001);
        assert_eq!(d.target, Some(WorldPosition::new(140.0, 100.0)));
    }

    #[test]
    fn test_wire_format() {
        let json = serde_json::to_string(&MotionDirective::hold()).unwrap();
        assert!(json.contains(r#""type":"wait""#));
        assert!(MotionDirective::hold().is_motionless());
    }
}
