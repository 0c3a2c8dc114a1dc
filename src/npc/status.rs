use bitflags::bitflags;

bitflags! {
    /// Per-tick agent state as bitwise flags
    /// Several can be set at once (e.g. MOVING | PATHFINDING | DETECTING)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct AgentStatus: u32 {
        const IDLE        = 1 << 0;  // 1 - nothing to do this tick
        const MOVING      = 1 << 1;  // 2 - following a path or steering
        const PATHFINDING = 1 << 2;  // 4 - ran a search this tick
        const BLOCKED     = 1 << 3;  // 8 - search came back empty
        const ATTACKING   = 1 << 4;  // 16 - attack directive emitted
        const HOLDING     = 1 << 5;  // 32 - dwelling at a waypoint / strategic point
        const DETECTING   = 1 << 6;  // 64 - player inside detection radius
    }
}

impl AgentStatus {
    /// True when the agent produced no motion this tick
    pub fn is_stationary(&self) -> bool {
        !self.contains(AgentStatus::MOVING)
    }
}
