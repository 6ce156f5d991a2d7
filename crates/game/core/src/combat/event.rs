use crate::fighter::{HealthSnapshot, ParticipantId};

/// Kind of action a turn resolved into.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case")]
pub enum TurnAction {
    /// Basic attack that connected (possibly critical).
    Attack,
    /// Basic attack fully evaded.
    Dodge,
    /// Basic attack blocked.
    Block,
    /// An equipped ability was used.
    Ability,
}

/// One fully resolved turn, as emitted to the presentation layer.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TurnEvent {
    /// 1-based turn number.
    pub turn: u32,
    pub actor: ParticipantId,
    pub actor_label: String,
    pub target: ParticipantId,
    pub target_label: String,
    pub action: TurnAction,
    /// Name of the ability used, if any.
    pub ability: Option<String>,
    /// Damage dealt to the target after mitigation.
    pub damage: u32,
    /// Health restored to the actor.
    pub healed: u32,
    pub critical: bool,
    pub narration: String,
    /// Health of both fighters after the turn, in session input order.
    pub health: [HealthSnapshot; 2],
}

impl TurnEvent {
    pub fn is_finishing_blow(&self) -> bool {
        self.health
            .iter()
            .any(|snapshot| snapshot.participant == self.target && snapshot.hp == 0)
    }
}
