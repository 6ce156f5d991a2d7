//! Battle session: two fighters, a fixed turn order and an append-only log.
//!
//! A session never suspends and never touches a clock; pacing and consent are
//! the runtime's business. Each [`BattleSession::step`] either fully resolves a
//! turn (both fighters updated, event appended) or fails without changing
//! anything.

use crate::ability::AbilityCatalog;
use crate::combat::{RollSource, TurnEvent, resolve_turn};
use crate::config::{BattleConfig, BattleMode};
use crate::error::CombatError;
use crate::fighter::{Fighter, HealthSnapshot, ParticipantId};

/// How a concluded session ended.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
pub enum Verdict {
    Victory {
        winner: ParticipantId,
        loser: ParticipantId,
        /// True when the turn cap ended the fight and remaining health decided it.
        by_stoppage: bool,
    },
    /// Turn cap reached with equal remaining health.
    Draw,
}

impl Verdict {
    pub fn winner(&self) -> Option<&ParticipantId> {
        match self {
            Self::Victory { winner, .. } => Some(winner),
            Self::Draw => None,
        }
    }

    pub fn loser(&self) -> Option<&ParticipantId> {
        match self {
            Self::Victory { loser, .. } => Some(loser),
            Self::Draw => None,
        }
    }
}

/// Final state of a session.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Conclusion {
    pub verdict: Verdict,
    pub turns: u32,
    /// Final health of both fighters, in session input order.
    pub health: [HealthSnapshot; 2],
}

impl Conclusion {
    /// Final health of the winner, if there is one.
    pub fn winner_health(&self) -> Option<&HealthSnapshot> {
        let winner = self.verdict.winner()?;
        self.health.iter().find(|h| &h.participant == winner)
    }
}

#[derive(Clone, Debug)]
pub struct BattleSession {
    fighters: [Fighter; 2],
    /// Indices into `fighters`, fastest first.
    order: [usize; 2],
    turn: u32,
    mode: BattleMode,
    config: BattleConfig,
    log: Vec<TurnEvent>,
}

impl BattleSession {
    /// Turn order is fixed here: speed descending, ties keep input order.
    pub fn new(first: Fighter, second: Fighter, mode: BattleMode, config: BattleConfig) -> Self {
        let order = if second.speed > first.speed {
            [1, 0]
        } else {
            [0, 1]
        };
        Self {
            fighters: [first, second],
            order,
            turn: 0,
            mode,
            config,
            log: Vec::new(),
        }
    }

    pub fn fighters(&self) -> &[Fighter; 2] {
        &self.fighters
    }

    pub fn mode(&self) -> BattleMode {
        self.mode
    }

    /// Turns resolved so far.
    pub fn turns(&self) -> u32 {
        self.turn
    }

    pub fn turn_cap(&self) -> u32 {
        self.config.turn_cap(self.mode)
    }

    pub fn log(&self) -> &[TurnEvent] {
        &self.log
    }

    /// The fighter that acts on odd turns.
    pub fn first_mover(&self) -> &Fighter {
        &self.fighters[self.order[0]]
    }

    pub fn is_finished(&self) -> bool {
        self.fighters.iter().any(Fighter::is_defeated) || self.turn >= self.turn_cap()
    }

    fn health(&self) -> [HealthSnapshot; 2] {
        [self.fighters[0].health(), self.fighters[1].health()]
    }

    /// Resolve the next turn.
    ///
    /// # Errors
    ///
    /// - [`CombatError::AlreadyConcluded`] once a fighter is down or the cap is hit
    /// - any resolver error; the session is left exactly as it was
    pub fn step(
        &mut self,
        catalog: &AbilityCatalog,
        rolls: &mut dyn RollSource,
    ) -> Result<TurnEvent, CombatError> {
        if self.is_finished() {
            return Err(CombatError::AlreadyConcluded { turns: self.turn });
        }

        let attacker_idx = self.order[(self.turn % 2) as usize];
        let defender_idx = 1 - attacker_idx;

        let mut attacker = self.fighters[attacker_idx].clone();
        let mut defender = self.fighters[defender_idx].clone();
        let outcome = resolve_turn(&mut attacker, &mut defender, catalog, &self.config, rolls)?;

        self.fighters[attacker_idx] = attacker;
        self.fighters[defender_idx] = defender;
        self.turn += 1;

        let attacker = &self.fighters[attacker_idx];
        let defender = &self.fighters[defender_idx];
        let event = TurnEvent {
            turn: self.turn,
            actor: attacker.id.clone(),
            actor_label: attacker.label.clone(),
            target: defender.id.clone(),
            target_label: defender.label.clone(),
            action: outcome.action,
            ability: outcome.ability.map(str::to_owned),
            damage: outcome.damage,
            healed: outcome.healed,
            critical: outcome.critical,
            narration: outcome.narration,
            health: self.health(),
        };
        self.log.push(event.clone());
        Ok(event)
    }

    /// Step until the session concludes.
    pub fn run(
        &mut self,
        catalog: &AbilityCatalog,
        rolls: &mut dyn RollSource,
    ) -> Result<Conclusion, CombatError> {
        while !self.is_finished() {
            self.step(catalog, rolls)?;
        }
        self.conclusion()
            .ok_or(CombatError::AlreadyConcluded { turns: self.turn })
    }

    /// The verdict, once the session is finished.
    pub fn conclusion(&self) -> Option<Conclusion> {
        if !self.is_finished() {
            return None;
        }

        let [a, b] = &self.fighters;
        let verdict = if let Some(down) = self.fighters.iter().position(Fighter::is_defeated) {
            let winner = &self.fighters[1 - down];
            Verdict::Victory {
                winner: winner.id.clone(),
                loser: self.fighters[down].id.clone(),
                by_stoppage: false,
            }
        } else if a.hp == b.hp {
            Verdict::Draw
        } else {
            let (winner, loser) = if a.hp > b.hp { (a, b) } else { (b, a) };
            Verdict::Victory {
                winner: winner.id.clone(),
                loser: loser.id.clone(),
                by_stoppage: true,
            }
        };

        Some(Conclusion {
            verdict,
            turns: self.turn,
            health: self.health(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ability::AbilityId;
    use crate::combat::SequenceRolls;

    /// 64-bit LCG, deterministic per seed.
    struct LcgRolls(u64);

    impl RollSource for LcgRolls {
        fn roll(&mut self) -> f64 {
            self.0 = self
                .0
                .wrapping_mul(6_364_136_223_846_793_005)
                .wrapping_add(1_442_695_040_888_963_407);
            (self.0 >> 11) as f64 / (1u64 << 53) as f64
        }
    }

    fn fighter(id: &str, speed: u32) -> Fighter {
        Fighter {
            id: ParticipantId::new(id),
            label: id.to_uppercase(),
            hp: 100,
            max_hp: 100,
            attack: 20,
            defense: 10,
            speed,
            crit_chance: 0.2,
            abilities: [AbilityId(3), AbilityId(11)],
        }
    }

    #[test]
    fn faster_fighter_acts_on_odd_turns() {
        let mut session = BattleSession::new(
            fighter("b", 12),
            fighter("a", 18),
            BattleMode::Competitive,
            BattleConfig::default(),
        );
        assert_eq!(session.first_mover().id.as_str(), "a");

        let catalog = AbilityCatalog::standard();
        let mut rolls = LcgRolls(7);
        while let Ok(event) = session.step(&catalog, &mut rolls) {
            let expected = if event.turn % 2 == 1 { "a" } else { "b" };
            assert_eq!(event.actor.as_str(), expected, "turn {}", event.turn);
        }
    }

    #[test]
    fn speed_ties_keep_input_order() {
        let session = BattleSession::new(
            fighter("x", 15),
            fighter("y", 15),
            BattleMode::Casual,
            BattleConfig::default(),
        );
        assert_eq!(session.first_mover().id.as_str(), "x");
    }

    #[test]
    fn loop_terminates_within_cap_for_any_seed() {
        let catalog = AbilityCatalog::standard();
        for mode in [BattleMode::Casual, BattleMode::Competitive] {
            for seed in 0..200 {
                let mut session = BattleSession::new(
                    fighter("a", 14),
                    fighter("b", 16),
                    mode,
                    BattleConfig::default(),
                );
                let mut rolls = LcgRolls(seed);
                let conclusion = session.run(&catalog, &mut rolls).expect("battle runs");
                assert!(conclusion.turns <= session.turn_cap());
                for event in session.log() {
                    for snapshot in &event.health {
                        assert!(snapshot.hp <= snapshot.max_hp);
                    }
                }
            }
        }
    }

    #[test]
    fn health_only_ever_drops_on_the_target() {
        let catalog = AbilityCatalog::standard();
        let mut session = BattleSession::new(
            fighter("a", 14),
            fighter("b", 16),
            BattleMode::Competitive,
            BattleConfig::default(),
        );
        let mut rolls = LcgRolls(42);
        let mut previous = [100u32, 100u32];
        while let Ok(event) = session.step(&catalog, &mut rolls) {
            for (index, snapshot) in event.health.iter().enumerate() {
                if snapshot.participant == event.actor {
                    assert!(snapshot.hp >= previous[index]);
                } else {
                    assert!(snapshot.hp <= previous[index]);
                }
                previous[index] = snapshot.hp;
            }
        }
    }

    #[test]
    fn knockout_names_the_survivor() {
        let catalog = AbilityCatalog::standard();
        let mut strong = fighter("a", 20);
        strong.attack = 400;
        let mut session = BattleSession::new(
            strong,
            fighter("b", 10),
            BattleMode::Casual,
            BattleConfig::default().without_abilities(),
        );
        // no crit, hit band, narration
        let mut rolls = SequenceRolls::new([0.9, 0.9, 0.9, 0.0]);
        let conclusion = session.run(&catalog, &mut rolls).expect("battle runs");
        assert_eq!(conclusion.turns, 1);
        assert_eq!(
            conclusion.verdict,
            Verdict::Victory {
                winner: ParticipantId::new("a"),
                loser: ParticipantId::new("b"),
                by_stoppage: false,
            }
        );
        assert_eq!(conclusion.winner_health().map(|h| h.hp), Some(100));
    }

    #[test]
    fn equal_health_at_cap_is_a_draw() {
        let catalog = AbilityCatalog::standard();
        let mut session = BattleSession::new(
            fighter("a", 12),
            fighter("b", 12),
            BattleMode::Casual,
            BattleConfig::default().without_abilities().with_turn_caps(2, 2),
        );
        // both turns dodged
        let mut rolls = SequenceRolls::new([0.9, 0.9, 0.0, 0.0]);
        let conclusion = session.run(&catalog, &mut rolls).expect("battle runs");
        assert_eq!(conclusion.turns, 2);
        assert_eq!(conclusion.verdict, Verdict::Draw);
        assert!(conclusion.winner_health().is_none());
    }

    #[test]
    fn more_health_at_cap_wins_by_stoppage() {
        let catalog = AbilityCatalog::standard();
        let mut session = BattleSession::new(
            fighter("a", 12),
            fighter("b", 10),
            BattleMode::Casual,
            BattleConfig::default().without_abilities().with_turn_caps(1, 1),
        );
        let mut rolls = SequenceRolls::new([0.9, 0.9, 0.9, 0.0]);
        let conclusion = session.run(&catalog, &mut rolls).expect("battle runs");
        assert_eq!(
            conclusion.verdict,
            Verdict::Victory {
                winner: ParticipantId::new("a"),
                loser: ParticipantId::new("b"),
                by_stoppage: true,
            }
        );
    }

    #[test]
    fn stepping_a_finished_session_is_rejected() {
        let catalog = AbilityCatalog::standard();
        let mut session = BattleSession::new(
            fighter("a", 12),
            fighter("b", 10),
            BattleMode::Casual,
            BattleConfig::default().with_turn_caps(0, 0),
        );
        assert!(session.is_finished());
        let err = session
            .step(&catalog, &mut SequenceRolls::empty())
            .unwrap_err();
        assert_eq!(err, CombatError::AlreadyConcluded { turns: 0 });
    }

    #[test]
    fn failed_turn_changes_nothing() {
        let catalog = AbilityCatalog::from_entries(vec![]);
        let mut session = BattleSession::new(
            fighter("a", 12),
            fighter("b", 10),
            BattleMode::Casual,
            BattleConfig::default(),
        );
        let before = session.fighters().clone();
        // ability branch against an empty catalog
        let err = session
            .step(&catalog, &mut SequenceRolls::new([0.0]))
            .unwrap_err();
        assert!(matches!(err, CombatError::UnknownAbility { .. }));
        assert_eq!(session.turns(), 0);
        assert!(session.log().is_empty());
        assert_eq!(session.fighters(), &before);
    }
}
