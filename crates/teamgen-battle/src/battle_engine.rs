use std::fmt;

use rand::{Rng as _, RngCore};
use rand_distr::Normal;
use serde::{Deserialize, Serialize};
use teamgen_data::GameData;
use teamgen_team::{BattleError, Team};

/// One of the two teams passed to [`BattleEngine::battle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum Side {
    First,
    Second,
}

impl Side {
    #[must_use]
    pub fn opposite(self) -> Self {
        match self {
            Self::First => Self::Second,
            Self::Second => Self::First,
        }
    }
}

/// Resolves a single battle between two teams.
///
/// Implementations own the battle state of both teams for the duration of
/// the call and must leave the decision of who won in the returned [`Side`].
pub trait BattleEngine: fmt::Debug + Send + Sync {
    fn battle(
        &self,
        first: &mut Team,
        second: &mut Team,
        data: &GameData,
        rng: &mut dyn RngCore,
    ) -> Result<Side, BattleError>;
}

/// Tuning of [`DuelBattleEngine`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DuelParams {
    /// Health fraction removed by a neutral hit.
    pub base_damage: f64,
    /// Damage multiplier when the attacker counters the defender.
    pub counter_multiplier: f64,
    /// Standard deviation of the multiplicative damage roll around 1.0.
    pub damage_spread: f64,
    /// Turns after which the side with more total health is declared winner.
    pub turn_limit: usize,
}

impl Default for DuelParams {
    fn default() -> Self {
        Self {
            base_damage: 0.35,
            counter_multiplier: 2.0,
            damage_spread: 0.15,
            turn_limit: 500,
        }
    }
}

#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("invalid duel parameter `{field}`: {reason}")]
pub struct DuelParamsError {
    pub field: &'static str,
    pub reason: &'static str,
}

impl DuelParams {
    pub fn validate(&self) -> Result<(), DuelParamsError> {
        let fail = |field, reason| Err(DuelParamsError { field, reason });
        if !(self.base_damage.is_finite() && self.base_damage >= 0.0) {
            return fail("base_damage", "must be a finite non-negative number");
        }
        if !(self.counter_multiplier.is_finite() && self.counter_multiplier >= 0.0) {
            return fail("counter_multiplier", "must be a finite non-negative number");
        }
        if !(self.damage_spread.is_finite() && self.damage_spread >= 0.0) {
            return fail("damage_spread", "must be a finite non-negative number");
        }
        if self.turn_limit == 0 {
            return fail("turn_limit", "must be at least 1");
        }
        Ok(())
    }
}

/// Counter-driven damage race between the active members of two teams.
///
/// Each turn a coin flip decides who attacks first; both active members hit
/// each other and an attacker registered as a counter to its target deals
/// multiplied damage. Fainted members are replaced preferring counters to
/// the member that knocked them out.
#[derive(Debug, Clone, Copy)]
pub struct DuelBattleEngine {
    params: DuelParams,
    roll: Normal<f64>,
}

impl DuelBattleEngine {
    pub fn new(params: DuelParams) -> Result<Self, DuelParamsError> {
        params.validate()?;
        let roll = Normal::new(1.0, params.damage_spread).map_err(|_| DuelParamsError {
            field: "damage_spread",
            reason: "must be a finite non-negative number",
        })?;
        Ok(Self { params, roll })
    }

    #[must_use]
    pub fn params(&self) -> &DuelParams {
        &self.params
    }

    fn attack(
        &self,
        attacker: &mut Team,
        defender: &mut Team,
        data: &GameData,
        rng: &mut dyn RngCore,
    ) -> Result<bool, BattleError> {
        let striker = attacker.current().cloned().ok_or(BattleError::NoActiveMember)?;
        let target = defender.current().cloned().ok_or(BattleError::NoActiveMember)?;
        let multiplier = if data.is_counter(&striker, &target) {
            self.params.counter_multiplier
        } else {
            1.0
        };
        let damage = (self.params.base_damage * multiplier * rng.sample(self.roll)).max(0.0);
        defender.damage_current(damage)?;
        if defender.is_fainted() {
            if !defender.still_playing() {
                return Ok(true);
            }
            defender.switch(Some(&*striker), data, rng)?;
        }
        Ok(false)
    }
}

impl Default for DuelBattleEngine {
    fn default() -> Self {
        Self::new(DuelParams::default()).expect("default damage spread is valid")
    }
}

impl BattleEngine for DuelBattleEngine {
    fn battle(
        &self,
        first: &mut Team,
        second: &mut Team,
        data: &GameData,
        rng: &mut dyn RngCore,
    ) -> Result<Side, BattleError> {
        first.heal();
        second.heal();
        first.switch(None, data, rng)?;
        second.switch(None, data, rng)?;

        for _ in 0..self.params.turn_limit {
            let leader = if rng.random_bool(0.5) {
                Side::First
            } else {
                Side::Second
            };
            for side in [leader, leader.opposite()] {
                let (attacker, defender) = match side {
                    Side::First => (&mut *first, &mut *second),
                    Side::Second => (&mut *second, &mut *first),
                };
                if self.attack(attacker, defender, data, rng)? {
                    return Ok(side);
                }
            }
        }

        if first.total_health() >= second.total_health() {
            Ok(Side::First)
        } else {
            Ok(Side::Second)
        }
    }
}
