use std::{fmt, sync::Arc, time::Duration};

use rand::{Rng, seq::IndexedRandom as _};
use teamgen_data::{DataError, GameData, Member, Moveset, Norm};

use crate::{
    BattleError, Core, Deadline, GeneGroup, ReproductionContext, ReproductionError, Suggestion,
    TEAM_SIZE, gene_group::fmt_members, members_unique,
};

/// A complete roster: one [`Core`] plus one [`Suggestion`].
///
/// Besides its genes a team carries the state of the battle it is currently
/// taking part in: remaining health per member and the active member. That
/// state belongs to exactly one battle at a time and is reset by
/// [`Team::heal`].
#[derive(Debug, Clone)]
pub struct Team {
    core: Core,
    suggestion: Suggestion,
    members: Vec<Member>,
    battler: Vec<f64>,
    current: Option<usize>,
}

impl Team {
    #[must_use]
    pub fn new(core: Core, suggestion: Suggestion) -> Self {
        let members = core
            .members()
            .iter()
            .chain(suggestion.members())
            .cloned()
            .collect::<Vec<_>>();
        let battler = vec![1.0; members.len()];
        Self {
            core,
            suggestion,
            members,
            battler,
            current: None,
        }
    }

    #[must_use]
    pub fn core(&self) -> &Core {
        &self.core
    }

    #[must_use]
    pub fn suggestion(&self) -> &Suggestion {
        &self.suggestion
    }

    /// Core members followed by suggestion members.
    #[must_use]
    pub fn members(&self) -> &[Member] {
        &self.members
    }

    /// Full team-level validity: size, species distinctness, single Mega
    /// and the species ban.
    #[must_use]
    pub fn check_unique(&self, data: &GameData) -> bool {
        self.members.len() == TEAM_SIZE
            && members_unique(&self.members)
            && !self.members.iter().any(|m| data.is_banned(m))
    }

    /// Same genes, fresh battle state.
    #[must_use]
    pub fn get_elite(&self) -> Self {
        Self::new(self.core.clone(), self.suggestion.clone())
    }

    /// Returns `true` if both teams are made of the same gene groups.
    #[must_use]
    pub fn same_genes(&self, other: &Self) -> bool {
        self.core == other.core && self.suggestion == other.suggestion
    }

    /// Usage-weighted draw over the whole moveset table.
    pub fn weighted_sample<R>(data: &GameData, rng: &mut R) -> Result<Member, DataError>
    where
        R: Rng + ?Sized,
    {
        data.weighted_sample(rng)
    }

    /// Builds a random valid team: one candidate per core position, then
    /// usage-weighted fillers that keep the roster valid.
    pub fn random<R>(
        data: &GameData,
        deadline: &Deadline,
        rng: &mut R,
    ) -> Result<Self, ReproductionError>
    where
        R: Rng + ?Sized,
    {
        loop {
            let core = Core::from_members(
                (0..data.core_len())
                    .filter_map(|position| data.core_pool(position).choose(rng).cloned())
                    .collect(),
            );
            if core.check_unique() {
                let mut members = core.members().to_vec();
                let mut fillers = Vec::with_capacity(TEAM_SIZE.saturating_sub(core.len()));
                while members.len() < TEAM_SIZE && !deadline.is_expired() {
                    let candidate = Self::weighted_sample(data, rng)?;
                    if data.is_banned(&candidate) {
                        continue;
                    }
                    members.push(Arc::clone(&candidate));
                    if members_unique(&members) {
                        fillers.push(candidate);
                    } else {
                        members.pop();
                    }
                }
                let team = Self::new(core, Suggestion::from_members(fillers));
                if team.check_unique(data) {
                    return Ok(team);
                }
            }
            if deadline.is_expired() {
                return Err(ReproductionError::GenerationTimeout {
                    elapsed: deadline.elapsed(),
                });
            }
        }
    }

    /// Produces one valid offspring of two teams.
    ///
    /// Cores and suggestions are reproduced independently and the pair is
    /// retried until the combined team passes [`Team::check_unique`]. All
    /// retries share one wall-clock budget of `timeout`; running past it is
    /// reported as [`ReproductionError::Timeout`], which callers treat as
    /// fatal.
    pub fn reproduce<R>(
        first: &Self,
        second: &Self,
        ctx: &ReproductionContext<'_>,
        timeout: Duration,
        rng: &mut R,
    ) -> Result<Self, ReproductionError>
    where
        R: Rng + ?Sized,
    {
        let deadline = Deadline::after(timeout);
        let mut last_attempt = None;
        loop {
            let offspring = Core::reproduce(&first.core, &second.core, ctx, &deadline, rng)
                .and_then(|core| {
                    let suggestion = Suggestion::reproduce(
                        &first.suggestion,
                        &second.suggestion,
                        ctx,
                        &deadline,
                        rng,
                    )?;
                    Ok(Self::new(core, suggestion))
                });
            match offspring {
                Ok(attempt) if attempt.check_unique(ctx.data) => return Ok(attempt),
                Ok(attempt) => last_attempt = Some(attempt.to_string()),
                Err(err) => log::debug!("gene group reproduction stopped: {err}"),
            }
            if deadline.is_expired() {
                return Err(ReproductionError::Timeout {
                    elapsed: deadline.elapsed(),
                    first_parent: first.to_string(),
                    second_parent: second.to_string(),
                    last_attempt,
                });
            }
        }
    }

    /// Clears the active member and restores every member to full health.
    pub fn heal(&mut self) {
        self.current = None;
        self.battler = vec![1.0; self.members.len()];
    }

    #[must_use]
    pub fn current(&self) -> Option<&Member> {
        self.current.map(|slot| &self.members[slot])
    }

    /// Remaining health fraction of `member`, or `None` if it is not on this team.
    #[must_use]
    pub fn health(&self, member: &Moveset) -> Option<f64> {
        self.slot_of(member).map(|slot| self.battler[slot])
    }

    /// Sum of the remaining health fractions of all members.
    #[must_use]
    pub fn total_health(&self) -> f64 {
        self.battler.iter().sum()
    }

    fn slot_of(&self, member: &Moveset) -> Option<usize> {
        self.members.iter().position(|m| **m == *member)
    }

    fn alive_slots(&self) -> impl Iterator<Item = usize> + '_ {
        self.battler
            .iter()
            .enumerate()
            .filter(|(_, health)| **health > 0.0)
            .map(|(slot, _)| slot)
    }

    /// Sends in a living member and returns it.
    ///
    /// Without an opponent the choice is uniform over living members. Facing
    /// `opponent`, living members that counter it are preferred, falling back
    /// to any living member when none is left.
    pub fn switch<R>(
        &mut self,
        opponent: Option<&Moveset>,
        data: &GameData,
        rng: &mut R,
    ) -> Result<&Member, BattleError>
    where
        R: Rng + ?Sized,
    {
        let alive = self.alive_slots().collect::<Vec<_>>();
        let counters = opponent.map_or_else(Vec::new, |opponent| {
            alive
                .iter()
                .copied()
                .filter(|slot| data.is_counter(&self.members[*slot], opponent))
                .collect()
        });
        let pool = if counters.is_empty() { &alive } else { &counters };
        let slot = *pool.choose(rng).ok_or(BattleError::NoLivingMembers)?;
        self.current = Some(slot);
        Ok(&self.members[slot])
    }

    /// Subtracts `amount` from the active member's health, never going below 0.
    ///
    /// `amount` must be a non-negative number, so health stays within `[0, 1]`.
    pub fn damage_current(&mut self, amount: f64) -> Result<(), BattleError> {
        if amount.is_nan() || amount < 0.0 {
            return Err(BattleError::InvalidDamage { amount });
        }
        let slot = self.current.ok_or(BattleError::NoActiveMember)?;
        let health = &mut self.battler[slot];
        *health = (*health - amount).max(0.0);
        Ok(())
    }

    /// Returns `true` if the active member has no health left.
    #[must_use]
    pub fn is_fainted(&self) -> bool {
        self.current.is_some_and(|slot| self.battler[slot] <= 0.0)
    }

    /// Returns `true` while at least one member has health left.
    #[must_use]
    pub fn still_playing(&self) -> bool {
        self.alive_slots().next().is_some()
    }
}

impl From<&Norm> for Team {
    /// Wraps a rated opponent roster; all of its members form the core.
    fn from(norm: &Norm) -> Self {
        Self::new(
            Core::from_members(norm.members().to_vec()),
            Suggestion::from_members(vec![]),
        )
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_members(&self.members, f)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use rand::SeedableRng as _;
    use rand_pcg::Pcg64;
    use teamgen_data::fixture;

    use super::*;

    fn members(data: &GameData, names: &[&str]) -> Vec<Member> {
        names
            .iter()
            .map(|name| Arc::clone(data.find(name).unwrap()))
            .collect()
    }

    fn team(data: &GameData, core: &[&str], suggestion: &[&str]) -> Team {
        Team::new(
            Core::from_members(members(data, core)),
            Suggestion::from_members(members(data, suggestion)),
        )
    }

    fn balance(data: &GameData) -> Team {
        team(
            data,
            &["Garchomp Scarf", "Ferrothorn"],
            &["Toxapex", "Tapu Koko", "Clefable", "Rotom-Wash"],
        )
    }

    #[test]
    fn test_members_are_core_then_suggestion() {
        let data = fixture::game_data();
        let team = balance(&data);
        assert_eq!(
            team.to_string(),
            "Garchomp Scarf, Ferrothorn, Toxapex, Tapu Koko, Clefable, Rotom-Wash"
        );
        assert!(team.check_unique(&data));
    }

    #[test]
    fn test_team_validity_rules() {
        let data = fixture::game_data();
        let short = team(&data, &["Garchomp Scarf", "Ferrothorn"], &["Toxapex"]);
        assert!(!short.check_unique(&data));

        let duplicate_species = team(
            &data,
            &["Garchomp Scarf", "Ferrothorn"],
            &["Garchomp SD", "Tapu Koko", "Clefable", "Rotom-Wash"],
        );
        assert!(!duplicate_species.check_unique(&data));

        let two_megas = team(
            &data,
            &["Garchomp Scarf", "Metagross-Mega"],
            &["Charizard-Mega-X", "Tapu Koko", "Clefable", "Rotom-Wash"],
        );
        assert!(!two_megas.check_unique(&data));

        let ditto = team(
            &data,
            &["Garchomp Scarf", "Ferrothorn"],
            &["Ditto", "Tapu Koko", "Clefable", "Rotom-Wash"],
        );
        assert!(ditto.core().check_unique() && ditto.suggestion().check_unique());
        assert!(!ditto.check_unique(&data));
    }

    #[test]
    fn test_heal_resets_state() {
        let data = fixture::game_data();
        let mut team = balance(&data);
        let mut rng = Pcg64::seed_from_u64(20);
        team.switch(None, &data, &mut rng).unwrap();
        team.damage_current(0.4).unwrap();
        team.heal();
        assert!(team.current().is_none());
        for member in team.members().to_vec() {
            assert_eq!(team.health(&member), Some(1.0));
        }
    }

    #[test]
    fn test_damage_clamps_at_zero() {
        let data = fixture::game_data();
        let mut team = balance(&data);
        let active = Arc::clone(team.switch(None, &data, &mut Pcg64::seed_from_u64(21)).unwrap());
        for _ in 0..5 {
            team.damage_current(0.3).unwrap();
            assert!(team.health(&active).unwrap() >= 0.0);
        }
        assert_eq!(team.health(&active), Some(0.0));
        assert!(team.is_fainted());
        assert!(team.still_playing());
    }

    #[test]
    fn test_nan_damage_rejected() {
        let data = fixture::game_data();
        let mut team = balance(&data);
        team.switch(None, &data, &mut Pcg64::seed_from_u64(22)).unwrap();
        assert!(matches!(
            team.damage_current(f64::NAN),
            Err(BattleError::InvalidDamage { .. })
        ));
    }

    #[test]
    fn test_negative_damage_rejected() {
        let data = fixture::game_data();
        let mut team = balance(&data);
        let active = Arc::clone(team.switch(None, &data, &mut Pcg64::seed_from_u64(30)).unwrap());
        for amount in [-0.5, f64::NEG_INFINITY] {
            assert_eq!(
                team.damage_current(amount),
                Err(BattleError::InvalidDamage { amount })
            );
            assert_eq!(team.health(&active), Some(1.0));
        }
        team.damage_current(0.0).unwrap();
        assert_eq!(team.health(&active), Some(1.0));
    }

    #[test]
    fn test_damage_without_active_member() {
        let data = fixture::game_data();
        let mut team = balance(&data);
        assert_eq!(team.damage_current(0.1), Err(BattleError::NoActiveMember));
        assert!(!team.is_fainted());
    }

    #[test]
    fn test_switch_prefers_living_counters() {
        let data = fixture::game_data();
        let mut team = team(
            &data,
            &["Landorus-Therian", "Heatran"],
            &["Toxapex", "Tapu Koko", "Clefable", "Rotom-Wash"],
        );
        let ferrothorn = Arc::clone(data.find("Ferrothorn").unwrap());
        let garchomp = Arc::clone(data.find("Garchomp Scarf").unwrap());
        let mut rng = Pcg64::seed_from_u64(23);

        for _ in 0..20 {
            let picked = team.switch(Some(&*ferrothorn), &data, &mut rng).unwrap();
            assert_eq!(picked.name(), "Heatran");
        }
        // Clefable is the only counter to Scarf Garchomp on this team
        let picked = team.switch(Some(&*garchomp), &data, &mut rng).unwrap();
        assert_eq!(picked.name(), "Clefable");

        team.switch(Some(&*ferrothorn), &data, &mut rng).unwrap();
        team.damage_current(1.0).unwrap();
        for _ in 0..20 {
            let picked = team.switch(Some(&*ferrothorn), &data, &mut rng).unwrap();
            assert_ne!(picked.name(), "Heatran");
        }
    }

    #[test]
    fn test_switch_with_everyone_fainted() {
        let data = fixture::game_data();
        let mut team = balance(&data);
        let mut rng = Pcg64::seed_from_u64(24);
        while team.still_playing() {
            team.switch(None, &data, &mut rng).unwrap();
            team.damage_current(1.0).unwrap();
        }
        assert_eq!(
            team.switch(None, &data, &mut rng).unwrap_err(),
            BattleError::NoLivingMembers
        );
    }

    #[test]
    fn test_elite_has_same_genes_and_clean_state() {
        let data = fixture::game_data();
        let mut team = balance(&data);
        team.switch(None, &data, &mut Pcg64::seed_from_u64(25)).unwrap();
        team.damage_current(0.7).unwrap();
        let elite = team.get_elite();
        assert!(elite.same_genes(&team));
        assert!(elite.current().is_none());
        assert!((elite.total_health() - 6.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_random_teams_are_valid() {
        let data = fixture::game_data();
        let deadline = Deadline::after(Duration::from_secs(5));
        let mut rng = Pcg64::seed_from_u64(26);
        for _ in 0..50 {
            let team = Team::random(&data, &deadline, &mut rng).unwrap();
            assert!(team.check_unique(&data), "{team}");
            assert_eq!(team.core().len(), data.core_len());
        }
    }

    #[test]
    fn test_reproduce_yields_valid_team() {
        let data = fixture::game_data();
        let ctx = ReproductionContext {
            data: &data,
            mutation_prob: 0.2,
        };
        let a = balance(&data);
        let b = team(
            &data,
            &["Landorus-Therian", "Heatran"],
            &["Toxapex", "Magearna", "Charizard-Mega-Y", "Rotom-Wash"],
        );
        let mut rng = Pcg64::seed_from_u64(27);
        for _ in 0..50 {
            let child = Team::reproduce(&a, &b, &ctx, Duration::from_secs(10), &mut rng).unwrap();
            assert!(child.check_unique(&data), "{child}");
        }
    }

    #[test]
    fn test_reproduce_times_out_on_unsatisfiable_parents() {
        let data = fixture::game_data();
        let ctx = ReproductionContext {
            data: &data,
            mutation_prob: 0.0,
        };
        let stuck = team(
            &data,
            &["Garchomp Scarf", "Garchomp SD"],
            &["Toxapex", "Tapu Koko", "Clefable", "Rotom-Wash"],
        );
        let started = Instant::now();
        let err = Team::reproduce(
            &stuck,
            &stuck,
            &ctx,
            Duration::from_millis(50),
            &mut Pcg64::seed_from_u64(28),
        )
        .unwrap_err();
        assert!(started.elapsed() < Duration::from_secs(5));
        let ReproductionError::Timeout {
            elapsed,
            first_parent,
            ..
        } = err
        else {
            panic!("unexpected error: {err}");
        };
        assert!(elapsed >= Duration::from_millis(50));
        assert_eq!(first_parent, stuck.to_string());
    }

    #[test]
    fn test_team_level_rejection_retries_until_timeout() {
        // each gene group is valid on its own, but the union repeats a species
        let data = fixture::game_data();
        let ctx = ReproductionContext {
            data: &data,
            mutation_prob: 0.0,
        };
        let stuck = team(
            &data,
            &["Heatran", "Ferrothorn"],
            &["Heatran", "Tapu Koko", "Clefable", "Rotom-Wash"],
        );
        let err = Team::reproduce(
            &stuck,
            &stuck,
            &ctx,
            Duration::from_millis(30),
            &mut Pcg64::seed_from_u64(29),
        )
        .unwrap_err();
        let ReproductionError::Timeout { last_attempt, .. } = err else {
            panic!("unexpected error: {err}");
        };
        assert!(last_attempt.is_some());
    }

    #[test]
    fn test_norm_roster_becomes_core() {
        let data = fixture::game_data();
        let norm = &data.norms()[0];
        let team = Team::from(norm);
        assert_eq!(team.members().len(), norm.members().len());
        assert!(team.suggestion().is_empty());
    }
}
