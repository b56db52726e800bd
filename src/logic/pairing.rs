//! Team suggestions that avoid repeating pairings seen today.
//!
//! Randomized local search, not exhaustive: bounded attempts keep the cost
//! flat and make suggestions vary run to run. Insufficient pool size is the
//! only hard failure; a "least bad" split is always returned otherwise.

use std::collections::HashSet;

use rand::seq::SliceRandom;

use crate::models::{Match, MatchMode, PlayerId};

/// Weights and attempt cap for the search. Tests override these to force
/// deterministic outcomes.
#[derive(Clone, Copy, Debug)]
pub struct PairingConfig {
    /// Random draws of 4 players before settling for the best split seen.
    pub attempts: u32,
    /// Cost added per team that repeats a teammate pairing from today.
    pub teammate_cost: u32,
    /// Cost added per cross-team pair that already faced each other today.
    pub opponent_cost: u32,
}

impl Default for PairingConfig {
    fn default() -> Self {
        Self {
            attempts: 400,
            teammate_cost: 10,
            opponent_cost: 3,
        }
    }
}

/// A proposed assignment. Suggestion only: nothing is reserved, and the
/// creation call re-validates availability against fresh state.
#[derive(Clone, Copy, Debug, Eq, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TeamSuggestion {
    pub a1: PlayerId,
    pub a2: Option<PlayerId>,
    pub b1: PlayerId,
    pub b2: Option<PlayerId>,
}

/// Unordered pair key for teammate/opponent sets.
fn pair_key(x: PlayerId, y: PlayerId) -> (PlayerId, PlayerId) {
    if x <= y {
        (x, y)
    } else {
        (y, x)
    }
}

/// Unordered pairs that have been teammates today (full teams of 2 only).
fn teammate_pairs(matches: &[Match]) -> HashSet<(PlayerId, PlayerId)> {
    let mut set = HashSet::new();
    for m in matches {
        if let Some(a2) = m.a2 {
            set.insert(pair_key(m.a1, a2));
        }
        if let Some(b2) = m.b2 {
            set.insert(pair_key(m.b1, b2));
        }
    }
    set
}

/// Unordered pairs that have faced each other today (team A x team B).
fn opponent_pairs(matches: &[Match]) -> HashSet<(PlayerId, PlayerId)> {
    let mut set = HashSet::new();
    for m in matches {
        for a in m.team_a() {
            for b in m.team_b() {
                set.insert(pair_key(a, b));
            }
        }
    }
    set
}

/// Propose teams from the eligible pool, given all of today's matches at
/// the venue (any state). Returns None only when the pool is too small:
/// fewer than 2 for singles, fewer than 4 for doubles.
pub fn suggest_teams(
    rng: &mut impl rand::Rng,
    pool: &[PlayerId],
    todays_matches: &[Match],
    mode: MatchMode,
    config: &PairingConfig,
) -> Option<TeamSuggestion> {
    match mode {
        MatchMode::Singles => {
            // Too few degrees of freedom to avoid repeats: uniform pick.
            if pool.len() < 2 {
                return None;
            }
            let mut ids = pool.to_vec();
            ids.shuffle(rng);
            Some(TeamSuggestion {
                a1: ids[0],
                a2: None,
                b1: ids[1],
                b2: None,
            })
        }
        MatchMode::Doubles => {
            suggest_doubles(rng, pool, todays_matches, config)
        }
    }
}

fn suggest_doubles(
    rng: &mut impl rand::Rng,
    pool: &[PlayerId],
    todays_matches: &[Match],
    config: &PairingConfig,
) -> Option<TeamSuggestion> {
    if pool.len() < 4 {
        return None;
    }

    let used_pairs = teammate_pairs(todays_matches);
    let used_opponents = opponent_pairs(todays_matches);

    let mut ids = pool.to_vec();
    let mut best: Option<TeamSuggestion> = None;
    let mut best_cost = u32::MAX;

    for _ in 0..config.attempts {
        ids.shuffle(rng);
        let pick = [ids[0], ids[1], ids[2], ids[3]];

        // The 3 ways to split 4 players into two unordered teams of 2.
        let splits = [
            ([pick[0], pick[1]], [pick[2], pick[3]]),
            ([pick[0], pick[2]], [pick[1], pick[3]]),
            ([pick[0], pick[3]], [pick[1], pick[2]]),
        ];

        for (a, b) in splits {
            let mut cost = 0;
            if used_pairs.contains(&pair_key(a[0], a[1])) {
                cost += config.teammate_cost;
            }
            if used_pairs.contains(&pair_key(b[0], b[1])) {
                cost += config.teammate_cost;
            }
            for &x in &a {
                for &y in &b {
                    if used_opponents.contains(&pair_key(x, y)) {
                        cost += config.opponent_cost;
                    }
                }
            }

            let suggestion = TeamSuggestion {
                a1: a[0],
                a2: Some(a[1]),
                b1: b[0],
                b2: Some(b[1]),
            };
            if cost == 0 {
                return Some(suggestion);
            }
            // Ties keep the first split found.
            if cost < best_cost {
                best_cost = cost;
                best = Some(suggestion);
            }
        }
    }

    best
}
