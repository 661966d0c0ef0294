//! Team message parsing and classification.

use std::sync::LazyLock;

use regex::Regex;

use roster_models::{ClassifiedTeams, Team, UserInfo};

use crate::error::{ParseError, Result};

/// Regex matching one team line: `<leader>/<internal>/<power>` anywhere in
/// the line. Power accepts `33`, `33.4`, and `.4`.
static TEAM_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+)\s*/\s*(\d+)\s*/\s*(\d+\.\d+|\d+|\.\d+)").expect("Invalid team regex")
});

fn team_from_captures(user: UserInfo, line: &str, cap: &regex::Captures<'_>) -> Option<Team> {
    let leader: i64 = cap[1].parse().ok()?;
    let internal: i64 = cap[2].parse().ok()?;
    let power: f64 = cap[3].parse().ok()?;
    Some(Team::new(user, leader, internal, power, line.trim()))
}

/// Parses a single line strictly.
///
/// Errors when the line contains no team entry; used by command paths where
/// the user submitted exactly one team and deserves a diagnostic.
pub fn parse_team_line(user: UserInfo, line: &str) -> Result<Team> {
    TEAM_REGEX
        .captures(line)
        .and_then(|cap| team_from_captures(user, line, &cap))
        .ok_or_else(|| ParseError::TeamLineFormat(line.trim().to_string()))
}

/// Parses a whole message leniently, one team per matching line.
///
/// Lines without a team entry are dropped silently; a message may yield any
/// number of teams, including zero.
pub fn parse_team_message(user: &UserInfo, message: &str) -> Vec<Team> {
    message
        .lines()
        .filter_map(|line| {
            TEAM_REGEX
                .captures(line)
                .and_then(|cap| team_from_captures(user.clone(), line, &cap))
        })
        .collect()
}

/// Ranks one user's teams into main/encore/backup slots.
///
/// The main team has the highest effective skill value. Among the rest, the
/// highest-power team becomes the encore unless its power falls strictly
/// below the main team's, in which case it stays a backup. Ties break toward
/// the earlier submission. Returns `None` for an empty input.
pub fn classify_teams(mut teams: Vec<Team>) -> Option<ClassifiedTeams> {
    if teams.is_empty() {
        return None;
    }

    let main_idx = max_index_by(&teams, |t| t.effective_skill_value());
    let main = teams.remove(main_idx);

    let encore = if teams.is_empty() {
        None
    } else {
        let encore_idx = max_index_by(&teams, |t| t.team_power);
        if teams[encore_idx].team_power < main.team_power {
            None
        } else {
            Some(teams.remove(encore_idx))
        }
    };

    Some(ClassifiedTeams {
        main,
        encore,
        backup: teams,
    })
}

/// Index of the maximum by `key`, first occurrence winning ties.
fn max_index_by(teams: &[Team], key: impl Fn(&Team) -> f64) -> usize {
    let mut best = 0;
    for (i, team) in teams.iter().enumerate().skip(1) {
        if key(team) > key(&teams[best]) {
            best = i;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> UserInfo {
        UserInfo::new("alice", "Alice A.")
    }

    fn team(leader: i64, internal: i64, power: f64) -> Team {
        Team::new(user(), leader, internal, power, "")
    }

    #[test]
    fn test_parse_team_line_strict() {
        let t = parse_team_line(user(), "150/740/33.4").unwrap();
        assert_eq!(t.leader_skill_value, 150);
        assert_eq!(t.internal_skill_value, 740);
        assert_eq!(t.team_power, 33.4);
        assert_eq!(t.original_message, "150/740/33.4");
    }

    #[test]
    fn test_parse_team_line_rejects_garbage() {
        let err = parse_team_line(user(), "no teams here").unwrap_err();
        assert!(matches!(err, ParseError::TeamLineFormat(_)));
    }

    #[test]
    fn test_decimal_forms() {
        assert_eq!(parse_team_line(user(), "1/2/33").unwrap().team_power, 33.0);
        assert_eq!(parse_team_line(user(), "1/2/.4").unwrap().team_power, 0.4);
        assert_eq!(
            parse_team_line(user(), "1 / 2 / 33.4").unwrap().team_power,
            33.4
        );
    }

    #[test]
    fn test_parse_message_drops_non_matching_lines() {
        let teams = parse_team_message(&user(), "150/740/33.4 spring event\nno team\n140/680/35.3");
        assert_eq!(teams.len(), 2);
        assert_eq!(teams[0].original_message, "150/740/33.4 spring event");
        assert_eq!(teams[1].leader_skill_value, 140);
    }

    #[test]
    fn test_parse_message_empty() {
        assert!(parse_team_message(&user(), "nothing to see").is_empty());
    }

    #[test]
    fn test_classify_empty_is_none() {
        assert!(classify_teams(Vec::new()).is_none());
    }

    #[test]
    fn test_classify_single_team() {
        let c = classify_teams(vec![team(100, 500, 30.0)]).unwrap();
        assert!(c.encore.is_none());
        assert!(c.backup.is_empty());
    }

    #[test]
    fn test_classify_picks_main_by_effective_value_and_encore_by_power() {
        // Effective values 10, 20, 15; powers 5, 30, 25.
        let teams = vec![team(10, 10, 5.0), team(20, 20, 30.0), team(15, 15, 25.0)];
        let c = classify_teams(teams).unwrap();

        assert_eq!(c.main.team_power, 30.0);
        // Remaining max power is 25, below main's 30, so no encore.
        assert!(c.encore.is_none());
        assert_eq!(c.backup.len(), 2);
        assert_eq!(c.backup[0].team_power, 5.0);
        assert_eq!(c.backup[1].team_power, 25.0);
    }

    #[test]
    fn test_classify_encore_needs_power_at_least_mains() {
        // Main by effective value has the lower power, so the strongest
        // remaining team is promoted to encore.
        let teams = vec![team(10, 10, 5.0), team(20, 20, 4.0), team(15, 15, 25.0)];
        let c = classify_teams(teams).unwrap();

        assert_eq!(c.main.effective_skill_value(), 20.0);
        assert_eq!(c.encore.as_ref().unwrap().team_power, 25.0);
        assert_eq!(c.backup.len(), 1);
        assert_eq!(c.backup[0].team_power, 5.0);
    }

    #[test]
    fn test_classify_ties_break_to_first_occurrence() {
        let teams = vec![team(20, 20, 10.0), team(20, 20, 10.0), team(20, 20, 10.0)];
        let c = classify_teams(teams.clone()).unwrap();

        // First team is main; second, with equal power, is encore.
        assert_eq!(c.main, teams[0]);
        assert_eq!(c.encore.as_ref().unwrap(), &teams[1]);
        assert_eq!(c.backup, vec![teams[2].clone()]);
    }

    #[test]
    fn test_register_message_end_to_end() {
        let teams = parse_team_message(&user(), "150/740/33.4 note\n140/680/35.3");
        assert_eq!(teams.len(), 2);

        let c = classify_teams(teams).unwrap();
        // Effective values: 150+(740-150)/5 = 268 vs 140+(680-140)/5 = 248.
        assert_eq!(c.main.effective_skill_value(), 268.0);
        assert_eq!(c.main.team_power, 33.4);
        // 35.3 >= 33.4, so the weaker-valued team is the encore.
        assert_eq!(c.encore.as_ref().unwrap().team_power, 35.3);
        assert!(c.backup.is_empty());
    }
}
