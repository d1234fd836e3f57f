//! Plain-text reports for the CLI.

use alliance_core::{Alliance, Standings, TeamProfile, TeamRanking};
use std::io::{self, Write};

pub fn write_ranking<W: Write>(out: &mut W, title: &str, rows: &[TeamRanking]) -> io::Result<()> {
    writeln!(out, "{title}")?;
    writeln!(out, "{:>4}  {:<28} {:>8} {:>8} {:>8}", "#", "Team", "Auto", "Teleop", "Total")?;
    for row in rows {
        writeln!(
            out,
            "{:>4}  {:<28} {:>8.1} {:>8.1} {:>8.1}",
            row.rank, row.team, row.auto_points, row.teleop_points, row.total_points
        )?;
    }
    Ok(())
}

pub fn write_profile<W: Write>(out: &mut W, profile: &TeamProfile) -> io::Result<()> {
    writeln!(out, "{} (rank {}, {:.1} pts)", profile.team, profile.rank, profile.total_points)?;
    writeln!(out, "  Strongest challenges:")?;
    for c in &profile.strongest_challenges {
        writeln!(out, "    {:<20} {:>8.1}", c.challenge, c.total_points)?;
    }
    writeln!(out, "  Weakest challenges:")?;
    for c in &profile.weakest_challenges {
        writeln!(out, "    {:<20} {:>8.1}", c.challenge, c.total_points)?;
    }
    writeln!(out, "  Strongest phases:")?;
    for p in &profile.strongest_phases {
        writeln!(out, "    {:<20} {:<14} {:>8.1}", p.challenge, p.phase, p.total_points)?;
    }
    writeln!(out, "  Weakest phases:")?;
    for p in &profile.weakest_phases {
        writeln!(out, "    {:<20} {:<14} {:>8.1}", p.challenge, p.phase, p.total_points)?;
    }
    Ok(())
}

/// One ranked alliance: members with rank and best challenge / phase,
/// challenge coverage, and the phases behind the weakest challenge.
pub fn write_alliance<W: Write>(
    out: &mut W,
    position: usize,
    alliance: &Alliance,
    standings: &Standings,
) -> io::Result<()> {
    writeln!(
        out,
        "\nAlliance {} [{:?}] score {:.2}",
        position, alliance.status, alliance.composite_score
    )?;
    writeln!(
        out,
        "   Total points: {:.1}  Balance: {:.2}  Fallback picks: {}",
        alliance.total_points, alliance.balance_score, alliance.fallback_picks
    )?;

    for member in &alliance.members {
        let profile = TeamProfile::build(standings, member);
        let best_challenge = profile
            .as_ref()
            .and_then(|p| p.best_challenge())
            .map_or("-", |c| c.challenge.as_str());
        let best_phase = profile
            .as_ref()
            .and_then(|p| p.best_phase())
            .map_or("-", |p| p.phase.as_str());
        let rank = standings
            .team(member)
            .map_or_else(|| "-".to_string(), |r| r.rank.to_string());
        writeln!(
            out,
            "   - #{:<4} {:<28} {:>8.1} pts  best: {} / {}",
            rank,
            member,
            standings.team_total(member),
            best_challenge,
            best_phase
        )?;
    }

    for coverage in &alliance.challenge_coverage {
        writeln!(out, "   {:<20} {:>8.1}", coverage.challenge, coverage.total_points)?;
    }
    if let Some(weakest) = alliance.weakest_challenge() {
        writeln!(out, "   Weakest challenge: {}", weakest.challenge)?;
        for phase in alliance.phases_in(&weakest.challenge) {
            writeln!(out, "     {:<18} {:>8.1}", phase.phase, phase.total_points)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use alliance_core::{optimize, AllianceColor, MatchRecord, OptimizerConfig, SeedMode};

    fn rec(team: &str, challenge: &str, phase: &str, teleop: u32) -> MatchRecord {
        MatchRecord {
            robot_id: 0,
            team: team.to_string(),
            challenge_id: 0,
            challenge_name: challenge.to_string(),
            phase_id: 0,
            phase_name: phase.to_string(),
            completed_autonomous: 0,
            completed_teleop: teleop,
            alliance: AllianceColor::Blue,
            location: String::new(),
        }
    }

    fn season() -> Standings {
        Standings::compute(
            &[
                rec("254", "REEF", "CORAL L4", 3),   // 15
                rec("254", "BARGE", "PARK", 1),      // 2
                rec("971", "BARGE", "DEEP_CAGE", 1), // 12
                rec("1678", "ALGAE", "NET", 2),      // 8
            ],
            &OptimizerConfig::default().scoring,
        )
    }

    fn render<F>(f: F) -> String
    where
        F: FnOnce(&mut Vec<u8>) -> io::Result<()>,
    {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_alliance_report_shows_member_rank_and_best_phase() {
        let standings = season();
        let alliances = optimize(
            &standings,
            &OptimizerConfig::default(),
            &SeedMode::Targeted("254".to_string()),
        )
        .unwrap();
        assert_eq!(alliances[0].members.len(), 3);

        let text = render(|out| write_alliance(out, 1, &alliances[0], &standings));
        let member_line = |team: &str| {
            text.lines()
                .find(|l| l.contains(&format!(" {team} ")) && l.contains("best:"))
                .unwrap_or_else(|| panic!("no line for {team}:\n{text}"))
                .to_string()
        };

        let line = member_line("254");
        assert!(line.contains("#1"));
        assert!(line.contains("best: REEF / L4"));
        let line = member_line("971");
        assert!(line.contains("#2"));
        assert!(line.contains("best: BARGE / DEEP_CAGE"));
        let line = member_line("1678");
        assert!(line.contains("#3"));
        assert!(line.contains("best: ALGAE / NET"));
    }

    #[test]
    fn test_alliance_report_lists_weakest_challenge_phases() {
        let standings = season();
        let alliances = optimize(
            &standings,
            &OptimizerConfig::default(),
            &SeedMode::Targeted("254".to_string()),
        )
        .unwrap();

        let text = render(|out| write_alliance(out, 1, &alliances[0], &standings));
        let lines: Vec<&str> = text.lines().collect();
        let at = lines
            .iter()
            .position(|l| l.contains("Weakest challenge: ALGAE"))
            .unwrap();
        let phase = lines[at + 1];
        assert!(phase.contains("NET"));
        assert!(phase.contains("8.0"));
        assert_eq!(lines.len(), at + 2);
    }

    #[test]
    fn test_ranking_and_profile_reports() {
        let standings = season();
        let text = render(|out| write_ranking(out, "Overall ranking", &standings.team_rankings));
        let rows: Vec<&str> = text.lines().skip(2).collect();
        assert_eq!(rows.len(), 3);
        assert!(rows[0].contains("254"));
        assert!(rows[0].contains("17.0"));

        let profile = TeamProfile::build(&standings, "254").unwrap();
        let text = render(|out| write_profile(out, &profile));
        assert!(text.starts_with("254 (rank 1, 17.0 pts)"));
        assert!(text.contains("Weakest phases:"));
    }
}
