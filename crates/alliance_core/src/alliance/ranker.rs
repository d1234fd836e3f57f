use super::Alliance;
use crate::config::RankingWeights;
use std::cmp::Ordering;

pub fn composite_score(alliance: &Alliance, weights: &RankingWeights) -> f64 {
    weights.balance_weight * alliance.balance_score + weights.points_weight * alliance.total_points
}

/// Order by composite score (descending) and keep the first `limit`.
///
/// Equal scores fall back to the member list so the order never depends on
/// how the candidates were produced.
pub fn rank_alliances(
    mut alliances: Vec<Alliance>,
    weights: &RankingWeights,
    limit: usize,
) -> Vec<Alliance> {
    for alliance in &mut alliances {
        alliance.composite_score = composite_score(alliance, weights);
    }
    alliances.sort_by(|a, b| {
        b.composite_score
            .partial_cmp(&a.composite_score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.members.cmp(&b.members))
    });
    alliances.truncate(limit);
    alliances
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alliance::AllianceStatus;

    fn alliance(members: &[&str], total: f64, balance: f64) -> Alliance {
        Alliance {
            seed: members[0].to_string(),
            members: members.iter().map(|m| m.to_string()).collect(),
            status: AllianceStatus::Complete,
            total_points: total,
            balance_score: balance,
            challenge_coverage: vec![],
            phase_coverage: vec![],
            fallback_picks: 0,
            composite_score: 0.0,
        }
    }

    #[test]
    fn test_orders_by_composite_and_truncates() {
        let weights = RankingWeights::default();
        let ranked = rank_alliances(
            vec![
                alliance(&["A"], 10.0, 0.0),  // 6.0
                alliance(&["B"], 8.0, 10.0),  // 8.8
                alliance(&["C"], 20.0, 0.0),  // 12.0
            ],
            &weights,
            2,
        );
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].members, vec!["C".to_string()]);
        assert_eq!(ranked[1].members, vec!["B".to_string()]);
        assert!((ranked[1].composite_score - 8.8).abs() < 1e-9);
    }

    #[test]
    fn test_balance_weight_can_dominate() {
        let weights = RankingWeights {
            balance_weight: 1.0,
            points_weight: 0.0,
        };
        let ranked = rank_alliances(
            vec![alliance(&["A"], 100.0, 1.0), alliance(&["B"], 1.0, 5.0)],
            &weights,
            5,
        );
        assert_eq!(ranked[0].members, vec!["B".to_string()]);
    }

    #[test]
    fn test_ties_break_on_members() {
        let weights = RankingWeights::default();
        let ranked = rank_alliances(
            vec![alliance(&["Z", "A"], 10.0, 1.0), alliance(&["B", "C"], 10.0, 1.0)],
            &weights,
            5,
        );
        assert_eq!(ranked[0].members[0], "B");
    }

    #[test]
    fn test_empty_input() {
        assert!(rank_alliances(vec![], &RankingWeights::default(), 3).is_empty());
    }
}
