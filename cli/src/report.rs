use whfrp_core::tracker::roster_rows;
use whfrp_core::{BattleOutcome, CombatUnit};

pub fn outcome_line(outcome: &BattleOutcome) -> String {
    match outcome {
        BattleOutcome::Victory { team } => format!("Team {team} wins!"),
        BattleOutcome::NoSurvivors => "No one is left standing.".to_string(),
        BattleOutcome::RoundLimitReached { rounds } => {
            format!("The battle is undecided after {rounds} rounds.")
        }
    }
}

/// 以追蹤器的欄位印出名冊
pub fn print_roster(units: &[CombatUnit]) {
    println!(
        "{:<16} {:<12} {:>10} {:>6}  {:<12} Conditions",
        "Name", "Team", "Initiative", "Wounds", "Status"
    );
    for row in roster_rows(units) {
        println!(
            "{:<16} {:<12} {:>10} {:>6}  {:<12} {}",
            row.name,
            row.team,
            row.initiative,
            row.wounds,
            row.status.to_string(),
            row.conditions
        );
    }
}
