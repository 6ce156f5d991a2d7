//! Plain-text rendering of runtime events and rating data.
use std::fmt::Write;

use battle_core::{Fighter, HealthSnapshot, TrackRecord, Verdict};
use battle_runtime::{
    BattleEvent, BattleRecord, Event, HandshakeEvent, LeaderboardEntry, RatingProfile,
    SessionOutcome, Settlement,
};

const BAR_WIDTH: usize = 20;

/// Lines to print for one session event.
pub fn event(event: &Event) -> Vec<String> {
    match event {
        Event::Handshake(HandshakeEvent::Proposed {
            participants,
            deadline_secs,
            ..
        }) => vec![format!(
            "Ranked battle proposed between {} and {}; {}s to accept.",
            participants[0], participants[1], deadline_secs
        )],
        Event::Handshake(HandshakeEvent::Accepted { by, .. }) => {
            vec![format!("{by} accepted.")]
        }
        Event::Handshake(HandshakeEvent::Confirmed { .. }) => {
            vec!["Both fighters accepted. Ranked battle confirmed.".to_owned()]
        }
        Event::Handshake(HandshakeEvent::Cancelled { reason, .. }) => {
            vec![format!("Battle cancelled: {reason}.")]
        }
        Event::Battle(BattleEvent::Started {
            fighters,
            first_mover,
            mode,
            ..
        }) => {
            let mut lines = vec![format!("=== {mode} battle ===")];
            lines.extend(fighters.iter().map(fighter));
            lines.push(format!("{first_mover} moves first."));
            lines
        }
        Event::Battle(BattleEvent::Turn { event, .. }) => {
            let mut lines = vec![format!("[turn {:>2}] {}", event.turn, event.narration)];
            lines.extend(event.health.iter().map(health));
            lines
        }
        Event::Settlement(outcome) => self::outcome(outcome),
    }
}

/// Summary lines for a terminal outcome.
pub fn outcome(outcome: &SessionOutcome) -> Vec<String> {
    match outcome {
        SessionOutcome::Settled(settlement) => settled(settlement),
        SessionOutcome::Cancelled { reason, .. } => vec![format!("No battle: {reason}.")],
        SessionOutcome::Aborted { .. } => vec!["Battle aborted.".to_owned()],
        SessionOutcome::Failed { error, .. } => vec![format!("Battle failed: {error}")],
    }
}

fn settled(settlement: &Settlement) -> Vec<String> {
    let mut lines = settlement.epilogue.clone();
    match &settlement.verdict {
        Verdict::Victory {
            winner,
            by_stoppage: true,
            ..
        } => lines.push(format!(
            "{winner} wins on remaining health after {} turns.",
            settlement.turns
        )),
        Verdict::Victory { winner, .. } => lines.push(format!(
            "{winner} wins by knockout in {} turns.",
            settlement.turns
        )),
        Verdict::Draw => lines.push(format!(
            "Draw after {} turns. No rating change.",
            settlement.turns
        )),
    }
    if let Some(record) = &settlement.record {
        lines.push(format!("Recorded as {}.", record.id));
    }
    lines
}

fn fighter(fighter: &Fighter) -> String {
    format!(
        "{:<16} HP {:>3}  ATK {:>2}  DEF {:>2}  SPD {:>2}  CRIT {:>2.0}%",
        fighter.label,
        fighter.max_hp,
        fighter.attack,
        fighter.defense,
        fighter.speed,
        fighter.crit_chance * 100.0
    )
}

fn health(snapshot: &HealthSnapshot) -> String {
    format!(
        "           {:<12} {} {:>3}/{}",
        snapshot.participant.as_str(),
        bar(snapshot.hp, snapshot.max_hp),
        snapshot.hp,
        snapshot.max_hp
    )
}

fn bar(hp: u32, max_hp: u32) -> String {
    let filled = if max_hp == 0 {
        0
    } else {
        (hp as usize * BAR_WIDTH).div_ceil(max_hp as usize)
    };
    format!("[{}{}]", "#".repeat(filled), ".".repeat(BAR_WIDTH - filled))
}

pub fn leaderboard(entries: &[LeaderboardEntry]) -> String {
    if entries.is_empty() {
        return "No ranked fighters yet.".to_owned();
    }
    let mut out = format!(
        "{:>4}  {:<20} {:>5} {:>5} {:>5} {:>6} {:>8}\n",
        "#", "fighter", "wins", "loss", "total", "rate", "score"
    );
    for entry in entries {
        let _ = writeln!(
            out,
            "{:>4}  {:<20} {}",
            entry.rank,
            entry.label,
            track(&entry.stats)
        );
    }
    out
}

fn track(stats: &TrackRecord) -> String {
    format!(
        "{:>5} {:>5} {:>5} {:>5}% {:>8.3}",
        stats.wins, stats.losses, stats.total, stats.win_rate, stats.weighted_score
    )
}

pub fn history(records: &[BattleRecord]) -> String {
    if records.is_empty() {
        return "No battles recorded.".to_owned();
    }
    let mut out = String::new();
    for record in records {
        let _ = writeln!(
            out,
            "{}  {:<11} {} beat {} in {} turns ({}/{} HP left) [{}]",
            record.recorded_at.format("%Y-%m-%d %H:%M"),
            record.mode.to_string(),
            record.winner_label,
            record.loser_label,
            record.turns,
            record.winner_hp,
            record.winner_max_hp,
            record.arena
        );
    }
    out
}

pub fn profile(profile: &RatingProfile) -> String {
    let mut out = format!("{} ({})\n", profile.label, profile.participant);
    for (name, stats) in [("casual", &profile.casual), ("competitive", &profile.competitive)] {
        let last = stats
            .last_battle_at
            .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "never".to_owned());
        let _ = writeln!(out, "  {name:<12}{}  last: {last}", track(&stats.record));
    }
    out
}
