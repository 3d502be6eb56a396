use serde::Serialize;
use serde_json::json;

/// Append-only narration of one battle.
#[derive(Clone, Debug, Default, Serialize)]
pub struct BattleLogger {
    log: Vec<String>,
}

impl BattleLogger {
    pub fn new() -> Self {
        Self { log: Vec::new() }
    }

    pub fn log_line(&mut self, line: impl Into<String>) {
        self.log.push(line.into());
    }

    pub fn log_all(&mut self, lines: impl IntoIterator<Item = String>) {
        self.log.extend(lines);
    }

    pub fn log_turn(&mut self, turn: u32) {
        self.log.push(format!("=== Turn {turn} ==="));
    }

    pub fn log_move(&mut self, user: &str, move_name: &str) {
        self.log.push(format!("{user} used {move_name}!"));
    }

    pub fn log_damage(&mut self, target: &str, damage: u16, hp: u16, max_hp: u16) {
        self.log
            .push(format!("{target} took {damage} damage! (HP: {hp}/{max_hp})"));
    }

    pub fn log_switch(&mut self, player: &str, species: &str) {
        self.log.push(format!("{player} sent out {species}!"));
    }

    pub fn log_faint(&mut self, species: &str) {
        self.log.push(format!("{species} fainted!"));
    }

    pub fn log_win(&mut self, winner: &str) {
        self.log.push(format!("{winner} won the battle!"));
    }

    pub fn log_tie(&mut self) {
        self.log.push("The battle ended in a draw!".to_string());
    }

    pub fn log_lines(&self) -> &[String] {
        &self.log
    }

    pub fn len(&self) -> usize {
        self.log.len()
    }

    pub fn is_empty(&self) -> bool {
        self.log.is_empty()
    }

    /// Lines appended since `start` (a previous `len()`).
    pub fn lines_since(&self, start: usize) -> &[String] {
        self.log.get(start..).unwrap_or(&[])
    }

    pub fn to_json(&self) -> serde_json::Value {
        json!({
            "log": self.log,
        })
    }
}
