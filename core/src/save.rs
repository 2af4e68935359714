//! 存檔格式
//!
//! 戰鬥／名冊狀態轉成純資料的樹狀結構（字串、數字、布林、巢狀紀錄與陣列），
//! 不含任何引擎內部參照；決策來源不存檔，讀檔時由呼叫端重新指定。
//! 讀檔遇到缺欄位、多餘欄位或不合法數值一律報錯，不補預設戰鬥數值。

use crate::character::Character;
use crate::error::{LoadError, Result};
use crate::provider::DecisionProvider;
use crate::unit::{share, CombatUnit, Position, TeamID};
use serde::{Deserialize, Serialize};
use std::rc::Rc;

const SAVE_FORMAT: &str = "battle.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CombatantRecord {
    pub team: TeamID,
    pub initiative: i32,
    pub position: Position,
    pub is_active: bool,
    pub character: Character,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BattleSnapshot {
    pub round_number: u32,
    pub combatants: Vec<CombatantRecord>,
}

impl BattleSnapshot {
    pub fn from_units(units: &[CombatUnit], round_number: u32) -> Self {
        let combatants = units
            .iter()
            .map(|unit| CombatantRecord {
                team: unit.team.clone(),
                initiative: unit.initiative,
                position: unit.position,
                is_active: unit.is_active,
                character: unit.character().clone(),
            })
            .collect();
        Self {
            round_number,
            combatants,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(
            serde_json::to_string_pretty(self).map_err(|e| LoadError::SerializeError {
                format: SAVE_FORMAT.to_string(),
                reason: e.to_string(),
            })?,
        )
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let snapshot: Self =
            serde_json::from_str(json).map_err(|e| LoadError::DeserializeError {
                format: SAVE_FORMAT.to_string(),
                reason: e.to_string(),
            })?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    pub fn validate(&self) -> Result<()> {
        for (i, record) in self.combatants.iter().enumerate() {
            if record.team.trim().is_empty() {
                return Err(LoadError::InvalidField {
                    field: format!("combatants[{i}].team"),
                    reason: "must not be empty".to_string(),
                }
                .into());
            }
            record
                .character
                .validate(&format!("combatants[{i}].character"))?;
        }
        Ok(())
    }

    /// 重建戰鬥單位，由呼叫端為每個角色指定決策來源
    pub fn into_units<F>(self, mut assign: F) -> Vec<CombatUnit>
    where
        F: FnMut(&Character) -> Rc<dyn DecisionProvider>,
    {
        self.combatants
            .into_iter()
            .map(|record| {
                let controller = assign(&record.character);
                let mut unit = CombatUnit::new(share(record.character), record.team, controller);
                unit.initiative = record.initiative;
                unit.position = record.position;
                unit.is_active = record.is_active;
                unit
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::character::Condition;
    use crate::provider::AutomatedProvider;

    fn units() -> Vec<CombatUnit> {
        let hero = Character::builder("Aldric")
            .weapon_skill(50)
            .strength(40)
            .toughness(30)
            .agility(30)
            .initiative(30)
            .wounds(12)
            .armor_points(2)
            .weapon("Sword", 5)
            .talent("Strike Mighty Blow")
            .player(true)
            .build();
        let goblin = Character::builder("Goblin").wounds(3).build();

        let mut a = CombatUnit::automated(share(hero), "Heroes");
        a.initiative = 37;
        a.position = Position::new(2, 3);
        a.character_mut().add_condition(Condition::new("Bleeding"));
        let mut b = CombatUnit::automated(share(goblin), "Monsters");
        b.initiative = 31;
        b.set_active(false);
        vec![a, b]
    }

    #[test]
    fn test_snapshot_restores_units() {
        let json = BattleSnapshot::from_units(&units(), 4).to_json().unwrap();
        let snapshot = BattleSnapshot::from_json(&json).unwrap();
        assert_eq!(snapshot.round_number, 4);

        let restored = snapshot.into_units(|_| Rc::new(AutomatedProvider));
        assert_eq!(restored.len(), 2);
        assert_eq!(restored[0].name(), "Aldric");
        assert_eq!(restored[0].initiative, 37);
        assert_eq!(restored[0].position, Position::new(2, 3));
        assert_eq!(restored[0].condition_names(), vec!["Bleeding"]);
        assert!(restored[0].character().is_player_character());
        assert!(!restored[1].is_active);
        assert_eq!(restored[1].wounds(), 3);
    }

    #[test]
    fn test_snapshot_is_plain_records() {
        let json = BattleSnapshot::from_units(&units(), 0).to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let first = &value["combatants"][0];
        assert_eq!(first["team"], "Heroes");
        assert_eq!(first["position"]["x"], 2);
        assert_eq!(first["character"]["combat_stats"]["wounds"], 12);
        assert_eq!(first["character"]["equipment"][0]["type"], "Weapon");
    }
}
