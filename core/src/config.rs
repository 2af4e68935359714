//! 名冊與戰鬥設定載入
//!
//! 名冊檔為 TOML：
//! ```toml
//! [battle]
//! seed = 42
//! max_rounds = 50
//!
//! [[combatants]]
//! team = "Heroes"
//! [combatants.character]
//! identifier = "aldric"
//! # ...
//! ```

use crate::character::Character;
use crate::error::{LoadError, Result, RosterError};
use crate::provider::DecisionProvider;
use crate::unit::{share, CombatUnit, TeamID};
use serde::{Deserialize, Serialize};
use std::rc::Rc;

/// 戰鬥流程設定
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BattleConfig {
    /// None 表示打到只剩一隊為止
    pub max_rounds: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BattleSettings {
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub max_rounds: Option<u32>,
}

impl BattleSettings {
    pub fn battle_config(&self) -> BattleConfig {
        BattleConfig {
            max_rounds: self.max_rounds,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RosterEntry {
    pub team: TeamID,
    pub character: Character,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RosterFile {
    #[serde(default)]
    pub battle: BattleSettings,
    pub combatants: Vec<RosterEntry>,
}

impl RosterFile {
    /// 建立戰鬥單位，由呼叫端為每個角色指定決策來源
    pub fn into_units<F>(self, mut assign: F) -> Vec<CombatUnit>
    where
        F: FnMut(&Character) -> Rc<dyn DecisionProvider>,
    {
        self.combatants
            .into_iter()
            .map(|entry| {
                let mut character = entry.character;
                character.calculate_encumbrance();
                let controller = assign(&character);
                CombatUnit::new(share(character), entry.team, controller)
            })
            .collect()
    }
}

/// 反序列化並檢查名冊 TOML
pub fn load_roster(roster_toml: &str) -> Result<RosterFile> {
    let roster: RosterFile =
        toml::from_str(roster_toml).map_err(|e| LoadError::DeserializeError {
            format: "roster.toml".to_string(),
            reason: e.to_string(),
        })?;

    if roster.combatants.is_empty() {
        return Err(RosterError::EmptyRoster.into());
    }
    for (i, entry) in roster.combatants.iter().enumerate() {
        if entry.team.trim().is_empty() {
            return Err(LoadError::InvalidField {
                field: format!("combatants[{i}].team"),
                reason: "must not be empty".to_string(),
            }
            .into());
        }
        entry
            .character
            .validate(&format!("combatants[{i}].character"))?;
    }

    Ok(roster)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::provider::AutomatedProvider;

    const ROSTER: &str = r#"
[battle]
seed = 7
max_rounds = 20

[[combatants]]
team = "Heroes"

[combatants.character]
identifier = "aldric"
personal_info = { name = "Aldric", race = "Human" }
character_role = { is_player_character = true }
characteristics = { weapon_skill = 50, strength = 40, toughness = 30, initiative = 30, agility = 30 }
combat_stats = { wounds = 12, armor_points = 2 }
talents = [{ name = "Strike Mighty Blow" }]
equipment = [{ type = "Weapon", name = "Sword", damage = 5, weight = 3.0 }]

[[combatants]]
team = "Monsters"

[combatants.character]
identifier = "goblin"
personal_info = { name = "Goblin" }
character_role = { is_player_character = false }
characteristics = { weapon_skill = 35, strength = 30, toughness = 30, initiative = 30, agility = 35 }
combat_stats = { wounds = 8, armor_points = 1 }
equipment = []
"#;

    #[test]
    fn test_load_roster() {
        let roster = load_roster(ROSTER).unwrap();
        assert_eq!(roster.battle.seed, Some(7));
        assert_eq!(roster.battle.battle_config().max_rounds, Some(20));
        assert_eq!(roster.combatants.len(), 2);

        let aldric = &roster.combatants[0].character;
        assert!(aldric.is_player_character());
        assert_eq!(aldric.equipped_weapon().unwrap().damage, 5);
        assert!(aldric.has_talent("Strike Mighty Blow"));
        assert_eq!(aldric.characteristics.fellowship, 0);

        let goblin = &roster.combatants[1].character;
        assert!(!goblin.is_player_character());
        assert!(goblin.equipped_weapon().is_none());
    }

    #[test]
    fn test_into_units_uses_assigned_provider() {
        let roster = load_roster(ROSTER).unwrap();
        let mut seen = Vec::new();
        let units = roster.into_units(|character| {
            seen.push(character.name().to_string());
            Rc::new(AutomatedProvider)
        });
        assert_eq!(seen, vec!["Aldric", "Goblin"]);
        assert_eq!(units[0].team, "Heroes");
        assert_eq!(units[1].wounds(), 8);
        assert!(units.iter().all(|u| u.is_active && u.initiative == 0));
    }

    #[test]
    fn test_missing_combat_field_is_rejected() {
        let broken = ROSTER.replace(
            "combat_stats = { wounds = 8, armor_points = 1 }",
            "combat_stats = { armor_points = 1 }",
        );
        let err = load_roster(&broken).unwrap_err();
        match err.kind() {
            ErrorKind::Load(LoadError::DeserializeError { format, reason }) => {
                assert_eq!(format, "roster.toml");
                assert!(reason.contains("wounds"), "{reason}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_invalid_value_names_field() {
        let broken = ROSTER.replace("wounds = 8", "wounds = -8");
        let err = load_roster(&broken).unwrap_err();
        assert!(
            err.to_string()
                .contains("combatants[1].character.combat_stats.wounds"),
            "{err}"
        );
    }

    #[test]
    fn test_empty_roster_is_rejected() {
        let err = load_roster("combatants = []").unwrap_err();
        assert!(matches!(
            err.kind(),
            ErrorKind::Roster(RosterError::EmptyRoster)
        ));
    }

    #[test]
    fn test_unknown_equipment_key_is_rejected() {
        let broken = ROSTER.replace("damage = 5, weight = 3.0", "damage = 5, sharpness = 3");
        let err = load_roster(&broken).unwrap_err();
        assert!(err.to_string().contains("sharpness"), "{err}");
    }

    #[test]
    fn test_unknown_setting_is_rejected() {
        let broken = ROSTER.replace("max_rounds = 20", "max_round = 20");
        assert!(load_roster(&broken).is_err());
    }
}
