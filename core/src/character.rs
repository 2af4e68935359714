//! 角色系統
//!
//! 戰鬥引擎所需的角色資料：屬性、戰鬥數值、天賦、裝備與狀態。
//! 角色建立規則、經驗與法術不在此處理。

use crate::constants::CHARACTERISTIC_BONUS_DIVISOR;
use crate::error::{LoadError, Result};
use serde::{Deserialize, Serialize};

/// 個人資訊
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PersonalInfo {
    pub name: String,
    #[serde(default)]
    pub nickname: Option<String>,
    #[serde(default)]
    pub surname: Option<String>,
    #[serde(default)]
    pub race: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// 角色定位
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CharacterRole {
    #[serde(default)]
    pub profession: Option<String>,
    #[serde(default)]
    pub profession_level: Option<i32>,
    /// true 為玩家角色，false 為 NPC
    #[serde(default = "default_is_player_character")]
    pub is_player_character: bool,
}

fn default_is_player_character() -> bool {
    true
}

impl Default for CharacterRole {
    fn default() -> Self {
        Self {
            profession: None,
            profession_level: None,
            is_player_character: default_is_player_character(),
        }
    }
}

/// 屬性（百分制）
///
/// 戰鬥會用到的五項屬性為必填，其餘缺省為 0。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Characteristics {
    pub weapon_skill: i32,
    #[serde(default)]
    pub ballistic_skill: i32,
    pub strength: i32,
    pub toughness: i32,
    pub initiative: i32,
    pub agility: i32,
    #[serde(default)]
    pub dexterity: i32,
    #[serde(default)]
    pub intelligence: i32,
    #[serde(default)]
    pub willpower: i32,
    #[serde(default)]
    pub fellowship: i32,
}

impl Characteristics {
    /// 力量加值 floor(STR / 10)
    pub fn strength_bonus(&self) -> i32 {
        self.strength.div_euclid(CHARACTERISTIC_BONUS_DIVISOR)
    }

    /// 體質加值 floor(T / 10)
    pub fn toughness_bonus(&self) -> i32 {
        self.toughness.div_euclid(CHARACTERISTIC_BONUS_DIVISOR)
    }

    fn named_values(&self) -> [(&'static str, i32); 10] {
        [
            ("weapon_skill", self.weapon_skill),
            ("ballistic_skill", self.ballistic_skill),
            ("strength", self.strength),
            ("toughness", self.toughness),
            ("initiative", self.initiative),
            ("agility", self.agility),
            ("dexterity", self.dexterity),
            ("intelligence", self.intelligence),
            ("willpower", self.willpower),
            ("fellowship", self.fellowship),
        ]
    }
}

/// 戰鬥數值
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CombatStats {
    /// 當前傷口值，> 0 即清醒
    pub wounds: i32,
    #[serde(default)]
    pub max_wounds: i32,
    pub armor_points: i32,
    #[serde(default)]
    pub advantage: i32,
    #[serde(default)]
    pub movement: i32,
}

/// 天賦
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Talent {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub effects: Vec<String>,
}

impl Talent {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            effects: Vec::new(),
        }
    }
}

/// 武器類型
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeaponType {
    #[default]
    Melee,
    Ranged,
}

/// 裝備
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", deny_unknown_fields)]
pub enum EquipmentItem {
    Weapon {
        name: String,
        #[serde(default)]
        description: Option<String>,
        #[serde(default)]
        weight: f32,
        damage: i32,
        #[serde(default)]
        weapon_type: WeaponType,
    },
    Armor {
        name: String,
        #[serde(default)]
        description: Option<String>,
        #[serde(default)]
        weight: f32,
        armor_points: i32,
        #[serde(default)]
        location: Option<String>,
    },
    Gear {
        name: String,
        #[serde(default)]
        description: Option<String>,
        #[serde(default)]
        weight: f32,
    },
}

impl EquipmentItem {
    pub fn weapon(name: impl Into<String>, damage: i32) -> Self {
        Self::Weapon {
            name: name.into(),
            description: None,
            weight: 0.0,
            damage,
            weapon_type: WeaponType::Melee,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Weapon { name, .. } | Self::Armor { name, .. } | Self::Gear { name, .. } => name,
        }
    }

    pub fn weight(&self) -> f32 {
        match self {
            Self::Weapon { weight, .. } | Self::Armor { weight, .. } | Self::Gear { weight, .. } => {
                *weight
            }
        }
    }
}

/// 已裝備武器的唯讀檢視
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeaponRef<'a> {
    pub name: &'a str,
    pub damage: i32,
}

/// 狀態（中毒、流血等），與戰鬥數學無關
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Condition {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl Condition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
        }
    }
}

/// 角色
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Character {
    pub identifier: String,
    pub personal_info: PersonalInfo,
    #[serde(default)]
    pub character_role: CharacterRole,
    pub characteristics: Characteristics,
    pub combat_stats: CombatStats,
    #[serde(default)]
    pub talents: Vec<Talent>,
    pub equipment: Vec<EquipmentItem>,
    #[serde(default)]
    pub conditions: Vec<Condition>,
    #[serde(default)]
    pub encumbrance: f32,
}

impl Character {
    pub fn builder(name: impl Into<String>) -> CharacterBuilder {
        CharacterBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.personal_info.name
    }

    pub fn is_player_character(&self) -> bool {
        self.character_role.is_player_character
    }

    /// 是否擁有指定名稱（或效果標籤）的天賦
    pub fn has_talent(&self, name: &str) -> bool {
        self.talents
            .iter()
            .any(|t| t.name == name || t.effects.iter().any(|e| e == name))
    }

    /// 裝備清單中的第一把武器
    pub fn equipped_weapon(&self) -> Option<WeaponRef<'_>> {
        self.equipment.iter().find_map(|item| match item {
            EquipmentItem::Weapon { name, damage, .. } => Some(WeaponRef {
                name,
                damage: *damage,
            }),
            _ => None,
        })
    }

    /// 重新計算負重（裝備重量總和）
    pub fn calculate_encumbrance(&mut self) -> f32 {
        self.encumbrance = self.equipment.iter().map(EquipmentItem::weight).sum();
        self.encumbrance
    }

    pub fn add_equipment(&mut self, item: EquipmentItem) {
        self.equipment.push(item);
        self.calculate_encumbrance();
    }

    pub fn add_condition(&mut self, condition: Condition) {
        self.conditions.push(condition);
    }

    /// 依名稱移除所有同名狀態
    pub fn remove_condition(&mut self, name: &str) {
        self.conditions.retain(|c| c.name != name);
    }

    pub fn condition_names(&self) -> Vec<&str> {
        self.conditions.iter().map(|c| c.name.as_str()).collect()
    }

    /// 檢查數值是否合法，`path` 為錯誤訊息中的欄位前綴
    pub fn validate(&self, path: &str) -> Result<()> {
        let invalid = |field: &str, reason: String| LoadError::InvalidField {
            field: format!("{path}.{field}"),
            reason,
        };

        if self.personal_info.name.trim().is_empty() {
            return Err(invalid("personal_info.name", "must not be empty".to_string()).into());
        }

        for (field, value) in self.characteristics.named_values() {
            if value < 0 {
                return Err(invalid(
                    &format!("characteristics.{field}"),
                    format!("must be >= 0, got {value}"),
                )
                .into());
            }
        }

        let stats = &self.combat_stats;
        if stats.wounds < 0 {
            return Err(invalid(
                "combat_stats.wounds",
                format!("must be >= 0, got {}", stats.wounds),
            )
            .into());
        }
        if stats.armor_points < 0 {
            return Err(invalid(
                "combat_stats.armor_points",
                format!("must be >= 0, got {}", stats.armor_points),
            )
            .into());
        }

        for (i, item) in self.equipment.iter().enumerate() {
            match item {
                EquipmentItem::Weapon { damage, .. } if *damage < 0 => {
                    return Err(invalid(
                        &format!("equipment[{i}].damage"),
                        format!("must be >= 0, got {damage}"),
                    )
                    .into());
                }
                EquipmentItem::Armor { armor_points, .. } if *armor_points < 0 => {
                    return Err(invalid(
                        &format!("equipment[{i}].armor_points"),
                        format!("must be >= 0, got {armor_points}"),
                    )
                    .into());
                }
                _ => {}
            }
        }

        Ok(())
    }
}

/// 以程式碼組裝角色（測試與 CLI 示範用）
#[derive(Debug, Clone)]
pub struct CharacterBuilder {
    character: Character,
}

impl CharacterBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            character: Character {
                identifier: name.to_lowercase().replace(' ', "_"),
                personal_info: PersonalInfo {
                    name,
                    ..Default::default()
                },
                character_role: CharacterRole {
                    is_player_character: false,
                    ..Default::default()
                },
                characteristics: Characteristics::default(),
                combat_stats: CombatStats::default(),
                talents: Vec::new(),
                equipment: Vec::new(),
                conditions: Vec::new(),
                encumbrance: 0.0,
            },
        }
    }

    pub fn player(mut self, is_player: bool) -> Self {
        self.character.character_role.is_player_character = is_player;
        self
    }

    pub fn weapon_skill(mut self, value: i32) -> Self {
        self.character.characteristics.weapon_skill = value;
        self
    }

    pub fn strength(mut self, value: i32) -> Self {
        self.character.characteristics.strength = value;
        self
    }

    pub fn toughness(mut self, value: i32) -> Self {
        self.character.characteristics.toughness = value;
        self
    }

    pub fn agility(mut self, value: i32) -> Self {
        self.character.characteristics.agility = value;
        self
    }

    pub fn initiative(mut self, value: i32) -> Self {
        self.character.characteristics.initiative = value;
        self
    }

    pub fn wounds(mut self, value: i32) -> Self {
        self.character.combat_stats.wounds = value;
        self.character.combat_stats.max_wounds = value;
        self
    }

    pub fn armor_points(mut self, value: i32) -> Self {
        self.character.combat_stats.armor_points = value;
        self
    }

    pub fn weapon(mut self, name: impl Into<String>, damage: i32) -> Self {
        self.character.add_equipment(EquipmentItem::weapon(name, damage));
        self
    }

    pub fn equipment(mut self, item: EquipmentItem) -> Self {
        self.character.add_equipment(item);
        self
    }

    pub fn talent(mut self, name: impl Into<String>) -> Self {
        self.character.talents.push(Talent::new(name));
        self
    }

    pub fn build(self) -> Character {
        self.character
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn fighter() -> Character {
        Character::builder("Aldric")
            .weapon_skill(50)
            .strength(45)
            .toughness(38)
            .agility(30)
            .initiative(30)
            .wounds(12)
            .armor_points(2)
            .weapon("Sword", 5)
            .talent("Strike Mighty Blow")
            .build()
    }

    #[test]
    fn test_builder_defaults() {
        let c = fighter();
        assert_eq!(c.identifier, "aldric");
        assert_eq!(c.name(), "Aldric");
        assert!(!c.is_player_character());
        assert_eq!(c.combat_stats.max_wounds, 12);
        assert!(c.validate("character").is_ok());
    }

    #[test]
    fn test_characteristic_bonuses() {
        let c = fighter();
        assert_eq!(c.characteristics.strength_bonus(), 4);
        assert_eq!(c.characteristics.toughness_bonus(), 3);
    }

    #[test]
    fn test_talent_lookup_by_name_and_effect() {
        let mut c = fighter();
        assert!(c.has_talent("Strike Mighty Blow"));
        assert!(!c.has_talent("Combat Reflexes"));

        c.talents.push(Talent {
            name: "Lightning Reflexes".to_string(),
            description: None,
            effects: vec!["Combat Reflexes".to_string()],
        });
        assert!(c.has_talent("Combat Reflexes"));
    }

    #[test]
    fn test_equipped_weapon_is_first_weapon() {
        let c = Character::builder("Gunther")
            .equipment(EquipmentItem::Gear {
                name: "Rope".to_string(),
                description: None,
                weight: 1.0,
            })
            .weapon("Hand Weapon", 4)
            .weapon("Dagger", 2)
            .build();
        let weapon = c.equipped_weapon().unwrap();
        assert_eq!(weapon.name, "Hand Weapon");
        assert_eq!(weapon.damage, 4);

        let unarmed = Character::builder("Brawler").build();
        assert!(unarmed.equipped_weapon().is_none());
    }

    #[test]
    fn test_encumbrance_tracks_equipment() {
        let mut c = Character::builder("Mule").build();
        c.add_equipment(EquipmentItem::Armor {
            name: "Mail Shirt".to_string(),
            description: None,
            weight: 6.5,
            armor_points: 2,
            location: Some("body".to_string()),
        });
        c.add_equipment(EquipmentItem::Gear {
            name: "Backpack".to_string(),
            description: None,
            weight: 1.5,
        });
        assert_eq!(c.encumbrance, 8.0);
    }

    #[test]
    fn test_conditions() {
        let mut c = fighter();
        c.add_condition(Condition::new("Bleeding"));
        c.add_condition(Condition::new("Stunned"));
        c.add_condition(Condition::new("Bleeding"));
        assert_eq!(c.condition_names(), vec!["Bleeding", "Stunned", "Bleeding"]);

        c.remove_condition("Bleeding");
        assert_eq!(c.condition_names(), vec!["Stunned"]);
    }

    #[test]
    fn test_validate_names_offending_field() {
        let mut c = fighter();
        c.combat_stats.wounds = -3;
        let err = c.validate("combatants[1].character").unwrap_err();
        match err.kind() {
            ErrorKind::Load(LoadError::InvalidField { field, .. }) => {
                assert_eq!(field, "combatants[1].character.combat_stats.wounds");
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let mut c = fighter();
        c.characteristics.agility = -1;
        let err = c.validate("c").unwrap_err();
        assert!(err.to_string().contains("c.characteristics.agility"));

        let mut c = fighter();
        c.equipment = vec![EquipmentItem::weapon("Cursed Blade", -2)];
        let err = c.validate("c").unwrap_err();
        assert!(err.to_string().contains("c.equipment[0].damage"));
    }
}
