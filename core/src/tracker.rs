//! 戰鬥追蹤器
//!
//! 桌面遊戲用的手動記錄表：加入角色時擲先攻，依先攻由高到低排列，
//! 由主持人手動套用傷害與狀態。傷口值歸零時把單位撤離名冊（`is_active = false`），
//! 這是引擎外唯一會撤離單位的地方。

use crate::attack::{apply_damage, net_damage, DamageType};
use crate::character::{Character, Condition, EquipmentItem, WeaponType};
use crate::constants::TALENT_STRIKE_MIGHTY_BLOW;
use crate::error::{Result, RosterError};
use crate::provider::DecisionProvider;
use crate::save::BattleSnapshot;
use crate::unit::{CombatUnit, TeamID};
use std::cmp::Reverse;
use std::rc::Rc;
use strum_macros::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum UnitStatus {
    Active,
    Unconscious,
}

/// 表格中的一列
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerRow {
    pub name: String,
    pub team: TeamID,
    pub initiative: i32,
    pub wounds: i32,
    pub status: UnitStatus,
    pub conditions: String,
}

#[derive(Debug, Default)]
pub struct Tracker {
    combatants: Vec<CombatUnit>,
}

impl Tracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// 沿用既有先攻值，只重新排序
    pub fn from_units(combatants: Vec<CombatUnit>) -> Self {
        let mut tracker = Self { combatants };
        tracker.sort();
        tracker
    }

    pub fn combatants(&self) -> &[CombatUnit] {
        &self.combatants
    }

    pub fn into_units(self) -> Vec<CombatUnit> {
        self.combatants
    }

    pub fn add_combatant<R: rand::Rng>(&mut self, mut unit: CombatUnit, rng: &mut R) {
        unit.roll_initiative(rng);
        tracing::info!(
            "{} joins {} with initiative {}.",
            unit.name(),
            unit.team,
            unit.initiative
        );
        self.combatants.push(unit);
        self.sort();
    }

    pub fn rows(&self) -> Vec<TrackerRow> {
        roster_rows(&self.combatants)
    }

    /// 對第 `index` 列套用傷害，回傳剩餘傷口值
    ///
    /// 傷害先依傷害類型扣除減傷，與攻擊判定相同。
    pub fn apply_damage(
        &mut self,
        index: usize,
        amount: i32,
        damage_type: DamageType,
        condition: Option<Condition>,
    ) -> Result<i32> {
        let unit = self
            .combatants
            .get_mut(index)
            .ok_or(RosterError::UnitNotFound { id: index })?;

        let remaining = {
            let mut character = unit.character_mut();
            let net = net_damage(&character, amount, damage_type);
            let remaining = apply_damage(&mut character, net);
            tracing::info!(
                "{} takes {net} damage ({damage_type}). Remaining wounds: {remaining}",
                character.name()
            );
            if let Some(condition) = condition {
                tracing::info!("{} gains condition: {}", character.name(), condition.name);
                character.add_condition(condition);
            }
            remaining
        };

        if remaining <= 0 {
            tracing::info!("{} is out of the fight.", unit.name());
            unit.set_active(false);
        }
        Ok(remaining)
    }

    pub fn export_json(&self) -> Result<String> {
        BattleSnapshot::from_units(&self.combatants, 0).to_json()
    }

    pub fn import_json<F>(json: &str, assign: F) -> Result<Self>
    where
        F: FnMut(&Character) -> Rc<dyn DecisionProvider>,
    {
        let snapshot = BattleSnapshot::from_json(json)?;
        Ok(Self::from_units(snapshot.into_units(assign)))
    }

    fn sort(&mut self) {
        self.combatants.sort_by_key(|unit| Reverse(unit.initiative));
    }
}

/// 將名冊轉成表格列，依名冊原順序
pub fn roster_rows(units: &[CombatUnit]) -> Vec<TrackerRow> {
    units
        .iter()
        .map(|unit| {
            let status = if unit.is_active && unit.is_conscious() {
                UnitStatus::Active
            } else {
                UnitStatus::Unconscious
            };
            let conditions = unit.condition_names();
            TrackerRow {
                name: unit.name(),
                team: unit.team.clone(),
                initiative: unit.initiative,
                wounds: unit.wounds(),
                status,
                conditions: if conditions.is_empty() {
                    "None".to_string()
                } else {
                    conditions.join(", ")
                },
            }
        })
        .collect()
}

/// 快速建立一個隨機數值的持劍角色，方便主持人臨時加入 NPC
pub fn quick_character<R: rand::Rng>(name: &str, rng: &mut R) -> Character {
    Character::builder(name)
        .weapon_skill(rng.random_range(30..=60))
        .strength(rng.random_range(30..=60))
        .toughness(rng.random_range(30..=60))
        .agility(rng.random_range(30..=60))
        .initiative(rng.random_range(30..=60))
        .wounds(rng.random_range(10..=20))
        .armor_points(rng.random_range(0..=5))
        .equipment(EquipmentItem::Weapon {
            name: "Sword".to_string(),
            description: None,
            weight: 3.0,
            damage: 5,
            weapon_type: WeaponType::Melee,
        })
        .talent(TALENT_STRIKE_MIGHTY_BLOW)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::AutomatedProvider;
    use crate::unit::share;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn unit(name: &str, team: &str, initiative: i32) -> CombatUnit {
        let character = Character::builder(name)
            .toughness(30)
            .armor_points(2)
            .wounds(10)
            .build();
        let mut unit = CombatUnit::automated(share(character), team);
        unit.initiative = initiative;
        unit
    }

    #[test]
    fn test_add_combatant_keeps_initiative_order() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut tracker = Tracker::new();
        for name in ["Aldric", "Bertha", "Goblin"] {
            let character = quick_character(name, &mut rng);
            tracker.add_combatant(CombatUnit::automated(share(character), "T"), &mut rng);
        }
        let initiatives: Vec<i32> = tracker.rows().iter().map(|r| r.initiative).collect();
        assert_eq!(initiatives.len(), 3);
        assert!(initiatives.windows(2).all(|w| w[0] >= w[1]));
        assert!(initiatives.iter().all(|i| (31..=70).contains(i)));
    }

    #[test]
    fn test_rows_show_status_and_conditions() {
        let mut tracker = Tracker::from_units(vec![
            unit("Aldric", "Heroes", 20),
            unit("Goblin", "Monsters", 40),
        ]);
        let rows = tracker.rows();
        assert_eq!(rows[0].name, "Goblin");
        assert_eq!(rows[0].status, UnitStatus::Active);
        assert_eq!(rows[0].conditions, "None");

        tracker
            .apply_damage(1, 3, DamageType::Pure, Some(Condition::new("Bleeding")))
            .unwrap();
        tracker
            .apply_damage(1, 0, DamageType::Pure, Some(Condition::new("Prone")))
            .unwrap();
        let rows = tracker.rows();
        let row = &rows[1];
        assert_eq!(row.wounds, 7);
        assert_eq!(row.conditions, "Bleeding, Prone");
        assert_eq!(row.status.to_string(), "Active");
    }

    #[test]
    fn test_apply_damage_uses_damage_reduction() {
        let mut tracker = Tracker::from_units(vec![unit("Goblin", "Monsters", 40)]);
        // 體質加值 3 + 護甲 2
        let mut hit = |amount, damage_type| {
            tracker
                .apply_damage(0, amount, damage_type, None)
                .unwrap()
        };
        assert_eq!(hit(6, DamageType::Normal), 9);
        assert_eq!(hit(6, DamageType::IgnoreArmor), 6);
        assert_eq!(hit(2, DamageType::Normal), 6);
    }

    #[test]
    fn test_zero_wounds_withdraws_unit() {
        let mut tracker = Tracker::from_units(vec![unit("Goblin", "Monsters", 40)]);
        let remaining = tracker.apply_damage(0, 50, DamageType::Pure, None).unwrap();
        assert_eq!(remaining, 0);
        assert!(!tracker.combatants()[0].is_active);
        assert_eq!(tracker.rows()[0].status, UnitStatus::Unconscious);
    }

    #[test]
    fn test_apply_damage_extreme_amounts() {
        let mut tracker = Tracker::from_units(vec![unit("Goblin", "Monsters", 40)]);
        let remaining = tracker
            .apply_damage(0, i32::MIN, DamageType::Normal, None)
            .unwrap();
        assert_eq!(remaining, 10);
        let remaining = tracker
            .apply_damage(0, i32::MAX, DamageType::Pure, None)
            .unwrap();
        assert_eq!(remaining, 0);
    }

    #[test]
    fn test_apply_damage_unknown_row() {
        let mut tracker = Tracker::new();
        assert!(tracker.apply_damage(0, 1, DamageType::Normal, None).is_err());
    }

    #[test]
    fn test_export_import() {
        let mut tracker = Tracker::from_units(vec![
            unit("Aldric", "Heroes", 20),
            unit("Goblin", "Monsters", 40),
        ]);
        tracker.apply_damage(0, 50, DamageType::Pure, None).unwrap();
        let json = tracker.export_json().unwrap();

        let restored = Tracker::import_json(&json, |_| Rc::new(AutomatedProvider)).unwrap();
        assert_eq!(restored.rows(), tracker.rows());
        assert!(!restored.combatants()[0].is_active);
    }
}
