//! 攻擊判定
//!
//! 單次攻擊的流程：
//! 1. 命中：d100 <= 攻擊者武器技能
//! 2. 命中後若攻擊者沒有武器，攻擊到此結束
//! 3. 防禦者選擇防禦方式並擲骰（招架看武器技能、閃避看敏捷、特殊技能必定失敗）
//! 4. 防禦失敗才計算傷害，依傷害類型扣除減傷，傷口值最低為 0
//!
//! 整個流程在一次呼叫內完成，外部不會觀察到中間狀態。

use crate::character::Character;
use crate::constants::{STRIKE_MIGHTY_BLOW_BONUS, TALENT_STRIKE_MIGHTY_BLOW};
use crate::dice::PercentileTest;
use crate::provider::DefenseMethod;
use crate::unit::CombatUnit;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter};

/// 傷害類型：決定要扣除哪些減傷
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, Display,
)]
pub enum DamageType {
    /// 體質加值 + 護甲
    #[default]
    Normal,
    /// 只扣體質加值
    #[strum(to_string = "Ignore Armor")]
    IgnoreArmor,
    /// 不扣減
    Pure,
}

impl DamageType {
    pub fn description(&self) -> &'static str {
        match self {
            Self::Normal => "reduced by toughness and armor",
            Self::IgnoreArmor => "reduced by toughness only",
            Self::Pure => "not reduced at all",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttackOutcome {
    /// 命中擲骰失敗
    Miss,
    /// 命中但攻擊者沒有武器
    NoWeapon,
    /// 目標已倒地或同隊，攻擊不成立
    TargetUnavailable,
    /// 防禦成功，攻擊被完全抵銷
    Defended(DefenseMethod),
    /// 防禦失敗，造成傷害
    Damaged {
        defense: DefenseMethod,
        base_damage: i32,
        net_damage: i32,
        remaining_wounds: i32,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttackReport {
    pub hit: Option<PercentileTest>,
    pub defense: Option<PercentileTest>,
    pub outcome: AttackOutcome,
}

impl AttackReport {
    fn ended(hit: Option<PercentileTest>, outcome: AttackOutcome) -> Self {
        Self {
            hit,
            defense: None,
            outcome,
        }
    }

    pub fn net_damage(&self) -> i32 {
        match self.outcome {
            AttackOutcome::Damaged { net_damage, .. } => net_damage,
            _ => 0,
        }
    }
}

/// 減傷值
pub fn damage_reduction(defender: &Character, damage_type: DamageType) -> i32 {
    let toughness_bonus = defender.characteristics.toughness_bonus();
    let armor_points = defender.combat_stats.armor_points;
    match damage_type {
        DamageType::Normal => toughness_bonus.saturating_add(armor_points),
        DamageType::IgnoreArmor => toughness_bonus,
        DamageType::Pure => 0,
    }
}

/// 扣除減傷後的實際傷害，最低為 0
pub fn net_damage(defender: &Character, base_damage: i32, damage_type: DamageType) -> i32 {
    base_damage
        .saturating_sub(damage_reduction(defender, damage_type))
        .max(0)
}

/// 基礎傷害：武器傷害 + 力量加值 + 天賦；沒有武器時為 None
pub fn base_damage(attacker: &Character) -> Option<i32> {
    let weapon = attacker.equipped_weapon()?;
    let mut damage = weapon
        .damage
        .saturating_add(attacker.characteristics.strength_bonus());
    if attacker.has_talent(TALENT_STRIKE_MIGHTY_BLOW) {
        damage = damage.saturating_add(STRIKE_MIGHTY_BLOW_BONUS);
    }
    Some(damage)
}

/// 扣除傷口值，回傳剩餘傷口值
pub fn apply_damage(defender: &mut Character, net_damage: i32) -> i32 {
    let stats = &mut defender.combat_stats;
    stats.wounds = stats.wounds.saturating_sub(net_damage.max(0)).max(0);
    stats.wounds
}

/// 執行一次完整的攻擊判定
pub fn resolve_attack<R: rand::Rng>(
    attacker: &CombatUnit,
    defender: &CombatUnit,
    damage_type: DamageType,
    rng: &mut R,
) -> AttackReport {
    let attacker_name = attacker.name();
    let defender_name = defender.name();

    if !defender.is_conscious() || !attacker.is_enemy_of(defender) {
        tracing::info!("{attacker_name} cannot attack {defender_name}.");
        return AttackReport::ended(None, AttackOutcome::TargetUnavailable);
    }

    tracing::info!("{attacker_name} attacks {defender_name}!");

    let (weapon_skill, base) = {
        let character = attacker.character();
        (character.characteristics.weapon_skill, base_damage(&character))
    };

    let hit = PercentileTest::roll(rng, weapon_skill);
    if !hit.is_success() {
        tracing::info!("Missed! (Attacker Roll: {}, WS: {})", hit.roll, weapon_skill);
        return AttackReport::ended(Some(hit), AttackOutcome::Miss);
    }
    tracing::info!("Hit! (Attacker Roll: {}, WS: {})", hit.roll, weapon_skill);

    let Some(base) = base else {
        tracing::warn!("{attacker_name} has no weapon equipped!");
        return AttackReport::ended(Some(hit), AttackOutcome::NoWeapon);
    };

    let method = defender.decide_defense_method();
    let defense = attempt_defense(defender, method, rng);
    if defense.is_some_and(|test| test.is_success()) {
        tracing::info!("{defender_name} successfully defended against the attack!");
        return AttackReport {
            hit: Some(hit),
            defense,
            outcome: AttackOutcome::Defended(method),
        };
    }
    tracing::info!("{defender_name} failed to defend.");

    let net = net_damage(&defender.character(), base, damage_type);
    let remaining_wounds = apply_damage(&mut defender.character_mut(), net);
    tracing::info!(
        "{defender_name} takes {net} {damage_type} damage, now at {remaining_wounds} wounds."
    );

    AttackReport {
        hit: Some(hit),
        defense,
        outcome: AttackOutcome::Damaged {
            defense: method,
            base_damage: base,
            net_damage: net,
            remaining_wounds,
        },
    }
}

/// 防禦擲骰；特殊技能目前沒有判定，回傳 None 視為失敗
fn attempt_defense<R: rand::Rng>(
    defender: &CombatUnit,
    method: DefenseMethod,
    rng: &mut R,
) -> Option<PercentileTest> {
    let name = defender.name();
    let (weapon_skill, agility) = {
        let character = defender.character();
        (
            character.characteristics.weapon_skill,
            character.characteristics.agility,
        )
    };

    match method {
        DefenseMethod::Parry => {
            let test = PercentileTest::roll(rng, weapon_skill);
            tracing::info!(
                "{name} attempts to parry (Roll: {}, WS: {})",
                test.roll,
                weapon_skill
            );
            Some(test)
        }
        DefenseMethod::Dodge => {
            let test = PercentileTest::roll(rng, agility);
            tracing::info!(
                "{name} attempts to dodge (Roll: {}, Agility: {})",
                test.roll,
                agility
            );
            Some(test)
        }
        DefenseMethod::Special => {
            tracing::info!("{name} attempts to use a special defense skill.");
            None
        }
    }
}
