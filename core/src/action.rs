//! action.rs：
//! - 單位一回合的行動，封閉的 enum，新增種類時所有 match 都要跟著處理。
//! - 行動建立時 actor 必須清醒且在場（由戰鬥流程保證）。
use crate::attack::{resolve_attack, AttackReport, DamageType};
use crate::error::{Result, RosterError};
use crate::unit::{CombatUnit, Position, UnitId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    Attack {
        actor: UnitId,
        target: UnitId,
        damage_type: DamageType,
    },
    /// 不檢查移動力，直接移到目的地
    Move {
        actor: UnitId,
        destination: Position,
    },
    /// 目前沒有機制效果
    Defend { actor: UnitId },
    /// 預留擴充點，只記錄
    UseSkill { actor: UnitId, skill_name: String },
}

/// 行動執行結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    Attack(AttackReport),
    Moved { from: Position, to: Position },
    Defended,
    SkillUsed { skill_name: String },
}

impl Action {
    pub fn actor(&self) -> UnitId {
        match self {
            Self::Attack { actor, .. }
            | Self::Move { actor, .. }
            | Self::Defend { actor }
            | Self::UseSkill { actor, .. } => *actor,
        }
    }

    pub fn execute<R: rand::Rng>(
        &self,
        combatants: &mut [CombatUnit],
        rng: &mut R,
    ) -> Result<ActionOutcome> {
        match self {
            Self::Attack {
                actor,
                target,
                damage_type,
            } => {
                let attacker = get_unit(combatants, *actor)?;
                let defender = get_unit(combatants, *target)?;
                let report = resolve_attack(attacker, defender, *damage_type, rng);
                Ok(ActionOutcome::Attack(report))
            }
            Self::Move { actor, destination } => {
                let unit = combatants
                    .get_mut(*actor)
                    .ok_or(RosterError::UnitNotFound { id: *actor })?;
                let from = unit.position;
                tracing::info!("{} moves from {} to {}.", unit.name(), from, destination);
                unit.position = *destination;
                Ok(ActionOutcome::Moved {
                    from,
                    to: *destination,
                })
            }
            Self::Defend { actor } => {
                let unit = get_unit(combatants, *actor)?;
                tracing::info!("{} takes a defensive stance.", unit.name());
                Ok(ActionOutcome::Defended)
            }
            Self::UseSkill { actor, skill_name } => {
                let unit = get_unit(combatants, *actor)?;
                tracing::info!("{} uses skill: {}.", unit.name(), skill_name);
                Ok(ActionOutcome::SkillUsed {
                    skill_name: skill_name.clone(),
                })
            }
        }
    }
}

fn get_unit(combatants: &[CombatUnit], id: UnitId) -> Result<&CombatUnit> {
    Ok(combatants
        .get(id)
        .ok_or(RosterError::UnitNotFound { id })?)
}
