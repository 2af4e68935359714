//! battle.rs：
//! - 負責戰鬥流程：擲先攻、排序行動順序、回合迴圈、結束判定。
//! - 命中、防禦、傷害的判定在 attack.rs；單位衍生值（先攻）在 unit.rs。
//! - 先攻只在開戰時擲一次，之後的回合沿用同一個順序。
use crate::action::{Action, ActionOutcome};
use crate::config::BattleConfig;
use crate::error::{Result, RosterError};
use crate::save::BattleSnapshot;
use crate::unit::{CombatUnit, TeamID, UnitId};
use rand::rngs::StdRng;
use std::cmp::Reverse;
use std::collections::BTreeSet;

/// 戰鬥狀態
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BattleState {
    NotStarted,
    InProgress { round: u32 },
    Over,
}

/// 戰鬥結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BattleOutcome {
    /// 只剩一隊清醒
    Victory { team: TeamID },
    /// 沒有任何隊伍清醒
    NoSurvivors,
    /// 達到設定的回合上限
    RoundLimitReached { rounds: u32 },
}

/// 給決策來源的唯讀戰場檢視
#[derive(Debug, Clone, Copy)]
pub struct BattleView<'a> {
    combatants: &'a [CombatUnit],
    round: u32,
}

impl<'a> BattleView<'a> {
    pub fn new(combatants: &'a [CombatUnit], round: u32) -> Self {
        Self { combatants, round }
    }

    pub fn combatants(&self) -> &'a [CombatUnit] {
        self.combatants
    }

    pub fn unit(&self, id: UnitId) -> Option<&'a CombatUnit> {
        self.combatants.get(id)
    }

    pub fn round(&self) -> u32 {
        self.round
    }
}

#[derive(Debug)]
pub struct Battle<R = StdRng> {
    combatants: Vec<CombatUnit>,
    round_number: u32,
    turn_order: Vec<UnitId>,
    state: BattleState,
    outcome: Option<BattleOutcome>,
    config: BattleConfig,
    rng: R,
}

impl<R: rand::Rng> Battle<R> {
    /// 名冊在整場戰鬥中固定，`UnitId` 即名冊索引
    pub fn new(combatants: Vec<CombatUnit>, rng: R) -> Self {
        Self {
            combatants,
            round_number: 0,
            turn_order: Vec::new(),
            state: BattleState::NotStarted,
            outcome: None,
            config: BattleConfig::default(),
            rng,
        }
    }

    pub fn with_config(mut self, config: BattleConfig) -> Self {
        self.config = config;
        self
    }

    pub fn combatants(&self) -> &[CombatUnit] {
        &self.combatants
    }

    /// 供外部（例如追蹤器）撤離單位或調整位置
    pub fn combatants_mut(&mut self) -> &mut [CombatUnit] {
        &mut self.combatants
    }

    pub fn unit(&self, id: UnitId) -> Result<&CombatUnit> {
        Ok(self
            .combatants
            .get(id)
            .ok_or(RosterError::UnitNotFound { id })?)
    }

    pub fn round_number(&self) -> u32 {
        self.round_number
    }

    pub fn turn_order(&self) -> &[UnitId] {
        &self.turn_order
    }

    pub fn state(&self) -> BattleState {
        self.state
    }

    pub fn outcome(&self) -> Option<&BattleOutcome> {
        self.outcome.as_ref()
    }

    pub fn view(&self) -> BattleView<'_> {
        BattleView::new(&self.combatants, self.round_number)
    }

    pub fn snapshot(&self) -> BattleSnapshot {
        BattleSnapshot::from_units(&self.combatants, self.round_number)
    }

    pub fn into_combatants(self) -> Vec<CombatUnit> {
        self.combatants
    }

    /// 開戰並一路執行到結束
    ///
    /// 已結束的戰鬥再次呼叫只回傳原結果。
    pub fn start_battle(&mut self) -> Result<BattleOutcome> {
        if let Some(outcome) = &self.outcome {
            return Ok(outcome.clone());
        }

        tracing::info!("Battle begins!");
        self.determine_initiative();
        self.round_number = 1;

        let outcome = loop {
            if self.is_battle_over() {
                break self.survivor_outcome();
            }
            if let Some(max_rounds) = self.config.max_rounds {
                if self.round_number > max_rounds {
                    tracing::info!("Round limit of {max_rounds} reached.");
                    break BattleOutcome::RoundLimitReached { rounds: max_rounds };
                }
            }

            self.state = BattleState::InProgress {
                round: self.round_number,
            };
            tracing::info!("--- Round {} ---", self.round_number);
            self.execute_round()?;
            self.round_number += 1;
        };

        tracing::info!("Battle has ended: {outcome:?}");
        self.state = BattleState::Over;
        self.outcome = Some(outcome.clone());
        Ok(outcome)
    }

    /// 所有單位擲先攻並重算行動順序
    pub fn determine_initiative(&mut self) {
        tracing::debug!("Determining initiative order...");
        for unit in &mut self.combatants {
            unit.roll_initiative(&mut self.rng);
        }
        self.turn_order = compute_turn_order(&self.combatants);

        tracing::info!("Initiative order:");
        for (rank, id) in self.turn_order.iter().enumerate() {
            let unit = &self.combatants[*id];
            tracing::info!(
                "{}. {} (Initiative: {})",
                rank + 1,
                unit.name(),
                unit.initiative
            );
        }
    }

    /// 依行動順序讓每個在場且清醒的單位行動一次
    ///
    /// 是否清醒在輪到該單位時才檢查，同一回合稍早被擊倒的單位會被跳過。
    pub fn execute_round(&mut self) -> Result<()> {
        for index in 0..self.turn_order.len() {
            let id = self.turn_order[index];
            let unit = self.unit(id)?;
            if !unit.is_active {
                tracing::info!("{} has withdrawn and cannot act.", unit.name());
            } else if !unit.is_conscious() {
                tracing::info!("{} is unconscious and cannot act.", unit.name());
            } else {
                self.execute_turn(id)?;
            }
        }
        Ok(())
    }

    /// 單一單位的回合：取得行動並執行
    pub fn execute_turn(&mut self, id: UnitId) -> Result<ActionOutcome> {
        let action = {
            let unit = self.unit(id)?;
            tracing::debug!("Executing turn for {}.", unit.name());
            let action = unit.decide_action(id, &self.view());
            if action.actor() != id {
                tracing::warn!(
                    "{} was given an action for unit {}. Defaulting to Defend.",
                    unit.name(),
                    action.actor()
                );
                Action::Defend { actor: id }
            } else {
                action
            }
        };
        action.execute(&mut self.combatants, &mut self.rng)
    }

    /// 在場且清醒單位所屬的隊伍
    pub fn remaining_teams(&self) -> BTreeSet<TeamID> {
        self.combatants
            .iter()
            .filter(|unit| unit.is_active && unit.is_conscious())
            .map(|unit| unit.team.clone())
            .collect()
    }

    /// 剩餘隊伍數 <= 1 即結束，只在回合之間判定
    pub fn is_battle_over(&self) -> bool {
        self.remaining_teams().len() <= 1
    }

    fn survivor_outcome(&self) -> BattleOutcome {
        match self.remaining_teams().into_iter().next() {
            Some(team) => BattleOutcome::Victory { team },
            None => BattleOutcome::NoSurvivors,
        }
    }
}

/// 依先攻由高到低排序，同分保持名冊原順序
pub fn compute_turn_order(combatants: &[CombatUnit]) -> Vec<UnitId> {
    let mut order: Vec<UnitId> = (0..combatants.len()).collect();
    order.sort_by_key(|&id| Reverse(combatants[id].initiative));
    order
}
