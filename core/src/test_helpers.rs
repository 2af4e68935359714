//! 測試輔助：腳本化的決策來源
//!
//! 測試不模擬輸入裝置，直接注入預先排好的行動與固定的防禦方式。

use crate::action::Action;
use crate::battle::BattleView;
use crate::provider::{AutomatedProvider, DecisionProvider, DefenseMethod};
use crate::unit::{CombatUnit, UnitId};
use std::cell::RefCell;
use std::collections::VecDeque;

/// 依序回傳預排的行動，用完後改用規則式決策；防禦方式固定
#[derive(Debug)]
pub struct ScriptedProvider {
    actions: RefCell<VecDeque<Action>>,
    defense: DefenseMethod,
}

impl ScriptedProvider {
    pub fn new(defense: DefenseMethod) -> Self {
        Self {
            actions: RefCell::new(VecDeque::new()),
            defense,
        }
    }

    pub fn with_actions(mut self, actions: impl IntoIterator<Item = Action>) -> Self {
        self.actions.get_mut().extend(actions);
        self
    }

    pub fn remaining(&self) -> usize {
        self.actions.borrow().len()
    }
}

impl DecisionProvider for ScriptedProvider {
    fn choose_action(
        &self,
        actor_id: UnitId,
        actor: &CombatUnit,
        battle: &BattleView<'_>,
    ) -> Action {
        let scripted = self.actions.borrow_mut().pop_front();
        scripted.unwrap_or_else(|| AutomatedProvider.choose_action(actor_id, actor, battle))
    }

    fn choose_defense(&self, _defender: &CombatUnit) -> DefenseMethod {
        self.defense
    }
}
