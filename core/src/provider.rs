//! 決策來源
//!
//! 單位在自己的回合選擇行動、被命中時選擇防禦方式。
//! 決策來源以 trait 注入單位，玩家與 NPC 只差在注入哪一種實作。

use crate::action::Action;
use crate::attack::DamageType;
use crate::battle::BattleView;
use crate::unit::{CombatUnit, Position, UnitId};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::fmt;
use std::io::{BufRead, Write};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter};

/// 防禦方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, Display)]
pub enum DefenseMethod {
    Parry,
    Dodge,
    #[strum(to_string = "Use Special Skill")]
    Special,
}

pub trait DecisionProvider: fmt::Debug {
    /// 為 `actor` 選擇本回合行動
    fn choose_action(
        &self,
        actor_id: UnitId,
        actor: &CombatUnit,
        battle: &BattleView<'_>,
    ) -> Action;

    /// 被命中時選擇防禦方式
    fn choose_defense(&self, defender: &CombatUnit) -> DefenseMethod;
}

/// 規則式決策：攻擊第一個敵人，沒有目標就防守
#[derive(Debug, Clone, Copy, Default)]
pub struct AutomatedProvider;

impl DecisionProvider for AutomatedProvider {
    fn choose_action(
        &self,
        actor_id: UnitId,
        actor: &CombatUnit,
        battle: &BattleView<'_>,
    ) -> Action {
        match actor.find_target(battle) {
            Some(target) => Action::Attack {
                actor: actor_id,
                target,
                damage_type: DamageType::Normal,
            },
            None => Action::Defend { actor: actor_id },
        }
    }

    /// 武器技能與敏捷取較高者，平手選招架
    fn choose_defense(&self, defender: &CombatUnit) -> DefenseMethod {
        let character = defender.character();
        if character.characteristics.weapon_skill >= character.characteristics.agility {
            DefenseMethod::Parry
        } else {
            DefenseMethod::Dodge
        }
    }
}

/// 選單輸入來源
pub trait Prompt {
    /// 顯示標題與編號選項，回傳輸入的原始字串；輸入結束回傳 None
    fn ask(&mut self, title: &str, options: &[String]) -> Option<String>;
}

/// 以文字串流呈現選單（CLI 用 stdin/stdout，測試用記憶體緩衝）
pub struct TextPrompt<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> TextPrompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    fn render(&mut self, title: &str, options: &[String]) -> std::io::Result<()> {
        writeln!(self.output, "{title}")?;
        for (i, option) in options.iter().enumerate() {
            writeln!(self.output, "{}. {}", i + 1, option)?;
        }
        write!(self.output, "> ")?;
        self.output.flush()
    }
}

impl<R: BufRead, W: Write> Prompt for TextPrompt<R, W> {
    fn ask(&mut self, title: &str, options: &[String]) -> Option<String> {
        self.render(title, options).ok()?;
        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(line.trim().to_string()),
        }
    }
}

/// 玩家可選的行動
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, Display)]
enum MenuAction {
    Attack,
    Move,
    Defend,
}

/// 由外部操作者（玩家）做決定；無效輸入套用預設值：行動 Defend、防禦 Dodge
pub struct InteractiveProvider<P> {
    prompt: RefCell<P>,
}

impl<P: Prompt> InteractiveProvider<P> {
    pub fn new(prompt: P) -> Self {
        Self {
            prompt: RefCell::new(prompt),
        }
    }

    pub fn into_prompt(self) -> P {
        self.prompt.into_inner()
    }

    fn ask(&self, title: &str, options: &[String]) -> Option<String> {
        self.prompt.borrow_mut().ask(title, options)
    }

    fn ask_menu<T: IntoEnumIterator>(
        &self,
        title: &str,
        label: impl Fn(&T) -> String,
    ) -> Option<T> {
        let options: Vec<String> = T::iter().map(|item| label(&item)).collect();
        let answer = self.ask(title, &options)?;
        parse_menu_choice(&answer)
    }

    fn choose_damage_type(&self) -> DamageType {
        let choice = self.ask_menu("Choose damage type:", |dt: &DamageType| {
            format!("{dt} ({})", dt.description())
        });
        choice.unwrap_or_else(|| {
            tracing::warn!("Invalid choice. Defaulting to Normal damage.");
            DamageType::Normal
        })
    }

    fn choose_destination(&self) -> Option<Position> {
        let answer = self.ask("Enter destination as `x y`:", &[])?;
        parse_position(&answer)
    }
}

impl<P: Prompt> DecisionProvider for InteractiveProvider<P> {
    fn choose_action(
        &self,
        actor_id: UnitId,
        actor: &CombatUnit,
        battle: &BattleView<'_>,
    ) -> Action {
        let title = format!("{}'s turn. Choose an action:", actor.name());
        let choice = self.ask_menu(&title, MenuAction::to_string);

        match choice {
            Some(MenuAction::Attack) => match actor.find_target(battle) {
                Some(target) => Action::Attack {
                    actor: actor_id,
                    target,
                    damage_type: self.choose_damage_type(),
                },
                None => {
                    tracing::info!("No targets available.");
                    Action::Defend { actor: actor_id }
                }
            },
            Some(MenuAction::Move) => match self.choose_destination() {
                Some(destination) => Action::Move {
                    actor: actor_id,
                    destination,
                },
                None => {
                    tracing::warn!("Invalid destination. Defaulting to Defend.");
                    Action::Defend { actor: actor_id }
                }
            },
            Some(MenuAction::Defend) => Action::Defend { actor: actor_id },
            None => {
                tracing::warn!("Invalid choice. Defaulting to Defend.");
                Action::Defend { actor: actor_id }
            }
        }
    }

    fn choose_defense(&self, defender: &CombatUnit) -> DefenseMethod {
        let title = format!("{}, how do you want to defend?", defender.name());
        self.ask_menu(&title, DefenseMethod::to_string)
            .unwrap_or_else(|| {
                tracing::warn!("Invalid choice. Defaulting to Dodge.");
                DefenseMethod::Dodge
            })
    }
}

impl<P> fmt::Debug for InteractiveProvider<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InteractiveProvider").finish_non_exhaustive()
    }
}

/// 解析 1 起算的選單編號
fn parse_menu_choice<T: IntoEnumIterator>(answer: &str) -> Option<T> {
    let index: usize = answer.trim().parse().ok()?;
    index.checked_sub(1).and_then(|i| T::iter().nth(i))
}

fn parse_position(answer: &str) -> Option<Position> {
    answer.parse().ok()
}
