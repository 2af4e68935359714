//! Warhammer 奇幻角色扮演的回合制近戰引擎
//!
//! - 戰鬥流程：擲先攻、依先攻排序、回合迴圈、結束判定（battle）
//! - 行動與攻擊判定：命中、防禦、依傷害類型減傷（action、attack）
//! - 決策來源：玩家選單與規則式 AI（provider）
//! - 外圍：角色資料、名冊載入、存檔格式、追蹤器

pub mod action;
pub mod attack;
pub mod battle;
pub mod character;
pub mod config;
pub mod constants;
pub mod dice;
pub mod error;
pub mod provider;
pub mod save;
#[cfg(feature = "test-helpers")]
pub mod test_helpers;
pub mod tracker;
pub mod unit;

// 重新導出常用類型
pub use action::{Action, ActionOutcome};
pub use attack::{AttackOutcome, AttackReport, DamageType};
pub use battle::{Battle, BattleOutcome, BattleState, BattleView};
pub use character::{Character, Condition, EquipmentItem};
pub use config::{load_roster, BattleConfig, RosterFile};
pub use error::{Error, Result};
pub use provider::{
    AutomatedProvider, DecisionProvider, DefenseMethod, InteractiveProvider, TextPrompt,
};
pub use save::BattleSnapshot;
pub use tracker::Tracker;
pub use unit::{share, CombatUnit, Position, SharedCharacter, UnitId};
