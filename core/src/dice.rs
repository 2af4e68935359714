//! 擲骰系統
//!
//! 所有擲骰都從呼叫端注入的 `rand::Rng` 取值，測試時可用固定 seed 重現結果

use crate::constants::PERCENTILE_DIE;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// 擲一顆 `sides` 面骰，結果落在 [1, sides]
pub fn roll_die<R: Rng>(rng: &mut R, sides: u32) -> u32 {
    rng.random_range(1..=sides)
}

/// 擲 d100（百分骰）
pub fn roll_d100<R: Rng>(rng: &mut R) -> u32 {
    roll_die(rng, PERCENTILE_DIE)
}

/// 擲骰結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiceRoll {
    /// 骰子數量
    pub num_dice: u32,
    /// 骰子面數
    pub die_size: u32,
    /// 要加到擲骰的調整值
    pub modifier: i32,
    /// 個別骰子的結果
    pub rolls: Vec<u32>,
    /// 總計（包含調整值）
    pub total: i32,
}

impl DiceRoll {
    /// 擲 `num_dice` 顆 `die_size` 面骰並加上調整值
    pub fn roll<R: Rng>(rng: &mut R, num_dice: u32, die_size: u32, modifier: i32) -> Self {
        let rolls: Vec<u32> = (0..num_dice).map(|_| roll_die(rng, die_size)).collect();

        let sum: u32 = rolls.iter().sum();
        let total = sum as i32 + modifier;

        Self {
            num_dice,
            die_size,
            modifier,
            rolls,
            total,
        }
    }

    /// 格式化擲骰以供顯示（例如："1d10+30 = [4] + 30 = 34"）
    pub fn format(&self) -> String {
        format!(
            "{}d{}+{} = {:?} + {} = {}",
            self.num_dice, self.die_size, self.modifier, self.rolls, self.modifier, self.total
        )
    }
}

/// 百分骰檢定：骰出的數字小於或等於目標值即成功
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PercentileTest {
    pub roll: u32,
    pub target: i32,
}

impl PercentileTest {
    pub fn roll<R: Rng>(rng: &mut R, target: i32) -> Self {
        Self {
            roll: roll_d100(rng),
            target,
        }
    }

    pub fn is_success(&self) -> bool {
        // 目標值 <= 0 時永遠失敗
        i64::from(self.roll) <= i64::from(self.target)
    }
}
