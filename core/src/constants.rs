//! 遊戲常數定義

/// 先攻骰面數（1d10）
pub const INITIATIVE_DIE: u32 = 10;

/// 百分骰面數（命中、招架、閃避檢定）
pub const PERCENTILE_DIE: u32 = 100;

/// 屬性加值除數：力量加值、體質加值皆為 floor(屬性 / 10)
pub const CHARACTERISTIC_BONUS_DIVISOR: i32 = 10;

/// 提升先攻的天賦
pub const TALENT_COMBAT_REFLEXES: &str = "Combat Reflexes";

/// Combat Reflexes 的先攻加值
pub const COMBAT_REFLEXES_BONUS: i32 = 10;

/// 提升傷害的天賦
pub const TALENT_STRIKE_MIGHTY_BLOW: &str = "Strike Mighty Blow";

/// Strike Mighty Blow 的傷害加值
pub const STRIKE_MIGHTY_BLOW_BONUS: i32 = 1;
