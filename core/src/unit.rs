//! unit.rs：
//! - 定義戰鬥單位（CombatUnit）：角色參照 + 本場戰鬥的隊伍、先攻、位置、在場旗標。
//! - 先攻等單位衍生值的計算放在這裡。
//! - 不負責戰鬥流程與判定（命中、防禦、傷害計算在 attack.rs）。
use crate::action::Action;
use crate::battle::BattleView;
use crate::character::Character;
use crate::constants::{COMBAT_REFLEXES_BONUS, INITIATIVE_DIE, TALENT_COMBAT_REFLEXES};
use crate::dice::DiceRoll;
use crate::error::{Error, LoadError};
use crate::provider::{AutomatedProvider, DecisionProvider, DefenseMethod};
use serde::{Deserialize, Serialize};
use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

/// 單位在名冊中的索引
pub type UnitId = usize;
pub type TeamID = String;

/// 共用的角色資料：引擎只借用，不複製也不擁有
pub type SharedCharacter = Rc<RefCell<Character>>;

pub fn share(character: Character) -> SharedCharacter {
    Rc::new(RefCell::new(character))
}

/// 棋盤座標
#[derive(
    Debug, Deserialize, Serialize, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
#[serde(deny_unknown_fields)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// 接受 `x y` 或 `x,y`
impl FromStr for Position {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || LoadError::ParseError(format!("invalid position `{s}`"));
        let parts: Vec<&str> = s
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|part| !part.is_empty())
            .collect();
        let [x, y] = parts.as_slice() else {
            return Err(invalid().into());
        };
        let x = x.parse().map_err(|_| invalid())?;
        let y = y.parse().map_err(|_| invalid())?;
        Ok(Self::new(x, y))
    }
}

#[derive(Clone)]
pub struct CombatUnit {
    character: SharedCharacter,
    pub team: TeamID,
    pub initiative: i32,
    pub position: Position,
    /// 是否仍在名冊中參與輪替；引擎只讀取，由外部撤離單位時設為 false
    pub is_active: bool,
    controller: Rc<dyn DecisionProvider>,
}

impl CombatUnit {
    pub fn new(
        character: SharedCharacter,
        team: impl Into<TeamID>,
        controller: Rc<dyn DecisionProvider>,
    ) -> Self {
        Self {
            character,
            team: team.into(),
            initiative: 0,
            position: Position::default(),
            is_active: true,
            controller,
        }
    }

    /// 以自動決策建立單位
    pub fn automated(character: SharedCharacter, team: impl Into<TeamID>) -> Self {
        Self::new(character, team, Rc::new(AutomatedProvider))
    }

    pub fn character(&self) -> Ref<'_, Character> {
        self.character.borrow()
    }

    pub fn character_mut(&self) -> RefMut<'_, Character> {
        self.character.borrow_mut()
    }

    pub fn shared_character(&self) -> &SharedCharacter {
        &self.character
    }

    pub fn name(&self) -> String {
        self.character().name().to_string()
    }

    pub fn wounds(&self) -> i32 {
        self.character().combat_stats.wounds
    }

    pub fn condition_names(&self) -> Vec<String> {
        self.character()
            .conditions
            .iter()
            .map(|c| c.name.clone())
            .collect()
    }

    /// 替換決策來源（例如測試時換成腳本）
    pub fn set_controller(&mut self, controller: Rc<dyn DecisionProvider>) {
        self.controller = controller;
    }

    pub fn controller(&self) -> &Rc<dyn DecisionProvider> {
        &self.controller
    }

    /// 外部撤離單位（例如追蹤器判定倒地），引擎本身不呼叫
    pub fn set_active(&mut self, is_active: bool) {
        self.is_active = is_active;
    }

    /// 傷口值 > 0 即清醒
    pub fn is_conscious(&self) -> bool {
        self.wounds() > 0
    }

    pub fn is_enemy_of(&self, other: &CombatUnit) -> bool {
        self.team != other.team
    }

    /// 擲先攻：d10 + 先攻屬性 + 天賦加值，每次呼叫都重新擲骰並覆寫
    pub fn roll_initiative<R: rand::Rng>(&mut self, rng: &mut R) {
        let (base, reflexes) = {
            let character = self.character();
            (
                character.characteristics.initiative,
                character.has_talent(TALENT_COMBAT_REFLEXES),
            )
        };
        let dice = DiceRoll::roll(rng, 1, INITIATIVE_DIE, 0);
        self.initiative = calc_initiative(base, dice.total, reflexes);
        tracing::debug!(
            "{} rolls initiative: {} ({}, base: {}, combat reflexes: {})",
            self.name(),
            self.initiative,
            dice.format(),
            base,
            reflexes
        );
    }

    pub fn decide_action(&self, id: UnitId, battle: &BattleView<'_>) -> Action {
        self.controller.choose_action(id, self, battle)
    }

    pub fn decide_defense_method(&self) -> DefenseMethod {
        self.controller.choose_defense(self)
    }

    /// 名冊順序中第一個清醒的敵方單位
    pub fn find_target(&self, battle: &BattleView<'_>) -> Option<UnitId> {
        battle
            .combatants()
            .iter()
            .position(|other| self.is_enemy_of(other) && other.is_conscious())
    }
}

impl fmt::Debug for CombatUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CombatUnit")
            .field("name", &self.name())
            .field("team", &self.team)
            .field("initiative", &self.initiative)
            .field("position", &self.position)
            .field("is_active", &self.is_active)
            .field("wounds", &self.wounds())
            .field("controller", &self.controller)
            .finish()
    }
}

/// 計算先攻值
/// - 1D10 隨機
/// - 先攻屬性
/// - Combat Reflexes 天賦 +10
pub fn calc_initiative(base: i32, roll: i32, combat_reflexes: bool) -> i32 {
    let bonus = if combat_reflexes {
        COMBAT_REFLEXES_BONUS
    } else {
        0
    };
    base.saturating_add(roll).saturating_add(bonus)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn unit(name: &str, team: &str, wounds: i32) -> CombatUnit {
        let character = Character::builder(name).initiative(30).wounds(wounds).build();
        CombatUnit::automated(share(character), team)
    }

    #[test]
    fn test_position_from_str() {
        assert_eq!("3 4".parse::<Position>().unwrap(), Position::new(3, 4));
        assert_eq!(" -1, 2 ".parse::<Position>().unwrap(), Position::new(-1, 2));
        let err = "1 2 3".parse::<Position>().unwrap_err();
        assert!(err.to_string().contains("invalid position `1 2 3`"));
        assert!("a b".parse::<Position>().is_err());
    }

    #[test]
    fn test_calc_initiative() {
        assert_eq!(calc_initiative(30, 4, false), 34);
        assert_eq!(calc_initiative(30, 4, true), 44);
        assert_eq!(calc_initiative(i32::MAX, 10, true), i32::MAX);
    }

    #[test]
    fn test_roll_initiative_is_fresh_each_time() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut u = unit("Aldric", "Heroes", 10);
        for _ in 0..200 {
            u.roll_initiative(&mut rng);
            assert!((31..=40).contains(&u.initiative), "{}", u.initiative);
        }
    }

    #[test]
    fn test_combat_reflexes_adds_ten() {
        let mut rng = StdRng::seed_from_u64(3);
        let character = Character::builder("Quick")
            .initiative(30)
            .talent(TALENT_COMBAT_REFLEXES)
            .build();
        let mut u = CombatUnit::automated(share(character), "Heroes");
        for _ in 0..200 {
            u.roll_initiative(&mut rng);
            assert!((41..=50).contains(&u.initiative));
        }
    }

    #[test]
    fn test_conscious_tracks_wounds() {
        let u = unit("Goblin", "Monsters", 1);
        assert!(u.is_conscious());
        u.character_mut().combat_stats.wounds = 0;
        assert!(!u.is_conscious());
        // 在場旗標與清醒互不推導
        assert!(u.is_active);
    }

    #[test]
    fn test_character_is_shared_not_copied() {
        let shared = share(Character::builder("Ulrika").wounds(9).build());
        let u = CombatUnit::automated(Rc::clone(&shared), "Heroes");
        shared.borrow_mut().combat_stats.wounds = 4;
        assert_eq!(u.wounds(), 4);
        u.character_mut().combat_stats.wounds = 2;
        assert_eq!(shared.borrow().combat_stats.wounds, 2);
    }

    #[test]
    fn test_find_target_first_conscious_enemy() {
        let roster = vec![
            unit("Aldric", "Heroes", 10),
            unit("Bertha", "Heroes", 10),
            unit("Goblin A", "Monsters", 0),
            unit("Goblin B", "Monsters", 5),
            unit("Goblin C", "Monsters", 5),
        ];
        let view = BattleView::new(&roster, 1);
        assert_eq!(roster[0].find_target(&view), Some(3));
        assert_eq!(roster[3].find_target(&view), Some(0));

        roster[3].character_mut().combat_stats.wounds = 0;
        roster[4].character_mut().combat_stats.wounds = 0;
        assert_eq!(roster[0].find_target(&view), None);
    }
}
