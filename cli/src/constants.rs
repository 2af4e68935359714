pub const DEMO_ROSTER: &str = include_str!("../data/demo_roster.toml");
pub const DEMO_ROSTER_NAME: &str = "demo_roster.toml";
