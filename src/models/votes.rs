use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VoteDirection {
    Up,
    Down,
    Clear,
}

impl VoteDirection {
    /// the stored value, `None` for a cleared vote.
    pub fn value(self) -> Option<i64> {
        match self {
            VoteDirection::Up => Some(1),
            VoteDirection::Down => Some(-1),
            VoteDirection::Clear => None,
        }
    }
}

impl FromStr for VoteDirection {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "up" => Ok(VoteDirection::Up),
            "down" => Ok(VoteDirection::Down),
            "clear" => Ok(VoteDirection::Clear),
            _ => Err(()),
        }
    }
}
