/// How a round ended
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Outcome {
    Bombed,
    TimeUp,
    Champion,
}

impl Outcome {
    pub fn banner(&self) -> &'static str {
        match self {
            Outcome::Bombed => "GAME OVER!",
            Outcome::TimeUp => "TIME UP!",
            Outcome::Champion => "CHAMPION!",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Session {
    pub score: u32,
    pub game_over: bool,
    pub time_remaining: u32,
    /// First terminal state reached. Later ones do not replace it.
    pub outcome: Option<Outcome>,
}

impl Session {
    pub fn new(time_limit: u32) -> Self {
        Self {
            score: 0,
            game_over: false,
            time_remaining: time_limit,
            outcome: None,
        }
    }

    pub fn finish(&mut self, outcome: Outcome) {
        self.game_over = true;
        self.outcome.get_or_insert(outcome);
    }

    pub fn score_text(&self) -> String {
        format!("Score: {}", self.score)
    }

    pub fn time_text(&self) -> String {
        format!("Time: {}s", self.time_remaining)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_outcome_sticks() {
        let mut session = Session::new(90);
        assert!(!session.game_over);
        session.finish(Outcome::Bombed);
        session.finish(Outcome::TimeUp);
        assert!(session.game_over);
        assert_eq!(session.outcome, Some(Outcome::Bombed));
    }

    #[test]
    fn hud_strings() {
        let mut session = Session::new(90);
        session.score = 4;
        assert_eq!(session.score_text(), "Score: 4");
        assert_eq!(session.time_text(), "Time: 90s");
        assert_eq!(Outcome::Champion.banner(), "CHAMPION!");
    }
}
