use std::io::{self, Write};

/// Feedback sounds the engine can ask for. How (or whether) they play is up
/// to the player.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cue {
    Click,
    Correct,
    Incorrect,
}

/// Fire-and-forget cue playback. Implementations must not fail loudly.
pub trait CuePlayer {
    fn play(&mut self, cue: Cue);
}

#[derive(Clone, Copy, Debug, Default)]
pub struct NoCues;

impl CuePlayer for NoCues {
    fn play(&mut self, _cue: Cue) {}
}

/// Rings the terminal bell twice on a wrong answer; other cues are silent.
#[derive(Clone, Copy, Debug)]
pub struct TerminalBell {
    pub enabled: bool,
}

impl CuePlayer for TerminalBell {
    fn play(&mut self, cue: Cue) {
        if !self.enabled || cue != Cue::Incorrect {
            return;
        }
        let mut out = io::stdout();
        let _ = out.write_all(b"\x07\x07");
        let _ = out.flush();
    }
}

/// Records cues instead of playing them.
#[derive(Clone, Debug, Default)]
pub struct CueLog {
    pub played: Vec<Cue>,
}

impl CuePlayer for CueLog {
    fn play(&mut self, cue: Cue) {
        self.played.push(cue);
    }
}

impl<P: CuePlayer + ?Sized> CuePlayer for std::rc::Rc<std::cell::RefCell<P>> {
    fn play(&mut self, cue: Cue) {
        self.borrow_mut().play(cue);
    }
}
