/// Interactive terminal console for resection planning
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    execute, queue,
    terminal,
};
use kneeplan_core::{
    Adjustment, DisplayOptions, PlaneKind, Planner, ResectionRequest, ResectionScheduler,
};
use std::io::{self, stdout, Write};
use std::time::{Duration, Instant};

pub mod panel;

pub use panel::StagePanel;

/// What a key press asks the console to do.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    Adjust(Adjustment),
    TogglePlane(PlaneKind),
    ToggleResection,
    Quit,
}

/// Map a key to an action. Lowercase steps up, uppercase steps down.
pub fn action_for(code: KeyCode) -> Option<Action> {
    let action = match code {
        KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
        KeyCode::Char('v') => Action::Adjust(Adjustment::VarusValgus(1.0)),
        KeyCode::Char('V') => Action::Adjust(Adjustment::VarusValgus(-1.0)),
        KeyCode::Char('e') => Action::Adjust(Adjustment::Extension(1.0)),
        KeyCode::Char('E') => Action::Adjust(Adjustment::Extension(-1.0)),
        KeyCode::Char('d') => Action::Adjust(Adjustment::ResectionDepth(1.0)),
        KeyCode::Char('D') => Action::Adjust(Adjustment::ResectionDepth(-1.0)),
        KeyCode::Char('a') => Action::Adjust(Adjustment::AnteriorLength(1.0)),
        KeyCode::Char('A') => Action::Adjust(Adjustment::AnteriorLength(-1.0)),
        KeyCode::Char('l') => Action::Adjust(Adjustment::LateralLength(1.0)),
        KeyCode::Char('L') => Action::Adjust(Adjustment::LateralLength(-1.0)),
        KeyCode::Char('r') => Action::ToggleResection,
        KeyCode::Char(c @ '1'..='5') => {
            let index = c as usize - '1' as usize;
            Action::TogglePlane(PlaneKind::ALL[index])
        }
        _ => return None,
    };
    Some(action)
}

/// Console state: the planner, what is displayed, and the cutter hand-off.
pub struct PlannerConsole {
    planner: Planner,
    display: DisplayOptions,
    scheduler: ResectionScheduler,
    settled: Option<ResectionRequest>,
    submitted_revision: u64,
    panel: StagePanel,
    running: bool,
    started: Instant,
}

impl PlannerConsole {
    pub fn new(planner: Planner) -> Self {
        let scheduler = ResectionScheduler::new(planner.config().settle_delay());
        let mut console = Self {
            planner,
            display: DisplayOptions::default(),
            scheduler,
            settled: None,
            submitted_revision: 0,
            panel: StagePanel::new(),
            running: true,
            started: Instant::now(),
        };
        console.sync_scheduler(Duration::ZERO);
        console
    }

    pub fn planner(&self) -> &Planner {
        &self.planner
    }

    pub fn display(&self) -> &DisplayOptions {
        &self.display
    }

    pub fn settled(&self) -> Option<&ResectionRequest> {
        self.settled.as_ref()
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn run(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(stdout(), terminal::EnterAlternateScreen, cursor::Hide)?;

        let result = self.main_loop();

        // Cleanup
        terminal::disable_raw_mode()?;
        execute!(stdout(), terminal::LeaveAlternateScreen, cursor::Show)?;

        result
    }

    fn main_loop(&mut self) -> io::Result<()> {
        let target_frame_time = Duration::from_millis(1000 / 30);

        while self.running {
            let frame_start = Instant::now();

            if event::poll(Duration::from_millis(0))? {
                if let Event::Key(KeyEvent { code, kind, .. }) = event::read()? {
                    if kind == KeyEventKind::Press {
                        if let Some(action) = action_for(code) {
                            self.apply(action, self.started.elapsed());
                        }
                    }
                }
            }

            self.tick(self.started.elapsed());
            self.render()?;

            let elapsed = frame_start.elapsed();
            if elapsed < target_frame_time {
                std::thread::sleep(target_frame_time - elapsed);
            }
        }

        Ok(())
    }

    /// Apply one action at time `now` since the console started.
    pub fn apply(&mut self, action: Action, now: Duration) {
        match action {
            Action::Quit => self.running = false,
            Action::Adjust(adjustment) => {
                self.planner.adjust(adjustment);
                self.sync_scheduler(now);
            }
            Action::TogglePlane(kind) => self.display.planes.toggle(kind),
            Action::ToggleResection => {
                self.display.resection = !self.display.resection;
                log::info!("resection display {}", if self.display.resection { "on" } else { "off" });
            }
        }
    }

    /// Collect a settled cutter, if any.
    pub fn tick(&mut self, now: Duration) {
        if let Some(request) = self.scheduler.poll(now) {
            log::info!("cutting solid settled at revision {}", request.revision);
            self.settled = Some(request);
        }
    }

    fn sync_scheduler(&mut self, now: Duration) {
        let snapshot = self.planner.snapshot();
        if snapshot.revision == self.submitted_revision {
            return;
        }
        self.submitted_revision = snapshot.revision;
        match &snapshot.cutting_solid {
            Some(solid) => {
                self.scheduler.submit(snapshot.revision, solid.clone(), now);
            }
            None => {
                self.scheduler.withdraw(snapshot.revision);
                self.settled = None;
            }
        }
    }

    fn render(&mut self) -> io::Result<()> {
        let snapshot = self.planner.snapshot();
        let rows = panel::rows(
            &snapshot,
            self.planner.parameters(),
            &self.display,
            self.settled.as_ref(),
        );
        let header = format!(
            "Kneeplan | revision {} | v/V e/E d/D a/A l/L adjust  1-5 planes  r resection  q quit",
            snapshot.revision
        );

        let mut stdout = stdout();
        self.panel.draw(&mut stdout, &header, &rows)?;
        queue!(stdout, cursor::MoveTo(0, rows.len() as u16 + 3))?;
        stdout.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kneeplan_core::{LandmarkStore, PlannerConfig};

    const LANDMARKS: &str = r#"{
        "Femur Center": [0.0, 0.0, 0.0],
        "Hip Center": [0.0, 10.0, 0.0],
        "Medial Epicondyle": [-1.0, 0.0, 1.0],
        "Lateral Epicondyle": [1.0, 0.0, 1.0],
        "Distal Medial Pt": [-0.4, -0.5, 0.6]
    }"#;

    fn console() -> PlannerConsole {
        let mut planner = Planner::new(PlannerConfig::default());
        planner.set_landmarks(LandmarkStore::from_json_str(LANDMARKS).unwrap());
        PlannerConsole::new(planner)
    }

    #[test]
    fn test_key_mapping() {
        assert_eq!(action_for(KeyCode::Char('q')), Some(Action::Quit));
        assert_eq!(
            action_for(KeyCode::Char('V')),
            Some(Action::Adjust(Adjustment::VarusValgus(-1.0)))
        );
        assert_eq!(
            action_for(KeyCode::Char('1')),
            Some(Action::TogglePlane(PlaneKind::MechanicalAxis))
        );
        assert_eq!(
            action_for(KeyCode::Char('5')),
            Some(Action::TogglePlane(PlaneKind::DistalResection))
        );
        assert_eq!(action_for(KeyCode::Char('6')), None);
    }

    #[test]
    fn test_cutter_settles_after_inputs_stop() {
        let mut console = console();
        let delay = console.planner().config().settle_delay();

        console.apply(Action::Adjust(Adjustment::ResectionDepth(1.0)), Duration::ZERO);
        console.tick(delay / 2);
        assert!(console.settled().is_none());

        console.apply(Action::Adjust(Adjustment::ResectionDepth(1.0)), delay / 2);
        console.tick(delay);
        assert!(console.settled().is_none());

        console.tick(delay / 2 + delay);
        let settled = console.settled().unwrap();
        assert_eq!(settled.revision, console.planner().revision());
    }

    #[test]
    fn test_toggles_and_quit() {
        let mut console = console();
        console.apply(Action::TogglePlane(PlaneKind::DistalMedial), Duration::ZERO);
        console.apply(Action::ToggleResection, Duration::ZERO);
        assert!(console.display().planes.is_visible(PlaneKind::DistalMedial));
        assert!(console.display().resection);

        console.apply(Action::Quit, Duration::ZERO);
        assert!(!console.is_running());
    }
}
